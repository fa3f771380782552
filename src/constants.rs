/// Event literal for an upsert, carried in change feeds and query headers
pub const EVENT_ADD: &str = "add";
/// Event literal for an in-place service argument change
pub const EVENT_UPDATE: &str = "update";
/// Event literal for a removal
pub const EVENT_DELETE: &str = "delete";

/// Separator between store type and store-local key in an entity id
pub const ENTITY_ID_SEPARATOR: char = ';';

/// Extra permits on top of available parallelism
pub const DEFAULT_PERMIT_HEADROOM: usize = 10;

/// Discovery type assumed when an upstream omits `discovery_type`
pub const DEFAULT_DISCOVERY_TYPE: &str = "nacos";

pub const STORE_KIND_ROUTES: &str = "routes";
pub const STORE_KIND_SERVICES: &str = "services";
pub const STORE_KIND_UPSTREAMS: &str = "upstreams";
