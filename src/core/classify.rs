//! Diffing a newly observed entity against the previously cached one.

use std::fmt;

use crate::comm::EventKind;
use crate::comm::Query;
use crate::comm::Update;
use crate::discovery::encode_entity_id;
use crate::CodecError;
use crate::Discoverable;
use crate::Entity;

/// Effect of an add-kind change record on discovery state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// No previous value at this key
    New,
    /// Same target, service arguments changed
    Update,
    /// Service name or discovery type changed
    Replace,
    /// Nothing discovery-relevant changed
    Unchanged,
}

pub fn classify(
    previous: Option<&Entity>,
    current: &Entity,
) -> Change {
    match previous {
        None => Change::New,
        Some(previous) if previous.service_updated(current) => Change::Update,
        Some(previous) if previous.service_replaced(current) => Change::Replace,
        Some(_) => Change::Unchanged,
    }
}

/// A message bound for the backend of one discovery type
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Query { discovery_type: String, query: Query },
    Update { discovery_type: String, update: Update },
}

impl fmt::Display for Dispatch {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Dispatch::Query { discovery_type, query } => write!(f, "[{discovery_type}] {query}"),
            Dispatch::Update { discovery_type, update } => write!(f, "[{discovery_type}] {update}"),
        }
    }
}

impl Dispatch {
    pub fn discovery_type(&self) -> &str {
        match self {
            Dispatch::Query { discovery_type, .. } | Dispatch::Update { discovery_type, .. } => discovery_type,
        }
    }

    /// Service the message is about
    pub fn service(&self) -> &str {
        match self {
            Dispatch::Query { query, .. } => query.service(),
            Dispatch::Update { update, .. } => update.service(),
        }
    }
}

/// Builds the ordered dispatches for an add-kind record.
///
/// Every message is encoded before any is returned, so a Replace either
/// yields both the delete and the add or nothing at all.
pub fn plan(
    change: Change,
    store_type: &str,
    previous: Option<&Entity>,
    current: &Entity,
) -> Result<Vec<Dispatch>, CodecError> {
    let dispatches = match (change, previous) {
        (Change::New, _) => vec![query_dispatch(EventKind::Add, store_type, current)?],
        (Change::Update, Some(previous)) => vec![Dispatch::Update {
            discovery_type: current.discovery_type().to_string(),
            update: encode_update(previous, current)?,
        }],
        (Change::Replace, Some(previous)) => vec![
            query_dispatch(EventKind::Delete, store_type, previous)?,
            query_dispatch(EventKind::Add, store_type, current)?,
        ],
        _ => Vec::new(),
    };
    Ok(dispatches)
}

pub fn query_dispatch(
    event: EventKind,
    store_type: &str,
    entity: &Entity,
) -> Result<Dispatch, CodecError> {
    Ok(Dispatch::Query {
        discovery_type: entity.discovery_type().to_string(),
        query: encode_query(event, store_type, entity)?,
    })
}

pub fn encode_query(
    event: EventKind,
    store_type: &str,
    entity: &Entity,
) -> Result<Query, CodecError> {
    let (id, service, args) = entity.extract();
    let entity_id = encode_entity_id(store_type, &id);

    Query::new(&[event.as_str(), entity_id.as_str(), service.as_str()], &args)
}

pub fn encode_update(
    previous: &Entity,
    current: &Entity,
) -> Result<Update, CodecError> {
    let (_, service, old_args) = previous.extract();
    let (_, _, new_args) = current.extract();

    Update::new(&[EventKind::Update.as_str(), service.as_str()], &old_args, &new_args)
}
