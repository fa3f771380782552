use tracing::error;
use tracing::trace;
use tracing::warn;

use super::Dispatch;
use crate::DiscovererRegistry;

/// Sends one message to its backend. Failures are logged and swallowed; the
/// backend owns any retry policy.
pub async fn dispatch(
    registry: &DiscovererRegistry,
    outgoing: Dispatch,
) {
    let discoverer = match registry.get(outgoing.discovery_type()) {
        Ok(discoverer) => discoverer,
        Err(e) => {
            error!(
                discovery_type = %outgoing.discovery_type(),
                "Watcher has no backend for {}: {:?}",
                outgoing,
                e
            );
            return;
        }
    };

    let result = match &outgoing {
        Dispatch::Query { query, .. } => discoverer.query(query).await,
        Dispatch::Update { update, .. } => discoverer.update(update).await,
    };

    let discovery_type = outgoing.discovery_type();
    let service = outgoing.service();
    match result {
        Ok(()) => trace!(discovery_type, service, "dispatched {}", outgoing),
        Err(e) => warn!(discovery_type, service, "Watcher dispatch {} failed: {:?}", outgoing, e),
    }
}
