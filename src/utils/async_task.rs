use std::future::Future;
use std::thread::available_parallelism;

use tokio::task::JoinHandle;
use tracing::error;

use crate::Result;

/// Permit pool capacity: available parallelism plus `headroom`
pub fn permit_capacity(headroom: usize) -> usize {
    available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_add(headroom)
}

/// Spawns a named long-lived task whose failure is logged, not propagated
pub(crate) fn spawn_task<Fut>(
    name: &str,
    fut: Fut,
    handles: Option<&mut Vec<JoinHandle<()>>>,
) where
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let name = name.to_string();
    let handle = tokio::spawn(async move {
        if let Err(e) = fut.await {
            error!("spawned task: {name} stopped or encountered an error: {:?}", e);
        }
    });

    if let Some(h) = handles {
        h.push(handle);
    }
}
