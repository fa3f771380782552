use std::sync::Arc;

use seed_watcher::DiscovererRegistry;
use seed_watcher::EntityKind;
use seed_watcher::Error;
use seed_watcher::GenericStore;
use seed_watcher::LogConfig;
use seed_watcher::MemoryBackend;
use seed_watcher::MemoryDiscoverer;
use seed_watcher::Result;
use seed_watcher::SeedConfig;
use seed_watcher::Store;
use seed_watcher::Watcher;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let settings = SeedConfig::new()?.validate()?;

    // Initializing Logs
    init_observability(&settings.log)?;
    info!("starting with {:?}", settings);

    let backend = Arc::new(MemoryBackend::new());
    if let Some(seed_file) = &settings.store.seed_file {
        backend.load_seed_file(seed_file).await?;
    }

    let mut stores: Vec<Arc<dyn Store>> = Vec::with_capacity(settings.store.kinds.len());
    for kind in &settings.store.kinds {
        let kind: EntityKind = kind.parse()?;
        stores.push(Arc::new(GenericStore::new(
            &settings.store.prefix,
            kind,
            backend.clone(),
            settings.store.feed_buffer_size,
        )));
    }

    let mut registry = DiscovererRegistry::new();
    for discovery_type in &settings.discovery.types {
        registry.register(discovery_type.clone(), Arc::new(MemoryDiscoverer::new(discovery_type.clone())));
    }

    let watcher = Watcher::new(stores, Arc::new(registry), &settings.watcher);
    info!(permits = watcher.permits(), "reconciling stores");
    if let Err(e) = watcher.init().await {
        error!("initial reconciliation failed: {:?}", e);
        return Err(e);
    }

    watcher.watch();
    info!("Watcher started. Waiting for CTRL+C signal...");

    if let Err(e) = wait_for_shutdown().await {
        error!("Failed to listen for shutdown signal: {:?}", e);
    }

    watcher.close();
    watcher.join().await;
    info!("Shutdown completed");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }
    Ok(())
}

fn init_observability(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level));
    let filter = filter.map_err(|e| Error::Fatal(format!("invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Fatal(format!("install tracing subscriber: {e}")))
}
