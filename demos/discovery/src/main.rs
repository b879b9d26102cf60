use std::sync::Arc;

use tracing::info;

use scout_discover::{
    Discovery, DiscoveryConfig, Inventory, StaticInventory, cluster_name,
    env::{env_opt_string, env_string},
    sink_fn,
};
use scout_model::Snapshot;
use scout_observe::{LoggerConfig, init_logger, log_observer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Logger
    let cfg = LoggerConfig::parse(
        &env_string("LOG_FORMAT", "text"),
        &env_string("LOG_LEVEL", "info"),
    )?;
    init_logger(&cfg)?;
    info!("logger initialized");

    // 2) Discovery configuration
    let mut config = DiscoveryConfig::from_env();
    if config.cluster.is_empty() {
        config.cluster = cluster_name().await?;
    }
    info!(
        cluster = %config.cluster,
        service = %config.service_name,
        interval = ?config.effective_interval(),
        "discovery configured"
    );

    // 3) Inventory
    let inventory: Arc<dyn Inventory> = match env_opt_string("INVENTORY_FILE") {
        Some(path) => Arc::new(StaticInventory::from_file(&path)?),
        None => Arc::new(StaticInventory::new()),
    };

    // 4) Sink: print every delivered snapshot
    let sink = sink_fn(|snapshot: &Snapshot| {
        let total = snapshot.len();
        for (i, task) in snapshot.iter().enumerate() {
            info!(
                addr = %task.address,
                health_status = %task.health_status,
                last_status = %task.last_status,
                "task {}/{}",
                i + 1,
                total
            );
        }
    });

    // 5) Run until Ctrl+C
    let handle = Discovery::builder(config)
        .inventory(inventory)
        .sink(sink)
        .observer(log_observer())
        .build()?
        .spawn();
    info!("discovery running, press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down...");
    handle.stop();
    handle.join().await?;

    Ok(())
}
