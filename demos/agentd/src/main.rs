use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use prometheus::Registry;
use tracing::info;

use scout_api::{CachedLookup, DEFAULT_CACHE_TTL, HttpApi, InventoryLookup};
use scout_discover::{
    DiscoveryConfig, Inventory, StaticInventory, cluster_name,
    env::{env_bool, env_duration_secs, env_opt_string, env_string, env_u64},
};
use scout_observe::{LoggerConfig, init_logger, log_observer};
use scout_peers::{DEFAULT_PEER_PORT, PeerGroup, PeerOptions, PeerProtocol, find_my_addr, find_my_url};

/// Peer pool stand-in that keeps and logs the current membership.
#[derive(Default)]
struct LoggingPool {
    peers: Mutex<Vec<String>>,
}

impl PeerGroup for LoggingPool {
    fn set(&self, peers: Vec<String>) {
        info!(peers = ?peers, "peer pool updated");
        *self.peers.lock().unwrap_or_else(PoisonError::into_inner) = peers;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Logger
    let cfg = LoggerConfig::parse(
        &env_string("LOG_FORMAT", "text"),
        &env_string("LOG_LEVEL", "info"),
    )?;
    init_logger(&cfg)?;

    // 2) Identity
    let cluster = match env_opt_string("CLUSTER") {
        Some(cluster) => cluster,
        None => cluster_name().await?,
    };
    info!(cluster = %cluster, "cluster identified");

    let listen_addr = env_string("LISTEN_ADDR", "0.0.0.0:8080");
    let cache_ttl = env_duration_secs("CACHE_TTL", DEFAULT_CACHE_TTL);
    let agent_service = env_string("ECS_TASK_DISCOVERY_AGENT_SERVICE", "ecs-task-discovery-agent");
    let peers_enable = env_bool("PEERS_ENABLE", true);
    let peer_port = u16::try_from(env_u64("PEER_PORT", u64::from(DEFAULT_PEER_PORT)))?;

    // 3) Inventory
    let inventory: Arc<dyn Inventory> = match env_opt_string("INVENTORY_FILE") {
        Some(path) => Arc::new(StaticInventory::from_file(&path)?),
        None => Arc::new(StaticInventory::new()),
    };
    let registry = Registry::new();

    // 4) Peer discovery among agent replicas (never asks an agent)
    let peers = if peers_enable {
        info!(url = %find_my_url(peer_port).await?, "peer url");

        let mut config = DiscoveryConfig::new(&agent_service, &cluster).without_agent();
        if env_bool("FORCE_SINGLE_TASK", false) {
            config = config.with_force_single_task(find_my_addr().await?);
        }
        let options = PeerOptions::new(
            PeerProtocol::List(Arc::new(LoggingPool::default())),
            &agent_service,
        )
        .with_port(peer_port)
        .with_registry("scout", registry.clone());

        Some(scout_peers::start(options, config, Arc::clone(&inventory), log_observer()).await?)
    } else {
        None
    };

    // 5) Task lookup server
    let lookup = CachedLookup::new(InventoryLookup::new(inventory, &cluster), cache_ttl);
    let router = HttpApi::new(Arc::new(lookup))
        .with_metrics(registry)
        .router();

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!(addr = %listen_addr, cache_ttl = ?cache_ttl, "listening on HTTP");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("shutting down...");
    if let Some(handle) = peers {
        handle.stop();
        tokio::time::timeout(Duration::from_secs(5), handle.join()).await??;
    }

    Ok(())
}
