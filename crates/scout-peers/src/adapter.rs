use std::sync::Arc;

use async_trait::async_trait;
use prometheus::Registry;

use scout_discover::{Discovery, DiscoveryConfig, DiscoveryHandle, Inventory, TaskSink};
use scout_model::{Event, EventKind, PeerInfo, Snapshot};
use scout_observe::Observer;

use crate::{
    error::PeerError,
    metrics::PeerMetrics,
    protocol::PeerProtocol,
    resolve::{find_my_addr, host_port},
};

/// Cache peering port used when none is configured.
pub const DEFAULT_PEER_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct PeerOptions {
    /// Where peer updates go. Required.
    pub protocol: Option<PeerProtocol>,
    /// Port the cache peering server listens on, on every task.
    pub port: u16,
    /// URL scheme for the address-list shape.
    pub scheme: String,
    /// Service whose tasks are the peers (for logs).
    pub service_name: String,
    /// Own address; resolved from the hostname when `None`.
    pub self_addr: Option<String>,
    pub metrics_namespace: String,
    /// Registry for peer gauges; metrics are off when `None`.
    pub registry: Option<Registry>,
}

impl Default for PeerOptions {
    fn default() -> Self {
        Self {
            protocol: None,
            port: DEFAULT_PEER_PORT,
            scheme: "http".to_string(),
            service_name: String::new(),
            self_addr: None,
            metrics_namespace: String::new(),
            registry: None,
        }
    }
}

impl PeerOptions {
    pub fn new(protocol: PeerProtocol, service_name: impl Into<String>) -> Self {
        Self {
            protocol: Some(protocol),
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_self_addr(mut self, addr: impl Into<String>) -> Self {
        self.self_addr = Some(addr.into());
        self
    }

    pub fn with_registry(mut self, namespace: impl Into<String>, registry: Registry) -> Self {
        self.metrics_namespace = namespace.into();
        self.registry = Some(registry);
        self
    }
}

/// Maps delivered snapshots onto a cache peer set.
pub struct PeerAdapter {
    protocol: PeerProtocol,
    port: u16,
    scheme: String,
    service_name: String,
    self_addr: String,
    metrics: PeerMetrics,
    observer: Arc<dyn Observer>,
}

impl PeerAdapter {
    /// Validate options and settle the self address once.
    pub async fn new(options: PeerOptions, observer: Arc<dyn Observer>) -> Result<Self, PeerError> {
        let protocol = options
            .protocol
            .ok_or_else(|| PeerError::Config("one of peer group or peer set is required".into()))?;
        if options.port == 0 {
            return Err(PeerError::Config("peer port must not be zero".into()));
        }

        let self_addr = match options.self_addr {
            Some(addr) if !addr.trim().is_empty() => addr.trim().to_string(),
            _ => find_my_addr().await?,
        };

        let metrics = match &options.registry {
            Some(registry) => PeerMetrics::register(&options.metrics_namespace, registry)?,
            None => PeerMetrics::disabled(),
        };

        Ok(Self {
            protocol,
            port: options.port,
            scheme: options.scheme,
            service_name: options.service_name,
            self_addr,
            metrics,
            observer,
        })
    }

    #[inline]
    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    /// `scheme://address:port` for every task.
    pub fn peer_urls(&self, snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .iter()
            .map(|t| format!("{}://{}", self.scheme, host_port(&t.address, self.port)))
            .collect()
    }

    /// `address:port` per task, flagging the one whose address is ours.
    pub fn peer_infos(&self, snapshot: &Snapshot) -> Vec<PeerInfo> {
        snapshot
            .iter()
            .map(|t| PeerInfo::new(host_port(&t.address, self.port), t.address == self.self_addr))
            .collect()
    }

    fn announce(&self, snapshot: &Snapshot, peers: &[PeerInfo]) {
        let total = snapshot.len();
        for (i, (task, peer)) in snapshot.iter().zip(peers).enumerate() {
            self.observer.on_event(
                &Event::new(EventKind::PeerListed)
                    .with_index(i + 1)
                    .with_count(total)
                    .with_service(&self.service_name)
                    .with_task(&task.arn)
                    .with_address(&peer.address)
                    .with_status(&task.health_status, &task.last_status)
                    .with_is_self(peer.is_self),
            );
        }
    }

    fn updated(&self, peers: usize) {
        self.observer.on_event(
            &Event::new(EventKind::PeersUpdated)
                .with_service(&self.service_name)
                .with_count(peers),
        );
    }
}

#[async_trait]
impl TaskSink for PeerAdapter {
    async fn deliver(&self, snapshot: &Snapshot) {
        if snapshot.is_empty() {
            return;
        }
        self.metrics.update(snapshot.len());

        match &self.protocol {
            PeerProtocol::List(group) => {
                let urls = self.peer_urls(snapshot);
                let peers = self.peer_infos(snapshot);
                self.announce(snapshot, &peers);
                group.set(urls);
                self.updated(snapshot.len());
            }
            PeerProtocol::Structured(set) => {
                let peers = self.peer_infos(snapshot);
                self.announce(snapshot, &peers);
                match set.set_peers(peers).await {
                    Ok(()) => self.updated(snapshot.len()),
                    Err(e) => self.observer.on_event(
                        &Event::new(EventKind::PeersRejected)
                            .with_service(&self.service_name)
                            .with_reason(e.to_string()),
                    ),
                }
            }
        }
    }
}

/// Build a [`PeerAdapter`] and start discovery feeding it.
pub async fn start(
    options: PeerOptions,
    config: DiscoveryConfig,
    inventory: Arc<dyn Inventory>,
    observer: Arc<dyn Observer>,
) -> Result<DiscoveryHandle, PeerError> {
    let adapter = PeerAdapter::new(options, Arc::clone(&observer)).await?;
    let discovery = Discovery::builder(config)
        .inventory(inventory)
        .sink(Arc::new(adapter))
        .observer(observer)
        .build()?;
    Ok(discovery.spawn())
}
