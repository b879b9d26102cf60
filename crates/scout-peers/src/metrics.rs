use prometheus::{IntCounter, IntGauge, Opts, Registry};

use crate::error::PeerError;

const SUBSYSTEM: &str = "peer_discovery";

/// Peer propagation gauges; no-ops unless registered.
#[derive(Clone, Default)]
pub struct PeerMetrics {
    peers: Option<IntGauge>,
    events: Option<IntCounter>,
}

impl PeerMetrics {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Register `<namespace>_peer_discovery_{peers,events}` in `registry`.
    pub fn register(namespace: &str, registry: &Registry) -> Result<Self, PeerError> {
        let peers = IntGauge::with_opts(
            Opts::new("peers", "Number of peers discovered.")
                .namespace(namespace)
                .subsystem(SUBSYSTEM),
        )?;
        let events = IntCounter::with_opts(
            Opts::new("events", "Number of peer set updates received.")
                .namespace(namespace)
                .subsystem(SUBSYSTEM),
        )?;
        registry.register(Box::new(peers.clone()))?;
        registry.register(Box::new(events.clone()))?;

        Ok(Self {
            peers: Some(peers),
            events: Some(events),
        })
    }

    pub fn update(&self, peers: usize) {
        if let Some(events) = &self.events {
            events.inc();
        }
        if let Some(gauge) = &self.peers {
            gauge.set(peers as i64);
        }
    }
}
