use std::sync::Arc;

use async_trait::async_trait;
use scout_model::PeerInfo;

use crate::error::PeerError;

/// Cache pool that takes the full peer list as URLs (`http://10.0.0.1:5000`).
pub trait PeerGroup: Send + Sync + 'static {
    /// Replace the whole membership.
    fn set(&self, peers: Vec<String>);
}

/// Cache daemon that takes structured peers and may refuse the update.
#[async_trait]
pub trait PeerSet: Send + Sync + 'static {
    async fn set_peers(&self, peers: Vec<PeerInfo>) -> Result<(), PeerError>;
}

/// Peer membership shape, chosen once when the adapter is built.
#[derive(Clone)]
pub enum PeerProtocol {
    List(Arc<dyn PeerGroup>),
    Structured(Arc<dyn PeerSet>),
}

impl PeerProtocol {
    pub fn name(&self) -> &'static str {
        match self {
            PeerProtocol::List(_) => "list",
            PeerProtocol::Structured(_) => "structured",
        }
    }
}

impl std::fmt::Debug for PeerProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PeerProtocol").field(&self.name()).finish()
    }
}
