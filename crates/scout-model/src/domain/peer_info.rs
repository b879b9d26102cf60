use serde::{Deserialize, Serialize};

/// One member of a cache peer set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerInfo {
    /// `address:port` of the peer's cache peering server.
    pub address: String,
    /// `true` for the entry that refers to the current process.
    pub is_self: bool,
}

impl PeerInfo {
    pub fn new(address: impl Into<String>, is_self: bool) -> Self {
        Self {
            address: address.into(),
            is_self,
        }
    }
}
