use std::net::IpAddr;

use thiserror::Error;

use scout_discover::DiscoverError;

#[derive(Debug, Error)]
pub enum SelfAddressError {
    #[error("hostname lookup failed: {0}")]
    Hostname(#[source] std::io::Error),

    #[error("resolve hostname '{host}': {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hostname '{host}': no address found")]
    NotFound { host: String },

    #[error("hostname '{host}': found multiple addresses: {all:?}")]
    Ambiguous {
        host: String,
        /// First resolved address, usable as a best effort.
        addr: String,
        all: Vec<IpAddr>,
    },
}

impl SelfAddressError {
    /// Address that can still be used despite the error, if any.
    pub fn best_effort(&self) -> Option<&str> {
        match self {
            SelfAddressError::Ambiguous { addr, .. } => Some(addr),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("self address: {0}")]
    SelfAddress(#[from] SelfAddressError),

    #[error("peer set rejected: {0}")]
    Rejected(String),

    #[error("metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error(transparent)]
    Discover(#[from] DiscoverError),
}
