//! Cache peer-set propagation on top of task discovery.
//!
//! [`PeerAdapter`] is a [`TaskSink`](scout_discover::TaskSink) that turns each
//! delivered snapshot into a cache peer membership update, in either the
//! address-list or the structured peer-info shape.

mod adapter;
pub use adapter::{DEFAULT_PEER_PORT, PeerAdapter, PeerOptions, start};

mod error;
pub use error::{PeerError, SelfAddressError};

mod metrics;
pub use metrics::PeerMetrics;

mod protocol;
pub use protocol::{PeerGroup, PeerProtocol, PeerSet};

mod resolve;
pub use resolve::{find_my_addr, find_my_url, pick_self_addr};
