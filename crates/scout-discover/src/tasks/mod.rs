mod poll;
pub use poll::{Discovery, DiscoveryBuilder, DiscoveryHandle, PollOutcome};
