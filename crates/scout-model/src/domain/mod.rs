mod task;
pub use task::Task;

mod snapshot;
pub use snapshot::Snapshot;

mod peer_info;
pub use peer_info::PeerInfo;

mod constants;
pub use constants::{
    HEALTH_UNKNOWN, LAST_STATUS_RUNNING, MOCKED_SINGLE_TASK_ARN, PRIVATE_IPV4_ADDRESS,
};
