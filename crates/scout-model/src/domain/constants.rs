/// Attachment detail key that carries the task private address.
pub const PRIVATE_IPV4_ADDRESS: &str = "privateIPv4Address";

/// Placeholder ARN used for a forced single task.
pub const MOCKED_SINGLE_TASK_ARN: &str = "mockedSingleTaskARN";

/// Health status reported when the platform has no health information.
pub const HEALTH_UNKNOWN: &str = "UNKNOWN";

/// Lifecycle status of a running task.
pub const LAST_STATUS_RUNNING: &str = "RUNNING";
