use serde::{Deserialize, Serialize};

use crate::domain::constants::{
    HEALTH_UNKNOWN, LAST_STATUS_RUNNING, MOCKED_SINGLE_TASK_ARN,
};

/// One discovered service instance.
///
/// `health_status` and `last_status` are copied verbatim from the inventory and
/// are informational only: discovery never filters on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Inventory-assigned task ARN.
    pub arn: String,
    /// Routable private address (no port).
    #[serde(default)]
    pub address: String,
    /// `HEALTHY`, `UNHEALTHY`, `UNKNOWN`, ...
    #[serde(default)]
    pub health_status: String,
    /// `RUNNING`, `PENDING`, `STOPPED`, ...
    #[serde(default)]
    pub last_status: String,
}

impl Task {
    pub fn new(
        arn: impl Into<String>,
        address: impl Into<String>,
        health_status: impl Into<String>,
        last_status: impl Into<String>,
    ) -> Self {
        Self {
            arn: arn.into(),
            address: address.into(),
            health_status: health_status.into(),
            last_status: last_status.into(),
        }
    }

    /// Synthetic task used when discovery is forced to a single local address.
    pub fn forced_single(address: impl Into<String>) -> Self {
        Self::new(
            MOCKED_SINGLE_TASK_ARN,
            address,
            HEALTH_UNKNOWN,
            LAST_STATUS_RUNNING,
        )
    }

    #[inline]
    pub fn has_address(&self) -> bool {
        !self.address.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_snake_case_keys() {
        let task = Task::new("arn:task/1", "10.0.0.1", "HEALTHY", "RUNNING");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["arn"], "arn:task/1");
        assert_eq!(json["address"], "10.0.0.1");
        assert_eq!(json["health_status"], "HEALTHY");
        assert_eq!(json["last_status"], "RUNNING");
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let task: Task = serde_json::from_str(r#"{"arn":"arn:task/2"}"#).unwrap();
        assert_eq!(task.arn, "arn:task/2");
        assert!(!task.has_address());
        assert!(task.health_status.is_empty());
    }

    #[test]
    fn forced_single_uses_placeholders() {
        let task = Task::forced_single("192.168.0.7");
        assert_eq!(task.arn, "mockedSingleTaskARN");
        assert_eq!(task.address, "192.168.0.7");
        assert_eq!(task.health_status, "UNKNOWN");
        assert_eq!(task.last_status, "RUNNING");
    }

    #[test]
    fn blank_address_is_not_an_address() {
        let task = Task::new("arn", "   ", "", "");
        assert!(!task.has_address());
    }
}
