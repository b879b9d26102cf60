use serde::{Deserialize, Serialize};

use scout_model::{Event, EventKind, LAST_STATUS_RUNNING, PRIVATE_IPV4_ADDRESS, Task};
use scout_observe::Observer;

use crate::errors::DiscoverError;

/// Raw task description as returned by `DescribeTasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_status: Option<String>,
    /// `service:<name>` for tasks started by a service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Network attachment (ENI) of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub details: Vec<KeyValuePair>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl KeyValuePair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

impl TaskDescription {
    /// Running, healthy task with a single ENI carrying `address`.
    pub fn running(arn: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            task_arn: Some(arn.into()),
            health_status: Some("HEALTHY".into()),
            last_status: Some(LAST_STATUS_RUNNING.into()),
            desired_status: Some(LAST_STATUS_RUNNING.into()),
            group: None,
            attachments: vec![Attachment {
                id: None,
                kind: Some("ElasticNetworkInterface".into()),
                details: vec![KeyValuePair::new(PRIVATE_IPV4_ADDRESS, address)],
            }],
        }
    }

    pub fn with_group(mut self, service: &str) -> Self {
        self.group = Some(format!("service:{service}"));
        self
    }

    /// Service name taken from the `service:` group prefix.
    pub fn service(&self) -> Option<&str> {
        self.group.as_deref()?.strip_prefix("service:")
    }

    #[inline]
    pub fn arn(&self) -> &str {
        self.task_arn.as_deref().unwrap_or_default()
    }

    #[inline]
    fn health(&self) -> &str {
        self.health_status.as_deref().unwrap_or_default()
    }

    #[inline]
    fn status(&self) -> &str {
        self.last_status.as_deref().unwrap_or_default()
    }
}

/// Value of the first `privateIPv4Address` detail across all attachments.
///
/// An empty value counts as no address.
pub fn find_address(attachments: &[Attachment]) -> Option<&str> {
    attachments
        .iter()
        .flat_map(|a| a.details.iter())
        .find(|kv| kv.name.as_deref() == Some(PRIVATE_IPV4_ADDRESS))
        .map(|kv| kv.value.as_deref().unwrap_or_default())
        .filter(|v| !v.is_empty())
}

/// Normalise one description, reporting attachment anomalies to `observer`.
pub fn extract_task(desc: &TaskDescription, observer: &dyn Observer) -> Result<Task, DiscoverError> {
    let attachments = desc.attachments.len();
    match attachments {
        0 => observer.on_event(
            &Event::new(EventKind::TaskMissingAttachment)
                .with_task(desc.arn())
                .with_status(desc.health(), desc.status()),
        ),
        1 => {}
        n => observer.on_event(
            &Event::new(EventKind::TaskMultipleAttachments)
                .with_task(desc.arn())
                .with_attachments(n),
        ),
    }

    let Some(address) = find_address(&desc.attachments) else {
        observer.on_event(
            &Event::new(EventKind::TaskMissingAddress)
                .with_task(desc.arn())
                .with_status(desc.health(), desc.status())
                .with_attachments(attachments),
        );
        return Err(DiscoverError::MissingAddress {
            arn: desc.arn().to_string(),
        });
    };

    Ok(Task::new(desc.arn(), address, desc.health(), desc.status()))
}

/// Normalise a batch, dropping tasks without an address.
pub fn extract_tasks(descs: &[TaskDescription], observer: &dyn Observer) -> Vec<Task> {
    descs
        .iter()
        .filter_map(|d| extract_task(d, observer).ok())
        .collect()
}
