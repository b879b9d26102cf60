mod kind;
pub use kind::EventKind;

use std::time::Duration;

/// Observation emitted by discovery and peer propagation.
///
/// Every field except `kind` is optional; emitters fill in what is relevant
/// for the kind and observers read through accessors with defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub service: Option<String>,
    pub cluster: Option<String>,
    /// Task ARN.
    pub task: Option<String>,
    pub address: Option<String>,
    pub health_status: Option<String>,
    pub last_status: Option<String>,
    pub url: Option<String>,
    /// Number of tasks or peers, depending on the kind.
    pub count: Option<usize>,
    /// Position (1-based) of the entry within a listed batch.
    pub index: Option<usize>,
    pub attachments: Option<usize>,
    pub changed: Option<bool>,
    pub is_self: Option<bool>,
    pub forced_address: Option<String>,
    pub agent_disabled: Option<bool>,
    pub elapsed_ms: Option<u64>,
    pub interval_ms: Option<u64>,
    pub reason: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            service: None,
            cluster: None,
            task: None,
            address: None,
            health_status: None,
            last_status: None,
            url: None,
            count: None,
            index: None,
            attachments: None,
            changed: None,
            is_self: None,
            forced_address: None,
            agent_disabled: None,
            elapsed_ms: None,
            interval_ms: None,
            reason: None,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn with_task(mut self, arn: impl Into<String>) -> Self {
        self.task = Some(arn.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_status(
        mut self,
        health_status: impl Into<String>,
        last_status: impl Into<String>,
    ) -> Self {
        self.health_status = Some(health_status.into());
        self.last_status = Some(last_status.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_attachments(mut self, attachments: usize) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn with_changed(mut self, changed: bool) -> Self {
        self.changed = Some(changed);
        self
    }

    pub fn with_is_self(mut self, is_self: bool) -> Self {
        self.is_self = Some(is_self);
        self
    }

    pub fn with_source_flags(mut self, forced_address: Option<&str>, agent_disabled: bool) -> Self {
        self.forced_address = forced_address.map(str::to_string);
        self.agent_disabled = Some(agent_disabled);
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = Some(elapsed.as_millis() as u64);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_ms = Some(interval.as_millis() as u64);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_only_requested_fields() {
        let ev = Event::new(EventKind::AgentQueryFailed)
            .with_service("svc")
            .with_url("http://agent/tasks/svc")
            .with_reason("connection refused");

        assert_eq!(ev.kind, EventKind::AgentQueryFailed);
        assert_eq!(ev.service.as_deref(), Some("svc"));
        assert_eq!(ev.reason.as_deref(), Some("connection refused"));
        assert!(ev.count.is_none());
        assert!(ev.cluster.is_none());
    }

    #[test]
    fn durations_are_recorded_in_millis() {
        let ev = Event::new(EventKind::CycleCompleted)
            .with_elapsed(Duration::from_millis(1500))
            .with_interval(Duration::from_secs(20));
        assert_eq!(ev.elapsed_ms, Some(1500));
        assert_eq!(ev.interval_ms, Some(20_000));
    }
}
