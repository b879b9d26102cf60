use std::time::Duration;

use crate::{
    env::{env_bool, env_duration_secs, env_opt_string, env_string},
    errors::DiscoverError,
};

/// Poll interval used when none (or zero) is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(20);

/// Per-request timeout for agent queries.
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// ECS service whose tasks are discovered. Required.
    pub service_name: String,
    /// Short cluster name; also used to build the default agent URL.
    pub cluster: String,
    /// Delay between poll cycles; zero means [`DEFAULT_INTERVAL`].
    pub interval: Duration,
    /// Skip all network calls and report exactly one task at this address.
    ///
    /// Meant for running an application locally.
    pub force_single_task: Option<String>,
    /// Never ask the discovery agent (the agent itself sets this).
    pub disable_agent_query: bool,
    /// Explicit agent base URL; takes precedence over the env var.
    pub agent_url: Option<String>,
    pub agent_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            cluster: String::new(),
            interval: DEFAULT_INTERVAL,
            force_single_task: None,
            disable_agent_query: false,
            agent_url: None,
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }
}

impl DiscoveryConfig {
    pub fn new(service_name: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            cluster: cluster.into(),
            ..Default::default()
        }
    }

    /// Read `SERVICE`, `CLUSTER`, `INTERVAL`, `FORCE_SINGLE_TASK`,
    /// `DISABLE_AGENT_QUERY` and `AGENT_TIMEOUT`.
    ///
    /// The agent URL env var is consulted later, when the engine is built.
    pub fn from_env() -> Self {
        Self {
            service_name: env_string("SERVICE", "demo"),
            cluster: env_string("CLUSTER", ""),
            interval: env_duration_secs("INTERVAL", DEFAULT_INTERVAL),
            force_single_task: env_opt_string("FORCE_SINGLE_TASK"),
            disable_agent_query: env_bool("DISABLE_AGENT_QUERY", false),
            agent_url: None,
            agent_timeout: env_duration_secs("AGENT_TIMEOUT", DEFAULT_AGENT_TIMEOUT),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_force_single_task(mut self, address: impl Into<String>) -> Self {
        self.force_single_task = Some(address.into());
        self
    }

    pub fn with_agent_url(mut self, url: impl Into<String>) -> Self {
        self.agent_url = Some(url.into());
        self
    }

    pub fn without_agent(mut self) -> Self {
        self.disable_agent_query = true;
        self
    }

    pub fn validate(&self) -> Result<(), DiscoverError> {
        if self.service_name.trim().is_empty() {
            return Err(DiscoverError::Config("option service_name is required".into()));
        }
        if self.cluster.trim().is_empty() {
            return Err(DiscoverError::Config("option cluster is required".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            self.interval
        }
    }
}
