//! ECS task discovery.
//!
//! [`Discovery`] polls a service's running tasks (through a shared agent when
//! one is reachable, otherwise straight from the [`Inventory`]) and hands every
//! changed, non-empty [`Snapshot`](scout_model::Snapshot) to a [`TaskSink`].

mod agent;
pub use agent::{AgentClient, DEFAULT_AGENT_URL, ENV_AGENT_URL, default_agent_url, resolve_agent_url};

mod cluster;
pub use cluster::{ENV_METADATA_URI, cluster_name, find_cluster_arn, short_cluster_name};

mod config;
pub use config::{DEFAULT_AGENT_TIMEOUT, DEFAULT_INTERVAL, DiscoveryConfig};

pub mod env;

mod errors;
pub use errors::DiscoverError;

mod inventory;
pub use inventory::{
    Attachment, DesiredStatus, Inventory, KeyValuePair, ListTasksPage, ListTasksRequest,
    MAX_RESULTS, StaticInventory, TaskDescription, extract_task, extract_tasks, find_address,
    list_running_tasks,
};

mod sink;
pub use sink::{FnSink, TaskSink, sink_fn};

mod tasks;
pub use tasks::{Discovery, DiscoveryBuilder, DiscoveryHandle, PollOutcome};
