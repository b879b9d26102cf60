use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("inventory query failed: {0}")]
    Inventory(String),

    #[error("agent request failed: {0}")]
    AgentRequest(#[from] reqwest::Error),

    #[error("agent returned bad status {status} from {url}: {body}")]
    AgentStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("agent returned invalid json from {url}: {source}")]
    AgentDecode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("task {arn} has no privateIPv4Address")]
    MissingAddress { arn: String },

    #[error("container metadata lookup failed: {0}")]
    Metadata(String),

    #[error("discovery loop terminated abnormally: {0}")]
    Join(String),
}
