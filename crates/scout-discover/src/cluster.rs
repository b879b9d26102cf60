use serde::Deserialize;

use crate::errors::DiscoverError;

/// Env var holding the container metadata endpoint (v4).
pub const ENV_METADATA_URI: &str = "ECS_CONTAINER_METADATA_URI_V4";

#[derive(Deserialize)]
struct TaskMetadata {
    #[serde(rename = "Cluster")]
    cluster: String,
}

/// Cluster ARN from `{metadata_uri}/task`.
pub async fn find_cluster_arn(metadata_uri: &str) -> Result<String, DiscoverError> {
    let uri = format!("{}/task", metadata_uri.trim_end_matches('/'));

    let response = reqwest::get(&uri)
        .await
        .map_err(|e| DiscoverError::Metadata(format!("uri:{uri} error:{e}")))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DiscoverError::Metadata(format!("status:{status} uri:{uri} body_error:{e}")))?;

    if status != reqwest::StatusCode::OK {
        return Err(DiscoverError::Metadata(format!(
            "bad_status:{} uri:{uri} body:{body}",
            status.as_u16()
        )));
    }

    let metadata: TaskMetadata = serde_json::from_str(&body)
        .map_err(|e| DiscoverError::Metadata(format!("status:{status} uri:{uri} json_error:{e}")))?;
    Ok(metadata.cluster)
}

/// Text after the last `/` of a cluster ARN (the whole input if there is none).
pub fn short_cluster_name(cluster_arn: &str) -> &str {
    cluster_arn
        .rsplit_once('/')
        .map_or(cluster_arn, |(_, name)| name)
}

/// Short name of the cluster this container runs in.
///
/// Reads [`ENV_METADATA_URI`]; the caller should treat an error as fatal.
pub async fn cluster_name() -> Result<String, DiscoverError> {
    let uri = std::env::var(ENV_METADATA_URI).unwrap_or_default();
    if uri.trim().is_empty() {
        return Err(DiscoverError::Metadata(format!("env var '{ENV_METADATA_URI}' is empty")));
    }
    let arn = find_cluster_arn(&uri).await?;
    Ok(short_cluster_name(&arn).to_string())
}
