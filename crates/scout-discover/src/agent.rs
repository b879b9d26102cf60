use std::time::Duration;

use reqwest::Url;
use scout_model::Task;

use crate::errors::DiscoverError;

/// Env var overriding the agent base URL.
pub const ENV_AGENT_URL: &str = "ECS_TASK_DISCOVERY_AGENT_URL";

/// Agent base URL template; `{cluster}` is the namespace the agent lives in.
pub const DEFAULT_AGENT_URL: &str = "http://ecs-task-discovery-agent.{cluster}:8080/tasks";

pub fn default_agent_url(cluster: &str) -> String {
    DEFAULT_AGENT_URL.replace("{cluster}", cluster)
}

/// Pick the agent base URL: explicit value, then env value, then the default.
///
/// Blank values are treated as unset.
pub fn resolve_agent_url(explicit: Option<&str>, env_value: Option<&str>, cluster: &str) -> String {
    explicit
        .filter(|s| !s.trim().is_empty())
        .or(env_value.filter(|s| !s.trim().is_empty()))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| default_agent_url(cluster))
}

/// HTTP client for a discovery agent.
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DiscoverError> {
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim())
            .map_err(|e| DiscoverError::Config(format!("invalid agent url '{raw}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DiscoverError::Config(format!("invalid agent url '{raw}': not a base")));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base_url}/{service}` with `service` escaped as one path segment.
    pub fn url_for(&self, service: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(service);
        }
        url
    }

    /// Ask the agent for the tasks of `service`.
    ///
    /// Anything but a 200 with a JSON task array is an error.
    pub async fn query(&self, service: &str) -> Result<Vec<Task>, DiscoverError> {
        let url = self.url_for(service);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(DiscoverError::AgentStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        serde_json::from_str::<Vec<Task>>(&body)
            .map_err(|source| DiscoverError::AgentDecode {
                url: url.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/tasks")
    }

    #[test]
    fn url_resolution_order() {
        assert_eq!(
            resolve_agent_url(Some("http://explicit/tasks"), Some("http://env/tasks"), "demo"),
            "http://explicit/tasks"
        );
        assert_eq!(
            resolve_agent_url(None, Some("http://env/tasks"), "demo"),
            "http://env/tasks"
        );
        assert_eq!(
            resolve_agent_url(Some(" "), None, "demo"),
            "http://ecs-task-discovery-agent.demo:8080/tasks"
        );
    }

    #[test]
    fn joins_service_to_base() {
        let client = AgentClient::new("http://agent:8080/tasks/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url_for("web").as_str(), "http://agent:8080/tasks/web");

        let client = AgentClient::new("http://agent:8080/tasks", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url_for("web").as_str(), "http://agent:8080/tasks/web");
    }

    #[test]
    fn service_name_stays_one_path_segment() {
        let client = AgentClient::new("http://agent:8080/tasks", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url_for("a/b?x=1#y").as_str(),
            "http://agent:8080/tasks/a%2Fb%3Fx=1%23y"
        );
    }

    #[test]
    fn malformed_base_url_is_a_config_error() {
        assert!(matches!(
            AgentClient::new("not a url", Duration::from_secs(1)),
            Err(DiscoverError::Config(_))
        ));
        assert!(matches!(
            AgentClient::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(DiscoverError::Config(_))
        ));
    }

    #[tokio::test]
    async fn decodes_task_list() {
        let router = Router::new().route(
            "/tasks/{service}",
            get(|Path(service): Path<String>| async move {
                Json(vec![Task::new(format!("arn:{service}"), "10.0.0.1", "HEALTHY", "RUNNING")])
            }),
        );
        let client = AgentClient::new(serve(router).await, Duration::from_secs(5)).unwrap();

        let tasks = client.query("web").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].arn, "arn:web");
        assert_eq!(tasks[0].address, "10.0.0.1");
    }

    #[tokio::test]
    async fn escaped_service_reaches_the_route_intact() {
        let router = Router::new().route(
            "/tasks/{service}",
            get(|Path(service): Path<String>| async move {
                Json(vec![Task::new(format!("arn:{service}"), "10.0.0.1", "", "RUNNING")])
            }),
        );
        let client = AgentClient::new(serve(router).await, Duration::from_secs(5)).unwrap();

        let tasks = client.query("team/web").await.unwrap();
        assert_eq!(tasks[0].arn, "arn:team/web");
    }

    #[tokio::test]
    async fn non_200_is_an_error() {
        let router = Router::new().route(
            "/tasks/{service}",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = AgentClient::new(serve(router).await, Duration::from_secs(5)).unwrap();

        match client.query("web").await {
            Err(DiscoverError::AgentStatus { status, body, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_json_is_an_error() {
        let router = Router::new().route("/tasks/{service}", get(|| async { "{\"not\":\"a list\"}" }));
        let client = AgentClient::new(serve(router).await, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            client.query("web").await,
            Err(DiscoverError::AgentDecode { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_agent_is_an_error() {
        let client = AgentClient::new("http://127.0.0.1:1/tasks", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            client.query("web").await,
            Err(DiscoverError::AgentRequest(_))
        ));
    }
}
