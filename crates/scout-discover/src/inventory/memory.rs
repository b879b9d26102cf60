use std::{
    collections::HashMap,
    path::Path,
    sync::{PoisonError, RwLock},
};

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    errors::DiscoverError,
    inventory::{DesiredStatus, Inventory, ListTasksPage, ListTasksRequest, describe::TaskDescription},
};

/// In-memory inventory keyed by service name.
///
/// Paginates exactly like the real API (page size from the request, numeric
/// continuation token), which makes it usable both in tests and for running
/// the agent against a captured `describe-tasks` dump.
#[derive(Debug, Default)]
pub struct StaticInventory {
    services: RwLock<HashMap<String, Vec<TaskDescription>>>,
}

#[derive(Deserialize)]
struct DescribeTasksOutput {
    #[serde(default)]
    tasks: Vec<TaskDescription>,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(self, service: impl Into<String>, tasks: Vec<TaskDescription>) -> Self {
        self.replace(service, tasks);
        self
    }

    /// Load `{"tasks": [...]}` as printed by `aws ecs describe-tasks`.
    ///
    /// Tasks are grouped by their `service:` group; tasks without one are skipped.
    pub fn from_json(json: &str) -> Result<Self, DiscoverError> {
        let output: DescribeTasksOutput = serde_json::from_str(json)
            .map_err(|e| DiscoverError::Inventory(format!("invalid describe-tasks json: {e}")))?;

        let mut services: HashMap<String, Vec<TaskDescription>> = HashMap::new();
        for task in output.tasks {
            if let Some(service) = task.service().map(str::to_string) {
                services.entry(service).or_default().push(task);
            }
        }
        Ok(Self {
            services: RwLock::new(services),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DiscoverError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DiscoverError::Inventory(format!("read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Swap the task set of one service.
    pub fn replace(&self, service: impl Into<String>, tasks: Vec<TaskDescription>) {
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.into(), tasks);
    }

    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn matching(&self, service: &str, status: DesiredStatus) -> Vec<TaskDescription> {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        services
            .get(service)
            .map(|tasks| {
                tasks
                    .iter()
                    .filter(|t| {
                        t.desired_status
                            .as_deref()
                            .is_none_or(|s| s == status.as_str())
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Inventory for StaticInventory {
    async fn list_tasks(&self, request: &ListTasksRequest) -> Result<ListTasksPage, DiscoverError> {
        let tasks = self.matching(&request.service, request.desired_status);

        let start = match &request.next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| DiscoverError::Inventory(format!("invalid next token: {token}")))?,
        };
        let size = request.max_results.max(1) as usize;
        let end = (start + size).min(tasks.len());

        let task_arns = tasks
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|t| t.arn().to_string())
            .collect();
        let next_token = (end < tasks.len()).then(|| end.to_string());

        Ok(ListTasksPage {
            task_arns,
            next_token,
        })
    }

    async fn describe_tasks(
        &self,
        _cluster: &str,
        task_arns: &[String],
    ) -> Result<Vec<TaskDescription>, DiscoverError> {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        Ok(task_arns
            .iter()
            .filter_map(|arn| {
                services
                    .values()
                    .flat_map(|tasks| tasks.iter())
                    .find(|t| t.arn() == arn)
                    .cloned()
            })
            .collect())
    }
}
