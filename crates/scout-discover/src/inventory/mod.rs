mod describe;
pub use describe::{Attachment, KeyValuePair, TaskDescription, extract_task, extract_tasks, find_address};

mod memory;
pub use memory::StaticInventory;

use async_trait::async_trait;
use scout_model::{Event, EventKind, Task};
use scout_observe::Observer;

use crate::errors::DiscoverError;

/// Largest page the inventory API accepts for task listings.
pub const MAX_RESULTS: u32 = 100;

/// Desired lifecycle status a listing is constrained to.
///
/// Discovery only ever lists running tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesiredStatus {
    #[default]
    Running,
}

impl DesiredStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredStatus::Running => "RUNNING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTasksRequest {
    pub cluster: String,
    pub service: String,
    pub max_results: u32,
    pub desired_status: DesiredStatus,
    /// Opaque continuation token from the previous page.
    pub next_token: Option<String>,
}

impl ListTasksRequest {
    /// First-page request for running tasks of `service`.
    pub fn running(cluster: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            service: service.into(),
            max_results: MAX_RESULTS,
            desired_status: DesiredStatus::Running,
            next_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksPage {
    pub task_arns: Vec<String>,
    /// `None` on the last page.
    pub next_token: Option<String>,
}

/// Cluster inventory API (ECS `ListTasks` / `DescribeTasks`).
#[async_trait]
pub trait Inventory: Send + Sync + 'static {
    async fn list_tasks(&self, request: &ListTasksRequest) -> Result<ListTasksPage, DiscoverError>;

    async fn describe_tasks(
        &self,
        cluster: &str,
        task_arns: &[String],
    ) -> Result<Vec<TaskDescription>, DiscoverError>;
}

/// Every running task of `service` that has an address.
///
/// Walks all listing pages and describes each page in one batch. Any API
/// error aborts the whole walk; addressless tasks are only dropped.
pub async fn list_running_tasks(
    inventory: &dyn Inventory,
    cluster: &str,
    service: &str,
    observer: &dyn Observer,
) -> Result<Vec<Task>, DiscoverError> {
    let mut request = ListTasksRequest::running(cluster, service);
    let mut tasks = Vec::new();

    loop {
        let page = inventory.list_tasks(&request).await?;
        observer.on_event(
            &Event::new(EventKind::InventoryPage)
                .with_cluster(cluster)
                .with_service(service)
                .with_count(page.task_arns.len()),
        );

        if !page.task_arns.is_empty() {
            let descriptions = inventory.describe_tasks(cluster, &page.task_arns).await?;
            tasks.extend(extract_tasks(&descriptions, observer));
        }

        match page.next_token {
            Some(token) => request.next_token = Some(token),
            None => break,
        }
    }
    Ok(tasks)
}
