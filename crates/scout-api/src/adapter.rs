use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use scout_discover::{Inventory, list_running_tasks};
use scout_model::Task;
use scout_observe::{Observer, log_observer};
use tracing::info;

use crate::{error::ApiError, handler::TaskLookup};

/// [`TaskLookup`] that walks the inventory on every call.
pub struct InventoryLookup {
    inventory: Arc<dyn Inventory>,
    cluster: String,
    observer: Arc<dyn Observer>,
}

impl InventoryLookup {
    pub fn new(inventory: Arc<dyn Inventory>, cluster: impl Into<String>) -> Self {
        Self {
            inventory,
            cluster: cluster.into(),
            observer: log_observer(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    #[inline]
    pub fn cluster(&self) -> &str {
        &self.cluster
    }
}

#[async_trait]
impl TaskLookup for InventoryLookup {
    async fn find_tasks(&self, service: &str) -> Result<Vec<Task>, ApiError> {
        if service.trim().is_empty() {
            return Err(ApiError::InvalidRequest("service name is empty".into()));
        }

        let begin = Instant::now();
        let tasks = list_running_tasks(
            self.inventory.as_ref(),
            &self.cluster,
            service,
            self.observer.as_ref(),
        )
        .await?;

        info!(
            cluster = %self.cluster,
            service,
            tasks = tasks.len(),
            elapsed_ms = begin.elapsed().as_millis() as u64,
            "inventory lookup"
        );
        Ok(tasks)
    }
}
