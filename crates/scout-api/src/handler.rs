use async_trait::async_trait;
use scout_model::Task;

use crate::error::ApiError;

/// Backend answering task lookups by service name.
///
/// Use [`InventoryLookup`](crate::InventoryLookup) directly, wrap it in a
/// [`CachedLookup`](crate::CachedLookup), or implement a custom source.
#[async_trait]
pub trait TaskLookup: Send + Sync + 'static {
    /// Running tasks of `service` that have an address.
    async fn find_tasks(&self, service: &str) -> Result<Vec<Task>, ApiError>;
}
