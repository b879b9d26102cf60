use std::sync::Arc;

use async_trait::async_trait;
use scout_model::Snapshot;

/// Receiver of changed task snapshots.
///
/// Awaited inside the poll loop: the next cycle starts only after `deliver`
/// returns, so a slow sink delays polling.
#[async_trait]
pub trait TaskSink: Send + Sync + 'static {
    async fn deliver(&self, snapshot: &Snapshot);
}

/// Adapter turning a plain closure into a [`TaskSink`].
pub struct FnSink<F>(F);

#[async_trait]
impl<F> TaskSink for FnSink<F>
where
    F: Fn(&Snapshot) + Send + Sync + 'static,
{
    async fn deliver(&self, snapshot: &Snapshot) {
        (self.0)(snapshot)
    }
}

pub fn sink_fn<F>(f: F) -> Arc<dyn TaskSink>
where
    F: Fn(&Snapshot) + Send + Sync + 'static,
{
    Arc::new(FnSink(f))
}
