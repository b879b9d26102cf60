use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use scout_model::{Event, EventKind, Snapshot, Task};
use scout_observe::{Observer, log_observer};

use crate::{
    agent::{AgentClient, ENV_AGENT_URL, resolve_agent_url},
    config::DiscoveryConfig,
    errors::DiscoverError,
    inventory::{Inventory, list_running_tasks},
    sink::TaskSink,
};

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Tasks with an address found this cycle.
    pub tasks_found: usize,
    /// Whether a new snapshot was delivered.
    pub delivered: bool,
}

pub struct DiscoveryBuilder {
    config: DiscoveryConfig,
    inventory: Option<Arc<dyn Inventory>>,
    sink: Option<Arc<dyn TaskSink>>,
    observer: Arc<dyn Observer>,
}

impl DiscoveryBuilder {
    pub fn inventory(mut self, inventory: Arc<dyn Inventory>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn TaskSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the default tracing observer.
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> Result<Discovery, DiscoverError> {
        self.config.validate()?;
        let inventory = self
            .inventory
            .ok_or_else(|| DiscoverError::Config("option inventory is required".into()))?;
        let sink = self
            .sink
            .ok_or_else(|| DiscoverError::Config("option sink is required".into()))?;

        let agent = if self.config.disable_agent_query {
            None
        } else {
            let env_value = std::env::var(ENV_AGENT_URL).ok();
            let url = resolve_agent_url(
                self.config.agent_url.as_deref(),
                env_value.as_deref(),
                &self.config.cluster,
            );
            self.observer.on_event(
                &Event::new(EventKind::AgentUrlResolved)
                    .with_service(&self.config.service_name)
                    .with_url(&url),
            );
            Some(AgentClient::new(url, self.config.agent_timeout)?)
        };

        Ok(Discovery {
            interval: self.config.effective_interval(),
            config: self.config,
            inventory,
            sink,
            observer: self.observer,
            agent,
            last_delivered: Snapshot::empty(),
        })
    }
}

/// Poll loop state for one service.
///
/// Each cycle picks a source (agent, forced single task, or inventory),
/// and delivers the result only when it is non-empty and differs from the
/// last delivered snapshot. Source failures count as "no tasks".
pub struct Discovery {
    config: DiscoveryConfig,
    interval: Duration,
    inventory: Arc<dyn Inventory>,
    sink: Arc<dyn TaskSink>,
    observer: Arc<dyn Observer>,
    agent: Option<AgentClient>,
    last_delivered: Snapshot,
}

impl Discovery {
    pub fn builder(config: DiscoveryConfig) -> DiscoveryBuilder {
        DiscoveryBuilder {
            config,
            inventory: None,
            sink: None,
            observer: log_observer(),
        }
    }

    #[inline]
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Most recently delivered snapshot (empty before the first delivery).
    #[inline]
    pub fn last_delivered(&self) -> &Snapshot {
        &self.last_delivered
    }

    /// Run one cycle: fetch, compare, maybe deliver.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let begin = Instant::now();

        let tasks = self.list_tasks().await;
        let tasks_found = tasks.len();
        let mut delivered = false;

        if !tasks.is_empty() {
            let snapshot = Snapshot::new(tasks);
            if snapshot != self.last_delivered {
                self.last_delivered = snapshot;
                self.observer.on_event(
                    &Event::new(EventKind::SnapshotDelivered)
                        .with_service(&self.config.service_name)
                        .with_count(tasks_found),
                );
                self.sink.deliver(&self.last_delivered).await;
                delivered = true;
            }
        }

        self.observer.on_event(
            &Event::new(EventKind::CycleCompleted)
                .with_cluster(&self.config.cluster)
                .with_service(&self.config.service_name)
                .with_source_flags(
                    self.config.force_single_task.as_deref(),
                    self.config.disable_agent_query,
                )
                .with_count(tasks_found)
                .with_changed(delivered)
                .with_elapsed(begin.elapsed())
                .with_interval(self.interval),
        );

        PollOutcome {
            tasks_found,
            delivered,
        }
    }

    /// Poll until `token` is cancelled.
    ///
    /// Cancellation is honoured between cycles; a cycle that already started
    /// runs to completion (including delivery).
    pub async fn run(mut self, token: CancellationToken) {
        while !token.is_cancelled() {
            self.poll_once().await;

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        self.observer.on_event(
            &Event::new(EventKind::DiscoveryStopped).with_service(&self.config.service_name),
        );
    }

    /// Start the poll loop on the tokio runtime.
    pub fn spawn(self) -> DiscoveryHandle {
        let token = CancellationToken::new();
        let join = tokio::spawn(self.run(token.clone()));
        DiscoveryHandle { token, join }
    }

    async fn list_tasks(&self) -> Vec<Task> {
        if let Some(agent) = &self.agent {
            match agent.query(&self.config.service_name).await {
                Ok(tasks) => {
                    self.observer.on_event(
                        &Event::new(EventKind::AgentQueried)
                            .with_cluster(&self.config.cluster)
                            .with_service(&self.config.service_name)
                            .with_count(tasks.len()),
                    );
                    return self.with_address(tasks);
                }
                Err(e) => self.observer.on_event(
                    &Event::new(EventKind::AgentQueryFailed)
                        .with_cluster(&self.config.cluster)
                        .with_service(&self.config.service_name)
                        .with_url(agent.url_for(&self.config.service_name).as_str())
                        .with_reason(e.to_string()),
                ),
            }
        }

        if let Some(address) = &self.config.force_single_task {
            return vec![Task::forced_single(address.clone())];
        }

        match list_running_tasks(
            self.inventory.as_ref(),
            &self.config.cluster,
            &self.config.service_name,
            self.observer.as_ref(),
        )
        .await
        {
            Ok(tasks) => tasks,
            Err(e) => {
                self.observer.on_event(
                    &Event::new(EventKind::InventoryFailed)
                        .with_cluster(&self.config.cluster)
                        .with_service(&self.config.service_name)
                        .with_reason(e.to_string()),
                );
                Vec::new()
            }
        }
    }

    /// Agent answers skip the extractor, so enforce the address rule here.
    fn with_address(&self, tasks: Vec<Task>) -> Vec<Task> {
        tasks
            .into_iter()
            .filter(|t| {
                if t.has_address() {
                    return true;
                }
                self.observer.on_event(
                    &Event::new(EventKind::TaskMissingAddress)
                        .with_task(&t.arn)
                        .with_status(&t.health_status, &t.last_status),
                );
                false
            })
            .collect()
    }
}

/// Handle to a spawned poll loop.
pub struct DiscoveryHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl DiscoveryHandle {
    /// Ask the loop to exit before its next cycle. Repeated calls are harmless.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token that stops the loop when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the loop to exit. Only returns after [`stop`](Self::stop).
    pub async fn join(self) -> Result<(), DiscoverError> {
        self.join
            .await
            .map_err(|e| DiscoverError::Join(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use axum::{Json, Router, routing::get};
    use scout_observe::MemoryObserver;
    use tokio::sync::mpsc;

    use super::*;
    use crate::inventory::{ListTasksPage, ListTasksRequest, TaskDescription};
    use crate::sink::sink_fn;

    /// Inventory answering each listing with the next scripted batch.
    ///
    /// `None` in the script is an API failure; an exhausted script repeats
    /// the last entry.
    struct ScriptedInventory {
        script: Mutex<VecDeque<Option<Vec<TaskDescription>>>>,
        last: Mutex<Option<Vec<TaskDescription>>>,
        listings: AtomicUsize,
    }

    impl ScriptedInventory {
        fn new(script: Vec<Option<Vec<TaskDescription>>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                listings: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Inventory for ScriptedInventory {
        async fn list_tasks(&self, _request: &ListTasksRequest) -> Result<ListTasksPage, DiscoverError> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            let batch = match next {
                Some(batch) => {
                    *self.last.lock().unwrap() = batch.clone();
                    batch
                }
                None => self.last.lock().unwrap().clone(),
            };
            let batch = batch.ok_or_else(|| DiscoverError::Inventory("api error".into()))?;
            Ok(ListTasksPage {
                task_arns: batch.iter().map(|t| t.arn().to_string()).collect(),
                next_token: None,
            })
        }

        async fn describe_tasks(
            &self,
            _cluster: &str,
            task_arns: &[String],
        ) -> Result<Vec<TaskDescription>, DiscoverError> {
            let last = self.last.lock().unwrap().clone().unwrap_or_default();
            Ok(last
                .into_iter()
                .filter(|t| task_arns.iter().any(|a| a == t.arn()))
                .collect())
        }
    }

    fn desc(addr: &str) -> TaskDescription {
        TaskDescription::running(format!("arn:{addr}"), addr)
    }

    fn recording_sink() -> (Arc<dyn TaskSink>, Arc<Mutex<Vec<Snapshot>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = sink_fn(move |snap: &Snapshot| sink_seen.lock().unwrap().push(snap.clone()));
        (sink, seen)
    }

    fn direct(service: &str) -> DiscoveryConfig {
        DiscoveryConfig::new(service, "demo").without_agent()
    }

    #[test]
    fn construction_requires_service_cluster_inventory_and_sink() {
        let (sink, _) = recording_sink();
        let inv = ScriptedInventory::new(vec![]);

        let err = Discovery::builder(direct(""))
            .inventory(inv.clone())
            .sink(sink.clone())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DiscoverError::Config(_)));

        let err = Discovery::builder(DiscoveryConfig::new("svc", "").without_agent())
            .inventory(inv.clone())
            .sink(sink.clone())
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("cluster"));

        let err = Discovery::builder(direct("svc")).sink(sink.clone()).build().err().unwrap();
        assert!(err.to_string().contains("inventory"));

        let err = Discovery::builder(direct("svc")).inventory(inv).build().err().unwrap();
        assert!(err.to_string().contains("sink"));
    }

    #[test]
    fn zero_interval_defaults_to_twenty_seconds() {
        let (sink, _) = recording_sink();
        let disc = Discovery::builder(direct("svc").with_interval(Duration::ZERO))
            .inventory(ScriptedInventory::new(vec![]))
            .sink(sink)
            .build()
            .unwrap();
        assert_eq!(disc.interval(), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn delivers_on_change_and_suppresses_empty() {
        let inv = ScriptedInventory::new(vec![
            Some(vec![desc("10.0.0.2"), desc("10.0.0.1")]),
            Some(vec![desc("10.0.0.1"), desc("10.0.0.2")]),
            None,
            Some(vec![desc("10.0.0.1")]),
        ]);
        let (sink, seen) = recording_sink();
        let obs = MemoryObserver::new();
        let mut disc = Discovery::builder(direct("svc"))
            .inventory(inv)
            .sink(sink)
            .observer(Arc::new(obs.clone()))
            .build()
            .unwrap();

        let first = disc.poll_once().await;
        assert_eq!(first, PollOutcome { tasks_found: 2, delivered: true });
        assert_eq!(disc.last_delivered().addresses(), vec!["10.0.0.1", "10.0.0.2"]);

        let second = disc.poll_once().await;
        assert!(!second.delivered);

        let third = disc.poll_once().await;
        assert_eq!(third, PollOutcome { tasks_found: 0, delivered: false });
        assert_eq!(disc.last_delivered().len(), 2);
        assert_eq!(obs.count(EventKind::InventoryFailed), 1);

        let fourth = disc.poll_once().await;
        assert!(fourth.delivered);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].addresses(), vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(seen[1].addresses(), vec!["10.0.0.1"]);
        assert_eq!(obs.count(EventKind::CycleCompleted), 4);
    }

    #[tokio::test]
    async fn identical_results_deliver_once() {
        let inv = ScriptedInventory::new(vec![Some(vec![desc("10.0.0.3"), desc("10.0.0.4")])]);
        let (sink, seen) = recording_sink();
        let mut disc = Discovery::builder(direct("svc"))
            .inventory(inv)
            .sink(sink)
            .observer(Arc::new(MemoryObserver::new()))
            .build()
            .unwrap();

        for _ in 0..5 {
            disc.poll_once().await;
        }
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_results_never_deliver() {
        let inv = ScriptedInventory::new(vec![Some(vec![]), None, Some(vec![])]);
        let (sink, seen) = recording_sink();
        let mut disc = Discovery::builder(direct("svc"))
            .inventory(inv)
            .sink(sink)
            .observer(Arc::new(MemoryObserver::new()))
            .build()
            .unwrap();

        for _ in 0..3 {
            disc.poll_once().await;
        }
        assert!(seen.lock().unwrap().is_empty());
        assert!(disc.last_delivered().is_empty());
    }

    #[tokio::test]
    async fn addressless_tasks_are_not_delivered() {
        let mut bare = desc("10.0.0.8");
        bare.attachments.clear();
        let inv = ScriptedInventory::new(vec![Some(vec![desc("10.0.0.1"), bare])]);
        let (sink, seen) = recording_sink();
        let obs = MemoryObserver::new();
        let mut disc = Discovery::builder(direct("svc"))
            .inventory(inv)
            .sink(sink)
            .observer(Arc::new(obs.clone()))
            .build()
            .unwrap();

        let outcome = disc.poll_once().await;
        assert_eq!(outcome.tasks_found, 1);
        assert_eq!(seen.lock().unwrap()[0].addresses(), vec!["10.0.0.1"]);
        assert_eq!(obs.count(EventKind::TaskMissingAddress), 1);
    }

    #[tokio::test]
    async fn forced_single_task_skips_inventory() {
        let inv = ScriptedInventory::new(vec![Some(vec![desc("10.0.0.1")])]);
        let (sink, seen) = recording_sink();
        let mut disc = Discovery::builder(direct("svc").with_force_single_task("192.168.1.10"))
            .inventory(inv.clone())
            .sink(sink)
            .observer(Arc::new(MemoryObserver::new()))
            .build()
            .unwrap();

        disc.poll_once().await;
        assert_eq!(inv.listings.load(Ordering::SeqCst), 0);

        let seen = seen.lock().unwrap();
        let task = &seen[0][0];
        assert_eq!(task.arn, "mockedSingleTaskARN");
        assert_eq!(task.address, "192.168.1.10");
        assert_eq!(task.health_status, "UNKNOWN");
        assert_eq!(task.last_status, "RUNNING");
    }

    #[tokio::test]
    async fn unreachable_agent_falls_back_in_same_cycle() {
        let inv = ScriptedInventory::new(vec![Some(vec![desc("10.0.0.1")])]);
        let (sink, seen) = recording_sink();
        let obs = MemoryObserver::new();
        let config = DiscoveryConfig {
            agent_timeout: Duration::from_secs(2),
            ..DiscoveryConfig::new("svc", "demo").with_agent_url("http://127.0.0.1:1/tasks")
        };
        let mut disc = Discovery::builder(config)
            .inventory(inv.clone())
            .sink(sink)
            .observer(Arc::new(obs.clone()))
            .build()
            .unwrap();

        let outcome = disc.poll_once().await;
        assert!(outcome.delivered);
        assert_eq!(inv.listings.load(Ordering::SeqCst), 1);
        assert_eq!(obs.count(EventKind::AgentQueryFailed), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn agent_answer_short_circuits_inventory() {
        let router = Router::new().route(
            "/tasks/{service}",
            get(|| async {
                Json(vec![
                    Task::new("arn:b", "10.0.0.20", "HEALTHY", "RUNNING"),
                    Task::new("arn:empty", "", "UNKNOWN", "PENDING"),
                    Task::new("arn:a", "10.0.0.10", "HEALTHY", "RUNNING"),
                ])
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let inv = ScriptedInventory::new(vec![Some(vec![desc("10.9.9.9")])]);
        let (sink, seen) = recording_sink();
        let obs = MemoryObserver::new();
        let config = DiscoveryConfig::new("svc", "demo").with_agent_url(format!("http://{addr}/tasks"));
        let mut disc = Discovery::builder(config)
            .inventory(inv.clone())
            .sink(sink)
            .observer(Arc::new(obs.clone()))
            .build()
            .unwrap();

        let outcome = disc.poll_once().await;
        assert_eq!(outcome.tasks_found, 2);
        assert_eq!(inv.listings.load(Ordering::SeqCst), 0);
        assert_eq!(seen.lock().unwrap()[0].addresses(), vec!["10.0.0.10", "10.0.0.20"]);
        assert_eq!(obs.count(EventKind::AgentQueried), 1);
        assert_eq!(obs.count(EventKind::TaskMissingAddress), 1);
    }

    #[tokio::test]
    async fn spawned_loop_stops_on_request() {
        let inv = ScriptedInventory::new(vec![Some(vec![desc("10.0.0.1")])]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = sink_fn(move |snap: &Snapshot| {
            let _ = tx.send(snap.len());
        });
        let obs = MemoryObserver::new();
        let disc = Discovery::builder(direct("svc").with_interval(Duration::from_millis(10)))
            .inventory(inv.clone())
            .sink(sink)
            .observer(Arc::new(obs.clone()))
            .build()
            .unwrap();

        let handle = disc.spawn();
        let delivered = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(delivered, Some(1));

        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
        tokio::time::timeout(Duration::from_secs(5), handle.join())
            .await
            .unwrap()
            .unwrap();

        let polls = inv.listings.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(inv.listings.load(Ordering::SeqCst), polls);
        assert_eq!(obs.count(EventKind::DiscoveryStopped), 1);
    }
}
