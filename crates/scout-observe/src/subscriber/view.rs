use std::borrow::Borrow;

use scout_model::{Event, EventKind};
use tracing::{debug, error, info, warn};

/// Field accessors with defaults for log output.
pub trait View {
    fn kind(&self) -> EventKind;
    fn as_service(&self) -> &str;
    fn as_cluster(&self) -> &str;
    fn as_task(&self) -> &str;
    fn as_address(&self) -> &str;
    fn as_health(&self) -> &str;
    fn as_last_status(&self) -> &str;
    fn as_url(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn as_forced(&self) -> &str;
    fn count(&self) -> usize;
    fn index(&self) -> usize;
    fn attachments(&self) -> usize;
    fn changed(&self) -> bool;
    fn is_self(&self) -> bool;
    fn agent_disabled(&self) -> bool;
    fn elapsed_ms(&self) -> u64;
    fn interval_ms(&self) -> u64;
}

impl<T> View for T
where
    T: Borrow<Event>,
{
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
    #[inline]
    fn as_service(&self) -> &str {
        self.borrow().service.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_cluster(&self) -> &str {
        self.borrow().cluster.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_task(&self) -> &str {
        self.borrow().task.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_address(&self) -> &str {
        self.borrow().address.as_deref().unwrap_or("")
    }
    #[inline]
    fn as_health(&self) -> &str {
        self.borrow().health_status.as_deref().unwrap_or("")
    }
    #[inline]
    fn as_last_status(&self) -> &str {
        self.borrow().last_status.as_deref().unwrap_or("")
    }
    #[inline]
    fn as_url(&self) -> &str {
        self.borrow().url.as_deref().unwrap_or("")
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_forced(&self) -> &str {
        self.borrow().forced_address.as_deref().unwrap_or("")
    }
    #[inline]
    fn count(&self) -> usize {
        self.borrow().count.unwrap_or(0)
    }
    #[inline]
    fn index(&self) -> usize {
        self.borrow().index.unwrap_or(0)
    }
    #[inline]
    fn attachments(&self) -> usize {
        self.borrow().attachments.unwrap_or(0)
    }
    #[inline]
    fn changed(&self) -> bool {
        self.borrow().changed.unwrap_or(false)
    }
    #[inline]
    fn is_self(&self) -> bool {
        self.borrow().is_self.unwrap_or(false)
    }
    #[inline]
    fn agent_disabled(&self) -> bool {
        self.borrow().agent_disabled.unwrap_or(false)
    }
    #[inline]
    fn elapsed_ms(&self) -> u64 {
        self.borrow().elapsed_ms.unwrap_or(0)
    }
    #[inline]
    fn interval_ms(&self) -> u64 {
        self.borrow().interval_ms.unwrap_or(0)
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // discovery loop
        EventKind::CycleCompleted => "discovery cycle completed",
        EventKind::SnapshotDelivered => "task list changed; delivering snapshot",
        EventKind::DiscoveryStopped => "discovery stopped",

        // sources
        EventKind::AgentUrlResolved => "agent url resolved",
        EventKind::AgentQueried => "task list received from agent",
        EventKind::AgentQueryFailed => "agent query failed; falling back",
        EventKind::InventoryPage => "inventory page listed",
        EventKind::InventoryFailed => "inventory query failed; no tasks this cycle",

        // extraction
        EventKind::TaskMissingAttachment => "task missing network attachment",
        EventKind::TaskMultipleAttachments => "task has multiple network attachments",
        EventKind::TaskMissingAddress => "task missing privateIPv4Address; dropped",

        // peers
        EventKind::PeerListed => "peer listed",
        EventKind::PeersUpdated => "peer set updated",
        EventKind::PeersRejected => "peer set update rejected",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        // discovery loop
        EventKind::CycleCompleted => info!(
            cluster = e.as_cluster(),
            service = e.as_service(),
            force_single_task = e.as_forced(),
            disable_agent_query = e.agent_disabled(),
            tasks_found = e.count(),
            changed = e.changed(),
            elapsed_ms = e.elapsed_ms(),
            sleeping_ms = e.interval_ms(),
            "{msg}"
        ),
        EventKind::SnapshotDelivered => {
            info!(service = e.as_service(), tasks = e.count(), "{msg}")
        }
        EventKind::DiscoveryStopped => info!(service = e.as_service(), "{msg}"),

        // sources
        EventKind::AgentUrlResolved => {
            debug!(service = e.as_service(), url = e.as_url(), "{msg}")
        }
        EventKind::AgentQueried => info!(
            cluster = e.as_cluster(),
            service = e.as_service(),
            tasks = e.count(),
            "{msg}"
        ),
        EventKind::AgentQueryFailed => error!(
            cluster = e.as_cluster(),
            service = e.as_service(),
            url = e.as_url(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::InventoryPage => debug!(
            cluster = e.as_cluster(),
            service = e.as_service(),
            found = e.count(),
            "{msg}"
        ),
        EventKind::InventoryFailed => error!(
            cluster = e.as_cluster(),
            service = e.as_service(),
            reason = e.as_reason(),
            "{msg}"
        ),

        // extraction
        EventKind::TaskMissingAttachment => warn!(
            task = e.as_task(),
            health_status = e.as_health(),
            last_status = e.as_last_status(),
            "{msg}"
        ),
        EventKind::TaskMultipleAttachments => warn!(
            task = e.as_task(),
            attachments = e.attachments(),
            "{msg}"
        ),
        EventKind::TaskMissingAddress => warn!(
            task = e.as_task(),
            health_status = e.as_health(),
            last_status = e.as_last_status(),
            network_attachments = e.attachments(),
            "{msg}"
        ),

        // peers
        EventKind::PeerListed => debug!(
            index = e.index(),
            total = e.count(),
            service = e.as_service(),
            task = e.as_task(),
            host_port = e.as_address(),
            health_status = e.as_health(),
            last_status = e.as_last_status(),
            is_self = e.is_self(),
            "{msg}"
        ),
        EventKind::PeersUpdated => {
            info!(service = e.as_service(), peers = e.count(), "{msg}")
        }
        EventKind::PeersRejected => {
            error!(service = e.as_service(), reason = e.as_reason(), "{msg}")
        }
    }
}
