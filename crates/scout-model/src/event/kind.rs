/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // discovery loop
    /// One poll cycle finished (whether or not anything was delivered).
    CycleCompleted,
    /// A changed, non-empty snapshot was handed to the sink.
    SnapshotDelivered,
    /// The poll loop observed the stop signal and exited.
    DiscoveryStopped,

    // sources
    /// Agent URL chosen from override, env or default.
    AgentUrlResolved,
    /// Agent answered with a task list.
    AgentQueried,
    /// Agent query failed; falling back.
    AgentQueryFailed,
    /// One page of the inventory task listing was read.
    InventoryPage,
    /// Inventory query failed; cycle counts as zero tasks.
    InventoryFailed,

    // extraction
    /// Task description has no network attachment.
    TaskMissingAttachment,
    /// Task description has more than one network attachment.
    TaskMultipleAttachments,
    /// Task has no usable address and was dropped.
    TaskMissingAddress,

    // peers
    /// One entry of a peer set being built.
    PeerListed,
    /// Peer set pushed to the cache.
    PeersUpdated,
    /// Cache rejected the peer set.
    PeersRejected,
}
