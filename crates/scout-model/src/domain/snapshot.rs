use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::domain::task::Task;

/// Cluster membership at one point in time.
///
/// Tasks are kept sorted by address (then by ARN, so equal addresses still
/// compare deterministically). Two snapshots built from the same tasks in any
/// input order are equal. Decoding sorts too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Task>", into = "Vec<Task>")]
pub struct Snapshot(Vec<Task>);

impl Snapshot {
    pub fn new(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by(|a, b| a.address.cmp(&b.address).then_with(|| a.arn.cmp(&b.arn)));
        Self(tasks)
    }

    #[inline]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn tasks(&self) -> &[Task] {
        &self.0
    }

    /// Addresses in snapshot order.
    pub fn addresses(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.address.as_str()).collect()
    }

    #[inline]
    pub fn into_inner(self) -> Vec<Task> {
        self.0
    }
}

impl Deref for Snapshot {
    type Target = [Task];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Task>> for Snapshot {
    fn from(tasks: Vec<Task>) -> Self {
        Self::new(tasks)
    }
}

impl From<Snapshot> for Vec<Task> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.0
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
