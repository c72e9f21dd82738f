use serde::{Deserialize, Serialize};

/// Aggregate snapshot of a user's activity, produced once per run.
///
/// `lines_deleted` is a magnitude: the API reports deletions as negative
/// weekly deltas and the provider stores their absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsRecord {
    pub repository_count: u64,
    pub contributed_repository_count: u64,
    pub commit_count: u64,
    pub star_count: u64,
    pub follower_count: u64,
    pub lines_added: u64,
    pub lines_deleted: u64,
}

impl StatsRecord {
    pub fn total_lines(&self) -> u64 {
        self.lines_added.saturating_add(self.lines_deleted)
    }
}
