//! Stats View
//!
//! Last stats fetched for the active list. Each refresh carries a sequence
//! number taken when it was issued; a response is applied only when it is
//! for the list currently shown and newer than the last one applied.

use crate::models::{ListId, Stats};

#[derive(Debug, Clone, Default)]
pub struct StatsView {
    list_id: Option<ListId>,
    stats: Option<Stats>,
    applied_seq: u64,
}

impl StatsView {
    /// Empty view bound to `list_id`
    pub fn for_list(list_id: impl Into<ListId>) -> Self {
        Self {
            list_id: Some(list_id.into()),
            ..Default::default()
        }
    }

    pub fn list_id(&self) -> Option<&str> {
        self.list_id.as_deref()
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    /// Apply a refresh result. Returns false when it was discarded.
    pub fn apply(&mut self, seq: u64, list_id: &str, stats: Stats) -> bool {
        if self.list_id.as_deref() != Some(list_id) || seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.stats = Some(stats);
        true
    }
}
