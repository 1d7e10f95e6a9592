use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::VoteError;
use crate::model::BarId;

/// Vote counts for the bars of the current generation.
///
/// Every operation holds the single lock for its whole duration, so a
/// `snapshot_and_clear` is indivisible with respect to `increment`: a racing
/// vote is either in the snapshot or rejected afterwards as unknown.
#[derive(Debug, Default)]
pub struct VoteStore {
    counts: Mutex<HashMap<BarId, u32>>,
}

impl VoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `bar_id` for voting at 0. Existing counts are left alone.
    pub fn register(&self, bar_id: BarId) {
        self.counts.lock().entry(bar_id).or_insert(0);
    }

    pub fn register_all(&self, bar_ids: impl IntoIterator<Item = BarId>) {
        let mut counts = self.counts.lock();
        for id in bar_ids {
            counts.entry(id).or_insert(0);
        }
    }

    /// Adds one vote and returns the new count.
    pub fn increment(&self, bar_id: BarId) -> Result<u32, VoteError> {
        let mut counts = self.counts.lock();
        let count = counts
            .get_mut(&bar_id)
            .ok_or(VoteError::UnknownBar(bar_id))?;
        *count = count.saturating_add(1);
        Ok(*count)
    }

    pub fn snapshot_and_clear(&self) -> HashMap<BarId, u32> {
        std::mem::take(&mut *self.counts.lock())
    }

    pub fn snapshot(&self) -> HashMap<BarId, u32> {
        self.counts.lock().clone()
    }

    pub fn count(&self, bar_id: BarId) -> Option<u32> {
        self.counts.lock().get(&bar_id).copied()
    }

    pub fn total(&self) -> u64 {
        self.counts.lock().values().map(|&v| v as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }
}
