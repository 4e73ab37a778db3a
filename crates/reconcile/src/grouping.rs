//! Per-key partitioning of price records.
//!
//! Keys never interact during a merge, so each incoming record only needs the
//! records of its own key. Within a key the original order is kept, which
//! keeps results identical to a full linear scan for that key.

use crate::engine::merge_one_counted;
use crate::stats::MergeStats;
use std::collections::HashMap;
use timeline_core::{PriceKey, PricedInterval};

/// Price records partitioned by key, in first-seen key order.
#[derive(Debug, Clone, Default)]
pub struct KeyedTimelines {
    index: HashMap<PriceKey, usize>,
    groups: Vec<(PriceKey, Vec<PricedInterval>)>,
}

impl KeyedTimelines {
    /// Create an empty set of timelines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition records by key, preserving their relative order.
    pub fn from_records(records: impl IntoIterator<Item = PricedInterval>) -> Self {
        let mut timelines = Self::new();
        for record in records {
            timelines.group_mut(record.key()).push(record);
        }
        timelines
    }

    /// Merge an incoming record into the timeline of its key.
    pub fn merge(&mut self, incoming: &PricedInterval) {
        self.merge_counted(incoming, &mut MergeStats::default());
    }

    pub(crate) fn merge_counted(&mut self, incoming: &PricedInterval, stats: &mut MergeStats) {
        let group = self.group_mut(incoming.key());
        let merged = merge_one_counted(group, incoming, stats);
        *group = merged;
    }

    fn group_mut(&mut self, key: &PriceKey) -> &mut Vec<PricedInterval> {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.index.insert(key.clone(), idx);
                self.groups.push((key.clone(), Vec::new()));
                idx
            }
        };
        &mut self.groups[idx].1
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Records of a single key.
    pub fn get(&self, key: &PriceKey) -> Option<&[PricedInterval]> {
        self.index.get(key).map(|&idx| self.groups[idx].1.as_slice())
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &PriceKey> {
        self.groups.iter().map(|(key, _)| key)
    }

    /// Flatten back into a single collection, key by key.
    pub fn into_records(self) -> Vec<PricedInterval> {
        self.groups.into_iter().flat_map(|(_, records)| records).collect()
    }
}
