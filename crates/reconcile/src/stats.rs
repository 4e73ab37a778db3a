//! Counters describing what a merge did to the existing timeline.

use crate::relation::Relation;

/// Statistics accumulated across merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Incoming records folded in.
    pub incoming_merged: u64,
    /// Existing records with a different key, passed through unchanged.
    pub passed_through: u64,
    /// Same-key, same-value records absorbed into the incoming record.
    pub coalesced: u64,
    /// Same-key, different-value records that did not intersect.
    pub untouched: u64,
    pub forward_offset: u64,
    pub backward_offset: u64,
    pub occurrence: u64,
    pub absorption: u64,
    pub matched: u64,
    /// Fragments produced by trimming or splitting.
    pub fragments_emitted: u64,
}

impl MergeStats {
    /// Record one classified comparison.
    pub fn record_relation(&mut self, relation: Relation) {
        match relation {
            Relation::ForwardOffset => self.forward_offset += 1,
            Relation::BackwardOffset => self.backward_offset += 1,
            Relation::Occurrence => self.occurrence += 1,
            Relation::Absorption => self.absorption += 1,
            Relation::Match => self.matched += 1,
        }
    }

    /// Count for a single relation.
    pub fn relation_count(&self, relation: Relation) -> u64 {
        match relation {
            Relation::ForwardOffset => self.forward_offset,
            Relation::BackwardOffset => self.backward_offset,
            Relation::Occurrence => self.occurrence,
            Relation::Absorption => self.absorption,
            Relation::Match => self.matched,
        }
    }

    /// Same-key, different-value comparisons that intersected.
    pub fn intersecting(&self) -> u64 {
        Relation::ALL.iter().map(|r| self.relation_count(*r)).sum()
    }

    /// Fraction of same-key, different-value comparisons that cut or erased
    /// the existing record.
    pub fn replaced_frac(&self) -> f64 {
        let intersecting = self.intersecting();
        let total = intersecting + self.untouched;
        if total > 0 {
            intersecting as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Fold another set of counters into this one.
    pub fn absorb(&mut self, other: &MergeStats) {
        self.incoming_merged += other.incoming_merged;
        self.passed_through += other.passed_through;
        self.coalesced += other.coalesced;
        self.untouched += other.untouched;
        self.forward_offset += other.forward_offset;
        self.backward_offset += other.backward_offset;
        self.occurrence += other.occurrence;
        self.absorption += other.absorption;
        self.matched += other.matched;
        self.fragments_emitted += other.fragments_emitted;
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
