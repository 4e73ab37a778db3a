//! Single-interval reconciliation.
//!
//! Computes what remains of an existing price once an incoming price is laid
//! over it. The incoming price itself is never part of the result.

use crate::relation::{classify, Relation};
use timeline_core::PricedInterval;

/// Fragments of `existing` still valid after `incoming` is applied.
///
/// Both records are expected to share a key; the fold routes other keys
/// around this function.
pub fn difference(existing: &PricedInterval, incoming: &PricedInterval) -> Vec<PricedInterval> {
    difference_classified(existing, incoming).0
}

/// Like [`difference`], also reporting the relation (`None` when disjoint).
pub fn difference_classified(
    existing: &PricedInterval,
    incoming: &PricedInterval,
) -> (Vec<PricedInterval>, Option<Relation>) {
    debug_assert!(existing.same_key(incoming));

    let relation = match classify(existing.period(), incoming.period()) {
        Some(relation) => relation,
        None => return (vec![existing.clone()], None),
    };

    let period = existing.period();
    let fragments = match relation {
        Relation::ForwardOffset => vec![existing.with_period(period.with_end(incoming.begin()))],
        Relation::BackwardOffset => vec![existing.with_period(period.with_begin(incoming.end()))],
        Relation::Occurrence => vec![
            existing.with_period(period.with_end(incoming.begin())),
            existing.with_period(period.with_begin(incoming.end())),
        ],
        Relation::Absorption | Relation::Match => Vec::new(),
    };

    (fragments, Some(relation))
}
