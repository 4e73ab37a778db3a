//! Post-merge check for same-key overlaps.

use timeline_core::{PriceKey, PricedInterval};

/// Two records of one key whose periods intersect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub key: PriceKey,
    /// Index of the earlier record in the audited slice.
    pub first: usize,
    /// Index of the later record in the audited slice.
    pub second: usize,
}

/// Report every same-key pair with intersecting periods.
///
/// Touching records are fine. Pairs come out ordered by `(first, second)`.
pub fn find_overlaps(records: &[PricedInterval]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    for (i, a) in records.iter().enumerate() {
        for (j, b) in records.iter().enumerate().skip(i + 1) {
            if a.same_key(b) && a.period().intersects(b.period()) {
                overlaps.push(Overlap {
                    key: a.key().clone(),
                    first: i,
                    second: j,
                });
            }
        }
    }

    overlaps
}
