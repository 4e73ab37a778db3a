//! Topological relation between an existing and an incoming period.
//!
//! ```text
//! existing:            [=========)
//! ForwardOffset:            [=========)
//! BackwardOffset:  [=========)
//! Occurrence:            [===)
//! Absorption:       [===============)
//! Match:               [=========)
//! ```

use serde::{Deserialize, Serialize};
use timeline_core::Period;

/// How an incoming period lies over an intersecting existing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Incoming starts inside existing and runs past its end.
    ForwardOffset,
    /// Incoming starts before existing and ends inside it.
    BackwardOffset,
    /// Incoming lies strictly inside existing.
    Occurrence,
    /// Incoming strictly contains existing.
    Absorption,
    /// Any case with a shared boundary, including identical periods.
    Match,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::ForwardOffset,
        Relation::BackwardOffset,
        Relation::Occurrence,
        Relation::Absorption,
        Relation::Match,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::ForwardOffset => "forward_offset",
            Relation::BackwardOffset => "backward_offset",
            Relation::Occurrence => "occurrence",
            Relation::Absorption => "absorption",
            Relation::Match => "match",
        }
    }
}

/// Strict intersection; periods sharing only a boundary do not intersect.
#[inline]
pub fn intersects(existing: &Period, incoming: &Period) -> bool {
    existing.intersects(incoming)
}

/// Classify an incoming period against an existing one.
///
/// Returns `None` when the periods do not intersect. Checks run in a fixed
/// order with strict comparisons, so any equal boundary falls to `Match`.
pub fn classify(existing: &Period, incoming: &Period) -> Option<Relation> {
    if !intersects(existing, incoming) {
        return None;
    }

    let (eb, ee) = (existing.begin(), existing.end());
    let (ib, ie) = (incoming.begin(), incoming.end());

    let relation = if ib > eb && ib < ee && ie > ee {
        Relation::ForwardOffset
    } else if ib < eb && ie < ee {
        Relation::BackwardOffset
    } else if ib > eb && ie < ee {
        Relation::Occurrence
    } else if ib < eb && ie > ee {
        Relation::Absorption
    } else {
        Relation::Match
    };

    Some(relation)
}
