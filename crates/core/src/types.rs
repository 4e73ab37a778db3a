//! Core data types for the price-timeline system.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instant on a price timeline (UTC).
pub type Timestamp = DateTime<Utc>;

/// Price amount in minor currency units.
pub type PriceValue = i64;

/// Identifies the timeline a priced interval belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceKey {
    /// Product code.
    pub product_code: String,
    /// Quantity tier.
    pub number: i32,
    /// Department / branch.
    pub depart: i32,
}

impl PriceKey {
    /// Create a new key.
    pub fn new(product_code: impl Into<String>, number: i32, depart: i32) -> Self {
        Self {
            product_code: product_code.into(),
            number,
            depart,
        }
    }
}

impl fmt::Display for PriceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.product_code, self.number, self.depart)
    }
}

/// Half-open validity range `[begin, end)`.
///
/// Two periods that share only a boundary instant do not intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    begin: Timestamp,
    end: Timestamp,
}

impl Period {
    /// Create a period, rejecting `begin >= end`.
    pub fn new(begin: Timestamp, end: Timestamp) -> Result<Self> {
        let period = Self { begin, end };
        if !period.is_valid() {
            return Err(Error::invalid_period(begin, end));
        }
        Ok(period)
    }

    #[inline]
    pub fn begin(&self) -> Timestamp {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether begin strictly precedes end.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.begin < self.end
    }

    /// Strict intersection test; touching periods do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Period) -> bool {
        !(self.end <= other.begin || self.begin >= other.end)
    }

    /// Whether `ts` falls inside `[begin, end)`.
    #[inline]
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.begin <= ts && ts < self.end
    }

    /// Smallest period covering both, including any gap between them.
    pub fn span(&self, other: &Period) -> Period {
        Period {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }

    /// Same period ending at `end`. The caller keeps `end` after `begin`.
    pub fn with_end(&self, end: Timestamp) -> Period {
        debug_assert!(self.begin < end, "period would become empty");
        Period {
            begin: self.begin,
            end,
        }
    }

    /// Same period starting at `begin`. The caller keeps `begin` before `end`.
    pub fn with_begin(&self, begin: Timestamp) -> Period {
        debug_assert!(begin < self.end, "period would become empty");
        Period {
            begin,
            end: self.end,
        }
    }

    /// Length of the period.
    pub fn duration(&self) -> Duration {
        self.end - self.begin
    }
}

/// A price valid over a period for a single key.
///
/// Records are immutable; reconciliation builds new records rather than
/// editing existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PricedInterval {
    key: PriceKey,
    period: Period,
    value: PriceValue,
}

impl PricedInterval {
    /// Create a priced interval, validating the period.
    pub fn new(key: PriceKey, begin: Timestamp, end: Timestamp, value: PriceValue) -> Result<Self> {
        Ok(Self {
            key,
            period: Period::new(begin, end)?,
            value,
        })
    }

    #[inline]
    pub fn key(&self) -> &PriceKey {
        &self.key
    }

    #[inline]
    pub fn period(&self) -> &Period {
        &self.period
    }

    #[inline]
    pub fn begin(&self) -> Timestamp {
        self.period.begin
    }

    #[inline]
    pub fn end(&self) -> Timestamp {
        self.period.end
    }

    #[inline]
    pub fn value(&self) -> PriceValue {
        self.value
    }

    /// Whether both records belong to the same timeline.
    #[inline]
    pub fn same_key(&self, other: &PricedInterval) -> bool {
        self.key == other.key
    }

    /// New record with the same key and value over `period`.
    pub fn with_period(&self, period: Period) -> PricedInterval {
        PricedInterval {
            key: self.key.clone(),
            period,
            value: self.value,
        }
    }

    /// Re-check a record that was deserialized rather than constructed.
    pub fn validate(&self) -> Result<()> {
        if self.key.product_code.is_empty() {
            return Err(Error::validation(format!("empty product code in {}", self)));
        }
        if !self.period.is_valid() {
            return Err(Error::invalid_period(self.period.begin, self.period.end));
        }
        Ok(())
    }
}

impl fmt::Display for PricedInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}, {}) @ {}",
            self.key, self.period.begin, self.period.end, self.value
        )
    }
}
