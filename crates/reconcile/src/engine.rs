//! Reconciliation engine.
//!
//! Folds incoming price records into an existing collection, one incoming
//! record at a time. Each step scans the whole accumulated collection, so the
//! result depends on the order of the incoming batch.

use crate::audit::find_overlaps;
use crate::difference::difference_classified;
use crate::grouping::KeyedTimelines;
use crate::stats::MergeStats;
use timeline_core::config::{MergeConfig, MergeStrategy};
use timeline_core::{PricedInterval, Result};

/// Merge a single incoming record into `existing`.
///
/// Records of other keys pass through unchanged. Same-key records with the
/// same value are absorbed into the incoming record, which grows to their
/// bounding range even across a gap. Other same-key records are trimmed or
/// split around it. The incoming record always comes last.
pub fn merge_one(existing: &[PricedInterval], incoming: &PricedInterval) -> Vec<PricedInterval> {
    merge_one_counted(existing, incoming, &mut MergeStats::default())
}

/// Fold every incoming record into `existing`, in order.
///
/// With no existing records the incoming batch is returned as-is.
pub fn merge_all(existing: &[PricedInterval], incoming: &[PricedInterval]) -> Vec<PricedInterval> {
    fold_linear(existing, incoming, &mut MergeStats::default())
}

pub(crate) fn merge_one_counted(
    existing: &[PricedInterval],
    incoming: &PricedInterval,
    stats: &mut MergeStats,
) -> Vec<PricedInterval> {
    let mut result = Vec::with_capacity(existing.len() + 1);
    let mut working = incoming.clone();

    for price in existing {
        if !price.same_key(&working) {
            stats.passed_through += 1;
            result.push(price.clone());
        } else if price.value() == working.value() {
            working = working.with_period(working.period().span(price.period()));
            stats.coalesced += 1;
        } else {
            let (fragments, relation) = difference_classified(price, &working);
            match relation {
                Some(relation) => {
                    tracing::trace!(
                        key = %price.key(),
                        relation = relation.as_str(),
                        fragments = fragments.len(),
                        "reconciled existing price"
                    );
                    stats.record_relation(relation);
                    stats.fragments_emitted += fragments.len() as u64;
                }
                None => stats.untouched += 1,
            }
            result.extend(fragments);
        }
    }

    stats.incoming_merged += 1;
    result.push(working);
    result
}

fn fold_linear(
    existing: &[PricedInterval],
    incoming: &[PricedInterval],
    stats: &mut MergeStats,
) -> Vec<PricedInterval> {
    if existing.is_empty() {
        return incoming.to_vec();
    }

    let mut result = existing.to_vec();
    for price in incoming {
        result = merge_one_counted(&result, price, stats);
    }
    result
}

fn fold_grouped(
    existing: &[PricedInterval],
    incoming: &[PricedInterval],
    stats: &mut MergeStats,
) -> Vec<PricedInterval> {
    if existing.is_empty() {
        return incoming.to_vec();
    }

    let mut timelines = KeyedTimelines::from_records(existing.iter().cloned());
    for price in incoming {
        timelines.merge_counted(price, stats);
    }
    timelines.into_records()
}

/// Configured reconciliation engine with validation, logging and statistics.
#[derive(Debug, Default)]
pub struct ReconcileEngine {
    config: MergeConfig,
    stats: MergeStats,
}

impl ReconcileEngine {
    /// Create a new engine.
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            stats: MergeStats::default(),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge a single incoming record. See [`merge_one`].
    pub fn merge_one(
        &mut self,
        existing: &[PricedInterval],
        incoming: &PricedInterval,
    ) -> Vec<PricedInterval> {
        merge_one_counted(existing, incoming, &mut self.stats)
    }

    /// Merge an incoming batch into `existing`.
    ///
    /// Fails only when input validation is enabled and a record is malformed.
    #[tracing::instrument(
        name = "timeline::engine::merge_all",
        skip_all,
        fields(
            existing = existing.len(),
            incoming = incoming.len(),
            strategy = ?self.config.strategy,
        )
    )]
    pub fn merge_all(
        &mut self,
        existing: &[PricedInterval],
        incoming: &[PricedInterval],
    ) -> Result<Vec<PricedInterval>> {
        if self.config.validate_inputs {
            for price in existing.iter().chain(incoming) {
                price.validate()?;
            }
        }

        let mut batch = MergeStats::default();
        let merged = match self.config.strategy {
            MergeStrategy::LinearScan => fold_linear(existing, incoming, &mut batch),
            MergeStrategy::GroupedByKey => fold_grouped(existing, incoming, &mut batch),
        };

        tracing::debug!(
            output = merged.len(),
            coalesced = batch.coalesced,
            fragments = batch.fragments_emitted,
            erased = batch.absorption + batch.matched,
            "merged price batch"
        );

        if self.config.audit_output {
            for overlap in find_overlaps(&merged) {
                tracing::warn!(
                    key = %overlap.key,
                    first = %merged[overlap.first],
                    second = %merged[overlap.second],
                    "merged timeline has overlapping prices"
                );
            }
        }

        self.stats.absorb(&batch);
        Ok(merged)
    }

    /// Statistics accumulated since creation or the last reset.
    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use timeline_core::{Error, PriceKey, Timestamp};

    /// Parses `dd.mm hh:mm:ss` within 2013.
    fn ts(s: &str) -> Timestamp {
        let (date, time) = s.split_once(' ').unwrap_or((s, "00:00:00"));
        let d: Vec<u32> = date.split('.').map(|p| p.parse().unwrap()).collect();
        let t: Vec<u32> = time.split(':').map(|p| p.parse().unwrap()).collect();
        Utc.with_ymd_and_hms(2013, d[1], d[0], t[0], t[1], t[2]).unwrap()
    }

    fn make_price(code: &str, number: i32, depart: i32, begin: &str, end: &str, value: i64) -> PricedInterval {
        PricedInterval::new(PriceKey::new(code, number, depart), ts(begin), ts(end), value).unwrap()
    }

    fn p(begin: &str, end: &str, value: i64) -> PricedInterval {
        make_price("1", 1, 1, begin, end, value)
    }

    fn sorted(mut records: Vec<PricedInterval>) -> Vec<PricedInterval> {
        records.sort_by(|a, b| {
            (&a.key().product_code, a.key().number, a.key().depart, a.begin())
                .cmp(&(&b.key().product_code, b.key().number, b.key().depart, b.begin()))
        });
        records
    }

    fn assert_same_records(actual: Vec<PricedInterval>, expected: Vec<PricedInterval>) {
        assert_eq!(sorted(actual), sorted(expected));
    }

    #[test]
    fn test_same_value_coalesces_unconditionally() {
        let existing = vec![p("01.01", "31.01", 50)];
        let merged = merge_one(&existing, &p("20.01", "20.02", 50));
        assert_eq!(merged, vec![p("01.01", "20.02", 50)]);
    }

    #[test]
    fn test_same_value_coalesces_across_gap() {
        let existing = vec![p("01.01", "05.01", 50)];
        let merged = merge_one(&existing, &p("20.01", "25.01", 50));
        assert_eq!(merged, vec![p("01.01", "25.01", 50)]);
    }

    #[test]
    fn test_occurrence_produces_three() {
        let merged = merge_all(&[p("01.01", "30.01", 50)], &[p("05.01", "15.01", 60)]);
        assert_eq!(
            merged,
            vec![
                p("01.01", "05.01", 50),
                p("15.01", "30.01", 50),
                p("05.01", "15.01", 60),
            ]
        );
    }

    #[test]
    fn test_forward_and_backward_offset() {
        let merged = merge_all(
            &[p("01.01", "15.01", 100), p("15.01", "30.01", 120)],
            &[p("10.01", "20.01", 110)],
        );
        assert_eq!(
            merged,
            vec![
                p("01.01", "10.01", 100),
                p("20.01", "30.01", 120),
                p("10.01", "20.01", 110),
            ]
        );
    }

    #[test]
    fn test_overlap_chain() {
        let existing = vec![
            p("01.01", "10.01", 80),
            p("10.01", "20.01", 87),
            p("20.01", "30.01", 90),
        ];
        let incoming = vec![p("05.01", "15.01", 80), p("15.01", "25.01", 85)];

        let merged = merge_all(&existing, &incoming);

        assert_same_records(
            merged.clone(),
            vec![
                p("01.01", "15.01", 80),
                p("15.01", "25.01", 85),
                p("25.01", "30.01", 90),
            ],
        );
        assert!(find_overlaps(&merged).is_empty());
    }

    #[test]
    fn test_mixed_keys_batch() {
        let existing = vec![
            make_price("122856", 1, 1, "01.01", "31.01 23:59:59", 11000),
            make_price("122856", 2, 1, "10.01", "20.01 23:59:59", 99000),
            make_price("6654", 1, 2, "01.01", "31.01", 5000),
        ];
        let incoming = vec![
            make_price("122856", 1, 1, "20.01", "20.02 23:59:59", 11000),
            make_price("122856", 2, 1, "15.01", "25.01 23:59:59", 92000),
            make_price("6654", 1, 2, "12.01", "13.01", 4000),
        ];

        let merged = merge_all(&existing, &incoming);

        assert_same_records(
            merged,
            vec![
                make_price("122856", 1, 1, "01.01", "20.02 23:59:59", 11000),
                make_price("122856", 2, 1, "10.01", "15.01", 99000),
                make_price("122856", 2, 1, "15.01", "25.01 23:59:59", 92000),
                make_price("6654", 1, 2, "01.01", "12.01", 5000),
                make_price("6654", 1, 2, "12.01", "13.01", 4000),
                make_price("6654", 1, 2, "13.01", "31.01", 5000),
            ],
        );
    }

    #[test]
    fn test_different_keys_never_interact() {
        let existing = vec![
            make_price("122856", 1, 1, "20.01", "20.02", 11000),
            make_price("122856", 2, 1, "15.01", "25.01", 92000),
        ];
        let incoming = vec![
            make_price("6654", 1, 1, "20.01", "20.02", 11000),
            make_price("6654", 2, 1, "15.01", "25.01", 92000),
        ];

        let merged = merge_all(&existing, &incoming);

        let mut expected = existing.clone();
        expected.extend(incoming);
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_empty_existing_returns_incoming() {
        let incoming = vec![
            make_price("122856", 1, 1, "20.01", "20.02", 11000),
            make_price("122856", 1, 1, "15.01", "25.01", 92000),
        ];
        // Overlapping incoming records are not reconciled against each other.
        assert_eq!(merge_all(&[], &incoming), incoming);
    }

    #[test]
    fn test_empty_incoming_is_noop() {
        let existing = vec![p("01.01", "10.01", 80), p("10.01", "20.01", 87)];
        assert_eq!(merge_all(&existing, &[]), existing);
    }

    #[test]
    fn test_incoming_records_coalesce_through_fold() {
        let existing = vec![make_price("2", 1, 1, "01.01", "05.01", 1)];
        let incoming = vec![p("01.01", "10.01", 70), p("10.01", "20.01", 70)];

        let merged = merge_all(&existing, &incoming);

        assert_eq!(
            merged,
            vec![make_price("2", 1, 1, "01.01", "05.01", 1), p("01.01", "20.01", 70)]
        );
    }

    #[test]
    fn test_merge_one_does_not_mutate_inputs() {
        let existing = vec![p("01.01", "30.01", 50)];
        let incoming = p("05.01", "15.01", 60);
        let (existing_before, incoming_before) = (existing.clone(), incoming.clone());

        let _ = merge_one(&existing, &incoming);

        assert_eq!(existing, existing_before);
        assert_eq!(incoming, incoming_before);
    }

    #[test]
    fn test_engine_counts_relations() {
        let mut engine = ReconcileEngine::default();
        let existing = vec![
            p("01.01", "15.01", 100),
            p("15.01", "30.01", 120),
            p("01.02", "10.02", 130),
            make_price("2", 1, 1, "01.01", "30.01", 1),
        ];

        engine.merge_all(&existing, &[p("10.01", "20.01", 110)]).unwrap();

        let stats = engine.stats();
        assert_eq!(stats.incoming_merged, 1);
        assert_eq!(stats.passed_through, 1);
        assert_eq!(stats.forward_offset, 1);
        assert_eq!(stats.backward_offset, 1);
        assert_eq!(stats.untouched, 1);
        assert_eq!(stats.fragments_emitted, 2);

        engine.reset_stats();
        assert_eq!(engine.stats(), &MergeStats::default());
    }

    #[test]
    fn test_engine_rejects_malformed_input() {
        let json = r#"{
            "key": {"product_code": "1", "number": 1, "depart": 1},
            "period": {"begin": "2013-01-20T00:00:00Z", "end": "2013-01-10T00:00:00Z"},
            "value": 10
        }"#;
        let broken: PricedInterval = serde_json::from_str(json).unwrap();
        let mut engine = ReconcileEngine::default();

        let err = engine.merge_all(&[p("01.01", "30.01", 50)], &[broken]).unwrap_err();

        assert!(matches!(err, Error::InvalidPeriod { .. }));
        assert_eq!(engine.stats(), &MergeStats::default());
    }

    #[test]
    fn test_engine_grouped_matches_linear_per_key() {
        let existing = vec![
            make_price("A", 1, 1, "01.01", "15.01", 100),
            make_price("B", 1, 1, "01.01", "31.01", 5),
            make_price("A", 1, 1, "15.01", "30.01", 120),
            make_price("B", 1, 1, "01.02", "10.02", 6),
        ];
        let incoming = vec![
            make_price("B", 1, 1, "10.01", "12.01", 7),
            make_price("A", 1, 1, "10.01", "20.01", 110),
            make_price("C", 1, 1, "10.01", "20.01", 1),
            make_price("A", 1, 1, "25.01", "05.02", 120),
        ];

        let mut linear = ReconcileEngine::new(MergeConfig::default());
        let mut grouped = ReconcileEngine::new(MergeConfig {
            strategy: MergeStrategy::GroupedByKey,
            ..MergeConfig::default()
        });

        let a = linear.merge_all(&existing, &incoming).unwrap();
        let b = grouped.merge_all(&existing, &incoming).unwrap();

        for code in ["A", "B", "C"] {
            let of_key = |records: &[PricedInterval]| -> Vec<PricedInterval> {
                records
                    .iter()
                    .filter(|r| r.key().product_code == code)
                    .cloned()
                    .collect()
            };
            assert_eq!(of_key(&a), of_key(&b), "key {}", code);
        }
        assert_eq!(a.len(), b.len());
        assert_eq!(linear.stats().coalesced, grouped.stats().coalesced);
        assert_eq!(linear.stats().intersecting(), grouped.stats().intersecting());
    }

    #[test]
    fn test_audit_detects_order_dependent_overlap() {
        // The first record is trimmed against the incoming period before the
        // second one widens it, leaving an overlap behind.
        let existing = vec![p("01.01", "05.01", 10), p("06.01", "10.01", 20)];
        let incoming = vec![p("02.01", "03.01", 20)];

        let mut engine = ReconcileEngine::new(MergeConfig {
            audit_output: true,
            ..MergeConfig::default()
        });
        let merged = engine.merge_all(&existing, &incoming).unwrap();

        assert_eq!(
            merged,
            vec![
                p("01.01", "02.01", 10),
                p("03.01", "05.01", 10),
                p("02.01", "10.01", 20),
            ]
        );
        assert_eq!(find_overlaps(&merged).len(), 1);
    }
}
