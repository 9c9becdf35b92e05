//! Per-weekday time interval normalization.
//!
//! Intervals are wall-clock `"HH:MM"` pairs compared end-exclusive by minute
//! of day. A normalized bucket is sorted by start and holds no two intervals
//! that overlap or touch.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::Weekday;

/// Parses `"HH:MM"` (or `"HH:MM:SS"`) into minutes since midnight.
pub fn parse_minutes(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

/// Formats minutes since midnight as zero-padded `"HH:MM"`.
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Half-open overlap test on `(start, end)` minute pairs.
///
/// Touching ranges (`a.end == b.start`) do not overlap.
pub fn ranges_overlap(a: (u32, u32), b: (u32, u32)) -> bool {
    !(a.1 <= b.0 || b.1 <= a.0)
}

/// A `(start, end)` pair of wall-clock times within one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

impl TimeInterval {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Returns `(start, end)` in minutes, or `None` if either side does not
    /// parse or the interval runs backwards.
    pub fn minutes(&self) -> Option<(u32, u32)> {
        let start = parse_minutes(&self.start)?;
        let end = parse_minutes(&self.end)?;
        (start <= end).then_some((start, end))
    }

    fn from_minutes(start: u32, end: u32) -> Self {
        Self::new(format_minutes(start), format_minutes(end))
    }
}

/// Merges `incoming` into an already-normalized `existing` bucket.
///
/// Degenerate entries (empty or unparseable times, end before start) are
/// dropped silently. The result is sorted and coalesced: any interval whose
/// start is at or before the running end is folded into it.
pub fn merge(existing: &[TimeInterval], incoming: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut ranges: Vec<(u32, u32)> = existing
        .iter()
        .chain(incoming)
        .filter_map(TimeInterval::minutes)
        .collect();
    ranges.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    merged
        .into_iter()
        .map(|(start, end)| TimeInterval::from_minutes(start, end))
        .collect()
}

/// Time intervals bucketed by weekday.
///
/// Used both for a class's finer-grained meeting times and for a person's
/// unavailability. A missing bucket and an empty one are equivalent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekdaySlots {
    buckets: BTreeMap<Weekday, Vec<TimeInterval>>,
}

impl PartialEq for WeekdaySlots {
    fn eq(&self, other: &Self) -> bool {
        Weekday::ALL
            .iter()
            .all(|day| self.bucket(*day) == other.bucket(*day))
    }
}

impl Eq for WeekdaySlots {}

impl Default for WeekdaySlots {
    fn default() -> Self {
        Self::new()
    }
}

impl WeekdaySlots {
    /// Creates slots with an empty bucket for each weekday.
    pub fn new() -> Self {
        Self {
            buckets: Weekday::ALL.iter().map(|day| (*day, Vec::new())).collect(),
        }
    }

    pub fn bucket(&self, day: Weekday) -> &[TimeInterval] {
        self.buckets.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends a raw interval without normalizing.
    pub fn push(&mut self, day: Weekday, interval: TimeInterval) {
        self.buckets.entry(day).or_default().push(interval);
    }

    pub fn with_interval(mut self, day: Weekday, start: &str, end: &str) -> Self {
        self.push(day, TimeInterval::new(start, end));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeInterval])> {
        self.buckets.iter().map(|(day, v)| (*day, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Replaces every bucket with its merged form.
    pub fn normalize(&mut self) {
        for bucket in self.buckets.values_mut() {
            *bucket = merge(&[], bucket);
        }
    }

    /// Merges `incoming` into `self` bucket by bucket.
    pub fn merged_with(&self, incoming: &WeekdaySlots) -> WeekdaySlots {
        let buckets = Weekday::ALL
            .iter()
            .map(|day| (*day, merge(self.bucket(*day), incoming.bucket(*day))))
            .collect();
        WeekdaySlots { buckets }
    }

    /// True if `(start, end)` minutes overlap any interval on `day`.
    pub fn blocks(&self, day: Weekday, range: (u32, u32)) -> bool {
        self.bucket(day)
            .iter()
            .filter_map(TimeInterval::minutes)
            .any(|slot| ranges_overlap(slot, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn iv(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(start, end)
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("09:30"), Some(570));
        assert_eq!(parse_minutes("9:05"), Some(545));
        assert_eq!(parse_minutes("13:00:00"), Some(780));
        assert_eq!(parse_minutes(""), None);
        assert_eq!(parse_minutes("noon"), None);
        assert_eq!(parse_minutes("25:00"), None);
    }

    #[test]
    fn test_merge_overlapping_and_disjoint() {
        let merged = merge(
            &[],
            &[iv("09:00", "10:00"), iv("09:30", "11:00"), iv("13:00", "14:00")],
        );
        assert_eq!(merged, vec![iv("09:00", "11:00"), iv("13:00", "14:00")]);
    }

    #[test]
    fn test_missing_buckets_compare_as_empty() {
        let sparse: WeekdaySlots = serde_json::from_str(r#"{"buckets":{}}"#).unwrap();
        assert_eq!(sparse, WeekdaySlots::new());

        let filled: WeekdaySlots =
            serde_json::from_str(r#"{"buckets":{"Tue":[{"start":"09:00","end":"10:00"}]}}"#)
                .unwrap();
        assert_eq!(
            filled,
            WeekdaySlots::new().with_interval(Weekday::Tue, "09:00", "10:00")
        );
        assert_ne!(filled, sparse);
    }

    #[test]
    fn test_merge_touching_intervals_coalesce() {
        let merged = merge(&[iv("09:00", "10:00")], &[iv("10:00", "10:30")]);
        assert_eq!(merged, vec![iv("09:00", "10:30")]);
    }

    #[test]
    fn test_merge_contained_interval_keeps_outer_end() {
        let merged = merge(&[iv("08:00", "12:00")], &[iv("09:00", "10:00")]);
        assert_eq!(merged, vec![iv("08:00", "12:00")]);
    }

    #[test]
    fn test_merge_drops_degenerate_entries() {
        let merged = merge(
            &[iv("08:00", "09:00")],
            &[iv("", "10:00"), iv("xx", "11:00"), iv("12:00", ""), iv("15:00", "14:00")],
        );
        assert_eq!(merged, vec![iv("08:00", "09:00")]);
    }

    #[test]
    fn test_merge_unsorted_incoming() {
        let merged = merge(
            &[iv("13:00", "14:00")],
            &[iv("16:00", "17:00"), iv("08:00", "09:00"), iv("13:30", "15:00")],
        );
        assert_eq!(
            merged,
            vec![iv("08:00", "09:00"), iv("13:00", "15:00"), iv("16:00", "17:00")]
        );
    }

    #[test]
    fn test_weekday_slots_merge_per_bucket() {
        let existing = WeekdaySlots::new().with_interval(Weekday::Mon, "09:00", "10:00");
        let incoming = WeekdaySlots::new()
            .with_interval(Weekday::Mon, "09:30", "11:00")
            .with_interval(Weekday::Fri, "13:00", "14:00");

        let merged = existing.merged_with(&incoming);
        assert_eq!(merged.bucket(Weekday::Mon), &[iv("09:00", "11:00")]);
        assert_eq!(merged.bucket(Weekday::Fri), &[iv("13:00", "14:00")]);
        assert!(merged.bucket(Weekday::Wed).is_empty());
    }

    #[test]
    fn test_blocks_is_end_exclusive() {
        let slots = WeekdaySlots::new().with_interval(Weekday::Tue, "09:00", "10:00");
        assert!(slots.blocks(Weekday::Tue, (570, 600)));
        assert!(!slots.blocks(Weekday::Tue, (600, 660)));
        assert!(!slots.blocks(Weekday::Wed, (570, 600)));
    }

    fn arb_interval() -> impl Strategy<Value = TimeInterval> {
        (0u32..1440, 0u32..240).prop_map(|(start, len)| {
            TimeInterval::from_minutes(start, (start + len).min(1439))
        })
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(raw in prop::collection::vec(arb_interval(), 0..20)) {
            let once = merge(&[], &raw);
            prop_assert_eq!(merge(&once, &[]), once.clone());
        }

        #[test]
        fn prop_merge_is_commutative(
            a in prop::collection::vec(arb_interval(), 0..15),
            b in prop::collection::vec(arb_interval(), 0..15),
        ) {
            let ab: HashSet<_> = merge(&merge(&[], &a), &b).into_iter().collect();
            let ba: HashSet<_> = merge(&merge(&[], &b), &a).into_iter().collect();
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn prop_merge_output_is_normalized(raw in prop::collection::vec(arb_interval(), 0..20)) {
            let merged = merge(&[], &raw);
            for pair in merged.windows(2) {
                let (first, second) = (pair[0].minutes().unwrap(), pair[1].minutes().unwrap());
                prop_assert!(first.1 < second.0);
            }
        }
    }
}
