/// Faculty unavailability records and their merge entry point
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::interval::{parse_minutes, WeekdaySlots};
use crate::model::{ClassId, ClassSection, Weekday};

/// Merges raw per-weekday candidates into an existing normalized record.
///
/// Each weekday bucket is merged independently; malformed candidates are
/// dropped.
pub fn merge_availability(existing: &WeekdaySlots, incoming: &WeekdaySlots) -> WeekdaySlots {
    existing.merged_with(incoming)
}

/// Times a faculty member cannot teach, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyAvailability {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub unavailable: WeekdaySlots,
}

impl FacultyAvailability {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            unavailable: WeekdaySlots::new(),
        }
    }

    /// Folds new time-off into this record, keeping it normalized.
    pub fn add_unavailability(&mut self, incoming: &WeekdaySlots) {
        self.unavailable = merge_availability(&self.unavailable, incoming);
    }
}

/// A class that meets while its instructor is marked unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityClash {
    pub class_id: ClassId,
    pub instructor_email: String,
    pub day: Weekday,
}

/// Lists every (class, day) where the class meets during its instructor's
/// time-off. Classes without an email or parseable times are skipped.
pub fn find_clashes(
    classes: &[ClassSection],
    records: &[FacultyAvailability],
) -> Vec<AvailabilityClash> {
    let by_email: HashMap<String, &FacultyAvailability> = records
        .iter()
        .map(|r| (r.email.to_ascii_lowercase(), r))
        .collect();

    let mut clashes = Vec::new();
    for class in classes {
        let props = &class.props;
        let Some(email) = props.instructor_email.as_deref().map(str::trim) else {
            continue;
        };
        let Some(record) = by_email.get(&email.to_ascii_lowercase()) else {
            continue;
        };
        let range = match (
            props.start_time.as_deref().and_then(parse_minutes),
            props.end_time.as_deref().and_then(parse_minutes),
        ) {
            (Some(start), Some(end)) if start < end => (start, end),
            _ => continue,
        };

        for day in &props.days {
            if record.unavailable.blocks(*day, range) {
                clashes.push(AvailabilityClash {
                    class_id: class.id.clone(),
                    instructor_email: record.email.clone(),
                    day: *day,
                });
            }
        }
    }

    clashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::TimeInterval;

    #[test]
    fn test_add_unavailability_merges_per_day() {
        let mut record = FacultyAvailability::new("ada@ucsd.edu", "Ada");
        record.add_unavailability(
            &WeekdaySlots::new()
                .with_interval(Weekday::Mon, "09:00", "10:00")
                .with_interval(Weekday::Mon, "13:00", "14:00"),
        );
        record.add_unavailability(
            &WeekdaySlots::new()
                .with_interval(Weekday::Mon, "09:30", "11:00")
                .with_interval(Weekday::Tue, "", "11:00"),
        );

        assert_eq!(
            record.unavailable.bucket(Weekday::Mon),
            &[
                TimeInterval::new("09:00", "11:00"),
                TimeInterval::new("13:00", "14:00")
            ]
        );
        assert!(record.unavailable.bucket(Weekday::Tue).is_empty());
    }

    #[test]
    fn test_find_clashes() {
        let mut record = FacultyAvailability::new("Ada@ucsd.edu", "Ada");
        record.add_unavailability(&WeekdaySlots::new().with_interval(Weekday::Wed, "12:00", "14:00"));

        let clashing = ClassSection::new("1", "CSE", "100", "A00", "Data Structures")
            .with_days([Weekday::Mon, Weekday::Wed])
            .with_time("13:00", "13:50")
            .with_instructor("Ada", Some("ada@ucsd.edu"));
        let after = ClassSection::new("2", "CSE", "101", "A00", "Algorithms")
            .with_days([Weekday::Wed])
            .with_time("14:00", "15:00")
            .with_instructor("Ada", Some("ada@ucsd.edu"));
        let other = ClassSection::new("3", "CSE", "105", "A00", "Theory")
            .with_days([Weekday::Wed])
            .with_time("13:00", "13:50")
            .with_instructor("Grace", Some("grace@ucsd.edu"));

        let clashes = find_clashes(&[clashing, after, other], &[record]);
        assert_eq!(
            clashes,
            vec![AvailabilityClash {
                class_id: ClassId::from("1"),
                instructor_email: "Ada@ucsd.edu".to_string(),
                day: Weekday::Wed,
            }]
        );
    }
}
