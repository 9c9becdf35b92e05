//! Pairwise timing-conflict detection between class sections.

use std::collections::BTreeSet;
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::interval::{parse_minutes, ranges_overlap};
use crate::model::{ClassSection, Conflict, ConflictDimension};

/// Room value that never collides with anything.
pub const OFF_CAMPUS_ROOM: &str = "Off Campus";

/// A class that has a weekday and both times, with its times resolved.
///
/// A blank time string still counts as present and resolves to midnight.
struct Candidate<'a> {
    class: &'a ClassSection,
    start: u32,
    end: u32,
}

impl<'a> Candidate<'a> {
    fn from_class(class: &'a ClassSection) -> Option<Self> {
        let props = &class.props;
        if props.days.is_empty() {
            return None;
        }
        let start = props.start_time.as_deref()?;
        let end = props.end_time.as_deref()?;

        // Blank or unparseable times resolve to minute 0 rather than dropping the class
        Some(Self {
            class,
            start: parse_minutes(start).unwrap_or(0),
            end: parse_minutes(end).unwrap_or(0),
        })
    }
}

/// Finds and classifies every pairwise conflict in a class collection.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    off_campus_room: String,
    exclude_same_course: bool,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self {
            off_campus_room: OFF_CAMPUS_ROOM.to_string(),
            exclude_same_course: true,
        }
    }
}

impl ConflictDetector {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            off_campus_room: config.off_campus_room.clone(),
            exclude_same_course: config.exclude_same_course,
        }
    }

    /// Scans every unordered pair of schedulable classes.
    ///
    /// Quadratic in the number of classes; output follows pair-scan order.
    pub fn detect<'a, I>(&self, classes: I) -> Vec<Conflict>
    where
        I: IntoIterator<Item = &'a ClassSection>,
    {
        let mut total = 0usize;
        let candidates: Vec<Candidate<'a>> = classes
            .into_iter()
            .inspect(|_| total += 1)
            .filter_map(Candidate::from_class)
            .collect();

        let mut conflicts = Vec::new();
        for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                if let Some(conflict) = self.check_pair(a, b) {
                    conflicts.push(conflict);
                }
            }
        }

        debug!(
            classes = total,
            candidates = candidates.len(),
            conflicts = conflicts.len(),
            "Conflict detection finished"
        );

        conflicts
    }

    fn check_pair(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> Option<Conflict> {
        if !ranges_overlap((a.start, a.end), (b.start, b.end)) {
            return None;
        }
        if a.class.props.days.is_disjoint(&b.class.props.days) {
            return None;
        }
        if self.exclude_same_course && same_course(a.class, b.class) {
            return None;
        }

        let mut dimensions = BTreeSet::new();
        if self.room_collides(a.class, b.class) {
            dimensions.insert(ConflictDimension::Room);
        }
        if instructor_collides(a, b) {
            dimensions.insert(ConflictDimension::Instructor);
        }
        if cohort_collides(a.class, b.class) {
            dimensions.insert(ConflictDimension::Cohort);
        }

        Conflict::new(a.class.id.clone(), b.class.id.clone(), dimensions)
    }

    fn room_collides(&self, a: &ClassSection, b: &ClassSection) -> bool {
        match (non_empty(&a.props.room), non_empty(&b.props.room)) {
            (Some(ra), Some(rb)) => ra != self.off_campus_room && ra == rb,
            _ => false,
        }
    }
}

/// Cross-listed or duplicated rows of one course are never in conflict.
// TODO: same-title matching can hide real conflicts between distinct
// sections that share a generic title ("Special Topics"); needs a ruling
// from the scheduling office before tightening.
fn same_course(a: &ClassSection, b: &ClassSection) -> bool {
    let same_code = !a.course_number.is_empty()
        && a.subject == b.subject
        && a.course_number == b.course_number;
    let same_title = !a.title.trim().is_empty() && a.title == b.title;
    same_code || same_title
}

fn instructor_collides(a: &Candidate<'_>, b: &Candidate<'_>) -> bool {
    // Team-taught and cross-listed sections meet in the exact same slot
    if a.start == b.start && a.end == b.end {
        return false;
    }

    let (pa, pb) = (&a.class.props, &b.class.props);
    match (non_empty(&pa.instructor_email), non_empty(&pb.instructor_email)) {
        (Some(ea), Some(eb)) => ea.eq_ignore_ascii_case(eb),
        _ => match (non_empty(&pa.instructor), non_empty(&pb.instructor)) {
            (Some(na), Some(nb)) => na == nb,
            _ => false,
        },
    }
}

fn cohort_collides(a: &ClassSection, b: &ClassSection) -> bool {
    match (non_empty(&a.props.cohort), non_empty(&b.props.cohort)) {
        (Some(ca), Some(cb)) => ca == cb,
        _ => false,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Reports whether an edit touched any field conflict detection reads.
pub fn is_timing_relevant_change(old: &ClassSection, new: &ClassSection) -> bool {
    let (o, n) = (&old.props, &new.props);
    o.days != n.days
        || o.start_time != n.start_time
        || o.end_time != n.end_time
        || o.room != n.room
        || o.instructor != n.instructor
        || o.instructor_email != n.instructor_email
        || o.cohort != n.cohort
        || old.subject != new.subject
        || old.course_number != new.course_number
        || old.title != new.title
}

/// Orders conflicts by their id pair for stable presentation.
pub fn sort_conflicts(conflicts: &mut [Conflict]) {
    conflicts.sort_by(|x, y| (&x.a, &x.b).cmp(&(&y.a, &y.b)));
}
