/// Types for class section and tag data
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::Weekday;

/// Opaque, unique identifier of a class section.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id for a class created without one.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ClassId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a tag in the tag catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TagId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A catalog entry for a tag. Tags may exist in the catalog before any
/// class carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TagId::new(id),
            name: name.into(),
            category: None,
        }
    }
}

/// Meeting pattern, placement and bookkeeping of a class section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProps {
    #[serde(default)]
    pub days: BTreeSet<Weekday>,
    /// Wall-clock start, "HH:MM"
    #[serde(default)]
    pub start_time: Option<String>,
    /// Wall-clock end, "HH:MM"
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub instructor_email: Option<String>,
    #[serde(default)]
    pub cohort: Option<String>,
    #[serde(default)]
    pub enrollment: u32,
    #[serde(default)]
    pub waitlist: u32,
    /// Ordered, without duplicates. Only mutate through the tag index
    /// operations.
    #[serde(default)]
    pub tags: Vec<TagId>,
}

/// One scheduled offering of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSection {
    pub id: ClassId,
    pub subject: String,        // e.g., "CSE"
    pub course_number: String,  // e.g., "100"
    pub section: String,        // e.g., "A01"
    pub title: String,
    #[serde(default)]
    pub props: ClassProps,
}

impl ClassSection {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        course_number: impl Into<String>,
        section: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: ClassId::new(id),
            subject: subject.into(),
            course_number: course_number.into(),
            section: section.into(),
            title: title.into(),
            props: ClassProps::default(),
        }
    }

    pub fn with_days<I: IntoIterator<Item = Weekday>>(mut self, days: I) -> Self {
        self.props.days = days.into_iter().collect();
        self
    }

    pub fn with_time(mut self, start: &str, end: &str) -> Self {
        self.props.start_time = Some(start.to_string());
        self.props.end_time = Some(end.to_string());
        self
    }

    pub fn with_room(mut self, room: &str) -> Self {
        self.props.room = Some(room.to_string());
        self
    }

    pub fn with_instructor(mut self, name: &str, email: Option<&str>) -> Self {
        self.props.instructor = Some(name.to_string());
        self.props.instructor_email = email.map(str::to_string);
        self
    }

    pub fn with_cohort(mut self, cohort: &str) -> Self {
        self.props.cohort = Some(cohort.to_string());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagId>,
    {
        for tag in tags {
            let tag = tag.into();
            if !self.props.tags.contains(&tag) {
                self.props.tags.push(tag);
            }
        }
        self
    }

    /// "SUBJ NUM", e.g. "CSE 100"
    pub fn course_code(&self) -> String {
        format!("{} {}", self.subject, self.course_number)
    }

    pub fn has_tag(&self, tag: &TagId) -> bool {
        self.props.tags.contains(tag)
    }

    /// Reports whether start <= end when both times parse. Weekdays are
    /// restricted to Mon-Fri by the `Weekday` type itself.
    pub fn is_well_formed(&self) -> bool {
        use crate::interval::parse_minutes;

        match (
            self.props.start_time.as_deref().and_then(parse_minutes),
            self.props.end_time.as_deref().and_then(parse_minutes),
        ) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}

/// An axis along which two overlapping sections may collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictDimension {
    Room,
    Instructor,
    Cohort,
}

impl ConflictDimension {
    pub fn label(self) -> &'static str {
        match self {
            ConflictDimension::Room => "room",
            ConflictDimension::Instructor => "instructor",
            ConflictDimension::Cohort => "cohort",
        }
    }
}

/// Classification of a conflict by the dimensions that collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "room + instructor")]
    RoomInstructor,
    #[serde(rename = "room + cohort")]
    RoomCohort,
    #[serde(rename = "instructor + cohort")]
    InstructorCohort,
    #[serde(rename = "room")]
    Room,
    #[serde(rename = "instructor")]
    Instructor,
    #[serde(rename = "cohort")]
    Cohort,
}

impl ConflictKind {
    /// Returns `None` for an empty dimension set; overlap alone is not a
    /// conflict.
    pub fn from_dimensions(dimensions: &BTreeSet<ConflictDimension>) -> Option<Self> {
        use ConflictDimension::*;

        let room = dimensions.contains(&Room);
        let instructor = dimensions.contains(&Instructor);
        let cohort = dimensions.contains(&Cohort);

        match (room, instructor, cohort) {
            (true, true, true) => Some(ConflictKind::All),
            (true, true, false) => Some(ConflictKind::RoomInstructor),
            (true, false, true) => Some(ConflictKind::RoomCohort),
            (false, true, true) => Some(ConflictKind::InstructorCohort),
            (true, false, false) => Some(ConflictKind::Room),
            (false, true, false) => Some(ConflictKind::Instructor),
            (false, false, true) => Some(ConflictKind::Cohort),
            (false, false, false) => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConflictKind::All => "all",
            ConflictKind::RoomInstructor => "room + instructor",
            ConflictKind::RoomCohort => "room + cohort",
            ConflictKind::InstructorCohort => "instructor + cohort",
            ConflictKind::Room => "room",
            ConflictKind::Instructor => "instructor",
            ConflictKind::Cohort => "cohort",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A derived timing conflict between two distinct sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub a: ClassId,
    pub b: ClassId,
    pub dimensions: BTreeSet<ConflictDimension>,
    pub kind: ConflictKind,
}

impl Conflict {
    /// Builds a conflict record, or `None` when no dimension collides or
    /// both ids are the same section.
    pub fn new(a: ClassId, b: ClassId, dimensions: BTreeSet<ConflictDimension>) -> Option<Self> {
        if a == b {
            return None;
        }
        let kind = ConflictKind::from_dimensions(&dimensions)?;
        Some(Self {
            a,
            b,
            dimensions,
            kind,
        })
    }

    pub fn involves(&self, id: &ClassId) -> bool {
        &self.a == id || &self.b == id
    }
}
