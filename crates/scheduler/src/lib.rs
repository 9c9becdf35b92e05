//! Scheduling consistency engine for department course schedules.
//!
//! Detects room/instructor/cohort conflicts between class sections, merges
//! per-weekday time intervals, and keeps a tag ↔ class index in step with
//! the class collection.

pub mod availability;
pub mod config;
pub mod conflict;
pub mod error;
pub mod filter;
pub mod interval;
pub mod model;
pub mod persistence;
pub mod service;
pub mod store;
pub mod tags;
pub mod telemetry;

pub use availability::{merge_availability, FacultyAvailability};
pub use config::SchedulerConfig;
pub use conflict::ConflictDetector;
pub use error::{ConfigError, PersistenceError};
pub use filter::TagFilter;
pub use interval::{merge, TimeInterval, WeekdaySlots};
pub use model::{ClassId, ClassSection, Conflict, ConflictDimension, ConflictKind, Tag, TagId, Weekday};
pub use persistence::{InMemoryRepository, ScheduleRepository};
pub use service::ScheduleService;
pub use store::{ScheduleCommand, ScheduleStore};
pub use tags::TagIndex;
