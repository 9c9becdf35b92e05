//! Storage seam consumed by [`crate::service::ScheduleService`].
//!
//! The engine does not care how records are stored. Every call is async,
//! fallible and all-or-nothing.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::availability::FacultyAvailability;
use crate::error::PersistenceError;
use crate::model::{ClassId, ClassSection, Tag, TagId};

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn load_classes(&self) -> Result<Vec<ClassSection>, PersistenceError>;

    /// Inserts or replaces the given classes.
    async fn save_classes(&self, classes: &[ClassSection]) -> Result<(), PersistenceError>;

    async fn delete_class(&self, id: &ClassId) -> Result<(), PersistenceError>;

    async fn load_tags(&self) -> Result<Vec<Tag>, PersistenceError>;

    /// Replaces the whole tag catalog.
    async fn save_tags(&self, tags: &[Tag]) -> Result<(), PersistenceError>;

    async fn load_availability(
        &self,
        email: &str,
    ) -> Result<Option<FacultyAvailability>, PersistenceError>;

    async fn load_all_availability(&self) -> Result<Vec<FacultyAvailability>, PersistenceError>;

    async fn save_availability(&self, record: &FacultyAvailability) -> Result<(), PersistenceError>;
}

/// Thread-safe in-process repository.
///
/// Uses DashMap for concurrent access without external locking. Writes can
/// be switched to fail, to exercise reconciliation paths.
#[derive(Default)]
pub struct InMemoryRepository {
    classes: DashMap<ClassId, ClassSection>,
    tags: DashMap<TagId, Tag>,
    availability: DashMap<String, FacultyAvailability>,
    fail_writes: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with classes and tags.
    pub fn with_data(classes: Vec<ClassSection>, tags: Vec<Tag>) -> Self {
        let repo = Self::new();
        for class in classes {
            repo.classes.insert(class.id.clone(), class);
        }
        for tag in tags {
            repo.tags.insert(tag.id.clone(), tag);
        }
        repo
    }

    /// Makes every subsequent write return [`PersistenceError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Returns a stored class without going through the async API.
    pub fn get_class(&self, id: &ClassId) -> Option<ClassSection> {
        self.classes.get(id).map(|entry| entry.value().clone())
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(PersistenceError::Unavailable {
                message: "writes disabled".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryRepository {
    async fn load_classes(&self) -> Result<Vec<ClassSection>, PersistenceError> {
        let mut classes: Vec<ClassSection> =
            self.classes.iter().map(|entry| entry.value().clone()).collect();
        classes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(classes)
    }

    async fn save_classes(&self, classes: &[ClassSection]) -> Result<(), PersistenceError> {
        self.check_writable()?;
        for class in classes {
            self.classes.insert(class.id.clone(), class.clone());
        }
        debug!(count = classes.len(), "Saved classes");
        Ok(())
    }

    async fn delete_class(&self, id: &ClassId) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.classes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })
    }

    async fn load_tags(&self) -> Result<Vec<Tag>, PersistenceError> {
        let mut tags: Vec<Tag> = self.tags.iter().map(|entry| entry.value().clone()).collect();
        tags.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tags)
    }

    async fn save_tags(&self, tags: &[Tag]) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.tags.clear();
        for tag in tags {
            self.tags.insert(tag.id.clone(), tag.clone());
        }
        Ok(())
    }

    async fn load_availability(
        &self,
        email: &str,
    ) -> Result<Option<FacultyAvailability>, PersistenceError> {
        Ok(self
            .availability
            .get(&email.to_ascii_lowercase())
            .map(|entry| entry.value().clone()))
    }

    async fn load_all_availability(&self) -> Result<Vec<FacultyAvailability>, PersistenceError> {
        let mut records: Vec<FacultyAvailability> = self
            .availability
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(records)
    }

    async fn save_availability(&self, record: &FacultyAvailability) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.availability
            .insert(record.email.to_ascii_lowercase(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load_round_trip_sorted() {
        let repo = InMemoryRepository::new();
        let classes = vec![
            ClassSection::new("b", "CSE", "101", "A00", "Algorithms"),
            ClassSection::new("a", "CSE", "100", "A00", "Data Structures"),
        ];
        repo.save_classes(&classes).await.unwrap();

        let loaded = repo.load_classes().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, ClassId::from("a"));
    }

    #[tokio::test]
    async fn test_failing_writes_leave_store_untouched() {
        let repo = InMemoryRepository::with_data(
            vec![ClassSection::new("a", "CSE", "100", "A00", "Data Structures")],
            vec![],
        );
        repo.set_fail_writes(true);

        let err = repo.delete_class(&"a".into()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(repo.class_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_class() {
        let repo = InMemoryRepository::new();
        let err = repo.delete_class(&"ghost".into()).await.unwrap_err();
        assert_eq!(err, PersistenceError::NotFound { id: "ghost".to_string() });
    }

    #[tokio::test]
    async fn test_availability_keyed_case_insensitively() {
        let repo = InMemoryRepository::new();
        repo.save_availability(&FacultyAvailability::new("Ada@UCSD.edu", "Ada"))
            .await
            .unwrap();

        let record = repo.load_availability("ada@ucsd.edu").await.unwrap();
        assert_eq!(record.map(|r| r.name), Some("Ada".to_string()));
    }
}
