//! Store plus repository: applies each mutation in memory, then persists it.
//!
//! A failed write is returned to the caller but the in-memory change stays
//! applied. Callers that want to resynchronize call
//! [`ScheduleService::reload`].

use tracing::{error, info, warn};

use crate::availability::{find_clashes, AvailabilityClash, FacultyAvailability};
use crate::config::SchedulerConfig;
use crate::error::PersistenceError;
use crate::interval::WeekdaySlots;
use crate::model::{ClassId, ClassSection, Tag, TagId};
use crate::persistence::ScheduleRepository;
use crate::store::ScheduleStore;

pub struct ScheduleService<R> {
    store: ScheduleStore,
    repo: R,
}

impl<R: ScheduleRepository> ScheduleService<R> {
    /// Creates a service with an empty store.
    pub fn new(repo: R, config: &SchedulerConfig) -> Self {
        Self {
            store: ScheduleStore::new(config),
            repo,
        }
    }

    /// Creates a service and fills the store from the repository.
    pub async fn load(repo: R, config: &SchedulerConfig) -> Result<Self, PersistenceError> {
        let mut service = Self::new(repo, config);
        service.reload().await?;
        Ok(service)
    }

    /// Replaces in-memory state with the repository's ground truth.
    pub async fn reload(&mut self) -> Result<(), PersistenceError> {
        let classes = self.repo.load_classes().await.map_err(|e| {
            error!(error = %e, "Failed to load classes");
            e
        })?;
        let tags = self.repo.load_tags().await.map_err(|e| {
            error!(error = %e, "Failed to load tag catalog");
            e
        })?;

        self.store.initialize(classes, tags);
        Ok(())
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    /// Direct access for pure operations such as conflict recomputation.
    pub fn store_mut(&mut self) -> &mut ScheduleStore {
        &mut self.store
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Adds classes, generating ids for those without one, and saves the
    /// ones actually added. Returns how many were added.
    pub async fn create_classes(
        &mut self,
        classes: Vec<ClassSection>,
    ) -> Result<usize, PersistenceError> {
        let classes: Vec<ClassSection> = classes
            .into_iter()
            .map(|mut class| {
                if class.id.as_str().is_empty() {
                    class.id = ClassId::generate();
                }
                class
            })
            .collect();

        // Added classes are appended, so they form the tail of the collection
        let before = self.store.classes().len();
        let added = self.store.add_classes(classes);
        let new_ids: Vec<ClassId> = self.store.classes()[before..]
            .iter()
            .map(|c| c.id.clone())
            .collect();

        self.persist_classes(&new_ids, "create").await?;
        info!(added, "Created classes");
        Ok(added)
    }

    /// Returns `Ok(false)` when the id is unknown; nothing is written then.
    pub async fn update_class(&mut self, updated: ClassSection) -> Result<bool, PersistenceError> {
        let id = updated.id.clone();
        if !self.store.update_class(updated) {
            return Ok(false);
        }
        self.persist_classes(&[id], "update").await?;
        Ok(true)
    }

    pub async fn delete_class(&mut self, id: &ClassId) -> Result<bool, PersistenceError> {
        if self.store.delete_class(id).is_none() {
            return Ok(false);
        }
        self.repo.delete_class(id).await.map_err(|e| {
            error!(class_id = %id, error = %e, "Failed to delete class from storage");
            e
        })?;
        Ok(true)
    }

    pub async fn link_tag(&mut self, tag: &TagId, class_id: &ClassId) -> Result<bool, PersistenceError> {
        if !self.store.link_tag(tag, class_id) {
            return Ok(false);
        }
        self.persist_classes(std::slice::from_ref(class_id), "link_tag")
            .await?;
        Ok(true)
    }

    pub async fn unlink_tag(&mut self, tag: &TagId, class_id: &ClassId) -> Result<bool, PersistenceError> {
        if !self.store.unlink_tag(tag, class_id) {
            return Ok(false);
        }
        self.persist_classes(std::slice::from_ref(class_id), "unlink_tag")
            .await?;
        Ok(true)
    }

    pub async fn unlink_all_tags_from_class(&mut self, class_id: &ClassId) -> Result<(), PersistenceError> {
        self.store.unlink_all_tags_from_class(class_id);
        self.persist_classes(std::slice::from_ref(class_id), "unlink_all_tags_from_class")
            .await
    }

    pub async fn unlink_all_classes_from_tag(&mut self, tag: &TagId) -> Result<(), PersistenceError> {
        let affected = self.store.unlink_all_classes_from_tag(tag);
        self.persist_classes(&affected, "unlink_all_classes_from_tag")
            .await
    }

    pub async fn unlink_all_tags(&mut self) -> Result<(), PersistenceError> {
        let ids: Vec<ClassId> = self
            .store
            .classes()
            .iter()
            .filter(|c| !c.props.tags.is_empty())
            .map(|c| c.id.clone())
            .collect();
        self.store.unlink_all_tags();
        self.persist_classes(&ids, "unlink_all_tags").await
    }

    pub async fn add_tag(&mut self, tag: Tag) -> Result<bool, PersistenceError> {
        if !self.store.add_tag(tag) {
            return Ok(false);
        }
        self.persist_catalog().await?;
        Ok(true)
    }

    /// Removes a tag from the catalog and from every class carrying it.
    pub async fn remove_tag(&mut self, tag: &TagId) -> Result<(), PersistenceError> {
        let affected = self.store.remove_tag(tag);
        self.persist_catalog().await?;
        self.persist_classes(&affected, "remove_tag").await
    }

    /// Merges new time-off into a person's record and saves it.
    pub async fn record_unavailability(
        &self,
        email: &str,
        name: &str,
        incoming: &WeekdaySlots,
    ) -> Result<FacultyAvailability, PersistenceError> {
        let mut record = self
            .repo
            .load_availability(email)
            .await?
            .unwrap_or_else(|| FacultyAvailability::new(email, name));
        record.add_unavailability(incoming);

        self.repo.save_availability(&record).await.map_err(|e| {
            error!(email, error = %e, "Failed to save unavailability");
            e
        })?;
        Ok(record)
    }

    /// Classes meeting while their instructor is marked unavailable.
    pub async fn availability_clashes(&self) -> Result<Vec<AvailabilityClash>, PersistenceError> {
        let records = self.repo.load_all_availability().await?;
        let clashes = find_clashes(self.store.classes(), &records);
        if !clashes.is_empty() {
            warn!(count = clashes.len(), "Classes scheduled during instructor time-off");
        }
        Ok(clashes)
    }

    async fn persist_classes(&self, ids: &[ClassId], operation: &str) -> Result<(), PersistenceError> {
        let classes: Vec<ClassSection> = ids
            .iter()
            .filter_map(|id| self.store.class(id).cloned())
            .collect();
        if classes.is_empty() {
            return Ok(());
        }

        self.repo.save_classes(&classes).await.map_err(|e| {
            error!(
                operation,
                count = classes.len(),
                error = %e,
                "Failed to persist classes; in-memory state kept"
            );
            e
        })
    }

    async fn persist_catalog(&self) -> Result<(), PersistenceError> {
        self.repo
            .save_tags(self.store.tag_catalog())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist tag catalog");
                e
            })
    }
}
