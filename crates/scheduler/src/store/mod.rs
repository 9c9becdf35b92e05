//! Schedule state container.
//!
//! [`ScheduleStore`] owns the class collection, the tag catalog, the derived
//! [`TagIndex`] and the derived conflict list. The index is kept in step with
//! every mutation and always equals a rebuild from the current classes and
//! catalog. Conflicts are quadratic to compute, so mutations only bump
//! a version counter and callers recompute once after a batch of edits.

mod command;

pub use command::ScheduleCommand;

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::conflict::{is_timing_relevant_change, ConflictDetector};
use crate::filter::TagFilter;
use crate::model::{ClassId, ClassSection, Conflict, Tag, TagId};
use crate::tags::TagIndex;

#[derive(Debug, Clone)]
pub struct ScheduleStore {
    classes: Vec<ClassSection>,
    tag_catalog: Vec<Tag>,
    tag_index: TagIndex,
    filter: TagFilter,
    conflicts: Vec<Conflict>,
    detector: ConflictDetector,
    /// Bumped by every mutation that can change the conflict list
    version: u64,
    /// Value of `version` when `conflicts` was last computed
    conflicts_version: u64,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}

impl ScheduleStore {
    /// Creates an empty store. Conflicts start out dirty.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            classes: Vec::new(),
            tag_catalog: Vec::new(),
            tag_index: TagIndex::new(),
            filter: TagFilter::default(),
            conflicts: Vec::new(),
            detector: ConflictDetector::new(config),
            version: 1,
            conflicts_version: 0,
        }
    }

    /// Single entry point for command-style callers.
    pub fn apply(&mut self, command: ScheduleCommand) {
        debug!(command = command.name(), version = self.version, "Applying schedule command");

        match command {
            ScheduleCommand::Initialize { classes, tags } => self.initialize(classes, tags),
            ScheduleCommand::SetClasses(classes) => self.set_classes(classes),
            ScheduleCommand::AddClasses(classes) => {
                self.add_classes(classes);
            }
            ScheduleCommand::UpdateClass(class) => {
                self.update_class(class);
            }
            ScheduleCommand::DeleteClass(id) => {
                self.delete_class(&id);
            }
            ScheduleCommand::LinkTag { tag, class_id } => {
                self.link_tag(&tag, &class_id);
            }
            ScheduleCommand::UnlinkTag { tag, class_id } => {
                self.unlink_tag(&tag, &class_id);
            }
            ScheduleCommand::UnlinkAllTagsFromClass(id) => self.unlink_all_tags_from_class(&id),
            ScheduleCommand::UnlinkAllClassesFromTag(tag) => {
                self.unlink_all_classes_from_tag(&tag);
            }
            ScheduleCommand::UnlinkAllTags => self.unlink_all_tags(),
            ScheduleCommand::AddTag(tag) => {
                self.add_tag(tag);
            }
            ScheduleCommand::RemoveTag(tag) => {
                self.remove_tag(&tag);
            }
            ScheduleCommand::SetFilter(filter) => self.set_filter(filter),
            ScheduleCommand::RecomputeConflicts => self.recompute_conflicts(),
        }
    }

    /// Replaces classes and catalog, rebuilding the index with every
    /// catalog tag seeded. Previously computed conflicts are discarded.
    pub fn initialize(&mut self, classes: Vec<ClassSection>, tags: Vec<Tag>) {
        self.tag_catalog = tags;
        self.classes = drop_duplicate_ids(&mut HashSet::new(), classes);
        self.tag_index = TagIndex::rebuild(&self.classes, &self.catalog_ids());
        self.conflicts.clear();
        self.mark_dirty();

        info!(
            classes = self.classes.len(),
            tags = self.tag_catalog.len(),
            "Schedule store initialized"
        );
    }

    /// Bulk replace, keeping the current catalog. Repeated ids keep their
    /// first occurrence.
    pub fn set_classes(&mut self, classes: Vec<ClassSection>) {
        self.classes = drop_duplicate_ids(&mut HashSet::new(), classes);
        self.tag_index = TagIndex::rebuild(&self.classes, &self.catalog_ids());
        self.mark_dirty();

        info!(classes = self.classes.len(), "Class collection replaced");
    }

    /// Appends classes. Ids already present (or repeated within the batch)
    /// are skipped. Returns the number added.
    pub fn add_classes(&mut self, classes: Vec<ClassSection>) -> usize {
        let mut seen: HashSet<ClassId> = self.classes.iter().map(|c| c.id.clone()).collect();
        let fresh = drop_duplicate_ids(&mut seen, classes);
        if fresh.is_empty() {
            return 0;
        }

        self.tag_index.on_classes_added(&fresh);
        let added = fresh.len();
        self.classes.extend(fresh);
        self.mark_dirty();

        debug!(added, total = self.classes.len(), "Classes added");
        added
    }

    /// Replaces a class by id. The stored tag list is kept; tag changes go
    /// through the tag operations. Returns false for an unknown id.
    pub fn update_class(&mut self, mut updated: ClassSection) -> bool {
        let Some(existing) = self.classes.iter_mut().find(|c| c.id == updated.id) else {
            debug!(class_id = %updated.id, "Update for unknown class ignored");
            return false;
        };

        if updated.props.tags != existing.props.tags {
            debug!(
                class_id = %updated.id,
                "Tag list changes in updates are ignored"
            );
        }
        updated.props.tags = std::mem::take(&mut existing.props.tags);

        let timing_changed = is_timing_relevant_change(existing, &updated);
        *existing = updated;
        if timing_changed {
            self.mark_dirty();
        }
        true
    }

    /// Removes a class and drops it from the tag index.
    pub fn delete_class(&mut self, id: &ClassId) -> Option<ClassSection> {
        let position = self.classes.iter().position(|c| &c.id == id)?;
        let removed = self.classes.remove(position);
        self.tag_index.on_class_deleted(id);
        self.reseed_catalog();
        self.mark_dirty();

        debug!(class_id = %id, "Class deleted");
        Some(removed)
    }

    pub fn link_tag(&mut self, tag: &TagId, class_id: &ClassId) -> bool {
        let changed = self
            .tag_index
            .link_tag_to_class(&mut self.classes, tag, class_id);
        if changed {
            self.visibility_may_have_changed();
        }
        changed
    }

    pub fn unlink_tag(&mut self, tag: &TagId, class_id: &ClassId) -> bool {
        let changed = self
            .tag_index
            .unlink_tag_from_class(&mut self.classes, tag, class_id);
        if changed {
            self.reseed_catalog();
            self.visibility_may_have_changed();
        }
        changed
    }

    pub fn unlink_all_tags_from_class(&mut self, class_id: &ClassId) {
        self.tag_index
            .unlink_all_tags_from_class(&mut self.classes, class_id);
        self.reseed_catalog();
        self.visibility_may_have_changed();
    }

    /// Returns the ids of classes that carried the tag.
    pub fn unlink_all_classes_from_tag(&mut self, tag: &TagId) -> Vec<ClassId> {
        let affected: Vec<ClassId> = self
            .tag_index
            .classes_for(tag)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();

        self.tag_index
            .unlink_all_classes_from_tag(&mut self.classes, tag);
        self.reseed_catalog();
        if !affected.is_empty() {
            self.visibility_may_have_changed();
        }
        affected
    }

    pub fn unlink_all_tags(&mut self) {
        self.tag_index
            .unlink_all_tags_from_all_classes(&mut self.classes);
        self.reseed_catalog();
        self.visibility_may_have_changed();
    }

    /// Adds a catalog tag. Returns false if the id is already catalogued.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        if self.tag_catalog.iter().any(|t| t.id == tag.id) {
            return false;
        }
        self.tag_index.seed(&tag.id);
        self.tag_catalog.push(tag);
        true
    }

    /// Removes a tag from the catalog, every class, and the filter.
    /// Returns the ids of classes that carried it.
    pub fn remove_tag(&mut self, tag: &TagId) -> Vec<ClassId> {
        self.tag_catalog.retain(|t| &t.id != tag);
        let affected = self.unlink_all_classes_from_tag(tag);
        if self.filter.forget(tag) {
            self.mark_dirty();
        }
        affected
    }

    /// Changes which classes are visible to conflict detection and readers.
    pub fn set_filter(&mut self, filter: TagFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.mark_dirty();
        }
    }

    /// Runs the detector over the visible classes and swaps in the result.
    pub fn recompute_conflicts(&mut self) {
        let conflicts = self.detector.detect(self.display_classes());
        self.conflicts = conflicts;
        self.conflicts_version = self.version;

        info!(
            conflicts = self.conflicts.len(),
            version = self.version,
            "Conflicts recomputed"
        );
    }

    /// Recomputes only if a mutation happened since the last computation.
    /// Returns whether a recomputation ran.
    pub fn recompute_if_dirty(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        self.recompute_conflicts();
        true
    }

    pub fn mark_dirty(&mut self) {
        self.version += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.conflicts_version != self.version
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn classes(&self) -> &[ClassSection] {
        &self.classes
    }

    pub fn class(&self, id: &ClassId) -> Option<&ClassSection> {
        self.classes.iter().find(|c| &c.id == id)
    }

    /// Classes passing the current tag filter, in collection order.
    pub fn display_classes(&self) -> impl Iterator<Item = &ClassSection> {
        self.classes.iter().filter(|c| self.filter.matches(c))
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    /// Last computed conflicts. May be stale; check [`Self::is_dirty`].
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn conflicts_for<'a>(&'a self, id: &'a ClassId) -> impl Iterator<Item = &'a Conflict> {
        self.conflicts.iter().filter(move |c| c.involves(id))
    }

    pub fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }

    pub fn tag_catalog(&self) -> &[Tag] {
        &self.tag_catalog
    }

    fn catalog_ids(&self) -> Vec<TagId> {
        self.tag_catalog.iter().map(|t| t.id.clone()).collect()
    }

    /// Catalog tags keep an entry even after their last class is unlinked.
    fn reseed_catalog(&mut self) {
        for tag in &self.tag_catalog {
            self.tag_index.seed(&tag.id);
        }
    }

    fn visibility_may_have_changed(&mut self) {
        if !self.filter.is_empty() {
            self.mark_dirty();
        }
    }
}

/// Keeps the first class for each id not already in `seen`.
fn drop_duplicate_ids(seen: &mut HashSet<ClassId>, classes: Vec<ClassSection>) -> Vec<ClassSection> {
    let total = classes.len();
    let fresh: Vec<ClassSection> = classes
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect();

    if fresh.len() < total {
        warn!(
            skipped = total - fresh.len(),
            "Ignoring classes whose id is already in the schedule"
        );
    }
    fresh
}
