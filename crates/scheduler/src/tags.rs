//! Bidirectional tag ↔ class index.
//!
//! The index is derived from the tag lists on each [`ClassSection`]. For
//! every class `C` and tag `T`, `T ∈ C.tags` exactly when `C.id ∈ index[T]`.
//! Every operation that changes a tag list goes through this module so
//! both sides move together. An entry whose class set becomes empty is
//! removed.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::model::{ClassId, ClassSection, TagId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    entries: BTreeMap<TagId, BTreeSet<ClassId>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from scratch.
    ///
    /// `known_tags` seeds empty entries so catalog tags with no classes are
    /// still enumerable. This is the reference every incremental operation
    /// must agree with.
    pub fn rebuild(classes: &[ClassSection], known_tags: &[TagId]) -> Self {
        let mut index = TagIndex::new();
        for tag in known_tags {
            index.seed(tag);
        }
        index.on_classes_added(classes);
        index
    }

    /// Indexes the tags of newly added classes, creating entries as needed.
    pub fn on_classes_added(&mut self, classes: &[ClassSection]) {
        for class in classes {
            for tag in &class.props.tags {
                self.entries
                    .entry(tag.clone())
                    .or_default()
                    .insert(class.id.clone());
            }
        }
    }

    /// Ensures a (possibly empty) entry exists for a catalog tag.
    pub fn seed(&mut self, tag: &TagId) {
        self.entries.entry(tag.clone()).or_default();
    }

    /// Drops a class that no longer exists from every entry.
    pub fn on_class_deleted(&mut self, class_id: &ClassId) {
        self.remove_class_everywhere(class_id);
    }

    /// Attaches `tag` to a class. Returns false if the class is unknown or
    /// already carries the tag.
    pub fn link_tag_to_class(
        &mut self,
        classes: &mut [ClassSection],
        tag: &TagId,
        class_id: &ClassId,
    ) -> bool {
        let Some(class) = find_class(classes, class_id) else {
            return false;
        };
        if class.has_tag(tag) {
            return false;
        }

        class.props.tags.push(tag.clone());
        self.entries
            .entry(tag.clone())
            .or_default()
            .insert(class_id.clone());
        true
    }

    /// Detaches `tag` from one class. Unknown tags or classes are no-ops.
    pub fn unlink_tag_from_class(
        &mut self,
        classes: &mut [ClassSection],
        tag: &TagId,
        class_id: &ClassId,
    ) -> bool {
        let mut changed = false;

        if let Some(ids) = self.entries.get_mut(tag) {
            changed |= ids.remove(class_id);
            if changed && ids.is_empty() {
                self.entries.remove(tag);
            }
        }
        if let Some(class) = find_class(classes, class_id) {
            let before = class.props.tags.len();
            class.props.tags.retain(|t| t != tag);
            changed |= class.props.tags.len() != before;
        }

        changed
    }

    /// Clears a class's tag list and drops it from every entry.
    pub fn unlink_all_tags_from_class(
        &mut self,
        classes: &mut [ClassSection],
        class_id: &ClassId,
    ) {
        self.remove_class_everywhere(class_id);
        if let Some(class) = find_class(classes, class_id) {
            class.props.tags.clear();
        }
    }

    /// Removes `tag` from every class carrying it, then drops the entry.
    pub fn unlink_all_classes_from_tag(&mut self, classes: &mut [ClassSection], tag: &TagId) {
        let Some(ids) = self.entries.remove(tag) else {
            return;
        };

        for class in classes.iter_mut().filter(|c| ids.contains(&c.id)) {
            class.props.tags.retain(|t| t != tag);
        }

        debug!(tag = %tag, classes = ids.len(), "Unlinked tag from all classes");
    }

    /// Clears every tag list and resets the index.
    pub fn unlink_all_tags_from_all_classes(&mut self, classes: &mut [ClassSection]) {
        for class in classes.iter_mut() {
            class.props.tags.clear();
        }
        self.entries.clear();
    }

    pub fn classes_for(&self, tag: &TagId) -> Option<&BTreeSet<ClassId>> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &TagId) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &TagId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagId, &BTreeSet<ClassId>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks both directions of the index invariant against `classes`.
    ///
    /// Empty entries (catalog seeds) are allowed.
    pub fn is_consistent_with(&self, classes: &[ClassSection]) -> bool {
        let forward = classes.iter().all(|class| {
            class.props.tags.iter().all(|tag| {
                self.entries
                    .get(tag)
                    .is_some_and(|ids| ids.contains(&class.id))
            })
        });

        let backward = self.entries.iter().all(|(tag, ids)| {
            ids.iter().all(|id| {
                classes
                    .iter()
                    .find(|c| &c.id == id)
                    .is_some_and(|c| c.has_tag(tag))
            })
        });

        forward && backward
    }

    fn remove_class_everywhere(&mut self, class_id: &ClassId) {
        self.entries
            .retain(|_, ids| !(ids.remove(class_id) && ids.is_empty()));
    }
}

fn find_class<'a>(classes: &'a mut [ClassSection], id: &ClassId) -> Option<&'a mut ClassSection> {
    classes.iter_mut().find(|c| &c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: &str, tags: &[&str]) -> ClassSection {
        ClassSection::new(id, "CSE", id, "A00", format!("Course {id}")).with_tags(tags.iter().copied())
    }

    fn sample() -> Vec<ClassSection> {
        vec![
            tagged("1", &["core", "lab"]),
            tagged("2", &["core"]),
            tagged("3", &[]),
        ]
    }

    #[test]
    fn test_rebuild_seeds_catalog_tags() {
        let classes = sample();
        let index = TagIndex::rebuild(&classes, &[TagId::from("elective")]);

        assert_eq!(index.len(), 3);
        assert!(index.classes_for(&"elective".into()).unwrap().is_empty());
        assert_eq!(index.classes_for(&"core".into()).unwrap().len(), 2);
        assert!(index.is_consistent_with(&classes));
    }

    #[test]
    fn test_unlink_last_class_prunes_entry() {
        let mut classes = sample();
        let mut index = TagIndex::rebuild(&classes, &[]);

        assert!(index.unlink_tag_from_class(&mut classes, &"lab".into(), &"1".into()));
        assert!(!index.contains(&"lab".into()));
        assert_eq!(classes[0].props.tags, vec![TagId::from("core")]);
        assert_eq!(index, TagIndex::rebuild(&classes, &[]));
    }

    #[test]
    fn test_unlink_unknown_is_noop() {
        let mut classes = sample();
        let mut index = TagIndex::rebuild(&classes, &[]);
        let before = index.clone();

        assert!(!index.unlink_tag_from_class(&mut classes, &"nope".into(), &"1".into()));
        assert!(!index.unlink_tag_from_class(&mut classes, &"core".into(), &"99".into()));
        assert_eq!(index, before);
    }

    #[test]
    fn test_link_tag() {
        let mut classes = sample();
        let mut index = TagIndex::rebuild(&classes, &[]);

        assert!(index.link_tag_to_class(&mut classes, &"honors".into(), &"3".into()));
        assert!(!index.link_tag_to_class(&mut classes, &"honors".into(), &"3".into()));
        assert!(!index.link_tag_to_class(&mut classes, &"honors".into(), &"99".into()));
        assert_eq!(index, TagIndex::rebuild(&classes, &[]));
    }

    #[test]
    fn test_unlink_all_tags_from_class() {
        let mut classes = sample();
        let mut index = TagIndex::rebuild(&classes, &[]);

        index.unlink_all_tags_from_class(&mut classes, &"1".into());
        assert!(classes[0].props.tags.is_empty());
        assert!(!index.contains(&"lab".into()));
        assert_eq!(index.classes_for(&"core".into()).unwrap().len(), 1);
        assert_eq!(index, TagIndex::rebuild(&classes, &[]));
    }

    #[test]
    fn test_unlink_all_classes_from_tag() {
        let mut classes = sample();
        let mut index = TagIndex::rebuild(&classes, &[]);

        index.unlink_all_classes_from_tag(&mut classes, &"core".into());
        assert!(!index.contains(&"core".into()));
        assert!(classes.iter().all(|c| !c.has_tag(&"core".into())));
        assert_eq!(index, TagIndex::rebuild(&classes, &[]));
    }

    #[test]
    fn test_unlink_everything() {
        let mut classes = sample();
        let mut index = TagIndex::rebuild(&classes, &[TagId::from("elective")]);

        index.unlink_all_tags_from_all_classes(&mut classes);
        assert!(index.is_empty());
        assert!(classes.iter().all(|c| c.props.tags.is_empty()));
    }

    #[test]
    fn test_deleted_class_keeps_catalog_seeds() {
        let mut classes = sample();
        let mut index = TagIndex::rebuild(&classes, &[TagId::from("elective")]);

        classes.remove(0);
        index.on_class_deleted(&"1".into());
        assert!(!index.contains(&"lab".into()));
        assert!(index.contains(&"elective".into()));
        assert!(index.is_consistent_with(&classes));
    }

    #[test]
    fn test_detects_drift() {
        let mut classes = sample();
        let index = TagIndex::rebuild(&classes, &[]);

        classes[2].props.tags.push("core".into());
        assert!(!index.is_consistent_with(&classes));
    }
}
