//! Tag inclusion/exclusion filter deciding which classes are visible.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{ClassSection, TagId};

/// A class is visible when it carries at least one included tag (or no
/// tags are included) and none of the excluded tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    #[serde(default)]
    pub include: BTreeSet<TagId>,
    #[serde(default)]
    pub exclude: BTreeSet<TagId>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, tag: impl Into<TagId>) -> Self {
        let tag = tag.into();
        self.exclude.remove(&tag);
        self.include.insert(tag);
        self
    }

    pub fn exclude(mut self, tag: impl Into<TagId>) -> Self {
        let tag = tag.into();
        self.include.remove(&tag);
        self.exclude.insert(tag);
        self
    }

    /// True if the filter lets every class through.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn matches(&self, class: &ClassSection) -> bool {
        let tags = &class.props.tags;
        let included = self.include.is_empty() || tags.iter().any(|t| self.include.contains(t));
        let excluded = tags.iter().any(|t| self.exclude.contains(t));
        included && !excluded
    }

    /// Drops a tag that no longer exists. Returns true if it was referenced.
    pub fn forget(&mut self, tag: &TagId) -> bool {
        let included = self.include.remove(tag);
        let excluded = self.exclude.remove(tag);
        included || excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(tags: &[&str]) -> ClassSection {
        ClassSection::new("1", "CSE", "100", "A00", "Data Structures")
            .with_tags(tags.iter().copied())
    }

    #[test]
    fn test_empty_filter_shows_everything() {
        let filter = TagFilter::new();
        assert!(filter.matches(&class(&[])));
        assert!(filter.matches(&class(&["grad"])));
    }

    #[test]
    fn test_include_and_exclude() {
        let filter = TagFilter::new().include("core").exclude("cancelled");

        assert!(filter.matches(&class(&["core"])));
        assert!(!filter.matches(&class(&["elective"])));
        assert!(!filter.matches(&class(&["core", "cancelled"])));
    }

    #[test]
    fn test_include_then_exclude_moves_tag() {
        let mut filter = TagFilter::new().include("core").exclude("core");
        assert!(filter.include.is_empty());
        assert!(filter.forget(&"core".into()));
        assert!(filter.is_empty());
    }
}
