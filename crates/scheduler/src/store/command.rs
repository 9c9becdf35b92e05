//! Mutation commands accepted by [`super::ScheduleStore::apply`].

use crate::filter::TagFilter;
use crate::model::{ClassId, ClassSection, Tag, TagId};

/// One logical mutation of the schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleCommand {
    /// Replace classes and tag catalog, e.g. on startup
    Initialize {
        classes: Vec<ClassSection>,
        tags: Vec<Tag>,
    },
    /// Bulk replace after a reload from the authoritative source
    SetClasses(Vec<ClassSection>),
    AddClasses(Vec<ClassSection>),
    UpdateClass(ClassSection),
    DeleteClass(ClassId),
    LinkTag {
        tag: TagId,
        class_id: ClassId,
    },
    UnlinkTag {
        tag: TagId,
        class_id: ClassId,
    },
    UnlinkAllTagsFromClass(ClassId),
    UnlinkAllClassesFromTag(TagId),
    UnlinkAllTags,
    AddTag(Tag),
    RemoveTag(TagId),
    SetFilter(TagFilter),
    RecomputeConflicts,
}

impl ScheduleCommand {
    /// Short name for log output.
    pub fn name(&self) -> &'static str {
        match self {
            ScheduleCommand::Initialize { .. } => "initialize",
            ScheduleCommand::SetClasses(_) => "set_classes",
            ScheduleCommand::AddClasses(_) => "add_classes",
            ScheduleCommand::UpdateClass(_) => "update_class",
            ScheduleCommand::DeleteClass(_) => "delete_class",
            ScheduleCommand::LinkTag { .. } => "link_tag",
            ScheduleCommand::UnlinkTag { .. } => "unlink_tag",
            ScheduleCommand::UnlinkAllTagsFromClass(_) => "unlink_all_tags_from_class",
            ScheduleCommand::UnlinkAllClassesFromTag(_) => "unlink_all_classes_from_tag",
            ScheduleCommand::UnlinkAllTags => "unlink_all_tags",
            ScheduleCommand::AddTag(_) => "add_tag",
            ScheduleCommand::RemoveTag(_) => "remove_tag",
            ScheduleCommand::SetFilter(_) => "set_filter",
            ScheduleCommand::RecomputeConflicts => "recompute_conflicts",
        }
    }
}
