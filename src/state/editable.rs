//! Editable group list used while changing a table's settings.
//!
//! Same [`GroupEntry`] shape and cascade as [`super::GroupState`], without
//! the active-group selection.

use crate::catalog::Group;

use super::{
    group::{GroupEntry, MissingPolicy},
    settings::SettingsMap,
};

/// Builds the editable list from a table's settings; absent groups and
/// generations start disabled.
pub fn create_editable_group_state(
    groups: impl IntoIterator<Item = &'static Group>,
    settings: &SettingsMap,
) -> Vec<GroupEntry> {
    groups
        .into_iter()
        .map(|group| GroupEntry::from_settings(group, settings.get(group.id), MissingPolicy::Disabled))
        .collect()
}

/// Opts a member in or out of an editable list, with the usual cascade.
pub fn toggle_member_in_edit_groups(
    groups: &[GroupEntry],
    group_id: &str,
    fullname: &str,
    enabled: bool,
) -> Vec<GroupEntry> {
    map_edit_group(groups, group_id, |g| g.with_member_enabled(fullname, enabled))
}

/// Enables or disables a whole group in an editable list.
pub fn toggle_group_in_edit_groups(groups: &[GroupEntry], group_id: &str, enabled: bool) -> Vec<GroupEntry> {
    map_edit_group(groups, group_id, |g| g.with_enabled(enabled))
}

/// Enables or disables one generation in an editable list.
pub fn toggle_generation_in_edit_groups(
    groups: &[GroupEntry],
    group_id: &str,
    generation: &str,
    enabled: bool,
) -> Vec<GroupEntry> {
    map_edit_group(groups, group_id, |g| g.with_generation_enabled(generation, enabled))
}

/// Stored form of an editable list, ready for a table's settings.
pub fn edit_groups_to_settings(groups: &[GroupEntry]) -> SettingsMap {
    groups
        .iter()
        .map(|g| (g.id().to_string(), g.to_settings()))
        .collect()
}

fn map_edit_group(
    groups: &[GroupEntry],
    group_id: &str,
    f: impl Fn(&GroupEntry) -> GroupEntry,
) -> Vec<GroupEntry> {
    groups
        .iter()
        .map(|g| if g.id() == group_id { f(g) } else { g.clone() })
        .collect()
}
