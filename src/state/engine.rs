use crate::{
    catalog::Group,
    persist::{keys, KvStore, PersistResult},
};

use super::{
    group::{GenerationEntry, GroupEntry, MissingPolicy},
    settings::SettingsMap,
};

/// Enablement flags for every catalog group plus the group shown first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupState {
    /// Group currently selected for display; empty when there are no groups.
    pub active_group_id: String,
    /// One entry per catalog group, in catalog order.
    pub groups: Vec<GroupEntry>,
}

impl GroupState {
    /// Catalog defaults with no stored overrides.
    pub fn from_catalog(groups: impl IntoIterator<Item = &'static Group>) -> Self {
        Self::from_entries(groups.into_iter().map(GroupEntry::from_catalog).collect())
    }

    /// Global mode: stored overrides on top of catalog defaults.
    pub fn with_overrides(
        groups: impl IntoIterator<Item = &'static Group>,
        saved: Option<&SettingsMap>,
    ) -> Self {
        Self::build(groups, saved, MissingPolicy::CatalogDefault)
    }

    /// Table mode: built only from `settings`; anything absent is disabled.
    pub fn from_table_settings(
        groups: impl IntoIterator<Item = &'static Group>,
        settings: &SettingsMap,
    ) -> Self {
        Self::build(groups, Some(settings), MissingPolicy::Disabled)
    }

    /// Global mode reading overrides from the shared enablement record.
    ///
    /// Missing or unreadable records fall back to catalog defaults.
    pub fn load_global(groups: impl IntoIterator<Item = &'static Group>, store: &dyn KvStore) -> Self {
        let saved = load_global_settings(store);
        Self::with_overrides(groups, saved.as_ref())
    }

    /// Writes this state to the shared enablement record.
    pub fn save_global(&self, store: &mut dyn KvStore) -> PersistResult<()> {
        let payload = serde_json::to_string(&self.to_settings())?;
        store.set(keys::LEGACY_GROUP_STATE, &payload)
    }

    fn build(
        groups: impl IntoIterator<Item = &'static Group>,
        saved: Option<&SettingsMap>,
        policy: MissingPolicy,
    ) -> Self {
        let entries = groups
            .into_iter()
            .map(|group| GroupEntry::from_settings(group, saved.and_then(|s| s.get(group.id)), policy))
            .collect();
        Self::from_entries(entries)
    }

    fn from_entries(groups: Vec<GroupEntry>) -> Self {
        Self {
            active_group_id: groups.first().map(|g| g.id().to_string()).unwrap_or_default(),
            groups,
        }
    }

    /// Entry for `group_id`.
    pub fn group(&self, group_id: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|g| g.id() == group_id)
    }

    /// Enables or disables a whole group, cascading to its generations.
    #[must_use]
    pub fn set_group_enabled(&self, group_id: &str, enabled: bool) -> Self {
        self.map_group(group_id, |g| g.with_enabled(enabled))
    }

    /// Enables or disables one generation; the group flag follows.
    #[must_use]
    pub fn set_generation_enabled(&self, group_id: &str, generation: &str, enabled: bool) -> Self {
        self.map_group(group_id, |g| g.with_generation_enabled(generation, enabled))
    }

    /// Opts a member in or out; generation and group flags follow.
    #[must_use]
    pub fn set_member_enabled(&self, group_id: &str, fullname: &str, enabled: bool) -> Self {
        self.map_group(group_id, |g| g.with_member_enabled(fullname, enabled))
    }

    /// False for an unknown group or an opted-out member.
    pub fn is_member_enabled(&self, group_id: &str, fullname: &str) -> bool {
        self.group(group_id)
            .is_some_and(|g| g.is_member_enabled(fullname))
    }

    /// Enabled generations of `group_id`; empty for an unknown group.
    pub fn enabled_generations(&self, group_id: &str) -> Vec<&GenerationEntry> {
        self.group(group_id)
            .map(|g| g.enabled_generations().collect())
            .unwrap_or_default()
    }

    /// Active members across all groups.
    pub fn count_enabled_members(&self) -> usize {
        self.groups.iter().map(GroupEntry::count_enabled_members).sum()
    }

    /// Group currently selected for display.
    pub fn active_group_id(&self) -> &str {
        &self.active_group_id
    }

    /// Selects the group shown first.
    #[must_use]
    pub fn set_active_group_id(&self, group_id: &str) -> Self {
        Self {
            active_group_id: group_id.to_string(),
            groups: self.groups.clone(),
        }
    }

    /// Stored form of every group.
    pub fn to_settings(&self) -> SettingsMap {
        self.groups
            .iter()
            .map(|g| (g.id().to_string(), g.to_settings()))
            .collect()
    }

    fn map_group(&self, group_id: &str, f: impl FnOnce(&GroupEntry) -> GroupEntry) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.groups.iter_mut().find(|g| g.id() == group_id) {
            *entry = f(entry);
        } else {
            tracing::debug!(group_id, "enablement change for unknown group ignored");
        }
        next
    }
}

/// Reads the shared enablement record, if present and well-formed.
pub fn load_global_settings(store: &dyn KvStore) -> Option<SettingsMap> {
    let raw = match store.get(keys::LEGACY_GROUP_STATE) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read group state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(settings) => Some(settings),
        Err(err) => {
            tracing::warn!(error = %err, "stored group state is corrupt; using defaults");
            None
        }
    }
}
