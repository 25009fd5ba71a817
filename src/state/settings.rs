//! Persisted per-group enablement records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{self, Group};

/// Enablement overrides for one group, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettings {
    /// Group flag; derived from the generations when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Generation name to enabled flag.
    #[serde(default)]
    pub generations: BTreeMap<String, bool>,
    /// Fullnames opted out while their generation stays enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_members: Vec<String>,
}

/// Group id to settings.
pub type SettingsMap = BTreeMap<String, GroupSettings>;

impl GroupSettings {
    /// Catalog defaults for `group`, with every generation listed explicitly.
    pub fn catalog_default(group: &Group) -> Self {
        Self {
            enabled: Some(group.enabled),
            generations: group
                .generations
                .iter()
                .map(|generation| (generation.name.to_string(), generation.enabled))
                .collect(),
            disabled_members: Vec::new(),
        }
    }
}

/// Catalog defaults for every group in `groups`.
pub fn default_settings<'a>(groups: impl IntoIterator<Item = &'a Group>) -> SettingsMap {
    groups
        .into_iter()
        .map(|group| (group.id.to_string(), GroupSettings::catalog_default(group)))
        .collect()
}

/// Catalog defaults for the listed group ids only. Unknown ids are skipped.
pub fn settings_for_groups<S: AsRef<str>>(group_ids: &[S]) -> SettingsMap {
    let mut out = SettingsMap::new();
    for id in group_ids {
        let id = id.as_ref();
        match catalog::group_by_id(id) {
            Some(group) => {
                out.insert(group.id.to_string(), GroupSettings::catalog_default(group));
            }
            None => tracing::debug!(group_id = id, "ignoring unknown group id"),
        }
    }
    out
}
