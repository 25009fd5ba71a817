use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    catalog,
    error::TableError,
    photos::PhotoData,
    state::{settings, GroupState, SettingsMap},
    types::TableId,
};

use super::MAX_TABLE_NAME_LENGTH;

/// One independently tracked workspace of photo counts and settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Random v4 id.
    pub id: TableId,
    /// Display name, at most [`MAX_TABLE_NAME_LENGTH`] characters.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the latest change to any field.
    pub last_modified: DateTime<Utc>,
    /// Non-zero counts by group id, then fullname.
    #[serde(default)]
    pub photo_data: PhotoData,
    /// Enablement settings by group id. Absent groups are disabled.
    #[serde(default)]
    pub group_settings: SettingsMap,
}

impl Table {
    /// Empty table with the given name and settings.
    pub fn new(name: impl Into<String>, group_settings: SettingsMap) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            last_modified: now,
            photo_data: PhotoData::new(),
            group_settings,
        }
    }

    /// Table-scoped enablement state built from this table's settings.
    pub fn group_state(&self) -> GroupState {
        GroupState::from_table_settings(catalog::groups(), &self.group_settings)
    }

    /// Copy with a fresh id and timestamps and the same name and data.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            created_at: now,
            last_modified: now,
            photo_data: self.photo_data.clone(),
            group_settings: self.group_settings.clone(),
        }
    }

    /// Marks the table as modified now.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Builds an empty table enabling exactly `group_ids` with catalog defaults.
///
/// Groups not listed get no settings entry at all.
pub fn create_new_table<S: AsRef<str>>(name: &str, group_ids: &[S]) -> Result<Table, TableError> {
    validate_name(name)?;
    Ok(Table::new(name, settings::settings_for_groups(group_ids)))
}

/// Rejects names longer than [`MAX_TABLE_NAME_LENGTH`] characters.
pub fn validate_name(name: &str) -> Result<(), TableError> {
    let len = name.chars().count();
    if len > MAX_TABLE_NAME_LENGTH {
        return Err(TableError::NameTooLong { len });
    }
    Ok(())
}
