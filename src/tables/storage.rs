use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    catalog,
    persist::{keys, KvStore, PersistResult},
    photos::{self, PhotoData},
    state::{engine::load_global_settings, GroupSettings, GroupState, SettingsMap},
    types::{is_zero, PhotoCounts},
};

use super::{table::Table, TablesCollection, MAX_TABLES, TABLES_FORMAT_VERSION};

/// Writes the collection under the tables key.
pub fn save_tables(store: &mut dyn KvStore, tables: &TablesCollection) -> PersistResult<()> {
    let json = serde_json::to_string(tables)?;
    store.set(keys::TABLES, &json)?;
    tracing::debug!(tables = tables.tables.len(), bytes = json.len(), "saved tables");
    Ok(())
}

/// Reads the stored collection.
///
/// `None` when the key is missing, unreadable, not a JSON object, or holds
/// no recoverable tables. Damage inside a table is repaired in place: bad
/// count vectors read as zero, bad settings entries are dropped, and
/// missing ids or timestamps are regenerated. Tables past [`MAX_TABLES`]
/// are dropped and a dangling active id is repointed at the first table.
pub fn load_tables(store: &dyn KvStore) -> Option<Arc<TablesCollection>> {
    let raw = match store.get(keys::TABLES) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read tables");
            return None;
        }
    };
    parse_collection(&raw)
}

fn parse_collection(raw: &str) -> Option<Arc<TablesCollection>> {
    let doc = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(doc)) => doc,
        Ok(_) => {
            tracing::warn!("stored tables are not an object; ignoring");
            return None;
        }
        Err(err) => {
            tracing::warn!(error = %err, "stored tables are corrupt; ignoring");
            return None;
        }
    };

    let version = doc
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(TABLES_FORMAT_VERSION);
    if version != TABLES_FORMAT_VERSION {
        tracing::warn!(
            version,
            expected = TABLES_FORMAT_VERSION,
            "loading tables written by another format version"
        );
    }

    let stored = doc.get("tables").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
    let mut tables: Vec<Arc<Table>> = Vec::with_capacity(stored.len().min(MAX_TABLES));
    for (index, value) in stored.iter().enumerate() {
        match table_from_value(value, index) {
            Some(table) if !tables.iter().any(|t| t.id == table.id) => tables.push(Arc::new(table)),
            Some(table) => tracing::warn!(id = %table.id, "dropping table with duplicate id"),
            None => tracing::warn!(index, "dropping unreadable table"),
        }
    }
    if tables.len() > MAX_TABLES {
        tracing::warn!(stored = tables.len(), max = MAX_TABLES, "too many stored tables; keeping the first");
        tables.truncate(MAX_TABLES);
    }
    let first_id = tables.first()?.id;

    let mut active_table_id = doc
        .get("activeTableId")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or(first_id);
    if !tables.iter().any(|t| t.id == active_table_id) {
        tracing::warn!(active = %active_table_id, "active table missing; selecting first");
        active_table_id = first_id;
    }

    Some(Arc::new(TablesCollection {
        version: TABLES_FORMAT_VERSION,
        tables,
        active_table_id,
        max_tables: MAX_TABLES,
    }))
}

/// One stored table, salvaging what parses. `None` only for non-objects.
fn table_from_value(value: &Value, index: usize) -> Option<Table> {
    if let Ok(table) = serde_json::from_value::<Table>(value.clone()) {
        return Some(table);
    }
    let doc = value.as_object()?;
    tracing::warn!(index, "repairing damaged table");

    let now = Utc::now();
    let timestamp = |field: &str| {
        doc.get(field)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    };
    let created_at = timestamp("createdAt").unwrap_or(now);

    Some(Table {
        id: doc
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4),
        name: doc
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("テーブル{}", index + 1)),
        created_at,
        last_modified: timestamp("lastModified").unwrap_or(created_at),
        photo_data: doc.get("photoData").map(photo_data_from_value).unwrap_or_default(),
        group_settings: doc.get("groupSettings").map(settings_from_value).unwrap_or_default(),
    })
}

fn photo_data_from_value(value: &Value) -> PhotoData {
    let mut photo_data = PhotoData::new();
    let Some(groups) = value.as_object() else {
        return photo_data;
    };
    for (group_id, members) in groups {
        let Some(members) = members.as_object() else {
            continue;
        };
        let counts: BTreeMap<String, PhotoCounts> = members
            .iter()
            .map(|(fullname, v)| (fullname.clone(), photos::counts_from_value(v)))
            .filter(|(_, counts)| !is_zero(counts))
            .collect();
        if !counts.is_empty() {
            photo_data.insert(group_id.clone(), counts);
        }
    }
    photo_data
}

fn settings_from_value(value: &Value) -> SettingsMap {
    let Some(groups) = value.as_object() else {
        return SettingsMap::new();
    };
    groups
        .iter()
        .filter_map(|(group_id, v)| match serde_json::from_value::<GroupSettings>(v.clone()) {
            Ok(settings) => Some((group_id.clone(), settings)),
            Err(err) => {
                tracing::warn!(group = %group_id, error = %err, "dropping unreadable group settings");
                None
            }
        })
        .collect()
}

/// Wraps pre-multi-table data into a single table named `default_name`.
///
/// Legacy photo documents in any historical shape are normalized. Missing or
/// corrupt legacy settings fall back to catalog defaults. With no legacy
/// data at all this is the fresh initial state.
///
/// Legacy settings are not copied verbatim. They are read in global mode,
/// so a group absent from the legacy record gets its catalog defaults
/// (usually enabled) instead of being disabled, matching what the user saw
/// before the upgrade.
pub fn migrate_from_legacy_storage(store: &dyn KvStore, default_name: &str) -> Arc<TablesCollection> {
    let legacy_photos = match store.get(keys::LEGACY_PHOTOS) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read legacy photos");
            None
        }
    };
    let legacy_settings = load_global_settings(store);

    if legacy_photos.is_none() && legacy_settings.is_none() {
        return TablesCollection::initial(default_name);
    }

    let groups = catalog::groups();
    // Global-mode construction fills absent groups from the catalog, and the
    // result is written back with every flag explicit.
    let group_settings = GroupState::with_overrides(groups, legacy_settings.as_ref()).to_settings();
    let mut table = Table::new(default_name, group_settings);
    if let Some(raw) = legacy_photos {
        let map = photos::deserialize(&raw, groups);
        table.photo_data = photos::map_to_photo_data(&map, groups);
    }

    tracing::info!(
        members = table.photo_data.values().map(|g| g.len()).sum::<usize>(),
        "migrated legacy data into a table"
    );
    TablesCollection::with_single_table(table)
}

/// Stored collection, else migrated legacy data, else a fresh state.
///
/// Anything not loaded as-is is saved before returning. A stored record
/// that cannot be recovered at all is first copied to
/// [`keys::TABLES_BACKUP`]. Read failures are returned, never overwritten.
pub fn load_or_initialize(store: &mut dyn KvStore, default_name: &str) -> PersistResult<Arc<TablesCollection>> {
    if let Some(raw) = store.get(keys::TABLES)? {
        if let Some(collection) = parse_collection(&raw) {
            return Ok(collection);
        }
        // Keep the unusable record instead of overwriting it.
        store.set(keys::TABLES_BACKUP, &raw)?;
        tracing::warn!(backup = keys::TABLES_BACKUP, "stored tables unusable; backed up before reinitializing");
    }
    let collection = migrate_from_legacy_storage(store, default_name);
    save_tables(store, &collection)?;
    store.flush()?;
    Ok(collection)
}
