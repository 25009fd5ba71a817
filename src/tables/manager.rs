use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    catalog,
    error::TableError,
    photos::PhotoData,
    state::{settings, SettingsMap},
    types::{CutType, TableId},
};

use super::{
    table::{create_new_table, validate_name, Table},
    MAX_TABLES, TABLES_FORMAT_VERSION,
};

/// Where a duplicated table lands in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePlacement {
    /// After the last table.
    #[default]
    Append,
    /// Immediately after the source table.
    AfterSource,
}

/// Duplicate-table behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateOptions {
    /// List position of the copy.
    pub placement: DuplicatePlacement,
    /// Whether the copy becomes the active table.
    pub activate: bool,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            placement: DuplicatePlacement::Append,
            activate: true,
        }
    }
}

/// The full set of tables plus the active selection.
///
/// Every operation returns a new `Arc`; operations that change nothing
/// return a clone of the input `Arc`, so callers can test for a no-op
/// with [`Arc::ptr_eq`]. Untouched tables are shared between versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesCollection {
    /// Stored format version.
    pub version: u32,
    /// Tables in display order; between 1 and [`MAX_TABLES`] entries.
    pub tables: Vec<Arc<Table>>,
    /// Id of the table being edited.
    pub active_table_id: TableId,
    /// Table limit recorded alongside the data.
    pub max_tables: usize,
}

impl TablesCollection {
    /// Collection holding exactly `table`, which is active.
    pub fn with_single_table(table: Table) -> Arc<Self> {
        Arc::new(Self {
            version: TABLES_FORMAT_VERSION,
            active_table_id: table.id,
            tables: vec![Arc::new(table)],
            max_tables: MAX_TABLES,
        })
    }

    /// Fresh state: one empty table with catalog-default settings for every group.
    pub fn initial(default_name: &str) -> Arc<Self> {
        Self::with_single_table(Table::new(
            default_name,
            settings::default_settings(catalog::groups()),
        ))
    }

    /// True while below [`MAX_TABLES`].
    pub fn can_create_new_table(&self) -> bool {
        self.tables.len() < MAX_TABLES
    }

    /// Table with `id`.
    pub fn table_by_id(&self, id: &TableId) -> Option<&Arc<Table>> {
        self.tables.iter().find(|t| t.id == *id)
    }

    /// Currently active table.
    pub fn active_table(&self) -> Option<&Arc<Table>> {
        self.table_by_id(&self.active_table_id)
    }

    /// Creates a table, appends it, and makes it active.
    pub fn add_table<S: AsRef<str>>(
        self: &Arc<Self>,
        name: &str,
        group_ids: &[S],
    ) -> Result<Arc<Self>, TableError> {
        if !self.can_create_new_table() {
            return Err(TableError::LimitReached);
        }
        let table = create_new_table(name, group_ids)?;
        tracing::info!(table_id = %table.id, "created table");

        let mut next = (**self).clone();
        next.active_table_id = table.id;
        next.tables.push(Arc::new(table));
        Ok(Arc::new(next))
    }

    /// Activates `id`; unchanged when no such table exists.
    pub fn set_active_table(self: &Arc<Self>, id: &TableId) -> Arc<Self> {
        if self.table_by_id(id).is_none() {
            return Arc::clone(self);
        }
        Arc::new(Self {
            active_table_id: *id,
            ..(**self).clone()
        })
    }

    /// Renames `id`. Duplicate names are allowed.
    pub fn rename_table(self: &Arc<Self>, id: &TableId, new_name: &str) -> Result<Arc<Self>, TableError> {
        validate_name(new_name)?;
        Ok(self.update_table(id, |table| table.name = new_name.to_string()))
    }

    /// Deletes `id`, moving the active selection to the first remaining
    /// table if needed. Unchanged when no such table exists.
    pub fn delete_table(self: &Arc<Self>, id: &TableId) -> Result<Arc<Self>, TableError> {
        if self.table_by_id(id).is_none() {
            return Ok(Arc::clone(self));
        }
        if self.tables.len() == 1 {
            return Err(TableError::LastTable);
        }

        let tables: Vec<Arc<Table>> = self.tables.iter().filter(|t| t.id != *id).cloned().collect();
        let active_table_id = if self.active_table_id == *id {
            tables[0].id
        } else {
            self.active_table_id
        };
        tracing::info!(table_id = %id, "deleted table");

        Ok(Arc::new(Self {
            tables,
            active_table_id,
            ..(**self).clone()
        }))
    }

    /// Deep-copies `id` into a new table with a fresh id.
    ///
    /// Fails at the table limit even when `id` is unknown; otherwise
    /// unchanged when no such table exists.
    pub fn duplicate_table(
        self: &Arc<Self>,
        id: &TableId,
        options: DuplicateOptions,
    ) -> Result<Arc<Self>, TableError> {
        if !self.can_create_new_table() {
            return Err(TableError::LimitReached);
        }
        let Some(source_idx) = self.tables.iter().position(|t| t.id == *id) else {
            return Ok(Arc::clone(self));
        };

        let copy = self.tables[source_idx].duplicate();
        tracing::info!(source = %id, table_id = %copy.id, "duplicated table");

        let mut next = (**self).clone();
        if options.activate {
            next.active_table_id = copy.id;
        }
        let copy = Arc::new(copy);
        match options.placement {
            DuplicatePlacement::Append => next.tables.push(copy),
            DuplicatePlacement::AfterSource => next.tables.insert(source_idx + 1, copy),
        }
        Ok(Arc::new(next))
    }

    /// Replaces the active table's photo data.
    pub fn update_active_photo_data(self: &Arc<Self>, photo_data: PhotoData) -> Arc<Self> {
        let id = self.active_table_id;
        self.update_table(&id, |table| table.photo_data = photo_data)
    }

    /// Replaces the active table's enablement settings.
    pub fn update_active_group_settings(self: &Arc<Self>, group_settings: SettingsMap) -> Arc<Self> {
        let id = self.active_table_id;
        self.update_table(&id, |table| table.group_settings = group_settings)
    }

    /// Sets one cut count for one member of the active table.
    ///
    /// Unchanged for an unknown group or member. A member whose counts all
    /// drop to zero is removed from the photo data.
    pub fn set_photo_count(
        self: &Arc<Self>,
        group_id: &str,
        fullname: &str,
        cut: CutType,
        value: u32,
    ) -> Arc<Self> {
        if !catalog::group_by_id(group_id).is_some_and(|g| g.has_member(fullname)) {
            tracing::debug!(group_id, fullname, "count change for unknown member ignored");
            return Arc::clone(self);
        }

        let id = self.active_table_id;
        self.update_table(&id, |table| {
            let group = table.photo_data.entry(group_id.to_string()).or_default();
            let counts = group.entry(fullname.to_string()).or_default();
            counts[cut.index()] = value;
            if crate::types::is_zero(counts) {
                group.remove(fullname);
            }
            if group.is_empty() {
                table.photo_data.remove(group_id);
            }
        })
    }

    fn update_table(self: &Arc<Self>, id: &TableId, f: impl FnOnce(&mut Table)) -> Arc<Self> {
        let Some(idx) = self.tables.iter().position(|t| t.id == *id) else {
            return Arc::clone(self);
        };

        let mut table = (*self.tables[idx]).clone();
        f(&mut table);
        table.touch();

        let mut next = (**self).clone();
        next.tables[idx] = Arc::new(table);
        Arc::new(next)
    }
}
