//! Bounded collection of independent named tables.

/// Collection operations.
pub mod manager;
/// Loading, saving, and legacy wrap-up.
pub mod storage;
/// Single table record.
pub mod table;

pub use manager::{DuplicateOptions, DuplicatePlacement, TablesCollection};
pub use storage::{load_or_initialize, load_tables, migrate_from_legacy_storage, save_tables};
pub use table::{create_new_table, Table};

/// Most tables a collection may hold.
pub const MAX_TABLES: usize = 10;

/// Longest allowed table name, in characters.
pub const MAX_TABLE_NAME_LENGTH: usize = 30;

/// Format version written with every saved collection.
pub const TABLES_FORMAT_VERSION: u32 = 1;

/// Fresh state: one empty table with every catalog group at its defaults.
pub fn create_initial_state(default_name: &str) -> std::sync::Arc<TablesCollection> {
    TablesCollection::initial(default_name)
}
