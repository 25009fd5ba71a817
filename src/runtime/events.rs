//! Tracker event stream payloads.

use crate::types::TableId;

/// Events emitted from the single-writer tracker loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A new table was created.
    TableCreated {
        /// New table id.
        id: TableId,
    },
    /// A table was copied.
    TableDuplicated {
        /// Table that was copied.
        source: TableId,
        /// The copy.
        id: TableId,
    },
    /// A table was renamed.
    TableRenamed {
        /// Renamed table id.
        id: TableId,
    },
    /// A table was deleted.
    TableDeleted {
        /// Deleted table id.
        id: TableId,
    },
    /// The active table changed.
    ActiveTableChanged {
        /// Newly active table id.
        id: TableId,
    },
    /// Photo data or settings of a table changed.
    TableUpdated {
        /// Changed table id.
        id: TableId,
    },
    /// The latest pending snapshot reached storage.
    Persisted,
    /// A storage write failed.
    PersistFailed {
        /// Error text.
        message: String,
    },
}
