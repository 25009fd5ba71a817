//! Validation errors raised by table operations.

use thiserror::Error;

use crate::tables::{MAX_TABLES, MAX_TABLE_NAME_LENGTH};

/// Rejected table operation. Callers surface these; retrying will not help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Name longer than [`MAX_TABLE_NAME_LENGTH`] characters.
    #[error("Table name must not exceed 30 characters")]
    NameTooLong {
        /// Character count of the rejected name.
        len: usize,
    },
    /// Collection already holds [`MAX_TABLES`] tables.
    #[error("Maximum table limit reached")]
    LimitReached,
    /// Only one table remains.
    #[error("Cannot delete the last table")]
    LastTable,
}

impl TableError {
    /// Limit the error refers to, for UI messages.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::NameTooLong { .. } => Some(MAX_TABLE_NAME_LENGTH),
            Self::LimitReached => Some(MAX_TABLES),
            Self::LastTable => None,
        }
    }
}
