//! Single-writer async runtime, debounced persistence, and the simulation worker.

/// Coalescing delayed-apply task.
pub mod debounce;
/// Event stream types emitted by the tracker.
pub mod events;
/// Tracker handle and command loop.
pub mod handle;
/// Message-passing simulation worker.
pub mod worker;

use thiserror::Error;

use crate::{error::TableError, persist::PersistError, tables::DuplicateOptions};

/// Failures surfaced through runtime handles.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Operation rejected by validation.
    #[error(transparent)]
    Table(#[from] TableError),
    /// Storage write failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Runtime task is gone.
    #[error("runtime channel closed")]
    ChannelClosed,
}

/// Tracker runtime settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Quiet period before a pending save is written.
    pub debounce_ms: u64,
    /// Capacity of the command queue.
    pub command_queue_bound: usize,
    /// Capacity of the broadcast event buffer.
    pub event_queue_bound: usize,
    /// Placement and activation of duplicated tables.
    pub duplicate: DuplicateOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            command_queue_bound: 256,
            event_queue_bound: 1024,
            duplicate: DuplicateOptions::default(),
        }
    }
}
