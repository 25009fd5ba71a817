//! Photo-card collection tracker: per-member cut counts organized into
//! independent tables, with cascading group enablement, legacy data
//! migration, CSV export, and a draw simulator.
//!
//! # Examples
//!
//! Pure table operations:
//! ```
//! use karasu::{
//!     csv,
//!     tables::{create_initial_state, DuplicateOptions},
//!     types::{cut_labels, CutType},
//! };
//!
//! let tables = create_initial_state("メイン");
//! let tables = tables.set_photo_count("sakurazaka", "井上 梨名", CutType::Yori, 2);
//! let tables = tables
//!     .duplicate_table(&tables.active_table_id, DuplicateOptions::default())
//!     .expect("below the table limit");
//! assert_eq!(tables.tables.len(), 2);
//!
//! let active = tables.active_table().expect("active table");
//! let out = csv::table_to_csv(active, &cut_labels(), "メンバー");
//! assert!(out.contains("井上 梨名,2,0,0,0\n"));
//! ```
//!
//! Runtime usage with SQLite persistence:
//! ```no_run
//! use karasu::{
//!     persist::sqlite::SqliteStore,
//!     runtime::{handle::spawn_tracker, RuntimeConfig},
//!     tables::load_or_initialize,
//!     types::CutType,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut store = SqliteStore::open("karasu.db").expect("open sqlite");
//! let tables = load_or_initialize(&mut store, "メイン").expect("load");
//! let handle = spawn_tracker(tables, Some(Box::new(store)), RuntimeConfig::default());
//! handle
//!     .set_photo_count("sakurazaka", "井上 梨名", CutType::Chu, 1)
//!     .await
//!     .expect("set count");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Static group, generation, and member registry.
pub mod catalog;
/// CSV export.
pub mod csv;
/// Table validation errors.
pub mod error;
/// `group:fullname` key codec.
pub mod key;
/// Display language preference.
pub mod locale;
/// Upgrades for pre-composite photo keys.
pub mod migration;
/// Key/value storage abstraction and backends.
pub mod persist;
/// Photo count maps and their stored forms.
pub mod photos;
/// Tracker runtime, debouncer, and simulation worker.
pub mod runtime;
/// Draw simulator.
pub mod simulate;
/// Group enablement state.
pub mod state;
/// Multi-table manager.
pub mod tables;
/// Shared primitive types.
pub mod types;
