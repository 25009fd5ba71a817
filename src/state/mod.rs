//! Hierarchical group, generation, and member enablement.
//!
//! All transitions are pure: each returns a new value and leaves the input
//! untouched. Derived flags are recomputed in one place after every change.

/// Editable group list for settings screens.
pub mod editable;
/// Full enablement state with global and table-scoped construction.
pub mod engine;
/// Per-group runtime entries and the cascade rules.
pub mod group;
/// Persisted settings records.
pub mod settings;

pub use editable::{create_editable_group_state, toggle_member_in_edit_groups};
pub use engine::GroupState;
pub use group::{GenerationEntry, GroupEntry, MissingPolicy};
pub use settings::{GroupSettings, SettingsMap};
