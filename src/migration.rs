//! Upcasting of flat photo-count objects to composite keys.
//!
//! Two historical flat shapes exist: bare fullname keys scoped to
//! [`DEFAULT_GROUP_ID`], and composite keys that may still use a retired
//! group-id alias. Both upcast to current composite keys here.

use serde_json::{Map, Value};

use crate::{
    catalog::{DEFAULT_GROUP_ID, RETIRED_GROUP_ALIASES},
    key::{self, SEPARATOR},
};

/// True when `obj` is a non-empty object with at least one key lacking a group prefix.
pub fn is_legacy_format(obj: &Value) -> bool {
    match obj {
        Value::Object(map) => is_legacy_map(map),
        _ => false,
    }
}

/// Map form of [`is_legacy_format`].
pub fn is_legacy_map(map: &Map<String, Value>) -> bool {
    map.keys().any(|k| !key::is_composite(k))
}

/// Rewrites every key to the current composite form.
///
/// Bare keys get the default group prefix; composite keys only have a
/// retired alias prefix renamed. Non-array values become the zero vector.
/// Non-object input yields an empty map.
pub fn migrate(obj: &Value) -> Map<String, Value> {
    let Value::Object(map) = obj else {
        return Map::new();
    };

    let mut out = Map::with_capacity(map.len());
    for (k, v) in map {
        let value = match v {
            Value::Array(items) => Value::Array(items.clone()),
            _ => Value::Array(vec![Value::from(0); crate::types::CUT_COUNT]),
        };
        out.insert(migrate_key(k), value);
    }
    out
}

/// Current composite form of a single stored key.
pub fn migrate_key(stored: &str) -> String {
    match key::decode(stored) {
        Some(parsed) => {
            let group_id = current_group_id(&parsed.group_id);
            key::encode(group_id, &parsed.fullname)
        }
        None => format!("{DEFAULT_GROUP_ID}{SEPARATOR}{stored}"),
    }
}

/// Resolves a possibly-retired group id to its current spelling.
pub fn current_group_id(group_id: &str) -> &str {
    RETIRED_GROUP_ALIASES
        .iter()
        .find(|(old, _)| *old == group_id)
        .map(|(_, new)| *new)
        .unwrap_or(group_id)
}
