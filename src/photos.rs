//! Photo count maps and their persisted JSON forms.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde_json::{Map, Value};

use crate::{
    catalog::Group,
    key, migration,
    types::{is_zero, PhotoCounts, CUT_COUNT, ZERO_COUNTS},
};

/// Flat map from composite key to count vector.
pub type PhotoMap = HashMap<String, PhotoCounts>;

/// Nested per-table photo data: group id, then fullname, then counts.
pub type PhotoData = BTreeMap<String, BTreeMap<String, PhotoCounts>>;

/// Historical shapes of the stored photo document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `{groupId: {fullname: counts}}`, the current shape.
    Nested,
    /// `{"groupId:fullname": counts}`.
    FlatComposite,
    /// `{fullname: counts}` scoped to the default group, possibly mixed with composite keys.
    LegacyBare,
}

impl WireFormat {
    /// Classifies a parsed top-level object.
    ///
    /// Nested when every value is an object; otherwise legacy when any key
    /// lacks a group prefix; otherwise flat composite.
    pub fn detect(doc: &Map<String, Value>) -> Self {
        if !doc.is_empty() && doc.values().all(Value::is_object) {
            Self::Nested
        } else if migration::is_legacy_map(doc) {
            Self::LegacyBare
        } else {
            Self::FlatComposite
        }
    }
}

/// Zero-filled map with one entry per member of `groups`.
pub fn build_empty(groups: &[Group]) -> PhotoMap {
    let mut photos = PhotoMap::new();
    for group in groups {
        for member in group.members() {
            photos.insert(key::encode(group.id, member.fullname), ZERO_COUNTS);
        }
    }
    photos
}

/// Serializes the non-zero entries of `photos` as a nested JSON document.
///
/// All-zero members and groups with no non-zero members are omitted.
/// Keys follow catalog order.
pub fn serialize(photos: &PhotoMap, groups: &[Group]) -> String {
    let mut doc = Map::new();
    for group in groups {
        let mut group_doc = Map::new();
        for member in group.members() {
            let Some(counts) = photos.get(&key::encode(group.id, member.fullname)) else {
                continue;
            };
            if !is_zero(counts) {
                group_doc.insert(member.fullname.to_string(), counts_to_value(counts));
            }
        }
        if !group_doc.is_empty() {
            doc.insert(group.id.to_string(), Value::Object(group_doc));
        }
    }
    Value::Object(doc).to_string()
}

/// Parses any historical photo document into a full map over `groups`.
///
/// Unparseable or non-object input yields [`build_empty`]. Members missing
/// from the document get the zero vector.
pub fn deserialize(json: &str, groups: &[Group]) -> PhotoMap {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(doc)) => from_document(&doc, groups),
        Ok(_) => build_empty(groups),
        Err(err) => {
            tracing::warn!(error = %err, "photo document is not valid JSON; starting empty");
            build_empty(groups)
        }
    }
}

/// Same as [`deserialize`] for an already-parsed top-level object.
pub fn from_document(doc: &Map<String, Value>, groups: &[Group]) -> PhotoMap {
    let format = WireFormat::detect(doc);
    tracing::debug!(?format, entries = doc.len(), "decoding photo document");

    match format {
        WireFormat::Nested => {
            let mut photos = PhotoMap::new();
            for group in groups {
                let group_doc = doc.get(group.id).and_then(Value::as_object);
                for member in group.members() {
                    let counts = group_doc
                        .and_then(|g| g.get(member.fullname))
                        .map(counts_from_value)
                        .unwrap_or(ZERO_COUNTS);
                    photos.insert(key::encode(group.id, member.fullname), counts);
                }
            }
            photos
        }
        // Flat composite keys may still carry a retired group alias.
        WireFormat::FlatComposite | WireFormat::LegacyBare => {
            let migrated = migration::migrate(&Value::Object(doc.clone()));
            fill_from_flat(&migrated, groups)
        }
    }
}

fn fill_from_flat(flat: &Map<String, Value>, groups: &[Group]) -> PhotoMap {
    let mut photos = PhotoMap::new();
    for group in groups {
        for member in group.members() {
            let k = key::encode(group.id, member.fullname);
            let counts = flat.get(&k).map(counts_from_value).unwrap_or(ZERO_COUNTS);
            photos.insert(k, counts);
        }
    }
    photos
}

/// Nested table photo data to a full flat map over `groups`.
pub fn photo_data_to_map(photo_data: &PhotoData, groups: &[Group]) -> PhotoMap {
    let mut photos = PhotoMap::new();
    for group in groups {
        let group_data = photo_data.get(group.id);
        for member in group.members() {
            let counts = group_data
                .and_then(|g| g.get(member.fullname))
                .copied()
                .unwrap_or(ZERO_COUNTS);
            photos.insert(key::encode(group.id, member.fullname), counts);
        }
    }
    photos
}

/// Flat map to nested table photo data, keeping only non-zero entries.
pub fn map_to_photo_data(photos: &PhotoMap, groups: &[Group]) -> PhotoData {
    let mut photo_data = PhotoData::new();
    for group in groups {
        let group_data: BTreeMap<String, PhotoCounts> = group
            .members()
            .filter_map(|member| {
                let counts = photos.get(&key::encode(group.id, member.fullname))?;
                (!is_zero(counts)).then(|| (member.fullname.to_string(), *counts))
            })
            .collect();
        if !group_data.is_empty() {
            photo_data.insert(group.id.to_string(), group_data);
        }
    }
    photo_data
}

/// Reads a stored count vector. Anything other than an array of exactly
/// four non-negative integers is treated as the zero vector.
pub fn counts_from_value(value: &Value) -> PhotoCounts {
    let Some(items) = value.as_array() else {
        return ZERO_COUNTS;
    };
    if items.len() != CUT_COUNT {
        return ZERO_COUNTS;
    }

    let mut counts = ZERO_COUNTS;
    for (slot, item) in counts.iter_mut().zip(items) {
        match item.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(v) => *slot = v,
            None => return ZERO_COUNTS,
        }
    }
    counts
}

fn counts_to_value(counts: &PhotoCounts) -> Value {
    Value::Array(counts.iter().map(|v| Value::from(*v)).collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detect_distinguishes_the_three_shapes() {
        let nested = json!({"sakurazaka": {"井上 梨名": [1, 0, 0, 0]}});
        let flat = json!({"sakurazaka:井上 梨名": [1, 0, 0, 0]});
        let bare = json!({"井上 梨名": [1, 0, 0, 0]});
        let empty = json!({});

        assert_eq!(WireFormat::detect(nested.as_object().unwrap()), WireFormat::Nested);
        assert_eq!(WireFormat::detect(flat.as_object().unwrap()), WireFormat::FlatComposite);
        assert_eq!(WireFormat::detect(bare.as_object().unwrap()), WireFormat::LegacyBare);
        assert_eq!(WireFormat::detect(empty.as_object().unwrap()), WireFormat::FlatComposite);
    }

    #[test]
    fn malformed_vectors_read_as_zero() {
        assert_eq!(counts_from_value(&json!([1, 2, 3])), ZERO_COUNTS);
        assert_eq!(counts_from_value(&json!([1, -2, 3, 4])), ZERO_COUNTS);
        assert_eq!(counts_from_value(&json!("1,2,3,4")), ZERO_COUNTS);
        assert_eq!(counts_from_value(&json!([1, 2, 3, 4])), [1, 2, 3, 4]);
    }
}
