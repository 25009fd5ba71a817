//! `groupId:fullname` composite keys.

use std::fmt;

/// Separator between group id and fullname.
pub const SEPARATOR: char = ':';

/// Decoded composite key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    /// Group id; never contains the separator.
    pub group_id: String,
    /// Member fullname; may contain further separators.
    pub fullname: String,
}

impl CompositeKey {
    /// Builds a key from its parts.
    pub fn new(group_id: impl Into<String>, fullname: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            fullname: fullname.into(),
        }
    }

    /// Parses `key`, splitting at the first separator only.
    pub fn parse(key: &str) -> Option<Self> {
        decode(key)
    }

    /// String form, identical to [`encode`].
    pub fn encoded(&self) -> String {
        encode(&self.group_id, &self.fullname)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.group_id, self.fullname)
    }
}

/// Joins a group id and fullname into one key string.
pub fn encode(group_id: &str, fullname: &str) -> String {
    let mut out = String::with_capacity(group_id.len() + fullname.len() + 1);
    out.push_str(group_id);
    out.push(SEPARATOR);
    out.push_str(fullname);
    out
}

/// Splits a key at its first separator. `None` for empty or separator-free input.
pub fn decode(key: &str) -> Option<CompositeKey> {
    let (group_id, fullname) = key.split_once(SEPARATOR)?;
    Some(CompositeKey::new(group_id, fullname))
}

/// True when `key` carries a group prefix.
pub fn is_composite(key: &str) -> bool {
    key.contains(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keeps_later_colons_in_fullname() {
        let key = decode("sakurazaka:a:b:c").expect("key");
        assert_eq!(key.group_id, "sakurazaka");
        assert_eq!(key.fullname, "a:b:c");
    }

    #[test]
    fn decode_rejects_empty_and_colon_free_input() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("井上 梨名"), None);
    }

    #[test]
    fn display_matches_encode() {
        let key = CompositeKey::new("hinatazaka", "金村 美玖");
        assert_eq!(key.to_string(), encode("hinatazaka", "金村 美玖"));
        assert_eq!(key.encoded(), "hinatazaka:金村 美玖");
    }
}
