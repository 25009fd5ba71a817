//! Display language preference.

use std::fmt;

use crate::persist::{keys, KvStore, PersistResult};

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// Japanese.
    #[default]
    JaJp,
    /// Traditional Chinese.
    ZhTw,
}

impl Locale {
    /// Every supported locale.
    pub const ALL: [Locale; 2] = [Self::JaJp, Self::ZhTw];

    /// BCP 47 tag as stored.
    pub fn tag(self) -> &'static str {
        match self {
            Self::JaJp => "ja-JP",
            Self::ZhTw => "zh-TW",
        }
    }

    /// Exact match on a supported tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.tag() == tag)
    }

    /// Best match for a client language tag; Japanese when nothing fits.
    pub fn detect(language: &str) -> Self {
        if language.starts_with("zh") {
            Self::ZhTw
        } else {
            Self::JaJp
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Stored preference, if it names a supported locale.
pub fn load_locale(store: &dyn KvStore) -> Option<Locale> {
    let raw = match store.get(keys::LOCALE) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read locale");
            return None;
        }
    };
    let locale = Locale::from_tag(&raw);
    if locale.is_none() {
        tracing::debug!(tag = %raw, "stored locale unsupported");
    }
    locale
}

/// Stores `locale` as the preference.
pub fn save_locale(store: &mut dyn KvStore, locale: Locale) -> PersistResult<()> {
    store.set(keys::LOCALE, locale.tag())
}

/// Stores the locale named by `tag`.
///
/// Unsupported tags are logged and ignored; `Ok(None)` reports that case.
pub fn set_locale_tag(store: &mut dyn KvStore, tag: &str) -> PersistResult<Option<Locale>> {
    let Some(locale) = Locale::from_tag(tag) else {
        tracing::warn!(tag, "unsupported locale");
        return Ok(None);
    };
    save_locale(store, locale)?;
    Ok(Some(locale))
}

/// Stored preference, else detection from `client_language`.
pub fn resolve_locale(store: &dyn KvStore, client_language: &str) -> Locale {
    load_locale(store).unwrap_or_else(|| Locale::detect(client_language))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_prefix() {
        assert_eq!(Locale::detect("ja"), Locale::JaJp);
        assert_eq!(Locale::detect("zh-CN"), Locale::ZhTw);
        assert_eq!(Locale::detect("en-US"), Locale::JaJp);
    }

    #[test]
    fn tags_round_trip() {
        for locale in Locale::ALL {
            assert_eq!(Locale::from_tag(locale.tag()), Some(locale));
        }
        assert_eq!(Locale::from_tag("ja"), None);
    }
}
