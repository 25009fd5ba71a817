//! Shared primitive types, cut categories, and photo count vectors.

use serde::{Deserialize, Serialize};

/// Number of tracked cut types per member.
pub const CUT_COUNT: usize = 4;

/// Per-member count vector, one slot per [`CutType`] in [`CutType::ALL`] order.
pub type PhotoCounts = [u32; CUT_COUNT];

/// All-zero count vector used for absent entries.
pub const ZERO_COUNTS: PhotoCounts = [0; CUT_COUNT];

/// Table identifier.
pub type TableId = uuid::Uuid;

/// Photo composition category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CutType {
    /// Close-up.
    Yori,
    /// Medium shot.
    Chu,
    /// Full-body shot.
    Hiki,
    /// Seated shot.
    Suwari,
}

impl CutType {
    /// Cut types in count-vector order.
    pub const ALL: [CutType; CUT_COUNT] = [Self::Yori, Self::Chu, Self::Hiki, Self::Suwari];

    /// Position of this cut inside a [`PhotoCounts`] vector.
    pub fn index(self) -> usize {
        match self {
            Self::Yori => 0,
            Self::Chu => 1,
            Self::Hiki => 2,
            Self::Suwari => 3,
        }
    }

    /// Japanese label used for CSV headers and the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Yori => "ヨリ",
            Self::Chu => "チュウ",
            Self::Hiki => "ヒキ",
            Self::Suwari => "座り",
        }
    }
}

/// Default cut labels in vector order.
pub fn cut_labels() -> [&'static str; CUT_COUNT] {
    CutType::ALL.map(CutType::label)
}

/// Returns true when every slot of `counts` is zero.
pub fn is_zero(counts: &PhotoCounts) -> bool {
    counts.iter().all(|v| *v == 0)
}
