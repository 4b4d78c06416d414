use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the outermost column level of every canonical table.
pub const VALUE_LEVEL: &str = "value";

/// The closed vocabulary of measured quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTag {
    /// Number of buildings approved.
    Count,
    /// Total floor area approved.
    FloorArea,
}

impl ValueTag {
    pub const ALL: [ValueTag; 2] = [Self::Count, Self::FloorArea];

    /// Column label used in canonical tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Count => "동수",
            Self::FloorArea => "연면적",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.label() == label)
    }

    pub fn labels() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Self::label)
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
