use serde::{Deserialize, Serialize};

use entsync_core::LevelId;

/// Level name, case-insensitive over ASCII only (stored lower-cased).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelName(String);

impl LevelName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LevelName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for LevelName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local access level. Levels are created and managed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: LevelName,
}

impl Level {
    pub fn new(id: LevelId, name: impl AsRef<str>) -> Self {
        Self {
            id,
            name: LevelName::new(name),
        }
    }
}
