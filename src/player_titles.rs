//! Player titles, as raw title ids.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TitleRecord {
    pub(crate) title: String,
}

/// Type-safe wrapper for a player title id, e.g. `"Season6GrandChampion"`.
///
/// The API only exposes the id; turning it into a display string is left to
/// callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerTitle(pub String);

impl PlayerTitle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TitleRecord> for PlayerTitle {
    fn from(record: TitleRecord) -> Self {
        Self(record.title)
    }
}
