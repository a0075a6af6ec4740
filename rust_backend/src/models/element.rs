use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a piece of model geometry.
///
/// This is the only identifier shared across rendering backends; each backend
/// maps it to its own native id space. Ordering is lexicographic on the
/// underlying string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(value: impl Into<String>) -> Self {
        ElementId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(v: &str) -> Self {
        ElementId(v.to_string())
    }
}

impl From<String> for ElementId {
    fn from(v: String) -> Self {
        ElementId(v)
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An addressable piece of 3D geometry, owned by the active model backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub stable_id: ElementId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

impl Element {
    pub fn new(stable_id: impl Into<ElementId>) -> Self {
        Self {
            stable_id: stable_id.into(),
            name: None,
            category: None,
            family: None,
        }
    }
}
