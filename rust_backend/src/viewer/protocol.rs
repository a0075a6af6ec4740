//! The capability interface every rendering backend implements.
//!
//! The engine and timeline only ever talk to a `dyn ViewerAdapter`; which
//! backend sits behind it is decided once, at mount time, from the model
//! source kind.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ViewerResult;
use crate::models::{ElementId, Rgb};

/// Declared kind of a model source; selects the backend at mount time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSourceKind {
    /// Cloud-hosted model streamed as meshes, addressed by numeric db ids.
    MeshStream,
    /// Model hosted inside a CAD platform session, addressed by GUID strings.
    CadPlatform,
    /// Local open-format file, addressed by numeric express ids.
    OpenFormat,
}

impl ModelSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MeshStream => "mesh_stream",
            Self::CadPlatform => "cad_platform",
            Self::OpenFormat => "open_format",
        }
    }
}

impl fmt::Display for ModelSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "mesh_stream" | "stream" => Ok(Self::MeshStream),
            "cad_platform" | "cad" => Ok(Self::CadPlatform),
            "open_format" | "ifc" | "local" => Ok(Self::OpenFormat),
            _ => Err(format!("Unknown model source kind: {}", s)),
        }
    }
}

/// Where a model comes from and which backend can display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSource {
    pub kind: ModelSourceKind,
    /// Document URN, platform model id or file path, depending on `kind`.
    pub location: String,
}

impl ModelSource {
    pub fn new(kind: ModelSourceKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
        }
    }

    /// Guess the kind from the location's shape.
    ///
    /// `urn:` prefixes stream, `cad:` prefixes name a platform model, and
    /// `.ifc` / `.ifczip` files are loaded locally.
    pub fn infer(location: &str) -> Option<Self> {
        let trimmed = location.trim();
        let lower = trimmed.to_lowercase();
        let kind = if lower.starts_with("urn:") {
            ModelSourceKind::MeshStream
        } else if lower.starts_with("cad:") {
            ModelSourceKind::CadPlatform
        } else if lower.ends_with(".ifc") || lower.ends_with(".ifczip") {
            ModelSourceKind::OpenFormat
        } else {
            return None;
        };
        Some(Self::new(kind, trimmed))
    }
}

/// One explicit colour in a [`ColorFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub id: ElementId,
    pub color: Rgb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// A complete colouring. Applying one replaces every earlier colouring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorFilter {
    pub entries: Vec<ColorEntry>,
    pub default_color: Rgb,
}

impl ColorFilter {
    pub fn new(default_color: Rgb) -> Self {
        Self {
            entries: Vec::new(),
            default_color,
        }
    }

    pub fn push(&mut self, id: ElementId, color: Rgb, opacity: Option<f64>) {
        self.entries.push(ColorEntry { id, color, opacity });
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a call actually did: ids applied, and ids that did not resolve to a
/// native object (skipped as per-id no-ops).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub applied: usize,
    pub skipped: Vec<ElementId>,
}

impl CallOutcome {
    pub fn new(applied: usize, skipped: Vec<ElementId>) -> Self {
        Self { applied, skipped }
    }

    pub fn merge(&mut self, other: CallOutcome) {
        self.applied += other.applied;
        self.skipped.extend(other.skipped);
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Drawing surface handed to an external capture pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub kind: ModelSourceKind,
    /// Backend-specific surface handle (element id, texture name, ...).
    pub surface: String,
    pub width: u32,
    pub height: u32,
}

/// Capability interface for a mounted renderer.
///
/// Implementations serialize their own mutations, so every method takes
/// `&self`. Only `initialize` and `dispose` are asynchronous; every frame call
/// is synchronous.
///
/// Identifiers that cannot be resolved to a native object are skipped and
/// reported in the [`CallOutcome`]; they never fail the call.
#[async_trait]
pub trait ViewerAdapter: Send + Sync {
    fn kind(&self) -> ModelSourceKind;

    /// Load the model and build the identifier table. Awaited once before any
    /// frame is applied.
    async fn initialize(&self, source: &ModelSource) -> ViewerResult<()>;

    fn is_ready(&self) -> bool;

    /// Show only `ids`; other objects are ghosted when `ghost_others`, hidden otherwise.
    fn isolate_objects(&self, ids: &[ElementId], ghost_others: bool) -> ViewerResult<CallOutcome>;

    /// Hide `ids`. An empty slice hides everything.
    fn hide_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome>;

    fn show_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome>;

    /// Replace all prior colouring with `filter`.
    fn set_color_filter(&self, filter: &ColorFilter) -> ViewerResult<CallOutcome>;

    fn get_canvas(&self) -> ViewerResult<Canvas>;

    /// Release the renderer and clear the identifier table.
    async fn dispose(&self) -> ViewerResult<()>;
}
