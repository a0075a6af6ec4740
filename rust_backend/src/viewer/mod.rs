//! Viewer adapter protocol and the backend shims that implement it.
//!
//! # Components
//!
//! - [`protocol`]: the `ViewerAdapter` capability trait and its value types
//! - [`mesh_stream`], [`cad_platform`], [`open_format`]: adapters over the
//!   three native clients, each with its own identifier table
//! - [`factory`]: tagged dispatch from a model source to an adapter
//! - [`apply`]: reset-then-layer frame application with generation checks

pub mod apply;
pub mod cad_platform;
pub mod error;
pub mod factory;
pub mod id_map;
pub mod mesh_stream;
pub mod open_format;
pub mod protocol;
mod shim;

pub use apply::{ApplyReport, FrameApplier, FrameGeneration, FramePlan, FrameStep};
pub use cad_platform::{CadObject, CadPlatformSession, CadPlatformViewer};
pub use error::{ErrorContext, ViewerError, ViewerResult};
pub use factory::{NativeBackend, ViewerFactory};
pub use id_map::IdentifierMap;
pub use mesh_stream::{MeshStreamClient, MeshStreamViewer};
pub use open_format::{OpenFormatScene, OpenFormatViewer};
pub use protocol::{
    CallOutcome, Canvas, ColorEntry, ColorFilter, ModelSource, ModelSourceKind, ViewerAdapter,
};
