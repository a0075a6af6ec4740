//! Viewer factory: picks the adapter for a model source.
//!
//! Dispatch is on the source's declared [`ModelSourceKind`]. The caller hands
//! over the native client it has; a client that cannot display the declared
//! kind is rejected before anything is loaded.

use std::sync::Arc;

use super::cad_platform::{CadPlatformSession, CadPlatformViewer};
use super::error::{ErrorContext, ViewerError, ViewerResult};
use super::mesh_stream::{MeshStreamClient, MeshStreamViewer};
use super::open_format::{OpenFormatScene, OpenFormatViewer};
use super::protocol::{ModelSource, ModelSourceKind, ViewerAdapter};

/// A native client for one of the supported backends.
#[derive(Clone)]
pub enum NativeBackend {
    MeshStream(Arc<dyn MeshStreamClient>),
    CadPlatform(Arc<dyn CadPlatformSession>),
    OpenFormat(Arc<dyn OpenFormatScene>),
}

impl NativeBackend {
    pub fn kind(&self) -> ModelSourceKind {
        match self {
            Self::MeshStream(_) => ModelSourceKind::MeshStream,
            Self::CadPlatform(_) => ModelSourceKind::CadPlatform,
            Self::OpenFormat(_) => ModelSourceKind::OpenFormat,
        }
    }
}

impl std::fmt::Debug for NativeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeBackend::{}", self.kind())
    }
}

/// Factory for creating and mounting viewer adapters.
///
/// # Example
/// ```ignore
/// use sim4d_rust::viewer::{ModelSource, NativeBackend, ViewerFactory};
///
/// let source = ModelSource::infer("/models/tower.ifc").unwrap();
/// let viewer = ViewerFactory::mount(&source, NativeBackend::OpenFormat(scene)).await?;
/// assert!(viewer.is_ready());
/// ```
pub struct ViewerFactory;

impl ViewerFactory {
    /// Create an (uninitialized) adapter for `kind` over `backend`.
    ///
    /// # Errors
    /// [`ViewerError::BackendMismatch`] if `backend` serves a different kind.
    pub fn create(
        kind: ModelSourceKind,
        backend: NativeBackend,
    ) -> ViewerResult<Arc<dyn ViewerAdapter>> {
        let adapter: Arc<dyn ViewerAdapter> = match (kind, backend) {
            (ModelSourceKind::MeshStream, NativeBackend::MeshStream(client)) => {
                Arc::new(MeshStreamViewer::new(client))
            }
            (ModelSourceKind::CadPlatform, NativeBackend::CadPlatform(session)) => {
                Arc::new(CadPlatformViewer::new(session))
            }
            (ModelSourceKind::OpenFormat, NativeBackend::OpenFormat(scene)) => {
                Arc::new(OpenFormatViewer::new(scene))
            }
            (kind, backend) => {
                return Err(ViewerError::backend_mismatch(
                    format!("source is {} but the native backend is {}", kind, backend.kind()),
                    ErrorContext::new("create").with_backend(backend.kind()),
                ));
            }
        };
        Ok(adapter)
    }

    /// Create the adapter for `source` and await its initialization.
    pub async fn mount(
        source: &ModelSource,
        backend: NativeBackend,
    ) -> ViewerResult<Arc<dyn ViewerAdapter>> {
        let adapter = Self::create(source.kind, backend)?;
        log::info!("Mounting {} viewer for {}", source.kind, source.location);
        adapter.initialize(source).await?;
        Ok(adapter)
    }
}
