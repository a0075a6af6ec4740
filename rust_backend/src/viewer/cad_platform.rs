//! Adapter over a viewer hosted inside a CAD platform.
//!
//! The platform needs an authenticated session before a model can be opened.
//! Objects are addressed by GUID strings; colours are per-object overrides
//! set in one batch.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{ViewerError, ViewerResult};
use super::protocol::{
    CallOutcome, Canvas, ColorFilter, ModelSource, ModelSourceKind, ViewerAdapter,
};
use super::shim::{native_error, ShimCore};
use crate::models::{ElementId, Rgb};

/// One object of an open platform model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadObject {
    pub stable_id: String,
    pub guid: String,
}

/// Native platform session. Implemented outside this crate.
#[async_trait]
pub trait CadPlatformSession: Send + Sync {
    fn is_authenticated(&self) -> bool;

    async fn authenticate(&self) -> anyhow::Result<()>;

    async fn open_model(&self, model_id: &str) -> anyhow::Result<()>;

    async fn list_objects(&self) -> anyhow::Result<Vec<CadObject>>;

    fn set_visibility(&self, guids: &[String], visible: bool) -> anyhow::Result<()>;

    fn set_all_visibility(&self, visible: bool) -> anyhow::Result<()>;

    /// Show only `guids`; others are ghosted (translucent) or hidden.
    fn isolate(&self, guids: &[String], ghost_others: bool) -> anyhow::Result<()>;

    /// Drop every override and paint the whole model `default` (RGBA, 8-bit).
    fn reset_color_overrides(&self, default: [u8; 4]) -> anyhow::Result<()>;

    fn set_color_overrides(&self, overrides: &[(String, [u8; 4])]) -> anyhow::Result<()>;

    /// Snapshot surface id and size in pixels.
    fn snapshot_surface(&self) -> anyhow::Result<(String, u32, u32)>;

    async fn close_model(&self) -> anyhow::Result<()>;
}

pub struct CadPlatformViewer {
    session: Arc<dyn CadPlatformSession>,
    core: ShimCore<String>,
}

impl CadPlatformViewer {
    pub fn new(session: Arc<dyn CadPlatformSession>) -> Self {
        Self {
            session,
            core: ShimCore::new(ModelSourceKind::CadPlatform),
        }
    }

    pub fn mapped_elements(&self) -> usize {
        self.core.mapped_count()
    }

    async fn open(&self, model_id: &str) -> anyhow::Result<Vec<CadObject>> {
        if !self.session.is_authenticated() {
            log::debug!("CAD platform session not authenticated; authenticating");
            self.session.authenticate().await?;
        }
        self.session.open_model(model_id).await?;
        self.session.list_objects().await
    }
}

fn rgba8(color: Rgb, opacity: Option<f64>) -> [u8; 4] {
    let alpha = (opacity.unwrap_or(1.0).clamp(0.0, 1.0) * 255.0).round() as u8;
    [color.r, color.g, color.b, alpha]
}

/// Platform model id from a `cad:`-prefixed or bare location.
fn model_id(location: &str) -> &str {
    let trimmed = location.trim();
    match trimmed.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("cad:") => &trimmed[4..],
        _ => trimmed,
    }
}

#[async_trait]
impl ViewerAdapter for CadPlatformViewer {
    fn kind(&self) -> ModelSourceKind {
        ModelSourceKind::CadPlatform
    }

    async fn initialize(&self, source: &ModelSource) -> ViewerResult<()> {
        const OP: &str = "initialize";
        if source.kind != ModelSourceKind::CadPlatform {
            return Err(ViewerError::backend_mismatch(
                format!("a CAD platform session cannot open a {} source", source.kind),
                self.core.context(OP),
            ));
        }
        self.core.begin_load(OP)?;

        match self.open(model_id(&source.location)).await {
            Ok(objects) => {
                let pairs = objects
                    .into_iter()
                    .map(|obj| (ElementId::new(obj.stable_id), obj.guid));
                self.core.finish_load(OP, pairs)?;
                Ok(())
            }
            Err(err) => {
                self.core.abort_load();
                Err(ViewerError::load_failed(
                    format!("{:#}", err),
                    self.core.context(OP).with_details(source.location.clone()),
                ))
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.core.is_ready()
    }

    fn isolate_objects(&self, ids: &[ElementId], ghost_others: bool) -> ViewerResult<CallOutcome> {
        const OP: &str = "isolate_objects";
        let (guids, skipped) = self.core.resolve(OP, ids)?;
        self.session
            .isolate(&guids, ghost_others)
            .map_err(|e| native_error(self.core.context(OP), e))?;
        Ok(CallOutcome::new(guids.len(), skipped))
    }

    fn hide_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome> {
        const OP: &str = "hide_objects";
        if ids.is_empty() {
            self.core.ensure_ready(OP)?;
            self.session
                .set_all_visibility(false)
                .map_err(|e| native_error(self.core.context(OP), e))?;
            return Ok(CallOutcome::new(self.core.mapped_count(), Vec::new()));
        }
        let (guids, skipped) = self.core.resolve(OP, ids)?;
        self.session
            .set_visibility(&guids, false)
            .map_err(|e| native_error(self.core.context(OP), e))?;
        Ok(CallOutcome::new(guids.len(), skipped))
    }

    fn show_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome> {
        const OP: &str = "show_objects";
        let (guids, skipped) = self.core.resolve(OP, ids)?;
        if !guids.is_empty() {
            self.session
                .set_visibility(&guids, true)
                .map_err(|e| native_error(self.core.context(OP), e))?;
        }
        Ok(CallOutcome::new(guids.len(), skipped))
    }

    fn set_color_filter(&self, filter: &ColorFilter) -> ViewerResult<CallOutcome> {
        const OP: &str = "set_color_filter";
        self.core.ensure_ready(OP)?;

        let mut skipped = Vec::new();
        let mut overrides = Vec::with_capacity(filter.entries.len());
        for entry in &filter.entries {
            match self.core.lookup(&entry.id) {
                Some(guid) => overrides.push((guid, rgba8(entry.color, entry.opacity))),
                None => skipped.push(entry.id.clone()),
            }
        }

        self.session
            .reset_color_overrides(rgba8(filter.default_color, None))
            .map_err(|e| native_error(self.core.context(OP), e))?;
        if !overrides.is_empty() {
            self.session
                .set_color_overrides(&overrides)
                .map_err(|e| native_error(self.core.context(OP), e))?;
        }
        Ok(CallOutcome::new(overrides.len(), skipped))
    }

    fn get_canvas(&self) -> ViewerResult<Canvas> {
        const OP: &str = "get_canvas";
        self.core.ensure_ready(OP)?;
        let (surface, width, height) = self
            .session
            .snapshot_surface()
            .map_err(|e| native_error(self.core.context(OP), e))?;
        Ok(Canvas {
            kind: ModelSourceKind::CadPlatform,
            surface,
            width,
            height,
        })
    }

    async fn dispose(&self) -> ViewerResult<()> {
        if !self.core.mark_disposed() {
            return Ok(());
        }
        self.session
            .close_model()
            .await
            .map_err(|e| native_error(self.core.context("dispose"), e))
    }
}
