//! Adapter over a cloud mesh-streaming viewer.
//!
//! Objects are addressed by numeric db ids. After the document loads, the
//! client's external-id table (stable id → db id) is fetched once and cached
//! for the adapter's lifetime. Colours are applied as per-object theming
//! colours with an alpha channel.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use super::error::{ViewerError, ViewerResult};
use super::protocol::{
    CallOutcome, Canvas, ColorFilter, ModelSource, ModelSourceKind, ViewerAdapter,
};
use super::shim::{native_error, ShimCore};
use crate::models::{ElementId, Rgb};

/// Native mesh-streaming client. Implemented outside this crate.
#[async_trait]
pub trait MeshStreamClient: Send + Sync {
    /// Load the document identified by `urn`.
    async fn load_document(&self, urn: &str) -> anyhow::Result<()>;

    /// External (stable) id → db id table of the loaded document.
    async fn fetch_external_id_map(&self) -> anyhow::Result<HashMap<String, u32>>;

    fn hide(&self, db_ids: &[u32]) -> anyhow::Result<()>;

    fn hide_all(&self) -> anyhow::Result<()>;

    fn show(&self, db_ids: &[u32]) -> anyhow::Result<()>;

    fn isolate(&self, db_ids: &[u32]) -> anyhow::Result<()>;

    fn set_ghosting(&self, enabled: bool) -> anyhow::Result<()>;

    fn clear_theming_colors(&self) -> anyhow::Result<()>;

    /// RGBA with channels in `[0, 1]`.
    fn set_theming_color(&self, db_id: u32, rgba: [f32; 4]) -> anyhow::Result<()>;

    /// Canvas element id and its size in pixels.
    fn canvas(&self) -> anyhow::Result<(String, u32, u32)>;

    async fn unload(&self) -> anyhow::Result<()>;
}

pub struct MeshStreamViewer {
    client: Arc<dyn MeshStreamClient>,
    core: ShimCore<u32>,
}

impl MeshStreamViewer {
    pub fn new(client: Arc<dyn MeshStreamClient>) -> Self {
        Self {
            client,
            core: ShimCore::new(ModelSourceKind::MeshStream),
        }
    }

    pub fn mapped_elements(&self) -> usize {
        self.core.mapped_count()
    }
}

fn rgba(color: Rgb, opacity: Option<f64>) -> [f32; 4] {
    let [r, g, b] = color.to_unit();
    [r, g, b, opacity.unwrap_or(1.0).clamp(0.0, 1.0) as f32]
}

#[async_trait]
impl ViewerAdapter for MeshStreamViewer {
    fn kind(&self) -> ModelSourceKind {
        ModelSourceKind::MeshStream
    }

    async fn initialize(&self, source: &ModelSource) -> ViewerResult<()> {
        const OP: &str = "initialize";
        if source.kind != ModelSourceKind::MeshStream {
            return Err(ViewerError::backend_mismatch(
                format!("cannot stream a {} source", source.kind),
                self.core.context(OP),
            ));
        }
        self.core.begin_load(OP)?;

        let loaded = async {
            self.client.load_document(&source.location).await?;
            self.client.fetch_external_id_map().await
        }
        .await;

        match loaded {
            Ok(table) => {
                let pairs = table
                    .into_iter()
                    .map(|(stable, db_id)| (ElementId::new(stable), db_id));
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
        let (db_ids, skipped) = self.core.resolve(OP, ids)?;
        let ctx = || self.core.context(OP);
        self.client
            .set_ghosting(ghost_others)
            .map_err(|e| native_error(ctx(), e))?;
        self.client.isolate(&db_ids).map_err(|e| native_error(ctx(), e))?;
        Ok(CallOutcome::new(db_ids.len(), skipped))
    }

    fn hide_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome> {
        const OP: &str = "hide_objects";
        if ids.is_empty() {
            self.core.ensure_ready(OP)?;
            self.client
                .hide_all()
                .map_err(|e| native_error(self.core.context(OP), e))?;
            return Ok(CallOutcome::new(self.core.mapped_count(), Vec::new()));
        }
        let (db_ids, skipped) = self.core.resolve(OP, ids)?;
        self.client
            .hide(&db_ids)
            .map_err(|e| native_error(self.core.context(OP), e))?;
        Ok(CallOutcome::new(db_ids.len(), skipped))
    }

    fn show_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome> {
        const OP: &str = "show_objects";
        let (db_ids, skipped) = self.core.resolve(OP, ids)?;
        if !db_ids.is_empty() {
            self.client
                .show(&db_ids)
                .map_err(|e| native_error(self.core.context(OP), e))?;
        }
        Ok(CallOutcome::new(db_ids.len(), skipped))
    }

    fn set_color_filter(&self, filter: &ColorFilter) -> ViewerResult<CallOutcome> {
        const OP: &str = "set_color_filter";
        self.core.ensure_ready(OP)?;
        let ctx = || self.core.context(OP);

        self.client
            .clear_theming_colors()
            .map_err(|e| native_error(ctx(), e))?;

        let mut outcome = CallOutcome::default();
        let mut colored: HashSet<u32> = HashSet::new();
        for entry in &filter.entries {
            let Some(db_id) = self.core.lookup(&entry.id) else {
                outcome.skipped.push(entry.id.clone());
                continue;
            };
            // A failed element is skipped; the rest are still coloured
            if let Err(err) = self.client.set_theming_color(db_id, rgba(entry.color, entry.opacity)) {
                log::warn!("{}", native_error(ctx().with_element(&entry.id), err));
                outcome.skipped.push(entry.id.clone());
                continue;
            }
            colored.insert(db_id);
            outcome.applied += 1;
        }

        // Theming has no global default; paint it onto everything else
        let default = rgba(filter.default_color, None);
        let mut unpainted = 0usize;
        for db_id in self.core.all_natives() {
            if colored.contains(&db_id) {
                continue;
            }
            if let Err(err) = self.client.set_theming_color(db_id, default) {
                log::debug!("Default colour for db id {} failed: {:#}", db_id, err);
                unpainted += 1;
            }
        }
        if unpainted > 0 {
            log::warn!(
                "{}: default colour not applied to {} objects",
                ctx(),
                unpainted
            );
        }
        Ok(outcome)
    }

    fn get_canvas(&self) -> ViewerResult<Canvas> {
        const OP: &str = "get_canvas";
        self.core.ensure_ready(OP)?;
        let (surface, width, height) = self
            .client
            .canvas()
            .map_err(|e| native_error(self.core.context(OP), e))?;
        Ok(Canvas {
            kind: ModelSourceKind::MeshStream,
            surface,
            width,
            height,
        })
    }

    async fn dispose(&self) -> ViewerResult<()> {
        if !self.core.mark_disposed() {
            return Ok(());
        }
        self.client
            .unload()
            .await
            .map_err(|e| native_error(self.core.context("dispose"), e))
    }
}
