//! Adapter over a local open-format geometry loader.
//!
//! The scene loads a model file from disk and exposes its objects by numeric
//! express id; the global id of each object is its stable id. Colour is
//! applied as materials grouped by colour and opacity.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::{ViewerError, ViewerResult};
use super::protocol::{
    CallOutcome, Canvas, ColorFilter, ModelSource, ModelSourceKind, ViewerAdapter,
};
use super::shim::{native_error, ShimCore};
use crate::models::{ElementId, Rgb};

/// Native scene of the local loader. Implemented outside this crate.
#[async_trait]
pub trait OpenFormatScene: Send + Sync {
    async fn load_file(&self, path: &Path) -> anyhow::Result<()>;

    /// `(global id, express id)` for every object in the loaded file.
    fn global_id_table(&self) -> anyhow::Result<Vec<(String, u32)>>;

    fn set_visible(&self, express_ids: &[u32], visible: bool) -> anyhow::Result<()>;

    fn set_all_visible(&self, visible: bool) -> anyhow::Result<()>;

    /// Toggle translucent ghosting on `express_ids`.
    fn set_ghosted(&self, express_ids: &[u32], ghost: bool) -> anyhow::Result<()>;

    /// Remove every material override and use `default` (linear RGB) for all objects.
    fn reset_materials(&self, default: [f32; 3]) -> anyhow::Result<()>;

    fn apply_material(&self, express_ids: &[u32], color: [f32; 3], opacity: f32)
        -> anyhow::Result<()>;

    fn render_target(&self) -> anyhow::Result<(String, u32, u32)>;

    async fn unload(&self) -> anyhow::Result<()>;
}

pub struct OpenFormatViewer {
    scene: Arc<dyn OpenFormatScene>,
    core: ShimCore<u32>,
}

impl OpenFormatViewer {
    pub fn new(scene: Arc<dyn OpenFormatScene>) -> Self {
        Self {
            scene,
            core: ShimCore::new(ModelSourceKind::OpenFormat),
        }
    }

    pub fn mapped_elements(&self) -> usize {
        self.core.mapped_count()
    }

    async fn load(&self, path: &Path) -> anyhow::Result<Vec<(String, u32)>> {
        self.scene.load_file(path).await?;
        self.scene.global_id_table()
    }
}

/// Material key: colour channels plus opacity in thousandths.
type MaterialKey = ([u8; 3], u16);

#[async_trait]
impl ViewerAdapter for OpenFormatViewer {
    fn kind(&self) -> ModelSourceKind {
        ModelSourceKind::OpenFormat
    }

    async fn initialize(&self, source: &ModelSource) -> ViewerResult<()> {
        const OP: &str = "initialize";
        if source.kind != ModelSourceKind::OpenFormat {
            return Err(ViewerError::backend_mismatch(
                format!("the local loader cannot open a {} source", source.kind),
                self.core.context(OP),
            ));
        }
        self.core.begin_load(OP)?;

        match self.load(Path::new(&source.location)).await {
            Ok(table) => {
                let pairs = table
                    .into_iter()
                    .map(|(global_id, express_id)| (ElementId::new(global_id), express_id));
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
        let (express_ids, skipped) = self.core.resolve(OP, ids)?;
        let ctx = || self.core.context(OP);

        let others: Vec<u32> = {
            let keep: HashSet<u32> = express_ids.iter().copied().collect();
            self.core
                .all_natives()
                .into_iter()
                .filter(|id| !keep.contains(id))
                .collect()
        };

        self.scene
            .set_visible(&express_ids, true)
            .map_err(|e| native_error(ctx(), e))?;
        self.scene
            .set_ghosted(&express_ids, false)
            .map_err(|e| native_error(ctx(), e))?;
        if ghost_others {
            self.scene
                .set_ghosted(&others, true)
                .map_err(|e| native_error(ctx(), e))?;
        } else {
            self.scene
                .set_visible(&others, false)
                .map_err(|e| native_error(ctx(), e))?;
        }
        Ok(CallOutcome::new(express_ids.len(), skipped))
    }

    fn hide_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome> {
        const OP: &str = "hide_objects";
        if ids.is_empty() {
            self.core.ensure_ready(OP)?;
            self.scene
                .set_all_visible(false)
                .map_err(|e| native_error(self.core.context(OP), e))?;
            return Ok(CallOutcome::new(self.core.mapped_count(), Vec::new()));
        }
        let (express_ids, skipped) = self.core.resolve(OP, ids)?;
        self.scene
            .set_visible(&express_ids, false)
            .map_err(|e| native_error(self.core.context(OP), e))?;
        Ok(CallOutcome::new(express_ids.len(), skipped))
    }

    fn show_objects(&self, ids: &[ElementId]) -> ViewerResult<CallOutcome> {
        const OP: &str = "show_objects";
        let (express_ids, skipped) = self.core.resolve(OP, ids)?;
        if !express_ids.is_empty() {
            self.scene
                .set_visible(&express_ids, true)
                .map_err(|e| native_error(self.core.context(OP), e))?;
        }
        Ok(CallOutcome::new(express_ids.len(), skipped))
    }

    fn set_color_filter(&self, filter: &ColorFilter) -> ViewerResult<CallOutcome> {
        const OP: &str = "set_color_filter";
        self.core.ensure_ready(OP)?;
        let ctx = || self.core.context(OP);

        // One material per distinct colour/opacity keeps draw calls down
        let mut groups: BTreeMap<MaterialKey, Vec<(u32, &ElementId)>> = BTreeMap::new();
        let mut skipped = Vec::new();
        for entry in &filter.entries {
            match self.core.lookup(&entry.id) {
                Some(express_id) => {
                    let opacity = entry.opacity.unwrap_or(1.0).clamp(0.0, 1.0);
                    let key = (
                        [entry.color.r, entry.color.g, entry.color.b],
                        (opacity * 1000.0).round() as u16,
                    );
                    groups.entry(key).or_default().push((express_id, &entry.id));
                }
                None => skipped.push(entry.id.clone()),
            }
        }

        self.scene
            .reset_materials(filter.default_color.to_unit())
            .map_err(|e| native_error(ctx(), e))?;

        let mut applied = 0;
        for (([r, g, b], milli), members) in &groups {
            let color = Rgb::new(*r, *g, *b).to_unit();
            let express_ids: Vec<u32> = members.iter().map(|(id, _)| *id).collect();
            // A rejected material only loses its own group
            if let Err(err) =
                self.scene
                    .apply_material(&express_ids, color, f32::from(*milli) / 1000.0)
            {
                log::warn!("{}", native_error(ctx(), err));
                skipped.extend(members.iter().map(|(_, id)| (*id).clone()));
                continue;
            }
            applied += express_ids.len();
        }
        Ok(CallOutcome::new(applied, skipped))
    }

    fn get_canvas(&self) -> ViewerResult<Canvas> {
        const OP: &str = "get_canvas";
        self.core.ensure_ready(OP)?;
        let (surface, width, height) = self
            .scene
            .render_target()
            .map_err(|e| native_error(self.core.context(OP), e))?;
        Ok(Canvas {
            kind: ModelSourceKind::OpenFormat,
            surface,
            width,
            height,
        })
    }

    async fn dispose(&self) -> ViewerResult<()> {
        if !self.core.mark_disposed() {
            return Ok(());
        }
        self.scene
            .unload()
            .await
            .map_err(|e| native_error(self.core.context("dispose"), e))
    }
}
