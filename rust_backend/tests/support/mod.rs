//! Shared fixtures and recording fakes for the native viewer clients.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use sim4d_rust::models::time::add_days;
use sim4d_rust::models::{Activity, ElementActivityLink, ElementId, ScheduleData};
use sim4d_rust::viewer::{CadObject, CadPlatformSession, MeshStreamClient, OpenFormatScene};

pub fn day(n: i64) -> NaiveDate {
    add_days(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), n)
}

pub fn ids(raw: &[&str]) -> Vec<ElementId> {
    raw.iter().map(|s| ElementId::new(*s)).collect()
}

/// A small building schedule:
///
/// | id | activity    | window     | progress | preds | elements            |
/// |----|-------------|------------|----------|-------|---------------------|
/// | 1  | Foundations | day 0..10  | 100%     |       | footing-1, footing-2 |
/// | 2  | Columns     | day 10..20 | 50%      | 1     | col-1 .. col-4      |
/// | 3  | Roof        | day 20..30 | 0%       | 2     | roof-1              |
/// | 4  | Landscaping | day 10..15 | 0%       | 1     | tree-1              |
///
/// 1 → 2 → 3 is the critical chain; landscaping has 15 days of float.
pub fn building_schedule() -> ScheduleData {
    let activities = vec![
        Activity::planned(1, "Foundations", day(0), day(10)).with_progress(100.0),
        Activity::planned(2, "Columns", day(10), day(20))
            .with_progress(50.0)
            .with_predecessors([1]),
        Activity::planned(3, "Roof", day(20), day(30)).with_predecessors([2]),
        Activity::planned(4, "Landscaping", day(10), day(15)).with_predecessors([1]),
    ];
    let links = vec![
        ElementActivityLink::new("footing-2", 1),
        ElementActivityLink::new("footing-1", 1),
        ElementActivityLink::new("col-3", 2),
        ElementActivityLink::new("col-1", 2),
        ElementActivityLink::new("col-4", 2),
        ElementActivityLink::new("col-2", 2),
        ElementActivityLink::new("roof-1", 3),
        ElementActivityLink::new("tree-1", 4),
    ];
    ScheduleData::new(activities, links)
}

pub const BUILDING_ELEMENTS: [&str; 8] = [
    "col-1", "col-2", "col-3", "col-4", "footing-1", "footing-2", "roof-1", "tree-1",
];

/// Calls made against a fake, in order.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
}

impl CallLog {
    pub fn record(&self, call: impl Into<String>) -> anyhow::Result<()> {
        let call = call.into();
        let name = call.split(':').next().unwrap_or_default().to_string();
        self.calls.lock().push(call);
        match self.fail_on.lock().as_deref() {
            Some(op) if op == name => anyhow::bail!("{} rejected by native client", name),
            _ => Ok(()),
        }
    }

    pub fn fail_on(&self, operation: &str) {
        *self.fail_on.lock() = Some(operation.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.split(':').next().unwrap_or_default().to_string())
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| n.as_str() == name).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Mesh-streaming fake: db ids are 100 + position in `elements`.
#[derive(Debug, Default)]
pub struct FakeMeshClient {
    pub log: CallLog,
    pub table: HashMap<String, u32>,
    pub theming: Mutex<HashMap<u32, [f32; 4]>>,
    pub fail_load: bool,
    /// `set_theming_color` rejects this db id.
    pub reject_theming: Mutex<Option<u32>>,
}

impl FakeMeshClient {
    pub fn with_elements(elements: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            table: elements
                .iter()
                .enumerate()
                .map(|(i, e)| (e.to_string(), 100 + i as u32))
                .collect(),
            ..Default::default()
        })
    }

    pub fn failing_load() -> Arc<Self> {
        Arc::new(Self {
            fail_load: true,
            ..Default::default()
        })
    }

    pub fn db_id(&self, element: &str) -> u32 {
        self.table[element]
    }

    pub fn reject_theming_for(&self, element: &str) {
        *self.reject_theming.lock() = Some(self.db_id(element));
    }
}

#[async_trait]
impl MeshStreamClient for FakeMeshClient {
    async fn load_document(&self, urn: &str) -> anyhow::Result<()> {
        self.log.record(format!("load_document:{}", urn))?;
        if self.fail_load {
            anyhow::bail!("document {} not found", urn);
        }
        Ok(())
    }

    async fn fetch_external_id_map(&self) -> anyhow::Result<HashMap<String, u32>> {
        self.log.record("fetch_external_id_map")?;
        Ok(self.table.clone())
    }

    fn hide(&self, db_ids: &[u32]) -> anyhow::Result<()> {
        self.log.record(format!("hide:{}", join(db_ids)))
    }

    fn hide_all(&self) -> anyhow::Result<()> {
        self.log.record("hide_all")
    }

    fn show(&self, db_ids: &[u32]) -> anyhow::Result<()> {
        let mut sorted = db_ids.to_vec();
        sorted.sort_unstable();
        self.log.record(format!("show:{}", join(&sorted)))
    }

    fn isolate(&self, db_ids: &[u32]) -> anyhow::Result<()> {
        self.log.record(format!("isolate:{}", join(db_ids)))
    }

    fn set_ghosting(&self, enabled: bool) -> anyhow::Result<()> {
        self.log.record(format!("set_ghosting:{}", enabled))
    }

    fn clear_theming_colors(&self) -> anyhow::Result<()> {
        self.theming.lock().clear();
        self.log.record("clear_theming_colors")
    }

    fn set_theming_color(&self, db_id: u32, rgba: [f32; 4]) -> anyhow::Result<()> {
        self.log.record(format!("set_theming_color:{}", db_id))?;
        if *self.reject_theming.lock() == Some(db_id) {
            anyhow::bail!("object {} is locked", db_id);
        }
        self.theming.lock().insert(db_id, rgba);
        Ok(())
    }

    fn canvas(&self) -> anyhow::Result<(String, u32, u32)> {
        self.log.record("canvas")?;
        Ok(("mesh-canvas".to_string(), 1280, 720))
    }

    async fn unload(&self) -> anyhow::Result<()> {
        self.log.record("unload")
    }
}

/// CAD platform fake: GUIDs are `guid-<stable id>`.
#[derive(Debug, Default)]
pub struct FakeCadSession {
    pub log: CallLog,
    pub objects: Vec<CadObject>,
    pub authenticated: Mutex<bool>,
    pub overrides: Mutex<Vec<(String, [u8; 4])>>,
}

impl FakeCadSession {
    pub fn with_elements(elements: &[&str], authenticated: bool) -> Arc<Self> {
        Arc::new(Self {
            objects: elements
                .iter()
                .map(|e| CadObject {
                    stable_id: e.to_string(),
                    guid: format!("guid-{}", e),
                })
                .collect(),
            authenticated: Mutex::new(authenticated),
            ..Default::default()
        })
    }
}

#[async_trait]
impl CadPlatformSession for FakeCadSession {
    fn is_authenticated(&self) -> bool {
        *self.authenticated.lock()
    }

    async fn authenticate(&self) -> anyhow::Result<()> {
        self.log.record("authenticate")?;
        *self.authenticated.lock() = true;
        Ok(())
    }

    async fn open_model(&self, model_id: &str) -> anyhow::Result<()> {
        self.log.record(format!("open_model:{}", model_id))
    }

    async fn list_objects(&self) -> anyhow::Result<Vec<CadObject>> {
        self.log.record("list_objects")?;
        Ok(self.objects.clone())
    }

    fn set_visibility(&self, guids: &[String], visible: bool) -> anyhow::Result<()> {
        self.log
            .record(format!("set_visibility:{}:{}", visible, join(guids)))
    }

    fn set_all_visibility(&self, visible: bool) -> anyhow::Result<()> {
        self.log.record(format!("set_all_visibility:{}", visible))
    }

    fn isolate(&self, guids: &[String], ghost_others: bool) -> anyhow::Result<()> {
        self.log
            .record(format!("isolate:{}:{}", ghost_others, join(guids)))
    }

    fn reset_color_overrides(&self, default: [u8; 4]) -> anyhow::Result<()> {
        self.overrides.lock().clear();
        self.log.record(format!("reset_color_overrides:{:?}", default))
    }

    fn set_color_overrides(&self, overrides: &[(String, [u8; 4])]) -> anyhow::Result<()> {
        self.overrides.lock().extend_from_slice(overrides);
        self.log.record(format!("set_color_overrides:{}", overrides.len()))
    }

    fn snapshot_surface(&self) -> anyhow::Result<(String, u32, u32)> {
        self.log.record("snapshot_surface")?;
        Ok(("cad-surface".to_string(), 1920, 1080))
    }

    async fn close_model(&self) -> anyhow::Result<()> {
        self.log.record("close_model")
    }
}

/// Open-format fake: express ids are 1 + position in `elements`.
#[derive(Debug, Default)]
pub struct FakeOpenFormatScene {
    pub log: CallLog,
    pub table: Vec<(String, u32)>,
    pub materials: Mutex<Vec<(Vec<u32>, [f32; 3], f32)>>,
    /// `apply_material` rejects groups with this opacity.
    pub reject_opacity: Mutex<Option<f32>>,
}

impl FakeOpenFormatScene {
    pub fn with_elements(elements: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            table: elements
                .iter()
                .enumerate()
                .map(|(i, e)| (e.to_string(), 1 + i as u32))
                .collect(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl OpenFormatScene for FakeOpenFormatScene {
    async fn load_file(&self, path: &Path) -> anyhow::Result<()> {
        self.log.record(format!("load_file:{}", path.display()))
    }

    fn global_id_table(&self) -> anyhow::Result<Vec<(String, u32)>> {
        self.log.record("global_id_table")?;
        Ok(self.table.clone())
    }

    fn set_visible(&self, express_ids: &[u32], visible: bool) -> anyhow::Result<()> {
        self.log
            .record(format!("set_visible:{}:{}", visible, join(express_ids)))
    }

    fn set_all_visible(&self, visible: bool) -> anyhow::Result<()> {
        self.log.record(format!("set_all_visible:{}", visible))
    }

    fn set_ghosted(&self, express_ids: &[u32], ghost: bool) -> anyhow::Result<()> {
        self.log
            .record(format!("set_ghosted:{}:{}", ghost, join(express_ids)))
    }

    fn reset_materials(&self, _default: [f32; 3]) -> anyhow::Result<()> {
        self.materials.lock().clear();
        self.log.record("reset_materials")
    }

    fn apply_material(&self, express_ids: &[u32], color: [f32; 3], opacity: f32) -> anyhow::Result<()> {
        if *self.reject_opacity.lock() == Some(opacity) {
            anyhow::bail!("material with opacity {} rejected", opacity);
        }
        self.materials
            .lock()
            .push((express_ids.to_vec(), color, opacity));
        self.log.record(format!("apply_material:{}", join(express_ids)))
    }

    fn render_target(&self) -> anyhow::Result<(String, u32, u32)> {
        self.log.record("render_target")?;
        Ok(("ifc-target".to_string(), 800, 600))
    }

    async fn unload(&self) -> anyhow::Result<()> {
        self.log.record("unload")
    }
}
