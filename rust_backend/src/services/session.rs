//! Simulation session: schedule data, timeline and mounted viewer in one place.
//!
//! Every change that affects the picture (scrub, mode, style, data refresh,
//! new viewer) recomputes the full frame from scratch and applies it right
//! away. Playback runs on a tokio task that shares the session state through
//! a `parking_lot` mutex; frame application happens under that lock.
//!
//! Switching viewers follows a strict order: stop the playback task, advance
//! the frame generation (so an in-flight application stops), dispose the old
//! adapter, then mount the new one and apply the current frame.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::frame::{FrameSummary, VisibilityFrame};
use super::link_index::LinkIndex;
use super::visibility_engine::{ActivitySnapshot, ProgressVisibilityEngine};
use crate::algorithms::{CriticalPathCache, CriticalPathResult, CycleError};
use crate::config::SimulationConfig;
use crate::models::{ScheduleData, ScheduleMode, VisualizationStyle};
use crate::timeline::{
    FrameRequest, PlaybackDriver, PlaybackHandle, PlaybackState, PlaybackTarget, ScheduleBounds,
    TimelineController, TimelineError, TimelineEvent,
};
use crate::viewer::{
    ApplyReport, FrameApplier, FrameGeneration, FramePlan, ModelSource, NativeBackend,
    ViewerAdapter, ViewerFactory, ViewerResult,
};

/// State shared between the session and its playback task.
struct SessionCore {
    config: SimulationConfig,
    schedule: ScheduleData,
    index: LinkIndex,
    critical: CriticalPathCache,
    controller: TimelineController,
    adapter: Option<Arc<dyn ViewerAdapter>>,
    applier: FrameApplier,
    frame: Option<VisibilityFrame>,
    last_apply: Option<ApplyReport>,
}

impl SessionCore {
    fn critical_path(&mut self) -> &CriticalPathResult {
        self.critical.resolve(&self.schedule.activities)
    }

    fn bounds(&self) -> Option<ScheduleBounds> {
        ScheduleBounds::from_schedule(&self.schedule.activities, &self.index, self.controller.mode())
    }

    /// Recompute the frame the controller calls for and push it to the viewer.
    fn refresh(&mut self) -> Option<FrameSummary> {
        let request = self.controller.frame_request()?;
        let frame = self.compute(request);
        let summary = frame.summary();

        if let Some(adapter) = self.adapter.clone() {
            if adapter.is_ready() {
                let plan = FramePlan::from_frame(&frame, &self.config.palette);
                let report = self.applier.apply_latest(adapter.as_ref(), &plan);
                if !report.is_clean() {
                    log::warn!(
                        "Frame {} applied with {} failed calls (superseded: {})",
                        request.date,
                        report.failures.len(),
                        report.superseded
                    );
                }
                self.last_apply = Some(report);
            } else {
                log::debug!("Viewer not ready; frame {} not applied", request.date);
            }
        }

        self.frame = Some(frame);
        Some(summary)
    }

    fn compute(&mut self, request: FrameRequest) -> VisibilityFrame {
        let critical = self.critical.resolve(&self.schedule.activities);
        ProgressVisibilityEngine::new(&self.schedule.activities, &self.index, critical)
            .with_settings(self.config.engine.clone())
            .with_palette(self.config.palette)
            .compute_frame(
                request.date,
                request.mode,
                request.style,
                request.highlight_critical_path,
            )
    }

    fn handle(&mut self, event: Option<TimelineEvent>) -> Option<FrameSummary> {
        match event?.frame_request() {
            Some(_) => self.refresh(),
            None => None,
        }
    }
}

impl PlaybackTarget for SessionCore {
    fn next_interval(&self) -> Option<Duration> {
        self.controller.next_interval()
    }

    fn advance(&mut self) -> Option<TimelineEvent> {
        let event = self.controller.tick();
        if event.and_then(|e| e.frame_request()).is_some() {
            self.refresh();
        }
        event
    }
}

/// One simulation: a schedule, a timeline and (optionally) a mounted viewer.
pub struct SimulationSession {
    core: Arc<Mutex<SessionCore>>,
    generation: FrameGeneration,
    playback: Option<PlaybackHandle>,
}

impl SimulationSession {
    pub fn new(config: SimulationConfig) -> Self {
        let controller = TimelineController::new(&config.playback)
            .with_style(config.engine.default_style)
            .with_highlight(config.engine.highlight_critical_path);
        let generation = FrameGeneration::new();
        let core = SessionCore {
            config,
            schedule: ScheduleData::default(),
            index: LinkIndex::default(),
            critical: CriticalPathCache::new(),
            controller,
            adapter: None,
            applier: FrameApplier::new(generation.clone()),
            frame: None,
            last_apply: None,
        };
        Self {
            core: Arc::new(Mutex::new(core)),
            generation,
            playback: None,
        }
    }

    pub fn with_schedule(config: SimulationConfig, data: ScheduleData) -> Self {
        let session = Self::new(config);
        session.replace_schedule(data);
        session
    }

    /// Install fresh schedule/link data.
    ///
    /// Rebuilds the link index, recomputes the critical path, re-derives the
    /// schedule bounds and applies a new frame immediately.
    pub fn replace_schedule(&self, data: ScheduleData) -> Option<FrameSummary> {
        let mut guard = self.core.lock();
        let core = &mut *guard;
        core.index = LinkIndex::build(&data.links);
        core.schedule = data;

        // A cycle is logged by the cache and leaves the critical set empty
        let _ = core.critical.recompute(&core.schedule.activities);

        log::info!(
            "Schedule loaded: {} activities, {} links, {} elements",
            core.schedule.activities.len(),
            core.index.len(),
            core.index.element_count()
        );

        let bounds = core.bounds();
        core.controller.set_bounds(bounds);
        core.refresh()
    }

    /// Mount an initialized adapter, replacing (and disposing) any current one.
    pub async fn mount_viewer(&mut self, adapter: Arc<dyn ViewerAdapter>) -> Option<FrameSummary> {
        self.unmount_viewer().await;
        let mut core = self.core.lock();
        log::info!("Viewer mounted: {}", adapter.kind());
        core.adapter = Some(adapter);
        core.refresh()
    }

    /// Create, initialize and mount the adapter for `source`.
    ///
    /// The current viewer is torn down first, so a failed load leaves the
    /// session without a viewer.
    pub async fn mount_source(
        &mut self,
        source: &ModelSource,
        backend: NativeBackend,
    ) -> ViewerResult<Option<FrameSummary>> {
        self.unmount_viewer().await;
        let adapter = ViewerFactory::mount(source, backend).await?;
        Ok(self.mount_viewer(adapter).await)
    }

    /// Stop playback, abandon in-flight frame application and dispose the viewer.
    pub async fn unmount_viewer(&mut self) {
        self.halt_playback().await;
        self.generation.advance();

        let previous = self.core.lock().adapter.take();
        if let Some(adapter) = previous {
            if let Err(err) = adapter.dispose().await {
                log::warn!("Disposing {} viewer failed: {}", adapter.kind(), err);
            }
        }
    }

    pub fn has_viewer(&self) -> bool {
        self.core.lock().adapter.is_some()
    }

    /// Start playback on a tokio task.
    pub async fn play(&mut self) -> Result<(), TimelineError> {
        self.halt_playback().await;
        {
            let mut core = self.core.lock();
            let event = core.controller.play()?;
            core.handle(Some(event));
        }
        self.playback = Some(PlaybackDriver::spawn(self.core.clone()));
        Ok(())
    }

    pub async fn pause(&mut self) {
        self.halt_playback().await;
    }

    /// Stop playback and rewind to the schedule start.
    pub async fn stop(&mut self) -> Option<FrameSummary> {
        self.halt_playback().await;
        let mut core = self.core.lock();
        let event = core.controller.stop();
        core.handle(event)
    }

    /// Join the playback task (if any) and leave the controller paused.
    async fn halt_playback(&mut self) {
        if let Some(handle) = self.playback.take() {
            let ticks = handle.stop().await;
            log::debug!("Playback stopped after {} ticks", ticks);
        }
        self.core.lock().controller.pause();
    }

    fn cancel_playback(&mut self) {
        if let Some(handle) = self.playback.take() {
            handle.cancel();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.core.lock().controller.state() == PlaybackState::Playing
    }

    pub fn begin_scrub(&mut self) {
        self.cancel_playback();
        self.core.lock().controller.begin_scrub();
    }

    /// Jump to `offset_days` from the schedule start; recomputes synchronously.
    pub fn scrub_to(&mut self, offset_days: i64) -> Result<Option<FrameSummary>, TimelineError> {
        self.cancel_playback();
        let mut core = self.core.lock();
        let event = core.controller.scrub_to(offset_days)?;
        Ok(core.handle(Some(event)))
    }

    pub fn end_scrub(&mut self) {
        self.core.lock().controller.end_scrub();
    }

    /// Switch planned/actual. Bounds are re-derived for the new mode.
    pub fn set_mode(&self, mode: ScheduleMode) -> Option<FrameSummary> {
        let mut core = self.core.lock();
        if core.controller.set_mode(mode).is_none() {
            return None;
        }
        let bounds = core.bounds();
        core.controller.set_bounds(bounds);
        core.refresh()
    }

    pub fn set_style(&self, style: VisualizationStyle) -> Option<FrameSummary> {
        let mut core = self.core.lock();
        let event = core.controller.set_style(style);
        core.handle(event)
    }

    pub fn set_highlight_critical_path(&self, highlight: bool) -> Option<FrameSummary> {
        let mut core = self.core.lock();
        let event = core.controller.set_highlight_critical_path(highlight);
        core.handle(event)
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), TimelineError> {
        self.core.lock().controller.set_speed(speed)
    }

    /// Recompute and re-apply the current frame.
    pub fn refresh(&self) -> Option<FrameSummary> {
        self.core.lock().refresh()
    }

    /// The most recently computed frame.
    pub fn current_frame(&self) -> Option<VisibilityFrame> {
        self.core.lock().frame.clone()
    }

    /// A copy of the timeline state.
    pub fn timeline(&self) -> TimelineController {
        self.core.lock().controller.clone()
    }

    pub fn last_apply_report(&self) -> Option<ApplyReport> {
        self.core.lock().last_apply.clone()
    }

    /// The cycle that blocked the critical-path pass, if any.
    pub fn critical_path_error(&self) -> Option<CycleError> {
        let mut core = self.core.lock();
        core.critical_path();
        core.critical.last_error().cloned()
    }

    pub fn critical_path(&self) -> CriticalPathResult {
        self.core.lock().critical_path().clone()
    }

    pub fn activity_snapshots(&self) -> Vec<ActivitySnapshot> {
        let mut core = self.core.lock();
        let Some(request) = core.controller.frame_request() else {
            return Vec::new();
        };
        let core = &mut *core;
        let critical = core.critical.resolve(&core.schedule.activities);
        ProgressVisibilityEngine::new(&core.schedule.activities, &core.index, critical)
            .activity_snapshots(request.date, request.mode, request.highlight_critical_path)
    }
}

impl Drop for SimulationSession {
    fn drop(&mut self) {
        self.cancel_playback();
    }
}
