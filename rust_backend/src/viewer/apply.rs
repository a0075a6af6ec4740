//! Applying a visibility frame to a stateful renderer.
//!
//! A frame is applied as reset-then-layer: hide everything, show the visible
//! set, then replace the colour filter. Each step is independent of whatever
//! the renderer showed before, so scrubbing backwards is safe.
//!
//! Applications are tagged with a [`FrameGeneration`]. When a newer frame is
//! requested the counter moves on and an older application stops at its next
//! step boundary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use super::error::ViewerError;
use super::protocol::{CallOutcome, ColorFilter, ViewerAdapter};
use crate::config::Palette;
use crate::models::ElementId;
use crate::services::VisibilityFrame;

/// Shared, monotonically increasing frame counter.
#[derive(Debug, Clone, Default)]
pub struct FrameGeneration(Arc<AtomicU64>);

impl FrameGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding every earlier one.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameStep {
    /// `hide_objects([])`: the reset primitive.
    HideAll,
    ShowObjects(Vec<ElementId>),
    SetColorFilter(ColorFilter),
}

impl FrameStep {
    pub fn name(&self) -> &'static str {
        match self {
            FrameStep::HideAll => "hide_objects",
            FrameStep::ShowObjects(_) => "show_objects",
            FrameStep::SetColorFilter(_) => "set_color_filter",
        }
    }
}

/// The adapter calls that realize one frame, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub date: NaiveDate,
    pub steps: Vec<FrameStep>,
}

impl FramePlan {
    pub fn from_frame(frame: &VisibilityFrame, palette: &Palette) -> Self {
        let mut visible = Vec::new();
        let mut filter = ColorFilter::new(palette.default);
        for (id, appearance) in frame.iter() {
            if appearance.visible {
                visible.push(id.clone());
                filter.push(id.clone(), appearance.color, Some(appearance.opacity));
            }
        }
        Self {
            date: frame.date,
            steps: vec![
                FrameStep::HideAll,
                FrameStep::ShowObjects(visible),
                FrameStep::SetColorFilter(filter),
            ],
        }
    }
}

/// What happened while applying one plan.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    pub generation: u64,
    pub steps_run: usize,
    pub outcome: CallOutcome,
    pub failures: Vec<ViewerError>,
    /// A newer generation started before the plan finished.
    pub superseded: bool,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        !self.superseded && self.failures.is_empty()
    }
}

/// Runs [`FramePlan`]s against an adapter.
#[derive(Debug, Clone, Default)]
pub struct FrameApplier {
    generation: FrameGeneration,
}

impl FrameApplier {
    pub fn new(generation: FrameGeneration) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> &FrameGeneration {
        &self.generation
    }

    /// Apply `plan` as generation `generation`.
    ///
    /// A failed call is logged and recorded; later steps still run. Before
    /// each step the generation is checked and a superseded plan stops.
    pub fn apply(
        &self,
        adapter: &dyn ViewerAdapter,
        plan: &FramePlan,
        generation: u64,
    ) -> ApplyReport {
        let mut report = ApplyReport {
            generation,
            ..Default::default()
        };

        for step in &plan.steps {
            if !self.generation.is_current(generation) {
                log::debug!(
                    "Frame {} (generation {}) superseded after {} steps",
                    plan.date,
                    generation,
                    report.steps_run
                );
                report.superseded = true;
                break;
            }

            let result = match step {
                FrameStep::HideAll => adapter.hide_objects(&[]).map(|_| CallOutcome::default()),
                FrameStep::ShowObjects(ids) => adapter.show_objects(ids),
                FrameStep::SetColorFilter(filter) => adapter.set_color_filter(filter),
            };
            report.steps_run += 1;

            match result {
                Ok(outcome) => report.outcome.merge(outcome),
                Err(err) => {
                    log::warn!("{} failed while applying frame {}: {}", step.name(), plan.date, err);
                    report.failures.push(err);
                }
            }
        }

        report
    }

    /// Start a new generation and apply `plan` under it.
    pub fn apply_latest(&self, adapter: &dyn ViewerAdapter, plan: &FramePlan) -> ApplyReport {
        let generation = self.generation.advance();
        self.apply(adapter, plan, generation)
    }
}
