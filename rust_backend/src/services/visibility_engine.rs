//! Progress visibility engine.
//!
//! Turns `(date, mode, style, highlight)` into a complete [`VisibilityFrame`]
//! for every linked element. The computation is pure and starts from
//! "everything hidden" on every call:
//!
//! 1. resolve each link's effective window (mode + overrides),
//! 2. measure timeline progress through it at the simulated date,
//! 3. classify against the activity's reported progress,
//! 4. apply the visualization style to decide visibility, colour and opacity.
//!
//! Activities are visited in ascending id order. When one element is made
//! visible by several activities, [`ConflictPolicy`] decides which assignment
//! is kept; hidden assignments never overwrite anything.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::frame::{ElementAppearance, VisibilityFrame};
use super::link_index::LinkIndex;
use super::progress::{
    classify, planned_end_for, resolve_window, CompletionTiming, DrawState, EffectiveWindow,
    TimelineProgress,
};
use crate::algorithms::CriticalPathResult;
use crate::config::{ConflictPolicy, EngineSettings, Palette};
use crate::models::{
    Activity, ActivityId, ElementActivityLink, ElementId, Rgb, ScheduleMode,
    VisualizationStyle,
};

impl Palette {
    /// Colour of a classified draw state.
    pub fn color_for(&self, state: DrawState) -> Rgb {
        match state {
            DrawState::NotStarted => self.not_started,
            DrawState::OnTrack { critical: true } => self.critical,
            DrawState::OnTrack { critical: false } => self.in_progress,
            DrawState::Behind => self.behind,
            DrawState::Completed(CompletionTiming::Ahead) => self.completed_ahead,
            DrawState::Completed(CompletionTiming::Late) => self.completed_late,
            DrawState::Completed(_) => self.completed,
            DrawState::Delayed => self.delayed,
        }
    }
}

/// Per-activity view of the schedule at one date, ignoring link overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub activity_id: ActivityId,
    pub name: String,
    pub window: Option<EffectiveWindow>,
    pub timeline_progress: f64,
    pub reported_progress: f64,
    pub state: DrawState,
    pub critical: bool,
    pub link_count: usize,
}

/// Frame computation over one schedule snapshot.
///
/// Borrows the schedule, link index and critical-path result; construct a
/// new engine whenever any of them changes.
#[derive(Debug, Clone)]
pub struct ProgressVisibilityEngine<'a> {
    activities: BTreeMap<ActivityId, &'a Activity>,
    links: &'a LinkIndex,
    critical: &'a CriticalPathResult,
    settings: EngineSettings,
    palette: Palette,
}

impl<'a> ProgressVisibilityEngine<'a> {
    pub fn new(
        activities: &'a [Activity],
        links: &'a LinkIndex,
        critical: &'a CriticalPathResult,
    ) -> Self {
        let mut by_id = BTreeMap::new();
        for activity in activities {
            by_id.entry(activity.id).or_insert(activity);
        }
        Self {
            activities: by_id,
            links,
            critical,
            settings: EngineSettings::default(),
            palette: Palette::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Compute the full frame for `date`.
    ///
    /// Every linked element gets an entry; elements no visible assignment
    /// touches are hidden. Bad dates are logged and treated as not started.
    pub fn compute_frame(
        &self,
        date: NaiveDate,
        mode: ScheduleMode,
        style: VisualizationStyle,
        highlight_critical_path: bool,
    ) -> VisibilityFrame {
        let mut frame = VisibilityFrame::new(date);
        for element in self.links.linked_elements() {
            frame
                .elements
                .insert(element.clone(), ElementAppearance::hidden(self.palette.not_started));
        }

        let mut warned: BTreeSet<ActivityId> = BTreeSet::new();

        for activity_id in self.links.activities() {
            let Some(activity) = self.activities.get(&activity_id).copied() else {
                log::warn!(
                    "Links reference unknown activity {}; its elements stay hidden",
                    activity_id
                );
                continue;
            };

            let links = self.links.links_for_activity(activity_id);
            let critical = highlight_critical_path && self.critical.is_critical(activity_id);

            for (index, link) in links.iter().enumerate() {
                let progress = match resolve_window(activity, Some(link), mode) {
                    Ok(window) => TimelineProgress::at(&window, date),
                    Err(issue) => {
                        if warned.insert(activity_id) {
                            log::warn!(
                                "Activity {} ({}): {}; treated as not started",
                                activity_id,
                                activity.name,
                                issue
                            );
                        }
                        TimelineProgress::NOT_STARTED
                    }
                };

                let state = classify(
                    progress,
                    activity.reported_fraction(),
                    critical,
                    completion_timing(activity, link, mode),
                );

                if let Some(appearance) =
                    self.style_appearance(style, progress, state, index, links.len(), activity_id)
                {
                    self.write(&mut frame, &link.element_stable_id, appearance);
                }
            }
        }

        log::debug!(
            "Frame {} ({} / {}): {} of {} elements visible",
            date,
            mode,
            style,
            frame.visible_count(),
            frame.len()
        );
        frame
    }

    /// Appearance produced by one link, or `None` if the style keeps it hidden.
    fn style_appearance(
        &self,
        style: VisualizationStyle,
        progress: TimelineProgress,
        state: DrawState,
        index: usize,
        link_count: usize,
        activity_id: ActivityId,
    ) -> Option<ElementAppearance> {
        if progress.is_not_started() {
            return None;
        }
        let classified = self.palette.color_for(state);

        match style {
            VisualizationStyle::ElementCount => progress
                .reveals(index, link_count)
                .then(|| ElementAppearance::shown(classified, 1.0, state, activity_id)),
            VisualizationStyle::Opacity => {
                let opacity =
                    self.settings.opacity_floor + self.settings.opacity_span * progress.fraction();
                let color = if progress.is_elapsed() {
                    classified
                } else {
                    self.palette.partial
                };
                Some(ElementAppearance::shown(
                    color,
                    opacity.clamp(0.0, 1.0),
                    state,
                    activity_id,
                ))
            }
            VisualizationStyle::ColorGradient => {
                let color = self.palette.not_started.lerp(classified, progress.fraction());
                Some(ElementAppearance::shown(color, 1.0, state, activity_id))
            }
        }
    }

    fn write(
        &self,
        frame: &mut VisibilityFrame,
        element: &ElementId,
        appearance: ElementAppearance,
    ) {
        let Some(slot) = frame.elements.get_mut(element) else {
            return;
        };
        let replace = match self.settings.conflict_policy {
            ConflictPolicy::LastWriteWins => true,
            ConflictPolicy::MostSevere => match (slot.visible, slot.state) {
                (true, Some(existing)) => appearance
                    .state
                    .is_some_and(|s| s.severity() >= existing.severity()),
                _ => true,
            },
        };
        if replace {
            *slot = appearance;
        }
    }

    /// Activity-level progress and classification at `date`, ascending by id.
    pub fn activity_snapshots(
        &self,
        date: NaiveDate,
        mode: ScheduleMode,
        highlight_critical_path: bool,
    ) -> Vec<ActivitySnapshot> {
        self.activities
            .values()
            .map(|activity| {
                let window = resolve_window(activity, None, mode).ok();
                let progress = window
                    .map(|w| TimelineProgress::at(&w, date))
                    .unwrap_or(TimelineProgress::NOT_STARTED);
                let is_critical = self.critical.is_critical(activity.id);
                let timing = match mode {
                    ScheduleMode::Actual => {
                        CompletionTiming::compare(activity.actual_end, activity.planned_end)
                    }
                    ScheduleMode::Planned => CompletionTiming::Unspecified,
                };
                ActivitySnapshot {
                    activity_id: activity.id,
                    name: activity.name.clone(),
                    window,
                    timeline_progress: progress.fraction(),
                    reported_progress: activity.reported_fraction(),
                    state: classify(
                        progress,
                        activity.reported_fraction(),
                        highlight_critical_path && is_critical,
                        timing,
                    ),
                    critical: is_critical,
                    link_count: self.links.links_for_activity(activity.id).len(),
                }
            })
            .collect()
    }
}

/// Actual-mode completion split: actual end against the link's planned end.
fn completion_timing(
    activity: &Activity,
    link: &ElementActivityLink,
    mode: ScheduleMode,
) -> CompletionTiming {
    match mode {
        ScheduleMode::Actual => {
            CompletionTiming::compare(activity.actual_end, planned_end_for(activity, Some(link)))
        }
        ScheduleMode::Planned => CompletionTiming::Unspecified,
    }
}
