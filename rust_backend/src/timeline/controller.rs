//! Timeline state machine.
//!
//! Owns the simulated current date and the drawing switches (mode, style,
//! critical-path highlight). It never computes frames itself: operations that
//! change what should be drawn return a [`TimelineEvent`] and the owner
//! recomputes immediately.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::PlaybackSettings;
use crate::models::time::{add_days, days_between};
use crate::models::{Activity, ScheduleMode, VisualizationStyle};
use crate::services::progress::resolve_window;
use crate::services::LinkIndex;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("Playback speed must be a positive finite number, got {0}")]
    InvalidSpeed(f64),

    #[error("No schedule bounds: load a schedule with valid dates first")]
    NoSchedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Scrubbing,
}

/// First and last day of the schedule in one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScheduleBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Minimum effective start and maximum effective end over every activity
    /// and every overridden link, in `mode`. `None` if no window resolves.
    pub fn from_schedule(
        activities: &[Activity],
        links: &LinkIndex,
        mode: ScheduleMode,
    ) -> Option<Self> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        let mut include = |start: NaiveDate, end: NaiveDate| {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
                None => (start, end),
            });
        };

        for activity in activities {
            if let Ok(window) = resolve_window(activity, None, mode) {
                include(window.start, window.end);
            }
            for link in links.links_for_activity(activity.id) {
                if !link.has_override() {
                    continue;
                }
                if let Ok(window) = resolve_window(activity, Some(link), mode) {
                    include(window.start, window.end);
                }
            }
        }

        bounds.and_then(|(start, end)| Self::new(start, end))
    }

    pub fn span_days(&self) -> i64 {
        days_between(self.start, self.end)
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.start, self.end)
    }

    pub fn date_at(&self, offset_days: i64) -> NaiveDate {
        add_days(self.start, offset_days.clamp(0, self.span_days()))
    }

    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        days_between(self.start, self.clamp(date))
    }
}

/// Inputs of one frame computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRequest {
    pub date: NaiveDate,
    pub mode: ScheduleMode,
    pub style: VisualizationStyle,
    pub highlight_critical_path: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineEvent {
    /// Drawing inputs changed; recompute and apply now.
    Redraw(FrameRequest),
    /// Playback state changed; the frame is unaffected.
    StateChanged(PlaybackState),
    /// Playback reached the end date and stopped. Carries the final frame.
    Finished(FrameRequest),
}

impl TimelineEvent {
    pub fn frame_request(&self) -> Option<FrameRequest> {
        match self {
            Self::Redraw(request) | Self::Finished(request) => Some(*request),
            Self::StateChanged(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimelineController {
    state: PlaybackState,
    bounds: Option<ScheduleBounds>,
    current_date: Option<NaiveDate>,
    mode: ScheduleMode,
    style: VisualizationStyle,
    highlight_critical_path: bool,
    speed: f64,
    max_speed: f64,
    base_tick: Duration,
}

impl Default for TimelineController {
    fn default() -> Self {
        Self::new(&PlaybackSettings::default())
    }
}

impl TimelineController {
    pub fn new(settings: &PlaybackSettings) -> Self {
        Self {
            state: PlaybackState::Stopped,
            bounds: None,
            current_date: None,
            mode: settings.default_mode,
            style: VisualizationStyle::default(),
            highlight_critical_path: true,
            speed: settings.default_speed,
            max_speed: settings.max_speed,
            base_tick: settings.base_tick(),
        }
    }

    pub fn with_style(mut self, style: VisualizationStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight_critical_path = highlight;
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn bounds(&self) -> Option<ScheduleBounds> {
        self.bounds
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
    }

    pub fn mode(&self) -> ScheduleMode {
        self.mode
    }

    pub fn style(&self) -> VisualizationStyle {
        self.style
    }

    pub fn highlight_critical_path(&self) -> bool {
        self.highlight_critical_path
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Days from the schedule start to the current date.
    pub fn offset_days(&self) -> Option<i64> {
        Some(self.bounds?.offset_of(self.current_date?))
    }

    pub fn is_at_end(&self) -> bool {
        matches!((self.bounds, self.current_date), (Some(b), Some(d)) if d >= b.end)
    }

    /// The frame the current state calls for, once a schedule is loaded.
    pub fn frame_request(&self) -> Option<FrameRequest> {
        Some(FrameRequest {
            date: self.current_date?,
            mode: self.mode,
            style: self.style,
            highlight_critical_path: self.highlight_critical_path,
        })
    }

    fn redraw(&self) -> Option<TimelineEvent> {
        self.frame_request().map(TimelineEvent::Redraw)
    }

    fn set_date(&mut self, date: NaiveDate) -> bool {
        let changed = self.current_date != Some(date);
        self.current_date = Some(date);
        changed
    }

    /// Install new schedule bounds, keeping the current date when it still fits.
    pub fn set_bounds(&mut self, bounds: Option<ScheduleBounds>) -> Option<TimelineEvent> {
        self.bounds = bounds;
        let Some(bounds) = bounds else {
            self.current_date = None;
            self.state = PlaybackState::Stopped;
            return None;
        };
        let date = match self.current_date {
            Some(date) => bounds.clamp(date),
            None => bounds.start,
        };
        self.set_date(date);
        self.redraw()
    }

    /// Start playing. Rewinds to the start first when already at the end.
    pub fn play(&mut self) -> Result<TimelineEvent, TimelineError> {
        let bounds = self.bounds.ok_or(TimelineError::NoSchedule)?;
        self.state = PlaybackState::Playing;
        if self.is_at_end() && bounds.span_days() > 0 {
            self.set_date(bounds.start);
            if let Some(event) = self.redraw() {
                return Ok(event);
            }
        }
        Ok(TimelineEvent::StateChanged(PlaybackState::Playing))
    }

    pub fn pause(&mut self) -> Option<TimelineEvent> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        self.state = PlaybackState::Stopped;
        Some(TimelineEvent::StateChanged(PlaybackState::Stopped))
    }

    /// Stop and rewind to the schedule start.
    pub fn stop(&mut self) -> Option<TimelineEvent> {
        let was = self.state;
        self.state = PlaybackState::Stopped;
        let rewound = match self.bounds {
            Some(bounds) => self.set_date(bounds.start),
            None => false,
        };
        if rewound {
            self.redraw()
        } else if was != PlaybackState::Stopped {
            Some(TimelineEvent::StateChanged(PlaybackState::Stopped))
        } else {
            None
        }
    }

    pub fn begin_scrub(&mut self) -> TimelineEvent {
        self.state = PlaybackState::Scrubbing;
        TimelineEvent::StateChanged(PlaybackState::Scrubbing)
    }

    /// Jump to `offset_days` from the schedule start, clamped to the bounds.
    ///
    /// Always asks for a redraw, even when the date did not move. Scrubbing
    /// while playing pauses playback.
    pub fn scrub_to(&mut self, offset_days: i64) -> Result<TimelineEvent, TimelineError> {
        let bounds = self.bounds.ok_or(TimelineError::NoSchedule)?;
        self.scrub_to_date(bounds.date_at(offset_days))
    }

    pub fn scrub_to_date(&mut self, date: NaiveDate) -> Result<TimelineEvent, TimelineError> {
        let bounds = self.bounds.ok_or(TimelineError::NoSchedule)?;
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Stopped;
        }
        self.set_date(bounds.clamp(date));
        self.redraw().ok_or(TimelineError::NoSchedule)
    }

    pub fn end_scrub(&mut self) -> Option<TimelineEvent> {
        if self.state != PlaybackState::Scrubbing {
            return None;
        }
        self.state = PlaybackState::Stopped;
        Some(TimelineEvent::StateChanged(PlaybackState::Stopped))
    }

    pub fn set_mode(&mut self, mode: ScheduleMode) -> Option<TimelineEvent> {
        if self.mode == mode {
            return None;
        }
        self.mode = mode;
        self.redraw()
    }

    pub fn set_style(&mut self, style: VisualizationStyle) -> Option<TimelineEvent> {
        if self.style == style {
            return None;
        }
        self.style = style;
        self.redraw()
    }

    pub fn set_highlight_critical_path(&mut self, highlight: bool) -> Option<TimelineEvent> {
        if self.highlight_critical_path == highlight {
            return None;
        }
        self.highlight_critical_path = highlight;
        self.redraw()
    }

    /// Set the playback speed multiplier; values above the configured maximum are capped.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), TimelineError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(TimelineError::InvalidSpeed(speed));
        }
        if speed > self.max_speed {
            log::debug!("Speed {} capped at {}", speed, self.max_speed);
        }
        self.speed = speed.min(self.max_speed);
        Ok(())
    }

    /// Host tick divided by the speed multiplier. Saturates at `Duration::MAX`
    /// for speeds so small the quotient does not fit.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.base_tick.as_secs_f64() / self.speed)
            .unwrap_or(Duration::MAX)
    }

    /// Advance one day while playing. Stops (with `Finished`) on reaching the end.
    pub fn tick(&mut self) -> Option<TimelineEvent> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let bounds = self.bounds?;
        let next = bounds.clamp(add_days(self.current_date?, 1));
        self.set_date(next);

        if next >= bounds.end {
            self.state = PlaybackState::Stopped;
            log::debug!("Playback reached schedule end {}", bounds.end);
            return self.frame_request().map(TimelineEvent::Finished);
        }
        self.redraw()
    }
}
