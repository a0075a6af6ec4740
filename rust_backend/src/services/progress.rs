//! Timeline progress and draw-state classification.
//!
//! These are the per-link building blocks of the visibility engine:
//! resolve the effective date window, measure how far the simulated date is
//! through it, and compare that with the author-reported progress.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::time::days_between;
use crate::models::{Activity, ElementActivityLink, ScheduleMode};

/// Slack used when comparing reported progress against timeline progress.
const PROGRESS_EPSILON: f64 = 1e-9;

/// A resolved `[start, end]` window in whole days, `end >= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EffectiveWindow {
    pub fn duration_days(&self) -> i64 {
        days_between(self.start, self.end)
    }
}

/// Why a window could not be resolved. The element is treated as not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WindowIssue {
    #[error("missing or invalid start date")]
    MissingStart,
    #[error("missing or invalid end date")]
    MissingEnd,
    #[error("end date {end} precedes start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// Resolve the effective window of `activity` as seen by one of its links.
///
/// - planned mode: `override ?? planned`
/// - actual mode: `actual ?? override ?? planned`, field by field
///
/// In actual mode an activity that has started (actual start) but not
/// finished (no actual end) may fall back to a planned end that precedes the
/// real start; the end is then clamped to the start.
pub fn resolve_window(
    activity: &Activity,
    link: Option<&ElementActivityLink>,
    mode: ScheduleMode,
) -> Result<EffectiveWindow, WindowIssue> {
    let planned_start = link
        .and_then(|l| l.override_start)
        .or(activity.planned_start);
    let planned_end = link.and_then(|l| l.override_end).or(activity.planned_end);

    let (start, mut end) = match mode {
        ScheduleMode::Planned => (planned_start, planned_end),
        ScheduleMode::Actual => (
            activity.actual_start.or(planned_start),
            activity.actual_end.or(planned_end),
        ),
    };

    let start = start.ok_or(WindowIssue::MissingStart)?;
    let end_value = end.ok_or(WindowIssue::MissingEnd)?;

    if mode == ScheduleMode::Actual
        && activity.actual_start.is_some()
        && activity.actual_end.is_none()
        && end_value < start
    {
        end = Some(start);
    }

    let end = end.unwrap_or(end_value);
    if end < start {
        return Err(WindowIssue::EndBeforeStart { start, end });
    }
    Ok(EffectiveWindow { start, end })
}

/// Planned end date of a link (override first), used for actual-vs-planned
/// completion comparisons.
pub fn planned_end_for(activity: &Activity, link: Option<&ElementActivityLink>) -> Option<NaiveDate> {
    link.and_then(|l| l.override_end).or(activity.planned_end)
}

/// Fraction of a window elapsed at a simulated date, kept as an exact
/// rational `elapsed / span` (whole days).
///
/// Invariants: `span >= 1` and `0 <= elapsed <= span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineProgress {
    elapsed: i64,
    span: i64,
}

impl TimelineProgress {
    pub const NOT_STARTED: TimelineProgress = TimelineProgress { elapsed: 0, span: 1 };
    pub const ELAPSED: TimelineProgress = TimelineProgress { elapsed: 1, span: 1 };

    /// Progress through `window` at `date`.
    ///
    /// `0` before the start, `1` after the end, otherwise
    /// `(date - start) / max(1, end - start)`. A zero-day window is a step:
    /// `0` before its start and `1` from its start on.
    pub fn at(window: &EffectiveWindow, date: NaiveDate) -> Self {
        if date < window.start {
            return Self::NOT_STARTED;
        }
        if window.start == window.end || date > window.end {
            return Self::ELAPSED;
        }
        let span = window.duration_days().max(1);
        let elapsed = days_between(window.start, date).clamp(0, span);
        Self { elapsed, span }
    }

    pub fn elapsed_days(&self) -> i64 {
        self.elapsed
    }

    pub fn span_days(&self) -> i64 {
        self.span
    }

    pub fn fraction(&self) -> f64 {
        self.elapsed as f64 / self.span as f64
    }

    pub fn is_not_started(&self) -> bool {
        self.elapsed == 0
    }

    pub fn is_elapsed(&self) -> bool {
        self.elapsed == self.span
    }

    pub fn is_in_progress(&self) -> bool {
        !self.is_not_started() && !self.is_elapsed()
    }

    /// `ceil(progress * n)`, computed without floating point.
    pub fn reveal_count(&self, n: usize) -> usize {
        let n = n as i128;
        let elapsed = i128::from(self.elapsed);
        let span = i128::from(self.span);
        ((elapsed * n + span - 1) / span) as usize
    }

    /// Whether the element at stable `index` of `n` is revealed, i.e.
    /// `index < ceil(progress * n)`.
    pub fn reveals(&self, index: usize, n: usize) -> bool {
        (index as i128) * i128::from(self.span) < i128::from(self.elapsed) * (n as i128)
    }

    /// Whether `reported` (a fraction in `[0, 1]`) is on or ahead of this progress.
    pub fn is_met_by(&self, reported: f64) -> bool {
        reported * self.span as f64 + PROGRESS_EPSILON >= self.elapsed as f64
    }
}

/// How a finished activity's actual end compares with its planned end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTiming {
    Ahead,
    OnTime,
    Late,
    /// Planned mode, or no actual end to compare.
    Unspecified,
}

impl CompletionTiming {
    pub fn compare(actual_end: Option<NaiveDate>, planned_end: Option<NaiveDate>) -> Self {
        match (actual_end, planned_end) {
            (Some(actual), Some(planned)) if actual < planned => Self::Ahead,
            (Some(actual), Some(planned)) if actual > planned => Self::Late,
            (Some(_), Some(_)) => Self::OnTime,
            _ => Self::Unspecified,
        }
    }
}

/// Draw state of one element at one simulated date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawState {
    /// Window not yet entered; never drawn.
    NotStarted,
    /// Inside the window with reported progress on or ahead of the timeline.
    OnTrack { critical: bool },
    /// Inside the window with reported progress behind the timeline.
    Behind,
    /// Window elapsed and reported complete.
    Completed(CompletionTiming),
    /// Window elapsed but not reported complete.
    Delayed,
}

impl DrawState {
    /// Ranking for the most-severe conflict policy; higher wins.
    pub fn severity(&self) -> u8 {
        match self {
            DrawState::NotStarted => 0,
            DrawState::Completed(_) => 1,
            DrawState::OnTrack { critical: false } => 2,
            DrawState::OnTrack { critical: true } => 3,
            DrawState::Behind => 4,
            DrawState::Delayed => 5,
        }
    }

    /// Short stable label, used for summaries and logs.
    pub fn label(&self) -> &'static str {
        match self {
            DrawState::NotStarted => "not_started",
            DrawState::OnTrack { critical: false } => "in_progress",
            DrawState::OnTrack { critical: true } => "critical",
            DrawState::Behind => "behind",
            DrawState::Completed(CompletionTiming::Ahead) => "completed_ahead",
            DrawState::Completed(CompletionTiming::Late) => "completed_late",
            DrawState::Completed(_) => "completed",
            DrawState::Delayed => "delayed",
        }
    }
}

/// Classify by comparing reported progress with timeline progress.
///
/// `critical` should already account for whether highlighting is enabled;
/// `timing` is only consulted for completed work.
pub fn classify(
    progress: TimelineProgress,
    reported: f64,
    critical: bool,
    timing: CompletionTiming,
) -> DrawState {
    if progress.is_not_started() {
        DrawState::NotStarted
    } else if progress.is_elapsed() {
        if reported + PROGRESS_EPSILON >= 1.0 {
            DrawState::Completed(timing)
        } else {
            DrawState::Delayed
        }
    } else if progress.is_met_by(reported) {
        DrawState::OnTrack { critical }
    } else {
        DrawState::Behind
    }
}
