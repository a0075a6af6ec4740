use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::time::lenient_date;

crate::define_id_type!(i64, ActivityId);

/// Author-declared lifecycle status of an activity.
///
/// Informational only: the engine classifies activities from dates and
/// reported progress, never from this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A schedule node with planned/actual dates and reported progress.
///
/// Read-only to the simulation core. Date fields are `None` when the provider
/// omitted them or sent something unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(deserialize_with = "deserialize_activity_id")]
    pub id: ActivityId,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "lenient_date")]
    pub planned_start: Option<NaiveDate>,
    #[serde(default, with = "lenient_date")]
    pub planned_end: Option<NaiveDate>,
    #[serde(default, with = "lenient_date")]
    pub actual_start: Option<NaiveDate>,
    #[serde(default, with = "lenient_date")]
    pub actual_end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub progress_percent: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub duration_days: f64,
    #[serde(default, deserialize_with = "deserialize_predecessors")]
    pub predecessor_ids: BTreeSet<ActivityId>,
    #[serde(default)]
    pub status: ActivityStatus,
}

impl Activity {
    /// Create an activity with planned dates and no actuals.
    ///
    /// `duration_days` is derived from the planned window.
    pub fn planned(id: i64, name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: ActivityId::new(id),
            name: name.into(),
            planned_start: Some(start),
            planned_end: Some(end),
            actual_start: None,
            actual_end: None,
            progress_percent: 0.0,
            duration_days: (end - start).num_days().max(0) as f64,
            predecessor_ids: BTreeSet::new(),
            status: ActivityStatus::Unknown,
        }
    }

    pub fn with_progress(mut self, percent: f64) -> Self {
        self.progress_percent = percent;
        self
    }

    pub fn with_duration(mut self, days: f64) -> Self {
        self.duration_days = days;
        self
    }

    pub fn with_actuals(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.actual_start = start;
        self.actual_end = end;
        self
    }

    pub fn with_predecessors<I: IntoIterator<Item = i64>>(mut self, ids: I) -> Self {
        self.predecessor_ids = ids.into_iter().map(ActivityId::new).collect();
        self
    }

    /// Reported progress as a fraction, clamped to `[0, 1]`.
    ///
    /// Non-finite values count as zero.
    pub fn reported_fraction(&self) -> f64 {
        if self.progress_percent.is_finite() {
            (self.progress_percent / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Duration used by the critical-path pass; negative or non-finite values count as zero.
    pub fn effective_duration(&self) -> f64 {
        if self.duration_days.is_finite() && self.duration_days > 0.0 {
            self.duration_days
        } else {
            0.0
        }
    }

    /// Whether the planned window is present and well-ordered.
    pub fn has_valid_planned_window(&self) -> bool {
        matches!((self.planned_start, self.planned_end), (Some(s), Some(e)) if e >= s)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    String(String),
    Int(i64),
}

impl StringOrInt {
    fn into_id<E: serde::de::Error>(self) -> Result<ActivityId, E> {
        match self {
            StringOrInt::Int(i) => Ok(ActivityId::new(i)),
            StringOrInt::String(s) => s.parse::<ActivityId>().map_err(E::custom),
        }
    }
}

/// Accepts either a string or an integer activity id.
pub(crate) fn deserialize_activity_id<'de, D>(deserializer: D) -> Result<ActivityId, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrInt::deserialize(deserializer)?.into_id()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Numbers may arrive as JSON numbers or numeric strings; `null` and anything
/// unparseable become `0.0` (with a warning for the latter).
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => 0.0,
        Some(RawNumber::Number(value)) => value,
        Some(RawNumber::Text(text)) => text.trim().parse().unwrap_or_else(|_| {
            log::warn!("Unparseable number '{}' treated as 0", text);
            0.0
        }),
        Some(RawNumber::Other(_)) => {
            log::warn!("Non-numeric value treated as 0");
            0.0
        }
    })
}

fn deserialize_predecessors<'de, D>(deserializer: D) -> Result<BTreeSet<ActivityId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<StringOrInt>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(StringOrInt::into_id::<D::Error>)
        .collect()
}
