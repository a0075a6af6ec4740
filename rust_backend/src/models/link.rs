use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::activity::{deserialize_activity_id, ActivityId};
use super::element::ElementId;
use super::time::lenient_date;

/// What the linked activity does to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    #[default]
    Construct,
    Demolish,
    Temporary,
    #[serde(other)]
    Other,
}

/// Whether a link participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    #[default]
    Active,
    Inactive,
}

/// Association between one element and one activity.
///
/// `override_start` / `override_end` replace the activity's planned dates for
/// this element only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementActivityLink {
    pub element_stable_id: ElementId,
    #[serde(deserialize_with = "deserialize_activity_id")]
    pub activity_id: ActivityId,
    #[serde(default, with = "lenient_date")]
    pub override_start: Option<NaiveDate>,
    #[serde(default, with = "lenient_date")]
    pub override_end: Option<NaiveDate>,
    #[serde(default)]
    pub link_type: LinkType,
    #[serde(default)]
    pub status: LinkStatus,
}

impl ElementActivityLink {
    pub fn new(element: impl Into<ElementId>, activity: i64) -> Self {
        Self {
            element_stable_id: element.into(),
            activity_id: ActivityId::new(activity),
            override_start: None,
            override_end: None,
            link_type: LinkType::Construct,
            status: LinkStatus::Active,
        }
    }

    pub fn with_override(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.override_start = start;
        self.override_end = end;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == LinkStatus::Active
    }

    pub fn has_override(&self) -> bool {
        self.override_start.is_some() || self.override_end.is_some()
    }
}
