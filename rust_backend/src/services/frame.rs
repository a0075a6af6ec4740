//! Visibility frames: the complete per-element output of one recompute.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::progress::DrawState;
use crate::models::{ActivityId, ElementId, Rgb};

/// How one element should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementAppearance {
    pub visible: bool,
    pub color: Rgb,
    pub opacity: f64,
    /// Draw state of the assignment that made the element visible.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub state: Option<DrawState>,
    /// Activity that made the element visible.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub activity_id: Option<ActivityId>,
}

impl ElementAppearance {
    pub fn hidden(color: Rgb) -> Self {
        Self {
            visible: false,
            color,
            opacity: 0.0,
            state: None,
            activity_id: None,
        }
    }

    pub fn shown(color: Rgb, opacity: f64, state: DrawState, activity_id: ActivityId) -> Self {
        Self {
            visible: true,
            color,
            opacity,
            state: Some(state),
            activity_id: Some(activity_id),
        }
    }
}

/// Complete visibility/colour assignment for every linked element at one date.
///
/// Carries no memory of earlier frames. Ordered by element id, so two frames
/// computed from the same inputs serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityFrame {
    pub date: NaiveDate,
    pub elements: BTreeMap<ElementId, ElementAppearance>,
}

impl VisibilityFrame {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            elements: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &ElementId) -> Option<&ElementAppearance> {
        self.elements.get(id)
    }

    pub fn is_visible(&self, id: &ElementId) -> bool {
        self.elements.get(id).is_some_and(|a| a.visible)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &ElementAppearance)> + '_ {
        self.elements.iter()
    }

    /// Visible element ids, ascending.
    pub fn visible_ids(&self) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, a)| a.visible)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn hidden_ids(&self) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, a)| !a.visible)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.elements.values().filter(|a| a.visible).count()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn summary(&self) -> FrameSummary {
        FrameSummary::from_frame(self)
    }

    /// Canonical JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Element counts per draw-state bucket, for legends and logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub total: usize,
    pub visible: usize,
    pub hidden: usize,
    pub by_state: BTreeMap<String, usize>,
}

impl FrameSummary {
    pub fn from_frame(frame: &VisibilityFrame) -> Self {
        let mut summary = FrameSummary {
            total: frame.len(),
            ..Default::default()
        };
        for appearance in frame.elements.values() {
            if !appearance.visible {
                summary.hidden += 1;
                continue;
            }
            summary.visible += 1;
            if let Some(state) = appearance.state {
                *summary.by_state.entry(state.label().to_string()).or_insert(0) += 1;
            }
        }
        summary
    }

    pub fn count(&self, label: &str) -> usize {
        self.by_state.get(label).copied().unwrap_or(0)
    }
}
