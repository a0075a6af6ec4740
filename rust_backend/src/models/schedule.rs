use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::activity::Activity;
use super::element::Element;
use super::link::ElementActivityLink;

/// Which set of dates drives the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    #[default]
    Planned,
    Actual,
}

impl FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" | "plan" => Ok(Self::Planned),
            "actual" | "actuals" => Ok(Self::Actual),
            _ => Err(format!("Unknown schedule mode: {}", s)),
        }
    }
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => f.write_str("planned"),
            Self::Actual => f.write_str("actual"),
        }
    }
}

/// How an activity's progress is drawn onto its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationStyle {
    /// Reveal `ceil(progress * n)` of the activity's elements in stable order.
    #[default]
    ElementCount,
    /// Show every element, fading in from 30% to full opacity.
    Opacity,
    /// Show every element, blending from the neutral colour to the status colour.
    ColorGradient,
}

impl FromStr for VisualizationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "element_count" | "count" => Ok(Self::ElementCount),
            "opacity" => Ok(Self::Opacity),
            "color_gradient" | "colour_gradient" | "gradient" => Ok(Self::ColorGradient),
            _ => Err(format!("Unknown visualization style: {}", s)),
        }
    }
}

impl fmt::Display for VisualizationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementCount => f.write_str("element_count"),
            Self::Opacity => f.write_str("opacity"),
            Self::ColorGradient => f.write_str("color_gradient"),
        }
    }
}

/// Everything the schedule/link data provider hands to the simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleData {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub links: Vec<ElementActivityLink>,
}

impl ScheduleData {
    pub fn new(activities: Vec<Activity>, links: Vec<ElementActivityLink>) -> Self {
        Self {
            activities,
            elements: Vec::new(),
            links,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.links.is_empty()
    }
}
