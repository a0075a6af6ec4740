//! Schedule validation with detailed error and warning reporting.
//!
//! Checks a [`ScheduleData`] bundle for consistency before it is handed to a
//! simulation session. Errors mark data the engine cannot use as intended
//! (duplicate activity ids, links to activities that do not exist); warnings
//! flag data the engine tolerates but that will render oddly (missing dates,
//! inverted windows, out-of-range progress).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{ActivityId, ElementId, ScheduleData};

/// Validation status, categorized issues and summary statistics.
///
/// Errors make `is_valid` false; warnings are informational.
///
/// # Examples
///
/// ```
/// use sim4d_rust::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("Duplicate activity id 7".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary counts computed during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_activities: usize,
    pub total_links: usize,
    pub linked_elements: usize,
    pub duplicate_ids: usize,
    pub missing_dates: usize,
    pub inverted_windows: usize,
    pub invalid_progress: usize,
    pub unknown_predecessors: usize,
    pub orphan_links: usize,
    pub shared_elements: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds an error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for schedule/link bundles.
///
/// # Examples
///
/// ```
/// use sim4d_rust::models::{Activity, ElementActivityLink, ScheduleData};
/// use sim4d_rust::preprocessing::validator::ScheduleValidator;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
/// let data = ScheduleData::new(
///     vec![Activity::planned(1, "Excavation", start, end)],
///     vec![ElementActivityLink::new("pile-1", 1)],
/// );
///
/// let result = ScheduleValidator::validate(&data);
/// assert!(result.is_valid);
/// assert_eq!(result.stats.linked_elements, 1);
/// ```
pub struct ScheduleValidator;

impl ScheduleValidator {
    pub fn validate(data: &ScheduleData) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_activities = data.activities.len();
        result.stats.total_links = data.links.len();

        let known = Self::check_activities(data, &mut result);
        Self::check_links(data, &known, &mut result);

        if !result.is_valid || !result.warnings.is_empty() {
            log::warn!(
                "Schedule validation: {} errors, {} warnings",
                result.errors.len(),
                result.warnings.len()
            );
        }

        result
    }

    fn check_activities(data: &ScheduleData, result: &mut ValidationResult) -> HashSet<ActivityId> {
        let mut seen = HashSet::new();
        for activity in &data.activities {
            if !seen.insert(activity.id) {
                result.stats.duplicate_ids += 1;
                result.add_error(format!("Duplicate activity id {}", activity.id));
            }
        }

        for activity in &data.activities {
            let id = activity.id;
            match (activity.planned_start, activity.planned_end) {
                (Some(start), Some(end)) if end < start => {
                    result.stats.inverted_windows += 1;
                    result.add_warning(format!(
                        "Activity {}: planned end {} is before planned start {}",
                        id, end, start
                    ));
                }
                (Some(_), Some(_)) => {}
                _ => {
                    result.stats.missing_dates += 1;
                    result.add_warning(format!("Activity {}: missing or invalid planned dates", id));
                }
            }

            if let (Some(start), Some(end)) = (activity.actual_start, activity.actual_end) {
                if end < start {
                    result.stats.inverted_windows += 1;
                    result.add_warning(format!(
                        "Activity {}: actual end {} is before actual start {}",
                        id, end, start
                    ));
                }
            }

            let progress = activity.progress_percent;
            if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
                result.stats.invalid_progress += 1;
                result.add_warning(format!(
                    "Activity {}: progress {} outside [0, 100]",
                    id, progress
                ));
            }

            for predecessor in &activity.predecessor_ids {
                if !seen.contains(predecessor) {
                    result.stats.unknown_predecessors += 1;
                    result.add_warning(format!(
                        "Activity {}: predecessor {} does not exist",
                        id, predecessor
                    ));
                }
            }
        }

        seen
    }

    fn check_links(data: &ScheduleData, known: &HashSet<ActivityId>, result: &mut ValidationResult) {
        let mut per_element: BTreeMap<&ElementId, BTreeSet<ActivityId>> = BTreeMap::new();

        for link in data.links.iter().filter(|link| link.is_active()) {
            if !known.contains(&link.activity_id) {
                result.stats.orphan_links += 1;
                result.add_error(format!(
                    "Link {} -> {} references an unknown activity",
                    link.element_stable_id, link.activity_id
                ));
                continue;
            }
            per_element
                .entry(&link.element_stable_id)
                .or_default()
                .insert(link.activity_id);

            if let (Some(start), Some(end)) = (link.override_start, link.override_end) {
                if end < start {
                    result.stats.inverted_windows += 1;
                    result.add_warning(format!(
                        "Link {} -> {}: override end {} is before override start {}",
                        link.element_stable_id, link.activity_id, end, start
                    ));
                }
            }
        }

        result.stats.linked_elements = per_element.len();
        for (element, activities) in per_element {
            if activities.len() > 1 {
                result.stats.shared_elements += 1;
                result.add_warning(format!(
                    "Element {} is linked to {} activities",
                    element,
                    activities.len()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, ElementActivityLink};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn clean_data() -> ScheduleData {
        ScheduleData::new(
            vec![
                Activity::planned(1, "Foundations", day(1), day(10)),
                Activity::planned(2, "Frame", day(10), day(20)).with_predecessors([1]),
            ],
            vec![
                ElementActivityLink::new("footing-1", 1),
                ElementActivityLink::new("beam-1", 2),
            ],
        )
    }

    #[test]
    fn test_clean_schedule_is_valid() {
        let result = ScheduleValidator::validate(&clean_data());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats.total_activities, 2);
        assert_eq!(result.stats.linked_elements, 2);
    }

    #[test]
    fn test_duplicate_ids_are_errors() {
        let mut data = clean_data();
        data.activities
            .push(Activity::planned(2, "Frame again", day(11), day(12)));

        let result = ScheduleValidator::validate(&data);
        assert!(!result.is_valid);
        assert_eq!(result.stats.duplicate_ids, 1);
        assert!(result.errors[0].contains("Duplicate activity id 2"));
    }

    #[test]
    fn test_orphan_link_is_error() {
        let mut data = clean_data();
        data.links.push(ElementActivityLink::new("ghost", 99));

        let result = ScheduleValidator::validate(&data);
        assert!(!result.is_valid);
        assert_eq!(result.stats.orphan_links, 1);
    }

    #[test]
    fn test_inactive_orphan_link_is_ignored() {
        let mut data = clean_data();
        let mut link = ElementActivityLink::new("ghost", 99);
        link.status = crate::models::LinkStatus::Inactive;
        data.links.push(link);

        assert!(ScheduleValidator::validate(&data).is_valid);
    }

    #[test]
    fn test_date_and_progress_warnings() {
        let mut data = clean_data();
        data.activities[0].planned_end = None;
        data.activities[1] = Activity::planned(2, "Frame", day(20), day(10)).with_progress(140.0);

        let result = ScheduleValidator::validate(&data);
        assert!(result.is_valid);
        assert_eq!(result.stats.missing_dates, 1);
        assert_eq!(result.stats.inverted_windows, 1);
        assert_eq!(result.stats.invalid_progress, 1);
        assert_eq!(result.warnings.len(), 3);
    }

    #[test]
    fn test_unknown_predecessor_and_shared_element_warnings() {
        let mut data = clean_data();
        data.activities[0] = data.activities[0].clone().with_predecessors([42]);
        data.links.push(ElementActivityLink::new("footing-1", 2));

        let result = ScheduleValidator::validate(&data);
        assert!(result.is_valid);
        assert_eq!(result.stats.unknown_predecessors, 1);
        assert_eq!(result.stats.shared_elements, 1);
    }
}
