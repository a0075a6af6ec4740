use anyhow::{Context, Result};
use std::path::Path;

use crate::models::ScheduleData;

/// Result of loading schedule data
#[derive(Debug, Clone)]
pub struct ScheduleLoadResult {
    pub data: ScheduleData,
    pub num_activities: usize,
    pub num_elements: usize,
    pub num_links: usize,
}

impl ScheduleLoadResult {
    pub fn new(data: ScheduleData) -> Self {
        let num_activities = data.activities.len();
        let num_elements = data.elements.len();
        let num_links = data.links.len();
        Self {
            data,
            num_activities,
            num_elements,
            num_links,
        }
    }
}

/// Loads schedule/link bundles handed over by the data provider.
///
/// Field names are camelCase (`plannedStart`, `elementStableId`,
/// `overrideEnd`, ...). Unparseable dates become `None` with a warning
/// instead of failing the load; structural errors report the JSON path.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Load schedule data from a file (format from the extension)
    pub fn load_from_file(path: &Path) -> Result<ScheduleLoadResult> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;

        match extension.to_lowercase().as_str() {
            "json" => Self::load_from_json(path),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }

    /// Load schedule data from a JSON file
    pub fn load_from_json(json_path: &Path) -> Result<ScheduleLoadResult> {
        let content = std::fs::read_to_string(json_path)
            .with_context(|| format!("Failed to read {}", json_path.display()))?;
        Self::load_from_json_str(&content)
            .with_context(|| format!("Failed to load schedule from {}", json_path.display()))
    }

    /// Load schedule data from a JSON string
    pub fn load_from_json_str(json_str: &str) -> Result<ScheduleLoadResult> {
        let data = parse_schedule_json_str(json_str).context("Failed to parse JSON string")?;

        let result = ScheduleLoadResult::new(data);
        log::info!(
            "Loaded schedule: {} activities, {} elements, {} links",
            result.num_activities,
            result.num_elements,
            result.num_links
        );
        Ok(result)
    }
}

/// Deserialize a [`ScheduleData`] bundle, reporting the path of the first
/// offending field on failure (e.g. `activities[2].id`).
pub fn parse_schedule_json_str(json_str: &str) -> Result<ScheduleData> {
    let deserializer = &mut serde_json::Deserializer::from_str(json_str);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        anyhow::anyhow!("Invalid schedule data at '{}': {}", path, err.into_inner())
    })
}
