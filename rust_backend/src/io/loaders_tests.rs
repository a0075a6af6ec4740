#[cfg(test)]
mod tests {
    use crate::io::loaders::{ScheduleLoadResult, ScheduleLoader};
    use crate::models::{ActivityId, ElementId, LinkStatus, ScheduleData};
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCHEDULE_JSON: &str = r#"{
        "activities": [
            {
                "id": 1,
                "name": "Foundations",
                "plannedStart": "2024-03-01",
                "plannedEnd": "2024-03-11",
                "actualStart": "2024-03-02T08:00:00",
                "progressPercent": 100,
                "durationDays": 10,
                "status": "completed"
            },
            {
                "id": "2",
                "name": "Columns",
                "plannedStart": "2024-03-11T00:00:00Z",
                "plannedEnd": "someday",
                "progressPercent": 25.5,
                "durationDays": 6,
                "predecessorIds": ["1"]
            }
        ],
        "elements": [
            { "stableId": "col-a", "category": "Columns" }
        ],
        "links": [
            { "elementStableId": "slab-1", "activityId": 1 },
            { "elementStableId": "col-a", "activityId": "2", "overrideEnd": "2024-03-20" },
            { "elementStableId": "col-b", "activityId": 2, "status": "inactive" }
        ]
    }"#;

    /// Helper to create a temp JSON file
    fn create_temp_json_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_load_result_new() {
        let data = ScheduleData::new(Vec::new(), Vec::new());
        let result = ScheduleLoadResult::new(data);
        assert_eq!(result.num_activities, 0);
        assert_eq!(result.num_elements, 0);
        assert_eq!(result.num_links, 0);
    }

    #[test]
    fn test_load_from_json_str() {
        let result = ScheduleLoader::load_from_json_str(SCHEDULE_JSON).unwrap();
        assert_eq!(result.num_activities, 2);
        assert_eq!(result.num_elements, 1);
        assert_eq!(result.num_links, 3);

        let foundations = &result.data.activities[0];
        assert_eq!(foundations.planned_start, Some(date(2024, 3, 1)));
        assert_eq!(foundations.actual_start, Some(date(2024, 3, 2)));
        assert_eq!(foundations.actual_end, None);
    }

    #[test]
    fn test_unparseable_dates_become_missing() {
        let result = ScheduleLoader::load_from_json_str(SCHEDULE_JSON).unwrap();
        let columns = &result.data.activities[1];
        assert_eq!(columns.id, ActivityId::new(2));
        assert_eq!(columns.planned_start, Some(date(2024, 3, 11)));
        assert_eq!(columns.planned_end, None);
        assert!(columns.predecessor_ids.contains(&ActivityId::new(1)));
    }

    #[test]
    fn test_link_fields() {
        let result = ScheduleLoader::load_from_json_str(SCHEDULE_JSON).unwrap();
        let links = &result.data.links;
        assert_eq!(links[1].element_stable_id, ElementId::new("col-a"));
        assert_eq!(links[1].activity_id, ActivityId::new(2));
        assert_eq!(links[1].override_end, Some(date(2024, 3, 20)));
        assert_eq!(links[2].status, LinkStatus::Inactive);
    }

    #[test]
    fn test_load_from_file_json() {
        let json_file = create_temp_json_file(SCHEDULE_JSON);
        let result = ScheduleLoader::load_from_file(json_file.path());

        assert!(result.is_ok(), "Should load JSON file: {:?}", result.err());
        let load_result = result.unwrap();
        assert_eq!(load_result.num_activities, 2);
    }

    #[test]
    fn test_load_from_file_unsupported_extension() {
        let mut temp_file = NamedTempFile::with_suffix(".txt").unwrap();
        write!(temp_file, "some content").unwrap();

        let result = ScheduleLoader::load_from_file(temp_file.path());

        assert!(result.is_err(), "Should fail with unsupported extension");
        let error_msg = result.unwrap_err().to_string();
        assert!(
            error_msg.contains("Unsupported file format"),
            "Error should mention unsupported format: {}",
            error_msg
        );
    }

    #[test]
    fn test_load_from_file_no_extension() {
        use std::path::PathBuf;
        let path = PathBuf::from("/tmp/file_without_extension");

        let result = ScheduleLoader::load_from_file(&path);

        assert!(result.is_err(), "Should fail with no extension");
        assert!(result.unwrap_err().to_string().contains("extension"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ScheduleLoader::load_from_json(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.json"));
    }

    #[test]
    fn test_load_from_json_str_reports_path() {
        let json_str = r#"{
            "activities": [
                { "id": 1, "name": "ok" },
                { "id": "not-a-number", "name": "broken" }
            ]
        }"#;

        let result = ScheduleLoader::load_from_json_str(json_str);

        assert!(result.is_err(), "Should fail on a non-numeric id");
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("activities[1]"), "unexpected error: {}", message);
    }

    #[test]
    fn test_null_numbers_do_not_fail_the_bundle() {
        let json_str = r#"{
            "activities": [
                { "id": 1, "name": "Slab", "progressPercent": null, "durationDays": null },
                { "id": 2, "name": "Walls", "progressPercent": "60", "durationDays": 5 }
            ]
        }"#;

        let result = ScheduleLoader::load_from_json_str(json_str).unwrap();
        assert_eq!(result.num_activities, 2);
        assert_eq!(result.data.activities[0].progress_percent, 0.0);
        assert_eq!(result.data.activities[0].duration_days, 0.0);
        assert_eq!(result.data.activities[1].progress_percent, 60.0);
    }

    #[test]
    fn test_load_from_json_str_malformed() {
        let result = ScheduleLoader::load_from_json_str("{ not json");
        assert!(result.is_err());
    }
}
