//! High-level data loading utilities.
//!
//! Loaders turn the external provider's schedule/link JSON into
//! [`ScheduleData`](crate::models::ScheduleData), adding error context along
//! the way.
//!
//! # Example
//!
//! ```no_run
//! use sim4d_rust::io::loaders::ScheduleLoader;
//! use std::path::Path;
//!
//! let result = ScheduleLoader::load_from_file(Path::new("schedule.json"))
//!     .expect("Failed to load");
//! println!("Loaded {} activities", result.num_activities);
//! ```

pub mod loaders;

#[cfg(test)]
mod loaders_tests;

pub use loaders::{parse_schedule_json_str, ScheduleLoadResult, ScheduleLoader};
