//! Schedule-graph algorithms.
//!
//! # Components
//!
//! - [`critical_path`]: two-pass Critical Path Method with cycle detection and
//!   a fingerprint-guarded result cache
//! - [`fingerprint`]: SHA-256 fingerprints used to detect graph mutations
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use sim4d_rust::algorithms::compute_critical_path;
//! use sim4d_rust::models::{Activity, ActivityId};
//!
//! let day0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let a = Activity::planned(1, "Excavate", day0, day0).with_duration(2.0);
//! let b = Activity::planned(2, "Foundations", day0, day0)
//!     .with_duration(3.0)
//!     .with_predecessors([1]);
//!
//! let result = compute_critical_path(&[a, b]).unwrap();
//! assert!(result.is_critical(ActivityId::new(2)));
//! ```

pub mod critical_path;
pub mod fingerprint;


pub use critical_path::{
    compute_critical_path, CriticalPathCache, CriticalPathResult, CycleError, ScheduleFigures,
    FLOAT_EPSILON,
};
pub use fingerprint::graph_fingerprint;
