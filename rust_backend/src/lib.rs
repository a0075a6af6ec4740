//! 4D construction-schedule simulation.
//!
//! Links model elements to schedule activities and, for any date on the
//! timeline, decides which elements are visible and how each one is drawn
//! (progress, critical path, delays). Frames are pushed to whichever 3D
//! viewer backend is mounted through a common adapter protocol.
//!
//! # Layout
//!
//! - [`models`]: activities, elements, links, colours and date helpers
//! - [`algorithms`]: critical path over the predecessor graph
//! - [`services`]: link index, progress classification, frame computation
//!   and the simulation session
//! - [`timeline`]: playback state machine and the tokio day-advance driver
//! - [`viewer`]: adapter protocol, backend shims and frame application
//! - [`io`], [`preprocessing`]: loading and validating provider data
//! - [`config`]: TOML settings

pub mod algorithms;
pub mod config;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod services;
pub mod timeline;
pub mod viewer;

pub use algorithms::{compute_critical_path, CriticalPathResult, CycleError};
pub use config::SimulationConfig;
pub use services::{ProgressVisibilityEngine, SimulationSession, VisibilityFrame};
