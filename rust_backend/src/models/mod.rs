//! Core domain models for construction-schedule simulation.
//!
//! Activities and their predecessor edges form the schedule graph; links bind
//! model elements (by stable id) to activities.

pub mod activity;
pub mod color;
pub mod element;
pub mod link;
pub mod macros;
pub mod schedule;
pub mod time;

pub use activity::*;
pub use color::*;
pub use element::*;
pub use link::*;
pub use schedule::*;
