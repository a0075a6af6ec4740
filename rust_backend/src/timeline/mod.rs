//! Timeline control: the current-date state machine and its playback driver.

pub mod controller;
pub mod playback;

#[cfg(test)]
mod controller_tests;

pub use controller::{
    FrameRequest, PlaybackState, ScheduleBounds, TimelineController, TimelineError, TimelineEvent,
};
pub use playback::{PlaybackDriver, PlaybackHandle, PlaybackTarget};
