//! Service layer: link indexing, progress classification and frame computation.
//!
//! Everything here is synchronous and free of renderer concerns. The
//! [`session`] module ties these pieces to the timeline and a mounted viewer.

pub mod frame;
pub mod link_index;
pub mod progress;
pub mod session;
pub mod visibility_engine;


pub use frame::{ElementAppearance, FrameSummary, VisibilityFrame};
pub use link_index::LinkIndex;
pub use progress::{
    classify, resolve_window, CompletionTiming, DrawState, EffectiveWindow, TimelineProgress,
    WindowIssue,
};
pub use session::SimulationSession;
pub use visibility_engine::{ActivitySnapshot, ProgressVisibilityEngine};
