//! Pitch tracking and conversion pitch-error diagnostics.

pub mod evaluator;
pub mod tracker;

pub use evaluator::{PitchError, evaluate, evaluate_files};
pub use tracker::TrackerConfig;
