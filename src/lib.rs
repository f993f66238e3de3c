//! sonoshift - singing-voice conversion demo
//!
//! Splits a recording into bounded segments, converts each through a
//! voice-conversion model with a caller-chosen transposition, reassembles
//! the converted segments, and reports a per-segment pitch-deviation
//! diagnostic.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod convert;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod pitch;
pub mod segment;
pub mod speakers;

// Core traits (segment → convert → merge)
pub use convert::{ConvertedAudio, MockConverter, PitchShiftConverter, VoiceConverter};

// Pipeline
pub use pipeline::{
    ConversionRequest, ConversionResult, ModelContext, Pipeline, PipelineConfig, PipelineState,
    ProgressEvent,
};

// Diagnostics
pub use pitch::{PitchError, TrackerConfig};

// Error handling
pub use error::{Result, SonoshiftError};

// Config
pub use config::Config;

// Speaker mapping
pub use speakers::SpeakerRegistry;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
