//! Voice conversion model contract and reference implementations.

pub mod converter;

pub use converter::{ConvertedAudio, MockConverter, PitchShiftConverter, VoiceConverter};
