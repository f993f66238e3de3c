//! Pitch-error evaluation for converted segments.
//!
//! Compares a segment's source pitch contour to its converted contour and
//! the requested transposition. The statistic is the mean and variance of
//! `converted - source - transposition` in semitones over frames voiced in
//! both contours; everything else (silence, consonants) is excluded.

use crate::audio::wav;
use crate::error::Result;
use crate::pitch::tracker::{self, TrackerConfig};
use std::path::Path;

/// Per-segment pitch deviation statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchError {
    /// Mean of `(converted - source - transposition)` over voiced frames,
    /// in semitones. Near zero means the conversion held the contour.
    pub mean_deviation: f32,
    /// Variance of the same quantity, in semitones squared.
    pub variance: f32,
    /// Number of frame pairs that entered the statistic.
    pub voiced_frames: usize,
}

impl PitchError {
    /// A segment with no voiced frame pairs contributes a zero statistic.
    pub fn silent() -> Self {
        Self {
            mean_deviation: 0.0,
            variance: 0.0,
            voiced_frames: 0,
        }
    }
}

/// Evaluate the pitch error between a source segment and its conversion.
///
/// Source and converted audio may differ in sample count and rate (the
/// model resamples to the target voice's native rate), so contours are
/// aligned by normalized time position rather than by frame index.
pub fn evaluate(
    source: &[i16],
    source_rate: u32,
    converted: &[i16],
    converted_rate: u32,
    transposition: i32,
    config: &TrackerConfig,
) -> PitchError {
    let source_contour = tracker::track(source, source_rate, config);
    let converted_contour = tracker::track(converted, converted_rate, config);

    if source_contour.is_empty() || converted_contour.is_empty() {
        return PitchError::silent();
    }

    let mut deviations = Vec::new();
    let last_source = source_contour.len() - 1;
    let last_converted = converted_contour.len() - 1;
    for (i, source_pitch) in source_contour.iter().enumerate() {
        let Some(source_pitch) = source_pitch else {
            continue;
        };
        let position = if last_source == 0 {
            0.0
        } else {
            i as f64 / last_source as f64
        };
        let j = (position * last_converted as f64).round() as usize;
        if let Some(converted_pitch) = converted_contour[j] {
            deviations.push(converted_pitch - source_pitch - transposition as f32);
        }
    }

    if deviations.is_empty() {
        return PitchError::silent();
    }

    let n = deviations.len() as f32;
    let mean = deviations.iter().sum::<f32>() / n;
    let variance = deviations.iter().map(|d| (d - mean) * (d - mean)).sum::<f32>() / n;

    PitchError {
        mean_deviation: mean,
        variance,
        voiced_frames: deviations.len(),
    }
}

/// Evaluate pitch error between a source segment file and its converted file.
pub fn evaluate_files(
    source_path: &Path,
    converted_path: &Path,
    transposition: i32,
    config: &TrackerConfig,
) -> Result<PitchError> {
    let source = wav::read_mono(source_path)?;
    let converted = wav::read_mono(converted_path)?;
    Ok(evaluate(
        &source.samples,
        source.sample_rate,
        &converted.samples,
        converted.sample_rate,
        transposition,
        config,
    ))
}
