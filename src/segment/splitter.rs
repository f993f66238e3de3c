//! Segmenter: splits a recording into bounded-duration chunk files.
//!
//! Segments are gapless, ordered, and carry an explicit ordinal; their
//! in-order concatenation reproduces the source sample sequence exactly.
//! File names are zero-padded for human-friendly listing, but ordering
//! never relies on them: callers receive only the segments written by
//! this call, in order, regardless of stale files in the directory.

use crate::audio::wav;
use crate::error::{Result, SonoshiftError};
use std::fs;
use std::path::{Path, PathBuf};

/// One bounded-duration slice of the input recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Position of this segment in the recording, starting at 0.
    pub ordinal: usize,
    /// Offset of the segment's first sample in the source recording.
    pub start_sample: usize,
    /// Number of samples in this segment.
    pub sample_count: usize,
    /// Sample rate of the segment file.
    pub sample_rate: u32,
    /// Path of the written segment file.
    pub path: PathBuf,
}

impl Segment {
    /// File name of the segment, for progress reporting.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Split a recording into `ceil(duration / max_segment_seconds)` segments.
///
/// Segment files are written under `input_dir` as
/// `{run_name}_{ordinal:04}.wav`; the final segment may be shorter than
/// the bound. Recordings shorter than the bound yield exactly one segment.
pub fn split(
    recording_path: &Path,
    input_dir: &Path,
    run_name: &str,
    max_segment_seconds: f64,
) -> Result<Vec<Segment>> {
    if !(max_segment_seconds > 0.0) {
        return Err(SonoshiftError::ConfigInvalidValue {
            key: "max_segment_seconds".to_string(),
            message: format!("must be positive, got {}", max_segment_seconds),
        });
    }

    let recording = wav::read_mono(recording_path)?;
    if recording.samples.is_empty() {
        return Err(SonoshiftError::InputDecode {
            path: recording_path.display().to_string(),
            message: "recording contains no samples".to_string(),
        });
    }

    fs::create_dir_all(input_dir)?;

    let samples_per_segment =
        ((max_segment_seconds * recording.sample_rate as f64).round() as usize).max(1);

    let mut segments = Vec::new();
    for (ordinal, chunk) in recording.samples.chunks(samples_per_segment).enumerate() {
        let path = input_dir.join(format!("{}_{:04}.wav", run_name, ordinal));
        wav::write_mono(&path, chunk, recording.sample_rate)?;
        segments.push(Segment {
            ordinal,
            start_sample: ordinal * samples_per_segment,
            sample_count: chunk.len(),
            sample_rate: recording.sample_rate,
            path,
        });
    }

    Ok(segments)
}
