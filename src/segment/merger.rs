//! Merger: reassembles converted segments into one output file.
//!
//! Segments are concatenated strictly by ordinal. No resampling or
//! crossfading happens here; boundary artifacts are kept acceptable by
//! the bounded segment length chosen upstream.

use crate::audio::wav;
use crate::error::{Result, SonoshiftError};
use std::fs;
use std::path::{Path, PathBuf};

/// A converted segment awaiting reassembly.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedSegment {
    /// Ordinal of the source segment this conversion came from.
    pub ordinal: usize,
    /// Path of the converted segment file.
    pub path: PathBuf,
    /// The converted audio's sample rate.
    pub sample_rate: u32,
}

impl ConvertedSegment {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Concatenate converted segments, in ordinal order, into
/// `{run_name}{output_suffix}.wav` under `results_dir`.
///
/// The output path is deterministic, so repeated runs overwrite the same
/// location. The segment list is sorted by ordinal before concatenation
/// rather than trusted to arrive ordered.
pub fn merge(
    converted: &[ConvertedSegment],
    results_dir: &Path,
    run_name: &str,
    output_suffix: &str,
) -> Result<PathBuf> {
    if converted.is_empty() {
        return Err(SonoshiftError::NothingToMerge);
    }

    let mut ordered: Vec<&ConvertedSegment> = converted.iter().collect();
    ordered.sort_by_key(|s| s.ordinal);

    // The model contract promises one native output rate; a mix means a
    // converter implementation broke it.
    let sample_rate = ordered[0].sample_rate;
    let mut samples = Vec::new();
    for segment in &ordered {
        if segment.sample_rate != sample_rate {
            return Err(SonoshiftError::Inference {
                segment: segment.file_name(),
                message: format!(
                    "converted sample rate {} differs from {}",
                    segment.sample_rate, sample_rate
                ),
            });
        }
        let wav = wav::read_mono(&segment.path)?;
        samples.extend(wav.samples);
    }

    fs::create_dir_all(results_dir)?;
    let output_path = results_dir.join(format!("{}{}.wav", run_name, output_suffix));
    wav::write_mono(&output_path, &samples, sample_rate)?;
    Ok(output_path)
}
