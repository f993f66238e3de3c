//! Default configuration constants for sonoshift.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default maximum segment duration in seconds.
///
/// 20 seconds keeps each model invocation within a comfortable memory budget
/// while leaving segment boundaries sparse enough that un-crossfaded joins
/// stay perceptually acceptable.
pub const SEGMENT_SECONDS: f64 = 20.0;

/// Advisory upper bound on input duration in seconds.
///
/// Longer inputs are still segmented and converted; this only drives a
/// warning in the CLI, matching the demo's "keep uploads under 45s" guidance.
pub const ADVISORY_MAX_INPUT_SECS: f64 = 45.0;

/// Fixed base name for one conversion run's artifacts.
///
/// Segment files, converted segments and the merged result all derive from
/// this name, so a new run predictably overwrites the previous one.
pub const RUN_NAME: &str = "temp_convert";

/// Suffix appended to the run name for the merged output file.
pub const MERGED_SUFFIX: &str = "_merged";

/// Working directory for segment and converted-segment files.
pub const WORK_DIR: &str = "wav_temp";

/// Subdirectory of the work dir holding source segments.
pub const INPUT_DIR: &str = "input";

/// Subdirectory of the work dir holding converted segments.
pub const OUTPUT_DIR: &str = "output";

/// Directory for merged conversion results.
pub const RESULTS_DIR: &str = "results";

/// Hop between pitch analysis frames in milliseconds.
pub const PITCH_HOP_MS: u32 = 25;

/// Lowest fundamental frequency the pitch tracker will report, in Hz.
///
/// 60 Hz sits below a bass singer's range; anything lower is rumble.
pub const PITCH_MIN_HZ: f32 = 60.0;

/// Highest fundamental frequency the pitch tracker will report, in Hz.
///
/// 1000 Hz covers soprano range with headroom for transposed material.
pub const PITCH_MAX_HZ: f32 = 1000.0;

/// Minimum frame RMS (0.0 to 1.0) for a frame to count as voiced.
///
/// Frames below this are silence or breath noise and are excluded from
/// the pitch-deviation statistic.
pub const VOICING_RMS: f32 = 0.01;

/// Minimum autocorrelation clarity for a frame to count as voiced.
///
/// Clarity is the normalized peak height at the detected period; unpitched
/// frames (consonants, noise) score low and are excluded.
pub const VOICING_CLARITY: f32 = 0.6;

/// Mean deviation (semitones) at or below which conversion is rated excellent.
pub const DEVIATION_EXCELLENT: f32 = 0.3;

/// Mean deviation (semitones) around which conversion is rated acceptable.
pub const DEVIATION_ACCEPTABLE: f32 = 0.5;

/// Mean deviation (semitones) above which the transposition should be adjusted.
pub const DEVIATION_BORDERLINE: f32 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_bound_is_positive_and_below_advisory_cap() {
        assert!(SEGMENT_SECONDS > 0.0);
        assert!(SEGMENT_SECONDS < ADVISORY_MAX_INPUT_SECS);
    }

    #[test]
    fn pitch_search_range_is_ordered() {
        assert!(PITCH_MIN_HZ < PITCH_MAX_HZ);
    }

    #[test]
    fn deviation_thresholds_are_ordered() {
        assert!(DEVIATION_EXCELLENT < DEVIATION_ACCEPTABLE);
        assert!(DEVIATION_ACCEPTABLE < DEVIATION_BORDERLINE);
    }
}
