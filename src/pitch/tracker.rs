//! Monophonic pitch tracker.
//!
//! Estimates a per-frame fundamental frequency with normalized
//! autocorrelation and reports it in semitone (MIDI note) units.
//! Frames are gated twice: by RMS energy (silence, breath) and by
//! correlation clarity (unpitched consonants, noise). Gated frames
//! come back as `None` and are excluded from deviation statistics.

use crate::defaults;

/// Configuration for pitch tracking.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// Hop between analysis frames in milliseconds.
    pub hop_ms: u32,
    /// Lowest reportable fundamental in Hz; also sets the window length.
    pub min_hz: f32,
    /// Highest reportable fundamental in Hz.
    pub max_hz: f32,
    /// Minimum frame RMS (0.0 to 1.0) to count as voiced.
    pub voicing_rms: f32,
    /// Minimum normalized correlation peak to count as voiced.
    pub voicing_clarity: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            hop_ms: defaults::PITCH_HOP_MS,
            min_hz: defaults::PITCH_MIN_HZ,
            max_hz: defaults::PITCH_MAX_HZ,
            voicing_rms: defaults::VOICING_RMS,
            voicing_clarity: defaults::VOICING_CLARITY,
        }
    }
}

/// Track the pitch contour of a mono recording.
///
/// Returns one entry per analysis frame: `Some(semitones)` on the MIDI
/// scale (A4 = 69) for voiced frames, `None` for unvoiced or silent ones.
/// Recordings shorter than one analysis window produce an empty contour.
pub fn track(samples: &[i16], sample_rate: u32, config: &TrackerConfig) -> Vec<Option<f32>> {
    let max_lag = (sample_rate as f32 / config.min_hz).ceil() as usize;
    let min_lag = (sample_rate as f32 / config.max_hz).floor().max(2.0) as usize;
    // Two periods of the lowest trackable pitch per window.
    let window = max_lag * 2;
    let hop = ((config.hop_ms * sample_rate) / 1000).max(1) as usize;

    if samples.len() < window || min_lag >= max_lag {
        return Vec::new();
    }

    let mut contour = Vec::new();
    let mut start = 0;
    while start + window <= samples.len() {
        let frame: Vec<f32> = samples[start..start + window]
            .iter()
            .map(|&s| s as f32 / 32768.0)
            .collect();
        contour.push(frame_pitch(&frame, sample_rate, min_lag, max_lag, config));
        start += hop;
    }
    contour
}

/// Median of the voiced entries in a contour, if any frame is voiced.
pub fn median_semitone(contour: &[Option<f32>]) -> Option<f32> {
    let mut voiced: Vec<f32> = contour.iter().filter_map(|&p| p).collect();
    if voiced.is_empty() {
        return None;
    }
    voiced.sort_by(|a, b| a.total_cmp(b));
    Some(voiced[voiced.len() / 2])
}

/// How far below the global correlation maximum a smaller-lag peak may sit
/// and still be preferred over it.
const OCTAVE_MARGIN: f32 = 0.02;

/// Estimate one frame's pitch, or None if the frame is unvoiced.
fn frame_pitch(
    frame: &[f32],
    sample_rate: u32,
    min_lag: usize,
    max_lag: usize,
    config: &TrackerConfig,
) -> Option<f32> {
    // DC removal keeps offset recordings from inflating low-lag correlation.
    let mean = frame.iter().sum::<f32>() / frame.len() as f32;
    let frame: Vec<f32> = frame.iter().map(|&s| s - mean).collect();

    let rms = (frame.iter().map(|&s| s * s).sum::<f32>() / frame.len() as f32).sqrt();
    if rms < config.voicing_rms {
        return None;
    }

    let top_lag = max_lag.min(frame.len() - 1);
    let mut best_corr = f32::MIN;
    let mut correlations = vec![0.0f32; top_lag + 1];
    for lag in min_lag..=top_lag {
        let corr = normalized_correlation(&frame, lag);
        correlations[lag] = corr;
        if corr > best_corr {
            best_corr = corr;
        }
    }

    if best_corr < config.voicing_clarity {
        return None;
    }

    // A periodic signal correlates at every multiple of its period, so the
    // global maximum can land an octave low. Take the smallest local peak
    // within a margin of the maximum instead.
    let mut best_lag = 0usize;
    for lag in min_lag..=top_lag {
        let is_peak = (lag == min_lag || correlations[lag] >= correlations[lag - 1])
            && (lag == top_lag || correlations[lag] >= correlations[lag + 1]);
        if is_peak && correlations[lag] >= best_corr - OCTAVE_MARGIN {
            best_lag = lag;
            break;
        }
    }
    if best_lag == 0 {
        return None;
    }

    // Parabolic interpolation around the peak for sub-sample lag accuracy.
    let refined = if best_lag > min_lag && best_lag < top_lag {
        let left = correlations[best_lag - 1];
        let mid = correlations[best_lag];
        let right = correlations[best_lag + 1];
        let denom = left - 2.0 * mid + right;
        if denom.abs() > f32::EPSILON {
            best_lag as f32 + 0.5 * (left - right) / denom
        } else {
            best_lag as f32
        }
    } else {
        best_lag as f32
    };

    let f0 = sample_rate as f32 / refined;
    Some(hz_to_semitones(f0))
}

/// Normalized cross-correlation of a frame against itself at the given lag.
fn normalized_correlation(frame: &[f32], lag: usize) -> f32 {
    let n = frame.len() - lag;
    let mut cross = 0.0f32;
    let mut energy_a = 0.0f32;
    let mut energy_b = 0.0f32;
    for i in 0..n {
        cross += frame[i] * frame[i + lag];
        energy_a += frame[i] * frame[i];
        energy_b += frame[i + lag] * frame[i + lag];
    }
    let norm = (energy_a * energy_b).sqrt();
    if norm <= f32::EPSILON { 0.0 } else { cross / norm }
}

/// Convert a frequency in Hz to semitones on the MIDI scale (A4 = 69).
pub fn hz_to_semitones(hz: f32) -> f32 {
    69.0 + 12.0 * (hz / 440.0).log2()
}
