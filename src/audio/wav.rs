//! WAV decode/encode helpers shared by the segmenter, merger and pipeline.

use crate::error::{Result, SonoshiftError};
use std::path::Path;

/// A decoded mono recording.
#[derive(Debug, Clone, PartialEq)]
pub struct WavData {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl WavData {
    /// Duration of the recording in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Read a WAV file and downmix to mono 16-bit PCM.
///
/// Supports integer (up to 32-bit) and float sample formats at any
/// sample rate and channel count. Multi-channel input is averaged down
/// to mono; the sample rate is preserved.
pub fn read_mono(path: &Path) -> Result<WavData> {
    let decode_err = |message: String| SonoshiftError::InputDecode {
        path: path.display().to_string(),
        message,
    };

    let mut reader = hound::WavReader::open(path)
        .map_err(|e| decode_err(format!("Failed to parse WAV file: {}", e)))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(decode_err("WAV file declares zero channels".to_string()));
    }

    let interleaved: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int if spec.bits_per_sample <= 16 => reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| decode_err(format!("Failed to read WAV samples: {}", e)))?,
        hound::SampleFormat::Int => {
            let shift = spec.bits_per_sample - 16;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| decode_err(format!("Failed to read WAV samples: {}", e)))?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| decode_err(format!("Failed to read WAV samples: {}", e)))?,
    };

    let samples = downmix(&interleaved, channels);
    Ok(WavData {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Write mono 16-bit PCM samples as a WAV file.
pub fn write_mono(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        SonoshiftError::Other(format!("Failed to create {}: {}", path.display(), e))
    })?;
    for &s in samples {
        writer.write_sample(s).map_err(|e| {
            SonoshiftError::Other(format!("Failed to write {}: {}", path.display(), e))
        })?;
    }
    writer.finalize().map_err(|e| {
        SonoshiftError::Other(format!("Failed to finalize {}: {}", path.display(), e))
    })?;
    Ok(())
}

/// Average interleaved channels down to mono.
fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx.min(samples.len().saturating_sub(1))]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
