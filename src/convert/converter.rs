use crate::audio::wav;
use crate::error::{Result, SonoshiftError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One segment's worth of converted audio.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedAudio {
    pub samples: Vec<i16>,
    /// The target voice's native sample rate.
    pub sample_rate: u32,
}

/// Trait for the voice conversion model.
///
/// This trait allows swapping implementations (real neural model vs mock).
/// The model is treated as a black box: one audio segment plus a speaker
/// index and a transposition in, one converted waveform out.
pub trait VoiceConverter: Send + Sync {
    /// Convert one segment of audio into the target speaker's timbre.
    ///
    /// # Arguments
    /// * `speaker_index` - Index into the model's speaker embedding table.
    ///   Must be valid; the pipeline resolves it through the registry first,
    ///   so an out-of-range index is a programming error and may panic.
    /// * `transposition` - Signed semitone shift applied during conversion.
    ///   Unbounded; extreme values degrade quality but are not rejected.
    /// * `samples` - Mono 16-bit PCM segment audio.
    /// * `sample_rate` - Sample rate of `samples` in Hz.
    ///
    /// # Returns
    /// Converted waveform at the target voice's native sample rate.
    ///
    /// Safe to call once per segment, sequentially; model state is read-only
    /// during inference.
    fn convert(
        &self,
        speaker_index: usize,
        transposition: i32,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<ConvertedAudio>;

    /// Speaker display names the model declares, in embedding-table order.
    /// Empty when the model declares none.
    fn speakers(&self) -> Vec<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Implement VoiceConverter for Arc<T> to allow sharing across requests.
impl<T: VoiceConverter> VoiceConverter for Arc<T> {
    fn convert(
        &self,
        speaker_index: usize,
        transposition: i32,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<ConvertedAudio> {
        (**self).convert(speaker_index, transposition, samples, sample_rate)
    }

    fn speakers(&self) -> Vec<String> {
        (**self).speakers()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Resample-based pitch shifter, the built-in reference conversion model.
///
/// Shifts the segment's pitch by the requested number of semitones by
/// playing the samples at a scaled rate. No timbre transfer happens, which
/// makes it useful for exercising the pipeline end to end without model
/// weights: the output contour is the input contour shifted by exactly the
/// transposition, so the pitch-deviation diagnostic should read near zero.
pub struct PitchShiftConverter {
    name: String,
    speakers: Vec<String>,
    /// Declared native rate of the "target voice"; input rate when None.
    output_rate: Option<u32>,
}

impl PitchShiftConverter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            speakers: Vec::new(),
            output_rate: None,
        }
    }

    /// Declare a speaker list, as a model config's `speakers` entry would.
    pub fn with_speakers(mut self, speakers: Vec<String>) -> Self {
        self.speakers = speakers;
        self
    }

    /// Declare a native output sample rate differing from the input's.
    pub fn with_output_rate(mut self, rate: u32) -> Self {
        self.output_rate = Some(rate);
        self
    }

    fn valid_speaker_count(&self) -> usize {
        // A speakerless model still accepts index 0 (the synthetic entry).
        self.speakers.len().max(1)
    }
}

impl VoiceConverter for PitchShiftConverter {
    fn convert(
        &self,
        speaker_index: usize,
        transposition: i32,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<ConvertedAudio> {
        let count = self.valid_speaker_count();
        assert!(
            speaker_index < count,
            "speaker index {} out of range ({} speakers)",
            speaker_index,
            count
        );

        // Raising by t semitones means playing faster by 2^(t/12).
        let factor = 2f64.powf(transposition as f64 / 12.0);
        let shifted = if transposition == 0 {
            samples.to_vec()
        } else {
            let virtual_rate = (sample_rate as f64 / factor).round().max(1.0) as u32;
            wav::resample(samples, sample_rate, virtual_rate)
        };

        let out_rate = self.output_rate.unwrap_or(sample_rate);
        let samples = if out_rate != sample_rate {
            wav::resample(&shifted, sample_rate, out_rate)
        } else {
            shifted
        };

        Ok(ConvertedAudio {
            samples,
            sample_rate: out_rate,
        })
    }

    fn speakers(&self) -> Vec<String> {
        self.speakers.clone()
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Mock converter for testing
pub struct MockConverter {
    model_name: String,
    speakers: Vec<String>,
    output_rate: Option<u32>,
    should_fail: bool,
    /// Zero-based call index on which convert starts failing, if set.
    fail_from_call: Option<usize>,
    calls: AtomicUsize,
}

impl MockConverter {
    /// Create a new mock converter with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            speakers: Vec::new(),
            output_rate: None,
            should_fail: false,
            fail_from_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the declared speaker list
    pub fn with_speakers(mut self, speakers: Vec<String>) -> Self {
        self.speakers = speakers;
        self
    }

    /// Configure a native output sample rate
    pub fn with_output_rate(mut self, rate: u32) -> Self {
        self.output_rate = Some(rate);
        self
    }

    /// Configure the mock to fail on every convert call
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to fail from the given zero-based call onwards
    pub fn failing_from_call(mut self, call: usize) -> Self {
        self.fail_from_call = Some(call);
        self
    }

    /// Number of convert calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VoiceConverter for MockConverter {
    fn convert(
        &self,
        _speaker_index: usize,
        _transposition: i32,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<ConvertedAudio> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.should_fail || self.fail_from_call.is_some_and(|from| call >= from);
        if failing {
            return Err(SonoshiftError::Inference {
                segment: format!("call {}", call),
                message: "mock conversion failure".to_string(),
            });
        }

        let out_rate = self.output_rate.unwrap_or(sample_rate);
        let samples = if out_rate != sample_rate {
            wav::resample(samples, sample_rate, out_rate)
        } else {
            samples.to_vec()
        };
        Ok(ConvertedAudio {
            samples,
            sample_rate: out_rate,
        })
    }

    fn speakers(&self) -> Vec<String> {
        self.speakers.clone()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
