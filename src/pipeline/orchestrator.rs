//! Pipeline orchestrator: drives one conversion request start to finish.
//!
//! States run `Idle -> Segmenting -> Converting(i) -> Merged -> Reported`,
//! with `Failed` reachable from any non-terminal state. Segments are
//! processed strictly in order: the merger depends on positional
//! correctness and progress reporting depends on sequential counting.

use crate::audio::wav;
use crate::convert::VoiceConverter;
use crate::defaults;
use crate::error::{Result, SonoshiftError};
use crate::pipeline::report;
use crate::pitch::{self, PitchError, TrackerConfig};
use crate::segment::merger::{self, ConvertedSegment};
use crate::segment::splitter;
use crate::speakers::SpeakerRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One conversion request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Target speaker display name, resolved through the registry.
    pub speaker: String,
    /// Signed semitone transposition; +12 is one octave up.
    pub transposition: i32,
    /// Uploaded audio file, if any.
    pub upload: Option<PathBuf>,
    /// Microphone recording file, if any.
    pub microphone: Option<PathBuf>,
}

impl ConversionRequest {
    /// Pick the audio source. Upload takes precedence over the microphone
    /// recording when both are present; neither present is an error.
    pub fn source(&self) -> Result<&Path> {
        self.upload
            .as_deref()
            .or(self.microphone.as_deref())
            .ok_or(SonoshiftError::NoAudioProvided)
    }
}

/// Explicit handle to a loaded model and its speaker mapping.
///
/// Set up once at model-load time and shared read-only across requests;
/// passing it explicitly (rather than holding process-wide state) keeps
/// multiple models loadable side by side.
pub struct ModelContext {
    pub converter: Arc<dyn VoiceConverter>,
    pub registry: SpeakerRegistry,
}

impl ModelContext {
    /// Wrap a loaded converter, deriving the registry from the speaker
    /// list it declares.
    pub fn new(converter: Arc<dyn VoiceConverter>) -> Self {
        let registry = SpeakerRegistry::from_model(&converter.speakers());
        Self {
            converter,
            registry,
        }
    }
}

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base name for all of a run's artifacts.
    pub run_name: String,
    /// Maximum segment duration in seconds.
    pub max_segment_seconds: f64,
    /// Working directory holding the input/ and output/ segment areas.
    pub work_dir: PathBuf,
    /// Directory for the merged result.
    pub results_dir: PathBuf,
    /// Suffix of the merged output file name.
    pub output_suffix: String,
    /// Pitch tracker settings for the diagnostic.
    pub tracker: TrackerConfig,
    /// Optional event sender for live progress display (non-blocking).
    pub event_tx: Option<crossbeam_channel::Sender<ProgressEvent>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            run_name: defaults::RUN_NAME.to_string(),
            max_segment_seconds: defaults::SEGMENT_SECONDS,
            work_dir: PathBuf::from(defaults::WORK_DIR),
            results_dir: PathBuf::from(defaults::RESULTS_DIR),
            output_suffix: defaults::MERGED_SUFFIX.to_string(),
            tracker: TrackerConfig::default(),
            event_tx: None,
        }
    }
}

impl PipelineConfig {
    fn input_dir(&self) -> PathBuf {
        self.work_dir.join(defaults::INPUT_DIR)
    }

    fn output_dir(&self) -> PathBuf {
        self.work_dir.join(defaults::OUTPUT_DIR)
    }
}

/// Where the pipeline currently is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Segmenting,
    /// Converting segment `i` (zero-based).
    Converting(usize),
    Merged,
    Reported,
    Failed,
}

/// Emitted after each segment finishes converting.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// File name of the segment just processed.
    pub segment_file: String,
    /// Segments processed so far, including this one.
    pub processed: usize,
    /// Total segment count for this run.
    pub total: usize,
    /// `processed / total * 100`, rounded to two decimals.
    pub percent: f64,
    /// The segment's just-computed pitch error.
    pub error: PitchError,
}

/// Terminal artifact of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Path of the merged output file.
    pub output_path: PathBuf,
    /// Human-readable diagnostic report.
    pub report: String,
    /// Per-segment diagnostics, aligned with segment order.
    pub diagnostics: Vec<PitchError>,
}

/// The conversion pipeline. One instance drives one request at a time;
/// requests run start-to-finish with no cancellation.
pub struct Pipeline {
    context: ModelContext,
    config: PipelineConfig,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(context: ModelContext, config: PipelineConfig) -> Self {
        Self {
            context,
            config,
            state: PipelineState::Idle,
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run one conversion request to completion.
    ///
    /// Any component failure aborts the run: remaining segments are not
    /// processed and no merged file is claimed as this run's result (a
    /// previous run's file may still exist at the output path).
    pub fn run(&mut self, request: &ConversionRequest) -> Result<ConversionResult> {
        self.state = PipelineState::Idle;
        match self.execute(request) {
            Ok(result) => Ok(result),
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn execute(&mut self, request: &ConversionRequest) -> Result<ConversionResult> {
        // Source selection happens before Segmenting: a request without
        // audio never touches the working directories.
        let source = request.source()?;

        self.state = PipelineState::Segmenting;
        let segments = splitter::split(
            source,
            &self.config.input_dir(),
            &self.config.run_name,
            self.config.max_segment_seconds,
        )?;
        let total = segments.len();

        let output_dir = self.config.output_dir();
        fs::create_dir_all(&output_dir)?;

        let mut converted = Vec::with_capacity(total);
        let mut diagnostics = Vec::with_capacity(total);
        for (i, segment) in segments.iter().enumerate() {
            self.state = PipelineState::Converting(i);

            let speaker_index = self.context.registry.resolve(&request.speaker)?;
            let audio = wav::read_mono(&segment.path)?;
            let out = self
                .context
                .converter
                .convert(
                    speaker_index,
                    request.transposition,
                    &audio.samples,
                    audio.sample_rate,
                )
                .map_err(|e| match e {
                    SonoshiftError::Inference { message, .. } => SonoshiftError::Inference {
                        segment: segment.file_name(),
                        message,
                    },
                    other => other,
                })?;

            let converted_path = output_dir.join(segment.file_name());
            wav::write_mono(&converted_path, &out.samples, out.sample_rate)?;

            let error = pitch::evaluate(
                &audio.samples,
                audio.sample_rate,
                &out.samples,
                out.sample_rate,
                request.transposition,
                &self.config.tracker,
            );
            diagnostics.push(error);
            converted.push(ConvertedSegment {
                ordinal: segment.ordinal,
                path: converted_path,
                sample_rate: out.sample_rate,
            });

            self.emit_progress(segment.file_name(), i + 1, total, error);
        }

        let output_path = merger::merge(
            &converted,
            &self.config.results_dir,
            &self.config.run_name,
            &self.config.output_suffix,
        )?;
        self.state = PipelineState::Merged;

        let report = report::render_report(&diagnostics);
        self.state = PipelineState::Reported;

        Ok(ConversionResult {
            output_path,
            report,
            diagnostics,
        })
    }

    fn emit_progress(&self, segment_file: String, processed: usize, total: usize, error: PitchError) {
        let Some(tx) = &self.config.event_tx else {
            return;
        };
        let percent = ((processed as f64 / total as f64) * 100.0 * 100.0).round() / 100.0;
        // A slow or gone consumer never stalls the run.
        tx.try_send(ProgressEvent {
            segment_file,
            processed,
            total,
            percent,
            error,
        })
        .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::MockConverter;
    use tempfile::TempDir;

    fn write_recording(path: &Path, seconds: f64) {
        let n = (16000.0 * seconds) as usize;
        let samples: Vec<i16> = (0..n)
            .map(|i| {
                let t = i as f32 / 16000.0;
                ((t * 220.0 * std::f32::consts::TAU).sin() * 12000.0) as i16
            })
            .collect();
        wav::write_mono(path, &samples, 16000).unwrap();
    }

    fn test_config(dir: &TempDir) -> PipelineConfig {
        PipelineConfig {
            work_dir: dir.path().join("wav_temp"),
            results_dir: dir.path().join("results"),
            max_segment_seconds: 1.0,
            ..PipelineConfig::default()
        }
    }

    fn request(dir: &TempDir) -> ConversionRequest {
        ConversionRequest {
            speaker: "0".to_string(),
            transposition: 0,
            upload: Some(dir.path().join("in.wav")),
            microphone: None,
        }
    }

    #[test]
    fn upload_takes_precedence_over_microphone() {
        let request = ConversionRequest {
            speaker: "0".to_string(),
            transposition: 0,
            upload: Some(PathBuf::from("upload.wav")),
            microphone: Some(PathBuf::from("mic.wav")),
        };
        assert_eq!(request.source().unwrap(), Path::new("upload.wav"));
    }

    #[test]
    fn microphone_is_used_when_no_upload() {
        let request = ConversionRequest {
            speaker: "0".to_string(),
            transposition: 0,
            upload: None,
            microphone: Some(PathBuf::from("mic.wav")),
        };
        assert_eq!(request.source().unwrap(), Path::new("mic.wav"));
    }

    #[test]
    fn missing_audio_fails_before_segmenting() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let work_dir = config.work_dir.clone();
        let context = ModelContext::new(Arc::new(MockConverter::new("mock")));
        let mut pipeline = Pipeline::new(context, config);

        let result = pipeline.run(&ConversionRequest {
            speaker: "0".to_string(),
            transposition: 0,
            upload: None,
            microphone: None,
        });

        assert!(matches!(result, Err(SonoshiftError::NoAudioProvided)));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        // The segmenter never ran: no working directory was created
        assert!(!work_dir.exists());
    }

    #[test]
    fn successful_run_reaches_reported_state() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 2.5);
        let context = ModelContext::new(Arc::new(MockConverter::new("mock")));
        let mut pipeline = Pipeline::new(context, test_config(&dir));

        let result = pipeline.run(&request(&dir)).unwrap();

        assert_eq!(pipeline.state(), PipelineState::Reported);
        assert!(result.output_path.ends_with("temp_convert_merged.wav"));
        assert!(result.output_path.exists());
        assert_eq!(result.diagnostics.len(), 3); // ceil(2.5 / 1.0)
        assert!(result.report.contains("Semitone deviation"));
    }

    #[test]
    fn diagnostics_align_with_segment_count() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 4.0);
        let context = ModelContext::new(Arc::new(MockConverter::new("mock")));
        let mut pipeline = Pipeline::new(context, test_config(&dir));

        let result = pipeline.run(&request(&dir)).unwrap();
        assert_eq!(result.diagnostics.len(), 4);
    }

    #[test]
    fn single_segment_recording_merges_to_one_segment_output() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 0.5);
        let context = ModelContext::new(Arc::new(MockConverter::new("mock")));
        let mut pipeline = Pipeline::new(context, test_config(&dir));

        let result = pipeline.run(&request(&dir)).unwrap();

        assert_eq!(result.diagnostics.len(), 1);
        let merged = wav::read_mono(&result.output_path).unwrap();
        let converted = wav::read_mono(
            &dir.path()
                .join("wav_temp")
                .join("output")
                .join("temp_convert_0000.wav"),
        )
        .unwrap();
        assert_eq!(merged, converted);
    }

    #[test]
    fn inference_failure_aborts_remaining_segments() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 5.0); // 5 segments at 1s
        let converter = Arc::new(MockConverter::new("mock").failing_from_call(2));
        let context = ModelContext::new(Arc::clone(&converter) as Arc<dyn VoiceConverter>);
        let config = test_config(&dir);
        let results_dir = config.results_dir.clone();
        let mut pipeline = Pipeline::new(context, config);

        let result = pipeline.run(&request(&dir));

        assert!(matches!(result, Err(SonoshiftError::Inference { .. })));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        // Segment 3 failed; segments 4 and 5 were never attempted
        assert_eq!(converter.call_count(), 3);
        // No merged file was produced for this run
        assert!(!results_dir.join("temp_convert_merged.wav").exists());
    }

    #[test]
    fn inference_error_names_the_failing_segment() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 3.0);
        let converter = Arc::new(MockConverter::new("mock").failing_from_call(1));
        let context = ModelContext::new(converter as Arc<dyn VoiceConverter>);
        let mut pipeline = Pipeline::new(context, test_config(&dir));

        match pipeline.run(&request(&dir)) {
            Err(SonoshiftError::Inference { segment, .. }) => {
                assert_eq!(segment, "temp_convert_0001.wav");
            }
            other => panic!("Expected Inference error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_speaker_fails_the_run() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 0.5);
        let converter =
            MockConverter::new("mock").with_speakers(vec!["alto".to_string(), "bass".to_string()]);
        let context = ModelContext::new(Arc::new(converter));
        let mut pipeline = Pipeline::new(context, test_config(&dir));

        let mut req = request(&dir);
        req.speaker = "soprano".to_string();

        let result = pipeline.run(&req);
        assert!(matches!(result, Err(SonoshiftError::UnknownSpeaker { .. })));
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn progress_events_count_sequentially_to_one_hundred() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 3.0);
        let (tx, rx) = crossbeam_channel::unbounded();
        let context = ModelContext::new(Arc::new(MockConverter::new("mock")));
        let config = PipelineConfig {
            event_tx: Some(tx),
            ..test_config(&dir)
        };
        let mut pipeline = Pipeline::new(context, config);

        pipeline.run(&request(&dir)).unwrap();

        let events: Vec<ProgressEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].segment_file, "temp_convert_0000.wav");
        assert!((events[0].percent - 33.33).abs() < 1e-9);
        assert!((events[1].percent - 66.67).abs() < 1e-9);
        assert!((events[2].percent - 100.0).abs() < 1e-9);
        assert_eq!(events[2].processed, 3);
        assert_eq!(events[2].total, 3);
    }

    #[test]
    fn run_tolerates_stale_working_directories() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 1.5);
        let config = test_config(&dir);

        // Leftovers from a "previous run" with more segments
        let input_dir = config.work_dir.join("input");
        fs::create_dir_all(&input_dir).unwrap();
        for i in 0..7 {
            fs::write(input_dir.join(format!("temp_convert_{:04}.wav", i)), b"stale").unwrap();
        }

        let context = ModelContext::new(Arc::new(MockConverter::new("mock")));
        let mut pipeline = Pipeline::new(context, config);
        let result = pipeline.run(&request(&dir)).unwrap();

        // Only this run's 2 segments were converted and merged
        assert_eq!(result.diagnostics.len(), 2);
    }

    #[test]
    fn second_run_overwrites_the_first_runs_output() {
        let dir = TempDir::new().unwrap();
        write_recording(&dir.path().join("in.wav"), 0.5);
        let context = ModelContext::new(Arc::new(MockConverter::new("mock")));
        let mut pipeline = Pipeline::new(context, test_config(&dir));

        let first = pipeline.run(&request(&dir)).unwrap();
        let second = pipeline.run(&request(&dir)).unwrap();

        assert_eq!(first.output_path, second.output_path);
        assert_eq!(pipeline.state(), PipelineState::Reported);
    }
}
