use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use sonoshift::audio::wav;
use sonoshift::cli::{Cli, Commands, ConfigAction};
use sonoshift::config::Config;
use sonoshift::convert::{PitchShiftConverter, VoiceConverter};
use sonoshift::pipeline::{
    ConversionRequest, ModelContext, Pipeline, PipelineConfig, ProgressEvent, Rating,
    rate_deviation,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            upload,
            mic,
            speaker,
            transpose,
            segment_seconds,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_convert(
                config,
                upload,
                mic,
                speaker,
                transpose,
                segment_seconds,
                cli.quiet,
                cli.verbose,
            )?;
        }
        Commands::Speakers => {
            let config = load_config(cli.config.as_deref())?;
            let context = build_model(&config);
            for (index, name) in context.registry.names().iter().enumerate() {
                println!("{:3}  {}", index, name);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = load_config(cli.config.as_deref())?;
                print!("{}", toml::to_string(&config)?);
            }
            ConfigAction::Path => {
                let path = cli
                    .config
                    .unwrap_or_else(Config::default_path);
                println!("{}", path.display());
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    Ok(config.with_env_overrides())
}

/// Wrap the configured model. The neural backend is an external
/// collaborator; this demo binary ships with the resample-based
/// reference converter.
fn build_model(config: &Config) -> ModelContext {
    let converter = PitchShiftConverter::new(&config.model.name)
        .with_speakers(config.model.speakers.clone());
    ModelContext::new(Arc::new(converter) as Arc<dyn VoiceConverter>)
}

#[allow(clippy::too_many_arguments)]
fn run_convert(
    config: Config,
    upload: Option<PathBuf>,
    mic: Option<PathBuf>,
    speaker: Option<String>,
    transpose: i32,
    segment_seconds: Option<f64>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    let context = build_model(&config);
    let speaker = speaker.unwrap_or_else(|| context.registry.names()[0].clone());
    let request = ConversionRequest {
        speaker,
        transposition: transpose,
        upload,
        microphone: mic,
    };

    if verbose >= 1 {
        eprintln!(
            "sonoshift: model {} | speaker {} | transposition {:+}",
            context.converter.model_name(),
            request.speaker,
            request.transposition
        );
    }

    warn_if_long_input(&config, &request, quiet);

    let (event_tx, event_rx) = crossbeam_channel::unbounded::<ProgressEvent>();
    let printer = (!quiet).then(|| {
        thread::spawn(move || {
            for event in event_rx {
                print_progress(&event);
            }
        })
    });

    let pipeline_config = PipelineConfig {
        max_segment_seconds: segment_seconds.unwrap_or(config.segmenter.max_segment_seconds),
        work_dir: config.paths.work_dir.clone(),
        results_dir: config.paths.results_dir.clone(),
        tracker: config.pitch.tracker(),
        event_tx: Some(event_tx),
        ..PipelineConfig::default()
    };

    let mut pipeline = Pipeline::new(context, pipeline_config);
    let outcome = pipeline.run(&request);
    // Dropping the pipeline closes the event channel so the printer exits.
    drop(pipeline);
    if let Some(handle) = printer
        && handle.join().is_err()
    {
        eprintln!("sonoshift: progress printer thread panicked");
    }

    match outcome {
        Ok(result) => {
            println!("{}", result.report);
            println!(
                "{} {}",
                "Merged output:".green().bold(),
                result.output_path.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "sonoshift:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Long inputs still convert; the demo just flags that quality guidance
/// assumed uploads under the advisory cap.
fn warn_if_long_input(config: &Config, request: &ConversionRequest, quiet: bool) {
    if quiet {
        return;
    }
    let Ok(source) = request.source() else {
        return;
    };
    let Ok(recording) = wav::read_mono(source) else {
        return;
    };
    let cap = config.segmenter.advisory_max_input_secs;
    if recording.duration_secs() > cap {
        eprintln!(
            "{} input is {:.1}s; recordings over {:.0}s are discouraged",
            "warning:".yellow().bold(),
            recording.duration_secs(),
            cap
        );
    }
}

fn print_progress(event: &ProgressEvent) {
    let stats = format!(
        "mis:{:.3} var:{:.3}",
        event.error.mean_deviation, event.error.variance
    );
    let line = format!("{}: {:.2}%  {}", event.segment_file, event.percent, stats);
    match rate_deviation(event.error.mean_deviation) {
        Rating::Excellent => eprintln!("{}", line.green()),
        Rating::Acceptable => eprintln!("{}", line),
        Rating::Borderline => eprintln!("{}", line.yellow()),
        Rating::Poor => eprintln!("{}", line.red()),
    }
}
