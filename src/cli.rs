//! Command-line interface for sonoshift
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Singing-voice conversion demo
#[derive(Parser, Debug)]
#[command(
    name = "sonoshift",
    version,
    about = "Convert a singer's voice into a target speaker's timbre"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: run details)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a recording into the target speaker's voice
    Convert {
        /// Uploaded audio file (takes precedence over --mic)
        #[arg(long, value_name = "PATH")]
        upload: Option<PathBuf>,

        /// Microphone recording file
        #[arg(long, value_name = "PATH")]
        mic: Option<PathBuf>,

        /// Target speaker display name (default: the model's first speaker)
        #[arg(short, long, value_name = "NAME")]
        speaker: Option<String>,

        /// Transposition in semitones; one octave up is 12
        #[arg(
            short,
            long,
            value_name = "SEMITONES",
            default_value = "0",
            allow_negative_numbers = true
        )]
        transpose: i32,

        /// Maximum segment duration in seconds
        #[arg(long, value_name = "SECONDS")]
        segment_seconds: Option<f64>,
    },

    /// List the loaded model's speakers
    Speakers,

    /// Show or locate the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
