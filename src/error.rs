//! Error types for sonoshift.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonoshiftError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Request errors
    #[error("No audio provided: upload a file or record from the microphone")]
    NoAudioProvided,

    #[error("Unknown speaker: {name}")]
    UnknownSpeaker { name: String },

    // Audio decode errors
    #[error("Failed to decode audio {path}: {message}")]
    InputDecode { path: String, message: String },

    // Conversion errors
    #[error("Voice conversion failed on {segment}: {message}")]
    Inference { segment: String, message: String },

    #[error("No converted segments to merge")]
    NothingToMerge,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SonoshiftError>;
