use crate::defaults;
use crate::pitch::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub segmenter: SegmenterConfig,
    pub pitch: PitchConfig,
    pub paths: PathsConfig,
}

/// Conversion model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Display name of the loaded model.
    pub name: String,
    /// Speaker display names in embedding-table order. Empty means the
    /// model declares none and gets a single synthetic "0" entry.
    pub speakers: Vec<String>,
}

/// Segmenter configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterConfig {
    pub max_segment_seconds: f64,
    /// Inputs longer than this only trigger a warning, not a rejection.
    pub advisory_max_input_secs: f64,
}

/// Pitch tracker configuration for the deviation diagnostic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PitchConfig {
    pub hop_ms: u32,
    pub min_hz: f32,
    pub max_hz: f32,
    pub voicing_rms: f32,
    pub voicing_clarity: f32,
}

/// Working and result directory configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub work_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "svc-reference".to_string(),
            speakers: Vec::new(),
        }
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_segment_seconds: defaults::SEGMENT_SECONDS,
            advisory_max_input_secs: defaults::ADVISORY_MAX_INPUT_SECS,
        }
    }
}

impl Default for PitchConfig {
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

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(defaults::WORK_DIR),
            results_dir: PathBuf::from(defaults::RESULTS_DIR),
        }
    }
}

impl PitchConfig {
    /// Translate into the pitch tracker's own configuration type.
    pub fn tracker(&self) -> TrackerConfig {
        TrackerConfig {
            hop_ms: self.hop_ms,
            min_hz: self.min_hz,
            max_hz: self.max_hz,
            voicing_rms: self.voicing_rms,
            voicing_clarity: self.voicing_clarity,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SONOSHIFT_WORK_DIR → paths.work_dir
    /// - SONOSHIFT_RESULTS_DIR → paths.results_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("SONOSHIFT_WORK_DIR")
            && !dir.is_empty()
        {
            self.paths.work_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("SONOSHIFT_RESULTS_DIR")
            && !dir.is_empty()
        {
            self.paths.results_dir = PathBuf::from(dir);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/sonoshift/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sonoshift")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_sonoshift_env() {
        remove_env("SONOSHIFT_WORK_DIR");
        remove_env("SONOSHIFT_RESULTS_DIR");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.model.name, "svc-reference");
        assert!(config.model.speakers.is_empty());

        assert_eq!(config.segmenter.max_segment_seconds, 20.0);
        assert_eq!(config.segmenter.advisory_max_input_secs, 45.0);

        assert_eq!(config.pitch.hop_ms, 25);
        assert_eq!(config.pitch.min_hz, 60.0);
        assert_eq!(config.pitch.max_hz, 1000.0);

        assert_eq!(config.paths.work_dir, PathBuf::from("wav_temp"));
        assert_eq!(config.paths.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [model]
            name = "svc-f0"
            speakers = ["alto", "tenor"]

            [segmenter]
            max_segment_seconds = 10.0

            [paths]
            work_dir = "/tmp/sonoshift-work"
        "#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.model.name, "svc-f0");
        assert_eq!(config.model.speakers, vec!["alto", "tenor"]);
        assert_eq!(config.segmenter.max_segment_seconds, 10.0);
        // Unspecified sections keep defaults
        assert_eq!(config.segmenter.advisory_max_input_secs, 45.0);
        assert_eq!(config.pitch.hop_ms, 25);
        assert_eq!(config.paths.work_dir, PathBuf::from("/tmp/sonoshift-work"));
        assert_eq!(config.paths.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_load_invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[model\nname = broken").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file_returns_defaults() {
        let config = Config::load_or_default(Path::new("/does/not/exist.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not = valid = toml").unwrap();

        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides_paths() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_sonoshift_env();
        set_env("SONOSHIFT_WORK_DIR", "/tmp/override-work");
        set_env("SONOSHIFT_RESULTS_DIR", "/tmp/override-results");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.paths.work_dir, PathBuf::from("/tmp/override-work"));
        assert_eq!(
            config.paths.results_dir,
            PathBuf::from("/tmp/override-results")
        );
        clear_sonoshift_env();
    }

    #[test]
    fn test_env_overrides_ignore_empty_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_sonoshift_env();
        set_env("SONOSHIFT_WORK_DIR", "");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.paths.work_dir, PathBuf::from("wav_temp"));
        clear_sonoshift_env();
    }

    #[test]
    fn test_pitch_config_translates_to_tracker() {
        let pitch = PitchConfig {
            hop_ms: 10,
            min_hz: 80.0,
            max_hz: 500.0,
            voicing_rms: 0.05,
            voicing_clarity: 0.7,
        };
        let tracker = pitch.tracker();
        assert_eq!(tracker.hop_ms, 10);
        assert_eq!(tracker.min_hz, 80.0);
        assert_eq!(tracker.max_hz, 500.0);
        assert_eq!(tracker.voicing_rms, 0.05);
        assert_eq!(tracker.voicing_clarity, 0.7);
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let config = Config {
            model: ModelConfig {
                name: "svc-f0".to_string(),
                speakers: vec!["a".to_string(), "b".to_string()],
            },
            ..Config::default()
        };

        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_path_ends_with_crate_config() {
        let path = Config::default_path();
        assert!(path.ends_with("sonoshift/config.toml"));
    }
}
