//! Configuration loading and hierarchy management
//!
//! Precedence follows Env > File > Defaults; the CLI applies its own
//! overrides on top of the loaded value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClipmillError, ClipmillResult};

/// Hard upper bound on per-clip length, applied regardless of configuration
pub const MAX_CLIP_SECONDS_HARD_CAP: u32 = 180;

/// Recognized configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Caps per-clip and custom-range length, in seconds
    pub max_clip_seconds: u32,
    /// Caps the clip count selector
    pub max_clips: u32,
    /// Inline-vs-hosted cutoff: strictly below goes inline
    pub size_threshold_bytes: u64,
    /// Bound on concurrently running jobs
    pub worker_pool_size: usize,
    /// Attempts per segment extraction
    pub extract_retry_attempts: u32,
    /// Deadline for every external call, in seconds
    pub per_call_timeout_secs: u64,
    /// Base directory for per-job temp workspaces
    pub temp_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_clip_seconds: 180,
            max_clips: 5,
            size_threshold_bytes: 20 * 1024 * 1024,
            worker_pool_size: 4,
            extract_retry_attempts: 3,
            per_call_timeout_secs: 120,
            temp_dir: PathBuf::from("tmp_clips"),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then an optional TOML file, then
    /// `CLIPMILL_*` environment variable overrides.
    pub fn load(file: Option<&Path>) -> ClipmillResult<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new("clipmill.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> ClipmillResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClipmillError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ClipmillError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `CLIPMILL_*` environment variable overrides
    fn apply_env_overrides(&mut self) {
        env_override("CLIPMILL_MAX_CLIP_SECONDS", &mut self.max_clip_seconds);
        env_override("CLIPMILL_MAX_CLIPS", &mut self.max_clips);
        env_override("CLIPMILL_SIZE_THRESHOLD_BYTES", &mut self.size_threshold_bytes);
        env_override("CLIPMILL_WORKER_POOL_SIZE", &mut self.worker_pool_size);
        env_override(
            "CLIPMILL_EXTRACT_RETRY_ATTEMPTS",
            &mut self.extract_retry_attempts,
        );
        env_override("CLIPMILL_PER_CALL_TIMEOUT_SECS", &mut self.per_call_timeout_secs);
        if let Ok(value) = std::env::var("CLIPMILL_TEMP_DIR") {
            info!("Environment override: temp_dir = {}", value);
            self.temp_dir = PathBuf::from(value);
        }
    }

    /// Validate and clamp configured values
    pub fn validate(&mut self) -> ClipmillResult<()> {
        if self.max_clip_seconds == 0 {
            return Err(ClipmillError::Config(
                "max_clip_seconds must be positive".to_string(),
            ));
        }
        if self.max_clips == 0 {
            return Err(ClipmillError::Config("max_clips must be positive".to_string()));
        }
        if self.worker_pool_size == 0 {
            return Err(ClipmillError::Config(
                "worker_pool_size must be positive".to_string(),
            ));
        }
        if self.extract_retry_attempts == 0 {
            return Err(ClipmillError::Config(
                "extract_retry_attempts must be positive".to_string(),
            ));
        }
        if self.per_call_timeout_secs == 0 {
            return Err(ClipmillError::Config(
                "per_call_timeout_secs must be positive".to_string(),
            ));
        }
        if self.max_clip_seconds > MAX_CLIP_SECONDS_HARD_CAP {
            info!(
                "Clamping max_clip_seconds from {} to {}",
                self.max_clip_seconds, MAX_CLIP_SECONDS_HARD_CAP
            );
            self.max_clip_seconds = MAX_CLIP_SECONDS_HARD_CAP;
        }
        Ok(())
    }

    /// Deadline applied to every external call
    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_secs(self.per_call_timeout_secs)
    }
}

fn env_override<T: std::str::FromStr + std::fmt::Display>(var: &str, slot: &mut T) {
    if let Ok(value) = std::env::var(var) {
        if let Ok(parsed) = value.parse::<T>() {
            info!("Environment override: {} = {}", var, parsed);
            *slot = parsed;
        } else {
            tracing::warn!("Ignoring unparseable {} = {:?}", var, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_clip_seconds, 180);
        assert_eq!(config.max_clips, 5);
        assert_eq!(config.size_threshold_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn test_clamps_max_clip_seconds() {
        let mut config = Config {
            max_clip_seconds: 600,
            ..Config::default()
        };
        config.validate().unwrap();
        assert_eq!(config.max_clip_seconds, MAX_CLIP_SECONDS_HARD_CAP);
    }

    #[test]
    fn test_rejects_zero_values() {
        let mut config = Config {
            max_clips: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipmill.toml");
        std::fs::write(&path, "max_clips = 3\nworker_pool_size = 2\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.max_clips, 3);
        assert_eq!(config.worker_pool_size, 2);
        // Unspecified keys keep their defaults
        assert_eq!(config.max_clip_seconds, 180);
    }
}
