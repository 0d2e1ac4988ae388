use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use focusex_core::ConditionLabel;
use serde::{Deserialize, Serialize};

use crate::store::NamingPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Session timeline and output settings. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub welcome_ms: u64,
    pub baseline_ms: u64,
    pub pre_trial_ms: u64,
    pub task_ms: u64,
    pub reading_instructions_ms: u64,
    pub task_instructions_ms: u64,
    pub problem_interval_ms: u64,
    pub self_report_prompt_ms: u64,
    pub self_report_timeout_ms: u64,
    pub break_ms: u64,
    pub farewell_ms: u64,
    pub audio_clip: PathBuf,
    pub output_dir: PathBuf,
    pub naming: NamingPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            welcome_ms: 4_000,
            baseline_ms: 30_000,
            pre_trial_ms: 10_000,
            task_ms: 60_000,
            reading_instructions_ms: 15_000,
            task_instructions_ms: 5_000,
            problem_interval_ms: 5_000,
            self_report_prompt_ms: 2_000,
            self_report_timeout_ms: 10_000,
            break_ms: 10_000,
            farewell_ms: 4_000,
            audio_clip: PathBuf::from("lofi_jazz_background_music.wav"),
            output_dir: PathBuf::from("."),
            naming: NamingPolicy::Timestamp,
        }
    }
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SessionConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no file exists at `path`.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.problem_interval_ms == 0 {
            return Err(ConfigError::Invalid("problem_interval_ms must be positive"));
        }
        if self.task_ms == 0 {
            return Err(ConfigError::Invalid("task_ms must be positive"));
        }
        Ok(())
    }

    pub fn instructions_ms(&self, label: ConditionLabel) -> u64 {
        match label {
            ConditionLabel::HighAttention => self.reading_instructions_ms,
            ConditionLabel::LowAttention | ConditionLabel::Fatigue => self.task_instructions_ms,
        }
    }

    /// Number of arithmetic problems that fit in the task window.
    pub fn problem_count(&self) -> u64 {
        (self.task_ms / self.problem_interval_ms.max(1)).max(1)
    }

    /// Stimulus time of a condition's task window.
    pub fn stimulus_ms(&self, label: ConditionLabel) -> u64 {
        match label {
            ConditionLabel::Fatigue => self.problem_count() * self.problem_interval_ms,
            _ => self.task_ms,
        }
    }

    /// Longest possible session over `conditions`: every wait runs to its
    /// full length and no self-report key is pressed.
    pub fn planned_duration<'a, I>(&self, conditions: I) -> Duration
    where
        I: IntoIterator<Item = &'a ConditionLabel>,
    {
        let per_condition: u64 = conditions
            .into_iter()
            .map(|label| {
                self.baseline_ms
                    + self.pre_trial_ms
                    + self.instructions_ms(*label)
                    + self.stimulus_ms(*label)
                    + self.self_report_prompt_ms
                    + self.self_report_timeout_ms
                    + self.break_ms
            })
            .sum();
        Duration::from_millis(self.welcome_ms + per_condition + self.farewell_ms)
    }
}
