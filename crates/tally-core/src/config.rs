//! Run configuration.
//!
//! Loaded from YAML, then optionally overridden from the environment:
//!
//! ```yaml
//! dry_run: false
//! test_prefix: test
//! repeat: 1
//! trace_events: false
//! ```

use crate::decorator::RepeatDecorator;
use crate::selector::{DEFAULT_TEST_PREFIX, TestSelector};
use crate::trace::TracingDecorator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_proto::EventSink;
use thiserror::Error;
use tracing::debug;

/// Overrides `dry_run` when set to a boolean-like value.
pub const DRY_RUN_ENV_VAR: &str = "TALLY_DRY_RUN";

/// Overrides `test_prefix` when set.
pub const TEST_PREFIX_ENV_VAR: &str = "TALLY_TEST_PREFIX";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for a test run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TallyConfig {
    /// Fire structure events without running test bodies.
    pub dry_run: bool,

    /// Methods whose names start with this prefix (any ASCII case) are tests.
    pub test_prefix: String,

    /// Number of times each test method is invoked.
    pub repeat: u32,

    /// Log every sink event through `tracing`.
    pub trace_events: bool,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            test_prefix: DEFAULT_TEST_PREFIX.to_string(),
            repeat: 1,
            trace_events: false,
        }
    }
}

impl TallyConfig {
    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or unknown keys and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`TallyConfig::from_yaml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_yaml_str(&contents)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is malformed or leaves
    /// the config invalid.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`TallyConfig::apply_env_overrides`].
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DRY_RUN_ENV_VAR) {
            self.dry_run = parse_bool(&value).ok_or_else(|| {
                ConfigError::Invalid(format!("{DRY_RUN_ENV_VAR} must be a boolean, got {value:?}"))
            })?;
            debug!(dry_run = self.dry_run, "dry run overridden from environment");
        }
        if let Some(prefix) = lookup(TEST_PREFIX_ENV_VAR) {
            debug!(%prefix, "test prefix overridden from environment");
            self.test_prefix = prefix;
        }
        self.validate()
    }

    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero `repeat` or an empty
    /// `test_prefix`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat == 0 {
            return Err(ConfigError::Invalid("repeat must be at least 1".to_string()));
        }
        if self.test_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("test_prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// Selector matching the configured prefix.
    pub fn selector(&self) -> TestSelector {
        TestSelector::prefix(self.test_prefix.clone())
    }

    /// Wraps `sink` in the decorators this config asks for and applies the
    /// dry-run flag.
    ///
    /// Repetition is the outermost layer, so each repeated invocation still
    /// passes through the tracing layer.
    pub fn wrap<'a, S>(&self, sink: S) -> Box<dyn EventSink + 'a>
    where
        S: EventSink + 'a,
    {
        let mut wrapped: Box<dyn EventSink + 'a> = if self.trace_events {
            Box::new(TracingDecorator::new(sink))
        } else {
            Box::new(sink)
        };
        if self.repeat > 1 {
            wrapped = Box::new(RepeatDecorator::new(wrapped, self.repeat));
        }
        wrapped.set_dry_run(self.dry_run);
        wrapped
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
