//! Shared configuration loader for the quire toolchain.
//!
//! `defaults/quire.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`QuireConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use quire_babel::editor::SessionOptions;
use quire_babel::upload::{CaptureOptions, CursorPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/quire.default.toml");

/// Name of the optional per-project configuration file.
pub const PROJECT_CONFIG: &str = "quire.toml";

/// Top-level configuration consumed by quire applications.
#[derive(Debug, Clone, Deserialize)]
pub struct QuireConfig {
    pub session: SessionConfig,
    pub images: ImagesConfig,
    pub upload: UploadConfig,
}

/// Editor session knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub debounce_ms: u64,
    pub field: String,
    pub placeholder: String,
}

impl From<&SessionConfig> for SessionOptions {
    fn from(config: &SessionConfig) -> Self {
        SessionOptions {
            debounce: Duration::from_millis(config.debounce_ms),
            field: config.field.clone(),
            placeholder: config.placeholder.clone(),
        }
    }
}

impl From<SessionConfig> for SessionOptions {
    fn from(config: SessionConfig) -> Self {
        SessionOptions {
            debounce: Duration::from_millis(config.debounce_ms),
            field: config.field,
            placeholder: config.placeholder,
        }
    }
}

/// Image capture filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub accept: Vec<String>,
    /// `0` disables the size limit
    pub max_bytes: usize,
    pub cursor_policy: CursorPolicy,
}

impl From<&ImagesConfig> for CaptureOptions {
    fn from(config: &ImagesConfig) -> Self {
        CaptureOptions {
            accept: config.accept.clone(),
            max_bytes: (config.max_bytes > 0).then_some(config.max_bytes),
            cursor_policy: config.cursor_policy,
        }
    }
}

/// Where the CLI session runner stores uploads.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub url_prefix: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<QuireConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<QuireConfig, ConfigError> {
    Loader::new().build()
}
