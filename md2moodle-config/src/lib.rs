//! Shared configuration loader for md2moodle.
//!
//! `defaults/md2moodle.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`QuizConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use md2moodle_core::highlight::PygmentizeOptions;
use md2moodle_core::moodle_xml::{AnswerNumbering, XmlOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/md2moodle.default.toml");

/// Name of the per-directory configuration file picked up automatically.
pub const LOCAL_CONFIG_FILE: &str = "md2moodle.toml";

/// Top-level configuration consumed by md2moodle applications.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    pub output: OutputConfig,
    pub code_image: CodeImageConfig,
}

/// Where and how question banks are written.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub answer_numbering: AnswerNumbering,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl From<&OutputConfig> for XmlOptions {
    fn from(config: &OutputConfig) -> Self {
        XmlOptions::new(config.answer_numbering)
    }
}

/// Mirrors the knobs exposed by the pygmentize code renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeImageConfig {
    pub font_size: u32,
    pub line_numbers: bool,
    pub fallback_lexer: String,
}

impl From<CodeImageConfig> for PygmentizeOptions {
    fn from(config: CodeImageConfig) -> Self {
        PygmentizeOptions {
            font_size: config.font_size,
            line_numbers: config.line_numbers,
            fallback_lexer: config.fallback_lexer,
        }
    }
}

impl From<&CodeImageConfig> for PygmentizeOptions {
    fn from(config: &CodeImageConfig) -> Self {
        PygmentizeOptions {
            font_size: config.font_size,
            line_numbers: config.line_numbers,
            fallback_lexer: config.fallback_lexer.clone(),
        }
    }
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
    pub fn build(self) -> Result<QuizConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<QuizConfig, ConfigError> {
    Loader::new().build()
}
