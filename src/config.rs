//! Configuration types for unwatermark

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::source::{MEDIA_TYPE_JPEG, MEDIA_TYPE_PNG, MEDIA_TYPE_WEBP};

/// Largest accepted source file (20 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Intake validation rules
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Media types admitted into a batch (default: JPEG, PNG, WebP)
    #[serde(default = "default_allowed_media_types")]
    pub allowed_media_types: Vec<String>,

    /// Maximum source size in bytes, inclusive (default: 20 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            allowed_media_types: default_allowed_media_types(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Compression used for bundle archive entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveCompression {
    /// Store entries as-is; PNG data is already compressed (default)
    #[default]
    Stored,
    /// Deflate entries
    Deflated,
}

impl From<ArchiveCompression> for zip::CompressionMethod {
    fn from(value: ArchiveCompression) -> Self {
        match value {
            ArchiveCompression::Stored => zip::CompressionMethod::Stored,
            ArchiveCompression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// File collision handling strategy when saving downloads to disk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Skip the file, keep existing
    Skip,
}

/// Export naming and output settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Prefix for artifact and bundle names (default: "unwatermarked_")
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Bundle entry compression (default: stored)
    #[serde(default)]
    pub compression: ArchiveCompression,

    /// Directory used by [`crate::Download::save`] (default: "output")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// What to do when a saved download's name is already taken
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            compression: ArchiveCompression::default(),
            output_dir: default_output_dir(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// Main configuration for [`crate::Unwatermarker`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Intake validation rules
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Export naming and output
    #[serde(default)]
    pub export: ExportConfig,

    /// Capacity of the event broadcast channel (default: 1000)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intake: IntakeConfig::default(),
            export: ExportConfig::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file and validate it
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(?path, "loaded configuration");
        Ok(config)
    }

    /// Check settings that would make the pipeline unusable
    pub fn validate(&self) -> Result<()> {
        if self.intake.allowed_media_types.is_empty() {
            return Err(config_error(
                "at least one media type must be allowed",
                "allowed_media_types",
            ));
        }
        if self.intake.max_file_size == 0 {
            return Err(config_error(
                "max_file_size must be greater than zero",
                "max_file_size",
            ));
        }
        if self.export.file_prefix.contains(['/', '\\']) {
            return Err(config_error(
                "file_prefix must not contain path separators",
                "file_prefix",
            ));
        }
        if self.event_buffer == 0 {
            return Err(config_error(
                "event_buffer must be greater than zero",
                "event_buffer",
            ));
        }
        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

// Default value functions
fn default_allowed_media_types() -> Vec<String> {
    [MEDIA_TYPE_JPEG, MEDIA_TYPE_PNG, MEDIA_TYPE_WEBP]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_file_prefix() -> String {
    "unwatermarked_".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_event_buffer() -> usize {
    1000
}
