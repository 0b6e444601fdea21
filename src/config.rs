//! Engine configuration loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid configuration:
//!
//! ```rust
//! use rust_vm_inventory::config::EngineConfig;
//!
//! let cfg = EngineConfig::from_json_str(r#"{ "output_dir": "/srv/inventory/out" }"#).unwrap();
//! assert_eq!(cfg.upload_dir.to_str(), Some("input/"));
//! assert!(cfg.is_allowed_file("export.XLSX"));
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::artifact::ArtifactNaming;
use crate::error::ConversionResult;
use crate::normalize::DuplicatePolicy;
use crate::pipeline::PipelineOptions;

fn default_upload_dir() -> PathBuf {
    PathBuf::from("input/")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/")
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["xls".to_string(), "xlsx".to_string()]
}

/// Where uploads live, where artifacts go and how conversions behave.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Directory uploaded workbooks are stored in.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Directory intermediate artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Accepted upload extensions, compared case-insensitively.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default)]
    pub artifact_naming: ArtifactNaming,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
            allowed_extensions: default_allowed_extensions(),
            artifact_naming: ArtifactNaming::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> ConversionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_path(path: impl AsRef<Path>) -> ConversionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pipeline options for this configuration, without an observer.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            artifact_naming: self.artifact_naming,
            duplicate_policy: self.duplicate_policy,
            ..Default::default()
        }
    }

    /// Returns `true` if `file_name` has an extension listed in `allowed_extensions`.
    pub fn is_allowed_file(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}
