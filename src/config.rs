//! Run configuration: where the credentials live, which spreadsheet range to
//! read and which table to append to.
//!
//! Values come from an optional YAML file (path in `SHEETSINK_CONFIG`) with
//! per-field environment overrides, so the scheduler can drive everything
//! through the environment without shipping a file.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bq::TableRef;
use crate::error::{PipelineError, Result};

const CONFIG_PATH_VAR: &str = "SHEETSINK_CONFIG";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Service account key file (JSON).
    pub credentials_path: PathBuf,
    /// Source document identifier.
    pub spreadsheet_id: String,
    /// Named range to read in full, typically a sheet name.
    pub range: String,
    /// Destination as `project.dataset.table`.
    pub table_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            credentials_path: PathBuf::from("google_service_account_key.json"),
            spreadsheet_id: String::new(),
            range: "Sheet1".to_string(),
            table_id: String::new(),
        }
    }
}

impl Config {
    /// File (if configured) then environment, then validation.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Config::from_file(Path::new(&path))?,
            Err(_) => Config::default(),
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("reading {}: {e}", path.display())))?;
        Config::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| PipelineError::Config(e.to_string()))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = env::var("SHEETSINK_CREDENTIALS") {
            self.credentials_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("SHEETSINK_SPREADSHEET_ID") {
            self.spreadsheet_id = v;
        }
        if let Ok(v) = env::var("SHEETSINK_RANGE") {
            self.range = v;
        }
        if let Ok(v) = env::var("SHEETSINK_TABLE_ID") {
            self.table_id = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.is_empty() {
            return Err(PipelineError::Config("spreadsheet_id is not set".into()));
        }
        if self.range.is_empty() {
            return Err(PipelineError::Config("range is not set".into()));
        }
        TableRef::parse(&self.table_id)?;
        Ok(())
    }
}
