use crate::columns::{CanonicalField, ColumnMap, UnknownField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "demandscope.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, #[source] source: io::Error },
    #[error("config {path} is not valid JSON: {source}")]
    Json { path: PathBuf, #[source] source: serde_json::Error },
    #[error("config {path}: column label {label:?} maps to {source}")]
    Column { path: PathBuf, label: String, #[source] source: UnknownField },
    #[error("config {path}: keep_snapshots must be at least 1")]
    KeepSnapshots { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root for the `processed/` and `dashboard/` snapshot directories.
    pub data_dir: PathBuf,
    /// Spreadsheet export used when `run` gets no `--input`.
    pub input: Option<PathBuf>,
    /// Published snapshots to retain per store; unlimited when unset.
    pub keep_snapshots: Option<usize>,
    /// Extra header label → canonical field name, for reworded questions.
    pub extra_columns: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            input: None,
            keep_snapshots: None,
            extra_columns: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?;
        if cfg.keep_snapshots == Some(0) {
            return Err(ConfigError::KeepSnapshots { path: path.to_path_buf() });
        }
        // extra_columns must name known fields
        cfg.column_map()
            .map_err(|(label, source)| ConfigError::Column { path: path.to_path_buf(), label, source })?;
        Ok(cfg)
    }

    pub fn column_map(&self) -> Result<ColumnMap, (String, UnknownField)> {
        let mut map = ColumnMap::default();
        for (label, field) in &self.extra_columns {
            let field: CanonicalField = field.parse().map_err(|e| (label.clone(), e))?;
            map.insert(label, field);
        }
        Ok(map)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn dashboard_dir(&self) -> PathBuf {
        self.data_dir.join("dashboard")
    }
}
