//! Grid configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::column::{ColumnKind, ColumnSpec};
use crate::domain::entities::request::{
    RequestParams, DEFAULT_DISPLAY_LENGTH, MAX_DIRECTIVE_SLOTS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Page length used when the client omits `iDisplayLength`.
    #[serde(default = "default_display_length")]
    pub default_display_length: i64,

    /// Upper bound on `iSortingCols` / `iColumns` scanning.
    #[serde(default = "default_max_directive_slots")]
    pub max_directive_slots: i64,

    /// Row fields emitted as trailing named metadata, in this order.
    #[serde(default = "default_reserved_keys")]
    pub reserved_keys: Vec<String>,

    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

/// Declarative form of a [`ColumnSpec`]; hooks can only be attached in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,

    /// Source expression, e.g. `"customers.name AS name"`.
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default = "default_true")]
    pub sortable: bool,

    #[serde(default)]
    pub searchable: bool,

    #[serde(default)]
    pub computed: bool,
}

fn default_display_length() -> i64 {
    DEFAULT_DISPLAY_LENGTH
}

fn default_max_directive_slots() -> i64 {
    MAX_DIRECTIVE_SLOTS
}

fn default_reserved_keys() -> Vec<String> {
    vec!["DT_RowId".to_string(), "DT_RowClass".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            default_display_length: default_display_length(),
            max_directive_slots: default_max_directive_slots(),
            reserved_keys: default_reserved_keys(),
            columns: Vec::new(),
        }
    }
}

impl GridConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gridwire").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reads the platform config file when present, defaults otherwise.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn column_specs(&self) -> Vec<ColumnSpec> {
        self.columns.iter().map(ColumnConfig::to_spec).collect()
    }

    pub fn request<I, K, V>(&self, params: I) -> RequestParams
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestParams::with_limits(params, self.default_display_length, self.max_directive_slots)
    }
}

impl ColumnConfig {
    pub fn to_spec(&self) -> ColumnSpec {
        let column = match &self.source {
            Some(source) => ColumnSpec::aliased(self.name.as_str(), source),
            None => ColumnSpec::new(self.name.as_str()),
        };

        if self.computed {
            return column.kind(ColumnKind::Computed);
        }
        column.sortable(self.sortable).searchable(self.searchable)
    }
}
