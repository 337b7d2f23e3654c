//! TOML configuration for botwatch.
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! working setup reading `data/botwatch.db`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::matrix::DEFAULT_MAX_ROWS;
use crate::records::project::DEFAULT_CACHE_CAPACITY;
use crate::records::{NormalizeOptions, UnknownStatusPolicy};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BOTWATCH_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "botwatch.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub projects: ProjectsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DashboardConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded botwatch configuration");
        Ok(config)
    }

    /// Resolve configuration, in order:
    /// 1. `explicit` (errors are returned, not skipped).
    /// 2. The path in `BOTWATCH_CONFIG`.
    /// 3. `./botwatch.toml`.
    /// 4. Compiled-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "BOTWATCH_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            return Self::load(local);
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            unknown_status: self.matrix.unknown_status,
        }
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where execution records come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// SQLite database file or JSON array file.
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Sqlite,
            path: PathBuf::from("data/botwatch.db"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Sqlite,
    Json,
}

// ---------------------------------------------------------------------------
// Mapping / matrix / projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// JSON file mapping flow names to projects. A missing file means "no mapping".
    pub path: PathBuf,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("flow_mapping.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub max_rows: usize,
    pub unknown_status: UnknownStatusPolicy,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            unknown_status: UnknownStatusPolicy::Keep,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
    pub cache_capacity: usize,
    /// Derive projects from flow names when no mapping file is available.
    pub infer_without_mapping: bool,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            infer_without_mapping: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Server / logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}
