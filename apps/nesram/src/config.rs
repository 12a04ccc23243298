//! # Application Configuration
//!
//! Settings are resolved in layers, each overriding the last:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config nesram.toml`)
//! 3. Environment variables
//! 4. CLI flags (applied by the caller)
//!
//! ## Environment Variables
//!
//! - `RAMDISK_DIR`: directory holding the catalog, snapshot, and bestiary
//! - `NES_API_HOST`: bind host
//! - `NES_API_PORT`: bind port (an unparsable value keeps the previous port)
//! - `NESRAM_CORS_ORIGINS`: comma-separated origins, or `*` for all

use nesram_core::CodecError;
use nesram_core::DataPaths;
use nesram_core::primitives::{BESTIARY_FILE, CATALOG_FILE, DEFAULT_RAMDISK_DIR, SNAPSHOT_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the data files.
    pub ramdisk_dir: PathBuf,
    /// Bind host for the HTTP server.
    pub host: String,
    /// Bind port for the HTTP server.
    pub port: u16,
    /// Catalog file name, relative to `ramdisk_dir` unless absolute.
    pub catalog_file: PathBuf,
    /// Snapshot file name, relative to `ramdisk_dir` unless absolute.
    pub snapshot_file: PathBuf,
    /// Bestiary file name, relative to `ramdisk_dir` unless absolute.
    pub bestiary_file: PathBuf,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ramdisk_dir: PathBuf::from(DEFAULT_RAMDISK_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            catalog_file: PathBuf::from(CATALOG_FILE),
            snapshot_file: PathBuf::from(SNAPSHOT_FILE),
            bestiary_file: PathBuf::from(BESTIARY_FILE),
            cors_origins: None,
        }
    }
}

impl AppConfig {
    /// Parse configuration from a TOML string. Missing keys keep defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, CodecError> {
        toml::from_str(toml_str).map_err(|e| CodecError::Serialization(format!("config: {}", e)))
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CodecError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CodecError::Io(format!("config {}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, CodecError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var("RAMDISK_DIR").filter(|d| !d.is_empty()) {
            self.ramdisk_dir = PathBuf::from(dir);
        }
        if let Some(host) = var("NES_API_HOST").filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = var("NES_API_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.port = p,
                Err(_) => tracing::warn!(
                    "Ignoring invalid NES_API_PORT {:?}, using {}",
                    port,
                    self.port
                ),
            }
        }
        if let Some(origins) = var("NESRAM_CORS_ORIGINS") {
            self.cors_origins = parse_origins(&origins);
        }
    }

    /// Paths of the three data files.
    pub fn data_paths(&self) -> DataPaths {
        DataPaths {
            catalog: self.ramdisk_dir.join(&self.catalog_file),
            snapshot: self.ramdisk_dir.join(&self.snapshot_file),
            bestiary: self.ramdisk_dir.join(&self.bestiary_file),
        }
    }

    /// `host:port` for binding the server.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated origin list. `*` means any origin.
fn parse_origins(raw: &str) -> Option<Vec<String>> {
    if raw.trim() == "*" {
        return None;
    }
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
    )
}
