mod file_config;

pub use file_config::{FileConfig, ImportConfig, OmdbConfig};

use crate::import::ValueCapture;
use crate::remote::DEFAULT_OMDB_URL;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "movies.db";
pub const DEFAULT_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub api_key: Option<String>,
    pub omdb_url: String,
    pub timeout_sec: u64,
    pub value_capture: ValueCapture,
    pub read_pool_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            api_key: None,
            omdb_url: DEFAULT_OMDB_URL.to_string(),
            timeout_sec: DEFAULT_TIMEOUT_SEC,
            value_capture: ValueCapture::default(),
            read_pool_size: DEFAULT_READ_POOL_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub read_pool_size: usize,
    pub value_capture: ValueCapture,

    // Remote lookups
    pub api_key: Option<String>,
    pub omdb_url: String,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let omdb = file.omdb.unwrap_or_default();
        let import = file.import.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        let value_capture = match import.value_capture {
            Some(s) => match parse_value_capture(&s) {
                Some(capture) => capture,
                None => bail!("Unknown import.value_capture: {:?}", s),
            },
            None => cli.value_capture,
        };

        let api_key = omdb
            .api_key
            .or_else(|| cli.api_key.clone())
            .filter(|key| !key.trim().is_empty());
        let omdb_url = omdb.url.unwrap_or_else(|| cli.omdb_url.clone());

        let timeout_sec = omdb.timeout_sec.unwrap_or(cli.timeout_sec);
        if timeout_sec == 0 {
            bail!("OMDb timeout must be at least 1 second");
        }

        Ok(Self {
            db_path,
            read_pool_size,
            value_capture,
            api_key,
            omdb_url,
            timeout_sec,
        })
    }

    /// The OMDb API key, required by every remote command.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) => Ok(key),
            None => bail!("API key is missing!"),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

/// Parses a value capture mode, accepting both `whole_line` and `whole-line`.
/// Uses clap's ValueEnum trait for parsing.
fn parse_value_capture(s: &str) -> Option<ValueCapture> {
    ValueCapture::from_str(&s.replace('_', "-"), true).ok()
}
