//! Configuration loading and data folder resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable overrides
const ENV_DATA_FOLDER: &str = "PAWDENTIFY_DATA_FOLDER";
const ENV_BIND_ADDR: &str = "PAWDENTIFY_BIND_ADDR";
const ENV_MODEL_URL: &str = "PAWDENTIFY_MODEL_URL";
const ENV_LABELS_PATH: &str = "PAWDENTIFY_LABELS_PATH";

/// Compiled defaults
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8750";
const DEFAULT_MODEL_URL: &str = "http://127.0.0.1:8751";
const DEFAULT_DB_FILENAME: &str = "pawdentify.db";
const DEFAULT_LABELS_FILENAME: &str = "class_indices.json";

/// Service configuration, resolved once at startup and passed explicitly
/// to every component. No hidden globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Folder holding the database file and model label table
    pub data_folder: PathBuf,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Base URL of the external inference service
    pub model_url: String,
    /// Path to the class label table (index -> breed name)
    pub labels_path: PathBuf,
}

/// Shape of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    data_folder: Option<PathBuf>,
    bind_addr: Option<String>,
    model_url: Option<String>,
    labels_path: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from CLI argument, environment, config file,
    /// and compiled defaults, in that priority order.
    ///
    /// `cli_data_folder` is the optional first positional argument of the
    /// binary, overriding the data folder only.
    pub fn resolve(cli_data_folder: Option<&str>) -> Result<Self> {
        let file = load_config_file().unwrap_or_default();

        let data_folder = cli_data_folder
            .map(PathBuf::from)
            .or_else(|| std::env::var(ENV_DATA_FOLDER).ok().map(PathBuf::from))
            .or(file.data_folder)
            .unwrap_or_else(default_data_folder);

        let bind_addr = std::env::var(ENV_BIND_ADDR)
            .ok()
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|_| Error::Config(format!("invalid bind address: {}", bind_addr)))?;

        let model_url = std::env::var(ENV_MODEL_URL)
            .ok()
            .or(file.model_url)
            .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());

        let labels_path = std::env::var(ENV_LABELS_PATH)
            .ok()
            .map(PathBuf::from)
            .or(file.labels_path)
            .unwrap_or_else(|| data_folder.join(DEFAULT_LABELS_FILENAME));

        Ok(Config {
            data_folder,
            bind_addr,
            model_url,
            labels_path,
        })
    }

    /// Database file path inside the data folder
    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join(DEFAULT_DB_FILENAME)
    }

    /// Create the data folder if it does not exist yet
    pub fn ensure_data_folder(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_folder)?;
        Ok(())
    }
}

/// Locate and parse the optional config file
/// (`~/.config/pawdentify/config.toml`, or `/etc/pawdentify/config.toml` on Linux)
fn load_config_file() -> Result<ConfigFile> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("pawdentify").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/pawdentify/config.toml"));
    }

    for path in candidates {
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            return toml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)));
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pawdentify"))
        .unwrap_or_else(|| PathBuf::from("./pawdentify_data"))
}
