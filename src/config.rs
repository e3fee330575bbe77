//! Layered configuration: `.taskboard/taskboard.toml` → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3001
//! cors_origin = "http://localhost:3000"
//! dev_mode = false
//! broadcast_capacity = 64
//!
//! [board]
//! seed = true
//!
//! [logging]
//! level = "info"
//! json = false
//! directory = "/var/log/taskboard"
//! ```
//!
//! Environment overrides (a `.env` file is honored): `HOST`, `PORT`,
//! `FRONTEND_URL`, `TASKBOARD_LOG_LEVEL`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::web::server::ServerConfig;

pub const CONFIG_DIR: &str = ".taskboard";
pub const CONFIG_FILE: &str = "taskboard.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin allowed by CORS outside dev mode
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Permissive CORS for a local front-end dev server
    #[serde(default)]
    pub dev_mode: bool,
    /// Buffered board updates per slow subscriber before it starts skipping
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_broadcast_capacity() -> usize {
    64
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            dev_mode: false,
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl ServerSettings {
    /// URL a local client should use to reach this server.
    pub fn base_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Start with the example tasks instead of an empty board
    #[serde(default = "default_seed")]
    pub seed: bool,
}

fn default_seed() -> bool {
    true
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "info" or "taskboard=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Write daily-rolling log files here instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TaskboardConfig {
    /// `.taskboard/taskboard.toml` relative to the working directory.
    pub fn default_path() -> PathBuf {
        Path::new(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse taskboard.toml")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize taskboard.toml")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value '{}'", port))?;
        }
        if let Some(origin) = lookup("FRONTEND_URL") {
            self.server.cors_origin = origin;
        }
        if let Some(level) = lookup("TASKBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            cors_origin: self.server.cors_origin.clone(),
            dev_mode: self.server.dev_mode,
            broadcast_capacity: self.server.broadcast_capacity,
            seed: self.board.seed,
        }
    }
}
