//! Layered configuration: embedded defaults, optional file, environment.

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Upper bound for `security.max_request_size_mb`
pub const MAX_REQUEST_SIZE_MB: usize = 1024;

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
    pub enable_target: bool,
    pub enable_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            enable_target: false,
            enable_thread_ids: false,
        }
    }
}

/// Request filtering applied in front of the handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub allowed_origins: Vec<String>,
    pub max_request_size_mb: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_cors: false,
            allowed_origins: vec!["*".to_string()],
            max_request_size_mb: 1,
        }
    }
}

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl Settings {
    /// Load settings from the embedded defaults, a config file and the environment.
    ///
    /// Without `path`, `config.{toml,yaml,json}` in the working directory is
    /// used when present. An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::from_str(include_str!("../config.toml"), FileFormat::Toml));

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        let config = builder
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        let mut settings: Settings = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;

        Ok(settings)
    }

    /// Apply the flat `STORE_API_HOST` / `STORE_API_PORT` overrides.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("STORE_API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("STORE_API_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid STORE_API_PORT '{}'", port))?;
        }
        Ok(())
    }

    /// Validate settings for consistency
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port cannot be 0"));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(anyhow!("Request timeout cannot be 0"));
        }
        self.socket_addr()?;

        if self.security.max_request_size_mb == 0 {
            return Err(anyhow!("Max request size cannot be 0"));
        }
        if self.security.max_request_size_mb > MAX_REQUEST_SIZE_MB {
            return Err(anyhow!(
                "Max request size {} MB exceeds the {} MB ceiling",
                self.security.max_request_size_mb,
                MAX_REQUEST_SIZE_MB
            ));
        }

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => return Err(anyhow!("Unknown log format '{}', expected 'text' or 'json'", other)),
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| anyhow!("Invalid server host '{}': {}", self.server.host, e))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Point the listener at `addr`, e.g. from the command line.
    pub fn override_addr(&mut self, addr: SocketAddr) {
        self.server.host = addr.ip().to_string();
        self.server.port = addr.port();
    }
}

/// STORE_API__SERVER__PORT=9000 and friends
fn environment() -> Environment {
    Environment::with_prefix("STORE_API")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("security.allowed_origins")
        .try_parsing(true)
}
