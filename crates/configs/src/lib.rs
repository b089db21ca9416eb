use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Remote REST API the console talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            default_page_limit: default_page_limit(),
        }
    }
}

/// Page-button window of the pagination control.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_half_width")]
    pub half_width: u32,
    #[serde(default = "default_max_visible")]
    pub max_visible: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self { Self { half_width: default_half_width(), max_visible: default_max_visible() } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// JSON file standing in for browser local storage.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Use the built-in operator check instead of `POST /auth/login`.
    #[serde(default)]
    pub offline_login: bool,
}

impl Default for SessionConfig {
    fn default() -> Self { Self { storage_path: default_storage_path(), offline_login: false } }
}

/// Reference API server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            jwt_secret: default_jwt_secret(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            seed_demo_data: false,
        }
    }
}

fn default_base_url() -> String { "http://localhost:4040/api/v1/admin".into() }
fn default_request_timeout() -> u64 { 30 }
fn default_page_limit() -> u32 { 10 }
fn default_half_width() -> u32 { 2 }
fn default_max_visible() -> u32 { 10 }
fn default_storage_path() -> PathBuf { PathBuf::from("data/local_storage.json") }
fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 4040 }
fn default_jwt_secret() -> String { "dev-secret-change-me".into() }
fn default_admin_username() -> String { "admin".into() }
fn default_admin_password() -> String { "password123".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the file is missing,
    /// then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.api.normalize_from_env();
        self.api.validate()?;
        self.pagination.validate()?;
        self.server.normalize_from_env();
        self.server.normalize()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl ApiConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(url) = std::env::var("API_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("api.base_url must start with http:// or https://"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("api.request_timeout_secs must be a positive number of seconds"));
        }
        if !(1..=100).contains(&self.default_page_limit) {
            return Err(anyhow!("api.default_page_limit must be within 1..=100"));
        }
        Ok(())
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<()> {
        // first + last + two ellipses + current page
        if self.max_visible < 5 {
            return Err(anyhow!("pagination.max_visible must be >= 5"));
        }
        if self.half_width == 0 {
            return Err(anyhow!("pagination.half_width must be >= 1"));
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.jwt_secret = secret;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("server.jwt_secret must not be empty"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}
