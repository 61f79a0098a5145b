use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_STORE_PATH: &str = "QR_codes/code.csv";
pub const DEFAULT_MAX_SCANS: u32 = 5;
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub mint: MintConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// Location of the CSV backing store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_max_scans")]
    pub max_scans: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_scans: default_max_scans() }
    }
}

/// Settings for the identifier minting tool.
#[derive(Debug, Clone, Deserialize)]
pub struct MintConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

fn default_host() -> String { DEFAULT_HOST.to_string() }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }
fn default_max_scans() -> u32 { DEFAULT_MAX_SCANS }
fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }

/// Load from `CONFIG_PATH` (or `config.toml`); a missing file yields the defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    match std::fs::metadata(&path) {
        Ok(_) => load_from_file(&path),
        Err(_) => Ok(AppConfig::default()),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay `SERVER_HOST`, `SERVER_PORT`, `CODES_DB_PATH`, `MAX_SCANS` and `BASE_URL`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT must be an integer in 1..=65535, got {port:?}"))?;
        }
        if let Some(path) = lookup("CODES_DB_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(max) = lookup("MAX_SCANS") {
            self.scan.max_scans = max
                .trim()
                .parse()
                .map_err(|_| anyhow!("MAX_SCANS must be a non-negative integer, got {max:?}"))?;
        }
        if let Some(url) = lookup("BASE_URL") {
            self.mint.base_url = url;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        self.scan.validate()?;
        self.mint.normalize();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = DEFAULT_HOST.to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(anyhow!("store.path is empty; set it in config.toml or CODES_DB_PATH"));
        }
        Ok(())
    }
}

impl ScanConfig {
    fn validate(&self) -> Result<()> {
        if self.max_scans == 0 {
            return Err(anyhow!("scan.max_scans must be >= 1"));
        }
        Ok(())
    }
}

impl MintConfig {
    fn normalize(&mut self) {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }
}
