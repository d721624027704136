//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (applied by the binaries)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing config file is not an error: defaults are used and a warning is
//! logged.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "CINELOG_CONFIG";

/// Complete TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CineLogConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub igdb: IgdbConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Search proxy listener, and where clients reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    /// Full URL of the game search endpoint as seen by clients
    #[serde(default = "default_proxy_url")]
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
            url: default_proxy_url(),
        }
    }
}

/// Game catalog credentials and endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgdbConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Static bearer token; bypasses the credential exchange entirely
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_igdb_token_url")]
    pub token_url: String,
    #[serde(default = "default_igdb_api_url")]
    pub api_url: String,
    /// Subtracted from the upstream token lifetime
    #[serde(default = "default_token_margin_secs")]
    pub token_margin_secs: u64,
}

impl Default for IgdbConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            access_token: None,
            token_url: default_igdb_token_url(),
            api_url: default_igdb_api_url(),
            token_margin_secs: default_token_margin_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_tmdb_language")]
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            language: default_tmdb_language(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    3001
}

fn default_proxy_url() -> String {
    "http://127.0.0.1:3001/api/igdb".to_string()
}

fn default_igdb_token_url() -> String {
    "https://id.twitch.tv/oauth2/token".to_string()
}

fn default_igdb_api_url() -> String {
    "https://api.igdb.com/v4/games".to_string()
}

fn default_token_margin_secs() -> u64 {
    60
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Validate a key or secret (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Read an environment variable, treating blank values as unset
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

fn override_from_env(slot: &mut Option<String>, name: &str) {
    if let Some(value) = env_value(name) {
        debug!(variable = name, "Setting loaded from environment");
        *slot = Some(value);
    }
}

impl CineLogConfig {
    /// Load configuration: resolve the file, parse it (or use defaults), then apply ENV
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                if cli_path.is_some() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                Self::default()
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.normalize();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Config file loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Environment variables override values from the TOML file
    pub fn apply_env_overrides(&mut self) {
        override_from_env(&mut self.igdb.client_id, "CINELOG_IGDB_CLIENT_ID");
        override_from_env(&mut self.igdb.client_secret, "CINELOG_IGDB_CLIENT_SECRET");
        override_from_env(&mut self.igdb.access_token, "CINELOG_IGDB_ACCESS_TOKEN");
        override_from_env(&mut self.tmdb.api_key, "CINELOG_TMDB_API_KEY");
        override_from_env(&mut self.supabase.url, "CINELOG_SUPABASE_URL");
        override_from_env(&mut self.supabase.anon_key, "CINELOG_SUPABASE_ANON_KEY");
        override_from_env(&mut self.gemini.api_key, "CINELOG_GEMINI_API_KEY");
        if let Some(url) = env_value("CINELOG_PROXY_URL") {
            self.proxy.url = url;
        }
        if let Some(level) = env_value("CINELOG_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Blank secrets from any tier count as unset
    fn normalize(&mut self) {
        for slot in [
            &mut self.igdb.client_id,
            &mut self.igdb.client_secret,
            &mut self.igdb.access_token,
            &mut self.tmdb.api_key,
            &mut self.supabase.url,
            &mut self.supabase.anon_key,
            &mut self.gemini.api_key,
        ] {
            if slot.as_deref().is_some_and(|v| !is_valid_key(v)) {
                *slot = None;
            }
        }
    }
}

/// Config file path: CLI argument → `CINELOG_CONFIG` → `~/.config/cinelog/cinelog.toml`
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_value(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    default_config_dir().map(|d| d.join("cinelog.toml"))
}

/// Per-user configuration directory (`~/.config/cinelog` on Linux)
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cinelog"))
}
