use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://mars_storefront.db`
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://mars_storefront.db".to_string(),
            max_connections: 8,
        }
    }
}

/// Back-office credentials and session signing.
///
/// Either `password_hash` (Argon2 PHC string) or `password` must be set.
/// A plaintext `password` is hashed once at start-up and never compared raw.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminConfig {
    pub admin_id: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,
}

fn default_session_ttl_secs() -> i64 {
    8 * 60 * 60
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Insert the default packs when the catalog is empty
    pub seed_defaults: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub system_instruction: String,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            system_instruction: String::new(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Secrets may be kept out of the YAML file
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MARS_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("MARS_JWT_SECRET") {
            self.admin.jwt_secret = secret;
        }
        if let Ok(password) = std::env::var("MARS_ADMIN_PASSWORD") {
            self.admin.password = Some(password);
            self.admin.password_hash = None;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.chat.api_key = Some(key);
        }
    }
}
