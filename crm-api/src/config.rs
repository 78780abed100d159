use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dedup::DEFAULT_DETAIL_LIMIT;
use crate::helpers::contact_cache::DEFAULT_TTL_SECONDS;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub cors: Option<CorsConfig>,
    pub server: Option<ServerConfig>,
    pub database: Option<DatabaseConfig>,
    pub cleanup: Option<CleanupConfig>,
    pub cache: Option<CacheConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
            server: Some(ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8001,
            }),
            database: None,
            cleanup: Some(CleanupConfig::default()),
            cache: Some(CacheConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CleanupConfig {
    /// Number of duplicate groups listed in a cleanup response
    pub detail_limit: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            detail_limit: DEFAULT_DETAIL_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    pub ttl_seconds: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"
[cors]
allowed_origins = ["http://localhost:3000"]

[server]
host = "127.0.0.1"
port = 8001

[database]
# Defaults to the platform data directory when unset
# path = "/var/lib/wacrm/crm.sqlite"

[cleanup]
detail_limit = 50

[cache]
ttl_seconds = 300
"#;

impl ApiConfig {
    /// Load the config file, writing the default one first if it is missing
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfigError::Message(format!("Failed to create config directory: {e}"))
                })?;
            }
        }

        // Create default config file if it doesn't exist
        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn detail_limit(&self) -> usize {
        self.cleanup
            .as_ref()
            .map(|c| c.detail_limit)
            .unwrap_or(DEFAULT_DETAIL_LIMIT)
    }

    pub fn cache_ttl_seconds(&self) -> i64 {
        self.cache
            .as_ref()
            .map(|c| c.ttl_seconds)
            .unwrap_or(DEFAULT_TTL_SECONDS)
    }

    pub fn database_path(&self) -> Option<&str> {
        self.database.as_ref().and_then(|d| d.path.as_deref())
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("wacrm").join("crm-api.toml")
    } else {
        PathBuf::from("crm-api.toml")
    }
}
