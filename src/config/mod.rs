//! Configuration loading and management
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! storage:
//!   kind: file
//!   dir: ./data
//! catalog:
//!   default_limit: 10
//!   max_limit: 100
//! events:
//!   capacity: 1024
//! ```

use crate::core::PageDefaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable naming the YAML file the demo binary loads
pub const CONFIG_ENV: &str = "STOREFRONT_CONFIG";

/// Complete storefront configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub events: EventsConfig,
}

/// Listen address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Which backend holds products and carts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    #[default]
    InMemory,
    /// One JSON file per collection inside `dir`
    File { dir: PathBuf },
    /// Requires the `mongodb_backend` feature
    Mongodb { uri: String, database: String },
}

/// Catalog listing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Base of the pagination links in API responses
    pub api_base_path: String,
    /// Base of the pagination links in the rendered catalog view
    pub view_base_path: String,
    /// Size of the `request_products` answer on the live feed
    pub recent_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            api_base_path: "/api/products".to_string(),
            view_base_path: "/products".to_string(),
            recent_limit: 50,
        }
    }
}

impl CatalogConfig {
    pub fn page_defaults(&self) -> PageDefaults {
        PageDefaults {
            limit: self.default_limit.max(1),
            max_limit: self.max_limit.max(1),
        }
    }
}

/// Live feed settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast buffer size; 0 disables the event bus
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl ShopConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load the file named by `STOREFRONT_CONFIG`, or the defaults when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_yaml_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShopConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage, StorageConfig::InMemory);
        assert_eq!(config.catalog.page_defaults(), PageDefaults::default());
        assert_eq!(config.catalog.recent_limit, 50);
        assert_eq!(config.events.capacity, 1024);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ShopConfig::from_yaml_str("").unwrap(), ShopConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
server:
  port: 3000
storage:
  kind: file
  dir: /var/lib/storefront
catalog:
  max_limit: 25
"#;
        let config = ShopConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.storage,
            StorageConfig::File {
                dir: PathBuf::from("/var/lib/storefront")
            }
        );
        assert_eq!(config.catalog.max_limit, 25);
        assert_eq!(config.catalog.default_limit, 10);
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "127.0.0.1:3000".parse().unwrap()
        );
    }

    #[test]
    fn test_mongodb_storage() {
        let yaml = r#"
storage:
  kind: mongodb
  uri: mongodb://localhost:27017
  database: ecommerce
"#;
        let config = ShopConfig::from_yaml_str(yaml).unwrap();
        assert!(matches!(config.storage, StorageConfig::Mongodb { ref database, .. } if database == "ecommerce"));
    }

    #[test]
    fn test_unknown_storage_kind_is_rejected() {
        assert!(ShopConfig::from_yaml_str("storage:\n  kind: redis\n").is_err());
    }
}
