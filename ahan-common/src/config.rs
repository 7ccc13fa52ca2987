//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "AHAN_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "ahan.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(root_folder) = &toml_config.root_folder {
        return PathBuf::from(root_folder);
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/ahan/config.toml first, then /etc/ahan/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("ahan").join("config.toml"));
        if let Some(path) = user_config.filter(|p| p.exists()) {
            return Some(path);
        }
        let system_config = PathBuf::from("/etc/ahan/config.toml");
        system_config.exists().then_some(system_config)
    } else {
        dirs::config_dir()
            .map(|d| d.join("ahan").join("config.toml"))
            .filter(|p| p.exists())
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("ahan"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/ahan"))
    } else if cfg!(target_os = "macos") || cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("ahan"))
            .unwrap_or_else(|| PathBuf::from("./ahan_data"))
    } else {
        PathBuf::from("./ahan_data")
    }
}

// ========================================
// TOML configuration
// ========================================

/// Which record store backend serves the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    /// Lowercase hex SHA-256 of the admin password. Empty disables login.
    pub password_sha256: String,
    /// How long a success notice stays up before the editor returns to its listing
    pub confirmation_delay_ms: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password_sha256: String::new(),
            confirmation_delay_ms: 1500,
        }
    }
}

/// Contents of `config.toml`; every section is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub seed: SeedConfig,
    pub admin: AdminConfig,
}

impl TomlConfig {
    /// Parse a TOML config file. Missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load from the platform default location, or defaults if none exists
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `AHAN_PORT`, `AHAN_ADMIN_USERNAME` and `AHAN_ADMIN_PASSWORD` overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("AHAN_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("AHAN_PORT is not a port number: {}", port)))?;
        }

        if let Ok(username) = std::env::var("AHAN_ADMIN_USERNAME") {
            if !username.trim().is_empty() {
                self.admin.username = username;
            }
        }

        if let Ok(password) = std::env::var("AHAN_ADMIN_PASSWORD") {
            if !password.is_empty() {
                if !self.admin.password_sha256.is_empty() {
                    warn!("AHAN_ADMIN_PASSWORD overrides admin.password_sha256 from config file");
                }
                self.admin.password_sha256 = sha256_hex(&password);
            }
        }

        Ok(())
    }
}

/// Lowercase hex SHA-256 digest
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
