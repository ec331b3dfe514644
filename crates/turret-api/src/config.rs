//! Service configuration file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use turret_core::{Result, TurretConfig, TurretError};

/// Top-level config file for the service binary.
///
/// ```toml
/// listen = "127.0.0.1:8080"
/// trust_document = "turrets.toml"
/// data_dir = "./data"
///
/// [turret]
/// network = "TEST"
/// turret_address = "<64-char hex key>"
/// upload_divisor = 1000
/// horizon_url = "http://localhost:8000"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Bind address.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Path to the trust document, relative to the config file.
    pub trust_document: PathBuf,
    /// Directory for the filesystem store. In-memory storage when absent.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Protocol configuration threaded into every component.
    pub turret: TurretConfig,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl ServiceConfig {
    /// Load and validate the config file, resolving relative paths against
    /// its parent directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TurretError::config(format!("config file {} unreadable: {e}", path.display()))
        })?;
        let mut config: ServiceConfig = toml::from_str(&text)
            .map_err(|e| TurretError::config(format!("config file did not parse: {e}")))?;
        config.turret.validate()?;

        if let Some(base) = path.parent() {
            if config.trust_document.is_relative() {
                config.trust_document = base.join(&config.trust_document);
            }
            if let Some(dir) = &config.data_dir {
                if dir.is_relative() {
                    config.data_dir = Some(base.join(dir));
                }
            }
        }
        Ok(config)
    }
}
