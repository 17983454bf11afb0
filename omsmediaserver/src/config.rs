//! Configuration du service ContentDirectory.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Erreurs de chargement de configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Réglages du service ContentDirectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDirectoryConfig {
    /// Trace le payload DIDL-Lite assemblé pour chaque réponse.
    pub debug_didl: bool,

    /// Id de l'objet racine annoncé dans le document de capacités
    /// (X_GetFeatureList).
    pub root_object_id: String,
}

impl Default for ContentDirectoryConfig {
    fn default() -> Self {
        Self {
            debug_didl: false,
            root_object_id: omsstore::ROOT_ID.to_string(),
        }
    }
}

impl ContentDirectoryConfig {
    /// Charge la configuration depuis un fichier YAML.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
