//! Project configuration loading.
//!
//! The configuration lives in `assetkit.toml` at the project root and defines:
//! - Registry settings (component and template manifest URLs)
//! - Path settings (where component and template files are written)
//!
//! A project without the file runs on the defaults.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the project configuration.
pub const CONFIG_FILE_NAME: &str = "assetkit.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Registry locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// URL of the component manifest.
    #[serde(default = "default_components_url")]
    pub components: String,

    /// URL of the template manifest.
    #[serde(default = "default_templates_url")]
    pub templates: String,
}

fn default_components_url() -> String {
    "https://registry.assetkit.dev/components.json".to_string()
}

fn default_templates_url() -> String {
    "https://registry.assetkit.dev/templates.json".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            components: default_components_url(),
            templates: default_templates_url(),
        }
    }
}

/// Output directories, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
    /// Flat directory receiving component files.
    #[serde(default = "default_components_dir")]
    pub components: PathBuf,

    /// Directory receiving one sub-directory per template.
    #[serde(default = "default_templates_dir")]
    pub templates: PathBuf,
}

fn default_components_dir() -> PathBuf {
    PathBuf::from("components")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            components: default_components_dir(),
            templates: default_templates_dir(),
        }
    }
}

/// Complete project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output paths.
    #[serde(default)]
    pub paths: PathsConfig,
}

impl ProjectConfig {
    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ProjectConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `assetkit.toml` from the project root, or the defaults if it is absent.
    pub fn load_or_default(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, project_root.display());
            return Ok(Self::default());
        }
        tracing::debug!("Loading configuration from {}", path.display());
        Self::load(&path)
    }

    /// Validate the configuration (pure function).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, url) in [
            ("registry.components", &self.registry.components),
            ("registry.templates", &self.registry.templates),
        ] {
            Url::parse(url)
                .map_err(|e| ConfigError::ValidationError(format!("{key} = '{url}': {e}")))?;
        }
        for (key, path) in [
            ("paths.components", &self.paths.components),
            ("paths.templates", &self.paths.templates),
        ] {
            if path.is_absolute() {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must be relative to the project root, got {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Absolute components directory for the given project root.
    #[must_use]
    pub fn components_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.paths.components)
    }

    /// Absolute templates directory for the given project root.
    #[must_use]
    pub fn templates_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.paths.templates)
    }
}
