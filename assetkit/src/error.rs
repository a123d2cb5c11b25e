//! Error types for asset resolution and installation.

use std::fmt;

use crate::config::ConfigError;

/// Errors that can occur while resolving or installing assets.
#[derive(Debug)]
pub enum InstallError {
    /// Error performing I/O operations
    Io { source: std::io::Error },

    /// Error downloading a registry document or file
    Download {
        url: String,
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    HttpStatus { url: String, status: u16 },

    /// Registry could not be fetched or parsed. Fatal for the whole command.
    RegistryUnavailable { url: String, reason: String },

    /// Error parsing JSON
    JsonParse { source: serde_json::Error },

    /// Registry document does not have the expected shape
    InvalidManifest { reason: String },

    /// Error loading the project configuration
    Config { source: ConfigError },

    /// Namespace argument is not one of component, template or theme
    UnknownNamespace { namespace: String },

    /// Component not found in the component manifest
    ComponentNotFound { name: String },

    /// Template not found in the template manifest
    TemplateNotFound { name: String },

    /// A component depends on itself, directly or transitively
    CyclicDependency { chain: Vec<String> },

    /// The host package manager failed to add packages
    PackageInstall {
        packages: Vec<String>,
        reason: String,
    },

    /// A URL could not be parsed or joined
    InvalidUrl { url: String, reason: String },

    /// Interactive prompt failed
    Prompt { message: String },
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { source } => write!(f, "I/O error: {source}"),
            Self::Download { url, source } => write!(f, "Failed to download {url}: {source}"),
            Self::HttpStatus { url, status } => write!(f, "HTTP {status} when fetching {url}"),
            Self::RegistryUnavailable { url, reason } => {
                write!(f, "Could not reach registry at {url}: {reason}")
            }
            Self::JsonParse { source } => write!(f, "Failed to parse JSON: {source}"),
            Self::InvalidManifest { reason } => write!(f, "Invalid manifest: {reason}"),
            Self::Config { source } => write!(f, "Configuration error: {source}"),
            Self::UnknownNamespace { namespace } => write!(
                f,
                "Unknown namespace '{namespace}' (expected component, template or theme)"
            ),
            Self::ComponentNotFound { name } => {
                write!(f, "Component '{name}' not found in registry")
            }
            Self::TemplateNotFound { name } => {
                write!(f, "Template '{name}' not found in registry")
            }
            Self::CyclicDependency { chain } => {
                write!(f, "Cyclic component dependency: {}", chain.join(" -> "))
            }
            Self::PackageInstall { packages, reason } => {
                write!(
                    f,
                    "Failed to install packages {}: {reason}",
                    packages.join(", ")
                )
            }
            Self::InvalidUrl { url, reason } => write!(f, "Invalid URL '{url}': {reason}"),
            Self::Prompt { message } => write!(f, "Prompt error: {message}"),
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source } => Some(source),
            Self::Download { source, .. } => Some(source),
            Self::JsonParse { source } => Some(source),
            Self::Config { source } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for InstallError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}

impl From<serde_json::Error> for InstallError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonParse { source }
    }
}

impl From<reqwest::Error> for InstallError {
    fn from(source: reqwest::Error) -> Self {
        let url = source
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        Self::Download { url, source }
    }
}

impl From<ConfigError> for InstallError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}

impl From<dialoguer::Error> for InstallError {
    fn from(e: dialoguer::Error) -> Self {
        Self::Prompt {
            message: e.to_string(),
        }
    }
}

/// Result type for installation operations.
pub type Result<T> = std::result::Result<T, InstallError>;
