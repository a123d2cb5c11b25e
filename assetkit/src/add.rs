//! The `add` orchestrator: resolve requested identifiers and dispatch them to
//! the matching installer.
//!
//! Identifiers are processed strictly in the order given, one at a time.
//! Lookup misses and entries with an unsupported `files.main.type` are
//! recorded as skipped; failures once an install has started abort the
//! whole command.

use std::collections::{BTreeSet, HashMap};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use dialoguer::{Select, theme::ColorfulTheme};
use serde::Serialize;

use crate::config::ProjectConfig;
use crate::cwd::ScopedCwd;
use crate::error::{InstallError, Result};
use crate::installer::{ComponentInstaller, TemplateInstaller};
use crate::package_manager::{DependencyInstaller, PackageInstaller};
use crate::registry::{AssetType, Fetch, HttpFetcher, ManifestKind, RegistryClient, RegistryEntry};
use crate::reporter::Reporter;

/// Asset category selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Component,
    Template,
    Theme,
}

impl Namespace {
    /// Registry document the namespace resolves against. Themes are
    /// published in the template registry.
    pub fn manifest_kind(self) -> ManifestKind {
        match self {
            Self::Component => ManifestKind::Components,
            Self::Template | Self::Theme => ManifestKind::Templates,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Template => "template",
            Self::Theme => "theme",
        }
    }
}

impl FromStr for Namespace {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "component" | "components" => Ok(Self::Component),
            "template" | "templates" => Ok(Self::Template),
            "theme" | "themes" => Ok(Self::Theme),
            _ => Err(InstallError::UnknownNamespace {
                namespace: s.to_string(),
            }),
        }
    }
}

/// External collaborators of a command: transport and package manager.
#[derive(Clone)]
pub struct Services {
    pub fetcher: Arc<dyn Fetch>,
    pub packages: Arc<dyn PackageInstaller>,
}

impl Services {
    /// HTTP transport and the host's package manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn system() -> Result<Self> {
        Ok(Self {
            fetcher: Arc::new(HttpFetcher::new()?),
            packages: Arc::new(DependencyInstaller::new()),
        })
    }
}

/// Parameters of one `add` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRequest {
    pub namespace: String,
    pub identifiers: Vec<String>,
    pub yes: bool,
    pub json: bool,
    pub cwd: PathBuf,
}

/// Outcome of one `add` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallationResult {
    pub requested: Vec<String>,
    pub installed: Vec<String>,
    pub dependencies: BTreeSet<String>,
    pub skipped: Vec<String>,
}

impl InstallationResult {
    fn record_installed(&mut self, id: &str, entry: &RegistryEntry, packages: BTreeSet<String>) {
        self.dependencies
            .extend(packages.into_iter().filter(|p| !entry.matches(p)));
        self.installed.push(id.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty() && self.skipped.is_empty()
    }
}

/// Index entries under both their id and their name, lowercased.
fn build_lookup(entries: Vec<RegistryEntry>) -> HashMap<String, RegistryEntry> {
    let mut lookup = HashMap::with_capacity(entries.len() * 2);
    for entry in entries {
        if let Some(id) = &entry.id {
            lookup.entry(id.to_lowercase()).or_insert_with(|| entry.clone());
        }
        lookup.entry(entry.name.to_lowercase()).or_insert(entry);
    }
    lookup
}

/// Ask the user to pick one entry. `None` when the prompt is dismissed.
fn prompt_selection(namespace: Namespace, entries: &[RegistryEntry]) -> Result<Option<String>> {
    if !std::io::stdin().is_terminal() {
        return Err(InstallError::Prompt {
            message: format!(
                "no {} given and stdin is not a terminal (pass identifiers or --yes)",
                namespace.as_str()
            ),
        });
    }
    if entries.is_empty() {
        return Ok(None);
    }

    let items: Vec<String> = entries
        .iter()
        .map(|e| {
            if e.description.is_empty() {
                e.name.clone()
            } else {
                format!("{} - {}", e.name, e.description)
            }
        })
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Select a {} to add", namespace.as_str()))
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(selection
        .and_then(|i| entries.get(i))
        .map(|e| e.key().to_lowercase()))
}

/// Run `add`: resolve identifiers and install them in order.
///
/// The working directory is switched to `request.cwd` for the duration of the
/// call and restored on every exit path.
///
/// # Errors
///
/// Returns an error if:
/// - The namespace is unknown
/// - The working directory or configuration cannot be loaded
/// - A registry is unreachable
/// - Any installer fails after resolution
pub async fn add(request: &InstallationRequest, services: &Services) -> Result<InstallationResult> {
    let namespace: Namespace = request.namespace.parse()?;
    let cwd = ScopedCwd::enter(&request.cwd)?;
    let project_root = cwd.path().to_path_buf();
    let reporter = Reporter::new(request.json);

    let config = ProjectConfig::load_or_default(&project_root)?;
    let registry = registry_client(&config, services, reporter);
    let kind = namespace.manifest_kind();

    let mut result = InstallationResult::default();
    let mut identifiers: Vec<String> = request
        .identifiers
        .iter()
        .map(|id| id.to_lowercase())
        .collect();

    if identifiers.is_empty() {
        if request.yes || request.json {
            reporter.info(format!("No {} specified, nothing to do", namespace.as_str()));
            return Ok(result);
        }
        let entries = registry.list_entries(kind).await?;
        match prompt_selection(namespace, &entries)? {
            Some(id) => identifiers.push(id),
            None => return Ok(result),
        }
    }
    result.requested = identifiers.clone();

    let lookup = build_lookup(registry.list_entries(kind).await?);
    let components = ComponentInstaller::new(
        &registry,
        services.packages.as_ref(),
        reporter,
        config.components_dir(&project_root),
    );
    let templates = TemplateInstaller::new(
        &registry,
        services.packages.as_ref(),
        &components,
        reporter,
        config.templates_dir(&project_root),
    );

    for id in &identifiers {
        let Some(entry) = lookup.get(id) else {
            reporter.warn(format!("{} '{id}' not found in registry", namespace.as_str()));
            result.skipped.push(id.clone());
            continue;
        };

        match entry.asset_type() {
            Some(AssetType::Component) => {
                reporter.step(&entry.name, AssetType::Component.as_str());
                let packages = components.install(entry.key()).await?;
                result.record_installed(id, entry, packages);
            }
            Some(AssetType::Template) => {
                reporter.step(&entry.name, AssetType::Template.as_str());
                let packages = templates.install(entry.key()).await?;
                result.record_installed(id, entry, packages);
            }
            None => {
                reporter.error(format!(
                    "'{id}' has unsupported type '{}'",
                    entry.main_type().unwrap_or("<missing main file>")
                ));
                result.skipped.push(id.clone());
            }
        }
    }

    tracing::info!(
        "add {}: {} installed, {} skipped",
        namespace.as_str(),
        result.installed.len(),
        result.skipped.len()
    );
    Ok(result)
}

/// List the entries of a namespace, optionally filtered by `query`.
pub async fn list(
    namespace: &str,
    query: Option<&str>,
    cwd: &Path,
    reporter: Reporter,
    services: &Services,
) -> Result<Vec<RegistryEntry>> {
    let namespace: Namespace = namespace.parse()?;
    let guard = ScopedCwd::enter(cwd)?;
    let config = ProjectConfig::load_or_default(guard.path())?;
    let registry = registry_client(&config, services, reporter);
    let manifest = registry.manifest(namespace.manifest_kind()).await?;

    Ok(match query {
        Some(q) => manifest.search(q).into_iter().cloned().collect(),
        None => manifest.entries().to_vec(),
    })
}

fn registry_client(config: &ProjectConfig, services: &Services, reporter: Reporter) -> RegistryClient {
    RegistryClient::new(
        config.registry.components.clone(),
        config.registry.templates.clone(),
        services.fetcher.clone(),
        reporter,
    )
}
