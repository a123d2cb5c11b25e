//! Registry fetching and manifest lookup.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::OnceCell;

use crate::error::{InstallError, Result};
use crate::reporter::Reporter;

/// Transport for registry documents and asset files.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the body at `url` as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Upper bound on a single registry request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches over HTTP(S), and from disk for `file://` URLs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher whose requests give up after `DEFAULT_TIMEOUT`.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| InstallError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "file" => {
                let path = parsed.to_file_path().map_err(|()| InstallError::InvalidUrl {
                    url: url.to_string(),
                    reason: "not a local file path".to_string(),
                })?;
                tracing::debug!("Reading {}", path.display());
                Ok(std::fs::read_to_string(path)?)
            }
            "http" | "https" => {
                tracing::debug!("GET {url}");
                let response = self
                    .client
                    .get(parsed)
                    .send()
                    .await
                    .map_err(|e| InstallError::Download {
                        url: url.to_string(),
                        source: e,
                    })?;

                if !response.status().is_success() {
                    return Err(InstallError::HttpStatus {
                        url: url.to_string(),
                        status: response.status().as_u16(),
                    });
                }

                response.text().await.map_err(|e| InstallError::Download {
                    url: url.to_string(),
                    source: e,
                })
            }
            other => Err(InstallError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }
}

/// Which of the two registry documents to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    Components,
    Templates,
}

impl ManifestKind {
    /// Top-level key holding the entries in the registry document.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Components => "components",
            Self::Templates => "templates",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Components => "component",
            Self::Templates => "template",
        }
    }
}

/// Install pipeline selected by `files.main.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Component,
    Template,
}

impl AssetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Template => "template",
        }
    }
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "component" => Ok(Self::Component),
            "template" => Ok(Self::Template),
            other => Err(format!("unknown asset type '{other}'")),
        }
    }
}

/// A file belonging to an entry, relative to the registry document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegistryFile {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An installable asset.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegistryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(default, rename = "devDependencies", deserialize_with = "null_as_default")]
    pub dev_dependencies: Vec<String>,
    #[serde(
        default,
        rename = "componentDependencies",
        deserialize_with = "null_as_default"
    )]
    pub component_dependencies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: BTreeMap<String, RegistryFile>,
}

/// Read an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RegistryEntry {
    /// The entry's id, falling back to its name.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Whether `query` names this entry by id or name, ignoring case.
    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query)
            || self.id.as_deref().is_some_and(|id| id.eq_ignore_ascii_case(query))
    }

    /// Raw `files.main.type`, if there is a main file.
    pub fn main_type(&self) -> Option<&str> {
        self.files.get("main").map(|f| f.kind.as_str())
    }

    /// Resolved install pipeline; `None` when the entry cannot be installed.
    pub fn asset_type(&self) -> Option<AssetType> {
        self.main_type().and_then(|t| t.parse().ok())
    }
}

/// Parsed registry document: the entries of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryManifest {
    kind: ManifestKind,
    entries: Vec<RegistryEntry>,
}

impl RegistryManifest {
    /// Parse a registry document, reading the collection for `kind`.
    ///
    /// Record keys become ids for entries that do not declare one.
    pub fn parse(kind: ManifestKind, content: &str) -> Result<Self> {
        let document: serde_json::Value = serde_json::from_str(content)?;
        let serde_json::Value::Object(mut root) = document else {
            return Err(InstallError::InvalidManifest {
                reason: "registry document is not a JSON object".to_string(),
            });
        };
        let collection = root
            .remove(kind.collection_key())
            .ok_or_else(|| InstallError::InvalidManifest {
                reason: format!("missing '{}' collection", kind.collection_key()),
            })?;

        let records: BTreeMap<String, RegistryEntry> = serde_json::from_value(collection)?;
        let entries = records
            .into_iter()
            .map(|(key, mut entry)| {
                if entry.id.is_none() {
                    entry.id = Some(key);
                }
                entry
            })
            .collect();

        Ok(Self { kind, entries })
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Case-insensitive lookup by id or name.
    pub fn find(&self, query: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.matches(query))
    }

    /// Entries whose id, name or description contain `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&RegistryEntry> {
        let query_lower = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.key().to_lowercase().contains(&query_lower)
                    || e.name.to_lowercase().contains(&query_lower)
                    || e.description.to_lowercase().contains(&query_lower)
            })
            .collect()
    }
}

/// Client for the component and template registries.
///
/// Each manifest is fetched at most once per client and kept for its lifetime.
pub struct RegistryClient {
    components_url: String,
    templates_url: String,
    fetcher: Arc<dyn Fetch>,
    reporter: Reporter,
    components: OnceCell<RegistryManifest>,
    templates: OnceCell<RegistryManifest>,
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("components_url", &self.components_url)
            .field("templates_url", &self.templates_url)
            .finish_non_exhaustive()
    }
}

impl RegistryClient {
    /// Create a new registry client.
    ///
    /// # Arguments
    ///
    /// * `components_url` - URL of the component registry document
    /// * `templates_url` - URL of the template registry document
    /// * `fetcher` - Transport used for documents and files
    /// * `reporter` - Output sink for the fetch spinner
    pub fn new(
        components_url: String,
        templates_url: String,
        fetcher: Arc<dyn Fetch>,
        reporter: Reporter,
    ) -> Self {
        Self {
            components_url,
            templates_url,
            fetcher,
            reporter,
            components: OnceCell::new(),
            templates: OnceCell::new(),
        }
    }

    /// URL of the registry document for `kind`.
    pub fn url(&self, kind: ManifestKind) -> &str {
        match kind {
            ManifestKind::Components => &self.components_url,
            ManifestKind::Templates => &self.templates_url,
        }
    }

    /// Fetch (once) and return the manifest for `kind`.
    ///
    /// # Errors
    ///
    /// Any transport or parse failure is reported as
    /// `InstallError::RegistryUnavailable`; there is no retry.
    pub async fn manifest(&self, kind: ManifestKind) -> Result<&RegistryManifest> {
        let cell = match kind {
            ManifestKind::Components => &self.components,
            ManifestKind::Templates => &self.templates,
        };
        cell.get_or_try_init(|| self.fetch_manifest(kind)).await
    }

    pub async fn fetch_component_manifest(&self) -> Result<&RegistryManifest> {
        self.manifest(ManifestKind::Components).await
    }

    pub async fn fetch_template_manifest(&self) -> Result<&RegistryManifest> {
        self.manifest(ManifestKind::Templates).await
    }

    /// Look up an entry by id or name, ignoring case.
    ///
    /// A missing entry is `Ok(None)`; only registry failures are errors.
    pub async fn get_entry(&self, kind: ManifestKind, id: &str) -> Result<Option<RegistryEntry>> {
        Ok(self.manifest(kind).await?.find(id).cloned())
    }

    /// All entries of the manifest for `kind`.
    pub async fn list_entries(&self, kind: ManifestKind) -> Result<Vec<RegistryEntry>> {
        Ok(self.manifest(kind).await?.entries().to_vec())
    }

    /// URL of an entry file: the registry document's directory followed by
    /// the file's relative path, one percent-encoded segment at a time.
    pub fn file_url(&self, kind: ManifestKind, path: &str) -> Result<String> {
        let base = self.url(kind);
        let mut url = Url::parse(base).map_err(|e| InstallError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|()| InstallError::InvalidUrl {
                url: base.to_string(),
                reason: "registry URL cannot have a path".to_string(),
            })?;
            segments
                .pop()
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url.to_string())
    }

    /// Download an entry file as text.
    pub async fn fetch_file(&self, kind: ManifestKind, path: &str) -> Result<String> {
        let url = self.file_url(kind, path)?;
        self.fetcher.fetch_text(&url).await
    }

    async fn fetch_manifest(&self, kind: ManifestKind) -> Result<RegistryManifest> {
        let url = self.url(kind).to_string();
        let spinner = self
            .reporter
            .spinner(format!("Fetching {} registry...", kind.label()));

        let fetched = self.fetcher.fetch_text(&url).await;
        spinner.finish_and_clear();

        let manifest = fetched
            .and_then(|content| RegistryManifest::parse(kind, &content))
            .map_err(|e| InstallError::RegistryUnavailable {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            "Loaded {} {} entries from {url}",
            manifest.entries().len(),
            kind.label()
        );
        Ok(manifest)
    }
}
