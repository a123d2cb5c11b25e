//! assetkit - pull UI components, templates and themes out of a JSON registry
//!
//! The crate resolves named assets against remote manifests, installs the
//! external packages they declare through the project's package manager, and
//! writes their source files into the project without overwriting anything
//! already there.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 add (orchestrator)                   │
//! │   namespace dispatch · ordering · result reporting   │
//! └─────────────────────────────────────────────────────┘
//!         │                 │                 │
//!         ▼                 ▼                 ▼
//!   ┌───────────┐   ┌────────────────┐   ┌──────────────┐
//!   │ Registry  │◀──│   Installers   │──▶│  Dependency  │
//!   │  Client   │   │ component/tmpl │   │  Installer   │
//!   └───────────┘   └────────────────┘   └──────────────┘
//!         │                 │                    │
//!         ▼                 ▼                    ▼
//!    HTTP / file://   NoClobberWriter     npm / yarn / pnpm / bun
//! ```

pub mod add;
pub mod cli;
pub mod config;
pub mod cwd;
pub mod error;
pub mod installer;
pub mod package_manager;
pub mod registry;
pub mod reporter;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use add::{InstallationRequest, InstallationResult, Namespace, Services};
pub use config::ProjectConfig;
pub use cwd::ScopedCwd;
pub use error::{InstallError, Result};
pub use installer::{ComponentInstaller, TemplateInstaller};
pub use package_manager::{DependencyInstaller, PackageInstaller, PackageManager};
pub use registry::{
    AssetType, Fetch, HttpFetcher, ManifestKind, RegistryClient, RegistryEntry, RegistryFile,
    RegistryManifest,
};
pub use reporter::Reporter;
pub use writer::{NoClobberWriter, WriteOutcome};
