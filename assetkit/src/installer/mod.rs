//! Installers that turn registry entries into files and package dependencies.
//!
//! ```text
//!   TemplateInstaller ──> ComponentInstaller ──(recurses)──┐
//!          │                      │  ▲                      │
//!          │                      │  └──────────────────────┘
//!          ▼                      ▼
//!   NoClobberWriter       PackageInstaller (npm / yarn / pnpm / bun)
//! ```
//!
//! Both installers return the deduplicated set of external packages pulled
//! in by the entry and everything it depends on, never including the
//! entry's own id.

pub mod component;
pub mod template;

pub use component::ComponentInstaller;
pub use template::TemplateInstaller;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::registry::RegistryEntry;

/// Destination for a registry file: its basename inside `dir`.
pub(crate) fn target_path(dir: &Path, registry_path: &str) -> Result<PathBuf> {
    let name = Path::new(registry_path)
        .file_name()
        .ok_or_else(|| InstallError::InvalidManifest {
            reason: format!("file path '{registry_path}' has no file name"),
        })?;
    Ok(dir.join(name))
}

/// Drop the entry's own id and name from a dependency set.
pub(crate) fn without_self(mut packages: BTreeSet<String>, entry: &RegistryEntry) -> BTreeSet<String> {
    packages.retain(|p| !entry.matches(p));
    packages
}
