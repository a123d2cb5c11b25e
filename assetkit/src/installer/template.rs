//! Template installation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{InstallError, Result};
use crate::package_manager::PackageInstaller;
use crate::registry::{ManifestKind, RegistryClient};
use crate::reporter::Reporter;
use crate::writer::{NoClobberWriter, WriteOutcome};

use super::component::ComponentInstaller;
use super::{target_path, without_self};

/// Installs templates into `<templates_dir>/<id>/`.
pub struct TemplateInstaller<'a> {
    registry: &'a RegistryClient,
    packages: &'a dyn PackageInstaller,
    components: &'a ComponentInstaller<'a>,
    writer: NoClobberWriter,
    reporter: Reporter,
    templates_dir: PathBuf,
}

impl<'a> TemplateInstaller<'a> {
    pub fn new(
        registry: &'a RegistryClient,
        packages: &'a dyn PackageInstaller,
        components: &'a ComponentInstaller<'a>,
        reporter: Reporter,
        templates_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            packages,
            components,
            writer: NoClobberWriter::new(reporter),
            reporter,
            templates_dir,
        }
    }

    /// Install a template from the template manifest.
    ///
    /// Package dependencies go first, then component dependencies one at a
    /// time in declaration order, then the template's own files.
    ///
    /// # Returns
    ///
    /// The template's packages merged with those of every component it pulled in.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::TemplateNotFound` for an unknown template, and
    /// propagates any component, package manager, download or write failure.
    pub async fn install(&self, name: &str) -> Result<BTreeSet<String>> {
        let entry = self
            .registry
            .get_entry(ManifestKind::Templates, name)
            .await?
            .ok_or_else(|| InstallError::TemplateNotFound {
                name: name.to_string(),
            })?;

        let silent = self.reporter.is_silent();
        self.packages.install(&entry.dependencies, false, silent).await?;
        self.packages.install(&entry.dev_dependencies, true, silent).await?;

        let mut packages: BTreeSet<String> = entry
            .dependencies
            .iter()
            .chain(&entry.dev_dependencies)
            .cloned()
            .collect();

        for component in &entry.component_dependencies {
            tracing::debug!("Template {} requires component {component}", entry.key());
            packages.extend(self.components.install(component).await?);
        }

        let target_dir = self.templates_dir.join(entry.key().to_lowercase());
        std::fs::create_dir_all(&target_dir)?;

        for file in entry.files.values() {
            let content = self
                .registry
                .fetch_file(ManifestKind::Templates, &file.path)
                .await?;
            let target = target_path(&target_dir, &file.path)?;
            if self.writer.write(&target, &content)? == WriteOutcome::Written {
                self.reporter.success(format!("Created {}", target.display()));
            }
        }

        Ok(without_self(packages, &entry))
    }
}
