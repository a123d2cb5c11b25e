//! Component installation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::package_manager::PackageInstaller;
use crate::registry::{ManifestKind, RegistryClient};
use crate::reporter::Reporter;
use crate::writer::{NoClobberWriter, WriteOutcome};

use super::{target_path, without_self};

/// Installs components into a flat components directory.
pub struct ComponentInstaller<'a> {
    registry: &'a RegistryClient,
    packages: &'a dyn PackageInstaller,
    writer: NoClobberWriter,
    reporter: Reporter,
    components_dir: PathBuf,
}

impl<'a> ComponentInstaller<'a> {
    /// Create a new component installer.
    pub fn new(
        registry: &'a RegistryClient,
        packages: &'a dyn PackageInstaller,
        reporter: Reporter,
        components_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            packages,
            writer: NoClobberWriter::new(reporter),
            reporter,
            components_dir,
        }
    }

    pub fn components_dir(&self) -> &Path {
        &self.components_dir
    }

    /// Install a component and, first, every component it depends on.
    ///
    /// # Process
    ///
    /// 1. Look up the entry in the component manifest
    /// 2. Install its `componentDependencies`, depth first, in declaration order
    /// 3. Install its `dependencies` and `devDependencies` with the package manager
    /// 4. Download each declared file and write it without overwriting
    ///
    /// # Returns
    ///
    /// The external packages pulled in by this component and its dependency
    /// closure, excluding the component's own id and name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The component (or one it depends on) is not in the registry
    /// - The dependency graph loops back on itself
    /// - The package manager, a download, or a file write fails
    pub async fn install(&self, id: &str) -> Result<BTreeSet<String>> {
        let mut chain = Vec::new();
        self.install_with_chain(id, &mut chain).await
    }

    async fn install_with_chain(
        &self,
        id: &str,
        chain: &mut Vec<String>,
    ) -> Result<BTreeSet<String>> {
        let entry = self
            .registry
            .get_entry(ManifestKind::Components, id)
            .await?
            .ok_or_else(|| InstallError::ComponentNotFound {
                name: id.to_string(),
            })?;

        let key = entry.key().to_lowercase();
        if chain.contains(&key) {
            let mut cycle = chain.clone();
            cycle.push(key);
            return Err(InstallError::CyclicDependency { chain: cycle });
        }
        chain.push(key);

        let mut packages = BTreeSet::new();
        for dependency in &entry.component_dependencies {
            tracing::debug!("{} requires component {dependency}", entry.key());
            let nested = Box::pin(self.install_with_chain(dependency, chain)).await?;
            packages.extend(nested);
        }

        let silent = self.reporter.is_silent();
        self.packages.install(&entry.dependencies, false, silent).await?;
        self.packages.install(&entry.dev_dependencies, true, silent).await?;
        packages.extend(entry.dependencies.iter().cloned());
        packages.extend(entry.dev_dependencies.iter().cloned());

        for file in entry.files.values() {
            let content = self
                .registry
                .fetch_file(ManifestKind::Components, &file.path)
                .await?;
            let target = target_path(&self.components_dir, &file.path)?;
            if self.writer.write(&target, &content)? == WriteOutcome::Written {
                self.reporter.success(format!("Created {}", target.display()));
            }
        }

        chain.pop();
        Ok(without_self(packages, &entry))
    }
}
