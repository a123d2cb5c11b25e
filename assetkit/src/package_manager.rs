//! Host package manager detection and invocation.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::OnceLock;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{InstallError, Result};

/// Adds external packages to the consuming project.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install `packages`, as dev dependencies when `dev` is set.
    ///
    /// With `silent`, child process output is discarded.
    async fn install(&self, packages: &[String], dev: bool, silent: bool) -> Result<()>;
}

/// Package manager used by the consuming project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Detect the package manager from lock files in `dir`, defaulting to npm.
    pub fn detect(dir: &Path) -> Self {
        if dir.join("bun.lockb").exists() || dir.join("bun.lock").exists() {
            Self::Bun
        } else if dir.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else if dir.join("yarn.lock").exists() {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    /// Executable name on this platform.
    pub fn program(self) -> String {
        if cfg!(windows) && self != Self::Bun {
            format!("{}.cmd", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }

    /// Arguments that add `packages`. npm uses `install --save-dev`, the rest `add -D`.
    pub fn install_args(self, packages: &[String], dev: bool) -> Vec<String> {
        let mut args = Vec::with_capacity(packages.len() + 2);
        match self {
            Self::Npm => {
                args.push("install".to_string());
                if dev {
                    args.push("--save-dev".to_string());
                }
            }
            Self::Yarn | Self::Pnpm | Self::Bun => {
                args.push("add".to_string());
                if dev {
                    args.push("-D".to_string());
                }
            }
        }
        args.extend(packages.iter().cloned());
        args
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Installs packages by shelling out to the detected package manager.
///
/// Detection happens once, on first use, against the current working directory.
#[derive(Debug, Default)]
pub struct DependencyInstaller {
    manager: OnceLock<PackageManager>,
}

impl DependencyInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installer with a fixed package manager; skips detection.
    pub fn with_manager(manager: PackageManager) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(manager);
        Self { manager: cell }
    }

    /// The package manager in use, detecting it if needed.
    pub fn manager(&self) -> PackageManager {
        *self.manager.get_or_init(|| {
            let detected = std::env::current_dir()
                .map(|dir| PackageManager::detect(&dir))
                .unwrap_or_default();
            tracing::debug!("Detected package manager: {detected}");
            detected
        })
    }
}

#[async_trait]
impl PackageInstaller for DependencyInstaller {
    async fn install(&self, packages: &[String], dev: bool, silent: bool) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        let manager = self.manager();
        let program = manager.program();
        let args = manager.install_args(packages, dev);
        tracing::info!("Running {program} {}", args.join(" "));

        let mut command = Command::new(&program);
        command.args(&args);
        if silent {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        let status = command
            .status()
            .await
            .map_err(|e| InstallError::PackageInstall {
                packages: packages.to_vec(),
                reason: format!("failed to run {program}: {e}"),
            })?;

        if !status.success() {
            return Err(InstallError::PackageInstall {
                packages: packages.to_vec(),
                reason: format!("{program} exited with {status}"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkgs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_npm_args() {
        let packages = pkgs(&["react-day-picker", "date-fns"]);
        assert_eq!(
            PackageManager::Npm.install_args(&packages, false),
            vec!["install", "react-day-picker", "date-fns"]
        );
        assert_eq!(
            PackageManager::Npm.install_args(&packages, true),
            vec!["install", "--save-dev", "react-day-picker", "date-fns"]
        );
    }

    #[test]
    fn test_add_style_args() {
        let packages = pkgs(&["clsx"]);
        for manager in [PackageManager::Yarn, PackageManager::Pnpm, PackageManager::Bun] {
            assert_eq!(manager.install_args(&packages, false), vec!["add", "clsx"]);
            assert_eq!(manager.install_args(&packages, true), vec!["add", "-D", "clsx"]);
        }
    }

    #[test]
    fn test_detect_from_lockfiles() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Npm);

        std::fs::write(dir.path().join("yarn.lock"), "")?;
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Yarn);

        std::fs::write(dir.path().join("pnpm-lock.yaml"), "")?;
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Pnpm);

        std::fs::write(dir.path().join("bun.lockb"), "")?;
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Bun);
        Ok(())
    }

    #[test]
    fn test_fixed_manager_skips_detection() {
        let installer = DependencyInstaller::with_manager(PackageManager::Pnpm);
        assert_eq!(installer.manager(), PackageManager::Pnpm);
    }

    #[tokio::test]
    async fn test_empty_install_is_noop() -> Result<()> {
        let installer = DependencyInstaller::with_manager(PackageManager::Bun);
        installer.install(&[], false, true).await
    }
}
