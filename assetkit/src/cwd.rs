//! Scoped change of the process working directory.

use std::path::{Path, PathBuf};

/// Guard that switches the process working directory and switches it back
/// when dropped, on every exit path.
///
/// The working directory is process-global; only the command entry point
/// should hold one of these, and never more than one at a time.
#[derive(Debug)]
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct ScopedCwd {
    original: PathBuf,
    current: PathBuf,
}

impl ScopedCwd {
    /// Resolve `target` to an absolute path and make it the working directory.
    pub fn enter(target: &Path) -> std::io::Result<Self> {
        let original = std::env::current_dir()?;
        let current = std::fs::canonicalize(original.join(target))?;
        std::env::set_current_dir(&current)?;
        tracing::debug!("Working directory {} -> {}", original.display(), current.display());
        Ok(Self { original, current })
    }

    /// The directory that was entered.
    pub fn path(&self) -> &Path {
        &self.current
    }

    /// The directory that will be restored.
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for ScopedCwd {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original) {
            tracing::warn!(
                "Failed to restore working directory {}: {e}",
                self.original.display()
            );
        }
    }
}
