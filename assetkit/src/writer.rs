//! No-clobber file writes.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::Result;
use crate::reporter::Reporter;

/// What happened to a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// A file was already there and was left untouched.
    Skipped,
}

/// Writes a file unless one already exists at the destination.
///
/// The filesystem decides what is "already installed"; running an install
/// twice never replaces local edits.
#[derive(Debug, Clone, Copy)]
pub struct NoClobberWriter {
    reporter: Reporter,
}

impl NoClobberWriter {
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }

    /// Write `content` to `path`, creating parent directories.
    ///
    /// An existing file yields `WriteOutcome::Skipped` and a warning.
    pub fn write(&self, path: &Path, content: &str) -> Result<WriteOutcome> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("Not overwriting {}", path.display());
                self.reporter
                    .warn(format!("{} already exists, skipping", path.display()));
                return Ok(WriteOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(content.as_bytes())?;
        tracing::debug!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(WriteOutcome::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("components").join("button.tsx");
        let writer = NoClobberWriter::new(Reporter::silent());

        assert_eq!(writer.write(&path, "export {}")?, WriteOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path)?, "export {}");
        Ok(())
    }

    #[test]
    fn test_existing_file_is_kept() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("button.tsx");
        std::fs::write(&path, "// my local edits")?;
        let writer = NoClobberWriter::new(Reporter::silent());

        assert_eq!(writer.write(&path, "upstream")?, WriteOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path)?, "// my local edits");
        Ok(())
    }
}
