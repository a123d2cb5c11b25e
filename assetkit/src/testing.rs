//! In-memory stand-ins for the network and the package manager.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{InstallError, Result};
use crate::package_manager::PackageInstaller;
use crate::registry::Fetch;

/// Serves fixed bodies by URL and counts requests.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, String>,
    hits: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits
            .lock()
            .map(|h| h.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().map(|h| h.values().sum()).unwrap_or(0)
    }
}

#[async_trait]
impl Fetch for MemoryFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        if let Ok(mut hits) = self.hits.lock() {
            *hits.entry(url.to_string()).or_default() += 1;
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| InstallError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// One recorded package install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCall {
    pub packages: Vec<String>,
    pub dev: bool,
    pub silent: bool,
}

/// Records non-empty install requests instead of running a package manager.
#[derive(Debug, Default)]
pub struct RecordingInstaller {
    calls: Mutex<Vec<InstallCall>>,
}

impl RecordingInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<InstallCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PackageInstaller for RecordingInstaller {
    async fn install(&self, packages: &[String], dev: bool, silent: bool) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(InstallCall {
                packages: packages.to_vec(),
                dev,
                silent,
            });
        }
        Ok(())
    }
}
