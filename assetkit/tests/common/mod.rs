//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use assetkit::{Fetch, InstallError, PackageInstaller, Result, Services};

pub const BASE: &str = "https://registry.test/r";

/// Absolute registry URL of `path`.
pub fn url(path: &str) -> String {
    format!("{BASE}/{path}")
}

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

    fn record(&self, packages: &[String], dev: bool, silent: bool) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(InstallCall {
                packages: packages.to_vec(),
                dev,
                silent,
            });
        }
    }
}

#[async_trait]
impl PackageInstaller for RecordingInstaller {
    async fn install(&self, packages: &[String], dev: bool, silent: bool) -> Result<()> {
        if !packages.is_empty() {
            self.record(packages, dev, silent);
        }
        Ok(())
    }
}

/// Package manager that fails every non-empty install, recording the attempt.
#[derive(Debug, Default)]
pub struct FailingInstaller {
    attempts: RecordingInstaller,
}

impl FailingInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Vec<InstallCall> {
        self.attempts.calls()
    }
}

#[async_trait]
impl PackageInstaller for FailingInstaller {
    async fn install(&self, packages: &[String], dev: bool, silent: bool) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        self.attempts.record(packages, dev, silent);
        Err(InstallError::PackageInstall {
            packages: packages.to_vec(),
            reason: "npm exited with exit status: 1".to_string(),
        })
    }
}

/// Write an `assetkit.toml` pointing at the in-memory registry.
pub fn write_config(project: &Path) -> std::io::Result<()> {
    std::fs::write(
        project.join("assetkit.toml"),
        format!(
            "[registry]\ncomponents = \"{BASE}/components.json\"\ntemplates = \"{BASE}/templates.json\"\n"
        ),
    )
}

pub fn services(fetcher: Arc<MemoryFetcher>, packages: Arc<dyn PackageInstaller>) -> Services {
    Services { fetcher, packages }
}

pub const COMPONENTS: &str = r#"{
    "components": {
        "button": {
            "name": "Button",
            "description": "A clickable button",
            "files": { "main": { "path": "button/index.tsx", "type": "component" } }
        },
        "card": {
            "id": "card",
            "name": "Card",
            "dependencies": ["card", "clsx"],
            "componentDependencies": ["button"],
            "files": { "main": { "path": "card/card.tsx", "type": "component" } }
        },
        "badge": {
            "id": "bdg",
            "name": "Badge",
            "dependencies": ["class-variance-authority"],
            "files": { "main": { "path": "badge/badge.tsx", "type": "component" } }
        },
        "glow": {
            "name": "Glow",
            "files": { "main": { "path": "glow/glow.css", "type": "theme" } }
        },
        "hero": {
            "name": "Hero",
            "files": { "main": { "path": "hero/hero.tsx", "type": "template" } }
        },
        "loop-a": {
            "name": "Loop A",
            "componentDependencies": ["loop-b"],
            "files": { "main": { "path": "loop/a.tsx", "type": "component" } }
        },
        "loop-b": {
            "name": "Loop B",
            "componentDependencies": ["loop-a"],
            "files": { "main": { "path": "loop/b.tsx", "type": "component" } }
        }
    }
}"#;

pub const TEMPLATES: &str = r#"{
    "templates": {
        "hero": {
            "name": "Hero",
            "dependencies": ["framer-motion"],
            "componentDependencies": ["badge"],
            "files": { "main": { "path": "hero/hero.tsx", "type": "template" } }
        },
        "midnight": {
            "name": "Midnight",
            "description": "Dark theme",
            "files": { "main": { "path": "midnight/theme.css", "type": "template" } }
        }
    }
}"#;

/// Registry with every file of the fixtures available.
pub fn full_registry() -> MemoryFetcher {
    MemoryFetcher::new()
        .with(&url("components.json"), COMPONENTS)
        .with(&url("templates.json"), TEMPLATES)
        .with(&url("button/index.tsx"), "export const Button = () => null;")
        .with(&url("card/card.tsx"), "export const Card = () => null;")
        .with(&url("badge/badge.tsx"), "export const Badge = () => null;")
        .with(&url("hero/hero.tsx"), "export default function Hero() {}")
        .with(&url("midnight/theme.css"), ":root { --bg: #000; }")
}
