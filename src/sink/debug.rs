//! Debug artifact store
//!
//! When extraction fails on a product page, the raw body (and a rendered
//! screenshot, when one is available) is kept for offline inspection. The
//! store is append-only; file names are qualified with a millisecond UTC
//! timestamp so concurrently failing extractions never collide. Write
//! failures are logged and swallowed - losing a debug artifact must never
//! fail the crawl.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes failed-extraction artifacts under a debug directory
#[derive(Debug, Clone)]
pub struct DebugStore {
    root: PathBuf,
}

impl DebugStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persists the raw page body for a product; returns the path written
    pub fn write_html(&self, product_id: &str, html: &str) -> Option<PathBuf> {
        self.write_artifact(product_id, "html", html.as_bytes())
    }

    /// Persists a rendered screenshot for a product
    pub fn write_screenshot(&self, product_id: &str, bytes: &[u8]) -> Option<PathBuf> {
        self.write_artifact(product_id, "png", bytes)
    }

    fn write_artifact(&self, product_id: &str, extension: &str, bytes: &[u8]) -> Option<PathBuf> {
        if let Err(e) = fs::create_dir_all(&self.root) {
            tracing::warn!(
                "Could not create debug directory {}: {}",
                self.root.display(),
                e
            );
            return None;
        }

        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let path = self
            .root
            .join(format!("{}_{}.{}", product_id, timestamp, extension));

        match fs::write(&path, bytes) {
            Ok(()) => {
                tracing::info!("Wrote debug artifact {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Could not write debug artifact {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Paths of artifacts recorded for a product id, any extension
    pub fn artifacts_for(&self, product_id: &str) -> Vec<PathBuf> {
        let prefix = format!("{}_", product_id);
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
