//! File cache for raw fetched HTML, one file per URL.
//!
//! Entries never expire and are never invalidated; a hit is trusted
//! indefinitely. Read and write failures are non-fatal; the caller just
//! sees a miss and fetches live.

use std::fs;
use std::path::PathBuf;

use log::{debug, error};

/// One namespace of the on-disk HTML cache. Separate namespaces (listing
/// pages vs. the external ratings site) live in separate subdirectories and
/// cannot collide even for the same literal URL.
pub struct HtmlCache {
    dir: PathBuf,
}

impl HtmlCache {
    pub fn new(root: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            dir: root.into().join(namespace),
        }
    }

    /// Deterministic cache filename: path and scheme separators rewritten
    /// to underscores, `.html` suffix.
    fn cache_path(&self, url: &str) -> PathBuf {
        let name = url.replace(['/', ':'], "_");
        self.dir.join(format!("{name}.html"))
    }

    pub fn get(&self, url: &str) -> Option<String> {
        let path = self.cache_path(url);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(body) => {
                debug!("cache hit for {url}");
                Some(body)
            }
            Err(e) => {
                error!("failed to read cache file {}: {e}", path.display());
                None
            }
        }
    }

    pub fn put(&self, url: &str, body: &str) {
        let path = self.cache_path(url);
        if let Err(e) = fs::create_dir_all(&self.dir) {
            error!("failed to create cache dir {}: {e}", self.dir.display());
            return;
        }
        match fs::write(&path, body) {
            Ok(()) => debug!("cached {url} to {}", path.display()),
            Err(e) => error!("failed to write cache file {}: {e}", path.display()),
        }
    }
}
