//! Per-book state remembered between sessions.
//!
//! Files are stored under `.cache/` using a hash of the EPUB path as the
//! directory name to avoid filesystem issues. Each book gets a
//! `bookmark.toml` with the last chapter and a `config.toml` with appearance
//! overrides.

use crate::config::{AppConfig, parse_config, serialize_config};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CACHE_DIR: &str = ".cache";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub chapter: usize,
    #[serde(default)]
    pub scroll_y: f32,
}

/// Where per-book files live. Tests point this at a scratch directory.
#[derive(Debug, Clone)]
pub struct BookCache {
    root: PathBuf,
}

impl Default for BookCache {
    fn default() -> Self {
        Self::new(CACHE_DIR)
    }
}

impl BookCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn hash_dir(&self, epub_path: &Path) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(epub_path.as_os_str().to_string_lossy().as_bytes());
        let hash = format!("{:x}", hasher.finalize());
        self.root.join(hash)
    }

    pub fn load_bookmark(&self, epub_path: &Path) -> Option<Bookmark> {
        let path = self.hash_dir(epub_path).join("bookmark.toml");
        let data = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(
                    path = %path.display(),
                    "No cached bookmark found or unreadable: {err}"
                );
                return None;
            }
        };
        match toml::from_str::<Bookmark>(&data) {
            Ok(bookmark) => {
                debug!(chapter = bookmark.chapter, "Loaded bookmark");
                Some(bookmark)
            }
            Err(err) => {
                warn!(path = %path.display(), "Cached bookmark invalid: {err}");
                None
            }
        }
    }

    /// Persist the bookmark. Errors are logged and ignored to keep the UI responsive.
    pub fn save_bookmark(&self, epub_path: &Path, bookmark: &Bookmark) {
        let dir = self.hash_dir(epub_path);
        let path = dir.join("bookmark.toml");
        if let Err(err) = fs::create_dir_all(&dir) {
            warn!(path = %dir.display(), "Failed to create cache dir: {err}");
            return;
        }
        match toml::to_string(bookmark) {
            Ok(contents) => {
                if let Err(err) = fs::write(&path, contents) {
                    warn!(path = %path.display(), "Failed to persist bookmark: {err}");
                } else {
                    debug!(chapter = bookmark.chapter, "Saved bookmark");
                }
            }
            Err(err) => warn!("Failed to serialize bookmark: {err}"),
        }
    }

    pub fn load_epub_config(&self, epub_path: &Path) -> Option<AppConfig> {
        let path = self.hash_dir(epub_path).join("config.toml");
        let data = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(
                    path = %path.display(),
                    "No cached EPUB config found or unreadable: {err}"
                );
                return None;
            }
        };
        match parse_config(&data) {
            Ok(cfg) => {
                debug!("Loaded cached EPUB config");
                Some(cfg)
            }
            Err(err) => {
                warn!("Cached EPUB config invalid: {err}");
                None
            }
        }
    }

    pub fn save_epub_config(&self, epub_path: &Path, config: &AppConfig) {
        let dir = self.hash_dir(epub_path);
        let path = dir.join("config.toml");
        if let Err(err) = fs::create_dir_all(&dir) {
            warn!(path = %dir.display(), "Failed to create cache dir: {err}");
            return;
        }
        match serialize_config(config) {
            Ok(contents) => {
                if let Err(err) = fs::write(&path, contents) {
                    warn!(path = %path.display(), "Failed to save EPUB config: {err}");
                } else {
                    debug!(path = %path.display(), "Persisted EPUB config");
                }
            }
            Err(err) => warn!("Failed to serialize EPUB config: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Background;
    use tempfile::TempDir;

    #[test]
    fn hash_dir_is_stable_per_path() {
        let cache = BookCache::new("/tmp/cache-root");
        let a = cache.hash_dir(Path::new("/books/a.epub"));
        assert_eq!(a, cache.hash_dir(Path::new("/books/a.epub")));
        assert_ne!(a, cache.hash_dir(Path::new("/books/b.epub")));
        assert!(a.starts_with("/tmp/cache-root"));
    }

    #[test]
    fn bookmark_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let cache = BookCache::new(dir.path());
        let book = Path::new("/books/a.epub");
        assert!(cache.load_bookmark(book).is_none());

        let bookmark = Bookmark {
            chapter: 4,
            scroll_y: 0.25,
        };
        cache.save_bookmark(book, &bookmark);
        assert_eq!(cache.load_bookmark(book), Some(bookmark));
    }

    #[test]
    fn per_book_config_overrides() {
        let dir = TempDir::new().unwrap();
        let cache = BookCache::new(dir.path());
        let book = Path::new("/books/a.epub");

        let mut config = AppConfig::default();
        config.background = Background::Black;
        config.font_size = 24;
        cache.save_epub_config(book, &config);

        assert_eq!(cache.load_epub_config(book), Some(config));
        assert!(cache.load_epub_config(Path::new("/books/other.epub")).is_none());
    }
}
