//! The immutable reader session shared by the drawer and the pager.

use crate::chapter_cache::{ChapterCache, ChapterError, ChapterSource};
use crate::toc::TocEntry;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

impl ChapterSource for Box<dyn ChapterSource> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_chapter(&self, position: usize) -> Result<String, ChapterError> {
        (**self).read_chapter(position)
    }
}

/// Everything the screen needs from an opened book. Built once per load and
/// handed around as `Arc<ReaderSession>`.
pub struct ReaderSession {
    path: PathBuf,
    title: String,
    toc: Vec<TocEntry>,
    chapters: ChapterCache<Box<dyn ChapterSource>>,
}

impl ReaderSession {
    pub fn new(
        path: PathBuf,
        title: String,
        toc: Vec<TocEntry>,
        source: Box<dyn ChapterSource>,
    ) -> Self {
        Self {
            path,
            title,
            toc,
            chapters: ChapterCache::new(source),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Chapter HTML at `position`, decoded on first access.
    pub fn chapter(&self, position: usize) -> Result<Arc<str>, ChapterError> {
        self.chapters.get(position)
    }

    pub fn cached_chapter(&self, position: usize) -> Option<Arc<str>> {
        self.chapters.peek(position)
    }
}

impl fmt::Debug for ReaderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSession")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("toc_entries", &self.toc.len())
            .field("chapters", &self.chapters.len())
            .field("cached", &self.chapters.cached_count())
            .finish()
    }
}
