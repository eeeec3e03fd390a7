//! Lazily populated, position-indexed chapter HTML cache.
//!
//! One slot per spine entry. A slot is filled the first time its chapter is
//! requested and is never invalidated afterwards. Failed reads leave the slot
//! empty so the next request tries again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChapterError {
    #[error("chapter {position} is out of range (book has {len} chapters)")]
    OutOfRange { position: usize, len: usize },
    #[error("failed to read chapter {position}: {reason}")]
    Read { position: usize, reason: String },
    #[error("chapter worker failed: {0}")]
    Worker(String),
}

/// Something that can produce the raw text of a spine entry.
pub trait ChapterSource: Send + Sync {
    fn len(&self) -> usize;

    fn read_chapter(&self, position: usize) -> Result<String, ChapterError>;
}

pub struct ChapterCache<S> {
    source: S,
    slots: Vec<Mutex<Option<Arc<str>>>>,
}

impl<S: ChapterSource> ChapterCache<S> {
    pub fn new(source: S) -> Self {
        let slots = (0..source.len()).map(|_| Mutex::new(None)).collect();
        Self { source, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Return the chapter at `position`, reading it on first access.
    ///
    /// The slot lock is held across the read, so concurrent callers asking
    /// for the same position wait for one decode instead of starting their own.
    pub fn get(&self, position: usize) -> Result<Arc<str>, ChapterError> {
        let mut slot = self.slot(position)?;
        if let Some(html) = slot.as_ref() {
            return Ok(Arc::clone(html));
        }

        match self.source.read_chapter(position) {
            Ok(text) => {
                let html: Arc<str> = Arc::from(text);
                debug!(position, chars = html.len(), "Cached chapter");
                *slot = Some(Arc::clone(&html));
                Ok(html)
            }
            Err(err) => {
                warn!(position, "Chapter read failed: {err}");
                Err(err)
            }
        }
    }

    /// Return the chapter only if it has already been read.
    pub fn peek(&self, position: usize) -> Option<Arc<str>> {
        self.slot(position).ok().and_then(|slot| slot.clone())
    }

    pub fn is_cached(&self, position: usize) -> bool {
        self.peek(position).is_some()
    }

    pub fn cached_count(&self) -> usize {
        (0..self.len()).filter(|&p| self.is_cached(p)).count()
    }

    fn slot(&self, position: usize) -> Result<MutexGuard<'_, Option<Arc<str>>>, ChapterError> {
        let slot = self.slots.get(position).ok_or(ChapterError::OutOfRange {
            position,
            len: self.slots.len(),
        })?;
        // A slot only ever holds a complete value, so a poisoned lock is still usable.
        Ok(slot.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// In-memory chapters with per-position read counters.
    pub(crate) struct MemorySource {
        chapters: Mutex<Vec<String>>,
        reads: Vec<AtomicUsize>,
        failures: Mutex<HashMap<usize, usize>>,
        delay: Option<Duration>,
    }

    impl MemorySource {
        pub(crate) fn new(chapters: &[&str]) -> Self {
            Self {
                chapters: Mutex::new(chapters.iter().map(|c| c.to_string()).collect()),
                reads: chapters.iter().map(|_| AtomicUsize::new(0)).collect(),
                failures: Mutex::new(HashMap::new()),
                delay: None,
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Make the next `count` reads of `position` fail.
        pub(crate) fn fail_next(&self, position: usize, count: usize) {
            self.failures.lock().unwrap().insert(position, count);
        }

        pub(crate) fn replace(&self, position: usize, text: &str) {
            self.chapters.lock().unwrap()[position] = text.to_string();
        }

        pub(crate) fn reads(&self, position: usize) -> usize {
            self.reads[position].load(Ordering::SeqCst)
        }
    }

    impl ChapterSource for MemorySource {
        fn len(&self) -> usize {
            self.reads.len()
        }

        fn read_chapter(&self, position: usize) -> Result<String, ChapterError> {
            self.reads[position].fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&position) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ChapterError::Read {
                        position,
                        reason: "simulated I/O error".to_string(),
                    });
                }
            }
            Ok(self.chapters.lock().unwrap()[position].clone())
        }
    }

    impl<S: ChapterSource> ChapterSource for Arc<S> {
        fn len(&self) -> usize {
            (**self).len()
        }

        fn read_chapter(&self, position: usize) -> Result<String, ChapterError> {
            (**self).read_chapter(position)
        }
    }

    fn three_chapters() -> Arc<MemorySource> {
        Arc::new(MemorySource::new(&["<p>A</p>", "<p>B</p>", "<p>C</p>"]))
    }

    #[test]
    fn starts_with_empty_slots() {
        let cache = ChapterCache::new(three_chapters());
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.cached_count(), 0);
        assert!(cache.peek(0).is_none());
    }

    #[test]
    fn memoizes_first_read() {
        let source = three_chapters();
        let cache = ChapterCache::new(Arc::clone(&source));

        let first = cache.get(1).unwrap();
        assert_eq!(&*first, "<p>B</p>");

        source.replace(1, "<p>changed</p>");
        let second = cache.get(1).unwrap();
        assert_eq!(&*second, "<p>B</p>");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.reads(1), 1);
        assert_eq!(source.reads(0), 0);
        assert_eq!(cache.cached_count(), 1);
    }

    #[test]
    fn rejects_out_of_range_positions() {
        let cache = ChapterCache::new(three_chapters());
        assert_eq!(
            cache.get(3),
            Err(ChapterError::OutOfRange {
                position: 3,
                len: 3
            })
        );
        assert!(!cache.is_cached(7));
    }

    #[test]
    fn failed_read_leaves_slot_empty_for_retry() {
        let source = three_chapters();
        source.fail_next(2, 1);
        let cache = ChapterCache::new(Arc::clone(&source));

        assert!(matches!(
            cache.get(2),
            Err(ChapterError::Read { position: 2, .. })
        ));
        assert!(!cache.is_cached(2));

        assert_eq!(&*cache.get(2).unwrap(), "<p>C</p>");
        assert_eq!(source.reads(2), 2);
    }

    #[test]
    fn concurrent_requests_collapse_into_one_read() {
        let source = Arc::new(
            MemorySource::new(&["<p>A</p>", "<p>B</p>"]).with_delay(Duration::from_millis(20)),
        );
        let cache = Arc::new(ChapterCache::new(Arc::clone(&source)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get(0).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(&*handle.join().unwrap(), "<p>A</p>");
        }
        assert_eq!(source.reads(0), 1);
    }

    #[test]
    fn empty_book_has_no_slots() {
        let cache = ChapterCache::new(MemorySource::new(&[]));
        assert!(cache.is_empty());
        assert!(matches!(cache.get(0), Err(ChapterError::OutOfRange { .. })));
    }
}
