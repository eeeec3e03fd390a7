//! One page per spine entry, rendered on demand.

use crate::chapter_cache::ChapterError;
use crate::render::{TextLayout, render_chapter};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub text: String,
    /// Bumped on every re-render so the view can tell a reload happened.
    pub revision: u64,
}

#[derive(Debug, Default)]
pub struct Pager {
    len: usize,
    current: usize,
    pages: HashMap<usize, PageView>,
    errors: HashMap<usize, ChapterError>,
    pending: HashSet<usize>,
}

impl Pager {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.len
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }

    /// Move to `position` (clamped). Returns whether the page changed.
    pub fn go_to(&mut self, position: usize) -> bool {
        if self.len == 0 {
            return false;
        }
        let target = position.min(self.len - 1);
        let changed = target != self.current;
        self.current = target;
        changed
    }

    pub fn page(&self, position: usize) -> Option<&PageView> {
        self.pages.get(&position)
    }

    pub fn error(&self, position: usize) -> Option<&ChapterError> {
        self.errors.get(&position)
    }

    pub fn is_pending(&self, position: usize) -> bool {
        self.pending.contains(&position)
    }

    /// Mark a load as in flight. Returns false when one is already running.
    pub fn begin_load(&mut self, position: usize) -> bool {
        if position >= self.len {
            return false;
        }
        self.pending.insert(position)
    }

    pub fn fail(&mut self, position: usize, error: ChapterError) {
        self.pending.remove(&position);
        self.errors.insert(position, error);
    }

    /// Render `html` into the page slot, replacing any previous rendering.
    pub fn render(&mut self, position: usize, html: &str, layout: TextLayout) {
        self.pending.remove(&position);
        self.errors.remove(&position);
        let revision = self.pages.get(&position).map_or(0, |page| page.revision + 1);
        self.pages.insert(
            position,
            PageView {
                text: render_chapter(html, layout),
                revision,
            },
        );
    }

    /// The pages a change of appearance must refresh: the current one and
    /// whichever neighbours exist.
    pub fn reload_targets(&self) -> Vec<usize> {
        reload_targets(self.current, self.len)
    }
}

pub fn reload_targets(position: usize, len: usize) -> Vec<usize> {
    if position >= len {
        return Vec::new();
    }
    let mut targets = Vec::with_capacity(3);
    if position > 0 {
        targets.push(position - 1);
    }
    targets.push(position);
    if position + 1 < len {
        targets.push(position + 1);
    }
    targets
}
