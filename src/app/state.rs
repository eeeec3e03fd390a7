use super::messages::Message;
use super::pager::Pager;
use super::panel::ConfigPanel;
use crate::cache::{BookCache, Bookmark};
use crate::config::{AppConfig, Rgb};
use crate::render::TextLayout;
use crate::session::ReaderSession;
use iced::Task;
use iced::widget::scrollable::Id as ScrollId;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) static TEXT_SCROLL_ID: Lazy<ScrollId> = Lazy::new(|| ScrollId::new("chapter-scroll"));

/// Lifecycle of the reader screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Window is up, the book is still being opened.
    Created,
    /// Book parsed and the session stored; the pager is bound on the next step.
    Loaded,
    Ready,
    /// Settings panel raised above its drag limit.
    Configuring,
    Failed(String),
    Destroyed,
}

/// Core application state.
pub struct App {
    pub(in crate::app) phase: Phase,
    pub(in crate::app) epub_path: PathBuf,
    pub(in crate::app) config: AppConfig,
    pub(in crate::app) book_cache: BookCache,
    pub(in crate::app) session: Option<Arc<ReaderSession>>,
    pub(in crate::app) pager: Pager,
    pub(in crate::app) panel: ConfigPanel,
    pub(in crate::app) drawer_open: bool,
    pub(in crate::app) shadow_alpha: f32,
    /// Appearance edited while the panel was raised and not yet applied to pages.
    pub(in crate::app) config_dirty: bool,
    pub(in crate::app) resume: Option<Bookmark>,
    pub(in crate::app) pending_scroll: Option<f32>,
    pub(in crate::app) scroll_y: f32,
    pub(in crate::app) background: Rgb,
}

impl App {
    pub fn new(
        epub_path: PathBuf,
        config: AppConfig,
        book_cache: BookCache,
        resume: Option<Bookmark>,
    ) -> Self {
        let panel = ConfigPanel::new(
            config.panel_drag_limit,
            config.max_shadow_alpha,
            config.background,
        );
        Self {
            phase: Phase::Created,
            epub_path,
            drawer_open: config.show_toc,
            background: config.background.rgb(),
            config,
            book_cache,
            session: None,
            pager: Pager::default(),
            panel,
            shadow_alpha: 0.0,
            config_dirty: false,
            resume,
            pending_scroll: None,
            scroll_y: 0.0,
        }
    }

    pub fn bootstrap(
        epub_path: PathBuf,
        config: AppConfig,
        book_cache: BookCache,
        resume: Option<Bookmark>,
    ) -> (Self, Task<Message>) {
        let app = Self::new(epub_path, config, book_cache, resume);
        let task = app.load_book_task();
        (app, task)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn title(&self) -> String {
        match &self.session {
            Some(session) => format!("{} - Folio", session.title()),
            None => "Folio".to_string(),
        }
    }

    pub(in crate::app) fn text_layout(&self) -> TextLayout {
        TextLayout {
            word_spacing: self.config.word_spacing,
            letter_spacing: self.config.letter_spacing,
        }
    }

    pub(in crate::app) fn is_interactive(&self) -> bool {
        matches!(self.phase, Phase::Ready | Phase::Configuring)
    }
}
