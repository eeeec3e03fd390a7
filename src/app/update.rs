use super::messages::Message;
use super::panel::PanelEvent;
use super::state::{App, Phase, TEXT_SCROLL_ID};
use crate::cache::Bookmark;
use crate::chapter_cache::ChapterError;
use crate::config::{
    MAX_FONT_SIZE, MAX_LETTER_SPACING, MAX_LINE_SPACING, MAX_MARGIN, MAX_WORD_SPACING,
    MIN_FONT_SIZE, MIN_LINE_SPACING,
};
use crate::epub_loader::open_session;
use crate::session::ReaderSession;
use iced::keyboard::{self, Key, Modifiers, key::Named};
use iced::widget::scrollable::{self, RelativeOffset};
use iced::{Subscription, Task};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadBook,
    BindViews,
    LoadChapter(usize),
    /// Re-render a page from the cached chapter with the current appearance.
    ReloadPage(usize),
    SaveConfig,
    SaveBookmark,
    ScrollTo(f32),
    Exit,
}

impl App {
    pub fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(shortcut)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let effects = self.reduce(message);
        if effects.is_empty() {
            Task::none()
        } else {
            Task::batch(effects.into_iter().map(|effect| self.run_effect(effect)))
        }
    }

    fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::BookLoaded(session) => self.handle_book_loaded(session, &mut effects),
            Message::ViewsBound => self.bind_views(&mut effects),
            Message::BookLoadFailed(error) => {
                warn!(path = %self.epub_path.display(), "Failed to load book: {error}");
                self.phase = Phase::Failed(error);
            }
            Message::RetryLoad => {
                if matches!(self.phase, Phase::Failed(_)) {
                    info!(path = %self.epub_path.display(), "Retrying book load");
                    self.phase = Phase::Created;
                    effects.push(Effect::LoadBook);
                }
            }
            Message::ChapterLoaded { position, result } => {
                self.handle_chapter_loaded(position, result, &mut effects)
            }
            Message::RetryChapter(position) => {
                debug!(position, "Retrying chapter read");
                effects.push(Effect::LoadChapter(position));
            }
            Message::NextPage => {
                if self.is_interactive() && self.pager.has_next() {
                    self.go_to_chapter(self.pager.current() + 1, &mut effects);
                }
            }
            Message::PreviousPage => {
                if self.is_interactive() && self.pager.has_previous() {
                    self.go_to_chapter(self.pager.current() - 1, &mut effects);
                }
            }
            Message::TocSelected(index) => {
                let target = self
                    .session
                    .as_ref()
                    .and_then(|session| session.toc().get(index))
                    .and_then(|entry| entry.spine_position);
                match target {
                    Some(position) if self.is_interactive() => {
                        self.go_to_chapter(position, &mut effects)
                    }
                    Some(_) => {}
                    None => debug!(index, "TOC entry has no spine position"),
                }
            }
            Message::ToggleDrawer => {
                self.drawer_open = !self.drawer_open;
                debug!(open = self.drawer_open, "Toggled contents drawer");
            }
            Message::CloseBook => {
                self.drawer_open = false;
                self.finish(&mut effects);
            }
            Message::ToggleSettings => {
                self.drawer_open = false;
                let events = if self.panel.is_dragged_above_limit() {
                    self.panel.move_to_rest()
                } else {
                    self.panel.raise()
                };
                self.apply_panel_events(events, &mut effects);
            }
            Message::PanelDragged(offset) => {
                let events = self.panel.drag_to(offset);
                self.apply_panel_events(events, &mut effects);
            }
            Message::ShadowClicked => {
                let events = self.panel.move_off_screen();
                self.apply_panel_events(events, &mut effects);
            }
            Message::BackgroundChanged(background) => {
                let events = self.panel.select_background(background);
                if !events.is_empty() {
                    self.config.background = background;
                    effects.push(Effect::SaveConfig);
                }
                self.apply_panel_events(events, &mut effects);
            }
            Message::ToggleTheme => {
                self.config.theme = self.config.theme.toggled();
                info!(theme = %self.config.theme, "Toggled theme");
                self.appearance_changed(&mut effects);
            }
            Message::FontSizeChanged(size) => {
                let clamped = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
                if clamped != self.config.font_size {
                    debug!(old = self.config.font_size, new = clamped, "Font size changed");
                    self.config.font_size = clamped;
                    self.appearance_changed(&mut effects);
                }
            }
            Message::FontFamilyChanged(family) => {
                if family != self.config.font_family {
                    debug!(?family, "Font family changed");
                    self.config.font_family = family;
                    self.appearance_changed(&mut effects);
                }
            }
            Message::FontWeightChanged(weight) => {
                if weight != self.config.font_weight {
                    debug!(?weight, "Font weight changed");
                    self.config.font_weight = weight;
                    self.appearance_changed(&mut effects);
                }
            }
            Message::LineSpacingChanged(spacing) => {
                self.config.line_spacing = spacing.clamp(MIN_LINE_SPACING, MAX_LINE_SPACING);
                debug!(line_spacing = self.config.line_spacing, "Line spacing changed");
                self.appearance_changed(&mut effects);
            }
            Message::MarginChanged(margin) => {
                self.config.margin = margin.min(MAX_MARGIN);
                debug!(margin = self.config.margin, "Margin changed");
                self.appearance_changed(&mut effects);
            }
            Message::WordSpacingChanged(spacing) => {
                self.config.word_spacing = spacing.min(MAX_WORD_SPACING);
                debug!(word_spacing = self.config.word_spacing, "Word spacing changed");
                self.appearance_changed(&mut effects);
            }
            Message::LetterSpacingChanged(spacing) => {
                self.config.letter_spacing = spacing.min(MAX_LETTER_SPACING);
                debug!(
                    letter_spacing = self.config.letter_spacing,
                    "Letter spacing changed"
                );
                self.appearance_changed(&mut effects);
            }
            Message::ConfigChanged => self.commit_config(&mut effects),
            Message::Scrolled(y) => {
                self.scroll_y = if y.is_finite() { y.clamp(0.0, 1.0) } else { 0.0 };
            }
            Message::Back => {
                if self.panel.is_dragged_above_limit() {
                    debug!("Back pressed with settings raised; returning panel to rest");
                    let events = self.panel.move_to_rest();
                    self.apply_panel_events(events, &mut effects);
                } else {
                    self.finish(&mut effects);
                }
            }
        }

        effects
    }

    fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::LoadBook => self.load_book_task(),
            Effect::BindViews => Task::done(Message::ViewsBound),
            Effect::LoadChapter(position) => self.load_chapter_task(position),
            Effect::ReloadPage(position) => {
                let cached = self
                    .session
                    .as_ref()
                    .and_then(|session| session.cached_chapter(position));
                match cached {
                    Some(html) => {
                        let layout = self.text_layout();
                        self.pager.render(position, &html, layout);
                        debug!(position, "Reloaded page");
                        Task::none()
                    }
                    None => self.load_chapter_task(position),
                }
            }
            Effect::SaveConfig => {
                self.book_cache.save_epub_config(&self.epub_path, &self.config);
                Task::none()
            }
            Effect::SaveBookmark => {
                self.persist_bookmark();
                Task::none()
            }
            Effect::ScrollTo(y) => {
                scrollable::snap_to(TEXT_SCROLL_ID.clone(), RelativeOffset { x: 0.0, y })
            }
            Effect::Exit => {
                info!("Closing reader");
                iced::exit()
            }
        }
    }

    pub(in crate::app) fn load_book_task(&self) -> Task<Message> {
        let path = self.epub_path.clone();
        Task::perform(
            async move { tokio::task::spawn_blocking(move || open_session(&path)).await },
            |joined| match joined {
                Ok(Ok(session)) => Message::BookLoaded(Arc::new(session)),
                Ok(Err(err)) => Message::BookLoadFailed(err.to_string()),
                Err(err) => Message::BookLoadFailed(format!("loader task failed: {err}")),
            },
        )
    }

    fn load_chapter_task(&mut self, position: usize) -> Task<Message> {
        let Some(session) = self.session.clone() else {
            return Task::none();
        };
        if !self.pager.begin_load(position) {
            debug!(position, "Chapter load already in flight or out of range");
            return Task::none();
        }
        Task::perform(
            async move { tokio::task::spawn_blocking(move || session.chapter(position)).await },
            move |joined| Message::ChapterLoaded {
                position,
                result: joined.unwrap_or_else(|err| Err(ChapterError::Worker(err.to_string()))),
            },
        )
    }

    fn handle_book_loaded(&mut self, session: Arc<ReaderSession>, effects: &mut Vec<Effect>) {
        info!(
            title = session.title(),
            path = %session.path().display(),
            chapters = session.chapter_count(),
            toc_entries = session.toc().len(),
            "Book loaded"
        );
        self.phase = Phase::Loaded;
        self.session = Some(session);
        effects.push(Effect::BindViews);
    }

    fn bind_views(&mut self, effects: &mut Vec<Effect>) {
        let Some(session) = self.session.as_ref().filter(|_| self.phase == Phase::Loaded) else {
            debug!(phase = ?self.phase, "Ignoring view binding outside the loaded phase");
            return;
        };
        self.pager = super::pager::Pager::new(session.chapter_count());

        if let Some(bookmark) = self.resume.take() {
            self.pager.go_to(bookmark.chapter);
            self.pending_scroll = Some(bookmark.scroll_y);
            info!(chapter = self.pager.current() + 1, "Resuming from bookmark");
        }

        self.phase = Phase::Ready;
        self.request_visible_pages(effects);
    }

    fn handle_chapter_loaded(
        &mut self,
        position: usize,
        result: Result<Arc<str>, ChapterError>,
        effects: &mut Vec<Effect>,
    ) {
        match result {
            Ok(html) => {
                let layout = self.text_layout();
                self.pager.render(position, &html, layout);
                if position == self.pager.current() {
                    if let Some(y) = self.pending_scroll.take() {
                        effects.push(Effect::ScrollTo(y));
                    }
                }
            }
            Err(err) => {
                warn!(position, "Chapter unavailable: {err}");
                self.pager.fail(position, err);
            }
        }
    }

    fn go_to_chapter(&mut self, position: usize, effects: &mut Vec<Effect>) {
        if self.pager.go_to(position) {
            info!(chapter = self.pager.current() + 1, "Navigated to chapter");
            self.scroll_y = 0.0;
            self.pending_scroll = None;
            effects.push(Effect::ScrollTo(0.0));
            effects.push(Effect::SaveBookmark);
        }
        self.request_visible_pages(effects);
    }

    /// Ask for the current page and its neighbours so swiping never lands on
    /// a blank page.
    fn request_visible_pages(&self, effects: &mut Vec<Effect>) {
        for position in self.pager.reload_targets() {
            if self.pager.page(position).is_none() && !self.pager.is_pending(position) {
                effects.push(Effect::LoadChapter(position));
            }
        }
    }

    fn apply_panel_events(&mut self, events: Vec<PanelEvent>, effects: &mut Vec<Effect>) {
        for event in events {
            match event {
                PanelEvent::BackgroundChanged(rgb) => {
                    debug!(?rgb, "Applying background colour");
                    self.background = rgb;
                }
                PanelEvent::ShadowAlpha(alpha) => self.shadow_alpha = alpha,
                PanelEvent::Opened => {
                    if self.phase == Phase::Ready {
                        debug!("Settings panel opened");
                        self.phase = Phase::Configuring;
                    }
                }
                PanelEvent::Closed => {
                    if self.phase == Phase::Configuring {
                        debug!("Settings panel closed");
                        self.phase = Phase::Ready;
                    }
                    if self.config_dirty {
                        self.commit_config(effects);
                    }
                }
            }
        }
    }

    /// Appearance edits are applied to pages right away unless the settings
    /// panel is raised, in which case they wait for it to close.
    fn appearance_changed(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == Phase::Configuring {
            self.config_dirty = true;
            effects.push(Effect::SaveConfig);
        } else {
            self.commit_config(effects);
        }
    }

    fn commit_config(&mut self, effects: &mut Vec<Effect>) {
        self.config_dirty = false;
        let targets = self.pager.reload_targets();
        info!(
            position = self.pager.current(),
            ?targets,
            "Reloading pages after config change"
        );
        effects.extend(targets.into_iter().map(Effect::ReloadPage));
        effects.push(Effect::SaveConfig);

        if self.phase == Phase::Configuring {
            let events = self.panel.move_to_rest();
            self.apply_panel_events(events, effects);
        }
    }

    fn finish(&mut self, effects: &mut Vec<Effect>) {
        if self.session.is_some() {
            effects.push(Effect::SaveBookmark);
        }
        self.phase = Phase::Destroyed;
        effects.push(Effect::Exit);
    }

    fn persist_bookmark(&self) {
        if self.session.is_none() {
            return;
        }
        let bookmark = Bookmark {
            chapter: self.pager.current(),
            scroll_y: self.scroll_y,
        };
        self.book_cache.save_bookmark(&self.epub_path, &bookmark);
    }
}

fn shortcut(key: Key, _modifiers: Modifiers) -> Option<Message> {
    match key {
        Key::Named(Named::Escape) => Some(Message::Back),
        Key::Named(Named::ArrowRight | Named::PageDown) => Some(Message::NextPage),
        Key::Named(Named::ArrowLeft | Named::PageUp) => Some(Message::PreviousPage),
        _ => None,
    }
}
