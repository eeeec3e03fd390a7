use crate::chapter_cache::ChapterError;
use crate::config::{Background, FontFamily, FontWeight};
use crate::session::ReaderSession;
use std::sync::Arc;

/// Messages emitted by the UI and by background tasks.
#[derive(Debug, Clone)]
pub enum Message {
    BookLoaded(Arc<ReaderSession>),
    /// Drawer and pager are bound to the stored session.
    ViewsBound,
    BookLoadFailed(String),
    RetryLoad,
    ChapterLoaded {
        position: usize,
        result: Result<Arc<str>, ChapterError>,
    },
    RetryChapter(usize),
    NextPage,
    PreviousPage,
    TocSelected(usize),
    ToggleDrawer,
    CloseBook,
    ToggleSettings,
    PanelDragged(f32),
    ShadowClicked,
    BackgroundChanged(Background),
    ToggleTheme,
    FontSizeChanged(u32),
    FontFamilyChanged(FontFamily),
    FontWeightChanged(FontWeight),
    LineSpacingChanged(f32),
    MarginChanged(u16),
    WordSpacingChanged(u32),
    LetterSpacingChanged(u32),
    ConfigChanged,
    Scrolled(f32),
    Back,
}
