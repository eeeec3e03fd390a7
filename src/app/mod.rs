mod messages;
mod pager;
mod panel;
mod state;
mod update;
mod view;

pub use state::App;

use crate::cache::{BookCache, Bookmark};
use crate::config::AppConfig;
use std::path::PathBuf;

/// Launch the reader window for `epub_path`. The book is opened off the UI
/// thread once the window is up.
pub fn run_app(
    epub_path: PathBuf,
    config: AppConfig,
    book_cache: BookCache,
    bookmark: Option<Bookmark>,
) -> iced::Result {
    iced::application(App::title, App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .run_with(move || App::bootstrap(epub_path, config, book_cache, bookmark))
}
