//! Entry point for the reader.
//!
//! Parses the book path, loads `conf/config.toml` plus any per-book
//! overrides from the cache, then hands off to the GUI. The book itself is
//! opened by the app once the window exists.

mod app;
mod cache;
mod chapter_cache;
mod config;
mod decode;
mod epub_loader;
mod render;
mod session;
mod toc;

use crate::app::run_app;
use crate::cache::BookCache;
use crate::config::load_config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let epub_path = parse_args()?;
    let base_config = load_config(Path::new("conf/config.toml"));
    let book_cache = BookCache::default();

    let mut config = base_config.clone();
    if let Some(mut overrides) = book_cache.load_epub_config(&epub_path) {
        info!("Loaded per-book overrides from cache");
        overrides.log_level = base_config.log_level;
        config = overrides;
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %epub_path.display(),
        level = %config.log_level,
        "Starting reader"
    );

    let bookmark = book_cache.load_bookmark(&epub_path);
    if let Some(bm) = &bookmark {
        info!(
            chapter = bm.chapter,
            scroll_y = bm.scroll_y,
            "Resuming from cached position"
        );
    }

    run_app(epub_path, config, book_cache, bookmark).context("Failed to start the GUI")?;
    Ok(())
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: folio-viewer <path-to-book.epub>"))?;

    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }
    Ok(path)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
