//! Configuration loading for the reader.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the UI can still launch.

mod io;
mod models;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, Background, FontFamily, FontWeight, LogLevel, Rgb, ThemeMode};

pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 40;
pub const MIN_LINE_SPACING: f32 = 0.8;
pub const MAX_LINE_SPACING: f32 = 2.5;
pub const MAX_MARGIN: u16 = 120;
pub const MAX_WORD_SPACING: u32 = 5;
pub const MAX_LETTER_SPACING: u32 = 3;
/// A fully raised panel must sit above its limit, so the limit stays below 1.0.
pub const MAX_PANEL_DRAG_LIMIT: f32 = 0.95;
