use super::models::AppConfig;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    let mut cfg: AppConfig = toml::from_str(contents)?;
    sanitize(&mut cfg);
    Ok(cfg)
}

pub fn serialize_config(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string(config)
}

fn sanitize(cfg: &mut AppConfig) {
    cfg.font_size = cfg.font_size.clamp(super::MIN_FONT_SIZE, super::MAX_FONT_SIZE);
    cfg.line_spacing = cfg.line_spacing.clamp(super::MIN_LINE_SPACING, super::MAX_LINE_SPACING);
    cfg.margin = cfg.margin.min(super::MAX_MARGIN);
    cfg.word_spacing = cfg.word_spacing.min(super::MAX_WORD_SPACING);
    cfg.letter_spacing = cfg.letter_spacing.min(super::MAX_LETTER_SPACING);
    cfg.max_shadow_alpha = unit_or(cfg.max_shadow_alpha, AppConfig::default().max_shadow_alpha);
    cfg.panel_drag_limit = unit_or(cfg.panel_drag_limit, AppConfig::default().panel_drag_limit)
        .min(super::MAX_PANEL_DRAG_LIMIT);
}

fn unit_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}
