use serde::{Deserialize, Serialize};

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    #[serde(default = "default_margin")]
    pub margin: u16,
    #[serde(default)]
    pub font_family: FontFamily,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub word_spacing: u32,
    #[serde(default)]
    pub letter_spacing: u32,
    #[serde(default)]
    pub background: Background,
    #[serde(default = "default_max_shadow_alpha")]
    pub max_shadow_alpha: f32,
    #[serde(default = "default_panel_drag_limit")]
    pub panel_drag_limit: f32,
    #[serde(default = "default_show_toc")]
    pub show_toc: bool,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            theme: ThemeMode::default(),
            font_size: default_font_size(),
            line_spacing: default_line_spacing(),
            margin: default_margin(),
            font_family: FontFamily::default(),
            font_weight: FontWeight::default(),
            word_spacing: 0,
            letter_spacing: 0,
            background: Background::default(),
            max_shadow_alpha: default_max_shadow_alpha(),
            panel_drag_limit: default_panel_drag_limit(),
            show_toc: default_show_toc(),
            log_level: LogLevel::default(),
        }
    }
}

fn default_font_size() -> u32 {
    18
}

fn default_line_spacing() -> f32 {
    1.3
}

fn default_margin() -> u16 {
    24
}

fn default_max_shadow_alpha() -> f32 {
    0.6
}

fn default_panel_drag_limit() -> f32 {
    0.3
}

fn default_show_toc() -> bool {
    true
}

/// Theme mode.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    #[default]
    Day,
    Night,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Day => ThemeMode::Night,
            ThemeMode::Night => ThemeMode::Day,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeMode::Day => "Day",
            ThemeMode::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Serif,
    Sans,
    Monospace,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [FontFamily::Serif, FontFamily::Sans, FontFamily::Monospace];
}

impl std::fmt::Display for FontFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FontFamily::Serif => "Serif",
            FontFamily::Sans => "Sans",
            FontFamily::Monospace => "Monospace",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub const ALL: [FontWeight; 3] = [FontWeight::Light, FontWeight::Normal, FontWeight::Bold];
}

impl std::fmt::Display for FontWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FontWeight::Light => "Light",
            FontWeight::Normal => "Normal",
            FontWeight::Bold => "Bold",
        };
        write!(f, "{}", label)
    }
}

/// Page background swatches offered by the settings panel.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Background {
    #[default]
    Paper,
    Sepia,
    Slate,
    Black,
}

impl Background {
    pub const ALL: [Background; 4] = [
        Background::Paper,
        Background::Sepia,
        Background::Slate,
        Background::Black,
    ];

    pub fn rgb(self) -> Rgb {
        match self {
            Background::Paper => Rgb::new(0.98, 0.98, 0.96),
            Background::Sepia => Rgb::new(0.96, 0.91, 0.80),
            Background::Slate => Rgb::new(0.20, 0.23, 0.27),
            Background::Black => Rgb::new(0.05, 0.05, 0.05),
        }
    }

    /// Whether body text should switch to a light colour on this swatch.
    pub fn is_dark(self) -> bool {
        matches!(self, Background::Slate | Background::Black)
    }
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Background::Paper => "Paper",
            Background::Sepia => "Sepia",
            Background::Slate => "Slate",
            Background::Black => "Black",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
