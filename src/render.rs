//! Chapter HTML to display text.

use tracing::warn;

/// Use a very large width so we do not bake in hard line breaks; the UI wraps.
const RENDER_WIDTH: usize = 10_000;

/// Appearance settings that change the rendered text itself rather than how
/// the widget draws it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextLayout {
    pub word_spacing: u32,
    pub letter_spacing: u32,
}

pub fn render_chapter(html: &str, layout: TextLayout) -> String {
    let plain = match html2text::from_read(html.as_bytes(), RENDER_WIDTH) {
        Ok(clean) => clean,
        Err(err) => {
            warn!("html2text failed: {err}");
            html.to_string()
        }
    };
    let plain = plain.trim_end();
    if plain.trim().is_empty() {
        return "This chapter has no text.".to_string();
    }
    apply_spacing(plain, layout)
}

fn apply_spacing(base: &str, layout: TextLayout) -> String {
    if layout.word_spacing == 0 && layout.letter_spacing == 0 {
        return base.to_string();
    }

    let word_gap = " ".repeat((layout.word_spacing as usize).saturating_add(1));
    let letter_gap = " ".repeat(layout.letter_spacing as usize);
    let mut output = String::with_capacity(base.len() * 2);

    for ch in base.chars() {
        match ch {
            ' ' => output.push_str(&word_gap),
            '\n' => output.push('\n'),
            _ => {
                output.push(ch);
                output.push_str(&letter_gap);
            }
        }
    }

    output
}
