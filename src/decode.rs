//! Byte-to-text decoding for chapter resources.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::borrow::Cow;

static RE_XML_ENCODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap()
});

/// Decode a chapter body.
///
/// UTF-8 (with or without BOM) is tried first. Malformed input falls back to
/// the encoding named in the XML declaration, then to Windows-1252.
pub fn decode_chapter(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, malformed) = UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    if let Some(encoding) = declared_encoding(bytes) {
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(256)];
    let caps = RE_XML_ENCODING.captures(head)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}
