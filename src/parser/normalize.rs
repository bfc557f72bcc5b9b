//! Line-ending normalization.
//!
//! PDF allows `CR`, `LF` and `CRLF` as end-of-line markers. Every later stage
//! works on `LF`-only text, so the buffer is rewritten once per parse pass in
//! a length-preserving way: `CRLF` becomes `" \n"` and a lone `CR` becomes
//! `"\n"`. All byte offsets (including those stored in cross-reference
//! tables) therefore stay valid.

use std::borrow::Cow;

/// The six PDF whitespace characters: NUL, TAB, LF, FF, CR and SPACE.
pub fn is_pdf_whitespace(byte: u8) -> bool {
    matches!(byte, 0x00 | b'\t' | b'\n' | 0x0C | b'\r' | b' ')
}

/// PDF delimiter characters.
pub fn is_pdf_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Whether the byte at `end` terminates a keyword token.
pub fn ends_token(bytes: &[u8], end: usize) -> bool {
    bytes
        .get(end)
        .map_or(true, |&b| is_pdf_whitespace(b) || is_pdf_delimiter(b))
}

/// Normalize line endings without changing the byte length.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                out.extend_from_slice(b" \n");
                i += 2;
            }
            b'\r' => {
                out.push(b'\n');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    // Only ASCII bytes were substituted, so UTF-8 validity is preserved.
    Cow::Owned(String::from_utf8(out).unwrap_or_else(|e| {
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    }))
}

/// Decode raw file bytes one byte per character.
///
/// Bytes below 0x80 map to themselves; higher bytes are replaced by `?` so
/// the decoded text has exactly the same length as the input and every byte
/// offset in the file is a byte offset in the text.
pub fn decode_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

/// The document text for one parse pass, with normalized line endings.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    text: String,
}

impl NormalizedDocument {
    /// Normalize `text`.
    pub fn new(text: &str) -> Self {
        Self {
            text: normalize_line_endings(text).into_owned(),
        }
    }

    /// Decode and normalize raw file bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let decoded = decode_bytes(data);
        Self::new(&decoded)
    }

    /// Full normalized text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Normalized text as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Substring between two byte offsets, clamped to the document.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.text.get(start..end).unwrap_or("")
    }
}

/// Find `needle` in `haystack[from..to]`, returning an absolute offset.
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8], from: usize, to: usize) -> Option<usize> {
    let to = to.min(haystack.len());
    if needle.is_empty() || from >= to || to - from < needle.len() {
        return None;
    }
    haystack[from..to]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Offset just past the last non-whitespace byte in `bytes[start..end]`.
pub(crate) fn trim_end_offset(bytes: &[u8], start: usize, end: usize) -> usize {
    let mut end = end.min(bytes.len());
    while end > start && is_pdf_whitespace(bytes[end - 1]) {
        end -= 1;
    }
    end
}
