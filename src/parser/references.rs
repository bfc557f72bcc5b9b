//! Indirect reference (`N G R`) detection.

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use super::markers::WS;
use super::normalize::{is_pdf_delimiter, is_pdf_whitespace};
use super::Span;

/// An `N G R` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    /// Referenced object number
    pub object_number: u64,
    /// Referenced generation
    pub generation: u32,
    /// Byte span of the whole token
    pub span: Span,
}

/// Finds indirect references in document text.
#[derive(Debug, Clone)]
pub struct ReferenceFinder {
    pattern: Regex,
}

impl ReferenceFinder {
    /// Create a new finder.
    pub fn new() -> Self {
        let pattern = format!(
            r"(?:^|{ws}|[()<>\[\]{{}}/%])(?P<num>[0-9]+){ws}+(?P<gen>[0-9]+){ws}+R",
            ws = WS
        );
        Self {
            pattern: Regex::new(&pattern).expect("reference pattern is valid"),
        }
    }

    /// All references in `text`, in order. `R` must be followed by the end
    /// of the text, whitespace or a delimiter, so operators such as `RG`
    /// never match.
    pub fn find(&self, text: &str) -> Vec<ObjectReference> {
        let bytes = text.as_bytes();
        self.pattern
            .captures_iter(bytes)
            .filter_map(|caps| {
                let num = caps.name("num")?;
                let gen = caps.name("gen")?;
                let end = caps.get(0)?.end();
                let terminated = bytes
                    .get(end)
                    .map_or(true, |&b| is_pdf_whitespace(b) || is_pdf_delimiter(b));
                if !terminated {
                    return None;
                }
                Some(ObjectReference {
                    object_number: text[num.start()..num.end()].parse().ok()?,
                    generation: text[gen.start()..gen.end()].parse().ok()?,
                    span: num.start()..end,
                })
            })
            .collect()
    }
}

impl Default for ReferenceFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Find all references in `text` with a fresh finder.
pub fn find_references(text: &str) -> Vec<ObjectReference> {
    ReferenceFinder::new().find(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vs_rg_operator() {
        let text = "/Parent 10 0 R\n10 0 RG\n";
        let refs = find_references(text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].object_number, 10);
        assert_eq!(&text[refs[0].span.clone()], "10 0 R");
    }

    #[test]
    fn test_adjacent_references_in_array() {
        let refs = find_references("/Kids [3 0 R 4 0 R]");
        let ids: Vec<_> = refs.iter().map(|r| (r.object_number, r.generation)).collect();
        assert_eq!(ids, vec![(3, 0), (4, 0)]);
    }

    #[test]
    fn test_reference_after_name() {
        let refs = find_references("<</Root 1 0 R/Info 2 0 R>>");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].object_number, 2);
    }

    #[test]
    fn test_number_glued_to_word_is_not_reference() {
        assert!(find_references("x10 0 R").is_empty());
        assert!(find_references("10 0 Rx").is_empty());
    }
}
