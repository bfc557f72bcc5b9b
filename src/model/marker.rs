//! Structural markers and the section/revision classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of structural keywords the scanner recognises.
///
/// `endobj` and `endstream` are not markers: they are searched for relative
/// to a marker so that unterminated content ("cavities") stays detectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// `%PDF-x.y` or `%FDF-x.y`
    Header,
    /// `N G obj`
    Object,
    /// `stream`
    Stream,
    /// `xref`
    Xref,
    /// `trailer`
    Trailer,
    /// `startxref`
    StartXref,
    /// `%%EOF`
    Eof,
}

impl MarkerKind {
    /// Section a marker of this kind belongs to.
    pub fn section(self) -> SectionKind {
        match self {
            MarkerKind::Header => SectionKind::Header,
            MarkerKind::Object | MarkerKind::Stream => SectionKind::Body,
            MarkerKind::Xref => SectionKind::CrossReference,
            MarkerKind::Trailer | MarkerKind::StartXref | MarkerKind::Eof => SectionKind::Footer,
        }
    }

    /// The footer subsection this marker opens, if any.
    pub fn footer_part(self) -> Option<FooterPart> {
        match self {
            MarkerKind::Trailer => Some(FooterPart::Trailer),
            MarkerKind::StartXref => Some(FooterPart::StartXref),
            MarkerKind::Eof => Some(FooterPart::Eof),
            _ => None,
        }
    }
}

/// Coarse partition of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// File header comment
    Header,
    /// Indirect objects and streams
    Body,
    /// Conventional cross-reference table
    CrossReference,
    /// `trailer`, `startxref` and `%%EOF`
    Footer,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SectionKind::Header => "header",
            SectionKind::Body => "body",
            SectionKind::CrossReference => "cross-reference table",
            SectionKind::Footer => "footer",
        };
        f.write_str(label)
    }
}

/// Subsections of a footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterPart {
    /// `trailer` and its dictionary
    Trailer,
    /// `startxref` and its offset
    StartXref,
    /// `%%EOF`
    Eof,
}

impl FooterPart {
    /// Marker kind that opens this subsection.
    pub fn marker_kind(self) -> MarkerKind {
        match self {
            FooterPart::Trailer => MarkerKind::Trailer,
            FooterPart::StartXref => MarkerKind::StartXref,
            FooterPart::Eof => MarkerKind::Eof,
        }
    }
}

/// A located, classified structural keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Keyword kind
    pub kind: MarkerKind,
    /// Matched text, e.g. `12 0 obj` or `%PDF-1.7`
    pub text: String,
    /// Absolute byte offset of the keyword
    pub offset: usize,
    /// Section the marker was classified into
    pub section: SectionKind,
    /// Revision number (0 = original document)
    pub revision: u32,
}

impl Marker {
    /// Offset one past the matched keyword.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_sections() {
        assert_eq!(MarkerKind::Stream.section(), SectionKind::Body);
        assert_eq!(MarkerKind::Xref.section(), SectionKind::CrossReference);
        assert_eq!(MarkerKind::Eof.section(), SectionKind::Footer);
        assert_eq!(MarkerKind::Object.footer_part(), None);
        assert_eq!(
            FooterPart::StartXref.marker_kind().footer_part(),
            Some(FooterPart::StartXref)
        );
    }

    #[test]
    fn test_marker_end() {
        let marker = Marker {
            kind: MarkerKind::Object,
            text: "12 0 obj".to_string(),
            offset: 40,
            section: SectionKind::Body,
            revision: 0,
        };
        assert_eq!(marker.end(), 48);
    }
}
