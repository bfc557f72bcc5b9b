//! Structural marker scanning and section/revision classification.
//!
//! A single forward regex pass finds every structural keyword. Keywords that
//! are substrings of other keywords (`xref` in `startxref`, `stream` in
//! `endstream`, `obj` in `endobj`) are kept apart by requiring a PDF
//! whitespace character (or the start of the text) in front of the keyword,
//! and a whitespace/delimiter character (or the end of the text) after it.
//! The header is the only keyword without that requirement.

use regex::bytes::{Captures, Regex};

use super::normalize::{ends_token, trim_end_offset, NormalizedDocument};
use super::Span;
use crate::model::{FooterPart, Marker, MarkerKind, SectionKind};

/// Character class for the six PDF whitespace characters.
pub(crate) const WS: &str = r"[\x00\t\n\x0C\r ]";

/// Finds structural keywords in a normalized document.
///
/// Scanners hold no per-document state: one can be reused across passes or
/// a fresh one built for each pass.
#[derive(Debug, Clone)]
pub struct MarkerScanner {
    pattern: Regex,
}

impl MarkerScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let pattern = format!(
            r"(?P<header>%(?:PDF|FDF)-[0-9]\.[0-9])|(?:^|{ws})(?:(?P<obj>[0-9]+{ws}+[0-9]+{ws}+obj)|(?P<stream>stream)|(?P<startxref>startxref)|(?P<xref>xref)|(?P<trailer>trailer)|(?P<eof>%%EOF))",
            ws = WS
        );
        Self {
            pattern: Regex::new(&pattern).expect("marker pattern is valid"),
        }
    }

    /// Scan `doc` and return its classified markers in offset order.
    pub fn scan(&self, doc: &NormalizedDocument) -> Vec<Marker> {
        let bytes = doc.as_bytes();
        let mut tracker = SectionTracker::default();
        let mut markers = Vec::new();

        for caps in self.pattern.captures_iter(bytes) {
            let Some((kind, span)) = keyword_of(&caps) else {
                continue;
            };
            if kind != MarkerKind::Header && kind != MarkerKind::Eof && !ends_token(bytes, span.end)
            {
                continue;
            }

            let (section, revision) = tracker.classify(kind);
            let text = doc.slice(span.start, span.end).to_string();
            log::trace!(
                "marker {:?} '{}' at {} -> {:?} r{}",
                kind,
                text,
                span.start,
                section,
                revision
            );
            markers.push(Marker {
                kind,
                text,
                offset: span.start,
                section,
                revision,
            });
        }

        log::debug!(
            "scanned {} markers in {} revision(s)",
            markers.len(),
            markers.last().map_or(0, |m| m.revision + 1)
        );
        markers
    }
}

impl Default for MarkerScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn keyword_of(caps: &Captures<'_>) -> Option<(MarkerKind, Span)> {
    const GROUPS: [(&str, MarkerKind); 7] = [
        ("header", MarkerKind::Header),
        ("obj", MarkerKind::Object),
        ("stream", MarkerKind::Stream),
        ("startxref", MarkerKind::StartXref),
        ("xref", MarkerKind::Xref),
        ("trailer", MarkerKind::Trailer),
        ("eof", MarkerKind::Eof),
    ];
    GROUPS
        .iter()
        .find_map(|&(name, kind)| caps.name(name).map(|m| (kind, m.start()..m.end())))
}

/// Section/revision state machine.
///
/// Revisions start at a header (unless one is already open), at the first
/// keyword of a document, and at any body or cross-reference keyword that
/// follows a footer.
#[derive(Debug, Default)]
struct SectionTracker {
    revision: Option<u32>,
    section: Option<SectionKind>,
}

impl SectionTracker {
    fn classify(&mut self, kind: MarkerKind) -> (SectionKind, u32) {
        let after_footer = self.section == Some(SectionKind::Footer);
        match kind {
            MarkerKind::Header => {
                if self.section != Some(SectionKind::Header) {
                    self.start_revision();
                }
            }
            MarkerKind::Object | MarkerKind::Stream | MarkerKind::Xref => {
                if self.revision.is_none() || after_footer {
                    self.start_revision();
                }
            }
            MarkerKind::Trailer | MarkerKind::StartXref | MarkerKind::Eof => {
                // Stray footer content still lands in revision 0.
                self.revision.get_or_insert(0);
            }
        }
        let section = kind.section();
        self.section = Some(section);
        (section, self.revision.unwrap_or(0))
    }

    fn start_revision(&mut self) {
        self.revision = Some(self.revision.map_or(0, |r| r + 1));
    }
}

/// Marker list of one document with revision/section queries.
///
/// All spans are byte offsets into the normalized document; section spans
/// run from their first marker to the start of the next foreign marker, with
/// trailing whitespace trimmed.
#[derive(Debug, Clone)]
pub struct SectionMap {
    markers: Vec<Marker>,
    extents: Vec<usize>,
}

impl SectionMap {
    /// Scan `doc` with a fresh scanner.
    pub fn build(doc: &NormalizedDocument) -> Self {
        Self::from_markers(doc, MarkerScanner::new().scan(doc))
    }

    /// Wrap an already scanned marker list.
    pub fn from_markers(doc: &NormalizedDocument, markers: Vec<Marker>) -> Self {
        let bytes = doc.as_bytes();
        let extents = markers
            .iter()
            .enumerate()
            .map(|(i, marker)| {
                if marker.kind == MarkerKind::Eof {
                    return marker.end();
                }
                let next = markers.get(i + 1).map_or(bytes.len(), |m| m.offset);
                trim_end_offset(bytes, marker.offset, next).max(marker.end())
            })
            .collect();
        Self { markers, extents }
    }

    /// All markers in offset order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of revisions (0 for a document without markers).
    pub fn num_revisions(&self) -> u32 {
        self.markers.last().map_or(0, |m| m.revision + 1)
    }

    /// Markers of one revision, with their index in [`markers`](Self::markers).
    pub fn revision_markers(&self, revision: u32) -> impl Iterator<Item = (usize, &Marker)> {
        self.markers
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.revision == revision)
    }

    /// Section kinds of a revision in file order. Repeated runs are kept, so
    /// an edited file may report e.g. `[Body, CrossReference, Body]`.
    pub fn sections(&self, revision: u32) -> Vec<SectionKind> {
        self.section_runs(revision)
            .into_iter()
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Consecutive runs of one section kind within a revision, each with
    /// the span of its own markers.
    pub fn section_runs(&self, revision: u32) -> Vec<(SectionKind, Span)> {
        let mut runs: Vec<(SectionKind, Span)> = Vec::new();
        for (index, marker) in self.revision_markers(revision) {
            match runs.last_mut() {
                Some((kind, span)) if *kind == marker.section => span.end = self.extents[index],
                _ => runs.push((marker.section, marker.offset..self.extents[index])),
            }
        }
        runs
    }

    /// Byte span covered by a marker: up to the next marker, trimmed.
    pub fn marker_span(&self, index: usize) -> Option<Span> {
        let marker = self.markers.get(index)?;
        Some(marker.offset..self.extents[index])
    }

    /// Span of a section within a revision. When the section occurs in
    /// several runs the span covers all of them.
    pub fn section_span(&self, revision: u32, section: SectionKind) -> Option<Span> {
        let mut matching = self
            .revision_markers(revision)
            .filter(|(_, m)| m.section == section)
            .map(|(i, _)| i);
        let first = matching.next()?;
        let last = matching.last().unwrap_or(first);
        Some(self.markers[first].offset..self.extents[last])
    }

    /// Span of a footer subsection within a revision.
    pub fn footer_span(&self, revision: u32, part: FooterPart) -> Option<Span> {
        let kind = part.marker_kind();
        let (index, _) = self
            .revision_markers(revision)
            .find(|(_, m)| m.kind == kind)?;
        self.marker_span(index)
    }

    /// Span of a whole revision.
    pub fn revision_span(&self, revision: u32) -> Option<Span> {
        let mut indices = self.revision_markers(revision).map(|(i, _)| i);
        let first = indices.next()?;
        let last = indices.last().unwrap_or(first);
        Some(self.markers[first].offset..self.extents[last])
    }

    /// First marker of `kind` in a revision.
    pub fn first_of(&self, revision: u32, kind: MarkerKind) -> Option<&Marker> {
        self.revision_markers(revision)
            .map(|(_, m)| m)
            .find(|m| m.kind == kind)
    }

    /// Version from the first header marker (`"1.7"` for `%PDF-1.7`).
    pub fn header_version(&self) -> Option<&str> {
        self.markers
            .iter()
            .find(|m| m.kind == MarkerKind::Header)
            .and_then(|m| m.text.get(5..))
    }
}
