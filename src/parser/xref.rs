//! Conventional cross-reference table parsing.
//!
//! Every `xref` … `trailer` table in the document is parsed, oldest first,
//! and merged into an [`XrefMatrix`] indexed by object number and revision
//! (table ordinal). Structural violations become diagnostics; the scan of a
//! table always runs to its end.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::line_index::LineIndex;
use super::markers::WS;
use super::normalize::{ends_token, find_bytes, is_pdf_whitespace, NormalizedDocument};
use super::Span;
use crate::detect::FileKind;
use crate::model::{Diagnostic, Range};

/// Generation number object 0 must carry.
pub const FREE_HEAD_GENERATION: u32 = 65535;

const XREF: &[u8] = b"xref";

/// One cross-reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryNode {
    /// Zero-based line of the entry
    pub line: u32,
    /// Byte offset of the entry line
    pub offset: usize,
    /// Object number, derived from the governing subsection marker
    pub object_number: u64,
    /// First field: byte offset (in use) or next free object number (free)
    pub first: u64,
    /// Generation number
    pub generation: u32,
    /// `n` (true) or `f` (false)
    pub in_use: bool,
    /// Revision (table ordinal, oldest = 0)
    pub revision: u32,
}

/// A subsection marker line (`first count`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    /// Zero-based line of the marker
    pub line: u32,
    /// First object number
    pub first_object: u64,
    /// Number of entries announced
    pub count: u64,
}

/// Location of one conventional table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefTable {
    /// Revision (table ordinal)
    pub revision: u32,
    /// From the `xref` keyword to the table terminator
    pub span: Span,
    /// Subsection markers in order
    pub subsections: Vec<Subsection>,
}

/// Object number → revision → entry.
#[derive(Debug, Clone, Default)]
pub struct XrefMatrix {
    entries: BTreeMap<u64, BTreeMap<u32, EntryNode>>,
    tables: Vec<XrefTable>,
    diagnostics: Vec<Diagnostic>,
}

impl XrefMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry; a later entry for the same (object, revision) wins.
    pub fn insert(&mut self, entry: EntryNode) {
        self.entries
            .entry(entry.object_number)
            .or_default()
            .insert(entry.revision, entry);
    }

    /// Whether the object has any entry (free or in use, any generation).
    pub fn is_known(&self, object_number: u64) -> bool {
        self.entries.contains_key(&object_number)
    }

    /// Whether any revision declares `object_number generation` in use.
    pub fn is_in_use(&self, object_number: u64, generation: u32) -> bool {
        self.in_use_entries(object_number)
            .iter()
            .any(|e| e.generation == generation)
    }

    /// Byte offset of an in-use object, newest revision first.
    pub fn byte_offset(&self, object_number: u64, generation: u32) -> Option<u64> {
        self.entries
            .get(&object_number)?
            .values()
            .rev()
            .find(|e| e.in_use && e.generation == generation)
            .map(|e| e.first)
    }

    /// The object whose entry has this first field, generation and flag.
    pub fn object_for_entry(&self, first: u64, generation: u32, in_use: bool) -> Option<u64> {
        self.entries
            .values()
            .flat_map(|revisions| revisions.values())
            .find(|e| e.first == first && e.generation == generation && e.in_use == in_use)
            .map(|e| e.object_number)
    }

    /// In-use entries of an object across every revision, oldest first.
    pub fn in_use_entries(&self, object_number: u64) -> Vec<&EntryNode> {
        self.entries(object_number)
            .into_iter()
            .filter(|e| e.in_use)
            .collect()
    }

    /// All entries of an object, one per revision, oldest first.
    pub fn entries(&self, object_number: u64) -> Vec<&EntryNode> {
        self.entries
            .get(&object_number)
            .map(|revisions| revisions.values().collect())
            .unwrap_or_default()
    }

    /// Entry of an object in one revision.
    pub fn entry(&self, object_number: u64, revision: u32) -> Option<&EntryNode> {
        self.entries.get(&object_number)?.get(&revision)
    }

    /// The entry written on a given line.
    pub fn entry_at_line(&self, line: u32) -> Option<&EntryNode> {
        self.iter().find(|e| e.line == line)
    }

    /// Every entry, by object number then revision.
    pub fn iter(&self) -> impl Iterator<Item = &EntryNode> {
        self.entries.values().flat_map(|revisions| revisions.values())
    }

    /// Number of distinct object numbers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tables found, oldest first.
    pub fn tables(&self) -> &[XrefTable] {
        &self.tables
    }

    /// Diagnostics collected while building.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Per-table parsing state.
#[derive(Debug, Default)]
struct TableState {
    current_object: Option<u64>,
    entry_count: Option<u64>,
    subsection: Option<(Range, u64, u64)>,
    expected_free: u64,
}

/// Builds an [`XrefMatrix`] from a normalized document.
pub struct XrefBuilder<'a> {
    doc: &'a NormalizedDocument,
    index: &'a LineIndex,
    kind: FileKind,
    subsection_re: Regex,
    entry_re: Regex,
}

impl<'a> XrefBuilder<'a> {
    /// Create a builder for one parse pass.
    pub fn new(doc: &'a NormalizedDocument, index: &'a LineIndex, kind: FileKind) -> Self {
        let inline_ws = WS.replace(r"\n", "");
        let subsection = format!(
            r"^{ws}*(-?[0-9]+){ws}+(-?[0-9]+){ws}*$",
            ws = inline_ws
        );
        Self {
            doc,
            index,
            kind,
            subsection_re: Regex::new(&subsection).expect("subsection pattern is valid"),
            entry_re: Regex::new(r"^([0-9]{10}) ([0-9]{5}) ([fn])")
                .expect("entry pattern is valid"),
        }
    }

    /// Locate and parse every table.
    pub fn build(&self) -> XrefMatrix {
        let mut matrix = XrefMatrix::new();
        let bytes = self.doc.as_bytes();
        let spans = self.find_tables();

        if self.kind.requires_xref() {
            if spans.is_empty() {
                matrix.diagnostics.push(Diagnostic::error(
                    Range::document_start(),
                    "No conventional cross-reference table ('xref') found",
                ));
            }
            if find_bytes(bytes, b"startxref", 0, bytes.len()).is_none() {
                matrix.diagnostics.push(Diagnostic::error(
                    Range::document_start(),
                    "'startxref' keyword not found",
                ));
            }
        }

        let mut object_zero_seen = false;
        for (revision, span) in spans.into_iter().enumerate() {
            let table = self.parse_table(
                revision as u32,
                span,
                &mut matrix,
                &mut object_zero_seen,
            );
            matrix.tables.push(table);
        }

        log::debug!(
            "cross-reference: {} table(s), {} object(s), {} diagnostic(s)",
            matrix.tables.len(),
            matrix.len(),
            matrix.diagnostics.len()
        );
        matrix
    }

    /// Spans of all conventional tables, oldest first.
    ///
    /// `xref` hits that are the tail of `startxref` (five bytes in) are
    /// discarded, as are hits glued to a regular character on either side. A
    /// table ends at the next `trailer`, or at the next `startxref` for
    /// files without a trailer, or at the next table / `%%EOF`.
    pub fn find_tables(&self) -> Vec<Span> {
        let bytes = self.doc.as_bytes();
        let startxrefs = find_all(bytes, b"startxref");
        let trailers = find_all(bytes, b"trailer");
        let eofs = find_all(bytes, b"%%EOF");

        let starts: Vec<usize> = find_all(bytes, XREF)
            .into_iter()
            .filter(|&p| !(p >= 5 && startxrefs.binary_search(&(p - 5)).is_ok()))
            .filter(|&p| p == 0 || is_pdf_whitespace(bytes[p - 1]))
            .filter(|&p| ends_token(bytes, p + XREF.len()))
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let next_after = |list: &[usize]| list.iter().copied().find(|&q| q > start);
                let end = [
                    next_after(&trailers),
                    next_after(&startxrefs),
                    next_after(&eofs),
                    starts.get(i + 1).copied(),
                ]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(bytes.len());
                start..end
            })
            .collect()
    }

    fn parse_table(
        &self,
        revision: u32,
        span: Span,
        matrix: &mut XrefMatrix,
        object_zero_seen: &mut bool,
    ) -> XrefTable {
        let mut state = TableState::default();
        let mut subsections = Vec::new();
        let body_start = span.start + XREF.len();
        let body = self.doc.slice(body_start, span.end);

        let mut line_start = body_start;
        for line in body.split('\n') {
            let offset = line_start;
            line_start += line.len() + 1;

            if line.bytes().all(is_pdf_whitespace) {
                continue;
            }

            let illegal = self.check_illegal_chars(line, offset, matrix);

            if let Some(caps) = self.subsection_re.captures(line) {
                let range = self.line_range(offset, line);
                let first: i64 = caps[1].parse().unwrap_or(i64::MAX);
                let count: i64 = caps[2].parse().unwrap_or(i64::MAX);
                self.close_subsection(&mut state, matrix);

                if first < 0 || count < 0 {
                    matrix.diagnostics.push(Diagnostic::error(
                        range,
                        format!(
                            "Subsection marker '{} {}' must not contain negative numbers",
                            first, count
                        ),
                    ));
                    continue;
                }
                let (first, count) = (first as u64, count as u64);
                subsections.push(Subsection {
                    line: range.start.line,
                    first_object: first,
                    count,
                });
                if count > 0 {
                    state.current_object = Some(first);
                    state.entry_count = Some(count);
                    state.subsection = Some((range, first, count));
                }
                continue;
            }

            if let Some(caps) = self.entry_re.captures(line) {
                self.check_width(line, offset, matrix);
                let range = self.line_range(offset, line);

                let (object_number, remaining) = match (state.current_object, state.entry_count) {
                    (Some(object), Some(remaining)) if remaining > 0 => (object, remaining),
                    (Some(_), Some(_)) => {
                        matrix.diagnostics.push(Diagnostic::error(
                            range,
                            "Cross-reference entry exceeds the count of its subsection marker",
                        ));
                        continue;
                    }
                    _ => {
                        matrix.diagnostics.push(Diagnostic::error(
                            range,
                            "Cross-reference entry without preceding subsection marker",
                        ));
                        continue;
                    }
                };

                let entry = EntryNode {
                    line: range.start.line,
                    offset,
                    object_number,
                    first: caps[1].parse().unwrap_or(0),
                    generation: caps[2].parse().unwrap_or(0),
                    in_use: &caps[3] == "n",
                    revision,
                };
                self.check_entry(&entry, range, &mut state, object_zero_seen, matrix);
                matrix.insert(entry);

                state.current_object = Some(object_number + 1);
                state.entry_count = Some(remaining - 1);
                continue;
            }

            if !illegal {
                matrix.diagnostics.push(Diagnostic::warning(
                    self.line_range(offset, line),
                    "Unrecognized line in cross-reference table",
                ));
            }
        }

        self.close_subsection(&mut state, matrix);

        if state.expected_free != 0 {
            matrix.diagnostics.push(Diagnostic::warning(
                self.index.range(span.start, span.start + "xref".len()),
                format!(
                    "Free list does not return to object 0 (last link points to object {})",
                    state.expected_free
                ),
            ));
        }

        XrefTable {
            revision,
            span,
            subsections,
        }
    }

    /// Object 0 generation and free-list chaining.
    fn check_entry(
        &self,
        entry: &EntryNode,
        range: Range,
        state: &mut TableState,
        object_zero_seen: &mut bool,
        matrix: &mut XrefMatrix,
    ) {
        if entry.object_number == 0 && !*object_zero_seen {
            *object_zero_seen = true;
            if entry.generation != FREE_HEAD_GENERATION {
                matrix.diagnostics.push(Diagnostic::warning(
                    range,
                    format!(
                        "Object 0 must have generation number {}, found {}",
                        FREE_HEAD_GENERATION, entry.generation
                    ),
                ));
            }
        }

        // The free list is rooted at object 0 and must link back to it.
        if !entry.in_use {
            if entry.object_number != state.expected_free {
                matrix.diagnostics.push(Diagnostic::warning(
                    range,
                    format!(
                        "Free list is broken: expected free object {}, found object {}",
                        state.expected_free, entry.object_number
                    ),
                ));
            }
            state.expected_free = entry.first;
        }
    }

    /// Report a subsection that ended before delivering all its entries.
    fn close_subsection(&self, state: &mut TableState, matrix: &mut XrefMatrix) {
        if let (Some(remaining), Some((range, first, count))) =
            (state.entry_count, state.subsection.take())
        {
            if remaining > 0 {
                matrix.diagnostics.push(Diagnostic::error(
                    range,
                    format!(
                        "Subsection '{} {}' declares {} entries but only {} present",
                        first,
                        count,
                        count,
                        count - remaining
                    ),
                ));
            }
        }
        state.current_object = None;
        state.entry_count = None;
    }

    /// Warn once per line about characters other than digits, `f`, `n` and
    /// whitespace. Returns whether the line had any.
    fn check_illegal_chars(&self, line: &str, offset: usize, matrix: &mut XrefMatrix) -> bool {
        let is_legal = |b: u8| b.is_ascii_digit() || b == b'f' || b == b'n' || is_pdf_whitespace(b);
        let bytes = line.as_bytes();
        let Some(first) = bytes.iter().position(|&b| !is_legal(b)) else {
            return false;
        };
        let last = bytes.iter().rposition(|&b| !is_legal(b)).unwrap_or(first);
        matrix.diagnostics.push(Diagnostic::warning(
            self.index.range(offset + first, offset + last + 1),
            "Illegal content in cross-reference table",
        ));
        true
    }

    /// Entries are 20 bytes including a two-byte EOL; a one-byte `LF` EOL is
    /// tolerated.
    fn check_width(&self, line: &str, offset: usize, matrix: &mut XrefMatrix) {
        let bytes = line.as_bytes();
        let conforming = match bytes.len() {
            18 => true,
            19 => is_pdf_whitespace(bytes[18]),
            _ => false,
        };
        if !conforming {
            matrix.diagnostics.push(Diagnostic::warning(
                self.line_range(offset, line),
                format!(
                    "Cross-reference entries must be exactly 20 bytes long including EOL (found {})",
                    bytes.len() + 1
                ),
            ));
        }
    }

    fn line_range(&self, offset: usize, line: &str) -> Range {
        let trimmed = line.trim_end_matches(|c: char| c.is_ascii() && is_pdf_whitespace(c as u8));
        self.index.range(offset, offset + trimmed.len())
    }
}

/// Every occurrence of `needle`, in order.
fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(pos) = find_bytes(haystack, needle, from, haystack.len()) {
        found.push(pos);
        from = pos + 1;
    }
    found
}
