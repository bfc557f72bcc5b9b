//! Document-level consistency checks.
//!
//! These complement the cross-reference builder's own diagnostics with
//! checks that need more than one component: header placement, per-revision
//! `%%EOF`, `startxref` targets, entry offsets and object cavities.

use std::collections::HashSet;

use regex::bytes::Regex;

use super::line_index::LineIndex;
use super::markers::{SectionMap, WS};
use super::normalize::{is_pdf_whitespace, NormalizedDocument};
use super::objects::{parse_object_label, PdfObject};
use super::options::ParseOptions;
use super::xref::XrefMatrix;
use crate::detect::FileKind;
use crate::model::{Diagnostic, MarkerKind, Range};

/// Runs the document-level checks over one parse pass.
pub struct Validator<'a> {
    doc: &'a NormalizedDocument,
    index: &'a LineIndex,
    sections: &'a SectionMap,
    objects: &'a [PdfObject],
    xref: &'a XrefMatrix,
    kind: FileKind,
    check_offsets: bool,
    declaration_re: Regex,
}

impl<'a> Validator<'a> {
    /// Create a validator.
    pub fn new(
        doc: &'a NormalizedDocument,
        index: &'a LineIndex,
        sections: &'a SectionMap,
        objects: &'a [PdfObject],
        xref: &'a XrefMatrix,
        kind: FileKind,
        options: &ParseOptions,
    ) -> Self {
        let declaration = format!(r"^[0-9]+{ws}+[0-9]+{ws}+obj", ws = WS);
        Self {
            doc,
            index,
            sections,
            objects,
            xref,
            kind,
            check_offsets: options.check_offsets && kind.requires_xref(),
            declaration_re: Regex::new(&declaration).expect("declaration pattern is valid"),
        }
    }

    /// Run every check.
    pub fn run(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.check_header(&mut diagnostics);
        self.check_eof(&mut diagnostics);
        self.check_objects(&mut diagnostics);
        if self.check_offsets {
            self.check_startxref(&mut diagnostics);
            self.check_entry_offsets(&mut diagnostics);
        }
        log::debug!("validation produced {} diagnostic(s)", diagnostics.len());
        diagnostics
    }

    fn marker_range(&self, offset: usize, len: usize) -> Range {
        self.index.range(offset, offset + len)
    }

    fn check_header(&self, out: &mut Vec<Diagnostic>) {
        let expected = format!("{}x.y", self.kind.header_prefix());
        let Some(header) = self
            .sections
            .markers()
            .iter()
            .find(|m| m.kind == MarkerKind::Header)
        else {
            out.push(Diagnostic::error(
                Range::document_start(),
                format!("Missing file header, expected '{}'", expected),
            ));
            return;
        };

        let first = &self.sections.markers()[0];
        if header.offset != 0 || first.kind != MarkerKind::Header {
            out.push(Diagnostic::warning(
                self.marker_range(header.offset, header.text.len()),
                format!("File should start with '{}'", expected),
            ));
        }
        if !header.text.starts_with(self.kind.header_prefix()) {
            out.push(Diagnostic::warning(
                self.marker_range(header.offset, header.text.len()),
                format!(
                    "Header '{}' does not match the {} file kind",
                    header.text, self.kind
                ),
            ));
        }
    }

    fn check_eof(&self, out: &mut Vec<Diagnostic>) {
        for revision in 0..self.sections.num_revisions() {
            if self.sections.first_of(revision, MarkerKind::Eof).is_none() {
                let last = self
                    .sections
                    .revision_markers(revision)
                    .last()
                    .map(|(_, m)| m);
                if let Some(last) = last {
                    out.push(Diagnostic::warning(
                        self.marker_range(last.offset, last.text.len()),
                        format!("Revision {} does not end with '%%EOF'", revision),
                    ));
                }
            }
        }

        let last_eof = self
            .sections
            .markers()
            .iter()
            .rev()
            .find(|m| m.kind == MarkerKind::Eof);
        if let Some(eof) = last_eof {
            let bytes = self.doc.as_bytes();
            let tail = &bytes[eof.end().min(bytes.len())..];
            if let Some(first) = tail.iter().position(|&b| !is_pdf_whitespace(b)) {
                let start = eof.end() + first;
                out.push(Diagnostic::info(
                    self.index.range(start, bytes.len()),
                    "Content after the final '%%EOF'",
                ));
            }
        }
    }

    fn check_objects(&self, out: &mut Vec<Diagnostic>) {
        let mut seen = HashSet::new();
        for object in self.objects {
            let label_range = self.marker_range(object.start, object.label.len());
            if !object.terminated {
                out.push(Diagnostic::warning(
                    label_range,
                    format!("Object {} has no matching 'endobj'", object.id()),
                ));
            }
            if !object.stream_terminated {
                out.push(Diagnostic::warning(
                    label_range,
                    format!("Stream of object {} has no matching 'endstream'", object.id()),
                ));
            }
            if !seen.insert((object.revision, object.object_number, object.generation)) {
                out.push(Diagnostic::info(
                    label_range,
                    format!(
                        "Object {} is declared more than once in revision {}",
                        object.id(),
                        object.revision
                    ),
                ));
            }
        }
    }

    /// `startxref` must point at the `xref` keyword of its revision.
    fn check_startxref(&self, out: &mut Vec<Diagnostic>) {
        let bytes = self.doc.as_bytes();
        for marker in self
            .sections
            .markers()
            .iter()
            .filter(|m| m.kind == MarkerKind::StartXref)
        {
            let Some(xref) = self.sections.first_of(marker.revision, MarkerKind::Xref) else {
                // No conventional table: assume a cross-reference stream.
                continue;
            };

            let mut pos = marker.end();
            while pos < bytes.len() && is_pdf_whitespace(bytes[pos]) {
                pos += 1;
            }
            let digits_end = bytes[pos..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |n| pos + n);

            if digits_end == pos {
                out.push(Diagnostic::warning(
                    self.marker_range(marker.offset, marker.text.len()),
                    "'startxref' must be followed by a byte offset",
                ));
                continue;
            }

            let value: Option<usize> = self.doc.slice(pos, digits_end).parse().ok();
            if value != Some(xref.offset) {
                out.push(Diagnostic::warning(
                    self.index.range(pos, digits_end),
                    format!(
                        "'startxref' offset {} does not point to the cross-reference table at offset {}",
                        self.doc.slice(pos, digits_end),
                        xref.offset
                    ),
                ));
            }
        }
    }

    /// In-use entries must point at a matching `N G obj` declaration.
    fn check_entry_offsets(&self, out: &mut Vec<Diagnostic>) {
        let bytes = self.doc.as_bytes();
        for entry in self.xref.iter().filter(|e| e.in_use) {
            let target = usize::try_from(entry.first).ok().filter(|&o| o < bytes.len());
            let found = target
                .and_then(|offset| self.declaration_re.find(&bytes[offset..]))
                .map(|m| parse_object_label(&String::from_utf8_lossy(m.as_bytes())));

            if found != Some((entry.object_number, entry.generation)) {
                out.push(Diagnostic::warning(
                    self.index.range(entry.offset, entry.offset + 18),
                    format!(
                        "Entry for object {} {} points to offset {}, which is not '{} {} obj'",
                        entry.object_number,
                        entry.generation,
                        entry.first,
                        entry.object_number,
                        entry.generation
                    ),
                ));
            }
        }
    }
}
