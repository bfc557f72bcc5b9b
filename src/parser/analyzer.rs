//! Structural analysis facade.
//!
//! [`DocumentAnalyzer`] loads input and runs one parse pass; the resulting
//! [`Analysis`] owns everything the pass produced and answers queries in
//! line/character coordinates.

use std::io::Read;
use std::path::Path;

use crate::detect::{detect_kind, kind_from_path, kind_from_uri, FileKind};
use crate::error::Result;
use crate::model::{
    Diagnostic, FooterPart, Marker, ObjectReport, Position, Range, RevisionReport,
    SectionKind, SectionReport, Severity, StructureReport, XrefEntryReport,
};

use super::line_index::LineIndex;
use super::markers::SectionMap;
use super::normalize::NormalizedDocument;
use super::objects::{ObjectExtractor, PdfObject};
use super::options::ParseOptions;
use super::references::{ObjectReference, ReferenceFinder};
use super::validate::Validator;
use super::xref::{EntryNode, XrefBuilder, XrefMatrix};

/// Loads a document and prepares a parse pass.
pub struct DocumentAnalyzer {
    doc: NormalizedDocument,
    uri: String,
    path_kind: Option<FileKind>,
    options: ParseOptions,
}

impl DocumentAnalyzer {
    /// Open a PDF or FDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        log::debug!("loaded {} ({} bytes)", path.display(), data.len());

        let mut analyzer = Self::from_bytes_with_options(&data, options);
        analyzer.uri = path.display().to_string();
        analyzer.path_kind = kind_from_path(path);
        Ok(analyzer)
    }

    /// Analyze raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Analyze raw bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Self {
        Self {
            doc: NormalizedDocument::from_bytes(data),
            uri: String::new(),
            path_kind: None,
            options,
        }
    }

    /// Analyze editor text.
    pub fn from_text(text: &str) -> Self {
        Self::from_text_with_options(text, ParseOptions::default())
    }

    /// Analyze editor text with custom options.
    pub fn from_text_with_options(text: &str, options: ParseOptions) -> Self {
        Self {
            doc: NormalizedDocument::new(text),
            uri: String::new(),
            path_kind: None,
            options,
        }
    }

    /// Analyze everything a reader yields.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Analyze a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes_with_options(&data, options))
    }

    /// Attach a document identity; a `.pdf`/`.fdf` suffix sets the kind.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self.path_kind = kind_from_uri(&self.uri);
        self
    }

    /// Resolved file kind: forced, then extension, then header, then PDF.
    pub fn kind(&self) -> FileKind {
        detect_kind(self.options.kind.or(self.path_kind), self.doc.as_bytes())
    }

    /// Run the parse pass.
    pub fn analyze(self) -> Analysis {
        let kind = self.kind();
        let doc = self.doc;
        let index = LineIndex::new(doc.text());
        let sections = SectionMap::build(&doc);
        let objects = ObjectExtractor::new(&doc, &sections).extract_all();
        let xref = XrefBuilder::new(&doc, &index, kind).build();

        let validation = if self.options.validate {
            Validator::new(&doc, &index, &sections, &objects, &xref, kind, &self.options).run()
        } else {
            Vec::new()
        };

        log::debug!(
            "analyzed {} as {}: {} revision(s), {} object(s)",
            if self.uri.is_empty() { "<text>" } else { self.uri.as_str() },
            kind,
            sections.num_revisions(),
            objects.len()
        );

        Analysis {
            uri: self.uri,
            kind,
            doc,
            index,
            sections,
            objects,
            xref,
            validation,
            min_severity: self.options.min_severity,
        }
    }
}

/// Result of one parse pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    uri: String,
    kind: FileKind,
    doc: NormalizedDocument,
    index: LineIndex,
    sections: SectionMap,
    objects: Vec<PdfObject>,
    xref: XrefMatrix,
    validation: Vec<Diagnostic>,
    min_severity: Severity,
}

impl Analysis {
    /// Document identity.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// PDF or FDF.
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// The normalized document.
    pub fn document(&self) -> &NormalizedDocument {
        &self.doc
    }

    /// The offset/position mapper.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Position of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        self.index.position(offset)
    }

    /// Range of a byte span.
    pub fn range(&self, span: &std::ops::Range<usize>) -> Range {
        self.index.range(span.start, span.end)
    }

    /// Classified markers in offset order.
    pub fn markers(&self) -> &[Marker] {
        self.sections.markers()
    }

    /// The marker map.
    pub fn section_map(&self) -> &SectionMap {
        &self.sections
    }

    /// Number of revisions.
    pub fn num_revisions(&self) -> u32 {
        self.sections.num_revisions()
    }

    /// Section kinds of a revision, in file order.
    pub fn sections(&self, revision: u32) -> Vec<SectionKind> {
        self.sections.sections(revision)
    }

    /// Range of a section in a revision.
    pub fn section_range(&self, revision: u32, section: SectionKind) -> Option<Range> {
        self.sections
            .section_span(revision, section)
            .map(|span| self.range(&span))
    }

    /// Range of a footer subsection in a revision.
    pub fn footer_range(&self, revision: u32, part: FooterPart) -> Option<Range> {
        self.sections
            .footer_span(revision, part)
            .map(|span| self.range(&span))
    }

    /// Range of a whole revision.
    pub fn revision_range(&self, revision: u32) -> Option<Range> {
        self.sections
            .revision_span(revision)
            .map(|span| self.range(&span))
    }

    /// Objects of every revision, in file order.
    pub fn all_objects(&self) -> &[PdfObject] {
        &self.objects
    }

    /// Objects declared in one revision.
    pub fn objects(&self, revision: u32) -> Vec<&PdfObject> {
        self.objects
            .iter()
            .filter(|o| o.revision == revision)
            .collect()
    }

    /// Whether the object carries a stream.
    pub fn has_stream(&self, object: &PdfObject) -> bool {
        object.has_stream()
    }

    /// Full range of an object.
    pub fn object_range(&self, object: &PdfObject) -> Range {
        self.range(&object.span())
    }

    /// Range of an object's stream, if any.
    pub fn stream_range(&self, object: &PdfObject) -> Option<Range> {
        object.stream.as_ref().map(|span| self.range(span))
    }

    /// Newest declaration of `object_number generation`.
    pub fn find_object(&self, object_number: u64, generation: u32) -> Option<&PdfObject> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.object_number == object_number && o.generation == generation)
    }

    /// The cross-reference matrix.
    pub fn xref(&self) -> &XrefMatrix {
        &self.xref
    }

    /// Cross-reference and validation diagnostics at or above the configured
    /// severity, in document order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = self
            .xref
            .diagnostics()
            .iter()
            .chain(self.validation.iter())
            .filter(|d| d.severity.at_least(self.min_severity))
            .cloned()
            .collect();
        diagnostics.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(a.severity.cmp(&b.severity))
        });
        diagnostics
    }

    /// Whether any error-level diagnostic was produced.
    pub fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(Diagnostic::is_error)
    }

    /// All `N G R` references in the document.
    pub fn references(&self) -> Vec<ObjectReference> {
        ReferenceFinder::new().find(self.doc.text())
    }

    /// The reference under a position.
    pub fn reference_at(&self, pos: Position) -> Option<ObjectReference> {
        let offset = self.index.offset(pos).ok()?;
        self.references()
            .into_iter()
            .find(|r| r.span.start <= offset && offset < r.span.end)
    }

    /// Declaration range of the object a reference points to.
    ///
    /// The cross-reference offset is tried first; hand-edited files often
    /// have stale offsets, so the marker list is the fallback.
    pub fn definition(&self, reference: &ObjectReference) -> Option<Range> {
        let by_offset = self
            .xref
            .byte_offset(reference.object_number, reference.generation)
            .and_then(|offset| self.declaration_at(offset))
            .filter(|o| {
                o.object_number == reference.object_number && o.generation == reference.generation
            });

        by_offset
            .or_else(|| self.find_object(reference.object_number, reference.generation))
            .map(|o| self.index.range(o.start, o.start + o.label.len()))
    }

    /// The cross-reference entry written on the line of `pos`.
    pub fn entry_at(&self, pos: Position) -> Option<&EntryNode> {
        self.xref.entry_at_line(pos.line)
    }

    /// Declaration range of the object an in-use entry points to.
    pub fn definition_of_entry(&self, entry: &EntryNode) -> Option<Range> {
        if !entry.in_use {
            return None;
        }
        let object_number = self
            .xref
            .object_for_entry(entry.first, entry.generation, true)?;
        self.declaration_at(entry.first)
            .or_else(|| self.find_object(object_number, entry.generation))
            .map(|o| self.index.range(o.start, o.start + o.label.len()))
    }

    fn declaration_at(&self, offset: u64) -> Option<&PdfObject> {
        let offset = usize::try_from(offset).ok()?;
        self.objects.iter().find(|o| o.start == offset)
    }

    /// Build the serializable report.
    pub fn report(&self) -> StructureReport {
        let revisions = (0..self.num_revisions())
            .map(|number| {
                let sections = self
                    .sections
                    .section_runs(number)
                    .into_iter()
                    .map(|(kind, span)| SectionReport {
                        kind,
                        range: self.range(&span),
                    })
                    .collect();
                let objects = self
                    .objects(number)
                    .into_iter()
                    .map(|o| ObjectReport {
                        object_number: o.object_number,
                        generation: o.generation,
                        range: self.object_range(o),
                        stream: self.stream_range(o),
                        terminated: o.terminated,
                    })
                    .collect();
                RevisionReport {
                    number,
                    range: self.revision_range(number),
                    sections,
                    objects,
                }
            })
            .collect();

        let xref = self
            .xref
            .iter()
            .map(|e| XrefEntryReport {
                object_number: e.object_number,
                revision: e.revision,
                line: e.line,
                first: e.first,
                generation: e.generation,
                in_use: e.in_use,
            })
            .collect();

        StructureReport {
            uri: self.uri.clone(),
            kind: self.kind,
            version: self.sections.header_version().map(str::to_string),
            revisions,
            xref,
            diagnostics: self.diagnostics(),
        }
    }
}
