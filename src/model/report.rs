//! Serializable summary of one analysis.

use super::{Diagnostic, Range, SectionKind, Severity};
use crate::detect::FileKind;
use serde::{Deserialize, Serialize};

/// Everything the scanner recovered, with positions already resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureReport {
    /// Document identity (path or URI)
    pub uri: String,

    /// PDF or FDF
    pub kind: FileKind,

    /// Header version, if a header was found
    pub version: Option<String>,

    /// Revisions, oldest first
    pub revisions: Vec<RevisionReport>,

    /// Cross-reference entries, by object number then revision
    pub xref: Vec<XrefEntryReport>,

    /// All diagnostics, in document order
    pub diagnostics: Vec<Diagnostic>,
}

impl StructureReport {
    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Whether any error was reported.
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Total number of objects over all revisions.
    pub fn object_count(&self) -> usize {
        self.revisions.iter().map(|r| r.objects.len()).sum()
    }
}

/// One revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionReport {
    /// Revision number (0 = original document)
    pub number: u32,
    /// Range of the whole revision
    pub range: Option<Range>,
    /// Sections in file order
    pub sections: Vec<SectionReport>,
    /// Objects declared in the body
    pub objects: Vec<ObjectReport>,
}

/// One section of a revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionReport {
    /// Section kind
    pub kind: SectionKind,
    /// Section range
    pub range: Range,
}

/// One indirect object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectReport {
    /// Object number
    pub object_number: u64,
    /// Generation number
    pub generation: u32,
    /// Range from `N G obj` to `endobj`
    pub range: Range,
    /// Range from `stream` to `endstream`
    pub stream: Option<Range>,
    /// Whether `endobj` was found
    pub terminated: bool,
}

/// One cross-reference entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrefEntryReport {
    /// Object number
    pub object_number: u64,
    /// Revision (table ordinal)
    pub revision: u32,
    /// Zero-based line of the entry
    pub line: u32,
    /// Byte offset (in use) or next free object (free)
    pub first: u64,
    /// Generation number
    pub generation: u32,
    /// In use (`n`) or free (`f`)
    pub in_use: bool,
}
