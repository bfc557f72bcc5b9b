//! # pdfskel
//!
//! Structural scanner for PDF and FDF files.
//!
//! This library recovers the skeleton of a PDF or FDF document without
//! interpreting its content: revisions and their sections, indirect objects
//! and streams, and the conventional cross-reference tables. Problems are
//! reported as positioned diagnostics instead of aborting the scan, so
//! partially broken and hand-edited files still yield useful structure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfskel::{analyze_file, render};
//!
//! fn main() -> pdfskel::Result<()> {
//!     // Scan a PDF file
//!     let analysis = analyze_file("document.pdf")?;
//!
//!     for diagnostic in analysis.diagnostics() {
//!         println!("{}", diagnostic);
//!     }
//!
//!     // Print an outline of revisions, sections and objects
//!     println!("{}", render::to_text(&analysis.report()));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Revision tracking**: incremental updates are split into revisions
//! - **Object extraction**: `N G obj` ... `endobj` extents and stream spans
//! - **Cross-reference matrix**: entries per object number and revision
//! - **Diagnostics**: entry width, free list, subsection counts and offsets
//! - **Editor coordinates**: every range is a zero-based (line, character)

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_header_from_bytes, detect_kind, FileKind, HeaderInfo};
pub use error::{Error, Result};
pub use model::{
    Diagnostic, FooterPart, Marker, MarkerKind, Position, Range, SectionKind, Severity,
    StructureReport,
};
pub use parser::{
    find_references, Analysis, DocumentAnalyzer, EntryNode, ObjectReference, ParseOptions,
    PdfObject, XrefMatrix,
};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Scan a PDF or FDF file.
///
/// The file kind comes from the extension, then from the header.
///
/// # Example
///
/// ```no_run
/// use pdfskel::analyze_file;
///
/// let analysis = analyze_file("document.pdf").unwrap();
/// println!("Revisions: {}", analysis.num_revisions());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<Analysis> {
    Ok(DocumentAnalyzer::open(path)?.analyze())
}

/// Scan a file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfskel::{analyze_file_with_options, ParseOptions, Severity};
///
/// let options = ParseOptions::new()
///     .with_offset_checks(false)
///     .with_min_severity(Severity::Warning);
/// let analysis = analyze_file_with_options("edited.pdf", options).unwrap();
/// ```
pub fn analyze_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<Analysis> {
    Ok(DocumentAnalyzer::open_with_options(path, options)?.analyze())
}

/// Scan raw bytes; each byte is one character of the scanned text.
pub fn analyze_bytes(data: &[u8]) -> Analysis {
    DocumentAnalyzer::from_bytes(data).analyze()
}

/// Scan raw bytes with custom options.
pub fn analyze_bytes_with_options(data: &[u8], options: ParseOptions) -> Analysis {
    DocumentAnalyzer::from_bytes_with_options(data, options).analyze()
}

/// Scan editor text.
///
/// # Example
///
/// ```
/// let analysis = pdfskel::analyze_str("%FDF-1.2\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n");
/// assert_eq!(analysis.num_revisions(), 1);
/// assert!(analysis.diagnostics().is_empty());
/// ```
pub fn analyze_str(text: &str) -> Analysis {
    DocumentAnalyzer::from_text(text).analyze()
}

/// Scan everything a reader yields.
///
/// # Example
///
/// ```no_run
/// use pdfskel::analyze_reader;
/// use std::fs::File;
///
/// let file = File::open("document.pdf").unwrap();
/// let analysis = analyze_reader(file).unwrap();
/// ```
pub fn analyze_reader<R: Read>(reader: R) -> Result<Analysis> {
    Ok(DocumentAnalyzer::from_reader(reader)?.analyze())
}

/// Scan a file and render its report as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let analysis = analyze_file(path)?;
    render::to_json(&analysis.report(), format)
}
