//! PDF/FDF structural scanning.

mod analyzer;
mod line_index;
mod markers;
mod normalize;
mod objects;
mod options;
mod references;
mod validate;
mod xref;

/// Half-open byte span in the normalized document.
pub type Span = std::ops::Range<usize>;

pub use analyzer::{Analysis, DocumentAnalyzer};
pub use line_index::LineIndex;
pub use markers::{MarkerScanner, SectionMap};
pub use normalize::{
    decode_bytes, is_pdf_delimiter, is_pdf_whitespace, normalize_line_endings,
    NormalizedDocument,
};
pub use objects::{ObjectExtractor, PdfObject};
pub use options::ParseOptions;
pub use references::{find_references, ObjectReference, ReferenceFinder};
pub use validate::Validator;
pub use xref::{EntryNode, Subsection, XrefBuilder, XrefMatrix, XrefTable, FREE_HEAD_GENERATION};
