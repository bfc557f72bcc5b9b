//! Model types shared by the scanner components and their consumers.
//!
//! Everything here is plain data: positions and ranges, diagnostics,
//! classified markers, and the serializable [`StructureReport`].

mod diagnostic;
mod marker;
mod position;
mod report;

pub use diagnostic::{Diagnostic, Severity, DIAGNOSTIC_SOURCE};
pub use marker::{FooterPart, Marker, MarkerKind, SectionKind};
pub use position::{Position, Range};
pub use report::{ObjectReport, RevisionReport, SectionReport, StructureReport, XrefEntryReport};
