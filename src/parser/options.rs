//! Parsing options and configuration.

use crate::detect::FileKind;
use crate::model::Severity;

/// Options for a structural analysis pass.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Force the file kind (otherwise detected from extension, then header)
    pub kind: Option<FileKind>,

    /// Whether to run the document-level validation checks
    pub validate: bool,

    /// Whether to check `startxref` and cross-reference entry offsets
    pub check_offsets: bool,

    /// Diagnostics less severe than this are dropped
    pub min_severity: Severity,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the file kind.
    pub fn with_kind(mut self, kind: FileKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Treat the input as FDF.
    pub fn fdf(self) -> Self {
        self.with_kind(FileKind::Fdf)
    }

    /// Enable or disable document-level validation.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Enable or disable offset checks.
    pub fn with_offset_checks(mut self, check: bool) -> Self {
        self.check_offsets = check;
        self
    }

    /// Set the minimum reported severity.
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            kind: None,
            validate: true,
            check_offsets: true,
            min_severity: Severity::Information,
        }
    }
}
