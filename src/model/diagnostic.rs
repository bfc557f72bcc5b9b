//! Diagnostics collected during a parse pass.

use super::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source tag attached to every diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "pdfskel";

/// Diagnostic severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A violation of the file format
    Error,
    /// Suspicious structure that readers usually tolerate
    Warning,
    /// Purely informative observation
    Information,
}

impl Severity {
    /// Whether this severity is at least as severe as `threshold`.
    pub fn at_least(self, threshold: Severity) -> bool {
        self <= threshold
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Information
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
        };
        f.write_str(label)
    }
}

/// One structural observation about the document.
///
/// Diagnostics never interrupt parsing; they are accumulated alongside
/// whatever structure could be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the problem is
    pub severity: Severity,
    /// Where the problem is
    pub range: Range,
    /// Human readable message
    pub message: String,
    /// Fixed source tag
    pub source: String,
}

impl Diagnostic {
    /// Create a diagnostic with the crate's source tag.
    pub fn new(severity: Severity, range: Range, message: impl Into<String>) -> Self {
        Self {
            severity,
            range,
            message: message.into(),
            source: DIAGNOSTIC_SOURCE.to_string(),
        }
    }

    /// Create an error diagnostic.
    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, range, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, range, message)
    }

    /// Create an informational diagnostic.
    pub fn info(range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Information, range, message)
    }

    /// Whether this is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.range.start, self.severity, self.message)
    }
}
