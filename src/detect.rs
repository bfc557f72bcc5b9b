//! File-kind detection: PDF versus FDF, from extension or header bytes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The two document families handled by the scanner.
///
/// FDF files carry no conventional cross-reference table, so the
/// "cross-reference required" validations are skipped for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Portable Document Format
    #[default]
    Pdf,
    /// Forms Data Format
    Fdf,
}

impl FileKind {
    /// Header keyword for this kind, without the version.
    pub fn header_prefix(self) -> &'static str {
        match self {
            FileKind::Pdf => "%PDF-",
            FileKind::Fdf => "%FDF-",
        }
    }

    /// Whether conventional cross-reference checks apply.
    pub fn requires_xref(self) -> bool {
        self == FileKind::Pdf
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Pdf => write!(f, "PDF"),
            FileKind::Fdf => write!(f, "FDF"),
        }
    }
}

/// Header information sniffed from the first bytes of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    /// PDF or FDF
    pub kind: FileKind,
    /// Version string (e.g., "1.7", "2.0")
    pub version: String,
}

impl fmt::Display for HeaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.version)
    }
}

const MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Derive the file kind from a path's extension (`.pdf` / `.fdf`, any case).
pub fn kind_from_path<P: AsRef<Path>>(path: P) -> Option<FileKind> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(FileKind::Pdf),
        "fdf" => Some(FileKind::Fdf),
        _ => None,
    }
}

/// Derive the file kind from a document identity such as a URI.
pub fn kind_from_uri(uri: &str) -> Option<FileKind> {
    let name = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
    kind_from_path(name)
}

/// Detect header information from bytes.
///
/// # Returns
/// * `Ok(HeaderInfo)` if the data starts with `%PDF-x.y` or `%FDF-x.y`
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_header_from_bytes(data: &[u8]) -> Result<HeaderInfo> {
    if data.len() < MAGIC_LEN + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    let kind = if data.starts_with(b"%PDF-") {
        FileKind::Pdf
    } else if data.starts_with(b"%FDF-") {
        FileKind::Fdf
    } else {
        return Err(Error::UnknownFormat);
    };

    let version_bytes = &data[MAGIC_LEN..MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(HeaderInfo { kind, version })
}

/// Resolve the kind of a document: a declared kind first, then the
/// header, then PDF.
pub fn detect_kind(declared: Option<FileKind>, data: &[u8]) -> FileKind {
    declared
        .or_else(|| detect_header_from_bytes(data).ok().map(|header| header.kind))
        .unwrap_or_default()
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        let header = detect_header_from_bytes(data).unwrap();
        assert_eq!(header.kind, FileKind::Pdf);
        assert_eq!(header.version, "1.7");
    }

    #[test]
    fn test_detect_fdf() {
        let data = b"%FDF-1.2\n%\xe2\xe3\xcf\xd3";
        let header = detect_header_from_bytes(data).unwrap();
        assert_eq!(header.kind, FileKind::Fdf);
        assert_eq!(header.to_string(), "FDF 1.2");
    }

    #[test]
    fn test_detect_invalid_format() {
        let result = detect_header_from_bytes(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_too_short() {
        let result = detect_header_from_bytes(b"%PDF");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_bad_version() {
        let result = detect_header_from_bytes(b"%PDF-x.y\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(_))));
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(kind_from_path("a/b/form.FDF"), Some(FileKind::Fdf));
        assert_eq!(kind_from_path("doc.pdf"), Some(FileKind::Pdf));
        assert_eq!(kind_from_path("notes.txt"), None);
        assert_eq!(kind_from_path("noext"), None);
    }

    #[test]
    fn test_kind_from_uri() {
        assert_eq!(
            kind_from_uri("file:///home/me/forms/data.fdf"),
            Some(FileKind::Fdf)
        );
        assert_eq!(kind_from_uri("untitled:Untitled-1"), None);
    }

    #[test]
    fn test_detect_kind_prefers_declared() {
        let declared = kind_from_path("x.fdf");
        assert_eq!(detect_kind(declared, b"%PDF-1.4\n"), FileKind::Fdf);
        assert_eq!(detect_kind(None, b"%FDF-1.2\n"), FileKind::Fdf);
        assert_eq!(detect_kind(None, b"garbage"), FileKind::Pdf);
    }
}
