//! Plain text outline rendering.

use std::fmt::{self, Write};

use crate::model::StructureReport;

/// Render a report as an indented outline: revisions, their sections and
/// objects, then diagnostics. Positions are printed 1-based.
pub fn to_text(report: &StructureReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_outline(&mut out, report);
    out
}

fn write_outline(out: &mut String, report: &StructureReport) -> fmt::Result {
    let name = if report.uri.is_empty() { "<input>" } else { report.uri.as_str() };
    write!(out, "{} ({}", name, report.kind)?;
    if let Some(version) = &report.version {
        write!(out, " {}", version)?;
    }
    writeln!(
        out,
        ", {} revision(s), {} object(s))",
        report.revisions.len(),
        report.object_count()
    )?;

    for revision in &report.revisions {
        match &revision.range {
            Some(range) => writeln!(out, "revision {} [{}]", revision.number, range)?,
            None => writeln!(out, "revision {}", revision.number)?,
        }
        for section in &revision.sections {
            writeln!(out, "  {} [{}]", section.kind, section.range)?;
        }
        for object in &revision.objects {
            write!(
                out,
                "    {} {} obj [{}]",
                object.object_number, object.generation, object.range
            )?;
            if let Some(stream) = &object.stream {
                write!(out, " stream [{}]", stream)?;
            }
            if !object.terminated {
                out.push_str(" (unterminated)");
            }
            out.push('\n');
        }
    }

    if !report.diagnostics.is_empty() {
        out.push_str("diagnostics:\n");
        for diagnostic in &report.diagnostics {
            writeln!(out, "  {}", diagnostic)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analyze_str, DocumentAnalyzer};

    #[test]
    fn test_to_text_outline() {
        let text = "%FDF-1.2\n1 0 obj\n<< /Length 3 >>\nstream\nabc\nendstream\nendobj\ntrailer\n<<>>\n%%EOF\n";
        let analysis = DocumentAnalyzer::from_text(text).with_uri("form.fdf").analyze();
        let outline = to_text(&analysis.report());

        let lines: Vec<&str> = outline.lines().collect();
        assert_eq!(lines[0], "form.fdf (FDF 1.2, 1 revision(s), 1 object(s))");
        assert!(lines[1].starts_with("revision 0 [1:1-"));
        assert!(lines[2].starts_with("  header"));
        assert!(lines[3].starts_with("  body"));
        assert!(lines.iter().any(|l| l.starts_with("    1 0 obj [2:1-") && l.contains("stream [4:1-")));
        assert!(!outline.contains("diagnostics:"));
    }

    #[test]
    fn test_to_text_lists_diagnostics() {
        let outline = to_text(&analyze_str("1 0 obj\n<<>>\n").report());
        assert!(outline.contains("(unterminated)"));
        assert!(outline.contains("diagnostics:"));
        assert!(outline.contains("error: Missing file header"));
    }
}
