//! Integration tests for the cross-reference matrix builder.

use pdfskel::parser::{LineIndex, NormalizedDocument, XrefBuilder, XrefMatrix};
use pdfskel::{analyze_str, FileKind, MarkerKind, Severity};

const SCENARIO: &str = "xref\n0 3\n0000000000 65535 f\n0000000010 00000 n\n0000000020 00000 n\ntrailer\n<<>>\nstartxref\n0\n%%EOF\n";

fn build(text: &str) -> XrefMatrix {
    let doc = NormalizedDocument::new(text);
    let index = LineIndex::new(doc.text());
    XrefBuilder::new(&doc, &index, FileKind::Pdf).build()
}

#[test]
fn test_three_entry_table() {
    let matrix = build(SCENARIO);

    assert!(matrix.diagnostics().is_empty(), "{:?}", matrix.diagnostics());
    assert_eq!(matrix.byte_offset(1, 0), Some(10));
    assert_eq!(matrix.byte_offset(2, 0), Some(20));
    assert!(matrix.is_known(0));
    assert!(!matrix.is_in_use(0, 65535));
    assert_eq!(matrix.in_use_entries(1).len(), 1);
    assert_eq!(matrix.in_use_entries(2).len(), 1);
}

#[test]
fn test_wrong_object_zero_generation() {
    let text = SCENARIO.replace("0000000000 65535 f\n", "0000000000 00042 f\n");
    let matrix = build(&text);

    assert_eq!(matrix.diagnostics().len(), 1);
    let diagnostic = &matrix.diagnostics()[0];
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert!(diagnostic.message.contains("65535"));
    // reported on the entry line
    assert_eq!(diagnostic.range.start.line, 2);
}

#[test]
fn test_incremental_update_revisions() {
    let text = "%PDF-1.4\n\
                2 0 obj\n<<>>\nendobj\n\
                xref\n0 1\n0000000000 65535 f \n2 1\n0000000009 00000 n \n\
                trailer\n<< /Size 3 >>\nstartxref\n29\n%%EOF\n\
                1 0 obj\n<< /Type /Catalog >>\nendobj\n\
                xref\n0 1\n0000000000 65535 f \n1 1\n0000000123 00000 n \n\
                trailer\n<< /Size 3 /Prev 29 >>\nstartxref\n159\n%%EOF\n";
    let analysis = analyze_str(text);

    assert_eq!(analysis.num_revisions(), 2);

    let entries = analysis.xref().entries(1);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].revision, 1);

    let entries = analysis.xref().entries(2);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].revision, 0);

    // object 0 appears in both tables
    assert_eq!(analysis.xref().entries(0).len(), 2);
    assert_eq!(analysis.xref().tables().len(), 2);
}

#[test]
fn test_short_subsection_before_each_terminator() {
    for terminator in ["trailer\n<<>>\n", "startxref\n0\n", "%%EOF\n"] {
        let text = format!(
            "xref\n0 4\n0000000000 65535 f \n0000000010 00000 n \n{}",
            terminator
        );
        let matrix = build(&text);
        let errors: Vec<_> = matrix
            .diagnostics()
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();

        // the missing startxref is only reported when the terminator is not startxref
        let expected = if terminator.starts_with("startxref") { 1 } else { 2 };
        assert_eq!(errors.len(), expected, "{}: {:?}", terminator, errors);
        assert!(errors
            .iter()
            .any(|d| d.message.contains("declares 4 entries but only 2")));
        assert_eq!(matrix.len(), 2);
    }
}

#[test]
fn test_entries_beyond_table_are_ignored() {
    // An entry-shaped line after the trailer belongs to no table.
    let text = format!("{}0000000099 00000 n\n", SCENARIO);
    let matrix = build(&text);
    assert!(matrix.diagnostics().is_empty());
    assert_eq!(matrix.len(), 3);
}

#[test]
fn test_go_to_definition_from_entry() {
    let text = "%PDF-1.7\n1 0 obj\n<<>>\nendobj\nxref\n0 2\n0000000000 65535 f \n0000000009 00000 n \ntrailer\n<< /Root 1 0 R >>\nstartxref\n29\n%%EOF\n";
    let analysis = analyze_str(text);
    assert!(analysis.diagnostics().is_empty(), "{:?}", analysis.diagnostics());

    let entry = analysis
        .entry_at(pdfskel::Position::new(7, 5))
        .expect("entry on line 7");
    assert_eq!(analysis.xref().object_for_entry(9, 0, true), Some(1));

    let range = analysis.definition_of_entry(entry).unwrap();
    assert_eq!(range.start, pdfskel::Position::new(1, 0));
    assert_eq!(range.end, pdfskel::Position::new(1, 7));
}

#[test]
fn test_fdf_needs_no_table() {
    let analysis = analyze_str("%FDF-1.2\n1 0 obj\n<<>>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n");
    assert_eq!(analysis.kind(), FileKind::Fdf);
    assert!(analysis.xref().is_empty());
    assert!(analysis.diagnostics().is_empty());
}

#[test]
fn test_tables_agree_with_markers() {
    // `xrefs` in a comment is neither a marker nor a table
    let analysis = analyze_str("%PDF-1.7\n% xrefs\n1 0 obj\nendobj\n");
    let kinds: Vec<MarkerKind> = analysis.markers().iter().map(|m| m.kind).collect();

    assert_eq!(kinds, vec![MarkerKind::Header, MarkerKind::Object]);
    assert!(analysis.xref().tables().is_empty());

    let diagnostics = analysis.diagnostics();
    assert!(diagnostics
        .iter()
        .any(|d| d.severity == Severity::Error && d.message.contains("('xref')")));
    assert!(diagnostics
        .iter()
        .all(|d| !d.message.starts_with("Illegal content")));
}
