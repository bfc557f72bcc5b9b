//! Property tests for normalization, the cross-reference matrix and the
//! object extractor.

use proptest::prelude::*;

use pdfskel::parser::{normalize_line_endings, LineIndex, NormalizedDocument, XrefBuilder, XrefMatrix};
use pdfskel::{analyze_str, FileKind, Severity};

fn build(text: &str, kind: FileKind) -> XrefMatrix {
    let doc = NormalizedDocument::new(text);
    let index = LineIndex::new(doc.text());
    XrefBuilder::new(&doc, &index, kind).build()
}

/// One table over objects `0..=flags.len()`: object 0 heads a free list
/// through every free object in ascending order.
fn table(flags: &[(bool, u32)]) -> (String, Vec<(u64, u32, bool)>) {
    let free: Vec<u64> = flags
        .iter()
        .enumerate()
        .filter(|(_, (in_use, _))| !in_use)
        .map(|(i, _)| i as u64 + 1)
        .collect();
    let next_free = |object: u64| free.iter().copied().find(|&f| f > object).unwrap_or(0);

    let mut expected = vec![(next_free(0), 65535, false)];
    for (i, &(in_use, generation)) in flags.iter().enumerate() {
        let object = i as u64 + 1;
        if in_use {
            expected.push((100 * object, generation, true));
        } else {
            expected.push((next_free(object), generation, false));
        }
    }

    let mut text = format!("xref\n0 {}\n", expected.len());
    for (first, generation, in_use) in &expected {
        text.push_str(&format!(
            "{:010} {:05} {} \n",
            first,
            generation,
            if *in_use { 'n' } else { 'f' }
        ));
    }
    text.push_str("trailer\n<<>>\nstartxref\n0\n%%EOF\n");
    (text, expected)
}

proptest! {
    /// Property: LF-only text is left untouched, and normalizing twice
    /// equals normalizing once
    #[test]
    fn normalization_is_idempotent(input in "[ -~\n]{0,200}") {
        let once = normalize_line_endings(&input).into_owned();
        prop_assert_eq!(&once, &input);
        let twice = normalize_line_endings(&once).into_owned();
        prop_assert_eq!(twice.len(), input.len());
        prop_assert_eq!(twice, once);
    }

    /// Property: line endings of any kind keep every offset in place
    #[test]
    fn normalization_preserves_length(input in "[ -~\r\n]{0,200}") {
        let once = normalize_line_endings(&input).into_owned();
        prop_assert_eq!(once.len(), input.len());
        prop_assert!(!once.contains('\r'));
        prop_assert_eq!(normalize_line_endings(&once).into_owned(), once);
    }

    /// Property: entries written into one table are read back unchanged,
    /// in object order, without diagnostics
    #[test]
    fn table_round_trip(flags in prop::collection::vec((any::<bool>(), 0u32..10), 0..30)) {
        let (text, expected) = table(&flags);
        let matrix = build(&text, FileKind::Pdf);

        prop_assert!(matrix.diagnostics().is_empty(), "{:?}", matrix.diagnostics());
        prop_assert_eq!(matrix.len(), expected.len());
        for (object, (first, generation, in_use)) in expected.iter().enumerate() {
            let entries = matrix.entries(object as u64);
            prop_assert_eq!(entries.len(), 1);
            prop_assert_eq!(entries[0].first, *first);
            prop_assert_eq!(entries[0].generation, *generation);
            prop_assert_eq!(entries[0].in_use, *in_use);
            prop_assert_eq!(entries[0].revision, 0);
        }
    }

    /// Property: every paired stream is found and lies inside its object
    #[test]
    fn streams_are_contained(contents in prop::collection::vec("[A-Z0-9]{0,20}", 0..10)) {
        let mut text = String::from("%PDF-1.7\n");
        for (i, content) in contents.iter().enumerate() {
            text.push_str(&format!(
                "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                i + 1,
                content.len(),
                content
            ));
        }
        let analysis = analyze_str(&text);
        let objects = analysis.all_objects();

        prop_assert_eq!(objects.len(), contents.len());
        for object in objects {
            let stream = object.stream.clone();
            prop_assert!(stream.is_some());
            let stream = stream.unwrap_or_default();
            prop_assert!(object.start < stream.start && stream.end < object.end);

            let object_range = analysis.object_range(object);
            let stream_range = analysis.stream_range(object).unwrap_or_default();
            prop_assert!(object_range.encloses(&stream_range));
        }
    }

    /// Property: a subsection with fewer entries than announced yields
    /// exactly one error, whatever ends the table
    #[test]
    fn short_subsection_single_error(
        declared in 2u64..20,
        missing in 1u64..20,
        terminator in prop::sample::select(vec!["trailer\n<<>>\n", "startxref\n0\n", "%%EOF\n"]),
    ) {
        let present = declared.saturating_sub(missing).min(declared - 1);
        let mut text = format!("xref\n10 {}\n", declared);
        for i in 0..present {
            text.push_str(&format!("{:010} 00000 n \n", 100 + i));
        }
        text.push_str(terminator);

        // FDF: no missing-keyword errors, only the table's own
        let matrix = build(&text, FileKind::Fdf);
        let errors: Vec<_> = matrix
            .diagnostics()
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        prop_assert_eq!(errors.len(), 1, "{:?}", errors);
        prop_assert_eq!(matrix.len() as u64, present);
    }
}
