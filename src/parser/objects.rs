//! Indirect object and stream extraction.
//!
//! Objects are delimited from the marker list: an object runs from its
//! `N G obj` marker to the next marker. Because `endobj`/`endstream` are not
//! markers, the real terminators are searched for inside that candidate
//! span. When a terminator is missing the object keeps the best-effort span
//! and is flagged as unterminated instead of being dropped.

use serde::{Deserialize, Serialize};

use super::markers::SectionMap;
use super::normalize::{find_bytes, trim_end_offset, NormalizedDocument};
use super::Span;
use crate::model::{MarkerKind, SectionKind};

const ENDOBJ: &[u8] = b"endobj";
const ENDSTREAM: &[u8] = b"endstream";

/// One indirect object located in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfObject {
    /// Literal declaration, e.g. `"12 0 obj"` (whitespace as in the file)
    pub label: String,
    /// Object number
    pub object_number: u64,
    /// Generation number
    pub generation: u32,
    /// Revision the declaration belongs to
    pub revision: u32,
    /// Offset of the declaration
    pub start: usize,
    /// Offset one past `endobj` (or past the best-effort end)
    pub end: usize,
    /// Span from `stream` to one past `endstream`
    pub stream: Option<Span>,
    /// Whether `endobj` was found
    pub terminated: bool,
    /// Whether `endstream` was found (always true without a stream)
    pub stream_terminated: bool,
}

impl PdfObject {
    /// Whether the object carries a stream.
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Full byte span of the object.
    pub fn span(&self) -> Span {
        self.start..self.end
    }

    /// `"N G"` identifier.
    pub fn id(&self) -> String {
        format!("{} {}", self.object_number, self.generation)
    }
}

/// Parse `"N G obj"` into its object and generation numbers.
pub(crate) fn parse_object_label(label: &str) -> (u64, u32) {
    let mut parts = label.split_ascii_whitespace();
    let number = parts
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX);
    let generation = parts
        .next()
        .and_then(|g| g.parse().ok())
        .unwrap_or(u32::MAX);
    (number, generation)
}

/// Turns body markers into [`PdfObject`]s.
pub struct ObjectExtractor<'a> {
    doc: &'a NormalizedDocument,
    sections: &'a SectionMap,
}

impl<'a> ObjectExtractor<'a> {
    /// Create an extractor over one parse pass.
    pub fn new(doc: &'a NormalizedDocument, sections: &'a SectionMap) -> Self {
        Self { doc, sections }
    }

    /// Objects of every revision, in file order.
    pub fn extract_all(&self) -> Vec<PdfObject> {
        (0..self.sections.num_revisions())
            .flat_map(|rev| self.extract(rev))
            .collect()
    }

    /// Objects declared in the body of one revision.
    pub fn extract(&self, revision: u32) -> Vec<PdfObject> {
        self.sections
            .revision_markers(revision)
            .filter(|(_, m)| m.kind == MarkerKind::Object && m.section == SectionKind::Body)
            .map(|(index, _)| self.object_at(index))
            .collect()
    }

    fn object_at(&self, index: usize) -> PdfObject {
        let markers = self.sections.markers();
        let bytes = self.doc.as_bytes();
        let marker = &markers[index];
        let bound_of = |i: usize| markers.get(i).map_or(bytes.len(), |m| m.offset);

        let (object_number, generation) = parse_object_label(&marker.text);
        let mut stream = None;
        let mut stream_terminated = true;
        let mut search_from = marker.end();

        let next = index + 1;
        let bound = if markers.get(next).map(|m| m.kind) == Some(MarkerKind::Stream) {
            let stream_marker = &markers[next];

            // Repeated `stream` keywords before the terminator belong to
            // this object; skip them to avoid splitting it.
            let mut after = next;
            while markers.get(after).map(|m| m.kind) == Some(MarkerKind::Stream) {
                after += 1;
            }
            let bound = bound_of(after);

            let stream_end = match find_bytes(bytes, ENDSTREAM, stream_marker.end(), bound) {
                Some(pos) => pos + ENDSTREAM.len(),
                None => {
                    log::warn!(
                        "'{}' at offset {}: endstream not found",
                        marker.text,
                        marker.offset
                    );
                    stream_terminated = false;
                    let limit = find_bytes(bytes, ENDOBJ, stream_marker.end(), bound).unwrap_or(bound);
                    trim_end_offset(bytes, stream_marker.offset, limit).max(stream_marker.end())
                }
            };
            stream = Some(stream_marker.offset..stream_end);
            search_from = stream_end;
            bound
        } else {
            bound_of(next)
        };

        let (end, terminated) = match find_bytes(bytes, ENDOBJ, search_from, bound) {
            Some(pos) => (pos + ENDOBJ.len(), true),
            None => {
                log::warn!(
                    "'{}' at offset {}: endobj not found, using best-effort end",
                    marker.text,
                    marker.offset
                );
                (trim_end_offset(bytes, marker.offset, bound), false)
            }
        };
        let mut end = end.max(search_from);

        // A stream stays strictly inside its object: claim the whitespace
        // after an unterminated stream, or give up its last byte.
        if let Some(span) = stream.as_mut() {
            if span.end >= end {
                if end < bound {
                    end += 1;
                } else {
                    span.end = end - 1;
                }
            }
        }

        PdfObject {
            label: marker.text.clone(),
            object_number,
            generation,
            revision: marker.revision,
            start: marker.offset,
            end,
            stream,
            terminated,
            stream_terminated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> (NormalizedDocument, Vec<PdfObject>) {
        let doc = NormalizedDocument::new(text);
        let map = SectionMap::build(&doc);
        let objects = ObjectExtractor::new(&doc, &map).extract_all();
        (doc, objects)
    }

    #[test]
    fn test_plain_object() {
        let (doc, objects) = extract("%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\n");
        assert_eq!(objects.len(), 1);
        let obj = &objects[0];
        assert_eq!(obj.object_number, 1);
        assert_eq!(obj.generation, 0);
        assert!(obj.terminated);
        assert!(!obj.has_stream());
        assert_eq!(
            doc.slice(obj.start, obj.end),
            "1 0 obj\n<< /Type /Catalog >>\nendobj"
        );
    }

    #[test]
    fn test_stream_object() {
        let text = "4 0 obj\n<< /Length 5 >>\nstream\nhello\nendstream\nendobj\n5 0 obj\n1\nendobj\n";
        let (doc, objects) = extract(text);
        assert_eq!(objects.len(), 2);
        let obj = &objects[0];
        let stream = obj.stream.clone().unwrap();
        assert_eq!(doc.slice(stream.start, stream.end), "stream\nhello\nendstream");
        assert!(obj.start < stream.start && stream.end < obj.end);
        assert_eq!(doc.slice(obj.start, obj.end).lines().last(), Some("endobj"));
        assert!(objects[1].stream.is_none());
    }

    #[test]
    fn test_stream_data_containing_keywords() {
        // A repeated 'stream' keyword inside the data must not end the object.
        let text = "7 0 obj\n<<>>\nstream\nfoo\nstream\nbar\nendstream\nendobj\n";
        let (doc, objects) = extract(text);
        assert_eq!(objects.len(), 1);
        let obj = &objects[0];
        assert!(obj.terminated && obj.stream_terminated);
        let stream = obj.stream.clone().unwrap();
        assert!(doc.slice(stream.start, stream.end).ends_with("bar\nendstream"));
    }

    #[test]
    fn test_missing_endobj_falls_back() {
        let text = "1 0 obj\n<< /A 1 >>\n\n2 0 obj\n<<>>\nendobj\n";
        let (doc, objects) = extract(text);
        assert_eq!(objects.len(), 2);
        assert!(!objects[0].terminated);
        assert_eq!(doc.slice(objects[0].start, objects[0].end), "1 0 obj\n<< /A 1 >>");
        assert!(objects[1].terminated);
    }

    #[test]
    fn test_missing_endstream() {
        let text = "3 0 obj\n<<>>\nstream\nabc\nendobj\nxref\n";
        let (doc, objects) = extract(text);
        let obj = &objects[0];
        assert!(obj.terminated);
        assert!(!obj.stream_terminated);
        let stream = obj.stream.clone().unwrap();
        assert_eq!(doc.slice(stream.start, stream.end), "stream\nabc");
        assert!(obj.start < stream.start && stream.end < obj.end);
    }

    #[test]
    fn test_missing_endstream_and_endobj() {
        let text = "%PDF-1.7\n1 0 obj\n<<>>\nstream\nabc\n2 0 obj\n<<>>\nendobj\n";
        let (doc, objects) = extract(text);
        let obj = &objects[0];
        assert!(!obj.terminated);
        assert!(!obj.stream_terminated);
        let stream = obj.stream.clone().unwrap();
        assert_eq!(doc.slice(stream.start, stream.end), "stream\nabc");
        assert_eq!(obj.end, stream.end + 1);
        assert!(obj.end <= objects[1].start);
    }

    #[test]
    fn test_unterminated_stream_at_end_of_input() {
        let (doc, objects) = extract("1 0 obj\n<<>>\nstream\nabc");
        let obj = &objects[0];
        let stream = obj.stream.clone().unwrap();
        assert_eq!(obj.end, 23);
        assert_eq!(doc.slice(stream.start, stream.end), "stream\nab");
        assert!(obj.start < stream.start && stream.end < obj.end);
    }

    #[test]
    fn test_objects_by_revision() {
        let text = "1 0 obj\nendobj\n%%EOF\n1 0 obj\nendobj\n2 0 obj\nendobj\n%%EOF\n";
        let doc = NormalizedDocument::new(text);
        let map = SectionMap::build(&doc);
        let extractor = ObjectExtractor::new(&doc, &map);
        assert_eq!(extractor.extract(0).len(), 1);
        assert_eq!(extractor.extract(1).len(), 2);
        assert!(extractor.extract(2).is_empty());
        assert_eq!(extractor.extract(1)[1].id(), "2 0");
    }

    #[test]
    fn test_parse_object_label() {
        assert_eq!(parse_object_label("12 3 obj"), (12, 3));
        assert_eq!(parse_object_label("12\n0\tobj"), (12, 0));
    }
}
