use crate::position::Position;

/// One document extracted from a multi-document YAML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSlice<'a> {
    pub index: usize,
    pub text: &'a str,
    /// Zero-based line number, in the original file, of this document's
    /// first line -- used to translate a [`Position`](crate::Position)
    /// computed against `text` back into the original file's coordinates.
    pub line_offset: u32,
}

impl DocumentSlice<'_> {
    #[must_use]
    pub fn translate(&self, pos: Position) -> Position {
        Position::new(pos.line + self.line_offset, pos.character)
    }
}

/// Split a YAML file into its constituent documents on bare `---` markers.
///
/// A line is a document separator only if, once trailing `\r`/`\n` is
/// stripped, it is exactly `---`; `--- key: value` and similar are left
/// alone since they are valid (if unusual) scalar content, not a directives
/// end marker. The first document does not require a leading marker. Blank
/// documents produced by adjacent separators (or a leading separator) are
/// dropped, except that a wholly empty file still yields one empty document.
#[must_use]
pub fn split_documents(file_text: &str) -> Vec<DocumentSlice<'_>> {
    // `boundaries` holds (byte_start, line_offset) for each document segment:
    // the start is either byte 0, or the first byte after a `---` line.
    let mut boundaries = vec![(0usize, 0u32)];
    let mut offset = 0usize;
    let mut line_no = 0u32;
    for line in file_text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" {
            boundaries.push((offset + line.len(), line_no + 1));
        }
        offset += line.len();
        line_no += 1;
    }

    let mut slices = Vec::new();
    for (i, &(start, line_offset)) in boundaries.iter().enumerate() {
        let segment_end = if i + 1 < boundaries.len() {
            separator_line_start(file_text, boundaries[i + 1].0)
        } else {
            file_text.len()
        };
        slices.push((start, segment_end, line_offset));
    }

    let mut docs: Vec<DocumentSlice<'_>> = slices
        .into_iter()
        .map(|(start, end, line_offset)| DocumentSlice {
            index: 0,
            text: &file_text[start.min(file_text.len())..end.min(file_text.len())],
            line_offset,
        })
        .filter(|d| !d.text.trim().is_empty())
        .collect();

    if docs.is_empty() {
        docs.push(DocumentSlice {
            index: 0,
            text: "",
            line_offset: 0,
        });
    }
    for (i, d) in docs.iter_mut().enumerate() {
        d.index = i;
    }
    docs
}

/// Given the byte offset immediately after a `---\n` separator line, find
/// the byte offset where that separator line itself began.
fn separator_line_start(file_text: &str, after_separator: usize) -> usize {
    file_text[..after_separator]
        .trim_end_matches('\n')
        .trim_end_matches('\r')
        .rfind('\n')
        .map_or(0, |p| p + 1)
}
