use thiserror::Error;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError};

use crate::path::YamlPath;
use crate::position::{Position, Range};

#[derive(Debug, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct YamlParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<ScanError> for YamlParseError {
    fn from(e: ScanError) -> Self {
        let (line, column) = (e.marker().line(), e.marker().col());
        Self {
            message: e.to_string(),
            line,
            column,
        }
    }
}

/// A bidirectional map between [`YamlPath`]s and the source [`Range`] of the
/// node addressed by that path, for a single YAML document.
///
/// Every mapping entry is indexed under the range of its *key* token (not
/// the value), so that hovering the key itself -- not just its value --
/// resolves to that property's schema description. Sequence items are
/// indexed under their own value range, since they have no key. The
/// document root (`YamlPath::root()`) is never itself an entry.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    /// Ranges used for exact, addressable nodes; returned by [`Self::paths`].
    entries: Vec<(YamlPath, Range)>,
    /// Broader containment ranges (key start through value end, or the
    /// item's own span for sequence items) used only to resolve a cursor
    /// position that falls inside a node but not on any more specific
    /// descendant -- e.g. on blank space inside a mapping.
    containers: Vec<(YamlPath, Range)>,
}

impl PathIndex {
    /// Parse a single YAML document and build its path index.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to scan or parse.
    pub fn build(doc_text: &str) -> Result<Self, YamlParseError> {
        let mut builder = Builder::default();
        let mut parser = Parser::new_from_str(doc_text);
        parser.load(&mut builder, false)?;
        Ok(builder.finish())
    }

    /// All addressable (path, range) pairs in the document, in document
    /// order.
    #[must_use]
    pub fn paths(&self) -> &[(YamlPath, Range)] {
        &self.entries
    }

    /// The range recorded for `path`, if it is addressable.
    #[must_use]
    pub fn range_of(&self, path: &YamlPath) -> Option<Range> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, r)| *r)
    }

    /// The most specific path whose node contains `pos`, if any.
    ///
    /// "Most specific" is the container range with the longest path (the
    /// deepest match); ties are resolved by document order, preferring the
    /// earliest-recorded container, mirroring the index's own first-visit
    /// construction order.
    #[must_use]
    pub fn path_at_cursor(&self, pos: Position) -> Option<YamlPath> {
        self.containers
            .iter()
            .filter(|(_, range)| range.contains(pos))
            .max_by_key(|(path, _)| path.as_str().len())
            .map(|(path, _)| path.clone())
    }
}

#[derive(Debug)]
enum Frame {
    Mapping {
        path: YamlPath,
        start: Marker,
        first_key_start: Option<Position>,
        pending_key: Option<(String, Range)>,
    },
    Sequence {
        path: YamlPath,
        start: Marker,
        next_index: usize,
    },
}

#[derive(Default)]
struct Builder {
    stack: Vec<Frame>,
    entries: Vec<(YamlPath, Range)>,
    containers: Vec<(YamlPath, Range)>,
}

fn marker_pos(m: &Marker) -> Position {
    Position::new(u32::try_from(m.line()).unwrap_or(u32::MAX), u32::try_from(m.col()).unwrap_or(u32::MAX))
}

impl Builder {
    fn finish(self) -> PathIndex {
        PathIndex {
            entries: self.entries,
            containers: self.containers,
        }
    }

    /// Path this frame is positioned at, i.e. the path its *children* are
    /// relative to -- the parent's path joined with whatever key or index
    /// this frame was opened under.
    fn child_path(&self) -> YamlPath {
        match self.stack.last() {
            None => YamlPath::root(),
            Some(Frame::Mapping {
                path, pending_key, ..
            }) => match pending_key {
                Some((key, _)) => path.join_key(key),
                None => path.clone(), // malformed/complex key; best effort
            },
            Some(Frame::Sequence { path, next_index, .. }) => path.join_index(*next_index),
        }
    }

    /// Called once a value (scalar, sequence, or mapping) of range
    /// `value_range` has fully completed. Records it against the enclosing
    /// frame and advances that frame's state. No-op at the document root,
    /// since the root itself is never an addressable entry.
    fn complete_value(&mut self, value_range: Range) {
        let Some(last) = self.stack.last_mut() else {
            return;
        };
        match last {
            Frame::Mapping {
                path, pending_key, ..
            } => {
                let Some((key, key_range)) = pending_key.take() else {
                    // `value_range` is itself the pending key, not a value;
                    // nothing to record yet.
                    return;
                };
                let entry_path = path.join_key(&key);
                self.entries.push((entry_path.clone(), key_range));
                self.containers
                    .push((entry_path, Range::new(key_range.start, value_range.end)));
            }
            Frame::Sequence { path, next_index, .. } => {
                let item_path = path.join_index(*next_index);
                *next_index += 1;
                self.entries.push((item_path.clone(), value_range));
                self.containers.push((item_path, value_range));
            }
        }
    }

    fn on_scalar(&mut self, text: &str, range: Range) {
        match self.stack.last_mut() {
            Some(Frame::Mapping {
                pending_key,
                first_key_start,
                ..
            }) if pending_key.is_none() => {
                if first_key_start.is_none() {
                    *first_key_start = Some(range.start);
                }
                *pending_key = Some((text.to_string(), range));
            }
            _ => self.complete_value(range),
        }
    }
}

impl MarkedEventReceiver for Builder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(value, _style, _anchor_id, _tag) => {
                let start = marker_pos(&marker);
                let end = Position::new(start.line, start.character + u32::try_from(value.chars().count()).unwrap_or(0));
                self.on_scalar(&value, Range::new(start, end));
            }

            Event::Alias(_anchor_id) => {
                let pos = marker_pos(&marker);
                self.on_scalar("", Range::new(pos, pos));
            }

            Event::SequenceStart(..) => {
                let path = self.child_path();
                self.stack.push(Frame::Sequence {
                    path,
                    start: marker,
                    next_index: 0,
                });
            }

            Event::SequenceEnd => {
                let Some(Frame::Sequence { start, .. }) = self.stack.pop() else {
                    return;
                };
                let range = Range::new(marker_pos(&start), marker_pos(&marker));
                self.complete_value(range);
            }

            Event::MappingStart(..) => {
                let path = self.child_path();
                self.stack.push(Frame::Mapping {
                    path,
                    start: marker,
                    first_key_start: None,
                    pending_key: None,
                });
            }

            Event::MappingEnd => {
                let Some(Frame::Mapping {
                    start, first_key_start, ..
                }) = self.stack.pop()
                else {
                    return;
                };
                let start_pos = first_key_start.unwrap_or_else(|| marker_pos(&start));
                let range = Range::new(start_pos, marker_pos(&marker));
                self.complete_value(range);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_of(index: &PathIndex) -> Vec<String> {
        index.paths().iter().map(|(p, _)| p.to_string()).collect()
    }

    #[test]
    fn flat_mapping() {
        let index = PathIndex::build("kind: Pod\napiVersion: v1\n").unwrap();
        let paths = paths_of(&index);
        assert!(paths.contains(&".kind".to_string()));
        assert!(paths.contains(&".apiVersion".to_string()));
    }

    #[test]
    fn nested_mapping_and_sequence() {
        let yaml = "spec:\n  ports:\n    - name: http\n      port: 80\n";
        let index = PathIndex::build(yaml).unwrap();
        let paths = paths_of(&index);
        assert!(paths.contains(&".spec".to_string()));
        assert!(paths.contains(&".spec.ports".to_string()));
        assert!(paths.contains(&".spec.ports.0".to_string()));
        assert!(paths.contains(&".spec.ports.0.name".to_string()));
        assert!(paths.contains(&".spec.ports.0.port".to_string()));
    }

    #[test]
    fn key_range_is_used_for_mapping_entries() {
        let yaml = "name: value\n";
        let index = PathIndex::build(yaml).unwrap();
        let range = index.range_of(&YamlPath::from("name")).unwrap();
        // "name" occupies columns 0..4 on line 0, not the value "value".
        assert_eq!(range.start, Position::new(0, 0));
        assert_eq!(range.end, Position::new(0, 4));
    }

    #[test]
    fn cursor_on_key_resolves_to_entry_path() {
        let yaml = "kind: Pod\n";
        let index = PathIndex::build(yaml).unwrap();
        let path = index.path_at_cursor(Position::new(0, 1)).unwrap();
        assert_eq!(path.as_str(), ".kind");
    }

    #[test]
    fn cursor_inside_nested_value_resolves_to_deepest_path() {
        let yaml = "spec:\n  replicas: 3\n";
        let index = PathIndex::build(yaml).unwrap();
        // column within "3" on line 1
        let path = index.path_at_cursor(Position::new(1, 12)).unwrap();
        assert_eq!(path.as_str(), ".spec.replicas");
    }

    #[test]
    fn cursor_on_blank_area_inside_mapping_resolves_to_container() {
        let yaml = "spec:\n  replicas: 3\n  selector: x\n";
        let index = PathIndex::build(yaml).unwrap();
        // column 4 on line 0 is still inside "spec:" token itself
        let path = index.path_at_cursor(Position::new(0, 0)).unwrap();
        assert_eq!(path.as_str(), ".spec");
    }

    #[test]
    fn sequence_of_scalars() {
        let yaml = "items:\n  - a\n  - b\n  - c\n";
        let index = PathIndex::build(yaml).unwrap();
        let paths = paths_of(&index);
        assert!(paths.contains(&".items.0".to_string()));
        assert!(paths.contains(&".items.1".to_string()));
        assert!(paths.contains(&".items.2".to_string()));
    }

    #[test]
    fn invalid_yaml_errors() {
        let result = PathIndex::build("key: [unterminated\n");
        assert!(result.is_err());
    }
}
