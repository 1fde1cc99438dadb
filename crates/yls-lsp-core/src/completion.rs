use serde_json::Value;

use yls_schema::{yaml_path_to_schema_path, Walker};
use yls_yaml::{split_documents, PathIndex, Position, YamlPath};

/// A single completion candidate: a property name and its type summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub detail: Option<String>,
}

/// List completion candidates at `pos` (file-wide coordinates): the keys of
/// the schema object at the cursor's parent path.
///
/// The cursor's own path (if any) is computed first; its *last* segment is
/// stripped to find the parent, per the request surface's "strip last
/// segment" rule, since the cursor may already be sitting on a partially
/// typed key that has no indexed path of its own.
#[must_use]
pub fn completion_at(file_text: &str, schema: &Value, pos: Position) -> Vec<CompletionItem> {
    let Some(doc) = split_documents(file_text).into_iter().filter(|d| d.line_offset <= pos.line).next_back() else {
        return Vec::new();
    };
    let Some(local_line) = pos.line.checked_sub(doc.line_offset) else {
        return Vec::new();
    };
    let local_pos = Position::new(local_line, pos.character);

    let cursor_path = path_at_cursor_tolerant(doc.text, local_pos);
    let parent_segments = parent_segments_of(&cursor_path);
    let parent_schema_path = yaml_path_to_schema_path(&parent_segments);

    let walker = Walker::new(schema);
    let entries = walker.walk(schema);

    let prefix = format!("{}.", parent_schema_path.as_str());
    let mut items: Vec<CompletionItem> = entries
        .iter()
        .filter_map(|entry| {
            let suffix = entry.path.as_str().strip_prefix(&prefix)?;
            if suffix.is_empty() || suffix.contains(['.', '[', '?']) {
                return None;
            }
            Some(CompletionItem { label: suffix.to_string(), detail: entry.type_tag.clone() })
        })
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items.dedup_by(|a, b| a.label == b.label);
    items
}

/// Drop the last segment of `path`, yielding its parent's segments.
fn parent_segments_of(path: &YamlPath) -> Vec<&str> {
    let mut segments = path.segments();
    segments.pop();
    segments
}

/// Resolve the path at `pos`, tolerating a document that fails to parse as
/// a whole -- as is typical mid-edit, when the user is still typing the key
/// under the cursor. The Path Index itself parses strictly and gives up on
/// the whole document on any error; completion instead drops everything
/// from the cursor's own line onward and re-indexes what parsed before it,
/// then asks for the path at the end of that surviving prefix.
fn path_at_cursor_tolerant(text: &str, pos: Position) -> YamlPath {
    if let Ok(index) = PathIndex::build(text) {
        return index.path_at_cursor(pos).unwrap_or_else(YamlPath::root);
    }

    let line_idx = pos.line as usize;
    if line_idx == 0 {
        return YamlPath::root();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(prefix_lines) = lines.get(..line_idx) else {
        return YamlPath::root();
    };
    let truncated = prefix_lines.join("\n");
    if truncated.trim().is_empty() {
        return YamlPath::root();
    }
    let Ok(index) = PathIndex::build(&truncated) else {
        return YamlPath::root();
    };
    let last_line = u32::try_from(line_idx - 1).unwrap_or(0);
    let last_line_len = lines[line_idx - 1].chars().count();
    // Land one character inside the surviving prefix's last line rather
    // than exactly at its end, which is an exclusive container boundary.
    let last_col = u32::try_from(last_line_len.saturating_sub(1)).unwrap_or(0);
    index.path_at_cursor(Position::new(last_line, last_col)).unwrap_or_else(YamlPath::root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "kind": {"type": "string"},
                "apiVersion": {"type": "string"},
                "metadata": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "namespace": {"type": "string"}
                    }
                }
            }
        })
    }

    #[test]
    fn completion_at_root_lists_top_level_keys() {
        let text = "kind: Service\napiVersion: v1\nmeta";
        let items = completion_at(text, &schema(), Position::new(2, 4));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"metadata"));
    }

    #[test]
    fn completion_inside_nested_object_lists_its_keys() {
        let text = "kind: Service\napiVersion: v1\nmetadata:\n  name: hej\n";
        let items = completion_at(text, &schema(), Position::new(3, 6));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"name"));
        assert!(labels.contains(&"namespace"));
    }

    #[test]
    fn completion_on_empty_document_lists_top_level_keys() {
        let items = completion_at("", &schema(), Position::new(0, 0));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"kind"));
    }

    #[test]
    fn completion_tolerates_unparseable_partial_key() {
        let text = "kind: Service\napiVersion: v1\nmetadata:\n  name: hej\n  na";
        let items = completion_at(text, &schema(), Position::new(4, 4));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"namespace"));
    }
}
