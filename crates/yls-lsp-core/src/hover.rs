use serde_json::Value;

use yls_schema::{yaml_path_to_schema_path, Walker};
use yls_yaml::{split_documents, PathIndex, Position, Range};

/// The result of resolving a hover request: the source range the hover
/// applies to, and the markdown to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub range: Range,
    pub markdown: String,
}

/// Resolve a hover request at `pos` (file-wide coordinates) against
/// `schema`. Returns `None` if `pos` falls outside any document, the
/// document containing it fails to parse, or the cursor's path has no
/// matching schema property.
#[must_use]
pub fn hover_at(file_text: &str, schema: &Value, pos: Position) -> Option<HoverResult> {
    let doc = split_documents(file_text)
        .into_iter()
        .filter(|d| d.line_offset <= pos.line)
        .next_back()?;
    let local_pos = Position::new(pos.line.checked_sub(doc.line_offset)?, pos.character);

    let index = PathIndex::build(doc.text).ok()?;
    let yaml_path = index.path_at_cursor(local_pos)?;
    let schema_path = yaml_path_to_schema_path(&yaml_path.segments());

    let walker = Walker::new(schema);
    let property = walker.lookup(schema, &schema_path)?;

    let range = index.range_of(&yaml_path).unwrap_or(Range::new(local_pos, local_pos));
    let range = Range::new(doc.translate(range.start), doc.translate(range.end));

    Some(HoverResult { range, markdown: render_markdown(&property) })
}

fn render_markdown(property: &yls_schema::SchemaProperty) -> String {
    let mut out = String::new();
    if let Some(type_tag) = &property.type_tag {
        out.push_str(&format!("**{type_tag}**"));
        if property.required {
            out.push_str(" _(required)_");
        }
        out.push_str("\n\n");
    }
    if let Some(description) = &property.description {
        out.push_str(description);
    }
    if !property.enum_values.is_empty() {
        out.push_str("\n\nAllowed values: ");
        let rendered: Vec<String> = property.enum_values.iter().map(|v| v.to_string()).collect();
        out.push_str(&rendered.join(", "));
    }
    if let Some(const_value) = &property.const_value {
        out.push_str(&format!("\n\nMust be `{const_value}`."));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "metadata": {
                    "type": "object",
                    "description": "Standard object metadata."
                }
            }
        })
    }

    #[test]
    fn hover_on_key_resolves_schema_description() {
        let text = "kind: Service\napiVersion: v1\nmetadata:\n  name: hej\n";
        let result = hover_at(text, &schema(), Position::new(2, 2)).unwrap();
        assert!(result.markdown.contains("Standard object metadata."));
        assert_eq!(result.range.start, Position::new(2, 0));
    }

    #[test]
    fn hover_outside_any_property_is_none() {
        let text = "kind: Service\napiVersion: v1\nbogus:\n  name: hej\n";
        assert!(hover_at(text, &schema(), Position::new(2, 2)).is_none());
    }

    #[test]
    fn hover_offsets_into_second_document() {
        let text = "kind: Pod\n---\nmetadata:\n  name: hej\n";
        let result = hover_at(text, &schema(), Position::new(2, 2)).unwrap();
        assert_eq!(result.range.start.line, 2);
    }
}
