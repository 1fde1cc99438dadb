use serde_json::Value;
use yls_yaml::{split_documents, PathIndex, Position, Range, YamlPath};

use crate::kind_version::extract_kind_api_version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding, already translated to the original file's
/// source coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub range: Range,
    pub message: String,
    /// `invalid_yaml`, `no_schema_found`, or a JSON-Schema error code (e.g.
    /// `required`, `additional_property_not_allowed`, `invalid_type`).
    pub kind: String,
    pub severity: Severity,
}

/// Validate a whole (possibly multi-document) YAML file.
///
/// `schema_for` resolves a document's `kind`/`apiVersion` pair to schema
/// bytes; schema resolution itself is the caller's responsibility (it is
/// typically async and memoised -- see `yls-catalog`), so this function
/// never performs I/O.
pub fn validate_file(text: &str, schema_for: impl Fn(&str, &str) -> Option<Value>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for doc in split_documents(text) {
        errors.extend(validate_document(doc.text, doc.line_offset, &schema_for));
    }
    errors
}

fn line_count(text: &str) -> u32 {
    if text.is_empty() {
        1
    } else {
        u32::try_from(text.lines().count()).unwrap_or(u32::MAX).max(1)
    }
}

fn validate_document(doc_text: &str, line_offset: u32, schema_for: &impl Fn(&str, &str) -> Option<Value>) -> Vec<ValidationError> {
    if doc_text.trim().is_empty() {
        return Vec::new();
    }

    let Ok(yaml_value) = serde_yaml::from_str::<Value>(doc_text) else {
        return vec![ValidationError {
            range: Range::new(Position::new(line_offset, 0), Position::new(line_offset + line_count(doc_text), 0)),
            message: "document is not valid YAML".to_string(),
            kind: "invalid_yaml".to_string(),
            severity: Severity::Error,
        }];
    };

    let Some((kind, api_version)) = extract_kind_api_version(doc_text) else {
        return Vec::new();
    };

    let Some(schema) = schema_for(&kind, &api_version) else {
        return vec![ValidationError {
            range: Range::new(Position::new(line_offset, 0), Position::new(line_offset + 1, 0)),
            message: format!("no schema found for kind={kind} apiVersion={api_version}"),
            kind: "no_schema_found".to_string(),
            severity: Severity::Warning,
        }];
    };

    let Ok(path_index) = PathIndex::build(doc_text) else {
        return Vec::new();
    };

    validate_against_schema(&yaml_value, &schema, &path_index, line_offset, doc_text)
}

fn validate_against_schema(instance: &Value, schema: &Value, path_index: &PathIndex, line_offset: u32, doc_text: &str) -> Vec<ValidationError> {
    let Ok(validator) = jsonschema::validator_for(schema) else {
        return Vec::new();
    };

    validator
        .iter_errors(instance)
        .map(|error| {
            let instance_path = error.instance_path().to_string();
            let schema_path = error.schema_path().to_string();
            let keyword = schema_path.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or("validation");
            let message = error.to_string();

            let mut field_path = instance_path.clone();
            if keyword == "additionalProperties"
                && let Some(offending) = extract_unexpected_property(&message)
            {
                field_path = format!("{field_path}/{offending}");
            }

            let yaml_path = json_pointer_to_yaml_path(&field_path);
            let range = resolve_range(&yaml_path, &instance_path, path_index, line_offset, doc_text);

            ValidationError { range, message, kind: error_code_for_keyword(keyword), severity: Severity::Error }
        })
        .collect()
}

/// Map a `jsonschema` schema-path keyword to the spec's error-code
/// vocabulary. Keywords with no dedicated code fall back to their
/// snake_case form.
fn error_code_for_keyword(keyword: &str) -> String {
    match keyword {
        "type" => "invalid_type".to_string(),
        "additionalProperties" => "additional_property_not_allowed".to_string(),
        "required" => "required".to_string(),
        "enum" => "enum".to_string(),
        "const" => "const".to_string(),
        "pattern" => "pattern_mismatch".to_string(),
        "format" => "invalid_format".to_string(),
        "minimum" => "minimum".to_string(),
        "maximum" => "maximum".to_string(),
        "exclusiveMinimum" => "exclusive_minimum".to_string(),
        "exclusiveMaximum" => "exclusive_maximum".to_string(),
        "minLength" => "min_length".to_string(),
        "maxLength" => "max_length".to_string(),
        "minItems" => "min_items".to_string(),
        "maxItems" => "max_items".to_string(),
        "minProperties" => "min_properties".to_string(),
        "maxProperties" => "max_properties".to_string(),
        "uniqueItems" => "unique_items_violation".to_string(),
        "multipleOf" => "multiple_of".to_string(),
        "oneOf" => "one_of_not_valid".to_string(),
        "anyOf" => "any_of_not_valid".to_string(),
        "allOf" => "all_of_not_valid".to_string(),
        "not" => "not_schema_matched".to_string(),
        other => camel_to_snake(other),
    }
}

/// `minLength` -> `min_length`, already-snake/lowercase keywords pass through.
fn camel_to_snake(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len() + 4);
    for ch in keyword.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn json_pointer_to_yaml_path(pointer: &str) -> YamlPath {
    if pointer.is_empty() || pointer == "/" {
        return YamlPath::root();
    }
    let dotted = pointer.trim_start_matches('/').replace('/', ".");
    YamlPath::from(dotted.as_str())
}

/// Strip a trailing `.<digits>` segment, if present.
fn strip_trailing_index(path: &str) -> Option<String> {
    let last_dot = path.rfind('.')?;
    let suffix = &path[last_dot + 1..];
    if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
        Some(path[..last_dot].to_string())
    } else {
        None
    }
}

fn resolve_range(yaml_path: &YamlPath, instance_path: &str, path_index: &PathIndex, line_offset: u32, doc_text: &str) -> Range {
    if let Some(range) = path_index.range_of(yaml_path) {
        return translate(range, line_offset);
    }
    if let Some(stripped) = strip_trailing_index(yaml_path.as_str())
        && let Some(range) = path_index.range_of(&YamlPath::from(stripped.as_str()))
    {
        return translate(range, line_offset);
    }

    let (offset, len) = yls_diagnostics::find_instance_path_span(doc_text, instance_path);
    let (line, col) = yls_diagnostics::offset_to_line_col(doc_text, offset);
    let start = Position::new(line_offset + u32::try_from(line.saturating_sub(1)).unwrap_or(0), u32::try_from(col.saturating_sub(1)).unwrap_or(0));
    let end_col = u32::try_from(col.saturating_sub(1) + len).unwrap_or(start.character);
    Range::new(start, Position::new(start.line, end_col))
}

fn translate(range: Range, line_offset: u32) -> Range {
    Range::new(Position::new(range.start.line + line_offset, range.start.character), Position::new(range.end.line + line_offset, range.end.character))
}

/// Parse `Additional properties are not allowed ('foo' was unexpected)`
/// style messages for the first offending property name.
fn extract_unexpected_property(message: &str) -> Option<String> {
    let start = message.find('\'')? + 1;
    let end = message[start..].find('\'')? + start;
    Some(message[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_for_pod(kind: &str, api_version: &str) -> Option<Value> {
        if kind == "Pod" && api_version == "v1" {
            Some(json!({
                "type": "object",
                "properties": {
                    "kind": {"type": "string"},
                    "apiVersion": {"type": "string"},
                    "spec": {
                        "type": "object",
                        "properties": {
                            "replicas": {"type": "integer"}
                        },
                        "required": ["replicas"],
                        "additionalProperties": false
                    }
                }
            }))
        } else {
            None
        }
    }

    #[test]
    fn invalid_yaml_reports_whole_document() {
        let errors = validate_file("kind: [unterminated", |_, _| None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, "invalid_yaml");
        assert_eq!(errors[0].severity, Severity::Error);
    }

    #[test]
    fn missing_kind_is_not_an_error() {
        let errors = validate_file("name: hello\n", |_, _| None);
        assert!(errors.is_empty());
    }

    #[test]
    fn no_schema_found_is_a_warning() {
        let errors = validate_file("kind: Widget\napiVersion: v2\n", |_, _| None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, "no_schema_found");
        assert_eq!(errors[0].severity, Severity::Warning);
    }

    #[test]
    fn schema_violation_resolves_to_field_range() {
        let doc = "kind: Pod\napiVersion: v1\nspec:\n  replicas: not-a-number\n";
        let errors = validate_file(doc, schema_for_pod);
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.range.start.line == 3));
    }

    #[test]
    fn missing_required_field_is_reported() {
        let doc = "kind: Pod\napiVersion: v1\nspec: {}\n";
        let errors = validate_file(doc, schema_for_pod);
        assert!(errors.iter().any(|e| e.kind == "required"));
    }

    #[test]
    fn additional_property_reports_offending_key() {
        let doc = "kind: Pod\napiVersion: v1\nspec:\n  replicas: 1\n  bogus: true\n";
        let errors = validate_file(doc, schema_for_pod);
        assert!(errors.iter().any(|e| e.kind == "additional_property_not_allowed"));
    }

    #[test]
    fn error_code_mapping_matches_spec_vocabulary() {
        assert_eq!(error_code_for_keyword("type"), "invalid_type");
        assert_eq!(error_code_for_keyword("additionalProperties"), "additional_property_not_allowed");
        assert_eq!(error_code_for_keyword("required"), "required");
        assert_eq!(error_code_for_keyword("enum"), "enum");
        assert_eq!(error_code_for_keyword("minLength"), "min_length");
    }

    #[test]
    fn multi_document_offsets_are_translated() {
        let doc = "kind: Pod\napiVersion: v1\nspec: {}\n---\nkind: Pod\napiVersion: v1\nspec: {}\n";
        let errors = validate_file(doc, schema_for_pod);
        let second_doc_errors: Vec<_> = errors.iter().filter(|e| e.range.start.line >= 4).collect();
        assert!(!second_doc_errors.is_empty());
    }

    #[test]
    fn extract_property_from_message() {
        let msg = "Additional properties are not allowed ('bogus' was unexpected)";
        assert_eq!(extract_unexpected_property(msg), Some("bogus".to_string()));
    }

    #[test]
    fn json_pointer_root_maps_to_root_path() {
        assert!(json_pointer_to_yaml_path("").is_root());
        assert!(json_pointer_to_yaml_path("/").is_root());
    }

    #[test]
    fn json_pointer_converts_slashes_to_dots() {
        assert_eq!(json_pointer_to_yaml_path("/spec/ports/0").as_str(), ".spec.ports.0");
    }

    #[test]
    fn strip_trailing_index_removes_numeric_segment() {
        assert_eq!(strip_trailing_index(".spec.ports.3"), Some(".spec.ports".to_string()));
        assert_eq!(strip_trailing_index(".spec.name"), None);
    }
}
