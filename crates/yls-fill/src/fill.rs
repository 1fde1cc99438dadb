use serde_json::Value;
use yls_schema::resolve_ref;

/// Recursion guard against cyclic `$ref` chains, mirroring the walker's own
/// bound.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error("array schema at {path} has no \"items\" and cannot be filled")]
    MissingArrayItems { path: String },
    #[error("$ref at {path} could not be resolved")]
    UnresolvedRef { path: String },
    #[error("schema at {path} is too deeply nested (cyclic $ref?)")]
    TooDeep { path: String },
}

/// Instantiate a minimal example value from a schema's root.
///
/// # Errors
///
/// Returns an error if an array schema lacks `items`, a `$ref` cannot be
/// resolved, or the schema recurses past [`DEFAULT_MAX_DEPTH`].
pub fn fill(schema: &Value) -> Result<Value, FillError> {
    fill_at(schema, schema, ".", 0)
}

fn fill_at(node: &Value, root: &Value, path: &str, depth: usize) -> Result<Value, FillError> {
    if depth > DEFAULT_MAX_DEPTH {
        return Err(FillError::TooDeep { path: path.to_string() });
    }

    let resolved = resolve_ref(node, root);
    if resolved.get("$ref").is_some() {
        return Err(FillError::UnresolvedRef { path: path.to_string() });
    }

    if let Some(type_value) = resolved.get("type") {
        if let Some(type_str) = type_value.as_str() {
            if let Some(value) = fill_for_type(type_str, resolved, root, path, depth)? {
                return Ok(value);
            }
        } else if let Some(types) = type_value.as_array() {
            let chosen = types.iter().filter_map(Value::as_str).find(|t| *t != "null");
            if let Some(chosen) = chosen
                && let Some(value) = fill_for_type(chosen, resolved, root, path, depth)?
            {
                return Ok(value);
            }
        }
    }

    if let Some(constant) = resolved.get("const") {
        return Ok(constant.clone());
    }
    if let Some(enum_values) = resolved.get("enum").and_then(Value::as_array)
        && let Some(first) = enum_values.first()
    {
        return Ok(first.clone());
    }
    for keyword in ["oneOf", "anyOf"] {
        if let Some(branches) = resolved.get(keyword).and_then(Value::as_array)
            && let Some(first) = branches.first()
        {
            return fill_at(first, root, &format!("{path}?0"), depth + 1);
        }
    }
    if resolved.get("x-kubernetes-preserve-unknown-fields").and_then(Value::as_bool) == Some(true) {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    Ok(Value::Null)
}

fn fill_for_type(type_str: &str, resolved: &Value, root: &Value, path: &str, depth: usize) -> Result<Option<Value>, FillError> {
    match type_str {
        "string" => Ok(Some(Value::String(String::new()))),
        "integer" | "number" => Ok(Some(Value::Number(0.into()))),
        "boolean" => Ok(Some(Value::Bool(false))),
        "null" => Ok(Some(Value::Null)),
        "object" => Ok(Some(fill_object(resolved, root, path, depth)?)),
        "array" => Ok(Some(fill_array(resolved, root, path, depth)?)),
        _ => Ok(None),
    }
}

fn fill_object(resolved: &Value, root: &Value, path: &str, depth: usize) -> Result<Value, FillError> {
    let mut map = serde_json::Map::new();
    if let Some(properties) = resolved.get("properties").and_then(Value::as_object) {
        for (key, prop_schema) in properties {
            let value = fill_at(prop_schema, root, &format!("{path}.{key}"), depth + 1)?;
            map.insert(key.clone(), value);
        }
    }
    Ok(Value::Object(map))
}

fn fill_array(resolved: &Value, root: &Value, path: &str, depth: usize) -> Result<Value, FillError> {
    let Some(items) = resolved.get("items") else {
        return Err(FillError::MissingArrayItems { path: path.to_string() });
    };
    let element = fill_at(items, root, &format!("{path}[]"), depth + 1)?;
    Ok(Value::Array(vec![element]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_primitive_types() {
        assert_eq!(fill(&json!({"type": "string"})).unwrap(), json!(""));
        assert_eq!(fill(&json!({"type": "integer"})).unwrap(), json!(0));
        assert_eq!(fill(&json!({"type": "number"})).unwrap(), json!(0));
        assert_eq!(fill(&json!({"type": "boolean"})).unwrap(), json!(false));
        assert_eq!(fill(&json!({"type": "null"})).unwrap(), Value::Null);
    }

    #[test]
    fn fills_object_with_properties() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "count": {"type": "integer"}
            }
        });
        assert_eq!(fill(&schema).unwrap(), json!({"name": "", "count": 0}));
    }

    #[test]
    fn fills_object_without_properties_as_empty_map() {
        assert_eq!(fill(&json!({"type": "object"})).unwrap(), json!({}));
    }

    #[test]
    fn fills_array_with_items() {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        assert_eq!(fill(&schema).unwrap(), json!([""]));
    }

    #[test]
    fn array_without_items_errors() {
        let schema = json!({"type": "array"});
        assert!(matches!(fill(&schema), Err(FillError::MissingArrayItems { .. })));
    }

    #[test]
    fn type_array_chooses_first_non_null() {
        let schema = json!({"type": ["null", "string"]});
        assert_eq!(fill(&schema).unwrap(), json!(""));
    }

    #[test]
    fn const_wins_when_no_type() {
        assert_eq!(fill(&json!({"const": "fixed"})).unwrap(), json!("fixed"));
    }

    #[test]
    fn enum_picks_first_entry() {
        assert_eq!(fill(&json!({"enum": ["a", "b", "c"]})).unwrap(), json!("a"));
    }

    #[test]
    fn one_of_picks_first_branch() {
        let schema = json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
        assert_eq!(fill(&schema).unwrap(), json!(""));
    }

    #[test]
    fn preserve_unknown_fields_is_empty_map() {
        let schema = json!({"x-kubernetes-preserve-unknown-fields": true});
        assert_eq!(fill(&schema).unwrap(), json!({}));
    }

    #[test]
    fn ref_is_resolved_before_filling() {
        let schema = json!({
            "$defs": {"Name": {"type": "string"}},
            "properties": {"name": {"$ref": "#/$defs/Name"}},
            "type": "object"
        });
        assert_eq!(fill(&schema).unwrap(), json!({"name": ""}));
    }

    #[test]
    fn unresolved_ref_errors() {
        let schema = json!({"$ref": "#/$defs/Missing"});
        assert!(matches!(fill(&schema), Err(FillError::UnresolvedRef { .. })));
    }

    #[test]
    fn cyclic_ref_is_bounded() {
        let schema = json!({
            "$defs": {"Node": {"type": "object", "properties": {"child": {"$ref": "#/$defs/Node"}}}},
            "$ref": "#/$defs/Node"
        });
        assert!(matches!(fill(&schema), Err(FillError::TooDeep { .. })));
    }
}
