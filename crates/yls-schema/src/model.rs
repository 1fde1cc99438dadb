use serde_json::Value;

/// The composition/type vocabulary keywords this model understands, in the
/// order the Walker tries them.
pub const COMPOSITION_KEYWORDS: [&str; 3] = ["oneOf", "anyOf", "allOf"];

/// Extract the trailing name from a `$ref` pointer, e.g. `"#/$defs/Foo"` -> `"Foo"`.
#[must_use]
pub fn ref_name(ref_str: &str) -> &str {
    ref_str.rsplit('/').next().unwrap_or(ref_str)
}

/// Resolve a `$ref` one level within the same schema document. Returns
/// `schema` unchanged if it has no `$ref`, or if the `$ref` target cannot
/// be resolved (external refs, which are out of scope, fall into this
/// case since they never start with `#/`).
#[must_use]
pub fn resolve_ref<'a>(schema: &'a Value, root: &'a Value) -> &'a Value {
    let Some(path) = schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix("#/"))
    else {
        return schema;
    };

    let mut current = root;
    for segment in path.split('/') {
        let decoded = segment.replace("~1", "/").replace("~0", "~");
        let Value::Object(map) = current else {
            return schema;
        };
        let Some(next) = map.get(&decoded) else {
            return schema;
        };
        current = next;
    }
    current
}

/// Walk a JSON Pointer through a schema document, resolving `$ref` at every
/// step (including the final one).
///
/// # Errors
///
/// Returns an error naming the first segment that cannot be resolved.
pub fn navigate_pointer<'a>(
    schema: &'a Value,
    root: &'a Value,
    pointer: &str,
) -> Result<&'a Value, String> {
    let path = pointer.strip_prefix('/').unwrap_or(pointer);
    if path.is_empty() {
        return Ok(resolve_ref(schema, root));
    }

    let mut current = resolve_ref(schema, root);
    for segment in path.split('/') {
        let decoded = segment.replace("~1", "/").replace("~0", "~");
        current = resolve_ref(current, root);

        if let Some(next) = current.get(&decoded) {
            current = next;
            continue;
        }
        if let Value::Array(arr) = current
            && let Ok(idx) = decoded.parse::<usize>()
            && let Some(next) = arr.get(idx)
        {
            current = next;
            continue;
        }
        return Err(format!("cannot resolve segment '{decoded}' in pointer '{pointer}'"));
    }

    Ok(resolve_ref(current, root))
}

/// The `required` array of a schema, as owned strings.
#[must_use]
pub fn required_set(schema: &Value) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

/// Whether the schema carries `x-kubernetes-preserve-unknown-fields: true`.
#[must_use]
pub fn preserves_unknown_fields(schema: &Value) -> bool {
    schema
        .get("x-kubernetes-preserve-unknown-fields")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Prefer `markdownDescription` over `description`, matching the convention
/// used by YAML/JSON language servers that render hover content as Markdown.
#[must_use]
pub fn description_of(schema: &Value) -> Option<String> {
    schema
        .get("markdownDescription")
        .or_else(|| schema.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// A short human-readable type string for a schema, honoring the §4.2
/// precedence: composers (`oneOf`/`anyOf`/`allOf`/`const`/`enum`/`$ref`/
/// `x-kubernetes-preserve-unknown-fields`) take precedence over `type`.
/// Composer nodes get their own literal tag, never a joined list of their
/// variants' types; a multi-type node's tag is comma-joined.
#[must_use]
pub fn type_summary(schema: &Value, root: &Value) -> Option<String> {
    for kw in COMPOSITION_KEYWORDS {
        if schema.get(kw).is_some_and(Value::is_array) {
            return Some(kw.to_string());
        }
    }

    if schema.get("const").is_some() {
        return Some("const".to_string());
    }

    if schema.get("enum").is_some() {
        return Some("enum".to_string());
    }

    if schema.get("$ref").is_some() {
        return Some("$ref".to_string());
    }

    if preserves_unknown_fields(schema) {
        return Some(String::new());
    }

    match schema.get("type") {
        Some(Value::String(s)) if s == "array" => {
            let item_ty = schema.get("items").and_then(|i| type_summary(i, root));
            Some(item_ty.map_or_else(|| "array".to_string(), |t| format!("{t}[]")))
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(arr)) => {
            let types: Vec<&str> = arr.iter().filter_map(Value::as_str).collect();
            Some(types.join(", "))
        }
        _ => None,
    }
}
