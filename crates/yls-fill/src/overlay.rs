use serde_json::Value;

/// Set `kind` and `apiVersion` on a filled document, overwriting whatever
/// the schema itself produced for those fields (typically empty strings).
pub fn overlay_kind_api_version(value: &mut Value, kind: &str, api_version: &str) {
    if let Value::Object(map) = value {
        map.insert("kind".to_string(), Value::String(kind.to_string()));
        map.insert("apiVersion".to_string(), Value::String(api_version.to_string()));
    }
}

/// Remove the top-level `status` field, which Kubernetes populates
/// server-side and which has no place in a template a user will apply.
pub fn delete_status_field(value: &mut Value) {
    if let Value::Object(map) = value {
        map.remove("status");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overlay_sets_kind_and_api_version() {
        let mut value = json!({"kind": "", "apiVersion": "", "spec": {}});
        overlay_kind_api_version(&mut value, "Pod", "v1");
        assert_eq!(value, json!({"kind": "Pod", "apiVersion": "v1", "spec": {}}));
    }

    #[test]
    fn delete_status_removes_field() {
        let mut value = json!({"spec": {}, "status": {"phase": "Running"}});
        delete_status_field(&mut value);
        assert_eq!(value, json!({"spec": {}}));
    }

    #[test]
    fn delete_status_is_a_no_op_when_absent() {
        let mut value = json!({"spec": {}});
        delete_status_field(&mut value);
        assert_eq!(value, json!({"spec": {}}));
    }

    #[test]
    fn overlay_on_non_object_is_a_no_op() {
        let mut value = json!("not-an-object");
        overlay_kind_api_version(&mut value, "Pod", "v1");
        assert_eq!(value, json!("not-an-object"));
    }
}
