/// Extract the top-level `kind` and `apiVersion` string fields from a YAML
/// document, if both are present and scalar. Returns `None` for either a
/// document that genuinely omits them (schema-less by intent) or one that
/// fails to parse at all -- parse failure is reported separately by the
/// caller as `invalid_yaml`.
#[must_use]
pub fn extract_kind_api_version(doc_text: &str) -> Option<(String, String)> {
    let value: serde_yaml::Value = serde_yaml::from_str(doc_text).ok()?;
    let kind = value.get("kind")?.as_str()?.to_string();
    let api_version = value.get("apiVersion")?.as_str()?.to_string();
    Some((kind, api_version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_fields() {
        let doc = "kind: Pod\napiVersion: v1\nmetadata:\n  name: a\n";
        assert_eq!(extract_kind_api_version(doc), Some(("Pod".to_string(), "v1".to_string())));
    }

    #[test]
    fn missing_kind_is_none() {
        let doc = "apiVersion: v1\n";
        assert_eq!(extract_kind_api_version(doc), None);
    }

    #[test]
    fn missing_both_is_none() {
        assert_eq!(extract_kind_api_version("name: hello\n"), None);
    }

    #[test]
    fn quoted_values_are_unquoted() {
        let doc = "kind: \"Pod\"\napiVersion: 'v1'\n";
        assert_eq!(extract_kind_api_version(doc), Some(("Pod".to_string(), "v1".to_string())));
    }

    #[test]
    fn invalid_yaml_is_none() {
        assert_eq!(extract_kind_api_version("kind: [unterminated"), None);
    }
}
