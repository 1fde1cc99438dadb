/// Extract a `# yaml-language-server: $schema=URL` modeline comment, the
/// convention several editors and this implementation's teacher both honor
/// as an explicit, higher-priority override of kind/apiVersion-based schema
/// discovery. Only the first `$schema=` value is used; a modeline naming
/// several schemas with `,` is a multi-schema feature this implementation
/// does not support.
#[must_use]
pub fn extract_schema_modeline(doc_text: &str) -> Option<String> {
    for line in doc_text.lines() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix('#') else {
            continue;
        };
        let Some(directive) = rest.trim_start().strip_prefix("yaml-language-server:") else {
            continue;
        };
        for token in directive.split_whitespace() {
            if let Some(value) = token.strip_prefix("$schema=") {
                let first = value.split(',').next().unwrap_or(value);
                if !first.is_empty() {
                    return Some(first.to_string());
                }
            }
        }
    }
    None
}
