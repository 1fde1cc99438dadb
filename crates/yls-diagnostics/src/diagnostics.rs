use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Default label text used for span annotations when no specific instance path
/// is available. Checked by reporters to decide whether to show the path suffix.
pub const DEFAULT_LABEL: &str = "here";

/// A parse error with exact source location.
///
/// Converted into [`YamlLsError::Parse`] via the `From` impl.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseDiagnostic {
    pub src: NamedSource<String>,
    pub span: SourceSpan,
    pub message: String,
}

/// A single diagnostic produced while processing a YAML document.
#[derive(Debug, Error, Diagnostic)]
pub enum YamlLsError {
    #[error("{message}")]
    #[diagnostic(code(yamlls::parse))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(code(yamlls::validation), url("{schema_url}"))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{label}")]
        span: SourceSpan,
        #[label("from {schema_url}")]
        schema_span: SourceSpan,
        path: String,
        instance_path: String,
        label: String,
        message: String,
        /// Schema URI this document was validated against.
        schema_url: String,
        /// JSON Schema path that triggered the error (e.g. `/properties/ports/items`).
        schema_path: String,
    },

    /// Validation error for the project's own `yamlls.toml` against its built-in schema.
    #[error("{path}: {message}")]
    #[diagnostic(code(yamlls::config))]
    Config {
        #[source_code]
        src: NamedSource<String>,
        #[label("{instance_path}")]
        span: SourceSpan,
        path: String,
        instance_path: String,
        message: String,
    },

    #[error("{path}: {message}")]
    #[diagnostic(code(yamlls::io))]
    Io { path: String, message: String },

    #[error("{path}: {message}")]
    #[diagnostic(code(yamlls::schema::fetch))]
    SchemaFetch { path: String, message: String },

    #[error("{path}: {message}")]
    #[diagnostic(code(yamlls::schema::compile))]
    SchemaCompile { path: String, message: String },
}

impl From<ParseDiagnostic> for YamlLsError {
    fn from(d: ParseDiagnostic) -> Self {
        YamlLsError::Parse {
            src: d.src,
            span: d.span,
            message: d.message,
        }
    }
}

impl YamlLsError {
    /// File path associated with this error.
    pub fn path(&self) -> &str {
        match self {
            YamlLsError::Parse { src, .. } => src.name(),
            YamlLsError::Validation { path, .. }
            | YamlLsError::Config { path, .. }
            | YamlLsError::Io { path, .. }
            | YamlLsError::SchemaFetch { path, .. }
            | YamlLsError::SchemaCompile { path, .. } => path,
        }
    }

    /// Human-readable error message.
    pub fn message(&self) -> &str {
        match self {
            YamlLsError::Parse { message, .. }
            | YamlLsError::Validation { message, .. }
            | YamlLsError::Config { message, .. }
            | YamlLsError::Io { message, .. }
            | YamlLsError::SchemaFetch { message, .. }
            | YamlLsError::SchemaCompile { message, .. } => message,
        }
    }

    /// Byte offset in the source file (for sorting).
    pub fn offset(&self) -> usize {
        match self {
            YamlLsError::Parse { span, .. }
            | YamlLsError::Validation { span, .. }
            | YamlLsError::Config { span, .. } => span.offset(),
            YamlLsError::Io { .. }
            | YamlLsError::SchemaFetch { .. }
            | YamlLsError::SchemaCompile { .. } => 0,
        }
    }
}

/// Convert a byte offset into 1-based (line, column).
///
/// Returns `(1, 1)` if the offset is 0 or the content is empty.
pub fn offset_to_line_col(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Find the byte offset of the first non-comment, non-blank line in the content.
///
/// Skips lines that start with `#` (YAML comments, including the
/// `yaml-language-server` modeline) as well as blank lines. Returns 0 if all
/// lines are comments or the content is empty.
fn first_content_offset(content: &str) -> usize {
    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            let key_start = line.len() - trimmed.len();
            return offset + key_start;
        }
        offset += line.len() + 1; // +1 for newline
    }
    0
}

/// Find the byte span `(offset, length)` of a JSON pointer path segment in the
/// source text, suitable for converting directly into a [`SourceSpan`].
///
/// For an `instance_path` like `/spec/replicas`, searches for the last segment
/// `replicas` as a JSON key (`"replicas"`) or YAML key (`replicas:`), and
/// returns a span covering the matched token.
///
/// For root-level errors (empty or "/" path), skips past leading comment and
/// blank lines so the error arrow points at actual content rather than the
/// `yaml-language-server` modeline. The returned span has zero length in this
/// case since there is no specific token.
///
/// Falls back to `(0, 0)` if nothing is found. This is the fallback used by
/// the validator when a path has no corresponding entry in the YAML Path
/// Index (see `yls-yaml`) -- for example when the offending key itself was
/// rejected by `additionalProperties: false` and so was never indexed.
pub fn find_instance_path_span(content: &str, instance_path: &str) -> (usize, usize) {
    if instance_path.is_empty() || instance_path == "/" {
        return (first_content_offset(content), 0);
    }

    let segment = instance_path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return (0, 0);
    }

    let json_key = format!("\"{segment}\"");
    if let Some(pos) = content.find(&json_key) {
        return (pos, json_key.len());
    }

    let yaml_key = format!("{segment}:");
    let quoted_yaml_key = format!("\"{segment}\":");
    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with(&quoted_yaml_key) {
            let key_start = line.len() - trimmed.len();
            return (offset + key_start, quoted_yaml_key.len() - 1);
        }
        if trimmed.starts_with(&yaml_key) {
            let key_start = line.len() - trimmed.len();
            return (offset + key_start, segment.len());
        }
        offset += line.len() + 1; // +1 for newline
    }

    (0, 0)
}

/// Build a label string combining the instance path and the schema path.
///
/// Returns just the `instance_path` when `schema_path` is empty.
pub fn format_label(instance_path: &str, schema_path: &str) -> String {
    if schema_path.is_empty() {
        instance_path.to_string()
    } else {
        format!("{instance_path} in {schema_path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_zero_returns_line_one_col_one() {
        assert_eq!(offset_to_line_col("hello", 0), (1, 1));
    }

    #[test]
    fn offset_within_first_line() {
        assert_eq!(offset_to_line_col("hello world", 5), (1, 6));
    }

    #[test]
    fn offset_at_second_line() {
        assert_eq!(offset_to_line_col("ab\ncd\nef", 3), (2, 1));
    }

    #[test]
    fn offset_middle_of_second_line() {
        assert_eq!(offset_to_line_col("ab\ncd\nef", 4), (2, 2));
    }

    #[test]
    fn offset_at_third_line() {
        assert_eq!(offset_to_line_col("ab\ncd\nef", 6), (3, 1));
    }

    #[test]
    fn offset_past_end_clamps() {
        assert_eq!(offset_to_line_col("ab\ncd", 100), (2, 3));
    }

    #[test]
    fn empty_content() {
        assert_eq!(offset_to_line_col("", 0), (1, 1));
    }

    #[test]
    fn root_path_skips_yaml_modeline() {
        let content = "# yaml-language-server: $schema=https://example.com/s.json\nname: hello\n";
        let (offset, len) = find_instance_path_span(content, "");
        assert_eq!(offset, 59); // "name: hello" starts right after the modeline + newline
        assert_eq!(len, 0);
        assert_eq!(offset_to_line_col(content, offset), (2, 1));
    }

    #[test]
    fn root_path_skips_multiple_comments() {
        let content = "# modeline\n# another comment\n\nname: hello\n";
        let (offset, _) = find_instance_path_span(content, "");
        assert_eq!(offset_to_line_col(content, offset), (4, 1));
    }

    #[test]
    fn root_path_no_comments_returns_zero() {
        let content = "{\"name\": \"hello\"}";
        assert_eq!(find_instance_path_span(content, ""), (0, 0));
    }

    #[test]
    fn root_path_slash_skips_comments() {
        let content = "# yaml-language-server: $schema=url\ndata: value\n";
        let (offset, _) = find_instance_path_span(content, "/");
        assert_eq!(offset_to_line_col(content, offset), (2, 1));
    }

    #[test]
    fn span_highlights_json_key() {
        let content = r#"{"name": "hello", "age": 30}"#;
        assert_eq!(find_instance_path_span(content, "/name"), (1, 6));
        assert_eq!(find_instance_path_span(content, "/age"), (18, 5));
    }

    #[test]
    fn span_highlights_yaml_key() {
        let content = "name: hello\nage: 30\n";
        assert_eq!(find_instance_path_span(content, "/name"), (0, 4));
        assert_eq!(find_instance_path_span(content, "/age"), (12, 3));
    }

    #[test]
    fn span_highlights_quoted_yaml_key() {
        let content = "\"on\": push\n";
        assert_eq!(find_instance_path_span(content, "/on"), (0, 4));
    }

    #[test]
    fn error_codes() {
        use miette::Diagnostic;

        let cases: Vec<(YamlLsError, &str)> = vec![
            (
                YamlLsError::Parse {
                    src: NamedSource::new("f", String::new()),
                    span: 0.into(),
                    message: String::new(),
                },
                "yamlls::parse",
            ),
            (
                YamlLsError::Validation {
                    src: NamedSource::new("f", String::new()),
                    span: 0.into(),
                    schema_span: 0.into(),
                    path: String::new(),
                    instance_path: String::new(),
                    label: String::new(),
                    message: String::new(),
                    schema_url: String::new(),
                    schema_path: String::new(),
                },
                "yamlls::validation",
            ),
            (
                YamlLsError::Config {
                    src: NamedSource::new("f", String::new()),
                    span: 0.into(),
                    path: String::new(),
                    instance_path: String::new(),
                    message: String::new(),
                },
                "yamlls::config",
            ),
            (
                YamlLsError::Io {
                    path: String::new(),
                    message: String::new(),
                },
                "yamlls::io",
            ),
            (
                YamlLsError::SchemaFetch {
                    path: String::new(),
                    message: String::new(),
                },
                "yamlls::schema::fetch",
            ),
            (
                YamlLsError::SchemaCompile {
                    path: String::new(),
                    message: String::new(),
                },
                "yamlls::schema::compile",
            ),
        ];

        for (error, expected_code) in cases {
            assert_eq!(
                error.code().expect("missing diagnostic code").to_string(),
                expected_code,
                "wrong code for {error:?}"
            );
        }
    }

    #[test]
    fn format_label_with_schema_path() {
        assert_eq!(
            format_label("/spec/ports/0/name", "/properties/spec/properties/ports/items"),
            "/spec/ports/0/name in /properties/spec/properties/ports/items"
        );
    }

    #[test]
    fn format_label_empty_schema_path() {
        assert_eq!(format_label("/name", ""), "/name");
    }
}
