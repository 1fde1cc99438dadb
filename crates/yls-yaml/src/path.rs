/// A path into a YAML document: a dot-joined chain of mapping keys and
/// sequence indices, e.g. `.spec.ports.0.name`. The empty path `""` denotes
/// the document root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YamlPath(String);

impl YamlPath {
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a mapping-key segment.
    #[must_use]
    pub fn join_key(&self, key: &str) -> Self {
        Self(format!("{}.{key}", self.0))
    }

    /// Append a sequence-index segment.
    #[must_use]
    pub fn join_index(&self, index: usize) -> Self {
        Self(format!("{}.{index}", self.0))
    }

    /// The segments of the path, in order, with the leading separator
    /// stripped.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.0[1..].split('.').collect()
        }
    }
}

impl core::fmt::Display for YamlPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for YamlPath {
    fn from(s: &str) -> Self {
        if s.is_empty() || s == "." {
            Self::root()
        } else if let Some(stripped) = s.strip_prefix('.') {
            Self(format!(".{stripped}"))
        } else {
            Self(format!(".{s}"))
        }
    }
}
