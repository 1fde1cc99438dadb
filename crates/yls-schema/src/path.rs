/// A path into a JSON Schema's shape, as opposed to a concrete YAML
/// document: property access is `.name`, array element access drops the
/// index (`.items` produces a single path shared by every element, e.g.
/// `.spec.ports[].name`), and a branch taken inside `oneOf`/`anyOf` is
/// recorded as `?<i>` so two alternatives don't collide on the same path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaPath(String);

impl SchemaPath {
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

    #[must_use]
    pub fn join_key(&self, key: &str) -> Self {
        Self(format!("{}.{key}", self.0))
    }

    #[must_use]
    pub fn join_items(&self) -> Self {
        Self(format!("{}[]", self.0))
    }

    #[must_use]
    pub fn join_branch(&self, index: usize) -> Self {
        Self(format!("{}?{index}", self.0))
    }
}

impl core::fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Translate a concrete YAML document path (`.spec.ports.0.name`, with
/// literal array indices) into the corresponding schema path
/// (`.spec.ports[].name`), for looking up documentation at a cursor
/// position. A segment is treated as an array index, and collapsed to
/// `[]`, only when it parses as an unsigned integer.
#[must_use]
pub fn yaml_path_to_schema_path(segments: &[&str]) -> SchemaPath {
    let mut path = SchemaPath::root();
    for seg in segments {
        if seg.parse::<usize>().is_ok() {
            path = path.join_items();
        } else {
            path = path.join_key(seg);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_builds_dotted_path() {
        let p = SchemaPath::root().join_key("spec").join_key("ports").join_items().join_key("name");
        assert_eq!(p.as_str(), ".spec.ports[].name");
    }

    #[test]
    fn join_branch_marks_alternative() {
        let p = SchemaPath::root().join_key("spec").join_branch(1).join_key("replicas");
        assert_eq!(p.as_str(), ".spec?1.replicas");
    }

    #[test]
    fn yaml_path_collapses_indices() {
        let p = yaml_path_to_schema_path(&["spec", "ports", "0", "name"]);
        assert_eq!(p.as_str(), ".spec.ports[].name");
    }
}
