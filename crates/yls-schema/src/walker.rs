use std::collections::HashSet;

use serde_json::Value;

use crate::model::{
    description_of, preserves_unknown_fields, required_set, resolve_ref, type_summary,
};
use crate::path::SchemaPath;

/// Recursion depth past which the Walker stops expanding `$ref`/`properties`/
/// `items` chains, guarding against self-referential schemas (a `$ref` cycle,
/// or a schema that embeds itself under `items`). 32 matches the depth of
/// the deepest legitimate Kubernetes object graphs seen in practice, with
/// comfortable headroom.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A single documented, path-addressable node of a flattened schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    pub path: SchemaPath,
    pub type_tag: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub deprecated: bool,
    pub const_value: Option<Value>,
    pub enum_values: Vec<Value>,
    pub preserve_unknown_fields: bool,
}

impl SchemaProperty {
    fn leaf(path: SchemaPath, schema: &Value, root: &Value, required: bool) -> Self {
        Self {
            path,
            type_tag: type_summary(schema, root),
            description: description_of(schema),
            required,
            deprecated: schema.get("deprecated").and_then(Value::as_bool).unwrap_or(false),
            const_value: schema.get("const").cloned(),
            enum_values: schema
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            preserve_unknown_fields: preserves_unknown_fields(schema),
        }
    }
}

/// Flattens a JSON Schema document into a sorted, path-addressable list of
/// [`SchemaProperty`] entries.
pub struct Walker<'a> {
    root: &'a Value,
    max_depth: usize,
}

impl<'a> Walker<'a> {
    #[must_use]
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn with_max_depth(root: &'a Value, max_depth: usize) -> Self {
        Self { root, max_depth }
    }

    /// Flatten `schema` (normally `self.root` itself) into a sorted list of
    /// properties, each carrying its own path, type summary, description,
    /// and `required` status.
    #[must_use]
    pub fn walk(&self, schema: &Value) -> Vec<SchemaProperty> {
        let mut out = Vec::new();
        self.walk_into(schema, &SchemaPath::root(), false, 0, &mut out);
        out.sort_by(|a, b| a.path.as_str().cmp(b.path.as_str()));
        out
    }

    fn walk_into(
        &self,
        schema: &Value,
        path: &SchemaPath,
        required: bool,
        depth: usize,
        out: &mut Vec<SchemaProperty>,
    ) {
        if depth > self.max_depth {
            return;
        }

        let resolved = resolve_ref(schema, self.root);

        out.push(SchemaProperty::leaf(path.clone(), resolved, self.root, required));

        if let Some(Value::Array(one_of)) = resolved.get("oneOf") {
            self.walk_composition(one_of, path, required, depth, out);
        }
        if let Some(Value::Array(any_of)) = resolved.get("anyOf") {
            self.walk_composition(any_of, path, required, depth, out);
        }
        if let Some(Value::Array(all_of)) = resolved.get("allOf") {
            self.walk_all_of(all_of, path, depth, out);
        }

        if let Some(Value::Object(props)) = resolved.get("properties") {
            let req = required_set(resolved);
            for (key, child) in props {
                let child_path = path.join_key(key);
                let child_required = req.iter().any(|r| r == key);
                self.walk_into(child, &child_path, child_required, depth + 1, out);
            }
        }

        if resolved.get("type").and_then(Value::as_str) == Some("array")
            && let Some(items) = resolved.get("items")
        {
            let item_path = path.join_items();
            self.walk_into(items, &item_path, false, depth + 1, out);
        }
    }

    fn walk_composition(
        &self,
        variants: &[Value],
        path: &SchemaPath,
        required: bool,
        depth: usize,
        out: &mut Vec<SchemaProperty>,
    ) {
        for (i, variant) in variants.iter().enumerate() {
            let branch_path = path.join_branch(i);
            self.walk_into(variant, &branch_path, required, depth + 1, out);
        }
    }

    /// `allOf` branches describe the same node, not alternatives, so their
    /// properties are merged into the parent's own path rather than tagged
    /// with a branch suffix. Properties that collide across branches keep
    /// whichever branch is visited first; `required` is the union.
    fn walk_all_of(
        &self,
        branches: &[Value],
        path: &SchemaPath,
        depth: usize,
        out: &mut Vec<SchemaProperty>,
    ) {
        let mut seen = out.iter().map(|p| p.path.clone()).collect::<HashSet<_>>();
        for branch in branches {
            let resolved = resolve_ref(branch, self.root);
            let mut branch_entries = Vec::new();
            self.walk_into(resolved, path, false, depth + 1, &mut branch_entries);
            for entry in branch_entries {
                if seen.insert(entry.path.clone()) {
                    out.push(entry);
                }
            }
        }
    }

    /// Look up the flattened entry for a single schema path, resolving
    /// `oneOf`/`anyOf` branches by trying each in turn -- used to answer a
    /// hover request once the caller has already translated a cursor
    /// position into a [`SchemaPath`].
    #[must_use]
    pub fn lookup(&self, schema: &Value, path: &SchemaPath) -> Option<SchemaProperty> {
        self.walk(schema).into_iter().find(|p| &p.path == path)
    }
}
