use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{RecipeError, Result};

/// A dotted document path held as explicit segments.
///
/// Paths address object members only; arrays are atomic leaves and are
/// never indexed into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split('.').map(str::to_string).collect())
    }

    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Dotted-path view of a nested document, used by the derivatives
/// evaluator. Ephemeral: produced by [`flatten`], consumed by [`unflatten`].
pub type FlattenedView = BTreeMap<String, Value>;

/// Flatten a document into dotted-path leaves.
///
/// Objects are recursed; arrays, scalars and nulls are kept as atomic leaf
/// values so their contents survive a round trip. An empty object is itself
/// a leaf for the same reason.
pub fn flatten(document: &Value) -> FlattenedView {
    let mut view = FlattenedView::new();
    if let Value::Object(map) = document {
        for (name, value) in map {
            flatten_into(&FieldPath::root(name.clone()), value, &mut view);
        }
    }
    view
}

fn flatten_into(path: &FieldPath, value: &Value, view: &mut FlattenedView) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (name, child) in map {
                flatten_into(&path.child(name), child, view);
            }
        }
        leaf => {
            view.insert(path.to_string(), leaf.clone());
        }
    }
}

/// Rebuild a nested document from a flattened view, creating intermediate
/// objects as needed.
///
/// Writing through an existing non-object value is a [`RecipeError::PathConflict`].
pub fn unflatten(view: FlattenedView) -> Result<Value> {
    let mut root = Map::new();
    for (raw_path, value) in view {
        let path = FieldPath::parse(&raw_path);
        insert_at(&mut root, &path, value)?;
    }
    Ok(Value::Object(root))
}

fn insert_at(root: &mut Map<String, Value>, path: &FieldPath, value: Value) -> Result<()> {
    let segments = path.segments();
    let (leaf, parents) = segments
        .split_last()
        .ok_or_else(|| RecipeError::PathConflict(path.to_string()))?;

    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            _ => {
                let conflict = segments[..=depth].join(".");
                return Err(RecipeError::PathConflict(conflict));
            }
        };
    }

    current.insert(leaf.clone(), value);
    Ok(())
}
