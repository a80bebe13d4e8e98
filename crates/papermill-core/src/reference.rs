use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RecipeError, Result};

/// Prefix marking an option value as an indirection into the reference bag.
pub const REF_PREFIX: &str = "#ref.";

/// Externally supplied named values, read-only during one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceBag(BTreeMap<String, Value>);

impl ReferenceBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ReferenceBag {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// An option value at the authoring boundary: either a literal, or a
/// `"#ref.<key>"` pointer into the bag. Parsed once, before any typed use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefValue<'a> {
    Literal(&'a Value),
    Reference(&'a str),
}

impl<'a> RefValue<'a> {
    pub fn parse(value: &'a Value) -> Self {
        match value.as_str().and_then(|s| s.strip_prefix(REF_PREFIX)) {
            Some(key) => RefValue::Reference(key),
            None => RefValue::Literal(value),
        }
    }

    /// Resolve against the bag; literals pass through unchanged.
    pub fn resolve(self, references: &'a ReferenceBag) -> Result<&'a Value> {
        match self {
            RefValue::Literal(value) => Ok(value),
            RefValue::Reference(key) => references
                .get(key)
                .ok_or_else(|| RecipeError::ReferenceKeyNotFound(key.to_string())),
        }
    }
}

/// Shorthand for parse-then-resolve on a raw option value.
pub fn resolve<'a>(value: &'a Value, references: &'a ReferenceBag) -> Result<&'a Value> {
    RefValue::parse(value).resolve(references)
}
