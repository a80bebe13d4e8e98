//! Option-contract layer for schema and derivative variants.
//!
//! Each variant declares its contract as a table of [`OptionSpec`]s; the
//! same table is checked by the generator (fail-fast) and the validators
//! (aggregating), so the two can never drift apart. Options marked
//! resolvable may carry a `"#ref.<key>"` indirection string, which is
//! resolved against the reference bag before the typed conversion.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use papermill_core::{RecipeError, ReferenceBag, Result, resolve};

use crate::provider;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    Object,
    Array,
    StringArray,
}

#[derive(Clone, Copy, Debug)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    pub resolvable: bool,
}

impl OptionSpec {
    pub const fn new(key: &'static str, kind: OptionKind, required: bool) -> Self {
        Self {
            key,
            kind,
            required,
            resolvable: false,
        }
    }

    /// An option that may be given as a reference-indirection string.
    pub const fn resolvable(key: &'static str, kind: OptionKind, required: bool) -> Self {
        Self {
            key,
            kind,
            required,
            resolvable: true,
        }
    }
}

pub struct OptionMap<'a> {
    map: Option<&'a Map<String, Value>>,
}

/// Check an options object against a variant's contract.
///
/// Unknown keys, missing required keys, and mistyped values all fail with
/// `InvalidOptions`; resolvable keys holding an indirection string are
/// accepted here and type-checked after resolution.
pub fn validate_options<'a>(
    field: &str,
    options: Option<&'a Value>,
    specs: &[OptionSpec],
) -> Result<OptionMap<'a>> {
    let map = match options {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(invalid_options(field, "options must be a JSON object"));
        }
    };

    if let Some(map) = map {
        for (key, value) in map {
            let Some(spec) = specs.iter().find(|spec| spec.key == key.as_str()) else {
                return Err(invalid_options(field, &format!("unknown option '{key}'")));
            };
            if spec.resolvable && is_reference(value) {
                continue;
            }
            if !kind_matches(spec.kind, value) {
                return Err(invalid_options(
                    field,
                    &format!("invalid value for option '{key}'"),
                ));
            }
        }
    }

    for spec in specs {
        if spec.required && !map.is_some_and(|map| map.contains_key(spec.key)) {
            return Err(invalid_options(
                field,
                &format!("missing required option '{}'", spec.key),
            ));
        }
    }

    Ok(OptionMap { map })
}

impl<'a> OptionMap<'a> {
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|map| map.get(key))
    }

    /// Resolve-then-convert an integer option.
    pub fn resolve_i64(
        &self,
        field: &str,
        key: &str,
        references: &ReferenceBag,
    ) -> Result<Option<i64>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        let value = resolve(raw, references)?;
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid_options(field, &format!("option '{key}' must be an integer")))
    }

    pub fn resolve_f64(
        &self,
        field: &str,
        key: &str,
        references: &ReferenceBag,
    ) -> Result<Option<f64>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        let value = resolve(raw, references)?;
        value
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid_options(field, &format!("option '{key}' must be a number")))
    }

    pub fn resolve_timestamp(
        &self,
        field: &str,
        key: &str,
        references: &ReferenceBag,
    ) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        let value = resolve(raw, references)?;
        let parsed = value.as_str().and_then(provider::parse_timestamp);
        parsed.map(Some).ok_or_else(|| {
            invalid_options(field, &format!("option '{key}' must be an ISO-8601 timestamp"))
        })
    }
}

/// Inclusive integer bounds with defaults and `min <= max` enforcement.
pub fn int_bounds(
    field: &str,
    map: &OptionMap<'_>,
    references: &ReferenceBag,
    defaults: (i64, i64),
) -> Result<(i64, i64)> {
    let min = map.resolve_i64(field, "min", references)?.unwrap_or(defaults.0);
    let max = map.resolve_i64(field, "max", references)?.unwrap_or(defaults.1);
    if min > max {
        return Err(invalid_range(field, "min must be <= max"));
    }
    Ok((min, max))
}

pub fn float_bounds(
    field: &str,
    map: &OptionMap<'_>,
    references: &ReferenceBag,
    defaults: (f64, f64),
) -> Result<(f64, f64)> {
    let min = map.resolve_f64(field, "min", references)?.unwrap_or(defaults.0);
    let max = map.resolve_f64(field, "max", references)?.unwrap_or(defaults.1);
    if min > max {
        return Err(invalid_range(field, "min must be <= max"));
    }
    Ok((min, max))
}

/// Timestamp bounds: both present, or neither. One-sided bounds are
/// rejected; `None` means the provider default applies.
pub fn timestamp_bounds(
    field: &str,
    map: &OptionMap<'_>,
    references: &ReferenceBag,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    let from = map.resolve_timestamp(field, "dateFrom", references)?;
    let to = map.resolve_timestamp(field, "dateTo", references)?;
    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => {
            if from > to {
                return Err(invalid_range(field, "dateFrom must be <= dateTo"));
            }
            Ok(Some((from, to)))
        }
        _ => Err(invalid_range(
            field,
            "dateFrom and dateTo must be given together",
        )),
    }
}

/// A probability option, constrained to `[0, 1]`.
pub fn probability(field: &str, map: &OptionMap<'_>, key: &str, default: f64) -> Result<f64> {
    let value = map.get_f64(key).unwrap_or(default);
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid_range(field, &format!("{key} must be within [0, 1]")));
    }
    Ok(value)
}

pub fn invalid_options(field: &str, message: &str) -> RecipeError {
    RecipeError::InvalidOptions {
        field: field.to_string(),
        message: message.to_string(),
    }
}

pub fn invalid_range(field: &str, message: &str) -> RecipeError {
    RecipeError::InvalidRange {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn is_reference(value: &Value) -> bool {
    matches!(
        papermill_core::RefValue::parse(value),
        papermill_core::RefValue::Reference(_)
    )
}

fn kind_matches(kind: OptionKind, value: &Value) -> bool {
    match kind {
        OptionKind::Bool => value.is_boolean(),
        OptionKind::Int => value.as_i64().is_some(),
        OptionKind::Float => value.as_f64().is_some(),
        OptionKind::String => value.is_string(),
        OptionKind::Timestamp => value
            .as_str()
            .and_then(provider::parse_timestamp)
            .is_some(),
        OptionKind::Object => value.is_object(),
        OptionKind::Array => value.is_array(),
        OptionKind::StringArray => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
    }
}
