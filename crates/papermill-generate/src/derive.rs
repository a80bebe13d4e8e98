//! Derivative fields: post-generation values computed from a frozen,
//! dotted-path flattened snapshot of the primary document.
//!
//! Every derivative reads the snapshot taken before any derivative ran, so
//! evaluation order can never matter and derivatives cannot observe each
//! other.

use rand::Rng;
use serde_json::Value;

use papermill_core::{
    DeriveSpec, DeriveType, Derivatives, FlattenedView, RecipeError, Result, flatten, unflatten,
};

use crate::generators::{effective_null_probability, interpolate, value_to_string};
use crate::options::{OptionKind, OptionSpec, invalid_options, invalid_range, validate_options};
use crate::provider;

const COPY_OPTIONS: &[OptionSpec] = &[OptionSpec::new("field", OptionKind::String, true)];
const INTERPOLATION_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("pattern", OptionKind::String, true),
    OptionSpec::new("fields", OptionKind::StringArray, true),
];
const DATE_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("field", OptionKind::String, true),
    OptionSpec::new("days", OptionKind::Int, true),
];

/// A derivative with its options parsed.
pub(crate) enum DerivePlan {
    Copy {
        field: String,
    },
    Interpolation {
        pattern: String,
        fields: Vec<String>,
    },
    DateBefore {
        field: String,
        days: i64,
    },
    DateAfter {
        field: String,
        days: i64,
    },
}

impl DerivePlan {
    /// Dotted paths this derivative reads from the primary document.
    pub(crate) fn referenced_fields(&self) -> Vec<&str> {
        match self {
            DerivePlan::Copy { field }
            | DerivePlan::DateBefore { field, .. }
            | DerivePlan::DateAfter { field, .. } => vec![field.as_str()],
            DerivePlan::Interpolation { fields, .. } => {
                fields.iter().map(String::as_str).collect()
            }
        }
    }
}

/// Evaluate all derivatives against `document` and splice the results in at
/// their dotted target paths.
pub(crate) fn apply<R: Rng>(
    document: &Value,
    derivatives: &Derivatives,
    global_nullable_percentage: f64,
    rng: &mut R,
) -> Result<Value> {
    let snapshot = flatten(document);
    let mut output = snapshot.clone();
    for (target, spec) in derivatives {
        output.insert(
            target.clone(),
            evaluate(target, spec, &snapshot, global_nullable_percentage, rng)?,
        );
    }
    unflatten(output)
}

/// One derivative: the nullable trial runs before option parsing, exactly
/// as it does for schema fields.
fn evaluate<R: Rng>(
    target: &str,
    spec: &DeriveSpec,
    snapshot: &FlattenedView,
    global_nullable_percentage: f64,
    rng: &mut R,
) -> Result<Value> {
    if let Some(chance) = effective_null_probability(
        target,
        spec.is_nullable,
        spec.nullable_percentage,
        global_nullable_percentage,
    )? && rng.random_bool(chance)
    {
        return Ok(Value::Null);
    }

    let plan = parse_derive(target, spec.derive_type, spec.options.as_ref())?;
    execute(target, &plan, snapshot, rng)
}

/// Parse a derivative's options into a typed plan. The validators run the
/// same parse, so contract failures surface identically in both paths.
pub(crate) fn parse_derive(
    target: &str,
    derive_type: DeriveType,
    options: Option<&Value>,
) -> Result<DerivePlan> {
    match derive_type {
        DeriveType::Copy => {
            let map = validate_options(target, options, COPY_OPTIONS)?;
            Ok(DerivePlan::Copy {
                field: map.get_str("field").unwrap_or_default().to_string(),
            })
        }
        DeriveType::StringInterpolation => {
            let map = validate_options(target, options, INTERPOLATION_OPTIONS)?;
            let pattern = map.get_str("pattern").unwrap_or_default().to_string();
            let fields: Vec<String> = map
                .get("fields")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            let placeholders = pattern.matches("{}").count();
            if placeholders != fields.len() {
                return Err(invalid_options(
                    target,
                    &format!(
                        "pattern has {placeholders} placeholder(s) but {} field(s)",
                        fields.len()
                    ),
                ));
            }
            Ok(DerivePlan::Interpolation { pattern, fields })
        }
        DeriveType::DateBefore => {
            let (field, days) = date_options(target, options)?;
            Ok(DerivePlan::DateBefore { field, days })
        }
        DeriveType::DateAfter => {
            let (field, days) = date_options(target, options)?;
            Ok(DerivePlan::DateAfter { field, days })
        }
    }
}

fn date_options(target: &str, options: Option<&Value>) -> Result<(String, i64)> {
    let map = validate_options(target, options, DATE_OPTIONS)?;
    let field = map.get_str("field").unwrap_or_default().to_string();
    let days = map.get("days").and_then(Value::as_i64).unwrap_or_default();
    if days < 0 {
        return Err(invalid_range(target, "days must be >= 0"));
    }
    // The window is drawn in seconds; a `days` value whose second count
    // does not fit i64 can never describe a real window.
    if days.checked_mul(86_400).is_none() {
        return Err(invalid_range(target, "days window is too large"));
    }
    Ok((field, days))
}

fn execute<R: Rng>(
    target: &str,
    plan: &DerivePlan,
    snapshot: &FlattenedView,
    rng: &mut R,
) -> Result<Value> {
    match plan {
        DerivePlan::Copy { field } => Ok(lookup(snapshot, field)?.clone()),
        DerivePlan::Interpolation { pattern, fields } => {
            let mut substitutions = Vec::with_capacity(fields.len());
            for field in fields {
                substitutions.push(value_to_string(lookup(snapshot, field)?));
            }
            Ok(Value::String(interpolate(pattern, &substitutions)))
        }
        DerivePlan::DateBefore { field, days } => {
            let anchor = anchor_timestamp(target, snapshot, field)?;
            Ok(Value::String(provider::timestamp_before(rng, anchor, *days)))
        }
        DerivePlan::DateAfter { field, days } => {
            let anchor = anchor_timestamp(target, snapshot, field)?;
            Ok(Value::String(provider::timestamp_after(rng, anchor, *days)))
        }
    }
}

fn lookup<'a>(snapshot: &'a FlattenedView, field: &str) -> Result<&'a Value> {
    snapshot
        .get(field)
        .ok_or_else(|| RecipeError::PathNotFound(field.to_string()))
}

fn anchor_timestamp(
    target: &str,
    snapshot: &FlattenedView,
    field: &str,
) -> Result<chrono::DateTime<chrono::Utc>> {
    let value = lookup(snapshot, field)?;
    value
        .as_str()
        .and_then(provider::parse_timestamp)
        .ok_or_else(|| {
            invalid_options(
                target,
                &format!("field '{field}' does not hold an ISO-8601 timestamp"),
            )
        })
}
