//! Schema generation: recursive tree descent with nullable-probability
//! overrides and exhaustive variant dispatch.
//!
//! [`parse_variant`] is the single per-variant contract: it turns a field's
//! raw options into a typed [`VariantPlan`], failing on every shape problem
//! the spec of that variant forbids. The generator executes plans; the
//! validators parse the same plans without executing them.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::Value;

use papermill_core::{FieldSpec, FieldType, RecipeError, ReferenceBag, Result, Schema, resolve};

use crate::options::{
    OptionKind, OptionSpec, float_bounds, int_bounds, invalid_options, invalid_range,
    probability, timestamp_bounds, validate_options,
};
use crate::provider;
use crate::provider::{Gender, LocaleKey};

const DEFAULT_NUMBER_BOUNDS: (i64, i64) = (0, 10000);
const DEFAULT_FLOAT_BOUNDS: (f64, f64) = (0.0, 10000.0);
const DEFAULT_TEXT_WORDS: (i64, i64) = (5, 120);
const DEFAULT_NUMERIC_LENGTH: (i64, i64) = (1, 10);
const DEFAULT_POST_WORDS: (i64, i64) = (5, 25);
const DEFAULT_HASHTAG_PROBABILITY: f64 = 0.3;
const DEFAULT_LINK_PROBABILITY: f64 = 0.2;

const NO_OPTIONS: &[OptionSpec] = &[];
const INT_BOUNDS_OPTIONS: &[OptionSpec] = &[
    OptionSpec::resolvable("min", OptionKind::Int, false),
    OptionSpec::resolvable("max", OptionKind::Int, false),
];
const FLOAT_BOUNDS_OPTIONS: &[OptionSpec] = &[
    OptionSpec::resolvable("min", OptionKind::Float, false),
    OptionSpec::resolvable("max", OptionKind::Float, false),
];
const NUMERIC_STRING_OPTIONS: &[OptionSpec] = &[
    OptionSpec::resolvable("min", OptionKind::Int, false),
    OptionSpec::resolvable("max", OptionKind::Int, false),
    OptionSpec::new("leadingZeros", OptionKind::Bool, false),
];
const TIMESTAMP_OPTIONS: &[OptionSpec] = &[
    OptionSpec::resolvable("dateFrom", OptionKind::Timestamp, false),
    OptionSpec::resolvable("dateTo", OptionKind::Timestamp, false),
];
const NAME_OPTIONS: &[OptionSpec] = &[OptionSpec::new("gender", OptionKind::String, false)];
const URL_OPTIONS: &[OptionSpec] = &[OptionSpec::new("allowNumbers", OptionKind::Bool, false)];
const SOCIAL_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("language", OptionKind::String, false),
    OptionSpec::resolvable("min", OptionKind::Int, false),
    OptionSpec::resolvable("max", OptionKind::Int, false),
    OptionSpec::new("hashtagPercentage", OptionKind::Float, false),
    OptionSpec::new("urlPercentage", OptionKind::Float, false),
];
const OBJECT_OPTIONS: &[OptionSpec] = &[OptionSpec::new("properties", OptionKind::Object, true)];
const ARRAY_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("schema", OptionKind::Object, true),
    OptionSpec::resolvable("min", OptionKind::Int, true),
    OptionSpec::resolvable("max", OptionKind::Int, true),
];
const FORMAT_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("pattern", OptionKind::String, true),
    OptionSpec::new("properties", OptionKind::Array, true),
];

/// Shared inputs for one generation run.
#[derive(Clone, Copy)]
pub(crate) struct GenContext<'a> {
    pub references: &'a ReferenceBag,
    pub global_nullable_percentage: f64,
}

/// A field variant with its options parsed and resolved.
pub(crate) enum VariantPlan {
    Boolean,
    Enum(Vec<Value>),
    EnumArray(Vec<Value>),
    Timestamp(Option<(DateTime<Utc>, DateTime<Utc>)>),
    Object(Schema),
    Text {
        min: i64,
        max: i64,
    },
    NumericString {
        min: i64,
        max: i64,
        leading_zeros: bool,
    },
    Url {
        allow_numbers: bool,
    },
    UrlDomain,
    Array {
        element: Box<FieldSpec>,
        min: i64,
        max: i64,
    },
    Number {
        min: i64,
        max: i64,
    },
    Float {
        min: f64,
        max: f64,
    },
    Username,
    Gender,
    Biography,
    FirstName(Option<Gender>),
    LastName,
    FullName(Option<Gender>),
    Email,
    Country,
    CountryCode,
    ImageUrl,
    FileName,
    SocialMediaPost {
        locale: LocaleKey,
        min: i64,
        max: i64,
        hashtag_probability: f64,
        link_probability: f64,
    },
    Id,
    FormatString {
        pattern: String,
        properties: Vec<FieldSpec>,
    },
}

/// Generate the primary document by walking the schema tree.
pub(crate) fn generate_schema<R: Rng>(
    schema: &Schema,
    parent: &str,
    ctx: GenContext<'_>,
    rng: &mut R,
) -> Result<Value> {
    let mut document = serde_json::Map::new();
    for (name, spec) in schema {
        let path = join_path(parent, name);
        document.insert(name.clone(), generate_field(&path, spec, ctx, rng)?);
    }
    Ok(Value::Object(document))
}

/// Generate one field: the nullable trial runs first, and a winning trial
/// yields `null` without ever parsing the options. A malformed field that
/// always rolls null therefore never fails generation; that is the
/// contract, not an optimization.
pub(crate) fn generate_field<R: Rng>(
    field: &str,
    spec: &FieldSpec,
    ctx: GenContext<'_>,
    rng: &mut R,
) -> Result<Value> {
    if let Some(chance) = effective_null_probability(
        field,
        spec.is_nullable,
        spec.nullable_percentage,
        ctx.global_nullable_percentage,
    )? && rng.random_bool(chance)
    {
        return Ok(Value::Null);
    }

    let plan = parse_variant(field, spec.field_type, spec.options.as_ref(), ctx.references)?;
    execute_plan(field, &plan, ctx, rng)
}

/// Effective nullability per field: nullable iff `isNullable` is set or a
/// positive `nullablePercentage` is given; the probability is the field
/// percentage when present, else the caller's global percentage.
pub(crate) fn effective_null_probability(
    field: &str,
    is_nullable: bool,
    nullable_percentage: Option<f64>,
    global: f64,
) -> Result<Option<f64>> {
    if let Some(chance) = nullable_percentage
        && !(0.0..=1.0).contains(&chance)
    {
        return Err(invalid_range(field, "nullablePercentage must be within [0, 1]"));
    }
    let nullable = is_nullable || nullable_percentage.is_some_and(|chance| chance > 0.0);
    if !nullable {
        return Ok(None);
    }
    Ok(Some(nullable_percentage.unwrap_or(global.clamp(0.0, 1.0))))
}

/// Parse and resolve a variant's options into a typed plan.
pub(crate) fn parse_variant(
    field: &str,
    field_type: FieldType,
    options: Option<&Value>,
    references: &ReferenceBag,
) -> Result<VariantPlan> {
    match field_type {
        FieldType::Boolean => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::Boolean)
        }
        FieldType::Enum => Ok(VariantPlan::Enum(enum_source(field, options, references)?)),
        FieldType::EnumArray => Ok(VariantPlan::EnumArray(enum_source(
            field, options, references,
        )?)),
        FieldType::IsoTimestamp => {
            let map = validate_options(field, options, TIMESTAMP_OPTIONS)?;
            Ok(VariantPlan::Timestamp(timestamp_bounds(
                field, &map, references,
            )?))
        }
        FieldType::Object => {
            let map = validate_options(field, options, OBJECT_OPTIONS)?;
            let properties = map.get("properties").cloned().unwrap_or(Value::Null);
            let schema: Schema = serde_json::from_value(properties)
                .map_err(|err| invalid_options(field, &format!("invalid properties: {err}")))?;
            Ok(VariantPlan::Object(schema))
        }
        FieldType::Text => {
            let map = validate_options(field, options, INT_BOUNDS_OPTIONS)?;
            let (min, max) = int_bounds(field, &map, references, DEFAULT_TEXT_WORDS)?;
            if min < 0 {
                return Err(invalid_range(field, "min must be >= 0"));
            }
            Ok(VariantPlan::Text { min, max })
        }
        FieldType::NumericString => {
            let map = validate_options(field, options, NUMERIC_STRING_OPTIONS)?;
            let (min, max) = int_bounds(field, &map, references, DEFAULT_NUMERIC_LENGTH)?;
            if min < 0 {
                return Err(invalid_range(field, "min must be >= 0"));
            }
            Ok(VariantPlan::NumericString {
                min,
                max,
                leading_zeros: map.get_bool("leadingZeros").unwrap_or(false),
            })
        }
        FieldType::Url => {
            let map = validate_options(field, options, URL_OPTIONS)?;
            Ok(VariantPlan::Url {
                allow_numbers: map.get_bool("allowNumbers").unwrap_or(false),
            })
        }
        FieldType::UrlDomain => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::UrlDomain)
        }
        FieldType::Array => {
            let map = validate_options(field, options, ARRAY_OPTIONS)?;
            let element_raw = map.get("schema").cloned().unwrap_or(Value::Null);
            let element: FieldSpec = serde_json::from_value(element_raw)
                .map_err(|err| invalid_options(field, &format!("invalid element schema: {err}")))?;
            let (min, max) = int_bounds(field, &map, references, (0, 0))?;
            if min < 0 {
                return Err(invalid_range(field, "min must be >= 0"));
            }
            Ok(VariantPlan::Array {
                element: Box::new(element),
                min,
                max,
            })
        }
        FieldType::Number => {
            let map = validate_options(field, options, INT_BOUNDS_OPTIONS)?;
            let (min, max) = int_bounds(field, &map, references, DEFAULT_NUMBER_BOUNDS)?;
            Ok(VariantPlan::Number { min, max })
        }
        FieldType::Float => {
            let map = validate_options(field, options, FLOAT_BOUNDS_OPTIONS)?;
            let (min, max) = float_bounds(field, &map, references, DEFAULT_FLOAT_BOUNDS)?;
            Ok(VariantPlan::Float { min, max })
        }
        FieldType::Username => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::Username)
        }
        FieldType::Gender => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::Gender)
        }
        FieldType::Biography => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::Biography)
        }
        FieldType::FirstName => Ok(VariantPlan::FirstName(gender_option(field, options)?)),
        FieldType::LastName => {
            gender_option(field, options)?;
            Ok(VariantPlan::LastName)
        }
        FieldType::FullName => Ok(VariantPlan::FullName(gender_option(field, options)?)),
        FieldType::Email => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::Email)
        }
        FieldType::Country => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::Country)
        }
        FieldType::CountryCode => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::CountryCode)
        }
        FieldType::ImageUrl => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::ImageUrl)
        }
        FieldType::FileName => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::FileName)
        }
        FieldType::SocialMediaPost => {
            let map = validate_options(field, options, SOCIAL_OPTIONS)?;
            let (min, max) = int_bounds(field, &map, references, DEFAULT_POST_WORDS)?;
            if min < 1 {
                return Err(invalid_range(field, "min must be >= 1"));
            }
            // Unsupported languages fall back to the default locale.
            let locale = map
                .get_str("language")
                .map(LocaleKey::parse_or_default)
                .unwrap_or(LocaleKey::En);
            Ok(VariantPlan::SocialMediaPost {
                locale,
                min,
                max,
                hashtag_probability: probability(
                    field,
                    &map,
                    "hashtagPercentage",
                    DEFAULT_HASHTAG_PROBABILITY,
                )?,
                link_probability: probability(
                    field,
                    &map,
                    "urlPercentage",
                    DEFAULT_LINK_PROBABILITY,
                )?,
            })
        }
        FieldType::Id => {
            validate_options(field, options, NO_OPTIONS)?;
            Ok(VariantPlan::Id)
        }
        FieldType::FormatString => format_plan(field, options),
    }
}

fn execute_plan<R: Rng>(
    field: &str,
    plan: &VariantPlan,
    ctx: GenContext<'_>,
    rng: &mut R,
) -> Result<Value> {
    match plan {
        VariantPlan::Boolean => Ok(Value::Bool(provider::boolean(rng))),
        VariantPlan::Enum(source) => Ok(source
            .choose(rng)
            .cloned()
            .unwrap_or(Value::Null)),
        VariantPlan::EnumArray(source) => {
            let size = rng.random_range(0..=source.len());
            let picks = rand::seq::index::sample(rng, source.len(), size);
            Ok(Value::Array(
                picks.iter().map(|index| source[index].clone()).collect(),
            ))
        }
        VariantPlan::Timestamp(bounds) => Ok(Value::String(match bounds {
            Some((from, to)) => provider::timestamp_between(rng, *from, *to),
            None => provider::timestamp_past(rng),
        })),
        VariantPlan::Object(schema) => generate_schema(schema, field, ctx, rng),
        VariantPlan::Text { min, max } => Ok(Value::String(provider::words(rng, *min, *max))),
        VariantPlan::NumericString {
            min,
            max,
            leading_zeros,
        } => Ok(Value::String(provider::numeric_string(
            rng,
            *min,
            *max,
            *leading_zeros,
        ))),
        VariantPlan::Url { allow_numbers } => {
            Ok(Value::String(provider::url(rng, *allow_numbers)))
        }
        VariantPlan::UrlDomain => Ok(Value::String(provider::url_domain(rng))),
        VariantPlan::Array { element, min, max } => {
            let count = rng.random_range(*min..=*max).max(0) as usize;
            let mut items = Vec::with_capacity(count);
            let element_path = format!("{field}[]");
            for _ in 0..count {
                items.push(generate_field(&element_path, element, ctx, rng)?);
            }
            Ok(Value::Array(items))
        }
        VariantPlan::Number { min, max } => {
            Ok(Value::from(provider::integer_in(rng, *min, *max)))
        }
        VariantPlan::Float { min, max } => Ok(Value::from(provider::float_in(rng, *min, *max))),
        VariantPlan::Username => Ok(Value::String(provider::username(rng))),
        VariantPlan::Gender => Ok(Value::String(provider::gender(rng).to_string())),
        VariantPlan::Biography => Ok(Value::String(provider::biography(rng))),
        VariantPlan::FirstName(gender) => {
            Ok(Value::String(provider::first_name(rng, *gender)))
        }
        VariantPlan::LastName => Ok(Value::String(provider::last_name(rng))),
        VariantPlan::FullName(gender) => Ok(Value::String(provider::full_name(rng, *gender))),
        VariantPlan::Email => Ok(Value::String(provider::email(rng))),
        VariantPlan::Country => Ok(Value::String(provider::country(rng))),
        VariantPlan::CountryCode => Ok(Value::String(provider::country_code(rng))),
        VariantPlan::ImageUrl => Ok(Value::String(provider::image_url(rng))),
        VariantPlan::FileName => Ok(Value::String(provider::file_name(rng))),
        VariantPlan::SocialMediaPost {
            locale,
            min,
            max,
            hashtag_probability,
            link_probability,
        } => Ok(Value::String(provider::social_media_post(
            rng,
            *locale,
            *min,
            *max,
            *hashtag_probability,
            *link_probability,
        ))),
        VariantPlan::Id => Ok(Value::String(provider::opaque_id(rng))),
        VariantPlan::FormatString {
            pattern,
            properties,
        } => {
            let mut substitutions = Vec::with_capacity(properties.len());
            for (index, property) in properties.iter().enumerate() {
                let property_path = format!("{field}{{{index}}}");
                let plan = parse_variant(
                    &property_path,
                    property.field_type,
                    property.options.as_ref(),
                    ctx.references,
                )?;
                let value = execute_plan(&property_path, &plan, ctx, rng)?;
                substitutions.push(value_to_string(&value));
            }
            Ok(Value::String(interpolate(pattern, &substitutions)))
        }
    }
}

/// Enum sources are either a literal array or an indirection string that
/// resolves to one; empty or null sources are rejected.
fn enum_source(
    field: &str,
    options: Option<&Value>,
    references: &ReferenceBag,
) -> Result<Vec<Value>> {
    let raw = match options {
        None | Some(Value::Null) => return Err(RecipeError::EmptySource(field.to_string())),
        Some(raw) => raw,
    };
    let resolved = resolve(raw, references)?;
    match resolved {
        Value::Null => Err(RecipeError::EmptySource(field.to_string())),
        Value::Array(items) if items.is_empty() => {
            Err(RecipeError::EmptySource(field.to_string()))
        }
        Value::Array(items) => Ok(items.clone()),
        _ => Err(invalid_options(
            field,
            "options must be an array or a reference to one",
        )),
    }
}

fn gender_option(field: &str, options: Option<&Value>) -> Result<Option<Gender>> {
    let map = validate_options(field, options, NAME_OPTIONS)?;
    match map.get_str("gender") {
        None => Ok(None),
        Some(raw) => Gender::parse(raw).map(Some).ok_or_else(|| {
            RecipeError::InvalidEnumeration {
                field: field.to_string(),
                value: raw.to_string(),
            }
        }),
    }
}

fn format_plan(field: &str, options: Option<&Value>) -> Result<VariantPlan> {
    let map = validate_options(field, options, FORMAT_OPTIONS)?;
    let pattern = map.get_str("pattern").unwrap_or_default().to_string();
    let properties_raw = map.get("properties").cloned().unwrap_or(Value::Null);
    let properties: Vec<FieldSpec> = serde_json::from_value(properties_raw)
        .map_err(|err| invalid_options(field, &format!("invalid properties: {err}")))?;

    let placeholders = pattern.matches("{}").count();
    if placeholders != properties.len() {
        return Err(invalid_options(
            field,
            &format!(
                "pattern has {placeholders} placeholder(s) but {} propert(ies)",
                properties.len()
            ),
        ));
    }

    // Multi-valued and recursive variants cannot be substituted into a
    // single placeholder.
    for property in &properties {
        if matches!(
            property.field_type,
            FieldType::Object | FieldType::Array | FieldType::EnumArray | FieldType::FormatString
        ) {
            return Err(RecipeError::UnsupportedNestedType {
                field: field.to_string(),
                nested: property.field_type.as_str().to_string(),
            });
        }
    }

    Ok(VariantPlan::FormatString {
        pattern,
        properties,
    })
}

/// Substitute `{}` placeholders left to right. Counts are checked at parse
/// time, so extra pieces cannot occur here.
pub(crate) fn interpolate(pattern: &str, substitutions: &[String]) -> String {
    let mut pieces = pattern.split("{}");
    let mut out = String::from(pieces.next().unwrap_or_default());
    for (piece, substitution) in pieces.zip(substitutions) {
        out.push_str(substitution);
        out.push_str(piece);
    }
    out
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        container => serde_json::to_string(container).unwrap_or_default(),
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}
