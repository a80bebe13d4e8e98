use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Closed set of schema field variants.
///
/// Unknown tags are rejected when the recipe is parsed, so dispatch over
/// this enum is exhaustive and checked at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Boolean,
    Enum,
    EnumArray,
    IsoTimestamp,
    Object,
    Text,
    NumericString,
    Url,
    UrlDomain,
    Array,
    Number,
    Float,
    Username,
    Gender,
    Biography,
    FirstName,
    LastName,
    FullName,
    Email,
    Country,
    CountryCode,
    ImageUrl,
    FileName,
    SocialMediaPost,
    Id,
    FormatString,
}

impl FieldType {
    /// Wire name of the tag, as it appears in recipe JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Enum => "enum",
            FieldType::EnumArray => "enum-array",
            FieldType::IsoTimestamp => "iso-timestamp",
            FieldType::Object => "object",
            FieldType::Text => "text",
            FieldType::NumericString => "numeric-string",
            FieldType::Url => "url",
            FieldType::UrlDomain => "url-domain",
            FieldType::Array => "array",
            FieldType::Number => "number",
            FieldType::Float => "float",
            FieldType::Username => "username",
            FieldType::Gender => "gender",
            FieldType::Biography => "biography",
            FieldType::FirstName => "first-name",
            FieldType::LastName => "last-name",
            FieldType::FullName => "full-name",
            FieldType::Email => "email",
            FieldType::Country => "country",
            FieldType::CountryCode => "country-code",
            FieldType::ImageUrl => "image-url",
            FieldType::FileName => "file-name",
            FieldType::SocialMediaPost => "social-media-post",
            FieldType::Id => "id",
            FieldType::FormatString => "format-string",
        }
    }
}

/// Closed set of derivative variants, computed after primary generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeriveType {
    StringInterpolation,
    Copy,
    DateBefore,
    DateAfter,
}

impl DeriveType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeriveType::StringInterpolation => "string-interpolation",
            DeriveType::Copy => "copy",
            DeriveType::DateBefore => "date-before",
            DeriveType::DateAfter => "date-after",
        }
    }
}

/// One field's generation rule.
///
/// `options` stays untyped JSON here; each variant's contract is parsed and
/// checked by the generate crate's option layer, which drives generation and
/// validation from the same code path.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            is_nullable: false,
            nullable_percentage: None,
            options: None,
        }
    }

    pub fn with_options(field_type: FieldType, options: Value) -> Self {
        Self {
            field_type,
            is_nullable: false,
            nullable_percentage: None,
            options: Some(options),
        }
    }
}

/// One derivative entry, keyed in [`Derivatives`] by the dotted path it
/// writes to. The path need not exist in the primary schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeriveSpec {
    #[serde(rename = "type")]
    pub derive_type: DeriveType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Field name -> generation rule. Iteration order is lexicographic and
/// deterministic; ordering carries no semantics.
pub type Schema = BTreeMap<String, FieldSpec>;

/// Dotted path -> derivative rule. Entries only ever read the frozen
/// pre-derivative snapshot, so ordering among them is irrelevant.
pub type Derivatives = BTreeMap<String, DeriveSpec>;

/// A schema plus optional derivatives: everything needed to generate one
/// document (references are supplied separately at generation time).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    #[serde(default)]
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub derivatives: Derivatives,
}

impl Recipe {
    /// Parse a recipe from raw JSON, rejecting unknown type tags and
    /// malformed structure up front.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
