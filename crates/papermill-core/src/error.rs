use thiserror::Error;

/// Core error type shared across Papermill crates.
///
/// Generation is fail-fast: the first error aborts the document and no
/// partial output is returned. Validation never surfaces these as `Err`;
/// it aggregates them into the report type owned by the generate crate.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The recipe JSON is malformed or carries an unknown type tag.
    #[error("invalid recipe: {0}")]
    Parse(#[from] serde_json::Error),
    /// A required option is missing or has the wrong shape.
    #[error("invalid options for '{field}': {message}")]
    InvalidOptions { field: String, message: String },
    /// A numeric, length or date bound is inverted or one-sided.
    #[error("invalid range for '{field}': {message}")]
    InvalidRange { field: String, message: String },
    /// An indirection string points at a key absent from the reference bag.
    #[error("reference key not found: '{0}'")]
    ReferenceKeyNotFound(String),
    /// An enum source resolved to an empty or non-array value.
    #[error("empty source for '{0}'")]
    EmptySource(String),
    /// A value is outside a closed enumeration (e.g. gender).
    #[error("invalid enumeration value '{value}' for '{field}'")]
    InvalidEnumeration { field: String, value: String },
    /// A multi-valued or nested type was used where only scalars are allowed.
    #[error("unsupported nested type '{nested}' in '{field}'")]
    UnsupportedNestedType { field: String, nested: String },
    /// A derivative referenced a path missing from the generated document.
    #[error("path not found in document: '{0}'")]
    PathNotFound(String),
    /// Unflattening would write through a non-object value.
    #[error("path conflict at '{0}'")]
    PathConflict(String),
    /// The recipe failed up-front validation; generation was skipped.
    #[error("recipe failed validation with {0} error(s)")]
    InvalidRecipe(usize),
}

/// Convenience alias for results returned by Papermill crates.
pub type Result<T> = std::result::Result<T, RecipeError>;

impl RecipeError {
    /// Stable machine-readable code for reports and structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            RecipeError::Parse(_) => "parse",
            RecipeError::InvalidOptions { .. } => "invalid_options",
            RecipeError::InvalidRange { .. } => "invalid_range",
            RecipeError::ReferenceKeyNotFound(_) => "reference_key_not_found",
            RecipeError::EmptySource(_) => "empty_source",
            RecipeError::InvalidEnumeration { .. } => "invalid_enumeration",
            RecipeError::UnsupportedNestedType { .. } => "unsupported_nested_type",
            RecipeError::PathNotFound(_) => "path_not_found",
            RecipeError::PathConflict(_) => "path_conflict",
            RecipeError::InvalidRecipe(_) => "invalid_recipe",
        }
    }
}
