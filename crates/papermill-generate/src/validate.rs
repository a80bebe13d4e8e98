//! Recipe validation: the aggregating mirror of the generation path.
//!
//! The validators run the same per-variant parse as the generator, but
//! instead of failing on the first problem they record every issue found
//! across the whole recipe, so a caller sees all defects in one pass.

use std::collections::BTreeSet;

use serde::Serialize;

use papermill_core::{Derivatives, FieldSpec, Recipe, RecipeError, ReferenceBag, Schema};

use crate::derive::parse_derive;
use crate::generators::{effective_null_probability, join_path, parse_variant, VariantPlan};

/// One problem found in a recipe, anchored at a dotted field path.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ValidationIssue {
    pub path: String,
    pub code: &'static str,
    pub message: String,
}

/// Outcome of validating a recipe. `is_valid` latches false on the first
/// recorded issue; `errors` holds every issue in schema order.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, path: &str, error: &RecipeError) {
        tracing::warn!(path, code = error.code(), message = %error, "recipe validation issue");
        self.is_valid = false;
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            code: error.code(),
            message: error.to_string(),
        });
    }

    pub(crate) fn merge(&mut self, other: ValidationReport) {
        self.is_valid = self.is_valid && other.is_valid;
        self.errors.extend(other.errors);
    }
}

/// Validate every schema field, recursing into nested objects, array
/// elements, and format-string properties.
pub fn validate_schema(schema: &Schema, references: &ReferenceBag) -> ValidationReport {
    let mut report = ValidationReport::valid();
    visit_schema(schema, "", references, &mut report);
    report
}

/// Validate every derivative: its option contract plus the existence of
/// each referenced dotted path in the schema.
pub fn validate_derivatives(
    schema: &Schema,
    derivatives: &Derivatives,
    references: &ReferenceBag,
) -> ValidationReport {
    let mut report = ValidationReport::valid();
    let known_paths = schema_paths(schema, references);
    for (target, spec) in derivatives {
        if let Err(error) = effective_null_probability(
            target,
            spec.is_nullable,
            spec.nullable_percentage,
            0.0,
        ) {
            report.record(target, &error);
        }
        match parse_derive(target, spec.derive_type, spec.options.as_ref()) {
            Err(error) => report.record(target, &error),
            Ok(plan) => {
                for field in plan.referenced_fields() {
                    if !known_paths.contains(field) {
                        report.record(target, &RecipeError::PathNotFound(field.to_string()));
                    }
                }
            }
        }
    }
    report
}

/// Validate a whole recipe: schema first, then derivatives against it.
pub fn validate_recipe(recipe: &Recipe, references: &ReferenceBag) -> ValidationReport {
    let mut report = validate_schema(&recipe.schema, references);
    report.merge(validate_derivatives(
        &recipe.schema,
        &recipe.derivatives,
        references,
    ));
    report
}

fn visit_schema(
    schema: &Schema,
    parent: &str,
    references: &ReferenceBag,
    report: &mut ValidationReport,
) {
    for (name, spec) in schema {
        let path = join_path(parent, name);
        visit_field(&path, spec, references, report);
    }
}

fn visit_field(
    path: &str,
    spec: &FieldSpec,
    references: &ReferenceBag,
    report: &mut ValidationReport,
) {
    if let Err(error) = effective_null_probability(
        path,
        spec.is_nullable,
        spec.nullable_percentage,
        0.0,
    ) {
        report.record(path, &error);
    }

    match parse_variant(path, spec.field_type, spec.options.as_ref(), references) {
        Err(error) => report.record(path, &error),
        Ok(VariantPlan::Object(children)) => visit_schema(&children, path, references, report),
        Ok(VariantPlan::Array { element, .. }) => {
            visit_field(&format!("{path}[]"), &element, references, report);
        }
        Ok(VariantPlan::FormatString { properties, .. }) => {
            for (index, property) in properties.iter().enumerate() {
                visit_field(&format!("{path}{{{index}}}"), property, references, report);
            }
        }
        Ok(_) => {}
    }
}

/// Dotted paths the flattened snapshot of a generated document can contain.
/// Flattening recurses through non-empty objects without emitting the
/// container itself, so such container paths are excluded here; an object
/// with no properties stays an atomic leaf and keeps its path. Fields whose
/// options fail to parse contribute only their own path; their defects are
/// reported elsewhere.
fn schema_paths(schema: &Schema, references: &ReferenceBag) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    collect_paths(schema, "", references, &mut paths);
    paths
}

fn collect_paths(
    schema: &Schema,
    parent: &str,
    references: &ReferenceBag,
    paths: &mut BTreeSet<String>,
) {
    for (name, spec) in schema {
        let path = join_path(parent, name);
        if let Ok(VariantPlan::Object(children)) = parse_variant(
            &path,
            spec.field_type,
            spec.options.as_ref(),
            references,
        ) && !children.is_empty()
        {
            collect_paths(&children, &path, references, paths);
            continue;
        }
        paths.insert(path);
    }
}
