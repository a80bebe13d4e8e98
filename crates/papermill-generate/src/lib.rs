//! Recipe-driven synthetic document generation.
//!
//! A recipe pairs a `schema` (field name to typed field spec) with optional
//! `derivatives` (dotted target path to a value computed from the generated
//! document). This crate turns recipes into JSON documents through a seeded
//! engine, and mirrors the generation contracts as aggregating validators.

pub mod engine;
pub mod provider;
pub mod validate;

mod derive;
mod generators;
mod options;

pub use engine::{DocumentEngine, EngineOptions, generate_document};
pub use validate::{
    ValidationIssue, ValidationReport, validate_derivatives, validate_recipe, validate_schema,
};
