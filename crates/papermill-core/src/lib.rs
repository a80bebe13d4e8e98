//! Core contracts for Papermill.
//!
//! This crate defines the recipe data model (schema field tree, derivative
//! entries, reference bag), the dotted-path flatten/unflatten machinery, and
//! the error taxonomy shared with the generation engine.

pub mod error;
pub mod paths;
pub mod recipe;
pub mod reference;

pub use error::{RecipeError, Result};
pub use paths::{FieldPath, FlattenedView, flatten, unflatten};
pub use recipe::{DeriveSpec, DeriveType, Derivatives, FieldSpec, FieldType, Recipe, Schema};
pub use reference::{REF_PREFIX, RefValue, ReferenceBag, resolve};
