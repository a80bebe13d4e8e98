//! Engine entry points: seeded, reproducible document generation with an
//! optional validate-first gate.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

use papermill_core::{Recipe, RecipeError, ReferenceBag, Result};

use crate::derive;
use crate::generators::{GenContext, generate_schema};
use crate::validate::validate_recipe;

/// Engine configuration.
#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    /// Null probability applied to nullable fields that carry no percentage
    /// of their own.
    pub global_nullable_percentage: f64,
    /// Fixed RNG seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Reject the recipe up front when validation finds any issue.
    pub validate_first: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            global_nullable_percentage: 0.0,
            seed: None,
            validate_first: true,
        }
    }
}

/// Recipe-driven document generator. One engine owns one RNG stream, so a
/// seeded engine replays the same documents in the same order.
pub struct DocumentEngine {
    options: EngineOptions,
    rng: ChaCha8Rng,
}

impl DocumentEngine {
    pub fn new(options: EngineOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self { options, rng }
    }

    /// Generate one document: schema pass, then derivatives over the frozen
    /// flattened snapshot.
    pub fn generate(&mut self, recipe: &Recipe, references: &ReferenceBag) -> Result<Value> {
        if self.options.validate_first {
            let report = validate_recipe(recipe, references);
            if !report.is_valid {
                return Err(RecipeError::InvalidRecipe(report.errors.len()));
            }
        }

        let started = Instant::now();
        let ctx = GenContext {
            references,
            global_nullable_percentage: self.options.global_nullable_percentage,
        };
        let document = generate_schema(&recipe.schema, "", ctx, &mut self.rng)?;
        let document = if recipe.derivatives.is_empty() {
            document
        } else {
            derive::apply(
                &document,
                &recipe.derivatives,
                self.options.global_nullable_percentage,
                &mut self.rng,
            )?
        };
        tracing::debug!(
            fields = recipe.schema.len(),
            derivatives = recipe.derivatives.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "document generated"
        );
        Ok(document)
    }

    pub fn generate_many(
        &mut self,
        recipe: &Recipe,
        references: &ReferenceBag,
        count: usize,
    ) -> Result<Vec<Value>> {
        let started = Instant::now();
        let mut documents = Vec::with_capacity(count);
        for _ in 0..count {
            documents.push(self.generate(recipe, references)?);
        }
        tracing::info!(
            count,
            duration_ms = started.elapsed().as_millis() as u64,
            "batch generation complete"
        );
        Ok(documents)
    }
}

/// One-shot generation without the validate-first gate: contract failures
/// surface as the first error hit, fail-fast.
pub fn generate_document(
    recipe: &Recipe,
    global_nullable_percentage: f64,
    references: &ReferenceBag,
) -> Result<Value> {
    let mut engine = DocumentEngine::new(EngineOptions {
        global_nullable_percentage,
        seed: None,
        validate_first: false,
    });
    engine.generate(recipe, references)
}
