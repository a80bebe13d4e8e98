use papermill_core::{Recipe, RecipeError, ReferenceBag};
use papermill_generate::{DocumentEngine, EngineOptions, generate_document};
use serde_json::{Value, json};

fn engine(seed: u64) -> DocumentEngine {
    DocumentEngine::new(EngineOptions {
        global_nullable_percentage: 0.0,
        seed: Some(seed),
        validate_first: false,
    })
}

fn recipe(value: Value) -> Recipe {
    Recipe::from_json(value).unwrap()
}

#[test]
fn non_nullable_fields_are_well_typed() {
    let recipe = recipe(json!({
        "schema": {
            "active": { "type": "boolean" },
            "score": { "type": "number", "options": { "min": 2, "max": 5 } },
            "ratio": { "type": "float", "options": { "min": 0.0, "max": 1.0 } },
            "token": { "type": "id" }
        }
    }));
    let document = engine(7).generate(&recipe, &ReferenceBag::new()).unwrap();

    assert!(document["active"].is_boolean());
    let score = document["score"].as_i64().unwrap();
    assert!((2..=5).contains(&score));
    let ratio = document["ratio"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&ratio));
    assert_eq!(document["token"].as_str().unwrap().len(), 36);
}

#[test]
fn always_null_field_never_parses_its_options() {
    // min > max would fail, but a certain null trial short-circuits first.
    let recipe = recipe(json!({
        "schema": {
            "ghost": {
                "type": "number",
                "nullablePercentage": 1.0,
                "options": { "min": 10, "max": 1 }
            }
        }
    }));
    let document = engine(1).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert!(document["ghost"].is_null());
}

#[test]
fn never_null_field_ignores_the_global_percentage() {
    let recipe = recipe(json!({
        "schema": {
            "kept": { "type": "boolean" },
            "zeroed": { "type": "email", "nullablePercentage": 0.0 }
        }
    }));
    let mut engine = DocumentEngine::new(EngineOptions {
        global_nullable_percentage: 1.0,
        seed: Some(3),
        validate_first: false,
    });
    for _ in 0..20 {
        let document = engine.generate(&recipe, &ReferenceBag::new()).unwrap();
        assert!(document["kept"].is_boolean());
        assert!(document["zeroed"].is_string());
    }
}

#[test]
fn array_with_equal_bounds_has_exact_length() {
    let recipe = recipe(json!({
        "schema": {
            "items": {
                "type": "array",
                "options": {
                    "schema": { "type": "number", "options": { "min": 0, "max": 9 } },
                    "min": 3,
                    "max": 3
                }
            }
        }
    }));
    let document = engine(11).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert_eq!(document["items"].as_array().unwrap().len(), 3);
}

#[test]
fn object_fields_generate_nested_documents() {
    let recipe = recipe(json!({
        "schema": {
            "user": {
                "type": "object",
                "options": {
                    "properties": {
                        "name": { "type": "first-name" },
                        "age": { "type": "number", "options": { "min": 18, "max": 99 } }
                    }
                }
            }
        }
    }));
    let document = engine(5).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert!(document["user"]["name"].is_string());
    assert!(document["user"]["age"].is_i64());
}

#[test]
fn enum_resolves_through_the_reference_bag() {
    let recipe = recipe(json!({
        "schema": { "color": { "type": "enum", "options": "#ref.colors" } }
    }));
    let references: ReferenceBag =
        [("colors", json!(["red", "green", "blue"]))].into_iter().collect();
    let document = engine(2).generate(&recipe, &references).unwrap();
    let color = document["color"].as_str().unwrap();
    assert!(["red", "green", "blue"].contains(&color));
}

#[test]
fn missing_reference_key_fails_generation() {
    let recipe = recipe(json!({
        "schema": { "color": { "type": "enum", "options": "#ref.nope" } }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::ReferenceKeyNotFound(key)) if key == "nope"));
}

#[test]
fn empty_enum_source_is_rejected() {
    let recipe = recipe(json!({
        "schema": { "color": { "type": "enum", "options": [] } }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::EmptySource(field)) if field == "color"));
}

#[test]
fn enum_array_draws_a_subset_of_the_source() {
    let recipe = recipe(json!({
        "schema": { "tags": { "type": "enum-array", "options": ["a", "b", "c"] } }
    }));
    let document = engine(13).generate(&recipe, &ReferenceBag::new()).unwrap();
    let tags = document["tags"].as_array().unwrap();
    assert!(tags.len() <= 3);
    for tag in tags {
        assert!(["a", "b", "c"].contains(&tag.as_str().unwrap()));
    }
}

#[test]
fn timestamp_with_equal_bounds_is_exact() {
    let recipe = recipe(json!({
        "schema": {
            "at": {
                "type": "iso-timestamp",
                "options": {
                    "dateFrom": "2024-05-01T00:00:00Z",
                    "dateTo": "2024-05-01T00:00:00Z"
                }
            }
        }
    }));
    let document = engine(4).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert_eq!(document["at"], json!("2024-05-01T00:00:00Z"));
}

#[test]
fn one_sided_timestamp_bounds_are_rejected() {
    let recipe = recipe(json!({
        "schema": {
            "at": {
                "type": "iso-timestamp",
                "options": { "dateFrom": "2024-05-01T00:00:00Z" }
            }
        }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::InvalidRange { field, .. }) if field == "at"));
}

#[test]
fn format_string_substitutes_properties_in_order() {
    let recipe = recipe(json!({
        "schema": {
            "code": {
                "type": "format-string",
                "options": {
                    "pattern": "{}_{}",
                    "properties": [
                        { "type": "enum", "options": ["apple"] },
                        { "type": "enum", "options": ["pear"] }
                    ]
                }
            }
        }
    }));
    let document = engine(6).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert_eq!(document["code"], json!("apple_pear"));
}

#[test]
fn container_property_in_format_string_is_rejected() {
    let recipe = recipe(json!({
        "schema": {
            "code": {
                "type": "format-string",
                "options": {
                    "pattern": "{}",
                    "properties": [
                        { "type": "enum-array", "options": ["a"] }
                    ]
                }
            }
        }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(
        result,
        Err(RecipeError::UnsupportedNestedType { nested, .. }) if nested == "enum-array"
    ));
}

#[test]
fn unknown_gender_is_rejected() {
    let recipe = recipe(json!({
        "schema": { "name": { "type": "first-name", "options": { "gender": "robot" } } }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(
        result,
        Err(RecipeError::InvalidEnumeration { value, .. }) if value == "robot"
    ));
}

#[test]
fn negative_text_bounds_are_rejected() {
    let recipe = recipe(json!({
        "schema": { "body": { "type": "text", "options": { "min": -10, "max": -5 } } }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::InvalidRange { field, .. }) if field == "body"));
}

#[test]
fn unknown_option_key_is_rejected() {
    let recipe = recipe(json!({
        "schema": { "active": { "type": "boolean", "options": { "bias": 0.9 } } }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::InvalidOptions { field, .. }) if field == "active"));
}

#[test]
fn bounds_resolve_through_the_reference_bag() {
    let recipe = recipe(json!({
        "schema": {
            "score": { "type": "number", "options": { "min": "#ref.low", "max": "#ref.low" } }
        }
    }));
    let references: ReferenceBag = [("low", json!(42))].into_iter().collect();
    let document = engine(8).generate(&recipe, &references).unwrap();
    assert_eq!(document["score"], json!(42));
}

#[test]
fn seeded_engines_replay_identical_documents() {
    let recipe = recipe(json!({
        "schema": {
            "name": { "type": "full-name" },
            "email": { "type": "email" },
            "score": { "type": "number", "options": { "min": 0, "max": 1000 } },
            "bio": { "type": "biography", "nullablePercentage": 0.5 }
        }
    }));
    let first = engine(99).generate_many(&recipe, &ReferenceBag::new(), 5).unwrap();
    let second = engine(99).generate_many(&recipe, &ReferenceBag::new(), 5).unwrap();
    assert_eq!(first, second);
}

#[test]
fn validate_first_gate_rejects_broken_recipes() {
    let recipe = recipe(json!({
        "schema": {
            "a": { "type": "number", "options": { "min": 9, "max": 1 } },
            "b": { "type": "enum", "options": [] }
        }
    }));
    let mut engine = DocumentEngine::new(EngineOptions {
        seed: Some(1),
        ..EngineOptions::default()
    });
    let result = engine.generate(&recipe, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::InvalidRecipe(2))));
}
