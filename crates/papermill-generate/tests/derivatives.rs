use papermill_core::{Recipe, RecipeError, ReferenceBag};
use papermill_generate::{DocumentEngine, EngineOptions, generate_document, provider};
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
fn copy_duplicates_a_nested_value_at_a_new_path() {
    let recipe = recipe(json!({
        "schema": {
            "user": {
                "type": "object",
                "options": {
                    "properties": { "name": { "type": "enum", "options": ["Ada"] } }
                }
            }
        },
        "derivatives": {
            "profile.display": { "type": "copy", "options": { "field": "user.name" } }
        }
    }));
    let document = engine(1).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert_eq!(document["user"]["name"], json!("Ada"));
    assert_eq!(document["profile"]["display"], json!("Ada"));
}

#[test]
fn interpolation_joins_referenced_fields() {
    let recipe = recipe(json!({
        "schema": {
            "first": { "type": "enum", "options": ["Grace"] },
            "last": { "type": "enum", "options": ["Hopper"] }
        },
        "derivatives": {
            "full": {
                "type": "string-interpolation",
                "options": { "pattern": "{} {}", "fields": ["first", "last"] }
            }
        }
    }));
    let document = engine(2).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert_eq!(document["full"], json!("Grace Hopper"));
}

#[test]
fn interpolation_stringifies_non_string_values() {
    let recipe = recipe(json!({
        "schema": {
            "count": { "type": "number", "options": { "min": 7, "max": 7 } }
        },
        "derivatives": {
            "label": {
                "type": "string-interpolation",
                "options": { "pattern": "n={}", "fields": ["count"] }
            }
        }
    }));
    let document = engine(3).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert_eq!(document["label"], json!("n=7"));
}

#[test]
fn date_before_lands_within_the_window() {
    let recipe = recipe(json!({
        "schema": {
            "created": {
                "type": "iso-timestamp",
                "options": {
                    "dateFrom": "2024-05-10T12:00:00Z",
                    "dateTo": "2024-05-10T12:00:00Z"
                }
            }
        },
        "derivatives": {
            "drafted": {
                "type": "date-before",
                "options": { "field": "created", "days": 5 }
            }
        }
    }));
    let document = engine(4).generate(&recipe, &ReferenceBag::new()).unwrap();
    let anchor = provider::parse_timestamp("2024-05-10T12:00:00Z").unwrap();
    let drafted = provider::parse_timestamp(document["drafted"].as_str().unwrap()).unwrap();
    let offset = (anchor - drafted).num_seconds();
    assert!((0..=5 * 86_400).contains(&offset));
}

#[test]
fn date_after_lands_within_the_window() {
    let recipe = recipe(json!({
        "schema": {
            "created": {
                "type": "iso-timestamp",
                "options": {
                    "dateFrom": "2024-05-10T12:00:00Z",
                    "dateTo": "2024-05-10T12:00:00Z"
                }
            }
        },
        "derivatives": {
            "expires": {
                "type": "date-after",
                "options": { "field": "created", "days": 30 }
            }
        }
    }));
    let document = engine(5).generate(&recipe, &ReferenceBag::new()).unwrap();
    let anchor = provider::parse_timestamp("2024-05-10T12:00:00Z").unwrap();
    let expires = provider::parse_timestamp(document["expires"].as_str().unwrap()).unwrap();
    let offset = (expires - anchor).num_seconds();
    assert!((0..=30 * 86_400).contains(&offset));
}

#[test]
fn missing_referenced_path_fails() {
    let recipe = recipe(json!({
        "schema": { "present": { "type": "boolean" } },
        "derivatives": {
            "twin": { "type": "copy", "options": { "field": "absent" } }
        }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::PathNotFound(path)) if path == "absent"));
}

#[test]
fn derivatives_cannot_observe_each_other() {
    // "second" runs after "first" alphabetically, but the snapshot is taken
    // before any derivative, so "first" is not visible to it.
    let recipe = recipe(json!({
        "schema": { "seed": { "type": "enum", "options": ["x"] } },
        "derivatives": {
            "first": { "type": "copy", "options": { "field": "seed" } },
            "second": { "type": "copy", "options": { "field": "first" } }
        }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::PathNotFound(path)) if path == "first"));
}

#[test]
fn nullable_derivative_can_skip_evaluation() {
    let recipe = recipe(json!({
        "schema": { "seed": { "type": "enum", "options": ["x"] } },
        "derivatives": {
            "maybe": {
                "type": "copy",
                "nullablePercentage": 1.0,
                "options": { "field": "does-not-exist" }
            }
        }
    }));
    let document = engine(6).generate(&recipe, &ReferenceBag::new()).unwrap();
    assert!(document["maybe"].is_null());
}

#[test]
fn placeholder_count_mismatch_is_rejected() {
    let recipe = recipe(json!({
        "schema": { "seed": { "type": "enum", "options": ["x"] } },
        "derivatives": {
            "bad": {
                "type": "string-interpolation",
                "options": { "pattern": "{}{}", "fields": ["seed"] }
            }
        }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::InvalidOptions { field, .. }) if field == "bad"));
}

#[test]
fn oversized_day_window_is_rejected() {
    // A window whose second count does not fit i64 must surface as a typed
    // range error, never as an arithmetic panic.
    let recipe = recipe(json!({
        "schema": {
            "created": {
                "type": "iso-timestamp",
                "options": {
                    "dateFrom": "2024-05-10T12:00:00Z",
                    "dateTo": "2024-05-10T12:00:00Z"
                }
            }
        },
        "derivatives": {
            "bad": {
                "type": "date-before",
                "options": { "field": "created", "days": 9_000_000_000_000_000_000_i64 }
            }
        }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::InvalidRange { field, .. }) if field == "bad"));
}

#[test]
fn negative_day_window_is_rejected() {
    let recipe = recipe(json!({
        "schema": {
            "created": {
                "type": "iso-timestamp",
                "options": {
                    "dateFrom": "2024-05-10T12:00:00Z",
                    "dateTo": "2024-05-10T12:00:00Z"
                }
            }
        },
        "derivatives": {
            "bad": { "type": "date-before", "options": { "field": "created", "days": -1 } }
        }
    }));
    let result = generate_document(&recipe, 0.0, &ReferenceBag::new());
    assert!(matches!(result, Err(RecipeError::InvalidRange { field, .. }) if field == "bad"));
}
