use serde_json::json;

use papermill_core::{RecipeError, flatten, unflatten};

#[test]
fn flatten_keeps_arrays_as_atomic_leaves() {
    let document = json!({
        "user": {
            "name": "Ada",
            "tags": ["alpha", "beta"],
        },
        "active": true,
    });

    let view = flatten(&document);

    assert_eq!(view.get("user.name"), Some(&json!("Ada")));
    assert_eq!(view.get("user.tags"), Some(&json!(["alpha", "beta"])));
    assert_eq!(view.get("active"), Some(&json!(true)));
    assert!(!view.contains_key("user.tags.0"));
}

#[test]
fn roundtrip_reproduces_nested_document_exactly() {
    let document = json!({
        "a": {
            "b": {
                "c": 1,
                "list": [{"x": 1}, {"x": 2}],
            },
            "empty": {},
        },
        "flag": null,
    });

    let rebuilt = unflatten(flatten(&document)).expect("roundtrip");
    assert_eq!(rebuilt, document);
}

#[test]
fn unflatten_creates_intermediate_objects() {
    let mut view = papermill_core::FlattenedView::new();
    view.insert("a.b.c".to_string(), json!(42));

    let document = unflatten(view).expect("unflatten");
    assert_eq!(document, json!({"a": {"b": {"c": 42}}}));
}

#[test]
fn unflatten_rejects_writes_through_scalar_leaves() {
    let mut view = papermill_core::FlattenedView::new();
    view.insert("a".to_string(), json!(1));
    view.insert("a.b".to_string(), json!(2));

    let result = unflatten(view);
    assert!(matches!(result, Err(RecipeError::PathConflict(path)) if path == "a"));
}

#[test]
fn empty_document_roundtrips_to_empty_object() {
    let document = json!({});
    let rebuilt = unflatten(flatten(&document)).expect("roundtrip");
    assert_eq!(rebuilt, document);
}
