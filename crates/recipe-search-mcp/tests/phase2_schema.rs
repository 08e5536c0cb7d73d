//! Phase 2: Tool schemas, wire rendering and argument validation.

use serde_json::json;

use recipe_search_mcp::schema::{self, to_wire_schema};
use recipe_search_mcp::tools::{get_recipe_by_id, search_recipes};

#[test]
fn test_search_recipes_wire_schema() {
    let wire = to_wire_schema(&search_recipes::schema());

    assert_eq!(wire["$schema"], "http://json-schema.org/draft-07/schema#");
    assert_eq!(wire["type"], "object");
    assert_eq!(wire["required"], json!(["query"]));
    assert_eq!(wire["additionalProperties"], false);

    let props = &wire["properties"];
    assert_eq!(props["query"]["type"], "string");
    assert_eq!(props["ingredients"]["items"]["type"], "string");
    assert_eq!(props["maxCalories"]["minimum"], 0);
    assert_eq!(
        props["maxResults"],
        json!({
            "type": "integer",
            "minimum": 1,
            "maximum": 100,
            "default": 10,
            "description": "Maximum number of results"
        })
    );
}

#[test]
fn test_get_recipe_by_id_wire_schema() {
    let wire = to_wire_schema(&get_recipe_by_id::schema());
    assert_eq!(wire["required"], json!(["ids"]));
    assert_eq!(wire["properties"]["ids"]["minItems"], 1);
}

#[test]
fn test_wire_schema_is_pure() {
    let schema = search_recipes::schema();
    let first = serde_json::to_string(&to_wire_schema(&schema)).unwrap();
    let second = serde_json::to_string(&to_wire_schema(&schema)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_defaults_filled() {
    let args = schema::validate(&search_recipes::schema(), Some(json!({"query": "soup"}))).unwrap();
    assert_eq!(args, json!({"query": "soup", "maxResults": 10}));
}

#[test]
fn test_missing_required_field_listed() {
    let err = schema::validate(&search_recipes::schema(), Some(json!({}))).unwrap_err();
    assert!(err.has_path("query"));
    assert!(err.to_string().contains("query: required field is missing"));
}

#[test]
fn test_absent_arguments_treated_as_empty_object() {
    let err = schema::validate(&search_recipes::schema(), None).unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.has_path("query"));
}

#[test]
fn test_every_violation_reported() {
    let err = schema::validate(
        &search_recipes::schema(),
        Some(json!({
            "query": 42,
            "maxResults": 0,
            "maxCalories": -5,
            "ingredients": ["egg", 7],
            "cuisine": "thai"
        })),
    )
    .unwrap_err();

    for path in ["query", "maxResults", "maxCalories", "ingredients[1]", "cuisine"] {
        assert!(err.has_path(path), "missing violation for {path}: {err}");
    }
    assert_eq!(err.len(), 5);
}

#[test]
fn test_max_results_bounds() {
    let search = search_recipes::schema();
    assert!(schema::validate(&search, Some(json!({"query": "q", "maxResults": 100}))).is_ok());
    assert!(schema::validate(&search, Some(json!({"query": "q", "maxResults": 101}))).is_err());
    assert!(schema::validate(&search, Some(json!({"query": "q", "maxResults": 2.5}))).is_err());
}

#[test]
fn test_null_optional_is_absent() {
    let args = schema::validate(
        &search_recipes::schema(),
        Some(json!({"query": "q", "maxMinutes": null})),
    )
    .unwrap();
    assert!(args.get("maxMinutes").is_none());
}

#[test]
fn test_empty_ids_rejected() {
    let err = schema::validate(&get_recipe_by_id::schema(), Some(json!({"ids": []}))).unwrap_err();
    assert!(err.to_string().contains("ids: must contain at least 1 item(s)"));
}
