//! Rendering schemas as JSON Schema (draft-07) for `tools/list`.

use serde_json::{Map, Value};

use super::{ObjectSchema, Presence, Schema, SchemaKind};

const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Render a tool's input schema in wire form.
///
/// Keys are emitted through `serde_json::Map`, so the output is byte-identical
/// for equal schemas.
pub fn to_wire_schema(schema: &Schema) -> Value {
    let mut rendered = render(schema);
    if let Value::Object(map) = &mut rendered {
        map.insert("$schema".to_string(), Value::from(JSON_SCHEMA_DRAFT));
    }
    rendered
}

fn render(schema: &Schema) -> Value {
    let mut map = Map::new();
    match schema.kind() {
        SchemaKind::String => {
            map.insert("type".into(), "string".into());
        }
        SchemaKind::Number {
            integer,
            minimum,
            maximum,
        } => {
            let ty = if *integer { "integer" } else { "number" };
            map.insert("type".into(), ty.into());
            if let Some(min) = minimum {
                map.insert("minimum".into(), number(*min));
            }
            if let Some(max) = maximum {
                map.insert("maximum".into(), number(*max));
            }
        }
        SchemaKind::Boolean => {
            map.insert("type".into(), "boolean".into());
        }
        SchemaKind::Array { items, min_items } => {
            map.insert("type".into(), "array".into());
            map.insert("items".into(), render(items));
            if let Some(min) = min_items {
                map.insert("minItems".into(), Value::from(*min));
            }
        }
        SchemaKind::Object(object) => render_object(object, &mut map),
    }
    if let Some(description) = schema.description() {
        map.insert("description".into(), description.into());
    }
    Value::Object(map)
}

fn render_object(object: &ObjectSchema, map: &mut Map<String, Value>) {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for property in object.properties() {
        let mut rendered = render(&property.schema);
        match &property.presence {
            Presence::Required => required.push(Value::from(property.name.as_str())),
            Presence::Optional => {}
            Presence::Default(default) => {
                if let Value::Object(m) = &mut rendered {
                    m.insert("default".into(), default.clone());
                }
            }
        }
        properties.insert(property.name.clone(), rendered);
    }

    map.insert("type".into(), "object".into());
    map.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        map.insert("required".into(), Value::Array(required));
    }
    map.insert("additionalProperties".into(), Value::Bool(false));
}

/// Whole bounds render as integers so `integer` schemas read naturally.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}
