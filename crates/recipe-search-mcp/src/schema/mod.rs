//! Declarative argument schemas for tools.
//!
//! A [`Schema`] is plain data: it is rendered into the protocol's JSON Schema
//! by [`to_wire_schema`] and checked against incoming arguments by
//! [`validate`]. Both are pure functions of the schema.
//!
//! ```
//! use recipe_search_mcp::schema::{self, ObjectSchema, Schema};
//! use serde_json::json;
//!
//! let args = Schema::object(
//!     ObjectSchema::new()
//!         .required("query", Schema::string())
//!         .with_default("limit", Schema::integer().minimum(1.0), json!(10)),
//! );
//! let parsed = schema::validate(&args, Some(json!({"query": "soup"}))).unwrap();
//! assert_eq!(parsed["limit"], 10);
//! ```

mod validate;
mod wire;

use serde_json::Value;

pub use validate::{validate, ValidationErrors, Violation};
pub use wire::to_wire_schema;

/// The shape of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    /// Any JSON number; `integer` restricts to whole numbers.
    Number {
        integer: bool,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Array {
        items: Box<Schema>,
        min_items: Option<usize>,
    },
    Object(ObjectSchema),
}

/// A value schema with an optional human-readable description.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    description: Option<String>,
}

impl Schema {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number {
            integer: false,
            minimum: None,
            maximum: None,
        })
    }

    pub fn integer() -> Self {
        Self::of(SchemaKind::Number {
            integer: true,
            minimum: None,
            maximum: None,
        })
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    pub fn array(items: Schema) -> Self {
        Self::of(SchemaKind::Array {
            items: Box::new(items),
            min_items: None,
        })
    }

    pub fn object(object: ObjectSchema) -> Self {
        Self::of(SchemaKind::Object(object))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Inclusive lower bound. Ignored for non-numeric schemas.
    pub fn minimum(mut self, bound: f64) -> Self {
        if let SchemaKind::Number { minimum, .. } = &mut self.kind {
            *minimum = Some(bound);
        }
        self
    }

    /// Inclusive upper bound. Ignored for non-numeric schemas.
    pub fn maximum(mut self, bound: f64) -> Self {
        if let SchemaKind::Number { maximum, .. } = &mut self.kind {
            *maximum = Some(bound);
        }
        self
    }

    /// Minimum array length. Ignored for non-array schemas.
    pub fn min_items(mut self, count: usize) -> Self {
        if let SchemaKind::Array { min_items, .. } = &mut self.kind {
            *min_items = Some(count);
        }
        self
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Whether an object property must be supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    /// Optional; filled with this value when absent.
    Default(Value),
}

/// A named property of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: Schema,
    pub presence: Presence,
}

/// An object with a fixed set of properties. Unlisted keys are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    properties: Vec<Property>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn property(mut self, name: &str, schema: Schema, presence: Presence) -> Self {
        self.properties.push(Property {
            name: name.to_string(),
            schema,
            presence,
        });
        self
    }

    pub fn required(self, name: &str, schema: Schema) -> Self {
        self.property(name, schema, Presence::Required)
    }

    pub fn optional(self, name: &str, schema: Schema) -> Self {
        self.property(name, schema, Presence::Optional)
    }

    pub fn with_default(self, name: &str, schema: Schema, default: Value) -> Self {
        self.property(name, schema, Presence::Default(default))
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}
