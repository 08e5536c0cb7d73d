//! Strict argument validation with defaults.

use std::fmt;

use serde_json::{Map, Value};

use super::{ObjectSchema, Presence, Schema, SchemaKind};

/// One failed check, located by a dotted/indexed path such as `ids[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "arguments: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every violation found in one argument object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation is reported at `path`.
    pub fn has_path(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate raw arguments, returning them with defaults filled in.
///
/// Absent arguments are treated as an empty object. All violations are
/// collected rather than stopping at the first.
pub fn validate(schema: &Schema, raw: Option<Value>) -> Result<Value, ValidationErrors> {
    let raw = match raw {
        None | Some(Value::Null) if matches!(schema.kind(), SchemaKind::Object(_)) => {
            Value::Object(Map::new())
        }
        other => other.unwrap_or(Value::Null),
    };

    let mut checker = Checker::default();
    let value = checker.check(schema, &raw, "");
    if checker.violations.is_empty() {
        Ok(value)
    } else {
        Err(ValidationErrors {
            violations: checker.violations,
        })
    }
}

#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn fail(&mut self, path: &str, message: impl Into<String>) -> Value {
        self.violations.push(Violation {
            path: path.to_string(),
            message: message.into(),
        });
        Value::Null
    }

    fn check(&mut self, schema: &Schema, value: &Value, path: &str) -> Value {
        match schema.kind() {
            SchemaKind::String => match value {
                Value::String(_) => value.clone(),
                other => self.fail(path, expected("string", other)),
            },
            SchemaKind::Boolean => match value {
                Value::Bool(_) => value.clone(),
                other => self.fail(path, expected("boolean", other)),
            },
            SchemaKind::Number {
                integer,
                minimum,
                maximum,
            } => self.check_number(value, path, *integer, *minimum, *maximum),
            SchemaKind::Array { items, min_items } => match value {
                Value::Array(elements) => {
                    if let Some(min) = min_items {
                        if elements.len() < *min {
                            self.fail(path, format!("must contain at least {min} item(s)"));
                        }
                    }
                    let checked = elements
                        .iter()
                        .enumerate()
                        .map(|(i, element)| self.check(items, element, &format!("{path}[{i}]")))
                        .collect();
                    Value::Array(checked)
                }
                other => self.fail(path, expected("array", other)),
            },
            SchemaKind::Object(object) => match value {
                Value::Object(map) => self.check_object(object, map, path),
                other => self.fail(path, expected("object", other)),
            },
        }
    }

    fn check_number(
        &mut self,
        value: &Value,
        path: &str,
        integer: bool,
        minimum: Option<f64>,
        maximum: Option<f64>,
    ) -> Value {
        let Some(number) = value.as_f64() else {
            let ty = if integer { "integer" } else { "number" };
            return self.fail(path, expected(ty, value));
        };
        if integer && number.fract() != 0.0 {
            return self.fail(path, format!("expected integer, got {number}"));
        }

        let start = self.violations.len();
        if let Some(min) = minimum {
            if number < min {
                self.fail(path, format!("must be at least {min}"));
            }
        }
        if let Some(max) = maximum {
            if number > max {
                self.fail(path, format!("must be at most {max}"));
            }
        }
        if self.violations.len() > start {
            return Value::Null;
        }

        match value.as_i64() {
            None if integer => Value::from(number as i64),
            _ => value.clone(),
        }
    }

    fn check_object(&mut self, object: &ObjectSchema, map: &Map<String, Value>, path: &str) -> Value {
        let mut out = Map::new();

        for property in object.properties() {
            let field_path = join(path, &property.name);
            match (map.get(&property.name), &property.presence) {
                (Some(v), _) if !v.is_null() => {
                    let checked = self.check(&property.schema, v, &field_path);
                    out.insert(property.name.clone(), checked);
                }
                (_, Presence::Required) => {
                    self.fail(&field_path, "required field is missing");
                }
                (_, Presence::Default(default)) => {
                    out.insert(property.name.clone(), default.clone());
                }
                (_, Presence::Optional) => {}
            }
        }

        for key in map.keys() {
            if object.get(key).is_none() {
                self.fail(&join(path, key), "unexpected field");
            }
        }

        Value::Object(out)
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn expected(ty: &str, actual: &Value) -> String {
    let actual = match actual {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("expected {ty}, got {actual}")
}
