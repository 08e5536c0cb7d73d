//! Structured metadata filters for index queries.
//!
//! A [`Filter`] is an AND of [`FilterGroup`]s; each group is an OR of
//! [`Condition`]s. Field paths are validated on construction and string
//! values are escaped on render, so user input never reaches the filter
//! language unquoted.

use std::fmt;

use serde_json::Value;

use crate::error::FilterError;

/// A dotted metadata field path such as `nutrition.calories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    /// Validate and wrap a field path.
    ///
    /// Each dot-separated segment must start with a letter or underscore and
    /// contain only ASCII alphanumerics and underscores.
    pub fn new(path: &str) -> Result<Self, FilterError> {
        let valid = !path.is_empty()
            && path.split('.').all(|segment| {
                let mut chars = segment.chars();
                matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if valid {
            Ok(Self(path.to_string()))
        } else {
            Err(FilterError::InvalidField(path.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve this path inside a metadata object.
    pub fn lookup<'a>(&self, metadata: &'a Value) -> Option<&'a Value> {
        self.0
            .split('.')
            .try_fold(metadata, |value, segment| value.get(segment))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single comparison against a metadata field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field < value`
    LessThan { field: FieldPath, value: f64 },
    /// `field CONTAINS 'value'` — array membership or substring match.
    Contains { field: FieldPath, value: String },
}

impl Condition {
    pub fn field(&self) -> &FieldPath {
        match self {
            Condition::LessThan { field, .. } | Condition::Contains { field, .. } => field,
        }
    }

    /// Evaluate against stored metadata. Missing or mistyped fields never match.
    pub fn matches(&self, metadata: &Value) -> bool {
        match self {
            Condition::LessThan { field, value } => field
                .lookup(metadata)
                .and_then(Value::as_f64)
                .is_some_and(|actual| actual < *value),
            Condition::Contains { field, value } => match field.lookup(metadata) {
                Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(value)),
                Some(Value::String(text)) => text.contains(value.as_str()),
                _ => false,
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::LessThan { field, value } => write!(f, "{field} < {value}"),
            Condition::Contains { field, value } => {
                write!(f, "{field} CONTAINS '{}'", escape_literal(value))
            }
        }
    }
}

/// OR-joined conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup {
    conditions: Vec<Condition>,
}

impl FilterGroup {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, metadata: &Value) -> bool {
        self.conditions.iter().any(|c| c.matches(metadata))
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        if rendered.len() > 1 {
            write!(f, "({})", rendered.join(" OR "))
        } else {
            f.write_str(&rendered.join(""))
        }
    }
}

/// AND-joined groups. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    groups: Vec<FilterGroup>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field < value`.
    pub fn less_than(mut self, field: &str, value: f64) -> Result<Self, FilterError> {
        let field = FieldPath::new(field)?;
        if !value.is_finite() {
            return Err(FilterError::NonFiniteBound {
                field: field.to_string(),
                value,
            });
        }
        self.groups.push(FilterGroup {
            conditions: vec![Condition::LessThan { field, value }],
        });
        Ok(self)
    }

    /// Require `field` to contain at least one of `values`. No-op when empty.
    pub fn contains_any<S: AsRef<str>>(
        mut self,
        field: &str,
        values: &[S],
    ) -> Result<Self, FilterError> {
        let field = FieldPath::new(field)?;
        if values.is_empty() {
            return Ok(self);
        }
        let conditions = values
            .iter()
            .map(|v| Condition::Contains {
                field: field.clone(),
                value: v.as_ref().to_string(),
            })
            .collect();
        self.groups.push(FilterGroup { conditions });
        Ok(self)
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn matches(&self, metadata: &Value) -> bool {
        self.groups.iter().all(|g| g.matches(metadata))
    }

    /// Render in the index's filter language.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.groups.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(" AND "))
    }
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            c => escaped.push(c),
        }
    }
    escaped
}
