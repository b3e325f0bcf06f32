//! Structural validation of decoded JSON against declarative shape
//! descriptors.
//!
//! [`validate`] answers "does this value still look like the documented
//! response shape" with a plain bool and no error detail or path
//! information; the sample-capture programs use it for coarse regression
//! checks. It is not a user-facing validation layer.
//!
//! Record checks are open: required fields must be present and conform,
//! optional fields must conform when present, and unknown extra keys are
//! ignored.

use std::path::Path;

use serde_json::Value;

/// A declarative description of an expected JSON shape.
#[derive(Debug, Clone)]
pub enum Schema {
    /// Any JSON string.
    String,
    /// Any JSON number, integral or not.
    Number,
    /// A JSON number with an integral value.
    Integer,
    /// A JSON boolean.
    Bool,
    /// A JSON array whose every element matches the inner schema.
    ListOf(Box<Schema>),
    /// A JSON object whose every key matches the first schema (keys are
    /// checked as string values) and every value matches the second.
    MapOf(Box<Schema>, Box<Schema>),
    /// Matches if the value matches any of the alternatives.
    Union(Vec<Schema>),
    /// An open record: named required and optional fields, extra keys
    /// ignored.
    Record {
        required: Vec<(&'static str, Schema)>,
        optional: Vec<(&'static str, Schema)>,
    },
}

impl Schema {
    pub fn list_of(inner: Schema) -> Self {
        Schema::ListOf(Box::new(inner))
    }

    pub fn map_of(key: Schema, value: Schema) -> Self {
        Schema::MapOf(Box::new(key), Box::new(value))
    }

    pub fn record(required: Vec<(&'static str, Schema)>) -> Self {
        Schema::Record {
            required,
            optional: Vec::new(),
        }
    }

    pub fn with_optional(mut self, fields: Vec<(&'static str, Schema)>) -> Self {
        if let Schema::Record { optional, .. } = &mut self {
            *optional = fields;
        }
        self
    }
}

/// Recursively checks `value` against `schema`.
pub fn validate(value: &Value, schema: &Schema) -> bool {
    match schema {
        Schema::String => value.is_string(),
        Schema::Number => value.is_number(),
        Schema::Integer => value.is_i64() || value.is_u64(),
        Schema::Bool => value.is_boolean(),
        Schema::ListOf(inner) => match value.as_array() {
            Some(items) => items.iter().all(|item| validate(item, inner)),
            None => false,
        },
        Schema::MapOf(key_schema, value_schema) => match value.as_object() {
            Some(map) => map.iter().all(|(k, v)| {
                validate(&Value::String(k.clone()), key_schema) && validate(v, value_schema)
            }),
            None => false,
        },
        Schema::Union(alternatives) => alternatives.iter().any(|alt| validate(value, alt)),
        Schema::Record { required, optional } => match value.as_object() {
            Some(map) => {
                required
                    .iter()
                    .all(|(name, field)| map.get(*name).is_some_and(|v| validate(v, field)))
                    && optional
                        .iter()
                        .all(|(name, field)| map.get(*name).is_none_or(|v| validate(v, field)))
            }
            None => false,
        },
    }
}

/// Reads a JSON document from disk and checks it against `schema`.
///
/// Returns `false` if the file is missing or does not decode as JSON, so
/// best-effort sample checks can run without error handling.
pub fn validate_file(path: impl AsRef<Path>, schema: &Schema) -> bool {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return false,
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => validate(&value, schema),
        Err(_) => false,
    }
}

/// [`Schema`] descriptors for the documented CDO response shapes.
pub mod shapes {
    use super::Schema;

    fn collection(item: Schema) -> Schema {
        Schema::record(vec![
            (
                "metadata",
                Schema::record(vec![(
                    "resultset",
                    Schema::record(vec![
                        ("offset", Schema::Integer),
                        ("count", Schema::Integer),
                        ("limit", Schema::Integer),
                    ]),
                )]),
            ),
            ("results", Schema::list_of(item)),
        ])
    }

    /// `/datasets/{id}` item; rows of `/datasets` additionally carry `uid`.
    pub fn dataset() -> Schema {
        Schema::record(vec![
            ("mindate", Schema::String),
            ("maxdate", Schema::String),
            ("name", Schema::String),
            ("datacoverage", Schema::Number),
            ("id", Schema::String),
        ])
        .with_optional(vec![("uid", Schema::String)])
    }

    pub fn datasets() -> Schema {
        collection(dataset())
    }

    pub fn data_category() -> Schema {
        Schema::record(vec![("name", Schema::String), ("id", Schema::String)])
    }

    pub fn data_categories() -> Schema {
        collection(data_category())
    }

    /// `/datatypes/{id}` omits `name`; collection rows include it.
    pub fn datatype() -> Schema {
        Schema::record(vec![
            ("mindate", Schema::String),
            ("maxdate", Schema::String),
            ("datacoverage", Schema::Number),
            ("id", Schema::String),
        ])
        .with_optional(vec![("name", Schema::String)])
    }

    pub fn datatypes() -> Schema {
        collection(datatype())
    }

    pub fn location_category() -> Schema {
        Schema::record(vec![("name", Schema::String), ("id", Schema::String)])
    }

    pub fn location_categories() -> Schema {
        collection(location_category())
    }

    pub fn location() -> Schema {
        Schema::record(vec![
            ("mindate", Schema::String),
            ("maxdate", Schema::String),
            ("name", Schema::String),
            ("datacoverage", Schema::Number),
            ("id", Schema::String),
        ])
    }

    pub fn locations() -> Schema {
        collection(location())
    }

    pub fn station() -> Schema {
        Schema::record(vec![
            ("mindate", Schema::String),
            ("maxdate", Schema::String),
            ("latitude", Schema::Number),
            ("longitude", Schema::Number),
            ("name", Schema::String),
            ("datacoverage", Schema::Number),
            ("id", Schema::String),
        ])
        .with_optional(vec![
            ("elevation", Schema::Number),
            ("elevationUnit", Schema::String),
        ])
    }

    pub fn stations() -> Schema {
        collection(station())
    }

    pub fn datapoint() -> Schema {
        Schema::record(vec![
            ("date", Schema::String),
            ("datatype", Schema::String),
            ("station", Schema::String),
            ("value", Schema::Number),
        ])
        .with_optional(vec![("attributes", Schema::String)])
    }

    pub fn data() -> Schema {
        collection(datapoint())
    }

    /// Body sent with quota-exceeded and other error statuses.
    pub fn rate_limit() -> Schema {
        Schema::record(vec![
            ("status", Schema::String),
            ("message", Schema::String),
        ])
    }
}
