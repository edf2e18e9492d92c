//! Argument validation against a tool's declared input schema.
//!
//! Tool descriptors carry a JSON Schema generated from their parameter
//! struct. At registration time that schema is reduced to a [`Schema`]:
//! the list of properties, the primitive kinds each one accepts, and the
//! required names. [`validate`] then checks an incoming argument mapping
//! against it before any handler code runs.

use std::fmt;

use rmcp::model::JsonObject;
use serde_json::Value;

/// Primitive JSON kinds a field can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl FieldKind {
    /// Parse a JSON Schema `type` keyword value.
    pub fn from_schema_type(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// The kind of a concrete JSON value.
    ///
    /// Numbers always report as `Number`; integral values are additionally
    /// accepted by `Integer` fields in [`FieldKind::accepts`].
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::Null => Self::Null,
        }
    }

    /// Whether a value satisfies this declared kind.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            kind => kind == Self::of(value),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// Accepted kinds. Empty means the field is not type-checked.
    pub kinds: Vec<FieldKind>,
}

impl FieldSpec {
    fn accepts(&self, value: &Value) -> bool {
        self.kinds.is_empty() || self.kinds.iter().any(|kind| kind.accepts(value))
    }

    fn expected(&self) -> String {
        self.kinds
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// Validation view of an object input schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    required: Vec<String>,
}

impl Schema {
    /// Reduce a JSON Schema object to its validation view.
    ///
    /// Reads `properties.<name>.type` (a string or a list of strings),
    /// `properties.<name>.nullable` and the top-level `required` list.
    /// Properties whose shape is not expressed with `type` (for example
    /// `$ref` or `anyOf`) are kept but not type-checked.
    pub fn from_json_schema(schema: &JsonObject) -> Self {
        let fields = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| FieldSpec {
                        name: name.clone(),
                        kinds: declared_kinds(property),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self { fields, required }
    }
}

fn declared_kinds(property: &Value) -> Vec<FieldKind> {
    let mut kinds: Vec<FieldKind> = match property.get("type") {
        Some(Value::String(name)) => FieldKind::from_schema_type(name).into_iter().collect(),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .filter_map(FieldKind::from_schema_type)
            .collect(),
        _ => return Vec::new(),
    };

    let nullable = property
        .get("nullable")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if nullable && !kinds.contains(&FieldKind::Null) {
        kinds.push(FieldKind::Null);
    }

    kinds
}

/// Result of checking arguments against a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    MissingField(String),
    TypeMismatch {
        field: String,
        expected: String,
        actual: FieldKind,
    },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::MissingField(field) => write!(f, "missing required field '{}'", field),
            Self::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{}' must be {}, got {}",
                field, expected, actual
            ),
        }
    }
}

/// Check `arguments` against `schema`, stopping at the first violation.
///
/// Required fields are checked first, in schema order, then the kinds of
/// present fields in property order.
pub fn validate(schema: &Schema, arguments: &JsonObject) -> ValidationOutcome {
    if let Some(missing) = schema
        .required
        .iter()
        .find(|name| !arguments.contains_key(name.as_str()))
    {
        return ValidationOutcome::MissingField(missing.clone());
    }

    for field in &schema.fields {
        let Some(value) = arguments.get(&field.name) else {
            continue;
        };
        if !field.accepts(value) {
            return ValidationOutcome::TypeMismatch {
                field: field.name.clone(),
                expected: field.expected(),
                actual: FieldKind::of(value),
            };
        }
    }

    ValidationOutcome::Valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field<'a>(schema: &'a Schema, name: &str) -> Option<&'a FieldSpec> {
        schema.fields.iter().find(|field| field.name == name)
    }

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn trace_window_schema() -> Schema {
        Schema::from_json_schema(&object(json!({
            "type": "object",
            "properties": {
                "service_name": { "type": "string" },
                "start_time": { "type": "string" },
                "end_time": { "type": "string" },
                "limit": { "type": ["integer", "null"] },
                "tags": { "type": "object", "nullable": true },
                "filter": { "$ref": "#/$defs/Filter" }
            },
            "required": ["service_name", "start_time", "end_time"]
        })))
    }

    fn valid_args() -> JsonObject {
        object(json!({
            "service_name": "checkout",
            "start_time": "2024-01-01T00:00:00Z",
            "end_time": "2024-01-01T01:00:00Z"
        }))
    }

    #[test]
    fn test_from_json_schema_reads_fields_and_required() {
        let schema = trace_window_schema();
        assert_eq!(schema.fields.len(), 6);
        assert_eq!(
            schema.required,
            &["service_name", "start_time", "end_time"]
        );
        assert_eq!(
            field(&schema, "limit").map(|f| f.kinds.clone()),
            Some(vec![FieldKind::Integer, FieldKind::Null])
        );
        assert_eq!(
            field(&schema, "tags").map(|f| f.kinds.clone()),
            Some(vec![FieldKind::Object, FieldKind::Null])
        );
        assert!(field(&schema, "filter").is_some_and(|f| f.kinds.is_empty()));
    }

    #[test]
    fn test_valid_arguments() {
        assert_eq!(
            validate(&trace_window_schema(), &valid_args()),
            ValidationOutcome::Valid
        );
    }

    #[test]
    fn test_missing_field() {
        let mut args = valid_args();
        args.remove("end_time");
        let outcome = validate(&trace_window_schema(), &args);
        assert_eq!(outcome, ValidationOutcome::MissingField("end_time".into()));
        assert!(outcome.to_string().contains("end_time"));
    }

    #[test]
    fn test_missing_fields_reported_in_schema_order() {
        let args = object(json!({ "end_time": "x" }));
        assert_eq!(
            validate(&trace_window_schema(), &args),
            ValidationOutcome::MissingField("service_name".into())
        );
    }

    #[test]
    fn test_type_mismatch() {
        let mut args = valid_args();
        args.insert("start_time".into(), json!(1704067200));
        let outcome = validate(&trace_window_schema(), &args);
        assert_eq!(
            outcome,
            ValidationOutcome::TypeMismatch {
                field: "start_time".into(),
                expected: "string".into(),
                actual: FieldKind::Number,
            }
        );
        assert_eq!(
            outcome.to_string(),
            "field 'start_time' must be string, got number"
        );
    }

    #[test]
    fn test_integer_rejects_fractional_numbers() {
        let mut args = valid_args();
        args.insert("limit".into(), json!(2.5));
        assert!(!validate(&trace_window_schema(), &args).is_valid());

        args.insert("limit".into(), json!(20));
        assert!(validate(&trace_window_schema(), &args).is_valid());
    }

    #[test]
    fn test_nullable_fields_accept_null() {
        let mut args = valid_args();
        args.insert("limit".into(), Value::Null);
        args.insert("tags".into(), Value::Null);
        assert!(validate(&trace_window_schema(), &args).is_valid());
    }

    #[test]
    fn test_untyped_fields_and_extra_keys_are_accepted() {
        let mut args = valid_args();
        args.insert("filter".into(), json!([1, 2, 3]));
        args.insert("unexpected".into(), json!(true));
        assert!(validate(&trace_window_schema(), &args).is_valid());
    }

    #[test]
    fn test_empty_schema_accepts_anything() {
        let schema = Schema::default();
        assert!(validate(&schema, &valid_args()).is_valid());
        assert!(validate(&schema, &JsonObject::new()).is_valid());
    }
}
