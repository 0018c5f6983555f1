//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource and data source type, enabling
//! input validation before any remote call is made.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use regex::Regex;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Floating point (integers are accepted)
    Float,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
    /// Nested block, written as a list of objects
    Block {
        attributes: Vec<AttributeSchema>,
        max_items: Option<usize>,
    },
}

impl AttributeType {
    /// Enum type from static values
    pub fn one_of(values: &[&str]) -> Self {
        AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// List of strings
    pub fn string_list() -> Self {
        AttributeType::List(Box::new(AttributeType::String))
    }

    /// Nested block holding at most one instance
    pub fn single_block(attributes: Vec<AttributeSchema>) -> Self {
        AttributeType::Block {
            attributes,
            max_items: Some(1),
        }
    }

    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Float, Value::Float(_) | Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (
                AttributeType::Block {
                    attributes,
                    max_items,
                },
                Value::List(items),
            ) => {
                if let Some(max) = max_items
                    && items.len() > *max
                {
                    return Err(TypeError::TooManyBlocks {
                        max: *max,
                        got: items.len(),
                    });
                }
                for (i, item) in items.iter().enumerate() {
                    let Value::Map(fields) = item else {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(TypeError::TypeMismatch {
                                expected: "Block".to_string(),
                                got: item.type_name().to_string(),
                            }),
                        });
                    };
                    let errors = validate_attributes(attributes, fields);
                    if let Some(first) = errors.into_iter().next() {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(first),
                        });
                    }
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name().to_string(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Float => "Float".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block { .. } => "Block".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedOnly { name: String },

    #[error("Attribute '{name}': {message}")]
    ConstraintViolated { name: String, message: String },

    #[error("At most {max} block(s) allowed, got {got}")]
    TooManyBlocks { max: usize, got: usize },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },
}

/// Additional per-attribute constraint checked after the type check
#[derive(Debug, Clone)]
pub enum Constraint {
    /// String length in characters, inclusive
    Length { min: usize, max: usize },
    /// Integer range, inclusive
    IntRange { min: i64, max: i64 },
    /// Number range, inclusive
    FloatRange { min: f64, max: f64 },
    /// Regular expression the whole string must match
    Pattern {
        regex: &'static str,
        message: &'static str,
    },
    /// Number of list items, inclusive
    ListLength { min: usize, max: usize },
}

impl Constraint {
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Constraint::Length { min, max }, Value::String(s)) => {
                let len = s.chars().count();
                if len < *min || len > *max {
                    Err(format!(
                        "length must be between {} and {} characters, got {}",
                        min, max, len
                    ))
                } else {
                    Ok(())
                }
            }
            (Constraint::IntRange { min, max }, Value::Int(n)) => {
                if n < min || n > max {
                    Err(format!("must be between {} and {}, got {}", min, max, n))
                } else {
                    Ok(())
                }
            }
            (Constraint::FloatRange { min, max }, v @ (Value::Float(_) | Value::Int(_))) => {
                let n = match v {
                    Value::Float(f) => *f,
                    Value::Int(i) => *i as f64,
                    _ => unreachable!(),
                };
                if n < *min || n > *max {
                    Err(format!("must be between {} and {}, got {}", min, max, n))
                } else {
                    Ok(())
                }
            }
            (Constraint::Pattern { regex, message }, Value::String(s)) => {
                let re = Regex::new(regex).map_err(|e| format!("invalid pattern: {}", e))?;
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(message.to_string())
                }
            }
            (Constraint::ListLength { min, max }, Value::List(items)) => {
                if items.len() < *min || items.len() > *max {
                    Err(format!(
                        "must contain between {} and {} items, got {}",
                        min,
                        max,
                        items.len()
                    ))
                } else {
                    Ok(())
                }
            }
            // Type mismatches are reported by the type check
            _ => Ok(()),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Set by the remote API; may also be optional when both flags are set
    pub computed: bool,
    /// Changing the value requires replacing the remote resource
    pub force_new: bool,
    /// Never printed or persisted in clear text
    pub sensitive: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub constraints: Vec<Constraint>,
    /// Canonical form used when comparing values ("East US" vs "eastus")
    pub normalize: Option<fn(&Value) -> Value>,
    optional: bool,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            description: None,
            constraints: Vec::new(),
            normalize: None,
            optional: true,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Computed-only attribute: the user cannot set it
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self
    }

    /// Optional attribute whose value the API fills in when omitted
    pub fn optional_computed(mut self) -> Self {
        self.computed = true;
        self.optional = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_normalizer(mut self, normalize: fn(&Value) -> Value) -> Self {
        self.normalize = Some(normalize);
        self
    }

    /// The value in canonical form
    pub fn normalized(&self, value: &Value) -> Value {
        match self.normalize {
            Some(normalize) => normalize(value),
            None => value.clone(),
        }
    }

    /// The same attribute as a computed-only output, without configuration rules
    pub fn into_computed(mut self) -> Self {
        self.required = false;
        self.force_new = false;
        self.default = None;
        self.constraints.clear();
        self.computed()
    }

    /// Whether the user may set this attribute
    pub fn is_settable(&self) -> bool {
        self.required || self.optional
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let schemas: Vec<AttributeSchema> = self.attributes.values().cloned().collect();
        let errors = validate_attributes(&schemas, attributes);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill in declared defaults for attributes left unset
    pub fn apply_defaults(&self, attributes: &mut HashMap<String, Value>) {
        for (name, schema) in &self.attributes {
            if let Some(default) = &schema.default {
                attributes
                    .entry(name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
    }

    /// Copy of the attributes with sensitive values masked
    pub fn redact(&self, attributes: &HashMap<String, Value>) -> HashMap<String, Value> {
        attributes
            .iter()
            .map(|(k, v)| {
                let sensitive = self.attributes.get(k).is_some_and(|a| a.sensitive);
                let v = if sensitive {
                    Value::String("(sensitive)".to_string())
                } else {
                    v.clone()
                };
                (k.clone(), v)
            })
            .collect()
    }
}

fn validate_attributes(
    schemas: &[AttributeSchema],
    attributes: &HashMap<String, Value>,
) -> Vec<TypeError> {
    let mut errors = Vec::new();

    for schema in schemas {
        match attributes.get(&schema.name) {
            None => {
                if schema.required && schema.default.is_none() {
                    errors.push(TypeError::MissingRequired {
                        name: schema.name.clone(),
                    });
                }
            }
            Some(_) if !schema.is_settable() => {
                errors.push(TypeError::ComputedOnly {
                    name: schema.name.clone(),
                });
            }
            Some(value) => {
                if let Err(e) = schema.attr_type.validate(value) {
                    errors.push(TypeError::AttributeError {
                        name: schema.name.clone(),
                        inner: Box::new(e),
                    });
                    continue;
                }
                for constraint in &schema.constraints {
                    if let Err(message) = constraint.check(value) {
                        errors.push(TypeError::ConstraintViolated {
                            name: schema.name.clone(),
                            message,
                        });
                    }
                }
            }
        }
    }
    // Unknown attributes are allowed (for flexibility)

    errors
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Positive integer type
    pub fn positive_int() -> AttributeType {
        AttributeType::Custom {
            name: "PositiveInt".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| {
                if let Value::Int(n) = value {
                    if *n > 0 {
                        Ok(())
                    } else {
                        Err("Value must be positive".to_string())
                    }
                } else {
                    Err("Expected integer".to_string())
                }
            },
        }
    }

    /// CIDR block type (e.g., "10.0.0.0/16")
    pub fn cidr() -> AttributeType {
        AttributeType::Custom {
            name: "Cidr".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| {
                if let Value::String(s) = value {
                    validate_cidr(s)
                } else {
                    Err("Expected string".to_string())
                }
            },
        }
    }

    /// String-to-string tag map
    pub fn tags() -> AttributeType {
        AttributeType::Map(Box::new(AttributeType::String))
    }
}

/// Validate CIDR block format (e.g., "10.0.0.0/16")
pub fn validate_cidr(cidr: &str) -> Result<(), String> {
    let parts: Vec<&str> = cidr.split('/').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid CIDR format '{}': expected IP/prefix",
            cidr
        ));
    }

    let ip = parts[0];
    let prefix = parts[1];

    let octets: Vec<&str> = ip.split('.').collect();
    if octets.len() != 4 {
        return Err(format!("Invalid IP address '{}': expected 4 octets", ip));
    }

    for octet in &octets {
        if octet.parse::<u8>().is_err() {
            return Err(format!(
                "Invalid octet '{}' in IP address: must be 0-255",
                octet
            ));
        }
    }

    match prefix.parse::<u8>() {
        Ok(p) if p <= 32 => Ok(()),
        Ok(p) => Err(format!("Invalid prefix length '{}': must be 0-32", p)),
        Err(_) => Err(format!(
            "Invalid prefix length '{}': must be a number",
            prefix
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_string_type() {
        let t = AttributeType::String;
        assert!(t.validate(&Value::String("hello".to_string())).is_ok());
        assert!(t.validate(&Value::Int(42)).is_err());
    }

    #[test]
    fn validate_float_accepts_int() {
        let t = AttributeType::Float;
        assert!(t.validate(&Value::Float(2.5)).is_ok());
        assert!(t.validate(&Value::Int(2)).is_ok());
        assert!(t.validate(&Value::Bool(true)).is_err());
    }

    #[test]
    fn validate_enum_type() {
        let t = AttributeType::one_of(&["ECPU", "OCPU"]);
        assert!(t.validate(&Value::from("ECPU")).is_ok());
        assert!(t.validate(&Value::from("GPU")).is_err());
    }

    #[test]
    fn validate_positive_int() {
        let t = types::positive_int();
        assert!(t.validate(&Value::Int(1)).is_ok());
        assert!(t.validate(&Value::Int(0)).is_err());
        assert!(t.validate(&Value::Int(-1)).is_err());
    }

    #[test]
    fn validate_resource_schema() {
        let schema = ResourceSchema::new("resource")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(AttributeSchema::new("count", types::positive_int()))
            .attribute(AttributeSchema::new("enabled", AttributeType::Bool));

        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::from("my-resource"));
        attrs.insert("count".to_string(), Value::Int(5));
        attrs.insert("enabled".to_string(), Value::Bool(true));

        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn missing_required_attribute() {
        let schema = ResourceSchema::new("anchor")
            .attribute(AttributeSchema::new("name", AttributeType::String).required());

        let result = schema.validate(&HashMap::new());
        assert!(matches!(
            result.unwrap_err().as_slice(),
            [TypeError::MissingRequired { .. }]
        ));
    }

    #[test]
    fn computed_attribute_cannot_be_set() {
        let schema = ResourceSchema::new("anchor")
            .attribute(AttributeSchema::new("ocid", AttributeType::String).computed())
            .attribute(
                AttributeSchema::new("display_name", AttributeType::String).optional_computed(),
            );

        let mut attrs = HashMap::new();
        attrs.insert("display_name".to_string(), Value::from("x"));
        assert!(schema.validate(&attrs).is_ok());

        attrs.insert("ocid".to_string(), Value::from("ocid1.x"));
        let errors = schema.validate(&attrs).unwrap_err();
        assert!(matches!(errors[0], TypeError::ComputedOnly { .. }));
    }

    #[test]
    fn constraints_are_checked() {
        let schema = ResourceSchema::new("adb")
            .attribute(
                AttributeSchema::new("retention", AttributeType::Int)
                    .with_constraint(Constraint::IntRange { min: 1, max: 60 }),
            )
            .attribute(
                AttributeSchema::new("compute_count", AttributeType::Float)
                    .with_constraint(Constraint::FloatRange {
                        min: 2.0,
                        max: 512.0,
                    }),
            )
            .attribute(
                AttributeSchema::new("name", AttributeType::String).with_constraint(
                    Constraint::Pattern {
                        regex: "^[a-zA-Z][a-zA-Z0-9]*$",
                        message: "must start with a letter",
                    },
                ),
            );

        let mut attrs = HashMap::new();
        attrs.insert("retention".to_string(), Value::Int(61));
        attrs.insert("compute_count".to_string(), Value::Float(1.5));
        attrs.insert("name".to_string(), Value::from("1adb"));

        let errors = schema.validate(&attrs).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, TypeError::ConstraintViolated { .. }))
        );
    }

    #[test]
    fn block_validation_recurses() {
        let schema = ResourceSchema::new("infra").attribute(AttributeSchema::new(
            "maintenance_window",
            AttributeType::single_block(vec![
                AttributeSchema::new("preference", AttributeType::String).required(),
            ]),
        ));

        let ok = HashMap::from([(
            "maintenance_window".to_string(),
            Value::List(vec![Value::Map(HashMap::from([(
                "preference".to_string(),
                Value::from("NoPreference"),
            )]))]),
        )]);
        assert!(schema.validate(&ok).is_ok());

        let missing = HashMap::from([(
            "maintenance_window".to_string(),
            Value::List(vec![Value::Map(HashMap::new())]),
        )]);
        assert!(schema.validate(&missing).is_err());

        let too_many = HashMap::from([(
            "maintenance_window".to_string(),
            Value::List(vec![Value::Map(HashMap::new()), Value::Map(HashMap::new())]),
        )]);
        assert!(schema.validate(&too_many).is_err());
    }

    #[test]
    fn redact_masks_sensitive_attributes() {
        let schema = ResourceSchema::new("adb").attribute(
            AttributeSchema::new("admin_password", AttributeType::String)
                .required()
                .sensitive(),
        );
        let attrs = HashMap::from([
            ("admin_password".to_string(), Value::from("Secret1234567")),
            ("name".to_string(), Value::from("adb1")),
        ]);
        let redacted = schema.redact(&attrs);
        assert_eq!(
            redacted.get("admin_password"),
            Some(&Value::from("(sensitive)"))
        );
        assert_eq!(redacted.get("name"), Some(&Value::from("adb1")));
    }

    #[test]
    fn apply_defaults_fills_missing_only() {
        let schema = ResourceSchema::new("vmc")
            .attribute(AttributeSchema::new("port", AttributeType::Int).with_default(1521i64));
        let mut attrs = HashMap::new();
        schema.apply_defaults(&mut attrs);
        assert_eq!(attrs.get("port"), Some(&Value::Int(1521)));

        let mut attrs = HashMap::from([("port".to_string(), Value::Int(1600))]);
        schema.apply_defaults(&mut attrs);
        assert_eq!(attrs.get("port"), Some(&Value::Int(1600)));
    }

    #[test]
    fn into_computed_drops_configuration_rules() {
        let attr = AttributeSchema::new("display_name", AttributeType::String)
            .required()
            .force_new()
            .with_default("x")
            .with_constraint(Constraint::Length { min: 1, max: 5 })
            .into_computed();
        assert!(attr.computed && !attr.required && !attr.force_new);
        assert!(!attr.is_settable());
        assert!(attr.default.is_none() && attr.constraints.is_empty());
    }

    #[test]
    fn validate_cidr_values() {
        assert!(validate_cidr("10.0.0.0/16").is_ok());
        assert!(validate_cidr("10.0.0.0").is_err());
        assert!(validate_cidr("10.0.0.0/33").is_err());
        assert!(validate_cidr("10.0.0.256/16").is_err());
    }
}
