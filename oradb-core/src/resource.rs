//! Resource - Representing resources and their state

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "oracle_autonomous_database")
    pub resource_type: String,
    /// Resource name (identifier specified in configuration)
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Attribute value of a resource
///
/// Nested configuration blocks are a `List` holding one `Map` per block.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    /// Convert a JSON value into a Value. `null` has no representation.
    pub fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            serde_json::Value::Array(arr) => Some(Value::List(
                arr.iter().filter_map(Value::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Some(Value::Map(
                map.iter()
                    .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }

    /// Convert this Value into JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Convert an attribute map into a JSON object
pub fn attributes_to_json(attributes: &HashMap<String, Value>) -> serde_json::Value {
    serde_json::Value::Object(
        attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

/// Convert a JSON object into an attribute map, dropping nulls
pub fn attributes_from_json(value: &serde_json::Value) -> HashMap<String, Value> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
            .collect(),
        _ => HashMap::new(),
    }
}

/// Decode a configuration record into its typed model
pub fn decode<T: DeserializeOwned>(
    attributes: &HashMap<String, Value>,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(attributes_to_json(attributes))
}

/// Encode a typed model back into a configuration record
pub fn encode<T: Serialize>(model: &T) -> Result<HashMap<String, Value>, serde_json::Error> {
    Ok(attributes_from_json(&serde_json::to_value(model)?))
}

/// Desired state declared in configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub attributes: HashMap<String, Value>,
    /// If true, this is a data source (read-only) that won't be modified
    pub read_only: bool,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: HashMap::new(),
            read_only: false,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns true if this resource is a data source (read-only)
    pub fn is_data_source(&self) -> bool {
        self.read_only
    }
}

/// Current state fetched from the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub id: ResourceId,
    /// Remote resource ID (e.g., /subscriptions/.../autonomousDatabases/adb1)
    pub identifier: Option<String>,
    pub attributes: HashMap<String, Value>,
    /// Whether this state exists
    pub exists: bool,
}

impl State {
    pub fn not_found(id: ResourceId) -> Self {
        Self {
            id,
            identifier: None,
            attributes: HashMap::new(),
            exists: false,
        }
    }

    pub fn existing(id: ResourceId, attributes: HashMap<String, Value>) -> Self {
        Self {
            id,
            identifier: None,
            attributes,
            exists: true,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Window {
        preference: String,
        hours_of_day: Vec<i64>,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Model {
        name: String,
        compute_count: f64,
        #[serde(default)]
        tags: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        #[serde(default)]
        window: Vec<Window>,
    }

    #[test]
    fn json_conversion_keeps_numbers_apart() {
        let json = serde_json::json!({"count": 2, "ratio": 2.5, "flag": true, "gone": null});
        let attrs = attributes_from_json(&json);
        assert_eq!(attrs.get("count"), Some(&Value::Int(2)));
        assert_eq!(attrs.get("ratio"), Some(&Value::Float(2.5)));
        assert_eq!(attrs.get("flag"), Some(&Value::Bool(true)));
        assert!(!attrs.contains_key("gone"));
    }

    #[test]
    fn decode_and_encode_typed_model() {
        let mut window = HashMap::new();
        window.insert("preference".to_string(), Value::from("NoPreference"));
        window.insert(
            "hours_of_day".to_string(),
            Value::List(vec![Value::Int(0), Value::Int(4)]),
        );

        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::from("adb1"));
        attrs.insert("compute_count".to_string(), Value::Float(2.0));
        attrs.insert("window".to_string(), Value::List(vec![Value::Map(window)]));

        let model: Model = decode(&attrs).unwrap();
        assert_eq!(model.name, "adb1");
        assert_eq!(model.window[0].hours_of_day, vec![0, 4]);
        assert!(model.display_name.is_none());

        let encoded = encode(&model).unwrap();
        assert_eq!(encoded.get("name"), Some(&Value::from("adb1")));
        assert!(!encoded.contains_key("display_name"));
    }

    #[test]
    fn decode_accepts_integral_float_fields() {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::from("adb1"));
        attrs.insert("compute_count".to_string(), Value::Int(4));
        let model: Model = decode(&attrs).unwrap();
        assert_eq!(model.compute_count, 4.0);
    }

    #[test]
    fn state_not_found_has_no_identifier() {
        let state = State::not_found(ResourceId::new("oracle_resource_anchor", "a"));
        assert!(!state.exists);
        assert!(state.identifier.is_none());
    }
}
