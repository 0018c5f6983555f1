//! Differ - Compare desired configuration with tracked state
//!
//! Update operations only send the attributes that actually changed; this
//! module computes that set and flags changes that need a replacement.

use std::collections::HashMap;

use crate::resource::Value;
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Find changed attributes between desired and current state
///
/// Internal attributes (leading `_`), computed-only attributes and sensitive
/// attributes are skipped. Sensitive values are write-only: the API never
/// returns them, so tracked state has nothing to compare against.
/// The result is sorted for stable output.
pub fn changed_attributes(
    schema: &ResourceSchema,
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
) -> Vec<String> {
    let mut changed = Vec::new();

    for (key, desired_value) in desired {
        if key.starts_with('_') {
            continue;
        }
        if let Some(attr) = schema.attributes.get(key)
            && (!attr.is_settable() || attr.sensitive)
        {
            continue;
        }

        let same = match (current.get(key), schema.attributes.get(key)) {
            (Some(current_value), Some(attr)) => attribute_matches(attr, current_value, desired_value),
            (Some(current_value), None) => values_equal(current_value, desired_value),
            // The API omits empty collections
            (None, _) => is_empty(desired_value),
        };
        if !same {
            changed.push(key.clone());
        }
    }

    // Optional attributes removed from configuration (tags being the usual case)
    for key in current.keys() {
        if desired.contains_key(key) || is_empty(&current[key]) {
            continue;
        }
        if let Some(attr) = schema.attributes.get(key)
            && attr.is_settable()
            && !attr.computed
            && !attr.required
        {
            changed.push(key.clone());
        }
    }

    changed.sort();
    changed
}

/// Changed attributes that cannot be updated in place
pub fn requires_replacement<'a>(schema: &ResourceSchema, changed: &'a [String]) -> Vec<&'a str> {
    changed
        .iter()
        .filter(|name| schema.attributes.get(*name).is_some_and(|a| a.force_new))
        .map(|s| s.as_str())
        .collect()
}

fn attribute_matches(attr: &AttributeSchema, current: &Value, desired: &Value) -> bool {
    let current = attr.normalized(current);
    let desired = attr.normalized(desired);
    match (&attr.attr_type, &current, &desired) {
        (AttributeType::Block { .. }, Value::List(have), Value::List(want)) => {
            have.len() == want.len() && have.iter().zip(want).all(|(h, w)| block_matches(h, w))
        }
        _ => values_equal(&current, &desired),
    }
}

/// Keys left out of a block keep whatever the service chose
fn block_matches(current: &Value, desired: &Value) -> bool {
    match (current, desired) {
        (Value::Map(have), Value::Map(want)) => want.iter().all(|(k, v)| match have.get(k) {
            Some(h) => values_equal(h, v),
            None => is_empty(v),
        }),
        _ => values_equal(current, desired),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::List(items) => items.is_empty(),
        Value::Map(entries) => entries.is_empty(),
        _ => false,
    }
}

/// Integral floats and ints compare equal (2 == 2.0)
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => (*i as f64) == *f,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types;

    fn schema() -> ResourceSchema {
        ResourceSchema::new("oracle_autonomous_database")
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("compute_count", AttributeType::Float).required())
            .attribute(AttributeSchema::new("tags", types::tags()))
            .attribute(
                AttributeSchema::new("location", AttributeType::String)
                    .required()
                    .force_new()
                    .with_normalizer(|v| match v {
                        Value::String(s) => Value::String(s.replace(' ', "").to_lowercase()),
                        other => other.clone(),
                    }),
            )
            .attribute(AttributeSchema::new("ocid", AttributeType::String).computed())
            .attribute(
                AttributeSchema::new("admin_password", AttributeType::String)
                    .required()
                    .sensitive(),
            )
            .attribute(
                AttributeSchema::new("db_servers", AttributeType::string_list())
                    .optional_computed()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new(
                    "data_collection_options",
                    AttributeType::single_block(vec![
                        AttributeSchema::new("diagnostics_events_enabled", AttributeType::Bool),
                        AttributeSchema::new("incident_logs_enabled", AttributeType::Bool),
                    ]),
                )
                .optional_computed()
                .force_new(),
            )
    }

    fn options(entries: &[(&str, bool)]) -> Value {
        Value::List(vec![Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), Value::Bool(*v)))
                .collect(),
        )])
    }

    #[test]
    fn no_change_when_same() {
        let desired = HashMap::from([
            ("name".to_string(), Value::from("adb1")),
            ("compute_count".to_string(), Value::Int(2)),
        ]);
        let current = HashMap::from([
            ("name".to_string(), Value::from("adb1")),
            ("compute_count".to_string(), Value::Float(2.0)),
            ("ocid".to_string(), Value::from("ocid1.adb")),
        ]);
        assert!(changed_attributes(&schema(), &desired, &current).is_empty());
    }

    #[test]
    fn detects_changed_and_removed_attributes() {
        let desired = HashMap::from([
            ("name".to_string(), Value::from("adb2")),
            ("compute_count".to_string(), Value::Float(4.0)),
        ]);
        let current = HashMap::from([
            ("name".to_string(), Value::from("adb1")),
            ("compute_count".to_string(), Value::Float(2.0)),
            (
                "tags".to_string(),
                Value::Map(HashMap::from([("env".to_string(), Value::from("test"))])),
            ),
        ]);
        let changed = changed_attributes(&schema(), &desired, &current);
        assert_eq!(changed, vec!["compute_count", "name", "tags"]);
        assert_eq!(requires_replacement(&schema(), &changed), vec!["name"]);
    }

    #[test]
    fn normalized_values_compare_equal() {
        let desired = HashMap::from([("location".to_string(), Value::from("East US"))]);
        let current = HashMap::from([("location".to_string(), Value::from("eastus"))]);
        assert!(changed_attributes(&schema(), &desired, &current).is_empty());

        let current = HashMap::from([("location".to_string(), Value::from("westus"))]);
        assert_eq!(
            changed_attributes(&schema(), &desired, &current),
            vec!["location"]
        );
    }

    #[test]
    fn sensitive_attributes_are_not_compared() {
        let desired = HashMap::from([
            ("name".to_string(), Value::from("adb1")),
            ("admin_password".to_string(), Value::from("Secret123456")),
        ]);
        let current = HashMap::from([("name".to_string(), Value::from("adb1"))]);
        assert!(changed_attributes(&schema(), &desired, &current).is_empty());
    }

    #[test]
    fn empty_collections_match_absent_values() {
        let desired = HashMap::from([
            ("name".to_string(), Value::from("adb1")),
            ("db_servers".to_string(), Value::List(vec![])),
            ("tags".to_string(), Value::Map(HashMap::new())),
        ]);
        let current = HashMap::from([("name".to_string(), Value::from("adb1"))]);
        assert!(changed_attributes(&schema(), &desired, &current).is_empty());

        let desired = HashMap::from([("name".to_string(), Value::from("adb1"))]);
        let current = HashMap::from([
            ("name".to_string(), Value::from("adb1")),
            ("tags".to_string(), Value::Map(HashMap::new())),
        ]);
        assert!(changed_attributes(&schema(), &desired, &current).is_empty());
    }

    #[test]
    fn blocks_compare_on_declared_keys() {
        let desired = HashMap::from([(
            "data_collection_options".to_string(),
            options(&[("diagnostics_events_enabled", true)]),
        )]);
        let current = HashMap::from([(
            "data_collection_options".to_string(),
            options(&[
                ("diagnostics_events_enabled", true),
                ("incident_logs_enabled", false),
            ]),
        )]);
        assert!(changed_attributes(&schema(), &desired, &current).is_empty());

        let desired = HashMap::from([(
            "data_collection_options".to_string(),
            options(&[("incident_logs_enabled", true)]),
        )]);
        let changed = changed_attributes(&schema(), &desired, &current);
        assert_eq!(changed, vec!["data_collection_options"]);
        assert_eq!(
            requires_replacement(&schema(), &changed),
            vec!["data_collection_options"]
        );
    }

    #[test]
    fn non_empty_collection_against_absent_value_is_a_change() {
        let desired = HashMap::from([(
            "db_servers".to_string(),
            Value::List(vec![Value::from("dbserver1")]),
        )]);
        assert_eq!(
            changed_attributes(&schema(), &desired, &HashMap::new()),
            vec!["db_servers"]
        );
    }
}
