//! Small mapping helpers shared by resources and data sources

use std::collections::{BTreeMap, HashMap};

use oradb_core::resource::Value;

use crate::models::autonomous_database::AutonomousDatabaseBackup;

/// Find a backup by resource ID
///
/// IDs are compared case-insensitively. A missing backup is `None`, not an
/// error; callers decide what absence means.
pub fn find_backup<'a>(
    backups: &'a [AutonomousDatabaseBackup],
    target_id: &str,
) -> Option<&'a AutonomousDatabaseBackup> {
    backups.iter().find(|b| {
        b.id
            .as_deref()
            .is_some_and(|id| id.eq_ignore_ascii_case(target_id))
    })
}

/// Drop the node suffix the API appends to a cluster hostname
///
/// `"host-03"` becomes `"host"`; a hostname without `-` is returned as is.
pub fn strip_hostname_suffix(hostname: &str) -> &str {
    match hostname.rfind('-') {
        Some(idx) => &hostname[..idx],
        None => hostname,
    }
}

/// Tag attribute to the API's string map
///
/// Schema validation (`types::tags()`) guarantees string values before this
/// runs; anything else is skipped.
pub fn expand_tags(value: Option<&Value>) -> BTreeMap<String, String> {
    match value {
        Some(Value::Map(map)) => map
            .iter()
            .filter_map(|(k, v)| {
                debug_assert!(v.as_str().is_some(), "tag {} is not a string", k);
                v.as_str().map(|s| (k.clone(), s.to_string()))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// API tags to a tag attribute
pub fn flatten_tags(tags: &BTreeMap<String, String>) -> Value {
    Value::Map(
        tags.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<HashMap<_, _>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::autonomous_database::AutonomousDatabaseBackupProperties;

    fn backup(id: &str, name: &str) -> AutonomousDatabaseBackup {
        AutonomousDatabaseBackup {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            kind: None,
            properties: Some(AutonomousDatabaseBackupProperties {
                display_name: Some(name.to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn find_backup_matches_case_insensitively() {
        let backups = vec![
            backup("/subscriptions/s/resourceGroups/rg/providers/Oracle.Database/autonomousDatabases/adb/autonomousDatabaseBackups/one", "one"),
            backup("/subscriptions/s/resourceGroups/rg/providers/Oracle.Database/autonomousDatabases/adb/autonomousDatabaseBackups/two", "two"),
        ];
        let found = find_backup(
            &backups,
            "/SUBSCRIPTIONS/s/resourcegroups/rg/providers/oracle.database/autonomousdatabases/adb/autonomousDatabaseBackups/two",
        );
        assert_eq!(found.and_then(|b| b.name.as_deref()), Some("two"));
    }

    #[test]
    fn find_backup_returns_none_when_absent() {
        let backups = vec![backup("/x/one", "one")];
        assert!(find_backup(&backups, "/x/three").is_none());
        assert!(find_backup(&[], "/x/one").is_none());
    }

    #[test]
    fn strip_hostname_suffix_drops_last_segment() {
        assert_eq!(strip_hostname_suffix("host-03"), "host");
        assert_eq!(strip_hostname_suffix("my-vm-host-x1y2z"), "my-vm-host");
        assert_eq!(strip_hostname_suffix("standalone"), "standalone");
    }

    #[test]
    fn tags_convert_both_ways() {
        let value = Value::Map(HashMap::from([("env".to_string(), Value::from("dev"))]));
        let tags = expand_tags(Some(&value));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("env").map(String::as_str), Some("dev"));
        assert_eq!(
            flatten_tags(&tags),
            Value::Map(HashMap::from([("env".to_string(), Value::from("dev"))]))
        );
        assert!(expand_tags(None).is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not a string")]
    fn non_string_tag_is_a_bug() {
        let value = Value::Map(HashMap::from([("count".to_string(), Value::Int(3))]));
        expand_tags(Some(&value));
    }
}
