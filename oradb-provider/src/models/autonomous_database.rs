//! Autonomous database, backup and character set models (2024-06-01)

use serde::{Deserialize, Serialize};

use super::{CustomerContact, ProxyResource, TrackedResource};

pub type AutonomousDatabase = TrackedResource<AutonomousDatabaseProperties>;
pub type AutonomousDatabaseBackup = ProxyResource<AutonomousDatabaseBackupProperties>;
pub type AutonomousDatabaseCharacterSet = ProxyResource<CharacterSetProperties>;

/// Properties of an autonomous database, discriminated by `dataBaseType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataBaseType")]
pub enum AutonomousDatabaseProperties {
    Regular(AutonomousDatabaseBaseProperties),
    Clone(AutonomousDatabaseCloneProperties),
}

impl AutonomousDatabaseProperties {
    /// The fields shared by every shape
    pub fn base(&self) -> &AutonomousDatabaseBaseProperties {
        match self {
            AutonomousDatabaseProperties::Regular(base) => base,
            AutonomousDatabaseProperties::Clone(clone) => &clone.base,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomousDatabaseBaseProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_retention_period_in_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_contacts: Option<Vec<CustomerContact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_storage_size_in_tbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_workload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto_scaling_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto_scaling_for_storage_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mtls_connection_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncharacter_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<String>,

    // Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_console_url: Option<String>,
}

/// A database created as a copy of another one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomousDatabaseCloneProperties {
    #[serde(flatten)]
    pub base: AutonomousDatabaseBaseProperties,
    pub source_id: String,
    pub clone_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reconnect_clone_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_refreshable_clone: Option<bool>,
}

/// PATCH properties for an autonomous database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomousDatabaseUpdateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_retention_period_in_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_contacts: Option<Vec<CustomerContact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_storage_size_in_tbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto_scaling_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto_scaling_for_storage_enabled: Option<bool>,
}

impl AutonomousDatabaseUpdateProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomousDatabaseBackupProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period_in_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_type: Option<String>,

    // Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomous_database_backup_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomous_database_ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_size_in_tbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_automatic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_restorable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_tbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_available_til: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_ended: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSetProperties {
    #[serde(default)]
    pub character_set: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_shape_round_trips_through_tag() {
        let props = AutonomousDatabaseProperties::Regular(AutonomousDatabaseBaseProperties {
            compute_count: Some(2.0),
            db_workload: Some("OLTP".to_string()),
            ..Default::default()
        });
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["dataBaseType"], "Regular");
        assert_eq!(json["computeCount"], 2.0);
        assert_eq!(json["dbWorkload"], "OLTP");
    }

    #[test]
    fn clone_shape_exposes_shared_base() {
        let json = serde_json::json!({
            "dataBaseType": "Clone",
            "sourceId": "/subscriptions/s/resourceGroups/rg/providers/Oracle.Database/autonomousDatabases/src",
            "cloneType": "Full",
            "displayName": "copy",
            "lifecycleState": "Available"
        });
        let props: AutonomousDatabaseProperties = serde_json::from_value(json).unwrap();
        assert_eq!(props.base().display_name.as_deref(), Some("copy"));
        assert_eq!(props.base().lifecycle_state.as_deref(), Some("Available"));
        assert!(matches!(props, AutonomousDatabaseProperties::Clone(ref c) if c.clone_type == "Full"));
    }

    #[test]
    fn tracked_database_reads_from_api_body() {
        let database: AutonomousDatabase = serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Oracle.Database/autonomousDatabases/adb1",
            "location": "eastus",
            "properties": {
                "dataBaseType": "Regular",
                "computeCount": 2.0,
                "dbWorkload": "OLTP"
            }
        }))
        .unwrap();
        let props = database.properties.unwrap();
        assert_eq!(props.base().compute_count, Some(2.0));
        assert_eq!(props.base().db_workload.as_deref(), Some("OLTP"));
    }

    #[test]
    fn update_properties_only_carry_set_fields() {
        let update = AutonomousDatabaseUpdateProperties {
            compute_count: Some(4.0),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"computeCount": 4.0})
        );
    }
}
