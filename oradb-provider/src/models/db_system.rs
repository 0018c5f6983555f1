//! DB system and DB system shape models (2025-09-01)

use serde::{Deserialize, Serialize};

use super::{ProxyResource, TrackedResource};

pub type DbSystem = TrackedResource<DbSystemProperties>;
pub type DbSystemShape = ProxyResource<DbSystemShapeProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSystemProperties {
    pub compute_count: i64,
    pub compute_model: String,
    pub database_edition: String,
    pub db_version: String,
    pub hostname: String,
    pub network_anchor_id: String,
    pub resource_anchor_id: String,
    pub shape: String,
    pub source: String,
    pub ssh_public_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_data_storage_size_in_gb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pluggable_database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,

    // Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_port: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSystemShapeProperties {
    #[serde(default)]
    pub shape_family: Option<String>,
    #[serde(default)]
    pub shape_name: Option<String>,
    #[serde(default)]
    pub available_core_count: Option<i64>,
    #[serde(default)]
    pub minimum_core_count: Option<i64>,
    #[serde(default)]
    pub available_memory_in_gbs: Option<i64>,
    #[serde(default)]
    pub available_data_storage_in_tbs: Option<i64>,
    #[serde(default)]
    pub minimum_node_count: Option<i64>,
    #[serde(default)]
    pub maximum_node_count: Option<i64>,
    #[serde(default)]
    pub shape_attributes: Option<Vec<String>>,
}
