//! Cloud Exadata infrastructure and DB server models (2024-06-01)

use serde::{Deserialize, Serialize};

use super::{CustomerContact, Named, ProxyResource, TrackedResource};

pub type CloudExadataInfrastructure = TrackedResource<CloudExadataInfrastructureProperties>;
pub type DbServer = ProxyResource<DbServerProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudExadataInfrastructureProperties {
    pub compute_count: i64,
    pub storage_count: i64,
    pub shape: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_contacts: Option<Vec<CustomerContact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_server_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_server_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_window: Option<MaintenanceWindow>,

    // Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_storage_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_storage_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cpu_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_storage_size_in_gbs: Option<i64>,
}

/// Maintenance scheduling preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patching_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_in_weeks: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<Named>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_of_month: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<Named>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_of_day: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_custom_action_timeout_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_action_timeout_in_mins: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_monthly_patching_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbServerProperties {
    #[serde(default)]
    pub ocid: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub compartment_id: Option<String>,
    #[serde(default)]
    pub exadata_infrastructure_id: Option<String>,
    #[serde(default)]
    pub cpu_core_count: Option<i64>,
    #[serde(default)]
    pub max_cpu_count: Option<i64>,
    #[serde(default)]
    pub memory_size_in_gbs: Option<i64>,
    #[serde(default)]
    pub max_memory_in_gbs: Option<i64>,
    #[serde(default)]
    pub db_node_storage_size_in_gbs: Option<i64>,
    #[serde(default)]
    pub max_db_node_storage_in_gbs: Option<i64>,
    #[serde(default)]
    pub db_node_ids: Option<Vec<String>>,
    #[serde(default)]
    pub vm_cluster_ids: Option<Vec<String>>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub time_created: Option<String>,
}
