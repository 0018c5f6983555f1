//! Exascale database storage vault model (2025-09-01)

use serde::{Deserialize, Serialize};

use super::TrackedResource;

pub type ExascaleDbStorageVault = TrackedResource<ExascaleDbStorageVaultProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExascaleDbStorageVaultProperties {
    pub display_name: String,
    pub high_capacity_database_storage_input: ExascaleDbStorageInputDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_flash_cache_in_percent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    // Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_capacity_database_storage: Option<ExascaleDbStorageDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_cluster_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExascaleDbStorageInputDetails {
    pub total_size_in_gbs: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExascaleDbStorageDetails {
    #[serde(default)]
    pub available_size_in_gbs: Option<i64>,
    #[serde(default)]
    pub total_size_in_gbs: Option<i64>,
}
