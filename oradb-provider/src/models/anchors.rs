//! Resource anchor and network anchor models (2025-09-01)

use serde::{Deserialize, Serialize};

use super::TrackedResource;

pub type ResourceAnchor = TrackedResource<ResourceAnchorProperties>;
pub type NetworkAnchor = TrackedResource<NetworkAnchorProperties>;

/// Resource anchors are always placed in the `global` location
pub const RESOURCE_ANCHOR_LOCATION: &str = "global";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAnchorProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_compartment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAnchorProperties {
    pub resource_anchor_id: String,
    pub subnet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_vcn_dns_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_backup_cidr_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_oracle_dns_forwarding_endpoint_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_oracle_dns_listening_endpoint_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_oracle_to_azure_dns_zone_sync_enabled: Option<bool>,

    // Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_vcn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}
