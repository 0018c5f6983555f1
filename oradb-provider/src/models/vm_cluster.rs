//! Cloud VM cluster, DB node and GI version models (2024-06-01)

use serde::{Deserialize, Serialize};

use super::{ProxyResource, TrackedResource};

pub type CloudVmCluster = TrackedResource<CloudVmClusterProperties>;
pub type DbNode = ProxyResource<DbNodeProperties>;
pub type GiVersion = ProxyResource<GiVersionProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudVmClusterProperties {
    pub cloud_exadata_infrastructure_id: String,
    pub cpu_core_count: i64,
    pub display_name: String,
    pub gi_version: String,
    pub hostname: String,
    pub ssh_public_keys: Vec<String>,
    pub subnet_id: String,
    pub vnet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_storage_size_in_tbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_node_storage_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_servers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_subnet_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_local_backup_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sparse_diskgroup_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_listener_port_tcp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_listener_port_tcp_ssl: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_collection_options: Option<DataCollectionOptions>,

    // Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCollectionOptions {
    #[serde(default)]
    pub is_diagnostics_events_enabled: bool,
    #[serde(default)]
    pub is_health_monitoring_enabled: bool,
    #[serde(default)]
    pub is_incident_logs_enabled: bool,
}

/// PATCH properties for a VM cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudVmClusterUpdateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_core_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_storage_size_in_tbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_node_storage_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size_in_gbs: Option<i64>,
}

impl CloudVmClusterUpdateProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbNodeProperties {
    #[serde(default)]
    pub ocid: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub db_system_id: Option<String>,
    #[serde(default)]
    pub db_server_id: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
    #[serde(default)]
    pub cpu_core_count: Option<i64>,
    #[serde(default)]
    pub memory_size_in_gbs: Option<i64>,
    #[serde(default)]
    pub db_node_storage_size_in_gbs: Option<i64>,
    #[serde(default)]
    pub software_storage_size_in_gb: Option<i64>,
    #[serde(default)]
    pub time_created: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiVersionProperties {
    #[serde(default)]
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_changes_is_empty() {
        assert!(CloudVmClusterUpdateProperties::default().is_empty());
        let update = CloudVmClusterUpdateProperties {
            memory_size_in_gbs: Some(120),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"memorySizeInGbs": 120})
        );
    }

    #[test]
    fn cluster_reads_api_payload() {
        let cluster: CloudVmCluster = serde_json::from_value(serde_json::json!({
            "location": "eastus",
            "properties": {
                "cloudExadataInfrastructureId": "/x",
                "cpuCoreCount": 4,
                "displayName": "cluster",
                "giVersion": "19.0.0.0",
                "hostname": "host-abc12",
                "sshPublicKeys": ["ssh-rsa AAA"],
                "subnetId": "/s",
                "vnetId": "/v",
                "dataCollectionOptions": {"isHealthMonitoringEnabled": true}
            }
        }))
        .unwrap();
        let props = cluster.properties.unwrap();
        assert_eq!(props.hostname, "host-abc12");
        let options = props.data_collection_options.unwrap();
        assert!(options.is_health_monitoring_enabled);
        assert!(!options.is_incident_logs_enabled);
    }
}
