//! oracle_cloud_vm_cluster

use std::collections::BTreeMap;

use async_trait::async_trait;
use oradb_core::provider::{ProviderResult, Timeouts};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::{AttributeSchema, AttributeType, Constraint, ResourceSchema, types};
use serde::{Deserialize, Serialize};

use super::db_system::LICENSE_MODELS;
use super::{
    Context, OracleResource, build_schema, decode_config, ensure_absent, expect_exists, fetch,
    has_changed, location_attribute, name_attribute, parse_id, patch, put, remove,
    resource_group_attribute, tags_attribute, to_body, to_state,
};
use crate::helpers::strip_hostname_suffix;
use crate::ids::{CloudVmClusterId, normalize_location};
use crate::models::API_VERSION_2024_06_01 as API_VERSION;
use crate::models::ResourceUpdate;
use crate::models::vm_cluster::{
    CloudVmCluster, CloudVmClusterProperties, CloudVmClusterUpdateProperties,
    DataCollectionOptions,
};
use crate::validation;

pub const RESOURCE_TYPE: &str = "oracle_cloud_vm_cluster";

const UPDATABLE: &[&str] = &[
    "tags",
    "cpu_core_count",
    "data_storage_size_in_tbs",
    "db_node_storage_size_in_gbs",
    "memory_size_in_gbs",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudVmClusterModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub cloud_exadata_infrastructure_id: String,
    pub cpu_core_count: i64,
    pub display_name: String,
    pub gi_version: String,
    /// Hostname prefix as declared; the API appends a generated suffix
    pub hostname: String,
    pub ssh_public_keys: Vec<String>,
    pub subnet_id: String,
    pub virtual_network_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_storage_size_in_tbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_node_storage_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub db_servers: Vec<String>,
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
    #[serde(default)]
    pub local_backup_enabled: bool,
    #[serde(default)]
    pub sparse_diskgroup_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_listener_port_tcp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_listener_port_tcp_ssl: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_collection_options: Vec<DataCollectionModel>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataCollectionModel {
    #[serde(default)]
    pub diagnostics_events_enabled: bool,
    #[serde(default)]
    pub health_monitoring_enabled: bool,
    #[serde(default)]
    pub incident_logs_enabled: bool,
}

pub(crate) fn schema_attributes() -> Vec<AttributeSchema> {
    vec![
        name_attribute(),
        resource_group_attribute(),
        location_attribute(),
        AttributeSchema::new(
            "cloud_exadata_infrastructure_id",
            validation::cloud_exadata_infrastructure_id(),
        )
        .required()
        .force_new(),
        AttributeSchema::new("cpu_core_count", types::positive_int()).required(),
        AttributeSchema::new("display_name", AttributeType::String)
            .required()
            .force_new()
            .with_constraint(Constraint::Length { min: 1, max: 255 }),
        AttributeSchema::new("gi_version", AttributeType::String)
            .required()
            .force_new(),
        AttributeSchema::new("hostname", AttributeType::String)
            .required()
            .force_new()
            .with_constraint(Constraint::Pattern {
                regex: r"^[A-Za-z][A-Za-z0-9]{0,22}$",
                message: "must be 1 to 23 alphanumerics starting with a letter",
            }),
        AttributeSchema::new("ssh_public_keys", AttributeType::string_list())
            .required()
            .force_new()
            .with_constraint(Constraint::ListLength { min: 1, max: 50 }),
        AttributeSchema::new("subnet_id", validation::subnet_id())
            .required()
            .force_new(),
        AttributeSchema::new("virtual_network_id", validation::virtual_network_id())
            .required()
            .force_new(),
        AttributeSchema::new("data_storage_size_in_tbs", AttributeType::Float).optional_computed(),
        AttributeSchema::new("db_node_storage_size_in_gbs", AttributeType::Int)
            .optional_computed(),
        AttributeSchema::new("db_servers", AttributeType::string_list())
            .optional_computed()
            .force_new(),
        AttributeSchema::new("license_model", AttributeType::one_of(LICENSE_MODELS))
            .optional_computed()
            .force_new(),
        AttributeSchema::new("memory_size_in_gbs", AttributeType::Int).optional_computed(),
        AttributeSchema::new("backup_subnet_cidr", types::cidr()).force_new(),
        AttributeSchema::new("cluster_name", AttributeType::String)
            .optional_computed()
            .force_new()
            .with_constraint(Constraint::Length { min: 1, max: 11 }),
        AttributeSchema::new("domain", AttributeType::String)
            .optional_computed()
            .force_new(),
        AttributeSchema::new("local_backup_enabled", AttributeType::Bool)
            .force_new()
            .with_default(false),
        AttributeSchema::new("sparse_diskgroup_enabled", AttributeType::Bool)
            .force_new()
            .with_default(false),
        AttributeSchema::new("time_zone", AttributeType::String)
            .optional_computed()
            .force_new(),
        AttributeSchema::new("zone_id", AttributeType::String)
            .optional_computed()
            .force_new(),
        AttributeSchema::new("scan_listener_port_tcp", AttributeType::Int)
            .force_new()
            .with_default(1521i64),
        AttributeSchema::new("scan_listener_port_tcp_ssl", AttributeType::Int)
            .force_new()
            .with_default(2484i64),
        AttributeSchema::new(
            "data_collection_options",
            AttributeType::single_block(vec![
                AttributeSchema::new("diagnostics_events_enabled", AttributeType::Bool),
                AttributeSchema::new("health_monitoring_enabled", AttributeType::Bool),
                AttributeSchema::new("incident_logs_enabled", AttributeType::Bool),
            ]),
        )
        .optional_computed()
        .force_new(),
        tags_attribute(),
        AttributeSchema::new("hostname_actual", AttributeType::String)
            .computed()
            .with_description("Hostname including the suffix added by the service"),
        AttributeSchema::new("node_count", AttributeType::Int).computed(),
        AttributeSchema::new("ocid", AttributeType::String).computed(),
        AttributeSchema::new("lifecycle_state", AttributeType::String).computed(),
    ]
}

pub(crate) fn flatten(id: &CloudVmClusterId, cluster: CloudVmCluster) -> CloudVmClusterModel {
    let props = cluster.properties.unwrap_or_default();
    CloudVmClusterModel {
        name: id.name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        location: normalize_location(&cluster.location),
        cloud_exadata_infrastructure_id: props.cloud_exadata_infrastructure_id,
        cpu_core_count: props.cpu_core_count,
        display_name: props.display_name,
        gi_version: props.gi_version,
        hostname: strip_hostname_suffix(&props.hostname).to_string(),
        ssh_public_keys: props.ssh_public_keys,
        subnet_id: props.subnet_id,
        virtual_network_id: props.vnet_id,
        data_storage_size_in_tbs: props.data_storage_size_in_tbs,
        db_node_storage_size_in_gbs: props.db_node_storage_size_in_gbs,
        db_servers: props.db_servers.unwrap_or_default(),
        license_model: props.license_model,
        memory_size_in_gbs: props.memory_size_in_gbs,
        backup_subnet_cidr: props.backup_subnet_cidr,
        cluster_name: props.cluster_name,
        domain: props.domain,
        local_backup_enabled: props.is_local_backup_enabled.unwrap_or_default(),
        sparse_diskgroup_enabled: props.is_sparse_diskgroup_enabled.unwrap_or_default(),
        time_zone: props.time_zone,
        zone_id: props.zone_id,
        scan_listener_port_tcp: props.scan_listener_port_tcp,
        scan_listener_port_tcp_ssl: props.scan_listener_port_tcp_ssl,
        data_collection_options: props
            .data_collection_options
            .map(|o| DataCollectionModel {
                diagnostics_events_enabled: o.is_diagnostics_events_enabled,
                health_monitoring_enabled: o.is_health_monitoring_enabled,
                incident_logs_enabled: o.is_incident_logs_enabled,
            })
            .into_iter()
            .collect(),
        tags: cluster.tags,
        hostname_actual: Some(props.hostname),
        node_count: props.node_count,
        ocid: props.ocid,
        lifecycle_state: props.lifecycle_state,
    }
}

fn expand(model: CloudVmClusterModel) -> CloudVmCluster {
    CloudVmCluster {
        location: normalize_location(&model.location),
        tags: model.tags,
        properties: Some(CloudVmClusterProperties {
            cloud_exadata_infrastructure_id: model.cloud_exadata_infrastructure_id,
            cpu_core_count: model.cpu_core_count,
            display_name: model.display_name,
            gi_version: model.gi_version,
            hostname: model.hostname,
            ssh_public_keys: model.ssh_public_keys,
            subnet_id: model.subnet_id,
            vnet_id: model.virtual_network_id,
            data_storage_size_in_tbs: model.data_storage_size_in_tbs,
            db_node_storage_size_in_gbs: model.db_node_storage_size_in_gbs,
            db_servers: (!model.db_servers.is_empty()).then_some(model.db_servers),
            license_model: model.license_model,
            memory_size_in_gbs: model.memory_size_in_gbs,
            backup_subnet_cidr: model.backup_subnet_cidr,
            cluster_name: model.cluster_name,
            domain: model.domain,
            is_local_backup_enabled: Some(model.local_backup_enabled),
            is_sparse_diskgroup_enabled: Some(model.sparse_diskgroup_enabled),
            time_zone: model.time_zone,
            zone_id: model.zone_id,
            scan_listener_port_tcp: model.scan_listener_port_tcp,
            scan_listener_port_tcp_ssl: model.scan_listener_port_tcp_ssl,
            data_collection_options: model.data_collection_options.into_iter().next().map(|o| {
                DataCollectionOptions {
                    is_diagnostics_events_enabled: o.diagnostics_events_enabled,
                    is_health_monitoring_enabled: o.health_monitoring_enabled,
                    is_incident_logs_enabled: o.incident_logs_enabled,
                }
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// PATCH body carrying only the changed attributes
fn update_body(
    model: CloudVmClusterModel,
    changed: &[String],
) -> ResourceUpdate<CloudVmClusterUpdateProperties> {
    let pick = |name: &str| has_changed(changed, name);
    let properties = CloudVmClusterUpdateProperties {
        cpu_core_count: pick("cpu_core_count").then_some(model.cpu_core_count),
        data_storage_size_in_tbs: model
            .data_storage_size_in_tbs
            .filter(|_| pick("data_storage_size_in_tbs")),
        db_node_storage_size_in_gbs: model
            .db_node_storage_size_in_gbs
            .filter(|_| pick("db_node_storage_size_in_gbs")),
        memory_size_in_gbs: model.memory_size_in_gbs.filter(|_| pick("memory_size_in_gbs")),
    };
    ResourceUpdate {
        tags: pick("tags").then_some(model.tags),
        properties: (!properties.is_empty()).then_some(properties),
    }
}

pub struct CloudVmClusterResource;

#[async_trait]
impl OracleResource for CloudVmClusterResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "VM cluster on Cloud Exadata infrastructure",
            schema_attributes(),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::minutes(120, 5, 120, 60)
    }

    fn updatable(&self) -> &'static [&'static str] {
        UPDATABLE
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let model: CloudVmClusterModel = decode_config(resource)?;
        let remote_id =
            CloudVmClusterId::new(&ctx.subscription_id, &model.resource_group_name, &model.name)
                .to_string();
        let timeouts = self.timeouts();

        ensure_absent(ctx, &resource.id, RESOURCE_TYPE, &remote_id, API_VERSION, timeouts.read)
            .await?;

        let body = to_body(&resource.id, &expand(model))?;
        put(ctx, &resource.id, &remote_id, API_VERSION, body, timeouts.create).await?;

        expect_exists(self.read(ctx, &resource.id, &remote_id).await?, &remote_id)
    }

    async fn read(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, CloudVmClusterId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let Some(cluster) =
            fetch::<CloudVmCluster>(ctx, id, &canonical, API_VERSION, self.timeouts().read)
                .await?
        else {
            log::warn!("{} was not found - removing from state", canonical);
            return Ok(State::not_found(id.clone()));
        };
        to_state(id, &canonical, &flatten(&remote_id, cluster))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, CloudVmClusterId::parse(identifier))?.to_string();
        let update = update_body(decode_config(to)?, changed);
        if !update.is_empty() {
            let body = to_body(id, &update)?;
            patch(ctx, id, &remote_id, API_VERSION, body, self.timeouts().update).await?;
        }
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, CloudVmClusterId::parse(identifier))?.to_string();
        remove(ctx, id, &remote_id, API_VERSION, self.timeouts().delete).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oradb_core::resource::Value;
    use serde_json::json;

    use super::*;
    use crate::testing::{SUBSCRIPTION, StubClient, context, resource};

    const INFRA: &str = "/subscriptions/s/resourceGroups/rg-ora/providers/Oracle.Database/cloudExadataInfrastructures/infra1";
    const VNET: &str = "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet";
    const SUBNET: &str = "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet/subnets/delegated";

    fn cluster_id() -> String {
        format!(
            "/subscriptions/{}/resourceGroups/rg-ora/providers/Oracle.Database/cloudVmClusters/cluster1",
            SUBSCRIPTION
        )
    }

    fn declared(cpu_core_count: i64) -> Resource {
        resource(
            RESOURCE_TYPE,
            "cluster",
            json!({
                "name": "cluster1",
                "resource_group_name": "rg-ora",
                "location": "eastus",
                "cloud_exadata_infrastructure_id": INFRA,
                "cpu_core_count": cpu_core_count,
                "data_storage_size_in_tbs": 2.0,
                "db_node_storage_size_in_gbs": 120,
                "memory_size_in_gbs": 60,
                "display_name": "Cluster One",
                "gi_version": "19.0.0.0",
                "hostname": "vmhost",
                "ssh_public_keys": ["ssh-rsa AAAAB3Nza"],
                "subnet_id": SUBNET,
                "virtual_network_id": VNET,
                "license_model": "BringYourOwnLicense",
                "scan_listener_port_tcp": 1521,
                "scan_listener_port_tcp_ssl": 2484,
                "data_collection_options": [{
                    "diagnostics_events_enabled": true,
                    "health_monitoring_enabled": false,
                    "incident_logs_enabled": true
                }]
            }),
        )
    }

    #[test]
    fn flatten_splits_generated_hostname_suffix() {
        let cluster: CloudVmCluster = serde_json::from_value(json!({
            "location": "East US",
            "properties": {
                "cloudExadataInfrastructureId": INFRA,
                "cpuCoreCount": 4,
                "displayName": "Cluster One",
                "giVersion": "19.0.0.0",
                "hostname": "vmhost-x1y2z",
                "sshPublicKeys": ["ssh-rsa AAAAB3Nza"],
                "subnetId": SUBNET,
                "vnetId": VNET
            }
        }))
        .unwrap();
        let id = CloudVmClusterId::parse(&cluster_id()).unwrap();

        let model = flatten(&id, cluster);
        assert_eq!(model.hostname, "vmhost");
        assert_eq!(model.hostname_actual.as_deref(), Some("vmhost-x1y2z"));
        assert_eq!(model.location, "eastus");
        assert_eq!(model.virtual_network_id, VNET);
        assert!(model.data_collection_options.is_empty());
    }

    #[tokio::test]
    async fn create_sends_ports_and_collection_options() {
        let stub = Arc::new(StubClient::new());
        let state = CloudVmClusterResource
            .create(&context(&stub), &declared(4))
            .await
            .unwrap();

        let put = &stub.puts()[0];
        assert_eq!(put["properties"]["vnetId"], VNET);
        assert_eq!(put["properties"]["scanListenerPortTcp"], 1521);
        assert_eq!(
            put["properties"]["dataCollectionOptions"],
            json!({
                "isDiagnosticsEventsEnabled": true,
                "isHealthMonitoringEnabled": false,
                "isIncidentLogsEnabled": true
            })
        );

        assert_eq!(state.identifier.as_deref(), Some(cluster_id().as_str()));
        assert_eq!(state.attributes.get("hostname"), Some(&Value::from("vmhost")));
        assert_eq!(
            state.attributes.get("hostname_actual"),
            Some(&Value::from("vmhost"))
        );
        assert_eq!(
            state.attributes.get("data_storage_size_in_tbs"),
            Some(&Value::Float(2.0))
        );
    }

    #[tokio::test]
    async fn update_patches_only_changed_sizes() {
        let stub = Arc::new(StubClient::new());
        let ctx = context(&stub);
        CloudVmClusterResource.create(&ctx, &declared(4)).await.unwrap();

        let id = ResourceId::new(RESOURCE_TYPE, "cluster");
        let state = CloudVmClusterResource
            .update(
                &ctx,
                &id,
                &cluster_id(),
                &["cpu_core_count".to_string()],
                &declared(8),
            )
            .await
            .unwrap();

        assert_eq!(
            stub.patches(),
            vec![json!({"properties": {"cpuCoreCount": 8}})]
        );
        assert_eq!(state.attributes.get("cpu_core_count"), Some(&Value::Int(8)));
    }

    #[test]
    fn update_body_without_relevant_changes_is_empty() {
        let model = CloudVmClusterModel {
            cpu_core_count: 4,
            memory_size_in_gbs: Some(60),
            ..Default::default()
        };
        assert!(update_body(model.clone(), &[]).is_empty());

        let update = update_body(model, &["tags".to_string(), "memory_size_in_gbs".to_string()]);
        assert_eq!(update.tags, Some(BTreeMap::new()));
        assert_eq!(
            update.properties.and_then(|p| p.memory_size_in_gbs),
            Some(60)
        );
    }
}
