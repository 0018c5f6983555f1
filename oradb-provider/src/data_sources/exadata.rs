//! oracle_db_servers, oracle_db_nodes and oracle_gi_versions

use async_trait::async_trait;
use oradb_core::provider::ProviderResult;
use oradb_core::resource::{Resource, State};
use oradb_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use serde::{Deserialize, Serialize};

use super::{OracleDataSource, READ_TIMEOUT, argument, computed_list};
use crate::ids::{CloudExadataInfrastructureId, CloudVmClusterId, LocationId};
use crate::models::API_VERSION_2024_06_01 as API_VERSION;
use crate::models::exadata::DbServer;
use crate::models::vm_cluster::{DbNode, GiVersion};
use crate::resources::{Context, build_schema, decode_config, list, parse_id, to_state};
use crate::validation;

// =============================================================================
// DB servers
// =============================================================================

#[derive(Deserialize)]
struct DbServersKey {
    cloud_exadata_infrastructure_id: String,
}

#[derive(Serialize)]
struct DbServersModel {
    cloud_exadata_infrastructure_id: String,
    db_servers: Vec<DbServerModel>,
}

#[derive(Serialize)]
struct DbServerModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    ocid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compartment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exadata_infrastructure_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpu_core_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_cpu_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory_size_in_gbs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_memory_in_gbs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_node_storage_size_in_gbs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_db_node_storage_in_gbs: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    db_node_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vm_cluster_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lifecycle_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_created: Option<String>,
}

fn flatten_db_server(server: DbServer) -> DbServerModel {
    let props = server.properties.unwrap_or_default();
    DbServerModel {
        ocid: props.ocid,
        display_name: props.display_name,
        compartment_id: props.compartment_id,
        exadata_infrastructure_id: props.exadata_infrastructure_id,
        cpu_core_count: props.cpu_core_count,
        max_cpu_count: props.max_cpu_count,
        memory_size_in_gbs: props.memory_size_in_gbs,
        max_memory_in_gbs: props.max_memory_in_gbs,
        db_node_storage_size_in_gbs: props.db_node_storage_size_in_gbs,
        max_db_node_storage_in_gbs: props.max_db_node_storage_in_gbs,
        db_node_ids: props.db_node_ids.unwrap_or_default(),
        vm_cluster_ids: props.vm_cluster_ids.unwrap_or_default(),
        lifecycle_state: props.lifecycle_state,
        shape: props.shape,
        time_created: props.time_created,
    }
}

/// Database servers of a Cloud Exadata infrastructure
pub struct DbServersDataSource;

#[async_trait]
impl OracleDataSource for DbServersDataSource {
    fn data_source_type(&self) -> &'static str {
        "oracle_db_servers"
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            self.data_source_type(),
            "Database servers of an Exadata infrastructure",
            vec![
                argument(
                    "cloud_exadata_infrastructure_id",
                    validation::cloud_exadata_infrastructure_id(),
                ),
                computed_list(
                    "db_servers",
                    vec![
                        AttributeSchema::new("ocid", AttributeType::String),
                        AttributeSchema::new("display_name", AttributeType::String),
                        AttributeSchema::new("compartment_id", AttributeType::String),
                        AttributeSchema::new("exadata_infrastructure_id", AttributeType::String),
                        AttributeSchema::new("cpu_core_count", AttributeType::Int),
                        AttributeSchema::new("max_cpu_count", AttributeType::Int),
                        AttributeSchema::new("memory_size_in_gbs", AttributeType::Int),
                        AttributeSchema::new("max_memory_in_gbs", AttributeType::Int),
                        AttributeSchema::new("db_node_storage_size_in_gbs", AttributeType::Int),
                        AttributeSchema::new("max_db_node_storage_in_gbs", AttributeType::Int),
                        AttributeSchema::new("db_node_ids", AttributeType::string_list()),
                        AttributeSchema::new("vm_cluster_ids", AttributeType::string_list()),
                        AttributeSchema::new("lifecycle_state", AttributeType::String),
                        AttributeSchema::new("shape", AttributeType::String),
                        AttributeSchema::new("time_created", AttributeType::String),
                    ],
                ),
            ],
        )
    }

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let key: DbServersKey = decode_config(resource)?;
        let infrastructure = parse_id(
            &resource.id,
            CloudExadataInfrastructureId::parse(&key.cloud_exadata_infrastructure_id),
        )?;
        let collection = infrastructure.db_servers_collection();
        let servers: Vec<DbServer> =
            list(ctx, &resource.id, &collection, API_VERSION, READ_TIMEOUT).await?;

        let model = DbServersModel {
            cloud_exadata_infrastructure_id: infrastructure.to_string(),
            db_servers: servers.into_iter().map(flatten_db_server).collect(),
        };
        to_state(&resource.id, &collection, &model)
    }
}

// =============================================================================
// DB nodes
// =============================================================================

#[derive(Deserialize)]
struct DbNodesKey {
    cloud_vm_cluster_id: String,
}

#[derive(Serialize)]
struct DbNodesModel {
    cloud_vm_cluster_id: String,
    db_nodes: Vec<DbNodeModel>,
}

#[derive(Serialize)]
struct DbNodeModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    ocid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_system_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lifecycle_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpu_core_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory_size_in_gbs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_node_storage_size_in_gbs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    software_storage_size_in_gb: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_created: Option<String>,
}

fn flatten_db_node(node: DbNode) -> DbNodeModel {
    let props = node.properties.unwrap_or_default();
    DbNodeModel {
        ocid: props.ocid,
        hostname: props.hostname,
        db_system_id: props.db_system_id,
        db_server_id: props.db_server_id,
        lifecycle_state: props.lifecycle_state,
        cpu_core_count: props.cpu_core_count,
        memory_size_in_gbs: props.memory_size_in_gbs,
        db_node_storage_size_in_gbs: props.db_node_storage_size_in_gbs,
        software_storage_size_in_gb: props.software_storage_size_in_gb,
        time_created: props.time_created,
    }
}

/// Database nodes of a Cloud VM cluster
pub struct DbNodesDataSource;

#[async_trait]
impl OracleDataSource for DbNodesDataSource {
    fn data_source_type(&self) -> &'static str {
        "oracle_db_nodes"
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            self.data_source_type(),
            "Database nodes of a VM cluster",
            vec![
                argument("cloud_vm_cluster_id", validation::cloud_vm_cluster_id()),
                computed_list(
                    "db_nodes",
                    vec![
                        AttributeSchema::new("ocid", AttributeType::String),
                        AttributeSchema::new("hostname", AttributeType::String),
                        AttributeSchema::new("db_system_id", AttributeType::String),
                        AttributeSchema::new("db_server_id", AttributeType::String),
                        AttributeSchema::new("lifecycle_state", AttributeType::String),
                        AttributeSchema::new("cpu_core_count", AttributeType::Int),
                        AttributeSchema::new("memory_size_in_gbs", AttributeType::Int),
                        AttributeSchema::new("db_node_storage_size_in_gbs", AttributeType::Int),
                        AttributeSchema::new("software_storage_size_in_gb", AttributeType::Int),
                        AttributeSchema::new("time_created", AttributeType::String),
                    ],
                ),
            ],
        )
    }

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let key: DbNodesKey = decode_config(resource)?;
        let cluster = parse_id(&resource.id, CloudVmClusterId::parse(&key.cloud_vm_cluster_id))?;
        let collection = cluster.db_nodes_collection();
        let nodes: Vec<DbNode> =
            list(ctx, &resource.id, &collection, API_VERSION, READ_TIMEOUT).await?;

        let model = DbNodesModel {
            cloud_vm_cluster_id: cluster.to_string(),
            db_nodes: nodes.into_iter().map(flatten_db_node).collect(),
        };
        to_state(&resource.id, &collection, &model)
    }
}

// =============================================================================
// GI versions
// =============================================================================

#[derive(Deserialize)]
struct LocationKey {
    location: String,
}

#[derive(Serialize)]
struct GiVersionsModel {
    location: String,
    versions: Vec<String>,
}

/// Grid Infrastructure versions offered in a location
pub struct GiVersionsDataSource;

#[async_trait]
impl OracleDataSource for GiVersionsDataSource {
    fn data_source_type(&self) -> &'static str {
        "oracle_gi_versions"
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            self.data_source_type(),
            "Grid Infrastructure versions available for VM clusters",
            vec![
                argument("location", AttributeType::String)
                    .with_normalizer(validation::normalize_location_value),
                AttributeSchema::new("versions", AttributeType::string_list()).computed(),
            ],
        )
    }

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let key: LocationKey = decode_config(resource)?;
        let location = LocationId::new(&ctx.subscription_id, &key.location);
        let collection = location.gi_versions_collection();
        let versions: Vec<GiVersion> =
            list(ctx, &resource.id, &collection, API_VERSION, READ_TIMEOUT).await?;

        let model = GiVersionsModel {
            location: location.location.clone(),
            versions: versions
                .into_iter()
                .filter_map(|v| v.properties)
                .map(|p| p.version)
                .collect(),
        };
        to_state(&resource.id, &collection, &model)
    }
}
