//! Single-object data sources
//!
//! Each one reuses the Read of the matching resource type: the lookup keys
//! build the resource ID, every other attribute becomes an output.

use async_trait::async_trait;
use oradb_core::provider::ProviderResult;
use oradb_core::resource::{Resource, State};
use oradb_core::schema::{AttributeSchema, ResourceSchema};
use serde::Deserialize;

use super::{OracleDataSource, missing};
use crate::ids::{
    AutonomousDatabaseBackupId, AutonomousDatabaseId, CloudExadataInfrastructureId,
    CloudVmClusterId, DbSystemId, ExascaleDbStorageVaultId, NetworkAnchorId, ResourceAnchorId,
};
use crate::resources::{
    Context, OracleResource, autonomous_database, autonomous_database_backup, cloud_vm_cluster,
    db_system, decode_config, exadata_infrastructure, exascale_storage_vault, network_anchor,
    parse_id, resource_anchor,
};

const IN_RESOURCE_GROUP: &[&str] = &["name", "resource_group_name"];

/// Data source that reads one object of a resource type
pub struct Lookup {
    resource: Box<dyn OracleResource>,
    keys: &'static [&'static str],
    identify: fn(&Context, &Resource) -> ProviderResult<String>,
}

impl Lookup {
    fn in_resource_group(
        resource: impl OracleResource + 'static,
        identify: fn(&Context, &Resource) -> ProviderResult<String>,
    ) -> Self {
        Self {
            resource: Box::new(resource),
            keys: IN_RESOURCE_GROUP,
            identify,
        }
    }

    fn key_attribute(&self, mut attr: AttributeSchema) -> AttributeSchema {
        if self.keys.contains(&attr.name.as_str()) {
            attr.force_new = false;
            attr.default = None;
            attr
        } else {
            attr.into_computed()
        }
    }
}

#[async_trait]
impl OracleDataSource for Lookup {
    fn data_source_type(&self) -> &'static str {
        self.resource.resource_type()
    }

    fn schema(&self) -> ResourceSchema {
        let schema = self.resource.schema();
        let lookup = schema
            .attributes
            .into_values()
            .filter(|a| !a.sensitive)
            .map(|a| self.key_attribute(a))
            .fold(
                ResourceSchema::new(schema.resource_type),
                ResourceSchema::attribute,
            );
        match schema.description {
            Some(description) => lookup.with_description(description),
            None => lookup,
        }
    }

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let identifier = (self.identify)(ctx, resource)?;
        let state = self.resource.read(ctx, &resource.id, &identifier).await?;
        if state.exists {
            Ok(state)
        } else {
            Err(missing(resource, &identifier))
        }
    }
}

#[derive(Deserialize)]
struct InResourceGroup {
    name: String,
    resource_group_name: String,
}

macro_rules! in_resource_group {
    ($fn_name:ident, $id:ty) => {
        fn $fn_name(ctx: &Context, resource: &Resource) -> ProviderResult<String> {
            let key: InResourceGroup = decode_config(resource)?;
            Ok(<$id>::new(&ctx.subscription_id, &key.resource_group_name, &key.name).to_string())
        }
    };
}

in_resource_group!(autonomous_database_id, AutonomousDatabaseId);
in_resource_group!(exadata_infrastructure_id, CloudExadataInfrastructureId);
in_resource_group!(cloud_vm_cluster_id, CloudVmClusterId);
in_resource_group!(storage_vault_id, ExascaleDbStorageVaultId);
in_resource_group!(resource_anchor_id, ResourceAnchorId);
in_resource_group!(network_anchor_id, NetworkAnchorId);
in_resource_group!(db_system_id, DbSystemId);

#[derive(Deserialize)]
struct BackupKey {
    name: String,
    autonomous_database_id: String,
}

fn backup_id(_ctx: &Context, resource: &Resource) -> ProviderResult<String> {
    let key: BackupKey = decode_config(resource)?;
    let database = parse_id(
        &resource.id,
        AutonomousDatabaseId::parse(&key.autonomous_database_id),
    )?;
    Ok(AutonomousDatabaseBackupId::new(&database, key.name).to_string())
}

pub(crate) fn lookups() -> Vec<Box<dyn OracleDataSource>> {
    vec![
        Box::new(Lookup::in_resource_group(
            autonomous_database::AutonomousDatabaseResource,
            autonomous_database_id,
        )),
        Box::new(Lookup {
            resource: Box::new(autonomous_database_backup::AutonomousDatabaseBackupResource),
            keys: &["name", "autonomous_database_id"],
            identify: backup_id,
        }),
        Box::new(Lookup::in_resource_group(
            exadata_infrastructure::ExadataInfrastructureResource,
            exadata_infrastructure_id,
        )),
        Box::new(Lookup::in_resource_group(
            cloud_vm_cluster::CloudVmClusterResource,
            cloud_vm_cluster_id,
        )),
        Box::new(Lookup::in_resource_group(
            exascale_storage_vault::ExascaleStorageVaultResource,
            storage_vault_id,
        )),
        Box::new(Lookup::in_resource_group(
            resource_anchor::ResourceAnchorResource,
            resource_anchor_id,
        )),
        Box::new(Lookup::in_resource_group(
            network_anchor::NetworkAnchorResource,
            network_anchor_id,
        )),
        Box::new(Lookup::in_resource_group(
            db_system::DbSystemResource,
            db_system_id,
        )),
    ]
}
