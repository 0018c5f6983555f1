//! oracle_network_anchor

use std::collections::BTreeMap;

use async_trait::async_trait;
use oradb_core::provider::{ProviderResult, Timeouts};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::{AttributeSchema, AttributeType, Constraint, ResourceSchema, types};
use serde::{Deserialize, Serialize};

use super::{
    Context, OracleResource, build_schema, decode_config, ensure_absent, expect_exists, fetch,
    location_attribute, name_attribute, parse_id, put, remove, resource_group_attribute,
    tags_attribute, to_body, to_state, update_tags,
};
use crate::ids::{NetworkAnchorId, normalize_location};
use crate::models::API_VERSION_2025_09_01 as API_VERSION;
use crate::models::anchors::{NetworkAnchor, NetworkAnchorProperties};
use crate::validation;

pub const RESOURCE_TYPE: &str = "oracle_network_anchor";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkAnchorModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub zones: Vec<String>,
    pub resource_anchor_id: String,
    pub subnet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_vcn_dns_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_backup_cidr_block: Option<String>,
    #[serde(default)]
    pub oracle_dns_forwarding_endpoint_enabled: bool,
    #[serde(default)]
    pub oracle_dns_listening_endpoint_enabled: bool,
    #[serde(default)]
    pub oracle_to_azure_dns_zone_sync_enabled: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_vcn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_subnet_id: Option<String>,
}

pub(crate) fn schema_attributes() -> Vec<AttributeSchema> {
    vec![
        name_attribute(),
        resource_group_attribute(),
        location_attribute(),
        AttributeSchema::new("zones", AttributeType::string_list())
            .required()
            .force_new()
            .with_constraint(Constraint::ListLength { min: 1, max: 1 }),
        AttributeSchema::new("resource_anchor_id", validation::resource_anchor_id())
            .required()
            .force_new(),
        AttributeSchema::new("subnet_id", validation::subnet_id())
            .required()
            .force_new(),
        AttributeSchema::new("oci_vcn_dns_label", AttributeType::String)
            .optional_computed()
            .force_new()
            .with_constraint(Constraint::Pattern {
                regex: r"^[A-Za-z][A-Za-z0-9]{0,14}$",
                message: "must be 1 to 15 alphanumerics starting with a letter",
            }),
        AttributeSchema::new("oci_backup_cidr_block", types::cidr()).force_new(),
        AttributeSchema::new("oracle_dns_forwarding_endpoint_enabled", AttributeType::Bool)
            .force_new()
            .with_default(false),
        AttributeSchema::new("oracle_dns_listening_endpoint_enabled", AttributeType::Bool)
            .force_new()
            .with_default(false),
        AttributeSchema::new("oracle_to_azure_dns_zone_sync_enabled", AttributeType::Bool)
            .force_new()
            .with_default(false),
        tags_attribute(),
        AttributeSchema::new("vnet_id", AttributeType::String).computed(),
        AttributeSchema::new("oci_vcn_id", AttributeType::String).computed(),
        AttributeSchema::new("oci_subnet_id", AttributeType::String).computed(),
    ]
}

pub(crate) fn flatten(id: &NetworkAnchorId, anchor: NetworkAnchor) -> NetworkAnchorModel {
    let props = anchor.properties.unwrap_or_default();
    NetworkAnchorModel {
        name: id.name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        location: normalize_location(&anchor.location),
        zones: anchor.zones.unwrap_or_default(),
        resource_anchor_id: props.resource_anchor_id,
        subnet_id: props.subnet_id,
        oci_vcn_dns_label: props.oci_vcn_dns_label,
        oci_backup_cidr_block: props.oci_backup_cidr_block,
        oracle_dns_forwarding_endpoint_enabled: props
            .is_oracle_dns_forwarding_endpoint_enabled
            .unwrap_or_default(),
        oracle_dns_listening_endpoint_enabled: props
            .is_oracle_dns_listening_endpoint_enabled
            .unwrap_or_default(),
        oracle_to_azure_dns_zone_sync_enabled: props
            .is_oracle_to_azure_dns_zone_sync_enabled
            .unwrap_or_default(),
        tags: anchor.tags,
        vnet_id: props.vnet_id,
        oci_vcn_id: props.oci_vcn_id,
        oci_subnet_id: props.oci_subnet_id,
    }
}

fn expand(model: NetworkAnchorModel) -> NetworkAnchor {
    NetworkAnchor {
        location: normalize_location(&model.location),
        tags: model.tags,
        zones: Some(model.zones),
        properties: Some(NetworkAnchorProperties {
            resource_anchor_id: model.resource_anchor_id,
            subnet_id: model.subnet_id,
            oci_vcn_dns_label: model.oci_vcn_dns_label,
            oci_backup_cidr_block: model.oci_backup_cidr_block,
            is_oracle_dns_forwarding_endpoint_enabled: Some(
                model.oracle_dns_forwarding_endpoint_enabled,
            ),
            is_oracle_dns_listening_endpoint_enabled: Some(
                model.oracle_dns_listening_endpoint_enabled,
            ),
            is_oracle_to_azure_dns_zone_sync_enabled: Some(
                model.oracle_to_azure_dns_zone_sync_enabled,
            ),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub struct NetworkAnchorResource;

#[async_trait]
impl OracleResource for NetworkAnchorResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "Network anchor delegating an Azure subnet to OCI",
            schema_attributes(),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::minutes(60, 5, 30, 60)
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let model: NetworkAnchorModel = decode_config(resource)?;
        let remote_id =
            NetworkAnchorId::new(&ctx.subscription_id, &model.resource_group_name, &model.name)
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
        let remote_id = parse_id(id, NetworkAnchorId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let Some(anchor) =
            fetch::<NetworkAnchor>(ctx, id, &canonical, API_VERSION, self.timeouts().read).await?
        else {
            log::warn!("{} was not found - removing from state", canonical);
            return Ok(State::not_found(id.clone()));
        };
        to_state(id, &canonical, &flatten(&remote_id, anchor))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        _changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, NetworkAnchorId::parse(identifier))?.to_string();
        update_tags(ctx, id, &remote_id, API_VERSION, to, self.timeouts().update).await?;
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, NetworkAnchorId::parse(identifier))?.to_string();
        remove(ctx, id, &remote_id, API_VERSION, self.timeouts().delete).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oradb_core::resource::Value;
    use serde_json::json;

    use super::*;
    use crate::testing::{StubClient, context, resource};

    const SUBNET: &str = "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet/subnets/delegated";
    const ANCHOR: &str = "/subscriptions/s/resourceGroups/rg-ora/providers/Oracle.Database/resourceAnchors/anchor1";

    fn declared() -> Resource {
        resource(
            RESOURCE_TYPE,
            "net",
            json!({
                "name": "netanchor1",
                "resource_group_name": "rg-ora",
                "location": "East US",
                "zones": ["2"],
                "resource_anchor_id": ANCHOR,
                "subnet_id": SUBNET,
                "oci_vcn_dns_label": "vcn1",
                "oracle_dns_forwarding_endpoint_enabled": true
            }),
        )
    }

    #[test]
    fn schema_accepts_declared_configuration() {
        let schema = NetworkAnchorResource.schema();
        assert!(schema.validate(&declared().attributes).is_ok());

        let mut bad = declared();
        bad.attributes
            .insert("zones".to_string(), Value::List(Vec::new()));
        assert!(schema.validate(&bad.attributes).is_err());
    }

    #[tokio::test]
    async fn create_maps_dns_flags_and_reads_computed_ids() {
        let stub = Arc::new(StubClient::new());
        stub.compute(json!({
            "vnetId": "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet",
            "ociVcnId": "ocid1.vcn.oc1..v"
        }));

        let state = NetworkAnchorResource
            .create(&context(&stub), &declared())
            .await
            .unwrap();

        let put = &stub.puts()[0];
        assert_eq!(put["location"], "eastus");
        assert_eq!(put["zones"], json!(["2"]));
        assert_eq!(put["properties"]["isOracleDnsForwardingEndpointEnabled"], true);
        assert_eq!(put["properties"]["isOracleDnsListeningEndpointEnabled"], false);

        assert_eq!(state.attributes.get("location"), Some(&Value::from("eastus")));
        assert_eq!(
            state.attributes.get("oci_vcn_id"),
            Some(&Value::from("ocid1.vcn.oc1..v"))
        );
        assert_eq!(
            state.attributes.get("oracle_dns_forwarding_endpoint_enabled"),
            Some(&Value::Bool(true))
        );
        assert_eq!(state.attributes.get("subnet_id"), Some(&Value::from(SUBNET)));
    }
}
