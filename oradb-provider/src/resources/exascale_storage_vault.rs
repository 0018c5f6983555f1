//! oracle_exascale_database_storage_vault

use std::collections::BTreeMap;

use async_trait::async_trait;
use oradb_core::provider::{ProviderResult, Timeouts};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::{AttributeSchema, AttributeType, Constraint, ResourceSchema};
use serde::{Deserialize, Serialize};

use super::{
    Context, OracleResource, build_schema, decode_config, ensure_absent, expect_exists, fetch,
    location_attribute, name_attribute, parse_id, put, remove, resource_group_attribute,
    tags_attribute, to_body, to_state, update_tags,
};
use crate::ids::{ExascaleDbStorageVaultId, normalize_location};
use crate::models::API_VERSION_2025_09_01 as API_VERSION;
use crate::models::storage_vault::{
    ExascaleDbStorageInputDetails, ExascaleDbStorageVault, ExascaleDbStorageVaultProperties,
};

pub const RESOURCE_TYPE: &str = "oracle_exascale_database_storage_vault";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExascaleStorageVaultModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub zones: Vec<String>,
    pub display_name: String,
    pub high_capacity_database_storage_input: Vec<StorageInputModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_flash_cache_in_percent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub high_capacity_database_storage: Vec<StorageModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageInputModel {
    pub total_size_in_gbs: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size_in_gbs: Option<i64>,
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
        AttributeSchema::new("display_name", AttributeType::String)
            .required()
            .force_new()
            .with_constraint(Constraint::Length { min: 1, max: 255 }),
        AttributeSchema::new(
            "high_capacity_database_storage_input",
            AttributeType::single_block(vec![
                AttributeSchema::new("total_size_in_gbs", AttributeType::Int).required(),
            ]),
        )
        .required()
        .force_new()
        .with_constraint(Constraint::ListLength { min: 1, max: 1 }),
        AttributeSchema::new("additional_flash_cache_in_percent", AttributeType::Int)
            .optional_computed()
            .force_new()
            .with_constraint(Constraint::IntRange { min: 0, max: 100 }),
        AttributeSchema::new("description", AttributeType::String)
            .force_new()
            .with_constraint(Constraint::Length { min: 1, max: 400 }),
        AttributeSchema::new("time_zone", AttributeType::String)
            .optional_computed()
            .force_new(),
        tags_attribute(),
        AttributeSchema::new(
            "high_capacity_database_storage",
            AttributeType::Block {
                attributes: vec![
                    AttributeSchema::new("available_size_in_gbs", AttributeType::Int).computed(),
                    AttributeSchema::new("total_size_in_gbs", AttributeType::Int).computed(),
                ],
                max_items: Some(1),
            },
        )
        .computed(),
        AttributeSchema::new("ocid", AttributeType::String).computed(),
        AttributeSchema::new("lifecycle_state", AttributeType::String).computed(),
    ]
}

pub(crate) fn flatten(
    id: &ExascaleDbStorageVaultId,
    vault: ExascaleDbStorageVault,
) -> ExascaleStorageVaultModel {
    let props = vault.properties.unwrap_or_default();
    ExascaleStorageVaultModel {
        name: id.name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        location: normalize_location(&vault.location),
        zones: vault.zones.unwrap_or_default(),
        display_name: props.display_name,
        high_capacity_database_storage_input: vec![StorageInputModel {
            total_size_in_gbs: props.high_capacity_database_storage_input.total_size_in_gbs,
        }],
        additional_flash_cache_in_percent: props.additional_flash_cache_in_percent,
        description: props.description,
        time_zone: props.time_zone,
        tags: vault.tags,
        high_capacity_database_storage: props
            .high_capacity_database_storage
            .map(|s| StorageModel {
                available_size_in_gbs: s.available_size_in_gbs,
                total_size_in_gbs: s.total_size_in_gbs,
            })
            .into_iter()
            .collect(),
        ocid: props.ocid,
        lifecycle_state: props.lifecycle_state,
    }
}

fn expand(model: ExascaleStorageVaultModel) -> ExascaleDbStorageVault {
    let total_size_in_gbs = model
        .high_capacity_database_storage_input
        .first()
        .map(|i| i.total_size_in_gbs)
        .unwrap_or_default();
    ExascaleDbStorageVault {
        location: normalize_location(&model.location),
        tags: model.tags,
        zones: Some(model.zones),
        properties: Some(ExascaleDbStorageVaultProperties {
            display_name: model.display_name,
            high_capacity_database_storage_input: ExascaleDbStorageInputDetails {
                total_size_in_gbs,
            },
            additional_flash_cache_in_percent: model.additional_flash_cache_in_percent,
            description: model.description,
            time_zone: model.time_zone,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub struct ExascaleStorageVaultResource;

#[async_trait]
impl OracleResource for ExascaleStorageVaultResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "Exascale database storage vault",
            schema_attributes(),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::minutes(120, 5, 30, 60)
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let model: ExascaleStorageVaultModel = decode_config(resource)?;
        let remote_id = ExascaleDbStorageVaultId::new(
            &ctx.subscription_id,
            &model.resource_group_name,
            &model.name,
        )
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
        let remote_id = parse_id(id, ExascaleDbStorageVaultId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let Some(vault) = fetch::<ExascaleDbStorageVault>(
            ctx,
            id,
            &canonical,
            API_VERSION,
            self.timeouts().read,
        )
        .await?
        else {
            log::warn!("{} was not found - removing from state", canonical);
            return Ok(State::not_found(id.clone()));
        };
        to_state(id, &canonical, &flatten(&remote_id, vault))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        _changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, ExascaleDbStorageVaultId::parse(identifier))?.to_string();
        update_tags(ctx, id, &remote_id, API_VERSION, to, self.timeouts().update).await?;
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, ExascaleDbStorageVaultId::parse(identifier))?.to_string();
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

    fn declared() -> Resource {
        resource(
            RESOURCE_TYPE,
            "vault",
            json!({
                "name": "vault1",
                "resource_group_name": "rg-ora",
                "location": "eastus",
                "zones": ["3"],
                "display_name": "Vault One",
                "additional_flash_cache_in_percent": 20,
                "high_capacity_database_storage_input": [{"total_size_in_gbs": 300}],
                "time_zone": "UTC"
            }),
        )
    }

    #[test]
    fn flash_cache_is_bounded() {
        let schema = ExascaleStorageVaultResource.schema();
        assert!(schema.validate(&declared().attributes).is_ok());

        let mut bad = declared();
        bad.attributes.insert(
            "additional_flash_cache_in_percent".to_string(),
            Value::Int(101),
        );
        assert!(schema.validate(&bad.attributes).is_err());
    }

    #[tokio::test]
    async fn storage_input_block_round_trips() {
        let stub = Arc::new(StubClient::new());
        stub.compute(json!({
            "ocid": "ocid1.vault.oc1..x",
            "highCapacityDatabaseStorage": {"availableSizeInGbs": 300, "totalSizeInGbs": 300}
        }));

        let state = ExascaleStorageVaultResource
            .create(&context(&stub), &declared())
            .await
            .unwrap();

        let put = &stub.puts()[0];
        assert_eq!(
            put["properties"]["highCapacityDatabaseStorageInput"]["totalSizeInGbs"],
            300
        );
        assert_eq!(put["properties"]["additionalFlashCacheInPercent"], 20);

        let Some(Value::List(input)) = state.attributes.get("high_capacity_database_storage_input")
        else {
            panic!("storage input missing");
        };
        let Value::Map(block) = &input[0] else {
            panic!("block is not a map");
        };
        assert_eq!(block.get("total_size_in_gbs"), Some(&Value::Int(300)));
        assert!(state.attributes.contains_key("high_capacity_database_storage"));
        assert_eq!(state.attributes.get("ocid"), Some(&Value::from("ocid1.vault.oc1..x")));
    }
}
