//! oracle_db_system

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
use crate::ids::{DbSystemId, normalize_location};
use crate::models::API_VERSION_2025_09_01 as API_VERSION;
use crate::models::db_system::{DbSystem, DbSystemProperties};
use crate::validation;

pub const RESOURCE_TYPE: &str = "oracle_db_system";

pub const COMPUTE_MODELS: &[&str] = &["ECPU", "OCPU"];
pub const LICENSE_MODELS: &[&str] = &["BringYourOwnLicense", "LicenseIncluded"];
pub const DATABASE_EDITIONS: &[&str] = &[
    "StandardEdition",
    "EnterpriseEdition",
    "EnterpriseEditionHighPerformance",
    "EnterpriseEditionExtreme",
    "EnterpriseEditionDeveloper",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbSystemModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub zones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
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
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
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
        AttributeSchema::new("admin_password", validation::admin_password())
            .required()
            .force_new()
            .sensitive(),
        AttributeSchema::new("compute_count", AttributeType::Int)
            .required()
            .force_new()
            .with_constraint(Constraint::IntRange { min: 1, max: 512 }),
        AttributeSchema::new("compute_model", AttributeType::one_of(COMPUTE_MODELS))
            .required()
            .force_new(),
        AttributeSchema::new("database_edition", AttributeType::one_of(DATABASE_EDITIONS))
            .required()
            .force_new(),
        AttributeSchema::new("db_version", AttributeType::String)
            .required()
            .force_new(),
        AttributeSchema::new("hostname", AttributeType::String)
            .required()
            .force_new()
            .with_constraint(Constraint::Pattern {
                regex: r"^[A-Za-z][A-Za-z0-9-]{0,15}$",
                message: "must be 1 to 16 characters, letters, digits and hyphens, starting with a letter",
            }),
        AttributeSchema::new("network_anchor_id", validation::network_anchor_id())
            .required()
            .force_new(),
        AttributeSchema::new("resource_anchor_id", validation::resource_anchor_id())
            .required()
            .force_new(),
        AttributeSchema::new("shape", AttributeType::String)
            .required()
            .force_new(),
        AttributeSchema::new("source", AttributeType::one_of(&["None"]))
            .force_new()
            .with_default("None"),
        AttributeSchema::new("ssh_public_keys", AttributeType::string_list())
            .required()
            .force_new()
            .with_constraint(Constraint::ListLength { min: 1, max: 50 }),
        AttributeSchema::new("initial_data_storage_size_in_gb", AttributeType::Int)
            .optional_computed()
            .force_new(),
        AttributeSchema::new("license_model", AttributeType::one_of(LICENSE_MODELS))
            .optional_computed()
            .force_new(),
        AttributeSchema::new("pluggable_database_name", AttributeType::String)
            .force_new()
            .with_constraint(Constraint::Length { min: 1, max: 30 }),
        AttributeSchema::new("time_zone", AttributeType::String)
            .optional_computed()
            .force_new(),
        AttributeSchema::new("display_name", AttributeType::String)
            .optional_computed()
            .force_new(),
        AttributeSchema::new("node_count", AttributeType::Int)
            .optional_computed()
            .force_new(),
        tags_attribute(),
        AttributeSchema::new("ocid", AttributeType::String).computed(),
        AttributeSchema::new("lifecycle_state", AttributeType::String).computed(),
    ]
}

pub(crate) fn flatten(id: &DbSystemId, system: DbSystem) -> DbSystemModel {
    let props = system.properties.unwrap_or_default();
    DbSystemModel {
        name: id.name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        location: normalize_location(&system.location),
        zones: system.zones.unwrap_or_default(),
        // Write-only
        admin_password: None,
        compute_count: props.compute_count,
        compute_model: props.compute_model,
        database_edition: props.database_edition,
        db_version: props.db_version,
        hostname: props.hostname,
        network_anchor_id: props.network_anchor_id,
        resource_anchor_id: props.resource_anchor_id,
        shape: props.shape,
        source: props.source,
        ssh_public_keys: props.ssh_public_keys,
        initial_data_storage_size_in_gb: props.initial_data_storage_size_in_gb,
        license_model: props.license_model,
        pluggable_database_name: props.pluggable_database_name,
        time_zone: props.time_zone,
        display_name: props.display_name,
        node_count: props.node_count,
        tags: system.tags,
        ocid: props.ocid,
        lifecycle_state: props.lifecycle_state,
    }
}

fn expand(model: DbSystemModel) -> DbSystem {
    DbSystem {
        location: normalize_location(&model.location),
        tags: model.tags,
        zones: Some(model.zones),
        properties: Some(DbSystemProperties {
            admin_password: model.admin_password,
            compute_count: model.compute_count,
            compute_model: model.compute_model,
            database_edition: model.database_edition,
            db_version: model.db_version,
            hostname: model.hostname,
            network_anchor_id: model.network_anchor_id,
            resource_anchor_id: model.resource_anchor_id,
            shape: model.shape,
            source: model.source,
            ssh_public_keys: model.ssh_public_keys,
            initial_data_storage_size_in_gb: model.initial_data_storage_size_in_gb,
            license_model: model.license_model,
            pluggable_database_name: model.pluggable_database_name,
            time_zone: model.time_zone,
            display_name: model.display_name,
            node_count: model.node_count,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub struct DbSystemResource;

#[async_trait]
impl OracleResource for DbSystemResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "Base database system attached to a network anchor",
            schema_attributes(),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::minutes(120, 5, 60, 60)
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let model: DbSystemModel = decode_config(resource)?;
        let remote_id =
            DbSystemId::new(&ctx.subscription_id, &model.resource_group_name, &model.name)
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
        let remote_id = parse_id(id, DbSystemId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let Some(system) =
            fetch::<DbSystem>(ctx, id, &canonical, API_VERSION, self.timeouts().read).await?
        else {
            log::warn!("{} was not found - removing from state", canonical);
            return Ok(State::not_found(id.clone()));
        };
        to_state(id, &canonical, &flatten(&remote_id, system))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        _changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, DbSystemId::parse(identifier))?.to_string();
        update_tags(ctx, id, &remote_id, API_VERSION, to, self.timeouts().update).await?;
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, DbSystemId::parse(identifier))?.to_string();
        remove(ctx, id, &remote_id, API_VERSION, self.timeouts().delete).await
    }
}
