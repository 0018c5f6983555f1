//! oracle_autonomous_database_backup
//!
//! Long-term backups of an autonomous database. Reads list the parent's
//! backups and pick this one by ID, the same lookup the backup data source
//! uses.

use async_trait::async_trait;
use oradb_core::provider::{ProviderResult, Timeouts};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::{AttributeSchema, AttributeType, Constraint, ResourceSchema};
use serde::{Deserialize, Serialize};

use super::{
    Context, OracleResource, build_schema, decode_config, ensure_absent, expect_exists, list,
    name_attribute, parse_id, patch, put, remove, to_body, to_state,
};
use crate::helpers::find_backup;
use crate::ids::{AutonomousDatabaseBackupId, AutonomousDatabaseId};
use crate::models::API_VERSION_2024_06_01 as API_VERSION;
use crate::models::ResourceUpdate;
use crate::models::autonomous_database::{
    AutonomousDatabaseBackup, AutonomousDatabaseBackupProperties,
};
use crate::validation;

pub const RESOURCE_TYPE: &str = "oracle_autonomous_database_backup";

pub const BACKUP_TYPES: &[&str] = &["LongTerm"];

fn default_backup_type() -> String {
    BACKUP_TYPES[0].to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutonomousDatabaseBackupModel {
    pub name: String,
    pub autonomous_database_id: String,
    pub retention_period_in_days: i64,
    #[serde(rename = "type", default = "default_backup_type")]
    pub backup_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_tbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
}

pub(crate) fn schema_attributes() -> Vec<AttributeSchema> {
    vec![
        name_attribute(),
        AttributeSchema::new("autonomous_database_id", validation::autonomous_database_id())
            .required()
            .force_new(),
        AttributeSchema::new("retention_period_in_days", AttributeType::Int)
            .required()
            .with_constraint(Constraint::IntRange { min: 90, max: 3650 }),
        AttributeSchema::new("type", AttributeType::one_of(BACKUP_TYPES))
            .force_new()
            .with_default(BACKUP_TYPES[0]),
        AttributeSchema::new("backup_ocid", AttributeType::String).computed(),
        AttributeSchema::new("lifecycle_state", AttributeType::String).computed(),
        AttributeSchema::new("size_in_tbs", AttributeType::Float).computed(),
        AttributeSchema::new("time_created", AttributeType::String).computed(),
    ]
}

pub(crate) fn flatten(
    id: &AutonomousDatabaseBackupId,
    backup: &AutonomousDatabaseBackup,
) -> AutonomousDatabaseBackupModel {
    let props = backup.properties.clone().unwrap_or_default();
    AutonomousDatabaseBackupModel {
        name: id.name.clone(),
        autonomous_database_id: id.database().to_string(),
        retention_period_in_days: props.retention_period_in_days.unwrap_or_default(),
        backup_type: props.backup_type.unwrap_or_else(default_backup_type),
        backup_ocid: props.autonomous_database_backup_id,
        lifecycle_state: props.lifecycle_state,
        size_in_tbs: props.size_in_tbs,
        time_created: props.time_started,
    }
}

pub struct AutonomousDatabaseBackupResource;

#[async_trait]
impl OracleResource for AutonomousDatabaseBackupResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "Long-term backup of an autonomous database",
            schema_attributes(),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::minutes(120, 5, 120, 60)
    }

    fn updatable(&self) -> &'static [&'static str] {
        &["retention_period_in_days"]
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let model: AutonomousDatabaseBackupModel = decode_config(resource)?;
        let database = parse_id(
            &resource.id,
            AutonomousDatabaseId::parse(&model.autonomous_database_id),
        )?;
        let remote_id = AutonomousDatabaseBackupId::new(&database, &model.name).to_string();
        let timeouts = self.timeouts();

        ensure_absent(ctx, &resource.id, RESOURCE_TYPE, &remote_id, API_VERSION, timeouts.read)
            .await?;

        let body = AutonomousDatabaseBackup {
            properties: Some(AutonomousDatabaseBackupProperties {
                display_name: Some(model.name),
                retention_period_in_days: Some(model.retention_period_in_days),
                backup_type: Some(model.backup_type),
                ..Default::default()
            }),
            ..Default::default()
        };
        put(
            ctx,
            &resource.id,
            &remote_id,
            API_VERSION,
            to_body(&resource.id, &body)?,
            timeouts.create,
        )
        .await?;

        expect_exists(self.read(ctx, &resource.id, &remote_id).await?, &remote_id)
    }

    async fn read(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, AutonomousDatabaseBackupId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let collection = remote_id.database().backups_collection();

        let backups: Vec<AutonomousDatabaseBackup> =
            match list(ctx, id, &collection, API_VERSION, self.timeouts().read).await {
                Ok(backups) => backups,
                // The parent database is gone, and the backup with it
                Err(e) if e.is_not_found() => Vec::new(),
                Err(e) => return Err(e),
            };
        let Some(backup) = find_backup(&backups, &canonical) else {
            log::warn!("{} was not found - removing from state", canonical);
            return Ok(State::not_found(id.clone()));
        };
        to_state(id, &canonical, &flatten(&remote_id, backup))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        _changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, AutonomousDatabaseBackupId::parse(identifier))?.to_string();
        let model: AutonomousDatabaseBackupModel = decode_config(to)?;
        let update = ResourceUpdate {
            tags: None,
            properties: Some(AutonomousDatabaseBackupProperties {
                retention_period_in_days: Some(model.retention_period_in_days),
                ..Default::default()
            }),
        };
        let body = to_body(id, &update)?;
        patch(ctx, id, &remote_id, API_VERSION, body, self.timeouts().update).await?;
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, AutonomousDatabaseBackupId::parse(identifier))?.to_string();
        remove(ctx, id, &remote_id, API_VERSION, self.timeouts().delete).await
    }
}
