//! oracle_autonomous_database_backups and oracle_adbs_character_sets

use async_trait::async_trait;
use oradb_core::provider::ProviderResult;
use oradb_core::resource::{Resource, State};
use oradb_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use serde::{Deserialize, Serialize};

use super::{OracleDataSource, READ_TIMEOUT, argument, computed_list};
use crate::ids::{AutonomousDatabaseId, LocationId};
use crate::models::API_VERSION_2024_06_01 as API_VERSION;
use crate::models::autonomous_database::{AutonomousDatabaseBackup, AutonomousDatabaseCharacterSet};
use crate::resources::{Context, build_schema, decode_config, list, parse_id, to_state};
use crate::validation;

// =============================================================================
// Backups
// =============================================================================

#[derive(Deserialize)]
struct BackupsKey {
    autonomous_database_id: String,
}

#[derive(Serialize)]
struct BackupsModel {
    autonomous_database_id: String,
    autonomous_database_backups: Vec<BackupModel>,
}

#[derive(Serialize)]
struct BackupModel {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retention_period_in_days: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    backup_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backup_ocid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    autonomous_database_ocid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_size_in_tbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    automatic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restorable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lifecycle_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_in_tbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_available_til: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_started: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_ended: Option<String>,
}

fn flatten_backup(backup: AutonomousDatabaseBackup) -> BackupModel {
    let props = backup.properties.unwrap_or_default();
    BackupModel {
        id: backup.id.unwrap_or_default(),
        name: backup.name.unwrap_or_default(),
        display_name: props.display_name,
        retention_period_in_days: props.retention_period_in_days,
        backup_type: props.backup_type,
        backup_ocid: props.autonomous_database_backup_id,
        autonomous_database_ocid: props.autonomous_database_ocid,
        database_size_in_tbs: props.database_size_in_tbs,
        db_version: props.db_version,
        automatic: props.is_automatic,
        restorable: props.is_restorable,
        lifecycle_state: props.lifecycle_state,
        size_in_tbs: props.size_in_tbs,
        time_available_til: props.time_available_til,
        time_started: props.time_started,
        time_ended: props.time_ended,
    }
}

/// All backups of an autonomous database
pub struct BackupsDataSource;

#[async_trait]
impl OracleDataSource for BackupsDataSource {
    fn data_source_type(&self) -> &'static str {
        "oracle_autonomous_database_backups"
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            self.data_source_type(),
            "Backups of an autonomous database",
            vec![
                argument("autonomous_database_id", validation::autonomous_database_id()),
                computed_list(
                    "autonomous_database_backups",
                    vec![
                        AttributeSchema::new("id", AttributeType::String),
                        AttributeSchema::new("name", AttributeType::String),
                        AttributeSchema::new("display_name", AttributeType::String),
                        AttributeSchema::new("retention_period_in_days", AttributeType::Int),
                        AttributeSchema::new("type", AttributeType::String),
                        AttributeSchema::new("backup_ocid", AttributeType::String),
                        AttributeSchema::new("autonomous_database_ocid", AttributeType::String),
                        AttributeSchema::new("database_size_in_tbs", AttributeType::Float),
                        AttributeSchema::new("db_version", AttributeType::String),
                        AttributeSchema::new("automatic", AttributeType::Bool),
                        AttributeSchema::new("restorable", AttributeType::Bool),
                        AttributeSchema::new("lifecycle_state", AttributeType::String),
                        AttributeSchema::new("size_in_tbs", AttributeType::Float),
                        AttributeSchema::new("time_available_til", AttributeType::String),
                        AttributeSchema::new("time_started", AttributeType::String),
                        AttributeSchema::new("time_ended", AttributeType::String),
                    ],
                ),
            ],
        )
    }

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let key: BackupsKey = decode_config(resource)?;
        let database = parse_id(
            &resource.id,
            AutonomousDatabaseId::parse(&key.autonomous_database_id),
        )?;
        let collection = database.backups_collection();
        let backups: Vec<AutonomousDatabaseBackup> =
            list(ctx, &resource.id, &collection, API_VERSION, READ_TIMEOUT).await?;

        let model = BackupsModel {
            autonomous_database_id: database.to_string(),
            autonomous_database_backups: backups.into_iter().map(flatten_backup).collect(),
        };
        to_state(&resource.id, &collection, &model)
    }
}

// =============================================================================
// Character sets
// =============================================================================

#[derive(Deserialize)]
struct LocationKey {
    location: String,
}

#[derive(Serialize)]
struct CharacterSetsModel {
    location: String,
    character_sets: Vec<CharacterSetModel>,
}

#[derive(Serialize)]
struct CharacterSetModel {
    character_set: String,
}

/// Database character sets offered for autonomous databases in a location
pub struct CharacterSetsDataSource;

#[async_trait]
impl OracleDataSource for CharacterSetsDataSource {
    fn data_source_type(&self) -> &'static str {
        "oracle_adbs_character_sets"
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            self.data_source_type(),
            "Character sets available to autonomous databases",
            vec![
                argument("location", AttributeType::String)
                    .with_normalizer(validation::normalize_location_value),
                computed_list(
                    "character_sets",
                    vec![AttributeSchema::new("character_set", AttributeType::String)],
                ),
            ],
        )
    }

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let key: LocationKey = decode_config(resource)?;
        let location = LocationId::new(&ctx.subscription_id, &key.location);
        let collection = location.character_sets_collection();
        let sets: Vec<AutonomousDatabaseCharacterSet> =
            list(ctx, &resource.id, &collection, API_VERSION, READ_TIMEOUT).await?;

        let model = CharacterSetsModel {
            location: location.location.clone(),
            character_sets: sets
                .into_iter()
                .filter_map(|s| s.properties)
                .map(|p| CharacterSetModel {
                    character_set: p.character_set,
                })
                .collect(),
        };
        to_state(&resource.id, &collection, &model)
    }
}
