//! oracle_autonomous_database

use std::collections::BTreeMap;

use async_trait::async_trait;
use oradb_core::provider::{ProviderResult, Timeouts};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::{AttributeSchema, AttributeType, Constraint, ResourceSchema};
use serde::{Deserialize, Serialize};

use super::db_system::{COMPUTE_MODELS, LICENSE_MODELS};
use super::{
    Context, OracleResource, build_schema, decode_config, ensure_absent, expect_exists, fetch,
    has_changed, location_attribute, parse_id, patch, put, remove, resource_group_attribute,
    tags_attribute, to_body, to_state,
};
use crate::ids::{AutonomousDatabaseId, normalize_location};
use crate::models::API_VERSION_2024_06_01 as API_VERSION;
use crate::models::autonomous_database::{
    AutonomousDatabase, AutonomousDatabaseBaseProperties, AutonomousDatabaseProperties,
    AutonomousDatabaseUpdateProperties,
};
use crate::models::{ResourceUpdate, contacts_from, contacts_to};
use crate::validation;

pub const RESOURCE_TYPE: &str = "oracle_autonomous_database";

pub const DB_WORKLOADS: &[&str] = &["DW", "OLTP", "AJD", "APEX"];

const UPDATABLE: &[&str] = &[
    "tags",
    "backup_retention_period_in_days",
    "compute_count",
    "data_storage_size_in_tbs",
    "auto_scaling_enabled",
    "auto_scaling_for_storage_enabled",
    "customer_contacts",
    "display_name",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutonomousDatabaseModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    pub backup_retention_period_in_days: i64,
    pub character_set: String,
    pub national_character_set: String,
    pub compute_count: f64,
    pub compute_model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customer_contacts: Vec<String>,
    pub data_storage_size_in_tbs: i64,
    pub db_version: String,
    pub db_workload: String,
    pub display_name: String,
    pub license_model: String,
    pub auto_scaling_enabled: bool,
    pub auto_scaling_for_storage_enabled: bool,
    #[serde(default)]
    pub mtls_connection_required: bool,
    pub subnet_id: String,
    pub virtual_network_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_console_url: Option<String>,
}

pub(crate) fn schema_attributes() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("name", validation::autonomous_database_name())
            .required()
            .force_new(),
        resource_group_attribute(),
        location_attribute(),
        AttributeSchema::new("admin_password", validation::admin_password())
            .required()
            .force_new()
            .sensitive(),
        AttributeSchema::new("backup_retention_period_in_days", AttributeType::Int)
            .required()
            .with_constraint(Constraint::IntRange { min: 1, max: 60 }),
        AttributeSchema::new("character_set", AttributeType::String)
            .required()
            .force_new(),
        AttributeSchema::new("national_character_set", AttributeType::String)
            .required()
            .force_new(),
        AttributeSchema::new("compute_count", AttributeType::Float)
            .required()
            .with_constraint(Constraint::FloatRange {
                min: 2.0,
                max: 512.0,
            }),
        AttributeSchema::new("compute_model", AttributeType::one_of(COMPUTE_MODELS))
            .required()
            .force_new(),
        AttributeSchema::new(
            "customer_contacts",
            AttributeType::List(Box::new(validation::email())),
        ),
        AttributeSchema::new("data_storage_size_in_tbs", AttributeType::Int)
            .required()
            .with_constraint(Constraint::IntRange { min: 1, max: 384 }),
        AttributeSchema::new("db_version", AttributeType::String)
            .required()
            .force_new(),
        AttributeSchema::new("db_workload", AttributeType::one_of(DB_WORKLOADS))
            .required()
            .force_new(),
        AttributeSchema::new("display_name", AttributeType::String)
            .required()
            .with_constraint(Constraint::Length { min: 1, max: 255 }),
        AttributeSchema::new("license_model", AttributeType::one_of(LICENSE_MODELS))
            .required()
            .force_new(),
        AttributeSchema::new("auto_scaling_enabled", AttributeType::Bool).required(),
        AttributeSchema::new("auto_scaling_for_storage_enabled", AttributeType::Bool).required(),
        AttributeSchema::new("mtls_connection_required", AttributeType::Bool)
            .force_new()
            .with_default(false),
        AttributeSchema::new("subnet_id", validation::subnet_id())
            .required()
            .force_new(),
        AttributeSchema::new("virtual_network_id", validation::virtual_network_id())
            .required()
            .force_new(),
        tags_attribute(),
        AttributeSchema::new("ocid", AttributeType::String).computed(),
        AttributeSchema::new("lifecycle_state", AttributeType::String).computed(),
        AttributeSchema::new("service_console_url", AttributeType::String).computed(),
    ]
}

/// Both the regular and the clone shape share the fields read here
pub(crate) fn flatten(
    id: &AutonomousDatabaseId,
    database: AutonomousDatabase,
) -> AutonomousDatabaseModel {
    let props = database
        .properties
        .as_ref()
        .map(|p| p.base().clone())
        .unwrap_or_default();
    AutonomousDatabaseModel {
        name: id.name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        location: normalize_location(&database.location),
        // Write-only
        admin_password: None,
        backup_retention_period_in_days: props.backup_retention_period_in_days.unwrap_or_default(),
        character_set: props.character_set.unwrap_or_default(),
        national_character_set: props.ncharacter_set.unwrap_or_default(),
        compute_count: props.compute_count.unwrap_or_default(),
        compute_model: props.compute_model.unwrap_or_default(),
        customer_contacts: contacts_to(props.customer_contacts.as_ref()),
        data_storage_size_in_tbs: props.data_storage_size_in_tbs.unwrap_or_default(),
        db_version: props.db_version.unwrap_or_default(),
        db_workload: props.db_workload.unwrap_or_default(),
        display_name: props.display_name.unwrap_or_default(),
        license_model: props.license_model.unwrap_or_default(),
        auto_scaling_enabled: props.is_auto_scaling_enabled.unwrap_or_default(),
        auto_scaling_for_storage_enabled: props
            .is_auto_scaling_for_storage_enabled
            .unwrap_or_default(),
        mtls_connection_required: props.is_mtls_connection_required.unwrap_or_default(),
        subnet_id: props.subnet_id.unwrap_or_default(),
        virtual_network_id: props.vnet_id.unwrap_or_default(),
        tags: database.tags,
        ocid: props.ocid,
        lifecycle_state: props.lifecycle_state,
        service_console_url: props.service_console_url,
    }
}

fn expand(model: AutonomousDatabaseModel) -> AutonomousDatabase {
    AutonomousDatabase {
        id: None,
        name: None,
        kind: None,
        location: normalize_location(&model.location),
        tags: model.tags,
        zones: None,
        properties: Some(AutonomousDatabaseProperties::Regular(
            AutonomousDatabaseBaseProperties {
                admin_password: model.admin_password,
                backup_retention_period_in_days: Some(model.backup_retention_period_in_days),
                character_set: Some(model.character_set),
                compute_count: Some(model.compute_count),
                compute_model: Some(model.compute_model),
                customer_contacts: contacts_from(&model.customer_contacts),
                data_storage_size_in_tbs: Some(model.data_storage_size_in_tbs),
                db_version: Some(model.db_version),
                db_workload: Some(model.db_workload),
                display_name: Some(model.display_name),
                is_auto_scaling_enabled: Some(model.auto_scaling_enabled),
                is_auto_scaling_for_storage_enabled: Some(model.auto_scaling_for_storage_enabled),
                is_mtls_connection_required: Some(model.mtls_connection_required),
                license_model: Some(model.license_model),
                ncharacter_set: Some(model.national_character_set),
                subnet_id: Some(model.subnet_id),
                vnet_id: Some(model.virtual_network_id),
                ..Default::default()
            },
        )),
    }
}

/// PATCH body carrying only the changed attributes
fn update_body(
    model: AutonomousDatabaseModel,
    changed: &[String],
) -> ResourceUpdate<AutonomousDatabaseUpdateProperties> {
    let pick = |name: &str| has_changed(changed, name);
    let properties = AutonomousDatabaseUpdateProperties {
        backup_retention_period_in_days: pick("backup_retention_period_in_days")
            .then_some(model.backup_retention_period_in_days),
        compute_count: pick("compute_count").then_some(model.compute_count),
        // An empty list clears the contacts
        customer_contacts: pick("customer_contacts")
            .then(|| contacts_from(&model.customer_contacts).unwrap_or_default()),
        data_storage_size_in_tbs: pick("data_storage_size_in_tbs")
            .then_some(model.data_storage_size_in_tbs),
        display_name: pick("display_name").then(|| model.display_name.clone()),
        is_auto_scaling_enabled: pick("auto_scaling_enabled").then_some(model.auto_scaling_enabled),
        is_auto_scaling_for_storage_enabled: pick("auto_scaling_for_storage_enabled")
            .then_some(model.auto_scaling_for_storage_enabled),
    };
    ResourceUpdate {
        tags: pick("tags").then_some(model.tags),
        properties: (!properties.is_empty()).then_some(properties),
    }
}

pub struct AutonomousDatabaseResource;

#[async_trait]
impl OracleResource for AutonomousDatabaseResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "Oracle Autonomous Database Serverless",
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
        let model: AutonomousDatabaseModel = decode_config(resource)?;
        let remote_id = AutonomousDatabaseId::new(
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
        let remote_id = parse_id(id, AutonomousDatabaseId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let Some(database) =
            fetch::<AutonomousDatabase>(ctx, id, &canonical, API_VERSION, self.timeouts().read)
                .await?
        else {
            log::warn!("{} was not found - removing from state", canonical);
            return Ok(State::not_found(id.clone()));
        };
        to_state(id, &canonical, &flatten(&remote_id, database))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, AutonomousDatabaseId::parse(identifier))?.to_string();
        let update = update_body(decode_config(to)?, changed);
        if !update.is_empty() {
            let body = to_body(id, &update)?;
            patch(ctx, id, &remote_id, API_VERSION, body, self.timeouts().update).await?;
        }
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, AutonomousDatabaseId::parse(identifier))?.to_string();
        remove(ctx, id, &remote_id, API_VERSION, self.timeouts().delete).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oradb_core::provider::ErrorKind;
    use oradb_core::resource::Value;
    use serde_json::json;

    use super::*;
    use crate::testing::{SUBSCRIPTION, StubClient, context, resource};

    const VNET: &str = "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet";
    const SUBNET: &str = "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet/subnets/delegated";

    fn database_id() -> String {
        format!(
            "/subscriptions/{}/resourceGroups/rg-ora/providers/Oracle.Database/autonomousDatabases/adb1",
            SUBSCRIPTION
        )
    }

    fn declared(compute_count: f64, contacts: serde_json::Value) -> Resource {
        resource(
            RESOURCE_TYPE,
            "adb",
            json!({
                "name": "adb1",
                "resource_group_name": "rg-ora",
                "location": "West Europe",
                "admin_password": "TestPass#2024Ok",
                "backup_retention_period_in_days": 12,
                "character_set": "AL32UTF8",
                "national_character_set": "AL16UTF16",
                "compute_count": compute_count,
                "compute_model": "ECPU",
                "customer_contacts": contacts,
                "data_storage_size_in_tbs": 1,
                "db_version": "19c",
                "db_workload": "OLTP",
                "display_name": "Example ADB",
                "license_model": "LicenseIncluded",
                "auto_scaling_enabled": false,
                "auto_scaling_for_storage_enabled": true,
                "mtls_connection_required": false,
                "subnet_id": SUBNET,
                "virtual_network_id": VNET,
                "tags": {"team": "data"}
            }),
        )
    }

    #[test]
    fn schema_enforces_ranges_and_name_rule() {
        let schema = AutonomousDatabaseResource.schema();
        assert!(
            schema
                .validate(&declared(2.0, json!(["dba@example.com"])).attributes)
                .is_ok()
        );

        let mut bad = declared(1.0, json!(["not-an-email"]));
        bad.attributes.insert("name".to_string(), Value::from("adb_1"));
        bad.attributes
            .insert("backup_retention_period_in_days".to_string(), Value::Int(61));
        let errors = schema.validate(&bad.attributes).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[tokio::test]
    async fn create_sends_regular_shape_and_reads_back() {
        let stub = Arc::new(StubClient::new());
        stub.compute(json!({
            "ocid": "ocid1.autonomousdatabase.oc1..a",
            "lifecycleState": "Available"
        }));

        let state = AutonomousDatabaseResource
            .create(&context(&stub), &declared(2.0, json!(["dba@example.com"])))
            .await
            .unwrap();

        let put = &stub.puts()[0];
        assert_eq!(put["location"], "westeurope");
        assert_eq!(put["properties"]["dataBaseType"], "Regular");
        assert_eq!(put["properties"]["adminPassword"], "TestPass#2024Ok");
        assert_eq!(put["properties"]["ncharacterSet"], "AL16UTF16");
        assert_eq!(
            put["properties"]["customerContacts"],
            json!([{"email": "dba@example.com"}])
        );

        assert_eq!(state.identifier.as_deref(), Some(database_id().as_str()));
        assert!(!state.attributes.contains_key("admin_password"));
        assert_eq!(state.attributes.get("compute_count"), Some(&Value::Float(2.0)));
        assert_eq!(
            state.attributes.get("national_character_set"),
            Some(&Value::from("AL16UTF16"))
        );
        assert_eq!(
            state.attributes.get("lifecycle_state"),
            Some(&Value::from("Available"))
        );
    }

    #[tokio::test]
    async fn read_flattens_clone_shape() {
        let stub = Arc::new(StubClient::new());
        stub.insert(
            &database_id(),
            json!({
                "location": "eastus",
                "properties": {
                    "dataBaseType": "Clone",
                    "sourceId": "/subscriptions/s/resourceGroups/rg/providers/Oracle.Database/autonomousDatabases/src",
                    "cloneType": "Full",
                    "computeCount": 4.0,
                    "displayName": "copy",
                    "dbWorkload": "DW"
                }
            }),
        );
        let id = ResourceId::new(RESOURCE_TYPE, "adb");
        let state = AutonomousDatabaseResource
            .read(&context(&stub), &id, &database_id())
            .await
            .unwrap();
        assert!(state.exists);
        assert_eq!(state.attributes.get("display_name"), Some(&Value::from("copy")));
        assert_eq!(state.attributes.get("db_workload"), Some(&Value::from("DW")));
        assert_eq!(state.attributes.get("compute_count"), Some(&Value::Float(4.0)));
    }

    #[tokio::test]
    async fn update_patches_compute_and_clears_contacts() {
        let stub = Arc::new(StubClient::new());
        let ctx = context(&stub);
        AutonomousDatabaseResource
            .create(&ctx, &declared(2.0, json!(["dba@example.com"])))
            .await
            .unwrap();

        let id = ResourceId::new(RESOURCE_TYPE, "adb");
        let state = AutonomousDatabaseResource
            .update(
                &ctx,
                &id,
                &database_id(),
                &["compute_count".to_string(), "customer_contacts".to_string()],
                &declared(4.0, json!([])),
            )
            .await
            .unwrap();

        assert_eq!(
            stub.patches(),
            vec![json!({"properties": {"computeCount": 4.0, "customerContacts": []}})]
        );
        assert_eq!(state.attributes.get("compute_count"), Some(&Value::Float(4.0)));
        assert!(!state.attributes.contains_key("customer_contacts"));
    }

    #[tokio::test]
    async fn update_of_deleted_database_fails() {
        let stub = Arc::new(StubClient::new());
        let id = ResourceId::new(RESOURCE_TYPE, "adb");
        let err = AutonomousDatabaseResource
            .update(
                &context(&stub),
                &id,
                &database_id(),
                &["tags".to_string()],
                &declared(2.0, json!([])),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
