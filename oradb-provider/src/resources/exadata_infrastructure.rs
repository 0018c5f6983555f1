//! oracle_exadata_infrastructure

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
use crate::ids::{CloudExadataInfrastructureId, normalize_location};
use crate::models::API_VERSION_2024_06_01 as API_VERSION;
use crate::models::exadata::{
    CloudExadataInfrastructure, CloudExadataInfrastructureProperties, MaintenanceWindow,
};
use crate::models::{Named, contacts_from, contacts_to};
use crate::validation;

pub const RESOURCE_TYPE: &str = "oracle_exadata_infrastructure";

pub const DAYS_OF_WEEK: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const MONTHS: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExadataInfrastructureModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub zones: Vec<String>,
    pub compute_count: i64,
    pub storage_count: i64,
    pub shape: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customer_contacts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_server_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_server_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintenance_window: Vec<MaintenanceWindowModel>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_size_in_gbs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_storage_size_in_gbs: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceWindowModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patching_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_in_weeks: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weeks_of_month: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hours_of_day: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_action_timeout_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_action_timeout_in_mins: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_patching_enabled: Option<bool>,
}

impl MaintenanceWindowModel {
    fn expand(self) -> MaintenanceWindow {
        let named = |names: Vec<String>| {
            (!names.is_empty()).then(|| names.into_iter().map(|name| Named { name }).collect())
        };
        let non_empty = |v: Vec<i64>| (!v.is_empty()).then_some(v);
        MaintenanceWindow {
            preference: self.preference,
            patching_mode: self.patching_mode,
            lead_time_in_weeks: self.lead_time_in_weeks,
            months: named(self.months),
            weeks_of_month: non_empty(self.weeks_of_month),
            days_of_week: named(self.days_of_week),
            hours_of_day: non_empty(self.hours_of_day),
            is_custom_action_timeout_enabled: self.custom_action_timeout_enabled,
            custom_action_timeout_in_mins: self.custom_action_timeout_in_mins,
            is_monthly_patching_enabled: self.monthly_patching_enabled,
        }
    }

    fn flatten(window: MaintenanceWindow) -> Self {
        let names = |v: Option<Vec<Named>>| {
            v.unwrap_or_default()
                .into_iter()
                .map(|n| n.name)
                .collect()
        };
        Self {
            preference: window.preference,
            patching_mode: window.patching_mode,
            lead_time_in_weeks: window.lead_time_in_weeks,
            months: names(window.months),
            weeks_of_month: window.weeks_of_month.unwrap_or_default(),
            days_of_week: names(window.days_of_week),
            hours_of_day: window.hours_of_day.unwrap_or_default(),
            custom_action_timeout_enabled: window.is_custom_action_timeout_enabled,
            custom_action_timeout_in_mins: window.custom_action_timeout_in_mins,
            monthly_patching_enabled: window.is_monthly_patching_enabled,
        }
    }
}

fn maintenance_window_attributes() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new(
            "preference",
            AttributeType::one_of(&["NoPreference", "CustomPreference"]),
        ),
        AttributeSchema::new(
            "patching_mode",
            AttributeType::one_of(&["Rolling", "NonRolling"]),
        ),
        AttributeSchema::new("lead_time_in_weeks", AttributeType::Int)
            .with_constraint(Constraint::IntRange { min: 1, max: 4 }),
        AttributeSchema::new(
            "months",
            AttributeType::List(Box::new(AttributeType::one_of(MONTHS))),
        ),
        AttributeSchema::new("weeks_of_month", AttributeType::List(Box::new(AttributeType::Int))),
        AttributeSchema::new(
            "days_of_week",
            AttributeType::List(Box::new(AttributeType::one_of(DAYS_OF_WEEK))),
        ),
        AttributeSchema::new("hours_of_day", AttributeType::List(Box::new(AttributeType::Int))),
        AttributeSchema::new("custom_action_timeout_enabled", AttributeType::Bool),
        AttributeSchema::new("custom_action_timeout_in_mins", AttributeType::Int)
            .with_constraint(Constraint::IntRange { min: 0, max: 120 }),
        AttributeSchema::new("monthly_patching_enabled", AttributeType::Bool),
    ]
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
        AttributeSchema::new("compute_count", AttributeType::Int)
            .required()
            .force_new()
            .with_constraint(Constraint::IntRange { min: 2, max: 32 }),
        AttributeSchema::new("storage_count", AttributeType::Int)
            .required()
            .force_new()
            .with_constraint(Constraint::IntRange { min: 3, max: 64 }),
        AttributeSchema::new("shape", AttributeType::String)
            .required()
            .force_new()
            .with_description("Exadata system model, e.g. Exadata.X9M"),
        AttributeSchema::new("display_name", AttributeType::String)
            .required()
            .force_new()
            .with_constraint(Constraint::Length { min: 1, max: 255 }),
        AttributeSchema::new(
            "customer_contacts",
            AttributeType::List(Box::new(validation::email())),
        )
        .force_new(),
        AttributeSchema::new("database_server_type", AttributeType::String)
            .optional_computed()
            .force_new(),
        AttributeSchema::new("storage_server_type", AttributeType::String)
            .optional_computed()
            .force_new(),
        AttributeSchema::new(
            "maintenance_window",
            AttributeType::single_block(maintenance_window_attributes()),
        )
        .optional_computed()
        .force_new(),
        tags_attribute(),
        AttributeSchema::new("ocid", AttributeType::String).computed(),
        AttributeSchema::new("lifecycle_state", AttributeType::String).computed(),
        AttributeSchema::new("cpu_count", AttributeType::Int).computed(),
        AttributeSchema::new("memory_size_in_gbs", AttributeType::Int).computed(),
        AttributeSchema::new("total_storage_size_in_gbs", AttributeType::Int).computed(),
    ]
}

pub(crate) fn flatten(
    id: &CloudExadataInfrastructureId,
    infra: CloudExadataInfrastructure,
) -> ExadataInfrastructureModel {
    let props = infra.properties.unwrap_or_default();
    ExadataInfrastructureModel {
        name: id.name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        location: normalize_location(&infra.location),
        zones: infra.zones.unwrap_or_default(),
        compute_count: props.compute_count,
        storage_count: props.storage_count,
        shape: props.shape,
        display_name: props.display_name,
        customer_contacts: contacts_to(props.customer_contacts.as_ref()),
        database_server_type: props.database_server_type,
        storage_server_type: props.storage_server_type,
        maintenance_window: props
            .maintenance_window
            .map(MaintenanceWindowModel::flatten)
            .into_iter()
            .collect(),
        tags: infra.tags,
        ocid: props.ocid,
        lifecycle_state: props.lifecycle_state,
        cpu_count: props.cpu_count,
        memory_size_in_gbs: props.memory_size_in_gbs,
        total_storage_size_in_gbs: props.total_storage_size_in_gbs,
    }
}

fn expand(model: ExadataInfrastructureModel) -> CloudExadataInfrastructure {
    CloudExadataInfrastructure {
        location: normalize_location(&model.location),
        tags: model.tags,
        zones: Some(model.zones),
        properties: Some(CloudExadataInfrastructureProperties {
            compute_count: model.compute_count,
            storage_count: model.storage_count,
            shape: model.shape,
            display_name: model.display_name,
            customer_contacts: contacts_from(&model.customer_contacts),
            database_server_type: model.database_server_type,
            storage_server_type: model.storage_server_type,
            maintenance_window: model
                .maintenance_window
                .into_iter()
                .next()
                .map(MaintenanceWindowModel::expand),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub struct ExadataInfrastructureResource;

#[async_trait]
impl OracleResource for ExadataInfrastructureResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "Cloud Exadata infrastructure",
            schema_attributes(),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::minutes(120, 5, 30, 60)
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let model: ExadataInfrastructureModel = decode_config(resource)?;
        let remote_id = CloudExadataInfrastructureId::new(
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
        let remote_id = parse_id(id, CloudExadataInfrastructureId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let Some(infra) = fetch::<CloudExadataInfrastructure>(
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
        to_state(id, &canonical, &flatten(&remote_id, infra))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        _changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State> {
        let remote_id = parse_id(id, CloudExadataInfrastructureId::parse(identifier))?.to_string();
        update_tags(ctx, id, &remote_id, API_VERSION, to, self.timeouts().update).await?;
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, CloudExadataInfrastructureId::parse(identifier))?.to_string();
        remove(ctx, id, &remote_id, API_VERSION, self.timeouts().delete).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oradb_core::resource::Value;
    use oradb_core::schema::TypeError;
    use serde_json::json;

    use super::*;
    use crate::testing::{SUBSCRIPTION, StubClient, context, resource};

    fn declared() -> Resource {
        resource(
            RESOURCE_TYPE,
            "exa",
            json!({
                "name": "exa1",
                "resource_group_name": "rg-ora",
                "location": "eastus",
                "zones": ["1"],
                "compute_count": 2,
                "storage_count": 3,
                "shape": "Exadata.X9M",
                "display_name": "exa1",
                "customer_contacts": ["dba@example.com"],
                "maintenance_window": [{
                    "preference": "CustomPreference",
                    "patching_mode": "Rolling",
                    "lead_time_in_weeks": 1,
                    "months": ["January", "July"],
                    "weeks_of_month": [2],
                    "days_of_week": ["Sunday"],
                    "hours_of_day": [4]
                }],
                "tags": {"env": "test"}
            }),
        )
    }

    #[test]
    fn schema_checks_counts_and_window() {
        let schema = ExadataInfrastructureResource.schema();
        assert!(schema.validate(&declared().attributes).is_ok());

        let mut bad = declared();
        bad.attributes
            .insert("storage_count".to_string(), Value::Int(2));
        bad.attributes.insert(
            "maintenance_window".to_string(),
            Value::List(vec![
                Value::Map(Default::default()),
                Value::Map(Default::default()),
            ]),
        );
        let errors = schema.validate(&bad.attributes).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            TypeError::ConstraintViolated { name, .. } if name == "storage_count"
        )));
    }

    #[tokio::test]
    async fn maintenance_window_round_trips() {
        let stub = Arc::new(StubClient::new());
        stub.compute(json!({"ocid": "ocid1.exa.oc1..x", "lifecycleState": "Available"}));

        let state = ExadataInfrastructureResource
            .create(&context(&stub), &declared())
            .await
            .unwrap();

        let put = &stub.puts()[0];
        assert_eq!(put["zones"], json!(["1"]));
        assert_eq!(
            put["properties"]["customerContacts"],
            json!([{"email": "dba@example.com"}])
        );
        assert_eq!(
            put["properties"]["maintenanceWindow"]["months"],
            json!([{"name": "January"}, {"name": "July"}])
        );
        assert_eq!(
            put["properties"]["maintenanceWindow"]["daysOfWeek"],
            json!([{"name": "Sunday"}])
        );

        assert_eq!(
            state.identifier.as_deref(),
            Some(
                format!(
                    "/subscriptions/{}/resourceGroups/rg-ora/providers/Oracle.Database/cloudExadataInfrastructures/exa1",
                    SUBSCRIPTION
                )
                .as_str()
            )
        );
        assert_eq!(state.attributes.get("maintenance_window"), declared().attributes.get("maintenance_window"));
        assert_eq!(state.attributes.get("customer_contacts"), declared().attributes.get("customer_contacts"));
        assert_eq!(state.attributes.get("lifecycle_state"), Some(&Value::from("Available")));
    }
}
