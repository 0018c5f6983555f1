//! oracle_resource_anchor

use std::collections::BTreeMap;

use async_trait::async_trait;
use oradb_core::provider::{ProviderResult, Timeouts};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use serde::{Deserialize, Serialize};

use super::{
    Context, OracleResource, build_schema, decode_config, ensure_absent, expect_exists, fetch,
    name_attribute, parse_id, put, remove, resource_group_attribute, tags_attribute, to_body,
    to_state, update_tags,
};
use crate::ids::ResourceAnchorId;
use crate::models::API_VERSION_2025_09_01 as API_VERSION;
use crate::models::anchors::{RESOURCE_ANCHOR_LOCATION, ResourceAnchor, ResourceAnchorProperties};

pub const RESOURCE_TYPE: &str = "oracle_resource_anchor";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAnchorModel {
    pub name: String,
    pub resource_group_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_compartment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

pub(crate) fn schema_attributes() -> Vec<AttributeSchema> {
    vec![
        name_attribute(),
        resource_group_attribute(),
        tags_attribute(),
        AttributeSchema::new("linked_compartment_id", AttributeType::String)
            .computed()
            .with_description("OCI compartment linked to this anchor"),
        AttributeSchema::new("provisioning_state", AttributeType::String).computed(),
    ]
}

pub(crate) fn flatten(id: &ResourceAnchorId, anchor: ResourceAnchor) -> ResourceAnchorModel {
    let props = anchor.properties.unwrap_or_default();
    ResourceAnchorModel {
        name: id.name.clone(),
        resource_group_name: id.resource_group_name.clone(),
        tags: anchor.tags,
        linked_compartment_id: props.linked_compartment_id,
        provisioning_state: props.provisioning_state,
    }
}

pub struct ResourceAnchorResource;

#[async_trait]
impl OracleResource for ResourceAnchorResource {
    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            RESOURCE_TYPE,
            "Anchor linking an Azure resource group to an OCI compartment",
            schema_attributes(),
        )
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::minutes(30, 5, 30, 30)
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let model: ResourceAnchorModel = decode_config(resource)?;
        let remote_id =
            ResourceAnchorId::new(&ctx.subscription_id, &model.resource_group_name, &model.name)
                .to_string();
        let timeouts = self.timeouts();

        ensure_absent(ctx, &resource.id, RESOURCE_TYPE, &remote_id, API_VERSION, timeouts.read)
            .await?;

        let body = ResourceAnchor {
            location: RESOURCE_ANCHOR_LOCATION.to_string(),
            tags: model.tags,
            properties: Some(ResourceAnchorProperties::default()),
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
        let remote_id = parse_id(id, ResourceAnchorId::parse(identifier))?;
        let canonical = remote_id.to_string();
        let Some(anchor) =
            fetch::<ResourceAnchor>(ctx, id, &canonical, API_VERSION, self.timeouts().read).await?
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
        let remote_id = parse_id(id, ResourceAnchorId::parse(identifier))?.to_string();
        update_tags(ctx, id, &remote_id, API_VERSION, to, self.timeouts().update).await?;
        expect_exists(self.read(ctx, id, &remote_id).await?, &remote_id)
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let remote_id = parse_id(id, ResourceAnchorId::parse(identifier))?.to_string();
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
    use crate::testing::{Call, SUBSCRIPTION, StubClient, context, resource};

    fn anchor_id() -> String {
        format!(
            "/subscriptions/{}/resourceGroups/rg-ora/providers/Oracle.Database/resourceAnchors/anchor1",
            SUBSCRIPTION
        )
    }

    fn declared(tags: serde_json::Value) -> Resource {
        resource(
            RESOURCE_TYPE,
            "main",
            json!({"name": "anchor1", "resource_group_name": "rg-ora", "tags": tags}),
        )
    }

    #[tokio::test]
    async fn create_then_read_round_trips_fields() {
        let stub = Arc::new(StubClient::new());
        stub.compute(json!({"linkedCompartmentId": "ocid1.compartment.oc1..abc"}));
        let ctx = context(&stub);

        let state = ResourceAnchorResource
            .create(&ctx, &declared(json!({"env": "dev"})))
            .await
            .unwrap();

        assert_eq!(state.identifier.as_deref(), Some(anchor_id().as_str()));
        assert_eq!(state.attributes.get("name"), Some(&Value::from("anchor1")));
        assert_eq!(
            state.attributes.get("linked_compartment_id"),
            Some(&Value::from("ocid1.compartment.oc1..abc"))
        );
        let put = &stub.puts()[0];
        assert_eq!(put["location"], "global");
        assert_eq!(put["tags"]["env"], "dev");
    }

    #[tokio::test]
    async fn create_refuses_existing_anchor() {
        let stub = Arc::new(StubClient::new());
        stub.insert(&anchor_id(), json!({"location": "global"}));

        let err = ResourceAnchorResource
            .create(&context(&stub), &declared(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ImportConflict);
        assert!(stub.puts().is_empty());
    }

    #[tokio::test]
    async fn read_of_deleted_anchor_clears_identifier() {
        let stub = Arc::new(StubClient::new());
        let id = ResourceId::new(RESOURCE_TYPE, "main");
        let state = ResourceAnchorResource
            .read(&context(&stub), &id, &anchor_id())
            .await
            .unwrap();
        assert!(!state.exists);
        assert!(state.identifier.is_none());
    }

    #[tokio::test]
    async fn read_rejects_malformed_identifier() {
        let stub = Arc::new(StubClient::new());
        let id = ResourceId::new(RESOURCE_TYPE, "main");
        let err = ResourceAnchorResource
            .read(&context(&stub), &id, "/subscriptions/x/resourceGroups/rg")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn update_patches_only_tags() {
        let stub = Arc::new(StubClient::new());
        let ctx = context(&stub);
        ResourceAnchorResource
            .create(&ctx, &declared(json!({"env": "dev"})))
            .await
            .unwrap();

        let id = ResourceId::new(RESOURCE_TYPE, "main");
        let state = ResourceAnchorResource
            .update(
                &ctx,
                &id,
                &anchor_id(),
                &["tags".to_string()],
                &declared(json!({"env": "prod"})),
            )
            .await
            .unwrap();

        assert_eq!(stub.patches(), vec![json!({"tags": {"env": "prod"}})]);
        let Some(Value::Map(tags)) = state.attributes.get("tags") else {
            panic!("tags missing");
        };
        assert_eq!(tags.get("env"), Some(&Value::from("prod")));
    }

    #[tokio::test]
    async fn delete_removes_anchor() {
        let stub = Arc::new(StubClient::new());
        stub.insert(&anchor_id(), json!({"location": "global"}));
        let id = ResourceId::new(RESOURCE_TYPE, "main");

        ResourceAnchorResource
            .delete(&context(&stub), &id, &anchor_id())
            .await
            .unwrap();
        assert_eq!(stub.calls(), vec![Call::Delete(anchor_id())]);
        assert!(stub.object(&anchor_id()).is_none());
    }
}
