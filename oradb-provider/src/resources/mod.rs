//! Resource definitions
//!
//! Each resource type pairs an attribute schema with Create/Read/Update/Delete
//! against the resource-manager API. The functions in this module carry the
//! steps every resource shares: decoding configuration, the import-conflict
//! guard, error wrapping and turning API models into [`State`].

pub mod autonomous_database;
pub mod autonomous_database_backup;
pub mod cloud_vm_cluster;
pub mod db_system;
pub mod exadata_infrastructure;
pub mod exascale_storage_vault;
pub mod network_anchor;
pub mod resource_anchor;

use std::sync::Arc;

use async_trait::async_trait;
use oradb_core::provider::{ErrorKind, ProviderError, ProviderResult, Timeouts};
use oradb_core::resource::{Resource, ResourceId, State, decode, encode};
use oradb_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::{ClientError, ResourceManagerClient, list_typed, with_timeout};
use crate::helpers::expand_tags;
use crate::ids::IdError;
use crate::models::ResourceUpdate;
use crate::validation;

/// Handles shared by every operation
#[derive(Clone)]
pub struct Context {
    pub client: Arc<dyn ResourceManagerClient>,
    pub subscription_id: String,
}

impl Context {
    pub fn new(client: Arc<dyn ResourceManagerClient>, subscription_id: impl Into<String>) -> Self {
        Self {
            client,
            subscription_id: subscription_id.into(),
        }
    }
}

/// A managed resource type
#[async_trait]
pub trait OracleResource: Send + Sync {
    fn resource_type(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    fn timeouts(&self) -> Timeouts;

    /// Attributes that can change without replacing the resource
    fn updatable(&self) -> &'static [&'static str] {
        &["tags"]
    }

    async fn create(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State>;

    async fn read(&self, ctx: &Context, id: &ResourceId, identifier: &str)
    -> ProviderResult<State>;

    /// Apply `changed`, a non-empty subset of [`OracleResource::updatable`]
    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        identifier: &str,
        changed: &[String],
        to: &Resource,
    ) -> ProviderResult<State>;

    async fn delete(&self, ctx: &Context, id: &ResourceId, identifier: &str)
    -> ProviderResult<()>;
}

/// Returns all resource types supported by this provider
pub fn resources() -> Vec<Box<dyn OracleResource>> {
    vec![
        Box::new(autonomous_database::AutonomousDatabaseResource),
        Box::new(autonomous_database_backup::AutonomousDatabaseBackupResource),
        Box::new(exadata_infrastructure::ExadataInfrastructureResource),
        Box::new(cloud_vm_cluster::CloudVmClusterResource),
        Box::new(exascale_storage_vault::ExascaleStorageVaultResource),
        Box::new(resource_anchor::ResourceAnchorResource),
        Box::new(network_anchor::NetworkAnchorResource),
        Box::new(db_system::DbSystemResource),
    ]
}

// =============================================================================
// Common attributes
// =============================================================================

pub(crate) fn name_attribute() -> AttributeSchema {
    AttributeSchema::new("name", validation::name())
        .required()
        .force_new()
}

pub(crate) fn resource_group_attribute() -> AttributeSchema {
    AttributeSchema::new("resource_group_name", validation::resource_group_name())
        .required()
        .force_new()
}

pub(crate) fn location_attribute() -> AttributeSchema {
    AttributeSchema::new("location", AttributeType::String)
        .required()
        .force_new()
        .with_normalizer(validation::normalize_location_value)
}

pub(crate) fn tags_attribute() -> AttributeSchema {
    AttributeSchema::new("tags", types::tags())
}

/// Schema from a resource type name and its attributes
pub(crate) fn build_schema(
    resource_type: &str,
    description: &str,
    attributes: Vec<AttributeSchema>,
) -> ResourceSchema {
    attributes
        .into_iter()
        .fold(ResourceSchema::new(resource_type), ResourceSchema::attribute)
        .with_description(description)
}

// =============================================================================
// Shared steps
// =============================================================================

/// Wrap a client failure with what was being done and to which resource
pub(crate) fn client_error(id: &ResourceId, action: String, err: ClientError) -> ProviderError {
    let kind = match err {
        ClientError::NotFound { .. } => ErrorKind::NotFound,
        ClientError::Timeout(_) => ErrorKind::Timeout,
        _ => ErrorKind::Remote,
    };
    ProviderError::new(kind, action)
        .with_cause(err)
        .for_resource(id.clone())
}

pub(crate) fn decode_config<T: DeserializeOwned>(resource: &Resource) -> ProviderResult<T> {
    decode(&resource.attributes).map_err(|e| {
        ProviderError::decode("decoding configuration")
            .with_cause(e)
            .for_resource(resource.id.clone())
    })
}

pub(crate) fn parse_id<T>(id: &ResourceId, parsed: Result<T, IdError>) -> ProviderResult<T> {
    parsed.map_err(|e| {
        ProviderError::decode("parsing resource ID")
            .with_cause(e)
            .for_resource(id.clone())
    })
}

/// Encode a flattened model as existing state
pub(crate) fn to_state<T: Serialize>(
    id: &ResourceId,
    identifier: &str,
    model: &T,
) -> ProviderResult<State> {
    let attributes = encode(model).map_err(|e| {
        ProviderError::decode("encoding state")
            .with_cause(e)
            .for_resource(id.clone())
    })?;
    Ok(State::existing(id.clone(), attributes).with_identifier(identifier))
}

/// Refuse to adopt an object that already exists remotely
pub(crate) async fn ensure_absent(
    ctx: &Context,
    id: &ResourceId,
    resource_type: &str,
    remote_id: &str,
    api_version: &str,
    timeout: std::time::Duration,
) -> ProviderResult<()> {
    match with_timeout(timeout, ctx.client.get(remote_id, api_version)).await {
        Ok(_) => Err(
            ProviderError::import_conflict(resource_type, remote_id).for_resource(id.clone()),
        ),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(client_error(
            id,
            format!("checking for presence of existing {}", remote_id),
            e,
        )),
    }
}

/// GET and decode; `Ok(None)` when the object is gone
pub(crate) async fn fetch<T: DeserializeOwned>(
    ctx: &Context,
    id: &ResourceId,
    remote_id: &str,
    api_version: &str,
    timeout: std::time::Duration,
) -> ProviderResult<Option<T>> {
    match with_timeout(timeout, ctx.client.get(remote_id, api_version)).await {
        Ok(body) => serde_json::from_value(body).map(Some).map_err(|e| {
            ProviderError::decode(format!("decoding {}", remote_id))
                .with_cause(e)
                .for_resource(id.clone())
        }),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(client_error(id, format!("retrieving {}", remote_id), e)),
    }
}

/// List and decode every child of a collection
pub(crate) async fn list<T: DeserializeOwned>(
    ctx: &Context,
    id: &ResourceId,
    collection_id: &str,
    api_version: &str,
    timeout: std::time::Duration,
) -> ProviderResult<Vec<T>> {
    with_timeout(
        timeout,
        list_typed(ctx.client.as_ref(), collection_id, api_version),
    )
    .await
    .map_err(|e| client_error(id, format!("listing {}", collection_id), e))
}

/// Serialize a request model
pub(crate) fn to_body<T: Serialize>(id: &ResourceId, model: &T) -> ProviderResult<serde_json::Value> {
    serde_json::to_value(model).map_err(|e| {
        ProviderError::decode("encoding request")
            .with_cause(e)
            .for_resource(id.clone())
    })
}

/// PUT a new object and wait for it to be provisioned
pub(crate) async fn put(
    ctx: &Context,
    id: &ResourceId,
    remote_id: &str,
    api_version: &str,
    body: serde_json::Value,
    timeout: std::time::Duration,
) -> ProviderResult<()> {
    ctx.client
        .create_or_update_then_poll(remote_id, api_version, body, timeout)
        .await
        .map_err(|e| client_error(id, format!("creating {}", remote_id), e))?;
    log::info!("created {}", remote_id);
    Ok(())
}

/// PATCH an object and wait for the update to finish
pub(crate) async fn patch(
    ctx: &Context,
    id: &ResourceId,
    remote_id: &str,
    api_version: &str,
    body: serde_json::Value,
    timeout: std::time::Duration,
) -> ProviderResult<()> {
    ctx.client
        .update_then_poll(remote_id, api_version, body, timeout)
        .await
        .map_err(|e| client_error(id, format!("updating {}", remote_id), e))?;
    log::info!("updated {}", remote_id);
    Ok(())
}

/// DELETE an object and wait until it is gone
pub(crate) async fn remove(
    ctx: &Context,
    id: &ResourceId,
    remote_id: &str,
    api_version: &str,
    timeout: std::time::Duration,
) -> ProviderResult<()> {
    ctx.client
        .delete_then_poll(remote_id, api_version, timeout)
        .await
        .map_err(|e| client_error(id, format!("deleting {}", remote_id), e))?;
    log::info!("deleted {}", remote_id);
    Ok(())
}

/// PATCH only the tags of an object
pub(crate) async fn update_tags(
    ctx: &Context,
    id: &ResourceId,
    remote_id: &str,
    api_version: &str,
    to: &Resource,
    timeout: std::time::Duration,
) -> ProviderResult<()> {
    let update = ResourceUpdate::<serde_json::Value> {
        tags: Some(expand_tags(to.attributes.get("tags"))),
        properties: None,
    };
    patch(ctx, id, remote_id, api_version, to_body(id, &update)?, timeout).await
}

/// Read back after a mutation; the object must exist
pub(crate) fn expect_exists(state: State, remote_id: &str) -> ProviderResult<State> {
    if state.exists {
        Ok(state)
    } else {
        Err(
            ProviderError::not_found(format!("{} disappeared after it was written", remote_id))
                .for_resource(state.id),
        )
    }
}

/// Whether an attribute is in the changed set
pub(crate) fn has_changed(changed: &[String], name: &str) -> bool {
    changed.iter().any(|c| c == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubClient, context as ctx};

    const ANCHOR: &str = "/subscriptions/sub/resourceGroups/rg/providers/Oracle.Database/resourceAnchors/a1";

    #[tokio::test]
    async fn ensure_absent_reports_import_conflict() {
        let stub = Arc::new(StubClient::new());
        stub.insert(ANCHOR, serde_json::json!({"id": ANCHOR, "location": "global"}));
        let id = ResourceId::new("oracle_resource_anchor", "a1");

        let err = ensure_absent(
            &ctx(&stub),
            &id,
            "oracle_resource_anchor",
            ANCHOR,
            "2025-09-01",
            std::time::Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ImportConflict);
        assert!(err.message.contains(ANCHOR));
    }

    #[tokio::test]
    async fn fetch_maps_missing_object_to_none() {
        let stub = Arc::new(StubClient::new());
        let id = ResourceId::new("oracle_resource_anchor", "a1");
        let got: Option<serde_json::Value> = fetch(
            &ctx(&stub),
            &id,
            ANCHOR,
            "2025-09-01",
            std::time::Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn remote_failures_keep_the_cause() {
        let stub = Arc::new(StubClient::new());
        stub.fail_next(ClientError::Status {
            status: 409,
            code: "Conflict".to_string(),
            message: "busy".to_string(),
        });
        let id = ResourceId::new("oracle_resource_anchor", "a1");
        let err = remove(
            &ctx(&stub),
            &id,
            ANCHOR,
            "2025-09-01",
            std::time::Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Remote);
        assert!(err.to_string().contains("busy"));
        assert!(err.to_string().starts_with("[oracle_resource_anchor.a1] deleting"));
    }

    #[tokio::test]
    async fn delete_of_missing_object_is_an_error() {
        let stub = Arc::new(StubClient::new());
        let id = ResourceId::new("oracle_resource_anchor", "a1");
        let err = remove(
            &ctx(&stub),
            &id,
            ANCHOR,
            "2025-09-01",
            std::time::Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn every_resource_declares_its_schema() {
        for resource in resources() {
            let schema = resource.schema();
            assert_eq!(schema.resource_type, resource.resource_type());
            assert!(schema.attributes.contains_key("name"));
            for name in resource.updatable() {
                let attr = schema.attributes.get(*name).unwrap();
                assert!(!attr.force_new, "{} is updatable", name);
            }
        }
    }
}
