//! Oracle Database provider implementation
//!
//! Dispatches each host operation to the matching resource or data source
//! type, applying schema defaults and validation on the way in.

use std::sync::Arc;

use oradb_core::differ::changed_attributes;
use oradb_core::provider::{ProviderError, ProviderResult};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::ResourceSchema;

use crate::client::{ArmClient, ClientError};
use crate::config::ProviderConfig;
use crate::data_sources::{OracleDataSource, data_sources};
use crate::resources::{Context, OracleResource, resources};

/// Oracle Database@Azure provider
pub struct OracleProvider {
    ctx: Context,
    resources: Vec<Box<dyn OracleResource>>,
    data_sources: Vec<Box<dyn OracleDataSource>>,
}

impl OracleProvider {
    /// Create a provider on top of an existing client context
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            resources: resources(),
            data_sources: data_sources(),
        }
    }

    /// Create a provider talking to the resource-manager endpoint in `config`
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ClientError> {
        let client = ArmClient::new(config)?;
        Ok(Self::new(Context::new(
            Arc::new(client),
            config.subscription_id.clone(),
        )))
    }

    pub fn resources(&self) -> &[Box<dyn OracleResource>] {
        &self.resources
    }

    pub fn data_sources(&self) -> &[Box<dyn OracleDataSource>] {
        &self.data_sources
    }

    fn resource(&self, id: &ResourceId) -> ProviderResult<&dyn OracleResource> {
        self.resources
            .iter()
            .find(|r| r.resource_type() == id.resource_type)
            .map(|r| r.as_ref())
            .ok_or_else(|| {
                ProviderError::unsupported(format!("Unknown resource type: {}", id.resource_type))
                    .for_resource(id.clone())
            })
    }

    fn data_source(&self, id: &ResourceId) -> ProviderResult<&dyn OracleDataSource> {
        self.data_sources
            .iter()
            .find(|d| d.data_source_type() == id.resource_type)
            .map(|d| d.as_ref())
            .ok_or_else(|| {
                ProviderError::unsupported(format!(
                    "Unknown data source type: {}",
                    id.resource_type
                ))
                .for_resource(id.clone())
            })
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Read a resource by its identifier
    pub async fn read_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let resource = self.resource(id)?;
        let state = resource.read(&self.ctx, id, identifier).await?;
        if !state.exists {
            log::warn!("{} no longer exists at {}", id, identifier);
        }
        Ok(state)
    }

    /// Create a resource from its configuration
    pub async fn create_resource(&self, mut resource: Resource) -> ProviderResult<State> {
        let resource_type = self.resource(&resource.id)?;
        let schema = resource_type.schema();
        schema.apply_defaults(&mut resource.attributes);
        check(&schema, &resource)?;

        let state = resource_type.create(&self.ctx, &resource).await?;
        log::info!(
            "created {} ({})",
            resource.id,
            state.identifier.as_deref().unwrap_or_default()
        );
        Ok(state)
    }

    /// Update a resource in place
    ///
    /// Only attributes that differ from `from` are sent. A change to anything
    /// the resource type cannot update in place is refused.
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        mut to: Resource,
    ) -> ProviderResult<State> {
        let resource_type = self.resource(id)?;
        let schema = resource_type.schema();
        schema.apply_defaults(&mut to.attributes);
        check(&schema, &to)?;

        let changed = changed_attributes(&schema, &to.attributes, &from.attributes);
        if changed.is_empty() {
            log::debug!("{} is up to date", id);
            return resource_type.read(&self.ctx, id, identifier).await;
        }

        let updatable = resource_type.updatable();
        let fixed: Vec<&str> = changed
            .iter()
            .map(String::as_str)
            .filter(|name| !updatable.contains(name))
            .collect();
        if !fixed.is_empty() {
            return Err(ProviderError::unsupported(format!(
                "cannot update {} in place, the resource must be replaced",
                fixed.join(", ")
            ))
            .for_resource(id.clone()));
        }

        log::debug!("updating {}: {}", id, changed.join(", "));
        let state = resource_type
            .update(&self.ctx, id, identifier, &changed, &to)
            .await?;
        log::info!("updated {}", id);
        Ok(state)
    }

    /// Delete a resource
    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let resource_type = self.resource(id)?;
        resource_type.delete(&self.ctx, id, identifier).await?;
        log::info!("deleted {}", id);
        Ok(())
    }

    /// Evaluate a data source
    pub async fn read_data_source(&self, resource: Resource) -> ProviderResult<State> {
        let data_source = self.data_source(&resource.id)?;
        check(&data_source.schema(), &resource)?;
        data_source.read(&self.ctx, &resource).await
    }
}

/// Validate attributes against the schema, joining every problem into one error
fn check(schema: &ResourceSchema, resource: &Resource) -> ProviderResult<()> {
    schema.validate(&resource.attributes).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        ProviderError::decode(format!("invalid configuration: {}", messages.join("; ")))
            .for_resource(resource.id.clone())
    })
}
