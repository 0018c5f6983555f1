//! oradb Oracle Database@Azure Provider
//!
//! Manages Oracle Database@Azure services through the Azure resource-manager
//! API under the `Oracle.Database` namespace.
//!
//! ## Module Structure
//!
//! - `client` - Resource-manager client seam and its HTTPS implementation
//! - `config` - Provider configuration
//! - `data_sources` - Read-only data source definitions
//! - `helpers` - Backup lookup, hostname and tag helpers
//! - `ids` - Typed resource identifiers
//! - `models` - Wire models for each API shape
//! - `provider` - OracleProvider implementation
//! - `resources` - Resource type definitions and their CRUD
//! - `validation` - Name, password and reference validation

pub mod client;
pub mod config;
pub mod data_sources;
pub mod helpers;
pub mod ids;
pub mod models;
pub mod provider;
pub mod resources;
pub mod validation;

#[cfg(test)]
mod testing;

// Re-export main types
pub use client::{ArmClient, ClientError, ResourceManagerClient};
pub use config::{ConfigError, ProviderConfig};
pub use provider::OracleProvider;
pub use resources::Context;

use oradb_core::provider::{
    BoxFuture, DataSourceType, Provider, ProviderResult, ResourceType, Timeouts,
};
use oradb_core::resource::{Resource, ResourceId, State};
use oradb_core::schema::ResourceSchema;

/// Resource type description handed to the host
struct OracleResourceType {
    name: &'static str,
    schema: ResourceSchema,
    timeouts: Timeouts,
}

impl ResourceType for OracleResourceType {
    fn name(&self) -> &'static str {
        self.name
    }

    fn schema(&self) -> ResourceSchema {
        self.schema.clone()
    }

    fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}

/// Data source type description handed to the host
struct OracleDataSourceType {
    name: &'static str,
    schema: ResourceSchema,
}

impl DataSourceType for OracleDataSourceType {
    fn name(&self) -> &'static str {
        self.name
    }

    fn schema(&self) -> ResourceSchema {
        self.schema.clone()
    }
}

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for OracleProvider {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        self.resources()
            .iter()
            .map(|r| {
                Box::new(OracleResourceType {
                    name: r.resource_type(),
                    schema: r.schema(),
                    timeouts: r.timeouts(),
                }) as Box<dyn ResourceType>
            })
            .collect()
    }

    fn data_source_types(&self) -> Vec<Box<dyn DataSourceType>> {
        self.data_sources()
            .iter()
            .map(|d| {
                Box::new(OracleDataSourceType {
                    name: d.data_source_type(),
                    schema: d.schema(),
                }) as Box<dyn DataSourceType>
            })
            .collect()
    }

    fn read(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.read_resource(&id, &identifier).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, to).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.read_data_source(resource).await })
    }
}
