//! Data source definitions
//!
//! Data sources read remote objects without managing them. A lookup that
//! finds nothing is an error: the configuration depends on the object.

pub mod autonomous_database;
pub mod db_system;
pub mod exadata;
pub mod lookup;

use std::time::Duration;

use async_trait::async_trait;
use oradb_core::provider::{ProviderError, ProviderResult};
use oradb_core::resource::{Resource, State};
use oradb_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::resources::Context;

/// Deadline for every data source read
pub(crate) const READ_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// A read-only data source type
#[async_trait]
pub trait OracleDataSource: Send + Sync {
    fn data_source_type(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State>;
}

/// Returns all data source types supported by this provider
pub fn data_sources() -> Vec<Box<dyn OracleDataSource>> {
    let mut sources = lookup::lookups();
    sources.push(Box::new(autonomous_database::BackupsDataSource));
    sources.push(Box::new(autonomous_database::CharacterSetsDataSource));
    sources.push(Box::new(exadata::DbServersDataSource));
    sources.push(Box::new(exadata::DbNodesDataSource));
    sources.push(Box::new(exadata::GiVersionsDataSource));
    sources.push(Box::new(db_system::DbSystemShapesDataSource));
    sources
}

/// Input attribute of a data source
pub(crate) fn argument(name: &str, attr_type: AttributeType) -> AttributeSchema {
    AttributeSchema::new(name, attr_type).required()
}

/// Computed list of nested objects
pub(crate) fn computed_list(name: &str, attributes: Vec<AttributeSchema>) -> AttributeSchema {
    AttributeSchema::new(
        name,
        AttributeType::Block {
            attributes: attributes
                .into_iter()
                .map(AttributeSchema::into_computed)
                .collect(),
            max_items: None,
        },
    )
    .computed()
}

/// Data source lookups never come back empty
pub(crate) fn missing(resource: &Resource, what: &str) -> ProviderError {
    ProviderError::not_found(format!("{} was not found", what)).for_resource(resource.id.clone())
}
