//! State file structures for persisting tracked resources

use std::collections::HashMap;

use oradb_core::resource::{ResourceId, State, Value};
use oradb_core::schema::ResourceSchema;
use serde::{Deserialize, Serialize};

/// The state file persisted by a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file format version
    pub version: u32,
    /// Incremented on every write
    pub serial: u64,
    /// Unique identifier for this state lineage (prevents accidental overwrites)
    pub lineage: String,
    /// Version of oradb that last wrote this state
    pub oradb_version: String,
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    /// Current state file format version
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            serial: 0,
            lineage: uuid::Uuid::new_v4().to_string(),
            oradb_version: env!("CARGO_PKG_VERSION").to_string(),
            resources: Vec::new(),
        }
    }

    /// Increment serial and stamp the oradb version for a new write
    pub fn increment_serial(&mut self) {
        self.serial += 1;
        self.oradb_version = env!("CARGO_PKG_VERSION").to_string();
    }

    pub fn find_resource(&self, resource_type: &str, name: &str) -> Option<&ResourceState> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type && r.name == name)
    }

    /// Add or replace the entry for a resource, keeping its position
    pub fn upsert_resource(&mut self, resource: ResourceState) {
        match self
            .resources
            .iter_mut()
            .find(|r| r.resource_type == resource.resource_type && r.name == resource.name)
        {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
    }

    pub fn remove_resource(&mut self, resource_type: &str, name: &str) -> Option<ResourceState> {
        let pos = self
            .resources
            .iter()
            .position(|r| r.resource_type == resource_type && r.name == name)?;
        Some(self.resources.remove(pos))
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracked state of a single resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type (e.g., "oracle_autonomous_database")
    pub resource_type: String,
    /// Resource name from the configuration
    pub name: String,
    /// Remote resource ID
    pub identifier: String,
    /// Attributes as last read, sensitive values redacted
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl ResourceState {
    /// Record an existing resource, redacting the attributes `schema` marks sensitive
    ///
    /// Returns `None` when the state carries no identifier.
    pub fn from_state(state: &State, schema: &ResourceSchema) -> Option<Self> {
        let identifier = state.identifier.clone()?;
        let attributes = schema
            .redact(&state.attributes)
            .into_iter()
            .map(|(k, v)| (k, v.to_json()))
            .collect();
        Some(Self {
            resource_type: state.id.resource_type.clone(),
            name: state.id.name.clone(),
            identifier,
            attributes,
        })
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::new(&self.resource_type, &self.name)
    }

    /// The tracked state as the provider sees it
    pub fn to_state(&self) -> State {
        let attributes = self
            .attributes
            .iter()
            .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
            .collect();
        State::existing(self.resource_id(), attributes).with_identifier(&self.identifier)
    }
}
