//! In-memory resource-manager client for tests

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use oradb_core::resource::{Resource, attributes_from_json};
use serde_json::{Map, Value, json};

use crate::client::{ClientError, ClientResult, ResourceManagerClient};
use crate::resources::Context;

pub(crate) const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

pub(crate) fn context(stub: &Arc<StubClient>) -> Context {
    Context::new(stub.clone(), SUBSCRIPTION)
}

/// Declared resource from a JSON attribute object
pub(crate) fn resource(resource_type: &str, name: &str, attributes: Value) -> Resource {
    let mut resource = Resource::new(resource_type, name);
    resource.attributes = attributes_from_json(&attributes);
    resource
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Get(String),
    Put(String, Value),
    Patch(String, Value),
    Delete(String),
    List(String),
}

/// Stores objects by ID and answers like the API would
///
/// PUT bodies gain `id`, `name` and a succeeded `provisioningState`, plus any
/// properties registered with [`StubClient::compute`]. Write-only properties
/// (`adminPassword`) are dropped. PATCH merges tags and properties.
#[derive(Default)]
pub(crate) struct StubClient {
    objects: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<ClientError>>,
    computed: Mutex<Map<String, Value>>,
}

impl StubClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, id: &str, body: Value) {
        self.objects
            .lock()
            .unwrap()
            .insert(id.to_lowercase(), body);
    }

    pub(crate) fn object(&self, id: &str) -> Option<Value> {
        self.objects.lock().unwrap().get(&id.to_lowercase()).cloned()
    }

    /// Properties the API sets on every created object
    pub(crate) fn compute(&self, properties: Value) {
        if let Value::Object(map) = properties {
            self.computed.lock().unwrap().extend(map);
        }
    }

    /// Make the next call fail with `err`
    pub(crate) fn fail_next(&self, err: ClientError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn patches(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Patch(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn puts(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Put(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> ClientResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> ClientError {
        ClientError::NotFound { id: id.to_string() }
    }
}

#[async_trait]
impl ResourceManagerClient for StubClient {
    async fn get(&self, id: &str, _api_version: &str) -> ClientResult<Value> {
        self.record(Call::Get(id.to_string()))?;
        self.object(id).ok_or_else(|| Self::not_found(id))
    }

    async fn create_or_update_then_poll(
        &self,
        id: &str,
        _api_version: &str,
        body: Value,
        _timeout: Duration,
    ) -> ClientResult<()> {
        self.record(Call::Put(id.to_string(), body.clone()))?;

        let mut stored = body;
        let name = id.rsplit('/').next().unwrap_or_default();
        stored["id"] = json!(id);
        stored["name"] = json!(name);
        let mut properties = match stored.get("properties") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        properties.remove("adminPassword");
        properties.insert("provisioningState".to_string(), json!("Succeeded"));
        for (k, v) in self.computed.lock().unwrap().iter() {
            properties.entry(k.clone()).or_insert_with(|| v.clone());
        }
        stored["properties"] = Value::Object(properties);
        self.insert(id, stored);
        Ok(())
    }

    async fn update_then_poll(
        &self,
        id: &str,
        _api_version: &str,
        body: Value,
        _timeout: Duration,
    ) -> ClientResult<()> {
        self.record(Call::Patch(id.to_string(), body.clone()))?;

        let mut stored = self.object(id).ok_or_else(|| Self::not_found(id))?;
        if let Some(tags) = body.get("tags") {
            stored["tags"] = tags.clone();
        }
        if let Some(Value::Object(changes)) = body.get("properties") {
            if !stored["properties"].is_object() {
                stored["properties"] = json!({});
            }
            for (k, v) in changes {
                stored["properties"][k] = v.clone();
            }
        }
        self.insert(id, stored);
        Ok(())
    }

    async fn delete_then_poll(
        &self,
        id: &str,
        _api_version: &str,
        _timeout: Duration,
    ) -> ClientResult<()> {
        self.record(Call::Delete(id.to_string()))?;
        self.objects
            .lock()
            .unwrap()
            .remove(&id.to_lowercase())
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn list_by_parent(&self, collection_id: &str, _api_version: &str) -> ClientResult<Vec<Value>> {
        self.record(Call::List(collection_id.to_string()))?;
        let prefix = format!("{}/", collection_id.to_lowercase());
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| {
                k.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .map(|(_, v)| v.clone())
            .collect())
    }
}
