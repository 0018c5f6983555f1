//! Wire models for the Oracle.Database resource-manager API
//!
//! Field names follow the API's camelCase JSON. Read-only properties are
//! `Option`s that are never serialized when unset.

pub mod anchors;
pub mod autonomous_database;
pub mod db_system;
pub mod exadata;
pub mod storage_vault;
pub mod vm_cluster;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Autonomous databases, backups, Exadata infrastructure, VM clusters and their children
pub const API_VERSION_2024_06_01: &str = "2024-06-01";
/// Exascale storage vaults, resource and network anchors, DB systems and shapes
pub const API_VERSION_2025_09_01: &str = "2025-09-01";

/// A resource placed in a location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "P: Deserialize<'de>"))]
pub struct TrackedResource<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<P>,
}

/// A child resource without location or tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "P: Deserialize<'de>"))]
pub struct ProxyResource<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<P>,
}

/// PATCH body; unset parts are left alone by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "P: Deserialize<'de>"))]
pub struct ResourceUpdate<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<P>,
}

impl<P> Default for ResourceUpdate<P> {
    fn default() -> Self {
        Self {
            tags: None,
            properties: None,
        }
    }
}

impl<P> ResourceUpdate<P> {
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.properties.is_none()
    }
}

/// `{"email": ...}` entry used by several resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub email: String,
}

/// `{"name": ...}` wrapper used for days and months in maintenance windows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

pub fn contacts_from(emails: &[String]) -> Option<Vec<CustomerContact>> {
    if emails.is_empty() {
        None
    } else {
        Some(
            emails
                .iter()
                .map(|e| CustomerContact { email: e.clone() })
                .collect(),
        )
    }
}

pub fn contacts_to(contacts: Option<&Vec<CustomerContact>>) -> Vec<String> {
    contacts
        .map(|c| c.iter().map(|c| c.email.clone()).collect())
        .unwrap_or_default()
}
