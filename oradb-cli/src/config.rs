//! Configuration file loading
//!
//! ```json
//! {
//!   "provider": { "subscription_id": "..." },
//!   "resources": [{ "type": "oracle_resource_anchor", "name": "anchor", "attributes": {...} }],
//!   "data": [{ "type": "oracle_gi_versions", "name": "gi", "attributes": {...} }]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use oradb_core::resource::{Resource, attributes_from_json};
use oradb_provider::ProviderConfig;
use serde::Deserialize;

/// A parsed configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub resources: Vec<Block>,
    #[serde(default)]
    pub data: Vec<Block>,
}

/// One `resources` or `data` entry
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Block {
    fn to_resource(&self, read_only: bool) -> Resource {
        let mut resource = Resource::new(&self.resource_type, &self.name).with_read_only(read_only);
        resource.attributes =
            attributes_from_json(&serde_json::Value::Object(self.attributes.clone()));
        resource
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: ConfigFile = serde_json::from_str(content)?;
        for blocks in [&config.resources, &config.data] {
            let mut seen = HashSet::new();
            for block in blocks {
                if !seen.insert((&block.resource_type, &block.name)) {
                    bail!("{}.{} is declared twice", block.resource_type, block.name);
                }
            }
        }
        Ok(config)
    }

    /// Provider settings with unset fields taken from the environment
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let mut config = self.provider.clone();
        config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Managed resources in file order
    pub fn resources(&self) -> Vec<Resource> {
        self.resources.iter().map(|b| b.to_resource(false)).collect()
    }

    pub fn data_sources(&self) -> Vec<Resource> {
        self.data.iter().map(|b| b.to_resource(true)).collect()
    }
}

#[cfg(test)]
mod tests {
    use oradb_core::resource::Value;

    use super::*;

    #[test]
    fn parses_blocks_in_file_order() {
        let config = ConfigFile::parse(
            r#"{
                "provider": {"subscription_id": "sub"},
                "resources": [
                    {"type": "oracle_resource_anchor", "name": "anchor",
                     "attributes": {"name": "anchor1", "resource_group_name": "rg"}},
                    {"type": "oracle_network_anchor", "name": "net", "attributes": {}}
                ],
                "data": [
                    {"type": "oracle_gi_versions", "name": "gi", "attributes": {"location": "eastus"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.provider.subscription_id, "sub");
        let resources = config.resources();
        assert_eq!(resources[0].id.name, "anchor");
        assert_eq!(resources[1].id.resource_type, "oracle_network_anchor");
        assert_eq!(
            resources[0].attributes.get("name"),
            Some(&Value::from("anchor1"))
        );

        let data = config.data_sources();
        assert!(data[0].is_data_source());
    }

    #[test]
    fn empty_file_is_valid() {
        let config = ConfigFile::parse("{}").unwrap();
        assert!(config.resources.is_empty());
        assert!(config.data.is_empty());
    }

    #[test]
    fn duplicate_blocks_are_rejected() {
        let err = ConfigFile::parse(
            r#"{"resources": [
                {"type": "oracle_resource_anchor", "name": "a"},
                {"type": "oracle_resource_anchor", "name": "a"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("oracle_resource_anchor.a"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ConfigFile::parse(r#"{"resource": []}"#).is_err());
    }
}
