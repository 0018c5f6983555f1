//! Typed resource identifiers
//!
//! Static segments are matched case-insensitively, user segments are kept as
//! written. `Display` renders the canonical form.

use std::fmt;

pub const PROVIDER_NAMESPACE: &str = "Oracle.Database";

/// Error parsing a resource ID
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parsing {input:?} as a {kind} ID: expected the format {expected:?}")]
pub struct IdError {
    pub input: String,
    pub kind: &'static str,
    pub expected: String,
}

enum Segment {
    Static(&'static str),
    User(&'static str),
}

use Segment::{Static, User};

fn describe(pattern: &[Segment]) -> String {
    pattern
        .iter()
        .map(|s| match s {
            Static(v) => format!("/{}", v),
            User(v) => format!("/{{{}}}", v),
        })
        .collect()
}

/// Match `input` against `pattern`, returning the user segments in order
fn parse_segments(
    input: &str,
    kind: &'static str,
    pattern: &[Segment],
) -> Result<Vec<String>, IdError> {
    let err = || IdError {
        input: input.to_string(),
        kind,
        expected: describe(pattern),
    };

    let trimmed = input.strip_prefix('/').ok_or_else(err)?;
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() != pattern.len() {
        return Err(err());
    }

    let mut values = Vec::new();
    for (part, segment) in parts.iter().zip(pattern) {
        match segment {
            Static(expected) => {
                if !part.eq_ignore_ascii_case(expected) {
                    return Err(err());
                }
            }
            User(_) => {
                if part.is_empty() {
                    return Err(err());
                }
                values.push(part.to_string());
            }
        }
    }
    Ok(values)
}

/// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceGroupId {
    pub subscription_id: String,
    pub resource_group_name: String,
}

impl ResourceGroupId {
    pub fn new(subscription_id: impl Into<String>, resource_group_name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdError> {
        let v = parse_segments(
            input,
            "Resource Group",
            &[
                Static("subscriptions"),
                User("subscriptionId"),
                Static("resourceGroups"),
                User("resourceGroupName"),
            ],
        )?;
        Ok(Self::new(&v[0], &v[1]))
    }
}

impl fmt::Display for ResourceGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group_name
        )
    }
}

macro_rules! oracle_resource_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $collection:literal, $user:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub subscription_id: String,
            pub resource_group_name: String,
            pub name: String,
        }

        impl $name {
            pub fn new(
                subscription_id: impl Into<String>,
                resource_group_name: impl Into<String>,
                name: impl Into<String>,
            ) -> Self {
                Self {
                    subscription_id: subscription_id.into(),
                    resource_group_name: resource_group_name.into(),
                    name: name.into(),
                }
            }

            pub fn parse(input: &str) -> Result<Self, IdError> {
                let v = parse_segments(
                    input,
                    $kind,
                    &[
                        Static("subscriptions"),
                        User("subscriptionId"),
                        Static("resourceGroups"),
                        User("resourceGroupName"),
                        Static("providers"),
                        Static(PROVIDER_NAMESPACE),
                        Static($collection),
                        User($user),
                    ],
                )?;
                Ok(Self::new(&v[0], &v[1], &v[2]))
            }

            pub fn resource_group(&self) -> ResourceGroupId {
                ResourceGroupId::new(&self.subscription_id, &self.resource_group_name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
                    self.subscription_id,
                    self.resource_group_name,
                    PROVIDER_NAMESPACE,
                    $collection,
                    self.name
                )
            }
        }
    };
}

oracle_resource_id!(
    /// `.../providers/Oracle.Database/autonomousDatabases/{autonomousDatabaseName}`
    AutonomousDatabaseId,
    "Autonomous Database",
    "autonomousDatabases",
    "autonomousDatabaseName"
);
oracle_resource_id!(
    /// `.../providers/Oracle.Database/cloudExadataInfrastructures/{cloudExadataInfrastructureName}`
    CloudExadataInfrastructureId,
    "Cloud Exadata Infrastructure",
    "cloudExadataInfrastructures",
    "cloudExadataInfrastructureName"
);
oracle_resource_id!(
    /// `.../providers/Oracle.Database/cloudVmClusters/{cloudVmClusterName}`
    CloudVmClusterId,
    "Cloud VM Cluster",
    "cloudVmClusters",
    "cloudVmClusterName"
);
oracle_resource_id!(
    /// `.../providers/Oracle.Database/exascaleDbStorageVaults/{exascaleDbStorageVaultName}`
    ExascaleDbStorageVaultId,
    "Exascale Db Storage Vault",
    "exascaleDbStorageVaults",
    "exascaleDbStorageVaultName"
);
oracle_resource_id!(
    /// `.../providers/Oracle.Database/resourceAnchors/{resourceAnchorName}`
    ResourceAnchorId,
    "Resource Anchor",
    "resourceAnchors",
    "resourceAnchorName"
);
oracle_resource_id!(
    /// `.../providers/Oracle.Database/networkAnchors/{networkAnchorName}`
    NetworkAnchorId,
    "Network Anchor",
    "networkAnchors",
    "networkAnchorName"
);
oracle_resource_id!(
    /// `.../providers/Oracle.Database/dbSystems/{dbSystemName}`
    DbSystemId,
    "Db System",
    "dbSystems",
    "dbSystemName"
);

impl AutonomousDatabaseId {
    /// Collection of backups taken of this database
    pub fn backups_collection(&self) -> String {
        format!("{}/autonomousDatabaseBackups", self)
    }
}

impl CloudExadataInfrastructureId {
    pub fn db_servers_collection(&self) -> String {
        format!("{}/dbServers", self)
    }
}

impl CloudVmClusterId {
    pub fn db_nodes_collection(&self) -> String {
        format!("{}/dbNodes", self)
    }
}

/// `.../autonomousDatabases/{autonomousDatabaseName}/autonomousDatabaseBackups/{autonomousDatabaseBackupName}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AutonomousDatabaseBackupId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub autonomous_database_name: String,
    pub name: String,
}

impl AutonomousDatabaseBackupId {
    pub fn new(database: &AutonomousDatabaseId, name: impl Into<String>) -> Self {
        Self {
            subscription_id: database.subscription_id.clone(),
            resource_group_name: database.resource_group_name.clone(),
            autonomous_database_name: database.name.clone(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdError> {
        let v = parse_segments(
            input,
            "Autonomous Database Backup",
            &[
                Static("subscriptions"),
                User("subscriptionId"),
                Static("resourceGroups"),
                User("resourceGroupName"),
                Static("providers"),
                Static(PROVIDER_NAMESPACE),
                Static("autonomousDatabases"),
                User("autonomousDatabaseName"),
                Static("autonomousDatabaseBackups"),
                User("autonomousDatabaseBackupName"),
            ],
        )?;
        Ok(Self {
            subscription_id: v[0].clone(),
            resource_group_name: v[1].clone(),
            autonomous_database_name: v[2].clone(),
            name: v[3].clone(),
        })
    }

    pub fn database(&self) -> AutonomousDatabaseId {
        AutonomousDatabaseId::new(
            &self.subscription_id,
            &self.resource_group_name,
            &self.autonomous_database_name,
        )
    }
}

impl fmt::Display for AutonomousDatabaseBackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/autonomousDatabaseBackups/{}", self.database(), self.name)
    }
}

/// `/subscriptions/{subscriptionId}/providers/Oracle.Database/locations/{location}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationId {
    pub subscription_id: String,
    pub location: String,
}

impl LocationId {
    pub fn new(subscription_id: impl Into<String>, location: &str) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            location: normalize_location(location),
        }
    }

    pub fn gi_versions_collection(&self) -> String {
        format!("{}/giVersions", self)
    }

    pub fn db_system_shapes_collection(&self) -> String {
        format!("{}/dbSystemShapes", self)
    }

    pub fn character_sets_collection(&self) -> String {
        format!("{}/autonomousDatabaseCharacterSets", self)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/providers/{}/locations/{}",
            self.subscription_id, PROVIDER_NAMESPACE, self.location
        )
    }
}

/// "West Europe" -> "westeurope"
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

/// `.../providers/Microsoft.Network/virtualNetworks/{vnet}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNetworkId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub name: String,
}

impl VirtualNetworkId {
    pub fn parse(input: &str) -> Result<Self, IdError> {
        let v = parse_segments(
            input,
            "Virtual Network",
            &[
                Static("subscriptions"),
                User("subscriptionId"),
                Static("resourceGroups"),
                User("resourceGroupName"),
                Static("providers"),
                Static("Microsoft.Network"),
                Static("virtualNetworks"),
                User("virtualNetworkName"),
            ],
        )?;
        Ok(Self {
            subscription_id: v[0].clone(),
            resource_group_name: v[1].clone(),
            name: v[2].clone(),
        })
    }
}

/// `.../providers/Microsoft.Network/virtualNetworks/{vnet}/subnets/{subnet}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub virtual_network_name: String,
    pub name: String,
}

impl SubnetId {
    pub fn parse(input: &str) -> Result<Self, IdError> {
        let v = parse_segments(
            input,
            "Subnet",
            &[
                Static("subscriptions"),
                User("subscriptionId"),
                Static("resourceGroups"),
                User("resourceGroupName"),
                Static("providers"),
                Static("Microsoft.Network"),
                Static("virtualNetworks"),
                User("virtualNetworkName"),
                Static("subnets"),
                User("subnetName"),
            ],
        )?;
        Ok(Self {
            subscription_id: v[0].clone(),
            resource_group_name: v[1].clone(),
            virtual_network_name: v[2].clone(),
            name: v[3].clone(),
        })
    }
}
