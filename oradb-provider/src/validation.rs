//! Attribute types with Oracle-specific validation

use oradb_core::resource::Value;
use oradb_core::schema::AttributeType;
use regex::Regex;

use crate::ids;

/// Compare locations by their API form ("East US" -> "eastus")
pub fn normalize_location_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(ids::normalize_location(s)),
        other => other.clone(),
    }
}

fn matches(pattern: &str, s: &str) -> Result<bool, String> {
    let re = Regex::new(pattern).map_err(|e| format!("invalid pattern: {}", e))?;
    Ok(re.is_match(s))
}

/// 1-255 characters: a letter first, then letters, digits, `-` or `_`
pub fn validate_name(s: &str) -> Result<(), String> {
    if matches(r"^[A-Za-z][A-Za-z0-9_-]{0,254}$", s)? {
        Ok(())
    } else {
        Err(format!(
            "{:?} must be 1 to 255 characters, start with a letter and contain only letters, digits, hyphens and underscores",
            s
        ))
    }
}

/// 1-30 alphanumerics, a letter first
pub fn validate_autonomous_database_name(s: &str) -> Result<(), String> {
    if matches(r"^[A-Za-z][A-Za-z0-9]{0,29}$", s)? {
        Ok(())
    } else {
        Err(format!(
            "{:?} must be 1 to 30 alphanumeric characters and start with a letter",
            s
        ))
    }
}

/// 12-30 characters with an upper case letter, a lower case letter and a
/// digit; no double quote and not containing `admin`
pub fn validate_admin_password(s: &str) -> Result<(), String> {
    let len = s.chars().count();
    if !(12..=30).contains(&len) {
        return Err(format!("password must be 12 to 30 characters, got {}", len));
    }
    if !s.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("password must contain an upper case letter".to_string());
    }
    if !s.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("password must contain a lower case letter".to_string());
    }
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return Err("password must contain a digit".to_string());
    }
    if s.contains('"') {
        return Err("password must not contain the double quote character".to_string());
    }
    if s.to_lowercase().contains("admin") {
        return Err("password must not contain the username \"admin\"".to_string());
    }
    Ok(())
}

pub fn validate_email(s: &str) -> Result<(), String> {
    if matches(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", s)? {
        Ok(())
    } else {
        Err(format!("{:?} is not a valid e-mail address", s))
    }
}

fn string_check(value: &Value, check: fn(&str) -> Result<(), String>) -> Result<(), String> {
    match value {
        Value::String(s) => check(s),
        _ => Err("Expected string".to_string()),
    }
}

fn custom(name: &str, validate: fn(&Value) -> Result<(), String>) -> AttributeType {
    AttributeType::Custom {
        name: name.to_string(),
        base: Box::new(AttributeType::String),
        validate,
    }
}

pub fn name() -> AttributeType {
    custom("OracleName", |v| string_check(v, validate_name))
}

pub fn autonomous_database_name() -> AttributeType {
    custom("AutonomousDatabaseName", |v| {
        string_check(v, validate_autonomous_database_name)
    })
}

pub fn admin_password() -> AttributeType {
    custom("AdminPassword", |v| string_check(v, validate_admin_password))
}

pub fn email() -> AttributeType {
    custom("Email", |v| string_check(v, validate_email))
}

pub fn resource_group_name() -> AttributeType {
    custom("ResourceGroupName", |v| {
        string_check(v, |s| {
            if matches(r"^[-\w\._\(\)]{1,90}$", s)? && !s.ends_with('.') {
                Ok(())
            } else {
                Err(format!("{:?} is not a valid resource group name", s))
            }
        })
    })
}

/// String type accepted only when it parses as the given ID
macro_rules! id_type {
    ($fn_name:ident, $type_name:literal, $parser:path) => {
        pub fn $fn_name() -> AttributeType {
            custom($type_name, |v| {
                string_check(v, |s| $parser(s).map(|_| ()).map_err(|e| e.to_string()))
            })
        }
    };
}

id_type!(
    autonomous_database_id,
    "AutonomousDatabaseId",
    ids::AutonomousDatabaseId::parse
);
id_type!(
    cloud_exadata_infrastructure_id,
    "CloudExadataInfrastructureId",
    ids::CloudExadataInfrastructureId::parse
);
id_type!(
    cloud_vm_cluster_id,
    "CloudVmClusterId",
    ids::CloudVmClusterId::parse
);
id_type!(
    resource_anchor_id,
    "ResourceAnchorId",
    ids::ResourceAnchorId::parse
);
id_type!(network_anchor_id, "NetworkAnchorId", ids::NetworkAnchorId::parse);
id_type!(subnet_id, "SubnetId", ids::SubnetId::parse);
id_type!(
    virtual_network_id,
    "VirtualNetworkId",
    ids::VirtualNetworkId::parse
);
