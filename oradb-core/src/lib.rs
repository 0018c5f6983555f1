//! oradb Core
//!
//! Core library for the Oracle Database resource provider: resource values,
//! attribute schemas and the provider abstraction the host drives.

pub mod differ;
pub mod provider;
pub mod resource;
pub mod schema;
