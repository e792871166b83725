//! Schema definitions, registry and validation for SCIM resources.
//!
//! This module implements the RFC 7643 attribute model: embedded core
//! schemas, resource type descriptors composing a base schema with
//! extensions, a shared registry, and the two-direction validation engine.
//!
//! # Key Types
//!
//! - [`Schema`] - SCIM schema definition with attributes and metadata
//! - [`ResourceType`] - Endpoint descriptor binding schemas to a handler
//! - [`ResourceTypeRegistry`] - Shared catalog of schemas and resource types
//! - [`AttributeDefinition`] - Individual attribute specifications and constraints
//!
//! # Examples
//!
//! ```rust
//! use scim_provisioning::schema::{ResourceTypeRegistry, Schema};
//! use scim_provisioning::schema::embedded;
//!
//! # fn main() -> Result<(), scim_provisioning::error::ScimError> {
//! let registry = ResourceTypeRegistry::new();
//! registry.register_schema(Schema::from_str(embedded::core_user_schema())?)?;
//! # Ok(())
//! # }
//! ```

pub mod embedded;
pub mod registry;
pub mod resource_type;
pub mod types;
pub mod validation;


// Re-export the main types for convenience
pub use registry::ResourceTypeRegistry;
pub use resource_type::{ResourceType, SchemaExtension, SchemaExtensionRef};
pub use types::{AttributeDefinition, AttributeType, Mutability, Returned, Schema, Uniqueness};
pub use validation::{validate_request, validate_response};
