//! SCIM 2.0 server-side resource model for Rust.
//!
//! Provides the schema-driven core of an identity provisioning server:
//! embedded RFC 7643 schemas, a resource type registry, two-direction
//! attribute validation, filtering, sorting, pagination, and pluggable
//! per-type resource handlers behind a single dispatch facade.
//!
//! # Core Components
//!
//! - [`ResourceEndpoint`] - Dispatch facade a transport layer calls into
//! - [`ResourceHandler`] - Trait for implementing per-type storage backends
//! - [`ResourceTypeRegistry`] - Catalog of schemas and resource types
//!
//! # Quick Start
//!
//! ```rust
//! use scim_provisioning::ResourceEndpoint;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), scim_provisioning::ScimError> {
//! let endpoint = ResourceEndpoint::with_default_resource_types()?;
//! let created = endpoint.create("/Users", json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "userName": "jdoe"
//! }))?;
//! let id = created["id"].as_str().unwrap();
//! let fetched = endpoint.get("/Users", id, &[])?;
//! assert_eq!(fetched["userName"], "jdoe");
//! # Ok(())
//! # }
//! ```

pub mod endpoint;
pub mod error;
pub mod filter;
pub mod handler;
pub mod handlers;
pub mod list;
pub mod resource;
pub mod schema;

// Re-export commonly used types for convenience
pub use endpoint::{ResourceEndpoint, register_default_resource_types};
pub use error::{ScimError, ScimErrorResponse, ScimResult, ValidationError, ValidationFailure};
pub use filter::{CaseExactPaths, FilterExpr};
pub use handler::ResourceHandler;
pub use handlers::{
    InMemoryResourceHandler, ResourceTypeHandler, SchemaHandler, ServiceProviderConfigHandler,
};
pub use list::{ListParams, ListResponse, PartialListResponse, SortOrder};
pub use resource::Meta;
pub use schema::{
    AttributeDefinition, AttributeType, Mutability, ResourceType, ResourceTypeRegistry, Returned,
    Schema, SchemaExtension, SchemaExtensionRef, Uniqueness, validate_request, validate_response,
};
