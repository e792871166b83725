//! Built-in resource handlers.
//!
//! [`InMemoryResourceHandler`] backs regular resource types with a
//! process-local store. The catalog handlers serve the server's own
//! configuration (`/ResourceTypes`, `/Schemas`, `/ServiceProviderConfig`)
//! straight from the registry and decline writes.

pub mod catalog;
pub mod in_memory;

pub use catalog::{ResourceTypeHandler, SchemaHandler, ServiceProviderConfigHandler};
pub use in_memory::InMemoryResourceHandler;
