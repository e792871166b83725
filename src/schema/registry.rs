//! Resource type and schema registry.
//!
//! The registry is the catalog of everything the server can serve: schema
//! documents keyed by URN and resource type descriptors keyed by endpoint
//! and by name. It is a cheaply cloneable handle over shared state, so the
//! catalog handlers hold their own clone and always observe registrations
//! made after they were constructed.

use crate::error::{ScimError, ScimResult};
use crate::handler::ResourceHandler;
use crate::schema::resource_type::{ResourceType, SchemaExtension, SchemaExtensionRef};
use crate::schema::types::Schema;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Default)]
struct Inner {
    /// Schema documents keyed by exact URN.
    schemas: HashMap<String, Arc<Schema>>,
    /// Resource types keyed by lowercased endpoint without the leading slash.
    by_endpoint: HashMap<String, Arc<ResourceType>>,
    /// Resource types keyed by lowercased name.
    by_name: HashMap<String, Arc<ResourceType>>,
    /// Registration order, for stable catalog listings.
    ordered: Vec<Arc<ResourceType>>,
}

/// Shared registry of schemas and resource types.
#[derive(Clone, Default)]
pub struct ResourceTypeRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl ResourceTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema document under its URN.
    ///
    /// Fails with [`ScimError::DuplicateRegistration`] when the URN is
    /// already taken.
    pub fn register_schema(&self, schema: Schema) -> ScimResult<()> {
        let mut inner = self.write();
        if inner.schemas.contains_key(&schema.id) {
            return Err(ScimError::duplicate_registration(format!(
                "schema '{}' is already registered",
                schema.id
            )));
        }
        log::debug!("registering schema {}", schema.id);
        inner.schemas.insert(schema.id.clone(), Arc::new(schema));
        Ok(())
    }

    /// Register a resource type, resolving its base and extension schema
    /// URNs against the schemas registered so far.
    pub fn register_resource_type(
        &self,
        name: &str,
        endpoint: &str,
        description: &str,
        base_schema: &str,
        extensions: &[SchemaExtensionRef],
        handler: Arc<dyn ResourceHandler>,
    ) -> ScimResult<Arc<ResourceType>> {
        let mut inner = self.write();

        let schema = inner
            .schemas
            .get(base_schema)
            .cloned()
            .ok_or_else(|| ScimError::schema_not_found(base_schema))?;
        let schema_extensions = extensions
            .iter()
            .map(|ext| {
                inner
                    .schemas
                    .get(&ext.schema)
                    .cloned()
                    .map(|schema| SchemaExtension {
                        schema,
                        required: ext.required,
                    })
                    .ok_or_else(|| ScimError::schema_not_found(&ext.schema))
            })
            .collect::<ScimResult<Vec<_>>>()?;

        let resource_type = Arc::new(ResourceType::new(
            name,
            endpoint,
            description,
            schema,
            schema_extensions,
            handler,
        ));

        let endpoint_key = endpoint_key(&resource_type.endpoint);
        let name_key = resource_type.name.to_lowercase();
        if inner.by_endpoint.contains_key(&endpoint_key) {
            return Err(ScimError::duplicate_registration(format!(
                "endpoint '{}' is already registered",
                resource_type.endpoint
            )));
        }
        if inner.by_name.contains_key(&name_key) {
            return Err(ScimError::duplicate_registration(format!(
                "resource type '{}' is already registered",
                resource_type.name
            )));
        }

        log::debug!(
            "registering resource type {} at {}",
            resource_type.name,
            resource_type.endpoint
        );
        inner.by_endpoint.insert(endpoint_key, resource_type.clone());
        inner.by_name.insert(name_key, resource_type.clone());
        inner.ordered.push(resource_type.clone());
        Ok(resource_type)
    }

    /// Look up a resource type by endpoint path or by name, matched
    /// case-insensitively with or without the leading slash.
    pub fn get_resource_type(&self, endpoint_or_name: &str) -> ScimResult<Arc<ResourceType>> {
        let inner = self.read();
        let key = endpoint_key(endpoint_or_name);
        inner
            .by_endpoint
            .get(&key)
            .or_else(|| inner.by_name.get(&key))
            .cloned()
            .ok_or_else(|| ScimError::resource_not_found("ResourceType", endpoint_or_name))
    }

    /// All registered resource types in registration order.
    pub fn get_all_resource_types(&self) -> Vec<Arc<ResourceType>> {
        self.read().ordered.clone()
    }

    /// Look up a schema document by exact URN.
    pub fn get_schema(&self, id: &str) -> ScimResult<Arc<Schema>> {
        self.read()
            .schemas
            .get(id)
            .cloned()
            .ok_or_else(|| ScimError::resource_not_found("Schema", id))
    }

    /// All schemas referenced by at least one registered resource type, in
    /// resource type registration order and deduplicated.
    pub fn get_all_schemas(&self) -> Vec<Arc<Schema>> {
        let inner = self.read();
        let mut seen = Vec::new();
        let mut schemas: Vec<Arc<Schema>> = Vec::new();
        for resource_type in &inner.ordered {
            for schema in std::iter::once(&resource_type.schema)
                .chain(resource_type.schema_extensions.iter().map(|e| &e.schema))
            {
                if !seen.contains(&schema.id) {
                    seen.push(schema.id.clone());
                    schemas.push(schema.clone());
                }
            }
        }
        schemas
    }

    /// Remove every registered resource type and schema. Intended for test
    /// isolation.
    pub fn clear_all(&self) {
        let mut inner = self.write();
        inner.schemas.clear();
        inner.by_endpoint.clear();
        inner.by_name.clear();
        inner.ordered.clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Normalize an endpoint or name to its lookup key.
fn endpoint_key(value: &str) -> String {
    value.trim_start_matches('/').to_lowercase()
}
