//! Catalog handlers serving the server's own configuration.
//!
//! `/ResourceTypes`, `/Schemas` and `/ServiceProviderConfig` are read-only
//! views over the registry. Each handler holds its own registry clone, so
//! resource types registered after the catalog endpoints exist still show
//! up. Write operations fall through to the declining trait defaults.

use crate::error::{ScimError, ScimResult};
use crate::handler::ResourceHandler;
use crate::list::{self, ListParams, PartialListResponse};
use crate::schema::embedded;
use crate::schema::registry::ResourceTypeRegistry;
use serde_json::Value;

/// Serves resource type descriptors from the registry.
pub struct ResourceTypeHandler {
    registry: ResourceTypeRegistry,
}

impl ResourceTypeHandler {
    pub fn new(registry: ResourceTypeRegistry) -> Self {
        Self { registry }
    }
}

impl ResourceHandler for ResourceTypeHandler {
    fn get_resource(&self, id: &str) -> ScimResult<Value> {
        self.registry
            .get_all_resource_types()
            .iter()
            .find(|rt| rt.name.eq_ignore_ascii_case(id))
            .map(|rt| rt.to_json())
            .ok_or_else(|| ScimError::resource_not_found("ResourceType", id))
    }

    fn list_resources(&self, params: &ListParams) -> ScimResult<PartialListResponse> {
        let candidates = self
            .registry
            .get_all_resource_types()
            .iter()
            .map(|rt| rt.to_json())
            .collect();
        list::apply(candidates, params)
    }
}

/// Serves schema documents from the registry.
pub struct SchemaHandler {
    registry: ResourceTypeRegistry,
}

impl SchemaHandler {
    pub fn new(registry: ResourceTypeRegistry) -> Self {
        Self { registry }
    }
}

impl ResourceHandler for SchemaHandler {
    fn get_resource(&self, id: &str) -> ScimResult<Value> {
        let schema = self.registry.get_schema(id)?;
        serde_json::to_value(schema.as_ref())
            .map_err(|e| ScimError::internal(format!("schema serialization failed: {e}")))
    }

    fn list_resources(&self, params: &ListParams) -> ScimResult<PartialListResponse> {
        let candidates = self
            .registry
            .get_all_schemas()
            .iter()
            .map(|schema| {
                serde_json::to_value(schema.as_ref())
                    .map_err(|e| ScimError::internal(format!("schema serialization failed: {e}")))
            })
            .collect::<ScimResult<Vec<_>>>()?;
        list::apply(candidates, params)
    }
}

/// Serves the ServiceProviderConfig singleton.
pub struct ServiceProviderConfigHandler;

impl ServiceProviderConfigHandler {
    fn config() -> ScimResult<Value> {
        serde_json::from_str(embedded::service_provider_config())
            .map_err(|e| ScimError::internal(format!("embedded config is malformed: {e}")))
    }
}

impl ResourceHandler for ServiceProviderConfigHandler {
    /// The singleton ignores the id; any get serves the one document.
    fn get_resource(&self, _id: &str) -> ScimResult<Value> {
        Self::config()
    }

    fn list_resources(&self, params: &ListParams) -> ScimResult<PartialListResponse> {
        list::apply(vec![Self::config()?], params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::schema::embedded::USER_SCHEMA_URN;
    use serde_json::json;
    use std::sync::Arc;

    struct NullHandler;
    impl ResourceHandler for NullHandler {}

    fn registry_with_user() -> ResourceTypeRegistry {
        let registry = ResourceTypeRegistry::new();
        registry
            .register_schema(Schema::from_str(embedded::core_user_schema()).unwrap())
            .unwrap();
        registry
            .register_resource_type(
                "User",
                "/Users",
                "User accounts",
                USER_SCHEMA_URN,
                &[],
                Arc::new(NullHandler),
            )
            .unwrap();
        registry
    }

    #[test]
    fn resource_type_catalog_reflects_later_registrations() {
        let registry = ResourceTypeRegistry::new();
        let handler = ResourceTypeHandler::new(registry.clone());
        assert_eq!(
            handler
                .list_resources(&ListParams::new())
                .unwrap()
                .total_results,
            0
        );

        registry
            .register_schema(Schema::from_str(embedded::core_user_schema()).unwrap())
            .unwrap();
        registry
            .register_resource_type(
                "User",
                "/Users",
                "",
                USER_SCHEMA_URN,
                &[],
                Arc::new(NullHandler),
            )
            .unwrap();
        assert_eq!(
            handler
                .list_resources(&ListParams::new())
                .unwrap()
                .total_results,
            1
        );
    }

    #[test]
    fn resource_type_descriptor_is_served_by_name() {
        let handler = ResourceTypeHandler::new(registry_with_user());
        let doc = handler.get_resource("User").unwrap();
        assert_eq!(doc["endpoint"], "/Users");
        assert_eq!(doc["schema"], USER_SCHEMA_URN);
        assert!(matches!(
            handler.get_resource("Robot"),
            Err(ScimError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn catalog_writes_are_declined() {
        let handler = ResourceTypeHandler::new(registry_with_user());
        assert!(matches!(
            handler.create_resource(json!({"name": "Robot"})),
            Err(ScimError::NotImplemented { .. })
        ));
        assert!(matches!(
            handler.update_resource("User", json!({})),
            Err(ScimError::NotImplemented { .. })
        ));
        assert!(matches!(
            handler.delete_resource("User"),
            Err(ScimError::NotImplemented { .. })
        ));
    }

    #[test]
    fn schema_catalog_serves_documents_by_urn() {
        let handler = SchemaHandler::new(registry_with_user());
        let doc = handler.get_resource(USER_SCHEMA_URN).unwrap();
        assert_eq!(doc["id"], USER_SCHEMA_URN);
        assert!(doc["attributes"].is_array());
        assert_eq!(
            handler
                .list_resources(&ListParams::new())
                .unwrap()
                .total_results,
            1
        );
    }

    #[test]
    fn service_provider_config_is_a_singleton() {
        let handler = ServiceProviderConfigHandler;
        let doc = handler.get_resource("anything").unwrap();
        assert_eq!(doc["filter"]["supported"], true);
        let listed = handler.list_resources(&ListParams::new()).unwrap();
        assert_eq!(listed.total_results, 1);
    }
}
