//! Operation dispatch over registered resource types.
//!
//! [`ResourceEndpoint`] is the entry point a transport layer calls into: it
//! resolves the endpoint path to a resource type, runs request-direction
//! validation, dispatches to the resource handler, and finishes the
//! handler's document for the wire. Finishing means completing the `meta`
//! block and running response-direction validation, so nothing leaves the
//! server without passing through the same pipeline.

use crate::error::{ScimError, ScimResult};
use crate::filter::CaseExactPaths;
use crate::handlers::{
    InMemoryResourceHandler, ResourceTypeHandler, SchemaHandler, ServiceProviderConfigHandler,
};
use crate::list::{ListParams, ListResponse};
use crate::resource::inject_meta;
use crate::schema::embedded::{
    self, ENTERPRISE_USER_SCHEMA_URN, GROUP_SCHEMA_URN, USER_SCHEMA_URN,
};
use crate::schema::registry::ResourceTypeRegistry;
use crate::schema::resource_type::{ResourceType, SchemaExtensionRef};
use crate::schema::types::Schema;
use crate::schema::validation::{validate_request, validate_response};
use serde_json::Value;
use std::sync::Arc;

/// Dispatch facade over a [`ResourceTypeRegistry`].
#[derive(Clone)]
pub struct ResourceEndpoint {
    registry: ResourceTypeRegistry,
}

impl ResourceEndpoint {
    /// Wrap an already-populated registry.
    pub fn new(registry: ResourceTypeRegistry) -> Self {
        Self { registry }
    }

    /// Build an endpoint with the standard resource types registered:
    /// `/Users`, `/Groups`, `/Me` and the three catalog endpoints, with
    /// in-memory handlers backing Users and Groups.
    pub fn with_default_resource_types() -> ScimResult<Self> {
        let registry = ResourceTypeRegistry::new();
        register_default_resource_types(&registry)?;
        Ok(Self::new(registry))
    }

    /// The registry behind this endpoint, for registering further types.
    pub fn registry(&self) -> &ResourceTypeRegistry {
        &self.registry
    }

    /// Create a resource under an endpoint path.
    pub fn create(&self, endpoint: &str, payload: Value) -> ScimResult<Value> {
        let resource_type = self.registry.get_resource_type(endpoint)?;
        let validated = validate_request(&resource_type, &payload, None)?;
        let stored = resource_type.handler().create_resource(validated)?;
        finish_single(&resource_type, stored, &[])
    }

    /// Fetch one resource. `attributes` narrows returned=request attributes.
    pub fn get(&self, endpoint: &str, id: &str, attributes: &[String]) -> ScimResult<Value> {
        let resource_type = self.registry.get_resource_type(endpoint)?;
        let stored = resource_type.handler().get_resource(id)?;
        finish_single(&resource_type, stored, attributes)
    }

    /// List resources under an endpoint path.
    pub fn list(
        &self,
        endpoint: &str,
        params: &ListParams,
        attributes: &[String],
    ) -> ScimResult<ListResponse> {
        let resource_type = self.registry.get_resource_type(endpoint)?;
        // Filter comparisons honor the schema's caseExact declarations.
        let params = params
            .clone()
            .with_case_exact(CaseExactPaths::from_paths(resource_type.case_exact_paths()));
        let mut partial = resource_type.handler().list_resources(&params)?;
        partial.resources = partial
            .resources
            .into_iter()
            .map(|doc| finish_single(&resource_type, doc, attributes))
            .collect::<ScimResult<Vec<_>>>()?;
        Ok(ListResponse::from_partial(partial, &params))
    }

    /// Replace an existing resource.
    pub fn update(&self, endpoint: &str, id: &str, payload: Value) -> ScimResult<Value> {
        let resource_type = self.registry.get_resource_type(endpoint)?;
        let existing = resource_type.handler().get_resource(id)?;
        let validated = validate_request(&resource_type, &payload, Some(&existing))?;
        let stored = resource_type.handler().update_resource(id, validated)?;
        finish_single(&resource_type, stored, &[])
    }

    /// Delete a resource.
    pub fn delete(&self, endpoint: &str, id: &str) -> ScimResult<()> {
        let resource_type = self.registry.get_resource_type(endpoint)?;
        resource_type.handler().delete_resource(id)
    }
}

/// Finish a handler document for the wire: complete the meta block, then run
/// response-direction validation. A response-side failure means the stored
/// data is corrupt, so it surfaces as a server error.
fn finish_single(
    resource_type: &ResourceType,
    mut document: Value,
    attributes: &[String],
) -> ScimResult<Value> {
    let id = document
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string);
    inject_meta(&mut document, resource_type, id.as_deref());
    validate_response(resource_type, &document, attributes).map_err(|failure| {
        log::error!(
            "{}: stored resource violates its schema: {failure}",
            resource_type.name
        );
        ScimError::InternalValidation(failure)
    })
}

/// Register the standard schemas and resource types into a registry.
///
/// The set matches what the server publishes about itself: Users and Groups
/// with in-memory handlers, `/Me` sharing the user handler, and the three
/// catalog endpoints served from the registry.
pub fn register_default_resource_types(registry: &ResourceTypeRegistry) -> ScimResult<()> {
    let user_schema = Schema::from_str(embedded::core_user_schema())?;
    let group_schema = Schema::from_str(embedded::core_group_schema())?;

    let user_handler = Arc::new(InMemoryResourceHandler::from_schema("User", &user_schema));
    let group_handler = Arc::new(InMemoryResourceHandler::from_schema("Group", &group_schema));

    registry.register_schema(user_schema)?;
    registry.register_schema(Schema::from_str(embedded::enterprise_user_schema())?)?;
    registry.register_schema(group_schema)?;
    registry.register_schema(Schema::from_str(embedded::resource_type_schema())?)?;
    registry.register_schema(Schema::from_str(embedded::schema_schema())?)?;
    registry.register_schema(Schema::from_str(
        embedded::service_provider_config_schema(),
    )?)?;

    let enterprise_extension = [SchemaExtensionRef::new(ENTERPRISE_USER_SCHEMA_URN, false)];
    registry.register_resource_type(
        "User",
        "/Users",
        "User Account",
        USER_SCHEMA_URN,
        &enterprise_extension,
        user_handler.clone(),
    )?;
    registry.register_resource_type(
        "Group",
        "/Groups",
        "Group",
        GROUP_SCHEMA_URN,
        &[],
        group_handler,
    )?;
    // The authenticated user's own resource, backed by the same store as /Users.
    registry.register_resource_type(
        "Me",
        "/Me",
        "Alias for the authenticated user",
        USER_SCHEMA_URN,
        &enterprise_extension,
        user_handler,
    )?;
    registry.register_resource_type(
        "ResourceType",
        "/ResourceTypes",
        "Resource type catalog",
        embedded::RESOURCE_TYPE_SCHEMA_URN,
        &[],
        Arc::new(ResourceTypeHandler::new(registry.clone())),
    )?;
    registry.register_resource_type(
        "Schema",
        "/Schemas",
        "Schema catalog",
        embedded::SCHEMA_SCHEMA_URN,
        &[],
        Arc::new(SchemaHandler::new(registry.clone())),
    )?;
    registry.register_resource_type(
        "ServiceProviderConfig",
        "/ServiceProviderConfig",
        "Service provider configuration",
        embedded::SERVICE_PROVIDER_CONFIG_SCHEMA_URN,
        &[],
        Arc::new(ServiceProviderConfigHandler),
    )?;
    Ok(())
}
