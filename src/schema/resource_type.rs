//! Resource type descriptors.
//!
//! A [`ResourceType`] binds an endpoint path and resource name to one base
//! schema, zero or more extension schemas, and the handler that performs the
//! actual operations. Descriptors are created once at registration and
//! shared read-only across requests.

use crate::handler::ResourceHandler;
use crate::schema::embedded::RESOURCE_TYPE_SCHEMA_URN;
use crate::schema::types::{AttributeDefinition, Schema};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// An extension schema composed onto a resource type's base schema.
#[derive(Clone)]
pub struct SchemaExtension {
    /// The extension schema document.
    pub schema: Arc<Schema>,
    /// Whether a request payload must carry this extension.
    pub required: bool,
}

impl fmt::Debug for SchemaExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaExtension")
            .field("schema", &self.schema.id)
            .field("required", &self.required)
            .finish()
    }
}

/// Reference to an extension schema by URN, used at registration time before
/// the URN is resolved against the registry.
#[derive(Debug, Clone)]
pub struct SchemaExtensionRef {
    pub schema: String,
    pub required: bool,
}

impl SchemaExtensionRef {
    pub fn new(schema: impl Into<String>, required: bool) -> Self {
        Self {
            schema: schema.into(),
            required,
        }
    }
}

/// Registry entry binding an endpoint, a base schema, optional extension
/// schemas and a resource handler.
#[derive(Clone)]
pub struct ResourceType {
    /// Unique resource name, e.g. `User`.
    pub name: String,
    /// Unique endpoint path with leading slash, e.g. `/Users`.
    pub endpoint: String,
    /// Human-readable description.
    pub description: String,
    /// The base schema document.
    pub schema: Arc<Schema>,
    /// Extension schemas in declaration order.
    pub schema_extensions: Vec<SchemaExtension>,
    handler: Arc<dyn ResourceHandler>,
}

impl ResourceType {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        description: impl Into<String>,
        schema: Arc<Schema>,
        schema_extensions: Vec<SchemaExtension>,
        handler: Arc<dyn ResourceHandler>,
    ) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.starts_with('/') {
            endpoint
        } else {
            format!("/{endpoint}")
        };
        Self {
            name: name.into(),
            endpoint,
            description: description.into(),
            schema,
            schema_extensions,
            handler,
        }
    }

    /// The handler implementing this resource type's operations.
    pub fn handler(&self) -> &dyn ResourceHandler {
        self.handler.as_ref()
    }

    /// The `meta.location` value for a resource of this type.
    pub fn location(&self, id: &str) -> String {
        format!("{}/{}", self.endpoint, id)
    }

    /// Dotted paths of every `caseExact` attribute this resource type can
    /// carry, across the common attributes, the base schema and every
    /// extension. Extension attributes appear both bare and under their URN,
    /// matching the two ways a filter can address them.
    pub fn case_exact_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for attr in crate::schema::types::common_attributes() {
            collect_case_exact(&attr, None, &mut paths);
        }
        for attr in &self.schema.attributes {
            collect_case_exact(attr, None, &mut paths);
        }
        for ext in &self.schema_extensions {
            for attr in &ext.schema.attributes {
                collect_case_exact(attr, None, &mut paths);
                collect_case_exact(attr, Some(&ext.schema.id), &mut paths);
            }
        }
        paths
    }

    /// All schema URNs declared for this resource type, base first.
    pub fn schema_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.schema.id.as_str()];
        ids.extend(self.schema_extensions.iter().map(|e| e.schema.id.as_str()));
        ids
    }

    /// The catalog representation served from the `/ResourceTypes` endpoint.
    pub fn to_json(&self) -> Value {
        let extensions: Vec<Value> = self
            .schema_extensions
            .iter()
            .map(|ext| {
                json!({
                    "schema": ext.schema.id,
                    "required": ext.required,
                })
            })
            .collect();
        let mut doc = json!({
            "schemas": [RESOURCE_TYPE_SCHEMA_URN],
            "id": self.name,
            "name": self.name,
            "description": self.description,
            "endpoint": self.endpoint,
            "schema": self.schema.id,
        });
        if !extensions.is_empty() {
            doc["schemaExtensions"] = Value::Array(extensions);
        }
        doc
    }
}

fn collect_case_exact(attr: &AttributeDefinition, prefix: Option<&str>, out: &mut Vec<String>) {
    let path = match prefix {
        Some(prefix) => format!("{prefix}.{}", attr.name),
        None => attr.name.clone(),
    };
    if attr.case_exact {
        out.push(path.clone());
    }
    for sub in &attr.sub_attributes {
        collect_case_exact(sub, Some(&path), out);
    }
}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceType")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("schema", &self.schema.id)
            .field("schema_extensions", &self.schema_extensions)
            .finish()
    }
}
