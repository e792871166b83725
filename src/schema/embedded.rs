//! Embedded core SCIM schema documents.
//!
//! The core schemas (User, Enterprise User extension, Group) and the
//! server-catalog meta-schemas (ResourceType, Schema, ServiceProviderConfig)
//! are embedded as static JSON so the registry can bootstrap without any
//! external schema files. Per RFC 7643 the published schemas do not repeat
//! the common attributes (`id`, `externalId`, `meta`); those are unioned in
//! by the validation engine.

/// URN of the core User schema.
pub const USER_SCHEMA_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
/// URN of the Enterprise User extension schema.
pub const ENTERPRISE_USER_SCHEMA_URN: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
/// URN of the core Group schema.
pub const GROUP_SCHEMA_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
/// URN of the ResourceType meta-schema.
pub const RESOURCE_TYPE_SCHEMA_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:ResourceType";
/// URN of the Schema meta-schema.
pub const SCHEMA_SCHEMA_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:Schema";
/// URN of the ServiceProviderConfig schema.
pub const SERVICE_PROVIDER_CONFIG_SCHEMA_URN: &str =
    "urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig";

/// Returns the core User schema as a JSON string.
pub fn core_user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:User",
  "name": "User",
  "description": "User Account",
  "attributes": [
    {
      "name": "userName",
      "type": "string",
      "multiValued": false,
      "required": true,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default",
      "uniqueness": "server"
    },
    {
      "name": "name",
      "type": "complex",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "formatted", "type": "string" },
        { "name": "familyName", "type": "string" },
        { "name": "givenName", "type": "string" },
        { "name": "middleName", "type": "string" },
        { "name": "honorificPrefix", "type": "string" },
        { "name": "honorificSuffix", "type": "string" }
      ]
    },
    {
      "name": "displayName",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "nickName",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "profileUrl",
      "type": "reference",
      "referenceTypes": ["external"],
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "title",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "userType",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "preferredLanguage",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "locale",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "timezone",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "active",
      "type": "boolean",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "password",
      "type": "string",
      "mutability": "writeOnly",
      "returned": "never"
    },
    {
      "name": "emails",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string", "required": true },
        { "name": "display", "type": "string" },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["work", "home", "other"]
        },
        { "name": "primary", "type": "boolean" }
      ]
    },
    {
      "name": "phoneNumbers",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string", "required": true },
        { "name": "display", "type": "string" },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["work", "home", "mobile", "fax", "pager", "other"]
        },
        { "name": "primary", "type": "boolean" }
      ]
    },
    {
      "name": "addresses",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "formatted", "type": "string" },
        { "name": "streetAddress", "type": "string" },
        { "name": "locality", "type": "string" },
        { "name": "region", "type": "string" },
        { "name": "postalCode", "type": "string" },
        { "name": "country", "type": "string" },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["work", "home", "other"]
        },
        { "name": "primary", "type": "boolean" }
      ]
    },
    {
      "name": "groups",
      "type": "complex",
      "multiValued": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string", "mutability": "readOnly" },
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User", "Group"],
          "mutability": "readOnly"
        },
        { "name": "display", "type": "string", "mutability": "readOnly" },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["direct", "indirect"],
          "mutability": "readOnly"
        }
      ]
    }
  ]
}"#
}

/// Returns the Enterprise User extension schema as a JSON string.
pub fn enterprise_user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
  "name": "EnterpriseUser",
  "description": "Enterprise User",
  "attributes": [
    {
      "name": "employeeNumber",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "costCenter",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "organization",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "division",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "department",
      "type": "string",
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "manager",
      "type": "complex",
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string" },
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User"]
        },
        { "name": "displayName", "type": "string", "mutability": "readOnly" }
      ]
    }
  ]
}"#
}

/// Returns the core Group schema as a JSON string.
pub fn core_group_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:Group",
  "name": "Group",
  "description": "Group",
  "attributes": [
    {
      "name": "displayName",
      "type": "string",
      "required": true,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "members",
      "type": "complex",
      "multiValued": true,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string", "mutability": "immutable" },
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User", "Group"],
          "mutability": "immutable"
        },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["User", "Group"],
          "mutability": "immutable"
        },
        { "name": "display", "type": "string" }
      ]
    }
  ]
}"#
}

/// Returns the ResourceType meta-schema as a JSON string.
pub fn resource_type_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:ResourceType",
  "name": "ResourceType",
  "description": "Specifies the schema that describes a SCIM resource type",
  "attributes": [
    {
      "name": "name",
      "type": "string",
      "required": true,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "default"
    },
    {
      "name": "description",
      "type": "string",
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "default"
    },
    {
      "name": "endpoint",
      "type": "reference",
      "referenceTypes": ["uri"],
      "required": true,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "default"
    },
    {
      "name": "schema",
      "type": "reference",
      "referenceTypes": ["uri"],
      "required": true,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "default"
    },
    {
      "name": "schemaExtensions",
      "type": "complex",
      "multiValued": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        {
          "name": "schema",
          "type": "reference",
          "referenceTypes": ["uri"],
          "required": true,
          "caseExact": true,
          "mutability": "readOnly"
        },
        {
          "name": "required",
          "type": "boolean",
          "required": true,
          "mutability": "readOnly"
        }
      ]
    }
  ]
}"#
}

/// Returns the Schema meta-schema as a JSON string.
///
/// `subAttributes` is described one level deep, matching the published
/// schema documents which never nest complex attributes further.
pub fn schema_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:Schema",
  "name": "Schema",
  "description": "Specifies the schema that describes a SCIM schema",
  "attributes": [
    {
      "name": "name",
      "type": "string",
      "required": true,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "default"
    },
    {
      "name": "description",
      "type": "string",
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "default"
    },
    {
      "name": "attributes",
      "type": "complex",
      "multiValued": true,
      "required": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "name", "type": "string", "required": true, "caseExact": true, "mutability": "readOnly" },
        {
          "name": "type",
          "type": "string",
          "required": true,
          "caseExact": true,
          "canonicalValues": ["string", "boolean", "decimal", "integer", "dateTime", "binary", "reference", "complex"],
          "mutability": "readOnly"
        },
        { "name": "multiValued", "type": "boolean", "required": true, "mutability": "readOnly" },
        { "name": "required", "type": "boolean", "required": true, "mutability": "readOnly" },
        { "name": "caseExact", "type": "boolean", "mutability": "readOnly" },
        {
          "name": "mutability",
          "type": "string",
          "caseExact": true,
          "canonicalValues": ["readOnly", "readWrite", "immutable", "writeOnly"],
          "mutability": "readOnly"
        },
        {
          "name": "returned",
          "type": "string",
          "caseExact": true,
          "canonicalValues": ["always", "never", "default", "request"],
          "mutability": "readOnly"
        },
        {
          "name": "uniqueness",
          "type": "string",
          "caseExact": true,
          "canonicalValues": ["none", "server", "global"],
          "mutability": "readOnly"
        },
        { "name": "canonicalValues", "type": "string", "multiValued": true, "caseExact": true, "mutability": "readOnly" },
        { "name": "referenceTypes", "type": "string", "multiValued": true, "caseExact": true, "mutability": "readOnly" },
        { "name": "subAttributes", "type": "complex", "multiValued": true, "mutability": "readOnly" }
      ]
    }
  ]
}"#
}

/// Returns the ServiceProviderConfig schema as a JSON string.
pub fn service_provider_config_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig",
  "name": "ServiceProviderConfig",
  "description": "Schema for representing the service provider's configuration",
  "attributes": [
    {
      "name": "documentationUri",
      "type": "reference",
      "referenceTypes": ["external"],
      "mutability": "readOnly",
      "returned": "default"
    },
    {
      "name": "patch",
      "type": "complex",
      "required": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "supported", "type": "boolean", "required": true, "mutability": "readOnly" }
      ]
    },
    {
      "name": "bulk",
      "type": "complex",
      "required": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "supported", "type": "boolean", "required": true, "mutability": "readOnly" },
        { "name": "maxOperations", "type": "integer", "mutability": "readOnly" },
        { "name": "maxPayloadSize", "type": "integer", "mutability": "readOnly" }
      ]
    },
    {
      "name": "filter",
      "type": "complex",
      "required": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "supported", "type": "boolean", "required": true, "mutability": "readOnly" },
        { "name": "maxResults", "type": "integer", "mutability": "readOnly" }
      ]
    },
    {
      "name": "changePassword",
      "type": "complex",
      "required": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "supported", "type": "boolean", "required": true, "mutability": "readOnly" }
      ]
    },
    {
      "name": "sort",
      "type": "complex",
      "required": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "supported", "type": "boolean", "required": true, "mutability": "readOnly" }
      ]
    },
    {
      "name": "etag",
      "type": "complex",
      "required": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "supported", "type": "boolean", "required": true, "mutability": "readOnly" }
      ]
    },
    {
      "name": "authenticationSchemes",
      "type": "complex",
      "multiValued": true,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        {
          "name": "type",
          "type": "string",
          "required": true,
          "canonicalValues": ["oauth", "oauth2", "oauthbearertoken", "httpbasic", "httpdigest"],
          "mutability": "readOnly"
        },
        { "name": "name", "type": "string", "required": true, "mutability": "readOnly" },
        { "name": "description", "type": "string", "required": true, "mutability": "readOnly" },
        {
          "name": "specUri",
          "type": "reference",
          "referenceTypes": ["external"],
          "mutability": "readOnly"
        },
        {
          "name": "documentationUri",
          "type": "reference",
          "referenceTypes": ["external"],
          "mutability": "readOnly"
        },
        { "name": "primary", "type": "boolean", "mutability": "readOnly" }
      ]
    }
  ]
}"#
}

/// Returns the ServiceProviderConfig instance document served at
/// `/ServiceProviderConfig`.
pub fn service_provider_config() -> &'static str {
    r#"{
  "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig"],
  "patch": { "supported": false },
  "bulk": { "supported": false, "maxOperations": 0, "maxPayloadSize": 0 },
  "filter": { "supported": true, "maxResults": 200 },
  "changePassword": { "supported": false },
  "sort": { "supported": true },
  "etag": { "supported": true },
  "authenticationSchemes": []
}"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Schema;

    #[test]
    fn embedded_schemas_parse_and_satisfy_invariants() {
        for (content, urn) in [
            (core_user_schema(), USER_SCHEMA_URN),
            (enterprise_user_schema(), ENTERPRISE_USER_SCHEMA_URN),
            (core_group_schema(), GROUP_SCHEMA_URN),
            (resource_type_schema(), RESOURCE_TYPE_SCHEMA_URN),
            (schema_schema(), SCHEMA_SCHEMA_URN),
            (
                service_provider_config_schema(),
                SERVICE_PROVIDER_CONFIG_SCHEMA_URN,
            ),
        ] {
            let schema = Schema::from_str(content).expect("embedded schema must parse");
            assert_eq!(schema.id, urn);
            assert!(!schema.attributes.is_empty());
        }
    }

    #[test]
    fn service_provider_config_is_valid_json() {
        let config: serde_json::Value = serde_json::from_str(service_provider_config()).unwrap();
        assert!(config.get("filter").is_some());
    }
}
