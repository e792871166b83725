//! Core schema type definitions for SCIM resources.
//!
//! This module contains the fundamental data structures that describe SCIM
//! schemas and their attributes as specified in RFC 7643: a schema is a named
//! URN with an ordered list of [`AttributeDefinition`] trees, each carrying
//! the type, cardinality and policy flags the validation engine enforces.

use crate::error::ScimError;
use serde::{Deserialize, Serialize};

/// A SCIM schema definition.
///
/// A named, URN-identified set of top-level attribute definitions. Schemas
/// are loaded once at bootstrap and are immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Unique schema identifier (URN)
    pub id: String,
    /// Human-readable schema name
    pub name: String,
    /// Schema description
    #[serde(default)]
    pub description: String,
    /// Ordered list of top-level attribute definitions
    pub attributes: Vec<AttributeDefinition>,
}

impl Schema {
    /// Parse a schema document from JSON text and check the attribute model
    /// invariants on every node of the tree.
    pub fn from_str(content: &str) -> Result<Self, ScimError> {
        let schema: Schema = serde_json::from_str(content).map_err(|e| ScimError::InvalidSchema {
            schema_id: "<unparsed>".to_string(),
            detail: e.to_string(),
        })?;
        schema.check_invariants()?;
        Ok(schema)
    }

    /// Parse a schema document from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ScimError> {
        let schema: Schema =
            serde_json::from_value(value).map_err(|e| ScimError::InvalidSchema {
                schema_id: "<unparsed>".to_string(),
                detail: e.to_string(),
            })?;
        schema.check_invariants()?;
        Ok(schema)
    }

    fn check_invariants(&self) -> Result<(), ScimError> {
        for attribute in &self.attributes {
            attribute.check_invariants().map_err(|detail| {
                ScimError::InvalidSchema {
                    schema_id: self.id.clone(),
                    detail,
                }
            })?;
        }
        Ok(())
    }

    /// Find a top-level attribute by case-insensitive name.
    pub fn find_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }
}

/// Definition of a single SCIM attribute: one node of the schema tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute name, unique within its parent
    pub name: String,
    /// Data type of the attribute
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    /// Whether this attribute carries a sequence of values
    #[serde(rename = "multiValued", default)]
    pub multi_valued: bool,
    /// Whether this attribute must be present on incoming writes
    #[serde(default)]
    pub required: bool,
    /// Whether string comparison is case-sensitive
    #[serde(rename = "caseExact", default)]
    pub case_exact: bool,
    /// Write policy
    #[serde(default)]
    pub mutability: Mutability,
    /// Return-visibility policy
    #[serde(default)]
    pub returned: Returned,
    /// Uniqueness scope; declared metadata only, enforced by the backing store
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Closed set of allowed string values; empty means unrestricted
    #[serde(
        rename = "canonicalValues",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub canonical_values: Vec<String>,
    /// Allowed reference targets, relevant only when `type` is `reference`
    #[serde(
        rename = "referenceTypes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub reference_types: Vec<String>,
    /// Sub-attributes; non-empty only when `type` is `complex`
    #[serde(
        rename = "subAttributes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sub_attributes: Vec<AttributeDefinition>,
}

impl AttributeDefinition {
    /// Find a sub-attribute by case-insensitive name.
    pub fn find_sub_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.sub_attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// Check the invariants of this node and its subtree.
    ///
    /// A definition with sub-attributes must be `complex`, and canonical
    /// values only make sense for string-like types.
    fn check_invariants(&self) -> Result<(), String> {
        if !self.sub_attributes.is_empty() && self.data_type != AttributeType::Complex {
            return Err(format!(
                "attribute '{}' declares sub-attributes but has type {:?}",
                self.name, self.data_type
            ));
        }
        if !self.canonical_values.is_empty()
            && !matches!(
                self.data_type,
                AttributeType::String | AttributeType::Reference
            )
        {
            return Err(format!(
                "attribute '{}' declares canonical values but has type {:?}",
                self.name, self.data_type
            ));
        }
        for sub in &self.sub_attributes {
            sub.check_invariants()?;
        }
        Ok(())
    }
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            data_type: AttributeType::String,
            multi_valued: false,
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
            sub_attributes: Vec::new(),
        }
    }
}

/// SCIM attribute data types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    /// String value
    String,
    /// Boolean value
    Boolean,
    /// Decimal number
    Decimal,
    /// Integer number
    Integer,
    /// DateTime in RFC 3339 format
    DateTime,
    /// Binary data (base64 encoded)
    Binary,
    /// URI reference
    Reference,
    /// Complex attribute with sub-attributes
    Complex,
}

impl Default for AttributeType {
    fn default() -> Self {
        Self::String
    }
}

/// Attribute mutability: whether and how a client may set the value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    /// Server-controlled; client-supplied values are silently dropped
    ReadOnly,
    /// Freely writable
    ReadWrite,
    /// Set once, never changed afterwards
    Immutable,
    /// Accepted on writes, never echoed back (passwords)
    WriteOnly,
}

impl Default for Mutability {
    fn default() -> Self {
        Self::ReadWrite
    }
}

/// Return-visibility policy: whether the attribute appears in responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    /// Always returned
    Always,
    /// Never returned
    Never,
    /// Returned unless the caller narrows the attribute set
    Default,
    /// Returned only when explicitly requested
    Request,
}

impl Default for Returned {
    fn default() -> Self {
        Self::Default
    }
}

/// Uniqueness scope of an attribute value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Uniqueness {
    /// No uniqueness constraint
    None,
    /// Unique within the server
    Server,
    /// Globally unique
    Global,
}

impl Default for Uniqueness {
    fn default() -> Self {
        Self::None
    }
}

/// Definitions of the common attributes every resource carries regardless of
/// its schema: `id`, `externalId` and the server-computed `meta` block.
///
/// The core schemas published by the server do not repeat these, so the
/// validation engine unions them into every resource type's effective
/// attribute set.
pub fn common_attributes() -> Vec<AttributeDefinition> {
    vec![
        AttributeDefinition {
            name: "id".to_string(),
            data_type: AttributeType::String,
            case_exact: true,
            mutability: Mutability::ReadOnly,
            returned: Returned::Always,
            uniqueness: Uniqueness::Server,
            ..Default::default()
        },
        AttributeDefinition {
            name: "externalId".to_string(),
            data_type: AttributeType::String,
            case_exact: true,
            ..Default::default()
        },
        AttributeDefinition {
            name: "meta".to_string(),
            data_type: AttributeType::Complex,
            mutability: Mutability::ReadOnly,
            sub_attributes: vec![
                AttributeDefinition {
                    name: "resourceType".to_string(),
                    data_type: AttributeType::String,
                    case_exact: true,
                    mutability: Mutability::ReadOnly,
                    ..Default::default()
                },
                AttributeDefinition {
                    name: "created".to_string(),
                    data_type: AttributeType::DateTime,
                    mutability: Mutability::ReadOnly,
                    ..Default::default()
                },
                AttributeDefinition {
                    name: "lastModified".to_string(),
                    data_type: AttributeType::DateTime,
                    mutability: Mutability::ReadOnly,
                    ..Default::default()
                },
                AttributeDefinition {
                    name: "location".to_string(),
                    data_type: AttributeType::Reference,
                    reference_types: vec!["uri".to_string()],
                    mutability: Mutability::ReadOnly,
                    ..Default::default()
                },
                AttributeDefinition {
                    name: "version".to_string(),
                    data_type: AttributeType::String,
                    case_exact: true,
                    mutability: Mutability::ReadOnly,
                    ..Default::default()
                },
            ],
            ..Default::default()
        },
    ]
}
