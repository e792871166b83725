//! Error types for SCIM provisioning operations.
//!
//! Two layers mirror the protocol: [`ValidationError`] describes a single
//! violated attribute path, and [`ScimError`] is the operation-level error a
//! caller branches on. Validation never stops at the first violation, so
//! schema failures carry a [`ValidationFailure`] with every error found in
//! one pass.

use serde::Serialize;
use std::fmt;

/// Operation-level error for registry, validation and dispatch calls.
///
/// Each variant maps to an HTTP-style status and, where the protocol defines
/// one, a `scimType` keyword for the error response body.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Unknown resource id, endpoint or resource type name.
    #[error("resource not found: {resource_type} '{id}'")]
    ResourceNotFound { resource_type: String, id: String },

    /// Bootstrap-time misconfiguration: endpoint, name or schema id already taken.
    #[error("duplicate registration: {detail}")]
    DuplicateRegistration { detail: String },

    /// A resource type references a schema URN that was never loaded.
    #[error("schema not found: {schema_id}")]
    SchemaNotFound { schema_id: String },

    /// A schema document violates the attribute model invariants.
    #[error("invalid schema '{schema_id}': {detail}")]
    InvalidSchema { schema_id: String, detail: String },

    /// The resource handler declines this operation.
    #[error("operation '{operation}' is not implemented by this resource handler")]
    NotImplemented { operation: String },

    /// Request-direction validation failed; every violation is listed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Response-direction validation failed: stored data violates its own
    /// schema. Surfaced as a server-side error, never swallowed.
    #[error("stored resource violates its schema: {0}")]
    InternalValidation(ValidationFailure),

    /// Malformed filter expression, distinct from attribute validation errors.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A value violated a declared uniqueness constraint in the backing store.
    #[error("attribute '{attribute}' violates a uniqueness constraint with value '{value}'")]
    UniquenessConflict { attribute: String, value: String },

    /// Internal server error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ScimError {
    pub fn resource_not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate_registration(detail: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            detail: detail.into(),
        }
    }

    pub fn schema_not_found(schema_id: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            schema_id: schema_id.into(),
        }
    }

    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP-style status code for the error response envelope.
    pub fn status(&self) -> u16 {
        match self {
            Self::ResourceNotFound { .. } => 404,
            Self::DuplicateRegistration { .. } | Self::UniquenessConflict { .. } => 409,
            Self::NotImplemented { .. } => 501,
            Self::Validation(_) | Self::InvalidFilter(_) => 400,
            Self::SchemaNotFound { .. }
            | Self::InvalidSchema { .. }
            | Self::InternalValidation(_)
            | Self::Internal { .. } => 500,
        }
    }

    /// Protocol `scimType` keyword, where one is defined for the error kind.
    pub fn scim_type(&self) -> Option<&'static str> {
        match self {
            Self::Validation(_) => Some("invalidValue"),
            Self::InvalidFilter(_) => Some("invalidFilter"),
            Self::UniquenessConflict { .. } => Some("uniqueness"),
            _ => None,
        }
    }

    /// Build the wire-shaped error document for this error.
    pub fn to_response(&self) -> ScimErrorResponse {
        ScimErrorResponse {
            schemas: vec![ERROR_RESPONSE_URN.to_string()],
            status: self.status().to_string(),
            scim_type: self.scim_type().map(str::to_string),
            detail: self.to_string(),
        }
    }
}

/// URN of the SCIM error response message schema.
pub const ERROR_RESPONSE_URN: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// Wire representation of an error: `{status, detail, scimType}` plus the
/// message schema URN.
#[derive(Debug, Clone, Serialize)]
pub struct ScimErrorResponse {
    pub schemas: Vec<String>,
    pub status: String,
    #[serde(rename = "scimType", skip_serializing_if = "Option::is_none")]
    pub scim_type: Option<String>,
    pub detail: String,
}

/// A single schema violation, addressed by dotted attribute path
/// (`name.givenName`, `urn:...:enterprise:2.0:User.employeeNumber`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("required attribute '{path}' is missing")]
    RequiredAttributeMissing { path: String },

    #[error("required schema extension '{schema_id}' is missing")]
    RequiredExtensionMissing { schema_id: String },

    #[error("attribute '{path}' has invalid type, expected {expected}, got {actual}")]
    InvalidType {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("attribute '{path}' is multi-valued and must be an array")]
    ExpectedMultiValued { path: String },

    #[error("attribute '{path}' is single-valued and must not be an array")]
    ExpectedSingleValued { path: String },

    #[error("attribute '{path}' has invalid value '{value}', allowed values: {allowed:?}")]
    InvalidCanonicalValue {
        path: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("attribute '{path}' is not defined by any schema of this resource type")]
    UnknownAttribute { path: String },

    #[error("attribute '{path}' is immutable and does not match its current value")]
    ImmutableModified { path: String },

    #[error("attribute '{path}' has invalid dateTime value '{value}'")]
    InvalidDateTime { path: String, value: String },

    #[error("attribute '{path}' is not valid base64 data")]
    InvalidBinary { path: String },

    #[error("attribute '{path}' has invalid reference URI '{uri}'")]
    InvalidReference { path: String, uri: String },

    #[error("attribute '{path}' reference '{uri}' does not match allowed types {allowed:?}")]
    InvalidReferenceType {
        path: String,
        uri: String,
        allowed: Vec<String>,
    },

    #[error("document has no 'schemas' attribute")]
    MissingSchemas,

    #[error("'schemas' must list '{uri}'")]
    MissingSchemaUri { uri: String },

    #[error("'schemas' lists '{uri}' which is not declared for this resource type")]
    UnknownSchemaUri { uri: String },

    #[error("malformed document: {detail}")]
    Malformed { detail: String },
}

/// Accumulated result of one validation pass.
///
/// Holds every violation found so a single failed request reports all of its
/// problems at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub errors: Vec<ValidationError>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Dotted paths of all violated attributes, for logging and assertions.
    pub fn paths(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::RequiredAttributeMissing { path }
                | ValidationError::InvalidType { path, .. }
                | ValidationError::ExpectedMultiValued { path }
                | ValidationError::ExpectedSingleValued { path }
                | ValidationError::InvalidCanonicalValue { path, .. }
                | ValidationError::UnknownAttribute { path }
                | ValidationError::ImmutableModified { path }
                | ValidationError::InvalidDateTime { path, .. }
                | ValidationError::InvalidBinary { path }
                | ValidationError::InvalidReference { path, .. }
                | ValidationError::InvalidReferenceType { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Result alias used throughout the crate.
pub type ScimResult<T> = Result<T, ScimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_shape() {
        let error = ScimError::resource_not_found("User", "123");
        let response = error.to_response();
        assert_eq!(response.status, "404");
        assert!(response.detail.contains("User"));
        assert!(response.detail.contains("123"));
        assert!(response.scim_type.is_none());
    }

    #[test]
    fn validation_failure_lists_every_violation() {
        let failure = ValidationFailure::new(vec![
            ValidationError::RequiredAttributeMissing {
                path: "userName".into(),
            },
            ValidationError::UnknownAttribute {
                path: "favouriteColour".into(),
            },
        ]);
        let rendered = failure.to_string();
        assert!(rendered.contains("userName"));
        assert!(rendered.contains("favouriteColour"));
        assert_eq!(failure.paths(), vec!["userName", "favouriteColour"]);
    }

    #[test]
    fn filter_errors_are_bad_requests_with_their_own_scim_type() {
        let error = ScimError::InvalidFilter("unexpected token".into());
        assert_eq!(error.status(), 400);
        assert_eq!(error.scim_type(), Some("invalidFilter"));
    }

    #[test]
    fn not_implemented_maps_to_501() {
        assert_eq!(ScimError::not_implemented("create").status(), 501);
    }
}
