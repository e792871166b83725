//! Schema validation engine.
//!
//! Validation runs in two directions over the same attribute walk. The
//! request direction checks client payloads before they reach a handler:
//! unknown attributes are rejected, readOnly values are silently dropped and
//! immutable values are compared against the stored resource. The response
//! direction checks documents leaving the server: writeOnly and
//! returned=never values are stripped, returned=request values appear only
//! when asked for, and any remaining schema violation means the stored data
//! is corrupt.
//!
//! A pass never stops at the first problem. Every violation is accumulated
//! into one [`ValidationFailure`] so a rejected request reports all of its
//! errors at once.

use crate::error::{ValidationError, ValidationFailure};
use crate::schema::resource_type::ResourceType;
use crate::schema::types::{
    AttributeDefinition, AttributeType, Mutability, Returned, common_attributes,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::DateTime;
use serde_json::{Map, Value};

/// Validate and transform a client payload.
///
/// `existing` is the stored document for update operations; immutable
/// attributes are checked against it. On success the returned document has
/// readOnly attributes removed and a normalized `schemas` array.
pub fn validate_request(
    resource_type: &ResourceType,
    document: &Value,
    existing: Option<&Value>,
) -> Result<Value, ValidationFailure> {
    validate(resource_type, document, Direction::Request { existing })
}

/// Validate and transform a document leaving the server.
///
/// `requested` narrows returned=request attributes; writeOnly and
/// returned=never attributes are always stripped. A missing `schemas` array
/// is reconstructed from the resource type declaration rather than rejected,
/// so catalog documents assembled server-side pass through unchanged.
pub fn validate_response(
    resource_type: &ResourceType,
    document: &Value,
    requested: &[String],
) -> Result<Value, ValidationFailure> {
    validate(resource_type, document, Direction::Response { requested })
}

#[derive(Clone, Copy)]
enum Direction<'a> {
    Request { existing: Option<&'a Value> },
    Response { requested: &'a [String] },
}

impl Direction<'_> {
    fn is_request(&self) -> bool {
        matches!(self, Direction::Request { .. })
    }
}

fn validate(
    resource_type: &ResourceType,
    document: &Value,
    direction: Direction<'_>,
) -> Result<Value, ValidationFailure> {
    let mut errors = Vec::new();

    let Some(map) = document.as_object() else {
        return Err(ValidationFailure::new(vec![ValidationError::Malformed {
            detail: "resource document must be a JSON object".to_string(),
        }]));
    };

    let schemas = check_schemas_array(resource_type, map, direction, &mut errors);

    // Base namespace: common attributes plus the base schema's attributes.
    let base_attributes: Vec<&AttributeDefinition> = common_attributes_static()
        .iter()
        .chain(resource_type.schema.attributes.iter())
        .collect();

    let mut output = Map::new();
    output.insert("schemas".to_string(), Value::Array(schemas));

    for (key, value) in map {
        if key.eq_ignore_ascii_case("schemas") {
            continue;
        }
        if let Some(extension) = resource_type
            .schema_extensions
            .iter()
            .find(|ext| ext.schema.id.eq_ignore_ascii_case(key))
        {
            let transformed =
                validate_extension_namespace(&extension.schema, value, direction, &mut errors);
            if let Some(transformed) = transformed {
                output.insert(extension.schema.id.clone(), transformed);
            }
            continue;
        }
        match base_attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(key))
        {
            Some(attribute) => {
                let existing = existing_value(direction, &attribute.name);
                if let Some(transformed) = validate_attribute(
                    attribute,
                    value,
                    &attribute.name.clone(),
                    direction,
                    existing,
                    &mut errors,
                ) {
                    output.insert(attribute.name.clone(), transformed);
                }
            }
            // Unknown attributes are rejected on input but silently dropped
            // on output, for forward compatibility with stores that hold
            // more than the published schema.
            None if direction.is_request() => {
                errors.push(ValidationError::UnknownAttribute { path: key.clone() })
            }
            None => {}
        }
    }

    check_required(&base_attributes, &output, "", direction, &mut errors);
    for extension in &resource_type.schema_extensions {
        if extension.required && !output.contains_key(&extension.schema.id) {
            errors.push(ValidationError::RequiredExtensionMissing {
                schema_id: extension.schema.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(output))
    } else {
        Err(ValidationFailure::new(errors))
    }
}

/// Check the `schemas` array and return its normalized value: the base URN
/// followed by the URNs of the extension namespaces actually present.
fn check_schemas_array(
    resource_type: &ResourceType,
    map: &Map<String, Value>,
    direction: Direction<'_>,
    errors: &mut Vec<ValidationError>,
) -> Vec<Value> {
    let declared = resource_type.schema_ids();
    let listed: Option<Vec<String>> = map
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("schemas"))
        .map(|(_, v)| match v {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(()),
                })
                .collect::<Result<Vec<_>, _>>()
                .unwrap_or_default(),
            _ => Vec::new(),
        });

    match &listed {
        None => {
            // Server-assembled documents may omit the array; clients may not.
            if direction.is_request() {
                errors.push(ValidationError::MissingSchemas);
            }
        }
        Some(uris) => {
            if uris.is_empty() {
                errors.push(ValidationError::MissingSchemas);
            } else {
                if !uris
                    .iter()
                    .any(|uri| uri.eq_ignore_ascii_case(&resource_type.schema.id))
                {
                    errors.push(ValidationError::MissingSchemaUri {
                        uri: resource_type.schema.id.clone(),
                    });
                }
                for uri in uris {
                    if !declared.iter().any(|d| d.eq_ignore_ascii_case(uri)) {
                        errors.push(ValidationError::UnknownSchemaUri { uri: uri.clone() });
                    }
                }
            }
        }
    }

    let mut normalized = vec![Value::String(resource_type.schema.id.clone())];
    for extension in &resource_type.schema_extensions {
        let present = map
            .keys()
            .any(|k| k.eq_ignore_ascii_case(&extension.schema.id));
        if present {
            normalized.push(Value::String(extension.schema.id.clone()));
        }
    }
    normalized
}

/// Validate an extension namespace object against its schema.
fn validate_extension_namespace(
    schema: &crate::schema::types::Schema,
    value: &Value,
    direction: Direction<'_>,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    let Some(map) = value.as_object() else {
        errors.push(ValidationError::InvalidType {
            path: schema.id.clone(),
            expected: "complex".to_string(),
            actual: json_type_name(value).to_string(),
        });
        return None;
    };

    let mut output = Map::new();
    for (key, sub_value) in map {
        match schema.find_attribute(key) {
            Some(attribute) => {
                let path = format!("{}.{}", schema.id, attribute.name);
                let existing = existing_value(direction, &schema.id)
                    .and_then(|ns| get_ci(ns, &attribute.name));
                if let Some(transformed) =
                    validate_attribute(attribute, sub_value, &path, direction, existing, errors)
                {
                    output.insert(attribute.name.clone(), transformed);
                }
            }
            None if direction.is_request() => errors.push(ValidationError::UnknownAttribute {
                path: format!("{}.{}", schema.id, key),
            }),
            None => {}
        }
    }

    let attributes: Vec<&AttributeDefinition> = schema.attributes.iter().collect();
    check_required(
        &attributes,
        &output,
        &format!("{}.", schema.id),
        direction,
        errors,
    );

    if output.is_empty() {
        None
    } else {
        Some(Value::Object(output))
    }
}

/// Validate one attribute value. Returns the transformed value, or `None`
/// when the value is dropped by a mutability or returned policy.
fn validate_attribute(
    attribute: &AttributeDefinition,
    value: &Value,
    path: &str,
    direction: Direction<'_>,
    existing: Option<&Value>,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    if value.is_null() {
        return None;
    }

    match direction {
        Direction::Request {
            existing: existing_doc,
        } => {
            if attribute.mutability == Mutability::ReadOnly {
                return None;
            }
            if attribute.mutability == Mutability::Immutable
                && existing_doc.is_some()
                && existing.is_some_and(|current| current != value)
            {
                errors.push(ValidationError::ImmutableModified {
                    path: path.to_string(),
                });
                return None;
            }
        }
        Direction::Response { requested } => {
            if attribute.mutability == Mutability::WriteOnly
                || attribute.returned == Returned::Never
            {
                return None;
            }
            if attribute.returned == Returned::Request && !requested_matches(path, requested) {
                return None;
            }
        }
    }

    if attribute.multi_valued {
        let Some(items) = value.as_array() else {
            errors.push(ValidationError::ExpectedMultiValued {
                path: path.to_string(),
            });
            return None;
        };
        let transformed: Vec<Value> = items
            .iter()
            .filter_map(|item| {
                validate_single_value(attribute, item, path, direction, None, errors)
            })
            .collect();
        Some(Value::Array(transformed))
    } else {
        if value.is_array() {
            errors.push(ValidationError::ExpectedSingleValued {
                path: path.to_string(),
            });
            return None;
        }
        validate_single_value(attribute, value, path, direction, existing, errors)
    }
}

/// Type and canonical checks for one scalar or complex element.
fn validate_single_value(
    attribute: &AttributeDefinition,
    value: &Value,
    path: &str,
    direction: Direction<'_>,
    existing: Option<&Value>,
    errors: &mut Vec<ValidationError>,
) -> Option<Value> {
    match attribute.data_type {
        AttributeType::String => {
            let Some(s) = value.as_str() else {
                push_type_error(errors, path, "string", value);
                return None;
            };
            check_canonical(attribute, s, path, errors);
            Some(value.clone())
        }
        AttributeType::Boolean => {
            if !value.is_boolean() {
                push_type_error(errors, path, "boolean", value);
                return None;
            }
            Some(value.clone())
        }
        AttributeType::Decimal => {
            if !value.is_number() {
                push_type_error(errors, path, "decimal", value);
                return None;
            }
            Some(value.clone())
        }
        AttributeType::Integer => {
            if value.as_i64().is_none() && value.as_u64().is_none() {
                push_type_error(errors, path, "integer", value);
                return None;
            }
            Some(value.clone())
        }
        AttributeType::DateTime => {
            let valid = value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok());
            if !valid {
                errors.push(ValidationError::InvalidDateTime {
                    path: path.to_string(),
                    value: render_scalar(value),
                });
                return None;
            }
            Some(value.clone())
        }
        AttributeType::Binary => {
            let valid = value.as_str().is_some_and(|s| BASE64.decode(s).is_ok());
            if !valid {
                errors.push(ValidationError::InvalidBinary {
                    path: path.to_string(),
                });
                return None;
            }
            Some(value.clone())
        }
        AttributeType::Reference => {
            let Some(uri) = value.as_str() else {
                push_type_error(errors, path, "reference", value);
                return None;
            };
            check_canonical(attribute, uri, path, errors);
            if !is_uri_shaped(uri) {
                errors.push(ValidationError::InvalidReference {
                    path: path.to_string(),
                    uri: uri.to_string(),
                });
                return None;
            }
            if !reference_type_allowed(uri, &attribute.reference_types) {
                errors.push(ValidationError::InvalidReferenceType {
                    path: path.to_string(),
                    uri: uri.to_string(),
                    allowed: attribute.reference_types.clone(),
                });
                return None;
            }
            Some(value.clone())
        }
        AttributeType::Complex => {
            let Some(map) = value.as_object() else {
                push_type_error(errors, path, "complex", value);
                return None;
            };
            // A complex attribute declared without sub-attributes carries
            // opaque structured content, like the nested `subAttributes` of
            // the Schema meta-schema.
            if attribute.sub_attributes.is_empty() {
                return Some(value.clone());
            }
            let mut output = Map::new();
            for (key, sub_value) in map {
                match attribute.find_sub_attribute(key) {
                    Some(sub) => {
                        let sub_path = format!("{path}.{}", sub.name);
                        let sub_existing = existing.and_then(|e| get_ci(e, &sub.name));
                        if let Some(transformed) = validate_attribute(
                            sub,
                            sub_value,
                            &sub_path,
                            direction,
                            sub_existing,
                            errors,
                        ) {
                            output.insert(sub.name.clone(), transformed);
                        }
                    }
                    None if direction.is_request() => {
                        errors.push(ValidationError::UnknownAttribute {
                            path: format!("{path}.{key}"),
                        })
                    }
                    None => {}
                }
            }
            let subs: Vec<&AttributeDefinition> = attribute.sub_attributes.iter().collect();
            check_required(&subs, &output, &format!("{path}."), direction, errors);
            Some(Value::Object(output))
        }
    }
}

fn check_canonical(
    attribute: &AttributeDefinition,
    value: &str,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    if attribute.canonical_values.is_empty() {
        return;
    }
    let allowed = attribute.canonical_values.iter().any(|canonical| {
        if attribute.case_exact {
            canonical == value
        } else {
            canonical.eq_ignore_ascii_case(value)
        }
    });
    if !allowed {
        errors.push(ValidationError::InvalidCanonicalValue {
            path: path.to_string(),
            value: value.to_string(),
            allowed: attribute.canonical_values.clone(),
        });
    }
}

/// Required attributes must survive to the output document. Client-unwritable
/// and never-returned attributes are exempt in their respective direction.
fn check_required(
    attributes: &[&AttributeDefinition],
    output: &Map<String, Value>,
    path_prefix: &str,
    direction: Direction<'_>,
    errors: &mut Vec<ValidationError>,
) {
    for attribute in attributes {
        if !attribute.required {
            continue;
        }
        let exempt = match direction {
            Direction::Request { .. } => attribute.mutability == Mutability::ReadOnly,
            Direction::Response { requested } => {
                attribute.mutability == Mutability::WriteOnly
                    || attribute.returned == Returned::Never
                    || (attribute.returned == Returned::Request
                        && !requested_matches(
                            &format!("{path_prefix}{}", attribute.name),
                            requested,
                        ))
            }
        };
        if exempt {
            continue;
        }
        if !output.contains_key(&attribute.name) {
            errors.push(ValidationError::RequiredAttributeMissing {
                path: format!("{path_prefix}{}", attribute.name),
            });
        }
    }
}

/// A requested path matches an attribute when either is a dotted prefix of
/// the other, so requesting `name` returns `name.givenName` and requesting
/// `name.givenName` returns the enclosing `name`.
fn requested_matches(path: &str, requested: &[String]) -> bool {
    requested.iter().any(|r| {
        let r = r.to_lowercase();
        let p = path.to_lowercase();
        r == p || p.starts_with(&format!("{r}.")) || r.starts_with(&format!("{p}."))
    })
}

fn existing_value<'a>(direction: Direction<'a>, key: &str) -> Option<&'a Value> {
    match direction {
        Direction::Request {
            existing: Some(doc),
        } => get_ci(doc, key),
        _ => None,
    }
}

fn get_ci<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    value
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

/// Accept absolute URIs, URNs and server-relative paths.
fn is_uri_shaped(uri: &str) -> bool {
    uri.contains("://") || uri.to_lowercase().starts_with("urn:") || uri.starts_with('/')
}

/// A reference is acceptable when its declared types include `external` or
/// `uri`, or when the URI mentions one of the allowed resource type names.
fn reference_type_allowed(uri: &str, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let uri_lower = uri.to_lowercase();
    allowed.iter().any(|t| {
        t.eq_ignore_ascii_case("external")
            || t.eq_ignore_ascii_case("uri")
            || uri_lower.contains(&t.to_lowercase())
    })
}

fn push_type_error(errors: &mut Vec<ValidationError>, path: &str, expected: &str, value: &Value) {
    errors.push(ValidationError::InvalidType {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: json_type_name(value).to_string(),
    });
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn common_attributes_static() -> &'static [AttributeDefinition] {
    use std::sync::OnceLock;
    static COMMON: OnceLock<Vec<AttributeDefinition>> = OnceLock::new();
    COMMON.get_or_init(common_attributes)
}
