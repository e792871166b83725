//! The server-computed `meta` block.
//!
//! Handlers own the lifecycle timestamps; everything else in the block is
//! derived at render time. [`inject_meta`] completes a document's meta block
//! after the handler returns it: `resourceType` and `location` come from the
//! resource type descriptor and `version` is a weak ETag over the document
//! content, so two documents with equal content always carry the same
//! version.

use crate::schema::resource_type::ResourceType;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

/// The common `meta` attribute of every resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "lastModified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Weak ETag over the document content.
///
/// The hash excludes the `meta` block, so recomputing the version of an
/// already-versioned document is stable and server-side bookkeeping never
/// shifts the version.
pub fn content_version(document: &Value) -> String {
    let mut hashable = document.clone();
    if let Some(map) = hashable.as_object_mut() {
        map.remove("meta");
    }
    let canonical = serde_json::to_string(&hashable).unwrap_or_default();
    let digest = Sha256::digest(canonical.as_bytes());
    format!("W/\"{}\"", BASE64.encode(digest))
}

/// Complete the meta block of a document leaving the server.
///
/// Handler-stamped `created` and `lastModified` values are preserved; both
/// default to now for documents that never touch a store, like the
/// ServiceProviderConfig singleton. `id` is absent for that same singleton,
/// in which case `location` is the endpoint alone.
pub fn inject_meta(document: &mut Value, resource_type: &ResourceType, id: Option<&str>) {
    let Some(map) = document.as_object_mut() else {
        return;
    };

    let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    let meta_entry = map.entry("meta").or_insert_with(|| json!({}));
    if !meta_entry.is_object() {
        *meta_entry = json!({});
    }
    let Some(meta) = meta_entry.as_object_mut() else {
        return;
    };

    meta.insert(
        "resourceType".to_string(),
        Value::String(resource_type.name.clone()),
    );
    let location = match id {
        Some(id) => resource_type.location(id),
        None => resource_type.endpoint.clone(),
    };
    meta.insert("location".to_string(), Value::String(location));
    meta.entry("created").or_insert_with(|| now.clone());
    meta.entry("lastModified").or_insert(now);

    let version = content_version(document);
    if let Some(meta) = document.get_mut("meta").and_then(Value::as_object_mut) {
        meta.insert("version".to_string(), Value::String(version));
    }
}
