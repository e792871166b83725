//! In-memory resource handler.
//!
//! A process-local store intended for tests, demos and as the reference
//! handler implementation. Documents keep their insertion order so unfiltered
//! lists are stable, and declared uniqueness constraints are enforced here
//! because only the store can see every stored value.

use crate::error::{ScimError, ScimResult};
use crate::handler::ResourceHandler;
use crate::list::{self, ListParams, PartialListResponse};
use crate::schema::types::{Schema, Uniqueness};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Resource handler backed by an in-memory store.
pub struct InMemoryResourceHandler {
    resource_type_name: String,
    /// Top-level attribute names with a declared uniqueness constraint.
    unique_attributes: Vec<String>,
    store: RwLock<Vec<(String, Value)>>,
}

impl InMemoryResourceHandler {
    pub fn new(resource_type_name: impl Into<String>) -> Self {
        Self {
            resource_type_name: resource_type_name.into(),
            unique_attributes: Vec::new(),
            store: RwLock::new(Vec::new()),
        }
    }

    /// Build a handler enforcing the uniqueness constraints the schema
    /// declares on its top-level attributes.
    pub fn from_schema(resource_type_name: impl Into<String>, schema: &Schema) -> Self {
        let unique_attributes = schema
            .attributes
            .iter()
            .filter(|attr| attr.uniqueness != Uniqueness::None)
            .map(|attr| attr.name.clone())
            .collect();
        Self {
            resource_type_name: resource_type_name.into(),
            unique_attributes,
            store: RwLock::new(Vec::new()),
        }
    }

    fn not_found(&self, id: &str) -> ScimError {
        ScimError::resource_not_found(&self.resource_type_name, id)
    }

    /// Reject a value already held by another stored resource.
    fn check_uniqueness(
        &self,
        store: &[(String, Value)],
        document: &Value,
        exclude_id: Option<&str>,
    ) -> ScimResult<()> {
        for attribute in &self.unique_attributes {
            let Some(candidate) = get_ci(document, attribute) else {
                continue;
            };
            let taken = store
                .iter()
                .filter(|(id, _)| exclude_id != Some(id.as_str()))
                .filter_map(|(_, stored)| get_ci(stored, attribute))
                .any(|stored| values_collide(stored, candidate));
            if taken {
                return Err(ScimError::UniquenessConflict {
                    attribute: attribute.clone(),
                    value: render(candidate),
                });
            }
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<(String, Value)>> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<(String, Value)>> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResourceHandler for InMemoryResourceHandler {
    fn create_resource(&self, mut resource: Value) -> ScimResult<Value> {
        let mut store = self.write();
        self.check_uniqueness(&store, &resource, None)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        if let Some(map) = resource.as_object_mut() {
            map.insert("id".to_string(), Value::String(id.clone()));
            map.insert(
                "meta".to_string(),
                json!({"created": now, "lastModified": now}),
            );
        }
        log::debug!("{}: created resource {id}", self.resource_type_name);
        store.push((id, resource.clone()));
        Ok(resource)
    }

    fn get_resource(&self, id: &str) -> ScimResult<Value> {
        self.read()
            .iter()
            .find(|(stored_id, _)| stored_id == id)
            .map(|(_, doc)| doc.clone())
            .ok_or_else(|| self.not_found(id))
    }

    fn list_resources(&self, params: &ListParams) -> ScimResult<PartialListResponse> {
        let candidates: Vec<Value> = self.read().iter().map(|(_, doc)| doc.clone()).collect();
        list::apply(candidates, params)
    }

    fn update_resource(&self, id: &str, mut resource: Value) -> ScimResult<Value> {
        let mut store = self.write();
        let position = store
            .iter()
            .position(|(stored_id, _)| stored_id == id)
            .ok_or_else(|| self.not_found(id))?;
        self.check_uniqueness(&store, &resource, Some(id))?;

        let created = store[position]
            .1
            .get("meta")
            .and_then(|m| m.get("created"))
            .cloned();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        if let Some(map) = resource.as_object_mut() {
            map.insert("id".to_string(), Value::String(id.to_string()));
            let mut meta = serde_json::Map::new();
            if let Some(created) = created {
                meta.insert("created".to_string(), created);
            }
            meta.insert("lastModified".to_string(), Value::String(now));
            map.insert("meta".to_string(), Value::Object(meta));
        }
        log::debug!("{}: updated resource {id}", self.resource_type_name);
        store[position].1 = resource.clone();
        Ok(resource)
    }

    fn delete_resource(&self, id: &str) -> ScimResult<()> {
        let mut store = self.write();
        let position = store
            .iter()
            .position(|(stored_id, _)| stored_id == id)
            .ok_or_else(|| self.not_found(id))?;
        store.remove(position);
        log::debug!("{}: deleted resource {id}", self.resource_type_name);
        Ok(())
    }
}

fn get_ci<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    value
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

/// Uniqueness collision test: strings collide case-insensitively, everything
/// else by exact equality.
fn values_collide(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        _ => a == b,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::schema::embedded;

    fn user_handler() -> InMemoryResourceHandler {
        let schema = Schema::from_str(embedded::core_user_schema()).unwrap();
        InMemoryResourceHandler::from_schema("User", &schema)
    }

    #[test]
    fn create_assigns_id_and_timestamps() {
        let handler = user_handler();
        let created = handler
            .create_resource(json!({"userName": "jdoe"}))
            .unwrap();
        let id = created["id"].as_str().unwrap();
        assert!(!id.is_empty());
        assert!(created["meta"]["created"].is_string());
        assert_eq!(created["meta"]["created"], created["meta"]["lastModified"]);
        assert_eq!(handler.get_resource(id).unwrap()["userName"], "jdoe");
    }

    #[test]
    fn unique_attribute_collision_is_a_conflict() {
        let handler = user_handler();
        handler
            .create_resource(json!({"userName": "jdoe"}))
            .unwrap();
        match handler.create_resource(json!({"userName": "JDOE"})) {
            Err(ScimError::UniquenessConflict { attribute, .. }) => {
                assert_eq!(attribute, "userName");
            }
            other => panic!("expected UniquenessConflict, got {other:?}"),
        }
    }

    #[test]
    fn update_preserves_created_and_keeps_the_value_for_itself() {
        let handler = user_handler();
        let created = handler
            .create_resource(json!({"userName": "jdoe"}))
            .unwrap();
        let id = created["id"].as_str().unwrap();
        let updated = handler
            .update_resource(id, json!({"userName": "jdoe", "displayName": "John"}))
            .unwrap();
        assert_eq!(updated["meta"]["created"], created["meta"]["created"]);
        assert_eq!(updated["id"].as_str().unwrap(), id);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let handler = user_handler();
        assert!(matches!(
            handler.get_resource("missing"),
            Err(ScimError::ResourceNotFound { .. })
        ));
        assert!(matches!(
            handler.update_resource("missing", json!({})),
            Err(ScimError::ResourceNotFound { .. })
        ));
        assert!(matches!(
            handler.delete_resource("missing"),
            Err(ScimError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn delete_removes_the_resource() {
        let handler = user_handler();
        let created = handler
            .create_resource(json!({"userName": "jdoe"}))
            .unwrap();
        let id = created["id"].as_str().unwrap();
        handler.delete_resource(id).unwrap();
        assert!(handler.get_resource(id).is_err());
        let listed = handler.list_resources(&ListParams::new()).unwrap();
        assert_eq!(listed.total_results, 0);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let handler = user_handler();
        for name in ["carol", "alice", "bob"] {
            handler.create_resource(json!({"userName": name})).unwrap();
        }
        let listed = handler.list_resources(&ListParams::new()).unwrap();
        let names: Vec<&str> = listed
            .resources
            .iter()
            .map(|r| r["userName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }
}
