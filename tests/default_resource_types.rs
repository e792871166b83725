//! Integration tests for the default resource type set and the catalog
//! endpoints.

use scim_provisioning::{ListParams, ResourceEndpoint, ScimError};
use serde_json::json;

fn endpoint() -> ResourceEndpoint {
    let _ = env_logger::builder().is_test(true).try_init();
    ResourceEndpoint::with_default_resource_types().unwrap()
}

#[test]
fn the_six_standard_resource_types_are_registered() {
    let endpoint = endpoint();
    let names: Vec<String> = endpoint
        .registry()
        .get_all_resource_types()
        .iter()
        .map(|rt| rt.name.clone())
        .collect();
    assert_eq!(
        names,
        vec![
            "User",
            "Group",
            "Me",
            "ResourceType",
            "Schema",
            "ServiceProviderConfig"
        ]
    );
}

#[test]
fn resource_types_resolve_by_endpoint_and_by_name() {
    let endpoint = endpoint();
    for key in ["/Users", "users", "User", "user"] {
        assert_eq!(
            endpoint.registry().get_resource_type(key).unwrap().name,
            "User"
        );
    }
    assert!(matches!(
        endpoint.registry().get_resource_type("/Widgets"),
        Err(ScimError::ResourceNotFound { .. })
    ));
}

#[test]
fn resource_type_catalog_lists_all_six() {
    let endpoint = endpoint();
    let listed = endpoint
        .list("/ResourceTypes", &ListParams::new(), &[])
        .unwrap();
    assert_eq!(listed.total_results, 6);
    assert_eq!(listed.items_per_page, 6);

    let user = listed
        .resources
        .iter()
        .find(|r| r["name"] == "User")
        .unwrap();
    assert_eq!(user["endpoint"], "/Users");
    assert_eq!(
        user["schemaExtensions"][0]["schema"],
        "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
    );
    assert_eq!(user["meta"]["resourceType"], "ResourceType");
    assert_eq!(user["meta"]["location"], "/ResourceTypes/User");
}

#[test]
fn catalog_endpoints_decline_writes() {
    let endpoint = endpoint();
    let payload = json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ResourceType"],
        "name": "Widget",
        "endpoint": "/Widgets",
        "schema": "urn:example:Widget"
    });
    match endpoint.create("/ResourceTypes", payload) {
        Err(err @ ScimError::NotImplemented { .. }) => {
            assert_eq!(err.status(), 501);
        }
        other => panic!("expected NotImplemented, got {other:?}"),
    }
    assert!(matches!(
        endpoint.delete("/Schemas", "urn:ietf:params:scim:schemas:core:2.0:User"),
        Err(ScimError::NotImplemented { .. })
    ));
}

#[test]
fn unknown_catalog_entries_are_not_found() {
    let endpoint = endpoint();
    assert!(matches!(
        endpoint.get("/ResourceTypes", "Widget", &[]),
        Err(ScimError::ResourceNotFound { .. })
    ));
    assert!(matches!(
        endpoint.get("/Schemas", "urn:example:unknown", &[]),
        Err(ScimError::ResourceNotFound { .. })
    ));
}

#[test]
fn schema_catalog_serves_every_registered_schema() {
    let endpoint = endpoint();
    let listed = endpoint.list("/Schemas", &ListParams::new(), &[]).unwrap();
    assert_eq!(listed.total_results, 6);

    let user = endpoint
        .get(
            "/Schemas",
            "urn:ietf:params:scim:schemas:core:2.0:User",
            &[],
        )
        .unwrap();
    assert_eq!(user["name"], "User");
    assert!(user["attributes"].as_array().unwrap().len() > 5);
    assert_eq!(user["meta"]["resourceType"], "Schema");
}

#[test]
fn listing_an_empty_registry_is_not_an_error() {
    use scim_provisioning::{ResourceTypeHandler, ResourceTypeRegistry};
    let registry = ResourceTypeRegistry::new();
    let handler = ResourceTypeHandler::new(registry.clone());
    let params = ListParams::new().with_start_index(1).with_count(0);
    let result = scim_provisioning::ResourceHandler::list_resources(&handler, &params).unwrap();
    assert_eq!(result.total_results, 0);
    assert!(result.resources.is_empty());
}

#[test]
fn service_provider_config_is_served_without_an_id() {
    let endpoint = endpoint();
    let config = endpoint.get("/ServiceProviderConfig", "", &[]).unwrap();
    assert_eq!(config["filter"]["supported"], true);
    assert_eq!(config["filter"]["maxResults"], 200);
    assert_eq!(config["patch"]["supported"], false);
    assert_eq!(config["meta"]["resourceType"], "ServiceProviderConfig");
    assert_eq!(config["meta"]["location"], "/ServiceProviderConfig");
    assert!(config.get("id").is_none());
}

#[test]
fn me_endpoint_shares_the_user_store() {
    let endpoint = endpoint();
    let created = endpoint
        .create(
            "/Users",
            json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "userName": "jdoe"
            }),
        )
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let me = endpoint.get("/Me", id, &[]).unwrap();
    assert_eq!(me["userName"], "jdoe");
    // The alias keeps its own identity in the meta block.
    assert_eq!(me["meta"]["resourceType"], "Me");
    assert_eq!(me["meta"]["location"], format!("/Me/{id}"));
}

#[test]
fn clearing_the_registry_empties_the_catalog() {
    let endpoint = endpoint();
    endpoint.registry().clear_all();
    assert!(endpoint.registry().get_all_resource_types().is_empty());
    assert!(matches!(
        endpoint.list("/ResourceTypes", &ListParams::new(), &[]),
        Err(ScimError::ResourceNotFound { .. })
    ));
}
