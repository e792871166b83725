//! Integration tests for the full request pipeline on regular resources:
//! validation, dispatch, meta injection and the list engine.

use scim_provisioning::{ListParams, ResourceEndpoint, ScimError, SortOrder};
use serde_json::{Value, json};

const USER_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
const ENTERPRISE_URN: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

fn endpoint() -> ResourceEndpoint {
    let _ = env_logger::builder().is_test(true).try_init();
    ResourceEndpoint::with_default_resource_types().unwrap()
}

fn create_user(endpoint: &ResourceEndpoint, user_name: &str) -> Value {
    endpoint
        .create(
            "/Users",
            json!({"schemas": [USER_URN], "userName": user_name}),
        )
        .unwrap()
}

#[test]
fn create_get_update_delete_round_trip() {
    let endpoint = endpoint();
    let created = endpoint
        .create(
            "/Users",
            json!({
                "schemas": [USER_URN],
                "userName": "jdoe",
                "name": {"givenName": "John", "familyName": "Doe"},
                "password": "hunter2"
            }),
        )
        .unwrap();

    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["userName"], "jdoe");
    assert_eq!(created["meta"]["resourceType"], "User");
    assert_eq!(created["meta"]["location"], format!("/Users/{id}"));
    assert!(created["meta"]["version"].as_str().unwrap().starts_with("W/\""));
    // writeOnly attributes never appear in responses.
    assert!(created.get("password").is_none());

    let fetched = endpoint.get("/Users", &id, &[]).unwrap();
    assert_eq!(fetched["name"]["givenName"], "John");

    let updated = endpoint
        .update(
            "/Users",
            &id,
            json!({"schemas": [USER_URN], "userName": "jdoe", "displayName": "John Doe"}),
        )
        .unwrap();
    assert_eq!(updated["displayName"], "John Doe");
    assert_eq!(updated["meta"]["created"], created["meta"]["created"]);
    // Content changed, so the version moved.
    assert_ne!(updated["meta"]["version"], created["meta"]["version"]);

    endpoint.delete("/Users", &id).unwrap();
    assert!(matches!(
        endpoint.get("/Users", &id, &[]),
        Err(ScimError::ResourceNotFound { .. })
    ));
}

#[test]
fn client_supplied_read_only_values_are_ignored() {
    let endpoint = endpoint();
    let created = endpoint
        .create(
            "/Users",
            json!({
                "schemas": [USER_URN],
                "userName": "jdoe",
                "id": "client-picked",
                "meta": {"resourceType": "Robot", "location": "/Robots/1"}
            }),
        )
        .unwrap();
    assert_ne!(created["id"], "client-picked");
    assert_eq!(created["meta"]["resourceType"], "User");
}

#[test]
fn invalid_payloads_report_every_violation_as_a_bad_request() {
    let endpoint = endpoint();
    let result = endpoint.create(
        "/Users",
        json!({
            "schemas": [USER_URN],
            "active": "yes",
            "emails": {"value": "not-an-array"},
            "shoeSize": 43
        }),
    );
    match result {
        Err(err @ ScimError::Validation(_)) => {
            assert_eq!(err.status(), 400);
            assert_eq!(err.scim_type(), Some("invalidValue"));
            let ScimError::Validation(failure) = &err else {
                unreachable!()
            };
            assert_eq!(failure.errors.len(), 4);
            let response = err.to_response();
            assert_eq!(response.status, "400");
            assert!(response.detail.contains("userName"));
            assert!(response.detail.contains("shoeSize"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn duplicate_user_name_is_a_uniqueness_conflict() {
    let endpoint = endpoint();
    create_user(&endpoint, "jdoe");
    match endpoint.create("/Users", json!({"schemas": [USER_URN], "userName": "JDoe"})) {
        Err(err @ ScimError::UniquenessConflict { .. }) => {
            assert_eq!(err.status(), 409);
            assert_eq!(err.scim_type(), Some("uniqueness"));
        }
        other => panic!("expected UniquenessConflict, got {other:?}"),
    }
}

#[test]
fn enterprise_extension_round_trips_under_its_urn() {
    let endpoint = endpoint();
    let created = endpoint
        .create(
            "/Users",
            json!({
                "schemas": [USER_URN, ENTERPRISE_URN],
                "userName": "jdoe",
                (ENTERPRISE_URN): {"employeeNumber": "E-42", "department": "Tooling"}
            }),
        )
        .unwrap();
    assert_eq!(created[ENTERPRISE_URN]["employeeNumber"], "E-42");
    assert_eq!(
        created["schemas"],
        json!([USER_URN, ENTERPRISE_URN])
    );
}

#[test]
fn list_filters_sorts_and_paginates() {
    let endpoint = endpoint();
    for name in ["carol", "alice", "dave", "bob"] {
        create_user(&endpoint, name);
    }
    endpoint
        .update(
            "/Users",
            endpoint
                .list("/Users", &ListParams::new().with_filter(r#"userName eq "dave""#), &[])
                .unwrap()
                .resources[0]["id"]
                .as_str()
                .unwrap(),
            json!({"schemas": [USER_URN], "userName": "dave", "active": false}),
        )
        .unwrap();

    let params = ListParams::new()
        .with_filter(r#"not (active eq false)"#)
        .with_sort("userName", SortOrder::Ascending)
        .with_start_index(2)
        .with_count(2);
    let listed = endpoint.list("/Users", &params, &[]).unwrap();
    assert_eq!(listed.total_results, 3);
    assert_eq!(listed.start_index, 2);
    assert_eq!(listed.items_per_page, 2);
    let names: Vec<&str> = listed
        .resources
        .iter()
        .map(|r| r["userName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bob", "carol"]);
}

#[test]
fn case_exact_attributes_filter_case_sensitively() {
    let endpoint = endpoint();
    endpoint
        .create(
            "/Users",
            json!({"schemas": [USER_URN], "userName": "jdoe", "externalId": "Ext-42"}),
        )
        .unwrap();

    // externalId is caseExact, so only the stored spelling matches.
    let listed = endpoint
        .list(
            "/Users",
            &ListParams::new().with_filter(r#"externalId eq "ext-42""#),
            &[],
        )
        .unwrap();
    assert_eq!(listed.total_results, 0);

    let listed = endpoint
        .list(
            "/Users",
            &ListParams::new().with_filter(r#"externalId eq "Ext-42""#),
            &[],
        )
        .unwrap();
    assert_eq!(listed.total_results, 1);

    // userName is not caseExact and keeps matching case-insensitively.
    let listed = endpoint
        .list(
            "/Users",
            &ListParams::new().with_filter(r#"userName eq "JDOE""#),
            &[],
        )
        .unwrap();
    assert_eq!(listed.total_results, 1);
}

#[test]
fn count_zero_probes_the_total_without_returning_resources() {
    let endpoint = endpoint();
    create_user(&endpoint, "jdoe");
    create_user(&endpoint, "asmith");
    let listed = endpoint
        .list("/Users", &ListParams::new().with_count(0), &[])
        .unwrap();
    assert_eq!(listed.total_results, 2);
    assert!(listed.resources.is_empty());
    assert_eq!(listed.items_per_page, 0);
}

#[test]
fn malformed_filters_are_rejected_as_invalid_filter() {
    let endpoint = endpoint();
    create_user(&endpoint, "jdoe");
    let result = endpoint.list(
        "/Users",
        &ListParams::new().with_filter(r#"userName eq "unterminated"#),
        &[],
    );
    match result {
        Err(err @ ScimError::InvalidFilter(_)) => {
            assert_eq!(err.status(), 400);
            assert_eq!(err.scim_type(), Some("invalidFilter"));
        }
        other => panic!("expected InvalidFilter, got {other:?}"),
    }
}

#[test]
fn descending_sort_over_a_sparse_attribute() {
    let endpoint = endpoint();
    create_user(&endpoint, "plain");
    endpoint
        .create(
            "/Users",
            json!({"schemas": [USER_URN], "userName": "titled", "title": "Director"}),
        )
        .unwrap();
    let listed = endpoint
        .list(
            "/Users",
            &ListParams::new().with_sort("title", SortOrder::Descending),
            &[],
        )
        .unwrap();
    // Missing sort keys come first when descending.
    assert_eq!(listed.resources[0]["userName"], "plain");
    assert_eq!(listed.resources[1]["userName"], "titled");
}

#[test]
fn operations_on_unknown_endpoints_are_not_found() {
    let endpoint = endpoint();
    let result = endpoint.create("/Widgets", json!({"schemas": ["urn:x"], "name": "w"}));
    match result {
        Err(err @ ScimError::ResourceNotFound { .. }) => assert_eq!(err.status(), 404),
        other => panic!("expected ResourceNotFound, got {other:?}"),
    }
}
