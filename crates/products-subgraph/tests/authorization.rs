mod common;

use common::{anonymous, as_user, schema, StubAuthorizer};
use subgraph_authz::EntityRef;

fn error_code(error: &async_graphql::ServerError) -> serde_json::Value {
    serde_json::to_value(error.extensions.as_ref().unwrap()).unwrap()["code"].clone()
}

#[tokio::test]
async fn secret_field_requires_a_logged_in_user() {
    let (authorizer, decisions) = StubAuthorizer::allow_all();
    let schema = schema(authorizer);

    let query = r#"{ product(id: "converse-1") { ... on Product { secretField(id: "converse-1") } } }"#;
    for request in [async_graphql::Request::new(query), anonymous(query)] {
        let response = schema.execute(request).await;
        assert_eq!(response.errors.len(), 1, "{:?}", response.errors);
        assert_eq!(response.errors[0].message, "authentication required");
        assert_eq!(error_code(&response.errors[0]), "UNAUTHENTICATED");
    }
    assert!(decisions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn secret_field_is_gated_per_product() {
    let (authorizer, decisions) = StubAuthorizer::with_rule(|subject, permission, resource| {
        subject == EntityRef::new("User", "u1")
            && permission == "read"
            && resource == EntityRef::new("Product", "converse-1")
    });
    let schema = schema(authorizer);

    let response = schema
        .execute(as_user(
            "u1",
            r#"{ product(id: "converse-1") { ... on Product { secretField(id: "converse-1") } } }"#,
        ))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "product": { "secretField": "margin on this one is paper thin" } })
    );

    let response = schema
        .execute(as_user(
            "u1",
            r#"{ product(id: "vans-1") { ... on Product { secretField(id: "vans-1") } } }"#,
        ))
        .await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "not allowed to read Product vans-1");
    assert_eq!(error_code(&response.errors[0]), "UNAUTHORIZED");

    assert_eq!(
        decisions.lock().unwrap().as_slice(),
        ["User:u1 read Product:converse-1", "User:u1 read Product:vans-1"]
    );
}

#[tokio::test]
async fn change_name_authorizes_against_the_staged_product() {
    let (authorizer, decisions) = StubAuthorizer::allow_all();
    let response = schema(authorizer)
        .execute(as_user(
            "u1",
            r#"mutation { product(id: "converse-1") { changeName(name: "Converse All Star") } }"#,
        ))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        decisions.lock().unwrap().as_slice(),
        ["User:u1 edit Product:converse-1"]
    );
}

#[tokio::test]
async fn a_denied_rename_leaves_the_catalog_untouched() {
    let (authorizer, _) = StubAuthorizer::deny_all();
    let schema = schema(authorizer);

    let response = schema
        .execute(as_user(
            "u1",
            r#"mutation { product(id: "converse-1") { changeName(name: "Hacked") } }"#,
        ))
        .await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "not allowed to edit Product converse-1"
    );
    assert_eq!(error_code(&response.errors[0]), "UNAUTHORIZED");

    let response = schema
        .execute(r#"{ product(id: "converse-1") { name } }"#)
        .await;
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "product": { "name": "Converse Chuck Taylor" } })
    );
}

#[tokio::test]
async fn an_anonymous_rename_is_rejected_before_any_decision() {
    let (authorizer, decisions) = StubAuthorizer::allow_all();
    let schema = schema(authorizer);

    let response = schema
        .execute(anonymous(
            r#"mutation { product(id: "converse-1") { changeName(name: "Sneaky") } }"#,
        ))
        .await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "authentication required");
    assert!(decisions.lock().unwrap().is_empty());

    let response = schema
        .execute(r#"{ product(id: "converse-1") { name } }"#)
        .await;
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "product": { "name": "Converse Chuck Taylor" } })
    );
}
