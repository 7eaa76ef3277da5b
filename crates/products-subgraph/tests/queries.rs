mod common;

use common::{as_user, schema, StubAuthorizer};

#[tokio::test]
async fn all_products_lists_the_catalog() {
    let (authorizer, decisions) = StubAuthorizer::allow_all();
    let response = schema(authorizer)
        .execute("{ allProducts { id sku package name reviewsScore oldField } }")
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    insta::assert_json_snapshot!(response.data.into_json().unwrap(), @r###"
    {
      "allProducts": [
        {
          "id": "converse-1",
          "sku": "converse-1",
          "package": "converse",
          "name": "Converse Chuck Taylor",
          "reviewsScore": 4.5,
          "oldField": "deprecated"
        },
        {
          "id": "vans-1",
          "sku": "vans-1",
          "package": "vans",
          "name": "Vans Classic Sneaker",
          "reviewsScore": 4.5,
          "oldField": "deprecated"
        }
      ]
    }
    "###);
    // Nothing in that selection is guarded.
    assert!(decisions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn products_surface_as_the_product_interface() {
    let (authorizer, _) = StubAuthorizer::allow_all();
    let response = schema(authorizer)
        .execute(r#"{ product(id: "converse-1") { __typename name ... on Product { sku } } }"#)
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({
            "product": { "__typename": "Product", "name": "Converse Chuck Taylor", "sku": "converse-1" }
        })
    );
}

#[tokio::test]
async fn product_detail_resolves_variation_creator_and_dimensions() {
    let (authorizer, _) = StubAuthorizer::allow_all();
    let response = schema(authorizer)
        .execute(
            r#"{ product(id: "converse-1") {
                name
                dimensions { size weight }
                createdBy { email totalProductsCreated }
                variation { id name }
            } }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({
            "product": {
                "name": "Converse Chuck Taylor",
                "dimensions": { "size": "1", "weight": 1.0 },
                "createdBy": { "email": "info@converse.com", "totalProductsCreated": 1099 },
                "variation": { "id": "converse-classic", "name": "Converse Chuck Taylor" },
            }
        })
    );
}

#[tokio::test]
async fn an_unknown_product_resolves_to_null() {
    let (authorizer, _) = StubAuthorizer::allow_all();
    let response = schema(authorizer)
        .execute(r#"{ product(id: "birkenstock-1") { name } }"#)
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "product": null })
    );
}

#[tokio::test]
async fn renames_persist_across_requests() {
    let (authorizer, _) = StubAuthorizer::allow_all();
    let schema = schema(authorizer);

    let response = schema
        .execute(as_user(
            "u1",
            r#"mutation { product(id: "vans-1") { changeName(name: "Vans Old Skool") } }"#,
        ))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "product": { "changeName": "Vans Old Skool" } })
    );

    let response = schema
        .execute(r#"{ product(id: "vans-1") { name } }"#)
        .await;
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "product": { "name": "Vans Old Skool" } })
    );
}

#[tokio::test]
async fn mutating_an_unknown_product_resolves_to_null() {
    let (authorizer, decisions) = StubAuthorizer::allow_all();
    let response = schema(authorizer)
        .execute(as_user(
            "u1",
            r#"mutation { product(id: "birkenstock-1") { changeName(name: "Nope") } }"#,
        ))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "product": null })
    );
    assert!(decisions.lock().unwrap().is_empty());
}
