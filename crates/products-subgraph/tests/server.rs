use std::{net::SocketAddr, sync::Arc};

use subgraph_authz::{HttpAuthorizer, ResourceScope, Session};
use subgraph_schema::SubgraphServer;
use url::Url;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn start(decision_service: &MockServer) -> SubgraphServer {
    let authorizer =
        HttpAuthorizer::new(Url::parse(&decision_service.uri()).unwrap()).with_api_key("test-key");
    let schema = products_subgraph::subgraph(Arc::new(authorizer)).unwrap();
    let context = |headers: &http::HeaderMap, request: async_graphql::Request| {
        let user_id = headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        request
            .data(Session::new(user_id))
            .data(ResourceScope::default())
    };
    SubgraphServer::start(schema, context, SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn the_full_stack_authorizes_over_http() {
    let decision_service = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .and(body_json(serde_json::json!({
            "actor_type": "User",
            "actor_id": "u1",
            "action": "read",
            "resource_type": "Product",
            "resource_id": "converse-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "allowed": true })))
        .expect(1)
        .mount(&decision_service)
        .await;

    let server = start(&decision_service).await;
    let body: serde_json::Value = reqwest::Client::new()
        .post(server.url())
        .header("x-user-id", "u1")
        .json(&serde_json::json!({
            "query": r#"{ product(id: "converse-1") { name ... on Product { secretField(id: "converse-1") } } }"#
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        body["data"],
        serde_json::json!({
            "product": {
                "name": "Converse Chuck Taylor",
                "secretField": "margin on this one is paper thin",
            }
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn a_request_without_identity_never_reaches_the_decision_service() {
    let decision_service = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "allowed": true })))
        .expect(0)
        .mount(&decision_service)
        .await;

    let server = start(&decision_service).await;
    let body: serde_json::Value = reqwest::Client::new()
        .post(server.url())
        .json(&serde_json::json!({
            "query": r#"{ product(id: "converse-1") { ... on Product { secretField(id: "converse-1") } } }"#
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["errors"][0]["message"], "authentication required");
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");
}
