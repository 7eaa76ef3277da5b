use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// A `{type, id}` pair naming the subject or resource of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef<'a> {
    pub type_name: &'a str,
    pub id: &'a str,
}

impl<'a> EntityRef<'a> {
    pub fn new(type_name: &'a str, id: &'a str) -> Self {
        EntityRef { type_name, id }
    }
}

impl fmt::Display for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.id)
    }
}

/// The authorization decision service.
///
/// `authorize` answers "may `subject` perform `permission` on
/// `resource`?". Decisions are never cached by the caller; every guarded
/// field issues a fresh call.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync + 'static {
    async fn authorize(
        &self,
        subject: EntityRef<'_>,
        permission: &str,
        resource: EntityRef<'_>,
    ) -> Result<bool, DecisionError>;
}

/// The decision call failed; this is an infrastructure failure, distinct
/// from a denial.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("authorization service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authorization service returned {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("invalid authorization service url: {0}")]
    Url(#[from] url::ParseError),
}

/// HTTP decision client.
///
/// Speaks the oso-cloud call shape: `POST {base}/api/authorize` with a
/// JSON body of `{actor_type, actor_id, action, resource_type,
/// resource_id}`, answered by `{"allowed": bool}`. The base URL is used
/// as-is; give it a trailing slash when it carries a path.
pub struct HttpAuthorizer {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpAuthorizer {
    pub fn new(base_url: Url) -> Self {
        HttpAuthorizer {
            http: reqwest::Client::new(),
            base_url,
            api_key: None,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(Serialize)]
struct AuthorizeRequest<'a> {
    actor_type: &'a str,
    actor_id: &'a str,
    action: &'a str,
    resource_type: &'a str,
    resource_id: &'a str,
}

#[derive(Deserialize)]
struct AuthorizeResponse {
    allowed: bool,
}

#[async_trait::async_trait]
impl Authorizer for HttpAuthorizer {
    async fn authorize(
        &self,
        subject: EntityRef<'_>,
        permission: &str,
        resource: EntityRef<'_>,
    ) -> Result<bool, DecisionError> {
        let endpoint = self.base_url.join("api/authorize")?;
        let body = AuthorizeRequest {
            actor_type: subject.type_name,
            actor_id: subject.id,
            action: permission,
            resource_type: resource.type_name,
            resource_id: resource.id,
        };

        let mut request = self.http.post(endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(DecisionError::UnexpectedStatus(response.status()));
        }
        let decision: AuthorizeResponse = response.json().await?;
        Ok(decision.allowed)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn client(server: &MockServer) -> HttpAuthorizer {
        HttpAuthorizer::new(Url::parse(&server.uri()).unwrap()).with_api_key("test-key")
    }

    #[tokio::test]
    async fn sends_the_decision_call_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authorize"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(serde_json::json!({
                "actor_type": "User",
                "actor_id": "u1",
                "action": "read",
                "resource_type": "Product",
                "resource_id": "converse-1",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "allowed": true })))
            .expect(1)
            .mount(&server)
            .await;

        let allowed = client(&server)
            .authorize(EntityRef::new("User", "u1"), "read", EntityRef::new("Product", "converse-1"))
            .await
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn a_negative_decision_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authorize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "allowed": false })))
            .mount(&server)
            .await;

        let allowed = client(&server)
            .authorize(EntityRef::new("User", "u1"), "edit", EntityRef::new("Product", "vans-1"))
            .await
            .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn non_success_statuses_are_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authorize"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server)
            .authorize(EntityRef::new("User", "u1"), "read", EntityRef::new("Product", "converse-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::UnexpectedStatus(status) if status.as_u16() == 503));
    }
}
