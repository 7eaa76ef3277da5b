#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_graphql::{dynamic::Schema, Request};
use subgraph_authz::{Authorizer, DecisionError, EntityRef, ResourceScope, Session};

/// A programmable decision service recording every call it answers.
pub struct StubAuthorizer {
    allow: Box<dyn Fn(EntityRef<'_>, &str, EntityRef<'_>) -> bool + Send + Sync>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubAuthorizer {
    pub fn with_rule(
        allow: impl Fn(EntityRef<'_>, &str, EntityRef<'_>) -> bool + Send + Sync + 'static,
    ) -> (Arc<dyn Authorizer>, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let authorizer = Arc::new(StubAuthorizer {
            allow: Box::new(allow),
            calls: calls.clone(),
        });
        (authorizer, calls)
    }

    pub fn allow_all() -> (Arc<dyn Authorizer>, Arc<Mutex<Vec<String>>>) {
        Self::with_rule(|_, _, _| true)
    }

    pub fn deny_all() -> (Arc<dyn Authorizer>, Arc<Mutex<Vec<String>>>) {
        Self::with_rule(|_, _, _| false)
    }
}

#[async_trait::async_trait]
impl Authorizer for StubAuthorizer {
    async fn authorize(
        &self,
        subject: EntityRef<'_>,
        permission: &str,
        resource: EntityRef<'_>,
    ) -> Result<bool, DecisionError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{subject} {permission} {resource}"));
        Ok((self.allow)(subject, permission, resource))
    }
}

pub fn schema(authorizer: Arc<dyn Authorizer>) -> Schema {
    products_subgraph::subgraph(authorizer).unwrap()
}

/// A request as an authenticated user, with the per-request data the
/// server's context builder would attach.
pub fn as_user(user_id: &str, query: &str) -> Request {
    Request::new(query)
        .data(Session::new(user_id))
        .data(ResourceScope::default())
}

pub fn anonymous(query: &str) -> Request {
    Request::new(query)
        .data(Session::anonymous())
        .data(ResourceScope::default())
}
