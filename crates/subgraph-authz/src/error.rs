use async_graphql::ErrorExtensions;

use crate::client::DecisionError;

/// What can go wrong inside a guarded field before its resolver runs.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The request carries no user identity.
    #[error("authentication required")]
    AuthenticationRequired,
    /// The decision service said no.
    #[error("not allowed to {permission} {resource} {resource_id}")]
    AuthorizationDenied {
        permission: String,
        resource: String,
        resource_id: String,
    },
    /// The guarded field had no way to name the resource it protects:
    /// no `id` argument and no scope entry for the resource type.
    #[error("no {resource} id available for the authorization check")]
    MissingResourceId { resource: String },
    /// The decision call itself failed. Propagated as-is, never
    /// translated into a denial.
    #[error(transparent)]
    Decision(#[from] DecisionError),
}

impl AuthzError {
    fn code(&self) -> Option<&'static str> {
        match self {
            AuthzError::AuthenticationRequired => Some("UNAUTHENTICATED"),
            AuthzError::AuthorizationDenied { .. } => Some("UNAUTHORIZED"),
            AuthzError::MissingResourceId { .. } => Some("BAD_REQUEST"),
            AuthzError::Decision(_) => None,
        }
    }
}

impl ErrorExtensions for AuthzError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        let error = async_graphql::Error::new(self.to_string());
        match code {
            Some(code) => error.extend_with(|_, extensions| extensions.set("code", code)),
            None => error,
        }
    }
}
