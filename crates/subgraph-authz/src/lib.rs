//! Directive-driven authorization for dynamic subgraph schemas.
//!
//! An `@authz(permission: String!, resource: String)` annotation on an
//! object type or field marks the field as guarded: before its resolver
//! runs, the request's user must be authenticated and the decision
//! service must allow `permission` on the named resource. [`AuthzTransformer`]
//! does the rewiring as a [`subgraph_schema::SchemaTransform`]; the
//! decision itself goes through the [`Authorizer`] trait, implemented
//! over HTTP by [`HttpAuthorizer`].

mod client;
mod context;
mod directive;
mod error;
mod transformer;

pub use client::{Authorizer, DecisionError, EntityRef, HttpAuthorizer};
pub use context::{ResourceScope, Session};
pub use directive::AuthzDirective;
pub use error::AuthzError;
pub use transformer::{AuthzTransformer, DEFAULT_DIRECTIVE_NAME, SUBJECT_TYPE};
