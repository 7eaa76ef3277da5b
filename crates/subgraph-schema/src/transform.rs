use async_graphql::parser::types::ServiceDocument;

use crate::resolver::FieldResolvers;

/// A one-shot rewrite of the resolver table, applied at schema build time.
///
/// Transforms see the parsed SDL read-only and receive the fully
/// materialized resolver table (every object field has an entry). They
/// return a derived table, typically with some entries substituted by
/// wrapped versions of the previous ones. Entries a transform does not
/// touch stay referentially identical.
///
/// Transforms run in registration order, before the federation fields are
/// added, so `_entities` and `_service` are never subject to them.
pub trait SchemaTransform: Send + Sync {
    fn transform(
        &self,
        document: &ServiceDocument,
        resolvers: FieldResolvers,
    ) -> Result<FieldResolvers, TransformError>;
}

/// A transform rejected the schema.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransformError(String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        TransformError(message.into())
    }
}
