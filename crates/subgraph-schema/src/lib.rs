//! SDL-first assembly of executable federation subgraph schemas.
//!
//! A subgraph is built from three inputs: the SDL text, a table of field
//! resolvers, and a list of schema transforms. The builder walks the SDL's
//! type definitions, wires every object field to its registered resolver
//! (or a default property resolver), lets the transforms rewrite the
//! resolver table, and hands back an executable
//! [`async_graphql::dynamic::Schema`] with the federation surface
//! (`_entities`, `_service`) attached when entity resolvers are
//! registered.

mod builder;
mod error;
mod federation;
mod resolver;
mod server;
mod transform;

pub use builder::SubgraphBuilder;
pub use error::SchemaError;
pub use federation::{ReferenceFut, Representation, ResolveReference};
pub use resolver::{FieldCoordinate, FieldResolvers, Resolve, ResolveFut, ResolveType, SharedResolver};
pub use server::{serve, ContextBuilder, ServerError, SubgraphServer};
pub use transform::{SchemaTransform, TransformError};
