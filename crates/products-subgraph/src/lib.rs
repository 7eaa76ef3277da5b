//! The products subgraph: a small federated catalog with
//! directive-driven authorization on its sensitive fields.
//!
//! The schema lives in `products.graphql`; resolvers run over an
//! in-memory [`ProductStore`]. `@authz` annotations in the SDL are wired
//! up by [`subgraph_authz::AuthzTransformer`] at build time.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use subgraph_authz::{Authorizer, AuthzTransformer};
use subgraph_schema::{SchemaError, SubgraphBuilder};

pub mod data;
mod resolvers;

pub use data::ProductStore;

/// The subgraph's SDL, served verbatim through `_service { sdl }`.
pub const SDL: &str = include_str!("../products.graphql");

/// Builds the executable products schema against the given decision
/// service.
pub fn subgraph(authorizer: Arc<dyn Authorizer>) -> Result<Schema, SchemaError> {
    SubgraphBuilder::new(SDL)
        .resolver("Query", "allProducts", resolvers::all_products)
        .resolver("Query", "product", resolvers::product_by_id)
        .resolver("Mutation", "product", resolvers::mutation_product)
        .resolver("ProductMutation", "changeName", resolvers::change_name)
        .resolver("Product", "variation", resolvers::variation)
        .resolver("Product", "dimensions", resolvers::dimensions)
        .resolver("Product", "createdBy", resolvers::created_by)
        .resolver("Product", "reviewsScore", resolvers::reviews_score)
        .resolver("Product", "secretField", resolvers::secret_field)
        .entity_resolver("Product", resolvers::product_reference)
        .type_resolver("ProductItf", resolvers::product_itf)
        .transform(AuthzTransformer::new(authorizer))
        .data(ProductStore::default())
        .finish()
}
