use std::time::Duration;

use async_graphql::dynamic::ResolverContext;
use subgraph_authz::ResourceScope;
use subgraph_schema::{ReferenceFut, Representation, ResolveFut};

use crate::data::{self, ProductStore};

pub(crate) fn all_products<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move {
        let store = ctx.data::<ProductStore>()?;
        Ok(serde_json::to_value(store.all())?)
    })
}

pub(crate) fn product_by_id<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move {
        let id = ctx.args.try_get("id")?.string()?;
        match ctx.data::<ProductStore>()?.by_id(id) {
            Some(product) => Ok(serde_json::to_value(product)?),
            None => Ok(serde_json::Value::Null),
        }
    })
}

/// `Mutation.product` stages the product the nested mutation fields
/// operate on. The resolved product is recorded in the request's
/// [`ResourceScope`] so the `ProductMutation` guards can authorize
/// against it.
pub(crate) fn mutation_product<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move {
        let id = ctx.args.try_get("id")?.string()?;
        let Some(product) = ctx.data::<ProductStore>()?.by_id(id) else {
            return Ok(serde_json::Value::Null);
        };
        let product = serde_json::to_value(product)?;
        if let Some(scope) = ctx.data_opt::<ResourceScope>() {
            scope.record("Product", product.clone());
        }
        Ok(product)
    })
}

pub(crate) fn change_name<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move {
        let name = ctx.args.try_get("name")?.string()?;
        let id = parent_id(ctx).ok_or_else(|| async_graphql::Error::new("no product staged"))?;
        let renamed = ctx
            .data::<ProductStore>()?
            .rename(&id, name)
            .ok_or_else(|| async_graphql::Error::new(format!("unknown product {id}")))?;
        Ok(serde_json::json!(renamed))
    })
}

/// Variations come from a slow backing source; the delay is part of the
/// demo, exercising async delegation through guarded fields.
pub(crate) fn variation<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let variation = parent_id(ctx)
            .and_then(|id| data::variation_of(&id))
            .unwrap_or_else(data::default_variation);
        Ok(serde_json::to_value(variation)?)
    })
}

pub(crate) fn dimensions<'a>(_ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move { Ok(serde_json::json!({ "size": "1", "weight": 1.0 })) })
}

pub(crate) fn created_by<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move {
        match parent_id(ctx).and_then(|id| data::creator_of(&id)) {
            Some(creator) => Ok(serde_json::to_value(creator)?),
            None => Ok(serde_json::Value::Null),
        }
    })
}

pub(crate) fn reviews_score<'a>(_ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move { Ok(serde_json::json!(4.5)) })
}

pub(crate) fn secret_field<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
    Box::pin(async move {
        let id = ctx.args.try_get("id")?.string()?;
        match data::secret_notes(id) {
            Some(notes) => Ok(serde_json::json!(notes)),
            None => Ok(serde_json::Value::Null),
        }
    })
}

/// Resolves a `Product` reference from either of its keys: `id`, or
/// `sku` plus `package`. Anything else is a malformed reference and
/// resolves to null.
pub(crate) fn product_reference<'a>(
    ctx: &'a ResolverContext<'a>,
    representation: &'a Representation,
) -> ReferenceFut<'a> {
    Box::pin(async move {
        let store = ctx.data::<ProductStore>()?;
        let id = representation.get("id").and_then(serde_json::Value::as_str);
        let sku = representation.get("sku").and_then(serde_json::Value::as_str);
        let package = representation.get("package").and_then(serde_json::Value::as_str);

        let product = match (id, sku, package) {
            (Some(id), _, _) => store.by_id(id),
            (None, Some(sku), Some(package)) => store.by_sku_and_package(sku, package),
            _ => {
                tracing::warn!("product reference carries no usable key: {representation:?}");
                None
            }
        };
        product.map(serde_json::to_value).transpose().map_err(Into::into)
    })
}

/// `ProductItf` has a single implementor; every value is a `Product`,
/// exactly as the original service resolved it.
pub(crate) fn product_itf(_value: &serde_json::Value) -> Option<String> {
    Some("Product".to_string())
}

fn parent_id(ctx: &ResolverContext<'_>) -> Option<String> {
    ctx.parent_value
        .downcast_ref::<serde_json::Value>()
        .and_then(|parent| parent.get("id"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}
