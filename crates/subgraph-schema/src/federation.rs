use std::{collections::HashMap, sync::Arc};

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext, Scalar, TypeRef, Union};
use futures::future::BoxFuture;

/// A representation sent by the gateway: `__typename` plus the entity's
/// key fields.
pub type Representation = serde_json::Map<String, serde_json::Value>;

/// The future returned by a [`ResolveReference`] implementation.
pub type ReferenceFut<'a> = BoxFuture<'a, async_graphql::Result<Option<serde_json::Value>>>;

/// Resolves a federation entity reference back to a full entity value.
///
/// Returning `Ok(None)` resolves the reference to `null`; unmatched
/// references are the caller's contract violation, not an occasion to
/// fabricate an entity.
pub trait ResolveReference: Send + Sync + 'static {
    fn resolve_reference<'a>(
        &'a self,
        ctx: &'a ResolverContext<'a>,
        representation: &'a Representation,
    ) -> ReferenceFut<'a>;
}

impl<F> ResolveReference for F
where
    F: for<'a> Fn(&'a ResolverContext<'a>, &'a Representation) -> ReferenceFut<'a> + Send + Sync + 'static,
{
    fn resolve_reference<'a>(
        &'a self,
        ctx: &'a ResolverContext<'a>,
        representation: &'a Representation,
    ) -> ReferenceFut<'a> {
        self(ctx, representation)
    }
}

pub(crate) type EntityResolvers = Arc<HashMap<String, Arc<dyn ResolveReference>>>;

pub(crate) const ANY_TYPE: &str = "_Any";
pub(crate) const ENTITY_TYPE: &str = "_Entity";
pub(crate) const SERVICE_TYPE: &str = "_Service";

pub(crate) fn any_scalar() -> Scalar {
    Scalar::new(ANY_TYPE)
}

pub(crate) fn entity_union(entity_resolvers: &EntityResolvers) -> Union {
    let mut names: Vec<&str> = entity_resolvers.keys().map(String::as_str).collect();
    names.sort_unstable();
    let mut union = Union::new(ENTITY_TYPE);
    for name in names {
        union = union.possible_type(name);
    }
    union
}

/// `Query._entities(representations: [_Any!]!): [_Entity]!`
///
/// Dispatches each representation on its `__typename` to the registered
/// entity resolver. Added after schema transforms have run, so entity
/// resolution itself is never guarded; the fields of the resolved entity
/// still are.
pub(crate) fn entities_field(entity_resolvers: EntityResolvers) -> Field {
    let ty = TypeRef::NonNull(Box::new(TypeRef::List(Box::new(TypeRef::Named(
        ENTITY_TYPE.into(),
    )))));
    let representations_ty = TypeRef::NonNull(Box::new(TypeRef::List(Box::new(
        TypeRef::NonNull(Box::new(TypeRef::Named(ANY_TYPE.into()))),
    ))));

    Field::new("_entities", ty, move |ctx| {
        let entity_resolvers = entity_resolvers.clone();
        FieldFuture::new(async move {
            let representations = ctx.args.try_get("representations")?;
            let mut entities = Vec::new();
            for item in representations.list()?.iter() {
                let representation: Representation = item.deserialize()?;
                let typename = representation
                    .get("__typename")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| {
                        async_graphql::Error::new("representation is missing __typename")
                    })?
                    .to_string();
                let resolver = entity_resolvers.get(&typename).ok_or_else(|| {
                    async_graphql::Error::new(format!(
                        "no entity resolver registered for {typename}"
                    ))
                })?;
                match resolver.resolve_reference(&ctx, &representation).await? {
                    Some(entity) => {
                        entities.push(crate::resolver::composite_field_value(entity).with_type(typename));
                    }
                    None => entities.push(FieldValue::NULL),
                }
            }
            Ok(Some(FieldValue::list(entities)))
        })
    })
    .argument(InputValue::new("representations", representations_ty))
}

/// `Query._service: _Service!`
pub(crate) fn service_field() -> Field {
    Field::new(
        "_service",
        TypeRef::NonNull(Box::new(TypeRef::Named(SERVICE_TYPE.into()))),
        |_ctx| FieldFuture::new(async move { Ok(Some(FieldValue::owned_any(()))) }),
    )
}

/// `_Service.sdl` returns the source SDL verbatim, directives included,
/// which is what the gateway composes against.
pub(crate) fn service_object(sdl: Arc<str>) -> Object {
    Object::new(SERVICE_TYPE).field(Field::new(
        "sdl",
        TypeRef::NonNull(Box::new(TypeRef::Named(TypeRef::STRING.into()))),
        move |_ctx| {
            let sdl = sdl.clone();
            FieldFuture::new(async move { Ok(Some(FieldValue::value(sdl.to_string()))) })
        },
    ))
}
