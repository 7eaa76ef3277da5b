use std::{collections::HashMap, fmt, sync::Arc};

use async_graphql::dynamic::{FieldValue, ResolverContext};
use futures::future::BoxFuture;

/// A field resolver over JSON values.
///
/// Resolvers take the parent value, the field arguments and the request
/// context through the [`ResolverContext`] and produce a JSON value
/// (`Null` meaning "no value"). The builder takes care of converting the
/// result into whatever the field's declared type requires, so resolver
/// code never deals with the dynamic schema's value wrappers directly.
///
/// The trait is implemented for plain `fn` items with the matching
/// signature, which keeps resolver sets readable:
///
/// ```ignore
/// fn all_products<'a>(ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
///     Box::pin(async move { ... })
/// }
/// ```
pub trait Resolve: Send + Sync + 'static {
    fn resolve<'a>(&'a self, ctx: &'a ResolverContext<'a>) -> ResolveFut<'a>;
}

/// The future returned by a [`Resolve`] implementation.
pub type ResolveFut<'a> = BoxFuture<'a, async_graphql::Result<serde_json::Value>>;

/// Resolvers are shared so a schema transform can observe whether an entry
/// was substituted or left untouched (`Arc::ptr_eq`).
pub type SharedResolver = Arc<dyn Resolve>;

impl<F> Resolve for F
where
    F: for<'a> Fn(&'a ResolverContext<'a>) -> ResolveFut<'a> + Send + Sync + 'static,
{
    fn resolve<'a>(&'a self, ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
        self(ctx)
    }
}

/// Identifies a field by its declaring type and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCoordinate {
    pub type_name: String,
    pub field_name: String,
}

impl FieldCoordinate {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        FieldCoordinate {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// The resolver table the schema is assembled from.
///
/// Before any transform runs, the builder materializes an entry for every
/// object field in the SDL, falling back to a [`property resolver`] when
/// none was registered. Transforms may then substitute entries; the
/// assembled schema uses whatever the table holds afterwards.
///
/// [`property resolver`]: property_resolver
#[derive(Default, Clone)]
pub struct FieldResolvers {
    map: HashMap<FieldCoordinate, SharedResolver>,
}

impl fmt::Debug for FieldResolvers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

impl FieldResolvers {
    pub fn insert(&mut self, type_name: &str, field_name: &str, resolver: impl Resolve) {
        self.map
            .insert(FieldCoordinate::new(type_name, field_name), Arc::new(resolver));
    }

    pub fn insert_shared(&mut self, coordinate: FieldCoordinate, resolver: SharedResolver) {
        self.map.insert(coordinate, resolver);
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&SharedResolver> {
        self.map.get(&FieldCoordinate::new(type_name, field_name))
    }

    pub fn contains(&self, coordinate: &FieldCoordinate) -> bool {
        self.map.contains_key(coordinate)
    }

    /// Replaces the entry for a field with a function of the previous
    /// entry. Returns `false` when the field has no entry, in which case
    /// nothing changes.
    pub fn wrap(
        &mut self,
        type_name: &str,
        field_name: &str,
        f: impl FnOnce(SharedResolver) -> SharedResolver,
    ) -> bool {
        let coordinate = FieldCoordinate::new(type_name, field_name);
        match self.map.remove(&coordinate) {
            Some(previous) => {
                self.map.insert(coordinate, f(previous));
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldCoordinate, &SharedResolver)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Maps an abstract (interface-typed) value to the name of its concrete
/// object type, the way a `__resolveType` resolver does. `None` means the
/// value matched no concrete type and fails the field.
///
/// Implemented for plain `fn` items over the JSON value.
pub trait ResolveType: Send + Sync + 'static {
    fn resolve_type(&self, value: &serde_json::Value) -> Option<String>;
}

impl<F> ResolveType for F
where
    F: Fn(&serde_json::Value) -> Option<String> + Send + Sync + 'static,
{
    fn resolve_type(&self, value: &serde_json::Value) -> Option<String> {
        self(value)
    }
}

/// The default resolver for fields nobody registered one for: reads the
/// field's key out of the parent JSON object, `Null` when the parent is
/// not a JSON object or has no such key.
pub fn property_resolver(field_name: &str) -> SharedResolver {
    Arc::new(PropertyResolver {
        field_name: field_name.to_string(),
    })
}

struct PropertyResolver {
    field_name: String,
}

impl Resolve for PropertyResolver {
    fn resolve<'a>(&'a self, ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
        Box::pin(async move {
            let value = ctx
                .parent_value
                .downcast_ref::<serde_json::Value>()
                .and_then(|parent| parent.get(&self.field_name))
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            Ok(value)
        })
    }
}

/// How a field's JSON result maps into the dynamic schema's value
/// representation, derived from the field's declared base type.
#[derive(Clone)]
pub(crate) enum FieldShape {
    /// Scalars and enums become plain GraphQL values.
    Leaf,
    /// Object results stay JSON behind `owned_any` so child resolvers can
    /// read properties out of them.
    Object,
    /// Interface results additionally carry their concrete type name,
    /// decided by the interface's registered [`ResolveType`].
    Abstract(Arc<dyn ResolveType>),
}

/// Converts a resolver's JSON result into the dynamic schema's value
/// representation.
pub(crate) fn into_field_value<'a>(
    value: serde_json::Value,
    shape: &FieldShape,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    if value.is_null() {
        return Ok(None);
    }
    match shape {
        FieldShape::Leaf => Ok(Some(FieldValue::value(async_graphql::Value::from_json(value)?))),
        FieldShape::Object => Ok(Some(composite_field_value(value))),
        FieldShape::Abstract(dispatch) => Ok(Some(abstract_field_value(value, dispatch.as_ref())?)),
    }
}

pub(crate) fn composite_field_value<'a>(value: serde_json::Value) -> FieldValue<'a> {
    match value {
        serde_json::Value::Array(items) => {
            FieldValue::list(items.into_iter().map(composite_field_value))
        }
        serde_json::Value::Null => FieldValue::NULL,
        other => FieldValue::owned_any(other),
    }
}

fn abstract_field_value<'a>(
    value: serde_json::Value,
    dispatch: &dyn ResolveType,
) -> async_graphql::Result<FieldValue<'a>> {
    match value {
        serde_json::Value::Array(items) => {
            let items = items
                .into_iter()
                .map(|item| abstract_field_value(item, dispatch))
                .collect::<async_graphql::Result<Vec<_>>>()?;
            Ok(FieldValue::list(items))
        }
        serde_json::Value::Null => Ok(FieldValue::NULL),
        other => {
            let type_name = dispatch.resolve_type(&other).ok_or_else(|| {
                async_graphql::Error::new("value matches no concrete type of the interface")
            })?;
            Ok(FieldValue::owned_any(other).with_type(type_name))
        }
    }
}
