use std::{collections::HashMap, sync::Arc};

use async_graphql::{
    dynamic::{ResolverContext, ValueAccessor},
    parser::types::{ServiceDocument, TypeDefinition, TypeKind, TypeSystemDefinition},
    ErrorExtensions,
};
use subgraph_schema::{FieldResolvers, Resolve, ResolveFut, SchemaTransform, SharedResolver, TransformError};

use crate::{
    client::{Authorizer, EntityRef},
    context::{ResourceScope, Session},
    directive::{find_directive, AuthzDirective},
    error::AuthzError,
};

/// The directive name the transformer looks for by default.
pub const DEFAULT_DIRECTIVE_NAME: &str = "authz";

/// Subjects are always users in this graph.
pub const SUBJECT_TYPE: &str = "User";

/// Rewrites the resolver table so that every object field annotated with
/// the authorization directive, directly or through its declaring type,
/// checks a permission before its original resolver runs.
///
/// The schema itself is untouched; only resolver table entries are
/// substituted, so unannotated fields keep their original resolver,
/// referentially.
pub struct AuthzTransformer {
    directive_name: String,
    authorizer: Arc<dyn Authorizer>,
}

impl AuthzTransformer {
    pub fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        AuthzTransformer {
            directive_name: DEFAULT_DIRECTIVE_NAME.to_string(),
            authorizer,
        }
    }

    #[must_use]
    pub fn with_directive_name(mut self, name: impl Into<String>) -> Self {
        self.directive_name = name.into();
        self
    }
}

impl SchemaTransform for AuthzTransformer {
    fn transform(
        &self,
        document: &ServiceDocument,
        mut resolvers: FieldResolvers,
    ) -> Result<FieldResolvers, TransformError> {
        // Pass 1: record type-level directive arguments keyed by type
        // name. The types themselves are left alone.
        let mut type_directives: HashMap<&str, AuthzDirective> = HashMap::new();
        for definition in type_definitions(document) {
            let type_name = definition.name.node.as_str();
            if let Some(directive) = find_directive(&definition.directives, &self.directive_name) {
                let parsed = AuthzDirective::parse(directive, &format!("type {type_name}"))?;
                type_directives.insert(type_name, parsed);
            }
        }

        // Pass 2: wrap every object field whose effective directive is
        // its own, or failing that, its declaring type's.
        for definition in type_definitions(document) {
            let TypeKind::Object(object) = &definition.kind else {
                continue;
            };
            let type_name = definition.name.node.as_str();
            for field in &object.fields {
                let field = &field.node;
                let field_name = field.name.node.as_str();
                let own = find_directive(&field.directives, &self.directive_name)
                    .map(|directive| AuthzDirective::parse(directive, &format!("{type_name}.{field_name}")))
                    .transpose()?;
                let Some(directive) = own.or_else(|| type_directives.get(type_name).cloned()) else {
                    continue;
                };

                let rule = GuardRule {
                    type_name: type_name.to_string(),
                    field_name: field_name.to_string(),
                    permission: directive.permission,
                    resource: directive.resource.unwrap_or_else(|| type_name.to_string()),
                };
                let authorizer = self.authorizer.clone();
                resolvers.wrap(type_name, field_name, |original| {
                    Arc::new(Guarded {
                        rule,
                        authorizer,
                        original,
                    })
                });
            }
        }

        Ok(resolvers)
    }
}

fn type_definitions(document: &ServiceDocument) -> impl Iterator<Item = &TypeDefinition> {
    document.definitions.iter().filter_map(|definition| match definition {
        TypeSystemDefinition::Type(definition) => Some(&definition.node),
        _ => None,
    })
}

/// What a guarded field checks before resolving.
#[derive(Debug, Clone)]
struct GuardRule {
    type_name: String,
    field_name: String,
    permission: String,
    /// Effective resource type, already defaulted to the declaring type.
    resource: String,
}

impl GuardRule {
    /// The identifier of the protected resource for one invocation.
    ///
    /// A check on the entity itself (`resource` equals the declaring
    /// type) reads the field's `id` argument; a check on a dependent
    /// resource reads the id a previous resolver recorded in the
    /// request's [`ResourceScope`].
    fn resource_id(&self, ctx: &ResolverContext<'_>) -> Result<String, AuthzError> {
        let id = if self.resource == self.type_name {
            ctx.args.get("id").and_then(|value| scalar_id(&value))
        } else {
            ctx.data_opt::<ResourceScope>()
                .and_then(|scope| scope.entity_id(&self.resource))
        };
        id.ok_or_else(|| AuthzError::MissingResourceId {
            resource: self.resource.clone(),
        })
    }
}

/// Renders an `ID`-typed argument, which the engine accepts as either a
/// string or an integer literal.
fn scalar_id(value: &ValueAccessor<'_>) -> Option<String> {
    if let Ok(id) = value.string() {
        Some(id.to_string())
    } else if let Ok(id) = value.u64() {
        Some(id.to_string())
    } else if let Ok(id) = value.i64() {
        Some(id.to_string())
    } else {
        None
    }
}

struct Guarded {
    rule: GuardRule,
    authorizer: Arc<dyn Authorizer>,
    original: SharedResolver,
}

impl Resolve for Guarded {
    fn resolve<'a>(&'a self, ctx: &'a ResolverContext<'a>) -> ResolveFut<'a> {
        Box::pin(async move {
            let user_id = ctx
                .data_opt::<Session>()
                .map(|session| session.user_id.as_str())
                .unwrap_or_default();
            if user_id.is_empty() {
                return Err(AuthzError::AuthenticationRequired.extend());
            }

            let resource_id = self.rule.resource_id(ctx).map_err(|err| err.extend())?;
            tracing::debug!(
                "authorizing {}.{}: can {user_id} {} {}:{resource_id}?",
                self.rule.type_name,
                self.rule.field_name,
                self.rule.permission,
                self.rule.resource,
            );

            let allowed = self
                .authorizer
                .authorize(
                    EntityRef::new(SUBJECT_TYPE, user_id),
                    &self.rule.permission,
                    EntityRef::new(&self.rule.resource, &resource_id),
                )
                .await
                .map_err(|err| AuthzError::Decision(err).extend())?;
            if !allowed {
                return Err(AuthzError::AuthorizationDenied {
                    permission: self.rule.permission.clone(),
                    resource: self.rule.resource.clone(),
                    resource_id,
                }
                .extend());
            }

            self.original.resolve(ctx).await
        })
    }
}
