use async_graphql::{
    parser::types::ConstDirective,
    Positioned, Value,
};
use subgraph_schema::TransformError;

/// Parsed arguments of an `@authz(permission: String!, resource: String)`
/// annotation. `resource` defaults to the declaring type's name at the
/// point of use, not here, since a type-level directive can be inherited
/// by fields of that type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzDirective {
    pub permission: String,
    pub resource: Option<String>,
}

impl AuthzDirective {
    pub(crate) fn parse(directive: &ConstDirective, location: &str) -> Result<Self, TransformError> {
        let permission = string_argument(directive, "permission")?.ok_or_else(|| {
            TransformError::new(format!(
                "@{} on {location} is missing the permission argument",
                directive.name.node
            ))
        })?;
        let resource = string_argument(directive, "resource")?;
        Ok(AuthzDirective { permission, resource })
    }
}

fn string_argument(directive: &ConstDirective, name: &str) -> Result<Option<String>, TransformError> {
    match directive.get_argument(name).map(|value| &value.node) {
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(TransformError::new(format!(
            "@{} argument {name} must be a string, got {other}",
            directive.name.node
        ))),
        None => Ok(None),
    }
}

pub(crate) fn find_directive<'a>(
    directives: &'a [Positioned<ConstDirective>],
    name: &str,
) -> Option<&'a ConstDirective> {
    directives
        .iter()
        .map(|directive| &directive.node)
        .find(|directive| directive.name.node.as_str() == name)
}
