use crate::{resolver::FieldCoordinate, transform::TransformError};

/// Errors raised while assembling a subgraph schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("parsing SDL: {0}")]
    Parse(String),
    /// The SDL uses a type kind the dynamic assembly does not cover.
    #[error("unsupported {kind} type {name}")]
    UnsupportedType { kind: &'static str, name: String },
    /// A resolver was registered for a field the SDL does not declare.
    #[error("resolver registered for unknown field {0}")]
    UnknownField(FieldCoordinate),
    /// An entity resolver was registered for a type the SDL does not declare.
    #[error("entity resolver registered for unknown type {0}")]
    UnknownEntity(String),
    /// A type resolver was registered for an interface the SDL does not declare.
    #[error("type resolver registered for unknown interface {0}")]
    UnknownInterface(String),
    /// A declared interface has no way to dispatch values to a concrete type.
    #[error("interface {0} has no type resolver")]
    MissingTypeResolver(String),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("building schema: {0}")]
    Build(String),
}
