use std::{
    any::Any,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_graphql::{
    dynamic::{
        Enum, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField, Object,
        Scalar, Schema, SchemaBuilder as DynamicSchemaBuilder, TypeRef,
    },
    parser::{
        parse_schema,
        types::{
            BaseType, ConstDirective, ServiceDocument, Type as SdlType, TypeDefinition, TypeKind,
            TypeSystemDefinition,
        },
    },
    Positioned,
};

use crate::{
    error::SchemaError,
    federation::{self, EntityResolvers, ResolveReference},
    resolver::{
        into_field_value, property_resolver, FieldCoordinate, FieldResolvers, FieldShape, Resolve,
        ResolveType, SharedResolver,
    },
    transform::SchemaTransform,
};

/// Assembles an executable subgraph schema out of SDL text, a resolver
/// table and optional schema transforms.
///
/// The SDL is the single source of truth for the shape of the schema; the
/// builder walks its type definitions and creates a dynamic type for each
/// one. Every object field resolves through the registered resolver for
/// its coordinate, or through the default property resolver when none was
/// registered. Directives in the SDL are left for transforms to interpret.
#[must_use]
pub struct SubgraphBuilder {
    sdl: String,
    resolvers: FieldResolvers,
    entity_resolvers: HashMap<String, Arc<dyn ResolveReference>>,
    type_resolvers: HashMap<String, Arc<dyn ResolveType>>,
    transforms: Vec<Box<dyn SchemaTransform>>,
    data: Vec<Box<dyn FnOnce(DynamicSchemaBuilder) -> DynamicSchemaBuilder + Send>>,
}

impl SubgraphBuilder {
    pub fn new(sdl: impl Into<String>) -> Self {
        SubgraphBuilder {
            sdl: sdl.into(),
            resolvers: FieldResolvers::default(),
            entity_resolvers: HashMap::new(),
            type_resolvers: HashMap::new(),
            transforms: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn resolver(mut self, type_name: &str, field_name: &str, resolver: impl Resolve) -> Self {
        self.resolvers.insert(type_name, field_name, resolver);
        self
    }

    pub fn entity_resolver(mut self, type_name: &str, resolver: impl ResolveReference) -> Self {
        self.entity_resolvers
            .insert(type_name.to_string(), Arc::new(resolver));
        self
    }

    /// Registers the concrete-type dispatch for an interface declared in
    /// the SDL. Every declared interface needs one.
    pub fn type_resolver(mut self, interface_name: &str, resolver: impl ResolveType) -> Self {
        self.type_resolvers
            .insert(interface_name.to_string(), Arc::new(resolver));
        self
    }

    pub fn transform(mut self, transform: impl SchemaTransform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data.push(Box::new(move |builder| builder.data(data)));
        self
    }

    /// Runs the full assembly: parse, materialize the resolver table,
    /// apply transforms, build the dynamic schema, add the federation
    /// surface when entity resolvers are registered.
    pub fn finish(self) -> Result<Schema, SchemaError> {
        let SubgraphBuilder {
            sdl,
            resolvers,
            entity_resolvers,
            type_resolvers,
            transforms,
            data,
        } = self;

        let document = parse_schema(&sdl).map_err(|err| SchemaError::Parse(err.to_string()))?;
        let index = SdlIndex::build(&document)?;

        for (coordinate, _) in resolvers.iter() {
            if !index.fields.contains(coordinate) {
                return Err(SchemaError::UnknownField(coordinate.clone()));
            }
        }
        for type_name in entity_resolvers.keys() {
            if !index.objects.contains(type_name) {
                return Err(SchemaError::UnknownEntity(type_name.clone()));
            }
        }
        for interface_name in type_resolvers.keys() {
            if !index.interfaces.contains(interface_name) {
                return Err(SchemaError::UnknownInterface(interface_name.clone()));
            }
        }
        for interface_name in &index.interfaces {
            if !type_resolvers.contains_key(interface_name) {
                return Err(SchemaError::MissingTypeResolver(interface_name.clone()));
            }
        }

        let mut resolvers = resolvers;
        for coordinate in &index.fields {
            if !resolvers.contains(coordinate) {
                resolvers.insert_shared(coordinate.clone(), property_resolver(&coordinate.field_name));
            }
        }

        for transform in &transforms {
            resolvers = transform.transform(&document, resolvers)?;
        }

        let entity_resolvers: EntityResolvers = Arc::new(entity_resolvers);
        let federated = !entity_resolvers.is_empty();

        let mutation_root = index
            .objects
            .contains(&index.mutation)
            .then(|| index.mutation.clone());
        let mut builder = Schema::build(index.query.as_str(), mutation_root.as_deref(), None);

        for definition in &document.definitions {
            let TypeSystemDefinition::Type(definition) = definition else {
                continue;
            };
            let definition = &definition.node;
            let type_name = definition.name.node.as_str();
            match &definition.kind {
                TypeKind::Object(object) => {
                    let mut dynamic_object = Object::new(type_name);
                    for interface in &object.implements {
                        dynamic_object = dynamic_object.implement(interface.node.as_str());
                    }
                    for field in &object.fields {
                        let field = &field.node;
                        let field_name = field.name.node.as_str();
                        let resolver = resolvers
                            .get(type_name, field_name)
                            .cloned()
                            .ok_or_else(|| {
                                SchemaError::Build(format!("no resolver for {type_name}.{field_name}"))
                            })?;
                        let shape = field_shape(base_name(&field.ty.node), &index, &type_resolvers);
                        let mut dynamic_field =
                            resolver_field(field_name, type_ref(&field.ty.node), resolver, shape);
                        if let Some(reason) = deprecation(&field.directives) {
                            dynamic_field = dynamic_field.deprecation(reason.as_deref());
                        }
                        for argument in &field.arguments {
                            let argument = &argument.node;
                            let mut input =
                                InputValue::new(argument.name.node.as_str(), type_ref(&argument.ty.node));
                            if let Some(default) = &argument.default_value {
                                input = input.default_value(default.node.clone());
                            }
                            dynamic_field = dynamic_field.argument(input);
                        }
                        dynamic_object = dynamic_object.field(dynamic_field);
                    }
                    if federated && type_name == index.query {
                        dynamic_object = dynamic_object
                            .field(federation::entities_field(entity_resolvers.clone()))
                            .field(federation::service_field());
                    }
                    builder = builder.register(dynamic_object);
                }
                TypeKind::Scalar => {
                    builder = builder.register(Scalar::new(type_name));
                }
                TypeKind::Enum(enumeration) => {
                    let mut dynamic_enum = Enum::new(type_name);
                    for value in &enumeration.values {
                        dynamic_enum = dynamic_enum.item(value.node.value.node.as_str());
                    }
                    builder = builder.register(dynamic_enum);
                }
                TypeKind::InputObject(input_object) => {
                    let mut dynamic_input = InputObject::new(type_name);
                    for field in &input_object.fields {
                        let field = &field.node;
                        let mut input = InputValue::new(field.name.node.as_str(), type_ref(&field.ty.node));
                        if let Some(default) = &field.default_value {
                            input = input.default_value(default.node.clone());
                        }
                        dynamic_input = dynamic_input.field(input);
                    }
                    builder = builder.register(dynamic_input);
                }
                TypeKind::Interface(interface) => {
                    let mut dynamic_interface = Interface::new(type_name);
                    for field in &interface.fields {
                        let field = &field.node;
                        let mut interface_field =
                            InterfaceField::new(field.name.node.as_str(), type_ref(&field.ty.node));
                        if let Some(reason) = deprecation(&field.directives) {
                            interface_field = interface_field.deprecation(reason.as_deref());
                        }
                        for argument in &field.arguments {
                            let argument = &argument.node;
                            let mut input =
                                InputValue::new(argument.name.node.as_str(), type_ref(&argument.ty.node));
                            if let Some(default) = &argument.default_value {
                                input = input.default_value(default.node.clone());
                            }
                            interface_field = interface_field.argument(input);
                        }
                        dynamic_interface = dynamic_interface.field(interface_field);
                    }
                    builder = builder.register(dynamic_interface);
                }
                TypeKind::Union(_) => {
                    return Err(SchemaError::UnsupportedType {
                        kind: "union",
                        name: type_name.to_string(),
                    });
                }
            }
        }

        if federated {
            builder = builder
                .register(federation::any_scalar())
                .register(federation::entity_union(&entity_resolvers))
                .register(federation::service_object(Arc::from(sdl.as_str())));
        }

        for install in data {
            builder = install(builder);
        }

        builder.finish().map_err(|err| SchemaError::Build(err.to_string()))
    }
}

/// Root type names plus the sets of declared objects, interfaces and
/// object fields.
struct SdlIndex {
    query: String,
    mutation: String,
    objects: HashSet<String>,
    interfaces: HashSet<String>,
    fields: HashSet<FieldCoordinate>,
}

impl SdlIndex {
    fn build(document: &ServiceDocument) -> Result<Self, SchemaError> {
        let mut query = "Query".to_string();
        let mut mutation = "Mutation".to_string();
        let mut subscription = "Subscription".to_string();
        let mut index = SdlIndex {
            query: String::new(),
            mutation: String::new(),
            objects: HashSet::new(),
            interfaces: HashSet::new(),
            fields: HashSet::new(),
        };

        for definition in &document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = &schema.node;
                    if let Some(name) = &schema.query {
                        query = name.node.to_string();
                    }
                    if let Some(name) = &schema.mutation {
                        mutation = name.node.to_string();
                    }
                    if let Some(name) = &schema.subscription {
                        subscription = name.node.to_string();
                    }
                }
                TypeSystemDefinition::Directive(_) => {}
                TypeSystemDefinition::Type(definition) => {
                    index.index_type(&definition.node);
                }
            }
        }

        if index.objects.contains(&subscription) {
            return Err(SchemaError::UnsupportedType {
                kind: "subscription root",
                name: subscription,
            });
        }

        index.query = query;
        index.mutation = mutation;
        Ok(index)
    }

    fn index_type(&mut self, definition: &TypeDefinition) {
        let type_name = definition.name.node.as_str();
        match &definition.kind {
            TypeKind::Object(object) => {
                self.objects.insert(type_name.to_string());
                for field in &object.fields {
                    self.fields
                        .insert(FieldCoordinate::new(type_name, field.node.name.node.as_str()));
                }
            }
            TypeKind::Interface(_) => {
                self.interfaces.insert(type_name.to_string());
            }
            _ => {}
        }
    }
}

fn field_shape(
    base: &str,
    index: &SdlIndex,
    type_resolvers: &HashMap<String, Arc<dyn ResolveType>>,
) -> FieldShape {
    if let Some(dispatch) = type_resolvers.get(base) {
        FieldShape::Abstract(dispatch.clone())
    } else if index.objects.contains(base) {
        FieldShape::Object
    } else {
        FieldShape::Leaf
    }
}

/// The `@deprecated` reason of a field, `Some(None)` for a bare
/// `@deprecated`.
fn deprecation(directives: &[Positioned<ConstDirective>]) -> Option<Option<String>> {
    let directive = directives
        .iter()
        .map(|directive| &directive.node)
        .find(|directive| directive.name.node.as_str() == "deprecated")?;
    let reason = directive
        .get_argument("reason")
        .and_then(|value| match &value.node {
            async_graphql::Value::String(reason) => Some(reason.clone()),
            _ => None,
        });
    Some(reason)
}

fn resolver_field(name: &str, ty: TypeRef, resolver: SharedResolver, shape: FieldShape) -> Field {
    Field::new(name.to_string(), ty, move |ctx| {
        let resolver = resolver.clone();
        let shape = shape.clone();
        FieldFuture::new(async move {
            let value = resolver.resolve(&ctx).await?;
            into_field_value(value, &shape)
        })
    })
}

fn type_ref(ty: &SdlType) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::Named(name.to_string().into()),
        BaseType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
    };
    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn base_name(ty: &SdlType) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => base_name(inner),
    }
}
