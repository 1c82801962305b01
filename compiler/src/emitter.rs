use tlgen_schema::{Field, Function, Type, TypeGraph, TypeId};

use crate::{
    model::{Class, Parent, Property, TypeRef, Unit, UnitKind},
    utils::{capitalize, to_pascal_case},
};

/// Builds output units from a finished type graph.
pub struct Emitter<'a> {
    graph: &'a TypeGraph,
}

impl<'a> Emitter<'a> {
    pub fn new(graph: &'a TypeGraph) -> Self {
        Emitter { graph }
    }

    /// Concrete, non-generic, non-builtin types get a unit; unions only ever
    /// appear as the enclosing class of their variants.
    pub fn is_eligible(&self, id: TypeId) -> bool {
        let ty = self.graph.get(id);
        !ty.is_builtin() && !ty.is_generic() && !ty.is_abstract_base
    }

    /// The base of `ty` when it names a different class than `ty` itself.
    /// Names are compared as emitted, so `user_info = UserInfo` is top-level.
    fn distinct_base(&self, ty: &Type) -> Option<&'a Type> {
        let base = self.graph.get(ty.base?);
        if to_pascal_case(&base.name).to_lowercase() == to_pascal_case(&ty.name).to_lowercase() {
            None
        } else {
            Some(base)
        }
    }

    /// Spells a type reference, walking the generic chain to whatever depth
    /// it has. Every element is qualified by its own base.
    pub fn type_ref(&self, id: TypeId) -> TypeRef {
        let ty = self.graph.get(id);
        if let Some(element) = ty.generic {
            return TypeRef::Sequence(Box::new(self.type_ref(element)));
        }
        if let Some(builtin) = ty.builtin {
            return TypeRef::Scalar(builtin);
        }
        TypeRef::Class {
            base: self.distinct_base(ty).map(|base| to_pascal_case(&base.name)),
            name: to_pascal_case(&ty.name),
        }
    }

    fn properties(&self, class_name: &str, fields: &[Field]) -> Vec<Property> {
        fields
            .iter()
            .map(|field| {
                let type_ = self.type_ref(field.type_);
                Property {
                    name:        property_name(&field.name, class_name),
                    wire_name:   field.name.clone(),
                    description: field.description.clone(),
                    conversion:  type_.conversion(),
                    type_,
                }
            })
            .collect()
    }

    pub fn emit_type(&self, id: TypeId) -> Unit {
        let ty = self.graph.get(id);
        let name = to_pascal_case(&ty.name);

        let mut class = Class {
            properties:    self.properties(&name, &ty.fields),
            name,
            description:   ty.description.clone(),
            parent:        Parent::Root,
            discriminator: Some(ty.name.clone()),
            nested:        Vec::new(),
        };

        let class = match self.distinct_base(ty) {
            Some(base) => {
                let base_name = to_pascal_case(&base.name);
                class.parent = Parent::Class(base_name.clone());
                Class {
                    name:          base_name,
                    description:   base.description.clone(),
                    parent:        Parent::Root,
                    discriminator: None,
                    properties:    Vec::new(),
                    nested:        vec![class],
                }
            }
            None => class,
        };

        Unit {
            kind:      UnitKind::Object,
            file_stem: capitalize(&ty.name),
            class,
        }
    }

    pub fn emit_function(&self, function: &Function) -> Unit {
        let name = to_pascal_case(&function.name);
        Unit {
            kind:      UnitKind::Function,
            file_stem: capitalize(&function.name),
            class:     Class {
                properties:    self.properties(&name, &function.args),
                name,
                description:   function.description.clone(),
                parent:        Parent::Function(self.type_ref(function.result)),
                discriminator: Some(function.name.clone()),
                nested:        Vec::new(),
            },
        }
    }

    /// Every eligible type in graph order, then every function in
    /// declaration order.
    pub fn emit_all(&self) -> Vec<Unit> {
        let types = self
            .graph
            .types()
            .filter(|(id, _)| self.is_eligible(*id))
            .map(|(id, _)| self.emit_type(id));
        let functions = self.graph.functions().iter().map(|f| self.emit_function(f));
        types.chain(functions).collect()
    }
}

/// `snake_case` field name to property name. A property that would share its
/// class's name gets a trailing underscore.
pub fn property_name(field: &str, class_name: &str) -> String {
    let mut name = to_pascal_case(field);
    if name.to_lowercase() == class_name.to_lowercase() {
        name.push('_');
    }
    name
}
