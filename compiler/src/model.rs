//! Structured form of the generated sources.
//!
//! The emitter builds these values from the type graph; the writer in
//! [`gen_csharp`](crate::gen_csharp) is the only place that turns them into
//! text.

use std::fmt;

use serde::Serialize;
use tlgen_schema::Builtin;

/// A reference to a type as it is spelled in generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeRef {
    Scalar(Builtin),
    /// A generated class, qualified by the base class it is nested in.
    Class {
        base: Option<String>,
        name: String,
    },
    /// One generic level: a sequence of the element type.
    Sequence(Box<TypeRef>),
}

impl TypeRef {
    /// The element type under every sequence level.
    pub fn leaf(&self) -> &TypeRef {
        match self {
            TypeRef::Sequence(element) => element.leaf(),
            other => other,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TypeRef::Sequence(element) => 1 + element.depth(),
            _ => 0,
        }
    }

    pub fn conversion(&self) -> Conversion {
        match self.leaf() {
            TypeRef::Scalar(builtin) if builtin.is_string_encoded() => Conversion::StringInt64,
            _ => Conversion::Default,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(builtin) => f.write_str(builtin.normalized_name()),
            TypeRef::Class { base: Some(base), name } => write!(f, "{}.{}", base, name),
            TypeRef::Class { base: None, name } => f.write_str(name),
            TypeRef::Sequence(element) => write!(f, "{}[]", element),
        }
    }
}

/// How a property's value is converted to and from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Conversion {
    Default,
    /// 64-bit integers carried as JSON strings.
    StringInt64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Parent {
    Root,
    Class(String),
    /// The function base class, parameterized by the result type.
    Function(TypeRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name:        String,
    /// Key of the value in the wire object.
    pub wire_name:   String,
    pub description: Option<String>,
    pub type_:       TypeRef,
    pub conversion:  Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    pub name:          String,
    pub description:   Option<String>,
    pub parent:        Parent,
    /// Wire name of a concrete class. Base classes have none.
    pub discriminator: Option<String>,
    pub properties:    Vec<Property>,
    pub nested:        Vec<Class>,
}

impl Class {
    /// The innermost class, i.e. the concrete one a unit exists for.
    pub fn innermost(&self) -> &Class {
        match self.nested.first() {
            Some(nested) => nested.innermost(),
            None => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitKind {
    Object,
    Function,
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub kind:      UnitKind,
    pub file_stem: String,
    pub class:     Class,
}

impl Unit {
    /// Dotted path of the concrete class, e.g. `Message.PhotoMessage`.
    pub fn qualified_name(&self) -> String {
        let mut path = vec![self.class.name.as_str()];
        let mut class = &self.class;
        while let Some(nested) = class.nested.first() {
            path.push(&nested.name);
            class = nested;
        }
        path.join(".")
    }
}
