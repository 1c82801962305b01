use serde::Serialize;

use crate::builtin::Builtin;

/// Stable handle of a type record inside a [`TypeGraph`](crate::TypeGraph).
///
/// Two handles compare equal exactly when they address the same record, which
/// is how "the same type" is decided everywhere in the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    /// Normalized name. Generic records carry the full token, e.g. `vector<long>`.
    pub name:             String,
    pub description:      Option<String>,
    pub fields:           Vec<Field>,
    /// Argument of a generic record; nested generics form a chain.
    pub generic:          Option<TypeId>,
    /// The union this type is a variant of.
    pub base:             Option<TypeId>,
    pub is_abstract_base: bool,
    pub builtin:          Option<Builtin>,
    /// False while the record is only a placeholder created by a reference.
    pub declared:         bool,
}

impl Type {
    pub(crate) fn placeholder(name: String, generic: Option<TypeId>) -> Self {
        Type {
            name,
            description:      None,
            fields:           Vec::new(),
            generic,
            base:             None,
            is_abstract_base: false,
            builtin:          None,
            declared:         false,
        }
    }

    pub(crate) fn builtin(builtin: Builtin) -> Self {
        Type {
            builtin:  Some(builtin),
            declared: true,
            ..Type::placeholder(builtin.normalized_name().to_string(), None)
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin.is_some()
    }

    pub fn is_generic(&self) -> bool {
        self.generic.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:        String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_:       TypeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name:        String,
    pub description: Option<String>,
    pub args:        Vec<Field>,
    pub result:      TypeId,
}
