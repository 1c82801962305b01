use std::collections::HashMap;

use serde::Serialize;

use crate::{
    builtin::{normalize, Builtin, BYTES_ALIAS, BYTES_EXPANSION},
    error::GraphError,
    types::{Field, Function, Type, TypeId},
};

/// Identity of a type record: the outer name plus the resolved generic
/// argument. `vector<int53>` and `vector<long>` share a key because the
/// argument is resolved before the key is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
    name:    String,
    generic: Option<TypeId>,
}

/// Deduplicated registry of every type and function seen during one
/// compilation run.
///
/// Types live in an arena and are addressed by [`TypeId`]. Records are created
/// lazily on first reference and filled in place when their declaration is
/// processed, so forward references need no second pass.
#[derive(Debug, Clone, Serialize)]
pub struct TypeGraph {
    types:     Vec<Type>,
    functions: Vec<Function>,
    #[serde(skip)]
    index:     HashMap<TypeKey, TypeId>,
    #[serde(skip)]
    function_index: HashMap<String, usize>,
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraph {
    /// Creates a graph pre-seeded with the builtin scalars.
    pub fn new() -> Self {
        let mut graph = TypeGraph {
            types:          Vec::new(),
            functions:      Vec::new(),
            index:          HashMap::new(),
            function_index: HashMap::new(),
        };
        for builtin in Builtin::ALL {
            let key = TypeKey { name: builtin.normalized_name().to_string(), generic: None };
            graph.insert(key, Type::builtin(builtin));
        }
        graph
    }

    fn insert(&mut self, key: TypeKey, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        self.index.insert(key, id);
        id
    }

    fn intern(&mut self, key: TypeKey, name: String) -> TypeId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let generic = key.generic;
        self.insert(key, Type::placeholder(name, generic))
    }

    /// Returns the record for `token`, creating an empty placeholder on first
    /// reference. Generic arguments are resolved innermost first.
    pub fn resolve(&mut self, token: &str) -> Result<TypeId, GraphError> {
        let token = token.trim();
        if let Some((outer, inner)) = split_generic(token)? {
            let argument = self.resolve(inner)?;
            let name = format!("{}<{}>", outer, self.types[argument.index()].name);
            let key = TypeKey { name: outer.to_string(), generic: Some(argument) };
            return Ok(self.intern(key, name));
        }
        if token == BYTES_ALIAS {
            return self.resolve(BYTES_EXPANSION);
        }
        let name = normalize(token);
        let key = TypeKey { name: name.clone(), generic: None };
        Ok(self.intern(key, name))
    }

    /// Resolves the type a declaration is about and overwrites its
    /// description.
    pub fn declare(&mut self, token: &str, description: Option<&str>) -> Result<TypeId, GraphError> {
        let id = self.resolve(token)?;
        self.describe(id, description);
        Ok(id)
    }

    /// Checks that `token` is well formed at every generic level without
    /// creating anything.
    pub fn check_token(token: &str) -> Result<(), GraphError> {
        match split_generic(token.trim())? {
            Some((_, inner)) => Self::check_token(inner),
            None => Ok(()),
        }
    }

    /// Looks `token` up without creating anything.
    pub fn lookup(&self, token: &str) -> Option<TypeId> {
        let token = token.trim();
        if let Ok(Some((outer, inner))) = split_generic(token) {
            let argument = self.lookup(inner)?;
            let key = TypeKey { name: outer.to_string(), generic: Some(argument) };
            return self.index.get(&key).copied();
        }
        if token == BYTES_ALIAS {
            return self.lookup(BYTES_EXPANSION);
        }
        let key = TypeKey { name: normalize(token), generic: None };
        self.index.get(&key).copied()
    }

    /// Fills a placeholder with its declared fields.
    pub fn define(&mut self, id: TypeId, fields: Vec<Field>) -> Result<(), GraphError> {
        let ty = &mut self.types[id.index()];
        if ty.declared {
            return Err(GraphError::AlreadyDeclared(ty.name.clone()));
        }
        if ty.is_abstract_base {
            return Err(GraphError::AbstractBaseHasFields(ty.name.clone()));
        }
        ty.fields = fields;
        ty.declared = true;
        Ok(())
    }

    pub fn set_base(&mut self, id: TypeId, base: TypeId) {
        self.types[id.index()].base = Some(base);
    }

    /// Marks `id` as a union. The flag is never cleared afterwards.
    pub fn mark_abstract_base(&mut self, id: TypeId) -> Result<(), GraphError> {
        let ty = &mut self.types[id.index()];
        if ty.declared && !ty.is_builtin() {
            return Err(GraphError::ConcreteUsedAsBase(ty.name.clone()));
        }
        ty.is_abstract_base = true;
        Ok(())
    }

    /// Overwrites the description of a record. Called for the type a
    /// declaration is about, never for the types it merely references.
    pub fn describe(&mut self, id: TypeId, description: Option<&str>) {
        self.types[id.index()].description = description.map(str::to_string);
    }

    pub fn add_function(&mut self, function: Function) -> Result<(), GraphError> {
        if self.function_index.contains_key(&function.name) {
            return Err(GraphError::DuplicateFunction(function.name));
        }
        self.function_index.insert(function.name.clone(), self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn builtin(&self, builtin: Builtin) -> TypeId {
        let position = Builtin::ALL.iter().position(|b| *b == builtin).unwrap_or_default();
        TypeId(position as u32)
    }

    /// Every record in creation order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| (TypeId(i as u32), ty))
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.function_index.get(name).map(|&i| &self.functions[i])
    }

    /// Concrete types whose base is `base`, in creation order.
    pub fn variants_of(&self, base: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.types()
            .filter(move |(id, ty)| ty.base == Some(base) && *id != base)
            .map(|(id, _)| id)
    }

    /// Follows the generic chain of `id` down to its non-generic element.
    /// Returns the element and the number of generic levels crossed.
    pub fn generic_leaf(&self, id: TypeId) -> (TypeId, usize) {
        let mut current = id;
        let mut depth = 0;
        while let Some(argument) = self.get(current).generic {
            current = argument;
            depth += 1;
        }
        (current, depth)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Splits `outer<inner>` at the first `<` and the last `>`.
fn split_generic(token: &str) -> Result<Option<(&str, &str)>, GraphError> {
    match (token.find('<'), token.rfind('>')) {
        (None, None) => Ok(None),
        (Some(begin), Some(end))
            if begin > 0 && begin + 1 < end && end + 1 == token.len() =>
        {
            Ok(Some((&token[..begin], &token[begin + 1..end])))
        }
        _ => Err(GraphError::MalformedType(token.to_string())),
    }
}
