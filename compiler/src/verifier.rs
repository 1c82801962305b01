use tlgen_schema::{TypeGraph, TypeId};

use crate::{error::TlError, utils::quote};

/// A type that is referenced somewhere but never declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Undeclared {
    pub type_name: String,
    pub field:     String,
    pub owner:     String,
}

impl Undeclared {
    pub fn message(&self) -> String {
        format!(
            "The type {} is not declared for field {} of {}",
            quote(&self.type_name),
            quote(&self.field),
            quote(&self.owner)
        )
    }
}

fn check(graph: &TypeGraph, id: TypeId, field: &str, owner: &str, found: &mut Vec<Undeclared>) {
    let (leaf, _) = graph.generic_leaf(id);
    let ty = graph.get(leaf);
    if !ty.declared && !ty.is_abstract_base {
        found.push(Undeclared {
            type_name: ty.name.clone(),
            field:     field.to_string(),
            owner:     owner.to_string(),
        });
    }
}

/// Lists every field or argument whose type (or generic element type) was
/// only ever referenced. Builtins and unions never count as undeclared.
pub fn find_undeclared(graph: &TypeGraph) -> Vec<Undeclared> {
    let mut found = Vec::new();

    for (_, ty) in graph.types() {
        for field in &ty.fields {
            check(graph, field.type_, &field.name, &ty.name, &mut found);
        }
    }
    for function in graph.functions() {
        for arg in &function.args {
            check(graph, arg.type_, &arg.name, &function.name, &mut found);
        }
    }

    found
}

/// Returns `Ok(())` if verification passed, or `Err(TlError::VerifierError(_))`
/// naming the first undeclared type otherwise.
pub fn verify_graph(graph: &TypeGraph) -> Result<(), TlError> {
    match find_undeclared(graph).first() {
        Some(undeclared) => Err(TlError::VerifierError(undeclared.message())),
        None => Ok(()),
    }
}
