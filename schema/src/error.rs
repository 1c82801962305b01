use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Malformed type {0:?}: unbalanced angle brackets")]
    MalformedType(String),

    #[error("The type {0:?} is declared twice")]
    AlreadyDeclared(String),

    #[error("The type {0:?} is an abstract base and cannot have fields")]
    AbstractBaseHasFields(String),

    #[error("The type {0:?} is declared as a concrete type and cannot be used as a union")]
    ConcreteUsedAsBase(String),

    #[error("The function {0:?} is declared twice")]
    DuplicateFunction(String),
}
