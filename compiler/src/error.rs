use std::path::PathBuf;

use thiserror::Error;
use tlgen_schema::GraphError;

#[derive(Debug, Error)]
pub enum TlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    File {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {file} at line {line}, column {column}: {msg}")]
    ParseError {
        file:   String,
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("Declaration error in {file} at line {line}: {msg}")]
    DeclarationError {
        file:   String,
        msg:    String,
        line:   usize,
    },

    #[error("Verifier error: {0}")]
    VerifierError(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
