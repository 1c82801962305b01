//! tlgen-compiler
//!
//! This crate implements:
//!  1) A block splitter, documentation extractor and declaration parser for
//!     type-language schemas (`parser`, `tokenizer`),
//!  2) The declaration builder that fills a `TypeGraph` (`builder`),
//!  3) A graph verifier for undeclared types (`verifier`),
//!  4) Code generation: the emitter builds a structured `model`, the writer
//!     in `gen_csharp` renders it (`compile_schema` → files),
//!  5) Error types (`TlError`) and run options.

pub mod error;
pub mod options;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod builder;
pub mod verifier;
pub mod model;
pub mod emitter;
pub mod gen_csharp;
pub mod compiler;

pub use compiler::{compile_files, compile_schema, read_schema, write_files, Compilation, GeneratedFile};
pub use error::TlError;
pub use options::{CodegenOptions, CompileOptions};
