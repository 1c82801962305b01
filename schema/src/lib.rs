//! Data model shared by the tlgen compiler and its tooling.
//!
//! A schema describes types and functions in a compact type language:
//!
//! ```text
//! //@description A text message @id Message identifier @text Message text
//! message id:int53 text:string = Message;
//! ```
//!
//! Every type seen while compiling lives in a [`TypeGraph`], which guarantees
//! one record per `(name, generic argument)` pair:
//!
//! ```
//! use tlgen_schema::*;
//!
//! let mut graph = TypeGraph::new();
//! let a = graph.resolve("vector<int53>").unwrap();
//! let b = graph.resolve("vector<long>").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(graph.get(a).name, "vector<long>");
//! ```

pub mod builtin;
pub mod error;
pub mod graph;
pub mod types;

pub use builtin::*;
pub use error::GraphError;
pub use graph::TypeGraph;
pub use types::*;
