//! Type-expression parsing for the declaration-graph composer.
//!
//! Member signatures arrive from the upstream parser as plain text
//! (`[String: [Int]]`, `(Int) async throws -> Result<Foo, Error>`). This crate
//! turns that text into a [`TypeNode`] tree without consulting any symbol
//! table; resolution fills in the node annotations later.

pub mod parse;
pub mod split;
pub mod type_node;

pub use parse::parse_type;
pub use type_node::{ClosureParam, TupleElement, TypeExpr, TypeNode};
