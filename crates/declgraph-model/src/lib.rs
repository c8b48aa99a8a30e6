//! Data model for the declaration-graph composer.
//!
//! - [`input`]: per-file parse results as handed over by the upstream parser.
//! - [`decl`]: the [`Declaration`] record and its [`DeclKind`].
//! - [`members`]: variables, methods, subscripts, enum cases and friends.
//! - [`alias`]: [`TypeAlias`] records.
//! - [`arena`]: the [`DeclArena`] that owns everything and keeps qualified
//!   names consistent while the composer re-roots and re-parents.
//! - [`rebuild`]: turning a declaration list back into parse results.

pub mod alias;
pub mod arena;
pub mod builder;
pub mod decl;
pub mod input;
pub mod members;
pub mod rebuild;

pub use alias::TypeAlias;
pub use arena::DeclArena;
pub use decl::{DeclKind, Declaration};
pub use input::{
    FileParseResult, ParsedAlias, ParsedAssociatedType, ParsedAssociatedValue, ParsedDeclaration,
    ParsedEnumCase, ParsedFunction, ParsedGenericRequirement, ParsedMethod, ParsedParameter,
    ParsedSubscript, ParsedVariable,
};
pub use members::{
    AssociatedType, AssociatedValue, EnumCase, Function, GenericRequirement, Method, MethodFlags,
    MethodParameter, RequirementRelation, Subscript, Variable,
};
pub use rebuild::rebuild_parse_results;
