//! declgraph: composes independently parsed Swift declarations into one
//! resolved semantic model.
//!
//! The work happens in the member crates; this crate re-exports them and
//! hosts the command line driver.
//!
//! ```no_run
//! use declgraph::composer::Composer;
//! use declgraph::model::{FileParseResult, ParsedDeclaration};
//!
//! let files = vec![
//!     FileParseResult::new("App").declaration(ParsedDeclaration::structure("Foo")),
//!     FileParseResult::new("App")
//!         .declaration(ParsedDeclaration::extension("Foo").variable("x", "Int")),
//! ];
//! let model = Composer::default().compose(&files);
//! assert_eq!(model.find("Foo").map(|foo| foo.variables.len()), Some(1));
//! ```

pub use declgraph_common as common;
pub use declgraph_composer as composer;
pub use declgraph_model as model;
pub use declgraph_syntax as syntax;

pub mod cli;
pub mod tracing_config;
