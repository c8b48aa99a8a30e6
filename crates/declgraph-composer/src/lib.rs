//! Declaration-graph composer.
//!
//! Turns per-file parse results into one consistent model:
//!
//! 1. [`index`]: global-name and per-module lookup tables.
//! 2. [`alias_table`]: alias chains collapsed to their terminal alias.
//! 3. [`merger`]: extensions and duplicate declarations folded into their
//!    base declarations; unmatched extensions kept as placeholders.
//! 4. [`annotate`]: every member type expression resolved, in parallel.
//! 5. [`relationships`]: transitive inheritance and conformance maps.
//! 6. [`composer`]: the pipeline and the frozen, sorted [`ComposedModel`].
//!
//! Resolution itself lives in [`resolver`].

pub mod alias_table;
pub mod annotate;
pub mod composer;
pub mod index;
pub mod merger;
pub mod relationships;
pub mod resolver;

pub use alias_table::AliasTable;
pub use composer::{AnnotatedGraph, ComposedModel, Composer, ComposerOptions, MergedGraph};
pub use index::DeclIndex;
pub use resolver::{ResolveCx, Resolution, Resolver, Site};
