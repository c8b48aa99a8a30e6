//! Centralized limits and thresholds for the composer.
//!
//! Every traversal in the composer runs over user-supplied, possibly malformed
//! input: alias chains that loop back on themselves, inheritance clauses that
//! form cycles, or type expressions nested thousands of levels deep. The
//! constants below bound each of those traversals so a run always terminates.
//!
//! # Categories
//!
//! - **Chain Lengths**: alias chains and scope walks
//! - **Recursion Depths**: resolver re-entry and type-expression nesting
//! - **Operation Counts**: total resolver work per guard

// =============================================================================
// Chain Lengths
// =============================================================================

/// Maximum number of alias hops followed when collapsing an alias chain.
///
/// ```swift
/// typealias A = B
/// typealias B = C
/// typealias C = Int   // A reaches Int after two hops
/// ```
///
/// Chains longer than this are treated as terminating at the last alias
/// reached, the same way a detected cycle is.
pub const MAX_ALIAS_CHAIN_DEPTH: u32 = 64;

/// Maximum number of enclosing scopes visited when walking a scope chain
/// outward from a nested declaration.
///
/// Parent links are arena handles, so a corrupted input could in principle
/// produce a parent loop; this bound keeps the walk finite.
pub const MAX_SCOPE_WALK_DEPTH: u32 = 256;

// =============================================================================
// Recursion Depths
// =============================================================================

/// Maximum re-entry depth of the name resolver.
///
/// Resolution re-enters itself for alias targets, composite literals
/// (`[Foo: (Bar, Baz)]`) and scope-qualified candidates. Each re-entry is
/// keyed by (text, scope) in a `RecursionGuard`, so genuine cycles are caught
/// by the visiting set; this limit catches pathological non-cyclic nesting.
pub const MAX_RESOLUTION_DEPTH: u32 = 64;

/// Maximum nesting depth accepted by the type-expression parser.
///
/// Deeper input is returned as `Plain(rawText)` instead of recursing further.
pub const MAX_TYPE_EXPR_DEPTH: u32 = 128;

/// Maximum depth of the relationship propagation recursion
/// (`D` inherits `A` inherits `B` ...).
pub const MAX_INHERITANCE_DEPTH: u32 = 512;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of resolver entries per guard before resolution bails out.
pub const MAX_RESOLUTION_OPS: u32 = 100_000;

/// Maximum number of entries in any visiting set.
pub const MAX_VISITING_SET_SIZE: u32 = 10_000;
