//! Common types and utilities for the declgraph composer.
//!
//! This crate provides foundational types used across all declgraph crates:
//! - Arena handles (`DeclId`, `AliasId`)
//! - Composer limits and thresholds
//! - Recursion guards for cycle detection on malformed input
//! - Structured diagnostics (`Diagnostic`, `DiagnosticKind`, `DiagnosticBag`)

// Arena handles shared by the model and composer crates
pub mod ids;
pub use ids::{AliasId, DeclId};

// Centralized limits and thresholds
pub mod limits;

// Cycle detection and depth limiting
pub mod recursion;
pub use recursion::{RecursionGuard, RecursionResult};

// Structured warnings emitted by the composer
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticKind};
