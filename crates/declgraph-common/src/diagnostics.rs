//! Structured diagnostics for the composer.
//!
//! The composer never aborts a run on bad input. Every ambiguity, unmatched
//! extension, duplicate or cycle becomes a [`Diagnostic`] that is both logged
//! through `tracing::warn!` (with the same structured fields) and returned to
//! the caller as part of the composed model.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// What went wrong for a single symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// More than one module declares a type with the requested name.
    AmbiguousReference,
    /// An extension whose base declaration could not be found.
    UnmatchedExtension,
    /// A second non-extension declaration with an already-indexed global name.
    DuplicateDeclaration,
    /// A second alias registered under an already-used alias name.
    DuplicateAlias,
    /// An alias chain that loops back on itself or exceeds the hop limit.
    CyclicAlias,
    /// An inheritance clause that loops back to a declaration being propagated.
    CyclicInheritance,
    /// Name resolution gave up after exceeding its depth or work budget.
    ResolutionLimit,
    /// Type-expression text with unbalanced delimiters.
    MalformedTypeExpression,
    /// A parse-result record that cannot enter the arena (empty or dotted name).
    InvalidRecord,
}

impl DiagnosticKind {
    /// Stable numeric code, used by reporters and tests.
    pub const fn code(self) -> u32 {
        match self {
            Self::AmbiguousReference => 1001,
            Self::UnmatchedExtension => 1002,
            Self::DuplicateDeclaration => 1003,
            Self::DuplicateAlias => 1004,
            Self::CyclicAlias => 1005,
            Self::CyclicInheritance => 1006,
            Self::ResolutionLimit => 1007,
            Self::MalformedTypeExpression => 1008,
            Self::InvalidRecord => 1009,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AmbiguousReference => "ambiguous-reference",
            Self::UnmatchedExtension => "unmatched-extension",
            Self::DuplicateDeclaration => "duplicate-declaration",
            Self::DuplicateAlias => "duplicate-alias",
            Self::CyclicAlias => "cyclic-alias",
            Self::CyclicInheritance => "cyclic-inheritance",
            Self::ResolutionLimit => "resolution-limit",
            Self::MalformedTypeExpression => "malformed-type-expression",
            Self::InvalidRecord => "invalid-record",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A structured composer warning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: u32,
    /// The name the diagnostic is about (type name, alias name, extension name).
    pub subject: String,
    /// Competing candidates, where relevant (ambiguities, duplicates, cycles).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
    pub message: String,
    /// Originating file, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code(),
            subject: subject.into(),
            candidates: Vec::new(),
            message: message.into(),
            file: None,
        }
    }

    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn ambiguous_reference(subject: &str, candidates: Vec<String>) -> Self {
        let message = format!(
            "Ambiguous type {subject}, found {}. Specify module name at declaration site to disambiguate.",
            candidates.join(", ")
        );
        Self::new(DiagnosticKind::AmbiguousReference, subject, message).with_candidates(candidates)
    }

    pub fn unmatched_extension(subject: &str, inherited_names: &[String]) -> Self {
        let clause = if inherited_names.is_empty() {
            String::new()
        } else {
            format!(": {}", inherited_names.join(", "))
        };
        let message = format!(
            "Found \"extension {subject}{clause}\" of type for which there is no original type declaration information."
        );
        Self::new(DiagnosticKind::UnmatchedExtension, subject, message)
            .with_candidates(inherited_names.to_vec())
    }

    pub fn duplicate_declaration(subject: &str, first_file: Option<&str>) -> Self {
        let message = match first_file {
            Some(file) => format!(
                "Duplicate declaration of {subject}; the declaration from {file} takes precedence and this one is merged into it."
            ),
            None => format!(
                "Duplicate declaration of {subject}; the first declaration takes precedence and this one is merged into it."
            ),
        };
        Self::new(DiagnosticKind::DuplicateDeclaration, subject, message)
    }

    pub fn duplicate_alias(subject: &str) -> Self {
        Self::new(
            DiagnosticKind::DuplicateAlias,
            subject,
            format!("Duplicate typealias {subject}; the first declaration takes precedence."),
        )
    }

    pub fn cyclic_alias(subject: &str, chain: Vec<String>) -> Self {
        let message = format!(
            "Typealias {subject} does not terminate ({}); the last alias reached is used as its target.",
            chain.join(" -> ")
        );
        Self::new(DiagnosticKind::CyclicAlias, subject, message).with_candidates(chain)
    }

    pub fn cyclic_inheritance(subject: &str, via: &str) -> Self {
        Self::new(
            DiagnosticKind::CyclicInheritance,
            subject,
            format!("Inheritance of {subject} loops back through {via}; relationships are partial."),
        )
        .with_candidates(vec![via.to_string()])
    }

    pub fn resolution_limit(subject: &str) -> Self {
        Self::new(
            DiagnosticKind::ResolutionLimit,
            subject,
            format!("Resolution of {subject} exceeded the recursion limit; treating it as unknown."),
        )
    }

    /// A record skipped while building the arena, together with everything nested in it.
    pub fn invalid_record(subject: &str, reason: &str) -> Self {
        Self::new(
            DiagnosticKind::InvalidRecord,
            subject,
            format!("Skipping {subject}: {reason}."),
        )
    }

    pub fn malformed_type_expression(subject: &str) -> Self {
        Self::new(
            DiagnosticKind::MalformedTypeExpression,
            subject,
            format!("Type expression {subject} has unbalanced delimiters; keeping it as a plain name."),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DG{} [{}] {}", self.code, self.kind, self.message)
    }
}

// =============================================================================
// DiagnosticBag
// =============================================================================

/// Insertion-ordered, de-duplicated diagnostic sink.
///
/// Each pushed diagnostic is logged once, at the moment it is first seen.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBag {
    items: IndexSet<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Returns `false` if an identical one was already recorded.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.items.contains(&diagnostic) {
            return false;
        }
        tracing::warn!(
            kind = %diagnostic.kind,
            code = diagnostic.code,
            subject = %diagnostic.subject,
            candidates = ?diagnostic.candidates,
            file = diagnostic.file.as_deref().unwrap_or(""),
            "{}",
            diagnostic.message
        );
        self.items.insert(diagnostic)
    }

    /// Append another bag, preserving its order and skipping duplicates.
    pub fn extend(&mut self, other: DiagnosticBag) {
        for diagnostic in other.items {
            self.items.insert(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items.into_iter().collect()
    }
}

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod tests;
