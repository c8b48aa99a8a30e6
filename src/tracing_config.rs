//! Tracing configuration for debugging compositions.
//!
//! Supports three output formats controlled by `DECLGRAPH_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `tree`: hierarchical indented output via `tracing-tree`, one level per
//!   pipeline phase
//! - `json`: one JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Phase progress and every diagnostic
//! DECLGRAPH_LOG=debug declgraph parsed/
//!
//! # Resolver steps for a single run, as a tree
//! DECLGRAPH_LOG=declgraph_composer::resolver=trace DECLGRAPH_LOG_FORMAT=tree declgraph parsed/
//!
//! # Machine-readable
//! DECLGRAPH_LOG=warn DECLGRAPH_LOG_FORMAT=json declgraph parsed/
//! ```
//!
//! The subscriber is only initialised when `DECLGRAPH_LOG` (or `RUST_LOG`)
//! is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a `DECLGRAPH_LOG_FORMAT` value. Unknown values fall back to text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("DECLGRAPH_LOG_FORMAT").unwrap_or_default())
    }
}

/// `DECLGRAPH_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("DECLGRAPH_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `DECLGRAPH_LOG` nor `RUST_LOG` is set. All
/// output goes to stderr; stdout carries the composed model.
pub fn init_tracing() {
    let has_own_log = std::env::var("DECLGRAPH_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return;
    }

    let filter = build_filter();

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
