//! Type-expression tree.
//!
//! A [`TypeNode`] keeps the raw text it was parsed from, the structural
//! [`TypeExpr`] and two annotations that resolution fills in later:
//! `resolved` (the declaration the node names) and `actual` (the
//! alias-substituted or scope-qualified form). Annotation never replaces the
//! parsed structure.

use crate::split;
use declgraph_common::DeclId;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// TypeNode
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeNode {
    /// Trimmed source text.
    pub raw: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_implicitly_unwrapped: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_inout: bool,
    /// Leading attributes such as `@escaping` or `@MainActor`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    pub expr: TypeExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<DeclId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Box<TypeNode>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeExpr {
    Plain {
        name: String,
    },
    Array {
        element: Box<TypeNode>,
    },
    Dictionary {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },
    Tuple {
        elements: Vec<TupleElement>,
    },
    #[serde(rename_all = "camelCase")]
    Closure {
        parameters: Vec<ClosureParam>,
        return_type: Box<TypeNode>,
        #[serde(default)]
        is_async: bool,
        #[serde(default)]
        throws: bool,
        #[serde(default)]
        rethrows: bool,
    },
    Generic {
        name: String,
        arguments: Vec<TypeNode>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub node: TypeNode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub node: TypeNode,
}

impl TypeNode {
    /// A plain name node with no markers.
    pub fn plain(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            raw: name.clone(),
            is_optional: false,
            is_implicitly_unwrapped: false,
            is_inout: false,
            attributes: Vec::new(),
            expr: TypeExpr::Plain { name },
            resolved: None,
            actual: None,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.expr, TypeExpr::Plain { .. })
    }

    pub fn is_closure(&self) -> bool {
        matches!(self.expr, TypeExpr::Closure { .. })
    }

    /// `Void` and `()` are never resolved.
    pub fn is_void(&self) -> bool {
        matches!(&self.expr, TypeExpr::Plain { name } if name == "Void" || name == "()")
    }

    /// Raw text with unbalanced delimiters.
    pub fn is_malformed(&self) -> bool {
        !split::delimiters_balanced(&self.raw)
    }

    /// The nominal name: the plain name, or the base of a generic.
    pub fn nominal_name(&self) -> Option<&str> {
        match &self.expr {
            TypeExpr::Plain { name } | TypeExpr::Generic { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Direct structural children (not the `actual` annotation).
    pub fn children(&self) -> Vec<&TypeNode> {
        match &self.expr {
            TypeExpr::Plain { .. } => Vec::new(),
            TypeExpr::Array { element } => vec![element],
            TypeExpr::Dictionary { key, value } => vec![key, value],
            TypeExpr::Tuple { elements } => elements.iter().map(|e| &e.node).collect(),
            TypeExpr::Closure {
                parameters,
                return_type,
                ..
            } => parameters
                .iter()
                .map(|p| &p.node)
                .chain(std::iter::once(return_type.as_ref()))
                .collect(),
            TypeExpr::Generic { arguments, .. } => arguments.iter().collect(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut TypeNode> {
        match &mut self.expr {
            TypeExpr::Plain { .. } => Vec::new(),
            TypeExpr::Array { element } => vec![element.as_mut()],
            TypeExpr::Dictionary { key, value } => vec![key.as_mut(), value.as_mut()],
            TypeExpr::Tuple { elements } => elements.iter_mut().map(|e| &mut e.node).collect(),
            TypeExpr::Closure {
                parameters,
                return_type,
                ..
            } => parameters
                .iter_mut()
                .map(|p| &mut p.node)
                .chain(std::iter::once(return_type.as_mut()))
                .collect(),
            TypeExpr::Generic { arguments, .. } => arguments.iter_mut().collect(),
        }
    }

    /// Visit this node, its structural children and any `actual` annotation,
    /// pre-order.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut TypeNode)) {
        f(self);
        if let Some(actual) = self.actual.as_deref_mut() {
            actual.visit_mut(f);
        }
        for child in self.children_mut() {
            child.visit_mut(f);
        }
    }

    /// Drop resolution annotations from the whole tree.
    pub fn clear_annotations(&mut self) {
        self.visit_mut(&mut |node| {
            node.resolved = None;
            node.actual = None;
        });
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Canonical source text for the parsed structure.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, false);
        out
    }

    /// Source text with `actual` annotations substituted where present.
    pub fn effective_source(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, true);
        out
    }

    fn render(&self, out: &mut String, effective: bool) {
        for attribute in &self.attributes {
            out.push_str(attribute);
            out.push(' ');
        }
        if self.is_inout {
            out.push_str("inout ");
        }

        let suffix = if self.is_optional {
            Some('?')
        } else if self.is_implicitly_unwrapped {
            Some('!')
        } else {
            None
        };

        if effective && let Some(actual) = self.actual.as_deref() {
            let mut inner = String::new();
            actual.render(&mut inner, true);
            out.push_str(&inner);
            if let Some(suffix) = suffix
                && !inner.ends_with(suffix)
            {
                out.push(suffix);
            }
            return;
        }

        let wrap = suffix.is_some() && self.is_closure();
        if wrap {
            out.push('(');
        }
        self.render_expr(out, effective);
        if wrap {
            out.push(')');
        }
        if let Some(suffix) = suffix {
            out.push(suffix);
        }
    }

    fn render_expr(&self, out: &mut String, effective: bool) {
        match &self.expr {
            TypeExpr::Plain { name } => out.push_str(name),
            TypeExpr::Array { element } => {
                out.push('[');
                element.render(out, effective);
                out.push(']');
            }
            TypeExpr::Dictionary { key, value } => {
                out.push('[');
                key.render(out, effective);
                out.push_str(": ");
                value.render(out, effective);
                out.push(']');
            }
            TypeExpr::Tuple { elements } => {
                out.push('(');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if let Some(label) = &element.label {
                        out.push_str(label);
                        out.push_str(": ");
                    }
                    element.node.render(out, effective);
                }
                out.push(')');
            }
            TypeExpr::Closure {
                parameters,
                return_type,
                is_async,
                throws,
                rethrows,
            } => {
                out.push('(');
                for (i, param) in parameters.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if let Some(label) = &param.label {
                        out.push_str(label);
                        out.push_str(": ");
                    }
                    param.node.render(out, effective);
                }
                out.push(')');
                if *is_async {
                    out.push_str(" async");
                }
                if *rethrows {
                    out.push_str(" rethrows");
                } else if *throws {
                    out.push_str(" throws");
                }
                out.push_str(" -> ");
                return_type.render(out, effective);
            }
            TypeExpr::Generic { name, arguments } => {
                out.push_str(name);
                out.push('<');
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    argument.render(out, effective);
                }
                out.push('>');
            }
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}
