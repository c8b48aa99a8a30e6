//! Text -> [`TypeNode`] parser.
//!
//! Recognition order, first match wins:
//! 1. `[...]` wrapping the whole text: dictionary when the inner text has a
//!    top-level `:`, array otherwise.
//! 2. `(...)` wrapping the whole text: tuple when the inner text has a
//!    top-level `,` or a single labelled element; `()` is the void name;
//!    anything else is a redundant grouping and is parsed again.
//! 3. A top-level `->`: closure.
//! 4. `Name<...>`: generic.
//! 5. Plain name.
//!
//! Leading attributes and `inout` are peeled first, then a trailing `?`/`!`
//! when the text has no top-level arrow. Unbalanced text is kept as a plain
//! name holding the raw text.

use crate::split::{
    delimiters_balanced, find_top_level_arrow, is_label, is_wrapped_in, matching_close,
    split_once_top_level, split_top_level,
};
use crate::type_node::{ClosureParam, TupleElement, TypeExpr, TypeNode};
use declgraph_common::limits::MAX_TYPE_EXPR_DEPTH;

/// Parse a type expression.
pub fn parse_type(text: &str) -> TypeNode {
    parse_at_depth(text, 0)
}

fn parse_at_depth(text: &str, depth: u32) -> TypeNode {
    let raw = text.trim();
    if depth >= MAX_TYPE_EXPR_DEPTH || !delimiters_balanced(raw) {
        return TypeNode::plain(raw);
    }

    let mut node = TypeNode::plain(raw);
    let mut rest = raw;

    // Attributes and `inout`, in any order.
    loop {
        if let Some((attribute, after)) = peel_attribute(rest) {
            node.attributes.push(attribute.to_string());
            rest = after;
        } else if let Some(after) = peel_keyword(rest, "inout") {
            node.is_inout = true;
            rest = after;
        } else {
            break;
        }
    }

    if find_top_level_arrow(rest).is_none() {
        while let Some(stripped) = rest.strip_suffix('?') {
            node.is_optional = true;
            rest = stripped.trim_end();
        }
        if !node.is_optional
            && let Some(stripped) = rest.strip_suffix('!')
        {
            node.is_implicitly_unwrapped = true;
            rest = stripped.trim_end();
        }
    }

    match parse_body(rest, depth) {
        Body::Expr(expr) => node.expr = expr,
        Body::Grouped(inner) => {
            // `(T)` keeps the outer markers and adopts the inner structure.
            let inner = parse_at_depth(inner, depth + 1);
            node.is_optional |= inner.is_optional;
            node.is_implicitly_unwrapped |= inner.is_implicitly_unwrapped;
            node.is_inout |= inner.is_inout;
            node.attributes.extend(inner.attributes);
            node.expr = inner.expr;
        }
    }
    node
}

enum Body<'a> {
    Expr(TypeExpr),
    Grouped(&'a str),
}

fn parse_body(body: &str, depth: u32) -> Body<'_> {
    let next = depth + 1;

    if is_wrapped_in(body, '[') {
        let inner = &body[1..body.len() - 1];
        return Body::Expr(match split_once_top_level(inner, ':') {
            Some((key, value)) => TypeExpr::Dictionary {
                key: Box::new(parse_at_depth(key, next)),
                value: Box::new(parse_at_depth(value, next)),
            },
            None => TypeExpr::Array {
                element: Box::new(parse_at_depth(inner, next)),
            },
        });
    }

    if is_wrapped_in(body, '(') {
        let inner = body[1..body.len() - 1].trim();
        if inner.is_empty() {
            return Body::Expr(TypeExpr::Plain {
                name: "()".to_string(),
            });
        }
        let parts = split_top_level(inner, ',');
        if parts.len() > 1 || labelled(inner).is_some() {
            let elements = parts
                .iter()
                .map(|part| {
                    let (label, node) = labelled_node(part, next);
                    TupleElement { label, node }
                })
                .collect();
            return Body::Expr(TypeExpr::Tuple { elements });
        }
        return Body::Grouped(inner);
    }

    if let Some(arrow) = find_top_level_arrow(body) {
        return Body::Expr(parse_closure(&body[..arrow], &body[arrow + 2..], next));
    }

    if body.ends_with('>')
        && let Some(open) = body.find('<')
        && open > 0
        && matching_close(body, open) == Some(body.len() - 1)
    {
        let name = body[..open].trim().to_string();
        let arguments = split_top_level(&body[open + 1..body.len() - 1], ',')
            .iter()
            .map(|argument| parse_at_depth(argument, next))
            .collect();
        return Body::Expr(TypeExpr::Generic { name, arguments });
    }

    Body::Expr(TypeExpr::Plain {
        name: body.to_string(),
    })
}

fn parse_closure(left: &str, right: &str, depth: u32) -> TypeExpr {
    let mut left = left.trim();
    let mut is_async = false;
    let mut throws = false;
    let mut rethrows = false;
    loop {
        if let Some(rest) = strip_trailing_word(left, "async") {
            is_async = true;
            left = rest;
        } else if let Some(rest) = strip_trailing_word(left, "rethrows") {
            rethrows = true;
            throws = true;
            left = rest;
        } else if let Some(rest) = strip_trailing_word(left, "throws") {
            throws = true;
            left = rest;
        } else {
            break;
        }
    }

    let parameters = if is_wrapped_in(left, '(') {
        split_top_level(&left[1..left.len() - 1], ',')
            .iter()
            .map(|part| {
                let (label, node) = labelled_node(part, depth);
                ClosureParam { label, node }
            })
            .collect()
    } else if left.is_empty() {
        Vec::new()
    } else {
        vec![ClosureParam {
            label: None,
            node: parse_at_depth(left, depth),
        }]
    };

    TypeExpr::Closure {
        parameters,
        return_type: Box::new(parse_at_depth(right, depth)),
        is_async,
        throws,
        rethrows,
    }
}

/// `label: Type` with a valid label on the left of the first top-level colon.
fn labelled(text: &str) -> Option<(&str, &str)> {
    let (label, ty) = split_once_top_level(text, ':')?;
    is_label(label).then_some((label, ty))
}

fn labelled_node(text: &str, depth: u32) -> (Option<String>, TypeNode) {
    match labelled(text) {
        Some((label, ty)) => (Some(label.to_string()), parse_at_depth(ty, depth)),
        None => (None, parse_at_depth(text, depth)),
    }
}

/// `@name` or `@name(...)` at the start of `text`.
fn peel_attribute(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('@')?;
    let name_len = rest
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(rest.len(), |(i, _)| i);
    if name_len == 0 {
        return None;
    }
    let mut end = 1 + name_len;
    if text[end..].starts_with('(') {
        end = matching_close(text, end)? + 1;
    }
    Some((&text[..end], text[end..].trim_start()))
}

fn peel_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

fn strip_trailing_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_suffix(word)?;
    if rest.is_empty() || rest.ends_with(char::is_whitespace) || rest.ends_with(')') {
        Some(rest.trim_end())
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tests/parse_tests.rs"]
mod tests;
