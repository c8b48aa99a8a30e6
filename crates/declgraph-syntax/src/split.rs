//! Depth-aware text scanning helpers.
//!
//! All helpers treat `(`, `[` and `<` as opening a nesting level and `)`, `]`
//! and `>` as closing one, except the `>` of an arrow (`->`), which never
//! closes anything. Only separators at nesting level zero count.

use smallvec::SmallVec;

#[inline]
fn is_open(ch: char) -> bool {
    matches!(ch, '(' | '[' | '<')
}

#[inline]
fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '>',
    }
}

/// Returns `true` when `ch` at this position closes a nesting level.
#[inline]
fn is_close(ch: char, prev: Option<char>) -> bool {
    match ch {
        ')' | ']' => true,
        '>' => prev != Some('-'),
        _ => false,
    }
}

/// Whether every opening delimiter is closed by the matching closer, in order.
pub fn delimiters_balanced(text: &str) -> bool {
    let mut stack: SmallVec<[char; 16]> = SmallVec::new();
    let mut prev = None;
    for ch in text.chars() {
        if is_open(ch) {
            stack.push(closer_for(ch));
        } else if is_close(ch, prev) {
            match stack.pop() {
                Some(expected) if expected == ch => {}
                _ => return false,
            }
        }
        prev = Some(ch);
    }
    stack.is_empty()
}

/// Byte index of the delimiter closing the one opened at `open_idx`.
pub fn matching_close(text: &str, open_idx: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut prev = None;
    for (idx, ch) in text[open_idx..].char_indices() {
        if is_open(ch) {
            depth += 1;
        } else if is_close(ch, prev) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(open_idx + idx);
            }
        }
        prev = Some(ch);
    }
    None
}

/// Whether `text` opens with `open` and the matching closer is its last character.
pub fn is_wrapped_in(text: &str, open: char) -> bool {
    if !text.starts_with(open) {
        return false;
    }
    matching_close(text, 0) == Some(text.len() - closer_for(open).len_utf8())
}

/// Byte indices of every top-level occurrence of `sep`.
fn top_level_positions(text: &str, sep: char) -> SmallVec<[usize; 8]> {
    let mut positions = SmallVec::new();
    let mut depth = 0usize;
    let mut prev = None;
    for (idx, ch) in text.char_indices() {
        if is_open(ch) {
            depth += 1;
        } else if is_close(ch, prev) {
            depth = depth.saturating_sub(1);
        } else if ch == sep && depth == 0 {
            positions.push(idx);
        }
        prev = Some(ch);
    }
    positions
}

/// Split on every top-level `sep`. Pieces are trimmed; an empty input yields
/// no pieces.
pub fn split_top_level(text: &str, sep: char) -> SmallVec<[&str; 4]> {
    let mut parts = SmallVec::new();
    if text.trim().is_empty() {
        return parts;
    }
    let mut start = 0;
    for idx in top_level_positions(text, sep) {
        parts.push(text[start..idx].trim());
        start = idx + sep.len_utf8();
    }
    parts.push(text[start..].trim());
    parts
}

/// Split on the first top-level `sep`.
pub fn split_once_top_level(text: &str, sep: char) -> Option<(&str, &str)> {
    let idx = *top_level_positions(text, sep).first()?;
    Some((text[..idx].trim(), text[idx + sep.len_utf8()..].trim()))
}

/// Byte index of the first top-level `->`.
pub fn find_top_level_arrow(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut prev: Option<(usize, char)> = None;
    for (idx, ch) in text.char_indices() {
        let prev_ch = prev.map(|(_, c)| c);
        if is_open(ch) {
            depth += 1;
        } else if ch == '>' && prev_ch == Some('-') {
            if depth == 0 {
                return prev.map(|(i, _)| i);
            }
        } else if is_close(ch, prev_ch) {
            depth = depth.saturating_sub(1);
        }
        prev = Some((idx, ch));
    }
    None
}

/// `Base<Int>` -> `Base`, `Outer<T>.Inner` -> `Outer.Inner`.
pub fn strip_generic_arguments(name: &str) -> String {
    if !name.contains('<') {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut prev = None;
    for ch in name.chars() {
        match ch {
            '<' => depth += 1,
            '>' if prev != Some('-') && depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
        prev = Some(ch);
    }
    out.trim().to_string()
}

/// Whether `text` looks like a composite literal rather than a (dotted) name.
pub fn is_composite_literal(text: &str) -> bool {
    text.contains("->") || text.contains(['[', ']', '(', ')', '<', '>', ':'])
}

/// A Swift-style identifier, including `_` and back-ticked names.
pub fn is_identifier(text: &str) -> bool {
    let text = text
        .strip_prefix('`')
        .and_then(|t| t.strip_suffix('`'))
        .unwrap_or(text);
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// A tuple or parameter label: `name`, `_`, or `external internal`.
pub fn is_label(text: &str) -> bool {
    let words: SmallVec<[&str; 2]> = text.split_whitespace().collect();
    !words.is_empty() && words.len() <= 2 && words.iter().all(|w| is_identifier(w))
}

#[cfg(test)]
#[path = "tests/split_tests.rs"]
mod tests;
