//! Member annotation.
//!
//! Resolves every type expression reachable from a declaration's members at
//! the declaration's own site. Each declaration is processed independently:
//! workers read the shared arena, index and alias table and return a new copy
//! of the one declaration they own, so the work runs in parallel with rayon.
//! Results and diagnostics are applied in arena order.

use crate::resolver::{ResolveCx, Resolver, Site};
use declgraph_common::{DeclId, DiagnosticBag};
use declgraph_model::{DeclKind, Declaration, Function, TypeAlias};
use declgraph_syntax::{TypeNode, parse_type};
use rayon::prelude::*;
use tracing::debug;

/// Shared inputs for one annotation pass.
pub struct AnnotateContext<'a> {
    pub resolver: Resolver<'a>,
    pub max_resolution_depth: u32,
    pub serial: bool,
}

/// Annotated copies of `ids`, in the same order, plus their diagnostics
/// concatenated in that order.
#[tracing::instrument(level = "debug", skip_all, fields(declarations = ids.len(), serial = ctx.serial))]
pub fn annotate_declarations(
    ctx: &AnnotateContext<'_>,
    ids: &[DeclId],
) -> (Vec<(DeclId, Declaration)>, DiagnosticBag) {
    let work = |&id: &DeclId| {
        let mut cx = ResolveCx::new(ctx.max_resolution_depth);
        let decl = annotate_declaration(&ctx.resolver, id, &mut cx);
        (id, decl, cx.into_diagnostics())
    };
    let results: Vec<(DeclId, Declaration, DiagnosticBag)> = if ctx.serial {
        ids.iter().map(work).collect()
    } else {
        ids.par_iter().map(work).collect()
    };

    let mut diagnostics = DiagnosticBag::new();
    let mut annotated = Vec::with_capacity(results.len());
    for (id, decl, bag) in results {
        diagnostics.extend(bag);
        annotated.push((id, decl));
    }
    debug!(annotated = annotated.len(), "declarations annotated");
    (annotated, diagnostics)
}

/// A copy of declaration `id` with every member type resolved.
pub fn annotate_declaration(resolver: &Resolver<'_>, id: DeclId, cx: &mut ResolveCx) -> Declaration {
    let arena = resolver.arena();
    let mut decl = arena[id].clone();
    cx.set_file(decl.file.clone());
    let site = Site::of(arena, id);

    for variable in &mut decl.variables {
        resolver.annotate_node(&mut variable.type_node, site, cx);
        variable.defined_in = Some(id);
    }

    let initializer_name = decl.qualified_name.clone();
    for method in &mut decl.methods {
        for parameter in &mut method.parameters {
            resolver.annotate_node(&mut parameter.type_node, site, cx);
        }
        if method.is_initializer() {
            let text = if method.is_failable_initializer() {
                format!("{initializer_name}?")
            } else {
                initializer_name.clone()
            };
            let mut node = parse_type(&text);
            node.resolved = Some(id);
            method.return_type = Some(node);
        } else if let Some(return_type) = &mut method.return_type {
            resolver.annotate_node(return_type, site, cx);
        }
        method.defined_in = Some(id);
    }

    for subscript in &mut decl.subscripts {
        for parameter in &mut subscript.parameters {
            resolver.annotate_node(&mut parameter.type_node, site, cx);
        }
        resolver.annotate_node(&mut subscript.return_type, site, cx);
        subscript.defined_in = Some(id);
    }

    for case in &mut decl.enum_cases {
        for value in &mut case.associated_values {
            resolver.annotate_node(&mut value.type_node, site, cx);
        }
        case.defined_in = Some(id);
    }

    let associated_names: Vec<String> =
        decl.associated_types.iter().map(|a| a.name.clone()).collect();
    for associated in &mut decl.associated_types {
        if let Some(constraint) = &mut associated.constraint {
            resolver.annotate_node(constraint, site, cx);
        }
        associated.defined_in = Some(id);
    }

    for requirement in &mut decl.generic_requirements {
        let left_root = requirement
            .left
            .nominal_name()
            .and_then(|name| name.split('.').next())
            .unwrap_or_default();
        requirement.left_is_associated_type = associated_names.iter().any(|n| n == left_root);
        if !requirement.left_is_associated_type {
            resolver.annotate_node(&mut requirement.left, site, cx);
        }
        resolver.annotate_node(&mut requirement.right, site, cx);
    }

    if decl.kind == DeclKind::ProtocolComposition {
        decl.composed_types = decl
            .composed_type_names
            .iter()
            .filter_map(|name| resolver.resolve_nominal(name, site, cx))
            .collect();
    }

    if decl.kind == DeclKind::Enum {
        decl.raw_type = infer_raw_type(resolver, &decl, site, cx);
    }

    decl
}

/// A non-static `rawValue` variable wins; otherwise the first inherited name
/// when every case is bare and that name is not interface-like.
fn infer_raw_type(
    resolver: &Resolver<'_>,
    decl: &Declaration,
    site: Site<'_>,
    cx: &mut ResolveCx,
) -> Option<TypeNode> {
    if let Some(raw_value) = decl
        .variables
        .iter()
        .find(|v| v.name == "rawValue" && !v.is_static)
    {
        return Some(raw_value.type_node.clone());
    }

    let first = decl.inherited_names.first()?;
    if decl.enum_cases.is_empty() || decl.enum_cases.iter().any(|c| c.has_associated_values()) {
        return None;
    }
    let resolved = resolver.resolve_nominal(first, site, cx);
    let arena = resolver.arena();
    if let Some(target) = resolved
        && matches!(
            arena[target].kind,
            DeclKind::Protocol | DeclKind::ProtocolComposition
        )
    {
        return None;
    }
    let mut node = parse_type(first);
    resolver.annotate_node(&mut node, site, cx);
    Some(node)
}

/// Annotate alias targets at their owners' sites and set `resolved`.
pub fn annotate_aliases(resolver: &Resolver<'_>, max_depth: u32) -> (Vec<TypeAlias>, DiagnosticBag) {
    let arena = resolver.arena();
    let mut cx = ResolveCx::new(max_depth);
    let aliases = arena
        .alias_ids()
        .map(|id| {
            cx.reset_budget();
            let mut alias = arena.alias(id).clone();
            cx.set_file(alias.file.clone());
            let site = Site::of_alias(arena, id);
            resolver.annotate_node(&mut alias.target, site, &mut cx);
            alias.resolved = alias
                .target
                .resolved
                .or_else(|| alias.target.actual.as_ref().and_then(|actual| actual.resolved));
            alias
        })
        .collect();
    (aliases, cx.into_diagnostics())
}

/// Annotate free functions at file level.
pub fn annotate_functions(resolver: &Resolver<'_>, max_depth: u32) -> (Vec<Function>, DiagnosticBag) {
    let arena = resolver.arena();
    let mut cx = ResolveCx::new(max_depth);
    let functions = arena
        .functions()
        .iter()
        .map(|function| {
            cx.reset_budget();
            cx.set_file(function.file.clone());
            let mut function = function.clone();
            let module = function.module.clone();
            let imports = function.imports.clone();
            let site = Site::file(module.as_deref(), &imports);
            for parameter in &mut function.signature.parameters {
                resolver.annotate_node(&mut parameter.type_node, site, &mut cx);
            }
            if let Some(return_type) = &mut function.signature.return_type {
                resolver.annotate_node(return_type, site, &mut cx);
            }
            function
        })
        .collect();
    (functions, cx.into_diagnostics())
}

#[cfg(test)]
#[path = "tests/annotate_tests.rs"]
mod tests;
