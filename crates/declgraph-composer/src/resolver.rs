//! Name resolution.
//!
//! `resolve_name(name, site)` tries, first success wins:
//!
//! 1. the global-name index (`Module.Type`, or `Type` for module-less
//!    declarations), skipping extensions and orphan placeholders;
//! 2. the alias table, resolving the terminal alias's target at the alias
//!    owner's site;
//! 3. `Self` inside a scope;
//! 4. the enclosing scopes, innermost first (`Scope.name` as a type, then as
//!    a nested alias);
//! 5. the modules visible at the site (own module and imports);
//! 6. every other known module, then an explicit `Module.Type.Nested`;
//! 7. composite literals (`[A: B]`, `(A) -> B`, `G<A>`), resolved
//!    component-wise and rebuilt;
//! 8. nothing.
//!
//! Steps 5 and 6 report an ambiguity when more than one module declares the
//! name. Every re-entry goes through a [`RecursionGuard`] keyed by
//! (raw text, scope), so alias loops and self-referencing literals terminate.

use crate::alias_table::AliasTable;
use crate::index::DeclIndex;
use declgraph_common::limits::MAX_RESOLUTION_DEPTH;
use declgraph_common::{
    AliasId, DeclId, Diagnostic, DiagnosticBag, RecursionGuard, RecursionResult,
};
use declgraph_model::DeclArena;
use declgraph_syntax::split::{is_composite_literal, strip_generic_arguments};
use declgraph_syntax::{TypeExpr, TypeNode, parse_type};
use smallvec::SmallVec;
use tracing::trace;

// =============================================================================
// Site and results
// =============================================================================

/// Where a name is written: lexical scope, module and imports.
#[derive(Clone, Copy, Debug)]
pub struct Site<'s> {
    pub scope: Option<DeclId>,
    pub module: Option<&'s str>,
    pub imports: &'s [String],
}

impl<'s> Site<'s> {
    /// Inside declaration `id`.
    pub fn of(arena: &'s DeclArena, id: DeclId) -> Self {
        let decl = &arena[id];
        Self {
            scope: Some(id),
            module: decl.module.as_deref(),
            imports: &decl.imports,
        }
    }

    /// At file level.
    pub fn file(module: Option<&'s str>, imports: &'s [String]) -> Self {
        Self {
            scope: None,
            module,
            imports,
        }
    }

    /// Where an extension's own name is written: its parent scope.
    pub fn of_extension(arena: &'s DeclArena, id: DeclId) -> Self {
        let decl = &arena[id];
        Self {
            scope: decl.parent,
            module: decl.module.as_deref(),
            imports: &decl.imports,
        }
    }

    /// Where an alias target is written: the owner's scope, or file level.
    pub fn of_alias(arena: &'s DeclArena, alias: AliasId) -> Self {
        let record = arena.alias(alias);
        match record.owner {
            Some(owner) => Self {
                scope: Some(owner),
                module: record.module.as_deref(),
                imports: &arena[owner].imports,
            },
            None => Self::file(record.module.as_deref(), &record.imports),
        }
    }
}

/// Outcome of [`Resolver::resolve_name`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Display text: the declaration's qualified name, an alias target's
    /// text, or a rebuilt composite literal.
    pub name: String,
    pub decl: Option<DeclId>,
    /// The alias consulted, if resolution went through one.
    pub alias: Option<AliasId>,
    /// The annotated expression behind a composite result, so callers keep
    /// the element annotations instead of re-parsing `name`.
    pub node: Option<TypeNode>,
}

impl Resolution {
    fn declaration(arena: &DeclArena, id: DeclId) -> Self {
        Self {
            name: arena[id].qualified_name.clone(),
            decl: Some(id),
            alias: None,
            node: None,
        }
    }
}

/// Per-worker mutable resolution state.
pub struct ResolveCx {
    guard: RecursionGuard<(String, Option<DeclId>)>,
    pub diagnostics: DiagnosticBag,
    file: Option<String>,
}

impl ResolveCx {
    pub fn new(max_depth: u32) -> Self {
        Self {
            guard: RecursionGuard::for_resolution(max_depth),
            diagnostics: DiagnosticBag::new(),
            file: None,
        }
    }

    /// Attribute diagnostics to `file`.
    pub fn set_file(&mut self, file: Option<String>) {
        self.file = file;
    }

    /// Start a fresh work budget. Only takes effect between top-level calls.
    pub fn reset_budget(&mut self) {
        if self.guard.depth() == 0 {
            self.guard.reset();
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let file = self.file.clone();
        self.diagnostics.push(diagnostic.with_file(file));
    }

    pub fn into_diagnostics(self) -> DiagnosticBag {
        self.diagnostics
    }
}

impl Default for ResolveCx {
    fn default() -> Self {
        Self::new(MAX_RESOLUTION_DEPTH)
    }
}

enum ModuleLookup {
    Found(DeclId),
    Ambiguous(Vec<String>),
    NotFound,
}

// =============================================================================
// Resolver
// =============================================================================

/// Read-only resolver over a built arena, index and alias table.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    arena: &'a DeclArena,
    index: &'a DeclIndex,
    aliases: &'a AliasTable,
    strip_generic_arguments: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(arena: &'a DeclArena, index: &'a DeclIndex, aliases: &'a AliasTable) -> Self {
        Self {
            arena,
            index,
            aliases,
            strip_generic_arguments: true,
        }
    }

    #[must_use]
    pub fn with_generic_stripping(mut self, enabled: bool) -> Self {
        self.strip_generic_arguments = enabled;
        self
    }

    pub fn arena(&self) -> &'a DeclArena {
        self.arena
    }

    /// Resolve `name` to a declaration.
    pub fn resolve(&self, name: &str, site: Site<'_>, cx: &mut ResolveCx) -> Option<DeclId> {
        self.resolve_name(name, site, cx)?.decl
    }

    /// Resolve a name from an inheritance clause: `Base<Int>` looks up `Base`.
    pub fn resolve_nominal(&self, name: &str, site: Site<'_>, cx: &mut ResolveCx) -> Option<DeclId> {
        if self.strip_generic_arguments {
            let stripped = strip_generic_arguments(name);
            self.resolve(&stripped, site, cx)
        } else {
            self.resolve(name, site, cx)
        }
    }

    pub fn resolve_name(
        &self,
        name: &str,
        site: Site<'_>,
        cx: &mut ResolveCx,
    ) -> Option<Resolution> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let key = (name.to_string(), site.scope);
        match cx.guard.enter(key.clone()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(name, "resolution cycle");
                return None;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                cx.report(Diagnostic::resolution_limit(name));
                return None;
            }
        }
        let result = self.resolve_steps(name, site, cx);
        cx.guard.leave(&key);
        trace!(name, resolved = ?result.as_ref().map(|r| &r.name), "resolved");
        result
    }

    fn resolve_steps(&self, name: &str, site: Site<'_>, cx: &mut ResolveCx) -> Option<Resolution> {
        // 1. Global name.
        if let Some(id) = self.indexed_type(name) {
            return Some(Resolution::declaration(self.arena, id));
        }

        // 2. Alias.
        if let Some(alias) = self.aliases.terminal(name) {
            return Some(self.resolve_alias(alias, cx));
        }

        // 3. Self.
        if name == "Self"
            && let Some(scope) = site.scope
        {
            return Some(Resolution::declaration(self.arena, scope));
        }

        // 4. Enclosing scopes.
        if let Some(scope) = site.scope {
            for ancestor in self.arena.scope_chain(scope) {
                let decl = &self.arena[ancestor];
                if let Some(id) = self.indexed_type(&format!("{}.{name}", decl.global_name())) {
                    return Some(Resolution::declaration(self.arena, id));
                }
                if let Some(alias) = self
                    .aliases
                    .terminal(&format!("{}.{name}", decl.qualified_name))
                {
                    return Some(self.resolve_alias(alias, cx));
                }
            }
        }

        // 5. Modules visible at the site.
        let mut visible: SmallVec<[&str; 8]> = SmallVec::new();
        for module in site.module.into_iter().chain(site.imports.iter().map(String::as_str)) {
            if !visible.contains(&module) {
                visible.push(module);
            }
        }
        match self.lookup_in_modules(name, visible.iter().copied()) {
            ModuleLookup::Found(id) => return Some(Resolution::declaration(self.arena, id)),
            ModuleLookup::Ambiguous(candidates) => {
                cx.report(Diagnostic::ambiguous_reference(name, candidates));
                return None;
            }
            ModuleLookup::NotFound => {}
        }

        // 6. Every other module, then explicit `Module.Type.Nested`.
        let remaining = self
            .index
            .module_names()
            .into_iter()
            .filter(|module| !visible.contains(module));
        match self.lookup_in_modules(name, remaining) {
            ModuleLookup::Found(id) => return Some(Resolution::declaration(self.arena, id)),
            ModuleLookup::Ambiguous(candidates) => {
                cx.report(Diagnostic::ambiguous_reference(name, candidates));
                return None;
            }
            ModuleLookup::NotFound => {}
        }
        if let Some(module) = site.module
            && let Some(id) = self.indexed_type(&format!("{module}.{name}"))
        {
            return Some(Resolution::declaration(self.arena, id));
        }
        if let Some((module, rest)) = name.split_once('.')
            && let Some(id) = self.index.in_module(module, rest)
        {
            return Some(Resolution::declaration(self.arena, id));
        }

        // 7. Composite literal.
        if is_composite_literal(name) {
            let mut node = parse_type(name);
            if node.is_malformed() {
                cx.report(Diagnostic::malformed_type_expression(name));
                return None;
            }
            self.annotate_node(&mut node, site, cx);
            let decl = match &node.expr {
                TypeExpr::Generic { .. } => node.resolved,
                _ => None,
            };
            return Some(Resolution {
                name: node.effective_source(),
                decl,
                alias: None,
                node: Some(node),
            });
        }

        None
    }

    /// Global-name hit that can stand for a type. Orphan placeholders are
    /// indexed for merging only.
    fn indexed_type(&self, global_name: &str) -> Option<DeclId> {
        self.index
            .get(global_name)
            .filter(|&id| !self.arena[id].is_extension())
    }

    fn lookup_in_modules<'m>(
        &self,
        name: &str,
        modules: impl Iterator<Item = &'m str>,
    ) -> ModuleLookup {
        let mut found: SmallVec<[(DeclId, &'m str); 2]> = SmallVec::new();
        for module in modules {
            if let Some(id) = self.index.in_module(module, name)
                && !found.iter().any(|(existing, _)| *existing == id)
            {
                found.push((id, module));
            }
        }
        match found.as_slice() {
            [] => ModuleLookup::NotFound,
            [(id, _)] => ModuleLookup::Found(*id),
            _ => ModuleLookup::Ambiguous(
                found
                    .iter()
                    .map(|(_, module)| format!("{module}.{name}"))
                    .collect(),
            ),
        }
    }

    /// Resolve an alias's target at the alias owner's site.
    ///
    /// Returns the target's declaration when known, otherwise the target text
    /// for literal substitution.
    pub fn resolve_alias(&self, alias: AliasId, cx: &mut ResolveCx) -> Resolution {
        let record = self.arena.alias(alias);
        let site = Site::of_alias(self.arena, alias);
        let lookup = match &record.target.expr {
            TypeExpr::Plain { name } => name.as_str(),
            _ => record.target.raw.as_str(),
        };
        let (mut name, decl, mut node) = match self.resolve_name(lookup, site, cx) {
            Some(resolution) => (resolution.name, resolution.decl, resolution.node),
            None => (lookup.to_string(), None, None),
        };
        if record.target.is_plain() {
            if record.target.is_optional {
                name.push('?');
            } else if record.target.is_implicitly_unwrapped {
                name.push('!');
            }
            if let Some(node) = node.as_mut() {
                node.raw.clone_from(&name);
                node.is_optional |= record.target.is_optional;
                node.is_implicitly_unwrapped |= record.target.is_implicitly_unwrapped;
            }
        }
        Resolution {
            name,
            decl,
            alias: Some(alias),
            node,
        }
    }

    // =========================================================================
    // Type-expression annotation
    // =========================================================================

    /// Fill `resolved` and `actual` throughout `node`.
    pub fn annotate_node(&self, node: &mut TypeNode, site: Site<'_>, cx: &mut ResolveCx) {
        if node.is_malformed() {
            cx.report(Diagnostic::malformed_type_expression(&node.raw));
            return;
        }
        if node.is_void() {
            return;
        }

        match &node.expr {
            TypeExpr::Plain { name } => {
                let name = name.clone();
                if let Some(resolution) = self.resolve_name(&name, site, cx) {
                    node.resolved = resolution.decl;
                    if resolution.name != name {
                        let actual = match resolution.node {
                            Some(annotated) => annotated,
                            None => actual_node(&resolution.name, resolution.decl),
                        };
                        node.actual = Some(Box::new(actual));
                    }
                }
            }
            TypeExpr::Generic { name, .. } => {
                let base = name.clone();
                for child in node.children_mut() {
                    self.annotate_node(child, site, cx);
                }
                if let Some(resolution) = self.resolve_name(&base, site, cx) {
                    node.resolved = resolution.decl;
                    if resolution.name != base {
                        let arguments: Vec<String> =
                            node.children().iter().map(|arg| arg.effective_source()).collect();
                        let text = format!("{}<{}>", resolution.name, arguments.join(", "));
                        node.actual = Some(Box::new(actual_node(&text, resolution.decl)));
                    }
                }
            }
            _ => {
                for child in node.children_mut() {
                    self.annotate_node(child, site, cx);
                }
            }
        }
    }
}

fn actual_node(text: &str, decl: Option<DeclId>) -> TypeNode {
    let mut node = parse_type(text);
    node.resolved = decl;
    node
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
