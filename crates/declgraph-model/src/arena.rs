//! Declaration arena.
//!
//! Owns every [`Declaration`], [`TypeAlias`] and [`Function`]. Parent links
//! are non-owning [`DeclId`] handles; the arena is the only place that edits
//! them so that `qualified_name` always matches the parent chain.

use crate::alias::TypeAlias;
use crate::decl::Declaration;
use crate::input::{FileParseResult, ParsedAlias, ParsedDeclaration};
use crate::members::{
    AssociatedType, EnumCase, Function, GenericRequirement, Method, Subscript, Variable,
};
use declgraph_common::limits::MAX_SCOPE_WALK_DEPTH;
use declgraph_common::{AliasId, DeclId, Diagnostic, DiagnosticBag};
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};
use tracing::debug;

/// File-level context shared by everything declared in one parse result.
struct FileContext<'a> {
    path: Option<&'a str>,
    module: Option<&'a str>,
    imports: &'a [String],
}

#[derive(Clone, Debug, Default)]
pub struct DeclArena {
    decls: Vec<Declaration>,
    aliases: Vec<TypeAlias>,
    functions: Vec<Function>,
}

/// `first` followed by the entries of `second` not already present.
pub fn union_imports(first: &[String], second: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(first.len() + second.len());
    for import in first.iter().chain(second) {
        if !out.contains(import) {
            out.push(import.clone());
        }
    }
    out
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Build the arena from parse results, in file order then declaration order.
    ///
    /// Records that cannot be placed (empty names, dotted names on nested
    /// non-extensions) are skipped together with their subtree and reported
    /// as [`InvalidRecord`](declgraph_common::DiagnosticKind::InvalidRecord).
    #[tracing::instrument(level = "debug", skip_all, fields(files = results.len()))]
    pub fn from_parse_results(results: &[FileParseResult], diagnostics: &mut DiagnosticBag) -> Self {
        let mut arena = Self::new();
        for result in results {
            let ctx = FileContext {
                path: result.path.as_deref(),
                module: result.module.as_deref(),
                imports: &result.imports,
            };
            for parsed in &result.declarations {
                arena.add_declaration(parsed, None, &ctx, diagnostics);
            }
            for parsed in &result.aliases {
                arena.add_alias(parsed, None, &ctx, diagnostics);
            }
            for parsed in &result.functions {
                if parsed.signature.name.trim().is_empty() {
                    diagnostics.push(
                        Diagnostic::invalid_record("<unnamed function>", "function has an empty name")
                            .with_file(ctx.path.map(str::to_string)),
                    );
                    continue;
                }
                let imports = union_imports(ctx.imports, &parsed.imports);
                arena
                    .functions
                    .push(Function::from_parsed(parsed, ctx.module, imports, ctx.path));
            }
        }
        debug!(
            declarations = arena.decls.len(),
            aliases = arena.aliases.len(),
            functions = arena.functions.len(),
            "arena built"
        );
        arena
    }

    /// `Parent.name` for nested records, `name` otherwise.
    fn written_path(&self, parent: Option<DeclId>, name: &str) -> String {
        match parent {
            Some(parent) => format!("{}.{name}", self[parent].qualified_name),
            None => name.to_string(),
        }
    }

    fn add_declaration(
        &mut self,
        parsed: &ParsedDeclaration,
        parent: Option<DeclId>,
        ctx: &FileContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Option<DeclId> {
        let file = ctx.path.map(str::to_string);
        let name = parsed.name.trim();
        if name.is_empty() {
            let subject = self.written_path(parent, &format!("<unnamed {}>", parsed.kind.keyword()));
            diagnostics.push(
                Diagnostic::invalid_record(&subject, "declaration has an empty name").with_file(file),
            );
            return None;
        }
        if parent.is_some() && !parsed.kind.is_extension() && name.contains('.') {
            let subject = self.written_path(parent, name);
            diagnostics.push(
                Diagnostic::invalid_record(&subject, "only extensions may use a dotted name")
                    .with_file(file),
            );
            return None;
        }

        let mut decl = Declaration::new(name, parsed.kind);
        decl.module = ctx.module.map(str::to_string);
        decl.imports = union_imports(ctx.imports, &parsed.imports);
        decl.inherited_names = parsed.inherited_names.clone();
        decl.variables = parsed.variables.iter().map(Variable::from_parsed).collect();
        decl.methods = parsed.methods.iter().map(Method::from_parsed).collect();
        decl.subscripts = parsed.subscripts.iter().map(Subscript::from_parsed).collect();
        decl.enum_cases = parsed.enum_cases.iter().map(EnumCase::from_parsed).collect();
        decl.associated_types = parsed
            .associated_types
            .iter()
            .map(AssociatedType::from_parsed)
            .collect();
        decl.generic_requirements = parsed
            .generic_requirements
            .iter()
            .map(GenericRequirement::from_parsed)
            .collect();
        decl.composed_type_names = parsed.composed_type_names.clone();
        decl.annotations = parsed.annotations.clone();
        decl.file = file;
        decl.parent = parent;
        decl.qualified_name = self.written_path(parent, &decl.local_name);
        decl.seed_based_on();

        let id = self.alloc(decl);
        if let Some(parent) = parent {
            self[parent].nested.push(id);
        }
        for alias in &parsed.aliases {
            self.add_alias(alias, Some(id), ctx, diagnostics);
        }
        for nested in &parsed.nested {
            self.add_declaration(nested, Some(id), ctx, diagnostics);
        }
        Some(id)
    }

    fn add_alias(
        &mut self,
        parsed: &ParsedAlias,
        owner: Option<DeclId>,
        ctx: &FileContext<'_>,
        diagnostics: &mut DiagnosticBag,
    ) -> Option<AliasId> {
        let name = parsed.name.trim();
        if name.is_empty() {
            let subject = self.written_path(owner, "<unnamed typealias>");
            diagnostics.push(
                Diagnostic::invalid_record(&subject, "typealias has an empty name")
                    .with_file(ctx.path.map(str::to_string)),
            );
            return None;
        }
        let mut alias = TypeAlias::new(name, &parsed.target);
        alias.file = ctx.path.map(str::to_string);
        match owner {
            Some(owner) => {
                alias.qualified_name = self.written_path(Some(owner), &alias.alias_name);
                alias.module = self[owner].module.clone();
                // Nested aliases resolve at their owner's site plus their own imports.
                alias.imports = parsed.imports.clone();
            }
            None => {
                alias.module = ctx.module.map(str::to_string);
                alias.imports = union_imports(ctx.imports, &parsed.imports);
            }
        }
        let id = self.alloc_alias(alias);
        if let Some(owner) = owner {
            self[owner].aliases.push(id);
        }
        Some(id)
    }

    pub fn alloc(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId::from_index(self.decls.len());
        self.decls.push(decl);
        id
    }

    pub fn alloc_alias(&mut self, alias: TypeAlias) -> AliasId {
        let id = AliasId::from_index(self.aliases.len());
        self.aliases.push(alias);
        id
    }

    pub fn push_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[inline]
    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Declaration> {
        self.decls.get_mut(id.index())
    }

    #[inline]
    pub fn alias(&self, id: AliasId) -> &TypeAlias {
        &self.aliases[id.index()]
    }

    #[inline]
    pub fn alias_mut(&mut self, id: AliasId) -> &mut TypeAlias {
        &mut self.aliases[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DeclId> + use<> {
        (0..self.decls.len()).map(DeclId::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, decl)| (DeclId::from_index(i), decl))
    }

    pub fn decls(&self) -> &[Declaration] {
        &self.decls
    }

    pub fn alias_ids(&self) -> impl Iterator<Item = AliasId> + use<> {
        (0..self.aliases.len()).map(AliasId::from_index)
    }

    pub fn aliases(&self) -> &[TypeAlias] {
        &self.aliases
    }

    pub fn aliases_mut(&mut self) -> &mut [TypeAlias] {
        &mut self.aliases
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut [Function] {
        &mut self.functions
    }

    /// Replace a declaration wholesale (used to apply annotation results).
    pub fn replace(&mut self, id: DeclId, decl: Declaration) {
        self.decls[id.index()] = decl;
    }

    pub fn into_parts(self) -> (Vec<Declaration>, Vec<TypeAlias>, Vec<Function>) {
        (self.decls, self.aliases, self.functions)
    }

    pub fn global_name(&self, id: DeclId) -> String {
        self[id].global_name()
    }

    /// `id` and its enclosing declarations, innermost first.
    pub fn scope_chain(&self, id: DeclId) -> SmallVec<[DeclId; 8]> {
        let mut chain = SmallVec::new();
        let mut current = Some(id);
        while let Some(scope) = current {
            if chain.len() as u32 >= MAX_SCOPE_WALK_DEPTH || chain.contains(&scope) {
                break;
            }
            chain.push(scope);
            current = self.get(scope).and_then(|decl| decl.parent);
        }
        chain
    }

    /// Every declaration nested (transitively) inside `id`, pre-order.
    pub fn descendants(&self, id: DeclId) -> Vec<DeclId> {
        let mut out = Vec::new();
        let mut stack: Vec<DeclId> = self[id].nested.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if out.contains(&next) || next == id {
                continue;
            }
            out.push(next);
            stack.extend(self[next].nested.iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Recompute qualified names of `id`'s subtree (declarations and nested
    /// aliases) from the parent chain.
    pub fn refresh_qualified_names(&mut self, id: DeclId) {
        let mut pending = vec![id];
        let mut visited = 0usize;
        while let Some(current) = pending.pop() {
            visited += 1;
            if visited > self.decls.len() {
                break;
            }
            let qualified = match self[current].parent {
                Some(parent) => format!("{}.{}", self[parent].qualified_name, self[current].local_name),
                None => self[current].local_name.clone(),
            };
            self[current].qualified_name = qualified.clone();
            for alias in self[current].aliases.clone() {
                let alias = self.alias_mut(alias);
                alias.qualified_name = format!("{qualified}.{}", alias.alias_name);
            }
            pending.extend(self[current].nested.iter().copied());
        }
    }

    /// Set the module on `id`'s subtree, including nested aliases.
    pub fn set_subtree_module(&mut self, id: DeclId, module: Option<String>) {
        for member in std::iter::once(id).chain(self.descendants(id)) {
            self[member].module = module.clone();
            for alias in self[member].aliases.clone() {
                self.alias_mut(alias).module = module.clone();
            }
        }
    }

    /// Set module and file on `id`'s subtree, including nested aliases.
    pub fn adopt_origin(&mut self, id: DeclId, module: Option<String>, file: Option<String>) {
        self.set_subtree_module(id, module);
        for member in std::iter::once(id).chain(self.descendants(id)) {
            self[member].file = file.clone();
            for alias in self[member].aliases.clone() {
                self.alias_mut(alias).file = file.clone();
            }
        }
    }

    /// Move `child` under `new_parent`. The subtree takes on the new parent's
    /// module and file.
    pub fn reparent(&mut self, child: DeclId, new_parent: DeclId) {
        if let Some(old_parent) = self[child].parent {
            self[old_parent].nested.retain(|&n| n != child);
        }
        self[child].parent = Some(new_parent);
        if !self[new_parent].nested.contains(&child) {
            self[new_parent].nested.push(child);
        }
        let module = self[new_parent].module.clone();
        let file = self[new_parent].file.clone();
        self.adopt_origin(child, module, file);
        self.refresh_qualified_names(child);
    }

    /// Move a nested alias under `new_owner`.
    pub fn reparent_alias(&mut self, alias: AliasId, new_owner: DeclId) {
        if let Some(old_owner) = self.alias(alias).owner {
            self[old_owner].aliases.retain(|&a| a != alias);
        }
        if !self[new_owner].aliases.contains(&alias) {
            self[new_owner].aliases.push(alias);
        }
        let qualified = self[new_owner].qualified_name.clone();
        let module = self[new_owner].module.clone();
        let file = self[new_owner].file.clone();
        let record = self.alias_mut(alias);
        record.owner = Some(new_owner);
        record.qualified_name = format!("{qualified}.{}", record.alias_name);
        record.module = module;
        record.file = file;
    }

    /// Rewrite an extension's written path to the base it extends.
    ///
    /// The parent link is set without registering `id` as a nested child: the
    /// extension is still going to be merged, not nested.
    pub fn reroot(
        &mut self,
        id: DeclId,
        local_name: String,
        module: Option<String>,
        parent: Option<DeclId>,
    ) {
        let decl = &mut self[id];
        decl.local_name = local_name;
        decl.parent = parent;
        self.set_subtree_module(id, module);
        self.refresh_qualified_names(id);
    }
}

impl Index<DeclId> for DeclArena {
    type Output = Declaration;

    #[inline]
    fn index(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }
}

impl IndexMut<DeclId> for DeclArena {
    #[inline]
    fn index_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }
}

#[cfg(test)]
#[path = "tests/arena_unit_tests.rs"]
mod tests;
