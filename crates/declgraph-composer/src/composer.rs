//! The composition pipeline.
//!
//! ```text
//! parse results ─► arena ─► index + alias table ─► merge      (MergedGraph)
//!               ─► annotate (parallel)                        (AnnotatedGraph)
//!               ─► propagate ─► freeze                        (ComposedModel)
//! ```
//!
//! Each phase consumes the previous one, so relationships can only be
//! propagated over a merged, annotated graph.

use crate::alias_table::AliasTable;
use crate::annotate::{AnnotateContext, annotate_aliases, annotate_declarations, annotate_functions};
use crate::index::DeclIndex;
use crate::merger::ExtensionMerger;
use crate::relationships::RelationshipPropagator;
use crate::resolver::Resolver;
use declgraph_common::limits::{MAX_ALIAS_CHAIN_DEPTH, MAX_RESOLUTION_DEPTH};
use declgraph_common::{AliasId, DeclId, Diagnostic, DiagnosticBag, DiagnosticKind};
use declgraph_model::{
    DeclArena, Declaration, FileParseResult, Function, Method, MethodParameter,
    TypeAlias, rebuild_parse_results,
};
use declgraph_syntax::TypeNode;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

// =============================================================================
// Options
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposerOptions {
    /// Annotate on the calling thread instead of the rayon pool.
    pub serial: bool,
    pub max_alias_depth: u32,
    pub max_resolution_depth: u32,
    /// Look up `Base` for an inherited `Base<Int>`.
    pub strip_generic_arguments_for_inheritance: bool,
}

impl Default for ComposerOptions {
    fn default() -> Self {
        Self {
            serial: false,
            max_alias_depth: MAX_ALIAS_CHAIN_DEPTH,
            max_resolution_depth: MAX_RESOLUTION_DEPTH,
            strip_generic_arguments_for_inheritance: true,
        }
    }
}

// =============================================================================
// Composer
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct Composer {
    options: ComposerOptions,
}

impl Composer {
    pub fn new(options: ComposerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ComposerOptions {
        &self.options
    }

    /// Run the whole pipeline.
    #[tracing::instrument(level = "info", skip_all, fields(files = results.len()))]
    pub fn compose(&self, results: &[FileParseResult]) -> ComposedModel {
        let model = self.merge(results).annotate().freeze();
        info!(
            declarations = model.declarations.len(),
            aliases = model.aliases.len(),
            functions = model.functions.len(),
            diagnostics = model.diagnostics.len(),
            "composition finished"
        );
        model
    }

    /// Build the arena, index and alias table, then merge extensions.
    ///
    /// Malformed records never abort the run; they are skipped and reported.
    pub fn merge(&self, results: &[FileParseResult]) -> MergedGraph {
        let mut diagnostics = DiagnosticBag::new();
        let arena = DeclArena::from_parse_results(results, &mut diagnostics);
        MergedGraph::new(arena, diagnostics, self.options.clone())
    }
}

// =============================================================================
// Phases
// =============================================================================

/// Extensions merged, duplicates folded; nothing annotated yet.
pub struct MergedGraph {
    arena: DeclArena,
    index: DeclIndex,
    folded: FxHashSet<DeclId>,
    diagnostics: DiagnosticBag,
    options: ComposerOptions,
}

impl MergedGraph {
    #[tracing::instrument(level = "debug", skip_all, fields(declarations = arena.len()))]
    fn new(mut arena: DeclArena, mut diagnostics: DiagnosticBag, options: ComposerOptions) -> Self {
        let mut index = DeclIndex::build(&arena, &mut diagnostics);
        let aliases = AliasTable::build(&arena, options.max_alias_depth, &mut diagnostics);
        let folded =
            ExtensionMerger::new(&mut arena, &mut index, &aliases, &options, &mut diagnostics).run();
        Self {
            arena,
            index,
            folded,
            diagnostics,
            options,
        }
    }

    pub fn arena(&self) -> &DeclArena {
        &self.arena
    }

    pub fn index(&self) -> &DeclIndex {
        &self.index
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    /// Declarations that survive into the model, in arena order.
    pub fn visible_ids(&self) -> Vec<DeclId> {
        self.arena
            .iter()
            .filter(|(id, decl)| {
                !self.folded.contains(id) && !(decl.is_extension() && !decl.is_unknown_extension)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Resolve every member type, alias target and function signature.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn annotate(self) -> AnnotatedGraph {
        let visible = self.visible_ids();
        let Self {
            mut arena,
            index,
            mut diagnostics,
            options,
            ..
        } = self;

        // Nested aliases may have moved to new owners during the merge.
        let aliases = AliasTable::build(&arena, options.max_alias_depth, &mut diagnostics);

        let (declarations, alias_records, functions) = {
            let resolver = Resolver::new(&arena, &index, &aliases)
                .with_generic_stripping(options.strip_generic_arguments_for_inheritance);
            let ctx = AnnotateContext {
                resolver,
                max_resolution_depth: options.max_resolution_depth,
                serial: options.serial,
            };
            let (declarations, bag) = annotate_declarations(&ctx, &visible);
            diagnostics.extend(bag);
            let (alias_records, bag) = annotate_aliases(&resolver, options.max_resolution_depth);
            diagnostics.extend(bag);
            let (functions, bag) = annotate_functions(&resolver, options.max_resolution_depth);
            diagnostics.extend(bag);
            (declarations, alias_records, functions)
        };

        for (id, decl) in declarations {
            arena.replace(id, decl);
        }
        for (slot, alias) in arena.aliases_mut().iter_mut().zip(alias_records) {
            *slot = alias;
        }
        for (slot, function) in arena.functions_mut().iter_mut().zip(functions) {
            *slot = function;
        }

        AnnotatedGraph {
            arena,
            index,
            aliases,
            visible,
            diagnostics,
            options,
        }
    }
}

/// Every member type resolved; relationships not yet propagated.
pub struct AnnotatedGraph {
    arena: DeclArena,
    index: DeclIndex,
    aliases: AliasTable,
    visible: Vec<DeclId>,
    diagnostics: DiagnosticBag,
    options: ComposerOptions,
}

impl AnnotatedGraph {
    pub fn arena(&self) -> &DeclArena {
        &self.arena
    }

    /// Propagate relationships, drop merged declarations and renumber.
    #[tracing::instrument(level = "debug", skip_all, fields(visible = self.visible.len()))]
    pub fn freeze(self) -> ComposedModel {
        let Self {
            mut arena,
            index,
            aliases,
            visible,
            mut diagnostics,
            options,
        } = self;

        let propagation = {
            let resolver = Resolver::new(&arena, &index, &aliases)
                .with_generic_stripping(options.strip_generic_arguments_for_inheritance);
            RelationshipPropagator::new(resolver, options.max_resolution_depth).run(&visible)
        };
        diagnostics.extend(propagation.diagnostics);
        for (id, relationships) in propagation.relationships {
            relationships.apply(&mut arena[id]);
        }

        freeze(arena, visible, propagation.visit_order, diagnostics)
    }
}

// =============================================================================
// Freeze
// =============================================================================

/// Old handle -> new handle.
struct Renumbering {
    decls: Vec<Option<DeclId>>,
    aliases: Vec<Option<AliasId>>,
}

impl Renumbering {
    fn decl(&self, id: DeclId) -> Option<DeclId> {
        self.decls.get(id.index()).copied().flatten()
    }

    fn alias(&self, id: AliasId) -> Option<AliasId> {
        self.aliases.get(id.index()).copied().flatten()
    }

    fn node(&self, node: &mut TypeNode) {
        node.visit_mut(&mut |n| n.resolved = n.resolved.and_then(|id| self.decl(id)));
    }

    fn map(&self, map: &mut BTreeMap<String, DeclId>) {
        let renumbered = std::mem::take(map)
            .into_iter()
            .filter_map(|(name, id)| Some((name, self.decl(id)?)))
            .collect();
        *map = renumbered;
    }

    fn method(&self, method: &mut Method) {
        self.parameters(&mut method.parameters);
        if let Some(node) = &mut method.return_type {
            self.node(node);
        }
        method.defined_in = method.defined_in.and_then(|id| self.decl(id));
    }

    fn parameters(&self, parameters: &mut [MethodParameter]) {
        for parameter in parameters {
            self.node(&mut parameter.type_node);
        }
    }

    fn declaration(&self, decl: &mut Declaration) {
        decl.parent = decl.parent.and_then(|id| self.decl(id));
        decl.supertype = decl.supertype.and_then(|id| self.decl(id));
        decl.nested.retain_mut(|id| match self.decl(*id) {
            Some(new) => {
                *id = new;
                true
            }
            None => false,
        });
        decl.aliases.retain_mut(|id| match self.alias(*id) {
            Some(new) => {
                *id = new;
                true
            }
            None => false,
        });
        decl.composed_types = decl
            .composed_types
            .iter()
            .filter_map(|&id| self.decl(id))
            .collect();
        self.map(&mut decl.based_types);
        self.map(&mut decl.inherits_from);
        self.map(&mut decl.implements);
        if let Some(node) = &mut decl.raw_type {
            self.node(node);
        }

        for variable in &mut decl.variables {
            self.node(&mut variable.type_node);
            variable.defined_in = variable.defined_in.and_then(|id| self.decl(id));
        }
        for method in &mut decl.methods {
            self.method(method);
        }
        for subscript in &mut decl.subscripts {
            self.parameters(&mut subscript.parameters);
            self.node(&mut subscript.return_type);
            subscript.defined_in = subscript.defined_in.and_then(|id| self.decl(id));
        }
        for case in &mut decl.enum_cases {
            for value in &mut case.associated_values {
                self.node(&mut value.type_node);
            }
            case.defined_in = case.defined_in.and_then(|id| self.decl(id));
        }
        for associated in decl
            .associated_types
            .iter_mut()
            .chain(decl.inherited_associated_types.iter_mut())
        {
            if let Some(node) = &mut associated.constraint {
                self.node(node);
            }
            associated.defined_in = associated.defined_in.and_then(|id| self.decl(id));
        }
        for requirement in &mut decl.generic_requirements {
            self.node(&mut requirement.left);
            self.node(&mut requirement.right);
        }
    }

    fn type_alias(&self, alias: &mut TypeAlias) {
        alias.owner = alias.owner.and_then(|id| self.decl(id));
        alias.resolved = alias.resolved.and_then(|id| self.decl(id));
        self.node(&mut alias.target);
    }
}

/// Sort visible declarations by (qualified name, module), aliases by
/// qualified name and functions by name, and renumber every handle. Ties
/// fall back to module, file and finally arena order.
fn freeze(
    arena: DeclArena,
    visible: Vec<DeclId>,
    visit_order: Vec<DeclId>,
    diagnostics: DiagnosticBag,
) -> ComposedModel {
    let (decls, aliases, mut functions) = arena.into_parts();

    let mut order = visible;
    order.sort_by(|&a, &b| {
        let (left, right) = (&decls[a.index()], &decls[b.index()]);
        (&left.qualified_name, &left.module, a).cmp(&(&right.qualified_name, &right.module, b))
    });
    let mut alias_order: Vec<AliasId> = (0..aliases.len()).map(AliasId::from_index).collect();
    alias_order.sort_by(|&a, &b| {
        let (left, right) = (&aliases[a.index()], &aliases[b.index()]);
        (&left.qualified_name, &left.module, &left.file, a)
            .cmp(&(&right.qualified_name, &right.module, &right.file, b))
    });

    let mut renumbering = Renumbering {
        decls: vec![None; decls.len()],
        aliases: vec![None; aliases.len()],
    };
    for (new, &old) in order.iter().enumerate() {
        renumbering.decls[old.index()] = Some(DeclId::from_index(new));
    }
    for (new, &old) in alias_order.iter().enumerate() {
        renumbering.aliases[old.index()] = Some(AliasId::from_index(new));
    }

    let mut decl_slots: Vec<Option<Declaration>> = decls.into_iter().map(Some).collect();
    let declarations: Vec<Declaration> = order
        .iter()
        .filter_map(|old| decl_slots[old.index()].take())
        .map(|mut decl| {
            renumbering.declaration(&mut decl);
            decl
        })
        .collect();

    let mut alias_slots: Vec<Option<TypeAlias>> = aliases.into_iter().map(Some).collect();
    let aliases: Vec<TypeAlias> = alias_order
        .iter()
        .filter_map(|old| alias_slots[old.index()].take())
        .map(|mut alias| {
            renumbering.type_alias(&mut alias);
            alias
        })
        .collect();

    for function in &mut functions {
        renumbering.method(&mut function.signature);
    }
    functions.sort_by(|a, b| (a.name(), &a.module, &a.file).cmp(&(b.name(), &b.module, &b.file)));

    let propagation_order = visit_order
        .into_iter()
        .filter_map(|id| renumbering.decl(id))
        .collect();

    debug!(
        declarations = declarations.len(),
        aliases = aliases.len(),
        functions = functions.len(),
        "model frozen"
    );
    ComposedModel {
        declarations,
        functions,
        aliases,
        diagnostics: diagnostics.into_vec(),
        propagation_order,
    }
}

// =============================================================================
// Output
// =============================================================================

/// The composed, sorted model. `DeclId(i)` is `declarations[i]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedModel {
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub aliases: Vec<TypeAlias>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// Order in which relationship propagation completed.
    #[serde(skip)]
    pub propagation_order: Vec<DeclId>,
}

impl ComposedModel {
    #[inline]
    pub fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.index())
    }

    /// First declaration with `qualified_name`, any module.
    pub fn find(&self, qualified_name: &str) -> Option<&Declaration> {
        self.find_id(qualified_name).and_then(|id| self.declaration(id))
    }

    pub fn find_id(&self, qualified_name: &str) -> Option<DeclId> {
        self.declarations
            .iter()
            .position(|decl| decl.qualified_name == qualified_name)
            .map(DeclId::from_index)
    }

    pub fn find_in_module(&self, module: &str, qualified_name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|decl| decl.qualified_name == qualified_name && decl.module.as_deref() == Some(module))
    }

    pub fn alias(&self, qualified_name: &str) -> Option<&TypeAlias> {
        self.aliases
            .iter()
            .find(|alias| alias.qualified_name == qualified_name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name() == name)
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Input records that compose back to this model.
    pub fn to_parse_results(&self) -> Vec<FileParseResult> {
        rebuild_parse_results(&self.declarations, &self.aliases, &self.functions)
    }
}

#[cfg(test)]
#[path = "tests/composer_unit_tests.rs"]
mod tests;
