//! Extension merging.
//!
//! Runs sequentially, in parse order, with exclusive access to the arena and
//! the index. For each extension:
//!
//! 1. `extension Outer.Inner` without a parent is re-rooted onto the nested
//!    declaration it names (module-qualified path, own module, then imports).
//! 2. Its name is resolved, global form first, at its own site.
//! 3. Found: members, nested declarations and nested aliases move into the
//!    base; inheritance clauses and annotations are unioned (the base wins).
//! 4. Not found: the extension becomes an orphan placeholder with no
//!    module, or folds into an existing placeholder of the same name.
//!
//! Shadowed duplicate declarations are folded into their winners last.

use crate::alias_table::AliasTable;
use crate::composer::ComposerOptions;
use crate::index::DeclIndex;
use crate::resolver::{ResolveCx, Resolver, Site};
use declgraph_common::{DeclId, Diagnostic, DiagnosticBag};
use declgraph_model::DeclArena;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// Index keys a declaration was registered under before a structural edit.
struct IndexedKeys {
    id: DeclId,
    global: String,
    module: Option<String>,
    qualified: String,
}

pub struct ExtensionMerger<'a> {
    arena: &'a mut DeclArena,
    index: &'a mut DeclIndex,
    aliases: &'a AliasTable,
    options: &'a ComposerOptions,
    diagnostics: &'a mut DiagnosticBag,
    folded: FxHashSet<DeclId>,
}

impl<'a> ExtensionMerger<'a> {
    pub fn new(
        arena: &'a mut DeclArena,
        index: &'a mut DeclIndex,
        aliases: &'a AliasTable,
        options: &'a ComposerOptions,
        diagnostics: &'a mut DiagnosticBag,
    ) -> Self {
        Self {
            arena,
            index,
            aliases,
            options,
            diagnostics,
            folded: FxHashSet::default(),
        }
    }

    /// Merge every extension and fold every shadowed duplicate. Returns the
    /// declarations that were folded into others.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(mut self) -> FxHashSet<DeclId> {
        let extensions: Vec<DeclId> = self
            .arena
            .iter()
            .filter(|(_, decl)| decl.is_extension())
            .map(|(id, _)| id)
            .collect();

        let mut merged = 0usize;
        let mut orphans = 0usize;
        for ext in extensions {
            self.reroot_nested_extension(ext);
            match self.resolve_extension(ext) {
                Some(target) if target != ext && !self.arena[target].is_extension() => {
                    self.merge_into(target, ext);
                    merged += 1;
                }
                _ => {
                    self.handle_orphan(ext);
                    orphans += 1;
                }
            }
        }

        loop {
            let pending = self.index.take_shadowed();
            if pending.is_empty() {
                break;
            }
            for (shadow, winner) in pending {
                if shadow != winner && !self.folded.contains(&shadow) {
                    self.merge_into(winner, shadow);
                }
            }
        }

        debug!(merged, orphans, folded = self.folded.len(), "extensions merged");
        self.folded
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn reroot_nested_extension(&mut self, ext: DeclId) {
        let decl = &self.arena[ext];
        if decl.parent.is_some() || !decl.local_name.contains('.') {
            return;
        }
        let path = decl.local_name.clone();
        let Some((first, rest)) = path.split_once('.') else {
            return;
        };

        let from_module_prefix = self
            .index
            .has_module(first)
            .then(|| self.index.in_module(first, rest))
            .flatten();
        let base = from_module_prefix
            .or_else(|| {
                decl.module
                    .as_deref()
                    .and_then(|module| self.index.in_module(module, &path))
            })
            .or_else(|| {
                decl.imports
                    .iter()
                    .find_map(|module| self.index.in_module(module, &path))
            });
        let Some(base) = base else {
            trace!(extension = %path, "no nested base to re-root onto");
            return;
        };

        let base_decl = &self.arena[base];
        let local_name = base_decl.local_name.clone();
        let module = base_decl.module.clone();
        let parent = base_decl.parent;

        let keys = self.snapshot_keys(self.arena.descendants(ext));
        self.arena.reroot(ext, local_name, module, parent);
        self.reindex(keys);
        debug!(extension = %path, base = %self.arena[base].qualified_name, "re-rooted nested extension");
    }

    fn resolve_extension(&mut self, ext: DeclId) -> Option<DeclId> {
        let resolver = Resolver::new(self.arena, self.index, self.aliases)
            .with_generic_stripping(self.options.strip_generic_arguments_for_inheritance);
        let mut cx = ResolveCx::new(self.options.max_resolution_depth);
        cx.set_file(self.arena[ext].file.clone());

        let site = Site::of_extension(self.arena, ext);
        let global = self.arena[ext].global_name();
        let qualified = self.arena[ext].qualified_name.clone();
        let target = resolver
            .resolve(&global, site, &mut cx)
            .or_else(|| resolver.resolve(&qualified, site, &mut cx));

        self.diagnostics.extend(cx.into_diagnostics());
        target
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    fn handle_orphan(&mut self, ext: DeclId) {
        let decl = &self.arena[ext];
        self.diagnostics.push(
            Diagnostic::unmatched_extension(&decl.qualified_name, &decl.inherited_names)
                .with_file(decl.file.clone()),
        );

        let placeholder = self
            .index
            .get(&decl.qualified_name)
            .filter(|&existing| existing != ext && self.arena[existing].is_unknown_extension);
        if let Some(placeholder) = placeholder {
            self.merge_into(placeholder, ext);
            return;
        }

        let mut subtree = vec![ext];
        subtree.extend(self.arena.descendants(ext));
        let keys = self.snapshot_keys(subtree);
        self.arena[ext].is_unknown_extension = true;
        self.arena.set_subtree_module(ext, None);
        self.reindex(keys);
    }

    /// Fold `source` into `target` and mark `source` as folded.
    fn merge_into(&mut self, target: DeclId, source: DeclId) {
        let src = &mut self.arena[source];
        let variables = std::mem::take(&mut src.variables);
        let methods = std::mem::take(&mut src.methods);
        let subscripts = std::mem::take(&mut src.subscripts);
        let enum_cases = std::mem::take(&mut src.enum_cases);
        let associated_types = std::mem::take(&mut src.associated_types);
        let generic_requirements = std::mem::take(&mut src.generic_requirements);
        let composed_type_names = std::mem::take(&mut src.composed_type_names);
        let inherited_names = std::mem::take(&mut src.inherited_names);
        let annotations = std::mem::take(&mut src.annotations);
        let nested = src.nested.clone();
        let aliases = src.aliases.clone();

        let dst = &mut self.arena[target];
        append_unique(&mut dst.variables, variables);
        append_unique(&mut dst.methods, methods);
        append_unique(&mut dst.subscripts, subscripts);
        append_unique(&mut dst.enum_cases, enum_cases);
        append_unique(&mut dst.associated_types, associated_types);
        append_unique(&mut dst.generic_requirements, generic_requirements);
        append_unique(&mut dst.composed_type_names, composed_type_names);
        dst.union_inherited_names(&inherited_names);
        dst.seed_based_on();
        for (key, value) in annotations {
            dst.annotations.entry(key).or_insert(value);
        }

        for child in nested {
            let mut subtree = vec![child];
            subtree.extend(self.arena.descendants(child));
            let keys = self.snapshot_keys(subtree);
            self.arena.reparent(child, target);
            self.reindex(keys);
        }
        for alias in aliases {
            self.arena.reparent_alias(alias, target);
        }

        self.folded.insert(source);
        trace!(
            source = %source,
            target = %self.arena[target].qualified_name,
            "folded declaration"
        );
    }

    fn snapshot_keys(&self, ids: Vec<DeclId>) -> Vec<IndexedKeys> {
        ids.into_iter()
            .map(|id| {
                let decl = &self.arena[id];
                IndexedKeys {
                    id,
                    global: decl.global_name(),
                    module: decl.module.clone(),
                    qualified: decl.qualified_name.clone(),
                }
            })
            .collect()
    }

    /// Drop stale index entries, then register the declarations again under
    /// their current names. Conflicts queue new shadowed duplicates.
    fn reindex(&mut self, keys: Vec<IndexedKeys>) {
        for key in &keys {
            self.index
                .remove(key.id, &key.global, key.module.as_deref(), &key.qualified);
        }
        for key in keys {
            let decl = &self.arena[key.id];
            if self.folded.contains(&key.id) || (decl.is_extension() && !decl.is_unknown_extension) {
                continue;
            }
            self.index.insert(self.arena, key.id, self.diagnostics);
        }
    }
}

fn append_unique<T: PartialEq>(into: &mut Vec<T>, items: Vec<T>) {
    for item in items {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}

#[cfg(test)]
#[path = "tests/merger_tests.rs"]
mod tests;
