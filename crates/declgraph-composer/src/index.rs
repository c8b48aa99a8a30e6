//! Declaration index.
//!
//! - `by_global_name`: `module.qualifiedName` (or `qualifiedName` when the
//!   module is unknown) -> declaration. Extensions are never indexed; orphan
//!   placeholders are.
//! - `by_module`: module -> qualified name -> declaration.
//!
//! The first declaration registered under a global name wins. Later ones are
//! reported and queued as shadowed so the merger can fold them into the
//! winner.

use declgraph_common::{DeclId, Diagnostic, DiagnosticBag};
use declgraph_model::DeclArena;
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct DeclIndex {
    by_global_name: FxHashMap<String, DeclId>,
    by_module: FxHashMap<String, FxHashMap<String, DeclId>>,
    /// (shadowed duplicate, winner), in discovery order.
    shadowed: Vec<(DeclId, DeclId)>,
}

impl DeclIndex {
    #[tracing::instrument(level = "debug", skip_all, fields(declarations = arena.len()))]
    pub fn build(arena: &DeclArena, diagnostics: &mut DiagnosticBag) -> Self {
        let mut index = Self::default();
        for (id, decl) in arena.iter() {
            if decl.is_extension() && !decl.is_unknown_extension {
                continue;
            }
            index.insert(arena, id, diagnostics);
        }
        debug!(
            global_names = index.by_global_name.len(),
            modules = index.by_module.len(),
            shadowed = index.shadowed.len(),
            "declaration index built"
        );
        index
    }

    /// Register `id` under its current names. Returns the winner when the
    /// global name was already taken by another declaration.
    pub fn insert(
        &mut self,
        arena: &DeclArena,
        id: DeclId,
        diagnostics: &mut DiagnosticBag,
    ) -> Option<DeclId> {
        let decl = &arena[id];
        let global = decl.global_name();
        match self.by_global_name.get(&global) {
            Some(&existing) if existing == id => return None,
            Some(&existing) => {
                let first_file = arena[existing].file.as_deref();
                diagnostics.push(
                    Diagnostic::duplicate_declaration(&global, first_file)
                        .with_file(decl.file.clone()),
                );
                self.shadowed.push((id, existing));
                return Some(existing);
            }
            None => {}
        }
        self.by_global_name.insert(global, id);
        if let Some(module) = &decl.module {
            self.by_module
                .entry(module.clone())
                .or_default()
                .entry(decl.qualified_name.clone())
                .or_insert(id);
        }
        None
    }

    /// Drop `old_global` (and the matching module entry) if it points at `id`.
    pub fn remove(&mut self, id: DeclId, old_global: &str, old_module: Option<&str>, old_qualified: &str) {
        if self.by_global_name.get(old_global) == Some(&id) {
            self.by_global_name.remove(old_global);
        }
        if let Some(module) = old_module
            && let Some(names) = self.by_module.get_mut(module)
            && names.get(old_qualified) == Some(&id)
        {
            names.remove(old_qualified);
        }
    }

    #[inline]
    pub fn get(&self, global_name: &str) -> Option<DeclId> {
        self.by_global_name.get(global_name).copied()
    }

    #[inline]
    pub fn in_module(&self, module: &str, qualified_name: &str) -> Option<DeclId> {
        self.by_module.get(module)?.get(qualified_name).copied()
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.by_module.contains_key(module)
    }

    /// Known module names, sorted.
    pub fn module_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_module.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_global_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_global_name.is_empty()
    }

    /// Take the queued (shadowed, winner) pairs.
    pub fn take_shadowed(&mut self) -> Vec<(DeclId, DeclId)> {
        std::mem::take(&mut self.shadowed)
    }
}

#[cfg(test)]
#[path = "tests/index_tests.rs"]
mod tests;
