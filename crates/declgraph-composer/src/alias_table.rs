//! Alias table.
//!
//! Every file-level alias is keyed by its name, every nested alias by
//! `ownerQualifiedName.aliasName`. For each key the table stores the declared
//! alias (one hop) and the terminal alias reached by following targets
//! through the table, so `A -> B -> C` answers `C` for `A` without further
//! chasing.

use declgraph_common::{AliasId, Diagnostic, DiagnosticBag};
use declgraph_model::{DeclArena, TypeAlias};
use declgraph_syntax::TypeExpr;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    unresolved: FxHashMap<String, AliasId>,
    resolved: FxHashMap<String, AliasId>,
}

/// Lookup key of an alias: qualified for nested aliases, bare otherwise.
pub fn alias_key(alias: &TypeAlias) -> &str {
    if alias.owner.is_some() {
        &alias.qualified_name
    } else {
        &alias.alias_name
    }
}

/// The text an alias target is looked up by: the bare name for plain
/// targets (`B?` looks up `B`), the raw text otherwise.
fn target_key(alias: &TypeAlias) -> &str {
    match &alias.target.expr {
        TypeExpr::Plain { name } => name,
        _ => &alias.target.raw,
    }
}

impl AliasTable {
    #[tracing::instrument(level = "debug", skip_all, fields(aliases = arena.aliases().len()))]
    pub fn build(arena: &DeclArena, max_depth: u32, diagnostics: &mut DiagnosticBag) -> Self {
        let mut table = Self::default();

        for id in arena.alias_ids() {
            let alias = arena.alias(id);
            let key = alias_key(alias);
            if table.unresolved.contains_key(key) {
                diagnostics.push(Diagnostic::duplicate_alias(key).with_file(alias.file.clone()));
                continue;
            }
            table.unresolved.insert(key.to_string(), id);
        }

        for id in arena.alias_ids() {
            let key = alias_key(arena.alias(id));
            if table.unresolved.get(key) != Some(&id) {
                continue;
            }
            let terminal = table.follow(arena, key, id, max_depth, diagnostics);
            table.resolved.insert(key.to_string(), terminal);
        }

        debug!(aliases = table.unresolved.len(), "alias table built");
        table
    }

    /// Follow `start` through the table to the last alias reached.
    fn follow(
        &self,
        arena: &DeclArena,
        key: &str,
        start: AliasId,
        max_depth: u32,
        diagnostics: &mut DiagnosticBag,
    ) -> AliasId {
        let mut visited: FxHashSet<AliasId> = FxHashSet::default();
        let mut chain: SmallVec<[String; 8]> = SmallVec::new();
        visited.insert(start);
        chain.push(key.to_string());

        let mut current = start;
        let mut hops = 0u32;
        loop {
            let Some(next) = self.next_hop(arena, current) else {
                return current;
            };
            let next_key = alias_key(arena.alias(next)).to_string();
            if !visited.insert(next) || hops >= max_depth {
                chain.push(next_key);
                let alias = arena.alias(start);
                diagnostics.push(
                    Diagnostic::cyclic_alias(key, chain.into_vec()).with_file(alias.file.clone()),
                );
                return current;
            }
            trace!(from = %chain[chain.len() - 1], to = %next_key, "alias hop");
            chain.push(next_key);
            current = next;
            hops += 1;
        }
    }

    /// The alias `current`'s target names, if any.
    fn next_hop(&self, arena: &DeclArena, current: AliasId) -> Option<AliasId> {
        let alias = arena.alias(current);
        let target = target_key(alias);
        if let Some(owner) = alias.owner {
            let scoped = format!("{}.{}", arena[owner].qualified_name, target);
            if let Some(&next) = self.unresolved.get(&scoped) {
                return Some(next);
            }
        }
        self.unresolved.get(target).copied()
    }

    /// The alias declared under `name`.
    #[inline]
    pub fn declared(&self, name: &str) -> Option<AliasId> {
        self.unresolved.get(name).copied()
    }

    /// The terminal alias reached from `name`.
    #[inline]
    pub fn terminal(&self, name: &str) -> Option<AliasId> {
        self.resolved.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.unresolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/alias_table_tests.rs"]
mod tests;
