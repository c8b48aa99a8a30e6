//! Relationship propagation.
//!
//! Computes the transitive `based_on`, `based_types`, `inherits_from` and
//! `implements` maps of every visible declaration. Ancestors are propagated
//! first and memoised, so in a diamond (`D1: A`, `D2: A`, `A: B`) the shared
//! ancestor is computed once and both descendants see `B`.
//!
//! The pass is read-only over the arena; results are collected into a
//! [`Relationships`] map and written back by the pipeline.

use crate::resolver::{ResolveCx, Resolver, Site};
use declgraph_common::limits::{MAX_INHERITANCE_DEPTH, MAX_RESOLUTION_OPS};
use declgraph_common::{DeclId, Diagnostic, DiagnosticBag, RecursionGuard, RecursionResult};
use declgraph_model::{AssociatedType, DeclKind, Declaration};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Propagated relationships of one declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relationships {
    pub based_on: BTreeMap<String, String>,
    pub based_types: BTreeMap<String, DeclId>,
    pub inherits_from: BTreeMap<String, DeclId>,
    pub implements: BTreeMap<String, DeclId>,
    pub supertype: Option<DeclId>,
    pub inherited_associated_types: Vec<AssociatedType>,
}

impl Relationships {
    fn seeded(decl: &Declaration) -> Self {
        Self {
            based_on: decl
                .inherited_names
                .iter()
                .map(|name| (name.clone(), name.clone()))
                .collect(),
            ..Self::default()
        }
    }

    fn absorb(&mut self, ancestor: &Relationships) {
        self.based_on
            .extend(ancestor.based_on.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.based_types
            .extend(ancestor.based_types.iter().map(|(k, &v)| (k.clone(), v)));
        self.inherits_from
            .extend(ancestor.inherits_from.iter().map(|(k, &v)| (k.clone(), v)));
        self.implements
            .extend(ancestor.implements.iter().map(|(k, &v)| (k.clone(), v)));
    }

    /// Write the propagated maps into `decl`.
    pub fn apply(self, decl: &mut Declaration) {
        decl.based_on = self.based_on;
        decl.based_types = self.based_types;
        decl.inherits_from = self.inherits_from;
        decl.implements = self.implements;
        decl.supertype = self.supertype;
        decl.inherited_associated_types = self.inherited_associated_types;
    }
}

/// Output of [`RelationshipPropagator::run`].
#[derive(Debug, Default)]
pub struct Propagation {
    pub relationships: FxHashMap<DeclId, Relationships>,
    /// Declarations in the order their propagation completed.
    pub visit_order: Vec<DeclId>,
    pub diagnostics: DiagnosticBag,
}

pub struct RelationshipPropagator<'a> {
    resolver: Resolver<'a>,
    cx: ResolveCx,
    guard: RecursionGuard<DeclId>,
    done: FxHashMap<DeclId, Relationships>,
    visit_order: Vec<DeclId>,
}

impl<'a> RelationshipPropagator<'a> {
    pub fn new(resolver: Resolver<'a>, max_resolution_depth: u32) -> Self {
        Self {
            resolver,
            cx: ResolveCx::new(max_resolution_depth),
            guard: RecursionGuard::new(MAX_INHERITANCE_DEPTH, MAX_RESOLUTION_OPS),
            done: FxHashMap::default(),
            visit_order: Vec::new(),
        }
    }

    /// Propagate every declaration in `ids`, in order.
    #[tracing::instrument(level = "debug", skip_all, fields(declarations = ids.len()))]
    pub fn run(mut self, ids: &[DeclId]) -> Propagation {
        for &id in ids {
            let decl = &self.resolver.arena()[id];
            if decl.is_extension() && !decl.is_unknown_extension {
                continue;
            }
            self.guard.reset();
            self.propagate(id, None);
        }
        debug!(propagated = self.visit_order.len(), "relationships propagated");
        Propagation {
            relationships: self.done,
            visit_order: self.visit_order,
            diagnostics: self.cx.into_diagnostics(),
        }
    }

    fn propagate(&mut self, id: DeclId, from: Option<DeclId>) {
        if self.done.contains_key(&id) {
            return;
        }
        let arena = self.resolver.arena();
        match self.guard.enter(id) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                let via = from.map_or_else(String::new, |from| arena[from].qualified_name.clone());
                trace!(decl = %arena[id].qualified_name, via = %via, "inheritance cycle");
                self.cx.diagnostics.push(
                    Diagnostic::cyclic_inheritance(&arena[id].qualified_name, &via)
                        .with_file(arena[id].file.clone()),
                );
                return;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                self.cx.diagnostics.push(
                    Diagnostic::resolution_limit(&arena[id].qualified_name)
                        .with_file(arena[id].file.clone()),
                );
                return;
            }
        }

        let decl = &arena[id];
        let site = Site::of(arena, id);
        let mut relationships = Relationships::seeded(decl);
        self.cx.set_file(decl.file.clone());

        for (position, name) in decl.inherited_names.iter().enumerate() {
            self.cx.reset_budget();
            let Some(ancestor) = self.resolver.resolve_nominal(name, site, &mut self.cx) else {
                trace!(decl = %decl.qualified_name, name = %name, "ancestor unresolved");
                continue;
            };
            self.propagate(ancestor, Some(id));
            if self.guard.is_visiting(&ancestor) {
                continue;
            }
            if let Some(inherited) = self.done.get(&ancestor) {
                relationships.absorb(inherited);
            }

            let base = &arena[ancestor];
            match base.kind {
                DeclKind::Class => {
                    relationships
                        .inherits_from
                        .insert(base.global_name(), ancestor);
                    if position == 0 && decl.kind == DeclKind::Class {
                        relationships.supertype = Some(ancestor);
                    }
                }
                DeclKind::Protocol => {
                    relationships
                        .implements
                        .insert(base.global_name(), ancestor);
                    if decl.kind.is_interface_like() {
                        let from_ancestor = self
                            .done
                            .get(&ancestor)
                            .map(|r| r.inherited_associated_types.as_slice())
                            .unwrap_or_default();
                        inherit_associated_types(
                            &mut relationships.inherited_associated_types,
                            decl,
                            base.associated_types.iter().chain(from_ancestor),
                        );
                    }
                }
                DeclKind::ProtocolComposition => {
                    relationships
                        .implements
                        .insert(base.global_name(), ancestor);
                    for &composed in &base.composed_types {
                        relationships
                            .implements
                            .insert(arena[composed].global_name(), composed);
                    }
                }
                DeclKind::Struct | DeclKind::Enum | DeclKind::Extension => {}
            }
            relationships
                .based_types
                .insert(base.global_name(), ancestor);
        }

        self.guard.leave(&id);
        self.done.insert(id, relationships);
        self.visit_order.push(id);
    }
}

/// Append ancestor associated types not already declared or inherited.
fn inherit_associated_types<'t>(
    into: &mut Vec<AssociatedType>,
    decl: &Declaration,
    candidates: impl Iterator<Item = &'t AssociatedType>,
) {
    for associated in candidates {
        let declared = decl.associated_types.iter().any(|a| a.name == associated.name);
        let inherited = into.iter().any(|a| a.name == associated.name);
        if !declared && !inherited {
            into.push(associated.clone());
        }
    }
}

#[cfg(test)]
#[path = "tests/relationships_tests.rs"]
mod tests;
