use super::*;
use crate::alias_table::AliasTable;
use crate::index::DeclIndex;
use declgraph_common::DiagnosticKind;
use declgraph_common::limits::{MAX_ALIAS_CHAIN_DEPTH, MAX_RESOLUTION_DEPTH};
use declgraph_model::{DeclArena, FileParseResult, ParsedDeclaration};

struct Fixture {
    arena: DeclArena,
    index: DeclIndex,
    aliases: AliasTable,
}

impl Fixture {
    fn new(file: FileParseResult) -> Self {
        let mut bag = DiagnosticBag::new();
        let arena = DeclArena::from_parse_results(&[file], &mut bag);
        let index = DeclIndex::build(&arena, &mut bag);
        let aliases = AliasTable::build(&arena, MAX_ALIAS_CHAIN_DEPTH, &mut bag);
        Self {
            arena,
            index,
            aliases,
        }
    }

    fn id(&self, name: &str) -> DeclId {
        self.index.in_module("App", name).unwrap()
    }

    fn propagate(&self) -> Propagation {
        let ids: Vec<DeclId> = self.arena.ids().collect();
        let resolver = Resolver::new(&self.arena, &self.index, &self.aliases);
        RelationshipPropagator::new(resolver, MAX_RESOLUTION_DEPTH).run(&ids)
    }
}

fn names(map: &BTreeMap<String, DeclId>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

#[test]
fn test_diamond_propagates_shared_ancestor_once() {
    let fx = Fixture::new(
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::structure("D1").inherits(["A"]))
            .declaration(ParsedDeclaration::structure("D2").inherits(["A"]))
            .declaration(ParsedDeclaration::protocol("A").inherits(["B"]))
            .declaration(ParsedDeclaration::protocol("B")),
    );
    let propagation = fx.propagate();

    for name in ["D1", "D2"] {
        let relationships = &propagation.relationships[&fx.id(name)];
        assert_eq!(names(&relationships.implements), vec!["App.A", "App.B"]);
        assert_eq!(names(&relationships.based_types), vec!["App.A", "App.B"]);
        assert!(relationships.inherits_from.is_empty());
    }

    let a = fx.id("A");
    assert_eq!(propagation.visit_order.iter().filter(|&&id| id == a).count(), 1);
    assert_eq!(
        propagation.visit_order,
        vec![fx.id("B"), a, fx.id("D1"), fx.id("D2")]
    );
    assert!(propagation.diagnostics.is_empty());
}

#[test]
fn test_reference_type_chain_and_supertype() {
    let fx = Fixture::new(
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::class("Base"))
            .declaration(ParsedDeclaration::protocol("Named"))
            .declaration(ParsedDeclaration::class("Mid").inherits(["Base", "Named"]))
            .declaration(ParsedDeclaration::class("Leaf").inherits(["Mid"])),
    );
    let propagation = fx.propagate();

    let leaf = &propagation.relationships[&fx.id("Leaf")];
    assert_eq!(names(&leaf.inherits_from), vec!["App.Base", "App.Mid"]);
    assert_eq!(names(&leaf.implements), vec!["App.Named"]);
    assert_eq!(leaf.supertype, Some(fx.id("Mid")));
    assert_eq!(leaf.based_on.keys().collect::<Vec<_>>(), vec!["Base", "Mid", "Named"]);

    let mid = &propagation.relationships[&fx.id("Mid")];
    assert_eq!(mid.supertype, Some(fx.id("Base")));
}

#[test]
fn test_unresolved_names_stay_in_based_on_only() {
    let fx = Fixture::new(
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::enumeration("E").inherits(["Comparable"]).case("a")),
    );
    let propagation = fx.propagate();

    let e = &propagation.relationships[&fx.id("E")];
    assert_eq!(e.based_on.len(), 1);
    assert_eq!(e.based_on["Comparable"], "Comparable");
    assert!(e.based_types.is_empty());
    assert!(e.implements.is_empty());
    assert_eq!(e.supertype, None);
}

#[test]
fn test_inheritance_cycle_terminates_with_partial_data() {
    let fx = Fixture::new(
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::class("A").inherits(["B"]))
            .declaration(ParsedDeclaration::class("B").inherits(["A"])),
    );
    let propagation = fx.propagate();

    assert_eq!(propagation.diagnostics.count_of(DiagnosticKind::CyclicInheritance), 1);
    let diagnostic = propagation.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.subject, "A");
    assert_eq!(diagnostic.candidates, vec!["B"]);

    let a = &propagation.relationships[&fx.id("A")];
    assert_eq!(names(&a.based_types), vec!["App.B"]);
    let b = &propagation.relationships[&fx.id("B")];
    assert!(b.based_types.is_empty());
}

#[test]
fn test_interfaces_inherit_associated_types() {
    let fx = Fixture::new(
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::protocol("Base").associated_type("Element", None))
            .declaration(
                ParsedDeclaration::protocol("Keyed")
                    .inherits(["Base"])
                    .associated_type("Key", None),
            )
            .declaration(ParsedDeclaration::protocol("Top").inherits(["Keyed"]))
            .declaration(ParsedDeclaration::structure("Concrete").inherits(["Keyed"])),
    );
    let propagation = fx.propagate();
    let inherited = |name: &str| -> Vec<String> {
        propagation.relationships[&fx.id(name)]
            .inherited_associated_types
            .iter()
            .map(|a| a.name.clone())
            .collect()
    };

    assert_eq!(inherited("Keyed"), vec!["Element"]);
    assert_eq!(inherited("Top"), vec!["Key", "Element"]);
    assert!(inherited("Concrete").is_empty());
}

#[test]
fn test_generic_arguments_are_ignored_in_inheritance() {
    let fx = Fixture::new(
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::class("Base"))
            .declaration(ParsedDeclaration::class("Sub").inherits(["Base<Int>"])),
    );
    let propagation = fx.propagate();

    let sub = &propagation.relationships[&fx.id("Sub")];
    assert_eq!(names(&sub.inherits_from), vec!["App.Base"]);
    assert_eq!(sub.supertype, Some(fx.id("Base")));
    assert_eq!(sub.based_on["Base<Int>"], "Base<Int>");
}

#[test]
fn test_apply_writes_maps_into_declaration() {
    let fx = Fixture::new(
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::class("Base"))
            .declaration(ParsedDeclaration::class("Sub").inherits(["Base"])),
    );
    let propagation = fx.propagate();
    let sub = fx.id("Sub");
    let mut decl = fx.arena[sub].clone();
    propagation.relationships[&sub].clone().apply(&mut decl);

    assert_eq!(decl.supertype, Some(fx.id("Base")));
    assert_eq!(names(&decl.inherits_from), vec!["App.Base"]);
}
