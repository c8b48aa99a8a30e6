use super::*;
use declgraph_common::DiagnosticKind;
use declgraph_common::limits::MAX_ALIAS_CHAIN_DEPTH;
use declgraph_model::{FileParseResult, ParsedDeclaration};

fn build(files: Vec<FileParseResult>) -> (DeclArena, AliasTable, DiagnosticBag) {
    let mut bag = DiagnosticBag::new();
    let arena = DeclArena::from_parse_results(&files, &mut bag);
    let table = AliasTable::build(&arena, MAX_ALIAS_CHAIN_DEPTH, &mut bag);
    (arena, table, bag)
}

fn terminal_name<'a>(arena: &'a DeclArena, table: &AliasTable, key: &str) -> &'a str {
    let id = table.terminal(key).unwrap();
    &arena.alias(id).qualified_name
}

#[test]
fn test_chain_collapses_to_terminal_alias() {
    let (arena, table, bag) = build(vec![
        FileParseResult::new("App")
            .alias("A", "B")
            .alias("B", "C")
            .alias("C", "Int"),
    ]);

    assert_eq!(terminal_name(&arena, &table, "A"), "C");
    assert_eq!(terminal_name(&arena, &table, "B"), "C");
    assert_eq!(terminal_name(&arena, &table, "C"), "C");
    assert_eq!(arena.alias(table.declared("A").unwrap()).alias_name, "A");
    assert_eq!(table.len(), 3);
    assert!(bag.is_empty());
}

#[test]
fn test_optional_target_follows_bare_name() {
    let (arena, table, _) = build(vec![FileParseResult::new("App").alias("A", "B?").alias("B", "Int")]);
    assert_eq!(terminal_name(&arena, &table, "A"), "B");
}

#[test]
fn test_nested_alias_prefers_owner_scope() {
    let (arena, table, bag) = build(vec![
        FileParseResult::new("App")
            .alias("Key", "Int")
            .declaration(
                ParsedDeclaration::structure("Outer")
                    .alias("Key", "String")
                    .alias("Id", "Key"),
            ),
    ]);

    assert!(table.declared("Outer.Key").is_some());
    assert!(table.declared("Key").is_some());
    assert_eq!(terminal_name(&arena, &table, "Outer.Id"), "Outer.Key");
    assert!(bag.is_empty());
}

#[test]
fn test_duplicate_alias_keeps_first() {
    let (arena, table, bag) = build(vec![
        FileParseResult::new("App").with_path("a.swift").alias("X", "Int"),
        FileParseResult::new("App").with_path("b.swift").alias("X", "String"),
    ]);

    let first = table.declared("X").unwrap();
    assert_eq!(arena.alias(first).target.raw, "Int");
    assert_eq!(bag.count_of(DiagnosticKind::DuplicateAlias), 1);
}

#[test]
fn test_cycle_stops_and_reports() {
    let (arena, table, bag) = build(vec![FileParseResult::new("App").alias("A", "B").alias("B", "A")]);

    assert_eq!(terminal_name(&arena, &table, "A"), "B");
    assert_eq!(terminal_name(&arena, &table, "B"), "A");
    assert_eq!(bag.count_of(DiagnosticKind::CyclicAlias), 2);
    let first = bag.iter().next().unwrap();
    assert_eq!(first.subject, "A");
    assert_eq!(first.candidates, vec!["A", "B", "A"]);
}

#[test]
fn test_hop_limit_bounds_long_chains() {
    let mut file = FileParseResult::new("App");
    for i in 0..10 {
        file = file.alias(format!("T{i}"), format!("T{}", i + 1));
    }
    let mut bag = DiagnosticBag::new();
    let arena = DeclArena::from_parse_results(&[file], &mut bag);
    let table = AliasTable::build(&arena, 3, &mut bag);

    assert_eq!(terminal_name(&arena, &table, "T0"), "T3");
    assert_eq!(terminal_name(&arena, &table, "T8"), "T9");
    assert!(bag.count_of(DiagnosticKind::CyclicAlias) > 0);
}
