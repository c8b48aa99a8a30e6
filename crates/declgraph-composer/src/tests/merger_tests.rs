use super::*;
use declgraph_common::DiagnosticKind;
use declgraph_model::{FileParseResult, ParsedDeclaration};
use serde_json::json;

struct Merged {
    arena: DeclArena,
    index: DeclIndex,
    folded: FxHashSet<DeclId>,
    diagnostics: DiagnosticBag,
}

fn merge(files: Vec<FileParseResult>) -> Merged {
    let mut diagnostics = DiagnosticBag::new();
    let mut arena = DeclArena::from_parse_results(&files, &mut diagnostics);
    let mut index = DeclIndex::build(&arena, &mut diagnostics);
    let options = ComposerOptions::default();
    let aliases = AliasTable::build(&arena, options.max_alias_depth, &mut diagnostics);
    let folded =
        ExtensionMerger::new(&mut arena, &mut index, &aliases, &options, &mut diagnostics).run();
    Merged {
        arena,
        index,
        folded,
        diagnostics,
    }
}

fn variable_types(merged: &Merged, id: DeclId) -> Vec<(String, String)> {
    merged.arena[id]
        .variables
        .iter()
        .map(|v| (v.name.clone(), v.type_node.raw.clone()))
        .collect()
}

#[test]
fn test_extension_before_declaration_is_merged() {
    let merged = merge(vec![
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::extension("Foo").variable("x", "Int"))
            .declaration(ParsedDeclaration::structure("Foo")),
    ]);

    let foo = merged.index.get("App.Foo").unwrap();
    assert_eq!(foo, DeclId(1));
    assert_eq!(variable_types(&merged, foo), vec![("x".to_string(), "Int".to_string())]);
    assert!(merged.folded.contains(&DeclId(0)));
    assert!(merged.diagnostics.is_empty());
}

#[test]
fn test_members_from_many_extensions_collapse_identical_duplicates() {
    let merged = merge(vec![
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::structure("Foo"))
            .declaration(ParsedDeclaration::extension("Foo").variable("a", "Int").variable("b", "Int"))
            .declaration(ParsedDeclaration::extension("Foo").variable("a", "Int").variable("c", "Int"))
            .declaration(ParsedDeclaration::extension("Foo").variable("a", "String")),
    ]);

    let foo = merged.index.get("App.Foo").unwrap();
    let names: Vec<_> = variable_types(&merged, foo)
        .into_iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect();
    assert_eq!(names, vec!["a: Int", "b: Int", "c: Int", "a: String"]);
    assert_eq!(merged.folded.len(), 3);
}

#[test]
fn test_inheritance_and_annotations_are_unioned() {
    let merged = merge(vec![
        FileParseResult::new("App")
            .declaration(
                ParsedDeclaration::structure("Foo")
                    .inherits(["Codable"])
                    .annotation("k", json!(1)),
            )
            .declaration(
                ParsedDeclaration::extension("Foo")
                    .inherits(["Equatable", "Codable"])
                    .annotation("k", json!(2))
                    .annotation("j", json!(3)),
            ),
    ]);

    let foo = &merged.arena[merged.index.get("App.Foo").unwrap()];
    assert_eq!(foo.inherited_names, vec!["Codable", "Equatable"]);
    assert_eq!(foo.based_on.keys().collect::<Vec<_>>(), vec!["Codable", "Equatable"]);
    assert_eq!(foo.annotations["k"], json!(1));
    assert_eq!(foo.annotations["j"], json!(3));
}

#[test]
fn test_unmatched_extensions_become_one_placeholder() {
    let merged = merge(vec![
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::extension("Missing").variable("x", "Int"))
            .declaration(
                ParsedDeclaration::extension("Missing")
                    .inherits(["P"])
                    .variable("y", "Int"),
            ),
    ]);

    let placeholder = merged.index.get("Missing").unwrap();
    assert_eq!(placeholder, DeclId(0));
    let decl = &merged.arena[placeholder];
    assert!(decl.is_unknown_extension);
    assert_eq!(decl.module, None);
    assert_eq!(decl.variables.len(), 2);
    assert_eq!(decl.inherited_names, vec!["P"]);
    assert!(merged.folded.contains(&DeclId(1)));
    assert_eq!(merged.diagnostics.count_of(DiagnosticKind::UnmatchedExtension), 2);
}

#[test]
fn test_dotted_extension_is_rerooted_onto_nested_declaration() {
    let merged = merge(vec![
        FileParseResult::new("App")
            .declaration(ParsedDeclaration::structure("Outer").nest(ParsedDeclaration::structure("Inner")))
            .declaration(ParsedDeclaration::extension("Outer.Inner").variable("x", "Int")),
    ]);

    let inner = merged.index.get("App.Outer.Inner").unwrap();
    assert_eq!(variable_types(&merged, inner).len(), 1);
    assert_eq!(merged.arena[DeclId(2)].qualified_name, "Outer.Inner");
    assert!(merged.folded.contains(&DeclId(2)));
    assert!(merged.diagnostics.is_empty());
}

#[test]
fn test_cross_module_extension_moves_nested_declarations() {
    let merged = merge(vec![
        FileParseResult::new("App")
            .with_path("Foo.swift")
            .declaration(ParsedDeclaration::structure("Foo")),
        FileParseResult::new("Ext")
            .with_path("Foo+Helper.swift")
            .import("App")
            .declaration(
                ParsedDeclaration::extension("Foo")
                    .nest(ParsedDeclaration::structure("Helper"))
                    .alias("Id", "Int"),
            ),
    ]);

    let foo = merged.index.get("App.Foo").unwrap();
    let helper = merged.index.get("App.Foo.Helper").unwrap();
    assert_eq!(merged.arena[helper].parent, Some(foo));
    assert_eq!(merged.arena[helper].module.as_deref(), Some("App"));
    assert_eq!(merged.arena[helper].file.as_deref(), Some("Foo.swift"));
    assert!(merged.arena[foo].nested.contains(&helper));
    assert_eq!(merged.index.get("Ext.Foo.Helper"), None);

    let alias = merged.arena[foo].aliases[0];
    assert_eq!(merged.arena.alias(alias).qualified_name, "Foo.Id");
    assert_eq!(merged.arena.alias(alias).owner, Some(foo));
}

#[test]
fn test_duplicate_declarations_are_folded_into_the_first() {
    let merged = merge(vec![
        FileParseResult::new("App")
            .with_path("a.swift")
            .declaration(ParsedDeclaration::structure("Foo").variable("a", "Int")),
        FileParseResult::new("App")
            .with_path("b.swift")
            .declaration(ParsedDeclaration::structure("Foo").variable("b", "Int")),
    ]);

    assert_eq!(merged.index.get("App.Foo"), Some(DeclId(0)));
    assert_eq!(variable_types(&merged, DeclId(0)).len(), 2);
    assert!(merged.folded.contains(&DeclId(1)));
    assert_eq!(merged.diagnostics.count_of(DiagnosticKind::DuplicateDeclaration), 1);
}
