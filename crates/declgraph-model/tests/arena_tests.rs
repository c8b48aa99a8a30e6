//! Arena construction from JSON parse results and rebuilding.

use declgraph_common::{DiagnosticBag, DiagnosticKind};
use declgraph_model::{
    DeclArena, DeclKind, FileParseResult, MethodFlags, ParsedDeclaration, ParsedMethod,
    rebuild_parse_results,
};

fn build(files: &[FileParseResult]) -> DeclArena {
    let mut bag = DiagnosticBag::new();
    let arena = DeclArena::from_parse_results(files, &mut bag);
    assert!(bag.is_empty(), "unexpected diagnostics: {:?}", bag.into_vec());
    arena
}

const FILE_JSON: &str = r#"{
    "path": "Sources/App/Model.swift",
    "module": "App",
    "imports": ["Foundation"],
    "declarations": [
        {
            "name": "Model",
            "kind": "class",
            "inheritedNames": ["Base", "Codable"],
            "variables": [{ "name": "items", "typeName": "[String: [Int]]" }],
            "methods": [{ "name": "init(id:)", "isInitializer": true, "isFailableInitializer": true,
                          "parameters": [{ "name": "id", "typeName": "Int" }] }],
            "nested": [{ "name": "Kind", "kind": "enum", "enumCases": [{ "name": "a" }] }],
            "aliases": [{ "name": "ID", "target": "Int" }]
        },
        { "name": "Worker", "kind": "actor" }
    ],
    "aliases": [{ "name": "Models", "target": "[Model]" }],
    "functions": [{ "name": "run()", "isAsync": true }]
}"#;

#[test]
fn builds_from_json_with_defaults() {
    let file: FileParseResult = serde_json::from_str(FILE_JSON).unwrap();
    let arena = build(&[file]);

    assert_eq!(arena.len(), 3);
    let model = &arena.decls()[0];
    assert_eq!(model.kind, DeclKind::Class);
    assert_eq!(model.imports, vec!["Foundation"]);
    assert_eq!(model.based_on.len(), 2);
    assert!(model.methods[0].is_failable_initializer());
    assert!(model.methods[0].flags.contains(MethodFlags::INITIALIZER));
    assert_eq!(arena.decls()[1].qualified_name, "Model.Kind");
    assert_eq!(arena.decls()[2].kind, DeclKind::Class);
    assert_eq!(arena.aliases().len(), 2);
    assert_eq!(arena.functions()[0].name(), "run()");
    assert!(arena.functions()[0].signature.flags.contains(MethodFlags::ASYNC));
}

#[test]
fn missing_optional_fields_do_not_fail() {
    let file: FileParseResult = serde_json::from_str(r#"{ "declarations": [{ "name": "A", "kind": "struct" }] }"#).unwrap();
    let arena = build(&[file]);
    assert_eq!(arena.decls()[0].module, None);
    assert_eq!(arena.decls()[0].global_name(), "A");
}

#[test]
fn dotted_nested_names_are_skipped_and_reported() {
    let file = FileParseResult::new("App").with_path("Outer.swift").declaration(
        ParsedDeclaration::structure("Outer")
            .nest(ParsedDeclaration::structure("A.B"))
            .nest(ParsedDeclaration::extension("Inner.Deep")),
    );
    let mut bag = DiagnosticBag::new();
    let arena = DeclArena::from_parse_results(&[file], &mut bag);

    let names: Vec<_> = arena.decls().iter().map(|d| d.qualified_name.as_str()).collect();
    assert_eq!(names, vec!["Outer", "Outer.Inner.Deep"]);
    let diagnostics = bag.into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::InvalidRecord);
    assert_eq!(diagnostics[0].subject, "Outer.A.B");
    assert!(diagnostics[0].message.contains("dotted name"));
}

#[test]
fn rebuild_reproduces_the_same_arena() {
    let file: FileParseResult = serde_json::from_str(FILE_JSON).unwrap();
    let arena = build(&[file]);
    let rebuilt = rebuild_parse_results(arena.decls(), arena.aliases(), arena.functions());
    let again = build(&rebuilt);

    assert_eq!(arena.decls(), again.decls());
    assert_eq!(arena.aliases(), again.aliases());
    assert_eq!(arena.functions(), again.functions());
    assert!(rebuilt.iter().all(|file| file.imports.is_empty()));
}

#[test]
fn builder_produces_same_records_as_json() {
    let built = FileParseResult::new("App").declaration(
        ParsedDeclaration::structure("Point")
            .variable("x", "Double")
            .method(ParsedMethod::new("length()").returns("Double")),
    );
    let json = serde_json::to_string(&built).unwrap();
    let parsed: FileParseResult = serde_json::from_str(&json).unwrap();
    assert_eq!(built, parsed);
}
