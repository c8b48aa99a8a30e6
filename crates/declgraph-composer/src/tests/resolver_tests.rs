use super::*;
use declgraph_common::DiagnosticKind;
use declgraph_common::limits::MAX_ALIAS_CHAIN_DEPTH;
use declgraph_model::{FileParseResult, ParsedDeclaration};

struct Fixture {
    arena: DeclArena,
    index: DeclIndex,
    aliases: AliasTable,
}

impl Fixture {
    fn new(files: Vec<FileParseResult>) -> Self {
        let mut bag = DiagnosticBag::new();
        let arena = DeclArena::from_parse_results(&files, &mut bag);
        let index = DeclIndex::build(&arena, &mut bag);
        let aliases = AliasTable::build(&arena, MAX_ALIAS_CHAIN_DEPTH, &mut bag);
        Self {
            arena,
            index,
            aliases,
        }
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.arena, &self.index, &self.aliases)
    }

    fn id(&self, module: &str, qualified_name: &str) -> DeclId {
        self.index.in_module(module, qualified_name).unwrap()
    }
}

const NO_IMPORTS: &[String] = &[];

fn app() -> Fixture {
    Fixture::new(vec![
        FileParseResult::new("App")
            .declaration(
                ParsedDeclaration::structure("Outer")
                    .nest(ParsedDeclaration::structure("Inner"))
                    .nest(ParsedDeclaration::structure("Sibling")),
            )
            .declaration(ParsedDeclaration::structure("Foo"))
            .declaration(ParsedDeclaration::structure("Box"))
            .alias("ID", "Int")
            .alias("A", "B")
            .alias("B", "C")
            .alias("C", "Foo")
            .alias("Loop", "[Loop]"),
    ])
}

#[test]
fn test_global_name_resolves_directly() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let site = Site::file(None, NO_IMPORTS);
    assert_eq!(fx.resolver().resolve("App.Foo", site, &mut cx), Some(fx.id("App", "Foo")));
}

#[test]
fn test_own_module_is_visible() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let site = Site::file(Some("App"), NO_IMPORTS);
    assert_eq!(fx.resolver().resolve("Foo", site, &mut cx), Some(fx.id("App", "Foo")));
    assert!(cx.diagnostics.is_empty());
}

#[test]
fn test_enclosing_scope_and_self() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let inner = fx.id("App", "Outer.Inner");
    let site = Site::of(&fx.arena, inner);

    assert_eq!(
        fx.resolver().resolve("Sibling", site, &mut cx),
        Some(fx.id("App", "Outer.Sibling"))
    );
    assert_eq!(fx.resolver().resolve("Self", site, &mut cx), Some(inner));
    assert_eq!(fx.resolver().resolve("Self", Site::file(Some("App"), NO_IMPORTS), &mut cx), None);
}

#[test]
fn test_alias_chain_resolves_to_terminal_target() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let resolution = fx
        .resolver()
        .resolve_name("A", Site::file(Some("App"), NO_IMPORTS), &mut cx)
        .unwrap();

    assert_eq!(resolution.name, "Foo");
    assert_eq!(resolution.decl, Some(fx.id("App", "Foo")));
    assert!(resolution.alias.is_some());
}

#[test]
fn test_alias_to_unknown_type_substitutes_text() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let resolution = fx
        .resolver()
        .resolve_name("ID", Site::file(Some("App"), NO_IMPORTS), &mut cx)
        .unwrap();
    assert_eq!(resolution.name, "Int");
    assert_eq!(resolution.decl, None);
}

#[test]
fn test_composite_literals_are_rebuilt() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let site = Site::file(Some("App"), NO_IMPORTS);

    let array = fx.resolver().resolve_name("[ID]", site, &mut cx).unwrap();
    assert_eq!(array.name, "[Int]");
    assert_eq!(array.decl, None);

    let generic = fx.resolver().resolve_name("Box<ID>", site, &mut cx).unwrap();
    assert_eq!(generic.name, "Box<Int>");
    assert_eq!(generic.decl, Some(fx.id("App", "Box")));

    let node = generic.node.expect("composite results carry their annotated node");
    assert_eq!(node.resolved, Some(fx.id("App", "Box")));
    assert_eq!(node.children()[0].effective_source(), "Int");
    assert!(fx.resolver().resolve_name("Foo", site, &mut cx).unwrap().node.is_none());
}

#[test]
fn test_self_referencing_alias_terminates() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let resolution = fx
        .resolver()
        .resolve_name("Loop", Site::file(Some("App"), NO_IMPORTS), &mut cx)
        .unwrap();
    assert_eq!(resolution.name, "[Loop]");
    assert_eq!(resolution.decl, None);
}

#[test]
fn test_ambiguous_reference_reports_candidates() {
    let fx = Fixture::new(vec![
        FileParseResult::new("A").declaration(ParsedDeclaration::structure("Foo")),
        FileParseResult::new("B").declaration(ParsedDeclaration::structure("Foo")),
    ]);
    let mut cx = ResolveCx::default();

    let result = fx
        .resolver()
        .resolve("Foo", Site::file(Some("C"), NO_IMPORTS), &mut cx);
    assert_eq!(result, None);

    let diagnostics = cx.into_diagnostics().into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::AmbiguousReference);
    assert_eq!(diagnostics[0].subject, "Foo");
    assert_eq!(diagnostics[0].candidates, vec!["A.Foo", "B.Foo"]);
    assert!(diagnostics[0].message.starts_with("Ambiguous type Foo, found A.Foo, B.Foo."));
}

#[test]
fn test_imports_and_own_module_disambiguate() {
    let fx = Fixture::new(vec![
        FileParseResult::new("A").declaration(ParsedDeclaration::structure("Foo")),
        FileParseResult::new("B").declaration(ParsedDeclaration::structure("Foo")),
    ]);
    let mut cx = ResolveCx::default();
    let imports = vec!["B".to_string()];

    assert_eq!(
        fx.resolver().resolve("Foo", Site::file(Some("C"), &imports), &mut cx),
        Some(fx.id("B", "Foo"))
    );
    assert_eq!(
        fx.resolver().resolve("Foo", Site::file(Some("A"), NO_IMPORTS), &mut cx),
        Some(fx.id("A", "Foo"))
    );
    assert!(cx.diagnostics.is_empty());
}

#[test]
fn test_module_qualified_nested_path() {
    let fx = app();
    let mut cx = ResolveCx::default();
    assert_eq!(
        fx.resolver().resolve("App.Outer.Inner", Site::file(Some("Lib"), NO_IMPORTS), &mut cx),
        Some(fx.id("App", "Outer.Inner"))
    );
}

#[test]
fn test_depth_limit_reports_and_degrades() {
    let fx = app();
    let mut cx = ResolveCx::new(1);
    let resolution = fx
        .resolver()
        .resolve_name("B", Site::file(Some("App"), NO_IMPORTS), &mut cx)
        .unwrap();

    assert_eq!(resolution.name, "Foo");
    assert_eq!(resolution.decl, None);
    assert_eq!(cx.diagnostics.count_of(DiagnosticKind::ResolutionLimit), 1);
}

#[test]
fn test_generic_arguments_are_stripped_for_nominal_lookup() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let site = Site::file(Some("App"), NO_IMPORTS);
    assert_eq!(
        fx.resolver().resolve_nominal("Box<Int>", site, &mut cx),
        Some(fx.id("App", "Box"))
    );
}

#[test]
fn test_annotate_node_fills_resolved_and_actual() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let mut node = parse_type("[ID: Foo]?");
    fx.resolver()
        .annotate_node(&mut node, Site::file(Some("App"), NO_IMPORTS), &mut cx);

    let children = node.children();
    assert_eq!(children[0].resolved, None);
    assert_eq!(children[0].actual.as_deref().map(|a| a.raw.as_str()), Some("Int"));
    assert_eq!(children[1].resolved, Some(fx.id("App", "Foo")));
    assert!(children[1].actual.is_none());
    assert_eq!(node.effective_source(), "[Int: Foo]?");
    assert_eq!(node.to_source(), "[ID: Foo]?");
}

#[test]
fn test_annotate_node_reports_malformed_input() {
    let fx = app();
    let mut cx = ResolveCx::default();
    let mut node = parse_type("[Foo");
    fx.resolver()
        .annotate_node(&mut node, Site::file(Some("App"), NO_IMPORTS), &mut cx);

    assert_eq!(node.resolved, None);
    assert_eq!(cx.diagnostics.count_of(DiagnosticKind::MalformedTypeExpression), 1);
}
