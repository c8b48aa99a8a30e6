//! Composition phase timing.
//!
//! Measures merge, merge + annotate, and the full pipeline separately on a
//! synthetic project of increasing size, then compares serial and parallel
//! annotation at the largest size.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use declgraph::composer::{Composer, ComposerOptions};
use declgraph::model::{DeclKind, FileParseResult, ParsedDeclaration, ParsedMethod};
use std::hint::black_box;
use std::time::Duration;

/// `modules` modules with `per_module` types each. Every type has an
/// extension in a sibling file, inherits from a shared root and references
/// types from its neighbour module through aliases and collections.
fn generate_project(modules: usize, per_module: usize) -> Vec<FileParseResult> {
    let mut files = Vec::with_capacity(modules * 2 + 1);
    files.push(
        FileParseResult::new("Core")
            .with_path("Core/Root.swift")
            .alias("Identifier", "String")
            .declaration(ParsedDeclaration::protocol("Entity").associated_type("ID", Some("Hashable")))
            .declaration(ParsedDeclaration::class("Root").inherits(["Entity"]))
            .declaration(
                ParsedDeclaration::new("Storable", DeclKind::ProtocolComposition)
                    .composed_of(["Entity", "Codable"]),
            ),
    );

    for m in 0..modules {
        let module = format!("M{m}");
        let neighbour = format!("M{}", (m + 1) % modules);
        let mut types = FileParseResult::new(module.clone())
            .with_path(format!("{module}/Types.swift"))
            .import("Core")
            .import(neighbour.clone())
            .alias(format!("{module}Key"), "Identifier");
        let mut extensions = FileParseResult::new(module.clone())
            .with_path(format!("{module}/Types+Extensions.swift"))
            .import("Core");

        for n in 0..per_module {
            let parent = if n == 0 { "Root".to_string() } else { format!("{module}T{}", n - 1) };
            types = types.declaration(
                ParsedDeclaration::class(format!("{module}T{n}"))
                    .inherits([parent, "Storable".to_string()])
                    .variable("id", format!("{module}Key"))
                    .variable("next", format!("[{neighbour}T{n}]?"))
                    .variable("index", format!("[Identifier: {module}T{n}.Node]"))
                    .method(ParsedMethod::new("load(_:)").parameter("id", "Identifier").throwing())
                    .nest(ParsedDeclaration::structure("Node").variable("value", "Int")),
            );
            extensions = extensions.declaration(
                ParsedDeclaration::extension(format!("{module}T{n}"))
                    .inherits(["Equatable"])
                    .variable("cached", "Identifier?")
                    .method(ParsedMethod::new("peer()").returns(format!("{neighbour}T{n}"))),
            );
        }
        files.push(types);
        files.push(extensions);
    }
    files
}

fn bench_compose_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_phases");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(30);

    for (modules, per_module) in [(4, 25), (8, 50), (16, 100)] {
        let files = generate_project(modules, per_module);
        let label = format!("{modules}modules_{}types", modules * per_module);
        let composer = Composer::default();

        group.bench_with_input(BenchmarkId::new("1_merge", &label), &files, |b, files| {
            b.iter(|| black_box(composer.merge(files)));
        });

        group.bench_with_input(
            BenchmarkId::new("2_merge_annotate", &label),
            &files,
            |b, files| {
                b.iter(|| black_box(composer.merge(files).annotate()));
            },
        );

        group.bench_with_input(BenchmarkId::new("3_compose", &label), &files, |b, files| {
            b.iter(|| black_box(composer.compose(files)));
        });
    }

    group.finish();
}

fn bench_serial_vs_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotation_threads");
    group.sample_size(20);

    let files = generate_project(16, 100);
    for serial in [true, false] {
        let composer = Composer::new(ComposerOptions {
            serial,
            ..ComposerOptions::default()
        });
        let name = if serial { "serial" } else { "parallel" };
        group.bench_function(name, |b| {
            b.iter(|| black_box(composer.compose(&files)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compose_phases, bench_serial_vs_parallel);
criterion_main!(benches);
