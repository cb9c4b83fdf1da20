//! Parser benchmarks.
//!
//! Measures full parses of growing scripts and incremental reparses of a
//! single-character edit.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gds_parse::{parse, reparse, Parser, ParserConfig, TextEdit};

const METHOD: &str = "\
func update(delta: float) -> void:
\tvar speed := 4.0 * delta
\tif position.x > limit and not frozen:
\t\tposition.x -= speed
\telif Input.is_action_pressed(\"jump\"):
\t\tvelocity = Vector2(0, -jump_force)
\tfor child in get_children():
\t\tmatch child.state:
\t\t\tState.IDLE, State.RUN:
\t\t\t\tchild.tick(delta)
\t\t\t_:
\t\t\t\tpass
";

/// A script with `n` variables and `n` methods.
fn generate_script(n: usize) -> String {
    let mut out = String::from("extends Node2D\n\n");
    for i in 0..n {
        out.push_str(&format!("@export var field{i}: int = {i}\n"));
    }
    for i in 0..n {
        out.push('\n');
        out.push_str(&METHOD.replacen("update", &format!("update{i}"), 1));
    }
    out
}

/// `a + (a + (... ))` nested `depth` levels.
fn generate_nested_parens(depth: usize) -> String {
    let mut expr = "a".to_string();
    for _ in 0..depth {
        expr = format!("a + ({expr})");
    }
    format!("var x = {expr}\n")
}

fn bench_parse_method(c: &mut Criterion) {
    c.bench_function("parser/method", |b| b.iter(|| black_box(parse(black_box(METHOD)))));
}

fn bench_parse_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser/scaling");

    for size in [10, 50, 100, 500] {
        let source = generate_script(size);
        group.bench_with_input(BenchmarkId::new("members", size), &source, |b, src| {
            b.iter(|| black_box(parse(src)));
        });
    }

    group.finish();
}

fn bench_parse_nesting(c: &mut Criterion) {
    let parser = Parser::new(ParserConfig::default().with_max_reading_stack(None));
    let mut group = c.benchmark_group("parser/nesting");

    for depth in [5, 10, 20, 50] {
        let source = generate_nested_parens(depth);
        group.bench_with_input(BenchmarkId::new("parens", depth), &source, |b, src| {
            b.iter(|| black_box(parser.parse_file(src)));
        });
    }

    group.finish();
}

fn bench_reparse(c: &mut Criterion) {
    let source = generate_script(100);
    let Ok(tree) = parse(&source) else {
        return;
    };
    let Some(at) = source.find("= 50\n").and_then(|i| u32::try_from(i + 2).ok()) else {
        return;
    };
    let edits = [TextEdit::replace(at, 2, "51")];
    let new_text = source.replacen("= 50\n", "= 51\n", 1);
    let mut group = c.benchmark_group("parser/edit");

    group.bench_function("incremental", |b| {
        b.iter(|| black_box(reparse(&tree, &new_text, &edits)));
    });

    group.bench_function("full", |b| {
        b.iter(|| black_box(parse(&new_text)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_method,
    bench_parse_scaling,
    bench_parse_nesting,
    bench_reparse,
);
criterion_main!(benches);
