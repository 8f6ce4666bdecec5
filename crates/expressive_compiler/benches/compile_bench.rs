//! Benchmark harness for the expressive compiler.
//!
//! Uses criterion for reliable benchmarking.
//! Run with: cargo bench -p expressive_compiler

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use expressive_compiler::{compile, Options};
use expressive_transformer::transform;

/// Small source for micro-benchmarks.
const SMALL_SOURCE: &str = r#"
const x = 42
let greeting = 'hello'
function add(a, b) { a + b }
const result = 1 |> add(2)
"#;

/// Medium source touching every lowering.
const MEDIUM_SOURCE: &str = r#"
const config = Map#{ retries: 3, hosts: Set#{'a', 'b'} }

function % clamp(low, high, value) {
  if (value < low) low else if (value > high) high else value
}

const describe = shape -> cond (shape) {
  { kind: 'circle', radius } => Math.PI * radius ^ 2;
  { kind: 'rect', width, height } => width * height;
  [x, y] => x * y;
  List#[head] => head;
  other => 0
}

const label = switch (config.get('retries')) {
  case (0) 'never';
  case (1) { 'once'; continue }
  default 'often'
}

let attempts = 0
const final = while (attempts < 3) attempts++
const parsed = try { JSON.parse(input) } catch (e) { null }

const names = users?.list?.map(u -> u.name) ?? []
const head = names[0:2]
const tail = names[2:]
const print = console::log

items.forEach() do (item, index) {
  print(index, item |> describe |> clamp(0, 100))
}
"#;

/// Generate a large source from repeated lowered constructs.
fn generate_large_source(count: usize) -> String {
    let mut source = String::new();
    for i in 0..count {
        source.push_str(&format!(
            "function % f{i}(a, b) {{ if (a) b else a + {i} }}
const v{i} = cond (f{i}(1, 2)) {{ [x] => x; n => n }}
const s{i} = Set#{{{i}, {i} + 1}} |> Array.from
"
        ));
    }
    source
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let options = Options::default();

    group.bench_function("small", |b| {
        b.iter(|| black_box(compile(black_box(SMALL_SOURCE), &options).expect("bench source compiles")));
    });

    group.bench_function("medium", |b| {
        b.iter(|| black_box(compile(black_box(MEDIUM_SOURCE), &options).expect("bench source compiles")));
    });

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let parsed = expressive_parser::parse(MEDIUM_SOURCE, &Options::default()).expect("bench source parses");
    c.bench_function("transform_medium", |b| {
        b.iter(|| black_box(transform(black_box(&parsed.ast), parsed.root).expect("bench source lowers")));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");
    let options = Options::default();

    for size in [10, 100, 500] {
        let source = generate_large_source(size);
        group.bench_with_input(BenchmarkId::new("lowered_items", size), &source, |b, source| {
            b.iter(|| black_box(compile(black_box(source), &options).expect("bench source compiles")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_transform, bench_scaling);
criterion_main!(benches);
