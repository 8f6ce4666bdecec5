use criterion::{black_box, criterion_group, criterion_main, Criterion};
use expressive_parser::{parse, Options};

// A medium-size source exercising the extended syntax
const SOURCE: &str = r#"
// Collections
const users = Map#{
  alice: Map#{ age: 31, tags: Set#{'admin', 'ops'} },
  bob: Map#{ age: 27, tags: Set#{'dev'} },
}

function % scale(factor, value) {
  value * factor
}

const double = scale(2)

function summarize(user) {
  cond (user) {
    Map#{ age, tags } => `${age} years, ${tags.size} tags`;
    null => 'missing';
    _ => 'unknown'
  }
}

class Registry extends Base {
  constructor(entries) {
    super(entries)
    this.entries = entries
  }

  get size() {
    this.entries.length
  }

  *values() {
    for (const entry of this.entries) yield entry
  }

  async load(source) {
    const data = await fetch(source)
    data?.items?.map(x -> x.id) ?? []
  }
}

const first = list[0:1]
const rest = list[1:]
const total = numbers |> sum |> double

users.forEach() do (user, name) {
  if (user.get('age') > 30) log(name) else skip(name)
}

let i = 0
while (i < 10) {
  i++
  if (i % 2 == 0) continue
  switch (i) {
    case (3) log('three');
    default log(i)
  }
}

const result = try { JSON.parse(text) } catch (e) { null }
const method = console::log
"#;

fn bench_parse(c: &mut Criterion) {
    let options = Options::default();
    c.bench_function("parse_medium", |b| {
        b.iter(|| {
            let result = parse(black_box(SOURCE), &options).expect("bench source parses");
            black_box(result);
        });
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
