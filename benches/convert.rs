use criterion::{Criterion, criterion_group, criterion_main};
use tm2sublime::{RawGrammar, convert};

fn convert_benchmark(c: &mut Criterion) {
    let raw_grammar = RawGrammar::load_from_file("src/fixtures/mini.tmLanguage.json")
        .expect("Failed to load grammar");

    c.bench_function("convert mini grammar", |b| {
        b.iter(|| {
            let conversion = convert(&raw_grammar);
            std::hint::black_box(conversion);
        })
    });

    let syntax = convert(&raw_grammar).syntax;
    c.bench_function("render mini syntax as yaml", |b| {
        b.iter(|| {
            let out = syntax.to_yaml().expect("Failed to render syntax");
            std::hint::black_box(out);
        })
    });
}

criterion_group!(benches, convert_benchmark);
criterion_main!(benches);
