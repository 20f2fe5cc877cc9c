use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strand_syntax::{Lexer, Parser};

fn bench_keywords(c: &mut Criterion) {
    let source = "function let if else switch case default for while do break continue return wait defer";

    c.bench_function("lex_keywords", |b| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(source));
            lexer.tokenize().unwrap()
        });
    });
}

fn generate_source(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            r#"
            function poll{i}(url, limit) {{
                let attempts = 0;
                while (attempts < limit) {{
                    wait {{
                        fetch(url, defer(status, body));
                        setTimeout(defer(), 100);
                    }}
                    if (status == 200) {{
                        break;
                    }}
                    attempts = attempts + 1;
                }}
                report(body);
            }}
        "#
        ));
    }
    source
}

fn bench_large_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_file");
    let source = generate_source(100);

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_with_input(
        BenchmarkId::new("lex_100_functions", format!("{} bytes", source.len())),
        &source,
        |b, source| {
            b.iter(|| {
                let lexer = Lexer::new(black_box(source));
                lexer.tokenize().unwrap()
            });
        },
    );
    group.bench_with_input(
        BenchmarkId::new("parse_100_functions", format!("{} bytes", source.len())),
        &source,
        |b, source| {
            b.iter(|| {
                let parser = Parser::new(black_box(source)).unwrap();
                parser.parse().unwrap()
            });
        },
    );

    group.finish();
}

criterion_group!(benches, bench_keywords, bench_large_file);

criterion_main!(benches);
