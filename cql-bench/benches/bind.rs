use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind");

    let query = "select #name, #age * 2 from people where #age > 26 order by #age desc;";
    group.bench_function("select", |b| {
        let commands = cql_lexer::tokenize(query).unwrap();
        b.iter(|| {
            let stmt = black_box(cql_parser::parse_statement(&commands[0]).unwrap());
            stmt
        });
    });

    let expr = "2 + 3 * exp(1) < sqrt(100) and not (#age >= 21 xor #name = 'x');";
    group.bench_function("expression", |b| {
        let commands = cql_lexer::tokenize(expr).unwrap();
        b.iter(|| {
            let tree = black_box(cql_parser::parse_expr(&commands[0].tokens).unwrap());
            tree
        });
    });
}

criterion_group!(benches, bind);
criterion_main!(benches);
