use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    let input1 = "select #name from people where #age > 26;";
    let input2 = "
        select count(#name), max(#age) from people
        where #age >= 21 and #name != 'nobody'
        group by #dept
        having count(#name) > 1
        order by count(#name) desc
        limit 100 offset 10
        dest @names @ages; -- trailing note
        ";

    group.bench_function("simple select", |b| {
        b.iter(|| {
            let commands = black_box(cql_lexer::tokenize(input1).unwrap());
            assert_eq!(commands.len(), 1);
        });
    });

    group.bench_function("full clause set", |b| {
        b.iter(|| {
            let commands = black_box(cql_lexer::tokenize(input2).unwrap());
            assert_eq!(commands.len(), 1);
        });
    });
}

criterion_group!(benches, tokenize);
criterion_main!(benches);
