//! Benchmarks for forward chaining and retraction cascades.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rekh::item::{Fact, Item, Rule};
use rekh::kb::KnowledgeBase;
use rekh::term::{Statement, Term};

/// `step0(?x) -> step1(?x) -> ... -> stepN(?x)` as N single-premise rules.
fn chain_rules(depth: usize) -> Vec<Item> {
    (0..depth)
        .map(|i| {
            Item::Rule(Rule::new(
                vec![Statement::new(
                    format!("step{i}"),
                    vec![Term::Variable("x".into())],
                )],
                Statement::new(format!("step{}", i + 1), vec![Term::Variable("x".into())]),
            ))
        })
        .collect()
}

fn seed_fact(name: &str) -> Item {
    Item::Fact(Fact::new(Statement::new(
        "step0",
        vec![Term::Constant(name.into())],
    )))
}

fn bench_closure(c: &mut Criterion) {
    let rules = chain_rules(64);
    c.bench_function("closure_depth_64", |bench| {
        bench.iter(|| {
            let mut kb = KnowledgeBase::seeded(rules.iter().cloned());
            kb.assert_item(seed_fact("a"));
            black_box(kb.fact_count())
        })
    });
}

fn bench_retraction_cascade(c: &mut Criterion) {
    let rules = chain_rules(64);
    c.bench_function("retract_cascade_depth_64", |bench| {
        bench.iter_batched(
            || {
                let mut kb = KnowledgeBase::seeded(rules.iter().cloned());
                kb.assert_item(seed_fact("a"));
                kb
            },
            |mut kb| {
                kb.retract(&seed_fact("a"));
                black_box(kb.fact_count())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_ask(c: &mut Criterion) {
    let mut kb = KnowledgeBase::new();
    for i in 0..512 {
        kb.assert_item(Item::Fact(Fact::new(Statement::new(
            "team",
            vec![Term::Constant(format!("player{i}"))],
        ))));
    }
    let query = Item::Fact(Fact::new(Statement::new(
        "team",
        vec![Term::Variable("who".into())],
    )));

    c.bench_function("ask_512_facts", |bench| {
        bench.iter(|| black_box(kb.ask(&query).unwrap().len()))
    });
}

criterion_group!(benches, bench_closure, bench_retraction_cascade, bench_ask);
criterion_main!(benches);
