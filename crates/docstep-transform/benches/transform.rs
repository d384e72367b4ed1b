use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use docstep_model::{Attrs, Node, Pos, Schema};
use docstep_transform::{Bias, Step, StepRegistry, Transform};

/// A document of `items` list items, each holding one short paragraph.
fn list_doc(schema: &Schema, items: usize) -> Arc<Node> {
    let content = (0..items)
        .map(|i| {
            let text = schema.text(&format!("item {i}"), vec![]).unwrap();
            let para = schema.node("paragraph", Attrs::new(), vec![text]).unwrap();
            schema.node("list_item", Attrs::new(), vec![para]).unwrap()
        })
        .collect();
    let list = schema.node("bullet_list", Attrs::new(), content).unwrap();
    Arc::new(schema.node("doc", Attrs::new(), vec![list]).unwrap())
}

fn bench_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("steps");
    group.sample_size(10);

    let schema = Schema::basic();
    let doc = list_doc(&schema, 1000);
    let registry = StepRegistry::shared();
    let quote = schema.template("blockquote", Attrs::new()).unwrap();

    group.bench_function("wrap_one_item_content", |b| {
        let step = Step::ancestor(
            Pos::new(vec![0, 500], 0),
            Pos::new(vec![0, 500], 1),
            0,
            vec![quote.clone()],
        );
        b.iter(|| black_box(step.apply(&registry, black_box(&doc)).unwrap()));
    });

    group.bench_function("split_list", |b| {
        let step = Step::split(Pos::new(vec![0], 500), None);
        b.iter(|| black_box(step.apply(&registry, black_box(&doc)).unwrap()));
    });

    group.finish();
}

fn bench_structure(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure");
    group.sample_size(10);

    let schema = Schema::basic();
    let doc = list_doc(&schema, 1000);

    group.bench_function("lift_middle_item", |b| {
        b.iter(|| {
            let mut tr = Transform::new(doc.clone());
            tr.lift(&Pos::new(vec![0], 500), &Pos::new(vec![0], 501));
            black_box(tr);
        });
    });

    group.bench_function("map_through_session", |b| {
        let mut tr = Transform::new(doc.clone());
        for i in (1..50).rev() {
            tr.lift(&Pos::new(vec![0], i * 10), &Pos::new(vec![0], i * 10 + 1));
        }
        let cursor = Pos::new(vec![0, 999, 0], 1);
        b.iter(|| black_box(tr.map(black_box(&cursor), Bias::After)));
    });

    group.finish();
}

criterion_group!(benches, bench_steps, bench_structure);
criterion_main!(benches);
