//! Benchmarks for `Learner::update` over a synthetic classification tree.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use winston_core::classification::ClassificationTree;
use winston_core::learner::Learner;
use winston_core::model::{Link, Model, Object};

fn bmw_tree() -> Arc<ClassificationTree> {
    let mut t = ClassificationTree::new();
    t.add("Vehicle".into(), None).unwrap();
    t.add("Brand".into(), Some("Vehicle".into())).unwrap();
    t.add("ModelA".into(), Some("Brand".into())).unwrap();
    t.add("ModelB".into(), Some("Brand".into())).unwrap();
    t.add("Component".into(), None).unwrap();
    t.add("Engine".into(), Some("Component".into())).unwrap();
    t.add("EngineX".into(), Some("Engine".into())).unwrap();
    t.add("EngineY".into(), Some("Engine".into())).unwrap();
    t.add("Drive".into(), Some("Component".into())).unwrap();
    t.add("DriveA".into(), Some("Drive".into())).unwrap();
    t.add("DriveB".into(), Some("Drive".into())).unwrap();
    Arc::new(t)
}

fn seed_positive(id: usize) -> Model {
    let mut m = Model::new();
    m.add_object(Object::new(format!("c{id}"), "ModelA")).unwrap();
    m.add_object(Object::new(format!("e{id}"), "EngineX")).unwrap();
    m.add_link(Link::regular(format!("c{id}"), format!("e{id}"))).unwrap();
    m
}

fn bench_seed_from_empty(c: &mut Criterion) {
    let tree = bmw_tree();
    let positive = seed_positive(0);

    c.bench_function("update_seed_from_empty", |b| {
        b.iter(|| {
            let mut learner = Learner::new(tree.clone());
            black_box(learner.update(&Model::new(), &positive, None))
        })
    });
}

fn bench_require_link_with_near_miss(c: &mut Criterion) {
    let tree = bmw_tree();
    let mut learner = Learner::new(tree.clone());
    let seed = seed_positive(0);
    let current = learner.update(&Model::new(), &seed, None);

    let positive = seed_positive(1);
    let mut near_miss = Model::new();
    near_miss.add_object(Object::new("c2", "ModelA")).unwrap();

    c.bench_function("update_require_link_with_near_miss", |b| {
        b.iter(|| black_box(learner.update(&current, &positive, Some(&near_miss))))
    });
}

fn bench_update_over_growing_history(c: &mut Criterion) {
    let tree = bmw_tree();

    c.bench_function("update_over_growing_history_10", |b| {
        b.iter(|| {
            let mut learner = Learner::new(tree.clone());
            let mut current = Model::new();
            for i in 0..10 {
                let positive = seed_positive(i);
                current = learner.update(&current, &positive, None);
            }
            black_box(current)
        })
    });
}

criterion_group!(
    benches,
    bench_seed_from_empty,
    bench_require_link_with_near_miss,
    bench_update_over_growing_history,
);
criterion_main!(benches);
