use ai_bt::{BtStatus, NodeDef, Orchestrator, Policy, Tree};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Default)]
struct Board {
    ticks: u64,
}

fn always_true(_bb: &Board) -> bool {
    true
}

fn bench_sequence_tick(c: &mut Criterion) {
    let conditions = (0..32).map(|_| NodeDef::condition("always", always_true));
    let mut tree = Tree::with_blackboard(NodeDef::sequence(conditions), Board::default());

    c.bench_function("ai-bt/step(sequence, conditions=32)", |b| {
        b.iter(|| black_box(tree.step().unwrap()))
    });
}

fn bench_parallel_tick(c: &mut Criterion) {
    let children = (0..8).map(|_| {
        NodeDef::sequence([
            NodeDef::condition("always", always_true),
            NodeDef::action("tick", |bb: &mut Board| {
                bb.ticks += 1;
                BtStatus::Running
            }),
        ])
    });
    let root = NodeDef::parallel(Policy::Sequence, Orchestrator::Resume, children);
    let mut tree = Tree::with_blackboard(root, Board::default());

    c.bench_function("ai-bt/step(parallel, branches=8)", |b| {
        b.iter(|| black_box(tree.step().unwrap()))
    });
}

fn bench_instantiate(c: &mut Criterion) {
    let branches = (0..16).map(|_| NodeDef::sequence([NodeDef::wait(2), NodeDef::success()]));
    let archetype: Tree<Board> = Tree::new(NodeDef::selector(branches));

    c.bench_function("ai-bt/instantiate(nodes=49)", |b| {
        b.iter(|| black_box(archetype.instantiate(Board::default()).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_sequence_tick,
    bench_parallel_tick,
    bench_instantiate
);
criterion_main!(benches);
