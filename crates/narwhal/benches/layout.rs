use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::graphlib::{Graph, GraphOptions};
use narwhal::{GraphLabel, LayoutGraph, NodeLabel, layout};
use std::hint::black_box;

/// A tree of expanded ideas: every node gets `fanout` children until `node_count` is reached.
fn build_tree(node_count: usize, fanout: usize) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions { multigraph: true });
    g.set_graph(GraphLabel {
        nodesep: 120.0,
        ranksep: 100.0,
        ..Default::default()
    });
    for i in 0..node_count {
        g.set_node(i.to_string(), NodeLabel::sized(360.0, 40.0 + 24.0 * (i % 4) as f64));
        if i > 0 {
            g.set_edge(((i - 1) / fanout).to_string(), i.to_string());
        }
    }
    g
}

/// Layered graph with cross links between neighboring subtrees.
fn build_dag(node_count: usize) -> LayoutGraph {
    let mut g = build_tree(node_count, 3);
    for i in (4..node_count).step_by(5) {
        g.set_edge(((i - 4) / 3).to_string(), i.to_string());
    }
    g
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for &n in &[20usize, 100, 400] {
        group.bench_with_input(BenchmarkId::new("tree", n), &n, |b, &n| {
            b.iter_batched(
                || build_tree(n, 3),
                |mut g| {
                    layout(&mut g);
                    black_box(g.graph().width)
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("dag", n), &n, |b, &n| {
            b.iter_batched(
                || build_dag(n),
                |mut g| {
                    layout(&mut g);
                    black_box(g.graph().width)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
