use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use paddock::{ForceLayout, Graph, InitialPositions};
use std::hint::black_box;
use std::time::Duration;

fn build_graph(node_count: usize, fanout: usize) -> Graph<usize> {
    let mut rows: Vec<(usize, usize, f64)> = Vec::new();

    // A ring to guarantee connectivity.
    for i in 0..node_count {
        rows.push((i, (i + 1) % node_count, 2.0));
    }

    // Chords with decaying weight.
    for i in 0..node_count {
        for k in 2..=(fanout + 1) {
            rows.push((i, (i * 7 + k * 13) % node_count, 1.0 / k as f64));
        }
    }

    Graph::from_links(rows)
}

fn start(n: usize) -> InitialPositions {
    InitialPositions::new(
        (0..n).map(|i| (i as f64 * 0.37).sin() * 4.0).collect(),
        (0..n).map(|i| (i as f64 * 0.61).cos() * 4.0).collect(),
    )
}

fn bench_force_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_layout");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("ring_50_f2", 50usize, 2usize),
        ("ring_200_f3", 200usize, 3usize),
        ("ring_500_f3", 500usize, 3usize),
    ];

    for (name, nodes, fanout) in cases {
        let graph = build_graph(nodes, fanout);
        group.bench_with_input(BenchmarkId::new("operator", name), &graph, |b, graph| {
            b.iter(|| {
                let layout = ForceLayout::new(black_box(graph)).expect("layout");
                black_box(layout.operator().dim());
            })
        });

        let layout = ForceLayout::new(&graph).expect("layout");
        let n = graph.nodes().len();
        group.bench_with_input(BenchmarkId::new("run_30", name), &n, |b, &n| {
            b.iter(|| {
                let last = layout.run_from(30, start(n)).expect("run").last();
                black_box(last);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_force_layout);
criterion_main!(benches);
