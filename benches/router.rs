use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ortho_router::graph::{IndexedPriorityQueue, PriorityTree};
use ortho_router::{Connector, Obstacle, Orientation, OrthogonalPathFinder, Point, parse_scene};
use std::hint::black_box;

/// `cols` x `rows` boxes on a regular pitch, leaving room for corridors.
fn obstacle_lattice(cols: usize, rows: usize) -> (Vec<Obstacle>, f64, f64) {
    let mut obstacles = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            // Stagger odd rows so lead lines do not all coincide.
            let shift = if row % 2 == 1 { 25.0 } else { 0.0 };
            obstacles.push(Obstacle::new(
                40.0 + col as f64 * 120.0 + shift,
                40.0 + row as f64 * 90.0,
                70.0,
                40.0,
            ));
        }
    }
    let width = 80.0 + cols as f64 * 120.0 + 25.0;
    let height = 80.0 + rows as f64 * 90.0;
    (obstacles, width, height)
}

fn corner_to_corner(obstacles: &[Obstacle]) -> Connector {
    let first = &obstacles[0];
    let last = &obstacles[obstacles.len() - 1];
    Connector::new(first, Orientation::Left, last, Orientation::Right)
}

fn bench_build_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_grid");
    group.sample_size(20);
    for (cols, rows) in [(2, 2), (4, 3), (6, 4)] {
        let (obstacles, width, height) = obstacle_lattice(cols, rows);
        let name = format!("{cols}x{rows}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &obstacles, |b, data| {
            b.iter(|| {
                let grid = OrthogonalPathFinder::new().build_grid(black_box(data), width, height);
                black_box(grid.graph().len());
            });
        });
    }
    group.finish();
}

fn bench_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    for (cols, rows) in [(2, 2), (4, 3), (6, 4)] {
        let (obstacles, width, height) = obstacle_lattice(cols, rows);
        let grid = OrthogonalPathFinder::new().build_grid(&obstacles, width, height);
        let template = corner_to_corner(&obstacles);
        let name = format!("{cols}x{rows}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &template, |b, data| {
            b.iter(|| {
                let mut connector = data.clone();
                let path = grid.route(black_box(&mut connector)).expect("route failed");
                black_box(path.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let input = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.json"));
    c.bench_function("end_to_end/sample", |b| {
        b.iter(|| {
            let scene = parse_scene(black_box(input)).expect("parse failed");
            let (obstacles, mut connectors) = scene.resolve().expect("resolve failed");
            let results = OrthogonalPathFinder::new().route_all(&obstacles, 800.0, 450.0, &mut connectors);
            black_box(results.len());
        });
    });
}

fn bench_structures(c: &mut Criterion) {
    let points: Vec<Point> = (0..500)
        .map(|i| Point::new((i * 37 % 499) as f64, (i * 91 % 467) as f64))
        .collect();

    c.bench_function("priority_tree/build_500", |b| {
        b.iter(|| {
            let tree = PriorityTree::from_items(black_box(points.clone()));
            black_box(tree.len());
        });
    });

    let tree = PriorityTree::from_items(points.clone());
    c.bench_function("priority_tree/interval_find", |b| {
        b.iter(|| black_box(tree.interval_find(100.0, 100.0, 300.0, 300.0).len()));
    });

    c.bench_function("priority_queue/enqueue_drain_1000", |b| {
        b.iter(|| {
            let mut queue = IndexedPriorityQueue::new();
            for i in 0..1000usize {
                queue.enqueue(i, ((i * 7919) % 1000) as f64).expect("enqueue failed");
            }
            while let Some(item) = queue.dequeue() {
                black_box(item);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_build_grid,
    bench_route,
    bench_end_to_end,
    bench_structures
);
criterion_main!(benches);
