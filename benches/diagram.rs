use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use vorobound::{DelaunayTessellator, Point, Tessellator, VoronoiDiagram, random_sites};

const SIZES: [usize; 4] = [10, 100, 1000, 10_000];

fn sites(count: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(123456789);
    random_sites(&mut rng, count)
}

fn benchmark_tessellate(c: &mut Criterion) {
    let mut group = c.benchmark_group("tessellate");
    group.sample_size(10);

    for &size in &SIZES {
        let points = sites(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| DelaunayTessellator.tessellate(black_box(points)))
        });
    }
    group.finish();
}

fn benchmark_diagram(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagram");
    group.sample_size(10);

    for &size in &SIZES {
        let points = sites(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| VoronoiDiagram::new(black_box(points)))
        });
    }
    group.finish();
}

fn benchmark_threads(c: &mut Criterion) {
    let points = sites(10_000);
    let mut group = c.benchmark_group("diagram_threads");
    group.sample_size(10);

    let max_cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8);
    let mut cores = 1;
    while cores <= max_cores {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(cores).build().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(cores), &points, |b, points| {
            b.iter(|| pool.install(|| VoronoiDiagram::new(black_box(points))))
        });
        cores *= 2;
    }
    group.finish();
}

criterion_group!(benches, benchmark_tessellate, benchmark_diagram, benchmark_threads);
criterion_main!(benches);
