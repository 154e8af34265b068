use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use quadcluster::{BoundingBox, ClusterEngine, Clusterer, Coordinate, QuadTree, RawMarker, Viewport};

fn markers(count: usize) -> Vec<RawMarker> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..count)
        .map(|_| RawMarker::at(next() * 40.0 - 20.0, next() * 80.0 - 40.0))
        .collect()
}

fn viewport(zoom: f64) -> Viewport {
    Viewport::new(
        Coordinate::new(20.0, 40.0),
        Coordinate::new(-20.0, -40.0),
        zoom,
    )
}

fn benchmark_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    let bounds = viewport(0.0).bounds();

    for &count in &[10_000usize, 50_000] {
        let data = markers(count);
        group.bench_with_input(BenchmarkId::new("insert", count), &data, |b, data| {
            b.iter(|| {
                let mut tree = QuadTree::new(bounds);
                tree.extend(data.iter().cloned(), true);
                black_box(tree.len())
            })
        });
    }

    group.finish();
}

fn benchmark_region_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_query");
    let bounds = viewport(0.0).bounds();
    let mut tree = QuadTree::new(bounds);
    tree.extend(markers(50_000), true);

    let region = BoundingBox::new(-5.0, -5.0, 5.0, 5.0);
    group.bench_function("ten_degree_box", |b| {
        b.iter(|| black_box(tree.query_region(&bounds, black_box(&region)).len()))
    });

    group.finish();
}

fn benchmark_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster");
    let bounds = viewport(0.0).bounds();
    let mut tree = QuadTree::new(bounds);
    tree.extend(markers(50_000), true);
    let extents = tree.extents();
    let (north_east, south_west) = (extents.north_east(), extents.south_west());
    let engine = ClusterEngine::default();

    for &zoom in &[2.0, 5.0, 8.0, 11.0] {
        group.bench_with_input(BenchmarkId::new("zoom", zoom), &zoom, |b, &zoom| {
            b.iter(|| {
                black_box(
                    engine
                        .cluster(&tree, zoom, north_east, south_west, &bounds)
                        .unwrap()
                        .len(),
                )
            })
        });
    }

    group.finish();
}

fn benchmark_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    let data = markers(20_000);
    let mut clusterer = Clusterer::new();

    group.bench_function("rebuild_20k_zoom_6", |b| {
        b.iter(|| black_box(clusterer.rebuild(&data, &viewport(6.0)).unwrap().len()))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_index_build,
    benchmark_region_query,
    benchmark_cluster,
    benchmark_rebuild
);
criterion_main!(benches);
