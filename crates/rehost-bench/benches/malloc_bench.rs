//! Allocation benchmarks.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rehost_abi::malloc_abi::{calloc, free, malloc, realloc};
use rehost_membrane::global_space;

fn bench_malloc_free(c: &mut Criterion) {
    let sizes: &[isize] = &[16, 64, 256, 1024, 4096];
    let mut group = c.benchmark_group("malloc_free");

    for &size in sizes {
        group.bench_with_input(BenchmarkId::new("rehost", size), &size, |b, &sz| {
            b.iter(|| {
                let p = malloc(sz);
                free(black_box(p));
            });
        });
    }
    group.finish();
}

fn bench_calloc(c: &mut Criterion) {
    c.bench_function("calloc_64x8", |b| {
        b.iter(|| {
            let p = calloc(64, 8);
            free(black_box(p));
        });
    });
}

fn bench_realloc_grow(c: &mut Criterion) {
    c.bench_function("realloc_grow_16_to_4096", |b| {
        b.iter(|| {
            let mut p = malloc(16);
            let mut size = 16;
            while size < 4096 {
                size *= 2;
                p = realloc(p, size);
            }
            free(black_box(p));
        });
    });
}

// Lookup cost grows with the number of live buffers.
fn bench_resolve_with_live_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for &live in &[16usize, 1024, 16384] {
        let ptrs: Vec<_> = (0..live).map(|_| malloc(32)).collect();
        let target = ptrs[live / 2];
        group.bench_with_input(BenchmarkId::new("containing", live), &live, |b, _| {
            b.iter(|| black_box(global_space().containing(target.add(7))));
        });
        for p in ptrs {
            free(p);
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_malloc_free,
    bench_calloc,
    bench_realloc_grow,
    bench_resolve_with_live_set
);
criterion_main!(benches);
