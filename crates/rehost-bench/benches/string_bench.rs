//! String function benchmarks.
//!
//! Each size is measured twice: the slice-level core routine and the
//! address-level entry point, so the gap is the cost of resolving
//! addresses through the address space.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rehost_abi::malloc_abi::{free, malloc};
use rehost_abi::string_abi::{c_bytes, memcpy, strlen};
use rehost_membrane::global_space;

fn bench_memcpy_sizes(c: &mut Criterion) {
    let sizes: &[usize] = &[16, 64, 256, 1024, 4096, 65536];
    let mut group = c.benchmark_group("memcpy");

    for &size in sizes {
        let src = c_bytes(&vec![0xAB; size]);
        let dst = malloc(size as isize);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("core", size), &size, |b, &sz| {
            let from = vec![0xABu8; sz];
            let mut to = vec![0u8; sz];
            b.iter(|| {
                rehost_core::string::memcpy(&mut to, &from, sz);
                black_box(&to);
            });
        });
        group.bench_with_input(BenchmarkId::new("abi", size), &size, |b, &sz| {
            b.iter(|| black_box(memcpy(dst, src, sz)));
        });

        free(dst);
        free(src);
    }
    group.finish();
}

fn bench_strlen(c: &mut Criterion) {
    let sizes: &[usize] = &[16, 64, 256, 1024, 4096];
    let mut group = c.benchmark_group("strlen");

    for &size in sizes {
        let mut s = vec![b'A'; size];
        s.push(0);
        let p = c_bytes(&s[..size]);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("core", size), &size, |b, _| {
            b.iter(|| black_box(rehost_core::string::strlen(&s)));
        });
        group.bench_with_input(BenchmarkId::new("abi", size), &size, |b, _| {
            b.iter(|| black_box(strlen(p)));
        });
        // Resolution cost alone.
        group.bench_with_input(BenchmarkId::new("scan_nul", size), &size, |b, _| {
            b.iter(|| black_box(global_space().scan_nul(p)));
        });

        free(p);
    }
    group.finish();
}

criterion_group!(benches, bench_memcpy_sizes, bench_strlen);
criterion_main!(benches);
