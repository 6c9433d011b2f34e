//! printf/scanf engine benchmarks.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rehost_abi::malloc_abi::{free, malloc};
use rehost_abi::stdio_abi::{snprintf, sprintf, sscanf};
use rehost_abi::string_abi::c_string;
use rehost_core::stdarg::{ArgList, Value};
use rehost_core::stdio::{SpaceReader, format, parse_format, scan};
use rehost_membrane::global_space;

fn bench_parse_format(c: &mut Criterion) {
    let fmt = b"%d%% = %%%d %5.2f|%-10s|%#x\n";
    c.bench_function("parse_format", |b| {
        b.iter(|| black_box(parse_format(black_box(fmt))));
    });
}

fn bench_format_engine(c: &mut Criterion) {
    let space = global_space();
    c.bench_function("format_mixed", |b| {
        b.iter(|| {
            let mut args = ArgList::new(
                0,
                vec![
                    Value::Int(-42),
                    Value::Float(3.14159),
                    Value::Str("hello".into()),
                    Value::Uint(0xBEEF),
                ],
            );
            black_box(format(space, b"%d %.3f %10s %#x", &mut args))
        });
    });
}

fn bench_sprintf(c: &mut Criterion) {
    let buf = malloc(128);
    c.bench_function("sprintf_int", |b| {
        b.iter(|| black_box(sprintf(buf, b"value=%d", vec![Value::Int(123_456)])));
    });
    c.bench_function("snprintf_truncated", |b| {
        b.iter(|| black_box(snprintf(buf, 8, b"%s-%s", vec!["abcdef".into(), "ghijkl".into()])));
    });
    free(buf);
}

fn bench_scan(c: &mut Criterion) {
    let n = malloc(4);
    let word = malloc(32);
    let input = c_string("  12345 token 6.5\n");
    c.bench_function("sscanf_int_word", |b| {
        b.iter(|| black_box(sscanf(input, b"%d %s", vec![Value::Ptr(n), Value::Ptr(word)])));
    });
    c.bench_function("scan_engine_slice", |b| {
        b.iter(|| {
            let mut reader = SpaceReader::new(&b"  12345 token 6.5\n"[..]);
            let mut args = ArgList::new(0, vec![Value::Ptr(n), Value::Ptr(word)]);
            black_box(scan(&mut reader, b"%d %s", &mut args))
        });
    });
    free(n);
    free(word);
    free(input);
}

criterion_group!(
    benches,
    bench_parse_format,
    bench_format_engine,
    bench_sprintf,
    bench_scan
);
criterion_main!(benches);
