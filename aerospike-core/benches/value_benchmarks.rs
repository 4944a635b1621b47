//! Value codec throughput benchmarks.

use aerospike_core::value::{classify, decode_particle, Packer, Value, WireValue};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn write_flat(wire: &WireValue) -> Vec<u8> {
    let mut buf = vec![0u8; wire.estimate_size().unwrap()];
    wire.write(&mut buf, 0).unwrap();
    buf
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let int = Value::from(123_456_789i64);
    let text = Value::from("a moderately sized bin value");
    let list = Value::list((0..32).map(Value::from));

    group.bench_function("int", |b| b.iter(|| black_box(classify(&int, false).unwrap())));
    group.bench_function("string", |b| {
        b.iter(|| black_box(classify(&text, false).unwrap()))
    });
    group.bench_function("list_32", |b| {
        b.iter(|| black_box(classify(&list, false).unwrap()))
    });

    group.finish();
}

fn bench_write_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_string");

    for size in [16usize, 256, 4096].iter() {
        let wire = WireValue::String("x".repeat(*size));
        let mut buf = vec![0u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("write", size), &wire, |b, w| {
            b.iter(|| black_box(w.write(&mut buf, 0).unwrap()))
        });
    }

    group.finish();
}

fn bench_pack_collections(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_collections");

    for size in [8usize, 128, 1024].iter() {
        let list = classify(&Value::list((0..*size as i64).map(Value::from)), false).unwrap();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("list", size), &list, |b, w| {
            b.iter(|| {
                let mut packer = Packer::new();
                w.pack(&mut packer).unwrap();
                black_box(packer.len())
            })
        });

        let map = classify(
            &Value::map((0..*size as i64).map(|i| (Value::from(i), Value::from("v")))),
            false,
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("map", size), &map, |b, w| {
            b.iter(|| {
                let mut packer = Packer::new();
                w.pack(&mut packer).unwrap();
                black_box(packer.len())
            })
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_particle");

    let int_bytes = write_flat(&WireValue::Integer(42));
    let list = classify(&Value::list((0..128).map(Value::from)), false).unwrap();
    let list_bytes = write_flat(&list);

    group.bench_function("integer", |b| {
        b.iter(|| black_box(decode_particle(1, &int_bytes, 0, int_bytes.len()).unwrap()))
    });
    group.throughput(Throughput::Bytes(list_bytes.len() as u64));
    group.bench_function("list_128", |b| {
        b.iter(|| black_box(decode_particle(20, &list_bytes, 0, list_bytes.len()).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_write_string,
    bench_pack_collections,
    bench_decode
);
criterion_main!(benches);
