use anyform::{convert, detect, parse, serialize, value, Format, Source, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn table_value(rows: usize) -> Value {
    Value::Sequence(
        (0..rows)
            .map(|i| {
                value!({
                    "id": (i as i64),
                    "name": "user",
                    "active": true,
                    "score": 0.5
                })
            })
            .collect(),
    )
}

fn bench_detect(c: &mut Criterion) {
    let json = serialize(&table_value(50), Format::Json).unwrap();
    let yaml = serialize(&table_value(50), Format::Yaml).unwrap();
    let csv = serialize(&table_value(50), Format::Csv).unwrap();

    c.bench_function("detect_json_50_rows", |b| {
        b.iter(|| detect(black_box(&json)))
    });
    c.bench_function("detect_yaml_50_rows", |b| {
        b.iter(|| detect(black_box(&yaml)))
    });
    c.bench_function("detect_csv_50_rows", |b| {
        b.iter(|| detect(black_box(&csv)))
    });
}

fn bench_parse(c: &mut Criterion) {
    let json = serialize(&table_value(100), Format::Json).unwrap();
    let toon = serialize(&table_value(100), Format::Toon).unwrap();

    c.bench_function("parse_json_100_rows", |b| {
        b.iter(|| parse(black_box(&json), Format::Json).unwrap())
    });
    c.bench_function("parse_toon_100_rows", |b| {
        b.iter(|| parse(black_box(&toon), Format::Toon).unwrap())
    });
}

fn bench_serialize(c: &mut Criterion) {
    let value = table_value(100);

    c.bench_function("serialize_json_100_rows", |b| {
        b.iter(|| serialize(black_box(&value), Format::Json).unwrap())
    });
    c.bench_function("serialize_toon_100_rows", |b| {
        b.iter(|| serialize(black_box(&value), Format::Toon).unwrap())
    });
    c.bench_function("serialize_csv_100_rows", |b| {
        b.iter(|| serialize(black_box(&value), Format::Csv).unwrap())
    });
}

fn bench_end_to_end(c: &mut Criterion) {
    let json = serialize(&table_value(100), Format::Json).unwrap();

    c.bench_function("convert_auto_json_to_yaml", |b| {
        b.iter(|| convert(black_box(&json), Source::Auto, Format::Yaml))
    });
    c.bench_function("convert_json_to_msgpack", |b| {
        b.iter(|| convert(black_box(&json), Source::Format(Format::Json), Format::Msgpack))
    });
}

criterion_group!(
    benches,
    bench_detect,
    bench_parse,
    bench_serialize,
    bench_end_to_end
);
criterion_main!(benches);
