use bitson::{Decoder, Encoder, Schema, Value};
use criterion::{Criterion, criterion_group, criterion_main};

fn gen_schema(field_count: usize) -> Schema {
    let mut fields = Vec::with_capacity(field_count);

    for i in 0..field_count {
        let node = match i % 4 {
            0 => "uint(16)",
            1 => "int(8)",
            2 => "bool",
            _ => "varchar(255){abcdefghijklmnopqrstuvwxyz}",
        };
        fields.push((format!("f{}", i), Schema::compile(node).unwrap()));
    }

    Schema::structure(fields)
}

fn gen_value(field_count: usize) -> Value {
    let mut object = indexmap::IndexMap::new();

    // Deterministic but non-trivial pattern
    for i in 0..field_count {
        let value = match i % 4 {
            0 => Value::from((i * 31 % 65536) as u16),
            1 => Value::from((i as i64 % 256) - 128),
            2 => Value::Bool(i % 3 == 0),
            _ => Value::from("bitpacked"),
        };
        object.insert(format!("f{}", i), value);
    }

    Value::Object(object)
}

fn bench_encode(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let value = gen_value(field_count);

        c.bench_function(&format!("encode_{}_fields", field_count), |b| {
            b.iter(|| {
                let mut encoder = Encoder::new();
                encoder.encode(&schema, &value).unwrap();
                encoder.finish()
            })
        });
    }
}

fn bench_decode(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let mut encoder = Encoder::new();
        encoder.encode(&schema, &gen_value(field_count)).unwrap();
        let packet = encoder.finish();

        c.bench_function(&format!("decode_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = Decoder::new(&packet).decode(&schema).unwrap();
            })
        });
    }
}

fn bench_schemaless(c: &mut Criterion) {
    let value = Value::Array((0..100u32).map(|i| Value::from(i * 1000)).collect());

    c.bench_function("encode_schemaless_100_integers", |b| {
        b.iter(|| {
            let mut encoder = Encoder::new();
            encoder.encode(&Schema::Unknown, &value).unwrap();
            encoder.finish()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_schemaless);
criterion_main!(benches);
