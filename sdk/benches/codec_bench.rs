// Codec benchmarks for the Aurum SDK.
//
// Covers typed and dynamic encoding of contract-parameter-shaped data,
// canonical map ordering, and body serialization.

use std::collections::{BTreeMap, HashMap};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use aurum_sdk::codec::{self, Shape, Value};
use aurum_sdk::transaction::{Amount, ContractAddress, Parameter, Payload};

fn bench_encode_vec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/encode_vec_u64");
    for len in [16usize, 256, 4096] {
        let data: Vec<u64> = (0..len as u64).collect();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| codec::encode(data).unwrap());
        });
    }
    group.finish();
}

fn bench_canonical_maps(c: &mut Criterion) {
    let hashed: HashMap<String, u32> = (0..256).map(|i| (format!("key-{:04}", i), i)).collect();
    let ordered: BTreeMap<String, u32> = hashed.clone().into_iter().collect();

    c.bench_function("codec/hashmap_256_canonical", |b| {
        b.iter(|| codec::encode(&hashed).unwrap());
    });
    c.bench_function("codec/btreemap_256", |b| {
        b.iter(|| codec::encode(&ordered).unwrap());
    });
}

fn bench_dynamic_values(c: &mut Criterion) {
    let value = Value::List(
        (0..64)
            .map(|i| Value::Record(vec![Value::U64(i), Value::String(format!("item-{}", i))]))
            .collect(),
    );
    let shape = Shape::List(Box::new(Shape::Record(vec![Shape::U64, Shape::String])));
    let bytes = codec::encode(&value).unwrap();

    c.bench_function("codec/value_encode_64_records", |b| {
        b.iter(|| codec::encode(&value).unwrap());
    });
    c.bench_function("codec/value_decode_64_records", |b| {
        b.iter(|| codec::decode_value(&bytes, &shape).unwrap());
    });
}

fn bench_update_payload(c: &mut Criterion) {
    let param = Parameter::from_values(&[Value::U64(1), Value::from("deposit memo")]).unwrap();
    let payload = Payload::update_contract(
        Amount::new(500),
        ContractAddress::new(81, 0),
        "vault",
        "deposit",
        param,
    );

    c.bench_function("payload/serialize_update_contract", |b| {
        b.iter(|| payload.serialize().unwrap());
    });
}

criterion_group!(
    benches,
    bench_encode_vec,
    bench_canonical_maps,
    bench_dynamic_values,
    bench_update_payload,
);
criterion_main!(benches);
