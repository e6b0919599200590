// Signing & assembly benchmarks for the Aurum SDK.
//
// Covers key decoding, signature blocks at various key counts, and full
// offline assembly of a transfer.

use std::collections::BTreeMap;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ed25519_dalek::SigningKey;

use aurum_sdk::crypto::KeyPair;
use aurum_sdk::transaction::{
    assemble, single_key, AccountAddress, Amount, CredentialSet, Payload, SignatureBlock,
    TransactionTime,
};

fn key(seed: u8) -> KeyPair {
    KeyPair::from_signing_key(&SigningKey::from_bytes(&[seed; 32]))
}

fn bench_key_decode(c: &mut Criterion) {
    let pair = key(1);
    c.bench_function("keys/decode_signing_key", |b| {
        b.iter(|| pair.signing_key().unwrap());
    });
}

fn bench_signature_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("signing/signature_block");
    let header = [7u8; 60];
    let body = [9u8; 41];

    for keys in [1u8, 3, 8] {
        let credentials: CredentialSet =
            BTreeMap::from([(0, (0..keys).map(|i| (i, key(i + 1))).collect())]);
        group.throughput(Throughput::Elements(keys as u64));
        group.bench_with_input(BenchmarkId::from_parameter(keys), &credentials, |b, creds| {
            b.iter(|| SignatureBlock::sign(&header, &body, creds).unwrap());
        });
    }

    group.finish();
}

fn bench_assemble_transfer(c: &mut Criterion) {
    let credentials = single_key(key(1));
    let payload = Payload::transfer(AccountAddress::new([2; 32]), Amount::new(1_000_000));

    c.bench_function("transaction/assemble_transfer", |b| {
        b.iter(|| {
            assemble(
                AccountAddress::new([1; 32]),
                42,
                TransactionTime::from_seconds(1_700_000_000),
                &payload,
                &credentials,
            )
            .unwrap()
            .to_bytes()
        });
    });
}

criterion_group!(
    benches,
    bench_key_decode,
    bench_signature_block,
    bench_assemble_transfer,
);
criterion_main!(benches);
