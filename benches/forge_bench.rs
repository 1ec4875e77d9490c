use criterion::{black_box, criterion_group, criterion_main, Criterion};

use forgery::crypto::{BlockHash, ContractId, KeyHash};
use forgery::operation::{Content, Manager, Operation};
use forgery::zarith::n::N;

fn sample_operation() -> Operation {
    Operation::unsigned(
        BlockHash::new([0x5a; 32]),
        (0..16u64)
            .map(|i| Content::Transaction {
                manager: Manager {
                    source: KeyHash::Ed25519([i as u8; 20]),
                    fee: N::from(1_420u32),
                    counter: N::from(i),
                    gas_limit: N::from(10_300u32),
                    storage_limit: N::from(257u32),
                },
                amount: N::from(1_000_000u32 + i as u32),
                destination: ContractId::Implicit(KeyHash::Secp256k1([0x33; 20])),
                parameters: None,
            })
            .collect(),
    )
}

fn forge_bench(c: &mut Criterion) {
    let op = sample_operation();
    c.bench_function("forge_16_transactions", |b| {
        b.iter(|| black_box(op.forge()))
    });
}

fn unforge_bench(c: &mut Criterion) {
    let bytes = sample_operation().forge();
    c.bench_function("unforge_16_transactions", |b| {
        b.iter(|| black_box(Operation::unforge(&bytes).unwrap()))
    });
}

criterion_group!(benches, forge_bench, unforge_bench);
criterion_main!(benches);
