// Hashing and validation benchmarks.
//
// Covers a single message hash, filling a five-message block, validating the
// example chain, and cached against uncached encoders on chains of growing
// length.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use easychain_core::{Block, Blockchain, CachedEncoder, HashAlgorithm, Message};
use easychain_testkit::fixtures::{example_chain, frozen_block};

fn bench_message_hash(c: &mut Criterion) {
    let msg = Message::new("first data");

    c.bench_function("message/hash", |b| {
        b.iter(|| msg.hash());
    });
}

fn bench_fill_block(c: &mut Criterion) {
    c.bench_function("block/add_5_messages", |b| {
        b.iter(|| {
            let mut block = Block::new();
            for i in 0..5 {
                block
                    .add_message(Message::new(format!("test{}", i)))
                    .expect("fresh message");
            }
            block
        });
    });
}

fn bench_validate_example(c: &mut Criterion) {
    let chain = example_chain();

    let mut group = c.benchmark_group("chain/validate_example");
    for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Blake3] {
        let chain = if algorithm == HashAlgorithm::Sha256 {
            chain.clone()
        } else {
            easychain_testkit::TestFixture::with_algorithm(algorithm).example_chain()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(algorithm.name()),
            &chain,
            |b, chain| b.iter(|| chain.validate_with(&algorithm)),
        );
    }
    group.finish();
}

fn bench_cached_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain/validate_cached");

    for blocks in [10usize, 100, 500] {
        let mut chain = Blockchain::new();
        for i in 0..blocks {
            let texts = [format!("block {} a", i), format!("block {} b", i)];
            let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
            chain.add_block(frozen_block(&texts)).expect("valid block");
        }

        group.throughput(Throughput::Elements(chain.message_count() as u64));
        group.bench_with_input(BenchmarkId::new("uncached", blocks), &chain, |b, chain| {
            b.iter(|| chain.validate_with(&HashAlgorithm::Sha256))
        });

        let cached = CachedEncoder::new(HashAlgorithm::Sha256, 4 * chain.message_count());
        group.bench_with_input(BenchmarkId::new("cached", blocks), &chain, |b, chain| {
            b.iter(|| chain.validate_with(&cached))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_message_hash,
    bench_fill_block,
    bench_validate_example,
    bench_cached_validation
);
criterion_main!(benches);
