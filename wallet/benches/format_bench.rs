// Balance formatting benchmarks for the NOVA wallet.
//
// Covers minimal-unit rendering at common precisions, fiat conversion, and
// full token-row computation for lists of various sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use nova_wallet::assets::Asset;
use nova_wallet::store::AppSnapshot;
use nova_wallet::units::{balance_to_fiat, render_from_token_minimal_unit, render_from_wei, TokenAmount};
use nova_wallet::views::TokenElement;

fn bench_render_wei(c: &mut Criterion) {
    c.bench_function("units/render_from_wei", |b| {
        b.iter(|| render_from_wei(black_box(1_234_567_890_123_456_789)));
    });
}

fn bench_render_token(c: &mut Criterion) {
    let mut group = c.benchmark_group("units/render_from_token_minimal_unit");
    for decimals in [0u8, 6, 18, 38] {
        group.bench_with_input(BenchmarkId::from_parameter(decimals), &decimals, |b, &d| {
            b.iter(|| render_from_token_minimal_unit(black_box(987_654_321_987_654_321), d));
        });
    }
    group.finish();
}

fn bench_balance_to_fiat(c: &mut Criterion) {
    c.bench_function("units/balance_to_fiat", |b| {
        b.iter(|| balance_to_fiat(black_box(1.5), 2000.0, Some(0.0005), "usd"));
    });
}

fn synthetic_snapshot(tokens: usize) -> AppSnapshot {
    let mut snapshot = AppSnapshot {
        conversion_rate: 2000.0,
        ..AppSnapshot::default()
    };
    for i in 0..tokens {
        let address = format!("0x{:040x}", i + 1);
        snapshot
            .contract_balances
            .insert(address.clone(), TokenAmount::new(1_000_000_000_000_000_000 * (i as u128 + 1)));
        if i % 2 == 0 {
            snapshot.contract_exchange_rates.insert(address.clone(), 0.001);
        }
        snapshot.tokens.push(Asset::token(&address, "TKN", 18));
    }
    snapshot
}

fn bench_token_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("views/token_rows");
    for size in [1usize, 10, 100] {
        let snapshot = synthetic_snapshot(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snap| {
            b.iter(|| {
                snap.tokens
                    .iter()
                    .map(|asset| TokenElement::from_snapshot(asset, snap).compute())
                    .collect::<Result<Vec<_>, _>>()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_render_wei,
    bench_render_token,
    bench_balance_to_fiat,
    bench_token_rows,
);
criterion_main!(benches);
