use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use storefront_infra::config::StorefrontConfig;
use storefront_infra::notify::LogNotificationChannel;
use storefront_infra::store::InMemoryStorefront;
use storefront_infra::Storefront;
use storefront_products::{NewProduct, ProductPatch};
use storefront_sales::CheckoutRequest;
use tokio::runtime::Runtime;

fn runtime(threads: usize) -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()
        .unwrap()
}

fn setup(rt: &Runtime, quantity: u32) -> Storefront<InMemoryStorefront> {
    let store = Arc::new(InMemoryStorefront::new());
    let storefront = Storefront::new(store, Arc::new(LogNotificationChannel), &StorefrontConfig::default());
    rt.block_on(storefront.catalog.create_product(NewProduct {
        slug: "bench-print".to_string(),
        name: "Bench Print".to_string(),
        price_cents: 4500,
        quantity: Some(quantity),
        published: Some(true),
        ..NewProduct::default()
    }))
    .unwrap();
    storefront
}

fn order(qty: i64) -> CheckoutRequest {
    CheckoutRequest {
        product_id: None,
        product_slug: Some("bench-print".to_string()),
        qty: Some(qty),
        email: Some("bench@example.com".to_string()),
    }
}

/// One shopper, no contention.
fn bench_uncontended_checkout(c: &mut Criterion) {
    let rt = runtime(1);
    let storefront = setup(&rt, u32::MAX);

    let mut group = c.benchmark_group("checkout_latency");
    group.bench_function("single_order", |b| {
        b.iter(|| {
            rt.block_on(storefront.checkout.place_order(black_box(&order(1))))
                .unwrap();
        });
    });
    group.finish();
}

/// N shoppers racing on one product row.
fn bench_contended_checkout(c: &mut Criterion) {
    let rt = runtime(4);
    let mut group = c.benchmark_group("checkout_contention");

    for shoppers in [2usize, 8, 32] {
        group.throughput(Throughput::Elements(shoppers as u64));
        group.bench_with_input(BenchmarkId::from_parameter(shoppers), &shoppers, |b, &shoppers| {
            let storefront = setup(&rt, u32::MAX);
            b.iter(|| {
                rt.block_on(async {
                    let mut handles = Vec::with_capacity(shoppers);
                    for _ in 0..shoppers {
                        let checkout = storefront.checkout.clone();
                        handles.push(tokio::spawn(async move { checkout.place_order(&order(1)).await }));
                    }
                    for handle in handles {
                        let _ = handle.await;
                    }
                });
            });
        });
    }
    group.finish();
}

/// Restock fan-out over a waitlist of growing size.
fn bench_restock_fan_out(c: &mut Criterion) {
    let rt = runtime(4);
    let mut group = c.benchmark_group("restock_fan_out");

    for subscribers in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(BenchmarkId::from_parameter(subscribers), &subscribers, |b, &subscribers| {
            b.iter_batched(
                || {
                    let storefront = setup(&rt, 0);
                    let product = rt
                        .block_on(storefront.catalog.published_by_slug("bench-print"))
                        .unwrap();
                    for i in 0..subscribers {
                        rt.block_on(storefront.waitlist.subscribe(product.id, &format!("s{i}@example.com")))
                            .unwrap();
                    }
                    (storefront, product.id)
                },
                |(storefront, product_id)| {
                    let patch = ProductPatch {
                        quantity: Some(5),
                        ..ProductPatch::default()
                    };
                    rt.block_on(storefront.catalog.update_product(product_id, patch))
                        .unwrap();
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_uncontended_checkout,
    bench_contended_checkout,
    bench_restock_fan_out
);
criterion_main!(benches);
