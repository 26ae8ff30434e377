use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotel_reservations::{MemoryStore, ReservationSystem, StorageConfig};
use rand::{seq::SliceRandom, thread_rng};
use std::sync::Arc;

// Every operation reloads and rewrites the whole document, so cost grows with
// store size. Measure a create/cancel cycle against stores of different sizes.
pub fn reservation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("reservation_cycle");

    for hotel_count in [10usize, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(hotel_count),
            hotel_count,
            |b, &hotel_count| {
                let system = ReservationSystem::with_backend(
                    Arc::new(MemoryStore::new()),
                    &StorageConfig::default(),
                );

                let hotel_ids = (0..hotel_count)
                    .map(|i| format!("hotel{}", i))
                    .collect::<Vec<_>>();
                for hotel_id in &hotel_ids {
                    system
                        .hotels
                        .create(hotel_id, "Hotel", "Somewhere", 1_000_000)
                        .unwrap();
                }
                system.customers.create("c1", "Bench", "bench@test.com").unwrap();

                let mut rng = thread_rng();
                b.iter(|| {
                    let hotel_id = hotel_ids.choose(&mut rng).unwrap();
                    system.reservations.create("r1", "c1", hotel_id).unwrap();
                    black_box(system.reservations.cancel("r1").unwrap());
                });
            },
        );
    }

    group.finish();
}

fn lookup_benchmark(c: &mut Criterion) {
    let system =
        ReservationSystem::with_backend(Arc::new(MemoryStore::new()), &StorageConfig::default());
    for i in 0..100 {
        system
            .customers
            .create(i, format!("Customer {}", i), format!("c{}@test.com", i))
            .unwrap();
    }

    c.bench_function("customer_get", |b| {
        b.iter(|| black_box(system.customers.get(black_box(42)).unwrap()))
    });
}

criterion_group!(benches, reservation_benchmark, lookup_benchmark);
criterion_main!(benches);
