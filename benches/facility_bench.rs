//! Benchmarks for the parking facility.
//!
//! Benchmarks cover:
//! - Entry/exit cycles under the facility lock
//! - Snapshot copies and analytics over growing histories
//! - Fee calculation
//! - Fallback question answering

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use parking_facility::assistant::QueryRouter;
use parking_facility::builders::build_facility;
use parking_facility::config::FacilityConfig;
use parking_facility::core::{
    AnalyticsAggregator, Facility, FeeCalculator, SnapshotSource, SpotType, VehicleFilter,
};
use parking_facility::infra::InMemoryGateway;
use parking_facility::util::ManualClock;
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

// ============================================================================
// Fixtures
// ============================================================================

fn facility(spots_per_floor: u16) -> (Arc<Facility>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let cfg = FacilityConfig {
        floors: 5,
        spots_per_floor,
        default_layout: false,
        ..FacilityConfig::default()
    };
    let facility = build_facility(&cfg, Arc::new(InMemoryGateway::new()), clock.clone()).unwrap();
    (Arc::new(facility), clock)
}

/// Facility with `sessions` closed stays behind it and half the spots taken.
fn facility_with_history(sessions: usize) -> Arc<Facility> {
    let (facility, clock) = facility(40);
    for i in 0..sessions {
        let plate = format!("H-{i}");
        facility.register_entry(&plate, "red", "Opel", SpotType::Regular).unwrap();
        clock.advance(chrono::Duration::minutes(37));
        facility.register_exit(&plate).unwrap();
    }
    for i in 0..100 {
        facility
            .register_entry(&format!("P-{i}"), "blue", "Kia", SpotType::Regular)
            .unwrap();
    }
    facility
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_entry_exit_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_exit_cycle");
    for occupied in [0usize, 100, 190] {
        let (facility, clock) = facility(40);
        for i in 0..occupied {
            facility
                .register_entry(&format!("BG-{i}"), "grey", "Ford", SpotType::Regular)
                .unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(occupied), &occupied, |b, _| {
            b.iter(|| {
                let session = facility
                    .register_entry("BENCH-1", "white", "Fiat", SpotType::Regular)
                    .unwrap();
                clock.advance(chrono::Duration::minutes(5));
                black_box(facility.register_exit("BENCH-1").unwrap());
                black_box(session);
            });
        });
    }
    group.finish();
}

fn bench_snapshot_analytics(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_analytics");
    for history in [100usize, 1_000, 10_000] {
        let facility = facility_with_history(history);
        group.throughput(Throughput::Elements(history as u64));
        group.bench_with_input(BenchmarkId::from_parameter(history), &history, |b, _| {
            b.iter(|| {
                let snapshot = facility.snapshot();
                let analytics = AnalyticsAggregator::new(&snapshot);
                black_box(analytics.occupancy());
                black_box(analytics.revenue_last_hours(24));
                black_box(analytics.duration_stats(&VehicleFilter::color("red")));
            });
        });
    }
    group.finish();
}

fn bench_fee(c: &mut Criterion) {
    let fees = FeeCalculator::new(1);
    let entry = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let exit = Utc.with_ymd_and_hms(2024, 1, 3, 17, 42, 13).unwrap();
    c.bench_function("fee_calculation", |b| {
        b.iter(|| black_box(fees.fee(black_box(entry), black_box(exit), Decimal::new(450, 2))))
    });
}

fn bench_fallback_answer(c: &mut Criterion) {
    let facility = facility_with_history(1_000);
    let source: Arc<dyn SnapshotSource> = facility;
    let router = Arc::new(QueryRouter::new(source, Duration::from_millis(100)));
    c.bench_function("fallback_answer", |b| {
        b.to_async(Runtime::new().unwrap()).iter(|| {
            let router = Arc::clone(&router);
            async move { black_box(router.answer("How many red cars are parked?").await) }
        });
    });
}

criterion_group!(
    benches,
    bench_entry_exit_cycle,
    bench_snapshot_analytics,
    bench_fee,
    bench_fallback_answer
);
criterion_main!(benches);
