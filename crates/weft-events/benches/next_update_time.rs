//! Benchmarks for the periodic-event scheduling scan.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::rc::Rc;

use weft_core::EventStatus;
use weft_events::{
    next_update_time, CompositeEventCollection, Event, EventAction, PeriodicTiming, TriggerType,
};

fn composite_with(n: usize) -> CompositeEventCollection<f64> {
    let mut composite = CompositeEventCollection::new();
    for i in 0..n {
        // Spread offsets and periods so candidates rarely tie.
        let timing = PeriodicTiming::new(0.01 * i as f64, 0.1 + 0.001 * i as f64).unwrap();
        composite.add_event(Rc::new(Event::new(
            TriggerType::Periodic(timing),
            EventAction::Publish(Box::new(|_| EventStatus::succeeded())),
        )));
    }
    composite
}

fn bench_next_update_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_update_time");
    for n in [1usize, 8, 64, 512] {
        let composite = composite_with(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &composite, |b, composite| {
            b.iter(|| next_update_time(black_box(composite), black_box(123.456_f64)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_next_update_time);
criterion_main!(benches);
