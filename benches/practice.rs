//! Criterion benchmarks for the practice-phase difficulty controller.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vigil::practice::{DifficultyController, PracticeConfig};

/// Benchmark one record+assess step against histories of varying length.
fn bench_assess_history_lengths(c: &mut Criterion) {
    let mut group = c.benchmark_group("assess_history");

    for trials in [100usize, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*trials as u64));

        group.bench_with_input(BenchmarkId::new("window_20", trials), trials, |b, &trials| {
            let mut ctl = DifficultyController::new(PracticeConfig::default());
            for i in 0..trials {
                ctl.record_trial_outcome(i % 5 != 0);
            }

            b.iter(|| {
                ctl.record_trial_outcome(true);
                let trial = ctl.outcomes_recorded();
                black_box(ctl.maybe_assess(trial).ok())
            });
        });
    }

    group.finish();
}

/// Benchmark a full simulated practice phase from a cold start.
fn bench_full_phase(c: &mut Criterion) {
    c.bench_function("full_phase_to_stable", |b| {
        b.iter(|| {
            let mut ctl = DifficultyController::new(PracticeConfig::default());
            // 16/20 per window: stabilizes at the second assessment.
            for trial in 1..=30 {
                ctl.record_trial_outcome(trial % 5 != 0);
                let _ = ctl.maybe_assess(trial);
            }
            black_box(ctl.is_stable())
        });
    });
}

criterion_group!(benches, bench_assess_history_lengths, bench_full_phase);
criterion_main!(benches);
