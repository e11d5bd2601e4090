//! Criterion benchmarks for the effect engine's hot paths
//!
//! - Spawner: decoration generation and CSS rendering
//! - Scheduler: timer churn on the virtual clock
//! - Engine: a minute of simulated page time with input

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heartfelt::config::GreetingConfig;
use heartfelt::dispatch::{Control, Event};
use heartfelt::effects::EffectSpawner;
use heartfelt::media::HeadlessPlayer;
use heartfelt::scheduler::Scheduler;
use heartfelt::{Greeting, MemorySurface};

fn spawner() -> EffectSpawner {
    let config = GreetingConfig::default();
    EffectSpawner::new(config.hearts, config.confetti, config.modal, Some(1))
}

// =============================================================================
// Spawner Benchmarks
// =============================================================================

fn bench_spawner(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawner");

    let mut s = spawner();
    group.bench_function("heart", |b| b.iter(|| black_box(s.heart())));
    group.bench_function("confetti_piece", |b| b.iter(|| black_box(s.confetti_piece())));

    let heart = s.heart();
    group.bench_function("css_declarations", |b| b.iter(|| black_box(&heart).css_declarations()));

    group.bench_function("confetti_burst", |b| {
        b.iter(|| {
            let mut surface = MemorySurface::new(800.0);
            s.spawn_confetti(&mut surface)
        })
    });

    group.finish();
}

// =============================================================================
// Scheduler Benchmarks
// =============================================================================

fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");

    for count in [10u64, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::new("timeouts", count), count, |b, count| {
            b.iter(|| {
                let mut scheduler: Scheduler<u64> = Scheduler::new();
                for i in 0..*count {
                    scheduler.set_timeout((i * 37) % 5000, i);
                }
                let mut fired = 0;
                while scheduler.pop_due(5000).is_some() {
                    fired += 1;
                }
                fired
            })
        });
    }

    group.finish();
}

// =============================================================================
// Engine Benchmarks
// =============================================================================

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    group.bench_function("one_minute_idle", |b| {
        b.iter(|| {
            let mut page = Greeting::new(GreetingConfig::default(), MemorySurface::default(), HeadlessPlayer::default());
            page.start();
            for _ in 0..1200 {
                page.advance(50);
            }
            page.snapshot()
        })
    });

    group.bench_function("one_minute_with_input", |b| {
        b.iter(|| {
            let mut page = Greeting::new(GreetingConfig::default(), MemorySurface::default(), HeadlessPlayer::default());
            page.start();
            page.player_mut().signal_ready();
            for tick in 0..1200u32 {
                if tick % 100 == 0 {
                    page.dispatch(Event::click_nth(Control::SocialButton, 0));
                }
                page.advance(50);
            }
            page.snapshot()
        })
    });

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_spawner, bench_scheduler, bench_engine);

criterion_main!(benches);
