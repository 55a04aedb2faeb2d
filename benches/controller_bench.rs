use criterion::{criterion_group, criterion_main, Criterion};

use rfplayer::keys::{route_key, FocusTarget};
use rfplayer::platform::InMemoryPlatform;
use rfplayer::{format_time, PlayerConfig, PlayerController};

// Run with:
//    cargo bench

fn bench_format_time(c: &mut Criterion) {
    c.bench_function("format_time", |b| {
        b.iter(|| format_time(criterion::black_box(3661.7)))
    });
}

fn bench_route_key(c: &mut Criterion) {
    c.bench_function("route_key", |b| {
        b.iter(|| route_key(criterion::black_box("ArrowRight"), FocusTarget::Document))
    });
}

/// Scrub moves re-render the time label through the notification path
fn bench_scrub(c: &mut Criterion) {
    let platform = InMemoryPlatform::new();
    let mut player =
        PlayerController::new(&platform, PlayerConfig::default()).expect("create controller");
    platform.media.load_metadata(600.0);
    player.pointer_down();

    let mut x = 0.0;
    c.bench_function("scrub_move", |b| {
        b.iter(|| {
            x = (x + 7.0) % 400.0;
            player.pointer_move(x, 400.0)
        })
    });
}

criterion_group!(benches, bench_format_time, bench_route_key, bench_scrub);
criterion_main!(benches);
