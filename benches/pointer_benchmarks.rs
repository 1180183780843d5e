//! Benchmarks for the per-frame pointer control path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hand_pointer::{
    calibration::{ActiveZoneMapper, CornerMapper, ScreenMapper},
    constants::NUM_HAND_LANDMARKS,
    gesture::GestureClassifier,
    landmarks::LandmarkFrame,
    pointer::{PointerController, PointerSettings, PointerState},
    smoother::MotionSmoother,
};
use nalgebra::Point2;
use std::time::{Duration, Instant};

/// Jittery hand landmarks drifting across the frame
fn landmark_sequence(len: usize) -> Vec<LandmarkFrame> {
    (0..len)
        .filter_map(|i| {
            let t = i as f64 * 0.05;
            let points: Vec<Point2<f64>> = (0..NUM_HAND_LANDMARKS)
                .map(|j| {
                    let x = 0.5 + 0.2 * t.sin() + 0.01 * j as f64 + 0.005 * rand::random::<f64>();
                    let y = 0.5 + 0.2 * t.cos() - 0.01 * j as f64 + 0.005 * rand::random::<f64>();
                    Point2::new(x, y)
                })
                .collect();
            LandmarkFrame::new(&points, 640, 480).ok()
        })
        .collect()
}

fn benchmark_classifier(c: &mut Criterion) {
    let frames = landmark_sequence(1);
    let classifier = GestureClassifier::new(40.0);

    c.bench_function("classify_single_frame", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&frames[0]))));
    });
}

fn benchmark_mappers(c: &mut Criterion) {
    let mut group = c.benchmark_group("mappers");
    let point = Point2::new(0.42, 0.58);

    let mappers: Vec<(&str, Box<dyn ScreenMapper>)> = vec![
        ("active_zone", Box::new(ActiveZoneMapper::new(100.0, 1920, 1080))),
    ];
    let mappers = mappers.into_iter().chain(
        CornerMapper::new(Point2::new(0.2, 0.2), Point2::new(0.8, 0.8), 1920, 1080)
            .ok()
            .map(|m| ("corners", Box::new(m) as Box<dyn ScreenMapper>)),
    );

    for (name, mapper) in mappers {
        group.bench_with_input(BenchmarkId::new("map", name), &point, |b, &p| {
            b.iter(|| black_box(mapper.map(black_box(p), 640, 480)));
        });
    }

    group.finish();
}

fn benchmark_controller(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller");
    let frames = landmark_sequence(100);
    let controller = PointerController::new(
        GestureClassifier::new(40.0),
        Box::new(ActiveZoneMapper::new(100.0, 1920, 1080)),
        MotionSmoother::new(0.2),
        PointerSettings::default(),
    );

    group.bench_with_input(BenchmarkId::new("sequence", frames.len()), &frames, |b, frames| {
        b.iter(|| {
            let mut state = PointerState::new(1920, 1080);
            let mut now = Instant::now();
            for frame in frames {
                now += Duration::from_millis(33);
                black_box(controller.update(&mut state, Some(frame), now));
            }
        });
    });

    group.bench_function("no_hand", |b| {
        let mut state = PointerState::new(1920, 1080);
        let now = Instant::now();
        b.iter(|| black_box(controller.update(&mut state, None, black_box(now))));
    });

    group.finish();
}

criterion_group!(benches, benchmark_classifier, benchmark_mappers, benchmark_controller);
criterion_main!(benches);
