use criterion::{Criterion, black_box, criterion_group, criterion_main};
use heading_fusion::{
    GyroSample, HeadingEngine, HeadingService, SensorSuite, Timestamp, circular_blend,
    compass::tilt_compensated_heading, shortest_delta,
};
use nalgebra::Vector3;
use rand::prelude::*;
use rand_pcg::Pcg64;
use std::f32::consts::PI;

// Pre-generated sensor data to keep RNG cost out of the measured loops
struct PreGeneratedData {
    samples: Vec<(Vector3<f32>, Vector3<f32>, f32)>,
    index: usize,
}

impl PreGeneratedData {
    fn new(count: usize, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut samples = Vec::with_capacity(count);

        for i in 0..count {
            let time = i as f32 * 0.02; // 50 Hz gyroscope rate
            let heading = 0.3 * time * 2.0 * PI;

            let accelerometer = Vector3::new(
                rng.random_range(-0.02..0.02),
                rng.random_range(-0.02..0.02),
                1.0 + rng.random_range(-0.02..0.02),
            );

            // Horizontal field rotating with the device, plus a downward dip
            let magnetometer = Vector3::new(
                -30.0 * heading.sin() + rng.random_range(-0.5..0.5),
                30.0 * heading.cos() + rng.random_range(-0.5..0.5),
                -24.0 + rng.random_range(-0.5..0.5),
            );

            let rate_z = 0.3 * 2.0 * PI + rng.random_range(-0.01..0.01);

            samples.push((accelerometer, magnetometer, rate_z));
        }

        Self { samples, index: 0 }
    }

    fn next(&mut self) -> (Vector3<f32>, Vector3<f32>, f32) {
        let sample = self.samples[self.index];
        self.index = (self.index + 1) % self.samples.len();
        sample
    }
}

/// Benchmark the magnetometer path with tilt compensation and smoothing
fn bench_magnetometer_update(c: &mut Criterion) {
    let mut engine = HeadingEngine::new();
    let mut data = PreGeneratedData::new(1_000, 1);
    let (accelerometer, _, _) = data.next();
    engine.on_accelerometer(accelerometer).unwrap();

    c.bench_function("engine_on_magnetometer", |b| {
        b.iter(|| {
            let (_, magnetometer, _) = data.next();
            engine.on_magnetometer(black_box(magnetometer))
        })
    });
}

/// Benchmark the gyroscope path with complementary fusion
fn bench_gyroscope_update(c: &mut Criterion) {
    let mut engine = HeadingEngine::new();
    let mut data = PreGeneratedData::new(1_000, 2);
    let mut millis = 0u64;

    c.bench_function("engine_on_gyroscope", |b| {
        b.iter(|| {
            let (_, _, rate_z) = data.next();
            millis += 20;
            engine.on_gyroscope(black_box(GyroSample::vertical(
                rate_z,
                Timestamp::from_millis(millis),
            )))
        })
    });
}

/// Benchmark one second of mixed sensor traffic at the default rates
fn bench_one_second_of_samples(c: &mut Criterion) {
    let mut data = PreGeneratedData::new(1_000, 3);

    c.bench_function("engine_one_second", |b| {
        b.iter(|| {
            let mut engine = HeadingEngine::new();
            for step in 0..50u64 {
                let (accelerometer, magnetometer, rate_z) = data.next();
                if step % 5 == 0 {
                    engine.on_accelerometer(accelerometer).unwrap();
                    engine.on_magnetometer(magnetometer).unwrap();
                }
                engine
                    .on_gyroscope(GyroSample::vertical(rate_z, Timestamp::from_millis(step * 20)))
                    .unwrap();
            }
            black_box(engine.snapshot())
        })
    });
}

/// Benchmark the stream and lock overhead added by the service
fn bench_service_dispatch(c: &mut Criterion) {
    let sensors = SensorSuite::new();
    let service = HeadingService::new();
    let _subscriptions = service.attach_all(&sensors);
    let mut data = PreGeneratedData::new(1_000, 4);
    sensors.accelerometer.emit(Vector3::new(0.0, 0.0, 1.0));

    c.bench_function("service_magnetometer_emit", |b| {
        b.iter(|| {
            let (_, magnetometer, _) = data.next();
            sensors.magnetometer.emit(black_box(magnetometer));
        })
    });
}

/// Benchmark the raw tilt-compensated heading calculation
fn bench_tilt_compensation(c: &mut Criterion) {
    let gravity = Vector3::new(0.1, -0.2, 0.97);
    let magnetometer = Vector3::new(-12.0, 25.0, -30.0);

    c.bench_function("tilt_compensated_heading", |b| {
        b.iter(|| tilt_compensated_heading(black_box(gravity), black_box(magnetometer)))
    });
}

/// Benchmark the circular helpers
fn bench_circular_math(c: &mut Criterion) {
    c.bench_function("shortest_delta", |b| {
        b.iter(|| shortest_delta(black_box(359.0), black_box(1.0)))
    });

    c.bench_function("circular_blend", |b| {
        b.iter(|| circular_blend(black_box(359.0), black_box(1.0), black_box(0.15)))
    });
}

criterion_group!(
    benches,
    bench_magnetometer_update,
    bench_gyroscope_update,
    bench_one_second_of_samples,
    bench_service_dispatch,
    bench_tilt_compensation,
    bench_circular_math
);

criterion_main!(benches);
