//! Timing helpers for the O(n^2) passes.
//!
//! Bodies are laid out deterministically (no rand needed) so runs are
//! comparable. Each helper returns one sample per `n`; the CLI prints them
//! as CSV so they can be pasted straight into a spreadsheet.

use std::time::Instant;

use serde::Serialize;

use crate::simulation::body::Body;
use crate::simulation::collisions::detect_collisions;
use crate::simulation::forces::{Acceleration, NewtonianGravity};
use crate::simulation::params::{PropagationMode, SystemParameters};
use crate::simulation::states::NVec3;
use crate::simulation::system::System;

#[derive(Debug, Clone, Serialize)]
pub struct BenchSample {
    pub n: usize,
    pub gravity_ms: f64, // one direct force evaluation
    pub collisions_ms: f64, // one collision sweep
}

#[derive(Debug, Clone, Serialize)]
pub struct TickSample {
    pub n: usize,
    pub steps: usize,
    pub tick_ms: f64, // mean wall time of one numerical tick
}

/// Helper to build `n` unit-mass bodies on a deterministic pseudo-random cloud
fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(&format!("b{i}"), 1.0, 1.0e-4).with_position(x)
        })
        .collect()
}

/// Time one gravity evaluation and one collision sweep for each `n`
pub fn bench_gravity(ns: &[usize]) -> Vec<BenchSample> {
    let mut samples = Vec::with_capacity(ns.len());

    for &n in ns {
        let bodies = make_bodies(n);
        let mut out = vec![NVec3::zeros(); n];

        let gravity = NewtonianGravity {
            g: 0.1,
            softening: 1e-2,
        };

        // Warm up
        gravity.acceleration(&bodies, &mut out);

        let t0 = Instant::now();
        gravity.acceleration(&bodies, &mut out);
        let gravity_ms = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        let _ = detect_collisions(&bodies);
        let collisions_ms = t1.elapsed().as_secs_f64() * 1000.0;

        samples.push(BenchSample {
            n,
            gravity_ms,
            collisions_ms,
        });
    }
    samples
}

/// Time full numerical ticks (gravity, integration, collisions) for each `n`
pub fn bench_tick(ns: &[usize], steps: usize) -> Vec<TickSample> {
    let steps = steps.max(1);
    let mut samples = Vec::with_capacity(ns.len());

    for &n in ns {
        let params = SystemParameters {
            time_step: 0.001,
            propagation: PropagationMode::Numerical,
            softening: 1e-2,
            g: 0.1,
            event_capacity: 16,
        };
        let mut system = System::with_parameters("bench", params);
        for body in make_bodies(n) {
            system.add_object(body);
        }

        // Warm-up one step
        system.tick(None);

        let t0 = Instant::now();
        system.advance(steps, None);
        let tick_ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        samples.push(TickSample { n, steps, tick_ms });
    }
    samples
}
