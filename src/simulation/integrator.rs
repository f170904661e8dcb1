//! Fixed-step propagation of a set of bodies
//!
//! Two interchangeable strategies, selected by `PropagationMode`:
//! - numerical: semi-implicit Euler (kick with softened gravity, then each body's own tick)
//! - analytic: orbit-bearing bodies are evaluated in closed form, everything else ticks

use log::debug;

use super::body::{Body, Milestone};
use super::forces::{accumulate_accels, NewtonianGravity};
use super::states::NVec3;

/// Advance every live body by `dt` under pairwise gravity
/// Returns the milestones (stage changes, arrivals) reached during the step
pub fn numerical_step(bodies: &mut [Body], gravity: &NewtonianGravity, dt: f64) -> Vec<(String, Milestone)> {
    let n = bodies.len();
    if n == 0 || dt <= 0.0 { // nothing to do
        return Vec::new();
    }

    // a_n from x_n
    let mut accels = vec![NVec3::zeros(); n];
    accumulate_accels(gravity, bodies, &mut accels);

    // Kick: v_n+1 = v_n + dt * a_n (scripted bodies follow their own path)
    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        if !b.is_scripted() {
            b.apply_acceleration(a, dt);
        }
    }

    // Drift: each body advances with its own kind-specific tick
    bodies
        .iter_mut()
        .filter_map(|b| b.tick(dt).map(|m| (b.name().to_string(), m)))
        .collect()
}

/// Advance every live body by `dt` using closed-form orbits where available
/// Bodies are visited in order, so a satellite follows its focus's state at that moment
pub fn analytic_step(bodies: &mut [Body], dt: f64) -> Vec<(String, Milestone)> {
    let mut milestones = Vec::new();
    if dt <= 0.0 {
        return milestones;
    }

    for i in 0..bodies.len() {
        if bodies[i].is_destroyed() {
            continue;
        }

        // Resolve the focus through the arena
        let focus_state = bodies[i].orbit().and_then(|orbit| {
            let found = bodies
                .iter()
                .find(|b| b.name() == orbit.focus() && !b.is_destroyed())
                .map(|f| (*f.position(), *f.velocity()));
            if found.is_none() {
                debug!("{}: focus {} is gone, drifting instead", bodies[i].name(), orbit.focus());
            }
            found
        });

        let body = &mut bodies[i];
        if let Some((fx, fv)) = focus_state {
            if body.propagate_orbit(dt, &fx, &fv) {
                continue;
            }
        }
        if let Some(m) = body.tick(dt) {
            milestones.push((body.name().to_string(), m));
        }
    }
    milestones
}
