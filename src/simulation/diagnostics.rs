//! Aggregate diagnostics over a set of bodies
//!
//! Center of mass, total momentum, and kinetic + potential energy. The energy
//! report is what validates the numerical integrator: absent collisions its
//! `total` should be approximately conserved.

use crate::simulation::body::Body;
use crate::simulation::states::{EnergyReport, NVec3};

fn live(bodies: &[Body]) -> impl Iterator<Item = &Body> {
    bodies.iter().filter(|b| !b.is_destroyed())
}

pub fn total_mass(bodies: &[Body]) -> f64 {
    live(bodies).map(|b| b.mass()).sum()
}

/// Mass-weighted mean position; zero when there is no mass
pub fn center_of_mass(bodies: &[Body]) -> NVec3 {
    let total = total_mass(bodies);
    if total <= 0.0 {
        return NVec3::zeros();
    }
    let weighted: NVec3 = live(bodies).map(|b| b.position() * b.mass()).sum();
    weighted / total
}

pub fn total_momentum(bodies: &[Body]) -> NVec3 {
    live(bodies).map(|b| b.momentum()).sum()
}

/// Velocity of the center of mass; zero when there is no mass
pub fn center_of_mass_velocity(bodies: &[Body]) -> NVec3 {
    let total = total_mass(bodies);
    if total <= 0.0 {
        return NVec3::zeros();
    }
    total_momentum(bodies) / total
}

/// Kinetic energy plus pairwise potential -G * mA * mB / d
/// Pairs with a non-positive distance or mass are skipped
pub fn total_energy(bodies: &[Body], g: f64) -> EnergyReport {
    let kinetic: f64 = live(bodies).map(|b| b.kinetic_energy()).sum();

    let mut potential = 0.0;
    let n = bodies.len();
    for i in 0..n {
        let a = &bodies[i];
        if a.is_destroyed() || a.mass() <= 0.0 {
            continue;
        }
        for b in &bodies[(i + 1)..n] {
            if b.is_destroyed() || b.mass() <= 0.0 {
                continue;
            }
            let d = a.distance_to(b);
            if d <= 0.0 {
                continue;
            }
            potential -= g * a.mass() * b.mass() / d;
        }
    }

    EnergyReport {
        kinetic,
        potential,
        total: kinetic + potential,
    }
}
