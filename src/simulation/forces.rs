//! Force / acceleration contributors for the system
//!
//! Defines the acceleration trait driven by the numerical propagation mode,
//! and direct (O(n^2)) softened Newtonian gravity over a slice of bodies

use crate::simulation::body::Body;
use crate::simulation::states::NVec3;

/// Trait for acceleration sources operating on a slice of bodies
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec3]);
}

/// Compute total accelerations for `bodies` from a single term
/// - `out[i]` is zeroed first, then filled by `term`
pub fn accumulate_accels(term: &dyn Acceleration, bodies: &[Body], out: &mut [NVec3]) {
    // Zero buffer
    for a in out.iter_mut() {
        *a = NVec3::zeros();
    }
    term.acceleration(bodies, out);
}

/// Newtonian gravity with a softening length
/// a_i += G * m_j * unit(r) / (|r|^2 + s^2)
pub struct NewtonianGravity {
    pub g: f64, // gravitational constant
    pub softening: f64, // softening length s
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, bodies: &[Body], out: &mut [NVec3]) {
        let n = bodies.len();
        if n == 0 { // No bodies, return
            return;
        }
        let soft2 = self.softening * self.softening;

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let bi = &bodies[i];
            if bi.is_destroyed() {
                continue;
            }
            let xi = bi.x; // position of body i
            let mi = bi.m; // mass of body i

            for j in (i + 1)..n {
                let bj = &bodies[j];
                if bj.is_destroyed() {
                    continue;
                }
                let xj = bj.x; // position of body j
                let mj = bj.m; // mass of body j

                // Massless pairs exert nothing on each other
                if mi <= 0.0 && mj <= 0.0 {
                    continue;
                }

                // r points from i to j: i is pulled along +r, j along -r
                let r = xj - xi;
                let r2 = r.dot(&r);

                // Coincident bodies have no direction to pull along
                if r2 == 0.0 {
                    continue;
                }
                let dist = r2.sqrt();

                // coef = G / ((|r|^2 + s^2) * |r|), so coef * r = G * unit(r) / (|r|^2 + s^2)
                let coef = self.g / ((r2 + soft2) * dist);

                if mj > 0.0 {
                    out[i] += coef * mj * r;
                }
                if mi > 0.0 {
                    out[j] -= coef * mi * r;
                }
            }
        }
    }
}
