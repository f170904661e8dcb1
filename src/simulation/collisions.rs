//! Pairwise collision detection and fully inelastic merging
//!
//! Detection is a direct O(n^2) sweep: two live bodies with positive radii
//! collide when `|x_a - x_b| <= r_a + r_b` (coincident bodies always do).
//! The heavier body survives and absorbs the other, conserving mass and
//! momentum; both participants are notified through `Body::on_impact`.

use log::info;

use crate::simulation::body::{Body, Impact};
use crate::simulation::states::NVec3;

/// Outcome of one merge
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub objects: [String; 2], // participants, in registration order
    pub survivor: String,
    pub absorbed: String,
    pub energy: f64, // 1/2 * reduced mass * |dv|^2
    pub relative_speed: f64,
}

fn overlaps(a: &Body, b: &Body) -> bool {
    let d = a.distance_to(b);
    d == 0.0 || d <= a.radius() + b.radius()
}

/// Index pairs (i < j) of overlapping bodies, in sweep order
pub fn detect_collisions(bodies: &[Body]) -> Vec<(usize, usize)> {
    let n = bodies.len();
    let mut pairs = Vec::new();
    for i in 0..n {
        let a = &bodies[i];
        if a.is_destroyed() || a.radius() <= 0.0 {
            continue;
        }
        for j in (i + 1)..n {
            let b = &bodies[j];
            if b.is_destroyed() || b.radius() <= 0.0 {
                continue;
            }
            if overlaps(a, b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Mutable access to two distinct bodies, `i < j`
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    let (left, right) = bodies.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

/// Merge bodies `i` and `j` (i < j) into the heavier one
/// The absorbed body is destroyed but left in the slice; returns its index too
pub fn merge_pair(bodies: &mut [Body], i: usize, j: usize) -> (Collision, usize) {
    let (a, b) = pair_mut(bodies, i, j);

    let dv = b.v - a.v;
    let relative_speed = dv.norm();
    let total = a.m + b.m;
    let reduced = if total > 0.0 { a.m * b.m / total } else { 0.0 };
    let energy = 0.5 * reduced * dv.norm_squared();

    // mass-weighted position and momentum-conserving velocity
    let (x, v): (NVec3, NVec3) = if total > 0.0 {
        ((a.x * a.m + b.x * b.m) / total, (a.momentum() + b.momentum()) / total)
    } else {
        ((a.x + b.x) * 0.5, (a.v + b.v) * 0.5)
    };
    let merged_radius = (a.radius.powi(3) + b.radius.powi(3)).cbrt();

    let objects = [a.name().to_string(), b.name().to_string()];

    // Ties go to the earlier registration
    let a_survives = a.m >= b.m;
    let (survivor, absorbed, absorbed_index) = if a_survives { (a, b, j) } else { (b, a, i) };

    let survivor_impact = Impact {
        body: survivor.name().to_string(),
        impactor: absorbed.name().to_string(),
        impactor_type: absorbed.type_tag().to_string(),
        impactor_mass: absorbed.m,
        energy,
        relative_speed,
    };
    let absorbed_impact = Impact {
        body: absorbed.name().to_string(),
        impactor: survivor.name().to_string(),
        impactor_type: survivor.type_tag().to_string(),
        impactor_mass: survivor.m,
        energy,
        relative_speed,
    };
    survivor.on_impact(&survivor_impact);
    absorbed.on_impact(&absorbed_impact);

    survivor.set_mass(total);
    let radius = survivor.radius.max(merged_radius);
    survivor.set_radius(radius);
    survivor.set_position(x);
    survivor.set_velocity(v);

    let reason = format!("absorbed by {}", survivor.name());
    absorbed.destroy(&reason);

    info!(
        "collision: {} absorbed {} ({:.3e} J, {:.3} m/s)",
        survivor.name(),
        absorbed.name(),
        energy,
        relative_speed
    );

    let collision = Collision {
        objects,
        survivor: survivor.name().to_string(),
        absorbed: absorbed.name().to_string(),
        energy,
        relative_speed,
    };
    (collision, absorbed_index)
}

/// Detect and merge every overlapping pair, removing absorbed bodies
/// Returns the merges in resolution order and the removed bodies
pub fn resolve_collisions(bodies: &mut Vec<Body>) -> (Vec<Collision>, Vec<Body>) {
    let pairs = detect_collisions(bodies);
    if pairs.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut absorbed = vec![false; bodies.len()];
    let mut collisions = Vec::with_capacity(pairs.len());
    for (i, j) in pairs {
        // a body absorbed earlier in this pass no longer exists
        if absorbed[i] || absorbed[j] {
            continue;
        }
        // an earlier merge may have moved or grown either body
        if !overlaps(&bodies[i], &bodies[j]) {
            continue;
        }
        let (collision, gone) = merge_pair(bodies, i, j);
        absorbed[gone] = true;
        collisions.push(collision);
    }

    // remove back to front so earlier indices stay valid
    let mut removed = Vec::new();
    for idx in (0..bodies.len()).rev() {
        if absorbed[idx] {
            removed.push(bodies.remove(idx));
        }
    }
    removed.reverse();
    (collisions, removed)
}
