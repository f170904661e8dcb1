//! Core state types shared across the simulation.
//!
//! Defines the 3D vector alias used everywhere, plus the plain-data views
//! handed out to drivers:
//! - `BodySnapshot` – per-body reporting record (type, mass, radius, x, v, age)
//! - `EnergyReport` – kinetic / potential / total energy of a system

use nalgebra::Vector3;
use serde::Serialize;

pub type NVec3 = Vector3<f64>;

/// Gravitational constant in SI units (m^3 kg^-1 s^-2)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430E-11;

/// Reporting view of a single body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySnapshot {
    #[serde(rename = "type")]
    pub kind: String, // type tag
    pub mass: f64, // mass
    pub radius: f64, // radius
    pub position: [f64; 3], // position
    pub velocity: [f64; 3], // velocity
    pub age: f64, // age in seconds
}

/// Energy bookkeeping for a whole system
/// `total` should stay roughly constant under numerical gravity when nothing collides
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnergyReport {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

/// Convert a vector into a plain array for serialization
pub(crate) fn to_array(v: &NVec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}
