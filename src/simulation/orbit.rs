//! Keplerian orbit evaluation for orbit-bearing bodies.
//!
//! An [`Orbit`] is always relative to its focus body's *current* state: each
//! evaluation places the satellite at `focus + R * perifocal_offset`, so a
//! moving focus drags its satellites along. For nested hierarchies (moon →
//! planet → star) this is an approximate, non-inertial composition.
//!
//! The perifocal offset is rotated into the inertial frame by
//! `R = Rz(node) * Rx(inclination) * Rz(argument_of_periapsis)`.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use log::warn;
use nalgebra::{Rotation3, Vector3};

use super::body::{Body, BodyKind};
use super::states::NVec3;

/// Eccentricity is clamped below 1 so every orbit stays bound
pub const MAX_ECCENTRICITY: f64 = 0.999999;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    pub semi_major_axis: f64, // m
    pub period: f64, // s
    pub eccentricity: f64,
    pub phase: f64, // rad
    pub inclination: f64, // rad
    pub ascending_node: f64, // rad
    pub argument_of_periapsis: f64, // rad
}

impl OrbitalElements {
    /// Circular, equatorial orbit starting at phase 0
    pub fn new(semi_major_axis: f64, period: f64) -> Self {
        Self {
            semi_major_axis,
            period,
            eccentricity: 0.0,
            phase: 0.0,
            inclination: 0.0,
            ascending_node: 0.0,
            argument_of_periapsis: 0.0,
        }
    }

    pub fn with_eccentricity(mut self, eccentricity: f64) -> Self {
        self.eccentricity = eccentricity;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_inclination(mut self, inclination: f64) -> Self {
        self.inclination = inclination;
        self
    }

    pub fn with_ascending_node(mut self, ascending_node: f64) -> Self {
        self.ascending_node = ascending_node;
        self
    }

    pub fn with_argument_of_periapsis(mut self, argument_of_periapsis: f64) -> Self {
        self.argument_of_periapsis = argument_of_periapsis;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Orbit {
    focus: String, // name of the focus body, resolved through the owning system
    elements: OrbitalElements,
}

impl Orbit {
    /// Validate and normalize elements; `None` if axis or period is not positive
    pub fn new(focus: &str, mut elements: OrbitalElements) -> Option<Self> {
        if !(elements.semi_major_axis > 0.0) {
            warn!("Semi-major axis must be positive (got {})", elements.semi_major_axis);
            return None;
        }
        if !(elements.period > 0.0) {
            warn!("Orbital period must be positive (got {})", elements.period);
            return None;
        }
        elements.eccentricity = elements.eccentricity.clamp(0.0, MAX_ECCENTRICITY);
        Some(Self {
            focus: focus.to_string(),
            elements,
        })
    }

    pub fn focus(&self) -> &str {
        &self.focus
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    pub fn phase(&self) -> f64 {
        self.elements.phase
    }

    /// Distance from the focus at the current phase (polar conic equation)
    pub fn radius(&self) -> f64 {
        let e = self.elements.eccentricity;
        let a = self.elements.semi_major_axis;
        a * (1.0 - e * e) / (1.0 + e * self.elements.phase.cos())
    }

    fn rotation(&self) -> Rotation3<f64> {
        let el = &self.elements;
        Rotation3::from_axis_angle(&Vector3::z_axis(), el.ascending_node)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), el.inclination)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), el.argument_of_periapsis)
    }

    /// Advance the phase by `dt` and return the inertial (position, velocity)
    pub fn evaluate(&mut self, dt: f64, focus_x: &NVec3, focus_v: &NVec3) -> (NVec3, NVec3) {
        let period = self.elements.period;
        if dt > 0.0 {
            self.elements.phase += TAU * (dt / period);
        }
        self.elements.phase = self.elements.phase.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU
        if self.elements.phase >= TAU {
            self.elements.phase = 0.0;
        }

        let phase = self.elements.phase;
        let r = self.radius();
        let omega = TAU / period; // angular rate

        let offset = NVec3::new(r * phase.cos(), r * phase.sin(), 0.0);
        let rate = NVec3::new(-r * omega * phase.sin(), r * omega * phase.cos(), 0.0);

        let rot = self.rotation();
        (focus_x + rot * offset, focus_v + rot * rate)
    }
}

/// Orbit-bearing body data
#[derive(Debug, Clone, Default)]
pub struct Planet {
    atmosphere: BTreeMap<String, f64>, // gas -> fraction
    habitable: bool,
    orbit: Option<Orbit>,
}

impl Planet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atmosphere(&self) -> &BTreeMap<String, f64> {
        &self.atmosphere
    }

    pub fn set_atmosphere(&mut self, composition: BTreeMap<String, f64>) {
        self.atmosphere = composition;
    }

    pub fn is_habitable(&self) -> bool {
        self.habitable
    }

    pub fn set_habitable(&mut self, habitable: bool) {
        self.habitable = habitable;
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        self.orbit.as_ref()
    }

    pub(crate) fn orbit_mut(&mut self) -> Option<&mut Orbit> {
        self.orbit.as_mut()
    }

    pub(crate) fn set_orbit(&mut self, orbit: Option<Orbit>) {
        self.orbit = orbit;
    }
}

impl Body {
    pub fn new_planet(name: &str, mass: f64, radius: f64) -> Self {
        Body::with_kind(name, mass, radius, BodyKind::Planet(Planet::new()))
    }
}
