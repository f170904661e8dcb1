//! Physical bodies owned by a [`System`](crate::simulation::system::System).
//!
//! A [`Body`] carries the state every simulated object shares (mass, radius,
//! position, velocity, age, destroyed flag) together with a [`BodyKind`] that
//! selects kind-specific behavior:
//! - `Generic`  – plain forward-Euler drift
//! - `Star`     – drift plus stellar evolution
//! - `Planet`   – drift, or closed-form orbit evaluation in analytic mode
//! - `Transit`  – scripted interpolation between two fixed points
//!
//! Higher layers hook into collisions by installing an [`ImpactHandler`].

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use super::orbit::{Orbit, OrbitalElements, Planet};
use super::star::{Star, StellarStage};
use super::states::{to_array, BodySnapshot, NVec3};
use super::transit::TransitObject;

/// Closed set of body variants
#[derive(Debug, Clone)]
pub enum BodyKind {
    Generic,
    Star(Star),
    Planet(Planet),
    Transit(TransitObject),
}

impl BodyKind {
    /// Default type tag for this variant
    pub fn label(&self) -> &'static str {
        match self {
            BodyKind::Generic => "Body",
            BodyKind::Star(_) => "Star",
            BodyKind::Planet(_) => "Planet",
            BodyKind::Transit(_) => "TransitObject",
        }
    }
}

/// Collision report delivered to both participants
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Impact {
    pub body: String, // body receiving the notification
    pub impactor: String, // the other participant
    pub impactor_type: String,
    pub impactor_mass: f64,
    pub energy: f64, // joules, from the reduced mass
    pub relative_speed: f64, // m/s
}

/// Extension point invoked on both bodies of a collision
pub trait ImpactHandler {
    fn on_impact(&mut self, impact: &Impact);
}

/// Something noteworthy that happened to a body during its own tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    StageChanged { from: StellarStage, to: StellarStage },
    Arrived,
}

pub struct Body {
    name: String,
    type_tag: String,
    pub(crate) m: f64, // mass
    pub(crate) radius: f64, // radius (collision size)
    pub(crate) x: NVec3, // position
    pub(crate) v: NVec3, // velocity
    pub(crate) age: f64, // seconds
    destroyed: bool,
    destruction_reason: Option<String>,
    metadata: BTreeMap<String, Value>,
    parent: Option<String>, // name of the owning system
    pub(crate) kind: BodyKind,
    impact_handler: Option<Box<dyn ImpactHandler + Send + Sync>>,
}

impl Body {
    /// Create a generic body at rest at the origin
    pub fn new(name: &str, mass: f64, radius: f64) -> Self {
        Self::with_kind(name, mass, radius, BodyKind::Generic)
    }

    pub(crate) fn with_kind(name: &str, mass: f64, radius: f64, kind: BodyKind) -> Self {
        Self {
            name: name.trim().to_string(),
            type_tag: kind.label().to_string(),
            m: mass.max(0.0),
            radius: radius.max(0.0),
            x: NVec3::zeros(),
            v: NVec3::zeros(),
            age: 0.0,
            destroyed: false,
            destruction_reason: None,
            metadata: BTreeMap::new(),
            parent: None,
            kind,
            impact_handler: None,
        }
    }

    pub fn with_position(mut self, x: NVec3) -> Self {
        self.x = x;
        self
    }

    pub fn with_velocity(mut self, v: NVec3) -> Self {
        self.v = v;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Override the type tag; empty tags are ignored
    pub fn set_type_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() {
            self.type_tag = tag.to_string();
        }
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    pub fn as_star(&self) -> Option<&Star> {
        match &self.kind {
            BodyKind::Star(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_star_mut(&mut self) -> Option<&mut Star> {
        match &mut self.kind {
            BodyKind::Star(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_planet(&self) -> Option<&Planet> {
        match &self.kind {
            BodyKind::Planet(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_planet_mut(&mut self) -> Option<&mut Planet> {
        match &mut self.kind {
            BodyKind::Planet(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_transit(&self) -> Option<&TransitObject> {
        match &self.kind {
            BodyKind::Transit(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_transit_mut(&mut self) -> Option<&mut TransitObject> {
        match &mut self.kind {
            BodyKind::Transit(t) => Some(t),
            _ => None,
        }
    }

    /// Scripted bodies move along a fixed path and ignore gravity kicks
    pub fn is_scripted(&self) -> bool {
        matches!(self.kind, BodyKind::Transit(_))
    }

    pub fn mass(&self) -> f64 {
        self.m
    }

    /// Set mass (clamped to >= 0); stars re-derive their lifetime
    pub fn set_mass(&mut self, mass: f64) {
        self.m = mass.max(0.0);
        if let BodyKind::Star(star) = &mut self.kind {
            star.refresh_lifetime(self.m);
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    pub fn position(&self) -> &NVec3 {
        &self.x
    }

    pub fn set_position(&mut self, x: NVec3) {
        self.x = x;
    }

    pub fn translate(&mut self, offset: &NVec3) {
        self.x += offset;
    }

    pub fn velocity(&self) -> &NVec3 {
        &self.v
    }

    pub fn set_velocity(&mut self, v: NVec3) {
        self.v = v;
    }

    pub fn speed(&self) -> f64 {
        self.v.norm()
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn reset_age(&mut self) {
        self.age = 0.0;
    }

    /// Kick: v += a * dt
    pub fn apply_acceleration(&mut self, a: &NVec3, dt: f64) {
        if self.destroyed || dt <= 0.0 {
            return;
        }
        self.v += a * dt;
    }

    /// Forward-Euler drift: x += v * dt, age += dt
    pub fn drift(&mut self, dt: f64) {
        if self.destroyed || dt <= 0.0 {
            return;
        }
        self.x += self.v * dt;
        self.age += dt;
    }

    /// Advance this body on its own for `dt`, dispatching on kind
    pub fn tick(&mut self, dt: f64) -> Option<Milestone> {
        if self.destroyed || dt <= 0.0 {
            return None;
        }
        match self.kind {
            BodyKind::Star(_) => {
                self.drift(dt);
                self.evolve_star()
            }
            BodyKind::Transit(_) => self.advance_transit(dt).then_some(Milestone::Arrived),
            BodyKind::Generic | BodyKind::Planet(_) => {
                self.drift(dt);
                None
            }
        }
    }

    fn evolve_star(&mut self) -> Option<Milestone> {
        let BodyKind::Star(star) = &mut self.kind else {
            return None;
        };
        let (from, to) = star.update_stage(self.age)?;
        info!("{} transitioned to {} phase", self.name, to);
        Some(Milestone::StageChanged { from, to })
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        self.as_planet().and_then(|p| p.orbit())
    }

    /// Put this body on an orbit around `focus`
    /// Returns `false` (and leaves the body untouched) for non-planets or bad elements
    pub fn set_orbit(&mut self, focus: &Body, elements: OrbitalElements) -> bool {
        self.assign_orbit(focus.name(), focus.x, focus.v, elements)
    }

    pub(crate) fn assign_orbit(
        &mut self,
        focus: &str,
        focus_x: NVec3,
        focus_v: NVec3,
        elements: OrbitalElements,
    ) -> bool {
        let BodyKind::Planet(planet) = &mut self.kind else {
            warn!("{} is a {}, only planets can carry an orbit", self.name, self.type_tag);
            return false;
        };
        let Some(mut orbit) = Orbit::new(focus, elements) else {
            return false;
        };
        let (x, v) = orbit.evaluate(0.0, &focus_x, &focus_v);
        planet.set_orbit(Some(orbit));
        self.x = x;
        self.v = v;
        true
    }

    pub fn clear_orbit(&mut self) {
        if let Some(planet) = self.as_planet_mut() {
            planet.set_orbit(None);
        }
    }

    /// Closed-form orbit step relative to the focus's current state
    /// Returns `false` if this body has no orbit to follow
    pub(crate) fn propagate_orbit(&mut self, dt: f64, focus_x: &NVec3, focus_v: &NVec3) -> bool {
        if self.destroyed || dt <= 0.0 {
            return false;
        }
        let BodyKind::Planet(planet) = &mut self.kind else {
            return false;
        };
        let Some(orbit) = planet.orbit_mut() else {
            return false;
        };
        let (x, v) = orbit.evaluate(dt, focus_x, focus_v);
        self.x = x;
        self.v = v;
        self.age += dt;
        true
    }

    pub fn kinetic_energy(&self) -> f64 {
        if self.m <= 0.0 {
            return 0.0;
        }
        0.5 * self.m * self.v.norm_squared()
    }

    pub fn momentum(&self) -> NVec3 {
        self.v * self.m
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.x - other.x).norm()
    }

    /// G * m for the given gravitational constant
    pub fn gravitational_parameter(&self, g: f64) -> f64 {
        g * self.m
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn destruction_reason(&self) -> Option<&str> {
        self.destruction_reason.as_deref()
    }

    /// Permanently freeze this body; only the first call has an effect
    pub fn destroy(&mut self, reason: &str) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.destruction_reason = Some(reason.to_string());
        info!("{} destroyed: {}", self.name, reason);
        true
    }

    pub fn attach_to_system(&mut self, system: Option<&str>) {
        self.parent = system.map(str::to_string);
        if let Some(name) = system {
            debug!("{} now belongs to system {}", self.name, name);
        }
    }

    pub fn parent_system(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_bound_to_system(&self) -> bool {
        self.parent.is_some()
    }

    pub fn set_impact_handler(&mut self, handler: impl ImpactHandler + Send + Sync + 'static) {
        self.impact_handler = Some(Box::new(handler));
    }

    pub fn on_impact(&mut self, impact: &Impact) {
        debug!(
            "{} hit by {} ({:.3e} J at {:.3} m/s)",
            self.name, impact.impactor, impact.energy, impact.relative_speed
        );
        if let Some(handler) = self.impact_handler.as_mut() {
            handler.on_impact(impact);
        }
    }

    pub fn set_metadata(&mut self, key: &str, value: Value) {
        if key.is_empty() {
            return;
        }
        self.metadata.insert(key.to_string(), value);
    }

    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn all_metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            kind: self.type_tag.clone(),
            mass: self.m,
            radius: self.radius,
            position: to_array(&self.x),
            velocity: to_array(&self.v),
            age: self.age,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .field("m", &self.m)
            .field("radius", &self.radius)
            .field("x", &self.x)
            .field("v", &self.v)
            .field("age", &self.age)
            .field("destroyed", &self.destroyed)
            .field("parent", &self.parent)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_tag, self.name)
    }
}
