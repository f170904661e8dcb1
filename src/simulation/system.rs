//! The system orchestrator.
//!
//! A [`System`] exclusively owns its bodies in an insertion-ordered arena. Each
//! body keeps only the owning system's name as a back-reference, and orbit foci
//! are looked up by name, so there are no ownership cycles.
//!
//! One [`System::tick`]:
//! 1. rejects `dt <= 0`,
//! 2. propagates every live body (numerical gravity or analytic orbits),
//! 3. records stage transitions and transit arrivals,
//! 4. merges colliding bodies,
//! 5. advances the system age.
//!
//! Nothing in here returns an error: rejected configuration is reported through
//! a `bool`/`Option` and a logged warning, and the simulation always stays
//! advanceable.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::body::{Body, Milestone};
use super::collisions::resolve_collisions;
use super::diagnostics;
use super::events::{EventKind, EventLog, SystemEvent};
use super::forces::NewtonianGravity;
use super::integrator::{analytic_step, numerical_step};
use super::orbit::OrbitalElements;
use super::params::{PropagationMode, SystemParameters};
use super::states::{BodySnapshot, EnergyReport, NVec3};

#[derive(Debug)]
pub struct System {
    name: String,
    bodies: Vec<Body>, // arena, insertion order
    primary: Option<String>, // name of the primary star
    age: f64, // seconds
    params: SystemParameters,
    events: EventLog,
}

impl System {
    pub fn new(name: &str) -> Self {
        Self::with_parameters(name, SystemParameters::default())
    }

    pub fn with_parameters(name: &str, params: SystemParameters) -> Self {
        let events = EventLog::new(params.event_capacity);
        Self {
            name: name.trim().to_string(),
            bodies: Vec::new(),
            primary: None,
            age: 0.0,
            params,
            events,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn parameters(&self) -> &SystemParameters {
        &self.params
    }

    pub fn time_step(&self) -> f64 {
        self.params.time_step
    }

    /// Set the default step; non-positive values are rejected
    pub fn set_time_step(&mut self, seconds: f64) -> bool {
        if !(seconds > 0.0) {
            warn!("Time step must be greater than zero (got {seconds})");
            return false;
        }
        self.params.time_step = seconds;
        true
    }

    pub fn propagation_mode(&self) -> PropagationMode {
        self.params.propagation
    }

    pub fn set_propagation_mode(&mut self, mode: PropagationMode) {
        if self.params.propagation != mode {
            debug!("{}: propagation mode {} -> {}", self.name, self.params.propagation, mode);
        }
        self.params.propagation = mode;
    }

    pub fn gravity_softening_length(&self) -> f64 {
        self.params.softening
    }

    /// Set the softening length; negative values are rejected
    pub fn set_gravity_softening_length(&mut self, softening: f64) -> bool {
        if !(softening >= 0.0) {
            warn!("Softening length must be non-negative (got {softening})");
            return false;
        }
        self.params.softening = softening;
        true
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.params.g
    }

    pub fn set_gravitational_constant(&mut self, g: f64) -> bool {
        if !(g >= 0.0) {
            warn!("Gravitational constant must be non-negative (got {g})");
            return false;
        }
        self.params.g = g;
        true
    }

    // =========================================================================================
    // Registry
    // =========================================================================================

    /// Register `body`, returning any body it replaced (detached from this system)
    pub fn add_object(&mut self, mut body: Body) -> Option<Body> {
        let replaced = match self.index_of(body.name()) {
            Some(idx) => {
                warn!("Replacing existing object {} in system {}", body.name(), self.name);
                let mut old = self.bodies.remove(idx);
                old.attach_to_system(None);
                self.events.push(
                    self.age,
                    EventKind::Replacement {
                        object: old.name().to_string(),
                    },
                );
                Some(old)
            }
            None => None,
        };

        body.attach_to_system(Some(&self.name));
        info!("{} formed in system {}", body, self.name);
        self.events.push(
            self.age,
            EventKind::Formation {
                object: body.name().to_string(),
                kind: body.type_tag().to_string(),
            },
        );
        self.bodies.push(body);
        replaced
    }

    /// Register `planet` and put it on an orbit around `focus`
    /// The planet stays registered even when the orbit is rejected
    pub fn add_planet(&mut self, planet: Body, focus: &str, elements: OrbitalElements) -> bool {
        let name = planet.name().to_string();
        self.add_object(planet);
        let ok = self.set_orbit(&name, focus, elements);
        if ok {
            info!("{name} orbit registered around {focus}");
        }
        ok
    }

    /// Register `star` and mark it as the primary
    pub fn set_primary_star(&mut self, star: Body) -> Option<Body> {
        let name = star.name().to_string();
        let replaced = self.add_object(star);
        self.primary = Some(name);
        replaced
    }

    pub fn primary_star(&self) -> Option<&Body> {
        self.primary.as_deref().and_then(|name| self.object(name))
    }

    /// Put a registered body on an orbit around another registered body
    pub fn set_orbit(&mut self, name: &str, focus: &str, elements: OrbitalElements) -> bool {
        let (name, focus) = (name.trim(), focus.trim());
        if name == focus {
            warn!("{name} cannot orbit itself");
            return false;
        }
        let Some(f) = self.object(focus) else {
            warn!("Cannot set orbit for {name}: focus {focus} is not in system {}", self.name);
            return false;
        };
        let (fx, fv) = (*f.position(), *f.velocity());
        let Some(body) = self.object_mut(name) else {
            warn!("Cannot set orbit: {name} is not registered");
            return false;
        };
        body.assign_orbit(focus, fx, fv, elements)
    }

    /// Remove a body, detaching it from this system
    pub fn remove_object(&mut self, name: &str) -> Option<Body> {
        let idx = self.index_of(name)?;
        let mut body = self.bodies.remove(idx);
        body.attach_to_system(None);
        if self.primary.as_deref() == Some(name) {
            self.primary = None;
        }
        self.events.push(
            self.age,
            EventKind::Removal {
                object: name.to_string(),
            },
        );
        debug!("{} removed from system {}", name, self.name);
        Some(body)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name() == name)
    }

    pub fn object(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name() == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.name() == name)
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn count_objects(&self) -> usize {
        self.bodies.len()
    }

    /// All bodies, in registration order
    pub fn objects(&self) -> &[Body] {
        &self.bodies
    }

    pub fn planets(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.as_planet().is_some())
    }

    pub fn snapshot_state(&self) -> BTreeMap<String, BodySnapshot> {
        self.bodies
            .iter()
            .map(|b| (b.name().to_string(), b.snapshot()))
            .collect()
    }

    // =========================================================================================
    // Time evolution
    // =========================================================================================

    /// Advance by `dt` (the default time step for `None`)
    /// Returns `false` without touching anything when the step is not positive
    pub fn tick(&mut self, dt: Option<f64>) -> bool {
        let dt = dt.unwrap_or(self.params.time_step);
        if !(dt > 0.0) {
            return false;
        }

        let milestones = match self.params.propagation {
            PropagationMode::Numerical => {
                let gravity = NewtonianGravity {
                    g: self.params.g,
                    softening: self.params.softening,
                };
                numerical_step(&mut self.bodies, &gravity, dt)
            }
            PropagationMode::Analytic => analytic_step(&mut self.bodies, dt),
        };
        for (name, milestone) in milestones {
            let kind = match milestone {
                Milestone::StageChanged { from, to } => EventKind::StageTransition { object: name, from, to },
                Milestone::Arrived => EventKind::TransitArrival { object: name },
            };
            self.events.push(self.age + dt, kind);
        }

        self.resolve_collisions(self.age + dt);
        self.age += dt;
        true
    }

    /// Run `steps` ticks of `dt`; returns how many were applied
    pub fn advance(&mut self, steps: usize, dt: Option<f64>) -> usize {
        let mut applied = 0;
        for _ in 0..steps {
            if !self.tick(dt) {
                break;
            }
            applied += 1;
        }
        applied
    }

    fn resolve_collisions(&mut self, stamp: f64) {
        let (collisions, removed) = resolve_collisions(&mut self.bodies);
        for mut body in removed {
            body.attach_to_system(None);
        }
        for c in collisions {
            if self.primary.as_deref() == Some(c.absorbed.as_str()) {
                self.primary = Some(c.survivor.clone());
            }
            self.events.push(
                stamp,
                EventKind::Collision {
                    objects: c.objects,
                    survivor: c.survivor,
                    energy: c.energy,
                    relative_speed: c.relative_speed,
                },
            );
        }
    }

    // =========================================================================================
    // Diagnostics
    // =========================================================================================

    pub fn center_of_mass(&self) -> NVec3 {
        diagnostics::center_of_mass(&self.bodies)
    }

    pub fn center_of_mass_velocity(&self) -> NVec3 {
        diagnostics::center_of_mass_velocity(&self.bodies)
    }

    pub fn total_momentum(&self) -> NVec3 {
        diagnostics::total_momentum(&self.bodies)
    }

    /// G * m of a registered body, using this system's gravitational constant
    pub fn gravitational_parameter(&self, name: &str) -> Option<f64> {
        self.object(name).map(|b| b.gravitational_parameter(self.params.g))
    }

    pub fn total_energy(&self) -> EnergyReport {
        diagnostics::total_energy(&self.bodies, self.params.g)
    }

    /// Newest first; every retained event for `None`
    pub fn recent_events(&self, limit: Option<usize>) -> Vec<SystemEvent> {
        self.events.recent(limit)
    }
}
