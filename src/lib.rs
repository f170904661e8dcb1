//! Physical simulation engine for a generative universe.
//!
//! A [`System`] owns a set of [`Body`] values (generic bodies, stars, planets on
//! Keplerian orbits, scripted transits) and advances them either by integrating
//! pairwise gravity or by evaluating orbits in closed form. Overlapping bodies
//! are merged, and energy / momentum diagnostics are available to validate the
//! integrator.

pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{BodySnapshot, EnergyReport, NVec3, GRAVITATIONAL_CONSTANT};
pub use simulation::body::{Body, BodyKind, Impact, ImpactHandler, Milestone};
pub use simulation::star::{HabitableZone, Star, StellarStage, SOLAR_LUMINOSITY, SOLAR_MASS};
pub use simulation::orbit::{Orbit, OrbitalElements, Planet, MAX_ECCENTRICITY};
pub use simulation::transit::{TransitObject, TransitScope};
pub use simulation::forces::{Acceleration, NewtonianGravity};
pub use simulation::events::{EventKind, SystemEvent};
pub use simulation::params::{PropagationMode, SystemParameters};
pub use simulation::system::System;
pub use simulation::scenario::Scenario;

pub use configuration::config::{BodyConfig, BodyKindConfig, OrbitConfig, RunConfig, ScenarioConfig, SystemConfig};
pub use configuration::error::{ConfigError, ConfigResult};

pub use benchmark::benchmark::{bench_gravity, bench_tick};
