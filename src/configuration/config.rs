//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`SystemConfig`]  – system name, default step, propagation mode, softening, G
//! - [`RunConfig`]     – how far the runner should advance the system
//! - [`BodyConfig`]    – initial state for each body (generic, star, planet, transit)
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! system:
//!   name: Sol
//!   time_step: 3600.0
//!   propagation: analytic   # or "numerical"
//!   softening: 0.0
//!
//! run:
//!   steps: 24
//!
//! bodies:
//!   - name: Sun
//!     kind: star
//!     primary: true
//!     mass: 1.98847e30
//!     radius: 6.957e8
//!     luminosity: 3.828e26
//!     temperature: 5772
//!   - name: Earth
//!     kind: planet
//!     mass: 5.972e24
//!     radius: 6.371e6
//!     orbit: { focus: Sun, semi_major_axis: 1.496e11, period: 3.15576e7 }
//! ```
//!
//! Bodies are registered in file order, so a focus has to appear before the
//! bodies orbiting it. Building the runtime system from this lives in
//! [`Scenario`](crate::simulation::scenario::Scenario).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::error::{ConfigError, ConfigResult};
use crate::simulation::orbit::OrbitalElements;
use crate::simulation::params::PropagationMode;
use crate::simulation::states::NVec3;
use crate::simulation::transit::TransitScope;

fn default_time_step() -> f64 {
    60.0
}

/// System-wide settings
#[derive(Deserialize, Debug, Clone)]
pub struct SystemConfig {
    pub name: String,
    #[serde(default = "default_time_step")]
    pub time_step: f64, // default step (seconds)
    #[serde(default)]
    pub propagation: PropagationMode, // "analytic" or "numerical"
    #[serde(default)]
    pub softening: f64, // softening length
    pub gravitational_constant: Option<f64>, // defaults to the SI value
    pub event_capacity: Option<usize>, // bounded event log size
}

/// How far the runner advances the system
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RunConfig {
    #[serde(default)]
    pub steps: usize,
    pub delta_time: Option<f64>, // defaults to system.time_step
}

/// Which body variant to build
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyKindConfig {
    #[default]
    Body,
    Star,
    Planet,
    Transit,
}

/// Keplerian elements for a planet; angles in radians
#[derive(Deserialize, Debug, Clone)]
pub struct OrbitConfig {
    pub focus: String,
    pub semi_major_axis: f64,
    pub period: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub phase: f64,
    #[serde(default)]
    pub inclination: f64,
    #[serde(default)]
    pub ascending_node: f64,
    #[serde(default)]
    pub argument_of_periapsis: f64,
}

impl OrbitConfig {
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements::new(self.semi_major_axis, self.period)
            .with_eccentricity(self.eccentricity)
            .with_phase(self.phase)
            .with_inclination(self.inclination)
            .with_ascending_node(self.ascending_node)
            .with_argument_of_periapsis(self.argument_of_periapsis)
    }
}

/// Configuration for a single body's initial state
/// Kind-specific fields are ignored for other kinds
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default)]
    pub kind: BodyKindConfig,
    #[serde(default)]
    pub primary: bool, // register as the system's primary star
    pub mass: f64,
    #[serde(default)]
    pub radius: f64,
    pub x: Option<Vec<f64>>, // initial position
    pub v: Option<Vec<f64>>, // initial velocity
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,

    // star
    #[serde(default)]
    pub luminosity: f64,
    #[serde(default)]
    pub temperature: f64,
    pub spectral_class: Option<String>,

    // planet
    pub orbit: Option<OrbitConfig>,
    #[serde(default)]
    pub habitable: bool,
    #[serde(default)]
    pub atmosphere: BTreeMap<String, f64>,

    // transit
    pub origin: Option<Vec<f64>>,
    pub destination: Option<Vec<f64>>,
    #[serde(default)]
    pub travel_time: f64,
    #[serde(default)]
    pub scope: TransitScope,
    pub propulsion: Option<String>,
    pub shape: Option<String>,
    pub origin_name: Option<String>,
    pub destination_name: Option<String>,
}

impl BodyConfig {
    /// Read an optional 3-vector field, defaulting to zero
    pub fn vector(&self, field: &'static str, value: Option<&[f64]>) -> ConfigResult<NVec3> {
        match value {
            None => Ok(NVec3::zeros()),
            Some([x, y, z]) => Ok(NVec3::new(*x, *y, *z)),
            Some(other) => Err(ConfigError::VectorLength {
                body: self.name.clone(),
                field,
                len: other.len(),
            }),
        }
    }

    pub fn position(&self) -> ConfigResult<NVec3> {
        self.vector("x", self.x.as_deref())
    }

    pub fn velocity(&self) -> ConfigResult<NVec3> {
        self.vector("v", self.v.as_deref())
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub system: SystemConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}
