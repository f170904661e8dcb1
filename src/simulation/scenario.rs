//! Build fully-initialized systems from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario`) containing:
//! - the system state (`System` with every body registered at t = 0)
//! - the run settings (how many steps, which step size)
//!
//! Unlike the physics core, this layer is strict: anything the core would
//! quietly ignore (duplicate names, dangling foci, rejected orbits) is an error
//! here, since it is almost certainly a typo in the scenario file.

use std::collections::HashSet;

use log::info;

use crate::configuration::config::{BodyConfig, BodyKindConfig, RunConfig, ScenarioConfig};
use crate::configuration::error::{ConfigError, ConfigResult};
use crate::simulation::body::Body;
use crate::simulation::params::SystemParameters;
use crate::simulation::system::System;
use crate::simulation::transit::TransitObject;

/// A system plus the instructions for running it
#[derive(Debug)]
pub struct Scenario {
    pub system: System,
    pub run: RunConfig,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> ConfigResult<Self> {
        let s_cfg = cfg.system;
        if !(s_cfg.time_step > 0.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "time_step must be positive, got {}",
                s_cfg.time_step
            )));
        }
        if !(s_cfg.softening >= 0.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "softening must be non-negative, got {}",
                s_cfg.softening
            )));
        }

        // Parameters (runtime) from SystemConfig
        let defaults = SystemParameters::default();
        let params = SystemParameters {
            time_step: s_cfg.time_step,
            propagation: s_cfg.propagation,
            softening: s_cfg.softening,
            g: s_cfg.gravitational_constant.unwrap_or(defaults.g),
            event_capacity: s_cfg.event_capacity.unwrap_or(defaults.event_capacity),
        };
        let mut system = System::with_parameters(&s_cfg.name, params);

        // Bodies: map `BodyConfig` -> runtime `Body`, in file order
        let mut seen = HashSet::new();
        for bc in &cfg.bodies {
            if !seen.insert(bc.name.trim().to_string()) {
                return Err(ConfigError::DuplicateBody(bc.name.clone()));
            }
            let body = build_body(bc)?;
            if bc.primary {
                system.set_primary_star(body);
            } else {
                system.add_object(body);
            }

            if let Some(orbit) = &bc.orbit {
                if bc.kind != BodyKindConfig::Planet {
                    return Err(ConfigError::NotAPlanet { body: bc.name.clone() });
                }
                let focus = orbit.focus.trim();
                if !system.has_object(focus) {
                    return Err(ConfigError::UnknownFocus {
                        body: bc.name.clone(),
                        focus: orbit.focus.clone(),
                    });
                }
                if !system.set_orbit(bc.name.trim(), focus, orbit.elements()) {
                    return Err(ConfigError::InvalidOrbit { body: bc.name.clone() });
                }
            }
        }

        info!(
            "scenario {} built: {} bodies, {} propagation",
            system.name(),
            system.count_objects(),
            system.propagation_mode()
        );

        Ok(Self { system, run: cfg.run })
    }

    /// Advance the system as configured; returns the number of ticks applied
    pub fn run(&mut self) -> usize {
        self.system.advance(self.run.steps, self.run.delta_time)
    }
}

fn build_body(bc: &BodyConfig) -> ConfigResult<Body> {
    let x = bc.position()?;
    let v = bc.velocity()?;

    let mut body = match bc.kind {
        BodyKindConfig::Body => Body::new(&bc.name, bc.mass, bc.radius).with_position(x).with_velocity(v),
        BodyKindConfig::Star => Body::new_star(
            &bc.name,
            bc.mass,
            bc.radius,
            bc.luminosity,
            bc.temperature,
            bc.spectral_class.as_deref().unwrap_or("G2V"),
        )
        .with_position(x)
        .with_velocity(v),
        BodyKindConfig::Planet => {
            let mut planet = Body::new_planet(&bc.name, bc.mass, bc.radius)
                .with_position(x)
                .with_velocity(v);
            if let Some(p) = planet.as_planet_mut() {
                p.set_habitable(bc.habitable);
                p.set_atmosphere(bc.atmosphere.clone());
            }
            planet
        }
        BodyKindConfig::Transit => {
            // origin falls back to the body's position
            let origin = match bc.origin.as_deref() {
                Some(_) => bc.vector("origin", bc.origin.as_deref())?,
                None => x,
            };
            let destination = match bc.destination.as_deref() {
                Some(d) => bc.vector("destination", Some(d))?,
                None => {
                    return Err(ConfigError::MissingField {
                        body: bc.name.clone(),
                        field: "destination",
                    })
                }
            };
            let mut transit = TransitObject::new(origin, destination, bc.travel_time, bc.scope)
                .with_propulsion(bc.propulsion.as_deref().unwrap_or_default())
                .with_shape(bc.shape.as_deref().unwrap_or_default());
            transit.set_endpoints(
                bc.origin_name.as_deref().unwrap_or_default(),
                bc.destination_name.as_deref().unwrap_or_default(),
            );
            Body::new_transit(&bc.name, bc.mass, bc.radius, transit).with_velocity(v)
        }
    };

    for (key, value) in &bc.metadata {
        body.set_metadata(key, value.clone());
    }
    Ok(body)
}
