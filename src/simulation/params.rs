//! Numerical and physical parameters for a system
//!
//! `SystemParameters` holds runtime settings:
//! - default step size used by `System::tick(None)`,
//! - propagation mode (analytic orbits vs. numerical gravity),
//! - softening length and gravitational constant,
//! - capacity of the bounded event log

use std::fmt;

use serde::{Deserialize, Serialize};

use super::states::GRAVITATIONAL_CONSTANT;

/// How `System::tick` advances bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
    /// Orbit-bearing bodies are evaluated in closed form, everything else drifts
    #[default]
    Analytic,
    /// Pairwise gravity is integrated for every body
    Numerical,
}

impl fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationMode::Analytic => write!(f, "analytic"),
            PropagationMode::Numerical => write!(f, "numerical"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SystemParameters {
    pub time_step: f64, // default step size (seconds)
    pub propagation: PropagationMode, // analytic or numerical
    pub softening: f64, // softening length, prevents singular forces at tiny separations
    pub g: f64, // gravitational constant
    pub event_capacity: usize, // newest N events are kept
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            time_step: 60.0,
            propagation: PropagationMode::Analytic,
            softening: 0.0,
            g: GRAVITATIONAL_CONSTANT,
            event_capacity: 256,
        }
    }
}
