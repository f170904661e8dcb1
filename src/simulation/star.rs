//! Stellar evolution.
//!
//! A star derives its main-sequence lifetime from mass with the usual
//! mass–luminosity power law, `t = 1e10 yr * (M / M_sun)^-2.5`, and classifies
//! itself into an evolutionary stage from the fraction of that lifetime it has
//! used up.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyKind};

pub const SOLAR_MASS: f64 = 1.98847E30; // kg
pub const SOLAR_LUMINOSITY: f64 = 3.828E26; // W
const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StellarStage {
    MainSequence,
    Subgiant,
    PostMainSequence,
    Unknown,
}

impl fmt::Display for StellarStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StellarStage::MainSequence => "main-sequence",
            StellarStage::Subgiant => "subgiant",
            StellarStage::PostMainSequence => "post-main-sequence",
            StellarStage::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Inner/outer edge of the habitable zone, in AU
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HabitableZone {
    pub inner: f64,
    pub outer: f64,
}

#[derive(Debug, Clone)]
pub struct Star {
    luminosity: f64, // W
    temperature: f64, // K
    spectral_class: String,
    stage: StellarStage,
    main_sequence_lifetime: f64, // seconds
}

/// Main-sequence lifetime in seconds for a star of `mass` kg; 0 for massless stars
pub fn estimate_main_sequence_lifetime(mass: f64) -> f64 {
    if mass <= 0.0 {
        return 0.0;
    }
    let years = 1.0E10 * (mass / SOLAR_MASS).powf(-2.5);
    years * SECONDS_PER_YEAR
}

impl Star {
    pub fn new(mass: f64, luminosity: f64, temperature: f64, spectral_class: &str) -> Self {
        let main_sequence_lifetime = estimate_main_sequence_lifetime(mass);
        let stage = if main_sequence_lifetime > 0.0 {
            StellarStage::MainSequence
        } else {
            StellarStage::Unknown
        };
        Self {
            luminosity: luminosity.max(0.0),
            temperature: temperature.max(0.0),
            spectral_class: spectral_class.trim().to_string(),
            stage,
            main_sequence_lifetime,
        }
    }

    pub fn luminosity(&self) -> f64 {
        self.luminosity
    }

    pub fn set_luminosity(&mut self, luminosity: f64) {
        self.luminosity = luminosity.max(0.0);
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.max(0.0);
    }

    pub fn spectral_class(&self) -> &str {
        &self.spectral_class
    }

    pub fn set_spectral_class(&mut self, spectral_class: &str) {
        self.spectral_class = spectral_class.trim().to_string();
    }

    pub fn stage(&self) -> StellarStage {
        self.stage
    }

    pub fn main_sequence_lifetime(&self) -> f64 {
        self.main_sequence_lifetime
    }

    pub(crate) fn refresh_lifetime(&mut self, mass: f64) {
        self.main_sequence_lifetime = estimate_main_sequence_lifetime(mass);
    }

    /// Energy radiated over `dt` seconds
    pub fn emit_energy(&self, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }
        self.luminosity * dt
    }

    pub fn habitable_zone(&self) -> HabitableZone {
        if self.luminosity <= 0.0 {
            return HabitableZone::default();
        }
        let ratio = self.luminosity / SOLAR_LUMINOSITY;
        HabitableZone {
            inner: (ratio / 1.1).sqrt(),
            outer: (ratio / 0.53).sqrt(),
        }
    }

    /// Re-classify from `age`; returns `(from, to)` when the stage changed
    pub(crate) fn update_stage(&mut self, age: f64) -> Option<(StellarStage, StellarStage)> {
        let previous = self.stage;
        self.stage = classify_stage(age, self.main_sequence_lifetime);
        (previous != self.stage).then_some((previous, self.stage))
    }

    /// One-paragraph summary of the star's current state
    pub fn description(&self, mass: f64, age: f64) -> String {
        let class = if self.spectral_class.is_empty() {
            "unknown"
        } else {
            self.spectral_class.as_str()
        };
        let mass_line = if mass > 0.0 {
            format!("Mass: {:.2} solar masses.", mass / SOLAR_MASS)
        } else {
            "Mass measurement pending.".to_string()
        };
        let temperature_line = if self.temperature > 0.0 {
            format!("Surface temperature around {:.0} K.", self.temperature)
        } else {
            "Surface temperature pending measurement.".to_string()
        };
        let luminosity_line = if self.luminosity > 0.0 {
            format!("Emits {:.2} solar luminosities.", self.luminosity / SOLAR_LUMINOSITY)
        } else {
            "Luminosity profile pending.".to_string()
        };
        let lifetime_line = if self.main_sequence_lifetime > 0.0 {
            let used = (age / self.main_sequence_lifetime).clamp(0.0, 1.0);
            format!("Main-sequence lifetime consumed: {:.1}%.", used * 100.0)
        } else {
            "Lifetime metrics unavailable.".to_string()
        };
        format!(
            "Spectral class {class} star currently in {} phase. {mass_line} {temperature_line} {luminosity_line} {lifetime_line}",
            self.stage
        )
    }
}

fn classify_stage(age: f64, lifetime: f64) -> StellarStage {
    if lifetime <= 0.0 {
        return StellarStage::Unknown;
    }
    let fraction = age / lifetime;
    if fraction < 0.7 {
        StellarStage::MainSequence
    } else if fraction < 1.0 {
        StellarStage::Subgiant
    } else {
        StellarStage::PostMainSequence
    }
}

impl Body {
    pub fn new_star(
        name: &str,
        mass: f64,
        radius: f64,
        luminosity: f64,
        temperature: f64,
        spectral_class: &str,
    ) -> Self {
        let star = Star::new(mass, luminosity, temperature, spectral_class);
        Body::with_kind(name, mass, radius, BodyKind::Star(star))
    }

    /// Star summary using this body's mass and age
    pub fn star_description(&self) -> Option<String> {
        self.as_star().map(|s| s.description(self.mass(), self.age()))
    }
}
