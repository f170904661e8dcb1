//! Scripted point-to-point transits.
//!
//! A [`TransitObject`] is not driven by gravity. Its position is linearly
//! interpolated between a fixed origin and destination over `travel_time`
//! seconds and its velocity is derived from the realized displacement. Once
//! it arrives it is pinned to the destination and only ages.

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::body::{Body, BodyKind};
use super::states::NVec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitScope {
    #[default]
    Intersystem,
    Intergalactic,
}

impl fmt::Display for TransitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitScope::Intersystem => f.write_str("intersystem"),
            TransitScope::Intergalactic => f.write_str("intergalactic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitObject {
    scope: TransitScope,
    origin_name: String,
    destination_name: String,
    propulsion: String,
    shape: String,
    origin: NVec3,
    destination: NVec3,
    travel_time: f64, // s
    elapsed: f64, // s
    progress: f64, // [0, 1]
    completed: bool,
    context: Map<String, Value>,
}

impl TransitObject {
    pub fn new(origin: NVec3, destination: NVec3, travel_time: f64, scope: TransitScope) -> Self {
        let travel_time = travel_time.max(0.0);
        let completed = travel_time == 0.0;
        Self {
            scope,
            origin_name: String::new(),
            destination_name: String::new(),
            propulsion: String::new(),
            shape: String::new(),
            origin,
            destination,
            travel_time,
            elapsed: 0.0,
            progress: if completed { 1.0 } else { 0.0 },
            completed,
            context: Map::new(),
        }
    }

    pub fn with_propulsion(mut self, propulsion: &str) -> Self {
        self.propulsion = propulsion.trim().to_string();
        self
    }

    pub fn with_shape(mut self, shape: &str) -> Self {
        self.shape = shape.trim().to_string();
        self
    }

    pub fn set_endpoints(&mut self, origin_name: &str, destination_name: &str) {
        self.origin_name = origin_name.trim().to_string();
        self.destination_name = destination_name.trim().to_string();
    }

    pub fn scope(&self) -> TransitScope {
        self.scope
    }

    pub fn propulsion(&self) -> &str {
        &self.propulsion
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn origin(&self) -> &NVec3 {
        &self.origin
    }

    pub fn destination(&self) -> &NVec3 {
        &self.destination
    }

    pub fn travel_time(&self) -> f64 {
        self.travel_time
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn set_context(&mut self, context: Map<String, Value>) {
        self.context = context;
    }

    pub(crate) fn destination_label(&self) -> &str {
        if self.destination_name.is_empty() {
            "an undefined destination"
        } else {
            self.destination_name.as_str()
        }
    }

    fn interpolate(&self, progress: f64) -> NVec3 {
        let p = progress.clamp(0.0, 1.0);
        self.origin + (self.destination - self.origin) * p
    }

    /// Step the transit by `dt`, writing the carrier's position, velocity and age
    /// Returns `true` on the call that completes the trip
    pub(crate) fn advance(&mut self, dt: f64, x: &mut NVec3, v: &mut NVec3, age: &mut f64) -> bool {
        if dt <= 0.0 {
            return false;
        }
        if self.completed {
            *age += dt;
            return false;
        }

        let step = dt.min((self.travel_time - self.elapsed).max(0.0));
        // snap to the end so rounding in `travel_time - elapsed` cannot strand the trip
        if self.elapsed + dt >= self.travel_time {
            self.elapsed = self.travel_time;
        } else {
            self.elapsed += dt;
        }
        *age += step;
        self.progress = if self.travel_time <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.travel_time).clamp(0.0, 1.0)
        };

        let previous = *x;
        let next = self.interpolate(self.progress);
        *x = next;
        if step > 0.0 {
            *v = (next - previous) / step;
        }

        if self.elapsed >= self.travel_time {
            self.completed = true;
            self.progress = 1.0;
            *x = self.destination;
            return true;
        }
        false
    }

    pub fn description(&self) -> String {
        let origin = if self.origin_name.is_empty() {
            "an unknown origin"
        } else {
            self.origin_name.as_str()
        };
        let shape = if self.shape.is_empty() {
            "an indeterminate frame"
        } else {
            self.shape.as_str()
        };
        let propulsion = if self.propulsion.is_empty() {
            "unknown"
        } else {
            self.propulsion.as_str()
        };
        format!(
            "Transit object shaped as {shape} driven by {propulsion} propulsion. \
             Currently travelling from {origin} to {}. Transit completion: {:.1}%.",
            self.destination_label(),
            self.progress * 100.0
        )
    }
}

impl Body {
    /// Create a transit body placed at its origin (or destination, for zero-length trips)
    pub fn new_transit(name: &str, mass: f64, radius: f64, transit: TransitObject) -> Self {
        let start = if transit.is_complete() {
            *transit.destination()
        } else {
            *transit.origin()
        };
        Body::with_kind(name, mass, radius, BodyKind::Transit(transit)).with_position(start)
    }

    /// Advance only the scripted transit; a no-op for other kinds
    pub fn advance_transit(&mut self, dt: f64) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let BodyKind::Transit(t) = &mut self.kind else {
            return false;
        };
        let arrived = t.advance(dt, &mut self.x, &mut self.v, &mut self.age);
        if arrived {
            let destination = t.destination_label().to_string();
            info!("{} arrived at {}", self.name(), destination);
        }
        arrived
    }
}
