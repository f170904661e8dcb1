//! Errors raised while loading a scenario.
//!
//! The physics core never fails; only turning user-supplied configuration into
//! a running system can.

use std::path::PathBuf;

/// Alias for `Result<T, ConfigError>`.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The scenario file could not be read.
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The scenario is not valid YAML for the expected schema.
    #[error("invalid scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A vector field did not have exactly three components.
    #[error("body \"{body}\": {field} must have 3 components, got {len}")]
    VectorLength {
        body: String,
        field: &'static str,
        len: usize,
    },

    /// A field required by the body's kind is absent.
    #[error("body \"{body}\": missing {field}")]
    MissingField { body: String, field: &'static str },

    /// Two bodies in one scenario share a name.
    #[error("duplicate body name: \"{0}\"")]
    DuplicateBody(String),

    /// An orbit refers to a focus that was not declared earlier in the file.
    #[error("body \"{body}\": focus \"{focus}\" must be declared before it")]
    UnknownFocus { body: String, focus: String },

    /// Orbital elements were rejected (non-positive axis or period).
    #[error("body \"{body}\": orbit rejected, semi-major axis and period must be positive")]
    InvalidOrbit { body: String },

    /// An orbit was given for a body that is not a planet.
    #[error("body \"{body}\": only planets can carry an orbit")]
    NotAPlanet { body: String },

    /// A system-level parameter is out of range.
    #[error("invalid system parameter: {0}")]
    InvalidParameter(String),
}
