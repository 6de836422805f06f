/*
 * Error Module
 *
 * Error types for parameter loading and flock driving. The per-agent update
 * rule itself never fails; these only cover configuration and driver misuse.
 */

use thiserror::Error;

/// Errors raised while loading or validating simulation parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    /// A parameter value is out of its allowed range.
    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),
    /// The parameter file could not be read.
    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
    /// The parameter file is not valid TOML for `SimulationParams`.
    #[error("failed to parse parameter file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised by the flock driver.
#[derive(Debug, Error)]
pub enum FlockError {
    #[error(transparent)]
    Params(#[from] ParamsError),
    /// An update order referenced an agent index that does not exist.
    #[error("agent index {index} out of range for population of {len}")]
    AgentOutOfRange { index: usize, len: usize },
    /// Two boids in one population share an id, so one would skip the other.
    #[error("duplicate boid id {0}")]
    DuplicateId(u32),
}
