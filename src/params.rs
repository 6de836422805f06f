/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that holds every tuning
 * constant of the flocking rule. Values can be overridden from a TOML file,
 * and any field the file leaves out keeps its default.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ParamsError;

/// How alignment and cohesion sums are turned into neighbor averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborAverage {
    /// `sum += sum / count`, the reference flocking behavior.
    #[default]
    Amplified,
    /// `sum / count`, a plain arithmetic mean.
    Plain,
}

impl NeighborAverage {
    #[inline]
    pub fn apply(self, sum: glam::Vec3, count: u32) -> glam::Vec3 {
        let mean = sum / count as f32;
        match self {
            NeighborAverage::Amplified => sum + mean,
            NeighborAverage::Plain => mean,
        }
    }
}

// Parameters for the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_boids: usize,
    // Radius of the spherical containment region; spawn cube half-width is margin / 2
    pub margin: f32,
    pub avoid_range: f32,
    pub visible_range: f32,
    pub avoid_factor: f32,
    pub matching_factor: f32,
    pub centering_factor: f32,
    pub turn_factor: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub bias_val: f32,
    pub target_weight: f32,
    // Half-width of the per-component velocity noise
    pub jitter: f32,
    // Half-width of the raw initial velocity components, before construction scaling
    pub initial_speed_range: f32,
    pub timestep_divisor: f32,
    pub neighbor_average: NeighborAverage,
    pub rng_seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_boids: 200,
            margin: 400.0,
            avoid_range: 10.0,
            visible_range: 15.0,
            avoid_factor: 0.3,
            matching_factor: 0.008,
            centering_factor: 0.00005,
            turn_factor: 0.2,
            min_speed: 3.0,
            max_speed: 6.0,
            bias_val: 0.001,
            target_weight: 0.08,
            jitter: 0.025,
            initial_speed_range: 6.0,
            timestep_divisor: 5.0,
            neighbor_average: NeighborAverage::Amplified,
            rng_seed: None,
        }
    }
}

impl SimulationParams {
    /// Load parameters from a TOML file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ParamsError> {
        let params: Self = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Load from `path`, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Could not load parameters from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let finite = [
            self.margin,
            self.avoid_range,
            self.visible_range,
            self.avoid_factor,
            self.matching_factor,
            self.centering_factor,
            self.turn_factor,
            self.min_speed,
            self.max_speed,
            self.bias_val,
            self.target_weight,
            self.jitter,
            self.initial_speed_range,
            self.timestep_divisor,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ParamsError::InvalidParam("all parameters must be finite"));
        }
        if self.num_boids == 0 {
            return Err(ParamsError::InvalidParam("num_boids must be positive"));
        }
        if self.margin <= 0.0 {
            return Err(ParamsError::InvalidParam("margin must be positive"));
        }
        if self.avoid_range < 0.0 {
            return Err(ParamsError::InvalidParam("avoid_range must not be negative"));
        }
        if self.visible_range <= self.avoid_range {
            return Err(ParamsError::InvalidParam(
                "visible_range must be greater than avoid_range",
            ));
        }
        if self.min_speed <= 0.0 {
            return Err(ParamsError::InvalidParam("min_speed must be positive"));
        }
        if self.max_speed <= self.min_speed {
            return Err(ParamsError::InvalidParam(
                "max_speed must be greater than min_speed",
            ));
        }
        if self.timestep_divisor <= 0.0 {
            return Err(ParamsError::InvalidParam("timestep_divisor must be positive"));
        }
        let factors = [
            self.avoid_factor,
            self.matching_factor,
            self.centering_factor,
            self.turn_factor,
            self.bias_val,
            self.target_weight,
            self.jitter,
            self.initial_speed_range,
        ];
        if factors.iter().any(|f| *f < 0.0) {
            return Err(ParamsError::InvalidParam("weights and ranges must not be negative"));
        }
        Ok(())
    }

    // Spawn cube half-width
    #[inline]
    pub fn spawn_half_width(&self) -> f32 {
        self.margin / 2.0
    }
}
