/*
 * Boid Module
 *
 * This module defines the Boid struct and its per-frame update rule.
 * Each update runs these steps in a fixed order:
 * 1. Neighbor scan over the whole population
 * 2. Alignment and cohesion toward visible neighbors
 * 3. Separation from neighbors that are too close
 * 4. Random nudge on every velocity component
 * 5. Bias tick on vx, direction picked by id parity
 * 6. Speed clamp into [min_speed, max_speed]
 * 7. Target seeking
 * 8. Spherical boundary containment
 * 9. Position integration
 *
 * Steps 7-9 run after the clamp, so speed can leave the clamped range again
 * before the next frame.
 */

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::params::SimulationParams;
use crate::velocity::Velocity;

/// Accumulated neighbor contributions from one scan of the population.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeighborSums {
    /// Sum of `self.position - other.position` over neighbors closer than `avoid_range`.
    pub separation: Vec3,
    /// Number of neighbors in `[avoid_range, visible_range)`.
    pub visible: u32,
    pub velocity_sum: Vec3,
    pub position_sum: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boid {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Velocity,
    pub target: Option<Vec3>,
}

impl Boid {
    /// Builds a boid with an explicit state. The target defaults to the origin.
    pub fn new(id: u32, position: Vec3, velocity: Velocity) -> Self {
        Self {
            id,
            position,
            velocity,
            target: Some(Vec3::ZERO),
        }
    }

    /// Spawns a boid at a random point of the spawn cube with a random velocity.
    pub fn create<R: Rng + ?Sized>(id: u32, params: &SimulationParams, rng: &mut R) -> Self {
        let half = params.spawn_half_width();
        let position = Vec3::new(
            rng.gen_range(-half..=half),
            rng.gen_range(-half..=half),
            rng.gen_range(-half..=half),
        );

        let range = params.initial_speed_range;
        let velocity = Velocity::new(
            rng.gen_range(-range..=range),
            rng.gen_range(-range..=range),
            rng.gen_range(-range..=range),
        );

        Self::new(id, position, velocity)
    }

    // Takes effect on the next update
    pub fn set_target(&mut self, x: f32, y: f32, z: f32) {
        self.target = Some(Vec3::new(x, y, z));
    }

    /// Disables target seeking entirely.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    #[inline]
    pub fn distance(&self, other: &Boid) -> f32 {
        self.position.distance(other.position)
    }

    /// Runs one full frame update against `population`.
    ///
    /// `population` may hold a copy of this boid; entries sharing its id are
    /// skipped. Whatever state the other entries carry is what gets read, so
    /// a driver that updates in place makes earlier updates visible to later
    /// boids in the same frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        population: &[Boid],
        params: &SimulationParams,
        rng: &mut R,
    ) {
        let sums = self.scan_neighbors(population, params);
        self.apply_alignment_cohesion(&sums, params);
        self.apply_separation(&sums, params);
        self.apply_jitter(params, rng);
        self.apply_bias(params);
        self.clamp_speed(params);
        self.seek_target(params);
        self.contain(params);
        self.integrate(params);
    }

    /// Step 1: classify every other boid by distance and accumulate its contribution.
    pub fn scan_neighbors(&self, population: &[Boid], params: &SimulationParams) -> NeighborSums {
        let mut sums = NeighborSums::default();

        for other in population {
            if other.id == self.id {
                continue;
            }

            let d = self.distance(other);
            if d < params.avoid_range {
                sums.separation += self.position - other.position;
            } else if d < params.visible_range {
                sums.visible += 1;
                sums.velocity_sum += other.velocity.as_vec3();
                sums.position_sum += other.position;
            }
        }

        sums
    }

    /// Step 2: nudge velocity toward the neighbor average velocity and position.
    pub fn apply_alignment_cohesion(&mut self, sums: &NeighborSums, params: &SimulationParams) {
        if sums.visible == 0 {
            return;
        }

        let avg_velocity = params.neighbor_average.apply(sums.velocity_sum, sums.visible);
        let avg_position = params.neighbor_average.apply(sums.position_sum, sums.visible);

        let alignment = (avg_velocity - self.velocity.as_vec3()) * params.matching_factor;
        self.velocity += alignment;

        let cohesion = (avg_position - self.position) * params.centering_factor;
        self.velocity += cohesion;
    }

    /// Step 3: push away from close neighbors. A zero sum leaves velocity unchanged.
    pub fn apply_separation(&mut self, sums: &NeighborSums, params: &SimulationParams) {
        self.velocity += sums.separation * params.avoid_factor;
    }

    /// Step 4: uniform noise in `[-jitter, jitter]` on each component.
    pub fn apply_jitter<R: Rng + ?Sized>(&mut self, params: &SimulationParams, rng: &mut R) {
        let j = params.jitter;
        self.velocity += Vec3::new(
            rng.gen_range(-j..=j),
            rng.gen_range(-j..=j),
            rng.gen_range(-j..=j),
        );
    }

    /// Step 5: even ids drift toward vx = +1, odd ids toward vx = -1.
    pub fn apply_bias(&mut self, params: &SimulationParams) {
        let sign = if self.id % 2 == 0 { 1.0 } else { -1.0 };
        self.velocity.vx = (1.0 - params.bias_val) * self.velocity.vx + params.bias_val * sign;
    }

    /// Step 6: pin speed into `[min_speed, max_speed]`.
    pub fn clamp_speed(&mut self, params: &SimulationParams) {
        let speed = self.velocity.speed();
        if speed > params.max_speed {
            self.velocity.throttle(speed, params.max_speed);
        } else if speed < params.min_speed && speed > 0.0 {
            // A stationary boid has no direction to rescale along
            self.velocity.speedup(speed, params.min_speed);
        }
    }

    /// Step 7: add `target_weight` along the unit direction toward the target.
    pub fn seek_target(&mut self, params: &SimulationParams) {
        let Some(target) = self.target else {
            return;
        };

        let to_target = target - self.position;
        let d = to_target.length();
        if d > 0.0 {
            self.velocity += to_target / d * params.target_weight;
        }
    }

    /// Step 8: steer back toward the origin once outside the containment sphere.
    pub fn contain(&mut self, params: &SimulationParams) {
        let d = self.position.length();
        if d > params.margin {
            self.velocity += -self.position / d * params.turn_factor;
        }
    }

    /// Step 9: advance position by `velocity / timestep_divisor`.
    pub fn integrate(&mut self, params: &SimulationParams) {
        self.position += self.velocity.as_vec3() / params.timestep_divisor;
    }
}
