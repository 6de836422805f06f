/*
 * Velocity Module
 *
 * A 3D velocity value. Its magnitude is the agent's speed, and the two
 * rescaling operations are what the speed clamp uses to pin a boid's speed
 * to the configured bounds.
 */

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Scale applied to raw components by `Velocity::new`, keeping the initial
/// random spread inside the speed bounds.
pub const CONSTRUCTION_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
}

impl Velocity {
    pub const ZERO: Self = Self { vx: 0.0, vy: 0.0, vz: 0.0 };

    /// Builds a velocity from raw (unscaled) components.
    pub fn new(dx: f32, dy: f32, dz: f32) -> Self {
        Self {
            vx: dx * CONSTRUCTION_SCALE,
            vy: dy * CONSTRUCTION_SCALE,
            vz: dz * CONSTRUCTION_SCALE,
        }
    }

    /// Stores the components as given.
    pub fn from_components(vx: f32, vy: f32, vz: f32) -> Self {
        Self { vx, vy, vz }
    }

    // Euclidean norm of the three components
    #[inline]
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy + self.vz * self.vz).sqrt()
    }

    /// Rescales to exactly `max_speed`, keeping direction.
    ///
    /// `current_speed` must be this velocity's own `speed()` and non-zero; the
    /// speed clamp only calls this when the speed exceeds `max_speed`.
    pub fn throttle(&mut self, current_speed: f32, max_speed: f32) {
        self.rescale(max_speed, current_speed);
    }

    /// Rescales to exactly `min_speed`, keeping direction.
    ///
    /// Same contract as `throttle`. The clamp calls this only for a non-zero
    /// speed below `min_speed`.
    pub fn speedup(&mut self, current_speed: f32, min_speed: f32) {
        self.rescale(min_speed, current_speed);
    }

    #[inline]
    fn rescale(&mut self, to: f32, from: f32) {
        self.vx = self.vx * to / from;
        self.vy = self.vy * to / from;
        self.vz = self.vz * to / from;
    }

    #[inline]
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.vx, self.vy, self.vz)
    }
}

impl From<Vec3> for Velocity {
    fn from(v: Vec3) -> Self {
        Self::from_components(v.x, v.y, v.z)
    }
}

impl From<Velocity> for Vec3 {
    fn from(v: Velocity) -> Self {
        v.as_vec3()
    }
}

impl AddAssign<Vec3> for Velocity {
    fn add_assign(&mut self, rhs: Vec3) {
        self.vx += rhs.x;
        self.vy += rhs.y;
        self.vz += rhs.z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_construction_scale() {
        let v = Velocity::new(6.0, -6.0, 3.0);
        assert!((v.vx - 0.6).abs() < 1e-6);
        assert!((v.vy + 0.6).abs() < 1e-6);
        assert!((v.vz - 0.3).abs() < 1e-6);
    }

    #[test]
    fn speed_is_euclidean_norm() {
        let v = Velocity::from_components(2.0, 3.0, 6.0);
        assert!((v.speed() - 7.0).abs() < 1e-6);
        assert_eq!(Velocity::ZERO.speed(), 0.0);
    }

    #[test]
    fn throttle_rescales_to_max_speed() {
        let mut v = Velocity::from_components(10.0, 0.0, 0.0);
        let speed = v.speed();
        v.throttle(speed, 6.0);
        assert_eq!(v, Velocity::from_components(6.0, 0.0, 0.0));
    }

    #[test]
    fn speedup_preserves_direction() {
        let mut v = Velocity::from_components(0.3, 0.4, 0.0);
        let speed = v.speed();
        v.speedup(speed, 3.0);
        assert!((v.speed() - 3.0).abs() < 1e-5);
        assert!((v.vx / v.vy - 0.75).abs() < 1e-5);
        assert_eq!(v.vz, 0.0);
    }

    #[test]
    fn add_assign_vec3() {
        let mut v = Velocity::from_components(1.0, 1.0, 1.0);
        v += Vec3::new(0.5, -1.0, 2.0);
        assert_eq!(v.as_vec3(), Vec3::new(1.5, 0.0, 3.0));
    }
}
