/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that summarizes the flock after
 * a frame. The driver logs it periodically.
 *
 * Includes metrics for:
 * - Speed spread and how many boids sit outside the speed bounds
 * - Distance from the origin and how many boids are beyond the margin
 * - Flock centroid
 * - Time spent on the last frame
 */

use glam::Vec3;
use serde::Serialize;
use std::time::Duration;

use crate::boid::Boid;
use crate::params::SimulationParams;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub frame: u64,
    pub population: usize,
    pub mean_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    // Boids whose speed left [min_speed, max_speed] after the post-clamp steps
    pub out_of_speed_bounds: usize,
    pub mean_origin_distance: f32,
    pub beyond_margin: usize,
    pub centroid: Vec3,
    pub frame_time: Duration,
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            frame: 0,
            population: 0,
            mean_speed: 0.0,
            min_speed: 0.0,
            max_speed: 0.0,
            out_of_speed_bounds: 0,
            mean_origin_distance: 0.0,
            beyond_margin: 0,
            centroid: Vec3::ZERO,
            frame_time: Duration::ZERO,
        }
    }
}

impl DebugInfo {
    pub fn collect(frame: u64, boids: &[Boid], params: &SimulationParams) -> Self {
        if boids.is_empty() {
            return Self {
                frame,
                ..Self::default()
            };
        }

        let mut info = Self {
            frame,
            population: boids.len(),
            min_speed: f32::INFINITY,
            max_speed: 0.0,
            ..Self::default()
        };

        let mut speed_total = 0.0;
        let mut distance_total = 0.0;
        let mut position_total = Vec3::ZERO;

        for boid in boids {
            let speed = boid.velocity.speed();
            speed_total += speed;
            info.min_speed = info.min_speed.min(speed);
            info.max_speed = info.max_speed.max(speed);
            if speed < params.min_speed || speed > params.max_speed {
                info.out_of_speed_bounds += 1;
            }

            let d = boid.position.length();
            distance_total += d;
            if d > params.margin {
                info.beyond_margin += 1;
            }
            position_total += boid.position;
        }

        let n = boids.len() as f32;
        info.mean_speed = speed_total / n;
        info.mean_origin_distance = distance_total / n;
        info.centroid = position_total / n;
        info
    }

    pub fn with_frame_time(mut self, frame_time: Duration) -> Self {
        self.frame_time = frame_time;
        self
    }
}
