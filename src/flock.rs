/*
 * Flock Module
 *
 * Owns the boid population and drives one frame at a time. Updates are
 * applied in place and in sequence: a boid updated earlier in a frame is
 * seen by later boids in its updated state. The sequence is index order by
 * default, or whatever order the caller hands to `step_in_order`.
 */

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::boid::Boid;
use crate::error::FlockError;
use crate::params::SimulationParams;
use crate::velocity::Velocity;

/// The fields a presentation layer reads to place and orient one boid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Velocity,
}

impl From<&Boid> for AgentState {
    fn from(boid: &Boid) -> Self {
        Self {
            id: boid.id,
            position: boid.position,
            velocity: boid.velocity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub agents: Vec<AgentState>,
}

pub struct Flock<R = SmallRng> {
    boids: Vec<Boid>,
    params: SimulationParams,
    rng: R,
    frame: u64,
}

impl Flock<SmallRng> {
    /// Creates a flock seeded from `params.rng_seed`, or from entropy if unset.
    pub fn new(params: SimulationParams) -> Result<Self, FlockError> {
        let rng = match params.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(params, rng)
    }
}

impl<R: Rng> Flock<R> {
    /// Creates a flock that draws all randomness from `rng`.
    pub fn with_rng(params: SimulationParams, rng: R) -> Result<Self, FlockError> {
        params.validate()?;
        let mut flock = Self {
            boids: Vec::with_capacity(params.num_boids),
            params,
            rng,
            frame: 0,
        };
        flock.reset();
        Ok(flock)
    }

    /// Builds a flock around an existing population without randomizing it.
    ///
    /// Ids must be unique: a boid skips every entry carrying its own id
    /// during the neighbor scan.
    pub fn from_boids(
        params: SimulationParams,
        boids: Vec<Boid>,
        rng: R,
    ) -> Result<Self, FlockError> {
        params.validate()?;
        let mut seen = HashSet::with_capacity(boids.len());
        if let Some(boid) = boids.iter().find(|b| !seen.insert(b.id)) {
            return Err(FlockError::DuplicateId(boid.id));
        }
        Ok(Self {
            boids,
            params,
            rng,
            frame: 0,
        })
    }

    // Respawn the whole population at random positions
    pub fn reset(&mut self) {
        let params = &self.params;
        let rng = &mut self.rng;
        self.boids = (0..params.num_boids)
            .map(|id| Boid::create(id as u32, params, &mut *rng))
            .collect();
        self.frame = 0;

        tracing::info!(
            num_boids = self.boids.len(),
            margin = self.params.margin,
            "Flock reset"
        );
    }

    /// Advances one frame, updating boids in index order.
    pub fn step(&mut self) {
        for index in 0..self.boids.len() {
            self.update_in_place(index);
        }
        self.frame += 1;
    }

    /// Advances one frame, updating boids in the given order.
    ///
    /// Every index is checked before any boid is touched. Indices may repeat
    /// or be omitted; each listed entry is one update.
    pub fn step_in_order(&mut self, order: &[usize]) -> Result<(), FlockError> {
        let len = self.boids.len();
        if let Some(&index) = order.iter().find(|&&i| i >= len) {
            return Err(FlockError::AgentOutOfRange { index, len });
        }

        for &index in order {
            self.update_in_place(index);
        }
        self.frame += 1;
        Ok(())
    }

    /// Updates a single boid against the current population without advancing the frame.
    pub fn update_agent(&mut self, index: usize) -> Result<(), FlockError> {
        if index >= self.boids.len() {
            return Err(FlockError::AgentOutOfRange {
                index,
                len: self.boids.len(),
            });
        }
        self.update_in_place(index);
        Ok(())
    }

    #[inline]
    fn update_in_place(&mut self, index: usize) {
        // The population still holds the pre-update copy; Boid::update skips it by id
        let mut boid = self.boids[index];
        boid.update(&self.boids, &self.params, &mut self.rng);
        self.boids[index] = boid;
    }

    pub fn set_target(&mut self, x: f32, y: f32, z: f32) {
        for boid in &mut self.boids {
            boid.set_target(x, y, z);
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            agents: self.boids.iter().map(AgentState::from).collect(),
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    /// Mutable access to the population. Ids must stay unique, otherwise
    /// boids sharing an id stop seeing each other.
    pub fn boids_mut(&mut self) -> &mut [Boid] {
        &mut self.boids
    }

    pub fn boid(&self, index: usize) -> Option<&Boid> {
        self.boids.get(index)
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(params: SimulationParams, seed: u64) -> Flock<SmallRng> {
        Flock::with_rng(params, SmallRng::seed_from_u64(seed)).unwrap()
    }

    fn quiet_params(num_boids: usize) -> SimulationParams {
        SimulationParams {
            num_boids,
            jitter: 0.0,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn new_spawns_population_with_sequential_ids() {
        let flock = seeded(quiet_params(25), 1);
        assert_eq!(flock.len(), 25);
        assert_eq!(flock.frame(), 0);
        for (i, boid) in flock.boids().iter().enumerate() {
            assert_eq!(boid.id, i as u32);
        }
    }

    #[test]
    fn rejects_invalid_params() {
        let params = SimulationParams {
            max_speed: 1.0,
            ..SimulationParams::default()
        };
        assert!(matches!(Flock::new(params), Err(FlockError::Params(_))));
    }

    #[test]
    fn same_seed_gives_same_run() {
        let params = SimulationParams {
            num_boids: 40,
            rng_seed: Some(99),
            ..SimulationParams::default()
        };
        let mut a = Flock::new(params.clone()).unwrap();
        let mut b = Flock::new(params).unwrap();
        for _ in 0..10 {
            a.step();
            b.step();
        }
        assert_eq!(a.boids(), b.boids());
        assert_eq!(a.frame(), 10);
    }

    #[test]
    fn later_boids_see_updated_state() {
        let params = quiet_params(2);
        let first = Boid::new(0, Vec3::ZERO, Velocity::from_components(4.0, 0.0, 0.0));
        let second = Boid::new(
            1,
            Vec3::new(12.0, 0.0, 0.0),
            Velocity::from_components(0.0, 4.0, 0.0),
        );

        let population = vec![first, second];
        let mut flock =
            Flock::from_boids(params.clone(), population, SmallRng::seed_from_u64(0)).unwrap();
        flock.step();

        let mut rng = SmallRng::seed_from_u64(0);
        let mut expected_first = first;
        expected_first.update(&[first, second], &params, &mut rng);
        let mut expected_second = second;
        expected_second.update(&[expected_first, second], &params, &mut rng);

        assert_eq!(flock.boids()[0], expected_first);
        assert_eq!(flock.boids()[1], expected_second);

        // A frozen snapshot would have given the second boid a different result
        let mut frozen_second = second;
        frozen_second.update(&[first, second], &params, &mut SmallRng::seed_from_u64(0));
        assert_ne!(flock.boids()[1], frozen_second);
    }

    #[test]
    fn from_boids_rejects_shared_ids() {
        let boids = vec![
            Boid::new(0, Vec3::ZERO, Velocity::ZERO),
            Boid::new(0, Vec3::new(3.0, 0.0, 0.0), Velocity::ZERO),
        ];
        let result = Flock::from_boids(quiet_params(2), boids, SmallRng::seed_from_u64(0));
        assert!(matches!(result, Err(FlockError::DuplicateId(0))));
    }

    #[test]
    fn close_boids_with_distinct_ids_separate() {
        let params = quiet_params(2);
        let boids = vec![
            Boid::new(0, Vec3::ZERO, Velocity::ZERO),
            Boid::new(1, Vec3::new(3.0, 0.0, 0.0), Velocity::ZERO),
        ];
        let flock = Flock::from_boids(params.clone(), boids, SmallRng::seed_from_u64(0)).unwrap();
        let sums = flock.boids()[0].scan_neighbors(flock.boids(), &params);
        assert_eq!(sums.separation, Vec3::new(-3.0, 0.0, 0.0));
    }

    #[test]
    fn update_order_changes_outcome() {
        let params = quiet_params(2);
        let boids = vec![
            Boid::new(0, Vec3::ZERO, Velocity::from_components(4.0, 0.0, 0.0)),
            Boid::new(1, Vec3::new(12.0, 0.0, 0.0), Velocity::from_components(0.0, 4.0, 0.0)),
        ];
        let mut forward =
            Flock::from_boids(params.clone(), boids.clone(), SmallRng::seed_from_u64(0)).unwrap();
        let mut reverse = Flock::from_boids(params, boids, SmallRng::seed_from_u64(0)).unwrap();

        forward.step_in_order(&[0, 1]).unwrap();
        reverse.step_in_order(&[1, 0]).unwrap();
        assert_ne!(forward.boids(), reverse.boids());
        assert_eq!(forward.frame(), 1);
    }

    #[test]
    fn step_in_order_rejects_bad_index_without_mutating() {
        let mut flock = seeded(quiet_params(3), 4);
        let before = flock.boids().to_vec();
        let err = flock.step_in_order(&[0, 7, 1]).unwrap_err();
        assert!(matches!(err, FlockError::AgentOutOfRange { index: 7, len: 3 }));
        assert_eq!(flock.boids(), &before[..]);
        assert_eq!(flock.frame(), 0);
    }

    #[test]
    fn update_agent_touches_only_that_boid() {
        let mut flock = seeded(quiet_params(3), 8);
        let before = flock.boids().to_vec();
        flock.update_agent(1).unwrap();
        assert_eq!(flock.boids()[0], before[0]);
        assert_ne!(flock.boids()[1], before[1]);
        assert_eq!(flock.boids()[2], before[2]);
        assert_eq!(flock.frame(), 0);
        assert!(flock.update_agent(3).is_err());
    }

    #[test]
    fn set_target_applies_to_all() {
        let mut flock = seeded(quiet_params(5), 2);
        flock.set_target(1.0, 2.0, 3.0);
        assert!(flock
            .boids()
            .iter()
            .all(|b| b.target == Some(Vec3::new(1.0, 2.0, 3.0))));
    }

    #[test]
    fn reset_respawns_and_rewinds() {
        let mut flock = seeded(quiet_params(10), 6);
        flock.step();
        flock.reset();
        assert_eq!(flock.frame(), 0);
        assert_eq!(flock.len(), 10);
    }

    #[test]
    fn snapshot_mirrors_population() {
        let mut flock = seeded(quiet_params(4), 12);
        flock.step();
        let snap = flock.snapshot();
        assert_eq!(snap.frame, 1);
        assert_eq!(snap.agents.len(), 4);
        for (state, boid) in snap.agents.iter().zip(flock.boids()) {
            assert_eq!(state.id, boid.id);
            assert_eq!(state.position, boid.position);
            assert_eq!(state.velocity, boid.velocity);
        }
    }
}
