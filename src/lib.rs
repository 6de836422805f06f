/*
 * 3D Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the flocking core. A
 * presentation layer drives a Flock one frame at a time and reads each
 * boid's position and velocity afterwards.
 */

// Re-export key components for easier access
pub use boid::{Boid, NeighborSums};
pub use debug::DebugInfo;
pub use error::{FlockError, ParamsError};
pub use flock::{AgentState, Flock, FrameSnapshot};
pub use params::{NeighborAverage, SimulationParams};
pub use velocity::Velocity;

// Define modules
pub mod boid;
pub mod debug;
pub mod error;
pub mod flock;
pub mod params;
pub mod velocity;
