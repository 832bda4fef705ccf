/*
 * Boid Flocking Simulation - Module Definitions
 * 
 * This file defines the module structure for the quadtree-indexed flocking
 * simulation. The core (index, flocking rules, tick orchestration) is always
 * built; the window, renderer and overlay sit behind the `viewer` feature.
 */

// Re-export key components for easier access
pub use boid::{Boid, BoidColor};
pub use debug::TickStats;
pub use driver::TickDriver;
pub use error::{ConfigError, IndexError, SimulationError};
pub use flocking::{FlockForces, Snapshot};
pub use params::SimulationParams;
pub use quadtree::{Bounds, QuadObject, QuadTree};
pub use simulation::{Simulation, TickPhase};

// Define modules
pub mod boid;
pub mod debug;
pub mod driver;
pub mod error;
pub mod flocking;
pub mod params;
pub mod physics;
pub mod quadtree;
pub mod simulation;
pub mod vector;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod input;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;

// Constants
pub const BOID_SIZE: f32 = 4.0;
