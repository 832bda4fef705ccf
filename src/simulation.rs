/*
 * Simulation Module
 *
 * This module owns the shared state of a run: the boid population, the
 * currently published quadtree and the latest tick statistics, all behind a
 * single reader/writer lock.
 *
 * A tick walks Idle -> Snapshotting -> Indexing -> Computing -> Publishing
 * -> Idle. The lock is only held to copy the snapshot out and to copy the
 * results back in; building the index and computing the step happen outside
 * it so readers (the renderer) are never kept waiting on the expensive part.
 * Results are published all at once, so a reader sees either the previous
 * tick or the new one, never a mix.
 */

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::boid::Boid;
use crate::debug::TickStats;
use crate::error::SimulationError;
use crate::flocking::Snapshot;
use crate::params::SimulationParams;
use crate::physics;
use crate::quadtree::{QuadObject, QuadTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Idle,
    Snapshotting,
    Indexing,
    Computing,
    Publishing,
}

impl TickPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => TickPhase::Snapshotting,
            2 => TickPhase::Indexing,
            3 => TickPhase::Computing,
            4 => TickPhase::Publishing,
            _ => TickPhase::Idle,
        }
    }
}

struct World {
    boids: Vec<Boid>,
    index: Arc<QuadTree>,
    stats: TickStats,
}

pub struct Simulation {
    params: SimulationParams,
    seed: u64,
    world: RwLock<World>,
    // Serializes ticks; readers never take it
    tick_lock: Mutex<()>,
    phase: AtomicU8,
}

impl Simulation {
    /// Validate `params` and place `boids_count` boids from the resolved seed.
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        params.validate()?;
        let seed = params.resolve_seed();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let boids = (0..params.boids_count)
            .map(|id| Boid::random(id, params.width, params.height, &mut rng))
            .collect();
        info!(seed, boids = params.boids_count, width = params.width, height = params.height, "created simulation");
        Self::assemble(params, seed, boids)
    }

    /// Start from an explicit population. Ids must equal slot indices and
    /// positions must lie on the plane; `boids_count` is taken from `boids`.
    pub fn from_boids(mut params: SimulationParams, boids: Vec<Boid>) -> Result<Self, SimulationError> {
        params.boids_count = boids.len();
        params.validate()?;
        let plane = physics::plane_bounds(&params);
        for (slot, boid) in boids.iter().enumerate() {
            if boid.id != slot {
                return Err(SimulationError::InvalidBoid { slot, reason: "id does not match slot" });
            }
            if !plane.contains(boid.position) {
                return Err(SimulationError::InvalidBoid { slot, reason: "position outside the plane" });
            }
        }
        let seed = params.seed.unwrap_or(0);
        Self::assemble(params, seed, boids)
    }

    fn assemble(params: SimulationParams, seed: u64, boids: Vec<Boid>) -> Result<Self, SimulationError> {
        let positions: Vec<Vec2> = boids.iter().map(|b| b.position).collect();
        let index = Arc::new(physics::build_published_index(&positions, &params)?);
        Ok(Self {
            params,
            seed,
            world: RwLock::new(World {
                boids,
                index,
                stats: TickStats::default(),
            }),
            tick_lock: Mutex::new(()),
            phase: AtomicU8::new(TickPhase::Idle as u8),
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Seed the population was drawn from (0 for explicit populations
    /// without a configured seed).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.params.boids_count
    }

    pub fn is_empty(&self) -> bool {
        self.params.boids_count == 0
    }

    pub fn phase(&self) -> TickPhase {
        TickPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Run `f` against the published population under the read lock. Keep
    /// it short: a tick waits for it before publishing.
    pub fn read_boids<R>(&self, f: impl FnOnce(&[Boid]) -> R) -> R {
        let world = self.read_world();
        f(&world.boids)
    }

    /// Copy of the published population.
    pub fn boids(&self) -> Vec<Boid> {
        self.read_boids(|boids| boids.to_vec())
    }

    /// The published (ghost-free) index. Cloning the Arc releases the lock
    /// right away; the tree itself is never mutated after publishing.
    pub fn index(&self) -> Arc<QuadTree> {
        Arc::clone(&self.read_world().index)
    }

    /// Boids within `radius` of `center` according to the published index.
    pub fn neighbors_of(&self, center: Vec2, radius: f32) -> Vec<QuadObject> {
        self.index().query_circle(center, radius)
    }

    pub fn stats(&self) -> TickStats {
        self.read_world().stats
    }

    /// Advance one tick and publish the result.
    pub fn tick(&self) -> Result<TickStats, SimulationError> {
        let _serial = self.tick_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let result = self.run_tick();
        self.set_phase(TickPhase::Idle);
        result
    }

    fn run_tick(&self) -> Result<TickStats, SimulationError> {
        let started = Instant::now();

        self.set_phase(TickPhase::Snapshotting);
        let snapshot = self.read_boids(Snapshot::capture);

        self.set_phase(TickPhase::Indexing);
        let (tree, ghost_entries) = physics::build_tick_index(&snapshot.positions, &self.params)?;
        trace!(entries = tree.len(), ghost_entries, "built tick index");

        self.set_phase(TickPhase::Computing);
        let step = physics::compute_step(&snapshot, &tree, &self.params);

        self.set_phase(TickPhase::Publishing);
        // Same positions the records are about to hold
        let published = Arc::new(physics::build_published_index(&step.positions, &self.params)?);

        let stats = {
            let mut world = self.write_world();
            for ((boid, position), velocity) in world
                .boids
                .iter_mut()
                .zip(step.positions)
                .zip(step.velocities)
            {
                boid.position = position;
                boid.velocity = velocity;
            }
            world.index = published;
            world.stats = TickStats {
                ticks: world.stats.ticks + 1,
                last_tick: started.elapsed(),
                index_entries: tree.len(),
                ghost_entries,
            };
            world.stats
        };

        debug!(tick = stats.ticks, ms = stats.last_tick_ms(), ghost_entries, "tick published");
        Ok(stats)
    }

    fn set_phase(&self, phase: TickPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    // Writers only ever publish complete state, so a poisoned lock still
    // guards consistent data.
    fn read_world(&self) -> RwLockReadGuard<'_, World> {
        self.world.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_world(&self) -> RwLockWriteGuard<'_, World> {
        self.world.write().unwrap_or_else(PoisonError::into_inner)
    }
}
