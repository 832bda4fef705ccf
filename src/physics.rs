/*
 * Physics Module
 *
 * This module handles the per-tick physics for the flock: building the
 * quadtree used for neighbor queries, applying the flocking acceleration,
 * limiting velocity and wrapping positions around the plane.
 *
 * The plane is toroidal. Boids within `view_radius` of an edge get extra
 * "ghost" entries in the tick index, shifted by the plane size, so a query
 * near one edge also finds boids just across the opposite edge. The tick
 * index root is widened to hold those ghosts.
 *
 * The compute step is embarrassingly parallel: each boid reads only the
 * frozen snapshot and index, and writes only its own output slot.
 */

use glam::Vec2;
use rayon::prelude::*;

use crate::error::IndexError;
use crate::flocking::{self, NeighborScratch, Snapshot};
use crate::params::SimulationParams;
use crate::quadtree::{Bounds, QuadTree};
use crate::vector;

/// Per-axis speed limit.
pub const MAX_SPEED: f32 = 1.0;
/// Extra room around the ghost margin so a shifted coordinate that rounds up
/// onto `dimension + view_radius` still lands inside the index root.
const GHOST_MARGIN_SLACK: f32 = 1.0;

pub fn plane_bounds(params: &SimulationParams) -> Bounds {
    Bounds::new(0.0, 0.0, params.width, params.height)
}

/// Root bounds of the tick index: the plane plus room for ghosts on every side.
pub fn tick_index_bounds(params: &SimulationParams) -> Bounds {
    plane_bounds(params).expanded(params.view_radius + GHOST_MARGIN_SLACK)
}

/// Ghost positions for a point, one per nearby edge and one per nearby corner.
///
/// Returns at most 8 positions; an empty result for points farther than
/// `view_radius` from every edge.
pub fn ghost_positions(p: Vec2, width: f32, height: f32, view_radius: f32) -> Vec<Vec2> {
    let near_left = p.x < view_radius;
    let near_right = p.x > width - view_radius;
    let near_bottom = p.y < view_radius;
    let near_top = p.y > height - view_radius;

    let mut dx = Vec::with_capacity(2);
    if near_left {
        dx.push(width);
    }
    if near_right {
        dx.push(-width);
    }
    let mut dy = Vec::with_capacity(2);
    if near_bottom {
        dy.push(height);
    }
    if near_top {
        dy.push(-height);
    }

    let mut ghosts = Vec::with_capacity(8);
    ghosts.extend(dx.iter().map(|&x| Vec2::new(p.x + x, p.y)));
    ghosts.extend(dy.iter().map(|&y| Vec2::new(p.x, p.y + y)));
    // corners
    for &x in &dx {
        for &y in &dy {
            ghosts.push(Vec2::new(p.x + x, p.y + y));
        }
    }
    ghosts
}

/// Build this tick's neighbor index: every position plus its ghosts.
///
/// Returns the tree and the number of ghost entries inserted.
pub fn build_tick_index(
    positions: &[Vec2],
    params: &SimulationParams,
) -> Result<(QuadTree, usize), IndexError> {
    let mut tree = QuadTree::new(
        tick_index_bounds(params),
        params.quadtree_max_objects,
        params.quadtree_max_depth,
    )?;
    let mut ghost_count = 0;

    for (id, &p) in positions.iter().enumerate() {
        tree.insert(id, p);
        for ghost in ghost_positions(p, params.width, params.height, params.view_radius) {
            tree.insert(id, ghost);
            ghost_count += 1;
        }
    }

    Ok((tree, ghost_count))
}

/// Index over the plane with one entry per boid and no ghosts.
pub fn build_published_index(
    positions: &[Vec2],
    params: &SimulationParams,
) -> Result<QuadTree, IndexError> {
    let mut tree = QuadTree::new(
        plane_bounds(params),
        params.quadtree_max_objects,
        params.quadtree_max_depth,
    )?;
    for (id, &p) in positions.iter().enumerate() {
        tree.insert(id, p);
    }
    Ok(tree)
}

#[inline]
pub fn clamp_velocity(velocity: Vec2) -> Vec2 {
    vector::limit(velocity, -MAX_SPEED, MAX_SPEED)
}

/// Wrap one coordinate into `[0, extent)`.
#[inline]
pub fn wrap_axis(value: f32, extent: f32) -> f32 {
    let mut v = value;
    if v < 0.0 {
        v += extent;
    } else if v >= extent {
        v -= extent;
    }
    if !(0.0..extent).contains(&v) {
        // Moved more than one plane width, or rounding landed on the edge
        v = v.rem_euclid(extent);
        if v >= extent {
            v = 0.0;
        }
    }
    v
}

#[inline]
pub fn wrap_position(p: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(wrap_axis(p.x, width), wrap_axis(p.y, height))
}

// Move one step along the velocity and wrap around the plane
#[inline]
pub fn integrate(position: Vec2, velocity: Vec2, width: f32, height: f32) -> Vec2 {
    wrap_position(position + velocity, width, height)
}

/// New positions and velocities for every slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
}

/// Compute every boid's next state from the snapshot and tick index.
pub fn compute_step(snapshot: &Snapshot, tree: &QuadTree, params: &SimulationParams) -> StepOutput {
    let (positions, velocities) = (0..snapshot.len())
        .into_par_iter()
        .map_init(NeighborScratch::default, |scratch, i| {
            let acceleration = flocking::compute_acceleration(i, snapshot, tree, params, scratch);
            let velocity = clamp_velocity(snapshot.velocities[i] + acceleration);
            let position = integrate(snapshot.positions[i], velocity, params.width, params.height);
            (position, velocity)
        })
        .unzip();

    StepOutput { positions, velocities }
}
