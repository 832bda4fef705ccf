/*
 * Flocking Module
 *
 * Per-boid acceleration from the three classic rules plus a border term:
 * 1. Alignment: steer towards the average velocity of neighbors
 * 2. Cohesion: steer towards the average position of neighbors
 * 3. Separation: move away from neighbors, one unit vector per neighbor
 *
 * Neighbors come from a circular quadtree query against the tick index, which
 * may hold several entries for one boid (its real position plus ghosts across
 * the wrap seam). Each id counts once: the first entry the query returns for
 * an id claims it, even if that entry then fails the distance check. Geometry
 * uses the position stored in the entry so a ghost contributes the
 * seam-crossing offset, while velocity and color come from the snapshot.
 *
 * Everything here reads the frozen snapshot and index only, so boids can be
 * processed in any order or in parallel.
 */

use std::collections::HashSet;

use glam::Vec2;

use crate::boid::{Boid, BoidColor};
use crate::params::SimulationParams;
use crate::quadtree::{QuadObject, QuadTree};
use crate::vector;

/// Largest magnitude the border term may reach on one axis.
pub const MAX_BORDER_FORCE: f32 = 1.0;
/// Floor for the distance to an edge before inverting it.
pub const BORDER_EPSILON: f32 = 1e-3;

/// Positions, velocities and colors of every boid at the start of a tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    pub colors: Vec<BoidColor>,
}

impl Snapshot {
    pub fn capture(boids: &[Boid]) -> Self {
        let mut snapshot = Self {
            positions: Vec::with_capacity(boids.len()),
            velocities: Vec::with_capacity(boids.len()),
            colors: Vec::with_capacity(boids.len()),
        };
        for boid in boids {
            snapshot.positions.push(boid.position);
            snapshot.velocities.push(boid.velocity);
            snapshot.colors.push(boid.color);
        }
        snapshot
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Reusable buffers for neighbor queries; one per worker.
#[derive(Debug, Default)]
pub struct NeighborScratch {
    hits: Vec<QuadObject>,
    seen: HashSet<usize>,
}

/// The individual terms that make up a boid's acceleration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlockForces {
    pub alignment: Vec2,
    pub cohesion: Vec2,
    pub separation: Vec2,
    pub border: Vec2,
    /// Distinct same-color neighbors that contributed.
    pub neighbors: usize,
}

impl FlockForces {
    pub fn total(&self) -> Vec2 {
        self.border + self.alignment + self.cohesion + self.separation
    }
}

pub fn compute_acceleration(
    index: usize,
    snapshot: &Snapshot,
    tree: &QuadTree,
    params: &SimulationParams,
    scratch: &mut NeighborScratch,
) -> Vec2 {
    compute_forces(index, snapshot, tree, params, scratch).total()
}

pub fn compute_forces(
    index: usize,
    snapshot: &Snapshot,
    tree: &QuadTree,
    params: &SimulationParams,
    scratch: &mut NeighborScratch,
) -> FlockForces {
    let position = snapshot.positions[index];
    let velocity = snapshot.velocities[index];
    let color = snapshot.colors[index];
    let radius = params.view_radius;
    let radius_sq = radius * radius;

    tree.query_circle_into(position, radius, &mut scratch.hits);
    scratch.seen.clear();

    let mut avg_velocity = Vec2::ZERO;
    let mut avg_position = Vec2::ZERO;
    let mut separation = Vec2::ZERO;
    let mut count = 0usize;

    for hit in &scratch.hits {
        if hit.id == index || !scratch.seen.insert(hit.id) {
            continue;
        }
        if snapshot.colors[hit.id] != color {
            continue;
        }

        // Coincident boids give no direction to push along
        let d_squared = vector::distance_squared(position, hit.position);
        if d_squared <= 0.0 || d_squared >= radius_sq {
            continue;
        }
        let d = vector::distance(position, hit.position);

        avg_velocity += snapshot.velocities[hit.id];
        avg_position += hit.position;
        separation += vector::divide(position - hit.position, d);
        count += 1;
    }

    let mut forces = FlockForces {
        border: Vec2::new(
            border_force(position.x, params.width, radius),
            border_force(position.y, params.height, radius),
        ),
        neighbors: count,
        ..FlockForces::default()
    };

    if count > 0 {
        let n = count as f32;
        avg_velocity = vector::divide(avg_velocity, n);
        avg_position = vector::divide(avg_position, n);
        forces.alignment = (avg_velocity - velocity) * params.adj_rate;
        forces.cohesion = (avg_position - position) * params.adj_rate;
        forces.separation = separation * params.adj_rate;
    }

    forces
}

/// Repulsion from the nearer edge of one axis, zero away from both edges.
///
/// Grows as `1 / distance` and is clamped to [`MAX_BORDER_FORCE`].
pub fn border_force(coordinate: f32, extent: f32, view_radius: f32) -> f32 {
    if coordinate < view_radius {
        (1.0 / coordinate.max(BORDER_EPSILON)).min(MAX_BORDER_FORCE)
    } else if coordinate > extent - view_radius {
        (1.0 / (coordinate - extent).min(-BORDER_EPSILON)).max(-MAX_BORDER_FORCE)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics;

    fn params(size: f32, view_radius: f32, adj_rate: f32) -> SimulationParams {
        SimulationParams {
            width: size,
            height: size,
            view_radius,
            adj_rate,
            quadtree_max_objects: 4,
            quadtree_max_depth: 6,
            ..SimulationParams::default()
        }
    }

    fn snapshot(boids: &[(Vec2, Vec2)], color: BoidColor) -> Snapshot {
        Snapshot {
            positions: boids.iter().map(|b| b.0).collect(),
            velocities: boids.iter().map(|b| b.1).collect(),
            colors: vec![color; boids.len()],
        }
    }

    fn forces_for(snapshot: &Snapshot, params: &SimulationParams) -> Vec<FlockForces> {
        let (tree, _) = physics::build_tick_index(&snapshot.positions, params).expect("index");
        let mut scratch = NeighborScratch::default();
        (0..snapshot.len())
            .map(|i| compute_forces(i, snapshot, &tree, params, &mut scratch))
            .collect()
    }

    #[test]
    fn pair_separation_is_equal_and_opposite() {
        let params = params(100.0, 10.0, 0.1);
        let snap = snapshot(
            &[(Vec2::new(10.0, 50.0), Vec2::ZERO), (Vec2::new(15.0, 50.0), Vec2::ZERO)],
            BoidColor::Gray,
        );
        let forces = forces_for(&snap, &params);

        assert_eq!(forces[0].neighbors, 1);
        assert_eq!(forces[1].neighbors, 1);
        assert!(forces[0].separation.x < 0.0);
        assert!(forces[1].separation.x > 0.0);
        assert_eq!(forces[0].separation, -forces[1].separation);
        assert_eq!(forces[0].separation.y, 0.0);
        assert!((forces[0].separation.x + 0.1).abs() < 1e-6);
        assert_eq!(forces[0].border, Vec2::ZERO);
    }

    #[test]
    fn isolated_boid_gets_no_flocking_terms() {
        let params = params(100.0, 10.0, 0.1);
        let snap = snapshot(
            &[(Vec2::new(50.0, 50.0), Vec2::new(0.3, -0.2)), (Vec2::new(75.0, 75.0), Vec2::ZERO)],
            BoidColor::Gray,
        );
        let forces = forces_for(&snap, &params)[0];
        assert_eq!(forces.neighbors, 0);
        assert_eq!(forces.total(), Vec2::ZERO);
    }

    #[test]
    fn other_colors_are_ignored() {
        let params = params(100.0, 10.0, 0.1);
        let mut snap = snapshot(
            &[(Vec2::new(50.0, 50.0), Vec2::ZERO), (Vec2::new(53.0, 50.0), Vec2::ZERO)],
            BoidColor::Gray,
        );
        snap.colors[1] = BoidColor::DarkOrange;
        assert_eq!(forces_for(&snap, &params)[0].neighbors, 0);
    }

    #[test]
    fn coincident_neighbors_are_skipped() {
        let params = params(100.0, 10.0, 0.1);
        let snap = snapshot(
            &[(Vec2::new(50.0, 50.0), Vec2::ZERO), (Vec2::new(50.0, 50.0), Vec2::ONE)],
            BoidColor::Gray,
        );
        let forces = forces_for(&snap, &params)[0];
        assert_eq!(forces.neighbors, 0);
        assert!(forces.total().is_finite());
    }

    #[test]
    fn neighbor_across_the_seam_counts_once() {
        let params = params(100.0, 10.0, 0.1);
        let snap = snapshot(
            &[(Vec2::new(1.0, 50.0), Vec2::ZERO), (Vec2::new(98.0, 50.0), Vec2::new(0.5, 0.0))],
            BoidColor::Gray,
        );
        let forces = forces_for(&snap, &params);

        assert_eq!(forces[0].neighbors, 1);
        // Neighbor sits 3 units to the left through the seam
        assert!(forces[0].separation.x > 0.0);
        assert!(forces[0].cohesion.x < 0.0);
        assert!((forces[0].alignment.x - 0.05).abs() < 1e-6);
        assert_eq!(forces[1].neighbors, 1);
        assert!(forces[1].separation.x < 0.0);
    }

    #[test]
    fn real_entry_and_ghost_in_range_count_once() {
        // Radius wide enough that both the real entry and its ghost are in reach
        let params = params(100.0, 60.0, 0.1);
        let snap = snapshot(
            &[(Vec2::new(20.0, 50.0), Vec2::ZERO), (Vec2::new(70.0, 50.0), Vec2::ZERO)],
            BoidColor::YellowGreen,
        );
        let (tree, _) = physics::build_tick_index(&snap.positions, &params).expect("index");
        let raw_hits = tree
            .query_circle(snap.positions[0], params.view_radius)
            .into_iter()
            .filter(|o| o.id == 1)
            .count();
        assert!(raw_hits >= 2, "expected real entry plus ghost, got {raw_hits}");

        let mut scratch = NeighborScratch::default();
        let forces = compute_forces(0, &snap, &tree, &params, &mut scratch);
        assert_eq!(forces.neighbors, 1);
    }

    #[test]
    fn border_force_is_bounded() {
        assert_eq!(border_force(50.0, 100.0, 10.0), 0.0);
        assert_eq!(border_force(0.0, 100.0, 10.0), MAX_BORDER_FORCE);
        assert_eq!(border_force(0.01, 100.0, 10.0), MAX_BORDER_FORCE);
        assert!((border_force(5.0, 100.0, 10.0) - 0.2).abs() < 1e-6);
        assert!((border_force(95.0, 100.0, 10.0) + 0.2).abs() < 1e-6);
        assert_eq!(border_force(100.0, 100.0, 10.0), -MAX_BORDER_FORCE);
        assert_eq!(border_force(99.9999, 100.0, 10.0), -MAX_BORDER_FORCE);
    }

    #[test]
    fn capture_copies_every_slot() {
        let boids = [
            Boid::new(0, Vec2::new(1.0, 2.0), Vec2::new(0.1, 0.2)),
            Boid::new(1, Vec2::new(3.0, 4.0), Vec2::new(-0.3, 0.4)),
        ];
        let snap = Snapshot::capture(&boids);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.positions[1], Vec2::new(3.0, 4.0));
        assert_eq!(snap.velocities[0], Vec2::new(0.1, 0.2));
        assert_eq!(snap.colors, vec![BoidColor::DarkOrange, BoidColor::Gray]);
    }
}
