/*
 * Boid Module
 *
 * This module defines the Boid record and its color tag. A boid only flocks
 * with boids of its own color, so colors split the population into groups
 * that ignore each other.
 *
 * Boids are created once at startup from a seeded generator and then only
 * rewritten by the tick; ids equal slot indices and never change.
 */

use glam::Vec2;
use rand::Rng;

/// Flocking group. Compared for equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoidColor {
    Gray,
    DarkOrange,
    CornflowerBlue,
    YellowGreen,
}

impl BoidColor {
    // Every 7th boid is orange, then every 11th blue, then every 13th green
    pub fn for_id(id: usize) -> Self {
        if id % 7 == 0 {
            BoidColor::DarkOrange
        } else if id % 11 == 0 {
            BoidColor::CornflowerBlue
        } else if id % 13 == 0 {
            BoidColor::YellowGreen
        } else {
            BoidColor::Gray
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: BoidColor,
}

impl Boid {
    pub fn new(id: usize, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
            color: BoidColor::for_id(id),
        }
    }

    /// Random position in `[0, width) × [0, height)` and velocity in `[-1, 1)²`.
    pub fn random<R: Rng + ?Sized>(id: usize, width: f32, height: f32, rng: &mut R) -> Self {
        let x = rng.gen_range(0.0..width);
        let y = rng.gen_range(0.0..height);
        let vx = rng.gen_range(-1.0..1.0);
        let vy = rng.gen_range(-1.0..1.0);
        Self::new(id, Vec2::new(x, y), Vec2::new(vx, vy))
    }
}
