/*
 * Vector Module
 *
 * Small helpers on top of glam's Vec2 used by the flocking rules and the
 * tick step. Everything here is a pure function of its arguments.
 */

use glam::Vec2;

// Restrict each component of the vector to [lower, upper]
#[inline]
pub fn limit(vector: Vec2, lower: f32, upper: f32) -> Vec2 {
    Vec2::new(
        vector.x.max(lower).min(upper),
        vector.y.max(lower).min(upper),
    )
}

// Add the same scalar to both components
#[inline]
pub fn add_scalar(vector: Vec2, value: f32) -> Vec2 {
    Vec2::new(vector.x + value, vector.y + value)
}

#[inline]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    distance_squared(a, b).sqrt()
}

/// Divide both components by `divisor`.
///
/// Callers guard against a zero divisor; the flocking rules only divide by a
/// neighbor count or a distance that has already been checked to be positive.
#[inline]
pub fn divide(vector: Vec2, divisor: f32) -> Vec2 {
    debug_assert!(divisor != 0.0, "vector division by zero");
    Vec2::new(vector.x / divisor, vector.y / divisor)
}
