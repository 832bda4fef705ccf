/*
 * Quadtree Module
 *
 * This module defines the QuadTree used for neighbor lookups. Each node covers
 * an axis-aligned region and holds up to `max_objects` entries; past that it
 * splits into four equal quadrants until `max_depth` is reached.
 *
 * The tree stores copies of (id, position) pairs rather than references to
 * boids, so the same id may appear more than once (ghost entries placed across
 * the wrap seam). Readers deduplicate by id.
 *
 * Quadrant order is NE, NW, SW, SE with y growing "north". Points on a midpoint
 * go to the east / north side so each point has exactly one home leaf.
 */

use glam::Vec2;
use tracing::warn;

use crate::error::IndexError;
use crate::vector;

pub const NUM_QUADRANTS: usize = 4;

const NORTH_EAST: usize = 0;
const NORTH_WEST: usize = 1;
const SOUTH_WEST: usize = 2;
const SOUTH_EAST: usize = 3;

/// Axis-aligned rectangle anchored at its low corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Square enclosing a circle, padded outward by a few ulps so a point
    /// exactly on the rim still passes the closed containment test after
    /// `x + width` rounds.
    pub fn around(center: Vec2, radius: f32) -> Self {
        let magnitude = center.x.abs().max(center.y.abs()) + radius.abs();
        let padded = radius + magnitude * 4.0 * f32::EPSILON;
        let low = vector::add_scalar(center, -padded);
        Self::new(low.x, low.y, padded * 2.0, padded * 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open containment: `[x, x+w) × [y, y+h)`.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.top()
    }

    /// Closed containment, used for query rectangles.
    #[inline]
    pub fn contains_inclusive(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.top()
    }

    // Touching edges count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.x > self.right()
            || other.right() < self.x
            || other.y > self.top()
            || other.top() < self.y)
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    // Pull a point into the half-open region
    fn clamp_inside(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            clamp_half_open(p.x, self.x, self.right()),
            clamp_half_open(p.y, self.y, self.top()),
        )
    }

    fn midpoint(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

fn clamp_half_open(value: f32, low: f32, high: f32) -> f32 {
    if value.is_nan() || value < low {
        return low;
    }
    if value >= high {
        // One step inside the open edge
        let step = high.abs().max(1.0) * f32::EPSILON;
        return (high - step).max(low);
    }
    value
}

/// One index entry. Several entries may share an id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadObject {
    pub id: usize,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    bounds: Bounds,
    objects: Vec<QuadObject>,
    children: Option<Box<[QuadTree; NUM_QUADRANTS]>>,
    depth: usize,
    max_objects: usize,
    max_depth: usize,
}

impl QuadTree {
    pub fn new(bounds: Bounds, max_objects: usize, max_depth: usize) -> Result<Self, IndexError> {
        if !bounds.is_valid() {
            return Err(IndexError::InvalidBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }
        Ok(Self::node(bounds, 0, max_objects, max_depth))
    }

    fn node(bounds: Bounds, depth: usize, max_objects: usize, max_depth: usize) -> Self {
        Self {
            bounds,
            objects: Vec::with_capacity(max_objects.saturating_add(1).min(64)),
            children: None,
            depth,
            max_objects,
            max_depth,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }

    /// Entries held directly by this node (always empty once divided).
    pub fn objects(&self) -> &[QuadObject] {
        &self.objects
    }

    pub fn children(&self) -> Option<&[QuadTree; NUM_QUADRANTS]> {
        self.children.as_deref()
    }

    // Total number of entries in this subtree
    pub fn len(&self) -> usize {
        match &self.children {
            Some(children) => children.iter().map(QuadTree::len).sum(),
            None => self.objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset to a single undivided root with no entries.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.children = None;
    }

    /// Insert an entry at `position`.
    ///
    /// A position outside the root bounds is a caller bug: debug builds panic,
    /// release builds clamp it into bounds and log, so the entry is never lost.
    pub fn insert(&mut self, id: usize, position: Vec2) {
        let position = if self.bounds.contains(position) {
            position
        } else {
            if cfg!(debug_assertions) {
                panic!(
                    "quadtree insert of id {id} at {position:?} outside root bounds {:?}",
                    self.bounds
                );
            }
            let clamped = self.bounds.clamp_inside(position);
            warn!(id, ?position, ?clamped, "clamped out-of-bounds quadtree insert");
            clamped
        };
        self.insert_object(QuadObject { id, position });
    }

    fn insert_object(&mut self, object: QuadObject) {
        if let Some(children) = self.children.as_mut() {
            let quadrant = quadrant_for(&self.bounds, object.position);
            children[quadrant].insert_object(object);
            return;
        }

        self.objects.push(object);

        if self.objects.len() > self.max_objects && self.depth < self.max_depth && self.can_split() {
            self.split();
        }
    }

    // Splitting only helps if the entries can end up in different quadrants
    // and the quadrants are still strictly smaller than this node
    fn can_split(&self) -> bool {
        let Bounds { x, y, width, height } = self.bounds;
        let mid = self.bounds.midpoint();
        let shrinks = mid.x > x && mid.x < x + width && mid.y > y && mid.y < y + height;
        let first = self.objects[0].position;
        shrinks && self.objects.iter().any(|o| o.position != first)
    }

    // Divide into four quadrants and push every entry down into its quadrant
    fn split(&mut self) {
        let Bounds { x, y, width, height } = self.bounds;
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        let depth = self.depth + 1;
        let (max_objects, max_depth) = (self.max_objects, self.max_depth);
        let child = |cx: f32, cy: f32| {
            QuadTree::node(Bounds::new(cx, cy, half_width, half_height), depth, max_objects, max_depth)
        };

        let mut children = Box::new([
            child(x + half_width, y + half_height), // north east
            child(x, y + half_height),              // north west
            child(x, y),                            // south west
            child(x + half_width, y),               // south east
        ]);

        for object in std::mem::take(&mut self.objects) {
            let quadrant = quadrant_for(&self.bounds, object.position);
            children[quadrant].insert_object(object);
        }

        self.children = Some(children);
    }

    /// Remove the first entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: usize) -> bool {
        if let Some(i) = self.objects.iter().position(|o| o.id == id) {
            self.objects.swap_remove(i);
            return true;
        }

        match self.children.as_mut() {
            Some(children) => children.iter_mut().any(|child| child.remove(id)),
            None => false,
        }
    }

    /// Move an entry: remove by id, then insert at the new position.
    pub fn update(&mut self, id: usize, position: Vec2) {
        self.remove(id);
        self.insert(id, position);
    }

    /// All entries whose position lies in `range` (edges included).
    pub fn query_rect(&self, range: &Bounds) -> Vec<QuadObject> {
        let mut result = Vec::new();
        self.collect_rect(range, &mut result);
        result
    }

    fn collect_rect(&self, range: &Bounds, out: &mut Vec<QuadObject>) {
        if !self.bounds.intersects(range) {
            return;
        }

        out.extend(
            self.objects
                .iter()
                .filter(|o| range.contains_inclusive(o.position))
                .copied(),
        );

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_rect(range, out);
            }
        }
    }

    /// All entries within `radius` of `center`.
    pub fn query_circle(&self, center: Vec2, radius: f32) -> Vec<QuadObject> {
        let mut result = Vec::new();
        self.query_circle_into(center, radius, &mut result);
        result
    }

    /// Same as [`query_circle`](Self::query_circle) but reuses `out`.
    ///
    /// Candidates come from a rectangle query over the circle's bounding
    /// square, then get filtered by squared distance.
    pub fn query_circle_into(&self, center: Vec2, radius: f32, out: &mut Vec<QuadObject>) {
        out.clear();
        self.collect_rect(&Bounds::around(center, radius), out);
        let radius_sq = radius * radius;
        out.retain(|o| vector::distance_squared(o.position, center) <= radius_sq);
    }
}

// Midpoint comparisons use >= on the east/north side and < on the other
#[inline]
fn quadrant_for(bounds: &Bounds, p: Vec2) -> usize {
    let mid = bounds.midpoint();
    match (p.x >= mid.x, p.y >= mid.y) {
        (true, true) => NORTH_EAST,
        (false, true) => NORTH_WEST,
        (false, false) => SOUTH_WEST,
        (true, false) => SOUTH_EAST,
    }
}
