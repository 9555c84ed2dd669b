//! Collision tests
//!
//! Three layers, cheapest first:
//! - broad phase: bounding circles in normalized space
//! - part rectangles: axis-aligned bounds of each transformed sprite
//! - narrow phase: walk one sprite's texels through the other's inverse
//!   transform and compare alpha
//!
//! Bombs skip all of this and use a ring test.

use glam::{Affine2, Vec2};

use crate::content::AlphaMask;
use crate::to_world;

/// Thickness of a bomb's damaging ring (reference pixels)
pub const BOMB_RING_WIDTH: f32 = 20.0;

/// Axis-aligned rectangle in reference pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Where a sprite is drawn: normalized position, rotation in degrees, scale
#[derive(Debug, Clone, Copy)]
pub struct SpritePose<'a> {
    pub mask: &'a AlphaMask,
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl SpritePose<'_> {
    /// Sprite texel space to reference pixels; sprites rotate about their center
    pub fn transform(&self) -> Affine2 {
        let origin = Vec2::new((self.mask.width() / 2) as f32, (self.mask.height() / 2) as f32);
        Affine2::from_scale_angle_translation(self.scale, self.rotation.to_radians(), to_world(self.position))
            * Affine2::from_translation(-origin)
    }
}

/// Bounds of a `width` x `height` rectangle after `transform`
pub fn bounding_rect(transform: &Affine2, width: u32, height: u32) -> Rect {
    let (w, h) = (width as f32, height as f32);
    let corners = [
        transform.transform_point2(Vec2::ZERO),
        transform.transform_point2(Vec2::new(w, 0.0)),
        transform.transform_point2(Vec2::new(0.0, h)),
        transform.transform_point2(Vec2::new(w, h)),
    ];
    let mut min = corners[0];
    let mut max = corners[0];
    for c in &corners[1..] {
        min = min.min(*c);
        max = max.max(*c);
    }
    Rect { min, max }
}

/// True if any opaque texel of A lands on an opaque texel of B.
///
/// Walks A row by row; each A texel is mapped into B's texel space and
/// rounded to the nearest texel.
pub fn intersect_pixels(transform_a: &Affine2, mask_a: &AlphaMask, transform_b: &Affine2, mask_b: &AlphaMask) -> bool {
    if transform_b.matrix2.determinant().abs() <= f32::EPSILON {
        return false;
    }
    let a_to_b = transform_b.inverse() * *transform_a;

    let step_x = a_to_b.transform_vector2(Vec2::X);
    let step_y = a_to_b.transform_vector2(Vec2::Y);
    let mut row_start = a_to_b.transform_point2(Vec2::ZERO);

    for ya in 0..mask_a.height() as i32 {
        let mut pos_in_b = row_start;
        for xa in 0..mask_a.width() as i32 {
            let xb = pos_in_b.x.round() as i32;
            let yb = pos_in_b.y.round() as i32;
            if mask_a.is_opaque(xa, ya) && mask_b.is_opaque(xb, yb) {
                return true;
            }
            pos_in_b += step_x;
        }
        row_start += step_y;
    }
    false
}

/// Pixel-accurate test between two sprites, symmetric in its arguments
pub fn sprites_collide(a: &SpritePose<'_>, b: &SpritePose<'_>) -> bool {
    let ta = a.transform();
    let tb = b.transform();
    if !bounding_rect(&ta, a.mask.width(), a.mask.height())
        .intersects(&bounding_rect(&tb, b.mask.width(), b.mask.height()))
    {
        return false;
    }
    intersect_pixels(&ta, a.mask, &tb, b.mask) || intersect_pixels(&tb, b.mask, &ta, a.mask)
}

/// Bounding circle overlap in normalized coordinates
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let r = radius_a + radius_b;
    pos_a.distance_squared(pos_b) <= r * r
}

/// Whether a target at `target` sits on a bomb's expanding ring.
///
/// Positions are normalized; `radius` is in reference pixels. The ring is
/// the band `max(radius - 20, 0) < d < radius`, so the center never hits.
pub fn bomb_ring_hits(bomb: Vec2, radius: f32, target: Vec2) -> bool {
    let d_sq = to_world(bomb).distance_squared(to_world(target));
    let inner = (radius - BOMB_RING_WIDTH).max(0.0);
    d_sq < radius * radius && d_sq > inner * inner
}
