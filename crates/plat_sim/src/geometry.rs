//! Axis-aligned rectangles and entity colliders.
//!
//! All rectangles are top-left anchored in a y-down world (screen convention):
//! `x`/`y` is the top-left corner, `w`/`h` extend right and down.
//!
//! Intersection uses closed intervals: two rectangles that share an edge
//! produce a zero-area overlap and still count as touching. Resting contact
//! between a standing entity and the floor therefore keeps reporting a
//! (zero-depth) vertical collision, which pins vertical velocity at zero.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Overlap of `self` and `other`, or `None` when they are apart.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if self.w < 0.0 || self.h < 0.0 || other.w < 0.0 || other.h < 0.0 {
            return None;
        }
        let x0 = self.x.max(other.x);
        let x1 = self.right().min(other.right());
        let y0 = self.y.max(other.y);
        let y1 = self.bottom().min(other.bottom());
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Physical extent of an entity, relative to its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    offset: Vec2,
    size: Vec2,
}

impl Collider {
    pub fn new(offset: Vec2, size: Vec2) -> Result<Self, String> {
        if size.x < 0.0 || size.y < 0.0 || !size.is_finite() || !offset.is_finite() {
            return Err(format!(
                "Collider validation failed: invalid size {}x{} at offset ({}, {})",
                size.x, size.y, offset.x, offset.y
            ));
        }
        Ok(Self { offset, size })
    }

    /// Square collider anchored at the entity position. Negative sides clamp to zero.
    pub fn square(side: f32) -> Self {
        let side = side.max(0.0);
        Self {
            offset: Vec2::ZERO,
            size: Vec2::splat(side),
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn world_rect(&self, position: Vec2) -> Rect {
        let origin = position + self.offset;
        Rect::new(origin.x, origin.y, self.size.x, self.size.y)
    }

    /// One unit tall strip directly under the collider's footprint.
    pub fn ground_sensor(&self, position: Vec2) -> Rect {
        let body = self.world_rect(position);
        Rect::new(body.x, body.bottom(), body.w, 1.0)
    }
}
