use glam::Vec2;

use crate::entity::Entity;
use crate::geometry::Rect;

/// Horizontally scrolling window onto the world, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub viewport: Rect,
}

impl Camera {
    pub fn new(logical_width: f32, logical_height: f32) -> Self {
        Self {
            viewport: Rect::new(0.0, 0.0, logical_width, logical_height),
        }
    }

    /// Center the viewport horizontally on `target`'s tile.
    pub fn follow(&mut self, target: &Entity, tile_size: f32) {
        self.viewport.x = target.pos.x + tile_size / 2.0 - self.viewport.w / 2.0;
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - Vec2::new(self.viewport.x, self.viewport.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TextureId;

    #[test]
    fn follow_centers_on_target_tile() {
        let mut camera = Camera::new(640.0, 480.0);
        let target = Entity::tile(Vec2::new(1000.0, 300.0), 32.0, TextureId::Stone);
        camera.follow(&target, 32.0);
        assert_eq!(camera.viewport.x, 1000.0 + 16.0 - 320.0);
        assert_eq!(camera.viewport.y, 0.0);
        assert_eq!(
            camera.to_screen(Vec2::new(1000.0, 300.0)),
            Vec2::new(304.0, 300.0)
        );
    }
}
