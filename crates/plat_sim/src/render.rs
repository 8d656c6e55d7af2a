//! Renderer-facing snapshot of a simulation frame.
//!
//! The simulation never draws. Each frame the host asks for a [`FrameView`]:
//! a flat, ordered list of textured quads in logical screen space plus the
//! optional debug overlay. Draw order is sky, parallax strips, background
//! decor, level tiles, characters, bullets, foreground decor, debug.

use crate::camera::Camera;
use crate::catalog::{SpriteCatalog, TextureId};
use crate::config::SimContext;
use crate::entity::Entity;
use crate::geometry::Rect;
use crate::world::Simulation;

pub const CLEAR_COLOR: [u8; 3] = [20, 10, 30];
pub const COLLIDER_COLOR: [u8; 4] = [255, 0, 0, 150];
pub const SENSOR_COLOR: [u8; 4] = [0, 0, 255, 150];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub texture: TextureId,
    /// Source rect within the sprite sheet; `None` draws the whole texture.
    pub src: Option<Rect>,
    pub dst: Rect,
    pub flip_x: bool,
    /// Color multiplier; 1.0 draws the texture unchanged.
    pub tint: f32,
}

/// A horizontally tiled background strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxStrip {
    pub texture: TextureId,
    pub dst: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugRect {
    pub rect: Rect,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Default)]
pub struct FrameView {
    pub sky: Option<DrawCommand>,
    pub parallax: Vec<ParallaxStrip>,
    pub sprites: Vec<DrawCommand>,
    pub debug_rects: Vec<DebugRect>,
    pub debug_text: Option<String>,
}

/// Scroll state for one background layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxLayer {
    pub texture: TextureId,
    pub factor: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    scroll: f32,
}

impl ParallaxLayer {
    pub fn new(texture: TextureId, factor: f32, y: f32, catalog: &SpriteCatalog) -> Self {
        let [width, height] = catalog.texture_size(texture);
        Self {
            texture,
            factor,
            y,
            width,
            height,
            scroll: 0.0,
        }
    }

    /// Layers named in the tuning file. Unknown textures were rejected at validation.
    pub fn from_config(ctx: &SimContext) -> Vec<Self> {
        ctx.config
            .parallax
            .iter()
            .filter_map(|layer| {
                TextureId::from_name(&layer.texture)
                    .map(|id| Self::new(id, layer.factor, layer.y, &ctx.catalog))
            })
            .collect()
    }

    /// Scroll against the player's horizontal motion, wrapped into `(-width, 0]`.
    pub fn advance(&mut self, x_velocity: f32, dt: f32) {
        self.scroll -= x_velocity * self.factor * dt;
        if self.width <= 0.0 {
            self.scroll = 0.0;
            return;
        }
        let wrapped = self.scroll.rem_euclid(self.width);
        self.scroll = if wrapped == 0.0 {
            0.0
        } else {
            wrapped - self.width
        };
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Two texture widths starting at the scroll offset, so the screen stays covered.
    pub fn strip(&self) -> ParallaxStrip {
        ParallaxStrip {
            texture: self.texture,
            dst: Rect::new(self.scroll, self.y, self.width * 2.0, self.height),
        }
    }
}

impl Simulation {
    pub fn frame_view(&self) -> FrameView {
        let ctx = self.context();
        let camera = self.camera();
        let tile = ctx.config.world.tile_size;
        let mut view = FrameView {
            sky: Some(DrawCommand {
                texture: TextureId::BgSky,
                src: None,
                dst: Rect::new(0.0, 0.0, camera.viewport.w, camera.viewport.h),
                flip_x: false,
                tint: 1.0,
            }),
            parallax: self.parallax().iter().map(ParallaxLayer::strip).collect(),
            ..FrameView::default()
        };

        for decor in self.background() {
            view.sprites.push(decor_command(decor, camera, &ctx.catalog));
        }
        for entity in self.level().iter().chain(self.characters()) {
            view.sprites
                .push(sprite_command(entity, camera, tile, tile, ctx));
        }
        for bullet in self.bullets().iter().filter(|b| !b.is_inactive_bullet()) {
            let size = bullet.collider.size();
            view.sprites
                .push(sprite_command(bullet, camera, size.x, size.y, ctx));
        }
        for decor in self.foreground() {
            view.sprites.push(decor_command(decor, camera, &ctx.catalog));
        }

        if self.debug_mode() {
            let drawn = self
                .level()
                .iter()
                .chain(self.characters())
                .chain(self.bullets().iter().filter(|b| !b.is_inactive_bullet()));
            for entity in drawn {
                view.debug_rects.push(DebugRect {
                    rect: screen_rect(entity.world_rect(), camera),
                    color: COLLIDER_COLOR,
                });
                view.debug_rects.push(DebugRect {
                    rect: screen_rect(entity.ground_sensor(), camera),
                    color: SENSOR_COLOR,
                });
            }
            view.debug_text = Some(self.debug_line());
        }

        log::trace!(
            "Frame view: {} sprites, {} debug rects",
            view.sprites.len(),
            view.debug_rects.len()
        );
        view
    }
}

fn screen_rect(world: Rect, camera: &Camera) -> Rect {
    world.translated(-glam::Vec2::new(camera.viewport.x, camera.viewport.y))
}

fn sprite_command(
    entity: &Entity,
    camera: &Camera,
    width: f32,
    height: f32,
    ctx: &SimContext,
) -> DrawCommand {
    let frame = entity.animations.current_frame() as f32;
    let screen = camera.to_screen(entity.pos);
    DrawCommand {
        texture: entity.texture,
        src: Some(Rect::new(frame * width, 0.0, width, height)),
        dst: Rect::new(screen.x, screen.y, width, height),
        flip_x: entity.dir < 0.0,
        tint: if entity.flash.active {
            ctx.config.effects.flash_tint
        } else {
            1.0
        },
    }
}

fn decor_command(entity: &Entity, camera: &Camera, catalog: &SpriteCatalog) -> DrawCommand {
    let [w, h] = catalog.texture_size(entity.texture);
    let screen = camera.to_screen(entity.pos);
    DrawCommand {
        texture: entity.texture,
        src: None,
        dst: Rect::new(screen.x, screen.y, w, h),
        flip_x: false,
        tint: 1.0,
    }
}
