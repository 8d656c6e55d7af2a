//! Bullet storage and muzzle spawning.
//!
//! Bullets live in a slot arena that never shrinks. A spent bullet stays in
//! its slot as `Inactive` until a later shot reuses it; the pool only grows
//! when every slot is still in flight or showing its impact effect.

use glam::Vec2;
use rand::Rng;

use crate::config::SimContext;
use crate::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BulletHandle(usize);

impl BulletHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct BulletPool {
    slots: Vec<Entity>,
    growth_warning: usize,
}

impl BulletPool {
    /// `growth_warning` is the size above which new slots are logged.
    pub fn new(growth_warning: usize) -> Self {
        Self {
            slots: Vec::new(),
            growth_warning,
        }
    }

    /// Store `bullet` in the first inactive slot, or append a new one.
    pub fn spawn(&mut self, bullet: Entity) -> BulletHandle {
        if let Some(index) = self.slots.iter().position(Entity::is_inactive_bullet) {
            self.slots[index] = bullet;
            return BulletHandle(index);
        }
        self.slots.push(bullet);
        let len = self.slots.len();
        if len > self.growth_warning {
            log::warn!("Bullet pool grew to {len} slots");
        }
        BulletHandle(len - 1)
    }

    pub fn get(&self, handle: BulletHandle) -> Option<&Entity> {
        self.slots.get(handle.0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|b| !b.is_inactive_bullet()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter()
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Entity] {
        &mut self.slots
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Build the bullet `shooter` fires this frame.
///
/// It leaves the muzzle on the facing side at mid-tile height, inherits the
/// shooter's horizontal velocity and gets a random vertical spread.
pub fn muzzle_bullet<R: Rng>(shooter: &Entity, ctx: &SimContext, rng: &mut R) -> Entity {
    let tuning = &ctx.config.bullet;
    let dir = shooter.dir;
    let pos = Vec2::new(
        shooter.pos.x + tuning.muzzle_offset * (dir + 1.0) / 2.0,
        shooter.pos.y + ctx.config.world.tile_size / 2.0 + 1.0,
    );
    let half_spread = tuning.spread / 2.0;
    let spread = if half_spread > 0.0 {
        rng.gen_range(-half_spread..half_spread)
    } else {
        0.0
    };
    let vel = Vec2::new(shooter.vel.x + tuning.muzzle_speed * dir, spread);
    Entity::bullet(pos, vel, dir, &ctx.config, &ctx.catalog)
}
