//! The simulated unit shared by level tiles, the player, enemies and bullets.
//!
//! Transform, velocity, collider and render handles are common to every
//! kind; anything kind-specific (state machines, health, timers) lives in the
//! `EntityKind` payload so it only exists where it means something.

use glam::Vec2;
use plat_core::animation::AnimationSet;
use plat_core::timer::Timer;

use crate::catalog::{Clip, SpriteCatalog, TextureId};
use crate::config::{ColliderConfig, SimConfig};
use crate::geometry::{Collider, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Running,
    Jumping,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Damaged,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletState {
    Moving,
    Colliding,
    Inactive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerData {
    pub state: PlayerState,
    pub health: i32,
    pub weapon_timer: Timer,
    pub death_timer: Timer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyData {
    pub state: EnemyState,
    pub health: i32,
    pub damage_timer: Timer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletData {
    pub state: BulletState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Level,
    Player(PlayerData),
    Enemy(EnemyData),
    Bullet(BulletData),
}

/// Brief white-out tint applied when an entity is hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub active: bool,
    pub timer: Timer,
}

impl Flash {
    pub fn new(duration: f32) -> Self {
        Self {
            active: false,
            timer: Timer::new(duration),
        }
    }

    pub fn trigger(&mut self) {
        self.active = true;
        self.timer.reset();
    }

    pub fn step(&mut self, dt: f32) {
        if self.active && self.timer.step(dt) {
            self.active = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    /// Facing: 1.0 right, -1.0 left.
    pub dir: f32,
    pub collider: Collider,
    pub texture: TextureId,
    pub animations: AnimationSet<Clip>,
    pub dynamic: bool,
    pub grounded: bool,
    pub flash: Flash,
    pub max_speed_x: f32,
    pub kind: EntityKind,
}

impl Entity {
    fn base(pos: Vec2, collider: Collider, texture: TextureId, kind: EntityKind) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            dir: 1.0,
            collider,
            texture,
            animations: AnimationSet::new(),
            dynamic: false,
            grounded: false,
            flash: Flash::new(0.05),
            max_speed_x: 0.0,
            kind,
        }
    }

    /// Static geometry (or decor) covering one tile.
    pub fn tile(pos: Vec2, tile_size: f32, texture: TextureId) -> Self {
        Self::base(pos, Collider::square(tile_size), texture, EntityKind::Level)
    }

    pub fn player(pos: Vec2, config: &SimConfig, catalog: &SpriteCatalog) -> Result<Self, String> {
        let tuning = &config.player;
        let collider = collider_from_config(&tuning.collider)?;
        let mut player = Self::base(
            pos,
            collider,
            TextureId::PlayerIdle,
            EntityKind::Player(PlayerData {
                state: PlayerState::Idle,
                health: tuning.health,
                weapon_timer: Timer::new(tuning.weapon_cooldown),
                death_timer: Timer::new(tuning.death_delay),
            }),
        );
        player.animations = catalog.animation_set(
            &[Clip::Idle, Clip::Run, Clip::Slide, Clip::Jump, Clip::Die],
            Clip::Idle,
        );
        player.acc = Vec2::new(tuning.acceleration, 0.0);
        player.max_speed_x = tuning.max_speed;
        player.dynamic = true;
        player.flash = Flash::new(config.effects.flash_duration);
        Ok(player)
    }

    pub fn enemy(pos: Vec2, config: &SimConfig, catalog: &SpriteCatalog) -> Result<Self, String> {
        let tuning = &config.enemy;
        let collider = collider_from_config(&tuning.collider)?;
        let mut enemy = Self::base(
            pos,
            collider,
            TextureId::Spiny,
            EntityKind::Enemy(EnemyData {
                state: EnemyState::Idle,
                health: tuning.health,
                damage_timer: Timer::new(tuning.damage_duration),
            }),
        );
        enemy.animations = catalog.animation_set(&[Clip::EnemyWalk, Clip::EnemyDead], Clip::EnemyWalk);
        enemy.acc = Vec2::new(tuning.acceleration, 0.0);
        enemy.vel.x = tuning.initial_speed;
        enemy.max_speed_x = tuning.max_speed;
        enemy.dynamic = true;
        enemy.flash = Flash::new(config.effects.flash_duration);
        Ok(enemy)
    }

    /// A freshly fired bullet with rewound animations.
    pub fn bullet(
        pos: Vec2,
        vel: Vec2,
        dir: f32,
        config: &SimConfig,
        catalog: &SpriteCatalog,
    ) -> Self {
        let side = catalog.frame_side(TextureId::Bullet);
        let mut bullet = Self::base(
            pos,
            Collider::square(side),
            TextureId::Bullet,
            EntityKind::Bullet(BulletData {
                state: BulletState::Moving,
            }),
        );
        bullet.animations =
            catalog.animation_set(&[Clip::BulletMoving, Clip::BulletHit], Clip::BulletMoving);
        bullet.vel = vel;
        bullet.dir = dir;
        bullet.max_speed_x = config.bullet.max_speed;
        bullet
    }

    /// Switch to `clip` and the sprite sheet it plays from.
    pub fn play(&mut self, clip: Clip) {
        if self.animations.play(clip) {
            self.texture = clip.texture();
        }
    }

    pub fn world_rect(&self) -> Rect {
        self.collider.world_rect(self.pos)
    }

    pub fn ground_sensor(&self) -> Rect {
        self.collider.ground_sensor(self.pos)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn player_state(&self) -> Option<PlayerState> {
        match &self.kind {
            EntityKind::Player(data) => Some(data.state),
            _ => None,
        }
    }

    pub fn enemy_state(&self) -> Option<EnemyState> {
        match &self.kind {
            EntityKind::Enemy(data) => Some(data.state),
            _ => None,
        }
    }

    pub fn bullet_state(&self) -> Option<BulletState> {
        match &self.kind {
            EntityKind::Bullet(data) => Some(data.state),
            _ => None,
        }
    }

    pub fn is_live_player(&self) -> bool {
        matches!(self.player_state(), Some(state) if state != PlayerState::Dead)
    }

    pub fn is_live_enemy(&self) -> bool {
        matches!(self.enemy_state(), Some(state) if state != EnemyState::Dead)
    }

    pub fn is_inactive_bullet(&self) -> bool {
        self.bullet_state() == Some(BulletState::Inactive)
    }
}

fn collider_from_config(config: &ColliderConfig) -> Result<Collider, String> {
    Collider::new(Vec2::new(config.x, config.y), Vec2::new(config.w, config.h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_starts_idle_with_weapon_cooling_down() {
        let config = SimConfig::default();
        let player = Entity::player(Vec2::ZERO, &config, &SpriteCatalog::default())
            .expect("default player is valid");
        assert_eq!(player.player_state(), Some(PlayerState::Idle));
        assert!(player.is_live_player());
        assert!(player.dynamic);
        assert_eq!(player.max_speed_x, 150.0);
        assert_eq!(player.animations.active(), Some(Clip::Idle));
        match &player.kind {
            EntityKind::Player(data) => {
                assert_eq!(data.health, 3);
                assert!(!data.weapon_timer.is_timed_out());
                assert!(!data.death_timer.is_timed_out());
            }
            other => panic!("expected player payload, got {other:?}"),
        }
    }

    #[test]
    fn enemy_walks_right_from_spawn() {
        let config = SimConfig::default();
        let enemy = Entity::enemy(Vec2::new(64.0, 0.0), &config, &SpriteCatalog::default())
            .expect("default enemy is valid");
        assert_eq!(enemy.vel.x, 50.0);
        assert_eq!(enemy.texture, TextureId::Spiny);
        assert_eq!(
            enemy.world_rect(),
            Rect::new(66.0, 2.0, 28.0, 30.0)
        );
        assert!(enemy.is_live_enemy());
    }

    #[test]
    fn invalid_collider_config_is_rejected() {
        let mut config = SimConfig::default();
        config.enemy.collider.w = -3.0;
        let err = Entity::enemy(Vec2::ZERO, &config, &SpriteCatalog::default())
            .expect_err("negative collider must fail");
        assert!(err.contains("invalid size"));
    }

    #[test]
    fn play_switches_texture_with_clip() {
        let config = SimConfig::default();
        let mut player = Entity::player(Vec2::ZERO, &config, &SpriteCatalog::default())
            .expect("default player is valid");
        player.play(Clip::Run);
        assert_eq!(player.texture, TextureId::PlayerRun);
        // Clips the entity does not own leave it untouched.
        player.play(Clip::BulletHit);
        assert_eq!(player.texture, TextureId::PlayerRun);
        assert_eq!(player.animations.active(), Some(Clip::Run));
    }

    #[test]
    fn flash_ends_after_duration() {
        let mut flash = Flash::new(0.05);
        flash.trigger();
        flash.step(0.03);
        assert!(flash.active);
        flash.step(0.03);
        assert!(!flash.active);
    }
}
