//! Per-entity simulation step.
//!
//! One call advances a single entity by `dt`: animation and flash clocks,
//! gravity, the kind-specific state machine, horizontal acceleration with the
//! speed clamp, integration, then a collision pass against every other
//! entity followed by the ground-sensor check.
//!
//! The entity being updated is borrowed out of its layer, so its neighbours
//! are handed over as the slices before and after it (see [`Neighbours`]).

use glam::Vec2;
use plat_core::input::{InputState, Key};
use rand::Rng;

use crate::bullets::muzzle_bullet;
use crate::catalog::Clip;
use crate::collision::check_collision;
use crate::config::SimContext;
use crate::entity::{BulletState, EnemyState, Entity, EntityKind, PlayerState};
use crate::geometry::Rect;

/// Read-only inputs shared by every entity update in a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameEnv<'a> {
    pub input: &'a InputState,
    pub ctx: &'a SimContext,
    pub viewport: Rect,
    pub dt: f32,
}

/// Every entity except the one being updated, in scan order.
///
/// `level` holds static geometry and is also what the ground sensor is
/// tested against. Each layer is split in two around the updated entity.
pub struct Neighbours<'a> {
    pub level: [&'a mut [Entity]; 2],
    pub characters: [&'a mut [Entity]; 2],
}

impl<'a> Neighbours<'a> {
    pub fn new(level: [&'a mut [Entity]; 2], characters: [&'a mut [Entity]; 2]) -> Self {
        Self { level, characters }
    }
}

#[derive(Debug, Default)]
pub struct UpdateOutcome {
    /// Bullet fired this frame, to be placed in the pool by the caller.
    pub spawned: Option<Entity>,
    /// The player's death delay ran out.
    pub player_died: bool,
}

#[derive(Debug, Default)]
struct Intent {
    dir_input: f32,
    fire: bool,
    player_died: bool,
}

pub fn update_entity<R: Rng>(
    entity: &mut Entity,
    neighbours: Neighbours<'_>,
    env: &FrameEnv<'_>,
    rng: &mut R,
) -> UpdateOutcome {
    if entity.is_inactive_bullet() {
        return UpdateOutcome::default();
    }
    let dt = env.dt;

    entity.animations.step(dt);
    entity.flash.step(dt);

    if entity.dynamic && !entity.grounded {
        entity.vel.y += env.ctx.config.world.gravity * dt;
    }

    let intent = match entity.kind {
        EntityKind::Player(_) => step_player(entity, env),
        EntityKind::Bullet(_) => {
            step_bullet(entity, env);
            Intent::default()
        }
        EntityKind::Enemy(_) => {
            step_enemy(entity, dt);
            Intent::default()
        }
        EntityKind::Level => Intent::default(),
    };

    let spawned = intent
        .fire
        .then(|| muzzle_bullet(entity, env.ctx, rng));
    if spawned.is_some() {
        log::debug!("Player fired (dir {})", entity.dir);
    }
    if entity.is_live_player()
        && entity.pos.y - env.viewport.y > env.ctx.config.world.logical_height
    {
        if let EntityKind::Player(data) = &mut entity.kind {
            log::debug!("Player fell out of the world");
            data.state = PlayerState::Dead;
            entity.vel.x = 0.0;
        }
    }

    integrate(entity, intent.dir_input, dt);
    resolve_contacts(entity, neighbours, env.ctx);

    UpdateOutcome {
        spawned,
        player_died: intent.player_died,
    }
}

fn step_player(player: &mut Entity, env: &FrameEnv<'_>) -> Intent {
    let tuning = &env.ctx.config;
    let input = env.input;
    let EntityKind::Player(data) = &mut player.kind else {
        return Intent::default();
    };

    if data.state == PlayerState::Dead {
        data.death_timer.step(env.dt);
        return Intent {
            player_died: data.death_timer.is_timed_out(),
            ..Intent::default()
        };
    }

    if input.is_just_pressed(Key::Jump)
        && matches!(data.state, PlayerState::Idle | PlayerState::Running)
    {
        data.state = PlayerState::Jumping;
        player.vel.y += tuning.world.jump_impulse;
    }

    let dir_input = input.horizontal_axis();
    data.weapon_timer.step(env.dt);
    let fire = input.is_held(Key::Fire) && data.weapon_timer.is_timed_out();
    if fire {
        data.weapon_timer.reset();
    }

    let clip = match data.state {
        PlayerState::Idle => {
            if dir_input != 0.0 {
                data.state = PlayerState::Running;
            } else {
                player.vel.x = decelerate(
                    player.vel.x,
                    tuning.player.idle_decel_factor * player.acc.x * env.dt,
                );
            }
            Clip::Idle
        }
        PlayerState::Running => {
            if dir_input == 0.0 {
                data.state = PlayerState::Idle;
            }
            if player.vel.x * player.dir < 0.0 && player.grounded {
                Clip::Slide
            } else {
                Clip::Run
            }
        }
        PlayerState::Jumping => Clip::Jump,
        PlayerState::Dead => Clip::Die,
    };
    player.play(clip);

    Intent {
        dir_input,
        fire,
        player_died: false,
    }
}

/// Move `vel` toward zero by `amount`, stopping exactly at zero.
fn decelerate(vel: f32, amount: f32) -> f32 {
    if vel == 0.0 {
        return 0.0;
    }
    let step = if vel > 0.0 { -amount } else { amount };
    if vel.abs() < step.abs() {
        0.0
    } else {
        vel + step
    }
}

fn step_bullet(bullet: &mut Entity, env: &FrameEnv<'_>) {
    let world = &env.ctx.config.world;
    let screen = bullet.pos - Vec2::new(env.viewport.x, env.viewport.y);
    let done = bullet.animations.is_active_done();
    let EntityKind::Bullet(data) = &mut bullet.kind else {
        return;
    };
    match data.state {
        BulletState::Moving => {
            if screen.x < 0.0
                || screen.x > world.logical_width
                || screen.y < 0.0
                || screen.y > world.logical_height
            {
                data.state = BulletState::Inactive;
            }
        }
        BulletState::Colliding => {
            if done {
                data.state = BulletState::Inactive;
            }
        }
        BulletState::Inactive => {}
    }
}

fn step_enemy(enemy: &mut Entity, dt: f32) {
    let EntityKind::Enemy(data) = &mut enemy.kind else {
        return;
    };
    match data.state {
        EnemyState::Idle => {}
        EnemyState::Damaged => {
            data.damage_timer.step(dt);
        }
        EnemyState::Dead => {
            enemy.vel.x = 0.0;
            if enemy.animations.is_active_done() {
                enemy.animations.freeze(0);
            }
        }
    }
}

/// Apply horizontal intent, clamp speed and move.
///
/// Exceeding the clamp with no intent zeroes horizontal speed.
fn integrate(entity: &mut Entity, dir_input: f32, dt: f32) {
    if dir_input != 0.0 {
        entity.dir = dir_input;
    }
    entity.vel += dir_input * entity.acc * dt;
    if entity.vel.x.abs() > entity.max_speed_x {
        entity.vel.x = dir_input * entity.max_speed_x;
    }
    entity.pos += entity.vel * dt;
}

fn resolve_contacts(entity: &mut Entity, neighbours: Neighbours<'_>, ctx: &SimContext) {
    let Neighbours { level, characters } = neighbours;
    let mut found_ground = false;
    for other in level.into_iter().flatten() {
        check_collision(entity, other, ctx);
        if entity.ground_sensor().intersects(&other.world_rect()) {
            found_ground = true;
        }
    }
    for other in characters.into_iter().flatten() {
        check_collision(entity, other, ctx);
    }

    if entity.grounded == found_ground {
        return;
    }
    entity.grounded = found_ground;
    if found_ground && entity.is_live_player() {
        if let EntityKind::Player(data) = &mut entity.kind {
            data.state = PlayerState::Running;
        }
    }
}
