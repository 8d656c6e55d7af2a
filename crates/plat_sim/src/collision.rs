//! Rectangle overlap detection and kind-specific collision response.
//!
//! Responses are asymmetric: `a` is the entity currently being updated and
//! `b` is the entity it overlaps. Both may be mutated immediately, so when two
//! entities would push each other in the same frame, the one updated first
//! moves and the other sees the already-resolved positions (first writer wins).
//!
//! Push-out picks the axis of shallower penetration from the overlap rect
//! (`w < h` means horizontal). This is a minimum-penetration heuristic, not a
//! swept test; fast movers at low frame rates can tunnel through thin tiles.

use crate::catalog::{Clip, TextureId};
use crate::config::SimContext;
use crate::entity::{BulletState, EnemyState, Entity, EntityKind, PlayerState};
use crate::geometry::{Collider, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

pub fn push_axis(overlap: &Rect) -> Axis {
    if overlap.w < overlap.h {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// What happens when `a` overlaps `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    None,
    PushOut,
    DamagePlayer,
    BulletStrikesEnemy,
    BulletImpact,
}

fn classify(a: &Entity, b: &Entity) -> Response {
    match (&a.kind, &b.kind) {
        (EntityKind::Player(_), _) if !a.is_live_player() => Response::None,
        (EntityKind::Player(_), EntityKind::Level) => Response::PushOut,
        // Corpses still hurt while they fall.
        (EntityKind::Player(_), EntityKind::Enemy(_)) => Response::DamagePlayer,
        (EntityKind::Bullet(bullet), _) if bullet.state != BulletState::Moving => {
            Response::None
        }
        (EntityKind::Bullet(_), EntityKind::Level) => Response::BulletImpact,
        (EntityKind::Bullet(_), EntityKind::Enemy(_)) if b.is_live_enemy() => {
            Response::BulletStrikesEnemy
        }
        (EntityKind::Enemy(_), EntityKind::Level) if a.is_live_enemy() => Response::PushOut,
        (EntityKind::Enemy(_), EntityKind::Enemy(_))
            if a.is_live_enemy() && b.is_live_enemy() =>
        {
            Response::PushOut
        }
        // Bullets pass through corpses and the shooter.
        _ => Response::None,
    }
}

/// Test `a` against `b` and apply the response. Returns true on overlap.
pub fn check_collision(a: &mut Entity, b: &mut Entity, ctx: &SimContext) -> bool {
    let Some(overlap) = a.world_rect().intersection(&b.world_rect()) else {
        return false;
    };
    respond(a, b, &overlap, ctx);
    true
}

fn respond(a: &mut Entity, b: &mut Entity, overlap: &Rect, ctx: &SimContext) {
    match classify(a, b) {
        Response::None => {}
        Response::PushOut => push_out(a, overlap),
        Response::DamagePlayer => damage_player(a, ctx),
        Response::BulletStrikesEnemy => {
            strike_enemy(a, b, ctx);
            finish_bullet(a, overlap, ctx);
        }
        Response::BulletImpact => finish_bullet(a, overlap, ctx),
    }
}

/// Move `a` out of the overlap against its direction of travel.
///
/// The blocked velocity component is zeroed, except that enemies blocked
/// horizontally turn around instead.
pub fn push_out(a: &mut Entity, overlap: &Rect) {
    match push_axis(overlap) {
        Axis::Horizontal => {
            if a.vel.x > 0.0 {
                a.pos.x -= overlap.w;
            } else if a.vel.x < 0.0 {
                a.pos.x += overlap.w;
            }
            if matches!(a.kind, EntityKind::Enemy(_)) {
                a.vel.x = -a.vel.x;
                a.dir = -a.dir;
            } else {
                a.vel.x = 0.0;
            }
        }
        Axis::Vertical => {
            if a.vel.y > 0.0 {
                a.pos.y -= overlap.h;
            } else if a.vel.y < 0.0 {
                a.pos.y += overlap.h;
            }
            a.vel.y = 0.0;
        }
    }
}

fn damage_player(player: &mut Entity, ctx: &SimContext) {
    let EntityKind::Player(data) = &mut player.kind else {
        return;
    };
    data.health -= 1;
    if data.health > 0 {
        return;
    }
    data.state = PlayerState::Dead;
    log::info!("Player killed by enemy contact");
    player.play(Clip::Die);
    player.vel.x = 0.0;
    player.vel.y = ctx.config.player.death_hop;
}

fn strike_enemy(bullet: &Entity, enemy: &mut Entity, ctx: &SimContext) {
    let tuning = &ctx.config.enemy;
    if enemy.dir == bullet.dir {
        enemy.dir = -bullet.dir;
        enemy.vel.x = -enemy.vel.x;
    }
    enemy.flash.trigger();

    let EntityKind::Enemy(data) = &mut enemy.kind else {
        return;
    };
    data.state = EnemyState::Damaged;
    data.health -= 1;
    let killed = data.health <= 0;
    if killed {
        data.state = EnemyState::Dead;
        log::debug!("Enemy killed at ({:.1}, {:.1})", enemy.pos.x, enemy.pos.y);
        enemy.play(Clip::EnemyDead);
        // Hop up off the floor; dead enemies ignore level geometry and drop through.
        enemy.pos.y -= tuning.death_hop;
    }
    enemy.vel.x += tuning.hit_nudge * enemy.dir;
}

/// Stop a bullet at its point of impact and switch it to the impact effect.
fn finish_bullet(bullet: &mut Entity, overlap: &Rect, ctx: &SimContext) {
    push_out(bullet, overlap);
    bullet.vel = glam::Vec2::ZERO;
    if let EntityKind::Bullet(data) = &mut bullet.kind {
        data.state = BulletState::Colliding;
    }
    bullet.play(Clip::BulletHit);
    bullet.collider = Collider::square(ctx.catalog.frame_side(TextureId::BulletHit));
}
