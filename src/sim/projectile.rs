//! Arrows
//!
//! At most one arrow is ever in flight. A new one can only be fired once the
//! previous arrow is gone and the fire cooldown has run out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyId};
use super::geometry::Rect;
use super::physics::{PhysicsWorld, integrate};
use super::state::Facing;
use crate::facing_angle;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrowId(pub u32);

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub id: ArrowId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Launch angle in radians (0 = right, screen space)
    pub angle: f32,
    /// Unrotated size: width across, length along the flight direction
    pub size: Vec2,
}

impl Arrow {
    /// Axis-aligned bounds of the rotated arrow
    pub fn body(&self) -> Rect {
        let (sin, cos) = self.angle.sin_cos();
        let half_len = self.size.y / 2.0;
        let half_w = self.size.x / 2.0;
        let half = Vec2::new(
            cos.abs() * half_len + sin.abs() * half_w,
            sin.abs() * half_len + cos.abs() * half_w,
        );
        Rect {
            center: self.pos,
            size: half * 2.0,
        }
    }
}

/// What happened when an arrow met an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowHit {
    /// Handed to the hit callback
    Struck(EnemyId),
    /// Swallowed by an immune enemy, nothing else happens
    Absorbed(EnemyId),
}

/// Owns the arrow pool and the fire cooldown
#[derive(Debug)]
pub struct ProjectileSystem {
    arrows: Vec<Arrow>,
    next_fire_ms: u64,
    fire_delay_ms: u64,
    speed: f32,
    size: Vec2,
    spawn_offset: f32,
    next_id: u32,
}

impl ProjectileSystem {
    pub fn new(settings: &Settings) -> Self {
        let player_extent = settings.player_width.max(settings.player_height);
        Self {
            arrows: Vec::new(),
            next_fire_ms: 0,
            fire_delay_ms: settings.fire_delay_ms,
            speed: settings.arrow_speed,
            size: Vec2::new(settings.arrow_width, settings.arrow_length),
            spawn_offset: player_extent / 2.0
                + settings.arrow_length / 2.0
                + settings.arrow_spawn_buffer,
            next_id: 1,
        }
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn active_count(&self) -> usize {
        self.arrows.len()
    }

    /// Distance from the shooter's center to a new arrow's center
    pub fn spawn_offset(&self) -> f32 {
        self.spawn_offset
    }

    pub fn next_fire_ms(&self) -> u64 {
        self.next_fire_ms
    }

    /// Nothing in flight and the cooldown has passed
    pub fn can_fire(&self, now_ms: u64) -> bool {
        self.arrows.is_empty() && now_ms > self.next_fire_ms
    }

    /// Launch an arrow from `origin` along `facing`. No-op while
    /// [`ProjectileSystem::can_fire`] is false.
    pub fn shoot(&mut self, origin: Vec2, facing: Facing, now_ms: u64) -> Option<ArrowId> {
        if !self.can_fire(now_ms) {
            return None;
        }

        let angle = facing_angle(facing.index());
        let dir = Vec2::from_angle(angle);
        let id = ArrowId(self.next_id);
        self.next_id += 1;

        let arrow = Arrow {
            id,
            pos: origin + dir * self.spawn_offset,
            vel: dir * self.speed,
            angle,
            size: self.size,
        };
        log::debug!(
            "Arrow {:?} fired at {:.0}deg from ({:.1}, {:.1})",
            id,
            angle.to_degrees(),
            arrow.pos.x,
            arrow.pos.y
        );
        self.arrows.push(arrow);
        self.next_fire_ms = now_ms + self.fire_delay_ms;
        Some(id)
    }

    /// Destroy every arrow (room change, teardown). The cooldown is kept.
    pub fn clear(&mut self) {
        self.arrows.clear();
    }

    /// Move arrows; any arrow reaching the world edge is destroyed.
    /// Returns how many were removed.
    pub fn integrate(&mut self, world: &PhysicsWorld, dt: f32) -> usize {
        for arrow in self.arrows.iter_mut() {
            integrate(&mut arrow.pos, arrow.vel, dt);
        }
        let before = self.arrows.len();
        self.arrows.retain(|a| !world.reaches_bounds(&a.body()));
        before - self.arrows.len()
    }

    /// Destroy arrows touching any wall
    pub fn resolve_wall_hits(&mut self, walls: &[Rect]) -> usize {
        let before = self.arrows.len();
        self.arrows.retain(|a| {
            let body = a.body();
            !walls.iter().any(|w| w.overlaps(&body))
        });
        before - self.arrows.len()
    }

    /// Destroy arrows touching an enemy. Immune enemies swallow the arrow;
    /// any other enemy is passed to `on_hit`.
    pub fn resolve_enemy_hits<I, H>(
        &mut self,
        enemies: &mut [Enemy],
        is_immune: I,
        mut on_hit: H,
    ) -> Vec<ArrowHit>
    where
        I: Fn(&Enemy) -> bool,
        H: FnMut(&mut Enemy),
    {
        let mut hits = Vec::new();
        self.arrows.retain(|arrow| {
            let body = arrow.body();
            let Some(enemy) = enemies.iter_mut().find(|e| e.body().overlaps_rect(&body)) else {
                return true;
            };
            if is_immune(&*enemy) {
                hits.push(ArrowHit::Absorbed(enemy.id));
            } else {
                on_hit(enemy);
                hits.push(ArrowHit::Struck(enemy.id));
            }
            false
        });
        hits
    }
}
