//! Arcade-style physics step
//!
//! Bodies move at constant velocity; there are no forces. The world
//! rectangle (the viewport) is the only implicit collider: enemies bounce
//! off it, the player is clamped to it, and arrows are flagged when they
//! reach it. Everything else is wired by the collision orchestrator.

use glam::Vec2;

use super::geometry::{Circle, Rect, circle_rect_contact, reflect_velocity};

/// World bounds plus the global pause switch
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    pub bounds: Rect,
    paused: bool,
}

impl PhysicsWorld {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Rect::from_corners(Vec2::ZERO, Vec2::new(width, height)),
            paused: false,
        }
    }

    /// Freeze every body (game over)
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Keep a body of the given half extents inside the world.
    /// Returns true if it had to be moved.
    pub fn clamp_to_bounds(&self, pos: &mut Vec2, half: Vec2) -> bool {
        let min = self.bounds.min() + half;
        let max = self.bounds.max() - half;
        let clamped = pos.clamp(min, max);
        let moved = clamped != *pos;
        *pos = clamped;
        moved
    }

    /// Keep a body inside the world, reflecting its velocity off the edge
    /// it hit (perfectly elastic).
    pub fn bounce_off_bounds(&self, pos: &mut Vec2, vel: &mut Vec2, half: Vec2) -> bool {
        let min = self.bounds.min() + half;
        let max = self.bounds.max() - half;
        let mut hit = false;

        if pos.x < min.x {
            pos.x = min.x;
            vel.x = vel.x.abs();
            hit = true;
        } else if pos.x > max.x {
            pos.x = max.x;
            vel.x = -vel.x.abs();
            hit = true;
        }
        if pos.y < min.y {
            pos.y = min.y;
            vel.y = vel.y.abs();
            hit = true;
        } else if pos.y > max.y {
            pos.y = max.y;
            vel.y = -vel.y.abs();
            hit = true;
        }
        hit
    }

    /// True once a rectangle touches or crosses the world edge
    pub fn reaches_bounds(&self, body: &Rect) -> bool {
        body.left() <= self.bounds.left()
            || body.right() >= self.bounds.right()
            || body.top() <= self.bounds.top()
            || body.bottom() >= self.bounds.bottom()
    }
}

/// Move a position along its velocity
#[inline]
pub fn integrate(pos: &mut Vec2, vel: Vec2, dt: f32) {
    *pos += vel * dt;
}

/// Push a circle out of every wall it overlaps.
///
/// With `bounce`, velocity is reflected off each face it is moving into;
/// otherwise the inbound component is removed so the body slides along
/// the wall. Returns true if any wall was touched.
pub fn separate_from_walls(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    walls: &[Rect],
    bounce: bool,
) -> bool {
    let mut touched = false;
    for wall in walls {
        let circle = Circle::new(*pos, radius);
        let Some(contact) = circle_rect_contact(&circle, wall) else {
            continue;
        };
        touched = true;
        *pos += contact.normal * contact.penetration;

        let inbound = vel.dot(contact.normal);
        if inbound < 0.0 {
            *vel = if bounce {
                reflect_velocity(*vel, contact.normal)
            } else {
                *vel - contact.normal * inbound
            };
        }
    }
    touched
}
