//! Shapes and overlap tests
//!
//! Everything in the room is either an axis-aligned rectangle (walls, door,
//! arrows) or a circle (player, enemies, treasure). Bodies never rotate, so
//! these few tests cover every pair the simulation needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle stored as center + full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Rectangle spanning two corners
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half()
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half()
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min().x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max().x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min().y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max().y
    }

    /// False when the corners are inverted (built from an empty span)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.size.x >= 0.0 && self.size.y >= 0.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half() + other.half();
        delta.x < reach.x && delta.y < reach.y
    }

    /// Closest point of the rectangle to `point`
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}

/// Circle body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn overlaps_circle(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) < reach * reach
    }

    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        let closest = rect.clamp_point(self.center);
        self.center.distance_squared(closest) < self.radius * self.radius
    }

    /// Bounding box of the circle
    pub fn bounds(&self) -> Rect {
        Rect {
            center: self.center,
            size: Vec2::splat(self.radius * 2.0),
        }
    }
}

/// Result of a penetration query
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Surface normal pointing out of the rectangle, toward the circle
    pub normal: Vec2,
    /// How far the circle must move along `normal` to separate
    pub penetration: f32,
}

/// Penetration of a circle into a rectangle, if any
///
/// When the center is inside the rectangle the exit is taken through the
/// nearest face.
pub fn circle_rect_contact(circle: &Circle, rect: &Rect) -> Option<Contact> {
    let closest = rect.clamp_point(circle.center);
    let offset = circle.center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > 0.0 {
        if dist_sq >= circle.radius * circle.radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Contact {
            normal: offset / dist,
            penetration: circle.radius - dist,
        });
    }

    // Center inside the rectangle: push out through the closest face
    let (min, max) = (rect.min(), rect.max());
    let faces = [
        (circle.center.x - min.x, Vec2::NEG_X),
        (max.x - circle.center.x, Vec2::X),
        (circle.center.y - min.y, Vec2::NEG_Y),
        (max.y - circle.center.y, Vec2::Y),
    ];
    let (depth, normal) = faces
        .into_iter()
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))?;
    Some(Contact {
        normal,
        penetration: depth + circle.radius,
    })
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(100.0, 50.0, 40.0, 20.0);
        assert_eq!(rect.left(), 80.0);
        assert_eq!(rect.right(), 120.0);
        assert_eq!(rect.top(), 40.0);
        assert_eq!(rect.bottom(), 60.0);
        assert!(rect.contains(Vec2::new(80.0, 60.0)));
        assert!(!rect.contains(Vec2::new(79.0, 50.0)));
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(9.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&overlapping));
        assert!(overlapping.overlaps(&a));
    }

    #[test]
    fn test_circle_overlaps() {
        let c = Circle::new(Vec2::ZERO, 10.0);
        assert!(c.overlaps_circle(&Circle::new(Vec2::new(15.0, 0.0), 6.0)));
        assert!(!c.overlaps_circle(&Circle::new(Vec2::new(16.0, 0.0), 6.0)));

        let wall = Rect::new(20.0, 0.0, 10.0, 100.0);
        assert!(!c.overlaps_rect(&wall));
        assert!(Circle::new(Vec2::new(6.0, 0.0), 10.0).overlaps_rect(&wall));
    }

    #[test]
    fn test_circle_rect_contact_outside_center() {
        // Wall to the right; circle pokes 3px into its left face
        let wall = Rect::new(20.0, 0.0, 10.0, 100.0);
        let circle = Circle::new(Vec2::new(8.0, 0.0), 10.0);
        let contact = circle_rect_contact(&circle, &wall).unwrap();
        assert!((contact.normal - Vec2::NEG_X).length() < 1e-5);
        assert!((contact.penetration - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_rect_contact_inside_center() {
        let wall = Rect::new(0.0, 0.0, 100.0, 10.0);
        let circle = Circle::new(Vec2::new(0.0, 4.0), 5.0);
        let contact = circle_rect_contact(&circle, &wall).unwrap();
        assert_eq!(contact.normal, Vec2::Y);
        assert!((contact.penetration - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_rect_contact_miss() {
        let wall = Rect::new(0.0, 0.0, 10.0, 10.0);
        let circle = Circle::new(Vec2::new(20.0, 20.0), 5.0);
        assert!(circle_rect_contact(&circle, &wall).is_none());
    }

    #[test]
    fn test_reflect_velocity() {
        // Moving right, hits a face whose normal points left
        let reflected = reflect_velocity(Vec2::new(100.0, 30.0), Vec2::NEG_X);
        assert!((reflected.x + 100.0).abs() < 0.001);
        assert!((reflected.y - 30.0).abs() < 0.001);
    }
}
