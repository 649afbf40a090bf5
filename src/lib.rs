//! Venture Arcade - A single-screen dungeon crawler arcade game
//!
//! Core modules:
//! - `sim`: Deterministic room simulation (geometry, enemies, arrows, collisions)
//! - `settings`: Data-driven game tuning
//! - `audio`: Fire-and-forget sound triggers
//! - `highscores`: Final score hand-off after a run ends

pub mod audio;
pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{GameError, GameResult};
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame length in milliseconds (60 Hz)
    pub const FRAME_MS: u64 = 16;
    /// Number of discrete facing directions
    pub const DIRECTION_COUNT: u8 = 8;
    /// Facing angles in degrees, clockwise from "up"
    pub const DIRECTION_ANGLES: [f32; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];
    /// Rotates a facing angle into screen space (0° = +x, y grows downward)
    pub const ANGLE_OFFSET: f32 = -90.0;
}

/// Screen-space launch angle (radians) for a facing index 0-7
#[inline]
pub fn facing_angle(direction: u8) -> f32 {
    let idx = (direction % consts::DIRECTION_COUNT) as usize;
    (consts::DIRECTION_ANGLES[idx] + consts::ANGLE_OFFSET).to_radians()
}

/// Unit vector for a facing index 0-7 (0 points up the screen)
#[inline]
pub fn facing_to_vector(direction: u8) -> Vec2 {
    let theta = facing_angle(direction);
    Vec2::new(theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_vectors() {
        let up = facing_to_vector(0);
        assert!(up.x.abs() < 1e-5 && (up.y + 1.0).abs() < 1e-5);

        let right = facing_to_vector(2);
        assert!((right.x - 1.0).abs() < 1e-5 && right.y.abs() < 1e-5);

        let down_left = facing_to_vector(5);
        assert!(down_left.x < 0.0 && down_left.y > 0.0);
        assert!((down_left.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_facing_wraps() {
        assert_eq!(facing_angle(8), facing_angle(0));
    }
}
