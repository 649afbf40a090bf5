//! Session state and the player
//!
//! Score, phase and the player body are owned by the room scene and handed
//! to the managers by reference; no manager keeps its own copy.

use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Circle;
use crate::facing_to_vector;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Terminal until the scene restarts
    GameOver,
}

/// Discrete 8-way facing, 0 = up, clockwise in 45° steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Facing(u8);

impl Facing {
    pub const UP: Facing = Facing(0);
    pub const UP_RIGHT: Facing = Facing(1);
    pub const RIGHT: Facing = Facing(2);
    pub const DOWN_RIGHT: Facing = Facing(3);
    pub const DOWN: Facing = Facing(4);
    pub const DOWN_LEFT: Facing = Facing(5);
    pub const LEFT: Facing = Facing(6);
    pub const UP_LEFT: Facing = Facing(7);

    pub fn new(index: u8) -> Self {
        Facing(index % crate::consts::DIRECTION_COUNT)
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Facing for a movement velocity (screen space, y down); `None` when
    /// standing still so the previous facing is kept
    pub fn from_velocity(vel: Vec2) -> Option<Self> {
        let facing = match (vel.x.partial_cmp(&0.0)?, vel.y.partial_cmp(&0.0)?) {
            (Ordering::Equal, Ordering::Equal) => return None,
            (Ordering::Less, Ordering::Less) => Facing::UP_LEFT,
            (Ordering::Greater, Ordering::Less) => Facing::UP_RIGHT,
            (_, Ordering::Less) => Facing::UP,
            (Ordering::Less, Ordering::Greater) => Facing::DOWN_LEFT,
            (Ordering::Greater, Ordering::Greater) => Facing::DOWN_RIGHT,
            (_, Ordering::Greater) => Facing::DOWN,
            (Ordering::Less, _) => Facing::LEFT,
            _ => Facing::RIGHT,
        };
        Some(facing)
    }

    /// Unit vector the facing points along
    pub fn to_vector(self) -> Vec2 {
        facing_to_vector(self.0)
    }
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    pub radius: f32,
}

impl Player {
    pub fn new(spawn: Vec2, radius: f32) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            facing: Facing::UP,
            radius,
        }
    }

    #[inline]
    pub fn body(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Back to the spawn point, standing still
    pub fn reset(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
    }

    /// Apply a movement velocity, turning to face it when moving
    pub fn steer(&mut self, vel: Vec2) {
        if let Some(facing) = Facing::from_velocity(vel) {
            self.facing = facing;
        }
        self.vel = vel;
    }
}

/// Something that happened during a tick, for observers (audio, HUD, tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ArrowFired,
    /// A wandering enemy was struck and stopped
    EnemyStunned { enemy: u32 },
    /// A hunter swallowed an arrow
    ArrowAbsorbed { enemy: u32 },
    TreasureCollected,
    ScoreChanged { score: u64 },
    HunterSpawned { enemy: u32 },
    PlayerCaught,
    RoomAdvanced { room: u32 },
    /// Game-over delay elapsed; the scene handed its score off
    SceneExited { score: u64 },
}

/// Per-session counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    /// 1-based room counter
    pub room: u32,
    pub phase: GamePhase,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            score: 0,
            room: 1,
            phase: GamePhase::Playing,
        }
    }
}

impl Session {
    pub fn add_score(&mut self, points: u64) -> u64 {
        self.score += points;
        self.score
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Enter game over. Returns true only for the first call.
    pub fn end(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.phase = GamePhase::GameOver;
        true
    }
}
