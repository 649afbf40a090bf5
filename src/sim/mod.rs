//! Deterministic room simulation
//!
//! All gameplay logic lives here:
//! - Virtual millisecond clock only, driven by the caller
//! - Seeded RNG only
//! - No rendering, input device or audio backend dependencies

pub mod clock;
pub mod collision;
pub mod enemy;
pub mod geometry;
pub mod physics;
pub mod projectile;
pub mod room;
pub mod state;
pub mod tick;

pub use clock::{DueTask, Scheduler, Task, TimerId};
pub use collision::{CollisionOrchestrator, Pairing, Resolution};
pub use enemy::{Enemy, EnemyDirector, EnemyId, EnemyKind, SpawnCheck};
pub use geometry::{Circle, Rect};
pub use physics::PhysicsWorld;
pub use projectile::{Arrow, ArrowHit, ProjectileSystem};
pub use room::{RoomBuilder, RoomLayout, Treasure, TreasureId};
pub use state::{Facing, GameEvent, GamePhase, Player, Session};
pub use tick::{RoomScene, SceneSnapshot, SceneStatus, TickInput, input_velocity};
