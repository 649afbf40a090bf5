//! Collision wiring for a room
//!
//! Colliders are registered once per scene and identified by handle. The
//! treasure pairing is the exception: the treasure is a new instance after
//! every rebuild, so its registration is keyed by [`TreasureId`] and has to
//! be renewed by [`CollisionOrchestrator::setup_treasure_collisions`].
//!
//! Resolution order within a step matches registration order: walls first,
//! then arrows, then the player overlaps.

use super::enemy::EnemyDirector;
use super::physics::{PhysicsWorld, separate_from_walls};
use super::projectile::{ArrowHit, ProjectileSystem};
use super::room::{RoomBuilder, TreasureId};
use super::state::{GameEvent, Player, Session};
use crate::error::{GameError, GameResult};

/// Opaque registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(u32);

/// Body pairings the orchestrator knows how to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pairing {
    /// Walls block the player
    PlayerWall,
    /// Walls bounce enemies
    EnemyWall,
    /// Walls destroy arrows
    ArrowWall,
    /// Arrows strike or are absorbed by enemies
    ArrowEnemy,
    /// Touching an enemy ends the session
    PlayerEnemy,
    /// Picking up one specific treasure instance
    PlayerTreasure(TreasureId),
    /// Walking through the door
    PlayerDoor,
}

/// Score awards applied during resolution
#[derive(Debug, Clone, Copy)]
pub struct Awards {
    pub treasure: u64,
    pub enemy: u64,
}

/// Everything a collision step touches, borrowed from the scene
pub struct CollisionContext<'a> {
    pub world: &'a mut PhysicsWorld,
    pub room: &'a mut RoomBuilder,
    pub enemies: &'a mut EnemyDirector,
    pub projectiles: &'a mut ProjectileSystem,
    pub player: &'a mut Player,
    pub session: &'a mut Session,
    pub events: &'a mut Vec<GameEvent>,
    pub awards: Awards,
}

/// What the scene has to act on after a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// The session just ended (reported once)
    pub game_over: bool,
    /// The player is in the doorway and the session is live
    pub door_reached: bool,
}

#[derive(Debug, Default)]
pub struct CollisionOrchestrator {
    registrations: Vec<(ColliderHandle, Pairing)>,
    next_handle: u32,
}

impl CollisionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn is_registered(&self, pairing: Pairing) -> bool {
        self.registrations.iter().any(|(_, p)| *p == pairing)
    }

    /// Treasure currently wired to the player, if any
    pub fn registered_treasure(&self) -> Option<TreasureId> {
        self.registrations.iter().find_map(|(_, p)| match p {
            Pairing::PlayerTreasure(id) => Some(*id),
            _ => None,
        })
    }

    fn register(&mut self, pairing: Pairing) -> ColliderHandle {
        if let Some((handle, _)) = self.registrations.iter().find(|(_, p)| *p == pairing) {
            log::warn!("{:?} already registered", pairing);
            return *handle;
        }
        let handle = ColliderHandle(self.next_handle);
        self.next_handle += 1;
        self.registrations.push((handle, pairing));
        handle
    }

    /// Remove one registration. Unknown handles are ignored.
    pub fn unregister(&mut self, handle: ColliderHandle) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|(h, _)| *h != handle);
        self.registrations.len() != before
    }

    /// Wire the persistent pairings. Needs a built room.
    pub fn setup_collisions(&mut self, room: &RoomBuilder) -> GameResult<Vec<ColliderHandle>> {
        if room.walls().is_empty() {
            return Err(GameError::NotInitialized("room walls"));
        }

        let handles: Vec<ColliderHandle> = [
            Pairing::PlayerWall,
            Pairing::EnemyWall,
            Pairing::ArrowWall,
            Pairing::ArrowEnemy,
            Pairing::PlayerEnemy,
        ]
        .into_iter()
        .map(|p| self.register(p))
        .collect();

        self.setup_treasure_collisions(room)?;
        log::debug!("{} colliders registered", self.registrations.len());
        Ok(handles)
    }

    /// Wire the player to the room's current treasure, dropping any
    /// registration left over from a previous room
    pub fn setup_treasure_collisions(&mut self, room: &RoomBuilder) -> GameResult<ColliderHandle> {
        let treasure = room
            .treasure()
            .ok_or(GameError::NotInitialized("treasure"))?;

        let stale = self.registrations.len();
        self.registrations
            .retain(|(_, p)| !matches!(p, Pairing::PlayerTreasure(id) if *id != treasure.id));
        if self.registrations.len() != stale {
            log::debug!("Dropped stale treasure registration");
        }
        Ok(self.register(Pairing::PlayerTreasure(treasure.id)))
    }

    /// Wire the door trigger. Needs the door to exist.
    pub fn setup_door_overlap(&mut self, room: &RoomBuilder) -> GameResult<ColliderHandle> {
        if room.door().is_none() {
            return Err(GameError::NotInitialized("door"));
        }
        Ok(self.register(Pairing::PlayerDoor))
    }

    /// Drop every registration. Safe to call any number of times.
    pub fn cleanup(&mut self) {
        if self.registrations.is_empty() {
            return;
        }
        log::debug!("Cleaning up {} colliders", self.registrations.len());
        self.registrations.clear();
    }

    /// Run every registered pairing once
    pub fn resolve(&self, ctx: &mut CollisionContext<'_>) -> Resolution {
        let mut out = Resolution::default();
        if ctx.world.is_paused() {
            return out;
        }

        for (_, pairing) in &self.registrations {
            match *pairing {
                Pairing::PlayerWall => {
                    let player = &mut *ctx.player;
                    separate_from_walls(
                        &mut player.pos,
                        &mut player.vel,
                        player.radius,
                        ctx.room.walls(),
                        false,
                    );
                }
                Pairing::EnemyWall => {
                    let walls = ctx.room.walls();
                    for enemy in ctx.enemies.enemies_mut() {
                        let radius = enemy.radius;
                        separate_from_walls(&mut enemy.pos, &mut enemy.vel, radius, walls, true);
                    }
                }
                Pairing::ArrowWall => {
                    ctx.projectiles.resolve_wall_hits(ctx.room.walls());
                }
                Pairing::ArrowEnemy => resolve_arrow_hits(ctx),
                Pairing::PlayerEnemy => {
                    let body = ctx.player.body();
                    let caught = ctx
                        .enemies
                        .enemies()
                        .iter()
                        .any(|e| e.body().overlaps_circle(&body));
                    if caught && ctx.session.end() {
                        ctx.world.pause();
                        ctx.events.push(GameEvent::PlayerCaught);
                        out.game_over = true;
                        log::info!("Player caught, final score {}", ctx.session.score);
                    }
                }
                Pairing::PlayerTreasure(id) => resolve_treasure(ctx, id),
                Pairing::PlayerDoor => {
                    let Some(door) = ctx.room.door() else {
                        continue;
                    };
                    if !ctx.session.is_game_over() && ctx.player.body().overlaps_rect(door) {
                        out.door_reached = true;
                    }
                }
            }
        }
        out
    }
}

fn resolve_arrow_hits(ctx: &mut CollisionContext<'_>) {
    let (roster, hunters) = ctx.enemies.roster_and_hunters();
    let session = &mut *ctx.session;
    let events = &mut *ctx.events;
    let points = ctx.awards.enemy;

    let hits = ctx.projectiles.resolve_enemy_hits(
        roster,
        |enemy| enemy.kind.arrow_immune() || hunters.contains(&enemy.id),
        |enemy| {
            if enemy.stun() {
                let score = session.add_score(points);
                events.push(GameEvent::EnemyStunned { enemy: enemy.id.0 });
                events.push(GameEvent::ScoreChanged { score });
            }
        },
    );

    for hit in hits {
        if let ArrowHit::Absorbed(id) = hit {
            ctx.events.push(GameEvent::ArrowAbsorbed { enemy: id.0 });
        }
    }
}

fn resolve_treasure(ctx: &mut CollisionContext<'_>, id: TreasureId) {
    // The registration may outlive the treasure it was made for
    let Some(treasure) = ctx.room.treasure() else {
        return;
    };
    if treasure.id != id || !treasure.body().overlaps_circle(&ctx.player.body()) {
        return;
    }
    if ctx.room.collect_treasure() {
        let score = ctx.session.add_score(ctx.awards.treasure);
        ctx.events.push(GameEvent::TreasureCollected);
        ctx.events.push(GameEvent::ScoreChanged { score });
        log::debug!("Treasure {:?} collected, score {}", id, score);
    }
}
