//! Room scene driver
//!
//! Owns every manager plus the session state and advances them over the
//! virtual clock in fixed substeps of at most `FRAME_MS`. Each substep runs
//! input, hunter steering, integration and collision resolution, then the
//! timers that came due.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{DueTask, Scheduler, Task, TimerId};
use super::collision::{Awards, CollisionContext, CollisionOrchestrator};
use super::enemy::{Enemy, EnemyDirector, SpawnCheck};
use super::physics::{PhysicsWorld, integrate};
use super::projectile::ProjectileSystem;
use super::room::{RoomBuilder, Treasure};
use super::state::{GameEvent, GamePhase, Player, Session};
use crate::audio::{AudioManager, SoundSink};
use crate::consts::FRAME_MS;
use crate::error::GameResult;
use crate::settings::Settings;

/// Resolved input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

/// Movement velocity for an input. Left beats right, up beats down.
pub fn input_velocity(input: &TickInput, speed: f32, diagonal: f32) -> Vec2 {
    let x = if input.left {
        -speed
    } else if input.right {
        speed
    } else {
        0.0
    };
    let y = if input.up {
        -speed
    } else if input.down {
        speed
    } else {
        0.0
    };
    let vel = Vec2::new(x, y);
    if x != 0.0 && y != 0.0 {
        vel * diagonal
    } else {
        vel
    }
}

/// Whether the scene is still running after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneStatus {
    Running,
    /// The scene handed control back; the score is final
    Exited { final_score: u64, rooms_cleared: u32 },
}

/// Observable scene state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub now_ms: u64,
    pub score: u64,
    pub room: u32,
    pub phase: GamePhase,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub arrows: usize,
    pub treasure: Option<Treasure>,
}

/// One play session, from the first room until the exit after game over
#[derive(Debug)]
pub struct RoomScene {
    settings: Settings,
    rng: Pcg32,
    scheduler: Scheduler,
    world: PhysicsWorld,
    room: RoomBuilder,
    enemies: EnemyDirector,
    projectiles: ProjectileSystem,
    collisions: CollisionOrchestrator,
    player: Player,
    session: Session,
    audio: AudioManager,
    events: Vec<GameEvent>,
    exit_timer: Option<TimerId>,
    exited: Option<SceneStatus>,
}

impl RoomScene {
    /// Build the first room and arm the room timers
    pub fn new(settings: Settings, seed: u64) -> GameResult<Self> {
        settings.validate()?;

        let room = RoomBuilder::new(&settings);
        let player = Player::new(room.layout().player_spawn, settings.player_radius());
        let mut scene = Self {
            rng: Pcg32::seed_from_u64(seed),
            scheduler: Scheduler::new(),
            world: PhysicsWorld::new(settings.viewport_width, settings.viewport_height),
            enemies: EnemyDirector::new(&settings),
            projectiles: ProjectileSystem::new(&settings),
            collisions: CollisionOrchestrator::new(),
            room,
            player,
            session: Session::default(),
            audio: AudioManager::default(),
            events: Vec::new(),
            exit_timer: None,
            exited: None,
            settings,
        };
        scene.start()?;
        log::info!("Scene started (seed {})", seed);
        Ok(scene)
    }

    /// Route sound cues to `sink`
    pub fn with_sink(mut self, sink: Box<dyn SoundSink>) -> Self {
        self.audio = AudioManager::new(sink);
        self
    }

    fn start(&mut self) -> GameResult<()> {
        let now = self.scheduler.now();
        self.room.init_door();
        self.room.build_room(&mut self.rng)?;
        self.enemies
            .start_room(self.settings.enemy_count, now, &mut self.rng);

        self.collisions.setup_collisions(&self.room)?;
        self.collisions.setup_door_overlap(&self.room)?;

        self.scheduler
            .add_repeating(Task::ChangeEnemyDirections, self.settings.direction_change_ms);
        self.scheduler
            .add_repeating(Task::CheckEnemySpawn, self.settings.spawn_check_ms);
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn room(&self) -> &RoomBuilder {
        &self.room
    }

    pub fn enemies(&self) -> &EnemyDirector {
        &self.enemies
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn collisions(&self) -> &CollisionOrchestrator {
        &self.collisions
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    /// Events since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            now_ms: self.scheduler.now(),
            score: self.session.score,
            room: self.session.room,
            phase: self.session.phase,
            player: self.player.clone(),
            enemies: self.enemies.enemies().to_vec(),
            arrows: self.projectiles.active_count(),
            treasure: self.room.treasure().cloned(),
        }
    }

    fn exit_status(&self) -> SceneStatus {
        SceneStatus::Exited {
            final_score: self.session.score,
            rooms_cleared: self.session.room - 1,
        }
    }

    /// Advance the scene by `dt_ms` of game time.
    ///
    /// Long deltas are split into `FRAME_MS` substeps so fast bodies still
    /// meet the walls between them.
    pub fn tick(&mut self, input: &TickInput, dt_ms: u64) -> GameResult<SceneStatus> {
        if let Some(status) = self.exited {
            return Ok(status);
        }
        let first_event = self.events.len();

        let mut remaining = dt_ms;
        while remaining > 0 && self.exited.is_none() {
            let step = remaining.min(FRAME_MS);
            remaining -= step;
            self.substep(input, step)?;
        }

        self.audio.play_events(&self.events[first_event..]);
        Ok(self.exited.unwrap_or(SceneStatus::Running))
    }

    fn substep(&mut self, input: &TickInput, step_ms: u64) -> GameResult<()> {
        let now = self.scheduler.now() + step_ms;

        if !self.session.is_game_over() {
            self.apply_input(input, now);
        }
        self.enemies.update_hunters(self.player.pos);
        if !self.world.is_paused() {
            self.step_physics(step_ms, now)?;
        }

        for due in self.scheduler.advance_to(now) {
            self.run_task(due);
            if self.exited.is_some() {
                break;
            }
        }
        Ok(())
    }

    fn run_task(&mut self, due: DueTask) {
        match due.task {
            Task::ChangeEnemyDirections => {
                if !self.session.is_game_over() {
                    self.enemies.change_enemy_directions(&mut self.rng);
                }
            }
            Task::CheckEnemySpawn => {
                if let SpawnCheck::Spawned { id, .. } =
                    self.enemies.check_enemy_spawn(due.due_ms, &mut self.rng)
                {
                    self.events.push(GameEvent::HunterSpawned { enemy: id.0 });
                }
            }
            Task::ExitToMenu => self.exit(),
        }
    }

    fn apply_input(&mut self, input: &TickInput, now: u64) {
        let vel = input_velocity(
            input,
            self.settings.player_speed,
            self.settings.diagonal_multiplier,
        );
        self.player.steer(vel);

        if input.fire
            && self
                .projectiles
                .shoot(self.player.pos, self.player.facing, now)
                .is_some()
        {
            self.events.push(GameEvent::ArrowFired);
        }
    }

    fn step_physics(&mut self, dt_ms: u64, now: u64) -> GameResult<()> {
        let dt = dt_ms as f32 / 1000.0;

        integrate(&mut self.player.pos, self.player.vel, dt);
        self.world
            .clamp_to_bounds(&mut self.player.pos, Vec2::splat(self.player.radius));
        self.enemies.integrate(&self.world, dt);
        self.projectiles.integrate(&self.world, dt);

        let mut ctx = CollisionContext {
            world: &mut self.world,
            room: &mut self.room,
            enemies: &mut self.enemies,
            projectiles: &mut self.projectiles,
            player: &mut self.player,
            session: &mut self.session,
            events: &mut self.events,
            awards: Awards {
                treasure: self.settings.score_treasure,
                enemy: self.settings.score_enemy,
            },
        };
        let resolution = self.collisions.resolve(&mut ctx);

        if resolution.game_over {
            self.on_game_over(now);
        }
        if resolution.door_reached {
            self.advance_room(now)?;
        }
        Ok(())
    }

    fn on_game_over(&mut self, now: u64) {
        self.enemies.stop();
        if self.exit_timer.is_none() {
            self.exit_timer = Some(
                self.scheduler
                    .add_once_at(Task::ExitToMenu, now + self.settings.game_over_delay_ms),
            );
        }
        log::info!(
            "Game over in room {} at {}ms, score {}",
            self.session.room,
            now,
            self.session.score
        );
    }

    /// Move on to the next room. Score carries over.
    fn advance_room(&mut self, now: u64) -> GameResult<()> {
        self.session.room += 1;
        self.projectiles.clear();
        self.enemies.clear();

        self.room.build_room(&mut self.rng)?;
        self.enemies
            .start_room(self.settings.enemy_count, now, &mut self.rng);
        self.player.reset(self.room.layout().player_spawn);
        self.collisions.setup_treasure_collisions(&self.room)?;

        self.events.push(GameEvent::RoomAdvanced {
            room: self.session.room,
        });
        log::info!(
            "Entered room {} with score {}",
            self.session.room,
            self.session.score
        );
        Ok(())
    }

    fn exit(&mut self) {
        let status = self.exit_status();
        self.events.push(GameEvent::SceneExited {
            score: self.session.score,
        });
        log::info!("Leaving scene: {:?}", status);
        self.shutdown();
        self.exited = Some(status);
    }

    /// Tear down timers, colliders and arrows. Safe to call repeatedly;
    /// afterwards every tick reports `Exited`.
    pub fn shutdown(&mut self) {
        self.scheduler.clear();
        self.collisions.cleanup();
        self.projectiles.clear();
        self.exit_timer = None;
        if self.exited.is_none() {
            self.exited = Some(self.exit_status());
        }
    }
}
