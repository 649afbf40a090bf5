//! Enemy roster and behavior
//!
//! Two variants share one body type:
//! - `Wandering`: random constant velocity, re-rolled every direction-change
//!   period, bounces off walls, stops dead when struck by an arrow.
//! - `Hunter`: spawned late in a room by a time-gated roll, steers straight
//!   at the player every frame and shrugs off arrows.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Circle;
use super::physics::{PhysicsWorld, integrate};
use super::room::RoomLayout;
use crate::settings::{Settings, SpawnRamp};

/// A chance at or above this spawns on any roll, including 100
const CERTAIN_CHANCE: f32 = 100.0;

/// Enemy identity, stable for the lifetime of the enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Wandering,
    Hunter,
}

impl EnemyKind {
    /// Velocity is re-randomized on the direction-change timer
    #[inline]
    pub fn wanders(self) -> bool {
        self == EnemyKind::Wandering
    }

    /// Velocity is recomputed toward the player every frame
    #[inline]
    pub fn chases(self) -> bool {
        self == EnemyKind::Hunter
    }

    /// Arrows are destroyed without effect
    #[inline]
    pub fn arrow_immune(self) -> bool {
        self == EnemyKind::Hunter
    }
}

/// An enemy body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Struck by an arrow: stopped and harmless to score again
    pub stunned: bool,
}

impl Enemy {
    #[inline]
    pub fn body(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Stop the enemy after an arrow hit. Returns true the first time.
    pub fn stun(&mut self) -> bool {
        self.vel = Vec2::ZERO;
        if self.stunned {
            return false;
        }
        self.stunned = true;
        true
    }

    /// Enemies still in motion on both axes; struck ones sit at zero velocity
    #[inline]
    fn is_moving(&self) -> bool {
        self.vel.x != 0.0 && self.vel.y != 0.0
    }
}

/// Outcome of a hunter spawn check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnCheck {
    /// Game over, room not started, or the hunter already came this room
    Skipped,
    /// Still before the ramp start time
    TooEarly,
    /// Rolled and missed
    Missed { chance: f32, roll: u32 },
    /// Rolled and a hunter appeared
    Spawned { id: EnemyId, chance: f32, roll: u32 },
}

/// Owns the enemy roster for the live room
#[derive(Debug)]
pub struct EnemyDirector {
    layout: RoomLayout,
    enemy_radius: f32,
    enemy_speed: f32,
    hunter_speed: f32,
    ramp: SpawnRamp,
    enemies: Vec<Enemy>,
    /// Hunters being steered; pruned lazily when their enemy is gone
    hunters: BTreeSet<EnemyId>,
    room_started_at: Option<u64>,
    extra_spawned: bool,
    rolls_this_room: u32,
    stopped: bool,
    next_id: u32,
}

impl EnemyDirector {
    pub fn new(settings: &Settings) -> Self {
        Self {
            layout: RoomLayout::new(settings),
            enemy_radius: settings.enemy_radius,
            enemy_speed: settings.enemy_speed,
            hunter_speed: settings.hunter_speed(),
            ramp: settings.spawn_ramp.clone(),
            enemies: Vec::new(),
            hunters: BTreeSet::new(),
            room_started_at: None,
            extra_spawned: false,
            rolls_this_room: 0,
            stopped: false,
            next_id: 1,
        }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Ids currently tracked as hunters (may briefly include removed enemies)
    pub fn hunter_ids(&self) -> &BTreeSet<EnemyId> {
        &self.hunters
    }

    /// The roster for mutation alongside the hunter set, borrowed together
    pub fn roster_and_hunters(&mut self) -> (&mut [Enemy], &BTreeSet<EnemyId>) {
        (&mut self.enemies, &self.hunters)
    }

    pub fn is_hunter(&self, id: EnemyId) -> bool {
        self.hunters.contains(&id)
    }

    pub fn count(&self, kind: EnemyKind) -> usize {
        self.enemies.iter().filter(|e| e.kind == kind).count()
    }

    /// Spawn rolls made since the room started
    pub fn rolls_this_room(&self) -> u32 {
        self.rolls_this_room
    }

    pub fn extra_spawned(&self) -> bool {
        self.extra_spawned
    }

    /// Freeze hunters and stop spawn rolls (game over)
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Begin a room: empty roster, reset the spawn clock, spawn `count`
    /// wandering enemies
    pub fn start_room(&mut self, count: usize, now_ms: u64, rng: &mut impl Rng) {
        self.clear();
        self.room_started_at = Some(now_ms);
        self.extra_spawned = false;
        self.rolls_this_room = 0;

        for _ in 0..count {
            self.spawn_wandering(rng);
        }
        log::debug!("Room started at {}ms with {} enemies", now_ms, count);
    }

    /// Drop every enemy and hunter
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.hunters.clear();
    }

    /// Remove one enemy. Hunter tracking catches up on the next update.
    pub fn despawn(&mut self, id: EnemyId) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.id != id);
        self.enemies.len() != before
    }

    fn alloc_id(&mut self) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id += 1;
        id
    }

    fn random_velocity(&self, rng: &mut impl Rng) -> Vec2 {
        let speed = self.enemy_speed;
        Vec2::new(
            rng.random_range(-speed..=speed),
            rng.random_range(-speed..=speed),
        )
    }

    /// Spawn a wandering enemy at a random in-bounds position
    pub fn spawn_wandering(&mut self, rng: &mut impl Rng) -> EnemyId {
        let id = self.alloc_id();
        let pos = RoomLayout::random_point_in(&self.layout.enemy_region, rng);
        let vel = self.random_velocity(rng);
        self.enemies.push(Enemy {
            id,
            kind: EnemyKind::Wandering,
            pos,
            vel,
            radius: self.enemy_radius,
            stunned: false,
        });
        id
    }

    /// Spawn a hunter at the top of the room, horizontally centered.
    /// Its velocity is set by the next [`EnemyDirector::update_hunters`].
    pub fn spawn_hunter(&mut self) -> EnemyId {
        let id = self.alloc_id();
        self.enemies.push(Enemy {
            id,
            kind: EnemyKind::Hunter,
            pos: self.layout.hunter_spawn,
            vel: Vec2::ZERO,
            radius: self.enemy_radius,
            stunned: false,
        });
        self.hunters.insert(id);
        id
    }

    /// Re-roll velocity for wandering enemies that are still moving.
    /// Struck enemies (zero velocity) stay put.
    pub fn change_enemy_directions(&mut self, rng: &mut impl Rng) {
        let speed = self.enemy_speed;
        for enemy in self.enemies.iter_mut() {
            if enemy.kind.wanders() && enemy.is_moving() {
                enemy.vel = Vec2::new(
                    rng.random_range(-speed..=speed),
                    rng.random_range(-speed..=speed),
                );
            }
        }
    }

    /// One-shot, time-gated hunter spawn roll
    pub fn check_enemy_spawn(&mut self, now_ms: u64, rng: &mut impl Rng) -> SpawnCheck {
        let Some(started_at) = self.room_started_at else {
            return SpawnCheck::Skipped;
        };
        if self.stopped || self.extra_spawned {
            return SpawnCheck::Skipped;
        }

        let elapsed_secs = now_ms.saturating_sub(started_at) as f32 / 1000.0;
        let Some(chance) = self.ramp.chance_at(elapsed_secs) else {
            return SpawnCheck::TooEarly;
        };

        let roll: u32 = rng.random_range(0..=100);
        self.rolls_this_room += 1;
        log::debug!(
            "Spawn roll: elapsed {:.2}s, chance {:.1}%, roll {}",
            elapsed_secs,
            chance,
            roll
        );

        if chance >= CERTAIN_CHANCE || (roll as f32) < chance {
            self.extra_spawned = true;
            let id = self.spawn_hunter();
            log::info!(
                "Hunter {:?} spawned after {:.2}s (chance {:.1}%, roll {})",
                id,
                elapsed_secs,
                chance,
                roll
            );
            SpawnCheck::Spawned { id, chance, roll }
        } else {
            SpawnCheck::Missed { chance, roll }
        }
    }

    /// Steer every hunter straight at the player. Hunters whose enemy no
    /// longer exists are dropped from tracking here.
    pub fn update_hunters(&mut self, target: Vec2) {
        if self.hunters.is_empty() || self.stopped {
            return;
        }

        let enemies = &mut self.enemies;
        let speed = self.hunter_speed;
        self.hunters.retain(|id| {
            let Some(enemy) = enemies.iter_mut().find(|e| e.id == *id) else {
                log::debug!("Dropping removed hunter {:?}", id);
                return false;
            };
            let delta = target - enemy.pos;
            let distance = delta.length();
            if distance > 0.0 {
                enemy.vel = delta / distance * speed;
            }
            true
        });
    }

    /// Move every enemy and bounce it off the world edges
    pub fn integrate(&mut self, world: &PhysicsWorld, dt: f32) {
        for enemy in self.enemies.iter_mut() {
            integrate(&mut enemy.pos, enemy.vel, dt);
            let half = Vec2::splat(enemy.radius);
            world.bounce_off_bounds(&mut enemy.pos, &mut enemy.vel, half);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn director() -> (EnemyDirector, Pcg32) {
        (EnemyDirector::new(&Settings::default()), Pcg32::seed_from_u64(12345))
    }

    #[test]
    fn test_start_room_spawns_wanderers() {
        let (mut dir, mut rng) = director();
        dir.start_room(3, 0, &mut rng);
        assert_eq!(dir.count(EnemyKind::Wandering), 3);
        assert_eq!(dir.count(EnemyKind::Hunter), 0);

        let speed = Settings::default().enemy_speed;
        let region = RoomLayout::new(&Settings::default()).enemy_region;
        for enemy in dir.enemies() {
            assert!(region.contains(enemy.pos));
            assert!(enemy.vel.x.abs() <= speed && enemy.vel.y.abs() <= speed);
        }
    }

    #[test]
    fn test_start_room_clears_previous_roster() {
        let (mut dir, mut rng) = director();
        dir.start_room(3, 0, &mut rng);
        dir.spawn_hunter();
        dir.start_room(2, 10_000, &mut rng);
        assert_eq!(dir.enemies().len(), 2);
        assert!(dir.hunter_ids().is_empty());
        assert!(!dir.extra_spawned());
    }

    #[test]
    fn test_direction_change_skips_stunned() {
        let (mut dir, mut rng) = director();
        dir.start_room(3, 0, &mut rng);
        let struck = dir.enemies()[0].id;
        dir.enemies_mut()[0].stun();
        let before: Vec<Vec2> = dir.enemies().iter().map(|e| e.vel).collect();

        dir.change_enemy_directions(&mut rng);

        let hit = dir.get(struck).unwrap();
        assert_eq!(hit.vel, Vec2::ZERO);
        let changed = dir.enemies()[1..]
            .iter()
            .zip(&before[1..])
            .filter(|(e, old)| e.vel != **old)
            .count();
        assert_eq!(changed, 2);
    }

    #[test]
    fn test_no_roll_before_start_time() {
        let (mut dir, mut rng) = director();
        dir.start_room(3, 1000, &mut rng);
        for t in (2000..6000).step_by(1000) {
            assert_eq!(dir.check_enemy_spawn(t, &mut rng), SpawnCheck::TooEarly);
        }
        assert_eq!(dir.check_enemy_spawn(5999, &mut rng), SpawnCheck::TooEarly);
        assert_eq!(dir.rolls_this_room(), 0);

        assert!(!matches!(dir.check_enemy_spawn(6000, &mut rng), SpawnCheck::TooEarly));
        assert_eq!(dir.rolls_this_room(), 1);
    }

    #[test]
    fn test_saturated_ramp_spawns_exactly_one_hunter() {
        let (mut dir, mut rng) = director();
        dir.start_room(3, 0, &mut rng);

        let spawned = (1..=60)
            .map(|s| dir.check_enemy_spawn(s * 1000, &mut rng))
            .filter(|c| matches!(c, SpawnCheck::Spawned { .. }))
            .count();
        assert_eq!(spawned, 1);
        assert_eq!(dir.count(EnemyKind::Hunter), 1);
        // Rolls stop once the hunter is out; the ramp saturates at 24s
        assert!(dir.rolls_this_room() <= 20);
    }

    #[test]
    fn test_saturated_chance_is_deterministic() {
        let (mut dir, mut rng) = director();
        dir.start_room(0, 0, &mut rng);
        let check = dir.check_enemy_spawn(24_000, &mut rng);
        assert!(matches!(check, SpawnCheck::Spawned { .. }));
    }

    #[test]
    fn test_capped_chance_still_rolls() {
        let mut settings = Settings::default();
        settings.spawn_ramp.max_chance = 50.0;
        let mut dir = EnemyDirector::new(&settings);
        let mut rng = Pcg32::seed_from_u64(8);

        let (mut spawned, mut missed) = (0, 0);
        for _ in 0..200 {
            dir.start_room(0, 0, &mut rng);
            match dir.check_enemy_spawn(60_000, &mut rng) {
                SpawnCheck::Spawned { chance, .. } => {
                    assert_eq!(chance, 50.0);
                    spawned += 1;
                }
                SpawnCheck::Missed { chance, roll } => {
                    assert_eq!(chance, 50.0);
                    assert!(roll >= 50);
                    missed += 1;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(spawned > 0 && missed > 0);
    }

    #[test]
    fn test_roster_and_hunters_borrow_together() {
        let (mut dir, mut rng) = director();
        dir.start_room(2, 0, &mut rng);
        let hunter = dir.spawn_hunter();

        let (roster, hunters) = dir.roster_and_hunters();
        assert_eq!(roster.len(), 3);
        assert!(hunters.contains(&hunter));
        for enemy in roster.iter_mut().filter(|e| !hunters.contains(&e.id)) {
            enemy.stun();
        }
        assert_eq!(dir.enemies().iter().filter(|e| e.stunned).count(), 2);
        assert!(!dir.get(hunter).unwrap().stunned);
    }

    #[test]
    fn test_stopped_director_never_rolls() {
        let (mut dir, mut rng) = director();
        dir.start_room(3, 0, &mut rng);
        dir.stop();
        assert_eq!(dir.check_enemy_spawn(30_000, &mut rng), SpawnCheck::Skipped);
        assert_eq!(dir.rolls_this_room(), 0);
    }

    #[test]
    fn test_unstarted_room_skips() {
        let (mut dir, mut rng) = director();
        assert_eq!(dir.check_enemy_spawn(30_000, &mut rng), SpawnCheck::Skipped);
    }

    #[test]
    fn test_hunter_chases_player() {
        let (mut dir, _) = director();
        let id = dir.spawn_hunter();
        let start = dir.get(id).unwrap().pos;
        let target = start + Vec2::new(30.0, 40.0);

        dir.update_hunters(target);
        let vel = dir.get(id).unwrap().vel;
        assert!((vel.length() - 210.0).abs() < 1e-2);
        assert!((vel.normalize() - Vec2::new(0.6, 0.8)).length() < 1e-4);
    }

    #[test]
    fn test_hunter_on_top_of_player_keeps_velocity() {
        let (mut dir, _) = director();
        let id = dir.spawn_hunter();
        let pos = dir.get(id).unwrap().pos;
        dir.update_hunters(pos + Vec2::new(10.0, 0.0));
        let vel = dir.get(id).unwrap().vel;

        let pos = dir.get(id).unwrap().pos;
        dir.update_hunters(pos);
        assert_eq!(dir.get(id).unwrap().vel, vel);
    }

    #[test]
    fn test_removed_hunter_dropped_lazily() {
        let (mut dir, _) = director();
        let id = dir.spawn_hunter();
        assert!(dir.despawn(id));
        // Still tracked until the next update
        assert!(dir.is_hunter(id));
        dir.update_hunters(Vec2::new(100.0, 100.0));
        assert!(!dir.is_hunter(id));
    }

    #[test]
    fn test_stun_only_counts_once() {
        let (mut dir, mut rng) = director();
        dir.start_room(1, 0, &mut rng);
        let enemy = &mut dir.enemies_mut()[0];
        assert!(enemy.stun());
        assert!(!enemy.stun());
        assert_eq!(enemy.vel, Vec2::ZERO);
    }

    #[test]
    fn test_hunter_ignores_direction_change() {
        let (mut dir, mut rng) = director();
        let id = dir.spawn_hunter();
        dir.update_hunters(Vec2::new(0.0, 700.0));
        let vel = dir.get(id).unwrap().vel;
        dir.change_enemy_directions(&mut rng);
        assert_eq!(dir.get(id).unwrap().vel, vel);
    }

    proptest! {
        #[test]
        fn prop_chance_monotonic(a in 0.0f32..60.0, b in 0.0f32..60.0) {
            let ramp = SpawnRamp::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let c_lo = ramp.chance_at(lo).unwrap_or(0.0);
            let c_hi = ramp.chance_at(hi).unwrap_or(0.0);
            prop_assert!(c_lo <= c_hi);
            prop_assert!(c_hi <= ramp.max_chance);
        }

        #[test]
        fn prop_at_most_one_hunter(seed in any::<u64>(), ticks in 1u64..120) {
            let mut dir = EnemyDirector::new(&Settings::default());
            let mut rng = Pcg32::seed_from_u64(seed);
            dir.start_room(3, 0, &mut rng);
            for t in 1..=ticks {
                dir.check_enemy_spawn(t * 1000, &mut rng);
            }
            prop_assert!(dir.count(EnemyKind::Hunter) <= 1);
            if ticks >= 24 {
                prop_assert_eq!(dir.count(EnemyKind::Hunter), 1);
            }
        }
    }
}
