//! Game settings and tuning
//!
//! Every gameplay constant lives here. Defaults reproduce the shipped tuning;
//! overrides can be loaded from JSON. Settings are read-only once a scene is
//! running.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::sim::room::RoomLayout;

/// Hunter spawn probability ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRamp {
    /// Seconds into the room before the first roll
    pub start_secs: f32,
    /// Chance (percent) at the start time
    pub base_chance: f32,
    /// Added chance (percent) per second past the start time
    pub chance_per_sec: f32,
    /// Saturation (percent)
    pub max_chance: f32,
}

impl Default for SpawnRamp {
    fn default() -> Self {
        Self {
            start_secs: 5.0,
            base_chance: 5.0,
            chance_per_sec: 5.0,
            max_chance: 100.0,
        }
    }
}

impl SpawnRamp {
    /// Spawn chance (percent) after `elapsed_secs` in the room, or `None`
    /// while the ramp has not started yet.
    pub fn chance_at(&self, elapsed_secs: f32) -> Option<f32> {
        if elapsed_secs < self.start_secs {
            return None;
        }
        let chance = self.base_chance + (elapsed_secs - self.start_secs) * self.chance_per_sec;
        Some(chance.min(self.max_chance))
    }

    /// Elapsed seconds at which the chance saturates
    pub fn saturation_secs(&self) -> f32 {
        if self.chance_per_sec <= 0.0 {
            return f32::INFINITY;
        }
        self.start_secs + ((self.max_chance - self.base_chance) / self.chance_per_sec).max(0.0)
    }
}

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Viewport & room ===
    /// Viewport width; the room is a square of this side
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub wall_thickness: f32,
    pub door_width: f32,
    /// Distance from the top of the viewport to the top wall
    pub room_top_offset: f32,
    /// Player spawn distance above the bottom wall
    pub player_offset_y: f32,
    /// Divider wall height as a fraction of the room height
    pub divider_height_ratio: f32,
    /// Hard cap on the divider height fraction
    pub divider_max_ratio: f32,

    // === Placement insets ===
    /// Treasure keep-out distance from the room edges
    pub treasure_padding: f32,
    /// Extra keep-out below the top wall for treasure
    pub treasure_top_offset: f32,
    pub enemy_spawn_min_x: f32,
    pub enemy_spawn_min_y: f32,
    pub enemy_spawn_max_y_offset: f32,
    /// Gap between the top wall and a freshly spawned hunter
    pub hunter_spawn_offset: f32,

    // === Sizes ===
    pub player_width: f32,
    pub player_height: f32,
    pub enemy_radius: f32,
    pub treasure_radius: f32,
    pub arrow_width: f32,
    pub arrow_length: f32,
    /// Extra gap between player and a new arrow
    pub arrow_spawn_buffer: f32,

    // === Speeds (pixels/s) ===
    pub player_speed: f32,
    pub arrow_speed: f32,
    pub enemy_speed: f32,
    pub diagonal_multiplier: f32,
    /// Hunter speed relative to the player
    pub hunter_speed_multiplier: f32,

    // === Rules ===
    pub enemy_count: usize,
    pub fire_delay_ms: u64,
    pub direction_change_ms: u64,
    pub spawn_check_ms: u64,
    pub game_over_delay_ms: u64,
    pub score_treasure: u64,
    pub score_enemy: u64,
    pub spawn_ramp: SpawnRamp,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: 393.0,
            viewport_height: 759.0,
            wall_thickness: 24.0,
            door_width: 90.0,
            room_top_offset: 140.0,
            player_offset_y: 80.0,
            divider_height_ratio: 0.5,
            divider_max_ratio: 0.5,

            treasure_padding: 80.0,
            treasure_top_offset: 40.0,
            enemy_spawn_min_x: 100.0,
            enemy_spawn_min_y: 120.0,
            enemy_spawn_max_y_offset: 160.0,
            hunter_spawn_offset: 10.0,

            player_width: 12.0,
            player_height: 16.0,
            enemy_radius: 14.0,
            treasure_radius: 12.0,
            arrow_width: 6.0,
            arrow_length: 12.0,
            arrow_spawn_buffer: 4.0,

            player_speed: 200.0,
            arrow_speed: 400.0,
            enemy_speed: 140.0,
            diagonal_multiplier: 0.7071,
            hunter_speed_multiplier: 1.05,

            enemy_count: 3,
            fire_delay_ms: 200,
            direction_change_ms: 2000,
            spawn_check_ms: 1000,
            game_over_delay_ms: 2000,
            score_treasure: 50,
            score_enemy: 25,
            spawn_ramp: SpawnRamp::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> GameResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Room side length (the room is square)
    #[inline]
    pub fn room_size(&self) -> f32 {
        self.viewport_width
    }

    /// Effective divider height fraction (ratio clamped to the cap)
    #[inline]
    pub fn divider_fraction(&self) -> f32 {
        self.divider_height_ratio.min(self.divider_max_ratio)
    }

    /// Hunter chase speed
    #[inline]
    pub fn hunter_speed(&self) -> f32 {
        self.player_speed * self.hunter_speed_multiplier
    }

    /// Player collision radius (half the diagonal of its bounding box)
    #[inline]
    pub fn player_radius(&self) -> f32 {
        self.player_width.hypot(self.player_height) / 2.0
    }

    /// Reject layouts the room builder cannot honor
    pub fn validate(&self) -> GameResult<()> {
        let fail = |msg: String| Err(GameError::InvalidConfig(msg));

        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return fail("viewport must have a positive size".into());
        }
        if self.room_top_offset + self.wall_thickness + self.room_size() > self.viewport_height {
            return fail(format!(
                "room ({}px) does not fit below top offset {} in a {}px viewport",
                self.room_size(),
                self.room_top_offset,
                self.viewport_height
            ));
        }
        if self.door_width <= 0.0 || self.door_width >= self.room_size() - 2.0 * self.wall_thickness {
            return fail(format!("door width {} does not fit the room", self.door_width));
        }
        if self.divider_max_ratio <= 0.0 || self.divider_max_ratio > 0.5 {
            return fail(format!(
                "divider cap {} must be within (0, 0.5]",
                self.divider_max_ratio
            ));
        }
        if 2.0 * self.treasure_padding >= self.room_size() {
            return fail(format!(
                "treasure padding {} leaves no room for placement",
                self.treasure_padding
            ));
        }
        if self.direction_change_ms == 0 || self.spawn_check_ms == 0 {
            return fail("timer periods must be non-zero".into());
        }
        if self.spawn_ramp.max_chance <= 0.0 || self.spawn_ramp.max_chance > 100.0 {
            return fail(format!(
                "spawn chance cap {} must be within (0, 100]",
                self.spawn_ramp.max_chance
            ));
        }

        let layout = RoomLayout::new(self);
        if !layout.treasure_region.is_valid() {
            return fail("treasure insets leave no room for placement".into());
        }
        if !layout.enemy_region.is_valid() {
            return fail("enemy spawn insets leave no room for placement".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.room_size(), 393.0);
        assert!((settings.player_radius() - 10.0).abs() < 1e-4);
        assert!((settings.hunter_speed() - 210.0).abs() < 1e-3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "enemy_count": 5, "spawn_ramp": { "start_secs": 3.0 } }"#)
            .unwrap();
        assert_eq!(settings.enemy_count, 5);
        assert_eq!(settings.spawn_ramp.start_secs, 3.0);
        assert_eq!(settings.spawn_ramp.base_chance, 5.0);
        assert_eq!(settings.player_speed, 200.0);
    }

    #[test]
    fn test_rejects_tall_divider() {
        let settings = Settings {
            divider_max_ratio: 0.8,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_placement_regions() {
        // Narrow room: treasure and enemy regions both collapse
        let narrow = Settings {
            viewport_width: 180.0,
            ..Default::default()
        };
        assert!(matches!(narrow.validate(), Err(GameError::InvalidConfig(_))));

        let low_treasure = Settings {
            treasure_top_offset: 300.0,
            ..Default::default()
        };
        assert!(matches!(low_treasure.validate(), Err(GameError::InvalidConfig(_))));

        let low_enemies = Settings {
            enemy_spawn_max_y_offset: 400.0,
            ..Default::default()
        };
        assert!(matches!(low_enemies.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_cap_above_certainty() {
        let mut settings = Settings::default();
        settings.spawn_ramp.max_chance = 150.0;
        assert!(matches!(settings.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(Settings::from_json("{ not json"), Err(GameError::Json(_))));
    }

    #[test]
    fn test_spawn_ramp() {
        let ramp = SpawnRamp::default();
        assert_eq!(ramp.chance_at(4.99), None);
        assert_eq!(ramp.chance_at(5.0), Some(5.0));
        assert_eq!(ramp.chance_at(6.0), Some(10.0));
        assert_eq!(ramp.chance_at(24.0), Some(100.0));
        assert_eq!(ramp.chance_at(90.0), Some(100.0));
        assert_eq!(ramp.saturation_secs(), 24.0);
    }

    #[test]
    fn test_divider_fraction_is_capped() {
        let settings = Settings {
            divider_height_ratio: 0.9,
            ..Default::default()
        };
        assert_eq!(settings.divider_fraction(), 0.5);
    }
}
