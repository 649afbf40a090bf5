//! Room geometry
//!
//! A room is a square whose side equals the viewport width: a full top wall,
//! a bottom wall split around the door gap, two side walls, and one divider
//! wall standing between the player's spawn point and the treasure. The
//! whole wall set and the treasure are rebuilt for every room; the door is
//! created once and never moves.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Circle, Rect};
use crate::error::{GameError, GameResult};
use crate::settings::Settings;

/// Index of the divider in the wall list (after the five boundary segments)
pub const DIVIDER_INDEX: usize = 5;

/// Derived room measurements. Pure arithmetic over [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    pub width: f32,
    pub wall_thickness: f32,
    pub door_width: f32,
    /// Center line of the top wall
    pub top_wall_y: f32,
    /// Center line of the bottom wall (and the door)
    pub bottom_wall_y: f32,
    pub player_spawn: Vec2,
    pub hunter_spawn: Vec2,
    /// Where a treasure center may land
    pub treasure_region: Rect,
    /// Where a wandering enemy center may land
    pub enemy_region: Rect,
    pub divider_height: f32,
}

impl RoomLayout {
    pub fn new(settings: &Settings) -> Self {
        let width = settings.room_size();
        let t = settings.wall_thickness;
        let top_wall_y = settings.room_top_offset + t / 2.0;
        let bottom_wall_y = top_wall_y + width;
        let inner_top = top_wall_y + t / 2.0;
        let inner_bottom = top_wall_y + width - t / 2.0;

        let pad = settings.treasure_padding;
        let treasure_region = Rect::from_corners(
            Vec2::new(pad, inner_top + pad + settings.treasure_top_offset),
            Vec2::new(width - pad, inner_bottom - pad),
        );

        let enemy_region = Rect::from_corners(
            Vec2::new(
                settings.enemy_spawn_min_x,
                (inner_top + settings.enemy_spawn_min_y).max(settings.enemy_spawn_min_y),
            ),
            Vec2::new(
                width - settings.enemy_spawn_min_x,
                inner_bottom - settings.enemy_spawn_max_y_offset,
            ),
        );

        Self {
            width,
            wall_thickness: t,
            door_width: settings.door_width,
            top_wall_y,
            bottom_wall_y,
            player_spawn: Vec2::new(width / 2.0, bottom_wall_y - settings.player_offset_y),
            hunter_spawn: Vec2::new(
                width / 2.0,
                inner_top + settings.enemy_radius + settings.hunter_spawn_offset,
            ),
            treasure_region,
            enemy_region,
            divider_height: width * settings.divider_fraction(),
        }
    }

    /// Vertical center of the room
    #[inline]
    pub fn center_y(&self) -> f32 {
        (self.top_wall_y + self.bottom_wall_y) / 2.0
    }

    /// The five boundary segments: top, bottom-left, bottom-right, left, right
    pub fn boundary_walls(&self) -> [Rect; 5] {
        let w = self.width;
        let t = self.wall_thickness;
        let door_half = self.door_width / 2.0;
        let door_x = w / 2.0;
        let segment = w / 2.0 - door_half;
        let side_height = w + t;

        [
            Rect::new(w / 2.0, self.top_wall_y, w, t),
            Rect::new(door_x - door_half - segment / 2.0, self.bottom_wall_y, segment, t),
            Rect::new(door_x + door_half + segment / 2.0, self.bottom_wall_y, segment, t),
            Rect::new(t / 2.0, self.center_y(), t, side_height),
            Rect::new(w - t / 2.0, self.center_y(), t, side_height),
        ]
    }

    /// The door fills the gap in the bottom wall
    pub fn door(&self) -> Rect {
        Rect::new(
            self.width / 2.0,
            self.bottom_wall_y,
            self.door_width,
            self.wall_thickness,
        )
    }

    /// Uniform point inside a region (inclusive)
    pub fn random_point_in(region: &Rect, rng: &mut impl Rng) -> Vec2 {
        let (min, max) = (region.min(), region.max());
        Vec2::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
        )
    }
}

/// Identity of a treasure instance; a new one is minted for every room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreasureId(pub u32);

/// Static circular pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasure {
    pub id: TreasureId,
    pub pos: Vec2,
    pub radius: f32,
}

impl Treasure {
    #[inline]
    pub fn body(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

/// Owns the static room geometry and the treasure
#[derive(Debug)]
pub struct RoomBuilder {
    layout: RoomLayout,
    treasure_radius: f32,
    walls: Vec<Rect>,
    door: Option<Rect>,
    treasure: Option<Treasure>,
    next_treasure_id: u32,
}

impl RoomBuilder {
    pub fn new(settings: &Settings) -> Self {
        Self {
            layout: RoomLayout::new(settings),
            treasure_radius: settings.treasure_radius,
            walls: Vec::new(),
            door: None,
            treasure: None,
            next_treasure_id: 1,
        }
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    pub fn door(&self) -> Option<&Rect> {
        self.door.as_ref()
    }

    pub fn treasure(&self) -> Option<&Treasure> {
        self.treasure.as_ref()
    }

    /// The divider wall of the current room, once built
    pub fn divider(&self) -> Option<&Rect> {
        self.walls.get(DIVIDER_INDEX)
    }

    /// Create the door. Called once per scene; later rooms reuse it.
    pub fn init_door(&mut self) {
        if self.door.is_none() {
            self.door = Some(self.layout.door());
        }
    }

    /// Tear down the current room and lay out a fresh one.
    ///
    /// The treasure is a new instance afterwards, so anything that tracks it
    /// by identity has to re-register.
    pub fn build_room(&mut self, rng: &mut impl Rng) -> GameResult<()> {
        self.walls.clear();
        self.treasure = None;

        if !self.layout.treasure_region.is_valid() {
            return Err(GameError::Precondition(format!(
                "treasure region {:?} is empty",
                self.layout.treasure_region
            )));
        }

        self.walls.extend(self.layout.boundary_walls());
        self.place_treasure(rng);

        let treasure = self.treasure.as_ref().ok_or_else(|| {
            GameError::Precondition("divider wall placed before a treasure exists".into())
        })?;

        let center = (self.layout.player_spawn + treasure.pos) / 2.0;
        let divider = Rect {
            center,
            size: Vec2::new(self.layout.wall_thickness, self.layout.divider_height),
        };
        self.walls.push(divider);

        log::debug!(
            "Room built: treasure {:?} at ({:.0}, {:.0}), divider at ({:.0}, {:.0})",
            treasure.id,
            treasure.pos.x,
            treasure.pos.y,
            center.x,
            center.y
        );
        Ok(())
    }

    fn place_treasure(&mut self, rng: &mut impl Rng) {
        let id = TreasureId(self.next_treasure_id);
        self.next_treasure_id += 1;
        self.treasure = Some(Treasure {
            id,
            pos: RoomLayout::random_point_in(&self.layout.treasure_region, rng),
            radius: self.treasure_radius,
        });
    }

    /// Remove the treasure. Returns false if it was already gone.
    pub fn collect_treasure(&mut self) -> bool {
        self.treasure.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn built_room(seed: u64) -> RoomBuilder {
        let mut room = RoomBuilder::new(&Settings::default());
        room.init_door();
        room.build_room(&mut Pcg32::seed_from_u64(seed)).unwrap();
        room
    }

    #[test]
    fn test_boundary_is_closed_except_door() {
        let room = built_room(7);
        let layout = room.layout();
        let walls = room.walls();
        assert_eq!(walls.len(), 6);

        let (top, bottom_left, bottom_right, left, right) =
            (walls[0], walls[1], walls[2], walls[3], walls[4]);

        // Top spans the full width
        assert_eq!(top.left(), 0.0);
        assert_eq!(top.right(), layout.width);

        // Sides reach from the top wall's outer edge to the bottom wall's outer edge
        for side in [left, right] {
            assert!((side.top() - top.top()).abs() < 1e-3);
            assert!((side.bottom() - bottom_left.bottom()).abs() < 1e-3);
        }
        assert_eq!(left.left(), 0.0);
        assert_eq!(right.right(), layout.width);

        // Bottom: exactly one gap, exactly one door wide, filled by the door
        assert_eq!(bottom_left.left(), 0.0);
        assert_eq!(bottom_right.right(), layout.width);
        let gap = bottom_right.left() - bottom_left.right();
        assert!((gap - layout.door_width).abs() < 1e-3);

        let door = room.door().unwrap();
        assert!((door.left() - bottom_left.right()).abs() < 1e-3);
        assert!((door.right() - bottom_right.left()).abs() < 1e-3);
        assert_eq!(door.center.y, bottom_left.center.y);
    }

    #[test]
    fn test_divider_sits_between_spawn_and_treasure() {
        let room = built_room(42);
        let treasure = room.treasure().unwrap();
        let divider = room.divider().unwrap();
        let expected = (room.layout().player_spawn + treasure.pos) / 2.0;
        assert!((divider.center - expected).length() < 1e-4);
        assert_eq!(divider.size.x, room.layout().wall_thickness);
    }

    #[test]
    fn test_rebuild_mints_new_treasure() {
        let mut room = built_room(1);
        let first = room.treasure().unwrap().id;
        room.build_room(&mut Pcg32::seed_from_u64(2)).unwrap();
        let second = room.treasure().unwrap().id;
        assert_ne!(first, second);
        assert_eq!(room.walls().len(), 6);
    }

    #[test]
    fn test_collect_treasure_once() {
        let mut room = built_room(3);
        assert!(room.collect_treasure());
        assert!(room.treasure().is_none());
        assert!(!room.collect_treasure());
    }

    #[test]
    fn test_empty_treasure_region_aborts_build() {
        let settings = Settings {
            treasure_top_offset: 300.0,
            ..Default::default()
        };
        let mut room = RoomBuilder::new(&settings);
        let result = room.build_room(&mut Pcg32::seed_from_u64(1));
        assert!(matches!(result, Err(GameError::Precondition(_))));
        assert!(room.treasure().is_none());
        assert!(room.divider().is_none());
    }

    #[test]
    fn test_door_is_created_once() {
        let mut room = RoomBuilder::new(&Settings::default());
        assert!(room.door().is_none());
        room.init_door();
        let door = *room.door().unwrap();
        room.build_room(&mut Pcg32::seed_from_u64(9)).unwrap();
        room.init_door();
        assert_eq!(*room.door().unwrap(), door);
    }

    proptest! {
        #[test]
        fn prop_treasure_inside_padding(seed in any::<u64>()) {
            let settings = Settings::default();
            let room = built_room(seed);
            let t = room.treasure().unwrap();
            let layout = room.layout();
            let pad = settings.treasure_padding;
            let inner_top = layout.top_wall_y + layout.wall_thickness / 2.0;
            let inner_bottom = layout.bottom_wall_y - layout.wall_thickness / 2.0;

            prop_assert!(t.pos.x >= pad && t.pos.x <= layout.width - pad);
            prop_assert!(t.pos.y >= inner_top + pad + settings.treasure_top_offset);
            prop_assert!(t.pos.y <= inner_bottom - pad);
            prop_assert!(!t.body().overlaps_rect(room.door().unwrap()));
        }

        #[test]
        fn prop_divider_height_capped(seed in any::<u64>(), ratio in 0.05f32..2.0) {
            let settings = Settings { divider_height_ratio: ratio, ..Default::default() };
            let mut room = RoomBuilder::new(&settings);
            room.build_room(&mut Pcg32::seed_from_u64(seed)).unwrap();
            let divider = room.divider().unwrap();
            prop_assert!(divider.size.y <= settings.room_size() * settings.divider_max_ratio + 1e-3);
        }
    }
}
