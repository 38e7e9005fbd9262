//! Procedural level generation: room placement on a coarse cell partition,
//! L-shaped corridors, checkpoint/portal placement, and constrained enemy
//! population.
//!
//! The generator draws every random choice from the `Rng` handed to it, so a
//! seeded rng reproduces a level exactly.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::components::Archetype;
use crate::constants::*;
use crate::grid::TileMap;
use crate::tile::Tile;

/// An axis-aligned room in tile space. Geometry is baked into the tile map
/// during carving; rooms are discarded once generation finishes.
#[derive(Debug, Clone, Copy)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub connected: bool,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            connected: false,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether a tile lies strictly inside the room, off its boundary ring.
    pub fn contains_interior(&self, tx: i32, ty: i32) -> bool {
        tx > self.x
            && tx < self.x + self.width - 1
            && ty > self.y
            && ty < self.y + self.height - 1
    }

    /// A random tile strictly inside the room.
    pub fn random_interior_position(&self, rng: &mut impl Rng) -> (i32, i32) {
        let tx = rng.gen_range(self.x + 1..=self.x + self.width - 2);
        let ty = rng.gen_range(self.y + 1..=self.y + self.height - 2);
        (tx, ty)
    }
}

/// One enemy spawn slot produced by generation.
#[derive(Debug, Clone, Copy)]
pub struct EnemySpawn {
    pub tile: (i32, i32),
    pub archetype: Archetype,
}

/// Everything the orchestrator needs to build a level.
pub struct GeneratedLevel {
    pub map: TileMap,
    pub spawn_tile: (i32, i32),
    pub enemy_spawns: Vec<EnemySpawn>,
    pub portal_tile: (i32, i32),
    pub checkpoint_tiles: Vec<(i32, i32)>,
}

impl GeneratedLevel {
    /// World-space spawn point (tile center).
    pub fn spawn_point(&self) -> Vec2 {
        TileMap::tile_center(self.spawn_tile.0, self.spawn_tile.1)
    }

    /// World-space portal point (tile center).
    pub fn portal_point(&self) -> Vec2 {
        TileMap::tile_center(self.portal_tile.0, self.portal_tile.1)
    }
}

/// Per-room enemy count range for a given level number. Scales linearly and
/// never decreases as the level number grows.
pub fn enemy_count_range(level_number: u32) -> (u32, u32) {
    let scale = 1.0 + ENEMY_COUNT_LEVEL_SCALING * level_number.saturating_sub(1) as f32;
    let min = ((ENEMIES_PER_ROOM.0 as f32 * scale) as u32).max(1);
    let max = ((ENEMIES_PER_ROOM.1 as f32 * scale) as u32).max(2).max(min);
    (min, max)
}

pub struct LevelGenerator {
    width: i32,
    height: i32,
    level_number: u32,
    map: TileMap,
    rooms: Vec<Room>,
    spawn_tile: (i32, i32),
    enemy_spawns: Vec<EnemySpawn>,
}

impl LevelGenerator {
    fn new(width: usize, height: usize, level_number: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            level_number,
            map: TileMap::filled_with_walls(width, height),
            rooms: Vec::new(),
            spawn_tile: (0, 0),
            enemy_spawns: Vec::new(),
        }
    }

    /// Generate a level. All randomness comes from `rng`.
    pub fn generate(
        width: usize,
        height: usize,
        level_number: u32,
        rng: &mut impl Rng,
    ) -> GeneratedLevel {
        let mut gen = Self::new(width, height, level_number);

        gen.place_rooms(rng);
        debug!(level_number, rooms = gen.rooms.len(), "rooms placed");

        gen.connect_rooms(rng);

        let checkpoint_tiles = gen.place_checkpoints(rng);
        let portal_tile = gen.place_portal();
        gen.place_enemies(rng);
        debug!(
            level_number,
            enemies = gen.enemy_spawns.len(),
            checkpoints = checkpoint_tiles.len(),
            "level populated"
        );

        GeneratedLevel {
            map: gen.map,
            spawn_tile: gen.spawn_tile,
            enemy_spawns: gen.enemy_spawns,
            portal_tile,
            checkpoint_tiles,
        }
    }

    /// Select cells of a coarse partition, size a room inside each with
    /// random jitter, and carve them. Cells are visited in reading order so
    /// corridors progress left-to-right, top-to-bottom.
    fn place_rooms(&mut self, rng: &mut impl Rng) {
        let cell_width = (self.width - 2) / GEN_GRID_COLS as i32;
        let cell_height = (self.height - 2) / GEN_GRID_ROWS as i32;

        let mut cells = Vec::new();
        for row in 0..GEN_GRID_ROWS as i32 {
            for col in 0..GEN_GRID_COLS as i32 {
                cells.push((row, col));
            }
        }

        let room_count = ROOMS_PER_LEVEL.min(cells.len());
        let mut selected: Vec<(i32, i32)> =
            cells.choose_multiple(rng, room_count).copied().collect();
        selected.sort();

        for (i, (row, col)) in selected.into_iter().enumerate() {
            let room_width = sized_within(cell_width, rng);
            let room_height = sized_within(cell_height, rng);

            let cell_x = 1 + col * cell_width;
            let cell_y = 1 + row * cell_height;
            let jitter_x = (cell_width - room_width - 2).max(2);
            let jitter_y = (cell_height - room_height - 2).max(2);
            let x = cell_x + rng.gen_range(2..=jitter_x);
            let y = cell_y + rng.gen_range(2..=jitter_y);

            let room = Room::new(x, y, room_width, room_height);
            self.carve_room(&room);
            if i == 0 {
                self.spawn_tile = room.center();
            }
            self.rooms.push(room);
        }
    }

    fn carve_room(&mut self, room: &Room) {
        for ty in room.y..room.y + room.height {
            for tx in room.x..room.x + room.width {
                self.map.set_tile(tx, ty, Tile::Floor);
            }
        }
    }

    /// Connect each consecutive pair of rooms with an L-shaped corridor,
    /// picking the bend direction at random.
    fn connect_rooms(&mut self, rng: &mut impl Rng) {
        for i in 0..self.rooms.len().saturating_sub(1) {
            let (x1, y1) = self.rooms[i].center();
            let (x2, y2) = self.rooms[i + 1].center();

            if rng.gen_bool(0.5) {
                self.carve_corridor((x1, y1), (x2, y1));
                self.carve_corridor((x2, y1), (x2, y2));
            } else {
                self.carve_corridor((x1, y1), (x1, y2));
                self.carve_corridor((x1, y2), (x2, y2));
            }

            self.rooms[i].connected = true;
            self.rooms[i + 1].connected = true;
        }
    }

    /// Carve a straight corridor leg of `CORRIDOR_WIDTH`, centered on the
    /// leg axis.
    fn carve_corridor(&mut self, start: (i32, i32), end: (i32, i32)) {
        let (x1, y1) = start;
        let (x2, y2) = end;

        for tx in x1.min(x2)..=x1.max(x2) {
            for w in 0..CORRIDOR_WIDTH {
                self.map.set_tile(tx, y1 + w - CORRIDOR_WIDTH / 2, Tile::Floor);
            }
        }
        for ty in y1.min(y2)..=y1.max(y2) {
            for w in 0..CORRIDOR_WIDTH {
                self.map.set_tile(x2 + w - CORRIDOR_WIDTH / 2, ty, Tile::Floor);
            }
        }
    }

    /// Sample roughly one interior room in three and mark a random tile in
    /// each as a checkpoint. The first and last rooms never get one.
    fn place_checkpoints(&mut self, rng: &mut impl Rng) -> Vec<(i32, i32)> {
        let mut checkpoint_tiles = Vec::new();
        if self.rooms.len() < 3 {
            return checkpoint_tiles;
        }

        let interior: Vec<usize> = (1..self.rooms.len() - 1).collect();
        let count = (self.rooms.len() / CHECKPOINT_ROOM_DIVISOR).min(interior.len());

        for &room_idx in interior.choose_multiple(rng, count) {
            let (tx, ty) = self.rooms[room_idx].random_interior_position(rng);
            self.map.set_tile(tx, ty, Tile::Checkpoint);
            checkpoint_tiles.push((tx, ty));
        }
        checkpoint_tiles
    }

    /// The portal sits at the center of the last room carved.
    fn place_portal(&mut self) -> (i32, i32) {
        let portal_tile = self
            .rooms
            .last()
            .map(|room| room.center())
            .unwrap_or(self.spawn_tile);
        self.map.set_tile(portal_tile.0, portal_tile.1, Tile::Portal);
        portal_tile
    }

    /// Populate interior rooms (first and last excluded) with enemies,
    /// resampling positions until the constraints hold or the attempt
    /// budget runs out. Slots that never find a valid spot are skipped.
    fn place_enemies(&mut self, rng: &mut impl Rng) {
        if self.rooms.len() < 3 {
            return;
        }

        let (min_count, max_count) = enemy_count_range(self.level_number);
        let interior: Vec<Room> = self.rooms[1..self.rooms.len() - 1].to_vec();

        for (room_index, room) in interior.iter().enumerate() {
            let target = rng.gen_range(min_count..=max_count);
            let mut placed = 0;
            let mut attempts = 0;

            while placed < target && attempts < ENEMY_PLACEMENT_ATTEMPTS {
                attempts += 1;
                let pos = room.random_interior_position(rng);
                if !self.is_valid_enemy_position(pos, room, room_index) {
                    continue;
                }
                self.enemy_spawns.push(EnemySpawn {
                    tile: pos,
                    archetype: draw_archetype(rng),
                });
                placed += 1;
            }
            debug!(room_index, placed, target, "room populated");
        }
    }

    fn is_valid_enemy_position(&self, pos: (i32, i32), room: &Room, room_index: usize) -> bool {
        let (tx, ty) = pos;

        if self.map.tile_at(tx, ty) != Tile::Floor {
            return false;
        }
        if !room.contains_interior(tx, ty) {
            return false;
        }

        let separation_ok = self.enemy_spawns.iter().all(|spawn| {
            let dx = (tx - spawn.tile.0) as f32;
            let dy = (ty - spawn.tile.1) as f32;
            (dx * dx + dy * dy).sqrt() >= MIN_ENEMY_SEPARATION
        });
        if !separation_ok {
            return false;
        }

        // Keep the rooms nearest the spawn clear around the player's start.
        if room_index < 2 {
            let dx = (tx - self.spawn_tile.0) as f32;
            let dy = (ty - self.spawn_tile.1) as f32;
            if (dx * dx + dy * dy).sqrt() < MIN_ENEMY_DISTANCE_FROM_SPAWN {
                return false;
            }
        }

        true
    }
}

/// Room side length fitting a partition cell: random within the configured
/// bounds, clamped to the cell minus margin.
fn sized_within(cell_side: i32, rng: &mut impl Rng) -> i32 {
    let cap = (cell_side - 4).max(3);
    let lo = ROOM_MIN_SIZE.min(cap);
    let hi = ROOM_MAX_SIZE.min(cap).max(lo);
    rng.gen_range(lo..=hi)
}

/// Weighted archetype draw: melee-heavy, with ranged and tank minorities.
fn draw_archetype(rng: &mut impl Rng) -> Archetype {
    match rng.gen_range(0..10) {
        0..=4 => Archetype::Melee,
        5..=7 => Archetype::Ranged,
        _ => Archetype::Tank,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generate(seed: u64, level_number: u32) -> GeneratedLevel {
        let mut rng = StdRng::seed_from_u64(seed);
        LevelGenerator::generate(50, 50, level_number, &mut rng)
    }

    #[test]
    fn test_spawn_and_portal_never_on_wall() {
        for seed in 0..20 {
            let level = generate(seed, 1);
            let (sx, sy) = level.spawn_tile;
            let (px, py) = level.portal_tile;
            assert!(!level.map.tile_at(sx, sy).is_wall());
            assert!(!level.map.tile_at(px, py).is_wall());
            assert_eq!(level.map.tile_at(px, py), Tile::Portal);
        }
    }

    #[test]
    fn test_checkpoint_tiles_are_marked() {
        let level = generate(3, 1);
        for &(tx, ty) in &level.checkpoint_tiles {
            assert_eq!(level.map.tile_at(tx, ty), Tile::Checkpoint);
        }
    }

    #[test]
    fn test_enemy_positions_are_valid() {
        let level = generate(7, 1);
        for spawn in &level.enemy_spawns {
            let (tx, ty) = spawn.tile;
            assert_eq!(level.map.tile_at(tx, ty), Tile::Floor);
        }
        // Pairwise separation holds across the whole generation pass.
        for (i, a) in level.enemy_spawns.iter().enumerate() {
            for b in level.enemy_spawns.iter().skip(i + 1) {
                let dx = (a.tile.0 - b.tile.0) as f32;
                let dy = (a.tile.1 - b.tile.1) as f32;
                assert!((dx * dx + dy * dy).sqrt() >= MIN_ENEMY_SEPARATION);
            }
        }
    }

    #[test]
    fn test_enemy_count_range_never_decreases_with_level() {
        let mut prev = enemy_count_range(1);
        for level in 2..10 {
            let next = enemy_count_range(level);
            assert!(next.0 >= prev.0);
            assert!(next.1 >= prev.1);
            assert!(next.0 <= next.1);
            prev = next;
        }
    }

    #[test]
    fn test_room_request_clamped_to_cell_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut gen = LevelGenerator::new(50, 50, 1);
        gen.place_rooms(&mut rng);
        assert!(gen.rooms.len() <= GEN_GRID_COLS * GEN_GRID_ROWS);
        assert!(gen.rooms.len() >= 2);
    }

    #[test]
    fn test_rooms_are_corridor_connected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut gen = LevelGenerator::new(50, 50, 1);
        gen.place_rooms(&mut rng);
        gen.connect_rooms(&mut rng);
        assert!(gen.rooms.iter().all(|room| room.connected));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate(42, 2);
        let b = generate(42, 2);
        assert_eq!(a.spawn_tile, b.spawn_tile);
        assert_eq!(a.portal_tile, b.portal_tile);
        assert_eq!(a.enemy_spawns.len(), b.enemy_spawns.len());
        for (x, y) in a.enemy_spawns.iter().zip(b.enemy_spawns.iter()) {
            assert_eq!(x.tile, y.tile);
        }
    }

    #[test]
    fn test_generation_end_to_end() {
        let level = generate(1234, 1);
        assert!(!level.enemy_spawns.is_empty());
        assert_eq!(
            level.map.tile_at(level.portal_tile.0, level.portal_tile.1),
            Tile::Portal
        );
        for spawn in &level.enemy_spawns {
            assert_ne!(spawn.tile, level.spawn_tile);
        }
    }
}
