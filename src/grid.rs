//! The per-level tile map. Immutable after generation; AI and collision
//! consult it every tick, so all queries are O(1).

use glam::Vec2;

use crate::constants::TILE_SIZE;
use crate::tile::Tile;

pub struct TileMap {
    pub width: usize,
    pub height: usize,
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Create a map filled with walls; generation carves floors into it.
    pub fn filled_with_walls(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Wall; width * height],
        }
    }

    fn index(&self, tx: i32, ty: i32) -> Option<usize> {
        if tx < 0 || ty < 0 || tx >= self.width as i32 || ty >= self.height as i32 {
            return None;
        }
        Some(ty as usize * self.width + tx as usize)
    }

    /// Tile at the given tile coordinate. Out of bounds reads as Wall.
    pub fn tile_at(&self, tx: i32, ty: i32) -> Tile {
        self.index(tx, ty)
            .map(|idx| self.tiles[idx])
            .unwrap_or(Tile::Wall)
    }

    pub fn set_tile(&mut self, tx: i32, ty: i32, tile: Tile) {
        if let Some(idx) = self.index(tx, ty) {
            self.tiles[idx] = tile;
        }
    }

    /// Wall test in continuous world coordinates. Out of bounds is a wall.
    pub fn is_wall_at(&self, world_x: f32, world_y: f32) -> bool {
        let tx = (world_x / TILE_SIZE).floor() as i32;
        let ty = (world_y / TILE_SIZE).floor() as i32;
        self.tile_at(tx, ty).is_wall()
    }

    /// World-space center of a tile.
    pub fn tile_center(tx: i32, ty: i32) -> Vec2 {
        Vec2::new(
            tx as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            ty as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    /// Tile coordinate containing a world point.
    pub fn world_to_tile(point: Vec2) -> (i32, i32) {
        (
            (point.x / TILE_SIZE).floor() as i32,
            (point.y / TILE_SIZE).floor() as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_wall() {
        let map = TileMap::filled_with_walls(10, 10);
        assert_eq!(map.tile_at(-1, 0), Tile::Wall);
        assert_eq!(map.tile_at(0, -1), Tile::Wall);
        assert_eq!(map.tile_at(10, 0), Tile::Wall);
        assert!(map.is_wall_at(-5.0, 5.0));
        assert!(map.is_wall_at(10.0 * TILE_SIZE + 1.0, 5.0));
    }

    #[test]
    fn test_set_and_query() {
        let mut map = TileMap::filled_with_walls(10, 10);
        map.set_tile(3, 4, Tile::Floor);
        assert_eq!(map.tile_at(3, 4), Tile::Floor);
        assert!(!map.is_wall_at(3.5 * TILE_SIZE, 4.5 * TILE_SIZE));
        assert!(map.is_wall_at(2.5 * TILE_SIZE, 4.5 * TILE_SIZE));
    }

    #[test]
    fn test_tile_world_round_trip() {
        let center = TileMap::tile_center(7, 2);
        assert_eq!(TileMap::world_to_tile(center), (7, 2));
    }

    #[test]
    fn test_set_tile_out_of_bounds_is_noop() {
        let mut map = TileMap::filled_with_walls(4, 4);
        map.set_tile(-1, 0, Tile::Floor);
        map.set_tile(4, 4, Tile::Floor);
        assert_eq!(map.tile_at(-1, 0), Tile::Wall);
    }
}
