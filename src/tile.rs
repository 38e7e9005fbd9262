/// A single tile kind in the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
    Checkpoint,
    Portal,
}

impl Tile {
    /// Whether actors can stand on this tile.
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Tile::Wall)
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, Tile::Wall)
    }
}
