//! Simulation core for a top-down dungeon action game: procedural floor
//! generation, an enemy state machine with flocking, and player combat,
//! all advanced on a fixed tick.
//!
//! The crate is headless. A rendering/input driver owns a [`Game`], feeds
//! it a [`PlayerInput`] per tick, and drains [`GameEvent`]s for effects.

pub mod collision;
pub mod components;
pub mod constants;
pub mod events;
pub mod game;
pub mod grid;
pub mod level;
pub mod level_gen;
pub mod systems;
pub mod tile;

pub use components::{Archetype, Enemy, EnemyState, Health, Player, Position, Velocity};
pub use events::{EventQueue, GameEvent};
pub use game::Game;
pub use grid::TileMap;
pub use level::Level;
pub use level_gen::{GeneratedLevel, LevelGenerator};
pub use systems::player::PlayerInput;
pub use systems::projectile::Projectile;
pub use systems::weapons::WeaponKind;
pub use tile::Tile;
