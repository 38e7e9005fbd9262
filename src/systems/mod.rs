pub mod ai;
pub mod combat;
pub mod player;
pub mod projectile;
pub mod weapons;
