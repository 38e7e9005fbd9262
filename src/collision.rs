//! Collision predicates and move resolution shared by the player and
//! enemies.
//!
//! Systems snapshot the living roster into [`ActorShape`] lists before the
//! mutation pass, then test candidate offsets against walls and that
//! snapshot. Resolution tries the combined diagonal offset first and falls
//! back to the unblocked axes, which produces wall sliding without full
//! physics.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Body, Enemy, Position};
use crate::constants::{KNOCKBACK_DECAY, KNOCKBACK_EPSILON};
use crate::grid::TileMap;

/// Position/radius snapshot of one living actor.
#[derive(Debug, Clone, Copy)]
pub struct ActorShape {
    pub entity: Entity,
    pub center: Vec2,
    pub radius: f32,
}

/// Snapshot all living enemies.
pub fn gather_enemy_shapes(world: &World) -> Vec<ActorShape> {
    let mut shapes = Vec::new();
    for (entity, (pos, body, enemy)) in world.query::<(&Position, &Body, &Enemy)>().iter() {
        if !enemy.alive {
            continue;
        }
        shapes.push(ActorShape {
            entity,
            center: pos.0,
            radius: body.radius,
        });
    }
    shapes
}

/// Test the actor's bounding box, offset by `offset`, against wall tiles.
/// Samples nine points: center, four corners, and four edge midpoints.
pub fn overlaps_wall(map: &TileMap, center: Vec2, radius: f32, offset: Vec2) -> bool {
    let c = center + offset;
    let test_points = [
        (c.x, c.y),
        (c.x - radius, c.y - radius),
        (c.x + radius, c.y - radius),
        (c.x - radius, c.y + radius),
        (c.x + radius, c.y + radius),
        (c.x, c.y - radius),
        (c.x, c.y + radius),
        (c.x - radius, c.y),
        (c.x + radius, c.y),
    ];
    test_points.iter().any(|&(x, y)| map.is_wall_at(x, y))
}

/// Circle-vs-circle test of the offset center against every shape in the
/// roster snapshot.
pub fn overlaps_actor(center: Vec2, radius: f32, offset: Vec2, others: &[ActorShape]) -> bool {
    let c = center + offset;
    others
        .iter()
        .any(|other| c.distance(other.center) < radius + other.radius)
}

/// Resolve a desired movement against walls and the roster snapshot.
/// Returns the offset that can actually be applied: the full diagonal if it
/// is clear, otherwise whichever single axes are unblocked.
pub fn resolve_move(
    map: &TileMap,
    center: Vec2,
    radius: f32,
    desired: Vec2,
    others: &[ActorShape],
) -> Vec2 {
    if desired == Vec2::ZERO {
        return Vec2::ZERO;
    }

    let blocked = |offset: Vec2| {
        overlaps_wall(map, center, radius, offset) || overlaps_actor(center, radius, offset, others)
    };

    if !blocked(desired) {
        return desired;
    }

    let mut applied = Vec2::ZERO;
    let x_only = Vec2::new(desired.x, 0.0);
    if desired.x != 0.0 && !blocked(x_only) {
        applied.x = desired.x;
    }
    let y_only = Vec2::new(0.0, desired.y);
    if desired.y != 0.0 && !blocked(y_only) {
        applied.y = desired.y;
    }
    applied
}

/// Decay a knockback impulse for one tick, clamping to zero below epsilon.
pub fn decay_knockback(knockback: &mut Vec2) {
    *knockback *= KNOCKBACK_DECAY;
    if knockback.length() < KNOCKBACK_EPSILON {
        *knockback = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TILE_SIZE;
    use crate::tile::Tile;

    fn open_map() -> TileMap {
        let mut map = TileMap::filled_with_walls(10, 10);
        for ty in 1..9 {
            for tx in 1..9 {
                map.set_tile(tx, ty, Tile::Floor);
            }
        }
        map
    }

    #[test]
    fn test_overlaps_wall_is_pure() {
        let map = open_map();
        let center = TileMap::tile_center(5, 5);
        let offset = Vec2::new(12.0, -7.0);
        let first = overlaps_wall(&map, center, 20.0, offset);
        for _ in 0..10 {
            assert_eq!(overlaps_wall(&map, center, 20.0, offset), first);
        }
    }

    #[test]
    fn test_overlaps_wall_detects_corner_contact() {
        let map = open_map();
        // Center clear of the wall, but one corner of the box pokes into it.
        let center = Vec2::new(1.5 * TILE_SIZE, 1.5 * TILE_SIZE);
        assert!(!overlaps_wall(&map, center, 16.0, Vec2::ZERO));
        assert!(overlaps_wall(&map, center, 16.0, Vec2::new(-24.0, 0.0)));
    }

    #[test]
    fn test_overlaps_actor_uses_radius_sum() {
        let shapes = [ActorShape {
            entity: World::new().spawn(()),
            center: Vec2::new(100.0, 0.0),
            radius: 20.0,
        }];
        assert!(overlaps_actor(Vec2::ZERO, 20.0, Vec2::new(61.0, 0.0), &shapes));
        assert!(!overlaps_actor(Vec2::ZERO, 20.0, Vec2::new(59.0, 0.0), &shapes));
    }

    #[test]
    fn test_resolve_move_slides_along_wall() {
        let map = open_map();
        // Next to the left wall; moving diagonally into it should keep the
        // vertical component.
        let center = Vec2::new(1.5 * TILE_SIZE, 5.0 * TILE_SIZE);
        let desired = Vec2::new(-40.0, 10.0);
        let applied = resolve_move(&map, center, 24.0, desired, &[]);
        assert_eq!(applied, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn test_resolve_move_clear_path_is_unchanged() {
        let map = open_map();
        let center = TileMap::tile_center(5, 5);
        let desired = Vec2::new(3.0, -4.0);
        assert_eq!(resolve_move(&map, center, 10.0, desired, &[]), desired);
    }

    #[test]
    fn test_knockback_decays_to_exact_zero() {
        let mut kb = Vec2::new(8.0, 0.0);
        let mut ticks = 0;
        while kb != Vec2::ZERO {
            decay_knockback(&mut kb);
            ticks += 1;
            assert!(ticks < 100, "knockback failed to converge");
        }
        assert_eq!(kb, Vec2::ZERO);
        // Stays exactly zero afterwards.
        decay_knockback(&mut kb);
        assert_eq!(kb, Vec2::ZERO);
    }

    #[test]
    fn test_normalize_zero_vector_is_zero() {
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    }
}
