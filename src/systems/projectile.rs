//! Projectile advancement and hit resolution for both owners.
//!
//! Projectiles are plain data owned by the game driver, not ECS entities;
//! they move in a straight line until they exhaust their range, hit a wall,
//! or connect with a target.

use glam::Vec2;
use hecs::{Entity, World};

use crate::collision::gather_enemy_shapes;
use crate::components::{Body, Player, Position};
use crate::constants::PLAYER_RADIUS;
use crate::events::EventQueue;
use crate::grid::TileMap;
use crate::systems::combat::{damage_enemy, damage_player};

/// One projectile in flight.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub traveled: f32,
    pub max_range: f32,
    pub damage: f32,
    pub radius: f32,
}

impl Projectile {
    pub fn new(
        position: Vec2,
        direction: Vec2,
        speed: f32,
        max_range: f32,
        damage: f32,
        radius: f32,
    ) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
            speed,
            traveled: 0.0,
            max_range,
            damage,
            radius,
        }
    }
}

/// Advance player-owned projectiles one tick. The first living enemy a shot
/// touches takes its full damage and consumes it. Returns the number of
/// kills, so the caller can award experience.
pub fn update_player_shots(
    world: &World,
    map: &TileMap,
    shots: &mut Vec<Projectile>,
    time: f32,
    events: &mut EventQueue,
) -> u32 {
    let roster = gather_enemy_shapes(world);
    let mut kills = 0;
    shots.retain_mut(|shot| {
        shot.position += shot.direction * shot.speed;
        shot.traveled += shot.speed;
        if shot.traveled >= shot.max_range {
            return false;
        }
        if map.is_wall_at(shot.position.x, shot.position.y) {
            return false;
        }
        for shape in &roster {
            if shot.position.distance(shape.center) < shot.radius + shape.radius {
                if damage_enemy(world, shape.entity, shot.damage, time, events) {
                    kills += 1;
                }
                return false;
            }
        }
        true
    });
    kills
}

/// Advance enemy-owned projectiles one tick; a shot that reaches the living
/// player damages them and is consumed. Invulnerability still consumes the
/// shot, it just deals nothing.
pub fn update_enemy_shots(
    world: &World,
    map: &TileMap,
    shots: &mut Vec<Projectile>,
    player_entity: Entity,
    time: f32,
    events: &mut EventQueue,
) {
    let player_alive = world
        .get::<&Player>(player_entity)
        .map(|p| p.alive)
        .unwrap_or(false);
    let player_pos = world
        .get::<&Position>(player_entity)
        .map(|p| p.0)
        .unwrap_or(Vec2::ZERO);
    let player_radius = world
        .get::<&Body>(player_entity)
        .map(|b| b.radius)
        .unwrap_or(PLAYER_RADIUS);

    shots.retain_mut(|shot| {
        shot.position += shot.direction * shot.speed;
        shot.traveled += shot.speed;
        if shot.traveled >= shot.max_range {
            return false;
        }
        if map.is_wall_at(shot.position.x, shot.position.y) {
            return false;
        }
        if player_alive && shot.position.distance(player_pos) < shot.radius + player_radius {
            damage_player(world, player_entity, shot.damage, time, events);
            return false;
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Archetype, Enemy, EnemyState, Health, Knockback, Velocity};
    use crate::constants::*;
    use crate::tile::Tile;

    fn open_map() -> TileMap {
        let mut map = TileMap::filled_with_walls(20, 20);
        for ty in 1..19 {
            for tx in 1..19 {
                map.set_tile(tx, ty, Tile::Floor);
            }
        }
        map
    }

    fn spawn_enemy(world: &mut World, pos: Vec2) -> Entity {
        let enemy = Enemy::new(Archetype::Melee, pos, EnemyState::Idle);
        let hp = enemy.stats.max_hp;
        world.spawn((
            enemy,
            Position(pos),
            Velocity::default(),
            Knockback::default(),
            Body {
                radius: ENEMY_RADIUS,
            },
            Health::new(hp),
        ))
    }

    #[test]
    fn test_shot_expires_at_max_range() {
        let world = World::new();
        let map = open_map();
        let mut events = EventQueue::new();
        let mut shots = vec![Projectile::new(
            TileMap::tile_center(10, 10),
            Vec2::X,
            8.0,
            40.0,
            10.0,
            8.0,
        )];

        for _ in 0..4 {
            update_player_shots(&world, &map, &mut shots, 0.0, &mut events);
        }
        assert_eq!(shots.len(), 1);
        update_player_shots(&world, &map, &mut shots, 0.0, &mut events);
        assert!(shots.is_empty());
    }

    #[test]
    fn test_first_enemy_hit_consumes_shot() {
        let mut world = World::new();
        let map = open_map();
        let origin = TileMap::tile_center(5, 10);
        let near = spawn_enemy(&mut world, origin + Vec2::new(80.0, 0.0));
        let far = spawn_enemy(&mut world, origin + Vec2::new(200.0, 0.0));
        let mut events = EventQueue::new();
        let mut shots = vec![Projectile::new(origin, Vec2::X, 8.0, 400.0, 10.0, 8.0)];

        for _ in 0..50 {
            update_player_shots(&world, &map, &mut shots, 0.0, &mut events);
            if shots.is_empty() {
                break;
            }
        }
        assert!(shots.is_empty());
        let near_hp = world.get::<&Health>(near).unwrap().current;
        let far_hp = world.get::<&Health>(far).unwrap().current;
        assert!(near_hp < ENEMY_HP);
        assert_eq!(far_hp, ENEMY_HP);
    }

    #[test]
    fn test_shot_stops_at_wall() {
        let world = World::new();
        let map = open_map();
        // Fired straight at the boundary wall.
        let mut events = EventQueue::new();
        let mut shots = vec![Projectile::new(
            TileMap::tile_center(2, 10),
            -Vec2::X,
            8.0,
            4000.0,
            10.0,
            8.0,
        )];
        for _ in 0..100 {
            update_player_shots(&world, &map, &mut shots, 0.0, &mut events);
        }
        assert!(shots.is_empty());
    }
}
