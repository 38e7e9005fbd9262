//! Player input handling: movement, dash, the melee swing, experience, and
//! respawn.

use std::collections::HashSet;

use glam::Vec2;
use hecs::{Entity, World};

use crate::collision::{decay_knockback, gather_enemy_shapes, overlaps_wall, resolve_move};
use crate::components::{Body, Health, Knockback, Player, Position, SwingState, Velocity};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};
use crate::grid::TileMap;
use crate::systems::combat::damage_enemy;
use crate::systems::weapons::WeaponKind;

/// One tick's worth of player input, already mapped from whatever device
/// the driver reads.
#[derive(Debug, Clone, Default)]
pub struct PlayerInput {
    /// Raw movement axes, each in [-1, 1].
    pub move_dir: Vec2,
    /// World-space aim point for melee swings and casts.
    pub aim: Vec2,
    pub dash: bool,
    pub attack: bool,
    pub cast: Option<WeaponKind>,
}

/// Advance the living player by one tick: mana regen, dash, movement with
/// knockback, and the melee swing. Does nothing while the player is dead;
/// [`update_respawn`] owns that path.
pub fn update_player(
    world: &World,
    map: &TileMap,
    player_entity: Entity,
    input: &PlayerInput,
    time: f32,
    events: &mut EventQueue,
) {
    let roster = gather_enemy_shapes(world);
    let mut hits: Vec<Entity> = Vec::new();

    {
        let Ok(mut player) = world.get::<&mut Player>(player_entity) else {
            return;
        };
        if !player.alive {
            return;
        }
        let Ok(mut position) = world.get::<&mut Position>(player_entity) else {
            return;
        };
        let Ok(mut velocity) = world.get::<&mut Velocity>(player_entity) else {
            return;
        };
        let Ok(mut knockback) = world.get::<&mut Knockback>(player_entity) else {
            return;
        };
        let radius = world
            .get::<&Body>(player_entity)
            .map(|b| b.radius)
            .unwrap_or(PLAYER_RADIUS);

        player.mana = (player.mana + player.mana_regen_rate() * TICK_DT).min(player.max_mana);

        let move_dir = input.move_dir.normalize_or_zero();

        // Dash commits to a fixed velocity for its whole duration and needs
        // an actual movement direction to start from.
        if input.dash
            && !player.dash.active
            && move_dir != Vec2::ZERO
            && time - player.dash.last_dash_time >= DASH_COOLDOWN
        {
            player.dash.active = true;
            player.dash.velocity = move_dir * DASH_SPEED;
            player.dash.started_at = time;
            player.dash.last_dash_time = time;
        }
        if player.dash.active && time - player.dash.started_at >= DASH_DURATION {
            player.dash.active = false;
        }

        velocity.0 = if player.dash.active {
            player.dash.velocity
        } else {
            move_dir * PLAYER_SPEED
        };

        let desired = velocity.0 + knockback.0;
        decay_knockback(&mut knockback.0);
        let step = resolve_move(map, position.0, radius, desired, &roster);
        position.0 += step;

        // Start a swing toward the aim point.
        if input.attack
            && !player.swing.active
            && time - player.last_attack_time >= PLAYER_ATTACK_COOLDOWN
        {
            let aim_dir = (input.aim - position.0).normalize_or_zero();
            let facing = if aim_dir == Vec2::ZERO { Vec2::X } else { aim_dir };
            player.last_attack_time = time;
            player.swing = SwingState {
                active: true,
                started_at: time,
                start_angle_deg: facing.y.atan2(facing.x).to_degrees(),
                trail: Vec::new(),
                hit_enemies: HashSet::new(),
            };
        }

        // Advance an active swing: sine-eased sweep across the arc, with a
        // tile-sized hit box carried at the blade tip. Each enemy is hit at
        // most once per swing.
        if player.swing.active {
            let progress = (time - player.swing.started_at) / ATTACK_ANIMATION_DURATION;
            if progress >= 1.0 {
                player.swing.active = false;
                player.swing.trail.clear();
            } else {
                let sweep = (progress * std::f32::consts::PI).sin();
                let angle = player.swing.start_angle_deg - ATTACK_SWING_ANGLE / 2.0
                    + ATTACK_SWING_ANGLE * sweep;
                let rad = angle.to_radians();
                let tip = position.0 + Vec2::new(rad.cos(), rad.sin()) * PLAYER_ATTACK_RANGE;

                player.swing.trail.push(tip);
                if player.swing.trail.len() > ATTACK_TRAIL_LENGTH {
                    player.swing.trail.remove(0);
                }

                for shape in &roster {
                    if player.swing.hit_enemies.contains(&shape.entity) {
                        continue;
                    }
                    if (shape.center.x - tip.x).abs() < TILE_SIZE / 2.0 + shape.radius
                        && (shape.center.y - tip.y).abs() < TILE_SIZE / 2.0 + shape.radius
                    {
                        player.swing.hit_enemies.insert(shape.entity);
                        hits.push(shape.entity);
                    }
                }
            }
        }
    }

    let mut kills = 0;
    for entity in hits {
        if damage_enemy(world, entity, PLAYER_ATTACK_DAMAGE, time, events) {
            kills += 1;
        }
    }
    if kills > 0 {
        if let Ok(mut player) = world.get::<&mut Player>(player_entity) {
            gain_xp(&mut player, kills * ENEMY_XP_REWARD, events);
        }
    }
}

/// Award experience, resolving as many level-ups as the total supports. The
/// threshold grows geometrically and each level-up refills mana.
pub fn gain_xp(player: &mut Player, amount: u32, events: &mut EventQueue) {
    player.xp += amount;
    while player.xp >= player.xp_to_next_level {
        player.xp -= player.xp_to_next_level;
        player.level += 1;
        player.xp_to_next_level = (player.xp_to_next_level as f32 * XP_GROWTH_FACTOR) as u32;
        player.mana = player.max_mana;
        events.push(GameEvent::LevelUp {
            new_level: player.level,
        });
    }
}

/// Respawn the player once the delay elapses: full health and mana, a grace
/// invulnerability window, placed at the respawn anchor (nudged off walls),
/// falling back to the level's entry point.
pub fn update_respawn(
    world: &World,
    map: &TileMap,
    player_entity: Entity,
    level_spawn: Vec2,
    time: f32,
    events: &mut EventQueue,
) {
    let Ok(mut player) = world.get::<&mut Player>(player_entity) else {
        return;
    };
    if player.alive || time - player.death_time < PLAYER_RESPAWN_DELAY {
        return;
    }
    let Ok(mut position) = world.get::<&mut Position>(player_entity) else {
        return;
    };
    let Ok(mut health) = world.get::<&mut Health>(player_entity) else {
        return;
    };
    let radius = world
        .get::<&Body>(player_entity)
        .map(|b| b.radius)
        .unwrap_or(PLAYER_RADIUS);

    let spot = find_respawn_spot(map, player.spawn_anchor, radius).unwrap_or(level_spawn);
    position.0 = spot;
    health.current = health.max;
    player.alive = true;
    player.mana = player.max_mana;
    player.invulnerable_until = time + PLAYER_RESPAWN_INVULN;
    events.push(GameEvent::PlayerRespawned { position: spot });
}

/// Probe the anchor and a square of half-tile offsets around it (out to two
/// tiles) for a spot clear of walls.
fn find_respawn_spot(map: &TileMap, anchor: Vec2, radius: f32) -> Option<Vec2> {
    if !overlaps_wall(map, anchor, radius, Vec2::ZERO) {
        return Some(anchor);
    }
    let step = TILE_SIZE / 2.0;
    for dy in -4i32..=4 {
        for dx in -4i32..=4 {
            let candidate = anchor + Vec2::new(dx as f32 * step, dy as f32 * step);
            if !overlaps_wall(map, candidate, radius, Vec2::ZERO) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Archetype, Enemy, EnemyState};
    use crate::grid::TileMap;
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

    fn spawn_player(world: &mut World, pos: Vec2) -> Entity {
        world.spawn((
            Player::new(pos),
            Position(pos),
            Velocity::default(),
            Knockback::default(),
            Body {
                radius: PLAYER_RADIUS,
            },
            Health::new(PLAYER_START_HP),
        ))
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
    fn test_dash_requires_movement_direction() {
        let mut world = World::new();
        let map = open_map();
        let entity = spawn_player(&mut world, TileMap::tile_center(10, 10));
        let mut events = EventQueue::new();

        let input = PlayerInput {
            dash: true,
            ..PlayerInput::default()
        };
        update_player(&world, &map, entity, &input, 10.0, &mut events);
        assert!(!world.get::<&Player>(entity).unwrap().dash.active);

        let input = PlayerInput {
            dash: true,
            move_dir: Vec2::new(1.0, 0.0),
            ..PlayerInput::default()
        };
        update_player(&world, &map, entity, &input, 10.0 + TICK_DT, &mut events);
        let player = world.get::<&Player>(entity).unwrap();
        assert!(player.dash.active);
        assert_eq!(player.dash.velocity, Vec2::new(DASH_SPEED, 0.0));
    }

    #[test]
    fn test_gain_xp_multi_level_up() {
        let mut player = Player::new(Vec2::ZERO);
        player.mana = 10.0;
        let mut events = EventQueue::new();

        // 250 xp crosses the 100 threshold, then the 150 threshold.
        gain_xp(&mut player, 250, &mut events);
        assert_eq!(player.level, 3);
        assert_eq!(player.xp, 0);
        assert_eq!(player.xp_to_next_level, 225);
        assert_eq!(player.mana, player.max_mana);
    }

    #[test]
    fn test_swing_hits_each_enemy_once() {
        let mut world = World::new();
        let map = open_map();
        let center = TileMap::tile_center(10, 10);
        let player_entity = spawn_player(&mut world, center);
        let enemy_entity = spawn_enemy(&mut world, center + Vec2::new(PLAYER_ATTACK_RANGE, 0.0));
        let mut events = EventQueue::new();

        let mut input = PlayerInput {
            attack: true,
            aim: center + Vec2::new(100.0, 0.0),
            ..PlayerInput::default()
        };
        let mut time = 1.0;
        // One full swing plus a margin.
        for _ in 0..20 {
            update_player(&world, &map, player_entity, &input, time, &mut events);
            input.attack = false;
            time += TICK_DT;
        }

        let hp = world.get::<&Health>(enemy_entity).unwrap().current;
        let max = world.get::<&Enemy>(enemy_entity).unwrap().stats.max_hp;
        assert_eq!(hp, max - PLAYER_ATTACK_DAMAGE);
    }

    #[test]
    fn test_respawn_after_delay_with_grace_window() {
        let mut world = World::new();
        let map = open_map();
        let spawn = TileMap::tile_center(10, 10);
        let entity = spawn_player(&mut world, spawn);
        let mut events = EventQueue::new();

        {
            let mut player = world.get::<&mut Player>(entity).unwrap();
            player.alive = false;
            player.death_time = 5.0;
            let mut health = world.get::<&mut Health>(entity).unwrap();
            health.current = 0.0;
        }

        // Too early.
        update_respawn(&world, &map, entity, spawn, 5.0 + 1.0, &mut events);
        assert!(!world.get::<&Player>(entity).unwrap().alive);

        update_respawn(
            &world,
            &map,
            entity,
            spawn,
            5.0 + PLAYER_RESPAWN_DELAY,
            &mut events,
        );
        let player = world.get::<&Player>(entity).unwrap();
        assert!(player.alive);
        assert!(player.is_invulnerable(5.0 + PLAYER_RESPAWN_DELAY + 1.0));
        assert!(!player.is_invulnerable(5.0 + PLAYER_RESPAWN_DELAY + PLAYER_RESPAWN_INVULN + 0.1));
        assert_eq!(world.get::<&Health>(entity).unwrap().current, PLAYER_START_HP);
    }

    #[test]
    fn test_respawn_anchor_in_wall_probes_nearby() {
        let mut world = World::new();
        let mut map = open_map();
        // Wall off the anchor tile itself.
        map.set_tile(10, 10, Tile::Wall);
        let anchor = TileMap::tile_center(10, 10);
        let entity = spawn_player(&mut world, anchor);
        let mut events = EventQueue::new();
        {
            let mut player = world.get::<&mut Player>(entity).unwrap();
            player.alive = false;
            player.death_time = 0.0;
        }

        update_respawn(&world, &map, entity, anchor, PLAYER_RESPAWN_DELAY, &mut events);
        let pos = world.get::<&Position>(entity).unwrap().0;
        assert!(world.get::<&Player>(entity).unwrap().alive);
        assert!(!overlaps_wall(&map, pos, PLAYER_RADIUS, Vec2::ZERO));
    }

    #[test]
    fn test_mana_regen_caps_at_max() {
        let mut world = World::new();
        let map = open_map();
        let entity = spawn_player(&mut world, TileMap::tile_center(10, 10));
        let mut events = EventQueue::new();
        {
            let mut player = world.get::<&mut Player>(entity).unwrap();
            player.mana = player.max_mana - 0.01;
        }
        update_player(
            &world,
            &map,
            entity,
            &PlayerInput::default(),
            0.0,
            &mut events,
        );
        let player = world.get::<&Player>(entity).unwrap();
        assert_eq!(player.mana, player.max_mana);
    }
}
