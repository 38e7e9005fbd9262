//! Enemy behavior: the state machine, per-state steering, flocking, and
//! attack resolution.
//!
//! The pass snapshots every living enemy up front, then mutates one enemy
//! at a time against that snapshot. Snapshot entries are refreshed as each
//! enemy moves so later enemies see current positions.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use crate::collision::{decay_knockback, resolve_move, ActorShape};
use crate::components::{
    Archetype, Body, Enemy, EnemyState, Health, Knockback, Player, Position, Velocity,
};
use crate::constants::*;
use crate::events::EventQueue;
use crate::grid::TileMap;
use crate::systems::combat::{apply_knockback, damage_player};
use crate::systems::projectile::Projectile;

/// Read-only view of one living enemy, captured before the mutation pass.
#[derive(Debug, Clone, Copy)]
struct EnemyView {
    entity: Entity,
    position: Vec2,
    velocity: Vec2,
    state: EnemyState,
    hp_fraction: f32,
    radius: f32,
}

struct MeleeStrike {
    damage: f32,
    direction: Vec2,
}

/// Advance every living enemy by one tick and resolve their attacks
/// against the player.
pub fn update_enemies(
    world: &World,
    map: &TileMap,
    player_entity: Entity,
    enemy_shots: &mut Vec<Projectile>,
    time: f32,
    events: &mut EventQueue,
    rng: &mut impl Rng,
) {
    let player_alive = world
        .get::<&Player>(player_entity)
        .map(|p| p.alive)
        .unwrap_or(false);
    let player_pos = world
        .get::<&Position>(player_entity)
        .map(|p| p.0)
        .unwrap_or(Vec2::ZERO);

    let mut views: Vec<EnemyView> = world
        .query::<(&Enemy, &Position, &Velocity, &Body, &Health)>()
        .iter()
        .filter(|(_, (enemy, ..))| enemy.alive)
        .map(|(entity, (enemy, pos, vel, body, health))| EnemyView {
            entity,
            position: pos.0,
            velocity: vel.0,
            state: enemy.state,
            hp_fraction: health.fraction(),
            radius: body.radius,
        })
        .collect();

    let mut strikes: Vec<MeleeStrike> = Vec::new();

    for index in 0..views.len() {
        let entity = views[index].entity;
        let Ok(mut enemy) = world.get::<&mut Enemy>(entity) else {
            continue;
        };
        let Ok(mut position) = world.get::<&mut Position>(entity) else {
            continue;
        };
        let Ok(mut velocity) = world.get::<&mut Velocity>(entity) else {
            continue;
        };
        let Ok(mut knockback) = world.get::<&mut Knockback>(entity) else {
            continue;
        };

        let radius = views[index].radius;
        let hp_fraction = views[index].hp_fraction;
        let dist_to_player = position.0.distance(player_pos);

        // Stun freezes steering until expiry, then drops into chase.
        if enemy.state == EnemyState::Stunned {
            if time >= enemy.stun_until {
                enemy.state = EnemyState::Chase;
            } else {
                velocity.0 = Vec2::ZERO;
                let desired = knockback.0;
                decay_knockback(&mut knockback.0);
                let others = shapes_excluding(&views, index);
                let step = resolve_move(map, position.0, radius, desired, &others);
                position.0 += step;
                views[index].position = position.0;
                views[index].state = enemy.state;
                continue;
            }
        }

        // Transitions are throttled, which both bounds the cost and gives
        // enemies a small reaction delay.
        if time - enemy.last_state_update >= AI_STATE_INTERVAL {
            enemy.last_state_update = time;
            let next = next_state(&enemy, hp_fraction, dist_to_player, player_alive);
            if next != enemy.state {
                enemy.state = next;
                enemy.cached_direction = None;
            }
        }

        let speed = enemy.stats.speed;
        let steer = match enemy.state {
            EnemyState::Idle | EnemyState::Stunned => Vec2::ZERO,
            EnemyState::Wander => wander_steering(&mut enemy, map, position.0, time, rng),
            EnemyState::Patrol => patrol_steering(&mut enemy, map, position.0, rng),
            EnemyState::Chase => {
                chase_steering(&mut enemy, map, position.0, player_pos, dist_to_player, time)
            }
            EnemyState::Attack => {
                (player_pos - position.0).normalize_or_zero() * speed * ENEMY_ATTACK_DRIFT_FACTOR
            }
            EnemyState::Flee => {
                flee_steering(index, &views, position.0, player_pos, enemy.stats.attack_range)
                    * speed
            }
        };

        velocity.0 = flock_adjust(index, steer, &views, enemy.state, player_pos, rng);

        let desired = velocity.0 + knockback.0;
        decay_knockback(&mut knockback.0);
        let others = shapes_excluding(&views, index);
        let step = resolve_move(map, position.0, radius, desired, &others);
        position.0 += step;

        views[index].position = position.0;
        views[index].velocity = velocity.0;
        views[index].state = enemy.state;

        // Attacks resolve after movement, against the post-move distance.
        if enemy.state == EnemyState::Attack
            && player_alive
            && time - enemy.last_attack_time >= ENEMY_ATTACK_COOLDOWN
        {
            let dist = position.0.distance(player_pos);
            if dist <= enemy.stats.attack_range {
                enemy.last_attack_time = time;
                let direction = (player_pos - position.0).normalize_or_zero();
                match enemy.archetype {
                    Archetype::Ranged => enemy_shots.push(Projectile::new(
                        position.0,
                        direction,
                        ENEMY_PROJECTILE_SPEED,
                        ENEMY_PROJECTILE_RANGE,
                        enemy.stats.attack_damage,
                        ENEMY_PROJECTILE_RADIUS,
                    )),
                    Archetype::Melee | Archetype::Tank => strikes.push(MeleeStrike {
                        damage: enemy.stats.attack_damage,
                        direction,
                    }),
                }
            }
        }
    }

    // Melee strikes land once all enemies have moved. Knockback only
    // applies when the hit actually connects.
    for strike in strikes {
        if damage_player(world, player_entity, strike.damage, time, events) {
            apply_knockback(world, player_entity, strike.direction, ENEMY_KNOCKBACK_FORCE);
        }
    }
}

/// Pure state transition. Flee is sticky until health recovers well above
/// the entry threshold; attack holds with hysteresis so enemies do not
/// flicker at the range boundary.
fn next_state(enemy: &Enemy, hp_fraction: f32, dist: f32, player_alive: bool) -> EnemyState {
    if enemy.state == EnemyState::Flee {
        if hp_fraction < ENEMY_FLEE_HP_THRESHOLD * ENEMY_FLEE_RECOVER_FACTOR {
            return EnemyState::Flee;
        }
    } else if hp_fraction <= ENEMY_FLEE_HP_THRESHOLD {
        return EnemyState::Flee;
    }
    if !player_alive {
        return enemy.home_state;
    }
    if enemy.state == EnemyState::Attack
        && dist <= enemy.stats.attack_range * ENEMY_ATTACK_BREAK_FACTOR
    {
        return EnemyState::Attack;
    }
    if dist <= enemy.stats.attack_range {
        return EnemyState::Attack;
    }
    if dist <= ENEMY_AGGRO_RANGE {
        return EnemyState::Chase;
    }
    enemy.home_state
}

/// Wander drifts toward a random point near the spawn, pausing between
/// picks.
fn wander_steering(
    enemy: &mut Enemy,
    map: &TileMap,
    position: Vec2,
    time: f32,
    rng: &mut impl Rng,
) -> Vec2 {
    let speed = enemy.stats.speed * ENEMY_WANDER_SPEED_FACTOR;
    match enemy.wander_target {
        Some(target) if position.distance(target) > speed => {
            (target - position).normalize_or_zero() * speed
        }
        Some(_) => {
            enemy.wander_target = None;
            enemy.wander_pause_until = time + ENEMY_WANDER_PAUSE;
            Vec2::ZERO
        }
        None => {
            if time >= enemy.wander_pause_until {
                enemy.wander_target = Some(pick_wander_target(map, enemy.spawn_pos, position, rng));
            }
            Vec2::ZERO
        }
    }
}

fn pick_wander_target(map: &TileMap, spawn: Vec2, current: Vec2, rng: &mut impl Rng) -> Vec2 {
    for _ in 0..ENEMY_WANDER_ATTEMPTS {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let dist = rng.gen_range(0.0..ENEMY_WANDER_RADIUS);
        let candidate = spawn + Vec2::from_angle(angle) * dist;
        if !map.is_wall_at(candidate.x, candidate.y) {
            return candidate;
        }
    }
    current
}

/// Patrol walks a fixed loop of points around the spawn, generated on
/// first use.
fn patrol_steering(enemy: &mut Enemy, map: &TileMap, position: Vec2, rng: &mut impl Rng) -> Vec2 {
    if enemy.patrol_points.is_empty() {
        enemy.patrol_points = generate_patrol_route(map, enemy.spawn_pos, rng);
    }
    let count = enemy.patrol_points.len();
    if position.distance(enemy.patrol_points[enemy.patrol_index % count]) < TILE_SIZE {
        enemy.patrol_index = (enemy.patrol_index + 1) % count;
    }
    let target = enemy.patrol_points[enemy.patrol_index % count];
    (target - position).normalize_or_zero() * enemy.stats.speed * ENEMY_PATROL_SPEED_FACTOR
}

fn generate_patrol_route(map: &TileMap, spawn: Vec2, rng: &mut impl Rng) -> Vec<Vec2> {
    (0..PATROL_POINT_COUNT)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let dist =
                rng.gen_range(PATROL_DISTANCE_TILES.0..=PATROL_DISTANCE_TILES.1) * TILE_SIZE;
            let candidate = spawn + Vec2::from_angle(angle) * dist;
            if map.is_wall_at(candidate.x, candidate.y) {
                spawn
            } else {
                candidate
            }
        })
        .collect()
}

/// Chase moves along the cached approach direction, backing off when
/// already inside the strike radius.
fn chase_steering(
    enemy: &mut Enemy,
    map: &TileMap,
    position: Vec2,
    player_pos: Vec2,
    dist: f32,
    time: f32,
) -> Vec2 {
    if dist < enemy.stats.attack_range * ENEMY_BACKOFF_FACTOR {
        return (position - player_pos).normalize_or_zero() * enemy.stats.speed;
    }
    chase_direction(enemy, map, position, player_pos, time) * enemy.stats.speed
}

/// The approach direction is cached briefly. When the straight line is
/// blocked, a handful of angular deviations are probed and the cheapest
/// clear one wins; cost is the remaining distance to the player plus a
/// penalty per degree of deviation.
fn chase_direction(
    enemy: &mut Enemy,
    map: &TileMap,
    position: Vec2,
    player_pos: Vec2,
    time: f32,
) -> Vec2 {
    if let Some(cached) = enemy.cached_direction {
        if time - enemy.direction_cache_time < AI_DIRECTION_CACHE_DURATION {
            return cached;
        }
    }

    let straight = (player_pos - position).normalize_or_zero();
    let dist = position.distance(player_pos);
    let mut chosen = straight;
    if !path_clear(map, position, straight, dist) {
        let mut best_cost = f32::INFINITY;
        for &angle_deg in AI_DEVIATION_ANGLES.iter() {
            let direction = Vec2::from_angle(angle_deg.to_radians()).rotate(straight);
            if !path_clear(map, position, direction, dist) {
                continue;
            }
            let probe = position + direction * TILE_SIZE * AI_PATH_LOOKAHEAD_STEPS as f32;
            let cost = probe.distance(player_pos) + angle_deg.abs() * AI_DEVIATION_PENALTY;
            if cost < best_cost {
                best_cost = cost;
                chosen = direction;
            }
        }
    }

    enemy.cached_direction = Some(chosen);
    enemy.direction_cache_time = time;
    chosen
}

fn path_clear(map: &TileMap, from: Vec2, direction: Vec2, max_dist: f32) -> bool {
    for step in 1..=AI_PATH_LOOKAHEAD_STEPS {
        let along = step as f32 * TILE_SIZE;
        if along > max_dist {
            break;
        }
        let probe = from + direction * along;
        if map.is_wall_at(probe.x, probe.y) {
            return false;
        }
    }
    true
}

/// Flee runs away from the player, pushed apart from nearby allies so a
/// routed group fans out. Returns a unit direction.
fn flee_steering(
    index: usize,
    views: &[EnemyView],
    position: Vec2,
    player_pos: Vec2,
    attack_range: f32,
) -> Vec2 {
    let mut away = (position - player_pos).normalize_or_zero();
    let repulsion_sq = attack_range * attack_range * 4.0;
    for (i, other) in views.iter().enumerate() {
        if i == index {
            continue;
        }
        let offset = position - other.position;
        if offset.length_squared() < repulsion_sq {
            away += offset.normalize_or_zero();
        }
    }
    away.normalize_or_zero()
}

/// Blend flocking forces into the base steering and renormalize to its
/// speed. The group member with the highest score (health fraction, plus a
/// bonus for chasing) leads; its velocity weighs double in alignment.
/// Attackers get a tangential offset so they circle rather than stack on
/// the player.
fn flock_adjust(
    index: usize,
    base: Vec2,
    views: &[EnemyView],
    state: EnemyState,
    player_pos: Vec2,
    rng: &mut impl Rng,
) -> Vec2 {
    let speed = base.length();
    if speed == 0.0 {
        return base;
    }
    let me = &views[index];
    let min_sep = MIN_ENEMY_SEPARATION * TILE_SIZE;
    let neighbor_range = min_sep * FLOCK_NEIGHBOR_RANGE_FACTOR;

    let mut leader = index;
    let mut leader_score = flock_score(me);
    let mut neighbors = Vec::new();
    for (i, other) in views.iter().enumerate() {
        if i == index || me.position.distance(other.position) > neighbor_range {
            continue;
        }
        neighbors.push(i);
        let score = flock_score(other);
        if score > leader_score {
            leader_score = score;
            leader = i;
        }
    }
    if neighbors.is_empty() {
        return base;
    }

    let mut separation = Vec2::ZERO;
    let mut avg_velocity = Vec2::ZERO;
    let mut centroid = Vec2::ZERO;
    let mut weight_total = 0.0;
    let mut fellow_attacker = false;
    for &i in &neighbors {
        let other = &views[i];
        let offset = me.position - other.position;
        let dist = offset.length();
        if dist < min_sep && dist > 0.0 {
            // Away from each too-close neighbor, weighted by inverse distance.
            separation += offset / (dist * dist);
        }
        let weight = if i == leader { FLOCK_LEADER_WEIGHT } else { 1.0 };
        avg_velocity += other.velocity * weight;
        weight_total += weight;
        centroid += other.position;
        fellow_attacker |= other.state == EnemyState::Attack;
    }
    let separation = separation.normalize_or_zero();
    let alignment = (avg_velocity / weight_total).normalize_or_zero();
    let cohesion = (centroid / neighbors.len() as f32 - me.position).normalize_or_zero();

    let mut force = separation * FLOCK_SEPARATION_WEIGHT
        + alignment * FLOCK_ALIGNMENT_WEIGHT
        + cohesion * FLOCK_COHESION_WEIGHT;
    // Gang-up circling: when more than one enemy presses the attack, offset
    // tangentially so the group surrounds rather than stacks.
    if state == EnemyState::Attack && fellow_attacker {
        let to_player = (player_pos - me.position).normalize_or_zero();
        force += to_player.perp() * FLOCK_CIRCLING_WEIGHT;
    }
    force += Vec2::new(
        rng.gen_range(-FLOCK_JITTER..=FLOCK_JITTER),
        rng.gen_range(-FLOCK_JITTER..=FLOCK_JITTER),
    );

    (base.normalize_or_zero() + force * FLOCK_BLEND).normalize_or_zero() * speed
}

fn flock_score(view: &EnemyView) -> f32 {
    view.hp_fraction
        + if view.state == EnemyState::Chase {
            1.0
        } else {
            0.0
        }
}

fn shapes_excluding(views: &[EnemyView], index: usize) -> Vec<ActorShape> {
    views
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, v)| ActorShape {
            entity: v.entity,
            center: v.position,
            radius: v.radius,
        })
        .collect()
}
