//! Damage application, knockback, stuns, and the end-of-tick dead sweep.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Enemy, EnemyState, Health, Knockback, Player, SwingState, Velocity};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};

/// Apply damage to an enemy. Returns true iff this call killed it, so the
/// caller can award experience exactly once per kill. Dead enemies stop
/// being observed as alive immediately; the entity itself is despawned by
/// [`sweep_dead`] at the end of the tick.
pub fn damage_enemy(
    world: &World,
    entity: Entity,
    amount: f32,
    time: f32,
    events: &mut EventQueue,
) -> bool {
    let Ok(mut enemy) = world.get::<&mut Enemy>(entity) else {
        return false;
    };
    if !enemy.alive {
        return false;
    }
    let Ok(mut health) = world.get::<&mut Health>(entity) else {
        return false;
    };

    health.current = (health.current - amount).max(0.0);
    enemy.hit_flash_until = time + ENEMY_HIT_FLASH_DURATION;
    events.push(GameEvent::EnemyHit {
        enemy: entity,
        damage: amount,
    });

    if health.current <= 0.0 {
        enemy.alive = false;
        let position = world
            .get::<&crate::components::Position>(entity)
            .map(|p| p.0)
            .unwrap_or(Vec2::ZERO);
        events.push(GameEvent::EnemyDied {
            enemy: entity,
            position,
        });
        return true;
    }
    false
}

/// Apply damage to the player. No-op while invulnerable or dead; otherwise
/// damages, opens the invulnerability window, and handles death. Returns
/// whether damage was applied (attackers use this to gate knockback).
pub fn damage_player(
    world: &World,
    player_entity: Entity,
    amount: f32,
    time: f32,
    events: &mut EventQueue,
) -> bool {
    let Ok(mut player) = world.get::<&mut Player>(player_entity) else {
        return false;
    };
    if !player.alive || player.is_invulnerable(time) {
        return false;
    }
    let Ok(mut health) = world.get::<&mut Health>(player_entity) else {
        return false;
    };

    health.current = (health.current - amount).max(0.0);
    player.invulnerable_until = time + PLAYER_INVULN_DURATION;
    events.push(GameEvent::PlayerHit { damage: amount });

    if health.current <= 0.0 {
        player.alive = false;
        player.death_time = time;
        // Death zeroes all transient motion and attack state.
        player.dash.active = false;
        player.dash.velocity = Vec2::ZERO;
        player.swing = SwingState::default();
        if let Ok(mut velocity) = world.get::<&mut Velocity>(player_entity) {
            velocity.0 = Vec2::ZERO;
        }
        if let Ok(mut knockback) = world.get::<&mut Knockback>(player_entity) {
            knockback.0 = Vec2::ZERO;
        }
        let position = world
            .get::<&crate::components::Position>(player_entity)
            .map(|p| p.0)
            .unwrap_or(Vec2::ZERO);
        events.push(GameEvent::PlayerDied { position });
    }
    true
}

/// Replace an actor's knockback impulse. The impulse decays geometrically
/// each tick during movement resolution.
pub fn apply_knockback(world: &World, entity: Entity, direction: Vec2, force: f32) {
    if let Ok(mut knockback) = world.get::<&mut Knockback>(entity) {
        knockback.0 = direction.normalize_or_zero() * force;
    }
}

/// Stun an enemy until `time + duration`. It holds zero velocity and then
/// reverts to chase.
pub fn apply_stun(world: &World, entity: Entity, duration: f32, time: f32) {
    if let Ok(mut enemy) = world.get::<&mut Enemy>(entity) {
        enemy.state = EnemyState::Stunned;
        enemy.stun_until = time + duration;
    }
}

/// Despawn enemies that died during this tick.
pub fn sweep_dead(world: &mut World) {
    let dead: Vec<Entity> = world
        .query::<&Enemy>()
        .iter()
        .filter(|(_, enemy)| !enemy.alive)
        .map(|(entity, _)| entity)
        .collect();
    for entity in dead {
        let _ = world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Archetype, Body, Position};

    fn spawn_enemy(world: &mut World) -> Entity {
        let enemy = Enemy::new(Archetype::Melee, Vec2::ZERO, EnemyState::Wander);
        let hp = enemy.stats.max_hp;
        world.spawn((
            enemy,
            Position(Vec2::ZERO),
            Velocity::default(),
            Knockback::default(),
            Body {
                radius: ENEMY_RADIUS,
            },
            Health::new(hp),
        ))
    }

    fn spawn_player(world: &mut World) -> Entity {
        world.spawn((
            Player::new(Vec2::ZERO),
            Position(Vec2::ZERO),
            Velocity::default(),
            Knockback::default(),
            Body {
                radius: PLAYER_RADIUS,
            },
            Health::new(PLAYER_START_HP),
        ))
    }

    #[test]
    fn test_damage_enemy_kill_reported_once() {
        let mut world = World::new();
        let entity = spawn_enemy(&mut world);
        let mut events = EventQueue::new();

        assert!(!damage_enemy(&world, entity, 50.0, 0.0, &mut events));
        assert!(damage_enemy(&world, entity, 50.0, 0.0, &mut events));
        // Already dead: further damage neither applies nor re-reports.
        assert!(!damage_enemy(&world, entity, 50.0, 0.0, &mut events));
    }

    #[test]
    fn test_enemy_health_never_negative() {
        let mut world = World::new();
        let entity = spawn_enemy(&mut world);
        let mut events = EventQueue::new();
        damage_enemy(&world, entity, 10_000.0, 0.0, &mut events);
        let health = world.get::<&Health>(entity).unwrap();
        assert_eq!(health.current, 0.0);
    }

    #[test]
    fn test_damage_player_noop_while_invulnerable() {
        let mut world = World::new();
        let entity = spawn_player(&mut world);
        let mut events = EventQueue::new();

        assert!(damage_player(&world, entity, 10.0, 0.0, &mut events));
        // Within the invulnerability window, nothing happens.
        assert!(!damage_player(&world, entity, 10.0, 0.1, &mut events));
        let hp = world.get::<&Health>(entity).unwrap().current;
        assert_eq!(hp, PLAYER_START_HP - 10.0);
        // After the window it applies again.
        assert!(damage_player(
            &world,
            entity,
            10.0,
            PLAYER_INVULN_DURATION + 0.01,
            &mut events
        ));
    }

    #[test]
    fn test_player_death_zeroes_transient_state() {
        let mut world = World::new();
        let entity = spawn_player(&mut world);
        let mut events = EventQueue::new();
        {
            let mut knockback = world.get::<&mut Knockback>(entity).unwrap();
            knockback.0 = Vec2::new(5.0, 5.0);
        }
        damage_player(&world, entity, PLAYER_START_HP, 0.0, &mut events);

        let player = world.get::<&Player>(entity).unwrap();
        assert!(!player.alive);
        assert!(!player.dash.active);
        assert!(!player.swing.active);
        let knockback = world.get::<&Knockback>(entity).unwrap();
        assert_eq!(knockback.0, Vec2::ZERO);
    }

    #[test]
    fn test_apply_stun_sets_state_and_expiry() {
        let mut world = World::new();
        let entity = spawn_enemy(&mut world);
        apply_stun(&world, entity, 1.5, 10.0);
        let enemy = world.get::<&Enemy>(entity).unwrap();
        assert_eq!(enemy.state, EnemyState::Stunned);
        assert_eq!(enemy.stun_until, 11.5);
    }

    #[test]
    fn test_sweep_dead_despawns_only_dead() {
        let mut world = World::new();
        let dead = spawn_enemy(&mut world);
        let alive = spawn_enemy(&mut world);
        let mut events = EventQueue::new();
        damage_enemy(&world, dead, 10_000.0, 0.0, &mut events);

        sweep_dead(&mut world);
        assert!(world.get::<&Enemy>(dead).is_err());
        assert!(world.get::<&Enemy>(alive).is_ok());
    }
}
