//! Magic weapons: cast gating (mana plus per-weapon cooldown) and the four
//! cast effects.

use std::collections::HashSet;

use glam::Vec2;
use hecs::{Entity, World};

use crate::collision::gather_enemy_shapes;
use crate::components::{Health, Player, Position};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};
use crate::systems::combat::damage_enemy;
use crate::systems::player::gain_xp;
use crate::systems::projectile::Projectile;

/// The four castable weapons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    Fireball,
    IceLance,
    LightningBolt,
    Heal,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Fireball,
        WeaponKind::IceLance,
        WeaponKind::LightningBolt,
        WeaponKind::Heal,
    ];

    fn index(self) -> usize {
        match self {
            WeaponKind::Fireball => 0,
            WeaponKind::IceLance => 1,
            WeaponKind::LightningBolt => 2,
            WeaponKind::Heal => 3,
        }
    }

    /// Stat block for this weapon. Lightning and heal have no projectile;
    /// for lightning, `range` is the chain hop distance.
    pub fn spec(self) -> WeaponSpec {
        match self {
            WeaponKind::Fireball => WeaponSpec {
                damage: FIREBALL_DAMAGE,
                mana_cost: FIREBALL_MANA_COST,
                cooldown: FIREBALL_COOLDOWN,
                projectile_speed: FIREBALL_SPEED,
                range: FIREBALL_RANGE,
            },
            WeaponKind::IceLance => WeaponSpec {
                damage: ICE_LANCE_DAMAGE,
                mana_cost: ICE_LANCE_MANA_COST,
                cooldown: ICE_LANCE_COOLDOWN,
                projectile_speed: ICE_LANCE_SPEED,
                range: ICE_LANCE_RANGE,
            },
            WeaponKind::LightningBolt => WeaponSpec {
                damage: LIGHTNING_DAMAGE,
                mana_cost: LIGHTNING_MANA_COST,
                cooldown: LIGHTNING_COOLDOWN,
                projectile_speed: 0.0,
                range: LIGHTNING_CHAIN_RANGE,
            },
            WeaponKind::Heal => WeaponSpec {
                damage: 0.0,
                mana_cost: HEAL_MANA_COST,
                cooldown: HEAL_COOLDOWN,
                projectile_speed: 0.0,
                range: 0.0,
            },
        }
    }
}

/// Per-weapon numeric parameters.
#[derive(Debug, Clone, Copy)]
pub struct WeaponSpec {
    pub damage: f32,
    pub mana_cost: f32,
    pub cooldown: f32,
    pub projectile_speed: f32,
    pub range: f32,
}

/// Per-weapon cooldown stamps, owned by the game driver alongside the
/// projectile lists.
#[derive(Debug, Clone)]
pub struct Loadout {
    last_cast: [f32; 4],
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            last_cast: [f32::NEG_INFINITY; 4],
        }
    }
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(&self, kind: WeaponKind, time: f32) -> bool {
        time - self.last_cast[kind.index()] >= kind.spec().cooldown
    }
}

/// Attempt a cast. The gate is cooldown elapsed AND mana sufficient; on
/// success mana is deducted and the cooldown stamped before the effect
/// resolves, whether or not the effect connects with anything.
pub fn try_cast(
    world: &World,
    player_entity: Entity,
    kind: WeaponKind,
    aim: Vec2,
    loadout: &mut Loadout,
    player_shots: &mut Vec<Projectile>,
    time: f32,
    events: &mut EventQueue,
) -> bool {
    let spec = kind.spec();
    {
        let Ok(mut player) = world.get::<&mut Player>(player_entity) else {
            return false;
        };
        if !player.alive || !loadout.ready(kind, time) || player.mana < spec.mana_cost {
            return false;
        }
        player.mana -= spec.mana_cost;
        loadout.last_cast[kind.index()] = time;
    }

    let origin = world
        .get::<&Position>(player_entity)
        .map(|p| p.0)
        .unwrap_or(Vec2::ZERO);

    match kind {
        WeaponKind::Fireball | WeaponKind::IceLance => {
            let direction = (aim - origin).normalize_or_zero();
            let direction = if direction == Vec2::ZERO {
                Vec2::X
            } else {
                direction
            };
            player_shots.push(Projectile::new(
                origin,
                direction,
                spec.projectile_speed,
                spec.range,
                spec.damage,
                PLAYER_PROJECTILE_RADIUS,
            ));
        }
        WeaponKind::LightningBolt => cast_lightning(world, player_entity, origin, &spec, time, events),
        WeaponKind::Heal => {
            if let Ok(mut health) = world.get::<&mut Health>(player_entity) {
                health.heal(HEAL_AMOUNT);
            }
            events.push(GameEvent::HealBurst { position: origin });
        }
    }
    true
}

/// Lightning chains from the nearest living enemy through up to two more
/// hops, each to the nearest unstruck enemy within hop range. Damage
/// compounds by the falloff factor per target struck, the first included.
fn cast_lightning(
    world: &World,
    player_entity: Entity,
    origin: Vec2,
    spec: &WeaponSpec,
    time: f32,
    events: &mut EventQueue,
) {
    let roster = gather_enemy_shapes(world);
    let mut current = roster
        .iter()
        .min_by(|a, b| {
            a.center
                .distance(origin)
                .total_cmp(&b.center.distance(origin))
        })
        .map(|s| (s.entity, s.center));

    let mut points = vec![origin];
    let mut struck: HashSet<Entity> = HashSet::new();
    let mut kills = 0;

    for _ in 0..LIGHTNING_CHAIN_COUNT {
        let Some((entity, center)) = current else {
            break;
        };
        points.push(center);
        struck.insert(entity);
        let damage = spec.damage * LIGHTNING_DAMAGE_FALLOFF.powi(struck.len() as i32);
        if damage_enemy(world, entity, damage, time, events) {
            kills += 1;
        }
        current = roster
            .iter()
            .filter(|s| !struck.contains(&s.entity))
            .map(|s| (s, s.center.distance(center)))
            .filter(|(_, dist)| *dist < spec.range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| (s.entity, s.center));
    }

    if points.len() > 1 {
        events.push(GameEvent::LightningArc { points });
    }
    if kills > 0 {
        if let Ok(mut player) = world.get::<&mut Player>(player_entity) {
            gain_xp(&mut player, kills * ENEMY_XP_REWARD, events);
        }
    }
}
