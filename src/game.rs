//! Top-level simulation driver: owns the world, the current level, the
//! projectile lists, and the RNG, and runs one fixed tick per update call.

use glam::Vec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::components::{Body, Enemy, EnemyState, Health, Knockback, Player, Position, Velocity};
use crate::constants::*;
use crate::events::{EventQueue, GameEvent};
use crate::grid::TileMap;
use crate::level::Level;
use crate::level_gen::{EnemySpawn, LevelGenerator};
use crate::systems::player::{gain_xp, PlayerInput};
use crate::systems::projectile::Projectile;
use crate::systems::weapons::Loadout;
use crate::systems::{ai, combat, player, projectile, weapons};

/// The whole simulation. All randomness flows from the seed, so two games
/// with the same seed and the same inputs stay identical tick for tick.
pub struct Game {
    pub world: World,
    pub level: Level,
    pub player: Entity,
    pub loadout: Loadout,
    pub player_shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    pub events: EventQueue,
    rng: StdRng,
    pub tick: u64,
    pub time: f32,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = World::new();

        let generated = LevelGenerator::generate(LEVEL_WIDTH, LEVEL_HEIGHT, 1, &mut rng);
        let (level, spawns) = Level::from_generated(generated, 1);
        spawn_enemies(&mut world, &spawns, &mut rng);

        let spawn = level.spawn_point;
        let player = world.spawn((
            Player::new(spawn),
            Position(spawn),
            Velocity::default(),
            Knockback::default(),
            Body {
                radius: PLAYER_RADIUS,
            },
            Health::new(PLAYER_START_HP),
        ));
        info!(seed, "new game started");

        Self {
            world,
            level,
            player,
            loadout: Loadout::new(),
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            events: EventQueue::new(),
            rng,
            tick: 0,
            time: 0.0,
        }
    }

    /// Advance the simulation by one fixed tick.
    pub fn update(&mut self, input: &PlayerInput) {
        self.tick += 1;
        self.time = self.tick as f32 * TICK_DT;
        let time = self.time;

        player::update_player(
            &self.world,
            &self.level.map,
            self.player,
            input,
            time,
            &mut self.events,
        );
        if let Some(kind) = input.cast {
            weapons::try_cast(
                &self.world,
                self.player,
                kind,
                input.aim,
                &mut self.loadout,
                &mut self.player_shots,
                time,
                &mut self.events,
            );
        }

        ai::update_enemies(
            &self.world,
            &self.level.map,
            self.player,
            &mut self.enemy_shots,
            time,
            &mut self.events,
            &mut self.rng,
        );

        let kills = projectile::update_player_shots(
            &self.world,
            &self.level.map,
            &mut self.player_shots,
            time,
            &mut self.events,
        );
        if kills > 0 {
            if let Ok(mut p) = self.world.get::<&mut Player>(self.player) {
                gain_xp(&mut p, kills * ENEMY_XP_REWARD, &mut self.events);
            }
        }
        projectile::update_enemy_shots(
            &self.world,
            &self.level.map,
            &mut self.enemy_shots,
            self.player,
            time,
            &mut self.events,
        );

        combat::sweep_dead(&mut self.world);

        player::update_respawn(
            &self.world,
            &self.level.map,
            self.player,
            self.level.spawn_point,
            time,
            &mut self.events,
        );

        let alive = self.is_player_alive();
        if alive {
            let pos = self.player_position();
            if let Some((anchor, first)) = self.level.checkpoint_contact(pos) {
                if let Ok(mut p) = self.world.get::<&mut Player>(self.player) {
                    p.spawn_anchor = anchor;
                }
                if first {
                    self.events.push(GameEvent::CheckpointActivated { position: anchor });
                }
            }
            if self.level.portal_reached(pos) {
                self.advance_level();
            }
        }
        self.level.update_portal();
    }

    /// Tear down the current floor and build the next one. The player keeps
    /// level, experience, health, and mana; only position and the respawn
    /// anchor reset.
    fn advance_level(&mut self) {
        let next = self.level.number + 1;

        let roster: Vec<Entity> = self.world.query::<&Enemy>().iter().map(|(e, _)| e).collect();
        for entity in roster {
            let _ = self.world.despawn(entity);
        }
        self.player_shots.clear();
        self.enemy_shots.clear();

        let generated = LevelGenerator::generate(LEVEL_WIDTH, LEVEL_HEIGHT, next, &mut self.rng);
        let (level, spawns) = Level::from_generated(generated, next);
        spawn_enemies(&mut self.world, &spawns, &mut self.rng);

        let spawn = level.spawn_point;
        self.level = level;
        if let Ok(mut position) = self.world.get::<&mut Position>(self.player) {
            position.0 = spawn;
        }
        if let Ok(mut velocity) = self.world.get::<&mut Velocity>(self.player) {
            velocity.0 = Vec2::ZERO;
        }
        if let Ok(mut knockback) = self.world.get::<&mut Knockback>(self.player) {
            knockback.0 = Vec2::ZERO;
        }
        if let Ok(mut p) = self.world.get::<&mut Player>(self.player) {
            p.spawn_anchor = spawn;
        }
        self.events.push(GameEvent::PortalEntered { next_level: next });
        info!(level = next, "portal taken");
    }

    pub fn player_position(&self) -> Vec2 {
        self.world
            .get::<&Position>(self.player)
            .map(|p| p.0)
            .unwrap_or(Vec2::ZERO)
    }

    pub fn is_player_alive(&self) -> bool {
        self.world
            .get::<&Player>(self.player)
            .map(|p| p.alive)
            .unwrap_or(false)
    }

    pub fn living_enemy_count(&self) -> usize {
        self.world
            .query::<&Enemy>()
            .iter()
            .filter(|(_, e)| e.alive)
            .count()
    }

    /// Drain the events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain().collect()
    }
}

/// Populate the world from generation's spawn slots. Each enemy draws a
/// low-alert home behavior: most wander, some stand watch, some patrol.
fn spawn_enemies(world: &mut World, spawns: &[EnemySpawn], rng: &mut StdRng) {
    for spawn in spawns {
        let pos = TileMap::tile_center(spawn.tile.0, spawn.tile.1);
        let home = match rng.gen_range(0..10) {
            0..=5 => EnemyState::Wander,
            6..=7 => EnemyState::Idle,
            _ => EnemyState::Patrol,
        };
        let enemy = Enemy::new(spawn.archetype, pos, home);
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
        ));
    }
}
