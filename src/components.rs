//! Components shared by the player and enemies, plus the per-kind state
//! each of them carries. Plain data; behavior lives in the systems modules.

use std::collections::HashSet;

use glam::Vec2;
use hecs::Entity;

use crate::constants::*;

/// World position in continuous pixel space.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// Velocity applied this tick (px per tick).
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec2);

/// Decaying displacement impulse layered onto movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Knockback(pub Vec2);

/// Circular collision body.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub radius: f32,
}

/// Health pool shared by the player and enemies.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Health fraction in [0, 1].
    pub fn fraction(&self) -> f32 {
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Enemy archetype. One enemy type parameterized by a stat descriptor and an
/// attack variant, rather than a subclass per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    Melee,
    Ranged,
    Tank,
}

/// Archetype-derived stats, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub max_hp: f32,
    pub speed: f32,
    pub attack_range: f32,
    pub attack_damage: f32,
}

impl Archetype {
    /// Scale the base stat set by this archetype's fixed multipliers.
    pub fn stats(&self) -> EnemyStats {
        match self {
            Archetype::Melee => EnemyStats {
                max_hp: ENEMY_HP,
                speed: ENEMY_SPEED,
                attack_range: ENEMY_ATTACK_RANGE,
                attack_damage: ENEMY_ATTACK_DAMAGE,
            },
            Archetype::Ranged => EnemyStats {
                max_hp: ENEMY_HP * 0.8,
                speed: ENEMY_SPEED * 0.8,
                attack_range: ENEMY_ATTACK_RANGE * 2.0,
                attack_damage: ENEMY_ATTACK_DAMAGE * 0.7,
            },
            Archetype::Tank => EnemyStats {
                max_hp: ENEMY_HP * 2.0,
                speed: ENEMY_SPEED * 0.6,
                attack_range: ENEMY_ATTACK_RANGE * 0.8,
                attack_damage: ENEMY_ATTACK_DAMAGE * 1.5,
            },
        }
    }
}

/// AI state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Wander,
    Idle,
    Patrol,
    Chase,
    Attack,
    Flee,
    Stunned,
}

/// Per-enemy AI and combat state.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub archetype: Archetype,
    pub stats: EnemyStats,
    pub state: EnemyState,
    /// Low-alert state this enemy returns to when the player is out of
    /// aggro range (Wander, Idle, or Patrol).
    pub home_state: EnemyState,
    pub alive: bool,
    pub spawn_pos: Vec2,
    pub wander_target: Option<Vec2>,
    pub wander_pause_until: f32,
    pub last_state_update: f32,
    pub cached_direction: Option<Vec2>,
    pub direction_cache_time: f32,
    pub last_attack_time: f32,
    pub stun_until: f32,
    pub patrol_points: Vec<Vec2>,
    pub patrol_index: usize,
    pub hit_flash_until: f32,
}

impl Enemy {
    pub fn new(archetype: Archetype, spawn_pos: Vec2, home_state: EnemyState) -> Self {
        Self {
            archetype,
            stats: archetype.stats(),
            state: home_state,
            home_state,
            alive: true,
            spawn_pos,
            wander_target: None,
            wander_pause_until: 0.0,
            last_state_update: f32::NEG_INFINITY,
            cached_direction: None,
            direction_cache_time: f32::NEG_INFINITY,
            last_attack_time: f32::NEG_INFINITY,
            stun_until: 0.0,
            patrol_points: Vec::new(),
            patrol_index: 0,
            hit_flash_until: f32::NEG_INFINITY,
        }
    }

    /// Whether the hit flash window is open (for rendering).
    pub fn is_hit_flashing(&self, time: f32) -> bool {
        time < self.hit_flash_until
    }
}

/// Dash state: a committed fixed-speed, fixed-duration movement override.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashState {
    pub active: bool,
    pub velocity: Vec2,
    pub started_at: f32,
    pub last_dash_time: f32,
}

/// Melee swing animation state. Hits are recorded per swing so each enemy
/// takes damage at most once per animation.
#[derive(Debug, Clone, Default)]
pub struct SwingState {
    pub active: bool,
    pub started_at: f32,
    pub start_angle_deg: f32,
    pub trail: Vec<Vec2>,
    pub hit_enemies: HashSet<Entity>,
}

/// Player progression, mana, and transient combat state.
#[derive(Debug, Clone)]
pub struct Player {
    pub alive: bool,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub mana: f32,
    pub max_mana: f32,
    pub invulnerable_until: f32,
    pub death_time: f32,
    /// Respawn anchor: last activated checkpoint, or the initial spawn.
    pub spawn_anchor: Vec2,
    pub dash: DashState,
    pub swing: SwingState,
    pub last_attack_time: f32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            alive: true,
            level: PLAYER_START_LEVEL,
            xp: 0,
            xp_to_next_level: XP_TO_LEVEL,
            mana: PLAYER_MAX_MANA,
            max_mana: PLAYER_MAX_MANA,
            invulnerable_until: f32::NEG_INFINITY,
            death_time: f32::NEG_INFINITY,
            spawn_anchor: spawn,
            dash: DashState {
                last_dash_time: f32::NEG_INFINITY,
                ..DashState::default()
            },
            swing: SwingState::default(),
            last_attack_time: f32::NEG_INFINITY,
        }
    }

    pub fn is_invulnerable(&self, time: f32) -> bool {
        time < self.invulnerable_until
    }

    /// Mana regenerated per second, scaling with level.
    pub fn mana_regen_rate(&self) -> f32 {
        MANA_REGEN_BASE + MANA_REGEN_PER_LEVEL * (self.level - 1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_heal_caps_at_max() {
        let mut health = Health::new(100.0);
        health.current = 80.0;
        health.heal(60.0);
        assert_eq!(health.current, 100.0);
    }

    #[test]
    fn test_health_fraction_clamped() {
        let mut health = Health::new(100.0);
        health.current = -5.0;
        assert_eq!(health.fraction(), 0.0);
    }

    #[test]
    fn test_archetype_stats_scaling() {
        let melee = Archetype::Melee.stats();
        let ranged = Archetype::Ranged.stats();
        let tank = Archetype::Tank.stats();
        assert!(tank.max_hp > melee.max_hp);
        assert!(tank.speed < melee.speed);
        assert!(ranged.attack_range > melee.attack_range);
        assert!(ranged.attack_damage < melee.attack_damage);
    }

    #[test]
    fn test_mana_regen_scales_with_level() {
        let spawn = Vec2::ZERO;
        let mut player = Player::new(spawn);
        let base = player.mana_regen_rate();
        player.level = 3;
        assert_eq!(player.mana_regen_rate(), base + 2.0 * MANA_REGEN_PER_LEVEL);
    }
}
