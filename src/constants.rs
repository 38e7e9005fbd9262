//! Simulation constants organized by category.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.

// =============================================================================
// TILES / TIME
// =============================================================================

/// Side length of one tile in world pixels
pub const TILE_SIZE: f32 = 64.0;
/// Simulated seconds per tick (fixed-step update)
pub const TICK_DT: f32 = 1.0 / 60.0;
/// Default level width in tiles
pub const LEVEL_WIDTH: usize = 50;
/// Default level height in tiles
pub const LEVEL_HEIGHT: usize = 50;

// =============================================================================
// PLAYER
// =============================================================================

/// Player movement speed (px per tick)
pub const PLAYER_SPEED: f32 = 5.0;
/// Player starting/maximum health
pub const PLAYER_START_HP: f32 = 100.0;
/// Player collision radius (half a tile)
pub const PLAYER_RADIUS: f32 = TILE_SIZE / 2.0;
/// Starting character level
pub const PLAYER_START_LEVEL: u32 = 1;
/// XP required for the first level-up
pub const XP_TO_LEVEL: u32 = 100;
/// Growth factor applied to the XP threshold on each level-up
pub const XP_GROWTH_FACTOR: f32 = 1.5;
/// Invulnerability window after taking a hit (seconds)
pub const PLAYER_INVULN_DURATION: f32 = 0.5;
/// Delay between death and respawn (seconds)
pub const PLAYER_RESPAWN_DELAY: f32 = 3.0;
/// Invulnerability window granted on respawn (seconds)
pub const PLAYER_RESPAWN_INVULN: f32 = 2.0;

// =============================================================================
// MELEE ATTACK
// =============================================================================

/// Reach of the melee swing (px)
pub const PLAYER_ATTACK_RANGE: f32 = 80.0;
/// Minimum time between melee swings (seconds)
pub const PLAYER_ATTACK_COOLDOWN: f32 = 0.5;
/// Damage per melee hit
pub const PLAYER_ATTACK_DAMAGE: f32 = 8.0;
/// Duration of the swing animation (seconds)
pub const ATTACK_ANIMATION_DURATION: f32 = 0.2;
/// Total arc swept by the swing (degrees)
pub const ATTACK_SWING_ANGLE: f32 = 120.0;
/// Number of trail sample points retained for rendering
pub const ATTACK_TRAIL_LENGTH: usize = 3;

// =============================================================================
// DASH
// =============================================================================

/// Dash movement speed (px per tick)
pub const DASH_SPEED: f32 = 15.0;
/// Dash duration (seconds)
pub const DASH_DURATION: f32 = 0.15;
/// Minimum time between dashes (seconds)
pub const DASH_COOLDOWN: f32 = 1.0;

// =============================================================================
// MANA
// =============================================================================

/// Starting and maximum mana pool
pub const PLAYER_MAX_MANA: f32 = 100.0;
/// Base mana regeneration per second
pub const MANA_REGEN_BASE: f32 = 15.0;
/// Additional mana regeneration per second per level above 1
pub const MANA_REGEN_PER_LEVEL: f32 = 1.5;

// =============================================================================
// MAGIC WEAPONS
// =============================================================================

/// Fireball damage per hit
pub const FIREBALL_DAMAGE: f32 = 40.0;
/// Fireball mana cost
pub const FIREBALL_MANA_COST: f32 = 30.0;
/// Fireball cooldown (seconds)
pub const FIREBALL_COOLDOWN: f32 = 0.8;
/// Fireball projectile speed (px per tick)
pub const FIREBALL_SPEED: f32 = 8.0;
/// Fireball maximum travel distance (px)
pub const FIREBALL_RANGE: f32 = 400.0;
/// Ice lance damage per hit
pub const ICE_LANCE_DAMAGE: f32 = 25.0;
/// Ice lance mana cost
pub const ICE_LANCE_MANA_COST: f32 = 20.0;
/// Ice lance cooldown (seconds)
pub const ICE_LANCE_COOLDOWN: f32 = 0.4;
/// Ice lance projectile speed (px per tick)
pub const ICE_LANCE_SPEED: f32 = 12.0;
/// Ice lance maximum travel distance (px)
pub const ICE_LANCE_RANGE: f32 = 300.0;
/// Lightning bolt base damage before falloff
pub const LIGHTNING_DAMAGE: f32 = 60.0;
/// Lightning bolt mana cost
pub const LIGHTNING_MANA_COST: f32 = 50.0;
/// Lightning bolt cooldown (seconds)
pub const LIGHTNING_COOLDOWN: f32 = 1.2;
/// Targets struck by one lightning chain
pub const LIGHTNING_CHAIN_COUNT: usize = 3;
/// Maximum hop distance between chain targets (px)
pub const LIGHTNING_CHAIN_RANGE: f32 = 200.0;
/// Damage multiplier compounded per target struck
pub const LIGHTNING_DAMAGE_FALLOFF: f32 = 0.8;
/// Health restored by a heal cast
pub const HEAL_AMOUNT: f32 = 60.0;
/// Heal mana cost
pub const HEAL_MANA_COST: f32 = 40.0;
/// Heal cooldown (seconds)
pub const HEAL_COOLDOWN: f32 = 20.0;
/// Collision radius of player-cast projectiles (px)
pub const PLAYER_PROJECTILE_RADIUS: f32 = 8.0;

// =============================================================================
// KNOCKBACK
// =============================================================================

/// Geometric decay applied to knockback each tick
pub const KNOCKBACK_DECAY: f32 = 0.8;
/// Knockback magnitude below which the vector snaps to zero
pub const KNOCKBACK_EPSILON: f32 = 0.1;

// =============================================================================
// ENEMIES
// =============================================================================

/// Enemy collision radius (px)
pub const ENEMY_RADIUS: f32 = 24.0;
/// Base enemy health before archetype scaling
pub const ENEMY_HP: f32 = 100.0;
/// Base enemy speed before archetype scaling (px per tick)
pub const ENEMY_SPEED: f32 = 2.5;
/// XP awarded for a kill
pub const ENEMY_XP_REWARD: u32 = 50;
/// Hit-flash window after taking damage (seconds)
pub const ENEMY_HIT_FLASH_DURATION: f32 = 0.1;
/// Base attack reach before archetype scaling (px)
pub const ENEMY_ATTACK_RANGE: f32 = 40.0;
/// Base damage per strike before archetype scaling
pub const ENEMY_ATTACK_DAMAGE: f32 = 10.0;
/// Minimum time between enemy attacks (seconds)
pub const ENEMY_ATTACK_COOLDOWN: f32 = 1.0;
/// Knockback impulse applied to the player by a melee strike
pub const ENEMY_KNOCKBACK_FORCE: f32 = 8.0;
/// Speed of an enemy ranged projectile (px per tick)
pub const ENEMY_PROJECTILE_SPEED: f32 = 6.0;
/// Maximum travel distance of an enemy projectile (px)
pub const ENEMY_PROJECTILE_RANGE: f32 = 400.0;
/// Collision radius of an enemy projectile (px)
pub const ENEMY_PROJECTILE_RADIUS: f32 = 6.0;

// =============================================================================
// ENEMY AI
// =============================================================================

/// Distance at which an enemy notices the player (px)
pub const ENEMY_AGGRO_RANGE: f32 = 250.0;
/// Health fraction at or below which an enemy flees
pub const ENEMY_FLEE_HP_THRESHOLD: f32 = 0.3;
/// Flee ends once health recovers above threshold times this factor
pub const ENEMY_FLEE_RECOVER_FACTOR: f32 = 1.5;
/// Attack breaks back to chase beyond attack range times this factor
pub const ENEMY_ATTACK_BREAK_FACTOR: f32 = 1.2;
/// Back off when closer than attack range times this factor
pub const ENEMY_BACKOFF_FACTOR: f32 = 0.8;
/// Radius of random wandering around the spawn point (px)
pub const ENEMY_WANDER_RADIUS: f32 = 100.0;
/// Pause between wander target picks (seconds)
pub const ENEMY_WANDER_PAUSE: f32 = 2.0;
/// Wander target resample attempts before giving up
pub const ENEMY_WANDER_ATTEMPTS: usize = 10;
/// Speed factor while wandering
pub const ENEMY_WANDER_SPEED_FACTOR: f32 = 0.5;
/// Speed factor while patrolling
pub const ENEMY_PATROL_SPEED_FACTOR: f32 = 0.7;
/// Speed factor for the small drift kept up while attacking
pub const ENEMY_ATTACK_DRIFT_FACTOR: f32 = 0.3;
/// Minimum interval between state re-evaluations (seconds)
pub const AI_STATE_INTERVAL: f32 = 0.1;
/// Validity window of the cached chase direction (seconds)
pub const AI_DIRECTION_CACHE_DURATION: f32 = 0.2;
/// Tile-steps walked ahead when validating the straight-line chase path
pub const AI_PATH_LOOKAHEAD_STEPS: usize = 3;
/// Angular offsets tried when the straight path is blocked (degrees)
pub const AI_DEVIATION_ANGLES: [f32; 6] = [-45.0, -30.0, -15.0, 15.0, 30.0, 45.0];
/// Cost penalty per degree of deviation from the straight path
pub const AI_DEVIATION_PENALTY: f32 = 0.1;
/// Number of patrol points generated around the spawn
pub const PATROL_POINT_COUNT: usize = 4;
/// Patrol point distance from spawn, in tiles (min, max)
pub const PATROL_DISTANCE_TILES: (f32, f32) = (3.0, 6.0);

// =============================================================================
// FLOCKING
// =============================================================================

/// Neighbor scan range as a multiple of the minimum separation distance
pub const FLOCK_NEIGHBOR_RANGE_FACTOR: f32 = 3.0;
/// Separation force weight (strongest component)
pub const FLOCK_SEPARATION_WEIGHT: f32 = 1.8;
/// Alignment force weight
pub const FLOCK_ALIGNMENT_WEIGHT: f32 = 0.8;
/// Cohesion force weight
pub const FLOCK_COHESION_WEIGHT: f32 = 0.4;
/// Alignment weight multiplier for the group leader
pub const FLOCK_LEADER_WEIGHT: f32 = 2.0;
/// Weight of the tactical circling offset while ganging up
pub const FLOCK_CIRCLING_WEIGHT: f32 = 0.5;
/// Per-axis magnitude of the random steering jitter
pub const FLOCK_JITTER: f32 = 0.2;
/// Fraction of the combined force blended into the velocity
pub const FLOCK_BLEND: f32 = 0.15;

// =============================================================================
// LEVEL GENERATION
// =============================================================================

/// Columns in the room-placement cell partition
pub const GEN_GRID_COLS: usize = 4;
/// Rows in the room-placement cell partition
pub const GEN_GRID_ROWS: usize = 3;
/// Rooms requested per level (capped by the cell count)
pub const ROOMS_PER_LEVEL: usize = 8;
/// Minimum room side length (tiles)
pub const ROOM_MIN_SIZE: i32 = 8;
/// Maximum room side length (tiles)
pub const ROOM_MAX_SIZE: i32 = 12;
/// Corridor width (tiles)
pub const CORRIDOR_WIDTH: i32 = 3;
/// One checkpoint is placed per this many rooms
pub const CHECKPOINT_ROOM_DIVISOR: usize = 3;
/// Enemies per interior room at level 1 (min, max)
pub const ENEMIES_PER_ROOM: (u32, u32) = (8, 15);
/// Linear growth of the per-room enemy count per level above 1
pub const ENEMY_COUNT_LEVEL_SCALING: f32 = 0.2;
/// Minimum distance between placed enemies (tiles)
pub const MIN_ENEMY_SEPARATION: f32 = 2.0;
/// Minimum distance from the spawn point for the first two rooms (tiles)
pub const MIN_ENEMY_DISTANCE_FROM_SPAWN: f32 = 10.0;
/// Placement attempts per enemy slot before it is skipped
pub const ENEMY_PLACEMENT_ATTEMPTS: usize = 50;

// =============================================================================
// CHECKPOINTS / PORTAL
// =============================================================================

/// Radius within which a checkpoint activates (px)
pub const CHECKPOINT_RADIUS: f32 = 32.0;
/// Radius within which the portal triggers level advance (px)
pub const PORTAL_ACTIVATION_RADIUS: f32 = 64.0;
/// Portal pulse animation rate (radians per second)
pub const PORTAL_PULSE_RATE: f32 = 2.0;
