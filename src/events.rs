//! Simulation events for the rendering/audio collaborator.
//!
//! Systems emit events during the update pass; the driver drains them after
//! each tick to spawn visual effects, update the HUD, and so on. Nothing in
//! the core consumes them.

use glam::Vec2;
use hecs::Entity;

/// Events emitted by the simulation core during one tick.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// An enemy took damage.
    EnemyHit { enemy: Entity, damage: f32 },
    /// An enemy died at this position.
    EnemyDied { enemy: Entity, position: Vec2 },
    /// The player took damage.
    PlayerHit { damage: f32 },
    /// The player died and will respawn after a delay.
    PlayerDied { position: Vec2 },
    /// The player respawned at this position.
    PlayerRespawned { position: Vec2 },
    /// The player reached a new level.
    LevelUp { new_level: u32 },
    /// A checkpoint became the active respawn anchor.
    CheckpointActivated { position: Vec2 },
    /// The player entered the portal; a new level was built.
    PortalEntered { next_level: u32 },
    /// A lightning cast produced this chain of arc segments (cosmetic).
    LightningArc { points: Vec<Vec2> },
    /// A heal cast went off at this position (cosmetic).
    HealBurst { position: Vec2 },
}

/// Simple event queue - events are pushed during update, drained by the
/// driver at the end of the frame.
#[derive(Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
