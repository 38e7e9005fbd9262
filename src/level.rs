//! Runtime level state: the tile map plus checkpoint and portal tracking.

use glam::Vec2;

use crate::constants::*;
use crate::grid::TileMap;
use crate::level_gen::{EnemySpawn, GeneratedLevel};

/// A respawn checkpoint placed by generation. The activated flag latches on
/// first contact and only gates the one-time activation event.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    pub position: Vec2,
    pub activated: bool,
}

/// One dungeon floor while it is being played.
pub struct Level {
    pub map: TileMap,
    pub number: u32,
    pub spawn_point: Vec2,
    pub portal_pos: Vec2,
    pub checkpoints: Vec<Checkpoint>,
    portal_phase: f32,
}

impl Level {
    /// Build the runtime level, handing the enemy spawn slots back to the
    /// caller to populate the world with.
    pub fn from_generated(generated: GeneratedLevel, number: u32) -> (Self, Vec<EnemySpawn>) {
        let spawn_point = generated.spawn_point();
        let portal_pos = generated.portal_point();
        let checkpoints = generated
            .checkpoint_tiles
            .iter()
            .map(|&(tx, ty)| Checkpoint {
                position: TileMap::tile_center(tx, ty),
                activated: false,
            })
            .collect();
        let level = Self {
            map: generated.map,
            number,
            spawn_point,
            portal_pos,
            checkpoints,
            portal_phase: 0.0,
        };
        (level, generated.enemy_spawns)
    }

    /// Advance the portal pulse animation by one tick.
    pub fn update_portal(&mut self) {
        self.portal_phase = (self.portal_phase + PORTAL_PULSE_RATE * TICK_DT)
            % std::f32::consts::TAU;
    }

    /// Portal pulse intensity in [0, 1], for rendering.
    pub fn portal_pulse(&self) -> f32 {
        (self.portal_phase.sin() + 1.0) / 2.0
    }

    /// The checkpoint the player is standing on, if any. Returns its position
    /// so the caller can move the respawn anchor there, plus whether this is
    /// the first time the checkpoint has been triggered. Re-entering an
    /// already activated checkpoint still re-anchors.
    pub fn checkpoint_contact(&mut self, player_pos: Vec2) -> Option<(Vec2, bool)> {
        for checkpoint in &mut self.checkpoints {
            if player_pos.distance(checkpoint.position) <= CHECKPOINT_RADIUS {
                let first = !checkpoint.activated;
                checkpoint.activated = true;
                return Some((checkpoint.position, first));
            }
        }
        None
    }

    /// Whether the player is close enough to the portal to advance.
    pub fn portal_reached(&self, player_pos: Vec2) -> bool {
        player_pos.distance(self.portal_pos) <= PORTAL_ACTIVATION_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_with_checkpoints(at: &[Vec2]) -> Level {
        Level {
            map: TileMap::filled_with_walls(10, 10),
            number: 1,
            spawn_point: Vec2::ZERO,
            portal_pos: Vec2::new(500.0, 500.0),
            checkpoints: at
                .iter()
                .map(|&position| Checkpoint {
                    position,
                    activated: false,
                })
                .collect(),
            portal_phase: 0.0,
        }
    }

    #[test]
    fn test_checkpoint_activation_event_fires_once() {
        let at = Vec2::new(100.0, 100.0);
        let mut level = level_with_checkpoints(&[at]);

        assert!(level.checkpoint_contact(at + Vec2::new(200.0, 0.0)).is_none());
        assert_eq!(
            level.checkpoint_contact(at + Vec2::new(10.0, 0.0)),
            Some((at, true))
        );
        // Standing on it again re-anchors but is no longer a fresh activation.
        assert_eq!(level.checkpoint_contact(at), Some((at, false)));
    }

    #[test]
    fn test_revisited_checkpoint_reanchors() {
        let a = Vec2::new(100.0, 100.0);
        let b = Vec2::new(400.0, 100.0);
        let mut level = level_with_checkpoints(&[a, b]);

        assert_eq!(level.checkpoint_contact(a), Some((a, true)));
        assert_eq!(level.checkpoint_contact(b), Some((b, true)));
        // Walking back onto the first checkpoint moves the anchor again.
        assert_eq!(level.checkpoint_contact(a), Some((a, false)));
    }

    #[test]
    fn test_portal_reached_by_distance() {
        let level = level_with_checkpoints(&[Vec2::ZERO]);
        assert!(level.portal_reached(level.portal_pos + Vec2::new(PORTAL_ACTIVATION_RADIUS, 0.0)));
        assert!(!level.portal_reached(
            level.portal_pos + Vec2::new(PORTAL_ACTIVATION_RADIUS + 1.0, 0.0)
        ));
    }

    #[test]
    fn test_portal_pulse_stays_in_range() {
        let mut level = level_with_checkpoints(&[Vec2::ZERO]);
        for _ in 0..1000 {
            level.update_portal();
            let pulse = level.portal_pulse();
            assert!((0.0..=1.0).contains(&pulse));
        }
    }
}
