//! Spawn requests and feedback events emitted by the simulation.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::{OwnerTag, ProjectileArchetype};
use crate::types::{Cell, InstanceId};

/// One projectile for the external projectile subsystem to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Weapon that produced the shot.
    pub source: InstanceId,
    /// World-space muzzle position of this pellet.
    pub position: DVec2,
    /// World-space heading in radians (0 = +x, counter-clockwise toward +y).
    pub heading: f64,
    pub archetype: ProjectileArchetype,
    pub speed: f64,
    pub owner: OwnerTag,
    pub damage: f64,
    /// Seconds the projectile waits before appearing.
    pub pellet_delay: f64,
}

/// Gameplay feedback for audio and UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// A charge weapon began charging instead of firing.
    ChargeStarted { instance: InstanceId, charge_secs: f64 },
    /// A fully charged weapon released its shot.
    ChargedShot { instance: InstanceId },
    /// A weapon fired immediately on dispatch.
    WeaponFired { instance: InstanceId, pellets: u32 },
    /// A burst sub-process emitted one of its shots.
    BurstShot { instance: InstanceId, remaining: u32 },
    /// A spin-up weapon's peak expired and it was forced into cooldown.
    Overheated { instance: InstanceId, cooldown_secs: f64 },
    /// A raised shield absorbed a hit.
    ShieldBlocked { instance: InstanceId, cell: Cell },
    /// Hit points reached zero.
    HullDestroyed,
}

/// Everything one frame produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub spawns: Vec<SpawnRequest>,
    pub events: Vec<CombatEvent>,
}

impl FrameOutput {
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.events.is_empty()
    }

    pub fn shots_from(&self, instance: InstanceId) -> usize {
        self.spawns.iter().filter(|s| s.source == instance).count()
    }
}
