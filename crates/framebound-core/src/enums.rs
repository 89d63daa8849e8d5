//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// What a part does once mounted. Drives stat aggregation and whether the
/// scheduler treats the part as a weapon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    /// The immutable command module at the origin cell.
    Core,
    /// Plain structure.
    #[default]
    Hull,
    Weapon,
    /// Contributes one point of thrust per covered cell.
    Thruster,
    /// Counted per cell; speeds up laser-group weapons.
    Accelerant,
    /// Counted per cell; adds rockets to every rocket burst.
    RocketBay,
    /// Counted per instance.
    Booster,
    /// Blocks one hit, then recharges.
    Shield,
}

/// Weapon family tag. Campaign multipliers key off the group, not the part id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponGroup {
    /// Boosted by accelerant cells.
    Laser,
    /// Burst count and cadence boosted by rocket bays.
    Rocket,
    Velocity,
    /// Any tag this build does not know about.
    #[serde(other)]
    Other,
}

/// Projectile kind requested from the projectile subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileArchetype {
    MiniBullet,
    Laser,
    Plasma,
    Rocket,
    /// Hitscan beam.
    Railgun,
    /// Short hitscan beam.
    Saber,
    /// Generic bullet; also used for unrecognised archetype names.
    /// Must stay last for `serde(other)`.
    #[default]
    #[serde(other)]
    Bullet,
}

impl ProjectileArchetype {
    /// Beams resolve as hitscan instead of travelling.
    pub fn is_beam(self) -> bool {
        matches!(self, Self::Railgun | Self::Saber)
    }
}

/// Who fired a projectile. The projectile subsystem filters collisions on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerTag {
    #[default]
    Player,
    Enemy,
}
