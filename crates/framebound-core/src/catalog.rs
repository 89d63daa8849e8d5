//! Part definitions and the read-only catalog they are looked up in.
//!
//! Definitions are plain data loaded from JSON (or built in code for the
//! stock catalog). Nothing here knows about mounted instances; the
//! simulation crate resolves instances against the catalog by id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::{PartCategory, ProjectileArchetype, WeaponGroup};
use crate::types::Footprint;

/// Spin-up parameters for weapons whose fire rate grows under sustained fire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampProfile {
    /// Ramp level at which the weapon enters its peak.
    pub max_level: f64,
    /// Level gained per shot.
    pub rate: f64,
    /// Seconds the peak lasts before overheating.
    pub peak_duration: f64,
    /// Forced cooldown once the peak expires.
    pub overheat_cooldown: f64,
}

impl Default for RampProfile {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_RAMP,
            rate: DEFAULT_RAMP_RATE,
            peak_duration: DEFAULT_PEAK_DURATION,
            overheat_cooldown: DEFAULT_OVERHEAT_COOLDOWN,
        }
    }
}

/// Numeric stat table of a part. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartStats {
    pub hp: f64,
    pub mass: f64,
    /// Explicit thrust, on top of the per-cell thrust of thruster parts.
    pub thrust: f64,
    pub turn_speed: f64,
    /// Regeneration bonus (hp/s).
    pub regen: f64,

    // --- Weapons ---
    pub weapon_group: Option<WeaponGroup>,
    pub cooldown: Option<f64>,
    pub damage: Option<f64>,
    pub projectile: ProjectileArchetype,
    pub projectile_speed: Option<f64>,
    /// Seconds of charge before a shot; charge weapons only.
    pub charge_time: Option<f64>,
    pub burst_count: u32,
    pub burst_interval: Option<f64>,
    /// Present only on spin-up weapons.
    pub ramp: Option<RampProfile>,
    /// Projectiles per shot.
    pub pellet_count: u32,
    /// Total random cone (radians) pellets spread across.
    pub spread: f64,
    /// Base emission delay between consecutive pellets (seconds).
    pub pellet_interval: f64,
    /// Lateral distance between barrels (world units).
    pub barrel_spacing: f64,

    // --- Shields ---
    pub shield_radius_scale: Option<f64>,
    pub shield_cooldown: Option<f64>,
}

impl Default for PartStats {
    fn default() -> Self {
        Self {
            hp: DEFAULT_PART_HP,
            mass: DEFAULT_PART_MASS,
            thrust: 0.0,
            turn_speed: 0.0,
            regen: 0.0,
            weapon_group: None,
            cooldown: None,
            damage: None,
            projectile: ProjectileArchetype::default(),
            projectile_speed: None,
            charge_time: None,
            burst_count: 0,
            burst_interval: None,
            ramp: None,
            pellet_count: 1,
            spread: 0.0,
            pellet_interval: 0.0,
            barrel_spacing: 0.0,
            shield_radius_scale: None,
            shield_cooldown: None,
        }
    }
}

impl PartStats {
    /// Base cooldown; zero or missing falls back to the default.
    pub fn cooldown(&self) -> f64 {
        positive_or(self.cooldown, DEFAULT_WEAPON_COOLDOWN)
    }

    pub fn damage(&self) -> f64 {
        positive_or(self.damage, DEFAULT_PROJECTILE_DAMAGE)
    }

    pub fn projectile_speed(&self) -> f64 {
        positive_or(self.projectile_speed, DEFAULT_PROJECTILE_SPEED)
    }

    pub fn burst_interval(&self) -> f64 {
        positive_or(self.burst_interval, DEFAULT_BURST_INTERVAL)
    }

    /// `Some` only for charge weapons.
    pub fn charge_time(&self) -> Option<f64> {
        self.charge_time.filter(|t| *t > 0.0)
    }

    pub fn pellet_count(&self) -> u32 {
        self.pellet_count.max(1)
    }

    pub fn shield_radius_scale(&self) -> f64 {
        positive_or(self.shield_radius_scale, DEFAULT_SHIELD_RADIUS_SCALE)
    }

    pub fn shield_cooldown(&self) -> f64 {
        positive_or(self.shield_cooldown, DEFAULT_SHIELD_COOLDOWN)
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(fallback)
}

/// A catalog entry: everything static about one kind of part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: PartCategory,
    /// Unrotated width in cells.
    #[serde(default = "one")]
    pub width: u32,
    /// Unrotated height in cells.
    #[serde(default = "one")]
    pub height: u32,
    #[serde(default)]
    pub stats: PartStats,
    /// Facing offset of the turret sprite relative to the aim heading (radians).
    #[serde(default)]
    pub rotation_offset: f64,
    /// Extra barrel length along the aim heading (world units).
    #[serde(default)]
    pub muzzle_offset: f64,
}

fn one() -> u32 {
    1
}

impl PartDefinition {
    pub fn new(id: &str, name: &str, category: PartCategory, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            width,
            height,
            stats: PartStats::default(),
            rotation_offset: 0.0,
            muzzle_offset: 0.0,
        }
    }

    pub fn with_stats(mut self, stats: PartStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_muzzle_offset(mut self, offset: f64) -> Self {
        self.muzzle_offset = offset;
        self
    }

    /// Sprite facing for a turret aimed along `aim_heading`.
    pub fn turret_facing(&self, aim_heading: f64) -> f64 {
        aim_heading + self.rotation_offset
    }

    /// Unrotated footprint.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.width, self.height)
    }

    pub fn is_weapon(&self) -> bool {
        self.category == PartCategory::Weapon
    }

    pub fn is_charge_weapon(&self) -> bool {
        self.is_weapon() && self.stats.charge_time().is_some()
    }

    pub fn is_ramp_weapon(&self) -> bool {
        self.is_weapon() && self.stats.ramp.is_some()
    }
}

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse part catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate part id `{0}`")]
    DuplicateId(String),
    #[error("part `{0}` has an empty footprint")]
    EmptyFootprint(String),
}

/// Read-only lookup from part id to definition.
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: HashMap<String, PartDefinition>,
}

impl PartCatalog {
    /// Build a catalog, rejecting duplicate ids and zero-area parts.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = PartDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut parts = HashMap::new();
        for def in definitions {
            if def.footprint().area() == 0 {
                return Err(CatalogError::EmptyFootprint(def.id));
            }
            if parts.contains_key(&def.id) {
                return Err(CatalogError::DuplicateId(def.id));
            }
            parts.insert(def.id.clone(), def);
        }
        Ok(Self { parts })
    }

    /// Parse a JSON array of definitions.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<PartDefinition> = serde_json::from_str(json)?;
        let catalog = Self::from_definitions(definitions)?;
        tracing::debug!(parts = catalog.len(), "loaded part catalog");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&PartDefinition> {
        self.parts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartDefinition> {
        self.parts.values()
    }

    /// The stock parts every new game starts with.
    pub fn standard() -> Self {
        use PartCategory::*;

        let weapon = |group: WeaponGroup| PartStats {
            weapon_group: Some(group),
            ..PartStats::default()
        };

        let definitions = vec![
            PartDefinition::new(CORE_PART_ID, "Core", Core, 1, 1).with_stats(PartStats {
                hp: 50.0,
                mass: 5.0,
                turn_speed: 1.0,
                ..PartStats::default()
            }),
            PartDefinition::new("hull", "Hull", Hull, 1, 1),
            PartDefinition::new("long_hull", "Long Hull", Hull, 1, 2).with_stats(PartStats {
                hp: 22.0,
                mass: 2.0,
                ..PartStats::default()
            }),
            PartDefinition::new("gun_basic", "Dart Gun", Weapon, 1, 1).with_stats(PartStats {
                cooldown: Some(0.4),
                damage: Some(10.0),
                ..weapon(WeaponGroup::Velocity)
            }),
            PartDefinition::new("twin_laser", "Twin Laser", Weapon, 2, 1).with_stats(PartStats {
                cooldown: Some(0.25),
                damage: Some(8.0),
                projectile: ProjectileArchetype::Laser,
                pellet_count: 2,
                barrel_spacing: 8.0,
                ..weapon(WeaponGroup::Laser)
            }),
            PartDefinition::new("minigun", "Minigun", Weapon, 1, 2)
                .with_stats(PartStats {
                    cooldown: Some(0.3),
                    damage: Some(4.0),
                    projectile: ProjectileArchetype::MiniBullet,
                    spread: 0.12,
                    ramp: Some(RampProfile::default()),
                    ..weapon(WeaponGroup::Velocity)
                })
                .with_muzzle_offset(4.0),
            PartDefinition::new("railgun", "Railgun", Weapon, 1, 2).with_stats(PartStats {
                cooldown: Some(1.5),
                damage: Some(60.0),
                projectile: ProjectileArchetype::Railgun,
                charge_time: Some(1.0),
                ..weapon(WeaponGroup::Velocity)
            }),
            PartDefinition::new("rocket_pod", "Rocket Pod", Weapon, 1, 1).with_stats(PartStats {
                cooldown: Some(2.0),
                damage: Some(25.0),
                projectile: ProjectileArchetype::Rocket,
                projectile_speed: Some(420.0),
                burst_count: 3,
                burst_interval: Some(0.12),
                ..weapon(WeaponGroup::Rocket)
            }),
            PartDefinition::new("scatter_cannon", "Scatter Cannon", Weapon, 2, 2).with_stats(
                PartStats {
                    cooldown: Some(1.2),
                    damage: Some(6.0),
                    pellet_count: 6,
                    spread: 0.5,
                    pellet_interval: 0.02,
                    ..weapon(WeaponGroup::Velocity)
                },
            ),
            PartDefinition::new("thruster", "Thruster", Thruster, 1, 1).with_stats(PartStats {
                hp: 6.0,
                ..PartStats::default()
            }),
            PartDefinition::new("accelerant", "Accelerant", Accelerant, 1, 1),
            PartDefinition::new("rocket_bay", "Rocket Bay", RocketBay, 1, 1),
            PartDefinition::new("booster", "Booster", Booster, 1, 1).with_stats(PartStats {
                thrust: 2.0,
                ..PartStats::default()
            }),
            PartDefinition::new("shield", "Shield Emitter", Shield, 1, 1).with_stats(PartStats {
                hp: 15.0,
                regen: 0.5,
                shield_radius_scale: Some(DEFAULT_SHIELD_RADIUS_SCALE),
                shield_cooldown: Some(DEFAULT_SHIELD_COOLDOWN),
                ..PartStats::default()
            }),
        ];

        let mut parts = HashMap::with_capacity(definitions.len());
        for def in definitions {
            parts.insert(def.id.clone(), def);
        }
        Self { parts }
    }
}
