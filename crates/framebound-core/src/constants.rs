//! Simulation constants and tuning parameters.

/// Largest frame delta the engine will integrate in one tick (seconds).
/// Bounds the stagger loop so a lag spike cannot fire a backlog of shots.
pub const MAX_FRAME_DT: f64 = 0.05;

// --- Grid ---

/// World units per grid cell. Sprites are 32 px with a 4 px shared border,
/// so adjacent cells overlap by one border width.
pub const CELL_SIZE: f64 = 28.0;

/// Id of the immutable core part mounted at the origin cell.
pub const CORE_PART_ID: &str = "core";

// --- Part defaults ---

/// Hit points of a part whose definition omits `hp`.
pub const DEFAULT_PART_HP: f64 = 10.0;

/// Mass of a part whose definition omits `mass`.
pub const DEFAULT_PART_MASS: f64 = 1.0;

/// Regeneration every assembly has before any part bonuses (hp/s).
pub const BASE_REGEN: f64 = 1.0;

// --- Weapon defaults ---

/// Cooldown of a weapon whose definition omits (or zeroes) `cooldown` (seconds).
pub const DEFAULT_WEAPON_COOLDOWN: f64 = 0.15;

/// Damage of a projectile whose definition omits `damage`.
pub const DEFAULT_PROJECTILE_DAMAGE: f64 = 10.0;

/// Projectile speed (world units per second).
pub const DEFAULT_PROJECTILE_SPEED: f64 = 600.0;

/// Interval between burst shots when the definition omits it (seconds).
pub const DEFAULT_BURST_INTERVAL: f64 = 0.1;

// --- Ramp / overheat ---

/// Ramp level at which a spin-up weapon enters its peak.
pub const DEFAULT_MAX_RAMP: f64 = 2.0;

/// Ramp level gained per shot.
pub const DEFAULT_RAMP_RATE: f64 = 0.5;

/// Duration of the peak before the weapon overheats (seconds).
pub const DEFAULT_PEAK_DURATION: f64 = 5.0;

/// Forced cooldown after a peak expires (seconds).
pub const DEFAULT_OVERHEAT_COOLDOWN: f64 = 7.0;

/// Ramp levels shed per second while the trigger is released outside a peak.
pub const RAMP_SPIN_DOWN_RATE: f64 = 2.0;

// --- Scheduler ---

/// Upper bound on the delay between dispatches inside one weapon group (seconds).
pub const MAX_STAGGER_INTERVAL: f64 = 0.2;

/// Maximum dispatch attempts per group per frame.
pub const MAX_DISPATCHES_PER_GROUP: u32 = 50;

// --- Muzzle geometry ---

/// Barrel length for mounts taller than 1.5 cells, in cells.
pub const LONG_BARREL_CELLS: f64 = 1.3;

/// Barrel length for single-cell mounts, in cells.
pub const SHORT_BARREL_CELLS: f64 = 0.6;

/// Rotated height (cells) above which the long barrel applies.
pub const LONG_BARREL_MIN_HEIGHT: f64 = 1.5;

// --- Multipliers ---

/// Fire-rate bonus per campaign level above 1.
pub const LEVEL_BONUS_PER_LEVEL: f64 = 0.01;

/// Laser fire-rate bonus per accelerant cell.
pub const ACCELERANT_BONUS_PER_CELL: f64 = 0.05;

// --- Shields ---

/// Hit radius multiplier of a raised shield cell.
pub const DEFAULT_SHIELD_RADIUS_SCALE: f64 = 1.4;

/// Time a shield stays down after blocking a hit (seconds).
pub const DEFAULT_SHIELD_COOLDOWN: f64 = 3.0;

// --- Persistence ---

/// Current blueprint format version.
pub const BLUEPRINT_VERSION: u32 = 1;

/// Campaign-level fire-rate multiplier (level 1 = 1.0).
pub fn level_bonus(level: u32) -> f64 {
    1.0 + (level.max(1) - 1) as f64 * LEVEL_BONUS_PER_LEVEL
}
