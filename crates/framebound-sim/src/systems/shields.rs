//! Shield upkeep and hit resolution against the assembly.

use framebound_core::enums::PartCategory;
use framebound_core::events::CombatEvent;
use framebound_core::types::Cell;

use crate::assembly::GridAssembly;

/// What happened to a hit that landed on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The cell is empty.
    Missed,
    /// A raised shield absorbed the hit.
    Blocked,
    /// Damage went through to the hull.
    Damaged,
    /// Damage went through and brought hit points to zero.
    Destroyed,
}

/// Count down shield cooldowns.
pub fn run(assembly: &mut GridAssembly, dt: f64) {
    for instance in assembly.instances_mut() {
        if instance.shield_cooldown > 0.0 {
            instance.shield_cooldown = (instance.shield_cooldown - dt).max(0.0);
        }
    }
}

/// Apply a hit of `damage` on `cell`.
pub fn resolve_hit(
    assembly: &mut GridAssembly,
    cell: Cell,
    damage: f64,
    events: &mut Vec<CombatEvent>,
) -> HitOutcome {
    if assembly.is_destroyed() {
        return HitOutcome::Missed;
    }
    let Some(id) = assembly.occupant(cell) else {
        return HitOutcome::Missed;
    };

    let shield_cooldown = assembly
        .instance(id)
        .and_then(|i| assembly.definition_of(i))
        .filter(|def| def.category == PartCategory::Shield)
        .map(|def| def.stats.shield_cooldown());
    if let Some(cooldown) = shield_cooldown {
        if let Some(instance) = assembly.instance_mut(id) {
            if instance.shield_cooldown <= 0.0 {
                instance.shield_cooldown = cooldown;
                tracing::debug!(x = cell.x, y = cell.y, cooldown, "shield blocked hit");
                events.push(CombatEvent::ShieldBlocked { instance: id, cell });
                return HitOutcome::Blocked;
            }
        }
    }

    if assembly.take_damage(damage) {
        tracing::debug!("hull destroyed");
        events.push(CombatEvent::HullDestroyed);
        HitOutcome::Destroyed
    } else {
        HitOutcome::Damaged
    }
}

/// Hit radius of the part on `cell`: scaled up while its shield is raised.
pub fn effective_hit_radius(assembly: &GridAssembly, cell: Cell, base: f64) -> f64 {
    let Some(instance) = assembly.part_at(cell) else {
        return base;
    };
    match assembly.definition_of(instance) {
        Some(def) if def.category == PartCategory::Shield && instance.shield_cooldown <= 0.0 => {
            base * def.stats.shield_radius_scale()
        }
        _ => base,
    }
}
