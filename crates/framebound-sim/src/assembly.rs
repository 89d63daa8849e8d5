//! Grid assembly: the player's vessel as a set of mounted parts.
//!
//! Instances live in an arena addressed by `InstanceId`; the grid maps
//! each covered cell to the id of the instance covering it. Ids are never
//! reused, so iterating the arena visits parts in insertion order and a
//! removed part's firing state cannot leak into a later one.
//!
//! A removal leaves an empty slot behind, and edit-session clones carry
//! those slots along. The arena only shrinks when the layout is rebuilt
//! with `from_blueprint`, which replays the surviving parts into a fresh,
//! gap-free arena.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;

use framebound_core::blueprint::{Blueprint, PlacedPart};
use framebound_core::catalog::{PartCatalog, PartDefinition};
use framebound_core::constants::{BASE_REGEN, CORE_PART_ID};
use framebound_core::enums::{PartCategory, WeaponGroup};
use framebound_core::types::{Cell, Footprint, InstanceId, Rotation};

use crate::fire_control::FireControl;

/// The core always gets the first arena slot.
pub const CORE_INSTANCE: InstanceId = InstanceId(0);

/// Why a placement was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementRejection {
    #[error("part `{0}` is not in the catalog")]
    UnknownPart(String),
    #[error("only one core can be mounted")]
    CoreReserved,
    #[error("cell {0:?} is already occupied")]
    Occupied(Cell),
    #[error("no covered cell touches the existing structure")]
    Detached,
}

/// A part mounted on the grid.
#[derive(Debug, Clone)]
pub struct MountedInstance {
    pub id: InstanceId,
    /// Top-left covered cell.
    pub origin: Cell,
    pub rotation: Rotation,
    pub part_id: String,
    /// Footprint after rotation.
    footprint: Footprint,
    /// Firing state; present on weapons only.
    pub fire: Option<FireControl>,
    /// Seconds until a shield part can block again.
    pub shield_cooldown: f64,
}

impl MountedInstance {
    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        self.footprint.cells(self.origin)
    }

    pub fn is_core(&self) -> bool {
        self.id == CORE_INSTANCE
    }

    pub fn to_placed_part(&self) -> PlacedPart {
        PlacedPart::new(self.origin.x, self.origin.y, &self.part_id, self.rotation)
    }
}

/// Totals derived from the distinct mounted parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStats {
    pub total_hp: f64,
    pub total_mass: f64,
    pub thrust: f64,
    pub turn_speed: f64,
    /// Regeneration (hp/s) including the base rate.
    pub regen: f64,
    /// Accelerant cells.
    pub accelerant_count: u32,
    /// Rocket bay cells.
    pub rocket_bay_count: u32,
    /// Booster instances.
    pub booster_count: u32,
    /// Weapon cells per group tag.
    pub weapon_group_counts: BTreeMap<WeaponGroup, u32>,
}

impl AggregateStats {
    pub fn weapon_group_count(&self, group: WeaponGroup) -> u32 {
        self.weapon_group_counts.get(&group).copied().unwrap_or(0)
    }
}

/// The vessel: arena of instances, cell occupancy and derived stats.
#[derive(Debug, Clone)]
pub struct GridAssembly {
    catalog: Arc<PartCatalog>,
    instances: Vec<Option<MountedInstance>>,
    grid: HashMap<Cell, InstanceId>,
    stats: AggregateStats,
    hp: f64,
    max_hp: f64,
    destroyed: bool,
    hp_initialized: bool,
}

impl GridAssembly {
    /// Create an assembly holding only the core at the origin.
    pub fn new(catalog: Arc<PartCatalog>) -> Self {
        let mut assembly = Self {
            catalog,
            instances: Vec::new(),
            grid: HashMap::new(),
            stats: AggregateStats::default(),
            hp: 0.0,
            max_hp: 0.0,
            destroyed: false,
            hp_initialized: false,
        };

        let footprint = match assembly.catalog.get(CORE_PART_ID) {
            Some(def) => def.footprint(),
            None => {
                tracing::warn!("catalog has no `{CORE_PART_ID}` definition; core mounted as 1x1");
                Footprint::UNIT
            }
        };
        assembly.mount(Cell::ORIGIN, CORE_PART_ID, Rotation::R0, footprint, None);
        assembly.recalculate_stats();
        assembly
    }

    /// Rebuild an assembly by replaying placements in order.
    ///
    /// Placements are read relative to the blueprint's core tuple, so a
    /// centred export loads back onto a core at the origin. The core tuple
    /// itself is skipped since construction already mounts it. Returns the
    /// assembly and the number of rejected tuples.
    pub fn from_blueprint(catalog: Arc<PartCatalog>, blueprint: &Blueprint) -> (Self, usize) {
        let mut assembly = Self::new(catalog);
        let core_index = blueprint
            .parts
            .iter()
            .position(|p| p.part_id == CORE_PART_ID);
        let core_origin = core_index
            .map(|i| blueprint.parts[i].origin())
            .unwrap_or(Cell::ORIGIN);

        let mut rejected = 0;
        for (index, part) in blueprint.parts.iter().enumerate() {
            if Some(index) == core_index {
                continue;
            }
            let origin = part.origin().offset(-core_origin.x, -core_origin.y);
            if assembly
                .add_part(origin, &part.part_id, part.rotation)
                .is_none()
            {
                tracing::warn!(
                    part = %part.part_id,
                    x = part.x,
                    y = part.y,
                    "blueprint placement rejected"
                );
                rejected += 1;
            }
        }
        (assembly, rejected)
    }

    /// Export the distinct instances in insertion order.
    pub fn blueprint(&self) -> Blueprint {
        Blueprint::new(self.instances().map(|i| i.to_placed_part()).collect())
    }

    pub fn catalog(&self) -> &PartCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog, for callers that also need `&mut self`.
    pub fn catalog_handle(&self) -> Arc<PartCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn definition_of(&self, instance: &MountedInstance) -> Option<&PartDefinition> {
        self.catalog.get(&instance.part_id)
    }

    // --- Placement ---

    /// Validate a placement and return the rotated footprint it would cover.
    pub fn check_placement(
        &self,
        origin: Cell,
        part_id: &str,
        rotation: Rotation,
    ) -> Result<Footprint, PlacementRejection> {
        let def = self
            .catalog
            .get(part_id)
            .ok_or_else(|| PlacementRejection::UnknownPart(part_id.to_string()))?;
        if def.category == PartCategory::Core {
            return Err(PlacementRejection::CoreReserved);
        }

        let footprint = def.footprint().rotated(rotation);
        if self.grid.is_empty() {
            return Ok(footprint);
        }

        let mut adjacent = false;
        for cell in footprint.cells(origin) {
            if self.grid.contains_key(&cell) {
                return Err(PlacementRejection::Occupied(cell));
            }
            adjacent |= cell.neighbors().iter().any(|n| self.grid.contains_key(n));
        }

        if adjacent {
            Ok(footprint)
        } else {
            Err(PlacementRejection::Detached)
        }
    }

    pub fn can_place(&self, origin: Cell, part_id: &str, rotation: Rotation) -> bool {
        self.check_placement(origin, part_id, rotation).is_ok()
    }

    /// Mount a part if the placement is valid. `None` means nothing changed.
    pub fn add_part(&mut self, origin: Cell, part_id: &str, rotation: Rotation) -> Option<InstanceId> {
        match self.try_add_part(origin, part_id, rotation) {
            Ok(id) => Some(id),
            Err(reason) => {
                tracing::debug!(part = part_id, x = origin.x, y = origin.y, %reason, "placement rejected");
                None
            }
        }
    }

    /// Like `add_part`, but reports why a placement was refused.
    pub fn try_add_part(
        &mut self,
        origin: Cell,
        part_id: &str,
        rotation: Rotation,
    ) -> Result<InstanceId, PlacementRejection> {
        let footprint = self.check_placement(origin, part_id, rotation)?;
        let fire = self.catalog.get(part_id).and_then(FireControl::for_definition);
        let id = self.mount(origin, part_id, rotation, footprint, fire);
        self.recalculate_stats();
        Ok(id)
    }

    fn mount(
        &mut self,
        origin: Cell,
        part_id: &str,
        rotation: Rotation,
        footprint: Footprint,
        fire: Option<FireControl>,
    ) -> InstanceId {
        let id = InstanceId(self.instances.len() as u32);
        for cell in footprint.cells(origin) {
            self.grid.insert(cell, id);
        }
        self.instances.push(Some(MountedInstance {
            id,
            origin,
            rotation,
            part_id: part_id.to_string(),
            footprint,
            fire,
            shield_cooldown: 0.0,
        }));
        id
    }

    /// Remove the part covering `cell`. The core is never removed.
    ///
    /// The instance is dropped along with its firing state.
    pub fn remove_part(&mut self, cell: Cell) -> bool {
        let Some(&id) = self.grid.get(&cell) else {
            return false;
        };
        if id == CORE_INSTANCE {
            return false;
        }
        let Some(instance) = self.instances.get_mut(id.index()).and_then(Option::take) else {
            return false;
        };

        for covered in instance.cells() {
            if self.grid.get(&covered) == Some(&id) {
                self.grid.remove(&covered);
            }
        }
        tracing::debug!(part = %instance.part_id, x = instance.origin.x, y = instance.origin.y, "part removed");

        self.recalculate_stats();
        true
    }

    // --- Queries ---

    pub fn part_at(&self, cell: Cell) -> Option<&MountedInstance> {
        self.grid.get(&cell).and_then(|id| self.instance(*id))
    }

    pub fn instance(&self, id: InstanceId) -> Option<&MountedInstance> {
        self.instances.get(id.index()).and_then(Option::as_ref)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut MountedInstance> {
        self.instances.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Distinct instances in insertion order.
    pub fn instances(&self) -> impl Iterator<Item = &MountedInstance> {
        self.instances.iter().flatten()
    }

    pub fn instances_mut(&mut self) -> impl Iterator<Item = &mut MountedInstance> {
        self.instances.iter_mut().flatten()
    }

    pub fn part_count(&self) -> usize {
        self.instances().count()
    }

    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    pub fn occupant(&self, cell: Cell) -> Option<InstanceId> {
        self.grid.get(&cell).copied()
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = (Cell, InstanceId)> + '_ {
        self.grid.iter().map(|(cell, id)| (*cell, *id))
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    // --- Stats ---

    /// Re-derive aggregate stats from the distinct instances.
    ///
    /// Hit points are filled to max only the first time; later calls
    /// just clamp them to the new max.
    pub fn recalculate_stats(&mut self) {
        let mut stats = AggregateStats {
            regen: BASE_REGEN,
            ..AggregateStats::default()
        };

        for instance in self.instances.iter().flatten() {
            let Some(def) = self.catalog.get(&instance.part_id) else {
                tracing::warn!(part = %instance.part_id, "unknown part skipped in stat aggregation");
                continue;
            };
            let area = def.footprint().area();

            stats.total_hp += def.stats.hp;
            stats.total_mass += def.stats.mass;
            stats.turn_speed += def.stats.turn_speed;
            stats.thrust += def.stats.thrust;
            stats.regen += def.stats.regen;

            match def.category {
                PartCategory::Thruster => stats.thrust += area as f64,
                PartCategory::Accelerant => stats.accelerant_count += area,
                PartCategory::RocketBay => stats.rocket_bay_count += area,
                PartCategory::Booster => stats.booster_count += 1,
                PartCategory::Weapon => {
                    if let Some(group) = def.stats.weapon_group {
                        *stats.weapon_group_counts.entry(group).or_insert(0) += area;
                    }
                }
                PartCategory::Core | PartCategory::Hull | PartCategory::Shield => {}
            }
        }

        self.max_hp = stats.total_hp;
        self.stats = stats;

        if !self.hp_initialized {
            self.hp = self.max_hp;
            self.hp_initialized = true;
        } else {
            self.hp = self.hp.min(self.max_hp);
        }
    }

    // --- Hit points ---

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Apply damage. Returns true if this hit destroyed the assembly.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if self.destroyed || amount <= 0.0 {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.destroyed = true;
            return true;
        }
        false
    }

    /// Regenerate toward max while alive.
    pub fn regenerate(&mut self, dt: f64, level_bonus: f64) {
        if self.destroyed || self.hp >= self.max_hp {
            return;
        }
        self.hp = (self.hp + self.stats.regen * level_bonus * dt).min(self.max_hp);
    }

    /// Fill hit points to max (used when a fresh layout is loaded).
    pub fn repair(&mut self) {
        if !self.destroyed {
            self.hp = self.max_hp;
        }
    }
}
