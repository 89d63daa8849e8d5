//! Simulation engine: owns the live assembly and advances it frame by frame.
//!
//! `SimulationEngine` applies queued ship commands, runs the systems in a
//! fixed order, and returns the frame's spawn requests and events. It is
//! headless, and with a fixed seed fully deterministic.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use framebound_core::catalog::PartCatalog;
use framebound_core::commands::ShipCommand;
use framebound_core::constants::{level_bonus, MAX_FRAME_DT};
use framebound_core::enums::OwnerTag;
use framebound_core::events::FrameOutput;
use framebound_core::types::Cell;

use crate::assembly::GridAssembly;
use crate::builder::{EditSession, Inventory};
use crate::geometry::{self, AimTarget, Frame};
use crate::systems;
use crate::systems::shields::HitOutcome;
use crate::systems::weapons::{FireInput, WeaponScheduler};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same spread and pellet delays.
    pub seed: u64,
    /// Campaign level feeding the fire-rate and regeneration bonus.
    pub campaign_level: u32,
    /// Upper bound applied to every frame's dt.
    pub max_frame_dt: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            campaign_level: 1,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

/// Host input for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub dt: f64,
    pub trigger_held: bool,
    /// Pose of the vessel this frame.
    pub frame: Frame,
    pub aim: AimTarget,
}

impl FrameInput {
    /// Convenience: vessel at rest at the origin, firing along +x.
    pub fn firing(dt: f64, trigger_held: bool) -> Self {
        Self {
            dt,
            trigger_held,
            ..Self::default()
        }
    }
}

/// Frame counter and accumulated simulated time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub frame: u64,
    pub elapsed_secs: f64,
}

/// The simulation engine. Owns the live assembly and all per-frame state.
pub struct SimulationEngine {
    assembly: GridAssembly,
    scheduler: WeaponScheduler,
    campaign_level: u32,
    max_frame_dt: f64,
    rng: ChaCha8Rng,
    clock: SimClock,
    command_queue: VecDeque<ShipCommand>,
    inventory: Inventory,
}

impl SimulationEngine {
    /// Create an engine whose live assembly holds only the core.
    pub fn new(config: SimConfig, catalog: Arc<PartCatalog>) -> Self {
        Self::with_assembly(config, GridAssembly::new(catalog))
    }

    pub fn with_assembly(config: SimConfig, assembly: GridAssembly) -> Self {
        Self {
            assembly,
            scheduler: WeaponScheduler::new(),
            campaign_level: config.campaign_level.max(1),
            max_frame_dt: config.max_frame_dt,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            clock: SimClock::default(),
            command_queue: VecDeque::new(),
            inventory: Inventory::Unlimited,
        }
    }

    /// Queue a command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: ShipCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ShipCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one frame. Non-positive dt applies queued commands only.
    pub fn tick(&mut self, input: FrameInput) -> FrameOutput {
        self.process_commands();

        let mut out = FrameOutput::default();
        if input.dt <= 0.0 || self.assembly.is_destroyed() {
            return out;
        }
        let dt = input.dt.min(self.max_frame_dt);

        // 1. Shield cooldowns
        systems::shields::run(&mut self.assembly, dt);
        // 2. Weapons: fire control advance, staggered dispatch, bursts
        let fire_input = FireInput {
            dt,
            trigger_held: input.trigger_held,
            frame: input.frame,
            aim: input.aim,
            campaign_level: self.campaign_level,
            owner: OwnerTag::Player,
        };
        self.scheduler
            .run(&mut self.assembly, &fire_input, &mut self.rng, &mut out);
        // 3. Regeneration
        self.assembly
            .regenerate(dt, level_bonus(self.campaign_level));

        self.clock.frame += 1;
        self.clock.elapsed_secs += dt;
        out
    }

    /// Resolve a hit at a world point against the vessel posed at `frame`.
    pub fn apply_hit(&mut self, frame: &Frame, world_point: DVec2, damage: f64) -> (HitOutcome, FrameOutput) {
        let mut out = FrameOutput::default();
        let cell: Cell = geometry::cell_at_local(frame.to_local(world_point));
        let outcome = systems::shields::resolve_hit(&mut self.assembly, cell, damage, &mut out.events);
        (outcome, out)
    }

    // --- Hangar ---

    /// Open an edit session on a clone of the live assembly.
    pub fn begin_edit(&self) -> EditSession {
        EditSession::open(&self.assembly, self.inventory.clone())
    }

    /// Replace the live assembly with the session's draft.
    pub fn commit_edit(&mut self, session: EditSession) {
        let (draft, inventory) = session.into_parts();
        tracing::debug!(parts = draft.part_count(), "edit committed");
        self.assembly = draft;
        self.inventory = inventory;
        self.scheduler.reset();
    }

    pub fn set_inventory(&mut self, inventory: Inventory) {
        self.inventory = inventory;
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    // --- Accessors ---

    pub fn assembly(&self) -> &GridAssembly {
        &self.assembly
    }

    pub fn scheduler(&self) -> &WeaponScheduler {
        &self.scheduler
    }

    pub fn campaign_level(&self) -> u32 {
        self.campaign_level
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: ShipCommand) {
        match command {
            ShipCommand::PlacePart {
                x,
                y,
                part_id,
                rotation,
            } => {
                self.assembly.add_part(Cell::new(x, y), &part_id, rotation);
            }
            ShipCommand::RemovePart { x, y } => {
                self.assembly.remove_part(Cell::new(x, y));
            }
            ShipCommand::LoadBlueprint { blueprint } => {
                let (mut assembly, rejected) =
                    GridAssembly::from_blueprint(self.assembly.catalog_handle(), &blueprint);
                assembly.repair();
                if rejected > 0 {
                    tracing::warn!(rejected, "blueprint loaded with rejected parts");
                }
                self.assembly = assembly;
                self.scheduler.reset();
            }
            ShipCommand::SetCampaignLevel { level } => {
                self.campaign_level = level.max(1);
            }
        }
    }
}
