//! Weapon scheduler: groups weapons by definition and staggers their shots.
//!
//! Each frame every weapon's fire control is advanced, weapons sharing a
//! definition id are dispatched round-robin at a group cadence, and active
//! bursts are run out independently of the trigger.

use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use framebound_core::catalog::PartDefinition;
use framebound_core::constants::*;
use framebound_core::enums::{OwnerTag, WeaponGroup};
use framebound_core::events::{CombatEvent, FrameOutput, SpawnRequest};
use framebound_core::types::InstanceId;

use crate::assembly::{AggregateStats, GridAssembly, MountedInstance};
use crate::fire_control::{DispatchOutcome, DispatchPlan, Readiness};
use crate::geometry::{self, AimTarget, Frame};

/// Per-frame inputs to the scheduler.
#[derive(Debug, Clone, Copy)]
pub struct FireInput {
    pub dt: f64,
    pub trigger_held: bool,
    pub frame: Frame,
    pub aim: AimTarget,
    pub campaign_level: u32,
    pub owner: OwnerTag,
}

/// Assembly-wide multipliers, derived once per frame.
#[derive(Debug, Clone, Copy)]
struct Modifiers {
    level_bonus: f64,
    accelerant_count: u32,
    rocket_bay_count: u32,
}

impl Modifiers {
    fn new(stats: &AggregateStats, campaign_level: u32) -> Self {
        Self {
            level_bonus: level_bonus(campaign_level),
            accelerant_count: stats.accelerant_count,
            rocket_bay_count: stats.rocket_bay_count,
        }
    }

    fn fire_rate_multiplier(&self, def: &PartDefinition) -> f64 {
        let accelerant = if def.stats.weapon_group == Some(WeaponGroup::Laser) {
            1.0 + self.accelerant_count as f64 * ACCELERANT_BONUS_PER_CELL
        } else {
            1.0
        };
        self.level_bonus * accelerant
    }

    fn burst_shots(&self, def: &PartDefinition) -> u32 {
        let base = def.stats.burst_count;
        if def.stats.weapon_group == Some(WeaponGroup::Rocket)
            && (base > 0 || self.rocket_bay_count > 0)
        {
            base.max(1) + self.rocket_bay_count
        } else {
            base
        }
    }

    fn burst_interval(&self, def: &PartDefinition) -> f64 {
        let interval = def.stats.burst_interval();
        if def.stats.weapon_group == Some(WeaponGroup::Rocket) && self.rocket_bay_count > 0 {
            interval / (1.0 + self.rocket_bay_count as f64)
        } else {
            interval
        }
    }
}

/// Weapons sharing one definition id this frame.
struct WeaponClass {
    part_id: String,
    /// Members in insertion order, with the cooldown each would charge.
    members: Vec<(InstanceId, f64)>,
    min_cooldown: f64,
}

impl WeaponClass {
    /// Minimum time between dispatches within the group.
    fn stagger_interval(&self) -> f64 {
        let count = self.members.len().max(1) as f64;
        (self.min_cooldown / count).min(MAX_STAGGER_INTERVAL)
    }
}

/// Persistent per-group stagger timers.
#[derive(Debug, Clone, Default)]
pub struct WeaponScheduler {
    stagger: HashMap<String, f64>,
}

impl WeaponScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stagger timer of a weapon class, if that class was present last frame.
    pub fn stagger_timer(&self, part_id: &str) -> Option<f64> {
        self.stagger.get(part_id).copied()
    }

    /// Forget every group timer (a new layout was loaded).
    pub fn reset(&mut self) {
        self.stagger.clear();
    }

    /// Run one frame. Spawn requests and events are appended to `out`.
    pub fn run(
        &mut self,
        assembly: &mut GridAssembly,
        input: &FireInput,
        rng: &mut ChaCha8Rng,
        out: &mut FrameOutput,
    ) {
        if input.dt <= 0.0 {
            return;
        }
        let catalog = assembly.catalog_handle();
        let mods = Modifiers::new(assembly.stats(), input.campaign_level);

        // Step 1: advance every weapon and partition by definition id
        let mut classes: Vec<WeaponClass> = Vec::new();
        let mut class_index: HashMap<String, usize> = HashMap::new();
        for instance in assembly.instances_mut() {
            let Some(def) = catalog.get(&instance.part_id) else {
                continue;
            };
            let Some(fire) = instance.fire.as_mut() else {
                continue;
            };

            if let Some(cooldown_secs) = fire.advance(input.dt, input.trigger_held) {
                tracing::debug!(part = %instance.part_id, instance = instance.id.0, cooldown_secs, "weapon overheated");
                out.events.push(CombatEvent::Overheated {
                    instance: instance.id,
                    cooldown_secs,
                });
            }

            let cooldown = fire.effective_cooldown(def.stats.cooldown(), mods.fire_rate_multiplier(def));
            let idx = *class_index.entry(instance.part_id.clone()).or_insert_with(|| {
                classes.push(WeaponClass {
                    part_id: instance.part_id.clone(),
                    members: Vec::new(),
                    min_cooldown: f64::INFINITY,
                });
                classes.len() - 1
            });
            let class = &mut classes[idx];
            class.members.push((instance.id, cooldown));
            class.min_cooldown = class.min_cooldown.min(cooldown);
        }

        // Step 2: groups that vanished lose their timer; new groups start at 0
        self.stagger.retain(|part_id, _| class_index.contains_key(part_id));
        for class in &classes {
            self.stagger.entry(class.part_id.clone()).or_insert(0.0);
        }

        // Step 3: staggered dispatch
        if input.trigger_held {
            for class in &classes {
                let timer = self.stagger.entry(class.part_id.clone()).or_insert(0.0);
                *timer -= input.dt;
                dispatch_class(assembly, class, timer, &mods, input, rng, out);
            }
        } else {
            for timer in self.stagger.values_mut() {
                *timer = timer.max(0.0);
            }
        }

        // Step 4: bursts run to completion regardless of the trigger
        for instance in assembly.instances_mut() {
            let Some(def) = catalog.get(&instance.part_id) else {
                continue;
            };
            let Some(fire) = instance.fire.as_mut() else {
                continue;
            };
            if let Some(remaining) = fire.advance_burst(input.dt, mods.burst_interval(def)) {
                emit_shot(instance, def, input, rng, out);
                out.events.push(CombatEvent::BurstShot {
                    instance: instance.id,
                    remaining,
                });
            }
        }
    }
}

/// Dispatch one class while its stagger timer is due.
///
/// At most one dispatch happens per stagger interval, capped at
/// `MAX_DISPATCHES_PER_GROUP` per frame.
fn dispatch_class(
    assembly: &mut GridAssembly,
    class: &WeaponClass,
    timer: &mut f64,
    mods: &Modifiers,
    input: &FireInput,
    rng: &mut ChaCha8Rng,
    out: &mut FrameOutput,
) {
    let catalog = assembly.catalog_handle();
    let Some(def) = catalog.get(&class.part_id) else {
        return;
    };
    let is_charge = def.is_charge_weapon();
    let interval = class.stagger_interval();

    for _ in 0..MAX_DISPATCHES_PER_GROUP {
        if *timer > 0.0 {
            return;
        }
        let Some((id, cooldown)) = pick_ready(assembly, class, is_charge) else {
            *timer = timer.max(0.0);
            return;
        };
        let Some(instance) = assembly.instance_mut(id) else {
            return;
        };
        let Some(fire) = instance.fire.as_mut() else {
            return;
        };

        let outcome = fire.dispatch(DispatchPlan {
            charge_time: def.stats.charge_time(),
            cooldown,
            burst_shots: mods.burst_shots(def),
        });
        match outcome {
            DispatchOutcome::ChargeStarted { charge_secs } => {
                tracing::debug!(part = %class.part_id, instance = id.0, charge_secs, "charge started");
                out.events.push(CombatEvent::ChargeStarted {
                    instance: id,
                    charge_secs,
                });
                // Charging yields the group for this frame.
                return;
            }
            DispatchOutcome::Fired { charged } => {
                let pellets = emit_shot(instance, def, input, rng, out);
                out.events.push(if charged {
                    CombatEvent::ChargedShot { instance: id }
                } else {
                    CombatEvent::WeaponFired {
                        instance: id,
                        pellets,
                    }
                });
            }
            DispatchOutcome::BurstStarted { shots, charged } => {
                tracing::trace!(part = %class.part_id, instance = id.0, shots, charged, "burst started");
            }
        }
        *timer += interval;
    }

    if *timer <= 0.0 {
        tracing::debug!(part = %class.part_id, "dispatch cap reached");
    }
}

/// First ready member in insertion order, preferring a charged one.
fn pick_ready(assembly: &GridAssembly, class: &WeaponClass, is_charge: bool) -> Option<(InstanceId, f64)> {
    let mut first_ready = None;
    for &(id, cooldown) in &class.members {
        let Some(fire) = assembly.instance(id).and_then(|i| i.fire.as_ref()) else {
            continue;
        };
        match fire.readiness(is_charge) {
            Readiness::Charged => return Some((id, cooldown)),
            Readiness::Ready if first_ready.is_none() => first_ready = Some((id, cooldown)),
            _ => {}
        }
    }
    first_ready
}

/// Emit one shot's pellets. Returns the pellet count.
fn emit_shot(
    instance: &MountedInstance,
    def: &PartDefinition,
    input: &FireInput,
    rng: &mut ChaCha8Rng,
    out: &mut FrameOutput,
) -> u32 {
    let pose = geometry::muzzle_pose(
        &input.frame,
        instance.origin,
        instance.footprint(),
        def.muzzle_offset,
        input.aim,
    );
    let stats = &def.stats;
    let count = stats.pellet_count();

    for i in 0..count {
        let jitter = if stats.spread > 0.0 {
            (rng.gen::<f64>() - 0.5) * stats.spread
        } else {
            0.0
        };
        let pellet_delay = if stats.pellet_interval > 0.0 {
            i as f64 * stats.pellet_interval * (0.5 + rng.gen::<f64>())
        } else {
            0.0
        };
        out.spawns.push(SpawnRequest {
            source: instance.id,
            position: pose.muzzle + geometry::barrel_offset(pose.heading, i, count, stats.barrel_spacing),
            heading: pose.heading + jitter,
            archetype: stats.projectile,
            speed: stats.projectile_speed(),
            owner: input.owner,
            damage: stats.damage(),
            pellet_delay,
        });
    }
    count
}
