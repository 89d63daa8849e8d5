//! End-to-end firing and assembly scenarios driven through the public API.

use std::sync::Arc;

use framebound_core::catalog::PartCatalog;
use framebound_core::commands::ShipCommand;
use framebound_core::events::{CombatEvent, FrameOutput};
use framebound_core::types::{Cell, Footprint, InstanceId, Rotation};
use framebound_sim::assembly::{GridAssembly, CORE_INSTANCE};
use framebound_sim::engine::{FrameInput, SimConfig, SimulationEngine};
use framebound_sim::fire_control::FirePhase;

const DT: f64 = 1.0 / 60.0;
const EPS: f64 = 1e-9;

fn catalog() -> Arc<PartCatalog> {
    let json = r#"[
        {"id": "core", "category": "core", "stats": {"hp": 50}},
        {"id": "hull", "category": "hull"},
        {"id": "pulse", "category": "weapon", "stats": {"weapon_group": "velocity", "cooldown": 1.0}},
        {"id": "wide_laser", "category": "weapon", "width": 2, "stats": {"weapon_group": "laser"}},
        {"id": "spinner", "category": "weapon", "height": 2, "stats": {
            "weapon_group": "velocity", "cooldown": 0.3,
            "ramp": {"max_level": 2.0, "rate": 0.5, "peak_duration": 5.0, "overheat_cooldown": 7.0}}},
        {"id": "lance", "category": "weapon", "height": 2, "stats": {
            "weapon_group": "velocity", "cooldown": 1.5, "charge_time": 1.0, "projectile": "railgun"}},
        {"id": "pod", "category": "weapon", "stats": {
            "weapon_group": "rocket", "cooldown": 2.0, "burst_count": 3, "burst_interval": 0.1}}
    ]"#;
    Arc::new(PartCatalog::from_json_str(json).unwrap())
}

fn engine() -> SimulationEngine {
    SimulationEngine::new(SimConfig::default(), catalog())
}

fn place(engine: &mut SimulationEngine, x: i32, y: i32, part_id: &str, rotation: Rotation) -> InstanceId {
    engine.queue_command(ShipCommand::PlacePart {
        x,
        y,
        part_id: part_id.to_string(),
        rotation,
    });
    engine.tick(FrameInput::firing(0.0, false));
    engine
        .assembly()
        .part_at(Cell::new(x, y))
        .map(|i| i.id)
        .expect("placement should succeed")
}

fn held(engine: &mut SimulationEngine) -> FrameOutput {
    engine.tick(FrameInput::firing(DT, true))
}

fn phase_of(engine: &SimulationEngine, id: InstanceId) -> FirePhase {
    engine
        .assembly()
        .instance(id)
        .and_then(|i| i.fire.as_ref())
        .map(|f| f.phase())
        .expect("weapon instance")
}

// ---- Scenario A: rotated footprint ----

#[test]
fn test_rotated_weapon_occupies_vertical_footprint() {
    let mut assembly = GridAssembly::new(catalog());
    let id = assembly
        .add_part(Cell::new(1, 0), "wide_laser", Rotation::R90)
        .unwrap();

    assert_eq!(assembly.instance(id).unwrap().footprint(), Footprint::new(1, 2));
    assert_eq!(assembly.occupant(Cell::new(1, 0)), Some(id));
    assert_eq!(assembly.occupant(Cell::new(1, 1)), Some(id));
    assert_eq!(assembly.occupant(Cell::new(2, 0)), None);
    assert_eq!(assembly.cell_count(), 3);
}

// ---- Scenario B: two identical weapons share one stagger cadence ----

#[test]
fn test_identical_weapons_stagger_within_group() {
    let mut engine = engine();
    let left = place(&mut engine, -1, 0, "pulse", Rotation::R0);
    let right = place(&mut engine, 1, 0, "pulse", Rotation::R0);

    let mut shot_frames: Vec<(InstanceId, u32)> = Vec::new();
    for frame in 1..=60u32 {
        let out = held(&mut engine);
        for spawn in &out.spawns {
            shot_frames.push((spawn.source, frame));
        }
        if frame == 1 {
            // First dispatch pushes the group timer out by min(0.2, 1.0 / 2).
            let timer = engine.scheduler().stagger_timer("pulse").unwrap();
            assert!((timer - (0.2 - DT)).abs() < EPS, "timer was {timer}");
        }
    }

    assert_eq!(shot_frames.len(), 2, "shots: {shot_frames:?}");
    assert_eq!(shot_frames[0], (left, 1));
    assert_eq!(shot_frames[1].0, right);

    let gap = (shot_frames[1].1 - shot_frames[0].1) as f64 * DT;
    assert!(gap >= 0.2 - DT - EPS && gap <= 0.2 + DT + EPS, "gap was {gap}");
}

// ---- Scenario C: ramp to peak, then overheat ----

#[test]
fn test_ramp_weapon_overheats_after_peak() {
    let mut engine = engine();
    let id = place(&mut engine, 1, 0, "spinner", Rotation::R0);

    let mut saw_peak = false;
    let mut overheat = None;
    for _ in 0..900 {
        let out = held(&mut engine);
        let fire = engine.assembly().instance(id).unwrap().fire.as_ref().unwrap();
        saw_peak |= fire.in_peak();
        if let Some(event) = out
            .events
            .iter()
            .find(|e| matches!(e, CombatEvent::Overheated { .. }))
        {
            overheat = Some(event.clone());
            break;
        }
    }

    assert!(saw_peak, "weapon never reached its peak");
    assert_eq!(
        overheat,
        Some(CombatEvent::Overheated {
            instance: id,
            cooldown_secs: 7.0
        })
    );

    let fire = engine.assembly().instance(id).unwrap().fire.as_ref().unwrap();
    assert_eq!(fire.ramp_level(), 0.0);
    assert!(!fire.in_peak());
    assert!((fire.cooldown_remaining() - (7.0 - DT)).abs() < EPS);

    // Overheated: silent for the next second despite the trigger.
    for _ in 0..60 {
        assert!(held(&mut engine).spawns.is_empty());
    }
}

// ---- Scenario D: charge weapon ----

#[test]
fn test_charge_weapon_fires_once_after_charging() {
    let mut engine = engine();
    let id = place(&mut engine, 1, 0, "lance", Rotation::R0);

    let first = held(&mut engine);
    assert!(first.spawns.is_empty());
    assert_eq!(
        first.events,
        vec![CombatEvent::ChargeStarted {
            instance: id,
            charge_secs: 1.0
        }]
    );

    let mut elapsed = 0.0;
    let fired = loop {
        let out = held(&mut engine);
        elapsed += DT;
        if !out.spawns.is_empty() {
            break out;
        }
        assert!(matches!(phase_of(&engine, id), FirePhase::Charging { .. }));
        assert!(elapsed < 1.5, "charge never completed");
    };

    assert!(elapsed >= 1.0 - EPS, "fired after only {elapsed}s of charge");
    assert_eq!(fired.spawns.len(), 1);
    assert!(fired.events.contains(&CombatEvent::ChargedShot { instance: id }));

    let fire = engine.assembly().instance(id).unwrap().fire.as_ref().unwrap();
    assert!(fire.charge_remaining().is_none());
    assert_eq!(fire.phase(), FirePhase::Cooldown { remaining: 1.5 });
}

// ---- Scenario E: removal discards firing state ----

#[test]
fn test_removal_discards_state_and_replacement_starts_fresh() {
    let mut engine = engine();
    let lance = place(&mut engine, 1, 0, "lance", Rotation::R0);
    held(&mut engine);
    assert!(matches!(phase_of(&engine, lance), FirePhase::Charging { .. }));

    engine.queue_command(ShipCommand::RemovePart { x: 1, y: 1 });
    engine.tick(FrameInput::firing(0.0, false));
    assert!(engine.assembly().instance(lance).is_none());
    assert_eq!(engine.assembly().occupant(Cell::new(1, 0)), None);
    assert_eq!(engine.assembly().occupant(Cell::new(1, 1)), None);

    let spinner = place(&mut engine, 1, 0, "spinner", Rotation::R0);
    assert_ne!(spinner, lance);
    assert_eq!(engine.assembly().occupant(Cell::new(1, 1)), Some(spinner));
    let fire = engine.assembly().instance(spinner).unwrap().fire.as_ref().unwrap();
    assert_eq!(fire.phase(), FirePhase::Idle);
    assert_eq!(fire.ramp_level(), 0.0);
    assert!(fire.charge_remaining().is_none());
    assert_eq!(fire.burst_left(), 0);

    // Fires immediately: no leftover charge from the lance.
    let out = held(&mut engine);
    assert_eq!(out.shots_from(spinner), 1);
}

#[test]
fn test_removal_mid_burst_drops_remaining_shots() {
    let mut engine = engine();
    let pod = place(&mut engine, 1, 0, "pod", Rotation::R0);
    held(&mut engine);
    assert!(matches!(phase_of(&engine, pod), FirePhase::Bursting { .. }));
    let left = engine.assembly().instance(pod).unwrap().fire.as_ref().unwrap().burst_left();
    assert!(left > 0);

    engine.queue_command(ShipCommand::RemovePart { x: 1, y: 0 });
    engine.tick(FrameInput::firing(0.0, false));
    assert!(engine.assembly().instance(pod).is_none());

    // The unfinished burst dies with the part.
    for _ in 0..60 {
        let out = engine.tick(FrameInput::firing(DT, false));
        assert!(out.spawns.is_empty());
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::BurstShot { .. })));
    }

    let replacement = place(&mut engine, 1, 0, "pod", Rotation::R0);
    assert_ne!(replacement, pod);
    assert_eq!(phase_of(&engine, replacement), FirePhase::Idle);
    let fire = engine.assembly().instance(replacement).unwrap().fire.as_ref().unwrap();
    assert_eq!(fire.burst_left(), 0);
    assert_eq!(fire.cooldown_remaining(), 0.0);
}

#[test]
fn test_removal_at_peak_resets_ramp() {
    let mut engine = engine();
    let spinner = place(&mut engine, 1, 0, "spinner", Rotation::R0);

    let mut frames = 0;
    while !engine.assembly().instance(spinner).unwrap().fire.as_ref().unwrap().in_peak() {
        held(&mut engine);
        frames += 1;
        assert!(frames < 900, "weapon never reached its peak");
    }

    engine.queue_command(ShipCommand::RemovePart { x: 1, y: 1 });
    engine.tick(FrameInput::firing(0.0, false));
    assert!(engine.assembly().instance(spinner).is_none());

    let replacement = place(&mut engine, 1, 0, "spinner", Rotation::R0);
    assert_ne!(replacement, spinner);
    let fire = engine.assembly().instance(replacement).unwrap().fire.as_ref().unwrap();
    assert_eq!(fire.phase(), FirePhase::Idle);
    assert_eq!(fire.ramp_level(), 0.0);
    assert!(!fire.in_peak());

    // The old peak timer cannot expire into an overheat on the new part.
    for _ in 0..360 {
        let out = engine.tick(FrameInput::firing(DT, false));
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::Overheated { .. })));
    }
    assert_eq!(phase_of(&engine, replacement), FirePhase::Idle);
}

// ---- Bursts ----

#[test]
fn test_burst_runs_to_completion_after_release() {
    let mut engine = engine();
    let pod = place(&mut engine, 1, 0, "pod", Rotation::R0);

    let mut burst_shots = Vec::new();
    let first = held(&mut engine);
    burst_shots.extend(first.events);
    for _ in 0..60 {
        let out = engine.tick(FrameInput::firing(DT, false));
        burst_shots.extend(out.events);
    }

    let remaining: Vec<u32> = burst_shots
        .iter()
        .filter_map(|e| match e {
            CombatEvent::BurstShot { instance, remaining } if *instance == pod => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(remaining, vec![2, 1, 0]);
}

#[test]
fn test_core_survives_any_removal() {
    let mut engine = engine();
    engine.queue_command(ShipCommand::RemovePart { x: 0, y: 0 });
    engine.tick(FrameInput::firing(DT, false));
    assert_eq!(engine.assembly().occupant(Cell::ORIGIN), Some(CORE_INSTANCE));
}
