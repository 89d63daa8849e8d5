//! Per-weapon firing state machine.
//!
//! Every mounted weapon owns one `FireControl`. The main phase is a single
//! tagged value, so a weapon can never be charging and bursting at once.
//! Spin-up weapons additionally carry a `RampState` that runs alongside
//! the phase.

use framebound_core::catalog::{PartDefinition, RampProfile};
use framebound_core::constants::RAMP_SPIN_DOWN_RATE;

/// Main firing phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FirePhase {
    /// Ready to fire (or, for charge weapons, to start charging).
    #[default]
    Idle,
    /// Waiting out the cooldown charged by the last shot.
    Cooldown { remaining: f64 },
    /// Accumulating charge; no shot until it completes.
    Charging { remaining: f64 },
    /// Fully charged; the next dispatch fires.
    ChargedReady,
    /// Emitting a burst. The shot cooldown keeps running underneath.
    Bursting { left: u32, timer: f64, cooldown: f64 },
}

/// Spin-up progress of a ramp-capable weapon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampState {
    pub profile: RampProfile,
    /// Current ramp level, 0..=profile.max_level.
    pub level: f64,
    /// Seconds left in the peak; 0 outside it.
    pub peak_remaining: f64,
}

impl RampState {
    pub fn new(profile: RampProfile) -> Self {
        Self {
            profile,
            level: 0.0,
            peak_remaining: 0.0,
        }
    }

    pub fn in_peak(&self) -> bool {
        self.peak_remaining > 0.0
    }
}

/// Dispatch eligibility, as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    /// Cooldown elapsed.
    Ready,
    /// Charge complete; preferred over `Ready`.
    Charged,
}

/// What one dispatch should do, resolved by the caller from the definition
/// and the assembly-wide multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchPlan {
    /// `Some` for charge weapons.
    pub charge_time: Option<f64>,
    /// Cooldown charged after the shot.
    pub cooldown: f64,
    /// Total burst shots; 0 or 1 fires a single immediate shot.
    pub burst_shots: u32,
}

/// Result of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchOutcome {
    /// Charging began; no shot this dispatch.
    ChargeStarted { charge_secs: f64 },
    /// One shot fired now.
    Fired { charged: bool },
    /// A burst began; shots come from `advance_burst`.
    BurstStarted { shots: u32, charged: bool },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FireControl {
    phase: FirePhase,
    ramp: Option<RampState>,
}

impl FireControl {
    /// Fresh state for a weapon definition; `None` for non-weapons.
    pub fn for_definition(def: &PartDefinition) -> Option<Self> {
        if !def.is_weapon() {
            return None;
        }
        Some(Self {
            phase: FirePhase::Idle,
            ramp: def.stats.ramp.map(RampState::new),
        })
    }

    pub fn phase(&self) -> FirePhase {
        self.phase
    }

    pub fn ramp(&self) -> Option<&RampState> {
        self.ramp.as_ref()
    }

    pub fn ramp_level(&self) -> f64 {
        self.ramp.map_or(0.0, |r| r.level)
    }

    pub fn in_peak(&self) -> bool {
        self.ramp.is_some_and(|r| r.in_peak())
    }

    /// Remaining shot cooldown, 0 when none is pending.
    pub fn cooldown_remaining(&self) -> f64 {
        match self.phase {
            FirePhase::Cooldown { remaining } => remaining,
            FirePhase::Bursting { cooldown, .. } => cooldown.max(0.0),
            _ => 0.0,
        }
    }

    /// Remaining charge while charging.
    pub fn charge_remaining(&self) -> Option<f64> {
        match self.phase {
            FirePhase::Charging { remaining } => Some(remaining),
            _ => None,
        }
    }

    pub fn burst_left(&self) -> u32 {
        match self.phase {
            FirePhase::Bursting { left, .. } => left,
            _ => 0,
        }
    }

    /// Cooldown a shot would charge right now: base shortened by the ramp
    /// level and the fire-rate multiplier.
    pub fn effective_cooldown(&self, base: f64, fire_rate_multiplier: f64) -> f64 {
        let ramp_factor = 1.0 + self.ramp_level();
        base / ramp_factor / fire_rate_multiplier
    }

    /// Advance timers by `dt`. Returns the forced cooldown if the weapon
    /// overheated on this tick.
    pub fn advance(&mut self, dt: f64, trigger_held: bool) -> Option<f64> {
        let mut overheat = None;

        if let Some(ramp) = self.ramp.as_mut() {
            if ramp.in_peak() {
                ramp.peak_remaining -= dt;
                if ramp.peak_remaining <= 0.0 {
                    ramp.peak_remaining = 0.0;
                    ramp.level = 0.0;
                    overheat = Some(ramp.profile.overheat_cooldown);
                }
            }
            if !trigger_held && !ramp.in_peak() {
                ramp.level = (ramp.level - dt * RAMP_SPIN_DOWN_RATE).max(0.0);
            }
        }

        if let Some(secs) = overheat {
            self.force_cooldown(secs);
        }

        self.phase = match self.phase {
            FirePhase::Charging { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    FirePhase::ChargedReady
                } else {
                    FirePhase::Charging { remaining }
                }
            }
            FirePhase::Cooldown { remaining } => cooldown_phase(remaining - dt),
            FirePhase::Bursting {
                left,
                timer,
                cooldown,
            } => FirePhase::Bursting {
                left,
                timer,
                cooldown: cooldown - dt,
            },
            phase => phase,
        };

        overheat
    }

    /// Replace any pending cooldown, keeping an in-flight burst alive.
    pub fn force_cooldown(&mut self, secs: f64) {
        self.phase = match self.phase {
            FirePhase::Bursting { left, timer, .. } => FirePhase::Bursting {
                left,
                timer,
                cooldown: secs,
            },
            _ => FirePhase::Cooldown { remaining: secs },
        };
    }

    pub fn readiness(&self, is_charge_weapon: bool) -> Readiness {
        match self.phase {
            FirePhase::ChargedReady => Readiness::Charged,
            FirePhase::Idle => Readiness::Ready,
            FirePhase::Bursting { cooldown, .. } if cooldown <= 0.0 && !is_charge_weapon => {
                Readiness::Ready
            }
            _ => Readiness::NotReady,
        }
    }

    /// Dispatch the weapon. Charge weapons that are not yet charged start
    /// charging instead of firing.
    pub fn dispatch(&mut self, plan: DispatchPlan) -> DispatchOutcome {
        let charged = self.phase == FirePhase::ChargedReady;
        if !charged {
            if let Some(charge_secs) = plan.charge_time {
                self.phase = FirePhase::Charging {
                    remaining: charge_secs,
                };
                return DispatchOutcome::ChargeStarted { charge_secs };
            }
        }

        if let Some(ramp) = self.ramp.as_mut() {
            if !ramp.in_peak() {
                ramp.level = (ramp.level + ramp.profile.rate).min(ramp.profile.max_level);
                if ramp.level >= ramp.profile.max_level {
                    ramp.peak_remaining = ramp.profile.peak_duration;
                }
            }
        }

        if plan.burst_shots > 1 {
            self.phase = FirePhase::Bursting {
                left: plan.burst_shots,
                timer: 0.0,
                cooldown: plan.cooldown,
            };
            DispatchOutcome::BurstStarted {
                shots: plan.burst_shots,
                charged,
            }
        } else {
            self.phase = cooldown_phase(plan.cooldown);
            DispatchOutcome::Fired { charged }
        }
    }

    /// Advance an active burst. Returns the shots still owed after this
    /// one whenever a burst shot is due this tick.
    pub fn advance_burst(&mut self, dt: f64, interval: f64) -> Option<u32> {
        let FirePhase::Bursting {
            left,
            timer,
            cooldown,
        } = self.phase
        else {
            return None;
        };

        let timer = timer - dt;
        if timer > 0.0 {
            self.phase = FirePhase::Bursting {
                left,
                timer,
                cooldown,
            };
            return None;
        }

        let left = left.saturating_sub(1);
        self.phase = if left == 0 {
            cooldown_phase(cooldown)
        } else {
            FirePhase::Bursting {
                left,
                timer: interval,
                cooldown,
            }
        };
        Some(left)
    }
}

fn cooldown_phase(remaining: f64) -> FirePhase {
    if remaining > 0.0 {
        FirePhase::Cooldown { remaining }
    } else {
        FirePhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use framebound_core::catalog::PartCatalog;

    use super::*;

    fn weapon(id: &str) -> FireControl {
        let catalog = PartCatalog::standard();
        FireControl::for_definition(catalog.get(id).unwrap()).unwrap()
    }

    fn plan(cooldown: f64) -> DispatchPlan {
        DispatchPlan {
            charge_time: None,
            cooldown,
            burst_shots: 0,
        }
    }

    #[test]
    fn test_non_weapons_have_no_fire_control() {
        let catalog = PartCatalog::standard();
        assert!(FireControl::for_definition(catalog.get("hull").unwrap()).is_none());
        assert!(FireControl::for_definition(catalog.get("shield").unwrap()).is_none());
    }

    #[test]
    fn test_cooldown_counts_down_to_idle() {
        let mut fc = weapon("gun_basic");
        assert_eq!(fc.readiness(false), Readiness::Ready);

        assert_eq!(fc.dispatch(plan(0.5)), DispatchOutcome::Fired { charged: false });
        assert_eq!(fc.readiness(false), Readiness::NotReady);

        fc.advance(0.3, true);
        assert!((fc.cooldown_remaining() - 0.2).abs() < 1e-9);
        fc.advance(0.3, true);
        assert_eq!(fc.phase(), FirePhase::Idle);
        assert_eq!(fc.readiness(false), Readiness::Ready);
    }

    #[test]
    fn test_charge_cycle() {
        let mut fc = weapon("railgun");
        let charge = DispatchPlan {
            charge_time: Some(1.0),
            cooldown: 1.5,
            burst_shots: 0,
        };

        assert_eq!(
            fc.dispatch(charge),
            DispatchOutcome::ChargeStarted { charge_secs: 1.0 }
        );
        assert_eq!(fc.readiness(true), Readiness::NotReady);

        fc.advance(0.6, true);
        assert!((fc.charge_remaining().unwrap() - 0.4).abs() < 1e-9);
        fc.advance(0.4, true);
        assert_eq!(fc.phase(), FirePhase::ChargedReady);
        assert_eq!(fc.readiness(true), Readiness::Charged);

        assert_eq!(fc.dispatch(charge), DispatchOutcome::Fired { charged: true });
        assert_eq!(fc.phase(), FirePhase::Cooldown { remaining: 1.5 });
        assert!(fc.charge_remaining().is_none());
    }

    #[test]
    fn test_ramp_reaches_peak_then_overheats() {
        let mut fc = weapon("minigun");
        let profile = fc.ramp().unwrap().profile;
        let shots_to_peak = (profile.max_level / profile.rate).ceil() as usize;

        for _ in 0..shots_to_peak {
            assert!(!fc.in_peak());
            fc.dispatch(plan(0.01));
        }
        assert!(fc.in_peak());
        assert!((fc.ramp_level() - profile.max_level).abs() < 1e-9);

        // Firing during the peak does not extend it.
        fc.advance(1.0, true);
        fc.dispatch(plan(0.01));
        assert!((fc.ramp().unwrap().peak_remaining - (profile.peak_duration - 1.0)).abs() < 1e-9);

        let overheat = fc.advance(profile.peak_duration, true);
        assert_eq!(overheat, Some(profile.overheat_cooldown));
        assert_eq!(fc.ramp_level(), 0.0);
        assert!(!fc.in_peak());
        // Forced cooldown already ticked by this frame's dt.
        assert!(
            (fc.cooldown_remaining() - (profile.overheat_cooldown - profile.peak_duration)).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_ramp_spins_down_when_released() {
        let mut fc = weapon("minigun");
        fc.dispatch(plan(0.01));
        fc.dispatch(plan(0.01));
        assert!((fc.ramp_level() - 1.0).abs() < 1e-9);

        // Held trigger: no decay.
        fc.advance(0.1, true);
        assert!((fc.ramp_level() - 1.0).abs() < 1e-9);

        fc.advance(0.25, false);
        assert!((fc.ramp_level() - 0.5).abs() < 1e-9);
        fc.advance(10.0, false);
        assert_eq!(fc.ramp_level(), 0.0);
    }

    #[test]
    fn test_ramp_shortens_cooldown() {
        let mut fc = weapon("minigun");
        assert!((fc.effective_cooldown(0.3, 1.0) - 0.3).abs() < 1e-9);
        fc.dispatch(plan(0.01));
        fc.dispatch(plan(0.01));
        // level 1.0 -> factor 2
        assert!((fc.effective_cooldown(0.3, 1.5) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_burst_emits_on_interval() {
        let mut fc = weapon("rocket_pod");
        let outcome = fc.dispatch(DispatchPlan {
            charge_time: None,
            cooldown: 2.0,
            burst_shots: 3,
        });
        assert_eq!(
            outcome,
            DispatchOutcome::BurstStarted {
                shots: 3,
                charged: false
            }
        );

        // Timer starts at zero: first shot on the same tick.
        assert_eq!(fc.advance_burst(0.016, 0.1), Some(2));
        assert_eq!(fc.advance_burst(0.05, 0.1), None);
        assert_eq!(fc.advance_burst(0.05, 0.1), Some(1));
        assert_eq!(fc.advance_burst(0.1, 0.1), Some(0));
        assert!(matches!(fc.phase(), FirePhase::Cooldown { .. }));
        assert_eq!(fc.advance_burst(0.1, 0.1), None);
    }

    #[test]
    fn test_cooldown_runs_under_burst() {
        let mut fc = weapon("rocket_pod");
        fc.dispatch(DispatchPlan {
            charge_time: None,
            cooldown: 0.2,
            burst_shots: 5,
        });
        assert_eq!(fc.readiness(false), Readiness::NotReady);
        fc.advance(0.25, true);
        assert_eq!(fc.burst_left(), 5);
        assert_eq!(fc.readiness(false), Readiness::Ready);
        assert_eq!(fc.readiness(true), Readiness::NotReady);
    }

    #[test]
    fn test_overheat_keeps_burst_alive() {
        let mut fc = weapon("rocket_pod");
        fc.dispatch(DispatchPlan {
            charge_time: None,
            cooldown: 0.5,
            burst_shots: 2,
        });
        fc.force_cooldown(3.0);
        assert_eq!(fc.burst_left(), 2);
        assert!((fc.cooldown_remaining() - 3.0).abs() < 1e-9);
    }
}
