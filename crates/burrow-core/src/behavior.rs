//! Behavior state machine: guarded transitions, enter/exit hooks, and the
//! per-state tick logic that drains or restores the resource pool.

use contracts::{BehaviorState, EventKind, SimConfig};
use serde_json::json;

use crate::events::EventHub;
use crate::movement::MovementService;
use crate::resource::ResourcePool;

/// The valid transition table. Same-state moves are handled by the caller;
/// anything not listed here is rejected.
pub fn transition_allowed(from: BehaviorState, to: BehaviorState) -> bool {
    use BehaviorState::{Idle, Resting, Walking, Working};
    matches!(
        (from, to),
        (Idle, Walking | Working | Resting)
            | (Walking, Idle | Resting)
            | (Working, Idle | Resting)
            | (Resting, Idle)
    )
}

/// Tunable rates and intervals for the per-state tick logic.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorTunables {
    pub energy_drain_rate: f64,
    pub energy_recovery_rate: f64,
    pub mood_penalty_interval_secs: f64,
    pub mood_improve_interval_secs: f64,
}

impl From<&SimConfig> for BehaviorTunables {
    fn from(config: &SimConfig) -> Self {
        Self {
            energy_drain_rate: config.energy_drain_rate,
            energy_recovery_rate: config.energy_recovery_rate,
            mood_penalty_interval_secs: config.mood_penalty_interval_secs,
            mood_improve_interval_secs: config.mood_improve_interval_secs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BehaviorStateMachine {
    state: BehaviorState,
    /// Continuous low-energy time while working; gates the mood penalty.
    work_low_dwell: f64,
    /// Continuous resting time; gates the mood improvement.
    rest_dwell: f64,
    /// Fractional energy drained/restored but not yet applied as whole points.
    drain_accum: f64,
    recover_accum: f64,
}

impl Default for BehaviorStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorStateMachine {
    pub fn new() -> Self {
        Self {
            state: BehaviorState::Idle,
            work_low_dwell: 0.0,
            rest_dwell: 0.0,
            drain_accum: 0.0,
            recover_accum: 0.0,
        }
    }

    pub fn current_state(&self) -> BehaviorState {
        self.state
    }

    /// Guarded transition. Same-state and table-rejected targets are silent
    /// no-ops; a successful transition runs the outgoing exit hook, swaps the
    /// state, runs the incoming enter hook, then publishes the local/global
    /// `state_changed` pair.
    pub fn transition_to(
        &mut self,
        animal_id: &str,
        pool: &ResourcePool,
        new_state: BehaviorState,
        hub: &mut EventHub,
    ) -> bool {
        if new_state == self.state || !transition_allowed(self.state, new_state) {
            return false;
        }
        let old_state = self.state;
        self.run_exit_hook(animal_id, pool, hub);
        self.state = new_state;
        self.run_enter_hook(animal_id, hub);

        hub.publish_local(
            animal_id,
            EventKind::StateChanged,
            Some(json!({ "from": old_state.label(), "to": new_state.label() })),
        );
        hub.publish_global(
            EventKind::StateChanged,
            Some(animal_id),
            Some(json!({ "state": new_state.label() })),
        );
        true
    }

    /// Override entry point for externally-forced transitions (combat defeat,
    /// energy depletion). Still validated against the table; `Resting` is
    /// reachable from every state, so forcing rest always succeeds.
    pub fn force_transition(
        &mut self,
        animal_id: &str,
        pool: &ResourcePool,
        new_state: BehaviorState,
        hub: &mut EventHub,
    ) -> bool {
        self.transition_to(animal_id, pool, new_state, hub)
    }

    fn run_exit_hook(&mut self, animal_id: &str, pool: &ResourcePool, hub: &mut EventHub) {
        match self.state {
            BehaviorState::Resting => {
                // Interrupted rest that leaves energy partial does not
                // announce recovery.
                if pool.is_full() {
                    hub.publish_global(EventKind::Recovered, Some(animal_id), None);
                }
                self.rest_dwell = 0.0;
                self.recover_accum = 0.0;
            }
            BehaviorState::Working => {
                self.work_low_dwell = 0.0;
                self.drain_accum = 0.0;
            }
            BehaviorState::Idle | BehaviorState::Walking => {}
        }
    }

    fn run_enter_hook(&mut self, animal_id: &str, hub: &mut EventHub) {
        match self.state {
            BehaviorState::Resting => {
                self.rest_dwell = 0.0;
                self.recover_accum = 0.0;
                hub.publish_global(EventKind::Resting, Some(animal_id), None);
            }
            BehaviorState::Working => {
                self.work_low_dwell = 0.0;
                self.drain_accum = 0.0;
            }
            BehaviorState::Idle | BehaviorState::Walking => {}
        }
    }

    /// Per-tick update for the current state. Runs to completion; dwell
    /// timers carry across ticks.
    pub fn tick(
        &mut self,
        animal_id: &str,
        pool: &mut ResourcePool,
        movement: &dyn MovementService,
        tunables: &BehaviorTunables,
        delta_secs: f64,
        hub: &mut EventHub,
    ) {
        if delta_secs <= 0.0 {
            return;
        }
        match self.state {
            BehaviorState::Idle => {}
            BehaviorState::Walking => {
                // Self-heal: movement may end without an explicit
                // completion/cancellation notification.
                if !movement.is_moving(animal_id) {
                    self.transition_to(animal_id, pool, BehaviorState::Idle, hub);
                }
            }
            BehaviorState::Working => {
                self.drain_accum += delta_secs * tunables.energy_drain_rate;
                let points = self.drain_accum.floor() as i64;
                if points > 0 {
                    self.drain_accum -= points as f64;
                    pool.deplete(points, hub);
                }
                if pool.is_energy_low() {
                    self.work_low_dwell += delta_secs;
                    if self.work_low_dwell >= tunables.mood_penalty_interval_secs {
                        pool.decrease_mood(hub);
                        self.work_low_dwell = 0.0;
                    }
                } else {
                    // Energy restored above the threshold mid-work resets
                    // the dwell timer.
                    self.work_low_dwell = 0.0;
                }
            }
            BehaviorState::Resting => {
                self.recover_accum += delta_secs * tunables.energy_recovery_rate;
                let points = self.recover_accum.floor() as i64;
                if points > 0 {
                    self.recover_accum -= points as f64;
                    pool.restore(points, hub);
                }
                self.rest_dwell += delta_secs;
                if self.rest_dwell >= tunables.mood_improve_interval_secs {
                    pool.increase_mood(hub);
                    self.rest_dwell = 0.0;
                }
            }
        }
    }
}
