//! A creature composes one resource pool and one behavior state machine, plus
//! a position on the hex map.

use contracts::{BaseStats, BehaviorState, CreatureSnapshot, HexCoord, Mood};

use crate::behavior::{BehaviorStateMachine, BehaviorTunables};
use crate::events::EventHub;
use crate::movement::MovementService;
use crate::resource::ResourcePool;

#[derive(Debug, Clone)]
pub struct Creature {
    pub animal_id: String,
    pub species: String,
    pub position: HexCoord,
    pool: ResourcePool,
    machine: BehaviorStateMachine,
    tunables: BehaviorTunables,
}

impl Creature {
    pub fn new(
        animal_id: impl Into<String>,
        species: impl Into<String>,
        base: BaseStats,
        position: HexCoord,
        tunables: BehaviorTunables,
    ) -> Self {
        let animal_id = animal_id.into();
        Self {
            pool: ResourcePool::new(animal_id.clone(), base),
            machine: BehaviorStateMachine::new(),
            animal_id,
            species: species.into(),
            position,
            tunables,
        }
    }

    // --- Queries ---

    pub fn current_state(&self) -> BehaviorState {
        self.machine.current_state()
    }

    pub fn energy(&self) -> i64 {
        self.pool.energy()
    }

    pub fn max_energy(&self) -> i64 {
        self.pool.max_energy()
    }

    pub fn is_energy_low(&self) -> bool {
        self.pool.is_energy_low()
    }

    pub fn mood(&self) -> Mood {
        self.pool.mood()
    }

    pub fn effective_stat(&self, name: &str) -> f64 {
        self.pool.effective_stat(name)
    }

    pub fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.pool
    }

    pub fn snapshot(&self) -> CreatureSnapshot {
        CreatureSnapshot {
            animal_id: self.animal_id.clone(),
            species: self.species.clone(),
            position: self.position,
            state: self.current_state(),
            energy: self.energy(),
            max_energy: self.max_energy(),
            mood: self.mood(),
            low_energy: self.is_energy_low(),
        }
    }

    // --- Transitions ---

    pub fn transition_to(&mut self, new_state: BehaviorState, hub: &mut EventHub) -> bool {
        self.machine
            .transition_to(&self.animal_id, &self.pool, new_state, hub)
    }

    /// Externally-forced rest (energy depletion, combat defeat). Always a
    /// table-valid move since `Resting` is reachable from every state.
    pub fn force_rest(&mut self, hub: &mut EventHub) -> bool {
        self.machine
            .force_transition(&self.animal_id, &self.pool, BehaviorState::Resting, hub)
    }

    // --- Movement notifications ---

    pub fn on_movement_started(&mut self, hub: &mut EventHub) {
        if self.current_state() == BehaviorState::Idle {
            self.transition_to(BehaviorState::Walking, hub);
        }
    }

    pub fn on_movement_completed(&mut self, hub: &mut EventHub) {
        if self.current_state() == BehaviorState::Walking {
            self.transition_to(BehaviorState::Idle, hub);
        }
    }

    pub fn on_movement_cancelled(&mut self, hub: &mut EventHub) {
        self.on_movement_completed(hub);
    }

    // --- Tick ---

    pub fn tick(&mut self, movement: &dyn MovementService, delta_secs: f64, hub: &mut EventHub) {
        self.machine.tick(
            &self.animal_id,
            &mut self.pool,
            movement,
            &self.tunables,
            delta_secs,
            hub,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::ScriptedMovement;
    use contracts::EventKind;

    fn creature() -> (Creature, EventHub) {
        let base = BaseStats {
            speed: 4,
            strength: 3,
            max_energy: 6,
            starting_mood: Mood::Neutral,
        };
        let tunables = BehaviorTunables {
            energy_drain_rate: 1.0,
            energy_recovery_rate: 1.0 / 3.0,
            mood_penalty_interval_secs: 4.0,
            mood_improve_interval_secs: 6.0,
        };
        (
            Creature::new("animal_001", "fox", base, HexCoord::new(0, 0), tunables),
            EventHub::new(),
        )
    }

    #[test]
    fn walking_self_heals_when_motion_stops() {
        let (mut creature, mut hub) = creature();
        let movement = ScriptedMovement::new();
        movement.set_moving("animal_001", true);

        creature.on_movement_started(&mut hub);
        assert_eq!(creature.current_state(), BehaviorState::Walking);

        creature.tick(&movement, 1.0, &mut hub);
        assert_eq!(creature.current_state(), BehaviorState::Walking);

        movement.set_moving("animal_001", false);
        creature.tick(&movement, 1.0, &mut hub);
        assert_eq!(creature.current_state(), BehaviorState::Idle);
    }

    #[test]
    fn working_drains_energy_and_penalizes_mood_after_dwell() {
        let (mut creature, mut hub) = creature();
        let movement = ScriptedMovement::new();
        creature.transition_to(BehaviorState::Working, &mut hub);

        // 5 seconds at 1 energy/s: 6 -> 1, now low.
        for _ in 0..5 {
            creature.tick(&movement, 1.0, &mut hub);
        }
        assert_eq!(creature.energy(), 1);
        assert!(creature.is_energy_low());
        assert_eq!(creature.mood(), Mood::Neutral);

        // 4 more low-energy seconds reach the penalty interval.
        for _ in 0..4 {
            creature.tick(&movement, 1.0, &mut hub);
        }
        assert_eq!(creature.mood(), Mood::Sad);
    }

    #[test]
    fn resting_restores_energy_and_improves_mood() {
        let (mut creature, mut hub) = creature();
        let movement = ScriptedMovement::new();
        creature.pool_mut().deplete(6, &mut hub);
        creature.force_rest(&mut hub);

        for _ in 0..18 {
            creature.tick(&movement, 1.0, &mut hub);
        }
        assert_eq!(creature.energy(), 6);
        assert_eq!(creature.mood(), Mood::Happy);
        assert!(hub
            .journal()
            .iter()
            .any(|event| event.kind == EventKind::Resting));
    }

    #[test]
    fn movement_while_working_is_ignored() {
        let (mut creature, mut hub) = creature();
        creature.transition_to(BehaviorState::Working, &mut hub);
        creature.on_movement_started(&mut hub);
        assert_eq!(creature.current_state(), BehaviorState::Working);
    }
}
