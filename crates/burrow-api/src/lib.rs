//! In-process API facade over the village kernel plus an HTTP control
//! surface. Every mutating call goes through [`EngineApi`], which keeps an
//! audit trail of submitted commands alongside the kernel's event journal.

mod server;

use burrow_core::VillageWorld;
use contracts::{
    BehaviorState, CombatReport, CreatureSnapshot, Event, HexCoord, RunStatus, SimConfig,
    TerritoryHexView,
};
use serde::Serialize;

pub use server::{serve, ServerError};

/// One audited command submission. The kernel itself rejects bad commands as
/// silent no-ops; the facade records what was asked and whether it took.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRecord {
    pub tick: u64,
    pub command: String,
    pub accepted: bool,
    pub detail: Option<String>,
}

pub struct EngineApi {
    engine: VillageWorld,
    command_audit: Vec<CommandRecord>,
}

impl EngineApi {
    pub fn from_config(config: SimConfig) -> Self {
        Self {
            engine: VillageWorld::new(config),
            command_audit: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        self.engine.run_id()
    }

    pub fn config(&self) -> &SimConfig {
        &self.engine.config
    }

    pub fn start(&mut self) -> &RunStatus {
        self.engine.start();
        self.engine.status()
    }

    pub fn pause(&mut self) -> &RunStatus {
        self.engine.pause();
        self.engine.status()
    }

    /// Advance by the requested number of ticks. Auto-starts a paused run so
    /// explicit step requests always advance.
    pub fn step(&mut self, steps: u64) -> (&RunStatus, u64) {
        self.engine.start();
        let committed = self.engine.step_n(steps.max(1));
        (self.engine.status(), committed)
    }

    /// Auto-starts a paused run so explicit run-to-tick requests always
    /// advance.
    pub fn run_to_tick(&mut self, tick: u64) -> (&RunStatus, u64) {
        self.engine.start();
        let committed = self.engine.run_to_tick(tick);
        (self.engine.status(), committed)
    }

    pub fn status(&self) -> &RunStatus {
        self.engine.status()
    }

    pub fn events(&self) -> &[Event] {
        self.engine.events()
    }

    pub fn inspect_creature(&self, animal_id: &str) -> Option<CreatureSnapshot> {
        self.engine.inspect_creature(animal_id)
    }

    pub fn creature_snapshots(&self) -> Vec<CreatureSnapshot> {
        self.engine.creature_snapshots()
    }

    pub fn territory_view(&self) -> Vec<TerritoryHexView> {
        self.engine.territory_view()
    }

    pub fn combat_reports(&self) -> &[CombatReport] {
        self.engine.combat_reports()
    }

    pub fn is_combat_active(&self) -> bool {
        self.engine.is_combat_active()
    }

    pub fn command_audit(&self) -> &[CommandRecord] {
        &self.command_audit
    }

    pub fn request_transition(
        &mut self,
        animal_id: &str,
        new_state: BehaviorState,
    ) -> CommandRecord {
        let accepted = self.engine.request_transition(animal_id, new_state);
        self.audit(
            format!("creature.transition animal_id={animal_id} to={new_state}"),
            accepted,
            (!accepted).then(|| "transition rejected by the state table".to_string()),
        )
    }

    pub fn start_combat(
        &mut self,
        roster: &[String],
        hex: HexCoord,
        wild_group_id: &str,
    ) -> CommandRecord {
        let accepted = self.engine.start_combat(roster, hex, wild_group_id);
        self.audit(
            format!(
                "combat.start hex=({},{}) wild_group_id={wild_group_id} roster_size={}",
                hex.q,
                hex.r,
                roster.len()
            ),
            accepted,
            (!accepted).then(|| "combat request rejected".to_string()),
        )
    }

    fn audit(&mut self, command: String, accepted: bool, detail: Option<String>) -> CommandRecord {
        let record = CommandRecord {
            tick: self.engine.status().current_tick,
            command,
            accepted,
            detail,
        };
        self.command_audit.push(record.clone());
        record
    }
}
