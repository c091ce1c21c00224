//! World driver: owns the creatures, event hub, territory, wild-group
//! registry, and combat resolver, and advances them with a single-threaded
//! cooperative tick loop.

use std::collections::BTreeMap;

use contracts::{
    BehaviorState, CombatReport, CreatureSnapshot, Event, EventKind, HexCoord, RunMode, RunStatus,
    SimConfig, TerritoryHexView, TerritoryState, WildGroup, WildMember,
};

use crate::behavior::BehaviorTunables;
use crate::combat::CombatResolver;
use crate::creature::Creature;
use crate::events::EventHub;
use crate::movement::{MovementService, NoMovement};
use crate::outcome::apply_outcome;
use crate::stats::{BaseStatsProvider, SpeciesCatalog};
use crate::territory::{HexTerritory, TerritoryService, PLAYER_OWNER};
use crate::wild::WildGroups;

pub struct VillageWorld {
    pub config: SimConfig,
    status: RunStatus,
    creatures: BTreeMap<String, Creature>,
    hub: EventHub,
    territory: HexTerritory,
    wild_groups: WildGroups,
    resolver: CombatResolver,
    movement: Box<dyn MovementService + Send>,
    reports: Vec<CombatReport>,
}

impl VillageWorld {
    pub fn new(config: SimConfig) -> Self {
        Self::with_movement(config, Box::new(NoMovement))
    }

    pub fn with_movement(config: SimConfig, movement: Box<dyn MovementService + Send>) -> Self {
        let status = RunStatus {
            schema_version: config.schema_version.clone(),
            run_id: config.run_id.clone(),
            current_tick: 0,
            max_ticks: config.max_ticks,
            mode: RunMode::Paused,
            combat_active: false,
        };
        let mut world = Self {
            config,
            status,
            creatures: BTreeMap::new(),
            hub: EventHub::new(),
            territory: HexTerritory::new(),
            wild_groups: WildGroups::new(),
            resolver: CombatResolver::new(),
            movement,
            reports: Vec::new(),
        };
        world.seed_village();
        world
    }

    // --- Seeding ---

    fn seed_village(&mut self) {
        let catalog = SpeciesCatalog::village_default();
        let species = catalog.species_names();
        if species.is_empty() {
            return;
        }

        let home = self.config.home_hex;
        self.territory.seed_hex(home, PLAYER_OWNER, TerritoryState::Claimed);

        let spawn_spots = home.neighbors();
        for index in 0..self.config.creature_count as usize {
            let animal_id = format!("animal_{:03}", index + 1);
            let name = &species[index % species.len()];
            let position = spawn_spots[index % spawn_spots.len()];
            self.spawn_creature(&animal_id, name, position, &catalog);
        }

        for index in 0..self.config.wild_group_count as usize {
            let roll = mix_seed(self.config.seed, index as u64);
            let name = &species[(roll % species.len() as u64) as usize];
            let member_count = 2 + (roll % 2) as usize;
            let strength = 1 + (roll % 4) as i64;
            let anchor = HexCoord::new(2 + index as i32, 2 - index as i32);
            let group_id = format!("wild:{}_den_{:02}", name, index + 1);
            let members = (0..member_count)
                .map(|_| WildMember {
                    species: name.clone(),
                    strength,
                })
                .collect();
            self.territory
                .seed_hex(anchor, &group_id, TerritoryState::Contested);
            self.wild_groups.insert(WildGroup {
                group_id,
                anchor,
                members,
            });
        }
    }

    /// Spawn a creature from the provider's base stats. Defensive no-op for
    /// duplicate ids and unknown species.
    pub fn spawn_creature(
        &mut self,
        animal_id: &str,
        species: &str,
        position: HexCoord,
        provider: &dyn BaseStatsProvider,
    ) -> bool {
        if self.creatures.contains_key(animal_id) {
            return false;
        }
        let Some(base) = provider.base_stats(species) else {
            return false;
        };
        let tunables = BehaviorTunables::from(&self.config);
        self.creatures.insert(
            animal_id.to_string(),
            Creature::new(animal_id, species, base, position, tunables),
        );
        true
    }

    pub fn remove_creature(&mut self, animal_id: &str) {
        self.creatures.remove(animal_id);
        self.hub.remove_inbox(animal_id);
    }

    // --- Run control ---

    pub fn start(&mut self) {
        if !self.status.is_complete() {
            self.status.mode = RunMode::Running;
        }
    }

    pub fn pause(&mut self) {
        self.status.mode = RunMode::Paused;
    }

    pub fn step(&mut self) -> bool {
        if self.status.is_complete() {
            self.status.mode = RunMode::Paused;
            return false;
        }
        self.status.mode = RunMode::Running;
        let tick = self.status.current_tick.saturating_add(1);
        if tick > self.status.max_ticks {
            self.status.mode = RunMode::Paused;
            return false;
        }
        self.status.current_tick = tick;
        self.hub.begin_tick(tick);

        self.route_forced_rests();
        self.advance_combat();
        self.tick_creatures();

        self.status.combat_active = self.resolver.is_combat_active();
        if self.status.is_complete() {
            self.status.mode = RunMode::Paused;
        }
        true
    }

    pub fn step_n(&mut self, n: u64) -> u64 {
        let mut committed = 0_u64;
        for _ in 0..n {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    pub fn run_to_tick(&mut self, tick: u64) -> u64 {
        let mut committed = 0_u64;
        while self.status.current_tick < tick {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    // --- Tick phases ---

    /// A global `energy_depleted` notification forces the owning creature to
    /// rest, whatever state it is in. Stale ids are ignored.
    fn route_forced_rests(&mut self) {
        let notices = self.hub.drain_global();
        for notice in notices {
            if notice.kind != EventKind::EnergyDepleted {
                continue;
            }
            let Some(animal_id) = notice.animal_id else {
                continue;
            };
            if let Some(creature) = self.creatures.get_mut(&animal_id) {
                creature.force_rest(&mut self.hub);
            }
        }
    }

    fn advance_combat(&mut self) {
        let Some(verdict) = self.resolver.advance_turn(&mut self.hub) else {
            return;
        };
        let Some(session) = self.resolver.take_session() else {
            return;
        };
        let report = apply_outcome(
            session,
            verdict,
            &mut self.creatures,
            &mut self.territory,
            &mut self.wild_groups,
            self.config.home_hex,
            &mut self.hub,
        );
        self.reports.push(report);
    }

    fn tick_creatures(&mut self) {
        let delta = self.config.tick_seconds;
        let movement: &dyn MovementService = self.movement.as_ref();
        for creature in self.creatures.values_mut() {
            creature.tick(movement, delta, &mut self.hub);
        }
    }

    // --- Combat ---

    pub fn start_combat(&mut self, roster: &[String], hex: HexCoord, wild_group_id: &str) -> bool {
        let opened = self.resolver.start_combat(
            roster,
            hex,
            wild_group_id,
            &self.creatures,
            &self.wild_groups,
            self.config.roster_limit,
            &mut self.hub,
        );
        self.status.combat_active = self.resolver.is_combat_active();
        opened
    }

    pub fn is_combat_active(&self) -> bool {
        self.resolver.is_combat_active()
    }

    pub fn combat_reports(&self) -> &[CombatReport] {
        &self.reports
    }

    // --- Creature commands ---

    /// Request a guarded transition for one creature. Stale ids and rejected
    /// transitions are silent no-ops.
    pub fn request_transition(&mut self, animal_id: &str, new_state: BehaviorState) -> bool {
        match self.creatures.get_mut(animal_id) {
            Some(creature) => creature.transition_to(new_state, &mut self.hub),
            None => false,
        }
    }

    pub fn deplete_energy(&mut self, animal_id: &str, amount: i64) {
        if let Some(creature) = self.creatures.get_mut(animal_id) {
            creature.pool_mut().deplete(amount, &mut self.hub);
        }
    }

    pub fn restore_energy(&mut self, animal_id: &str, amount: i64) {
        if let Some(creature) = self.creatures.get_mut(animal_id) {
            creature.pool_mut().restore(amount, &mut self.hub);
        }
    }

    // --- Movement notifications ---

    pub fn on_movement_started(&mut self, animal_id: &str) {
        if let Some(creature) = self.creatures.get_mut(animal_id) {
            creature.on_movement_started(&mut self.hub);
        }
    }

    pub fn on_movement_completed(&mut self, animal_id: &str) {
        if let Some(creature) = self.creatures.get_mut(animal_id) {
            creature.on_movement_completed(&mut self.hub);
        }
    }

    pub fn on_movement_cancelled(&mut self, animal_id: &str) {
        if let Some(creature) = self.creatures.get_mut(animal_id) {
            creature.on_movement_cancelled(&mut self.hub);
        }
    }

    // --- Queries ---

    pub fn run_id(&self) -> &str {
        &self.status.run_id
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn events(&self) -> &[Event] {
        self.hub.journal()
    }

    pub fn creature(&self, animal_id: &str) -> Option<&Creature> {
        self.creatures.get(animal_id)
    }

    pub fn creature_mut(&mut self, animal_id: &str) -> Option<&mut Creature> {
        self.creatures.get_mut(animal_id)
    }

    pub fn creature_ids(&self) -> Vec<String> {
        self.creatures.keys().cloned().collect()
    }

    pub fn inspect_creature(&self, animal_id: &str) -> Option<CreatureSnapshot> {
        self.creatures.get(animal_id).map(Creature::snapshot)
    }

    pub fn creature_snapshots(&self) -> Vec<CreatureSnapshot> {
        self.creatures.values().map(Creature::snapshot).collect()
    }

    pub fn territory_view(&self) -> Vec<TerritoryHexView> {
        self.territory.view()
    }

    pub fn territory(&self) -> &HexTerritory {
        &self.territory
    }

    pub fn territory_mut(&mut self) -> &mut HexTerritory {
        &mut self.territory
    }

    pub fn wild_groups(&self) -> &WildGroups {
        &self.wild_groups
    }

    pub fn wild_groups_mut(&mut self) -> &mut WildGroups {
        &mut self.wild_groups
    }

    pub fn hub_mut(&mut self) -> &mut EventHub {
        &mut self.hub
    }
}

/// Deterministic per-index roll derived from the run seed (splitmix-style).
fn mix_seed(seed: u64, index: u64) -> u64 {
    let mut value = seed
        .wrapping_add(index.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .wrapping_add(0x9e37_79b9_7f4a_7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::BehaviorState;

    #[test]
    fn seeding_populates_creatures_groups_and_territory() {
        let world = VillageWorld::new(SimConfig::default());
        assert_eq!(world.creature_ids().len(), 4);
        assert_eq!(world.wild_groups().len(), 2);
        assert_eq!(
            world.territory().get_state(world.config.home_hex),
            TerritoryState::Claimed
        );
        for creature in world.creature_snapshots() {
            assert_eq!(creature.state, BehaviorState::Idle);
            assert_eq!(creature.energy, creature.max_energy);
        }
    }

    #[test]
    fn step_advances_until_max_ticks_then_pauses() {
        let mut config = SimConfig::default();
        config.max_ticks = 3;
        let mut world = VillageWorld::new(config);
        world.start();
        assert_eq!(world.step_n(10), 3);
        assert!(world.status().is_complete());
        assert_eq!(world.status().mode, RunMode::Paused);
        assert!(!world.step());
    }

    #[test]
    fn equal_seeds_produce_identical_seeding() {
        let first = VillageWorld::new(SimConfig::default());
        let second = VillageWorld::new(SimConfig::default());
        assert_eq!(first.wild_groups().group_ids(), second.wild_groups().group_ids());
        assert_eq!(first.territory_view(), second.territory_view());
    }

    #[test]
    fn removing_a_creature_drops_its_pending_inbox() {
        let mut world = VillageWorld::new(SimConfig::default());
        world.deplete_energy("animal_001", 1);
        assert!(!world.hub_mut().drain_local("animal_001").is_empty());

        world.deplete_energy("animal_001", 1);
        world.remove_creature("animal_001");
        assert!(world.creature("animal_001").is_none());
        assert!(world.hub_mut().drain_local("animal_001").is_empty());

        // Commands against the removed id stay silent.
        world.deplete_energy("animal_001", 1);
        assert!(!world.creature_ids().contains(&"animal_001".to_string()));
    }

    #[test]
    fn spawn_rejects_duplicates_and_unknown_species() {
        let mut world = VillageWorld::new(SimConfig::default());
        let catalog = SpeciesCatalog::village_default();
        assert!(!world.spawn_creature("animal_001", "fox", HexCoord::new(0, 0), &catalog));
        assert!(!world.spawn_creature("animal_099", "dragon", HexCoord::new(0, 0), &catalog));
        assert!(world.spawn_creature("animal_099", "fox", HexCoord::new(0, 0), &catalog));
    }
}
