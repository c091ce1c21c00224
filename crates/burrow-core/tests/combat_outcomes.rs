use burrow_core::stats::SpeciesCatalog;
use burrow_core::territory::{TerritoryService, PLAYER_OWNER};
use burrow_core::world::VillageWorld;
use contracts::{
    BaseStats, BehaviorState, EventKind, HexCoord, Mood, SimConfig, TerritoryState, WildGroup,
    WildMember,
};

const DEN_HEX: HexCoord = HexCoord { q: 2, r: 2 };
const DEN_ID: &str = "wild:rabbit_den_01";

fn base_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.creature_count = 0;
    config.wild_group_count = 0;
    config
}

fn spawn_fighter(world: &mut VillageWorld, animal_id: &str, strength: i64) {
    let mut catalog = SpeciesCatalog::new();
    catalog.insert(
        "badger",
        BaseStats {
            speed: 3,
            strength,
            max_energy: 10,
            starting_mood: Mood::Happy,
        },
    );
    assert!(world.spawn_creature(animal_id, "badger", HexCoord::new(0, 1), &catalog));
}

fn seed_den(world: &mut VillageWorld, member_strength: i64, member_count: usize) {
    let members = (0..member_count)
        .map(|_| WildMember {
            species: "rabbit".to_string(),
            strength: member_strength,
        })
        .collect();
    world.territory_mut().seed_hex(DEN_HEX, DEN_ID, TerritoryState::Contested);
    world.wild_groups_mut().insert(WildGroup {
        group_id: DEN_ID.to_string(),
        anchor: DEN_HEX,
        members,
    });
}

fn run_until_report(world: &mut VillageWorld) {
    world.start();
    for _ in 0..64 {
        world.step();
        if !world.combat_reports().is_empty() {
            return;
        }
    }
    panic!("combat never produced a report");
}

fn event_index(world: &VillageWorld, kind: EventKind) -> usize {
    world
        .events()
        .iter()
        .position(|event| event.kind == kind)
        .unwrap_or_else(|| panic!("missing event {kind:?}"))
}

#[test]
fn victory_claims_the_hex_scouts_neighbors_and_captures_the_group() {
    let mut world = VillageWorld::new(base_config());
    spawn_fighter(&mut world, "animal_001", 30);
    seed_den(&mut world, 1, 2);

    let roster = vec!["animal_001".to_string()];
    assert!(world.start_combat(&roster, DEN_HEX, DEN_ID));
    assert!(world.is_combat_active());
    run_until_report(&mut world);

    let report = &world.combat_reports()[0];
    assert!(report.won);
    assert_eq!(report.hex, DEN_HEX);
    assert_eq!(report.wild_group_id, DEN_ID);
    // One entry per defeated member, duplicates included.
    assert_eq!(report.captured_types, vec!["rabbit", "rabbit"]);
    assert!(!report.turns.is_empty());

    assert_eq!(world.territory().owner(DEN_HEX), PLAYER_OWNER);
    assert_eq!(world.territory().get_state(DEN_HEX), TerritoryState::Claimed);
    assert!(!world.wild_groups().contains(DEN_ID));
    assert!(!world.is_combat_active());
    assert!(!world.status().combat_active);

    for neighbor in DEN_HEX.neighbors() {
        assert_eq!(
            world.territory().get_state(neighbor),
            TerritoryState::Scouted,
            "neighbor {neighbor:?} should be scouted"
        );
    }
    let scouted = world
        .events()
        .iter()
        .filter(|event| event.kind == EventKind::HexScouted)
        .count();
    assert_eq!(scouted, 6);
}

#[test]
fn scouting_never_downgrades_already_visible_neighbors() {
    let mut world = VillageWorld::new(base_config());
    spawn_fighter(&mut world, "animal_001", 30);
    seed_den(&mut world, 1, 2);

    // Two neighbors are already visible before the fight.
    let claimed = HexCoord::new(3, 2);
    let contested = HexCoord::new(3, 1);
    world
        .territory_mut()
        .seed_hex(claimed, PLAYER_OWNER, TerritoryState::Claimed);
    world
        .territory_mut()
        .seed_hex(contested, "wild:fox_den_02", TerritoryState::Contested);

    assert!(world.start_combat(&["animal_001".to_string()], DEN_HEX, DEN_ID));
    run_until_report(&mut world);

    assert_eq!(world.territory().get_state(claimed), TerritoryState::Claimed);
    assert_eq!(world.territory().get_state(contested), TerritoryState::Contested);
    let scouted = world
        .events()
        .iter()
        .filter(|event| event.kind == EventKind::HexScouted)
        .count();
    assert_eq!(scouted, 4);
}

#[test]
fn defeat_sends_the_roster_home_exhausted_and_leaves_the_den_standing() {
    let mut world = VillageWorld::new(base_config());
    spawn_fighter(&mut world, "animal_001", 1);
    spawn_fighter(&mut world, "animal_002", 1);
    seed_den(&mut world, 100, 1);

    let roster = vec!["animal_001".to_string(), "animal_002".to_string()];
    assert!(world.start_combat(&roster, DEN_HEX, DEN_ID));
    run_until_report(&mut world);

    let report = &world.combat_reports()[0];
    assert!(!report.won);
    assert!(report.captured_types.is_empty());

    let home = world.config.home_hex;
    let retreat_spots = home.neighbors();
    for (index, animal_id) in roster.iter().enumerate() {
        let creature = world.creature(animal_id).expect("creature survives defeat");
        assert_eq!(creature.current_state(), BehaviorState::Resting);
        assert_eq!(creature.energy(), 0);
        if index == 0 {
            assert_eq!(creature.position, home);
        } else {
            assert!(retreat_spots.contains(&creature.position));
        }
    }

    // Territory and the wild group are untouched, so the fight can be retried.
    assert_eq!(world.territory().owner(DEN_HEX), DEN_ID);
    assert_eq!(world.territory().get_state(DEN_HEX), TerritoryState::Contested);
    assert!(world.wild_groups().contains(DEN_ID));
    assert!(!world.is_combat_active());
    assert!(world.start_combat(&roster, DEN_HEX, DEN_ID));
}

#[test]
fn defeat_events_arrive_in_retreat_then_tired_then_ended_order() {
    let mut world = VillageWorld::new(base_config());
    spawn_fighter(&mut world, "animal_001", 1);
    seed_den(&mut world, 100, 1);
    assert!(world.start_combat(&["animal_001".to_string()], DEN_HEX, DEN_ID));
    run_until_report(&mut world);

    let retreat = event_index(&world, EventKind::CombatRetreatStarted);
    let tired = event_index(&world, EventKind::AnimalTired);
    let ended = event_index(&world, EventKind::CombatEnded);
    assert!(retreat < tired);
    assert!(tired < ended);
}

#[test]
fn combat_started_precedes_every_turn_and_the_ending() {
    let mut world = VillageWorld::new(base_config());
    spawn_fighter(&mut world, "animal_001", 30);
    seed_den(&mut world, 1, 2);
    assert!(world.start_combat(&["animal_001".to_string()], DEN_HEX, DEN_ID));
    run_until_report(&mut world);

    let started = event_index(&world, EventKind::CombatStarted);
    let first_turn = event_index(&world, EventKind::CombatTurnResolved);
    let ended = event_index(&world, EventKind::CombatEnded);
    assert!(started < first_turn);
    assert!(first_turn < ended);
}

#[test]
fn oversized_and_concurrent_rosters_are_rejected() {
    let mut config = base_config();
    config.roster_limit = 2;
    let mut world = VillageWorld::new(config);
    spawn_fighter(&mut world, "animal_001", 5);
    spawn_fighter(&mut world, "animal_002", 5);
    spawn_fighter(&mut world, "animal_003", 5);
    seed_den(&mut world, 3, 2);

    let oversized = vec![
        "animal_001".to_string(),
        "animal_002".to_string(),
        "animal_003".to_string(),
    ];
    assert!(!world.start_combat(&oversized, DEN_HEX, DEN_ID));
    assert!(!world.is_combat_active());

    let roster = vec!["animal_001".to_string()];
    assert!(world.start_combat(&roster, DEN_HEX, DEN_ID));
    assert!(!world.start_combat(&roster, DEN_HEX, DEN_ID));
}

#[test]
fn equal_seeds_replay_an_identical_journal() {
    fn journal_signature(seed: u64) -> Vec<(u64, u64, EventKind, Option<String>)> {
        let mut config = base_config();
        config.seed = seed;
        let mut world = VillageWorld::new(config);
        spawn_fighter(&mut world, "animal_001", 4);
        seed_den(&mut world, 2, 2);
        assert!(world.start_combat(&["animal_001".to_string()], DEN_HEX, DEN_ID));
        world.start();
        world.request_transition("animal_001", BehaviorState::Working);
        world.step_n(40);
        world
            .events()
            .iter()
            .map(|event| {
                (
                    event.tick,
                    event.sequence_in_tick,
                    event.kind.clone(),
                    event.animal_id.clone(),
                )
            })
            .collect()
    }

    assert_eq!(journal_signature(42), journal_signature(42));
}
