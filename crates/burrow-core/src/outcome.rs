//! Applies the consequences of a resolved combat to territory, the wild-group
//! registry, and every participating creature. All effects of one outcome are
//! applied before the terminal `combat_ended` event is published.

use std::collections::BTreeMap;

use contracts::{CombatReport, EventKind, HexCoord, TerritoryState};
use serde_json::json;

use crate::combat::{CombatSession, CombatVerdict};
use crate::creature::Creature;
use crate::events::EventHub;
use crate::territory::{TerritoryService, PLAYER_OWNER};
use crate::wild::WildGroupRegistry;

pub fn apply_outcome(
    session: CombatSession,
    verdict: CombatVerdict,
    creatures: &mut BTreeMap<String, Creature>,
    territory: &mut dyn TerritoryService,
    registry: &mut dyn WildGroupRegistry,
    home_hex: HexCoord,
    hub: &mut EventHub,
) -> CombatReport {
    match verdict {
        CombatVerdict::PlayerWon => apply_victory(session, territory, registry, hub),
        CombatVerdict::PlayerLost => apply_defeat(session, creatures, home_hex, hub),
    }
}

fn apply_victory(
    session: CombatSession,
    territory: &mut dyn TerritoryService,
    registry: &mut dyn WildGroupRegistry,
    hub: &mut EventHub,
) -> CombatReport {
    territory.set_owner(session.hex, PLAYER_OWNER, "combat");
    hub.publish_global(
        EventKind::HexClaimed,
        None,
        Some(json!({
            "hex": { "q": session.hex.q, "r": session.hex.r },
            "owner": PLAYER_OWNER,
            "source": "combat",
        })),
    );

    // Scouting is idempotent: only unexplored neighbors change, so visible
    // hexes are never downgraded or re-announced.
    for neighbor in territory.neighbors(session.hex) {
        if territory.get_state(neighbor) == TerritoryState::Unexplored {
            territory.mark_scouted(neighbor);
            hub.publish_global(
                EventKind::HexScouted,
                None,
                Some(json!({ "hex": { "q": neighbor.q, "r": neighbor.r } })),
            );
        }
    }

    // One entry per defeated member; duplicates allowed.
    let captured_types = registry
        .get_group(&session.wild_group_id)
        .map(|group| {
            group
                .members
                .iter()
                .map(|member| member.species.clone())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let _ = registry.remove_group(&session.wild_group_id);

    hub.publish_global(
        EventKind::CombatEnded,
        None,
        Some(json!({ "won": true, "captured_types": captured_types })),
    );

    CombatReport {
        hex: session.hex,
        wild_group_id: session.wild_group_id,
        won: true,
        captured_types,
        turns: session.log,
    }
}

fn apply_defeat(
    session: CombatSession,
    creatures: &mut BTreeMap<String, Creature>,
    home_hex: HexCoord,
    hub: &mut EventHub,
) -> CombatReport {
    let retreat_spots = home_hex.neighbors();
    let mut affected = Vec::new();
    for (index, animal_id) in session.roster.iter().enumerate() {
        let Some(creature) = creatures.get_mut(animal_id) else {
            continue;
        };
        creature.force_rest(hub);
        let remaining = creature.energy();
        creature.pool_mut().deplete(remaining, hub);
        // Deterministic jitter: the first creature lands on the home hex,
        // the rest fan out over its neighbors so nobody stacks exactly.
        creature.position = if index == 0 {
            home_hex
        } else {
            retreat_spots[(index - 1) % retreat_spots.len()]
        };
        affected.push(animal_id.clone());
    }

    hub.publish_global(
        EventKind::CombatRetreatStarted,
        None,
        Some(json!({
            "hex": { "q": session.hex.q, "r": session.hex.r },
            "roster_size": session.roster.len(),
        })),
    );
    for animal_id in &affected {
        hub.publish_global(EventKind::AnimalTired, Some(animal_id), None);
    }

    // Territory and the wild group are deliberately untouched so the
    // encounter can be retried immediately.
    hub.publish_global(
        EventKind::CombatEnded,
        None,
        Some(json!({ "won": false, "captured_types": [] })),
    );

    CombatReport {
        hex: session.hex,
        wild_group_id: session.wild_group_id,
        won: false,
        captured_types: Vec::new(),
        turns: session.log,
    }
}
