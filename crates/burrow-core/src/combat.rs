//! Turn-based combat resolver. One session at a time; resolution progresses
//! one turn per driver tick rather than atomically, and produces exactly one
//! terminal verdict.

use std::collections::BTreeMap;

use contracts::{EventKind, HexCoord, TurnRecord};
use serde_json::json;

use crate::creature::Creature;
use crate::events::EventHub;
use crate::wild::WildGroupRegistry;

/// Stamina pool per point of aggregate strength.
const STAMINA_PER_STRENGTH: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatVerdict {
    PlayerWon,
    PlayerLost,
}

#[derive(Debug, Clone)]
pub struct CombatSession {
    pub roster: Vec<String>,
    pub hex: HexCoord,
    pub wild_group_id: String,
    pub log: Vec<TurnRecord>,
    player_strength: i64,
    wild_strength: i64,
    player_stamina: i64,
    wild_stamina: i64,
    next_turn: u32,
    verdict: Option<CombatVerdict>,
}

#[derive(Debug, Default)]
pub struct CombatResolver {
    session: Option<CombatSession>,
}

impl CombatResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_combat_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CombatSession> {
        self.session.as_ref()
    }

    /// Open a combat session. Rejected (silent no-op, returns false) while a
    /// session is active, for an unknown wild group, for an empty roster, or
    /// for a roster over the limit. Roster ids without a live creature are
    /// dropped defensively.
    #[allow(clippy::too_many_arguments)]
    pub fn start_combat(
        &mut self,
        roster: &[String],
        hex: HexCoord,
        wild_group_id: &str,
        creatures: &BTreeMap<String, Creature>,
        registry: &dyn WildGroupRegistry,
        roster_limit: usize,
        hub: &mut EventHub,
    ) -> bool {
        if self.session.is_some() || roster.is_empty() || roster.len() > roster_limit {
            return false;
        }
        let Some(group) = registry.get_group(wild_group_id) else {
            return false;
        };

        let mut live_roster = Vec::new();
        let mut player_strength = 0.0_f64;
        for animal_id in roster {
            if let Some(creature) = creatures.get(animal_id) {
                player_strength += creature.effective_stat("strength");
                live_roster.push(animal_id.clone());
            }
        }
        if live_roster.is_empty() {
            return false;
        }

        let player_strength = (player_strength.round() as i64).max(1);
        let wild_strength = group.aggregate_strength().max(1);

        hub.publish_global(
            EventKind::CombatStarted,
            None,
            Some(json!({
                "hex": { "q": hex.q, "r": hex.r },
                "wild_group_id": wild_group_id,
                "roster_size": live_roster.len(),
            })),
        );

        self.session = Some(CombatSession {
            roster: live_roster,
            hex,
            wild_group_id: wild_group_id.to_string(),
            log: Vec::new(),
            player_strength,
            wild_strength,
            player_stamina: player_strength * STAMINA_PER_STRENGTH,
            wild_stamina: wild_strength * STAMINA_PER_STRENGTH,
            next_turn: 1,
            verdict: None,
        });
        true
    }

    /// Resolve one turn. Deterministic strength-ratio policy: sides alternate
    /// starting with the player, the attacker deals its aggregate effective
    /// strength in damage, and the first side at zero stamina loses. Returns
    /// the verdict on the concluding turn; `None` while undecided or idle.
    pub fn advance_turn(&mut self, hub: &mut EventHub) -> Option<CombatVerdict> {
        let session = self.session.as_mut()?;
        if session.verdict.is_some() {
            return None;
        }

        let turn = session.next_turn;
        session.next_turn = session.next_turn.saturating_add(1);
        let player_attacks = turn % 2 == 1;
        let damage = if player_attacks {
            session.player_strength
        } else {
            session.wild_strength
        };

        if player_attacks {
            session.wild_stamina -= damage;
        } else {
            session.player_stamina -= damage;
        }
        session.log.push(TurnRecord {
            turn_number: turn,
            damage,
        });
        hub.publish_global(
            EventKind::CombatTurnResolved,
            None,
            Some(json!({
                "turn_number": turn,
                "damage": damage,
                "attacker": if player_attacks { "player" } else { "wild" },
            })),
        );

        let verdict = if session.wild_stamina <= 0 {
            Some(CombatVerdict::PlayerWon)
        } else if session.player_stamina <= 0 {
            Some(CombatVerdict::PlayerLost)
        } else {
            None
        };
        session.verdict = verdict;
        verdict
    }

    /// Consume the session once its verdict has been applied.
    pub fn take_session(&mut self) -> Option<CombatSession> {
        self.session.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorTunables;
    use crate::wild::WildGroups;
    use contracts::{BaseStats, Mood, SimConfig, WildGroup, WildMember};

    fn creature(animal_id: &str, strength: i64) -> Creature {
        let base = BaseStats {
            speed: 3,
            strength,
            max_energy: 10,
            starting_mood: Mood::Happy,
        };
        Creature::new(
            animal_id,
            "fox",
            base,
            HexCoord::new(0, 0),
            BehaviorTunables::from(&SimConfig::default()),
        )
    }

    fn fixture(player_strength: i64, wild_strength: i64) -> (CombatResolver, BTreeMap<String, Creature>, WildGroups, EventHub) {
        let mut creatures = BTreeMap::new();
        creatures.insert(
            "animal_001".to_string(),
            creature("animal_001", player_strength),
        );
        let mut groups = WildGroups::new();
        groups.insert(WildGroup {
            group_id: "wild:den".to_string(),
            anchor: HexCoord::new(2, 2),
            members: vec![WildMember {
                species: "rabbit".to_string(),
                strength: wild_strength,
            }],
        });
        (CombatResolver::new(), creatures, groups, EventHub::new())
    }

    #[test]
    fn second_start_is_rejected_while_session_active() {
        let (mut resolver, creatures, groups, mut hub) = fixture(3, 3);
        let roster = vec!["animal_001".to_string()];
        assert!(resolver.start_combat(
            &roster,
            HexCoord::new(2, 2),
            "wild:den",
            &creatures,
            &groups,
            5,
            &mut hub,
        ));
        assert!(!resolver.start_combat(
            &roster,
            HexCoord::new(2, 2),
            "wild:den",
            &creatures,
            &groups,
            5,
            &mut hub,
        ));
        assert!(resolver.is_combat_active());
    }

    #[test]
    fn empty_roster_and_unknown_group_are_rejected() {
        let (mut resolver, creatures, groups, mut hub) = fixture(3, 3);
        assert!(!resolver.start_combat(
            &[],
            HexCoord::new(2, 2),
            "wild:den",
            &creatures,
            &groups,
            5,
            &mut hub,
        ));
        assert!(!resolver.start_combat(
            &["animal_001".to_string()],
            HexCoord::new(2, 2),
            "wild:missing",
            &creatures,
            &groups,
            5,
            &mut hub,
        ));
        assert!(!resolver.is_combat_active());
    }

    #[test]
    fn stronger_side_wins_and_log_records_turns() {
        let (mut resolver, creatures, groups, mut hub) = fixture(30, 1);
        resolver.start_combat(
            &["animal_001".to_string()],
            HexCoord::new(2, 2),
            "wild:den",
            &creatures,
            &groups,
            5,
            &mut hub,
        );
        let mut verdict = None;
        for _ in 0..64 {
            verdict = resolver.advance_turn(&mut hub);
            if verdict.is_some() {
                break;
            }
        }
        assert_eq!(verdict, Some(CombatVerdict::PlayerWon));
        let session = resolver.take_session().expect("session present");
        assert!(!session.log.is_empty());
        assert_eq!(session.log[0].turn_number, 1);
        for pair in session.log.windows(2) {
            assert_eq!(pair[1].turn_number, pair[0].turn_number + 1);
        }
    }

    #[test]
    fn outmatched_roster_loses() {
        let (mut resolver, creatures, groups, mut hub) = fixture(1, 100);
        resolver.start_combat(
            &["animal_001".to_string()],
            HexCoord::new(2, 2),
            "wild:den",
            &creatures,
            &groups,
            5,
            &mut hub,
        );
        let mut verdict = None;
        for _ in 0..64 {
            verdict = resolver.advance_turn(&mut hub);
            if verdict.is_some() {
                break;
            }
        }
        assert_eq!(verdict, Some(CombatVerdict::PlayerLost));
    }
}
