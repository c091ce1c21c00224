//! v1 cross-boundary contracts shared by the simulation kernel, API, and CLI.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Energy value at or below which a creature is considered fatigued.
pub const LOW_ENERGY_THRESHOLD: i64 = 1;

// ---------------------------------------------------------------------------
// Hex coordinates
// ---------------------------------------------------------------------------

/// Axial hex coordinate.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// The six axial neighbor offsets, in a fixed clockwise order so that
/// neighbor enumeration is deterministic across runs.
pub const HEX_NEIGHBOR_OFFSETS: [(i32, i32); 6] =
    [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn neighbors(self) -> [HexCoord; 6] {
        let mut out = [self; 6];
        for (slot, (dq, dr)) in out.iter_mut().zip(HEX_NEIGHBOR_OFFSETS) {
            slot.q = self.q + dq;
            slot.r = self.r + dr;
        }
        out
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}

// ---------------------------------------------------------------------------
// Mood and behavior state
// ---------------------------------------------------------------------------

/// Three-level mood ladder. Saturates at both ends; no wraparound.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Sad,
    #[default]
    Neutral,
    Happy,
}

impl Mood {
    /// Multiplier applied to base stats when computing effective stats.
    pub fn modifier(self) -> f64 {
        match self {
            Mood::Happy => 1.0,
            Mood::Neutral => 0.85,
            Mood::Sad => 0.7,
        }
    }

    pub fn one_up(self) -> Mood {
        match self {
            Mood::Sad => Mood::Neutral,
            Mood::Neutral | Mood::Happy => Mood::Happy,
        }
    }

    pub fn one_down(self) -> Mood {
        match self {
            Mood::Happy => Mood::Neutral,
            Mood::Neutral | Mood::Sad => Mood::Sad,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
        }
    }
}

/// Behavioral state of a creature. Every creature starts `Idle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    #[default]
    Idle,
    Walking,
    Working,
    Resting,
}

impl BehaviorState {
    pub fn label(self) -> &'static str {
        match self {
            BehaviorState::Idle => "idle",
            BehaviorState::Walking => "walking",
            BehaviorState::Working => "working",
            BehaviorState::Resting => "resting",
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Base stats
// ---------------------------------------------------------------------------

/// Immutable per-species stat definition supplied at spawn time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseStats {
    pub speed: i64,
    pub strength: i64,
    pub max_energy: i64,
    pub starting_mood: Mood,
}

impl BaseStats {
    /// Look up a base stat by name. Unknown names yield `None`.
    pub fn stat(&self, name: &str) -> Option<i64> {
        match name {
            "speed" => Some(self.speed),
            "strength" => Some(self.strength),
            "max_energy" => Some(self.max_energy),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Territory
// ---------------------------------------------------------------------------

/// Visibility/claim state of a territory hex.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryState {
    #[default]
    Unexplored,
    Scouted,
    Contested,
    Claimed,
}

/// API view of a single territory hex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerritoryHexView {
    pub hex: HexCoord,
    /// `""` for unowned, `"player"`, or a wild-group id.
    pub owner: String,
    pub state: TerritoryState,
}

// ---------------------------------------------------------------------------
// Wild groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WildMember {
    pub species: String,
    pub strength: i64,
}

/// An NPC-controlled cluster of creatures anchored to a hex, fought as a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WildGroup {
    pub group_id: String,
    pub anchor: HexCoord,
    pub members: Vec<WildMember>,
}

impl WildGroup {
    pub fn aggregate_strength(&self) -> i64 {
        self.members.iter().map(|member| member.strength).sum()
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    EnergyChanged,
    EnergyLow,
    EnergyDepleted,
    MoodChanged,
    StateChanged,
    Resting,
    Recovered,
    HexClaimed,
    HexScouted,
    CombatStarted,
    CombatTurnResolved,
    CombatRetreatStarted,
    AnimalTired,
    CombatEnded,
}

/// Whether a notification is creature-scoped or world-scoped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    Local,
    Global,
}

/// One journal entry published through the event hub.
///
/// `sequence_in_tick` strictly increases within a tick, so journal order is
/// publication order; the local member of a local/global pair always carries
/// a lower sequence than its global partner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub tick: u64,
    pub sequence_in_tick: u64,
    pub scope: EventScope,
    pub kind: EventKind,
    /// Owning creature for local events and creature-attributed global ones.
    pub animal_id: Option<String>,
    pub details: Option<Value>,
}

// ---------------------------------------------------------------------------
// Combat records
// ---------------------------------------------------------------------------

/// One resolved combat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnRecord {
    pub turn_number: u32,
    pub damage: i64,
}

/// Terminal outcome of a combat session, as surfaced to the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombatReport {
    pub hex: HexCoord,
    pub wild_group_id: String,
    pub won: bool,
    pub captured_types: Vec<String>,
    pub turns: Vec<TurnRecord>,
}

// ---------------------------------------------------------------------------
// Run configuration and status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    pub schema_version: String,
    pub run_id: String,
    pub seed: u64,
    pub max_ticks: u64,
    /// Elapsed seconds handed to each creature update per driver tick.
    pub tick_seconds: f64,
    pub creature_count: u32,
    pub wild_group_count: u32,
    /// Energy drained per second while working.
    pub energy_drain_rate: f64,
    /// Energy restored per second while resting (about one point per three seconds).
    pub energy_recovery_rate: f64,
    /// Continuous low-energy seconds while working before mood drops a step.
    pub mood_penalty_interval_secs: f64,
    /// Continuous resting seconds before mood rises a step.
    pub mood_improve_interval_secs: f64,
    /// Where defeated rosters retreat to.
    pub home_hex: HexCoord,
    /// Maximum creatures in a combat roster.
    pub roster_limit: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: "run_local_001".to_string(),
            seed: 1337,
            max_ticks: 720,
            tick_seconds: 1.0,
            creature_count: 4,
            wild_group_count: 2,
            energy_drain_rate: 0.5,
            energy_recovery_rate: 1.0 / 3.0,
            mood_penalty_interval_secs: 10.0,
            mood_improve_interval_secs: 12.0,
            home_hex: HexCoord::new(0, 0),
            roster_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStatus {
    pub schema_version: String,
    pub run_id: String,
    pub current_tick: u64,
    pub max_ticks: u64,
    pub mode: RunMode,
    pub combat_active: bool,
}

impl RunStatus {
    pub fn is_complete(&self) -> bool {
        self.current_tick >= self.max_ticks
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={} tick={}/{} mode={:?} combat_active={}",
            self.run_id, self.current_tick, self.max_ticks, self.mode, self.combat_active
        )
    }
}

// ---------------------------------------------------------------------------
// Creature snapshot (API inspection view)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatureSnapshot {
    pub animal_id: String,
    pub species: String,
    pub position: HexCoord,
    pub state: BehaviorState,
    pub energy: i64,
    pub max_energy: i64,
    pub mood: Mood,
    pub low_energy: bool,
}

// ---------------------------------------------------------------------------
// API error envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RunNotFound,
    InvalidQuery,
    InvalidCommand,
    RunStateConflict,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            code,
            message: message.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_ladder_saturates_at_both_ends() {
        assert_eq!(Mood::Happy.one_up(), Mood::Happy);
        assert_eq!(Mood::Sad.one_down(), Mood::Sad);
        assert_eq!(Mood::Neutral.one_up(), Mood::Happy);
        assert_eq!(Mood::Neutral.one_down(), Mood::Sad);
    }

    #[test]
    fn hex_neighbors_are_distinct_and_adjacent() {
        let origin = HexCoord::new(2, 2);
        let neighbors = origin.neighbors();
        for neighbor in neighbors {
            assert_ne!(neighbor, origin);
            let dq = (neighbor.q - origin.q).abs();
            let dr = (neighbor.r - origin.r).abs();
            assert!(dq <= 1 && dr <= 1);
        }
        let mut sorted = neighbors.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
    }

    #[test]
    fn unknown_base_stat_is_none() {
        let base = BaseStats {
            speed: 4,
            strength: 3,
            max_energy: 10,
            starting_mood: Mood::Neutral,
        };
        assert_eq!(base.stat("speed"), Some(4));
        assert_eq!(base.stat("charisma"), None);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SimConfig::default();
        let raw = serde_json::to_string(&config).expect("serialize");
        let decoded: SimConfig = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(config, decoded);
    }
}
