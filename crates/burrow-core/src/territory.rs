//! Territory collaborator boundary: ownership tags and visibility states per
//! hex, behind a narrow interface so the kernel never assumes a concrete map
//! representation.

use std::collections::BTreeMap;

use contracts::{HexCoord, TerritoryHexView, TerritoryState};

pub const PLAYER_OWNER: &str = "player";

pub trait TerritoryService {
    fn get_state(&self, hex: HexCoord) -> TerritoryState;
    fn owner(&self, hex: HexCoord) -> String;
    fn set_owner(&mut self, hex: HexCoord, owner: &str, source: &str);
    /// Upgrade an unexplored hex to scouted. Anything already visible is left
    /// untouched; never downgrades.
    fn mark_scouted(&mut self, hex: HexCoord);
    fn neighbors(&self, hex: HexCoord) -> Vec<HexCoord>;
}

#[derive(Debug, Clone, Default)]
struct HexRecord {
    owner: String,
    state: TerritoryState,
}

/// Reference implementation over an unbounded axial grid; hexes without a
/// record are unexplored and unowned.
#[derive(Debug, Clone, Default)]
pub struct HexTerritory {
    hexes: BTreeMap<HexCoord, HexRecord>,
}

impl HexTerritory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a hex directly (world initialization and tests).
    pub fn seed_hex(&mut self, hex: HexCoord, owner: &str, state: TerritoryState) {
        self.hexes.insert(
            hex,
            HexRecord {
                owner: owner.to_string(),
                state,
            },
        );
    }

    pub fn view(&self) -> Vec<TerritoryHexView> {
        self.hexes
            .iter()
            .map(|(hex, record)| TerritoryHexView {
                hex: *hex,
                owner: record.owner.clone(),
                state: record.state,
            })
            .collect()
    }
}

impl TerritoryService for HexTerritory {
    fn get_state(&self, hex: HexCoord) -> TerritoryState {
        self.hexes
            .get(&hex)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    fn owner(&self, hex: HexCoord) -> String {
        self.hexes
            .get(&hex)
            .map(|record| record.owner.clone())
            .unwrap_or_default()
    }

    fn set_owner(&mut self, hex: HexCoord, owner: &str, _source: &str) {
        let record = self.hexes.entry(hex).or_default();
        record.owner = owner.to_string();
        if owner == PLAYER_OWNER {
            record.state = TerritoryState::Claimed;
        } else if !owner.is_empty() {
            record.state = TerritoryState::Contested;
        }
    }

    fn mark_scouted(&mut self, hex: HexCoord) {
        let record = self.hexes.entry(hex).or_default();
        if record.state == TerritoryState::Unexplored {
            record.state = TerritoryState::Scouted;
        }
    }

    fn neighbors(&self, hex: HexCoord) -> Vec<HexCoord> {
        hex.neighbors().to_vec()
    }
}
