//! Base-stats provider boundary: immutable per-species definitions consumed
//! once at spawn time.

use std::collections::BTreeMap;

use contracts::{BaseStats, Mood};

pub trait BaseStatsProvider {
    fn base_stats(&self, species: &str) -> Option<BaseStats>;
}

/// Species name -> base stats lookup seeded with the default village roster.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    entries: BTreeMap<String, BaseStats>,
}

impl SpeciesCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn village_default() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            "rabbit",
            BaseStats {
                speed: 5,
                strength: 1,
                max_energy: 8,
                starting_mood: Mood::Happy,
            },
        );
        catalog.insert(
            "fox",
            BaseStats {
                speed: 4,
                strength: 3,
                max_energy: 10,
                starting_mood: Mood::Neutral,
            },
        );
        catalog.insert(
            "deer",
            BaseStats {
                speed: 4,
                strength: 2,
                max_energy: 12,
                starting_mood: Mood::Neutral,
            },
        );
        catalog.insert(
            "boar",
            BaseStats {
                speed: 2,
                strength: 5,
                max_energy: 14,
                starting_mood: Mood::Neutral,
            },
        );
        catalog
    }

    pub fn insert(&mut self, species: &str, base: BaseStats) {
        self.entries.insert(species.to_string(), base);
    }

    pub fn species_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl BaseStatsProvider for SpeciesCatalog {
    fn base_stats(&self, species: &str) -> Option<BaseStats> {
        self.entries.get(species).copied()
    }
}
