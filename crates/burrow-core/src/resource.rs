//! Per-creature energy and mood resource pool.

use contracts::{BaseStats, EventKind, Mood, LOW_ENERGY_THRESHOLD};
use serde_json::json;

use crate::events::EventHub;

/// Energy and mood for one creature. Mutated only through the named
/// operations below; every rejected mutation is a silent no-op.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    animal_id: String,
    base: BaseStats,
    energy: i64,
    max_energy: i64,
    /// Set once energy crosses at-or-below the low threshold; cleared only
    /// when energy rises strictly above it. Debounces repeated low-energy
    /// notifications while oscillating at the threshold.
    low_energy_flag: bool,
    mood: Mood,
}

impl ResourcePool {
    pub fn new(animal_id: impl Into<String>, base: BaseStats) -> Self {
        let max_energy = base.max_energy.max(0);
        Self {
            animal_id: animal_id.into(),
            base,
            energy: max_energy,
            max_energy,
            low_energy_flag: max_energy <= LOW_ENERGY_THRESHOLD,
            mood: base.starting_mood,
        }
    }

    pub fn energy(&self) -> i64 {
        self.energy
    }

    pub fn max_energy(&self) -> i64 {
        self.max_energy
    }

    pub fn is_energy_low(&self) -> bool {
        self.energy <= LOW_ENERGY_THRESHOLD
    }

    pub fn low_energy_flag(&self) -> bool {
        self.low_energy_flag
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn is_full(&self) -> bool {
        self.energy == self.max_energy
    }

    /// Base stat scaled by the mood modifier. Unknown stat names return 0.
    pub fn effective_stat(&self, name: &str) -> f64 {
        let base = self.base.stat(name).unwrap_or(0);
        base as f64 * self.mood.modifier()
    }

    /// Remove energy, clamping at 0. Non-positive amounts are ignored.
    pub fn deplete(&mut self, amount: i64, hub: &mut EventHub) {
        if amount <= 0 {
            return;
        }
        let before = self.energy;
        self.energy = self.energy.saturating_sub(amount).max(0);
        hub.publish_local(
            &self.animal_id,
            EventKind::EnergyChanged,
            Some(json!({ "current": self.energy, "max": self.max_energy })),
        );
        if self.energy <= LOW_ENERGY_THRESHOLD && !self.low_energy_flag {
            self.low_energy_flag = true;
            hub.publish_global(
                EventKind::EnergyLow,
                Some(&self.animal_id),
                Some(json!({ "current": self.energy })),
            );
        }
        if self.energy == 0 && before > 0 {
            hub.publish_global(EventKind::EnergyDepleted, Some(&self.animal_id), None);
        }
    }

    /// Add energy, clamping at max. Non-positive amounts are ignored.
    ///
    /// The low-energy flag re-arms only when the resulting energy is strictly
    /// greater than the threshold; landing exactly on it keeps the flag set.
    pub fn restore(&mut self, amount: i64, hub: &mut EventHub) {
        if amount <= 0 {
            return;
        }
        self.energy = self.energy.saturating_add(amount).min(self.max_energy);
        hub.publish_local(
            &self.animal_id,
            EventKind::EnergyChanged,
            Some(json!({ "current": self.energy, "max": self.max_energy })),
        );
        if self.energy > LOW_ENERGY_THRESHOLD {
            self.low_energy_flag = false;
        }
    }

    pub fn set_mood(&mut self, mood: Mood, hub: &mut EventHub) {
        if mood == self.mood {
            return;
        }
        self.mood = mood;
        hub.publish_local(
            &self.animal_id,
            EventKind::MoodChanged,
            Some(json!({ "mood": mood.label() })),
        );
        hub.publish_global(
            EventKind::MoodChanged,
            Some(&self.animal_id),
            Some(json!({ "mood": mood.label() })),
        );
    }

    pub fn increase_mood(&mut self, hub: &mut EventHub) {
        self.set_mood(self.mood.one_up(), hub);
    }

    pub fn decrease_mood(&mut self, hub: &mut EventHub) {
        self.set_mood(self.mood.one_down(), hub);
    }
}
