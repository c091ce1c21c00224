//! Event hub: the explicit publish/subscribe service passed into every mutator.
//!
//! Every notification lands in one ordered journal with a per-tick sequence
//! number; collaborators additionally drain per-creature local inboxes or the
//! global inbox. Mutators that announce a change at both scopes publish the
//! local entry strictly before the global one, so journal order carries the
//! ordering contract.

use std::collections::{BTreeMap, VecDeque};

use contracts::{Event, EventKind, EventScope};
use serde_json::Value;

/// Oldest entries are dropped from an inbox past this depth.
const INBOX_CAP: usize = 256;

#[derive(Debug, Default)]
pub struct EventHub {
    current_tick: u64,
    sequence_in_tick: u64,
    journal: Vec<Event>,
    local_inbox: BTreeMap<String, VecDeque<Event>>,
    global_inbox: VecDeque<Event>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once by the tick driver before any publication in that tick.
    pub fn begin_tick(&mut self, tick: u64) {
        self.current_tick = tick;
        self.sequence_in_tick = 0;
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Creature-scoped notification; delivered to the owner's local inbox.
    pub fn publish_local(&mut self, animal_id: &str, kind: EventKind, details: Option<Value>) {
        let event = self.stamp(EventScope::Local, kind, Some(animal_id), details);
        let inbox = self
            .local_inbox
            .entry(animal_id.to_string())
            .or_default();
        inbox.push_back(event.clone());
        while inbox.len() > INBOX_CAP {
            let _ = inbox.pop_front();
        }
        self.journal.push(event);
    }

    /// World-scoped notification, optionally attributed to a creature.
    pub fn publish_global(
        &mut self,
        kind: EventKind,
        animal_id: Option<&str>,
        details: Option<Value>,
    ) {
        let event = self.stamp(EventScope::Global, kind, animal_id, details);
        self.global_inbox.push_back(event.clone());
        while self.global_inbox.len() > INBOX_CAP {
            let _ = self.global_inbox.pop_front();
        }
        self.journal.push(event);
    }

    pub fn drain_local(&mut self, animal_id: &str) -> Vec<Event> {
        let mut drained = Vec::new();
        if let Some(inbox) = self.local_inbox.get_mut(animal_id) {
            while let Some(event) = inbox.pop_front() {
                drained.push(event);
            }
        }
        drained
    }

    pub fn drain_global(&mut self) -> Vec<Event> {
        let mut drained = Vec::new();
        while let Some(event) = self.global_inbox.pop_front() {
            drained.push(event);
        }
        drained
    }

    pub fn remove_inbox(&mut self, animal_id: &str) {
        self.local_inbox.remove(animal_id);
    }

    /// Full ordered publication history.
    pub fn journal(&self) -> &[Event] {
        &self.journal
    }

    fn stamp(
        &mut self,
        scope: EventScope,
        kind: EventKind,
        animal_id: Option<&str>,
        details: Option<Value>,
    ) -> Event {
        self.sequence_in_tick = self.sequence_in_tick.saturating_add(1);
        Event {
            tick: self.current_tick,
            sequence_in_tick: self.sequence_in_tick,
            scope,
            kind,
            animal_id: animal_id.map(str::to_string),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_strictly_increases_within_a_tick() {
        let mut hub = EventHub::new();
        hub.begin_tick(3);
        hub.publish_local("animal_001", EventKind::EnergyChanged, None);
        hub.publish_global(EventKind::EnergyLow, Some("animal_001"), None);
        hub.publish_global(EventKind::EnergyDepleted, Some("animal_001"), None);

        let sequences: Vec<u64> = hub
            .journal()
            .iter()
            .map(|event| event.sequence_in_tick)
            .collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert!(hub.journal().iter().all(|event| event.tick == 3));
    }

    #[test]
    fn inboxes_are_scoped_and_bounded() {
        let mut hub = EventHub::new();
        hub.begin_tick(1);
        for _ in 0..(INBOX_CAP + 10) {
            hub.publish_local("animal_001", EventKind::EnergyChanged, Some(json!({})));
        }
        hub.publish_global(EventKind::Resting, Some("animal_001"), None);

        assert_eq!(hub.drain_local("animal_001").len(), INBOX_CAP);
        assert_eq!(hub.drain_local("animal_002").len(), 0);
        assert_eq!(hub.drain_global().len(), 1);
        assert_eq!(hub.drain_global().len(), 0);
    }
}
