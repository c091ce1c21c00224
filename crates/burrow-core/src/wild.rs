//! Wild-group registry boundary. Groups are owned by the registry and removed
//! entirely when defeated in a combat the player wins.

use std::collections::BTreeMap;

use contracts::WildGroup;

pub trait WildGroupRegistry {
    fn get_group(&self, group_id: &str) -> Option<&WildGroup>;
    fn remove_group(&mut self, group_id: &str) -> Option<WildGroup>;
}

#[derive(Debug, Clone, Default)]
pub struct WildGroups {
    groups: BTreeMap<String, WildGroup>,
}

impl WildGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: WildGroup) {
        self.groups.insert(group.group_id.clone(), group);
    }

    pub fn contains(&self, group_id: &str) -> bool {
        self.groups.contains_key(group_id)
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl WildGroupRegistry for WildGroups {
    fn get_group(&self, group_id: &str) -> Option<&WildGroup> {
        self.groups.get(group_id)
    }

    fn remove_group(&mut self, group_id: &str) -> Option<WildGroup> {
        self.groups.remove(group_id)
    }
}
