//! Movement collaborator boundary. The kernel never implements pathfinding;
//! it only asks whether a creature is currently in motion and reacts to
//! start/complete/cancel notifications routed through the world driver.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

pub trait MovementService {
    fn is_moving(&self, animal_id: &str) -> bool;
}

/// Default service for worlds with no movement integration attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMovement;

impl MovementService for NoMovement {
    fn is_moving(&self, _animal_id: &str) -> bool {
        false
    }
}

/// Hand-driven movement double for tests: callers keep a clone and flip
/// per-creature motion flags while the world holds the boxed service.
#[derive(Debug, Default, Clone)]
pub struct ScriptedMovement {
    moving: Arc<Mutex<BTreeSet<String>>>,
}

impl ScriptedMovement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_moving(&self, animal_id: &str, moving: bool) {
        let Ok(mut set) = self.moving.lock() else {
            return;
        };
        if moving {
            set.insert(animal_id.to_string());
        } else {
            set.remove(animal_id);
        }
    }
}

impl MovementService for ScriptedMovement {
    fn is_moving(&self, animal_id: &str) -> bool {
        self.moving
            .lock()
            .map(|set| set.contains(animal_id))
            .unwrap_or(false)
    }
}
