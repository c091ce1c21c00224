//! Simulation kernel: creature behavior state machines, energy/mood resource
//! pools, and combat outcome resolution, driven by a single-threaded tick loop.

pub mod behavior;
pub mod combat;
pub mod creature;
pub mod events;
pub mod movement;
pub mod outcome;
pub mod resource;
pub mod stats;
pub mod territory;
pub mod wild;
pub mod world;

pub use world::VillageWorld;
