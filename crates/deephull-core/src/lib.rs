//! DeepHull Core - Submarine Escape Simulation Engine
//!
//! An ECS-based simulation of a flooded submarine: a procedurally generated
//! maze of rooms and hallways, a lone survivor, and the creatures hunting
//! them through it.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Level modules, the hunted target, creatures
//! - **Components**: Pure data attached to entities (Position, Module, Creature, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! # Example
//!
//! ```rust,no_run
//! use deephull_core::prelude::*;
//! use deephull_core::generation::{LevelConfig, SpawnConfig};
//!
//! let mut engine = SimulationEngine::new(42);
//!
//! // Generate the level, then populate it
//! engine.generate(&LevelConfig::default()).unwrap();
//! engine.spawn_target(Vec3::new(4.0, 0.0, 0.0));
//! engine.spawn_creatures(
//!     Vec3::new(4.0, 0.0, 0.0),
//!     &CreatureParams::default(),
//!     &SpawnConfig::default(),
//! );
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     for _event in engine.drain_fx() {
//!         // forward to the presentation layer
//!     }
//! }
//! ```

pub mod components;
pub mod systems;
pub mod generation;
pub mod engine;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::SimulationEngine;
}
