//! Procedural generation: level topology, the prefab catalog it draws from,
//! and populating the result with a target and creatures.

mod level;
mod prefabs;
mod spawn;

pub use level::*;
pub use prefabs::*;
pub use spawn::*;
