//! Systems operate on components each simulation tick. Each runs as a free
//! function over the world: query, collect pending changes, then apply them.

mod actions;
mod behavior;
mod fx;
mod health;
mod nav;
mod perception;

pub use actions::*;
pub use behavior::*;
pub use fx::*;
pub use health::*;
pub use nav::*;
pub use perception::*;
