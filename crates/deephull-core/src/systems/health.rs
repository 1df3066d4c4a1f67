//! Health upkeep - winds down invulnerability windows.

use hecs::World;

use crate::components::Health;

pub fn health_system(world: &mut World, delta_seconds: f32) {
    for (_entity, health) in world.query::<&mut Health>().iter() {
        health.tick(delta_seconds);
    }
}
