//! Effects queue - fire-and-forget notifications for the embedding runtime.
//!
//! Systems push events; the host drains the queue once per frame and routes
//! them to its animation, audio, and UI layers. Nothing in the core reads
//! them back.

use crate::components::CreatureState;
use hecs::Entity;

/// One effect notification
#[derive(Debug, Clone, PartialEq)]
pub enum FxEvent {
    /// Fire a one-shot animation trigger on an entity
    Animation { entity: Entity, trigger: String },
    /// Play a one-shot sound at an entity's location
    Sound { entity: Entity, clip: String },
    /// A creature changed behavior state
    StateChanged {
        entity: Entity,
        from: CreatureState,
        to: CreatureState,
    },
    /// The hunted target took a hit
    TargetDamaged {
        target: Entity,
        amount: f32,
        remaining: f32,
    },
    /// The hunted target is dead
    TargetKilled { target: Entity },
}

/// Queue of pending effects
#[derive(Debug, Default)]
pub struct FxQueue {
    events: Vec<FxEvent>,
}

impl FxQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: FxEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty
    pub fn drain(&mut self) -> Vec<FxEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FxEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn test_push_and_drain() {
        let mut world = World::new();
        let entity = world.spawn(());

        let mut queue = FxQueue::new();
        assert!(queue.is_empty());

        queue.push(FxEvent::Sound {
            entity,
            clip: "crab_screech_1".into(),
        });
        queue.push(FxEvent::TargetKilled { target: entity });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
    }
}
