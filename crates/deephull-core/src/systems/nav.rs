//! Navigation - walkable-surface queries and destination-driven steering

use crate::components::{BoundingBox, Module, NavAgent, Position, Vec3};
use hecs::World;

/// Step length when walking a segment across the surface
const RAY_STEP: f32 = 0.25;

/// Distance considered "arrived" when no stopping distance is set
const ARRIVE_EPSILON: f32 = 0.05;

/// The walkable surface: union of placed module footprints
#[derive(Debug, Clone, Default)]
pub struct NavSurface {
    boxes: Vec<BoundingBox>,
}

impl NavSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the surface from every placed module in the world
    pub fn from_world(world: &World) -> Self {
        let boxes = world
            .query::<&Module>()
            .iter()
            .map(|(_, module)| module.footprint)
            .collect();
        Self { boxes }
    }

    /// Build from explicit footprint rectangles
    pub fn from_boxes(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// Whether a point lies within the walkable deck volume
    pub fn contains(&self, point: &Vec3) -> bool {
        self.boxes.iter().any(|b| b.contains(point))
    }

    /// Closest on-surface point within `max_distance` of the query, if any.
    /// Deterministic: clamps the query into each footprint and keeps the nearest.
    pub fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        let mut best: Option<(f32, Vec3)> = None;
        for b in &self.boxes {
            let clamped = Vec3::new(
                point.x.clamp(b.min.x, b.max.x),
                point.y.clamp(b.min.y, b.max.y),
                point.z.clamp(b.min.z, b.max.z),
            );
            let dist = clamped.distance(&point);
            if dist <= max_distance && best.map_or(true, |(d, _)| dist < d) {
                best = Some((dist, clamped));
            }
        }
        best.map(|(_, p)| p)
    }

    /// Whether the straight segment between two points stays on the surface.
    /// Leaving the surface means crossing a hull wall, which blocks sight.
    pub fn segment_clear(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let length = delta.length();
        if length < RAY_STEP {
            return self.contains(&to);
        }
        let steps = (length / RAY_STEP).ceil() as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            if !self.contains(&(from + delta * t)) {
                return false;
            }
        }
        true
    }
}

/// Advance every agent toward its destination by one fixed step.
/// Agents hold position (velocity zero) once inside their stopping distance;
/// the destination is kept so remaining-distance queries stay meaningful.
pub fn navigation_system(world: &mut World, delta_seconds: f32) {
    let mut updates: Vec<(hecs::Entity, Position, NavAgent)> = Vec::with_capacity(64);

    for (entity, (pos, agent)) in world.query::<(&Position, &NavAgent)>().iter() {
        let mut next_pos = *pos;
        let mut next_agent = *agent;

        match agent.destination {
            Some(dest) => {
                let to_dest = dest - pos.point;
                let distance = to_dest.length();
                let hold_at = agent.stopping_distance.max(ARRIVE_EPSILON);

                if distance <= hold_at {
                    next_agent.velocity = Vec3::ZERO;
                } else {
                    let step = (agent.speed * delta_seconds).min(distance - hold_at);
                    let dir = to_dest.normalize();
                    next_pos.point = pos.point + dir * step;
                    next_pos.yaw = dir.y.atan2(dir.x);
                    next_agent.velocity = dir * agent.speed;
                }
            }
            None => {
                next_agent.velocity = Vec3::ZERO;
            }
        }

        updates.push((entity, next_pos, next_agent));
    }

    for (entity, new_pos, new_agent) in updates {
        if let Ok(mut pos) = world.get::<&mut Position>(entity) {
            *pos = new_pos;
        }
        if let Ok(mut agent) = world.get::<&mut NavAgent>(entity) {
            *agent = new_agent;
        }
    }
}
