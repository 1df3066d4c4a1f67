//! Populating a generated level: the hunted target and its hunters.

use hecs::{Entity, World};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::components::{
    Creature, CreatureParams, FxBank, Health, Locomotion, NavAgent, Position, Target, Vec3,
};
use crate::systems::NavSurface;

/// Tuning knobs for creature placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub creature_count: u32,
    /// Candidate points are drawn within this square radius of the center
    pub spawn_radius: f32,
    /// No creature starts closer than this to the target
    pub min_distance_from_target: f32,
    /// No two creatures start closer than this to each other
    pub min_creature_spacing: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            creature_count: 3,
            spawn_radius: 30.0,
            min_distance_from_target: 12.0,
            min_creature_spacing: 4.0,
        }
    }
}

/// Spawn the entity the creatures hunt
pub fn spawn_target(world: &mut World, position: Vec3) -> Entity {
    world.spawn((
        Position::new(position.x, position.y, position.z),
        Target,
        Health::new(100.0),
    ))
}

/// Scatter creatures across the navigable surface around `center`.
///
/// Placement is rejection-sampled with a bounded number of attempts; a
/// crowded or tiny surface yields fewer creatures than asked for, with a
/// warning.
pub fn spawn_creatures(
    world: &mut World,
    surface: &NavSurface,
    center: Vec3,
    target: Entity,
    params: &CreatureParams,
    config: &SpawnConfig,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let target_point = world.get::<&Position>(target).ok().map(|p| p.point);
    let mut spawned: Vec<Entity> = Vec::with_capacity(config.creature_count as usize);
    let mut taken: Vec<Vec3> = Vec::new();

    let max_attempts = config.creature_count * 10;
    for _ in 0..max_attempts {
        if spawned.len() as u32 >= config.creature_count {
            break;
        }

        let candidate = center
            + Vec3::new(
                rng.gen_range(-config.spawn_radius..config.spawn_radius),
                rng.gen_range(-config.spawn_radius..config.spawn_radius),
                0.0,
            );
        let Some(point) = surface.sample_position(candidate, 2.0) else {
            continue;
        };

        if let Some(tp) = target_point {
            if point.distance(&tp) < config.min_distance_from_target {
                continue;
            }
        }
        if taken
            .iter()
            .any(|p| p.distance(&point) < config.min_creature_spacing)
        {
            continue;
        }

        let yaw = rng.gen_range(0.0..TAU);
        let entity = world.spawn((
            Position::new(point.x, point.y, point.z).with_yaw(yaw),
            Creature::new(Some(target)),
            *params,
            NavAgent::new(params.wander_speed, params.attack_range * 0.8),
            Locomotion::default(),
            FxBank::crab(),
        ));
        taken.push(point);
        spawned.push(entity);
    }

    if (spawned.len() as u32) < config.creature_count {
        warn!(
            "placed {} of {} creatures before running out of attempts",
            spawned.len(),
            config.creature_count
        );
    }
    info!("spawned {} creatures around ({:.1}, {:.1})", spawned.len(), center.x, center.y);
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BoundingBox;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wide_surface() -> NavSurface {
        NavSurface::from_boxes(vec![BoundingBox::new(
            Vec3::new(-50.0, -50.0, 0.0),
            Vec3::new(50.0, 50.0, 3.0),
        )])
    }

    #[test]
    fn test_spawn_target_carries_full_health() {
        let mut world = World::new();
        let target = spawn_target(&mut world, Vec3::new(2.0, 3.0, 0.0));

        assert!(world.get::<&Target>(target).is_ok());
        assert_eq!(world.get::<&Position>(target).unwrap().point.y, 3.0);
        let health = world.get::<&Health>(target).unwrap();
        assert_eq!(health.current, 100.0);
        assert!(health.is_alive());
    }

    #[test]
    fn test_creatures_land_on_the_surface_with_standoff() {
        let mut world = World::new();
        let surface = wide_surface();
        let mut rng = StdRng::seed_from_u64(9);

        let target = spawn_target(&mut world, Vec3::ZERO);
        let config = SpawnConfig {
            creature_count: 3,
            spawn_radius: 40.0,
            min_distance_from_target: 5.0,
            min_creature_spacing: 2.0,
        };
        let spawned = spawn_creatures(
            &mut world,
            &surface,
            Vec3::ZERO,
            target,
            &CreatureParams::default(),
            &config,
            &mut rng,
        );

        assert_eq!(spawned.len(), 3);
        let mut points = Vec::new();
        for &e in &spawned {
            let pos = world.get::<&Position>(e).unwrap().point;
            assert!(surface.contains(&pos));
            assert!(pos.distance(&Vec3::ZERO) >= config.min_distance_from_target);
            points.push(pos);

            let creature = world.get::<&Creature>(e).unwrap();
            assert_eq!(creature.target, Some(target));
            drop(creature);
            assert!(world.get::<&NavAgent>(e).is_ok());
            assert!(world.get::<&FxBank>(e).is_ok());
        }

        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert!(points[i].distance(&points[j]) >= config.min_creature_spacing);
            }
        }
    }

    #[test]
    fn test_crowded_surface_spawns_fewer_creatures() {
        let mut world = World::new();
        // A closet: spacing keeps it to at most one creature
        let surface = NavSurface::from_boxes(vec![BoundingBox::new(
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 3.0),
        )]);
        let mut rng = StdRng::seed_from_u64(17);

        let target = spawn_target(&mut world, Vec3::new(100.0, 0.0, 0.0));
        let config = SpawnConfig {
            creature_count: 3,
            spawn_radius: 40.0,
            min_distance_from_target: 1.0,
            min_creature_spacing: 4.0,
        };
        let spawned = spawn_creatures(
            &mut world,
            &surface,
            Vec3::ZERO,
            target,
            &CreatureParams::default(),
            &config,
            &mut rng,
        );

        assert!(spawned.len() < 3);
    }
}
