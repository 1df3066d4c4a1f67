//! Creature components: state machine bookkeeping, navigation agent,
//! timed actions, and per-creature effect pools.

use super::common::Vec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Behavior states a creature moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureState {
    Wandering,
    Intimidating,
    Chasing,
    Attacking,
    Idle,
}

/// Marker component for the entity creatures hunt
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Target;

/// Creature component - per-monster state machine data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub state: CreatureState,
    /// Current wander destination, if one was sampled
    pub wander_target: Option<Vec3>,
    /// Seconds until the next wander retarget
    pub wander_timer: f32,
    /// Seconds until another attack may start
    pub attack_timer: f32,
    /// True while an attack sequence is in flight
    pub attacking: bool,
    /// True while an intimidation act is in flight
    pub intimidating: bool,
    /// The entity this creature hunts; liveness is re-checked every tick
    #[serde(skip)]
    pub target: Option<Entity>,
}

impl Creature {
    pub fn new(target: Option<Entity>) -> Self {
        Self {
            state: CreatureState::Wandering,
            wander_target: None,
            wander_timer: 0.0,
            attack_timer: 0.0,
            attacking: false,
            intimidating: false,
            target,
        }
    }

    /// A timed action is in flight; no new action may start
    pub fn busy(&self) -> bool {
        self.attacking || self.intimidating
    }
}

/// Tuning parameters for creature behavior
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreatureParams {
    pub detection_range: f32,
    pub chase_range: f32,
    pub attack_range: f32,
    pub wander_speed: f32,
    pub chase_speed: f32,
    pub wander_radius: f32,
    pub wander_interval: f32,
    pub attack_damage: f32,
    pub attack_cooldown: f32,
    /// Delay between attack start and the damage check
    pub attack_windup: f32,
    /// Delay after the damage check before the next state is chosen
    pub attack_recovery: f32,
    /// Total view cone, degrees
    pub fov_degrees: f32,
    /// Eye height used for occlusion tests
    pub eye_height: f32,
    /// Route detection through Intimidating instead of straight to Chasing
    pub intimidate_on_detect: bool,
    pub intimidate_duration: f32,
}

impl Default for CreatureParams {
    fn default() -> Self {
        Self {
            detection_range: 10.0,
            chase_range: 15.0,
            attack_range: 2.5,
            wander_speed: 2.0,
            chase_speed: 6.0,
            wander_radius: 8.0,
            wander_interval: 3.0,
            attack_damage: 25.0,
            attack_cooldown: 2.0,
            attack_windup: 0.5,
            attack_recovery: 1.0,
            fov_degrees: 120.0,
            eye_height: 1.5,
            intimidate_on_detect: false,
            intimidate_duration: 1.5,
        }
    }
}

/// Navigation agent - destination-driven steering on the nav surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NavAgent {
    pub destination: Option<Vec3>,
    /// Movement speed in units per second
    pub speed: f32,
    /// The agent holds position once within this distance of the destination
    pub stopping_distance: f32,
    /// Velocity applied on the last navigation step
    pub velocity: Vec3,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            destination: None,
            speed,
            stopping_distance,
            velocity: Vec3::ZERO,
        }
    }

    pub fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
    }

    pub fn stop(&mut self) {
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    /// Straight-line distance left to the destination, measured from `from`
    pub fn remaining_distance(&self, from: Vec3) -> f32 {
        match self.destination {
            Some(dest) => from.distance(&dest),
            None => 0.0,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.velocity.length() > 0.01
    }
}

/// Continuous animation cue derived from state and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionCue {
    Idle,
    WalkSlow,
    WalkFast,
}

/// Locomotion component - what the animation layer should blend right now.
/// Forced to Idle while a timed action is in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Locomotion {
    pub cue: MotionCue,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self {
            cue: MotionCue::Idle,
        }
    }
}

/// Phase of an in-flight attack sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    /// Waiting to strike; damage lands when this expires
    WindUp,
    /// Post-strike delay before the next state is chosen
    Recover,
}

/// Attack action - present only while an attack sequence is in flight
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttackAction {
    pub phase: AttackPhase,
    pub time_left: f32,
}

impl AttackAction {
    pub fn new(windup: f32) -> Self {
        Self {
            phase: AttackPhase::WindUp,
            time_left: windup,
        }
    }
}

/// Intimidation act - present only while the act is in flight
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntimidateAction {
    pub time_left: f32,
}

impl IntimidateAction {
    pub fn new(duration: f32) -> Self {
        Self {
            time_left: duration,
        }
    }
}

/// Per-creature animation and sound pools, drawn from uniformly per trigger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FxBank {
    pub attack_animations: Vec<String>,
    pub attack_sounds: Vec<String>,
    pub chase_sounds: Vec<String>,
    pub intimidate_sounds: Vec<String>,
}

impl FxBank {
    /// Pools for the crab monster
    pub fn crab() -> Self {
        Self {
            attack_animations: vec!["AttackClaw".into(), "AttackLunge".into()],
            attack_sounds: vec!["crab_attack_1".into(), "crab_attack_2".into()],
            chase_sounds: vec!["crab_screech_1".into(), "crab_screech_2".into()],
            intimidate_sounds: vec!["crab_hiss".into()],
        }
    }

    pub fn random_attack_animation(&self, rng: &mut impl rand::Rng) -> Option<&str> {
        pick(&self.attack_animations, rng)
    }

    pub fn random_attack_sound(&self, rng: &mut impl rand::Rng) -> Option<&str> {
        pick(&self.attack_sounds, rng)
    }

    pub fn random_chase_sound(&self, rng: &mut impl rand::Rng) -> Option<&str> {
        pick(&self.chase_sounds, rng)
    }

    pub fn random_intimidate_sound(&self, rng: &mut impl rand::Rng) -> Option<&str> {
        pick(&self.intimidate_sounds, rng)
    }
}

fn pick<'a>(pool: &'a [String], rng: &mut impl rand::Rng) -> Option<&'a str> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[rng.gen_range(0..pool.len())].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_creature_busy_flags() {
        let mut creature = Creature::new(None);
        assert!(!creature.busy());

        creature.attacking = true;
        assert!(creature.busy());

        creature.attacking = false;
        creature.intimidating = true;
        assert!(creature.busy());
    }

    #[test]
    fn test_nav_agent_commands() {
        let mut agent = NavAgent::new(2.0, 0.5);
        assert_eq!(agent.remaining_distance(Vec3::ZERO), 0.0);

        agent.set_destination(Vec3::new(3.0, 4.0, 0.0));
        assert!((agent.remaining_distance(Vec3::ZERO) - 5.0).abs() < 0.001);

        agent.velocity = Vec3::new(2.0, 0.0, 0.0);
        assert!(agent.is_moving());

        agent.stop();
        assert!(agent.destination.is_none());
        assert!(!agent.is_moving());
    }

    #[test]
    fn test_fx_bank_draws_from_pools() {
        let bank = FxBank::crab();
        let mut rng = StdRng::seed_from_u64(3);

        let anim = bank.random_attack_animation(&mut rng);
        assert!(anim.is_some());
        assert!(bank.attack_animations.iter().any(|a| a == anim.unwrap()));

        let empty = FxBank::default();
        assert!(empty.random_chase_sound(&mut rng).is_none());
    }
}
