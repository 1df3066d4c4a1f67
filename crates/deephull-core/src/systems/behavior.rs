//! Creature behavior - the per-tick state machine driving each monster.
//!
//! Runs once per frame: ticks timers, checks perception, applies state
//! transitions, and issues navigation commands. Timed actions started here
//! are advanced to completion by the action system.

use hecs::{Entity, World};
use log::warn;
use rand::Rng;

use super::fx::{FxEvent, FxQueue};
use super::nav::NavSurface;
use super::perception::can_see;
use crate::components::{
    AttackAction, Creature, CreatureParams, CreatureState, FxBank, Health, IntimidateAction,
    Locomotion, MotionCue, NavAgent, Position, Vec3,
};

/// Attempts at finding a navigable wander point before giving up this cycle
const WANDER_SAMPLE_ATTEMPTS: u32 = 8;

/// A wander destination closer than this counts as reached
const RETARGET_EPSILON: f32 = 0.5;

/// Pending per-creature changes, collected before any mutation
struct CreatureUpdate {
    entity: Entity,
    creature: Creature,
    params: CreatureParams,
    face: Option<Vec3>,
    nav_stop: bool,
    nav_speed: Option<f32>,
    nav_destination: Option<Vec3>,
    cue: MotionCue,
    start_attack: bool,
    start_intimidate: bool,
    play_chase_sound: bool,
    state_change: Option<(CreatureState, CreatureState)>,
}

impl CreatureUpdate {
    fn new(entity: Entity, creature: Creature, params: CreatureParams) -> Self {
        Self {
            entity,
            creature,
            params,
            face: None,
            nav_stop: false,
            nav_speed: None,
            nav_destination: None,
            cue: MotionCue::Idle,
            start_attack: false,
            start_intimidate: false,
            play_chase_sound: false,
            state_change: None,
        }
    }

    /// Switch state and queue its entry effects. No-op when already there.
    fn enter(&mut self, to: CreatureState) {
        if self.creature.state == to {
            return;
        }
        let from = self.creature.state;
        self.creature.state = to;
        self.state_change = Some((from, to));

        match to {
            CreatureState::Wandering => {
                self.nav_speed = Some(self.params.wander_speed);
                // Forces a retarget on the next wander tick
                self.creature.wander_timer = 0.0;
            }
            CreatureState::Intimidating => {
                self.nav_stop = true;
                self.creature.intimidating = true;
                self.start_intimidate = true;
            }
            CreatureState::Chasing => {
                self.nav_speed = Some(self.params.chase_speed);
            }
            CreatureState::Attacking => {
                self.nav_stop = true;
                self.creature.attacking = true;
                self.creature.attack_timer = self.params.attack_cooldown;
                self.start_attack = true;
            }
            CreatureState::Idle => {
                self.nav_stop = true;
            }
        }
    }
}

/// Drive every creature's state machine by one frame
pub fn behavior_system(
    world: &mut World,
    surface: &NavSurface,
    fx: &mut FxQueue,
    delta_seconds: f32,
    rng: &mut impl Rng,
) {
    let mut updates: Vec<CreatureUpdate> = Vec::with_capacity(16);

    for (entity, (creature, pos, params)) in
        world.query::<(&Creature, &Position, &CreatureParams)>().iter()
    {
        let mut u = CreatureUpdate::new(entity, creature.clone(), *params);
        u.creature.wander_timer -= delta_seconds;
        u.creature.attack_timer = (u.creature.attack_timer - delta_seconds).max(0.0);

        let velocity = world
            .get::<&NavAgent>(entity)
            .map(|a| a.velocity)
            .unwrap_or(Vec3::ZERO);

        let live_target = creature.target.and_then(|t| {
            let point = world.get::<&Position>(t).ok().map(|p| p.point)?;
            let alive = world
                .get::<&Health>(t)
                .map(|h| h.is_alive())
                .unwrap_or(false);
            alive.then_some(point)
        });

        // Dead or missing prey idles the creature at once, even mid-action;
        // the in-flight act itself still plays out through the action system.
        let Some(target_point) = live_target else {
            u.enter(CreatureState::Idle);
            updates.push(u);
            continue;
        };

        // In-flight actions hold the creature in place, facing its prey
        if u.creature.busy() {
            u.face = Some(target_point);
            u.nav_stop = true;
            updates.push(u);
            continue;
        }

        let dist = pos.point.distance(&target_point);
        match u.creature.state {
            CreatureState::Wandering | CreatureState::Idle => {
                if dist <= params.detection_range && can_see(pos, target_point, params, surface) {
                    u.play_chase_sound = true;
                    if params.intimidate_on_detect {
                        u.enter(CreatureState::Intimidating);
                    } else {
                        u.enter(CreatureState::Chasing);
                    }
                } else if u.creature.state == CreatureState::Wandering {
                    wander_tick(&mut u, pos, surface, rng);
                }
            }
            CreatureState::Chasing => {
                if dist > params.chase_range {
                    u.enter(CreatureState::Wandering);
                } else if dist <= params.attack_range
                    && u.creature.attack_timer <= 0.0
                    && !u.creature.attacking
                {
                    u.enter(CreatureState::Attacking);
                } else {
                    u.nav_destination = Some(target_point);
                }
            }
            // Completion of the in-flight act picks the next state;
            // nothing drives these while the busy flag is down.
            CreatureState::Intimidating | CreatureState::Attacking => {}
        }

        u.cue = motion_cue(&u.creature, velocity);
        updates.push(u);
    }

    apply_updates(world, fx, updates, rng);
}

fn motion_cue(creature: &Creature, velocity: Vec3) -> MotionCue {
    if creature.busy() || velocity.length() < 0.1 {
        MotionCue::Idle
    } else if creature.state == CreatureState::Chasing {
        MotionCue::WalkFast
    } else {
        MotionCue::WalkSlow
    }
}

fn wander_tick(u: &mut CreatureUpdate, pos: &Position, surface: &NavSurface, rng: &mut impl Rng) {
    let reached = u
        .creature
        .wander_target
        .map_or(true, |t| pos.point.distance(&t) < RETARGET_EPSILON);
    if u.creature.wander_timer > 0.0 && !reached {
        return;
    }

    match sample_wander_point(pos.point, u.params.wander_radius, surface, rng) {
        Some(point) => {
            u.creature.wander_target = Some(point);
            u.nav_destination = Some(point);
        }
        None => {
            warn!(
                "no navigable wander point within {} of ({:.1}, {:.1})",
                u.params.wander_radius, pos.point.x, pos.point.y
            );
        }
    }
    u.creature.wander_timer = u.params.wander_interval;
}

/// Random reachable point near `origin`, bounded attempts
fn sample_wander_point(
    origin: Vec3,
    radius: f32,
    surface: &NavSurface,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    if radius <= 0.0 || surface.is_empty() {
        return None;
    }
    for _ in 0..WANDER_SAMPLE_ATTEMPTS {
        let candidate = origin
            + Vec3::new(
                rng.gen_range(-radius..radius),
                rng.gen_range(-radius..radius),
                0.0,
            );
        if let Some(point) = surface.sample_position(candidate, radius) {
            return Some(point);
        }
    }
    None
}

fn apply_updates(
    world: &mut World,
    fx: &mut FxQueue,
    updates: Vec<CreatureUpdate>,
    rng: &mut impl Rng,
) {
    for u in updates {
        if u.play_chase_sound {
            if let Some(clip) = world
                .get::<&FxBank>(u.entity)
                .ok()
                .and_then(|bank| bank.random_chase_sound(rng).map(str::to_owned))
            {
                fx.push(FxEvent::Sound {
                    entity: u.entity,
                    clip,
                });
            }
        }
        if u.start_intimidate {
            fx.push(FxEvent::Animation {
                entity: u.entity,
                trigger: "Intimidate".into(),
            });
            if let Some(clip) = world
                .get::<&FxBank>(u.entity)
                .ok()
                .and_then(|bank| bank.random_intimidate_sound(rng).map(str::to_owned))
            {
                fx.push(FxEvent::Sound {
                    entity: u.entity,
                    clip,
                });
            }
        }
        if u.start_attack {
            if let Some(trigger) = world
                .get::<&FxBank>(u.entity)
                .ok()
                .and_then(|bank| bank.random_attack_animation(rng).map(str::to_owned))
            {
                fx.push(FxEvent::Animation {
                    entity: u.entity,
                    trigger,
                });
            }
            if let Some(clip) = world
                .get::<&FxBank>(u.entity)
                .ok()
                .and_then(|bank| bank.random_attack_sound(rng).map(str::to_owned))
            {
                fx.push(FxEvent::Sound {
                    entity: u.entity,
                    clip,
                });
            }
        }
        if let Some((from, to)) = u.state_change {
            fx.push(FxEvent::StateChanged {
                entity: u.entity,
                from,
                to,
            });
        }

        if let Ok(mut creature) = world.get::<&mut Creature>(u.entity) {
            *creature = u.creature.clone();
        }
        if let Some(point) = u.face {
            if let Ok(mut pos) = world.get::<&mut Position>(u.entity) {
                pos.face_toward(point);
            }
        }
        if let Ok(mut agent) = world.get::<&mut NavAgent>(u.entity) {
            if let Some(speed) = u.nav_speed {
                agent.speed = speed;
            }
            if u.nav_stop {
                agent.stop();
            }
            if let Some(dest) = u.nav_destination {
                agent.set_destination(dest);
            }
        }
        if let Ok(mut loco) = world.get::<&mut Locomotion>(u.entity) {
            loco.cue = u.cue;
        }
        if u.start_attack {
            let _ = world.insert_one(u.entity, AttackAction::new(u.params.attack_windup));
        }
        if u.start_intimidate {
            let _ = world.insert_one(u.entity, IntimidateAction::new(u.params.intimidate_duration));
        }
    }
}
