//! Timed action resolution - attack windup/recovery and intimidation acts.
//!
//! Actions are components that exist only while in flight. The behavior
//! system inserts them and raises the owner's busy flag; this system ticks
//! them down, lands damage at the windup boundary, and picks the follow-up
//! state when the action completes.

use hecs::{Entity, World};

use super::fx::{FxEvent, FxQueue};
use crate::components::{
    AttackAction, AttackPhase, Creature, CreatureParams, CreatureState, Health, IntimidateAction,
    NavAgent, Position, Vec3,
};

/// Advance all in-flight timed actions by one frame
pub fn action_system(world: &mut World, fx: &mut FxQueue, delta_seconds: f32) {
    attack_actions(world, fx, delta_seconds);
    intimidate_actions(world, fx, delta_seconds);
}

enum AttackOutcome {
    /// Time still left, write the ticked action back
    Tick(AttackAction),
    /// Windup expired: resolve the damage check, then recover
    Strike,
    /// Recovery expired: drop the action and pick the next state
    Finish,
}

struct AttackTick {
    entity: Entity,
    target: Option<Entity>,
    params: CreatureParams,
    position: Vec3,
    outcome: AttackOutcome,
}

fn attack_actions(world: &mut World, fx: &mut FxQueue, delta_seconds: f32) {
    let mut ticks: Vec<AttackTick> = Vec::new();

    for (entity, (action, creature, params, pos)) in world
        .query::<(&AttackAction, &Creature, &CreatureParams, &Position)>()
        .iter()
    {
        let mut ticked = *action;
        ticked.time_left -= delta_seconds;
        let outcome = if ticked.time_left > 0.0 {
            AttackOutcome::Tick(ticked)
        } else {
            match ticked.phase {
                AttackPhase::WindUp => AttackOutcome::Strike,
                AttackPhase::Recover => AttackOutcome::Finish,
            }
        };
        ticks.push(AttackTick {
            entity,
            target: creature.target,
            params: *params,
            position: pos.point,
            outcome,
        });
    }

    for t in ticks {
        match t.outcome {
            AttackOutcome::Tick(ticked) => {
                if let Ok(mut action) = world.get::<&mut AttackAction>(t.entity) {
                    *action = ticked;
                }
            }
            AttackOutcome::Strike => {
                // The prey may have slipped out of reach during the windup
                if let Some(target) = t.target {
                    let in_range = world
                        .get::<&Position>(target)
                        .map(|p| p.point.distance(&t.position) <= t.params.attack_range)
                        .unwrap_or(false);
                    if in_range {
                        land_damage(world, fx, target, t.params.attack_damage);
                    }
                }
                if let Ok(mut action) = world.get::<&mut AttackAction>(t.entity) {
                    action.phase = AttackPhase::Recover;
                    action.time_left = t.params.attack_recovery;
                }
            }
            AttackOutcome::Finish => {
                let _ = world.remove_one::<AttackAction>(t.entity);
                let next = next_state_after_action(world, t.target, t.position, &t.params);
                finish_action(world, fx, t.entity, next, &t.params);
            }
        }
    }
}

struct IntimidateTick {
    entity: Entity,
    target: Option<Entity>,
    params: CreatureParams,
    position: Vec3,
    /// Some = write the ticked action back, None = the act completed
    remaining: Option<IntimidateAction>,
}

fn intimidate_actions(world: &mut World, fx: &mut FxQueue, delta_seconds: f32) {
    let mut ticks: Vec<IntimidateTick> = Vec::new();

    for (entity, (action, creature, params, pos)) in world
        .query::<(&IntimidateAction, &Creature, &CreatureParams, &Position)>()
        .iter()
    {
        let mut ticked = *action;
        ticked.time_left -= delta_seconds;
        ticks.push(IntimidateTick {
            entity,
            target: creature.target,
            params: *params,
            position: pos.point,
            remaining: (ticked.time_left > 0.0).then_some(ticked),
        });
    }

    for t in ticks {
        match t.remaining {
            Some(ticked) => {
                if let Ok(mut action) = world.get::<&mut IntimidateAction>(t.entity) {
                    *action = ticked;
                }
            }
            None => {
                let _ = world.remove_one::<IntimidateAction>(t.entity);
                let next = next_state_after_action(world, t.target, t.position, &t.params);
                finish_action(world, fx, t.entity, next, &t.params);
            }
        }
    }
}

fn land_damage(world: &mut World, fx: &mut FxQueue, target: Entity, amount: f32) {
    let mut landed = None;
    if let Ok(mut health) = world.get::<&mut Health>(target) {
        if health.take_damage(amount) {
            landed = Some((health.current, health.is_alive()));
        }
    }
    if let Some((remaining, alive)) = landed {
        fx.push(FxEvent::TargetDamaged {
            target,
            amount,
            remaining,
        });
        if !alive {
            fx.push(FxEvent::TargetKilled { target });
        }
    }
}

/// Follow-up state once an action completes. A dead or missing prey reads
/// as Idle.
fn next_state_after_action(
    world: &World,
    target: Option<Entity>,
    from: Vec3,
    params: &CreatureParams,
) -> CreatureState {
    let Some(target) = target else {
        return CreatureState::Idle;
    };
    let alive = world
        .get::<&Health>(target)
        .map(|h| h.is_alive())
        .unwrap_or(false);
    if !alive {
        return CreatureState::Idle;
    }
    let near = world
        .get::<&Position>(target)
        .map(|p| p.point.distance(&from) <= params.chase_range)
        .unwrap_or(false);
    if near {
        CreatureState::Chasing
    } else {
        CreatureState::Wandering
    }
}

/// Clear busy flags, apply the follow-up state, and retune navigation
fn finish_action(
    world: &mut World,
    fx: &mut FxQueue,
    entity: Entity,
    next: CreatureState,
    params: &CreatureParams,
) {
    let mut change = None;
    if let Ok(mut creature) = world.get::<&mut Creature>(entity) {
        creature.attacking = false;
        creature.intimidating = false;
        if creature.state != next {
            change = Some((creature.state, next));
        }
        creature.state = next;
        if next == CreatureState::Wandering {
            creature.wander_timer = 0.0;
        }
    }
    if let Ok(mut agent) = world.get::<&mut NavAgent>(entity) {
        match next {
            CreatureState::Chasing => agent.speed = params.chase_speed,
            CreatureState::Idle => agent.stop(),
            _ => agent.speed = params.wander_speed,
        }
    }
    if let Some((from, to)) = change {
        fx.push(FxEvent::StateChanged { entity, from, to });
    }
}
