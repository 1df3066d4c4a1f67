//! DeepHull Headless Simulation Harness
//!
//! Validates level generation and creature behavior end to end without a
//! renderer. Runs entirely in-process — no engine bindings, no assets.
//!
//! Usage:
//!   cargo run -p deephull-simtest
//!   cargo run -p deephull-simtest -- --verbose

use deephull_core::components::{
    Creature, CreatureParams, CreatureState, FxBank, Health, Locomotion, Module, ModuleKind,
    NavAgent, Position, Vec3,
};
use deephull_core::engine::SimulationEngine;
use deephull_core::generation::{
    generate_level, Frontier, LevelConfig, PrefabCatalog, SocketKind, SpawnConfig,
};
use deephull_core::systems::{FxEvent, NavSurface};
use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

// ── Scenario file (the same JSON a game build ships with) ───────────────
const SCENARIO_JSON: &str = include_str!("../../../data/scenario.json");

#[derive(Debug, Deserialize)]
struct Scenario {
    level: LevelConfig,
    creature: CreatureParams,
    spawn: SpawnConfig,
    seeds: Vec<u64>,
    session_ticks: u32,
    tick_seconds: f32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== DeepHull Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario file validation
    let scenario = match load_scenario(&mut results) {
        Some(s) => s,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Prefab catalog consistency
    results.extend(validate_catalog(verbose));

    // 3. Level generation sweep across seeds
    results.extend(validate_generation(&scenario, verbose));

    // 4. Navigable surface checks
    results.extend(validate_nav_surface(&scenario));

    // 5. Scripted hunt: detect, chase, attack, kill
    results.extend(run_behavior_session(&scenario, verbose));

    // 6. Full-session determinism
    results.extend(validate_determinism(&scenario));

    report(&results, verbose);
}

fn report(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Scenario File ────────────────────────────────────────────────────

fn load_scenario(results: &mut Vec<TestResult>) -> Option<Scenario> {
    println!("--- Scenario File ---");

    let scenario: Scenario = match serde_json::from_str(SCENARIO_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "scenario_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "scenario_seeds".into(),
        passed: !scenario.seeds.is_empty(),
        detail: format!("{} seeds configured", scenario.seeds.len()),
    });

    results.push(TestResult {
        name: "scenario_tick_rate".into(),
        passed: scenario.tick_seconds > 0.0 && scenario.tick_seconds <= 0.25,
        detail: format!(
            "{} ticks of {:.3}s = {:.1}s per session",
            scenario.session_ticks,
            scenario.tick_seconds,
            scenario.session_ticks as f32 * scenario.tick_seconds
        ),
    });

    let level_ok = scenario.level.main_path_length >= 1
        && scenario.level.branch_depth_min <= scenario.level.branch_depth_max
        && (0.0..=1.0).contains(&scenario.level.split_chance);
    results.push(TestResult {
        name: "scenario_level_config".into(),
        passed: level_ok,
        detail: format!(
            "{} legs, branch depth {}..={}, split chance {:.2}",
            scenario.level.main_path_length,
            scenario.level.branch_depth_min,
            scenario.level.branch_depth_max,
            scenario.level.split_chance
        ),
    });

    let c = &scenario.creature;
    let ranges_ordered = c.attack_range < c.detection_range && c.detection_range < c.chase_range;
    results.push(TestResult {
        name: "scenario_creature_ranges".into(),
        passed: ranges_ordered,
        detail: format!(
            "attack {} < detection {} < chase {}",
            c.attack_range, c.detection_range, c.chase_range
        ),
    });

    let tuning_ok = c.wander_speed > 0.0
        && c.chase_speed > c.wander_speed
        && c.attack_damage > 0.0
        && c.attack_windup > 0.0
        && c.attack_recovery > 0.0
        && c.fov_degrees > 0.0
        && c.fov_degrees <= 360.0;
    results.push(TestResult {
        name: "scenario_creature_tuning".into(),
        passed: tuning_ok,
        detail: format!(
            "speeds {}/{}, damage {}, fov {}°",
            c.wander_speed, c.chase_speed, c.attack_damage, c.fov_degrees
        ),
    });

    results.push(TestResult {
        name: "scenario_spawn_config".into(),
        passed: scenario.spawn.creature_count > 0 && scenario.spawn.spawn_radius > 0.0,
        detail: format!(
            "{} creatures within radius {}",
            scenario.spawn.creature_count, scenario.spawn.spawn_radius
        ),
    });

    Some(scenario)
}

// ── 2. Prefab Catalog ───────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Prefab Catalog ---");
    let mut results = Vec::new();

    let catalog = PrefabCatalog::builtin();
    results.push(TestResult {
        name: "catalog_validates".into(),
        passed: catalog.validate().is_ok(),
        detail: "built-in catalog exposes every required socket".into(),
    });

    results.push(TestResult {
        name: "catalog_room_variety".into(),
        passed: catalog.puzzle_rooms.len() >= 3,
        detail: format!("{} puzzle room prefabs", catalog.puzzle_rooms.len()),
    });

    let rooms_ok = catalog.puzzle_rooms.iter().all(|p| {
        p.kind == ModuleKind::PuzzleRoom
            && p.length > 0.0
            && p.width > 0.0
            && p.socket(SocketKind::Exit).is_some()
    });
    results.push(TestResult {
        name: "catalog_rooms_well_formed".into(),
        passed: rooms_ok,
        detail: "every puzzle room has positive dimensions and an exit".into(),
    });

    let left = catalog.branching_hall.socket(SocketKind::Left);
    let right = catalog.branching_hall.socket(SocketKind::Right);
    let side = catalog.split_hall.socket(SocketKind::Side);
    let junctions_ok = matches!(left, Some(s) if s.yaw > 0.0)
        && matches!(right, Some(s) if s.yaw < 0.0)
        && matches!(side, Some(s) if s.yaw != 0.0)
        && catalog.branching_hall.socket(SocketKind::Forward).is_some()
        && catalog.split_hall.socket(SocketKind::Forward).is_some();
    results.push(TestResult {
        name: "catalog_junction_sockets".into(),
        passed: junctions_ok,
        detail: "junction exits fan forward, left, and right".into(),
    });

    let terminators_ok =
        catalog.dead_end.sockets.is_empty() && catalog.escape_room.sockets.is_empty();
    results.push(TestResult {
        name: "catalog_terminators_sealed".into(),
        passed: terminators_ok,
        detail: "dead end and escape room expose no sockets".into(),
    });

    if verbose {
        println!("  Puzzle rooms:");
        for p in &catalog.puzzle_rooms {
            println!("    {:16} {}x{}", p.name, p.length, p.width);
        }
    }

    results
}

// ── 3. Level Generation ─────────────────────────────────────────────────

fn validate_generation(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Level Generation ---");
    let mut results = Vec::new();
    let catalog = PrefabCatalog::builtin();

    for &seed in &scenario.seeds {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let layout = match generate_level(
            &mut world,
            &catalog,
            Frontier::origin(),
            &scenario.level,
            &mut rng,
        ) {
            Ok(l) => l,
            Err(e) => {
                results.push(TestResult {
                    name: format!("gen_seed_{}", seed),
                    passed: false,
                    detail: format!("generation failed: {}", e),
                });
                continue;
            }
        };

        let expected_main = (scenario.level.main_path_length * 3 + 1) as usize;
        results.push(TestResult {
            name: format!("gen_seed_{}_main_path", seed),
            passed: layout.complete && layout.main_path.len() == expected_main,
            detail: format!(
                "{} main-path modules of {} total, complete: {}",
                layout.main_path.len(),
                layout.modules.len(),
                layout.complete
            ),
        });

        let mut pattern_ok = true;
        for leg in 0..scenario.level.main_path_length as usize {
            let kinds: Vec<ModuleKind> = layout.main_path[leg * 3..leg * 3 + 3]
                .iter()
                .map(|&e| world.get::<&Module>(e).map(|m| m.kind).unwrap_or(ModuleKind::DeadEnd))
                .collect();
            if kinds[0] != ModuleKind::PuzzleRoom
                || kinds[1] != ModuleKind::StraightHall
                || !kinds[2].is_junction()
            {
                pattern_ok = false;
            }
        }
        let escape_ok = layout
            .escape_room
            .and_then(|e| world.get::<&Module>(e).ok().map(|m| m.kind))
            == Some(ModuleKind::EscapeRoom);
        results.push(TestResult {
            name: format!("gen_seed_{}_pattern", seed),
            passed: pattern_ok && escape_ok,
            detail: "room, hallway, junction repeated; escape room last".into(),
        });

        let mut kind_counts = std::collections::HashMap::new();
        for &e in &layout.modules {
            if let Ok(m) = world.get::<&Module>(e) {
                *kind_counts.entry(m.kind).or_insert(0u32) += 1;
            }
        }
        let dead_ends = *kind_counts.get(&ModuleKind::DeadEnd).unwrap_or(&0);
        results.push(TestResult {
            name: format!("gen_seed_{}_branches_capped", seed),
            passed: dead_ends >= scenario.level.main_path_length,
            detail: format!("{} dead ends cap the side branches", dead_ends),
        });

        let footprints_ok = layout.modules.iter().all(|&e| {
            world
                .get::<&Module>(e)
                .map(|m| m.footprint.width() > 0.0 && m.footprint.depth() > 0.0)
                .unwrap_or(false)
        });
        results.push(TestResult {
            name: format!("gen_seed_{}_footprints", seed),
            passed: footprints_ok,
            detail: "all module footprints have positive area".into(),
        });

        if verbose {
            println!("  seed {} module distribution:", seed);
            let mut kinds: Vec<_> = kind_counts.iter().collect();
            kinds.sort_by_key(|(k, _)| format!("{:?}", k));
            for (kind, count) in kinds {
                println!("    {:13?}: {}", kind, count);
            }
        }
    }

    // Same seed twice must produce the same level
    if let Some(&seed) = scenario.seeds.first() {
        let run = || {
            let mut world = World::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let layout = generate_level(
                &mut world,
                &catalog,
                Frontier::origin(),
                &scenario.level,
                &mut rng,
            )
            .ok()?;
            let modules: Vec<String> = layout
                .modules
                .iter()
                .filter_map(|&e| {
                    world
                        .get::<&Module>(e)
                        .ok()
                        .map(|m| format!("{} {:?} {:?} {}", m.name, m.kind, m.origin, m.yaw))
                })
                .collect();
            Some(modules)
        };
        let first = run();
        let second = run();
        results.push(TestResult {
            name: "gen_deterministic".into(),
            passed: first.is_some() && first == second,
            detail: format!("seed {} regenerates identically", seed),
        });
    }

    results
}

// ── 4. Navigable Surface ────────────────────────────────────────────────

fn validate_nav_surface(scenario: &Scenario) -> Vec<TestResult> {
    println!("--- Navigable Surface ---");
    let mut results = Vec::new();

    let seed = scenario.seeds.first().copied().unwrap_or(1);
    let mut world = World::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let layout = match generate_level(
        &mut world,
        &PrefabCatalog::builtin(),
        Frontier::origin(),
        &scenario.level,
        &mut rng,
    ) {
        Ok(l) => l,
        Err(e) => {
            results.push(TestResult {
                name: "nav_surface_build".into(),
                passed: false,
                detail: format!("generation failed: {}", e),
            });
            return results;
        }
    };

    let surface = NavSurface::from_world(&world);
    results.push(TestResult {
        name: "nav_surface_build".into(),
        passed: surface.box_count() == layout.modules.len(),
        detail: format!(
            "{} boxes from {} modules",
            surface.box_count(),
            layout.modules.len()
        ),
    });

    let centers_reachable = layout.modules.iter().all(|&e| {
        world
            .get::<&Module>(e)
            .map(|m| surface.contains(&m.footprint.center()))
            .unwrap_or(false)
    });
    results.push(TestResult {
        name: "nav_module_centers".into(),
        passed: centers_reachable,
        detail: "every module center lies on the surface".into(),
    });

    // The first puzzle room starts at the origin and spans at least 9x7
    let inside = surface.sample_position(Vec3::new(4.0, 0.0, 0.0), 2.0);
    let outside = surface.sample_position(Vec3::new(4.0, 500.0, 0.0), 2.0);
    results.push(TestResult {
        name: "nav_sampling".into(),
        passed: inside.is_some() && outside.is_none(),
        detail: "nearby points snap onto the surface, distant ones fail".into(),
    });

    let clear = surface.segment_clear(Vec3::new(1.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
    let blocked = surface.segment_clear(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 500.0, 0.0));
    results.push(TestResult {
        name: "nav_line_of_sight".into(),
        passed: clear && !blocked,
        detail: "in-room segment clear, through-hull segment blocked".into(),
    });

    results
}

// ── 5. Scripted Hunt ────────────────────────────────────────────────────

fn run_behavior_session(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Scripted Hunt ---");
    let mut results = Vec::new();

    let seed = scenario.seeds.first().copied().unwrap_or(1);
    let mut engine = SimulationEngine::new(seed);
    if let Err(e) = engine.generate(&scenario.level) {
        results.push(TestResult {
            name: "hunt_setup".into(),
            passed: false,
            detail: format!("generation failed: {}", e),
        });
        return results;
    }

    // Target and hunter share the starting room, hunter facing its prey
    let target = engine.spawn_target(Vec3::new(4.0, 0.0, 0.0));
    let params = scenario.creature;
    engine.world.spawn((
        Position::new(2.0, 0.0, 0.0),
        Creature::new(Some(target)),
        params,
        NavAgent::new(params.wander_speed, params.attack_range * 0.8),
        Locomotion::default(),
        FxBank::crab(),
    ));

    let mut saw_chase = false;
    let mut saw_attack = false;
    let mut damage_events = 0u32;
    let mut wrong_damage = 0u32;
    let mut kill_tick: Option<u32> = None;

    for tick in 0..scenario.session_ticks {
        engine.update(scenario.tick_seconds);
        for event in engine.drain_fx() {
            match event {
                FxEvent::StateChanged {
                    to: CreatureState::Chasing,
                    ..
                } => saw_chase = true,
                FxEvent::StateChanged {
                    to: CreatureState::Attacking,
                    ..
                } => saw_attack = true,
                FxEvent::TargetDamaged { amount, .. } => {
                    damage_events += 1;
                    if (amount - params.attack_damage).abs() > f32::EPSILON {
                        wrong_damage += 1;
                    }
                }
                FxEvent::TargetKilled { .. } => {
                    if kill_tick.is_none() {
                        kill_tick = Some(tick);
                    }
                }
                _ => {}
            }
        }
    }

    results.push(TestResult {
        name: "hunt_detection".into(),
        passed: saw_chase,
        detail: "hunter spotted the target and gave chase".into(),
    });
    results.push(TestResult {
        name: "hunt_attack_started".into(),
        passed: saw_attack,
        detail: "hunter closed in and started an attack".into(),
    });

    let final_health = engine
        .world
        .get::<&Health>(target)
        .map(|h| h.current)
        .unwrap_or(f32::NAN);
    results.push(TestResult {
        name: "hunt_damage_lands".into(),
        passed: damage_events > 0 && final_health < 100.0,
        detail: format!(
            "{} strikes landed, target at {:.0} health",
            damage_events, final_health
        ),
    });
    results.push(TestResult {
        name: "hunt_damage_amounts".into(),
        passed: wrong_damage == 0,
        detail: format!("every strike dealt {}", params.attack_damage),
    });

    results.push(TestResult {
        name: "hunt_kill".into(),
        passed: kill_tick.is_some() && final_health <= 0.0,
        detail: match kill_tick {
            Some(t) => format!(
                "target died at t={:.1}s",
                (t + 1) as f32 * scenario.tick_seconds
            ),
            None => "target survived the session".into(),
        },
    });

    results.push(TestResult {
        name: "hunt_idle_after_kill".into(),
        passed: engine.creatures_in_state(CreatureState::Idle) == 1,
        detail: "hunter went idle once its prey died".into(),
    });

    if verbose {
        println!(
            "  session: {} strikes, kill at {:?}, final health {:.0}",
            damage_events, kill_tick, final_health
        );
    }

    results
}

// ── 6. Session Determinism ──────────────────────────────────────────────

fn validate_determinism(scenario: &Scenario) -> Vec<TestResult> {
    println!("--- Session Determinism ---");
    let mut results = Vec::new();

    let seed = scenario.seeds.first().copied().unwrap_or(1);
    let run = || -> Option<(usize, Vec<String>, String, usize)> {
        let mut engine = SimulationEngine::new(seed);
        engine.generate(&scenario.level).ok()?;
        let target = engine.spawn_target(Vec3::new(4.0, 0.0, 0.0));
        engine.spawn_creatures(Vec3::new(4.0, 0.0, 0.0), &scenario.creature, &scenario.spawn);

        let mut fx_total = 0;
        for _ in 0..scenario.session_ticks {
            engine.update(scenario.tick_seconds);
            fx_total += engine.drain_fx().len();
        }

        let mut creatures: Vec<String> = engine
            .world
            .query::<(&Creature, &Position)>()
            .iter()
            .map(|(e, (c, p))| format!("{:?} {:?} {:?} {}", e, c.state, p.point, p.yaw))
            .collect();
        creatures.sort();

        let health = engine
            .world
            .get::<&Health>(target)
            .map(|h| format!("{}", h.current))
            .ok()?;

        Some((engine.module_count(), creatures, health, fx_total))
    };

    let first = run();
    let second = run();
    results.push(TestResult {
        name: "session_deterministic".into(),
        passed: first.is_some() && first == second,
        detail: format!("seed {} replays identically across two sessions", seed),
    });

    results
}
