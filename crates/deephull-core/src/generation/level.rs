//! Level topology generation.
//!
//! The level is grown from a starting frontier: a main path of puzzle room,
//! straight hallway, and junction repeated `main_path_length` times, capped
//! with the escape room. At every junction one exit continues the main path
//! and each remaining exit grows a recursive side branch, so no socket is
//! left unterminated.

use hecs::{Entity, World};
use log::{debug, error, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::prefabs::{Prefab, PrefabCatalog, SocketKind};
use crate::components::{BoundingBox, Module, Vec3};

/// Interior height applied to every placed module's footprint
const DECK_HEIGHT: f32 = 3.0;

const BRANCH_EXITS: &[SocketKind] = &[SocketKind::Forward, SocketKind::Left, SocketKind::Right];
const SPLIT_EXITS: &[SocketKind] = &[SocketKind::Forward, SocketKind::Side];

/// Tuning knobs for level generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Number of puzzle room / hallway / junction legs before the escape room
    pub main_path_length: u32,
    /// Inclusive depth range drawn for each side branch off the main path
    pub branch_depth_min: i32,
    pub branch_depth_max: i32,
    /// Probability a junction is a two-way split rather than a three-way branch
    pub split_chance: f64,
    /// Cap open branch ends with dead-end modules
    pub place_dead_ends: bool,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            main_path_length: 5,
            branch_depth_min: 1,
            branch_depth_max: 3,
            split_chance: 0.5,
            place_dead_ends: true,
        }
    }
}

/// Level generation failure
#[derive(Debug)]
pub enum GenError {
    NoPuzzleRooms,
    MissingSocket { prefab: String, socket: SocketKind },
    InvalidConfig(String),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::NoPuzzleRooms => write!(f, "prefab catalog has no puzzle rooms"),
            GenError::MissingSocket { prefab, socket } => {
                write!(f, "prefab '{}' is missing its {:?} socket", prefab, socket)
            }
            GenError::InvalidConfig(msg) => write!(f, "invalid level config: {}", msg),
        }
    }
}

impl std::error::Error for GenError {}

/// An open connector the generator continues from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frontier {
    pub position: Vec3,
    pub yaw: f32,
}

impl Frontier {
    pub fn origin() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

/// Everything the generator placed, in placement order
#[derive(Debug, Clone)]
pub struct LevelLayout {
    /// Every placed module
    pub modules: Vec<Entity>,
    /// The start-to-escape sequence, in walk order
    pub main_path: Vec<Entity>,
    pub escape_room: Option<Entity>,
    /// The socket the escape room was placed at
    pub terminal: Frontier,
    /// False when any placement had to abandon its path
    pub complete: bool,
}

impl LevelLayout {
    fn new(start: Frontier) -> Self {
        Self {
            modules: Vec::new(),
            main_path: Vec::new(),
            escape_room: None,
            terminal: start,
            complete: true,
        }
    }
}

/// Grow a level into the world, starting from `start`. Call once per level.
pub fn generate_level(
    world: &mut World,
    catalog: &PrefabCatalog,
    start: Frontier,
    config: &LevelConfig,
    rng: &mut impl Rng,
) -> Result<LevelLayout, GenError> {
    catalog.validate().map_err(|e| {
        error!("prefab catalog rejected: {}", e);
        e
    })?;
    validate_config(config)?;

    let mut layout = LevelLayout::new(start);
    let mut frontier = start;
    let mut main_path_done = true;

    for _ in 0..config.main_path_length {
        let room = catalog.random_puzzle_room(rng);
        place_module(world, &mut layout, room, frontier, true);
        let Some(after_room) = socket_world(room, frontier, SocketKind::Exit) else {
            error!("{} has no exit socket, stopping the main path", room.name);
            main_path_done = false;
            break;
        };

        place_module(world, &mut layout, &catalog.straight_hall, after_room, true);
        let Some(after_hall) =
            socket_world(&catalog.straight_hall, after_room, SocketKind::Exit)
        else {
            error!(
                "{} has no exit socket, stopping the main path",
                catalog.straight_hall.name
            );
            main_path_done = false;
            break;
        };

        let (junction, exits) = pick_junction(catalog, config, rng);
        place_module(world, &mut layout, junction, after_hall, true);
        let chosen = exits[rng.gen_range(0..exits.len())];

        let Some(next) = socket_world(junction, after_hall, chosen) else {
            error!(
                "{} is missing its {:?} socket, stopping the main path",
                junction.name, chosen
            );
            main_path_done = false;
            break;
        };

        // Every exit the main path does not take grows its own side branch
        for &exit in exits {
            if exit == chosen {
                continue;
            }
            match socket_world(junction, after_hall, exit) {
                Some(socket) => {
                    let depth =
                        rng.gen_range(config.branch_depth_min..=config.branch_depth_max);
                    generate_branch(world, &mut layout, catalog, socket, depth, config, rng);
                }
                None => {
                    error!("{} is missing its {:?} socket", junction.name, exit);
                    layout.complete = false;
                }
            }
        }

        frontier = next;
    }

    if main_path_done {
        let escape = place_module(world, &mut layout, &catalog.escape_room, frontier, true);
        layout.escape_room = Some(escape);
    } else {
        layout.complete = false;
    }
    layout.terminal = frontier;

    info!(
        "generated level: {} modules, {} on the main path, complete: {}",
        layout.modules.len(),
        layout.main_path.len(),
        layout.complete
    );
    Ok(layout)
}

fn validate_config(config: &LevelConfig) -> Result<(), GenError> {
    if config.main_path_length == 0 {
        return Err(GenError::InvalidConfig(
            "main_path_length must be at least 1".to_string(),
        ));
    }
    if config.branch_depth_min > config.branch_depth_max {
        return Err(GenError::InvalidConfig(
            "branch_depth_min exceeds branch_depth_max".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.split_chance) {
        return Err(GenError::InvalidConfig(
            "split_chance must be within [0, 1]".to_string(),
        ));
    }
    Ok(())
}

/// Grow a side branch from an open socket. Depth 0 is a leaf; otherwise a
/// puzzle room, and deeper branches continue through another junction whose
/// every exit recurses one level shallower.
fn generate_branch(
    world: &mut World,
    layout: &mut LevelLayout,
    catalog: &PrefabCatalog,
    from: Frontier,
    depth: i32,
    config: &LevelConfig,
    rng: &mut impl Rng,
) {
    if depth <= 0 {
        if config.place_dead_ends {
            place_module(world, layout, &catalog.dead_end, from, false);
        }
        return;
    }

    let room = catalog.random_puzzle_room(rng);
    place_module(world, layout, room, from, false);
    let Some(after_room) = socket_world(room, from, SocketKind::Exit) else {
        error!("{} has no exit socket, abandoning branch", room.name);
        layout.complete = false;
        return;
    };

    if depth == 1 {
        if config.place_dead_ends {
            place_module(world, layout, &catalog.dead_end, after_room, false);
        }
        return;
    }

    place_module(world, layout, &catalog.straight_hall, after_room, false);
    let Some(after_hall) = socket_world(&catalog.straight_hall, after_room, SocketKind::Exit)
    else {
        error!(
            "{} has no exit socket, abandoning branch",
            catalog.straight_hall.name
        );
        layout.complete = false;
        return;
    };

    let (junction, exits) = pick_junction(catalog, config, rng);
    place_module(world, layout, junction, after_hall, false);
    for &exit in exits {
        match socket_world(junction, after_hall, exit) {
            Some(socket) => {
                generate_branch(world, layout, catalog, socket, depth - 1, config, rng);
            }
            None => {
                error!("{} is missing its {:?} socket", junction.name, exit);
                layout.complete = false;
            }
        }
    }
}

fn pick_junction<'a>(
    catalog: &'a PrefabCatalog,
    config: &LevelConfig,
    rng: &mut impl Rng,
) -> (&'a Prefab, &'static [SocketKind]) {
    if rng.gen_bool(config.split_chance) {
        (&catalog.split_hall, SPLIT_EXITS)
    } else {
        (&catalog.branching_hall, BRANCH_EXITS)
    }
}

/// Spawn a module entity for `prefab` at the frontier transform
fn place_module(
    world: &mut World,
    layout: &mut LevelLayout,
    prefab: &Prefab,
    at: Frontier,
    on_main_path: bool,
) -> Entity {
    let sequence = layout.modules.len() as u32;
    let module = Module {
        name: format!("{} {}", prefab.name, sequence + 1),
        kind: prefab.kind,
        origin: at.position,
        yaw: at.yaw,
        footprint: module_footprint(prefab, at),
        sequence,
        on_main_path,
    };
    debug!(
        "placed {} at ({:.1}, {:.1}) yaw {:.2}",
        module.name, at.position.x, at.position.y, at.yaw
    );

    let entity = world.spawn((module,));
    layout.modules.push(entity);
    if on_main_path {
        layout.main_path.push(entity);
    }
    entity
}

/// World AABB of the prefab's floor rectangle placed at the frontier
fn module_footprint(prefab: &Prefab, at: Frontier) -> BoundingBox {
    let half = prefab.width / 2.0;
    let corners = [
        Vec3::new(0.0, -half, 0.0),
        Vec3::new(0.0, half, 0.0),
        Vec3::new(prefab.length, -half, 0.0),
        Vec3::new(prefab.length, half, 0.0),
    ];
    let placed: Vec<Vec3> = corners
        .iter()
        .map(|c| c.rotated_yaw(at.yaw) + at.position)
        .collect();
    let mut bounds = BoundingBox::from_points(&placed);
    bounds.max.z = at.position.z + DECK_HEIGHT;
    bounds
}

/// Map a prefab-local socket into world space from the frontier it was placed at
fn socket_world(prefab: &Prefab, at: Frontier, kind: SocketKind) -> Option<Frontier> {
    let socket = prefab.socket(kind)?;
    Some(Frontier {
        position: at.position + socket.offset.rotated_yaw(at.yaw),
        yaw: at.yaw + socket.yaw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ModuleKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn module(world: &World, entity: Entity) -> Module {
        Module::clone(&world.get::<&Module>(entity).unwrap())
    }

    #[test]
    fn test_main_path_follows_the_room_hall_junction_pattern() {
        for seed in [1u64, 7, 42, 1337] {
            let mut world = World::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let config = LevelConfig::default();

            let layout = generate_level(
                &mut world,
                &PrefabCatalog::builtin(),
                Frontier::origin(),
                &config,
                &mut rng,
            )
            .unwrap();

            assert!(layout.complete, "seed {}", seed);
            assert_eq!(
                layout.main_path.len(),
                (config.main_path_length * 3 + 1) as usize,
                "seed {}",
                seed
            );

            for leg in 0..config.main_path_length as usize {
                let room = module(&world, layout.main_path[leg * 3]);
                let hall = module(&world, layout.main_path[leg * 3 + 1]);
                let junction = module(&world, layout.main_path[leg * 3 + 2]);

                assert_eq!(room.kind, ModuleKind::PuzzleRoom);
                assert_eq!(hall.kind, ModuleKind::StraightHall);
                assert!(
                    junction.kind == ModuleKind::BranchingHall
                        || junction.kind == ModuleKind::SplitHall,
                    "leg {} of seed {} ended with {:?}",
                    leg,
                    seed,
                    junction.kind
                );
            }

            let last = module(&world, *layout.main_path.last().unwrap());
            assert_eq!(last.kind, ModuleKind::EscapeRoom);
            assert_eq!(layout.escape_room, layout.main_path.last().copied());
            assert_eq!(last.origin, layout.terminal.position);
        }
    }

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let catalog = PrefabCatalog::builtin();
        let config = LevelConfig::default();

        let mut world_a = World::new();
        let mut rng_a = StdRng::seed_from_u64(99);
        let layout_a =
            generate_level(&mut world_a, &catalog, Frontier::origin(), &config, &mut rng_a)
                .unwrap();

        let mut world_b = World::new();
        let mut rng_b = StdRng::seed_from_u64(99);
        let layout_b =
            generate_level(&mut world_b, &catalog, Frontier::origin(), &config, &mut rng_b)
                .unwrap();

        assert_eq!(layout_a.modules.len(), layout_b.modules.len());
        for (ea, eb) in layout_a.modules.iter().zip(&layout_b.modules) {
            let a = module(&world_a, *ea);
            let b = module(&world_b, *eb);
            assert_eq!(a.name, b.name);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.origin, b.origin);
            assert_eq!(a.yaw, b.yaw);
            assert_eq!(a.on_main_path, b.on_main_path);
        }
    }

    #[test]
    fn test_every_unchosen_exit_grows_a_capped_branch() {
        // Depth locked to zero: each unchosen exit becomes exactly one dead end
        let config = LevelConfig {
            branch_depth_min: 0,
            branch_depth_max: 0,
            ..Default::default()
        };

        for seed in [3u64, 8, 21] {
            let mut world = World::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let layout = generate_level(
                &mut world,
                &PrefabCatalog::builtin(),
                Frontier::origin(),
                &config,
                &mut rng,
            )
            .unwrap();

            let mut splits = 0;
            let mut branchings = 0;
            let mut dead_ends = 0;
            for &e in &layout.modules {
                match module(&world, e).kind {
                    ModuleKind::SplitHall => splits += 1,
                    ModuleKind::BranchingHall => branchings += 1,
                    ModuleKind::DeadEnd => dead_ends += 1,
                    _ => {}
                }
            }

            assert_eq!(
                splits + branchings,
                config.main_path_length as usize,
                "seed {}",
                seed
            );
            assert_eq!(dead_ends, splits + 2 * branchings, "seed {}", seed);
        }
    }

    #[test]
    fn test_dead_end_caps_can_be_disabled() {
        let config = LevelConfig {
            branch_depth_min: 0,
            branch_depth_max: 0,
            place_dead_ends: false,
            ..Default::default()
        };

        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(5);
        let layout = generate_level(
            &mut world,
            &PrefabCatalog::builtin(),
            Frontier::origin(),
            &config,
            &mut rng,
        )
        .unwrap();

        let dead_ends = layout
            .modules
            .iter()
            .filter(|&&e| module(&world, e).kind == ModuleKind::DeadEnd)
            .count();
        assert_eq!(dead_ends, 0);
    }

    #[test]
    fn test_branches_get_deeper_with_the_depth_range() {
        let shallow = LevelConfig {
            branch_depth_min: 0,
            branch_depth_max: 0,
            ..Default::default()
        };
        let deep = LevelConfig {
            branch_depth_min: 3,
            branch_depth_max: 3,
            ..Default::default()
        };

        let count = |config: &LevelConfig| {
            let mut world = World::new();
            let mut rng = StdRng::seed_from_u64(11);
            generate_level(
                &mut world,
                &PrefabCatalog::builtin(),
                Frontier::origin(),
                config,
                &mut rng,
            )
            .unwrap()
            .modules
            .len()
        };

        assert!(count(&deep) > count(&shallow));
    }

    #[test]
    fn test_sequences_run_in_placement_order() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(2);
        let layout = generate_level(
            &mut world,
            &PrefabCatalog::builtin(),
            Frontier::origin(),
            &LevelConfig::default(),
            &mut rng,
        )
        .unwrap();

        for (i, &e) in layout.modules.iter().enumerate() {
            assert_eq!(module(&world, e).sequence, i as u32);
        }
    }

    #[test]
    fn test_side_branch_modules_are_off_the_main_path() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(13);
        let layout = generate_level(
            &mut world,
            &PrefabCatalog::builtin(),
            Frontier::origin(),
            &LevelConfig::default(),
            &mut rng,
        )
        .unwrap();

        for &e in &layout.modules {
            let m = module(&world, e);
            assert_eq!(m.on_main_path, layout.main_path.contains(&e));
        }
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let catalog = PrefabCatalog::builtin();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(1);

        let zero_legs = LevelConfig {
            main_path_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            generate_level(&mut world, &catalog, Frontier::origin(), &zero_legs, &mut rng),
            Err(GenError::InvalidConfig(_))
        ));

        let inverted = LevelConfig {
            branch_depth_min: 4,
            branch_depth_max: 1,
            ..Default::default()
        };
        assert!(matches!(
            generate_level(&mut world, &catalog, Frontier::origin(), &inverted, &mut rng),
            Err(GenError::InvalidConfig(_))
        ));

        let bad_chance = LevelConfig {
            split_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            generate_level(&mut world, &catalog, Frontier::origin(), &bad_chance, &mut rng),
            Err(GenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let mut catalog = PrefabCatalog::builtin();
        catalog.puzzle_rooms.clear();

        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            generate_level(
                &mut world,
                &catalog,
                Frontier::origin(),
                &LevelConfig::default(),
                &mut rng
            ),
            Err(GenError::NoPuzzleRooms)
        ));
        assert_eq!(world.len(), 0, "nothing placed on a rejected catalog");
    }

    #[test]
    fn test_level_config_reads_from_json() {
        let config: LevelConfig = serde_json::from_str(
            r#"{
                "main_path_length": 4,
                "branch_depth_min": 0,
                "branch_depth_max": 2,
                "split_chance": 0.25,
                "place_dead_ends": false
            }"#,
        )
        .unwrap();
        assert_eq!(config.main_path_length, 4);
        assert_eq!(config.branch_depth_min, 0);
        assert_eq!(config.branch_depth_max, 2);
        assert!(!config.place_dead_ends);
    }

    #[test]
    fn test_modules_connect_at_sockets() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(4);
        let layout = generate_level(
            &mut world,
            &PrefabCatalog::builtin(),
            Frontier::origin(),
            &LevelConfig::default(),
            &mut rng,
        )
        .unwrap();

        // The first room sits at the origin; the first hallway begins where
        // that room's exit socket is, on the same axis.
        let first = module(&world, layout.main_path[0]);
        let hall = module(&world, layout.main_path[1]);
        assert_eq!(first.origin, Vec3::ZERO);
        assert_eq!(hall.yaw, 0.0);
        assert!(hall.origin.x > first.origin.x);
        assert_eq!(hall.origin.y, 0.0);

        // Footprints of connected modules touch
        assert!(first.footprint.max.x >= hall.footprint.min.x);
    }
}
