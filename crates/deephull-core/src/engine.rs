//! Simulation engine - owns the world and drives all systems.
//!
//! Typical lifecycle: `new` with a seed, `generate` the level, `spawn_target`
//! and `spawn_creatures`, then call `update` every frame and drain the effect
//! queue for presentation.

use hecs::{Entity, World};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Creature, CreatureParams, CreatureState, Vec3};
use crate::generation::{
    generate_level, spawn_creatures, spawn_target, Frontier, GenError, LevelConfig, LevelLayout,
    PrefabCatalog, SpawnConfig,
};
use crate::systems::{
    action_system, behavior_system, health_system, navigation_system, FxEvent, FxQueue,
    NavSurface,
};

/// Navigation advances on a fixed step for stable movement
const NAV_STEP: f32 = 1.0 / 50.0;

pub struct SimulationEngine {
    pub world: World,
    /// Effects emitted since the last drain
    pub fx: FxQueue,
    catalog: PrefabCatalog,
    level: Option<LevelLayout>,
    surface: NavSurface,
    target: Option<Entity>,
    rng: StdRng,
    seed: u64,
    sim_time: f64,
    nav_accumulator: f32,
}

impl SimulationEngine {
    pub fn new(seed: u64) -> Self {
        info!("simulation engine initialized with seed {}", seed);
        Self {
            world: World::new(),
            fx: FxQueue::new(),
            catalog: PrefabCatalog::builtin(),
            level: None,
            surface: NavSurface::new(),
            target: None,
            rng: StdRng::seed_from_u64(seed),
            seed,
            sim_time: 0.0,
            nav_accumulator: 0.0,
        }
    }

    pub fn with_catalog(seed: u64, catalog: PrefabCatalog) -> Self {
        let mut engine = Self::new(seed);
        engine.catalog = catalog;
        engine
    }

    /// Generate the level topology and build the navigable surface from it.
    /// Call once; repeat calls are ignored.
    pub fn generate(&mut self, config: &LevelConfig) -> Result<(), GenError> {
        if self.level.is_some() {
            warn!("level already generated, ignoring repeat call");
            return Ok(());
        }
        let layout = generate_level(
            &mut self.world,
            &self.catalog,
            Frontier::origin(),
            config,
            &mut self.rng,
        )?;
        self.surface = NavSurface::from_world(&self.world);
        self.level = Some(layout);
        Ok(())
    }

    /// Place the entity the creatures hunt
    pub fn spawn_target(&mut self, position: Vec3) -> Entity {
        let target = spawn_target(&mut self.world, position);
        self.target = Some(target);
        target
    }

    /// Scatter creatures around `center`. Requires a target to hunt.
    pub fn spawn_creatures(
        &mut self,
        center: Vec3,
        params: &CreatureParams,
        config: &SpawnConfig,
    ) -> Vec<Entity> {
        let Some(target) = self.target else {
            warn!("no target spawned, skipping creature placement");
            return Vec::new();
        };
        spawn_creatures(
            &mut self.world,
            &self.surface,
            center,
            target,
            params,
            config,
            &mut self.rng,
        )
    }

    /// Advance the simulation. Navigation runs on its fixed internal step;
    /// the other systems tick once with the full delta.
    pub fn update(&mut self, delta_seconds: f32) {
        self.sim_time += delta_seconds as f64;

        self.nav_accumulator += delta_seconds;
        while self.nav_accumulator >= NAV_STEP {
            navigation_system(&mut self.world, NAV_STEP);
            self.nav_accumulator -= NAV_STEP;
        }

        action_system(&mut self.world, &mut self.fx, delta_seconds);
        behavior_system(
            &mut self.world,
            &self.surface,
            &mut self.fx,
            delta_seconds,
            &mut self.rng,
        );
        health_system(&mut self.world, delta_seconds);
    }

    /// Take everything emitted since the last drain
    pub fn drain_fx(&mut self) -> Vec<FxEvent> {
        self.fx.drain()
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn level(&self) -> Option<&LevelLayout> {
        self.level.as_ref()
    }

    pub fn nav_surface(&self) -> &NavSurface {
        &self.surface
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn module_count(&self) -> usize {
        self.level.as_ref().map_or(0, |l| l.modules.len())
    }

    pub fn creature_count(&self) -> usize {
        self.world.query::<&Creature>().iter().count()
    }

    pub fn creatures_in_state(&self, state: CreatureState) -> usize {
        self.world
            .query::<&Creature>()
            .iter()
            .filter(|(_, c)| c.state == state)
            .count()
    }
}
