#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn engine that drives one Village Defence game.
//!
//! [`Simulation`] owns the authoritative [`World`] and the pure systems. Every
//! request is translated into commands, applied through [`world::apply`], and
//! the resulting events are mirrored into the injected [`TerrainProvider`] and
//! [`TileRenderer`] collaborators.

mod config;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{info, warn};
use village_defence_core::{
    BuildingId, BuildingKind, Cell, Command, Event, GameOverCause, Layer, MapBounds,
    PlacementError, RemovalError, Sprite, TerrainProvider, TileRenderer, TurnSummary,
};
use village_defence_system_barracks_combat::BarracksCombat;
use village_defence_system_builder::{BuildRequest, Builder, PlacementPreview};
use village_defence_system_movement::Movement;
use village_defence_system_spawning::Spawning;
use village_defence_world::{
    self as world, query, BuildingRegistry, EnemyRegistry, ResourceLedger, World,
};

pub use config::{Config, ConfigError, MapConfig};

/// Errors surfaced by player-facing simulation requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The game has ended; no further requests are accepted.
    #[error("the game is over: {0}")]
    GameOver(GameOverCause),
    /// A placement was refused.
    #[error(transparent)]
    Placement(#[from] PlacementError),
    /// A removal was refused.
    #[error(transparent)]
    Removal(#[from] RemovalError),
    /// The world reported neither success nor rejection for a request.
    #[error("no outcome was reported for the request at {cell}")]
    Unresolved {
        /// Cell the request targeted.
        cell: Cell,
    },
}

/// A running game wired to its terrain and rendering collaborators.
#[derive(Debug)]
pub struct Simulation<T, R> {
    world: World,
    terrain: T,
    renderer: R,
    rng: ChaCha8Rng,
    builder: Builder,
    spawning: Spawning,
    movement: Movement,
    combat: BarracksCombat,
    events: Vec<Event>,
}

impl<T: TerrainProvider, R: TileRenderer> Simulation<T, R> {
    /// Starts a game: clears the initial fog and places the free townhall.
    pub fn new(config: &Config, terrain: T, renderer: R) -> Self {
        let mut simulation = Self {
            world: World::new(config.map.bounds(), config.ledger),
            terrain,
            renderer,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            builder: Builder::new(config.placement),
            spawning: Spawning::new(),
            movement: Movement::new(),
            combat: BarracksCombat::new(),
            events: Vec::new(),
        };

        // No map cell lies farther from the origin than width + height.
        let reach = config.map.width.saturating_add(config.map.height);
        simulation
            .terrain
            .reveal_fog(Cell::ORIGIN, config.initial_reveal_radius.min(reach));

        if let Some(cell) = config.townhall {
            simulation.events.clear();
            simulation.dispatch([Command::PlaceBuilding {
                kind: BuildingKind::Townhall,
                cell,
            }]);
            if let Some(reason) = simulation.placement_rejection() {
                warn!(%cell, %reason, "townhall could not be placed");
            }
        }

        info!(
            seed = config.seed,
            width = config.map.width,
            height = config.map.height,
            "simulation started"
        );
        simulation
    }

    /// Places a building chosen by name from the buy menu.
    pub fn place_building(
        &mut self,
        kind_name: &str,
        cell: Cell,
    ) -> Result<BuildingId, SimulationError> {
        self.ensure_running()?;
        self.events.clear();

        let mut commands = Vec::new();
        self.builder.handle(
            BuildRequest::Place {
                kind_name: kind_name.to_owned(),
                cell,
            },
            &self.terrain,
            &mut commands,
        )?;
        self.dispatch(commands);

        let mut outcome = Err(SimulationError::Unresolved { cell });
        for event in &self.events {
            match event {
                Event::BuildingPlaced { id, .. } => outcome = Ok(*id),
                Event::PlacementRejected { reason, .. } => outcome = Err((*reason).into()),
                _ => {}
            }
        }
        outcome
    }

    /// Places a building of the provided kind.
    pub fn place(&mut self, kind: BuildingKind, cell: Cell) -> Result<BuildingId, SimulationError> {
        self.place_building(kind.name(), cell)
    }

    /// Demolishes the building at the cell.
    ///
    /// Demolishing the townhall succeeds and ends the game.
    pub fn remove_building(&mut self, cell: Cell) -> Result<BuildingId, SimulationError> {
        self.ensure_running()?;
        self.events.clear();

        let mut commands = Vec::new();
        self.builder
            .handle(BuildRequest::Remove { cell }, &self.terrain, &mut commands)?;
        self.dispatch(commands);

        let mut outcome = Err(SimulationError::Removal(RemovalError::BuildingNotFound {
            cell,
        }));
        for event in &self.events {
            match event {
                Event::BuildingRemoved { id, .. } => outcome = Ok(*id),
                Event::RemovalRejected { reason } => outcome = Err((*reason).into()),
                _ => {}
            }
        }
        outcome
    }

    /// Evaluates a placement against the current state without applying it.
    #[must_use]
    pub fn preview(&self, kind: BuildingKind, cell: Cell) -> PlacementPreview {
        self.builder.preview(
            kind,
            cell,
            &self.terrain,
            query::buildings(&self.world),
            query::ledger(&self.world),
        )
    }

    /// Resolves one day.
    ///
    /// The day advances and the population eats; then every enemy acts in
    /// spawn order, the day's wave arrives, buildings produce and each
    /// barracks strikes. The tick stops as soon as the game ends.
    pub fn advance_day(&mut self) -> Result<TurnSummary, SimulationError> {
        self.ensure_running()?;
        self.events.clear();

        self.dispatch([Command::BeginDay, Command::ConsumeFood]);
        if self.game_over().is_none() {
            self.resolve_enemies();
        }
        if self.game_over().is_none() {
            self.resolve_buildings();
        }

        let summary = self.summarize();
        info!(
            day = summary.day,
            food = summary.ledger.food,
            population = summary.ledger.population,
            spawned = summary.enemies_spawned,
            killed = summary.enemies_killed,
            destroyed = summary.buildings_destroyed.len(),
            enemies = summary.enemy_count,
            buildings = summary.building_count,
            "day resolved"
        );
        Ok(summary)
    }

    /// Reason the game ended, if it has.
    #[must_use]
    pub fn game_over(&self) -> Option<GameOverCause> {
        query::game_over(&self.world)
    }

    /// Position of the building closest to `cell` by Manhattan distance.
    #[must_use]
    pub fn nearest_building(&self, cell: Cell) -> Option<Cell> {
        query::buildings(&self.world).nearest_building(cell)
    }

    /// Reports whether the cell is defended by any barracks.
    #[must_use]
    pub fn is_within_kill_range_of_any_barracks(&self, cell: Cell) -> bool {
        query::buildings(&self.world).is_within_kill_range_of_any_barracks(cell)
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Economy counters.
    #[must_use]
    pub fn ledger(&self) -> &ResourceLedger {
        query::ledger(&self.world)
    }

    /// Standing buildings.
    #[must_use]
    pub fn buildings(&self) -> &BuildingRegistry {
        query::buildings(&self.world)
    }

    /// Enemies in play.
    #[must_use]
    pub fn enemies(&self) -> &EnemyRegistry {
        query::enemies(&self.world)
    }

    /// Bounds of the playable map.
    #[must_use]
    pub fn bounds(&self) -> MapBounds {
        query::bounds(&self.world)
    }

    /// Terrain collaborator.
    #[must_use]
    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    /// Rendering collaborator.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Events produced by the most recent request.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    fn ensure_running(&self) -> Result<(), SimulationError> {
        match self.game_over() {
            Some(cause) => Err(SimulationError::GameOver(cause)),
            None => Ok(()),
        }
    }

    fn resolve_enemies(&mut self) {
        let mut commands = Vec::new();
        for id in query::enemy_ids(&self.world) {
            let Some(enemy) = query::enemies(&self.world).get(id) else {
                continue;
            };
            commands.clear();
            self.movement
                .act(enemy, query::buildings(&self.world), &mut commands);
            self.dispatch(commands.drain(..));
            if self.game_over().is_some() {
                return;
            }
        }

        commands.clear();
        self.spawning.handle(
            &self.events,
            query::enemies(&self.world),
            &mut self.rng,
            &mut commands,
        );
        self.dispatch(commands);
    }

    fn resolve_buildings(&mut self) {
        self.dispatch([Command::HarvestYields]);

        let barracks: Vec<Cell> = query::buildings(&self.world)
            .barracks()
            .map(|building| building.cell())
            .collect();
        let mut commands = Vec::new();
        for cell in barracks {
            let Some(building) = query::buildings(&self.world).get(cell) else {
                continue;
            };
            self.combat.handle(
                building,
                query::enemies(&self.world),
                &mut self.rng,
                &mut commands,
            );
            self.dispatch(commands.drain(..));
        }
    }

    /// Applies commands in order, mirroring each resulting event.
    fn dispatch<I: IntoIterator<Item = Command>>(&mut self, commands: I) {
        for command in commands {
            let start = self.events.len();
            world::apply(&mut self.world, command, &mut self.events);
            for event in &self.events[start..] {
                mirror(&mut self.terrain, &mut self.renderer, event);
            }
        }
    }

    fn placement_rejection(&self) -> Option<PlacementError> {
        self.events.iter().find_map(|event| match event {
            Event::PlacementRejected { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    fn summarize(&self) -> TurnSummary {
        let mut summary = TurnSummary {
            day: query::ledger(&self.world).day(),
            ledger: query::ledger(&self.world).snapshot(),
            enemy_count: query::enemies(&self.world).len(),
            building_count: query::buildings(&self.world).len(),
            game_over: self.game_over(),
            ..TurnSummary::default()
        };
        for event in &self.events {
            match event {
                Event::EnemySpawned { .. } => summary.enemies_spawned += 1,
                Event::EnemyKilled { .. } => summary.enemies_killed += 1,
                Event::BuildingRemoved { id, .. } => summary.buildings_destroyed.push(*id),
                _ => {}
            }
        }
        summary
    }
}

/// Mirrors a world event into the collaborators.
fn mirror<T: TerrainProvider, R: TileRenderer>(terrain: &mut T, renderer: &mut R, event: &Event) {
    match *event {
        Event::BuildingPlaced { id, cell } => {
            let kind = id.kind();
            renderer.draw(Layer::Building, cell, Sprite::Building(kind));
            if !kind.keeps_terrain_visible() {
                renderer.clear(Layer::Terrain, cell);
            }
            terrain.reveal_fog(cell, kind.sight());
        }
        Event::BuildingRemoved { cell, .. } => renderer.clear(Layer::Building, cell),
        Event::EnemySpawned { enemy, cell } => {
            renderer.draw(Layer::Enemy, cell, Sprite::Enemy(enemy.kind()));
        }
        Event::EnemyMoved { enemy, from, to } => {
            renderer.clear(Layer::Enemy, from);
            renderer.draw(Layer::Enemy, to, Sprite::Enemy(enemy.kind()));
        }
        Event::EnemyKilled { cell, .. } => renderer.clear(Layer::Enemy, cell),
        _ => {}
    }
}
