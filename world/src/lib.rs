#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Village Defence.
//!
//! The world owns the economy ledger and both registries. It mutates them only
//! through [`apply`], which reports every outcome as an [`Event`] so that the
//! turn engine can mirror changes into its collaborators.

mod buildings;
mod enemies;
mod ledger;

use tracing::{debug, info};
use village_defence_core::{
    BuildingKind, Command, EnemyKind, Event, GameOverCause, LedgerSnapshot, MapBounds,
};

pub use buildings::{Building, BuildingRegistry};
pub use enemies::{Enemy, EnemyRegistry, MoveOutcome};
pub use ledger::{FoodOutcome, ResourceLedger};

/// Represents the authoritative Village Defence world state.
#[derive(Debug)]
pub struct World {
    ledger: ResourceLedger,
    buildings: BuildingRegistry,
    enemies: EnemyRegistry,
    game_over: Option<GameOverCause>,
}

impl World {
    /// Creates a world with an empty map of the provided bounds and a ledger
    /// seeded from `start`.
    #[must_use]
    pub fn new(bounds: MapBounds, start: LedgerSnapshot) -> Self {
        Self {
            ledger: ResourceLedger::new(start),
            buildings: BuildingRegistry::new(),
            enemies: EnemyRegistry::new(bounds),
            game_over: None,
        }
    }

    fn end_game(&mut self, cause: GameOverCause, out_events: &mut Vec<Event>) {
        if self.game_over.is_some() {
            return;
        }
        info!(%cause, day = self.ledger.day(), "game over");
        self.game_over = Some(cause);
        out_events.push(Event::GameOver { cause });
    }

    fn publish_ledger(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::ResourcesChanged {
            ledger: self.ledger.snapshot(),
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected requests leave the world untouched and are reported as events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginDay => {
            let day = world.ledger.begin_day();
            debug!(day, "day started");
            out_events.push(Event::DayStarted { day });
        }
        Command::ConsumeFood => {
            let staffed = world.buildings.staffed_people();
            match world.ledger.consume_food(staffed) {
                FoodOutcome::Fed { eaten } => {
                    out_events.push(Event::FoodConsumed { amount: eaten });
                }
                FoodOutcome::Shortfall { shortfall } => {
                    debug!(
                        shortfall,
                        population = world.ledger.population(),
                        "food shortfall"
                    );
                    out_events.push(Event::FoodShortfall { shortfall });
                }
            }
            world.publish_ledger(out_events);

            if world.ledger.population() == 0 {
                world.end_game(GameOverCause::Starvation, out_events);
            }
        }
        Command::PlaceBuilding { kind, cell } => {
            match world
                .buildings
                .place_building(kind, cell, &mut world.ledger)
                .map(Building::id)
            {
                Ok(id) => {
                    debug!(building = %id, %cell, "building placed");
                    out_events.push(Event::BuildingPlaced { id, cell });
                    world.publish_ledger(out_events);
                }
                Err(reason) => {
                    debug!(%kind, %cell, %reason, "placement rejected");
                    out_events.push(Event::PlacementRejected { kind, cell, reason });
                }
            }
        }
        Command::RemoveBuilding { cell } => {
            match world.buildings.remove_building(cell, &mut world.ledger) {
                Ok(building) => {
                    let id = building.id();
                    debug!(building = %id, %cell, "building removed");
                    out_events.push(Event::BuildingRemoved { id, cell });
                    world.publish_ledger(out_events);

                    if id.kind() == BuildingKind::Townhall {
                        world.end_game(GameOverCause::TownhallDestroyed, out_events);
                    }
                }
                Err(reason) => {
                    debug!(%cell, %reason, "removal rejected");
                    out_events.push(Event::RemovalRejected { reason });
                }
            }
        }
        Command::SpawnEnemy { cell } => match world.enemies.add_enemy(EnemyKind::Brute, cell) {
            Some(enemy) => {
                debug!(%enemy, %cell, "enemy spawned");
                out_events.push(Event::EnemySpawned { enemy, cell });
            }
            None => out_events.push(Event::EnemySpawnBlocked { cell }),
        },
        Command::MoveEnemy { enemy, to } => match world.enemies.move_enemy(enemy, to) {
            MoveOutcome::Moved { from } => {
                out_events.push(Event::EnemyMoved { enemy, from, to });
            }
            MoveOutcome::Blocked => out_events.push(Event::EnemyBlocked { enemy, to }),
            MoveOutcome::Stayed | MoveOutcome::Missing => {}
        },
        Command::KillEnemy { enemy } => {
            if let Some(killed) = world.enemies.remove_enemy(enemy) {
                let cell = killed.cell();
                debug!(%enemy, %cell, "enemy killed");
                out_events.push(Event::EnemyKilled { enemy, cell });
            }
        }
        Command::HarvestYields => {
            let produced = world.buildings.output_resources(&mut world.ledger);
            for (building, output) in produced {
                out_events.push(Event::ResourcesProduced { building, output });
            }
            world.publish_ledger(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use village_defence_core::{EnemyId, GameOverCause, MapBounds};

    use super::{BuildingRegistry, EnemyRegistry, ResourceLedger, World};

    /// Provides read-only access to the economy ledger.
    #[must_use]
    pub fn ledger(world: &World) -> &ResourceLedger {
        &world.ledger
    }

    /// Provides read-only access to the standing buildings.
    #[must_use]
    pub fn buildings(world: &World) -> &BuildingRegistry {
        &world.buildings
    }

    /// Provides read-only access to the enemies in play.
    #[must_use]
    pub fn enemies(world: &World) -> &EnemyRegistry {
        &world.enemies
    }

    /// Identifiers of every enemy in spawn order.
    #[must_use]
    pub fn enemy_ids(world: &World) -> Vec<EnemyId> {
        world.enemies.ids()
    }

    /// Reason the game ended, if it has.
    #[must_use]
    pub fn game_over(world: &World) -> Option<GameOverCause> {
        world.game_over
    }

    /// Bounds of the playable map.
    #[must_use]
    pub fn bounds(world: &World) -> MapBounds {
        world.enemies.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_defence_core::{Cell, PlacementError, RemovalError, Resource};

    fn world_with(start: LedgerSnapshot) -> World {
        World::new(MapBounds::centered(10, 10), start)
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn begin_day_advances_the_counter() {
        let mut world = world_with(LedgerSnapshot::default());

        let events = run(&mut world, Command::BeginDay);

        assert_eq!(events, vec![Event::DayStarted { day: 2 }]);
        assert_eq!(query::ledger(&world).day(), 2);
    }

    #[test]
    fn placement_reports_the_new_identifier_and_ledger() {
        let mut world = world_with(LedgerSnapshot::default());

        let events = run(
            &mut world,
            Command::PlaceBuilding {
                kind: BuildingKind::Farm,
                cell: Cell::new(1, 1),
            },
        );

        assert!(matches!(
            events.as_slice(),
            [
                Event::BuildingPlaced { id, cell },
                Event::ResourcesChanged { ledger },
            ] if id.to_string() == "Farm 0" && *cell == Cell::new(1, 1) && ledger.wood == 9
        ));
    }

    #[test]
    fn rejected_placement_leaves_state_unchanged() {
        let mut world = world_with(LedgerSnapshot {
            people: 0,
            wood: 0,
            metal: 0,
            stone: 0,
            ..LedgerSnapshot::default()
        });
        let before = query::ledger(&world).snapshot();

        let events = run(
            &mut world,
            Command::PlaceBuilding {
                kind: BuildingKind::Barracks,
                cell: Cell::ORIGIN,
            },
        );

        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                reason: PlacementError::InsufficientResources { .. },
                ..
            }]
        ));
        assert!(query::buildings(&world).is_empty());
        assert_eq!(query::ledger(&world).snapshot(), before);
    }

    #[test]
    fn removing_the_townhall_ends_the_game() {
        let mut world = world_with(LedgerSnapshot::default());
        let _ = run(
            &mut world,
            Command::PlaceBuilding {
                kind: BuildingKind::Townhall,
                cell: Cell::ORIGIN,
            },
        );

        let events = run(&mut world, Command::RemoveBuilding { cell: Cell::ORIGIN });

        assert_eq!(
            events.last(),
            Some(&Event::GameOver {
                cause: GameOverCause::TownhallDestroyed
            })
        );
        assert_eq!(
            query::game_over(&world),
            Some(GameOverCause::TownhallDestroyed)
        );
    }

    #[test]
    fn removing_an_empty_cell_is_rejected() {
        let mut world = world_with(LedgerSnapshot::default());

        let events = run(&mut world, Command::RemoveBuilding { cell: Cell::new(3, 3) });

        assert_eq!(
            events,
            vec![Event::RemovalRejected {
                reason: RemovalError::BuildingNotFound {
                    cell: Cell::new(3, 3)
                }
            }]
        );
    }

    #[test]
    fn starvation_to_zero_population_ends_the_game() {
        let mut world = world_with(LedgerSnapshot {
            people: 4,
            population: 4,
            food: 0,
            ..LedgerSnapshot::default()
        });

        let events = run(&mut world, Command::ConsumeFood);

        assert_eq!(events.first(), Some(&Event::FoodShortfall { shortfall: 4 }));
        assert_eq!(
            events.last(),
            Some(&Event::GameOver {
                cause: GameOverCause::Starvation
            })
        );
        assert_eq!(query::ledger(&world).population(), 0);
    }

    #[test]
    fn partial_shortfall_keeps_staffed_people_employed() {
        let mut world = world_with(LedgerSnapshot {
            people: 10,
            population: 10,
            food: 0,
            wood: 10,
            ..LedgerSnapshot::default()
        });
        let _ = run(
            &mut world,
            Command::PlaceBuilding {
                kind: BuildingKind::LumberMill,
                cell: Cell::ORIGIN,
            },
        );
        let _ = run(&mut world, Command::HarvestYields);
        world.ledger.credit(Resource::Food, 6);

        let events = run(&mut world, Command::ConsumeFood);

        assert_eq!(events.first(), Some(&Event::FoodShortfall { shortfall: 4 }));
        assert_eq!(query::ledger(&world).population(), 6);
        assert_eq!(query::ledger(&world).people(), 3);
        assert_eq!(query::game_over(&world), None);
    }

    #[test]
    fn spawns_moves_and_kills_report_events() {
        let mut world = world_with(LedgerSnapshot::default());

        let spawned = run(&mut world, Command::SpawnEnemy { cell: Cell::new(-5, 0) });
        let Some(Event::EnemySpawned { enemy, .. }) = spawned.first().cloned() else {
            panic!("expected a spawn event, got {spawned:?}");
        };
        assert_eq!(
            run(&mut world, Command::SpawnEnemy { cell: Cell::new(-5, 0) }),
            vec![Event::EnemySpawnBlocked {
                cell: Cell::new(-5, 0)
            }]
        );

        let moved = run(
            &mut world,
            Command::MoveEnemy {
                enemy,
                to: Cell::new(-4, 0),
            },
        );
        assert_eq!(
            moved,
            vec![Event::EnemyMoved {
                enemy,
                from: Cell::new(-5, 0),
                to: Cell::new(-4, 0),
            }]
        );

        let killed = run(&mut world, Command::KillEnemy { enemy });
        assert_eq!(
            killed,
            vec![Event::EnemyKilled {
                enemy,
                cell: Cell::new(-4, 0)
            }]
        );
        assert!(query::enemy_ids(&world).is_empty());
        assert!(run(&mut world, Command::KillEnemy { enemy }).is_empty());
    }

    #[test]
    fn harvest_reports_each_producer() {
        let mut world = world_with(LedgerSnapshot::default());
        for x in 0..2 {
            let _ = run(
                &mut world,
                Command::PlaceBuilding {
                    kind: BuildingKind::Farm,
                    cell: Cell::new(x, 0),
                },
            );
        }
        let food_before = query::ledger(&world).amount(Resource::Food);

        let events = run(&mut world, Command::HarvestYields);

        let produced = events
            .iter()
            .filter(|event| matches!(event, Event::ResourcesProduced { .. }))
            .count();
        assert_eq!(produced, 2);
        assert_eq!(
            query::ledger(&world).amount(Resource::Food),
            food_before + 6
        );
    }
}
