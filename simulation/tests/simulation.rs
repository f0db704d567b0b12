use std::collections::HashSet;

use village_defence_core::{
    BuildingId, BuildingKind, Cell, Cost, Event, GameOverCause, Layer, LedgerSnapshot,
    PlacementError, RemovalError, Sprite, Terrain, TerrainProvider, TileRenderer, TurnSummary,
};
use village_defence_simulation::{Config, MapConfig, Simulation, SimulationError};
use village_defence_system_builder::PlacementRules;

/// Grassland everywhere with fog lifted only where buildings have looked.
#[derive(Debug, Default)]
struct Field {
    revealed: HashSet<Cell>,
    reveals: Vec<(Cell, u32)>,
}

impl TerrainProvider for Field {
    fn terrain_at(&self, _cell: Cell) -> Option<Terrain> {
        Some(Terrain::Grassland)
    }

    fn is_fogged(&self, cell: Cell) -> bool {
        !self.revealed.contains(&cell)
    }

    fn reveal_fog(&mut self, center: Cell, radius: u32) {
        self.revealed.extend(center.disc(radius));
        self.reveals.push((center, radius));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Op {
    Draw(Layer, Cell, Sprite),
    Clear(Layer, Cell),
}

#[derive(Debug, Default)]
struct Recorder {
    ops: Vec<Op>,
}

impl TileRenderer for Recorder {
    fn draw(&mut self, layer: Layer, cell: Cell, sprite: Sprite) {
        self.ops.push(Op::Draw(layer, cell, sprite));
    }

    fn clear(&mut self, layer: Layer, cell: Cell) {
        self.ops.push(Op::Clear(layer, cell));
    }
}

fn start(config: &Config) -> Simulation<Field, Recorder> {
    Simulation::new(config, Field::default(), Recorder::default())
}

/// A 3x3 map whose every cell lies within a barracks' reach of the origin,
/// one day before the first wave.
fn tiny_config(seed: u64, townhall: Option<Cell>) -> Config {
    Config {
        seed,
        map: MapConfig {
            width: 3,
            height: 3,
        },
        ledger: LedgerSnapshot {
            day: 4,
            ..LedgerSnapshot::default()
        },
        townhall,
        ..Config::default()
    }
}

#[test]
fn start_reveals_the_origin_and_places_the_townhall() {
    let simulation = start(&Config::default());

    assert_eq!(simulation.terrain().reveals.first(), Some(&(Cell::ORIGIN, 4)));
    let townhall = simulation.buildings().get(Cell::ORIGIN).expect("townhall");
    assert_eq!(townhall.id(), BuildingId::new(BuildingKind::Townhall, 0));
    assert_eq!(simulation.ledger().snapshot(), LedgerSnapshot::default());
    assert!(simulation.renderer().ops.contains(&Op::Draw(
        Layer::Building,
        Cell::ORIGIN,
        Sprite::Building(BuildingKind::Townhall)
    )));
}

#[test]
fn placement_mirrors_into_collaborators() {
    let mut simulation = start(&Config::default());

    let farm = simulation
        .place_building("Farm", Cell::new(2, 1))
        .expect("farm is affordable");
    let dock = simulation
        .place(BuildingKind::Dock, Cell::new(-2, 1))
        .expect("dock is affordable");

    assert_eq!(farm.to_string(), "Farm 0");
    assert_eq!(dock.to_string(), "Dock 0");
    let ops = &simulation.renderer().ops;
    assert!(ops.contains(&Op::Clear(Layer::Terrain, Cell::new(2, 1))));
    assert!(
        !ops.contains(&Op::Clear(Layer::Terrain, Cell::new(-2, 1))),
        "water stays visible under docks"
    );
    assert!(simulation.terrain().reveals.contains(&(Cell::new(2, 1), 2)));
}

#[test]
fn placement_failures_leave_the_ledger_untouched() {
    let mut simulation = start(&Config {
        ledger: LedgerSnapshot {
            people: 0,
            wood: 0,
            metal: 0,
            stone: 0,
            ..LedgerSnapshot::default()
        },
        ..Config::default()
    });
    let before = simulation.ledger().snapshot();

    assert_eq!(
        simulation.place(BuildingKind::Barracks, Cell::new(1, 0)),
        Err(SimulationError::Placement(
            PlacementError::InsufficientResources {
                required: Cost::new(1, 0, 3, 3),
                available: Cost::default(),
            }
        ))
    );
    assert_eq!(
        simulation.place_building("Castle", Cell::new(1, 0)),
        Err(SimulationError::Placement(PlacementError::UnknownBuildingKind))
    );
    assert_eq!(
        simulation.place(BuildingKind::Townhall, Cell::ORIGIN),
        Err(SimulationError::Placement(PlacementError::CellOccupied))
    );
    assert_eq!(simulation.ledger().snapshot(), before);
    assert_eq!(simulation.buildings().len(), 1);
}

#[test]
fn removal_round_trip_restores_people() {
    let mut simulation = start(&Config::default());
    let people = simulation.ledger().people();

    let _ = simulation
        .place(BuildingKind::LumberMill, Cell::new(1, 1))
        .expect("lumber mill is affordable");
    assert_eq!(simulation.ledger().people(), people - 3);

    let removed = simulation
        .remove_building(Cell::new(1, 1))
        .expect("lumber mill stands");
    assert_eq!(removed.kind(), BuildingKind::LumberMill);
    assert_eq!(simulation.ledger().people(), people);
    assert_eq!(
        simulation.remove_building(Cell::new(1, 1)),
        Err(SimulationError::Removal(RemovalError::BuildingNotFound {
            cell: Cell::new(1, 1)
        }))
    );
}

#[test]
fn fog_gating_follows_revealed_cells() {
    let mut simulation = start(&Config {
        placement: PlacementRules {
            require_matching_terrain: true,
            require_revealed: true,
        },
        ..Config::default()
    });

    assert_eq!(
        simulation.place(BuildingKind::Farm, Cell::new(10, 10)),
        Err(SimulationError::Placement(PlacementError::Fogged))
    );
    assert_eq!(
        simulation.place(BuildingKind::LumberMill, Cell::new(1, 1)),
        Err(SimulationError::Placement(PlacementError::TerrainMismatch {
            required: Terrain::Forest,
            found: Terrain::Grassland,
        }))
    );
    assert!(simulation.place(BuildingKind::Farm, Cell::new(1, 1)).is_ok());
    assert!(simulation.preview(BuildingKind::House, Cell::new(2, 0)).placeable);
}

#[test]
fn quiet_days_feed_the_village_and_harvest() {
    let mut simulation = start(&Config::default());
    let _ = simulation
        .place(BuildingKind::Farm, Cell::new(1, 0))
        .expect("farm is affordable");

    let summary = simulation.advance_day().expect("game is running");

    assert_eq!(summary.day, 2);
    assert_eq!(summary.ledger.food, 30 - 10 + 3);
    assert_eq!(summary.enemies_spawned, 0);
    assert_eq!(summary.building_count, 2);
    assert_eq!(summary.game_over, None);
}

#[test]
fn barracks_kill_a_lone_enemy_for_any_seed() {
    for seed in 0..16 {
        let mut simulation = start(&tiny_config(seed, None));
        let _ = simulation
            .place(BuildingKind::Barracks, Cell::ORIGIN)
            .expect("barracks is affordable");
        assert!(simulation.is_within_kill_range_of_any_barracks(Cell::new(1, 1)));

        let summary = simulation.advance_day().expect("game is running");

        assert_eq!(summary.day, 5);
        assert_eq!(summary.enemies_spawned, 1, "seed {seed}");
        assert_eq!(summary.enemies_killed, 1, "seed {seed}");
        assert_eq!(summary.enemy_count, 0, "seed {seed}");
        let enemy_ops = simulation
            .renderer()
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Draw(Layer::Enemy, ..) | Op::Clear(Layer::Enemy, _)))
            .count();
        assert_eq!(enemy_ops, 2, "spawn drawn then cleared, seed {seed}");
    }
}

#[test]
fn losing_the_townhall_ends_the_game() {
    let mut simulation = start(&tiny_config(9, Some(Cell::ORIGIN)));

    let arrival = simulation.advance_day().expect("wave day");
    assert_eq!(arrival.enemies_spawned, 1);
    let approach = simulation.advance_day().expect("enemy closes in");
    assert_eq!(approach.game_over, None);
    assert_eq!(simulation.nearest_building(Cell::new(1, 1)), Some(Cell::ORIGIN));

    let strike = simulation.advance_day().expect("enemy strikes");
    assert_eq!(strike.day, 7);
    assert_eq!(strike.game_over, Some(GameOverCause::TownhallDestroyed));
    assert_eq!(
        strike.buildings_destroyed,
        vec![BuildingId::new(BuildingKind::Townhall, 0)]
    );
    assert_eq!(strike.building_count, 0);

    let over = SimulationError::GameOver(GameOverCause::TownhallDestroyed);
    assert_eq!(simulation.advance_day(), Err(over));
    assert_eq!(simulation.place(BuildingKind::Farm, Cell::new(1, 0)), Err(over));
    assert_eq!(simulation.remove_building(Cell::new(1, 0)), Err(over));
}

#[test]
fn starvation_ends_the_game() {
    let mut simulation = start(&Config {
        ledger: LedgerSnapshot {
            people: 3,
            population: 3,
            food: 0,
            ..LedgerSnapshot::default()
        },
        ..Config::default()
    });

    let summary = simulation.advance_day().expect("game is running");

    assert_eq!(summary.game_over, Some(GameOverCause::Starvation));
    assert_eq!(summary.ledger.population, 0);
    assert_eq!(
        simulation.advance_day(),
        Err(SimulationError::GameOver(GameOverCause::Starvation))
    );
}

#[test]
fn same_seed_replays_the_same_game() {
    let play = |seed: u64| -> (Vec<TurnSummary>, Vec<Op>) {
        let mut simulation = start(&Config {
            seed,
            ..Config::default()
        });
        for x in 1..=4 {
            let _ = simulation
                .place(BuildingKind::Farm, Cell::new(x, 0))
                .expect("farm is affordable");
        }
        let _ = simulation
            .place(BuildingKind::Barracks, Cell::new(0, 2))
            .expect("barracks is affordable");

        let mut summaries = Vec::new();
        while let Ok(summary) = simulation.advance_day() {
            summaries.push(summary);
            if summaries.len() == 40 {
                break;
            }
        }
        (summaries, simulation.renderer().ops.clone())
    };

    let first = play(0xfeed);
    assert_eq!(first, play(0xfeed));
    assert!(first.0.iter().map(|summary| summary.enemies_spawned).sum::<u32>() > 0);
}

#[test]
fn oversized_initial_reveal_is_limited_to_the_map() {
    let simulation = start(&Config {
        initial_reveal_radius: u32::MAX,
        ..Config::default()
    });

    assert_eq!(simulation.terrain().reveals.first(), Some(&(Cell::ORIGIN, 60)));
    assert!(!simulation.terrain().is_fogged(Cell::new(-15, 14)));
}

#[test]
fn placement_results_come_from_the_world_events() {
    let mut simulation = start(&Config::default());

    let id = simulation
        .place(BuildingKind::House, Cell::new(0, 1))
        .expect("house is affordable");
    assert!(simulation.last_events().contains(&Event::BuildingPlaced {
        id,
        cell: Cell::new(0, 1)
    }));

    let refused = simulation.place(BuildingKind::Farm, Cell::new(0, 1));
    assert_eq!(
        refused,
        Err(SimulationError::Placement(PlacementError::CellOccupied))
    );
    assert!(simulation.last_events().contains(&Event::PlacementRejected {
        kind: BuildingKind::Farm,
        cell: Cell::new(0, 1),
        reason: PlacementError::CellOccupied,
    }));
}
