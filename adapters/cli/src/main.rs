#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Village Defence headlessly.

mod script;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use village_defence_core::{Cell, Resource, Terrain, TerrainProvider, TurnSummary};
use village_defence_rendering::{AsciiCanvas, TerrainMap};
use village_defence_simulation::{Config, MapConfig, Simulation, SimulationError};

use crate::script::Step;

const DEFAULT_DAYS: u32 = 10;

type Game = Simulation<TerrainMap, AsciiCanvas>;

/// Command-line arguments accepted by the binary.
#[derive(Debug, Parser)]
#[command(name = "village-defence", about = "Headless Village Defence simulation")]
struct CliArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Script of `place`, `remove`, `advance`, `show` and `inspect` lines.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
    /// Days to advance when no script is given.
    #[arg(long, value_name = "N")]
    days: Option<u32>,
    /// Overrides the configured random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Terrain map file; rows of `~ . * ^` glyphs. Defaults to open grassland.
    #[arg(long, value_name = "PATH")]
    terrain: Option<PathBuf>,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Village Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let terrain = match &args.terrain {
        Some(path) => {
            let map = TerrainMap::load(path)?;
            config.map = MapConfig {
                width: map.width(),
                height: map.height(),
            };
            map
        }
        None => TerrainMap::uniform(config.map.width, config.map.height, Terrain::Grassland),
    };

    let steps = match &args.script {
        Some(path) => script::load(path)?,
        None => vec![
            Step::Advance {
                days: args.days.unwrap_or(DEFAULT_DAYS),
            },
            Step::Show,
        ],
    };

    let mut simulation = Simulation::new(&config, terrain, AsciiCanvas::new());
    let stdout = io::stdout();
    run(&mut simulation, &steps, &mut stdout.lock())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Executes every step, reporting refused requests without aborting.
fn run<W: Write>(simulation: &mut Game, steps: &[Step], out: &mut W) -> Result<()> {
    for step in steps {
        debug!(?step, "executing script step");
        match step {
            Step::Place { kind_name, cell } => {
                match simulation.place_building(kind_name, *cell) {
                    Ok(id) => writeln!(out, "placed {id} at {cell}")?,
                    Err(error) => writeln!(out, "cannot place {kind_name} at {cell}: {error}")?,
                }
            }
            Step::Remove { cell } => match simulation.remove_building(*cell) {
                Ok(id) => writeln!(out, "removed {id} at {cell}")?,
                Err(error) => writeln!(out, "cannot remove at {cell}: {error}")?,
            },
            Step::Advance { days } => {
                for _ in 0..*days {
                    match simulation.advance_day() {
                        Ok(summary) => write_summary(out, &summary)?,
                        Err(error @ SimulationError::GameOver(_)) => {
                            writeln!(out, "{error}")?;
                            break;
                        }
                        Err(error) => return Err(error.into()),
                    }
                }
            }
            Step::Show => write_map(out, simulation)?,
            Step::Inspect { cell } => write_tile(out, simulation, *cell)?,
        }
    }
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: &TurnSummary) -> Result<()> {
    let ledger = &summary.ledger;
    write!(
        out,
        "day {}: people {}/{} food {} wood {} metal {} stone {} | enemies {} (+{} -{}) | buildings {}",
        summary.day,
        ledger.people,
        ledger.population,
        ledger.food,
        ledger.wood,
        ledger.metal,
        ledger.stone,
        summary.enemy_count,
        summary.enemies_spawned,
        summary.enemies_killed,
        summary.building_count,
    )?;
    for id in &summary.buildings_destroyed {
        write!(out, " | lost {id}")?;
    }
    if let Some(cause) = summary.game_over {
        write!(out, " | game over: {cause}")?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_map<W: Write>(out: &mut W, simulation: &Game) -> Result<()> {
    let ledger = simulation.ledger();
    writeln!(
        out,
        "day {} | people {}/{} | {} food, {} wood, {} metal, {} stone",
        ledger.day(),
        ledger.people(),
        ledger.population(),
        ledger.amount(Resource::Food),
        ledger.amount(Resource::Wood),
        ledger.amount(Resource::Metal),
        ledger.amount(Resource::Stone),
    )?;
    write!(out, "{}", simulation.renderer().render(simulation.terrain()))?;
    Ok(())
}

fn write_tile<W: Write>(out: &mut W, simulation: &Game, cell: Cell) -> Result<()> {
    let terrain = simulation.terrain();
    let ground = match terrain.terrain_at(cell) {
        Some(_) if terrain.is_fogged(cell) => "fog".to_owned(),
        Some(kind) => format!("{kind:?}").to_lowercase(),
        None => "off the map".to_owned(),
    };
    write!(out, "{cell}: {ground}")?;

    if let Some(building) = simulation.buildings().get(cell) {
        write!(out, " | {}", building.id())?;
    }
    if let Some(enemy) = simulation.enemies().enemy_at(cell) {
        write!(out, " | {} ({} hp)", enemy.id(), enemy.health())?;
    }
    if simulation.is_within_kill_range_of_any_barracks(cell) {
        write!(out, " | defended")?;
    }
    if let Some(nearest) = simulation.nearest_building(cell) {
        write!(out, " | nearest building {nearest}")?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_defence_core::LedgerSnapshot;

    fn game(width: u32, height: u32) -> Game {
        let config = Config {
            map: MapConfig { width, height },
            ..Config::default()
        };
        Simulation::new(
            &config,
            TerrainMap::uniform(width, height, Terrain::Grassland),
            AsciiCanvas::new(),
        )
    }

    fn transcript(simulation: &mut Game, text: &str) -> String {
        let steps = script::parse(text).expect("valid script");
        let mut out = Vec::new();
        run(simulation, &steps, &mut out).expect("script runs");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn scripts_report_successes_and_refusals() {
        let mut simulation = game(9, 9);

        let output = transcript(
            &mut simulation,
            "place Farm 1 0\nplace Castle 2 0\nremove 3 3\nadvance 2\n",
        );

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "placed Farm 0 at (1, 0)");
        assert!(lines[1].starts_with("cannot place Castle at (2, 0)"), "{output}");
        assert!(lines[2].starts_with("cannot remove at (3, 3)"), "{output}");
        assert!(lines[3].starts_with("day 2: people 9/10 food 23"), "{output}");
        assert!(lines[4].starts_with("day 3: "), "{output}");
    }

    #[test]
    fn show_prints_the_revealed_map() {
        let mut simulation = game(5, 3);

        let output = transcript(&mut simulation, "show\n");

        assert_eq!(
            output,
            "day 1 | people 10/10 | 30 food, 10 wood, 5 metal, 5 stone\n.....\n..T..\n.....\n"
        );
    }

    #[test]
    fn advancing_past_the_end_stops_quietly() {
        let config = Config {
            ledger: LedgerSnapshot {
                food: 0,
                ..LedgerSnapshot::default()
            },
            ..Config::default()
        };
        let mut simulation = Simulation::new(
            &config,
            TerrainMap::uniform(30, 30, Terrain::Grassland),
            AsciiCanvas::new(),
        );

        let output = transcript(&mut simulation, "advance 3\nplace Farm 1 1\n");

        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].ends_with("game over: the settlement starved"), "{output}");
        assert_eq!(lines[1], "the game is over: the settlement starved");
        assert!(lines[2].starts_with("cannot place Farm"), "{output}");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn inspect_describes_the_tile() {
        let mut simulation = game(9, 9);

        let output = transcript(&mut simulation, "inspect 1 0\ninspect 0 0\n");

        assert_eq!(
            output,
            "(1, 0): grassland | nearest building (0, 0)\n(0, 0): grassland | Townhall 0 | nearest building (0, 0)\n"
        );
    }
}
