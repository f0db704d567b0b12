#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that sizes daily waves and samples perimeter spawn cells.

use std::collections::HashSet;

use rand::Rng;
use village_defence_core::{Cell, Command, Event, MapBounds};
use village_defence_world::{Enemy, EnemyRegistry};

/// Every fifth day a wave of `day / WAVE_DIVISOR` enemies arrives.
const WAVE_PERIOD: u32 = 5;
const WAVE_DIVISOR: u32 = 4;
/// Day after which waves grow exponentially.
const SURGE_START_DAY: u32 = 50;
const SURGE_GROWTH: f64 = 1.05;

/// Number of enemies that arrive on the provided day.
///
/// Days divisible by five spawn `day / 4` enemies. Past day fifty an extra
/// `floor(1.05^(day - 50)) - 1` enemies arrive every day.
#[must_use]
pub fn wave_size(day: u32) -> u32 {
    let mut count = 0_u32;
    if day > 0 && day % WAVE_PERIOD == 0 {
        count = day / WAVE_DIVISOR;
    }

    if day > SURGE_START_DAY {
        let exponent = i32::try_from(day - SURGE_START_DAY).unwrap_or(i32::MAX);
        let surge = SURGE_GROWTH.powi(exponent).floor() as u32;
        count = count.saturating_add(surge.saturating_sub(1));
    }
    count
}

/// Edge of the map a spawn is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Bottom,
    Top,
    Left,
    Right,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Bottom, Edge::Top, Edge::Left, Edge::Right];
}

/// Pure system that emits enemy spawn commands whenever a day starts.
#[derive(Debug, Default)]
pub struct Spawning;

impl Spawning {
    /// Creates a new spawning system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits one `Command::SpawnEnemy` per wave attempt for every day started.
    ///
    /// Picks that land on an enemy are still emitted; the world skips them.
    /// Attempts stop early only once every perimeter cell is taken, since any
    /// further pick would be skipped as well.
    pub fn handle<R: Rng + ?Sized>(
        &self,
        events: &[Event],
        enemies: &EnemyRegistry,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        let bounds = enemies.bounds();
        let perimeter = perimeter_len(bounds) as usize;
        let mut taken: HashSet<Cell> = enemies
            .iter()
            .map(Enemy::cell)
            .filter(|cell| on_perimeter(bounds, *cell))
            .collect();

        for event in events {
            let Event::DayStarted { day } = event else {
                continue;
            };

            for _ in 0..wave_size(*day) {
                if taken.len() >= perimeter {
                    break;
                }
                let cell = sample_perimeter(bounds, rng);
                let _ = taken.insert(cell);
                out.push(Command::SpawnEnemy { cell });
            }
        }
    }
}

/// Picks an edge uniformly, then a uniform coordinate along it.
fn sample_perimeter<R: Rng + ?Sized>(bounds: MapBounds, rng: &mut R) -> Cell {
    let (min, max) = (bounds.min(), bounds.max());
    let edge = Edge::ALL[rng.gen_range(0..Edge::ALL.len())];
    match edge {
        Edge::Bottom => Cell::new(rng.gen_range(min.x()..=max.x()), min.y()),
        Edge::Top => Cell::new(rng.gen_range(min.x()..=max.x()), max.y()),
        Edge::Left => Cell::new(min.x(), rng.gen_range(min.y()..=max.y())),
        Edge::Right => Cell::new(max.x(), rng.gen_range(min.y()..=max.y())),
    }
}

fn on_perimeter(bounds: MapBounds, cell: Cell) -> bool {
    bounds.contains(cell)
        && (cell.x() == bounds.min().x()
            || cell.x() == bounds.max().x()
            || cell.y() == bounds.min().y()
            || cell.y() == bounds.max().y())
}

fn perimeter_len(bounds: MapBounds) -> u32 {
    let width = bounds.min().x().abs_diff(bounds.max().x()) + 1;
    let height = bounds.min().y().abs_diff(bounds.max().y()) + 1;
    if width == 1 || height == 1 {
        return width * height;
    }
    2 * (width + height) - 4
}
