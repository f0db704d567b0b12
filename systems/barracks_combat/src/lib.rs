#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves barracks attacks against enemies in range.

use rand::{seq::SliceRandom, Rng};
use village_defence_core::{Cell, Command};
use village_defence_world::{Building, EnemyRegistry};

/// Enemies a single barracks removes per day.
pub const KILLS_PER_ROUND: usize = 1;

/// Barracks combat system that queues kill commands for defended cells.
#[derive(Debug, Default)]
pub struct BarracksCombat {
    scratch: Vec<Cell>,
}

impl BarracksCombat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::KillEnemy` for enemies inside the barracks' kill zone.
    ///
    /// The kill zone is reshuffled on every call so that no position is
    /// favoured when several enemies are in range.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        barracks: &Building,
        enemies: &EnemyRegistry,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        if barracks.kill_zone().is_empty() || enemies.is_empty() {
            return;
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(barracks.kill_zone());
        self.scratch.shuffle(rng);

        let targets = self
            .scratch
            .iter()
            .filter_map(|cell| enemies.enemy_at(*cell))
            .take(KILLS_PER_ROUND);
        for enemy in targets {
            out.push(Command::KillEnemy { enemy: enemy.id() });
        }
    }
}
