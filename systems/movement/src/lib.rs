#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour system that walks raiders toward the settlement.
//!
//! The state machine keeps no memory between days: every action re-evaluates
//! the nearest building, so an enemy is either wandering (nothing to attack)
//! or seeking its current target.

use village_defence_core::{Cell, Command};
use village_defence_world::{BuildingRegistry, Enemy};

/// Behaviour an enemy adopts for a single action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    /// No building stands; the enemy drifts along the positive x axis.
    Wandering,
    /// The enemy closes in on the building at `target`.
    Seeking {
        /// Cell of the nearest building.
        target: Cell,
    },
}

/// Pure system that turns an enemy's situation into world commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Evaluates which behaviour the enemy adopts against the standing buildings.
    #[must_use]
    pub fn state(&self, enemy: &Enemy, buildings: &BuildingRegistry) -> EnemyState {
        match buildings.nearest_building(enemy.cell()) {
            Some(target) => EnemyState::Seeking { target },
            None => EnemyState::Wandering,
        }
    }

    /// Emits the commands for one enemy action.
    ///
    /// An enemy standing on its target demolishes it before any movement is
    /// considered. Destinations held by other enemies are resolved by the world.
    pub fn act(&self, enemy: &Enemy, buildings: &BuildingRegistry, out: &mut Vec<Command>) {
        let from = enemy.cell();
        let destination = match self.state(enemy, buildings) {
            EnemyState::Wandering => {
                let speed = i32::try_from(enemy.speed()).unwrap_or(i32::MAX);
                from.offset(speed, 0)
            }
            EnemyState::Seeking { target } => {
                if target == from {
                    out.push(Command::RemoveBuilding { cell: target });
                }
                step_toward(from, target)
            }
        };

        if destination != from {
            out.push(Command::MoveEnemy {
                enemy: enemy.id(),
                to: destination,
            });
        }
    }
}

/// One cell along each axis toward `target`; diagonal steps are allowed.
fn step_toward(from: Cell, target: Cell) -> Cell {
    let dx = (target.x() - from.x()).signum();
    let dy = (target.y() - from.y()).signum();
    from.offset(dx, dy)
}
