//! Authoritative enemy state keyed by identity and position.

use std::collections::{BTreeMap, HashMap};

use village_defence_core::{Cell, EnemyId, EnemyKind, MapBounds};

/// An enemy currently on the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    id: EnemyId,
    cell: Cell,
    damage: u32,
    health: u32,
    speed: u32,
    alive: bool,
}

impl Enemy {
    fn spawn(id: EnemyId, cell: Cell) -> Self {
        let kind = id.kind();
        Self {
            id,
            cell,
            damage: kind.damage(),
            health: kind.health(),
            speed: kind.speed(),
            alive: true,
        }
    }

    /// Identifier allocated at spawn.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Cell the enemy occupies.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Damage dealt by the enemy.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Cells travelled per wandering step.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Reports whether the enemy is still in play.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Outcome of a movement request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The enemy left `from` and now occupies the destination.
    Moved {
        /// Cell vacated by the move.
        from: Cell,
    },
    /// Another enemy holds the destination; the mover stayed put.
    Blocked,
    /// The destination is the enemy's own cell.
    Stayed,
    /// No enemy with the identifier exists.
    Missing,
}

/// Registry of active enemies.
///
/// Identifiers sort in spawn order, so iteration follows insertion order. At
/// most one enemy occupies any cell.
#[derive(Debug)]
pub struct EnemyRegistry {
    bounds: MapBounds,
    by_id: BTreeMap<EnemyId, Enemy>,
    occupancy: HashMap<Cell, EnemyId>,
    next_ordinal: u32,
}

impl EnemyRegistry {
    /// Creates an empty registry for a map with the provided bounds.
    #[must_use]
    pub fn new(bounds: MapBounds) -> Self {
        Self {
            bounds,
            by_id: BTreeMap::new(),
            occupancy: HashMap::new(),
            next_ordinal: 0,
        }
    }

    /// Bounds of the map enemies spawn around.
    #[must_use]
    pub const fn bounds(&self) -> MapBounds {
        self.bounds
    }

    /// Reports whether an enemy occupies the cell.
    #[must_use]
    pub fn position_contains_enemy(&self, cell: Cell) -> bool {
        self.occupancy.contains_key(&cell)
    }

    /// Enemy occupying the cell, if any.
    #[must_use]
    pub fn enemy_at(&self, cell: Cell) -> Option<&Enemy> {
        self.occupancy.get(&cell).and_then(|id| self.by_id.get(id))
    }

    /// Enemy with the identifier, if still in play.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.by_id.get(&id)
    }

    /// Adds a fresh enemy at the cell.
    ///
    /// Returns `None` without allocating an identifier when the cell is
    /// already occupied.
    pub fn add_enemy(&mut self, kind: EnemyKind, cell: Cell) -> Option<EnemyId> {
        if self.position_contains_enemy(cell) {
            return None;
        }

        let id = EnemyId::new(kind, self.next_ordinal);
        self.next_ordinal = self.next_ordinal.saturating_add(1);
        let _ = self.occupancy.insert(cell, id);
        let _ = self.by_id.insert(id, Enemy::spawn(id, cell));
        Some(id)
    }

    /// Removes the enemy with the identifier and returns it.
    pub fn remove_enemy(&mut self, id: EnemyId) -> Option<Enemy> {
        let mut enemy = self.by_id.remove(&id)?;
        let _ = self.occupancy.remove(&enemy.cell);
        enemy.alive = false;
        Some(enemy)
    }

    /// Removes whichever enemy occupies the cell and returns it.
    pub fn remove_enemy_at(&mut self, cell: Cell) -> Option<Enemy> {
        let id = self.occupancy.get(&cell).copied()?;
        self.remove_enemy(id)
    }

    /// Moves an enemy unless another enemy already holds the destination.
    pub fn move_enemy(&mut self, id: EnemyId, to: Cell) -> MoveOutcome {
        let Some(from) = self.by_id.get(&id).map(Enemy::cell) else {
            return MoveOutcome::Missing;
        };
        if from == to {
            return MoveOutcome::Stayed;
        }
        if self.position_contains_enemy(to) {
            return MoveOutcome::Blocked;
        }

        let _ = self.occupancy.remove(&from);
        let _ = self.occupancy.insert(to, id);
        if let Some(enemy) = self.by_id.get_mut(&id) {
            enemy.cell = to;
        }
        MoveOutcome::Moved { from }
    }

    /// Iterates enemies in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.by_id.values()
    }

    /// Identifiers of every enemy, in spawn order.
    #[must_use]
    pub fn ids(&self) -> Vec<EnemyId> {
        self.by_id.keys().copied().collect()
    }

    /// Number of enemies in play.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Reports whether no enemy is in play.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
