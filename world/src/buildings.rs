//! Authoritative building state and identifier allocation.

use std::collections::{BTreeMap, HashMap};

use village_defence_core::{
    BuildingId, BuildingKind, Cell, PlacementError, RemovalError, Resource, Yield,
};

use crate::ledger::ResourceLedger;

/// A building standing on the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Building {
    id: BuildingId,
    cell: Cell,
    kill_zone: Vec<Cell>,
}

impl Building {
    fn new(id: BuildingId, cell: Cell) -> Self {
        let kill_zone = id
            .kind()
            .kill_range()
            .map(|range| cell.disc(range).collect())
            .unwrap_or_default();
        Self {
            id,
            cell,
            kill_zone,
        }
    }

    /// Identifier allocated when the building was placed.
    #[must_use]
    pub const fn id(&self) -> BuildingId {
        self.id
    }

    /// Kind of the building.
    #[must_use]
    pub const fn kind(&self) -> BuildingKind {
        self.id.kind()
    }

    /// Cell the building occupies.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Cells within kill range, computed once at construction.
    ///
    /// Empty for every kind that does not defend.
    #[must_use]
    pub fn kill_zone(&self) -> &[Cell] {
        &self.kill_zone
    }
}

/// Registry that owns placed buildings keyed by cell.
///
/// Iteration follows placement order.
#[derive(Debug, Default)]
pub struct BuildingRegistry {
    order: Vec<Cell>,
    by_cell: HashMap<Cell, Building>,
    next_ordinal: BTreeMap<BuildingKind, u32>,
}

impl BuildingRegistry {
    /// Creates an empty registry with every per-kind counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a building, debiting its cost from the ledger.
    ///
    /// Nothing is mutated when the request fails. Houses additionally credit
    /// their housing capacity to both people and population.
    pub fn place_building(
        &mut self,
        kind: BuildingKind,
        cell: Cell,
        ledger: &mut ResourceLedger,
    ) -> Result<&Building, PlacementError> {
        let cost = kind.cost();
        let available = ledger.holdings();
        if !cost.covered_by(&available) {
            return Err(PlacementError::InsufficientResources {
                required: cost,
                available,
            });
        }
        if self.by_cell.contains_key(&cell) {
            return Err(PlacementError::CellOccupied);
        }

        ledger.debit(cost);
        let capacity = kind.housing_capacity();
        if capacity > 0 {
            ledger.house(capacity);
        }

        let id = self.allocate_id(kind);
        self.order.push(cell);
        let building = self.by_cell.entry(cell).or_insert(Building::new(id, cell));
        Ok(&*building)
    }

    /// Demolishes the building at the cell and returns it.
    ///
    /// Houses evict a single inhabitant; every other kind refunds its people
    /// cost. Materials are never refunded.
    pub fn remove_building(
        &mut self,
        cell: Cell,
        ledger: &mut ResourceLedger,
    ) -> Result<Building, RemovalError> {
        let building = self
            .by_cell
            .remove(&cell)
            .ok_or(RemovalError::BuildingNotFound { cell })?;
        self.order.retain(|placed| *placed != cell);

        if building.kind() == BuildingKind::House {
            ledger.evict_one();
        } else {
            ledger.credit(Resource::People, building.kind().cost().people);
        }

        Ok(building)
    }

    /// Credits the daily yield of every producing building to the ledger.
    ///
    /// Returns what each building produced, in placement order.
    pub fn output_resources(&self, ledger: &mut ResourceLedger) -> Vec<(BuildingId, Yield)> {
        let produced: Vec<(BuildingId, Yield)> = self
            .iter()
            .filter_map(|building| {
                building
                    .kind()
                    .daily_yield()
                    .map(|output| (building.id(), output))
            })
            .collect();

        for (_, output) in &produced {
            ledger.credit(output.resource, output.amount);
        }
        produced
    }

    /// Position of the building closest to `from` by Manhattan distance.
    ///
    /// Ties resolve to the building placed first.
    #[must_use]
    pub fn nearest_building(&self, from: Cell) -> Option<Cell> {
        let mut best: Option<(u32, Cell)> = None;
        for cell in &self.order {
            let distance = cell.manhattan_distance(from);
            match best {
                Some((lowest, _)) if distance >= lowest => {}
                _ => best = Some((distance, *cell)),
            }
        }
        best.map(|(_, cell)| cell)
    }

    /// Reports whether the cell lies within the kill range of any barracks.
    #[must_use]
    pub fn is_within_kill_range_of_any_barracks(&self, cell: Cell) -> bool {
        self.iter().any(|building| {
            building
                .kind()
                .kill_range()
                .is_some_and(|range| building.cell().within_radius(cell, range))
        })
    }

    /// Building at the cell, if any.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<&Building> {
        self.by_cell.get(&cell)
    }

    /// Reports whether a building occupies the cell.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.by_cell.contains_key(&cell)
    }

    /// Iterates buildings in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.order.iter().filter_map(|cell| self.by_cell.get(cell))
    }

    /// Iterates barracks in placement order.
    pub fn barracks(&self) -> impl Iterator<Item = &Building> {
        self.iter()
            .filter(|building| building.kind() == BuildingKind::Barracks)
    }

    /// Sum of the people cost of every standing building.
    #[must_use]
    pub fn staffed_people(&self) -> u32 {
        self.iter()
            .map(|building| building.kind().cost().people)
            .sum()
    }

    /// Number of standing buildings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reports whether no building stands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn allocate_id(&mut self, kind: BuildingKind) -> BuildingId {
        let counter = self.next_ordinal.entry(kind).or_insert(0);
        let id = BuildingId::new(kind, *counter);
        *counter = counter.saturating_add(1);
        id
    }
}
