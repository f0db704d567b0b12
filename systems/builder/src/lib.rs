#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure buy-menu system responsible for emitting building placement and removal commands.

use serde::{Deserialize, Serialize};
use village_defence_core::{BuildingKind, Cell, Command, PlacementError, Terrain, TerrainProvider};
use village_defence_world::{BuildingRegistry, ResourceLedger};

/// Site restrictions enforced before a placement reaches the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRules {
    /// Refuse kinds whose native terrain differs from the cell's terrain.
    pub require_matching_terrain: bool,
    /// Refuse cells still hidden by fog of war.
    pub require_revealed: bool,
}

/// Declarative placement preview describing a potential construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of building proposed for placement.
    pub kind: BuildingKind,
    /// Cell the building would occupy.
    pub cell: Cell,
    /// Indicates whether the preview represents a valid placement.
    pub placeable: bool,
    /// Reason the placement would fail, if it would.
    pub reason: Option<PlacementError>,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(kind: BuildingKind, cell: Cell, reason: Option<PlacementError>) -> Self {
        Self {
            kind,
            cell,
            placeable: reason.is_none(),
            reason,
        }
    }
}

/// Request issued by the buy menu or a demolish click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildRequest {
    /// Construct the named kind at the cell.
    Place {
        /// Building name as shown in the menu, e.g. `"LumberMill"`.
        kind_name: String,
        /// Cell chosen by the player.
        cell: Cell,
    },
    /// Demolish whatever stands at the cell.
    Remove {
        /// Cell chosen by the player.
        cell: Cell,
    },
}

/// Buy-menu system that translates requests into world commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    rules: PlacementRules,
}

impl Builder {
    /// Creates a new builder system enforcing the provided rules.
    #[must_use]
    pub const fn new(rules: PlacementRules) -> Self {
        Self { rules }
    }

    /// Rules enforced by the builder.
    #[must_use]
    pub const fn rules(&self) -> PlacementRules {
        self.rules
    }

    /// Kinds the buy menu offers on a tile of the provided terrain.
    ///
    /// The townhall is never offered.
    #[must_use]
    pub fn available_kinds(terrain: Terrain) -> Vec<BuildingKind> {
        BuildingKind::ALL
            .into_iter()
            .filter(|kind| *kind != BuildingKind::Townhall && kind.native_terrain() == terrain)
            .collect()
    }

    /// Evaluates whether a placement would succeed without mutating anything.
    ///
    /// Checks run in the order the world applies them after the site rules:
    /// cost first, then occupancy.
    pub fn preview<T: TerrainProvider + ?Sized>(
        &self,
        kind: BuildingKind,
        cell: Cell,
        terrain: &T,
        buildings: &BuildingRegistry,
        ledger: &ResourceLedger,
    ) -> PlacementPreview {
        let reason = self.check_site(kind, cell, terrain).err().or_else(|| {
            let required = kind.cost();
            let available = ledger.holdings();
            if !required.covered_by(&available) {
                Some(PlacementError::InsufficientResources {
                    required,
                    available,
                })
            } else if buildings.contains(cell) {
                Some(PlacementError::CellOccupied)
            } else {
                None
            }
        });
        PlacementPreview::new(kind, cell, reason)
    }

    /// Emits the command for a request, or the reason it was refused.
    ///
    /// Cost and occupancy are left to the world; removals are always forwarded.
    pub fn handle<T: TerrainProvider + ?Sized>(
        &self,
        request: BuildRequest,
        terrain: &T,
        out: &mut Vec<Command>,
    ) -> Result<(), PlacementError> {
        match request {
            BuildRequest::Place { kind_name, cell } => {
                let kind = kind_name
                    .parse::<BuildingKind>()
                    .map_err(|_| PlacementError::UnknownBuildingKind)?;
                self.check_site(kind, cell, terrain)?;
                out.push(Command::PlaceBuilding { kind, cell });
            }
            BuildRequest::Remove { cell } => out.push(Command::RemoveBuilding { cell }),
        }
        Ok(())
    }

    fn check_site<T: TerrainProvider + ?Sized>(
        &self,
        kind: BuildingKind,
        cell: Cell,
        terrain: &T,
    ) -> Result<(), PlacementError> {
        if self.rules.require_revealed && terrain.is_fogged(cell) {
            return Err(PlacementError::Fogged);
        }

        if self.rules.require_matching_terrain {
            let required = kind.native_terrain();
            match terrain.terrain_at(cell) {
                Some(found) if found == required => {}
                Some(found) => return Err(PlacementError::TerrainMismatch { required, found }),
                // Cells outside the generated map are as unknown as fogged ones.
                None => return Err(PlacementError::Fogged),
            }
        }
        Ok(())
    }
}
