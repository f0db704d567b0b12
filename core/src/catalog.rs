//! Immutable per-kind building definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BuildingKind, Resource, Terrain};

/// Construction price of a building kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cost {
    /// Idle inhabitants assigned to the building.
    pub people: u32,
    /// Wood consumed by construction.
    pub wood: u32,
    /// Metal consumed by construction.
    pub metal: u32,
    /// Stone consumed by construction.
    pub stone: u32,
}

impl Cost {
    /// Creates a cost from its four components.
    #[must_use]
    pub const fn new(people: u32, wood: u32, metal: u32, stone: u32) -> Self {
        Self {
            people,
            wood,
            metal,
            stone,
        }
    }

    /// Reports whether every component of `self` is covered by `available`.
    #[must_use]
    pub const fn covered_by(&self, available: &Cost) -> bool {
        available.people >= self.people
            && available.wood >= self.wood
            && available.metal >= self.metal
            && available.stone >= self.stone
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} people, {} wood, {} metal, {} stone",
            self.people, self.wood, self.metal, self.stone
        )
    }
}

/// Resource credited by a building every day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Yield {
    /// Resource produced.
    pub resource: Resource,
    /// Amount produced per day.
    pub amount: u32,
}

impl Yield {
    const fn of(resource: Resource, amount: u32) -> Option<Self> {
        Some(Self { resource, amount })
    }
}

/// Inhabitants added to both people and population when a house is built.
pub const HOUSE_CAPACITY: u32 = 3;

/// Radius within which a barracks kills enemies.
pub const BARRACKS_KILL_RANGE: u32 = 2;

impl BuildingKind {
    /// Construction price of the kind.
    #[must_use]
    pub const fn cost(self) -> Cost {
        match self {
            Self::LumberMill => Cost::new(3, 0, 0, 0),
            Self::Dock => Cost::new(1, 1, 0, 0),
            Self::Quarry => Cost::new(1, 2, 0, 0),
            Self::Mine => Cost::new(1, 1, 0, 1),
            Self::House => Cost::new(0, 1, 0, 0),
            Self::Farm => Cost::new(1, 1, 0, 0),
            Self::Barracks => Cost::new(1, 0, 3, 3),
            Self::Townhall => Cost::new(0, 0, 0, 0),
        }
    }

    /// Radius of fog cleared when the building is constructed.
    #[must_use]
    pub const fn sight(self) -> u32 {
        match self {
            Self::Barracks => 3,
            Self::Townhall => 0,
            _ => 2,
        }
    }

    /// Resource the building produces every day, if any.
    #[must_use]
    pub const fn daily_yield(self) -> Option<Yield> {
        match self {
            Self::LumberMill => Yield::of(Resource::Wood, 1),
            Self::Dock => Yield::of(Resource::Food, 1),
            Self::Quarry => Yield::of(Resource::Stone, 1),
            Self::Mine => Yield::of(Resource::Metal, 1),
            Self::Farm => Yield::of(Resource::Food, 3),
            Self::House | Self::Barracks | Self::Townhall => None,
        }
    }

    /// Radius within which the building kills enemies, if it defends.
    #[must_use]
    pub const fn kill_range(self) -> Option<u32> {
        match self {
            Self::Barracks => Some(BARRACKS_KILL_RANGE),
            _ => None,
        }
    }

    /// Inhabitants the building adds on construction.
    #[must_use]
    pub const fn housing_capacity(self) -> u32 {
        match self {
            Self::House => HOUSE_CAPACITY,
            _ => 0,
        }
    }

    /// Terrain the kind is native to.
    #[must_use]
    pub const fn native_terrain(self) -> Terrain {
        match self {
            Self::LumberMill => Terrain::Forest,
            Self::Dock => Terrain::Water,
            Self::Quarry | Self::Mine => Terrain::Mountain,
            Self::House | Self::Farm | Self::Barracks | Self::Townhall => Terrain::Grassland,
        }
    }

    /// Reports whether the terrain tile stays visible under the building.
    #[must_use]
    pub const fn keeps_terrain_visible(self) -> bool {
        matches!(self, Self::Dock)
    }
}
