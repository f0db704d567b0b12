#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Village Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The turn engine submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then reports [`Event`] values that the engine
//! forwards to the [`TerrainProvider`] and [`TileRenderer`] collaborators.
//! Systems query immutable snapshots and respond exclusively with new command
//! batches.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod catalog;

pub use catalog::{Cost, Yield, BARRACKS_KILL_RANGE, HOUSE_CAPACITY};

/// Integer grid coordinate identifying one map tile.
///
/// The map is centred on the origin, so both axes may be negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    /// Cell at the centre of the map.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether `other` lies inside the Euclidean disc of `radius`
    /// centred on this cell.
    #[must_use]
    pub fn within_radius(self, other: Cell, radius: u32) -> bool {
        let dx = i128::from(self.x) - i128::from(other.x);
        let dy = i128::from(self.y) - i128::from(other.y);
        let radius = i128::from(radius);
        dx * dx + dy * dy <= radius * radius
    }

    /// Enumerates every cell within `radius` of this cell.
    ///
    /// Cells are produced column by column, scanning the bounding square from
    /// its lower-left corner, and filtered by [`Cell::within_radius`].
    pub fn disc(self, radius: u32) -> impl Iterator<Item = Cell> {
        let reach = i32::try_from(radius).unwrap_or(i32::MAX);
        (-reach..=reach)
            .flat_map(move |dx| (-reach..=reach).map(move |dy| self.offset(dx, dy)))
            .filter(move |cell| self.within_radius(*cell, radius))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangular bounds of the playable map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapBounds {
    min: Cell,
    max: Cell,
}

impl MapBounds {
    /// Derives bounds for a map of `width` by `height` cells centred on the
    /// origin.
    ///
    /// Odd dimensions are symmetric; even dimensions extend one cell further
    /// toward the negative side.
    #[must_use]
    pub fn centered(width: u32, height: u32) -> Self {
        let width = i32::try_from(width.max(1)).unwrap_or(i32::MAX);
        let height = i32::try_from(height.max(1)).unwrap_or(i32::MAX);
        Self {
            min: Cell::new(-(width / 2), -(height / 2)),
            max: Cell::new((width - 1) - width / 2, (height - 1) - height / 2),
        }
    }

    /// Lower-left corner of the map.
    #[must_use]
    pub const fn min(&self) -> Cell {
        self.min
    }

    /// Upper-right corner of the map.
    #[must_use]
    pub const fn max(&self) -> Cell {
        self.max
    }

    /// Reports whether the cell lies inside the bounds.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.min.x..=self.max.x).contains(&cell.x) && (self.min.y..=self.max.y).contains(&cell.y)
    }

    /// Iterates every cell inside the bounds, row by row from the top.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y)
            .rev()
            .flat_map(move |y| (min.x..=max.x).map(move |x| Cell::new(x, y)))
    }
}

/// Resources tracked by the economy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Idle inhabitants available to staff new buildings.
    People,
    /// Food consumed by the population every day.
    Food,
    /// Wood harvested by lumber mills.
    Wood,
    /// Metal extracted by mines.
    Metal,
    /// Stone cut by quarries.
    Stone,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::People => "people",
            Self::Food => "food",
            Self::Wood => "wood",
            Self::Metal => "metal",
            Self::Stone => "stone",
        };
        f.write_str(name)
    }
}

/// Terrain classification supplied by the terrain provider for each cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open water; only docks may be built here.
    Water,
    /// Flat grassland suited to farms and settlements.
    Grassland,
    /// Woodland harvested by lumber mills.
    Forest,
    /// Rocky highland worked by quarries and mines.
    Mountain,
}

/// Closed set of constructible building kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Produces wood.
    LumberMill,
    /// Produces food from the water.
    Dock,
    /// Produces stone.
    Quarry,
    /// Produces metal.
    Mine,
    /// Houses three additional inhabitants.
    House,
    /// Produces food from the land.
    Farm,
    /// Defends the settlement by killing enemies within range.
    Barracks,
    /// Seat of the settlement; losing it ends the game.
    Townhall,
}

impl BuildingKind {
    /// Every building kind in catalog order.
    pub const ALL: [BuildingKind; 8] = [
        BuildingKind::LumberMill,
        BuildingKind::Dock,
        BuildingKind::Quarry,
        BuildingKind::Mine,
        BuildingKind::House,
        BuildingKind::Farm,
        BuildingKind::Barracks,
        BuildingKind::Townhall,
    ];

    /// Canonical name of the kind, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LumberMill => "LumberMill",
            Self::Dock => "Dock",
            Self::Quarry => "Quarry",
            Self::Mine => "Mine",
            Self::House => "House",
            Self::Farm => "Farm",
            Self::Barracks => "Barracks",
            Self::Townhall => "Townhall",
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildingKind {
    type Err = UnknownBuildingKind;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownBuildingKind {
                name: name.to_owned(),
            })
    }
}

/// Error returned when a building name does not match any catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown building kind `{name}`")]
pub struct UnknownBuildingKind {
    name: String,
}

impl UnknownBuildingKind {
    /// Name that failed to resolve.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Identifier of a placed building, rendered as `"{kind} {ordinal}"`.
///
/// Ordinals are allocated per kind starting at zero and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId {
    kind: BuildingKind,
    ordinal: u32,
}

impl BuildingId {
    /// Creates a building identifier.
    #[must_use]
    pub const fn new(kind: BuildingKind, ordinal: u32) -> Self {
        Self { kind, ordinal }
    }

    /// Kind of building the identifier names.
    #[must_use]
    pub const fn kind(&self) -> BuildingKind {
        self.kind
    }

    /// Per-kind ordinal of the building.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.ordinal)
    }
}

/// Kinds of enemies that raid the settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Basic melee raider that walks toward the nearest building.
    Brute,
}

impl EnemyKind {
    /// Damage dealt by the enemy.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Brute => 2,
        }
    }

    /// Starting health of the enemy.
    #[must_use]
    pub const fn health(self) -> u32 {
        match self {
            Self::Brute => 10,
        }
    }

    /// Cells travelled per step while wandering.
    #[must_use]
    pub const fn speed(self) -> u32 {
        match self {
            Self::Brute => 1,
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Brute => f.write_str("Brute"),
        }
    }
}

/// Identifier of an enemy, rendered as `"{kind} {ordinal}"`.
///
/// Ordinals increase monotonically in spawn order, so sorting identifiers
/// reproduces insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId {
    ordinal: u32,
    kind: EnemyKind,
}

impl EnemyId {
    /// Creates an enemy identifier.
    #[must_use]
    pub const fn new(kind: EnemyKind, ordinal: u32) -> Self {
        Self { ordinal, kind }
    }

    /// Kind of enemy the identifier names.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Spawn ordinal of the enemy.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.ordinal)
    }
}

/// Plain copy of every economy counter at one point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    /// Current day, starting at one.
    pub day: u32,
    /// Idle inhabitants available for construction.
    pub people: u32,
    /// Total inhabitants that must be fed.
    pub population: u32,
    /// Stored food.
    pub food: u32,
    /// Stored wood.
    pub wood: u32,
    /// Stored metal.
    pub metal: u32,
    /// Stored stone.
    pub stone: u32,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            day: 1,
            people: 10,
            population: 10,
            food: 30,
            wood: 10,
            metal: 5,
            stone: 5,
        }
    }
}

impl LedgerSnapshot {
    /// Amount of the provided resource held in the snapshot.
    #[must_use]
    pub const fn amount(&self, resource: Resource) -> u32 {
        match resource {
            Resource::People => self.people,
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Metal => self.metal,
            Resource::Stone => self.stone,
        }
    }
}

/// Reasons the game can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverCause {
    /// The population dropped to zero after a food shortfall.
    Starvation,
    /// The townhall was destroyed.
    TownhallDestroyed,
}

impl fmt::Display for GameOverCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starvation => f.write_str("the settlement starved"),
            Self::TownhallDestroyed => f.write_str("the townhall was destroyed"),
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the day counter by one.
    BeginDay,
    /// Feeds the population from the food store, starving on shortfall.
    ConsumeFood,
    /// Requests construction of a building at the provided cell.
    PlaceBuilding {
        /// Kind of building to construct.
        kind: BuildingKind,
        /// Cell the building will occupy.
        cell: Cell,
    },
    /// Requests demolition of the building at the provided cell.
    RemoveBuilding {
        /// Cell holding the building to remove.
        cell: Cell,
    },
    /// Requests that a new enemy appear at the provided cell.
    SpawnEnemy {
        /// Perimeter cell chosen for the spawn.
        cell: Cell,
    },
    /// Requests that an enemy move to the provided cell.
    MoveEnemy {
        /// Enemy attempting to move.
        enemy: EnemyId,
        /// Destination cell.
        to: Cell,
    },
    /// Removes an enemy from play.
    KillEnemy {
        /// Enemy to remove.
        enemy: EnemyId,
    },
    /// Credits the daily yield of every producing building.
    HarvestYields,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new day began.
    DayStarted {
        /// Day that is now current.
        day: u32,
    },
    /// The population ate without any shortfall.
    FoodConsumed {
        /// Food removed from the store.
        amount: u32,
    },
    /// The food store could not feed everybody.
    FoodShortfall {
        /// Number of inhabitants that could not be fed and were lost.
        shortfall: u32,
    },
    /// A building was constructed.
    BuildingPlaced {
        /// Identifier allocated to the building.
        id: BuildingId,
        /// Cell the building occupies.
        cell: Cell,
    },
    /// A placement request was refused; nothing changed.
    PlacementRejected {
        /// Kind requested for placement.
        kind: BuildingKind,
        /// Cell requested for placement.
        cell: Cell,
        /// Reason the request failed.
        reason: PlacementError,
    },
    /// A building was demolished or destroyed.
    BuildingRemoved {
        /// Identifier of the removed building.
        id: BuildingId,
        /// Cell the building occupied.
        cell: Cell,
    },
    /// A removal request was refused; nothing changed.
    RemovalRejected {
        /// Reason the request failed.
        reason: RemovalError,
    },
    /// An enemy entered the map.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Cell the enemy occupies.
        cell: Cell,
    },
    /// A spawn was skipped because the cell already held an enemy.
    EnemySpawnBlocked {
        /// Cell chosen for the skipped spawn.
        cell: Cell,
    },
    /// An enemy moved between two cells.
    EnemyMoved {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Cell vacated by the move.
        from: Cell,
        /// Cell occupied after the move.
        to: Cell,
    },
    /// An enemy held position because its destination was occupied.
    EnemyBlocked {
        /// Enemy that could not move.
        enemy: EnemyId,
        /// Destination it attempted to enter.
        to: Cell,
    },
    /// An enemy was removed from play.
    EnemyKilled {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Cell it occupied.
        cell: Cell,
    },
    /// A building credited its daily yield.
    ResourcesProduced {
        /// Building that produced.
        building: BuildingId,
        /// Resource and amount credited.
        output: Yield,
    },
    /// Economy counters changed and presentation should refresh.
    ResourcesChanged {
        /// Counters after the change.
        ledger: LedgerSnapshot,
    },
    /// The game ended.
    GameOver {
        /// Reason the game ended.
        cause: GameOverCause,
    },
}

/// Reasons a placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// At least one construction cost exceeds the stored amount.
    #[error("insufficient resources: building needs {required}, ledger holds {available}")]
    InsufficientResources {
        /// Full construction cost of the requested kind.
        required: Cost,
        /// Amounts held by the ledger when the request was made.
        available: Cost,
    },
    /// The requested kind name is not in the catalog.
    #[error("unknown building kind")]
    UnknownBuildingKind,
    /// Another building already occupies the cell.
    #[error("cell is already occupied by a building")]
    CellOccupied,
    /// The cell's terrain does not suit the requested kind.
    #[error("building requires {required:?} terrain but the cell is {found:?}")]
    TerrainMismatch {
        /// Terrain the kind must be built on.
        required: Terrain,
        /// Terrain found at the cell.
        found: Terrain,
    },
    /// The cell is still hidden by fog of war.
    #[error("cell is hidden by fog of war")]
    Fogged,
}

/// Reasons a removal request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// No building exists at the requested cell.
    #[error("no building at {cell}")]
    BuildingNotFound {
        /// Cell named in the request.
        cell: Cell,
    },
}

/// Outcome of a single day tick, published to presentation layers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    /// Day reached by the tick.
    pub day: u32,
    /// Economy counters at the end of the tick.
    pub ledger: LedgerSnapshot,
    /// Enemies that entered the map during the tick.
    pub enemies_spawned: u32,
    /// Enemies removed by barracks during the tick.
    pub enemies_killed: u32,
    /// Buildings destroyed by enemies during the tick.
    pub buildings_destroyed: Vec<BuildingId>,
    /// Enemies alive after the tick.
    pub enemy_count: usize,
    /// Buildings standing after the tick.
    pub building_count: usize,
    /// Set when the tick ended the game.
    pub game_over: Option<GameOverCause>,
}

/// Visual layer a tile belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Underlying terrain tiles.
    Terrain,
    /// Constructed buildings.
    Building,
    /// Moving enemies.
    Enemy,
}

/// Visual drawn on a tile by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sprite {
    /// A building of the provided kind.
    Building(BuildingKind),
    /// An enemy of the provided kind.
    Enemy(EnemyKind),
}

/// External provider of terrain classification and fog of war.
pub trait TerrainProvider {
    /// Terrain at the cell, or `None` outside the generated map.
    fn terrain_at(&self, cell: Cell) -> Option<Terrain>;

    /// Reports whether the cell is still hidden by fog of war.
    fn is_fogged(&self, cell: Cell) -> bool;

    /// Clears fog from every cell within `radius` of `center`.
    fn reveal_fog(&mut self, center: Cell, radius: u32);
}

/// Side-effect sink that mirrors simulation state into tiles.
pub trait TileRenderer {
    /// Draws a sprite at the cell on the provided layer.
    fn draw(&mut self, layer: Layer, cell: Cell, sprite: Sprite);

    /// Clears whatever the layer shows at the cell.
    fn clear(&mut self, layer: Layer, cell: Cell);
}
