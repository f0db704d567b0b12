#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless terrain and tile presentation for Village Defence adapters.
//!
//! [`TerrainMap`] answers terrain and fog queries for the simulation, while
//! [`AsciiCanvas`] records what each layer shows so that adapters can print
//! the map as text.

use std::{
    collections::{HashMap, HashSet},
    error::Error,
    fmt, fs,
    path::Path,
};

use anyhow::{Context, Result as AnyResult};
use village_defence_core::{
    BuildingKind, Cell, EnemyKind, Layer, MapBounds, Sprite, Terrain, TerrainProvider,
    TileRenderer,
};

const FOG_GLYPH: char = '#';
const CLEARED_GLYPH: char = '_';

/// Glyph used for a terrain tile in map files and rendered output.
#[must_use]
pub const fn terrain_glyph(terrain: Terrain) -> char {
    match terrain {
        Terrain::Water => '~',
        Terrain::Grassland => '.',
        Terrain::Forest => '*',
        Terrain::Mountain => '^',
    }
}

fn terrain_from_glyph(glyph: char) -> Option<Terrain> {
    match glyph {
        '~' => Some(Terrain::Water),
        '.' => Some(Terrain::Grassland),
        '*' => Some(Terrain::Forest),
        '^' => Some(Terrain::Mountain),
        _ => None,
    }
}

/// Glyph used for a sprite in rendered output.
#[must_use]
pub const fn sprite_glyph(sprite: Sprite) -> char {
    match sprite {
        Sprite::Building(kind) => match kind {
            BuildingKind::LumberMill => 'L',
            BuildingKind::Dock => 'D',
            BuildingKind::Quarry => 'Q',
            BuildingKind::Mine => 'M',
            BuildingKind::House => 'H',
            BuildingKind::Farm => 'F',
            BuildingKind::Barracks => 'B',
            BuildingKind::Townhall => 'T',
        },
        Sprite::Enemy(EnemyKind::Brute) => 'E',
    }
}

/// In-memory terrain with fog of war, indexed row-major from the top row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainMap {
    bounds: MapBounds,
    width: usize,
    tiles: Vec<Terrain>,
    fog: Vec<bool>,
}

impl TerrainMap {
    /// Creates a fully fogged map where every tile has the same terrain.
    #[must_use]
    pub fn uniform(width: u32, height: u32, terrain: Terrain) -> Self {
        let bounds = MapBounds::centered(width, height);
        let count = bounds.cells().count();
        Self {
            bounds,
            width: width.max(1) as usize,
            tiles: vec![terrain; count],
            fog: vec![true; count],
        }
    }

    /// Parses a fully fogged map from rows of terrain glyphs, top row first.
    ///
    /// Glyphs are `~` water, `.` grassland, `*` forest and `^` mountain.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, RenderingError> {
        let Some(first) = rows.first() else {
            return Err(RenderingError::EmptyMap);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(RenderingError::EmptyMap);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(RenderingError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let terrain = terrain_from_glyph(glyph).ok_or(RenderingError::UnknownGlyph {
                    glyph,
                    row,
                    column,
                })?;
                tiles.push(terrain);
            }
        }

        let columns = u32::try_from(width).unwrap_or(u32::MAX);
        let lines = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        Ok(Self {
            bounds: MapBounds::centered(columns, lines),
            width,
            fog: vec![true; tiles.len()],
            tiles,
        })
    }

    /// Reads a map file holding one row of glyphs per line.
    pub fn load(path: &Path) -> AnyResult<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read terrain map at {}", path.display()))?;
        let rows: Vec<&str> = contents
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(&rows)
            .with_context(|| format!("invalid terrain map at {}", path.display()))
    }

    /// Bounds covered by the map.
    #[must_use]
    pub const fn bounds(&self) -> MapBounds {
        self.bounds
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::try_from(self.width).unwrap_or(u32::MAX)
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        u32::try_from(self.tiles.len() / self.width).unwrap_or(u32::MAX)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.bounds.contains(cell) {
            return None;
        }
        let column = usize::try_from(cell.x() - self.bounds.min().x()).ok()?;
        let row = usize::try_from(self.bounds.max().y() - cell.y()).ok()?;
        Some(row * self.width + column)
    }
}

impl TerrainProvider for TerrainMap {
    fn terrain_at(&self, cell: Cell) -> Option<Terrain> {
        self.index(cell).map(|index| self.tiles[index])
    }

    fn is_fogged(&self, cell: Cell) -> bool {
        self.index(cell).map_or(true, |index| self.fog[index])
    }

    /// Only cells on the map are visited, so huge radii stay cheap.
    fn reveal_fog(&mut self, center: Cell, radius: u32) {
        let revealed: Vec<usize> = self
            .bounds
            .cells()
            .filter(|cell| center.within_radius(*cell, radius))
            .filter_map(|cell| self.index(cell))
            .collect();
        for index in revealed {
            self.fog[index] = false;
        }
    }
}

/// Tile renderer that remembers the contents of every layer.
#[derive(Clone, Debug, Default)]
pub struct AsciiCanvas {
    sprites: HashMap<(Layer, Cell), Sprite>,
    cleared_terrain: HashSet<Cell>,
}

impl AsciiCanvas {
    /// Creates an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprite shown on the layer at the cell, if any.
    #[must_use]
    pub fn sprite_at(&self, layer: Layer, cell: Cell) -> Option<Sprite> {
        self.sprites.get(&(layer, cell)).copied()
    }

    /// Reports whether the terrain tile at the cell was cleared.
    #[must_use]
    pub fn is_terrain_cleared(&self, cell: Cell) -> bool {
        self.cleared_terrain.contains(&cell)
    }

    /// Glyph visible at the cell: enemies over buildings over fog over terrain.
    #[must_use]
    pub fn glyph_at(&self, terrain: &TerrainMap, cell: Cell) -> char {
        let sprite = self
            .sprite_at(Layer::Enemy, cell)
            .or_else(|| self.sprite_at(Layer::Building, cell));
        if let Some(sprite) = sprite {
            return sprite_glyph(sprite);
        }
        if terrain.is_fogged(cell) {
            return FOG_GLYPH;
        }
        if self.is_terrain_cleared(cell) {
            return CLEARED_GLYPH;
        }
        terrain.terrain_at(cell).map_or(FOG_GLYPH, terrain_glyph)
    }

    /// Renders the whole map, top row first, one line per row.
    #[must_use]
    pub fn render(&self, terrain: &TerrainMap) -> String {
        let bounds = terrain.bounds();
        let mut output = String::new();
        for y in (bounds.min().y()..=bounds.max().y()).rev() {
            let row = bounds.min().x()..=bounds.max().x();
            output.extend(row.map(|x| self.glyph_at(terrain, Cell::new(x, y))));
            output.push('\n');
        }
        output
    }
}

impl TileRenderer for AsciiCanvas {
    fn draw(&mut self, layer: Layer, cell: Cell, sprite: Sprite) {
        let _ = self.sprites.insert((layer, cell), sprite);
    }

    fn clear(&mut self, layer: Layer, cell: Cell) {
        if layer == Layer::Terrain {
            let _ = self.cleared_terrain.insert(cell);
        }
        let _ = self.sprites.remove(&(layer, cell));
    }
}

/// Errors that can occur when parsing terrain maps.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The map holds no tiles.
    EmptyMap,
    /// A row differs in length from the first row.
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A glyph does not name any terrain.
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMap => write!(f, "terrain map contains no tiles"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} tiles but the first row has {expected}"
            ),
            Self::UnknownGlyph { glyph, row, column } => {
                write!(f, "unknown terrain glyph {glyph:?} at row {row}, column {column}")
            }
        }
    }
}

impl Error for RenderingError {}
