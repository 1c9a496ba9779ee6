use crate::world::TowerId;
use glam::Vec2;
use std::fmt;

/// One cell of the fixed map.
///
/// `Tower` embeds the occupying tower's id so occupancy lookups are O(1);
/// the id is only meaningful while that tower exists in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Ground,
    Block,
    Tower(TowerId),
    Path,
    Spawn,
    Goal,
}

impl Tile {
    pub fn is_buildable(self) -> bool {
        matches!(self, Tile::Ground)
    }

    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Path | Tile::Goal)
    }
}

/// Map template problems. All of these abort match construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    Empty,
    RaggedRow { row: usize },
    UnknownTile { row: usize, col: usize, ch: char },
    MissingGoal,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Empty => write!(f, "map template is empty"),
            MapError::RaggedRow { row } => {
                write!(f, "map row {} differs in length from row 0", row)
            }
            MapError::UnknownTile { row, col, ch } => {
                write!(f, "unknown tile {:?} at ({}, {})", ch, col, row)
            }
            MapError::MissingGoal => write!(f, "map has no goal tile"),
        }
    }
}

impl std::error::Error for MapError {}

/// The fixed tile layout of a match.
///
/// Mutated only by tower placement/removal (Ground <-> Tower) and by the
/// one-time Spawn -> Path normalization in [`Grid::find_spawn_points`].
#[derive(Clone, Debug)]
pub struct Grid {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
    goal: (u16, u16),
}

impl Grid {
    /// Parses a character template: `.` ground, `#` block, `+` path,
    /// `S` spawn, `G` goal. The first goal in row-major order wins; a map
    /// without one cannot run and is rejected.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        if rows.is_empty() || rows[0].as_ref().is_empty() {
            return Err(MapError::Empty);
        }
        let width = rows[0].as_ref().chars().count();
        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut goal = None;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(MapError::RaggedRow { row: y });
            }
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '.' => Tile::Ground,
                    '#' => Tile::Block,
                    '+' => Tile::Path,
                    'S' => Tile::Spawn,
                    'G' => Tile::Goal,
                    _ => return Err(MapError::UnknownTile { row: y, col: x, ch }),
                };
                if tile == Tile::Goal && goal.is_none() {
                    goal = Some((x as u16, y as u16));
                }
                tiles.push(tile);
            }
        }

        Ok(Self {
            width: width as u16,
            height: rows.len() as u16,
            tiles,
            goal: goal.ok_or(MapError::MissingGoal)?,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn goal(&self) -> (u16, u16) {
        self.goal
    }

    #[inline]
    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Tile {
        self.tiles[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u16, y: u16, tile: Tile) {
        let idx = self.idx(x, y);
        self.tiles[idx] = tile;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Collects every spawn tile and rewrites it to Path, so monsters can
    /// walk over the tile they appeared on. Run once at setup.
    pub fn find_spawn_points(&mut self) -> Vec<(u16, u16)> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) == Tile::Spawn {
                    points.push((x, y));
                    self.set(x, y, Tile::Path);
                }
            }
        }
        points
    }
}

/// Center of a tile in world units. Waypoints and tower centers both live
/// here so movement interpolation stays continuous.
pub fn tile_center(x: u16, y: u16, tile_size: f32) -> Vec2 {
    Vec2::new(
        x as f32 * tile_size + tile_size / 2.0,
        y as f32 * tile_size + tile_size / 2.0,
    )
}
