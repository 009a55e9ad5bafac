//! Level grid: coordinates, walkability and text map loading.
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::config::CELL_SIZE;
use crate::core::door::{DOOR_TEXTURE, Door, DoorEvent};
use crate::error::GameError;

/// Discrete (column, row) address in the tile grid.
///
/// Signed on purpose: neighbor enumeration may step to -1 and the
/// walkability gate is what rejects it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridCoordinate {
    pub col: i32,
    pub row: i32,
}

impl GridCoordinate {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Fixed cell-size divide and floor.
    #[inline]
    pub fn from_world(x: f32, y: f32) -> Self {
        Self {
            col: (x / CELL_SIZE).floor() as i32,
            row: (y / CELL_SIZE).floor() as i32,
        }
    }

    /// World-space center of this cell.
    #[inline]
    pub fn center(self) -> (f32, f32) {
        (
            (self.col as f32 + 0.5) * CELL_SIZE,
            (self.row as f32 + 0.5) * CELL_SIZE,
        )
    }

    #[inline]
    pub fn manhattan(self, other: GridCoordinate) -> i32 {
        (self.col - other.col).abs() + (self.row - other.row).abs()
    }

    /// True for the 8 surrounding cells.
    #[inline]
    pub fn is_adjacent(self, other: GridCoordinate) -> bool {
        self != other && (self.col - other.col).abs() <= 1 && (self.row - other.row).abs() <= 1
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Continuous position plus facing. `angle` is in degrees, 0 = +x,
/// counter-clockwise as seen on screen (grid y grows downward).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self { x, y, angle: wrap_degrees(angle) }
    }

    pub fn at_cell_center(cell: GridCoordinate, angle: f32) -> Self {
        let (x, y) = cell.center();
        Self::new(x, y, angle)
    }

    #[inline]
    pub fn cell(&self) -> GridCoordinate {
        GridCoordinate::from_world(self.x, self.y)
    }

    /// Snaps the point to the center of the cell it lies in.
    pub fn normalized_to_cell_center(&self) -> Self {
        Self::at_cell_center(self.cell(), self.angle)
    }

    pub fn rotate(&mut self, delta: f32) {
        self.angle = wrap_degrees(self.angle + delta);
    }
}

#[inline]
pub fn wrap_degrees(a: f32) -> f32 {
    let w = a.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if w >= 360.0 { 0.0 } else { w }
}

/// Read-only view of the level consumed by path search and movement.
pub trait GridMap {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    /// False for any off-map coordinate, negative ones included.
    fn is_walkable(&self, row: i32, col: i32) -> bool;

    fn to_cell(&self, x: f32, y: f32) -> GridCoordinate {
        GridCoordinate::from_world(x, y)
    }

    fn is_walkable_cell(&self, cell: GridCoordinate) -> bool {
        self.is_walkable(cell.row, cell.col)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tile {
    Floor,
    /// Wall with a texture variant (1..=4).
    Wall(u8),
    /// Walkable only while its door is open.
    Door,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropKind {
    Lamp,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Rails,
}

#[derive(Clone, Debug)]
pub struct Maze {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    doors: HashMap<GridCoordinate, Door>,
    pub player_spawn: GridCoordinate,
    pub enemy_spawns: Vec<GridCoordinate>,
    pub props: Vec<(GridCoordinate, PropKind)>,
    pub items: Vec<(GridCoordinate, ItemKind)>,
}

pub const DEFAULT_LEVEL: &str = "\
#########
#P....E.#
#....L..#
#..13D31#
#..2....#
#.LD...E#
#..2....#
#R.1....#
#########";

impl Maze {
    /// Parses the text format: `#`/`1`-`4` walls, ` `/`.` floor, `D` door,
    /// `P` player, `E` enemy, `L` lamp, `R` rails. Every row must have the same width.
    pub fn parse(raw: &str) -> Result<Self, GameError> {
        let rows: Vec<&str> = raw.lines().filter(|l| !l.is_empty()).collect();
        if rows.is_empty() {
            return Err(GameError::EmptyMap);
        }
        let width = rows[0].chars().count();
        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);
        let mut player_spawn = None;
        let mut enemy_spawns = Vec::new();
        let mut props = Vec::new();
        let mut items = Vec::new();
        let mut doors = HashMap::new();

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GameError::RaggedRow { row, expected: width, found });
            }
            for (col, ch) in line.chars().enumerate() {
                let here = GridCoordinate::new(col as i32, row as i32);
                let tile = match ch {
                    '#' => Tile::Wall(1),
                    '1'..='4' => Tile::Wall(ch as u8 - b'0'),
                    ' ' | '.' => Tile::Floor,
                    'D' => { doors.insert(here, Door::closed()); Tile::Door }
                    'P' => { player_spawn = Some(here); Tile::Floor }
                    'E' => { enemy_spawns.push(here); Tile::Floor }
                    'L' => { props.push((here, PropKind::Lamp)); Tile::Floor }
                    'R' => { items.push((here, ItemKind::Rails)); Tile::Floor }
                    symbol => return Err(GameError::UnknownSymbol { symbol, row, col }),
                };
                tiles.push(tile);
            }
        }

        let player_spawn = player_spawn.ok_or(GameError::MissingPlayerSpawn)?;
        Ok(Self { width, height, tiles, doors, player_spawn, enemy_spawns, props, items })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn tile(&self, row: i32, col: i32) -> Option<Tile> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.tiles[row * self.width + col])
    }

    /// Wall texture variant at a cell; off-map reads as the default wall
    /// and a closed door as the door texture.
    pub fn wall_at(&self, row: i32, col: i32) -> Option<u8> {
        match self.tile(row, col) {
            Some(Tile::Floor) => None,
            Some(Tile::Wall(v)) => Some(v),
            Some(Tile::Door) if self.is_door_open(GridCoordinate::new(col, row)) => None,
            Some(Tile::Door) => Some(DOOR_TEXTURE),
            None => Some(1),
        }
    }

    pub fn door(&self, cell: GridCoordinate) -> Option<&Door> {
        self.doors.get(&cell)
    }

    fn is_door_open(&self, cell: GridCoordinate) -> bool {
        self.doors.get(&cell).is_some_and(Door::is_open)
    }

    /// Door in the neighboring cell along the cardinal direction closest to `angle`.
    pub fn door_ahead(&self, cell: GridCoordinate, angle: f32) -> Option<GridCoordinate> {
        let a = wrap_degrees(angle);
        let (dc, dr) = if !(45.0..315.0).contains(&a) {
            (1, 0)
        } else if a < 135.0 {
            (0, -1)
        } else if a < 225.0 {
            (-1, 0)
        } else {
            (0, 1)
        };
        let ahead = GridCoordinate::new(cell.col + dc, cell.row + dr);
        self.doors.contains_key(&ahead).then_some(ahead)
    }

    /// Opens a closed door or closes an open one. An open door with someone
    /// standing in it stays open and `None` is returned.
    pub fn toggle_door(&mut self, cell: GridCoordinate, now: f32, occupied: &[GridCoordinate]) -> Option<DoorEvent> {
        let door = self.doors.get_mut(&cell)?;
        if !door.is_open() {
            door.open(now);
            return Some(DoorEvent::Opened);
        }
        if occupied.contains(&cell) {
            return None;
        }
        door.close();
        Some(DoorEvent::Closed)
    }

    /// Shuts every door open for `stay_open` seconds or more whose cell is
    /// free. Returns how many closed.
    pub fn close_expired_doors(&mut self, now: f32, stay_open: f32, occupied: &[GridCoordinate]) -> usize {
        let mut closed = 0;
        for (cell, door) in self.doors.iter_mut() {
            if door.has_expired(now, stay_open) && !occupied.contains(cell) {
                door.close();
                closed += 1;
            }
        }
        closed
    }
}

impl GridMap for Maze {
    fn width(&self) -> i32 { self.width as i32 }
    fn height(&self) -> i32 { self.height as i32 }

    fn is_walkable(&self, row: i32, col: i32) -> bool {
        match self.tile(row, col) {
            Some(Tile::Floor) => true,
            Some(Tile::Door) => self.is_door_open(GridCoordinate::new(col, row)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_level() {
        let maze = Maze::parse(DEFAULT_LEVEL).unwrap();
        assert_eq!(maze.width(), 9);
        assert_eq!(maze.height(), 9);
        assert_eq!(maze.player_spawn, GridCoordinate::new(1, 1));
        assert_eq!(maze.enemy_spawns, vec![GridCoordinate::new(6, 1), GridCoordinate::new(7, 5)]);
        assert_eq!(maze.props.len(), 2);
        assert_eq!(maze.items, vec![(GridCoordinate::new(1, 7), ItemKind::Rails)]);
        assert!(!maze.is_walkable(0, 0));
        assert!(maze.is_walkable(1, 1));
        assert_eq!(maze.wall_at(3, 4), Some(3));
        assert_eq!(maze.wall_at(3, 5), Some(DOOR_TEXTURE));
        assert!(maze.door(GridCoordinate::new(3, 5)).is_some());
    }

    #[test]
    fn doors_block_until_opened() {
        let mut maze = Maze::parse(DEFAULT_LEVEL).unwrap();
        let door = GridCoordinate::new(5, 3);
        assert!(!maze.is_walkable_cell(door));
        assert_eq!(maze.toggle_door(door, 1.0, &[]), Some(DoorEvent::Opened));
        assert!(maze.is_walkable_cell(door));
        assert_eq!(maze.wall_at(3, 5), None);
        assert_eq!(maze.toggle_door(door, 2.0, &[]), Some(DoorEvent::Closed));
        assert!(!maze.is_walkable_cell(door));
        assert_eq!(maze.toggle_door(GridCoordinate::new(1, 1), 2.0, &[]), None);
    }

    #[test]
    fn occupied_doorway_stays_open() {
        let mut maze = Maze::parse(DEFAULT_LEVEL).unwrap();
        let door = GridCoordinate::new(3, 5);
        maze.toggle_door(door, 0.0, &[]);
        assert_eq!(maze.toggle_door(door, 1.0, &[door]), None);
        assert_eq!(maze.close_expired_doors(10.0, 5.0, &[door]), 0);
        assert!(maze.is_walkable_cell(door));
    }

    #[test]
    fn doors_shut_after_the_timeout() {
        let mut maze = Maze::parse(DEFAULT_LEVEL).unwrap();
        let door = GridCoordinate::new(3, 5);
        maze.toggle_door(door, 2.0, &[]);
        assert_eq!(maze.close_expired_doors(6.5, 5.0, &[]), 0);
        assert!(maze.is_walkable_cell(door));
        assert_eq!(maze.close_expired_doors(7.0, 5.0, &[]), 1);
        assert!(!maze.is_walkable_cell(door));
    }

    #[test]
    fn door_ahead_follows_the_facing() {
        let maze = Maze::parse(DEFAULT_LEVEL).unwrap();
        // (5, 2) sits just north of the door at (5, 3)
        let here = GridCoordinate::new(5, 2);
        assert_eq!(maze.door_ahead(here, 270.0), Some(GridCoordinate::new(5, 3)));
        assert_eq!(maze.door_ahead(here, 300.0), Some(GridCoordinate::new(5, 3)));
        assert_eq!(maze.door_ahead(here, 0.0), None);
        assert_eq!(maze.door_ahead(here, 90.0), None);
        // west of the door at (3, 5), facing east
        assert_eq!(maze.door_ahead(GridCoordinate::new(2, 5), 10.0), Some(GridCoordinate::new(3, 5)));
        assert_eq!(maze.door_ahead(GridCoordinate::new(2, 5), 350.0), Some(GridCoordinate::new(3, 5)));
    }

    #[test]
    fn off_map_is_never_walkable() {
        let maze = Maze::parse(DEFAULT_LEVEL).unwrap();
        assert!(!maze.is_walkable(-1, 1));
        assert!(!maze.is_walkable(1, -1));
        assert!(!maze.is_walkable(9, 1));
        assert!(!maze.is_walkable(1, 9));
        assert_eq!(maze.wall_at(-1, -1), Some(1));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Maze::parse("####\n#P.\n####").unwrap_err();
        assert!(matches!(err, GameError::RaggedRow { row: 1, expected: 4, found: 3 }));
    }

    #[test]
    fn empty_and_spawnless_maps_are_rejected() {
        assert!(matches!(Maze::parse("\n\n").unwrap_err(), GameError::EmptyMap));
        assert!(matches!(Maze::parse("###\n#.#\n###").unwrap_err(), GameError::MissingPlayerSpawn));
        assert!(matches!(
            Maze::parse("###\n#P?\n###").unwrap_err(),
            GameError::UnknownSymbol { symbol: '?', row: 1, col: 2 }
        ));
    }

    #[test]
    fn cell_center_round_trip_is_idempotent() {
        for &(x, y) in &[(0.0, 0.0), (95.3, 17.9), (63.999, 64.0), (300.5, 511.0)] {
            let once = WorldPosition::new(x, y, 0.0).normalized_to_cell_center();
            let twice = once.normalized_to_cell_center();
            assert_eq!(once, twice);
            assert_eq!(once.cell(), GridCoordinate::from_world(x, y));
        }
    }

    #[test]
    fn angles_wrap_into_range() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        let mut p = WorldPosition::new(0.0, 0.0, 350.0);
        p.rotate(20.0);
        assert_eq!(p.angle, 10.0);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.txt");
        std::fs::write(&path, "####\n#PE#\n####\n").unwrap();
        let maze = Maze::load(&path).unwrap();
        assert_eq!(maze.enemy_spawns, vec![GridCoordinate::new(2, 1)]);
        assert!(matches!(Maze::load(dir.path().join("missing.txt")), Err(GameError::Io { .. })));
    }
}
