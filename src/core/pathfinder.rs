//! Grid A* returning only the next hop toward a goal.
//!
//! Callers re-run the search every tick instead of caching a route, so a
//! moving target or a changed map is picked up for free.
use std::collections::{HashMap, HashSet};
use std::f64::consts::SQRT_2;

use tracing::trace;

use crate::core::maze::{GridCoordinate, GridMap};

struct SearchNode {
    g: f64,
    f: f64,
    parent: Option<GridCoordinate>,
}

/// First cell after `start` on an A* route to `goal`.
///
/// `None` when the goal is unreachable, and also when `start == goal`
/// (there is no step to take).
pub fn find_next_step<M: GridMap + ?Sized>(
    map: &M,
    start: GridCoordinate,
    goal: GridCoordinate,
) -> Option<GridCoordinate> {
    let mut open: Vec<GridCoordinate> = vec![start];
    let mut closed: HashSet<GridCoordinate> = HashSet::new();
    let mut nodes: HashMap<GridCoordinate, SearchNode> = HashMap::new();
    nodes.insert(start, SearchNode { g: 0.0, f: heuristic(start, goal), parent: None });

    while !open.is_empty() {
        let idx = lowest_f(&open, &nodes);
        let current = open[idx];
        if current == goal {
            return first_hop(&nodes, goal);
        }
        open.remove(idx);
        closed.insert(current);

        let current_g = nodes[&current].g;
        for next in neighbors(map, current) {
            if closed.contains(&next) || !map.is_walkable_cell(next) {
                continue;
            }
            let tentative = current_g + step_cost(current, next);
            let better = match nodes.get(&next) {
                Some(node) if open.contains(&next) => tentative < node.g,
                _ => {
                    open.push(next);
                    true
                }
            };
            if better {
                nodes.insert(next, SearchNode {
                    g: tentative,
                    f: tentative + heuristic(next, goal),
                    parent: Some(current),
                });
            }
        }
    }

    trace!(%start, %goal, expanded = closed.len(), "no path");
    None
}

/// Linear scan; the first minimum in insertion order wins ties.
fn lowest_f(open: &[GridCoordinate], nodes: &HashMap<GridCoordinate, SearchNode>) -> usize {
    let mut best = 0;
    let mut best_f = nodes[&open[0]].f;
    for (i, c) in open.iter().enumerate().skip(1) {
        let f = nodes[c].f;
        if f < best_f {
            best_f = f;
            best = i;
        }
    }
    best
}

/// The 8 surrounding cells, columns outer and rows inner, bounded only above.
fn neighbors<M: GridMap + ?Sized>(map: &M, node: GridCoordinate) -> Vec<GridCoordinate> {
    let mut out = Vec::with_capacity(8);
    let mut col = node.col - 1;
    while col <= node.col + 1 && col < map.width() {
        let mut row = node.row - 1;
        while row <= node.row + 1 && row < map.height() {
            if col != node.col || row != node.row {
                out.push(GridCoordinate::new(col, row));
            }
            row += 1;
        }
        col += 1;
    }
    out
}

#[inline]
fn step_cost(a: GridCoordinate, b: GridCoordinate) -> f64 {
    if a.col == b.col || a.row == b.row { 1.0 } else { SQRT_2 }
}

#[inline]
fn heuristic(a: GridCoordinate, b: GridCoordinate) -> f64 {
    a.manhattan(b) as f64
}

/// Walks parents back from the goal until the node whose parent is the start.
fn first_hop(nodes: &HashMap<GridCoordinate, SearchNode>, goal: GridCoordinate) -> Option<GridCoordinate> {
    let mut current = goal;
    loop {
        let parent = nodes.get(&current)?.parent?;
        if nodes.get(&parent)?.parent.is_none() {
            return Some(current);
        }
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestGrid {
        width: i32,
        height: i32,
        blocked: HashSet<GridCoordinate>,
    }

    impl TestGrid {
        fn open(width: i32, height: i32) -> Self {
            Self { width, height, blocked: HashSet::new() }
        }

        fn with_walls(mut self, walls: &[(i32, i32)]) -> Self {
            self.blocked.extend(walls.iter().map(|&(c, r)| GridCoordinate::new(c, r)));
            self
        }
    }

    impl GridMap for TestGrid {
        fn width(&self) -> i32 { self.width }
        fn height(&self) -> i32 { self.height }
        fn is_walkable(&self, row: i32, col: i32) -> bool {
            row >= 0 && col >= 0 && row < self.height && col < self.width
                && !self.blocked.contains(&GridCoordinate::new(col, row))
        }
    }

    fn c(col: i32, row: i32) -> GridCoordinate {
        GridCoordinate::new(col, row)
    }

    #[test]
    fn open_grid_next_hop_is_adjacent_and_closer() {
        let grid = TestGrid::open(7, 7);
        for sc in 0..7 {
            for sr in 0..7 {
                for gc in 0..7 {
                    for gr in 0..7 {
                        let (start, goal) = (c(sc, sr), c(gc, gr));
                        if start == goal {
                            continue;
                        }
                        let hop = find_next_step(&grid, start, goal)
                            .unwrap_or_else(|| panic!("no hop {start} -> {goal}"));
                        assert!(start.is_adjacent(hop), "{start} -> {goal} gave {hop}");
                        assert!(hop.manhattan(goal) < start.manhattan(goal), "{start} -> {goal} gave {hop}");
                    }
                }
            }
        }
    }

    #[test]
    fn prefers_diagonal_toward_goal() {
        let grid = TestGrid::open(7, 7);
        assert_eq!(find_next_step(&grid, c(1, 1), c(5, 3)), Some(c(2, 2)));
        assert_eq!(find_next_step(&grid, c(0, 0), c(3, 3)), Some(c(1, 1)));
        assert_eq!(find_next_step(&grid, c(0, 0), c(3, 0)), Some(c(1, 0)));
    }

    #[test]
    fn start_equal_to_goal_has_no_step() {
        let grid = TestGrid::open(5, 5);
        assert_eq!(find_next_step(&grid, c(2, 2), c(2, 2)), None);
    }

    #[test]
    fn walled_off_goal_terminates_with_none() {
        let mut ring = Vec::new();
        for i in 2..=6 {
            ring.extend([(i, 2), (i, 6), (2, i), (6, i)]);
        }
        let grid = TestGrid::open(9, 9).with_walls(&ring);
        assert_eq!(find_next_step(&grid, c(0, 0), c(4, 4)), None);
        assert_eq!(find_next_step(&grid, c(4, 4), c(0, 0)), None);
    }

    #[test]
    fn routes_around_a_wall() {
        let grid = TestGrid::open(5, 5).with_walls(&[(2, 0), (2, 1), (2, 2), (2, 3)]);
        assert_eq!(find_next_step(&grid, c(0, 0), c(4, 0)), Some(c(1, 1)));
        assert_eq!(find_next_step(&grid, c(1, 1), c(3, 1)), Some(c(1, 2)));
    }

    #[test]
    fn corner_cells_do_not_escape_the_grid() {
        let grid = TestGrid::open(3, 3);
        for cell in neighbors(&grid, c(0, 0)) {
            assert!(cell.col >= -1 && cell.row >= -1);
        }
        // negative neighbors are generated but never stepped into
        assert!(neighbors(&grid, c(0, 0)).contains(&c(-1, -1)));
        assert_eq!(find_next_step(&grid, c(0, 0), c(2, 0)), Some(c(1, 0)));
    }

    #[test]
    fn diagonal_may_cut_corners() {
        // both flanks blocked, diagonal endpoint open
        let grid = TestGrid::open(3, 3).with_walls(&[(1, 0), (0, 1)]);
        assert_eq!(find_next_step(&grid, c(0, 0), c(1, 1)), Some(c(1, 1)));
    }

    #[test]
    fn works_on_the_stock_level() {
        use crate::core::maze::{DEFAULT_LEVEL, Maze};
        let mut maze = Maze::parse(DEFAULT_LEVEL).unwrap();
        // the room is sealed until one of its doors opens
        assert_eq!(find_next_step(&maze, c(7, 5), maze.player_spawn), None);
        maze.toggle_door(c(3, 5), 0.0, &[]);
        let hop = find_next_step(&maze, c(7, 5), maze.player_spawn).unwrap();
        assert!(c(7, 5).is_adjacent(hop));
        assert!(maze.is_walkable_cell(hop));
    }
}
