//! Wall ray casting (DDA grid walk) and the per-column depth buffer.
use crate::config::CELL_SIZE;
use crate::core::maze::{GridCoordinate, GridMap, Maze, WorldPosition};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersect {
    /// Euclidean distance along the ray, world units.
    pub distance: f32,
    pub cell: GridCoordinate,
    /// Texture variant of the wall hit.
    pub wall: u8,
    /// Horizontal texture coordinate in [0, 1).
    pub u: f32,
    /// True when the ray crossed a vertical grid line (east/west face).
    pub vertical_face: bool,
}

/// Walks the grid from `(x, y)` along `angle` degrees until a wall is hit.
pub fn cast_ray(maze: &Maze, x: f32, y: f32, angle: f32) -> Option<Intersect> {
    let a = angle.to_radians();
    let (dir_x, dir_y) = (a.cos(), -a.sin());
    let (px, py) = (x / CELL_SIZE, y / CELL_SIZE);
    let mut map_x = px.floor() as i32;
    let mut map_y = py.floor() as i32;

    let delta_x = if dir_x == 0.0 { f32::INFINITY } else { (1.0 / dir_x).abs() };
    let delta_y = if dir_y == 0.0 { f32::INFINITY } else { (1.0 / dir_y).abs() };
    let (step_x, mut side_x) = if dir_x < 0.0 {
        (-1, (px - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - px) * delta_x)
    };
    let (step_y, mut side_y) = if dir_y < 0.0 {
        (-1, (py - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - py) * delta_y)
    };

    // off-map reads as wall, so this only guards against NaN input
    let max_steps = 4 * (maze.width() + maze.height() + 2);
    for _ in 0..max_steps {
        let vertical_face = side_x < side_y;
        if vertical_face {
            side_x += delta_x;
            map_x += step_x;
        } else {
            side_y += delta_y;
            map_y += step_y;
        }
        if let Some(wall) = maze.wall_at(map_y, map_x) {
            let dist = if vertical_face { side_x - delta_x } else { side_y - delta_y };
            let along = if vertical_face { py + dist * dir_y } else { px + dist * dir_x };
            return Some(Intersect {
                distance: dist * CELL_SIZE,
                cell: GridCoordinate::new(map_x, map_y),
                wall,
                u: along - along.floor(),
                vertical_face,
            });
        }
    }
    None
}

/// Casts one ray per screen column, left to right, and stores the
/// perpendicular (fisheye-corrected) distance for each in `depths`.
pub fn cast_walls(
    maze: &Maze,
    viewer: WorldPosition,
    width: u32,
    fov: f32,
    depths: &mut Vec<f32>,
    hits: &mut Vec<Option<Intersect>>,
) {
    let w = width as usize;
    depths.clear();
    hits.clear();
    let delta = fov / width as f32;
    for col in 0..w {
        let offset = fov * 0.5 - col as f32 * delta;
        let hit = cast_ray(maze, viewer.x, viewer.y, viewer.angle + offset);
        let perp = hit.map_or(f32::INFINITY, |h| h.distance * offset.to_radians().cos());
        depths.push(perp);
        hits.push(hit);
    }
}
