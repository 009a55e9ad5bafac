use crate::config::GameConfig;
use crate::core::entity::Damageable;
use crate::core::maze::{GridMap, WorldPosition};

/// Collision radius around the player, in world units.
const PLAYER_RADIUS: f32 = 10.0;

pub struct Player {
    pub pos: WorldPosition,
    health: i32,
    max_health: i32,
    pub move_step: f32,
    pub turn_step: f32,
}

impl Player {
    pub fn new(pos: WorldPosition, cfg: &GameConfig) -> Self {
        Self {
            pos,
            health: cfg.player_health,
            max_health: cfg.player_health,
            move_step: cfg.player_move_step,
            turn_step: cfg.player_turn_step,
        }
    }

    /// Restores up to `amount` health, capped at the starting value.
    /// Returns the health actually gained; the dead stay dead.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.is_dead() {
            return 0;
        }
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }

    pub fn turn_left(&mut self) { self.pos.rotate(self.turn_step); }
    pub fn turn_right(&mut self) { self.pos.rotate(-self.turn_step); }

    /// Unit vector of the facing; y is mirrored because the grid grows downward.
    pub fn facing(&self) -> (f32, f32) {
        let a = self.pos.angle.to_radians();
        (a.cos(), -a.sin())
    }

    pub fn move_forward<M: GridMap + ?Sized>(&mut self, map: &M) -> bool {
        self.try_move(map, self.move_step)
    }

    pub fn move_backward<M: GridMap + ?Sized>(&mut self, map: &M) -> bool {
        self.try_move(map, -self.move_step)
    }

    /// Slides along walls: each axis is tried on its own.
    fn try_move<M: GridMap + ?Sized>(&mut self, map: &M, distance: f32) -> bool {
        let (fx, fy) = self.facing();
        let (dx, dy) = (fx * distance, fy * distance);
        let mut moved = false;
        if is_free_with_radius(map, self.pos.x + dx, self.pos.y, PLAYER_RADIUS) {
            self.pos.x += dx;
            moved = true;
        }
        if is_free_with_radius(map, self.pos.x, self.pos.y + dy, PLAYER_RADIUS) {
            self.pos.y += dy;
            moved = true;
        }
        moved
    }
}

impl Damageable for Player {
    fn health(&self) -> i32 { self.health }

    fn apply_damage(&mut self, amount: i32) {
        if self.is_dead() {
            return;
        }
        self.health = (self.health - amount).max(0);
    }
}

/// Samples the circle's center and 8 points on its rim.
pub fn is_free_with_radius<M: GridMap + ?Sized>(map: &M, wx: f32, wy: f32, r: f32) -> bool {
    let d = r * std::f32::consts::FRAC_1_SQRT_2;
    let samples = [
        (wx, wy),
        (wx + r, wy),
        (wx - r, wy),
        (wx, wy + r),
        (wx, wy - r),
        (wx + d, wy + d),
        (wx - d, wy + d),
        (wx + d, wy - d),
        (wx - d, wy - d),
    ];
    samples.iter().all(|&(sx, sy)| map.is_walkable_cell(map.to_cell(sx, sy)))
}
