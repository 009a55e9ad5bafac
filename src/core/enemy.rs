//! Enemy combat and navigation state machine.
//!
//! One `interact` call per tick: keep firing while a countdown runs, maybe
//! start a new countdown when the player can see us, otherwise take one step
//! along a freshly searched A* hop toward the target.
use rand::Rng;
use tracing::debug;

use crate::config::GameConfig;
use crate::core::animation::{AnimationSet, Animator, EnemyState};
use crate::core::entity::{Billboard, Damageable, EntityId, SpriteFrame};
use crate::core::maze::{GridCoordinate, GridMap, WorldPosition, wrap_degrees};
use crate::core::pathfinder::find_next_step;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EnemyTuning {
    pub step_size: f32,
    pub shot_damage: i32,
    pub fire_chance: f64,
    pub fire_duration_choices: u32,
    pub fire_duration_unit: u32,
}

impl From<&GameConfig> for EnemyTuning {
    fn from(cfg: &GameConfig) -> Self {
        Self {
            step_size: cfg.enemy_step_size,
            shot_damage: cfg.enemy_shot_damage,
            fire_chance: cfg.enemy_fire_chance.clamp(0.0, 1.0),
            fire_duration_choices: cfg.enemy_fire_duration_choices.max(1),
            fire_duration_unit: cfg.enemy_fire_duration_unit,
        }
    }
}

pub struct Enemy {
    pub id: EntityId,
    pub pos: WorldPosition,
    health: i32,
    anim: Animator,
    fire_ticks: u32,
    // one shot per pass through firing frame 0; every new countdown re-arms
    trigger_armed: bool,
    tuning: EnemyTuning,
}

impl Enemy {
    pub fn new(id: EntityId, pos: WorldPosition, cfg: &GameConfig) -> Self {
        Self::with_animations(id, pos, cfg, cfg.enemy_animation)
    }

    pub fn with_animations(id: EntityId, pos: WorldPosition, cfg: &GameConfig, set: AnimationSet) -> Self {
        Self {
            id,
            pos,
            health: cfg.enemy_health,
            anim: Animator::new(set, cfg.animation_interval),
            fire_ticks: 0,
            trigger_armed: true,
            tuning: EnemyTuning::from(cfg),
        }
    }

    pub fn state(&self) -> EnemyState { self.anim.state() }
    pub fn frame(&self) -> usize { self.anim.frame() }
    pub fn fire_ticks(&self) -> u32 { self.fire_ticks }

    /// Starts (or restarts) a fire countdown of `ticks` ticks with a fresh trigger.
    pub fn set_fire_countdown(&mut self, ticks: u32) {
        self.fire_ticks = ticks;
        self.trigger_armed = true;
    }

    /// Advances the animation clock by `elapsed` seconds.
    pub fn animate(&mut self, elapsed: f32) {
        if self.anim.advance(elapsed) && self.anim.frame() != 0 {
            self.trigger_armed = true;
        }
    }

    /// One AI tick against `target`, standing at `target_pos`.
    ///
    /// `visible` is whether this enemy owned any screen column last frame.
    pub fn interact<M, T, R>(
        &mut self,
        map: &M,
        target: &mut T,
        target_pos: WorldPosition,
        visible: bool,
        rng: &mut R,
    ) where
        M: GridMap + ?Sized,
        T: Damageable + ?Sized,
        R: Rng + ?Sized,
    {
        if self.is_dead() {
            return;
        }

        if self.fire_ticks > 0 {
            if self.anim.frame() == 0 && self.trigger_armed {
                self.fire(target);
            }
            self.fire_ticks -= 1;
            return;
        }

        if visible && rng.gen_bool(self.tuning.fire_chance) {
            let choices = self.tuning.fire_duration_choices;
            self.set_fire_countdown(rng.gen_range(0..choices) * self.tuning.fire_duration_unit);
            debug!(enemy = self.id.0, ticks = self.fire_ticks, "fire countdown");
        }

        let start = map.to_cell(self.pos.x, self.pos.y);
        let goal = map.to_cell(target_pos.x, target_pos.y);
        if let Some(hop) = find_next_step(map, start, goal) {
            self.step_toward_cell(map, hop);
        }
    }

    fn fire<T: Damageable + ?Sized>(&mut self, target: &mut T) {
        target.apply_damage(self.tuning.shot_damage);
        self.trigger_armed = false;
        self.anim.set_state(EnemyState::Firing);
    }

    /// Converts a grid hop into a point to walk to. Diagonal hops become
    /// an orthogonal move through a walkable flank, which slides along walls.
    pub fn step_toward_cell<M: GridMap + ?Sized>(&mut self, map: &M, hop: GridCoordinate) {
        let here = map.to_cell(self.pos.x, self.pos.y);
        let cell = if here.col == hop.col || here.row == hop.row {
            hop
        } else {
            let flank = GridCoordinate::new(hop.col, here.row);
            if map.is_walkable_cell(flank) { flank } else { GridCoordinate::new(here.col, hop.row) }
        };
        let (x, y) = cell.center();
        self.step_to(x, y);
    }

    /// One fixed-size step along the straight bearing to `(x, y)`.
    pub fn step_to(&mut self, x: f32, y: f32) {
        if self.is_dead() {
            return;
        }
        if self.pos.x == x && self.pos.y == y {
            self.anim.set_state(EnemyState::Idle);
            return;
        }
        if self.anim.state() != EnemyState::Walking && self.anim.is_last_frame() {
            self.anim.set_state(EnemyState::Walking);
        }

        let dx = x - self.pos.x;
        let dy = -(y - self.pos.y);
        let bearing = dy.atan2(dx);
        self.pos.angle = wrap_degrees(bearing.to_degrees());

        let step = self.tuning.step_size;
        if dx.hypot(dy) <= step {
            self.pos.x = x;
            self.pos.y = y;
            return;
        }
        let heading = -bearing;
        self.pos.x += step * heading.cos();
        self.pos.y += step * heading.sin();
    }
}

impl Damageable for Enemy {
    fn health(&self) -> i32 { self.health }

    fn apply_damage(&mut self, amount: i32) {
        if self.anim.state() == EnemyState::Dead {
            return;
        }
        self.health -= amount;
        let next = if self.health > 0 { EnemyState::Damaged } else { EnemyState::Dead };
        debug!(enemy = self.id.0, health = self.health, state = ?next, "enemy hit");
        self.anim.set_state(next);
    }
}

impl Billboard for Enemy {
    fn id(&self) -> EntityId { self.id }
    fn position(&self) -> WorldPosition { self.pos }

    fn sprite_frame(&self) -> SpriteFrame {
        SpriteFrame::Enemy { state: self.anim.state(), frame: self.anim.frame() }
    }

    fn is_corpse(&self) -> bool {
        self.anim.state() == EnemyState::Dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maze::Maze;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Dummy {
        health: i32,
        hits: u32,
    }

    impl Damageable for Dummy {
        fn health(&self) -> i32 { self.health }
        fn apply_damage(&mut self, amount: i32) {
            self.hits += 1;
            self.health -= amount;
        }
    }

    fn dummy() -> Dummy {
        Dummy { health: 100, hits: 0 }
    }

    const CORRIDOR: &str = "\
#######
#E...P#
#######";

    fn enemy_at(cell: GridCoordinate, cfg: &GameConfig) -> Enemy {
        Enemy::new(EntityId(1), WorldPosition::at_cell_center(cell, 0.0), cfg)
    }

    fn target_pos(maze: &Maze) -> WorldPosition {
        WorldPosition::at_cell_center(maze.player_spawn, 0.0)
    }

    #[test]
    fn lethal_damage_kills_and_death_is_idempotent() {
        let cfg = GameConfig { enemy_health: 5, ..GameConfig::default() };
        let mut e = enemy_at(GridCoordinate::new(1, 1), &cfg);
        e.apply_damage(5);
        assert_eq!(e.state(), EnemyState::Dead);
        assert_eq!(e.health(), 0);
        e.apply_damage(5);
        assert_eq!(e.state(), EnemyState::Dead);
        assert_eq!(e.health(), 0);
        assert!(e.is_corpse());
    }

    #[test]
    fn non_lethal_damage_staggers() {
        let mut e = enemy_at(GridCoordinate::new(1, 1), &GameConfig::default());
        e.apply_damage(5);
        assert_eq!(e.state(), EnemyState::Damaged);
        assert_eq!(e.health(), 95);
        assert_eq!(e.frame(), 0);
    }

    #[test]
    fn last_fire_tick_hits_once_without_moving_then_resumes_walking() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let cfg = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut e = enemy_at(GridCoordinate::new(1, 1), &cfg);
        let mut target = dummy();
        let start = e.pos;

        e.set_fire_countdown(1);
        e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
        assert_eq!(target.hits, 1);
        assert_eq!(target.health, 100 - cfg.enemy_shot_damage);
        assert_eq!(e.state(), EnemyState::Firing);
        assert_eq!(e.fire_ticks(), 0);
        assert_eq!(e.pos, start);

        e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
        assert_eq!(target.hits, 1);
        assert!(e.pos.x > start.x);
    }

    #[test]
    fn countdown_does_not_fire_every_tick_of_frame_zero() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut e = enemy_at(GridCoordinate::new(1, 1), &GameConfig::default());
        let mut target = dummy();
        e.set_fire_countdown(6);
        for _ in 0..6 {
            e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
        }
        assert_eq!(target.hits, 1);

        // next firing cycle comes around after frames 1, 2 and back to 0
        e.set_fire_countdown(6);
        for _ in 0..3 {
            e.animate(0.2);
        }
        assert_eq!(e.frame(), 0);
        e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
        assert_eq!(target.hits, 2);
    }

    #[test]
    fn restarted_countdown_fires_even_while_frame_zero_holds() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut e = enemy_at(GridCoordinate::new(1, 1), &GameConfig::default());
        let mut target = dummy();

        e.set_fire_countdown(1);
        e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
        assert_eq!(target.hits, 1);

        // not enough time to leave frame 0
        e.animate(0.1);
        assert_eq!((e.state(), e.frame()), (EnemyState::Firing, 0));

        e.set_fire_countdown(6);
        for _ in 0..6 {
            e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
        }
        assert_eq!(target.hits, 2);
    }

    #[test]
    fn hidden_enemy_never_opens_fire() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let cfg = GameConfig { enemy_fire_chance: 1.0, ..GameConfig::default() };
        let mut rng = StdRng::seed_from_u64(3);
        let mut e = enemy_at(GridCoordinate::new(1, 1), &cfg);
        let mut target = dummy();
        for _ in 0..20 {
            e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
            assert_eq!(e.fire_ticks(), 0);
        }
        assert_eq!(target.hits, 0);
    }

    #[test]
    fn visible_enemy_starts_countdowns_in_multiples_of_six() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let cfg = GameConfig { enemy_fire_chance: 1.0, ..GameConfig::default() };
        let mut rng = StdRng::seed_from_u64(11);
        let mut e = enemy_at(GridCoordinate::new(1, 1), &cfg);
        let mut target = dummy();
        let mut saw_countdown = false;
        for _ in 0..60 {
            let before = e.fire_ticks();
            e.interact(&maze, &mut target, target_pos(&maze), true, &mut rng);
            if before == 0 && e.fire_ticks() > 0 {
                saw_countdown = true;
                assert_eq!(e.fire_ticks() % 6, 0);
                assert!(e.fire_ticks() <= 18);
            }
        }
        assert!(saw_countdown);
        assert!(target.hits >= 1);
    }

    #[test]
    fn dead_enemy_does_nothing() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let cfg = GameConfig { enemy_fire_chance: 1.0, ..GameConfig::default() };
        let mut rng = StdRng::seed_from_u64(5);
        let mut e = enemy_at(GridCoordinate::new(1, 1), &cfg);
        e.apply_damage(1000);
        e.set_fire_countdown(6);
        let mut target = dummy();
        let start = e.pos;
        e.interact(&maze, &mut target, target_pos(&maze), true, &mut rng);
        assert_eq!(e.pos, start);
        assert_eq!(target.hits, 0);
        assert_eq!(e.fire_ticks(), 6);
    }

    #[test]
    fn sharing_the_target_cell_stands_still() {
        let maze = Maze::parse(CORRIDOR).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let mut e = enemy_at(maze.player_spawn, &GameConfig::default());
        let mut target = dummy();
        let start = e.pos;
        e.interact(&maze, &mut target, target_pos(&maze), false, &mut rng);
        assert_eq!(e.pos, start);
        assert_eq!(e.state(), EnemyState::Idle);
    }

    #[test]
    fn diagonal_hop_prefers_the_hop_column_flank() {
        let maze = Maze::parse("#####\n#E.P#\n#..##\n#####").unwrap();
        let mut e = enemy_at(GridCoordinate::new(1, 1), &GameConfig::default());
        e.step_toward_cell(&maze, GridCoordinate::new(2, 2));
        assert_eq!((e.pos.x, e.pos.y), (99.0, 96.0));
    }

    #[test]
    fn diagonal_hop_slides_along_a_blocked_flank() {
        let maze = Maze::parse("#####\n#E1P#\n#..##\n#####").unwrap();
        let mut e = enemy_at(GridCoordinate::new(1, 1), &GameConfig::default());
        e.step_toward_cell(&maze, GridCoordinate::new(2, 2));
        assert!((e.pos.x - 96.0).abs() < 1e-3);
        assert!((e.pos.y - 99.0).abs() < 1e-3);
    }

    #[test]
    fn walking_starts_on_animation_completion_and_arrival_idles() {
        let mut e = enemy_at(GridCoordinate::new(1, 1), &GameConfig::default());
        e.step_to(98.0, 96.0);
        assert_eq!(e.state(), EnemyState::Walking);
        assert_eq!((e.pos.x, e.pos.y), (98.0, 96.0));
        e.step_to(98.0, 96.0);
        assert_eq!(e.state(), EnemyState::Idle);
    }

    #[test]
    fn damaged_enemy_keeps_its_stagger_until_the_last_frame() {
        let mut e = enemy_at(GridCoordinate::new(1, 1), &GameConfig::default());
        e.apply_damage(5);
        e.step_to(200.0, 96.0);
        assert_eq!(e.state(), EnemyState::Damaged);
        assert_eq!(e.pos.x, 99.0);
        e.animate(0.2);
        e.step_to(200.0, 96.0);
        assert_eq!(e.state(), EnemyState::Walking);
    }
}
