//! Level state and the fixed per-tick update order.
use rand::Rng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::core::door::DoorEvent;
use crate::core::enemy::Enemy;
use crate::core::entity::{Billboard, Damageable, EntityId, Prop};
use crate::core::item::Item;
use crate::core::maze::{GridCoordinate, Maze, WorldPosition};
use crate::core::player::Player;

/// What happened during one `World::tick`, for sound and HUD.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    pub items_taken: usize,
    pub doors_closed: usize,
}

pub struct World {
    pub maze: Maze,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub props: Vec<Prop>,
    pub items: Vec<Item>,
    weapon_damage: i32,
    door_open_seconds: f32,
    /// Seconds of game time elapsed.
    clock: f32,
}

impl World {
    pub fn new(maze: Maze, cfg: &GameConfig) -> Self {
        let player = Player::new(WorldPosition::at_cell_center(maze.player_spawn, 0.0), cfg);
        let mut next_id = 1u32;
        let mut alloc = || {
            let id = EntityId(next_id);
            next_id += 1;
            id
        };
        let enemies: Vec<Enemy> = maze
            .enemy_spawns
            .iter()
            .map(|&cell| Enemy::new(alloc(), WorldPosition::at_cell_center(cell, 180.0), cfg))
            .collect();
        let props: Vec<Prop> = maze
            .props
            .iter()
            .map(|&(cell, kind)| Prop { id: alloc(), pos: WorldPosition::at_cell_center(cell, 0.0), kind })
            .collect();
        let items: Vec<Item> = maze
            .items
            .iter()
            .map(|&(cell, kind)| Item::new(alloc(), WorldPosition::at_cell_center(cell, 0.0), kind, cfg.item_heal))
            .collect();
        info!(enemies = enemies.len(), props = props.len(), items = items.len(), "world ready");
        Self {
            maze,
            player,
            enemies,
            props,
            items,
            weapon_damage: cfg.player_weapon_damage,
            door_open_seconds: cfg.door_open_seconds,
            clock: 0.0,
        }
    }

    pub fn clock(&self) -> f32 { self.clock }

    /// One logical tick: enemies in spawn order (animation clock first, then
    /// AI), then item pickups, then doors that have been open long enough.
    ///
    /// `visible` reports whether an entity owned a screen column last frame.
    pub fn tick<V, R>(&mut self, elapsed: f32, visible: V, rng: &mut R) -> TickEvents
    where
        V: Fn(EntityId) -> bool,
        R: Rng + ?Sized,
    {
        self.clock += elapsed;
        let target_pos = self.player.pos;
        for enemy in &mut self.enemies {
            enemy.animate(elapsed);
            enemy.interact(&self.maze, &mut self.player, target_pos, visible(enemy.id), rng);
        }

        let mut events = TickEvents::default();
        for item in &mut self.items {
            if item.interact(&mut self.player) {
                events.items_taken += 1;
            }
        }

        let occupied = self.occupied_cells();
        events.doors_closed = self.maze.close_expired_doors(self.clock, self.door_open_seconds, &occupied);
        if events.doors_closed > 0 {
            debug!(closed = events.doors_closed, "doors shut");
        }
        events
    }

    /// Cells a closing door would crush: the player's and every live enemy's.
    fn occupied_cells(&self) -> Vec<GridCoordinate> {
        std::iter::once(self.player.pos.cell())
            .chain(self.enemies.iter().filter(|e| !e.is_dead()).map(|e| e.pos.cell()))
            .collect()
    }

    /// Door directly in front of the player, if any.
    pub fn door_ahead(&self) -> Option<GridCoordinate> {
        self.maze.door_ahead(self.player.pos.cell(), self.player.pos.angle)
    }

    pub fn toggle_door(&mut self, cell: GridCoordinate) -> Option<DoorEvent> {
        let occupied = self.occupied_cells();
        let event = self.maze.toggle_door(cell, self.clock, &occupied);
        debug!(%cell, ?event, "door used");
        event
    }

    /// Player shot at whatever occupies the crosshair column.
    /// Returns true when a live enemy took the hit.
    pub fn player_fire(&mut self, crosshair: Option<EntityId>) -> bool {
        let Some(id) = crosshair else { return false };
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if enemy.is_dead() {
            return false;
        }
        enemy.apply_damage(self.weapon_damage);
        if enemy.is_dead() {
            info!(enemy = id.0, "enemy down");
        }
        true
    }

    /// Every sprite to project this frame: props, items still lying around,
    /// then enemies.
    pub fn billboards(&self) -> Vec<&dyn Billboard> {
        self.props
            .iter()
            .map(|p| p as &dyn Billboard)
            .chain(self.items.iter().filter(|i| !i.is_taken()).map(|i| i as &dyn Billboard))
            .chain(self.enemies.iter().map(|e| e as &dyn Billboard))
            .collect()
    }

    pub fn enemies_alive(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::animation::EnemyState;
    use crate::core::maze::{DEFAULT_LEVEL, GridMap};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn world() -> World {
        World::new(Maze::parse(DEFAULT_LEVEL).unwrap(), &GameConfig::default())
    }

    #[test]
    fn spawns_entities_with_distinct_ids() {
        let w = world();
        assert_eq!(w.enemies.len(), 2);
        assert_eq!(w.props.len(), 2);
        assert_eq!(w.items.len(), 1);
        let mut ids: Vec<EntityId> = w.billboards().iter().map(|b| b.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(w.player.pos.cell(), w.maze.player_spawn);
    }

    #[test]
    fn enemies_close_in_on_the_player() {
        let mut w = world();
        // the second enemy's room only opens through this door
        w.toggle_door(GridCoordinate::new(3, 5));
        let mut rng = StdRng::seed_from_u64(42);
        let before: Vec<i32> = w.enemies.iter().map(|e| e.pos.cell().manhattan(w.player.pos.cell())).collect();
        for _ in 0..200 {
            w.tick(1.0 / 60.0, |_| false, &mut rng);
        }
        for (enemy, start) in w.enemies.iter().zip(before) {
            assert!(enemy.pos.cell().manhattan(w.player.pos.cell()) < start);
        }
        assert_eq!(w.player.health(), 100);
    }

    #[test]
    fn closed_door_keeps_an_enemy_in_its_room() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(9);
        let start = w.enemies[1].pos.cell();
        for _ in 0..120 {
            w.tick(1.0 / 60.0, |_| false, &mut rng);
        }
        assert_eq!(w.enemies[1].pos.cell(), start);
    }

    #[test]
    fn opened_door_swings_shut_after_the_timeout() {
        let mut w = world();
        w.enemies.clear();
        let door = GridCoordinate::new(5, 3);
        assert_eq!(w.toggle_door(door), Some(DoorEvent::Opened));
        let mut rng = StdRng::seed_from_u64(2);
        let mut closed = 0;
        // 4.5 s: still open
        for _ in 0..270 {
            closed += w.tick(1.0 / 60.0, |_| false, &mut rng).doors_closed;
        }
        assert_eq!(closed, 0);
        assert!(w.maze.is_walkable_cell(door));
        for _ in 0..60 {
            closed += w.tick(1.0 / 60.0, |_| false, &mut rng).doors_closed;
        }
        assert_eq!(closed, 1);
        assert!(!w.maze.is_walkable_cell(door));
    }

    #[test]
    fn door_does_not_close_on_the_player() {
        let mut w = world();
        w.enemies.clear();
        let door = GridCoordinate::new(5, 3);
        w.toggle_door(door);
        w.player.pos = WorldPosition::at_cell_center(door, 270.0);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..600 {
            w.tick(1.0 / 60.0, |_| false, &mut rng);
        }
        assert!(w.maze.is_walkable_cell(door));
        assert_eq!(w.toggle_door(door), None);
    }

    #[test]
    fn walking_over_an_item_collects_it() {
        let mut w = world();
        w.enemies.clear();
        w.player.apply_damage(50);
        w.player.pos = WorldPosition::at_cell_center(w.maze.items[0].0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let events = w.tick(1.0 / 60.0, |_| false, &mut rng);
        assert_eq!(events.items_taken, 1);
        assert_eq!(w.player.health(), 75);
        assert_eq!(w.billboards().len(), 2);
        assert_eq!(w.tick(1.0 / 60.0, |_| false, &mut rng).items_taken, 0);
    }

    #[test]
    fn twenty_shots_kill_an_enemy() {
        let mut w = world();
        let id = w.enemies[0].id;
        for _ in 0..19 {
            assert!(w.player_fire(Some(id)));
        }
        assert_eq!(w.enemies[0].state(), EnemyState::Damaged);
        assert!(w.player_fire(Some(id)));
        assert_eq!(w.enemies[0].state(), EnemyState::Dead);
        assert!(!w.player_fire(Some(id)));
        assert_eq!(w.enemies_alive(), 1);
    }

    #[test]
    fn shots_at_props_or_nothing_miss() {
        let mut w = world();
        let prop = w.props[0].id;
        assert!(!w.player_fire(Some(prop)));
        assert!(!w.player_fire(None));
        assert_eq!(w.enemies_alive(), 2);
    }

    #[test]
    fn corpses_stay_put() {
        let mut w = world();
        let id = w.enemies[0].id;
        for _ in 0..20 {
            w.player_fire(Some(id));
        }
        let pos = w.enemies[0].pos;
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..30 {
            w.tick(1.0 / 60.0, |_| true, &mut rng);
        }
        assert_eq!(w.enemies[0].pos, pos);
        assert_eq!(w.enemies[0].state(), EnemyState::Dead);
    }
}
