use raylib::prelude::*;
use tracing::debug;

use crate::core::door::DoorEvent;
use crate::core::entity::{Damageable, EntityId};
use crate::core::world::World;

/// Keyboard snapshot for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub turn_left: bool,
    pub turn_right: bool,
    pub forward: bool,
    pub backward: bool,
    /// Edge-triggered: true only on the frame the key went down.
    pub fire: bool,
    /// Space: works the door ahead instead of firing when there is one.
    pub use_door: bool,
}

impl InputState {
    pub fn read(window: &RaylibHandle) -> Self {
        let down = |a: KeyboardKey, b: KeyboardKey| window.is_key_down(a) || window.is_key_down(b);
        Self {
            turn_left: down(KeyboardKey::KEY_LEFT, KeyboardKey::KEY_A),
            turn_right: down(KeyboardKey::KEY_RIGHT, KeyboardKey::KEY_D),
            forward: down(KeyboardKey::KEY_UP, KeyboardKey::KEY_W),
            backward: down(KeyboardKey::KEY_DOWN, KeyboardKey::KEY_S),
            fire: window.is_key_pressed(KeyboardKey::KEY_SPACE)
                || window.is_key_pressed(KeyboardKey::KEY_LEFT_CONTROL),
            use_door: window.is_key_pressed(KeyboardKey::KEY_SPACE),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InputOutcome {
    pub fired: bool,
    pub hit: bool,
    pub door: Option<DoorEvent>,
}

/// Applies one frame of input: turning, then movement, then the door or the shot.
/// A door in front of the player swallows the Space press.
/// `crosshair` is the entity owning the center column of the last frame.
/// A dead player neither moves nor shoots.
pub fn apply_input(world: &mut World, input: &InputState, crosshair: Option<EntityId>) -> InputOutcome {
    if world.player.is_dead() {
        return InputOutcome::default();
    }
    if input.turn_left {
        world.player.turn_left();
    }
    if input.turn_right {
        world.player.turn_right();
    }
    if input.forward {
        world.player.move_forward(&world.maze);
    }
    if input.backward {
        world.player.move_backward(&world.maze);
    }
    if input.use_door {
        if let Some(cell) = world.door_ahead() {
            return InputOutcome { door: world.toggle_door(cell), ..Default::default() };
        }
    }
    if !input.fire {
        return InputOutcome::default();
    }
    let hit = world.player_fire(crosshair);
    debug!(?crosshair, hit, "player fired");
    InputOutcome { fired: true, hit, door: None }
}

/// Reads the keyboard and applies it. The snapshot is returned too, for the
/// weapon bob.
pub fn process_events(window: &RaylibHandle, world: &mut World, crosshair: Option<EntityId>) -> (InputState, InputOutcome) {
    let input = InputState::read(window);
    let outcome = apply_input(world, &input, crosshair);
    (input, outcome)
}
