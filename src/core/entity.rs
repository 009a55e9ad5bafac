//! Entity capabilities shared by the player, enemies, props and items.
use crate::core::animation::EnemyState;
use crate::core::maze::{ItemKind, PropKind, WorldPosition};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Anything that can be hurt. Props do not implement this.
pub trait Damageable {
    fn health(&self) -> i32;

    fn is_dead(&self) -> bool {
        self.health() <= 0
    }

    /// Never fails: damaging something already dead is a silent no-op.
    fn apply_damage(&mut self, amount: i32);
}

/// Which texture a billboard wants this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpriteFrame {
    Enemy { state: EnemyState, frame: usize },
    Prop(PropKind),
    Item(ItemKind),
}

/// A camera-facing sprite placed in the world.
pub trait Billboard {
    fn id(&self) -> EntityId;
    fn position(&self) -> WorldPosition;
    fn sprite_frame(&self) -> SpriteFrame;

    /// Corpses lose crosshair columns to live entities.
    fn is_corpse(&self) -> bool {
        false
    }
}

/// Static decoration: drawn and occluded like any sprite, never targeted.
#[derive(Clone, Debug)]
pub struct Prop {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub kind: PropKind,
}

impl Billboard for Prop {
    fn id(&self) -> EntityId { self.id }
    fn position(&self) -> WorldPosition { self.pos }
    fn sprite_frame(&self) -> SpriteFrame { SpriteFrame::Prop(self.kind) }
}
