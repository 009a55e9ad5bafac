//! Items lying on the floor, collected by walking over them.
use tracing::info;

use crate::core::entity::{Billboard, Damageable, EntityId, SpriteFrame};
use crate::core::maze::{ItemKind, WorldPosition};
use crate::core::player::Player;

#[derive(Clone, Debug)]
pub struct Item {
    pub id: EntityId,
    pub pos: WorldPosition,
    pub kind: ItemKind,
    heal: i32,
    taken: bool,
}

impl Item {
    pub fn new(id: EntityId, pos: WorldPosition, kind: ItemKind, heal: i32) -> Self {
        Self { id, pos, kind, heal, taken: false }
    }

    pub fn is_taken(&self) -> bool { self.taken }

    /// Picked up once the player stands in the item's cell. Returns true on pickup.
    pub fn interact(&mut self, player: &mut Player) -> bool {
        if self.taken || player.is_dead() || player.pos.cell() != self.pos.cell() {
            return false;
        }
        self.taken = true;
        let gained = player.heal(self.heal);
        info!(item = self.id.0, kind = ?self.kind, gained, "item picked up");
        true
    }
}

impl Billboard for Item {
    fn id(&self) -> EntityId { self.id }
    fn position(&self) -> WorldPosition { self.pos }
    fn sprite_frame(&self) -> SpriteFrame { SpriteFrame::Item(self.kind) }
}
