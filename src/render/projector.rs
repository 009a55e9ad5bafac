//! Billboard projection with wall occlusion and crosshair ownership.
//!
//! Exposes:
//! - `SpriteProjector::project`: per-frame draw list + column owner map
//! - `Projection`: read by the renderer, the input handler and the AI
use crate::config::{CELL_SIZE, GameConfig, TEX_WIDTH};
use crate::core::entity::{Billboard, EntityId, SpriteFrame};
use crate::core::maze::WorldPosition;

/// Entity occupying a screen column, with the depth key it won it at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColumnOwner {
    pub entity: EntityId,
    /// `CELL_SIZE / perpendicular distance`; larger is closer.
    pub depth_key: f32,
}

/// One texture column of one sprite over a run of screen columns.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSlice {
    pub entity: EntityId,
    pub frame: SpriteFrame,
    /// Screen columns `start..end`, all in front of the wall.
    pub start: u32,
    pub end: u32,
    pub texture_column: usize,
    /// Screen pixels per texel.
    pub scale: f32,
    /// Screen row of the sprite's top edge (may be negative).
    pub top: f32,
    /// Perpendicular distance to the viewer.
    pub depth: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Projection {
    slices: Vec<DrawSlice>,
    owners: Vec<Option<ColumnOwner>>,
}

impl Projection {
    /// Far to near, ready for a painter's pass.
    pub fn slices(&self) -> &[DrawSlice] { &self.slices }

    pub fn owner(&self, column: usize) -> Option<ColumnOwner> {
        self.owners.get(column).copied().flatten()
    }

    /// What the crosshair is on.
    pub fn center_owner(&self) -> Option<EntityId> {
        self.owner(self.owners.len() / 2).map(|o| o.entity)
    }

    pub fn is_visible(&self, id: EntityId) -> bool {
        self.owners.iter().flatten().any(|o| o.entity == id)
    }

    pub fn width(&self) -> usize { self.owners.len() }
}

pub struct SpriteProjector {
    width: u32,
    height: u32,
    proj_dist: f32,
    projection: Projection,
}

impl SpriteProjector {
    pub fn new(cfg: &GameConfig) -> Self {
        Self::with_screen(cfg.screen_width, cfg.screen_height, cfg.distance_to_projection())
    }

    pub fn with_screen(width: u32, height: u32, proj_dist: f32) -> Self {
        Self {
            width,
            height,
            proj_dist,
            projection: Projection {
                slices: Vec::new(),
                owners: vec![None; width as usize],
            },
        }
    }

    /// Result of the last `project` call.
    pub fn projection(&self) -> &Projection { &self.projection }

    /// Rebuilds the draw list and owner map for this frame.
    ///
    /// Sprites are handled in the given order; a later sprite takes a column
    /// from an earlier one unless it is a corpse that would sit in front.
    /// `wall_depths[c]` is the perpendicular wall distance at column `c`.
    pub fn project(&mut self, viewer: WorldPosition, sprites: &[&dyn Billboard], wall_depths: &[f32]) -> &Projection {
        let w = self.width as usize;
        self.projection.slices.clear();
        self.projection.owners.clear();
        self.projection.owners.resize(w, None);

        for sprite in sprites {
            self.project_one(viewer, *sprite, wall_depths);
        }

        self.projection.slices.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        &self.projection
    }

    fn project_one(&mut self, viewer: WorldPosition, sprite: &dyn Billboard, wall_depths: &[f32]) {
        let pos = sprite.position();
        let dx = pos.x - viewer.x;
        // grid y grows downward, screen "up" is -y
        let dy = -(pos.y - viewer.y);
        let distance = dx.hypot(dy);
        let angle = normalize_degrees(-(dy.atan2(dx).to_degrees() - viewer.angle));
        let perp = distance * angle.to_radians().cos();
        if perp <= 0.0 {
            return;
        }

        let depth_key = CELL_SIZE / perp;
        let factor = self.proj_dist / perp;
        let size = factor * TEX_WIDTH as f32;
        let sw = self.width as f32;
        let x = (angle.to_radians().tan() * self.proj_dist + (sw - size) * 0.5).trunc();
        if x + size.trunc() < 0.0 || x >= sw {
            return;
        }
        let top = (self.height as f32 - size) * 0.5;
        let corpse = sprite.is_corpse();
        let id = sprite.id();
        let frame = sprite.sprite_frame();

        let mut drawn_upto = i64::MIN;
        let mut i = 0usize;
        while i < TEX_WIDTH && (i as f32) * factor < size {
            let from = x + i as f32 * factor;
            let to = x + (i + 1) as f32 * factor;
            // columns floor(from)..=floor(to); a column already taken by an earlier texel is skipped
            let first = (from.floor() as i64).max(drawn_upto);
            let last = to.floor() as i64 + 1;
            drawn_upto = drawn_upto.max(last);
            let lo = first.max(0);
            let hi = last.min(self.width as i64);

            let mut run: Option<u32> = None;
            for col in lo..hi {
                let col = col as usize;
                let in_front = wall_depths.get(col).is_none_or(|&d| perp < d);
                if in_front {
                    run.get_or_insert(col as u32);
                    self.claim(col, id, depth_key, corpse);
                } else if let Some(start) = run.take() {
                    self.push_slice(id, frame, start, col as u32, i, factor, top, perp);
                }
            }
            if let Some(start) = run {
                self.push_slice(id, frame, start, hi as u32, i, factor, top, perp);
            }
            i += 1;
        }
    }

    fn claim(&mut self, col: usize, entity: EntityId, depth_key: f32, corpse: bool) {
        let slot = &mut self.projection.owners[col];
        if let Some(owner) = slot {
            if corpse && depth_key > owner.depth_key {
                return;
            }
        }
        *slot = Some(ColumnOwner { entity, depth_key });
    }

    #[allow(clippy::too_many_arguments)]
    fn push_slice(&mut self, entity: EntityId, frame: SpriteFrame, start: u32, end: u32, texture_column: usize, scale: f32, top: f32, depth: f32) {
        self.projection.slices.push(DrawSlice { entity, frame, start, end, texture_column, scale, top, depth });
    }
}

/// Maps degrees to (-180, 180].
#[inline]
fn normalize_degrees(mut a: f32) -> f32 {
    while a > 180.0 { a -= 360.0; }
    while a <= -180.0 { a += 360.0; }
    a
}
