//! Texture atlas: PNGs from `assets/` when present, procedural pixmaps otherwise.
use std::collections::HashMap;

use raylib::prelude::*;
use tracing::{debug, info};

use crate::config::TEX_WIDTH;
use crate::core::animation::{AnimationSet, EnemyState};
use crate::core::door::DOOR_TEXTURE;
use crate::core::entity::SpriteFrame;
use crate::core::maze::{ItemKind, PropKind};

const TEX_SIZE: u32 = TEX_WIDTH as u32;

/// Immutable CPU pixmap, sampled per pixel.
#[derive(Clone)]
struct Pixmap {
    w: u32,
    h: u32,
    px: Vec<Color>,
}

impl Pixmap {
    fn new(w: u32, h: u32, px: Vec<Color>) -> Self { Self { w, h, px } }

    fn blank(w: u32, h: u32) -> Self {
        Self::new(w, h, vec![Color::new(0, 0, 0, 0); (w * h) as usize])
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> Color {
        let xi = (x % self.w) as usize;
        let yi = (y % self.h) as usize;
        self.px[(yi * self.w as usize) + xi]
    }

    #[inline]
    fn put(&mut self, x: u32, y: u32, c: Color) {
        if x < self.w && y < self.h {
            self.px[(y * self.w + x) as usize] = c;
        }
    }

    /// Filled axis-aligned ellipse.
    fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, c: Color) {
        for y in 0..self.h {
            for x in 0..self.w {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.put(x, y, c);
                }
            }
        }
    }

    fn rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, c: Color) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, c);
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum TextureKey {
    Wall(u8),
    Sprite(SpriteFrame),
    /// First-person hand; `true` is the firing frame.
    Weapon(bool),
}

pub struct TextureManager {
    maps: HashMap<TextureKey, Pixmap>,
}

impl TextureManager {
    pub fn new(set: &AnimationSet) -> Self {
        let mut tm = Self { maps: HashMap::new() };
        let mut loaded = 0usize;

        for variant in 1..=4u8 {
            let key = TextureKey::Wall(variant);
            loaded += tm.load_or(key, &format!("assets/wall{variant}.png"), || make_wall(variant));
        }
        loaded += tm.load_or(TextureKey::Wall(DOOR_TEXTURE), "assets/door.png", make_door);

        for state in [EnemyState::Idle, EnemyState::Walking, EnemyState::Firing, EnemyState::Damaged, EnemyState::Dead] {
            for frame in 0..set.len(state) {
                let key = TextureKey::Sprite(SpriteFrame::Enemy { state, frame });
                let path = format!("assets/enemy_{}_{}.png", state_name(state), frame);
                loaded += tm.load_or(key, &path, || make_enemy(state, frame, set.len(state)));
            }
        }

        loaded += tm.load_or(TextureKey::Sprite(SpriteFrame::Prop(PropKind::Lamp)), "assets/lamp.png", make_lamp);
        loaded += tm.load_or(TextureKey::Sprite(SpriteFrame::Item(ItemKind::Rails)), "assets/rails.png", make_rails);

        loaded += tm.load_or(TextureKey::Weapon(false), "assets/weapon_idle.png", || make_weapon(false));
        loaded += tm.load_or(TextureKey::Weapon(true), "assets/weapon_fire.png", || make_weapon(true));

        info!(textures = tm.maps.len(), from_disk = loaded, "texture atlas ready");
        tm
    }

    /// Inserts the file at `path`, or the procedural fallback. Returns 1 when read from disk.
    fn load_or<F: FnOnce() -> Pixmap>(&mut self, key: TextureKey, path: &str, fallback: F) -> usize {
        let (pm, from_disk) = match load_pixmap(path) {
            Some(pm) => (pm, 1),
            None => (fallback(), 0),
        };
        self.maps.insert(key, pm);
        from_disk
    }

    /// Wall texel at normalized `(u, v)`; unknown variants fall back to variant 1.
    pub fn wall_color(&self, variant: u8, u: f32, v: f32) -> Color {
        let pm = self
            .maps
            .get(&TextureKey::Wall(variant))
            .or_else(|| self.maps.get(&TextureKey::Wall(1)));
        match pm {
            Some(pm) => pm.sample((u * pm.w as f32) as u32, (v * pm.h as f32) as u32),
            None => Color::GRAY,
        }
    }

    /// Sprite texel; `tx` is a texture column in `0..TEX_WIDTH`, `v` in [0, 1).
    pub fn sprite_color(&self, frame: SpriteFrame, tx: usize, v: f32) -> Color {
        match self.maps.get(&TextureKey::Sprite(frame)) {
            Some(pm) => {
                let x = (tx as u32 * pm.w) / TEX_SIZE;
                pm.sample(x, (v * pm.h as f32) as u32)
            }
            None => Color::MAGENTA,
        }
    }

    /// Weapon texel at normalized `(u, v)`.
    pub fn weapon_color(&self, fired: bool, u: f32, v: f32) -> Color {
        match self.maps.get(&TextureKey::Weapon(fired)) {
            Some(pm) => pm.sample((u * pm.w as f32) as u32, (v * pm.h as f32) as u32),
            None => Color::BLANK,
        }
    }
}

fn load_pixmap(path: &str) -> Option<Pixmap> {
    if !std::path::Path::new(path).exists() {
        return None;
    }
    let img = Image::load_image(path).ok()?;
    let w = img.width().max(1) as u32;
    let h = img.height().max(1) as u32;
    let data = img.get_image_data().to_vec();
    debug!(path, w, h, "loaded texture");
    Some(Pixmap::new(w, h, data))
}

fn state_name(state: EnemyState) -> &'static str {
    match state {
        EnemyState::Idle => "idle",
        EnemyState::Walking => "walking",
        EnemyState::Firing => "firing",
        EnemyState::Damaged => "damaged",
        EnemyState::Dead => "dead",
    }
}

#[inline]
fn mix(a: Color, b: Color, t: u8) -> Color {
    let ta = t as u16;
    let na = 255u16 - ta;
    let mixc = |x: u8, y: u8| -> u8 { (((x as u16) * na + (y as u16) * ta) / 255) as u8 };
    Color::new(mixc(a.r, b.r), mixc(a.g, b.g), mixc(a.b, b.b), mixc(a.a, b.a))
}

/// Brick rows with a per-variant base color.
fn make_wall(variant: u8) -> Pixmap {
    let base = match variant {
        1 => Color::new(40, 60, 150, 255),
        2 => Color::new(110, 110, 118, 255),
        3 => Color::new(120, 78, 40, 255),
        _ => Color::new(60, 110, 70, 255),
    };
    let mortar = mix(base, Color::BLACK, 140);
    let mut px = vec![base; (TEX_SIZE * TEX_SIZE) as usize];
    let brick_h = 16;
    let brick_w = 32;
    for y in 0..TEX_SIZE {
        let course = y / brick_h;
        let shift = if course % 2 == 0 { 0 } else { brick_w / 2 };
        for x in 0..TEX_SIZE {
            let i = (y * TEX_SIZE + x) as usize;
            if y % brick_h == 0 || (x + shift) % brick_w == 0 {
                px[i] = mortar;
            } else if (x * 7 + y * 13) % 11 == 0 {
                px[i] = mix(base, Color::WHITE, 20);
            }
        }
    }
    Pixmap::new(TEX_SIZE, TEX_SIZE, px)
}

/// Steel slab with a recessed handle plate.
fn make_door() -> Pixmap {
    let steel = Color::new(70, 110, 120, 255);
    let rim = mix(steel, Color::BLACK, 120);
    let mut pm = Pixmap::new(TEX_SIZE, TEX_SIZE, vec![steel; (TEX_SIZE * TEX_SIZE) as usize]);
    pm.rect(0, 0, TEX_SIZE, 3, rim);
    pm.rect(0, TEX_SIZE - 3, TEX_SIZE, TEX_SIZE, rim);
    pm.rect(0, 0, 3, TEX_SIZE, rim);
    pm.rect(TEX_SIZE - 3, 0, TEX_SIZE, TEX_SIZE, rim);
    for y in (8..TEX_SIZE - 8).step_by(8) {
        pm.rect(6, y, TEX_SIZE - 6, y + 1, mix(steel, Color::WHITE, 40));
    }
    pm.rect(TEX_SIZE - 14, TEX_SIZE / 2 - 6, TEX_SIZE - 8, TEX_SIZE / 2 + 6, Color::new(40, 40, 44, 255));
    pm
}

/// Hand gripping a pistol from below; the firing frame adds a muzzle flash.
fn make_weapon(fired: bool) -> Pixmap {
    let s = TEX_SIZE as f32;
    let skin = Color::new(222, 180, 140, 255);
    let gun = Color::new(52, 52, 58, 255);
    let mut pm = Pixmap::blank(TEX_SIZE, TEX_SIZE);
    pm.rect(TEX_SIZE / 2 - 4, TEX_SIZE / 4, TEX_SIZE / 2 + 4, TEX_SIZE * 3 / 4, gun);
    pm.ellipse(s * 0.5, s * 0.82, s * 0.16, s * 0.20, skin);
    pm.rect(TEX_SIZE / 2 - 3, TEX_SIZE / 4 - 2, TEX_SIZE / 2 + 3, TEX_SIZE / 4, mix(gun, Color::WHITE, 60));
    if fired {
        pm.ellipse(s * 0.5, s * 0.14, s * 0.14, s * 0.12, Color::new(255, 230, 90, 255));
        pm.ellipse(s * 0.5, s * 0.14, s * 0.06, s * 0.05, Color::WHITE);
    }
    pm
}

/// Guard silhouette; each state/frame gets a visibly different pose.
fn make_enemy(state: EnemyState, frame: usize, frames: usize) -> Pixmap {
    let s = TEX_SIZE as f32;
    let uniform = Color::new(96, 104, 70, 255);
    let skin = Color::new(222, 180, 140, 255);
    let boots = Color::new(40, 30, 24, 255);
    let mut pm = Pixmap::blank(TEX_SIZE, TEX_SIZE);

    if state == EnemyState::Dead {
        // collapses a little more every frame
        let t = (frame + 1) as f32 / frames.max(1) as f32;
        let ry = s * (0.30 - 0.22 * t);
        let cy = s - ry - 1.0;
        pm.ellipse(s * 0.5, cy, s * (0.22 + 0.12 * t), ry, mix(uniform, Color::new(120, 0, 0, 255), (t * 160.0) as u8));
        pm.ellipse(s * (0.5 + 0.25 * t), cy - ry * 0.3, s * 0.08, s * 0.08 * (1.0 - 0.5 * t), skin);
        return pm;
    }

    let body = if state == EnemyState::Damaged { mix(uniform, Color::RED, 150) } else { uniform };
    pm.ellipse(s * 0.5, s * 0.55, s * 0.20, s * 0.26, body);
    pm.ellipse(s * 0.5, s * 0.20, s * 0.10, s * 0.11, skin);

    let stride = if state == EnemyState::Walking {
        [0i32, 4, 0, -4][frame % 4]
    } else {
        0
    };
    let leg = |offset: i32| ((s * 0.5) as i32 + offset).clamp(0, TEX_SIZE as i32 - 6) as u32;
    let (l, r) = (leg(-8 + stride), leg(3 - stride));
    pm.rect(l, (s * 0.78) as u32, l + 5, TEX_SIZE - 2, boots);
    pm.rect(r, (s * 0.78) as u32, r + 5, TEX_SIZE - 2, boots);

    if state == EnemyState::Firing {
        pm.rect((s * 0.5) as u32, (s * 0.45) as u32, (s * 0.85) as u32, (s * 0.50) as u32, Color::DARKGRAY);
        if frame == 1 {
            pm.ellipse(s * 0.9, s * 0.47, s * 0.08, s * 0.06, Color::new(255, 230, 90, 255));
        }
    }
    pm
}

/// Hanging lamp with a soft glow.
fn make_lamp() -> Pixmap {
    let s = TEX_SIZE as f32;
    let mut pm = Pixmap::blank(TEX_SIZE, TEX_SIZE);
    pm.rect(TEX_SIZE / 2 - 1, 0, TEX_SIZE / 2 + 1, 8, Color::DARKGRAY);
    for y in 0..TEX_SIZE {
        for x in 0..TEX_SIZE {
            let dx = x as f32 + 0.5 - s * 0.5;
            let dy = y as f32 + 0.5 - s * 0.18;
            let d = (dx * dx + dy * dy).sqrt();
            let r = s * 0.12;
            if d <= r {
                pm.put(x, y, mix(Color::new(255, 220, 120, 255), Color::WHITE, ((1.0 - d / r) * 200.0) as u8));
            } else if d <= r * 1.8 {
                let t = 1.0 - (d - r) / (r * 0.8);
                pm.put(x, y, Color::new(255, 220, 120, (t * 120.0) as u8));
            }
        }
    }
    pm
}

/// A short stack of rails on the floor; picked up for health.
fn make_rails() -> Pixmap {
    let mut pm = Pixmap::blank(TEX_SIZE, TEX_SIZE);
    let steel = Color::new(150, 150, 160, 255);
    let wood = Color::new(110, 70, 40, 255);
    for k in 0..4u32 {
        let y = TEX_SIZE - 6 - k * 5;
        pm.rect(10, y, TEX_SIZE - 10, y + 2, steel);
    }
    pm.rect(14, TEX_SIZE - 4, 20, TEX_SIZE, wood);
    pm.rect(TEX_SIZE - 20, TEX_SIZE - 4, TEX_SIZE - 14, TEX_SIZE, wood);
    pm
}
