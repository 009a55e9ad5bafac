//! 3D renderer: sky/ground gradient, textured wall columns, then sprites.
use raylib::prelude::*;

use crate::config::{CELL_SIZE, TEX_WIDTH};
use crate::render::casters::Intersect;
use crate::render::framebuffer::{Framebuffer, scale_color};
use crate::render::projector::Projection;
use crate::render::textures::TextureManager;

const CEIL_TOP:   Color = Color::new(10, 12, 18, 255);
const CEIL_MID:   Color = Color::new(20, 24, 32, 255);
const FLOOR_NEAR: Color = Color::new(56, 58, 62, 255);
const FLOOR_FAR:  Color = Color::new(26, 28, 30, 255);
const CROSSHAIR:  Color = Color::new(230, 230, 230, 255);

/// Distance at which wall shading bottoms out.
const FOG_DISTANCE: f32 = CELL_SIZE * 12.0;
/// Texels this transparent or more are not drawn.
const ALPHA_CUTOFF: u8 = 8;

#[inline]
fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let f = |x: u8, y: u8| -> u8 { ((x as f32) * (1.0 - t) + (y as f32) * t) as u8 };
    Color::new(f(a.r, b.r), f(a.g, b.g), f(a.b, b.b), 255)
}

pub fn paint_ceiling_and_floor(fb: &mut Framebuffer) {
    let w = fb.width;
    let h = fb.height;
    let hh = h / 2;
    for y in 0..hh {
        let col = lerp_color(CEIL_TOP, CEIL_MID, y as f32 / hh.max(1) as f32);
        for x in 0..w { fb.set_pixel_color(x, y, col); }
    }
    for y in hh..h {
        let col = lerp_color(FLOOR_FAR, FLOOR_NEAR, (y - hh) as f32 / (h - hh).max(1) as f32);
        for x in 0..w { fb.set_pixel_color(x, y, col); }
    }
}

/// Height on screen of a wall slice at perpendicular distance `perp`.
#[inline]
pub fn wall_slice_height(perp: f32, proj_dist: f32) -> f32 {
    CELL_SIZE / perp.max(1e-3) * proj_dist
}

/// One textured column per hit; east/west faces are drawn a bit darker.
pub fn render_walls(fb: &mut Framebuffer, texman: &TextureManager, hits: &[Option<Intersect>], depths: &[f32], proj_dist: f32) {
    let h = fb.height as f32;
    for (x, (hit, &perp)) in hits.iter().zip(depths).enumerate().take(fb.width as usize) {
        let Some(hit) = hit else { continue };
        let slice = wall_slice_height(perp, proj_dist);
        let y0 = (h - slice) * 0.5;
        let side = if hit.vertical_face { 0.75 } else { 1.0 };
        let k = side * (1.0 - perp / FOG_DISTANCE).max(0.35);
        fb.draw_column_span(x as u32, y0, y0 + slice, |v| {
            Some(scale_color(texman.wall_color(hit.wall, hit.u, v), k))
        });
    }
}

/// Draws projected sprite slices far to near; transparent texels keep what is behind.
pub fn render_sprites(fb: &mut Framebuffer, texman: &TextureManager, projection: &Projection) {
    for slice in projection.slices() {
        let height = slice.scale * TEX_WIDTH as f32;
        for x in slice.start..slice.end {
            fb.draw_column_span(x, slice.top, slice.top + height, |v| {
                let c = texman.sprite_color(slice.frame, slice.texture_column, v);
                (c.a >= ALPHA_CUTOFF).then_some(Color::new(c.r, c.g, c.b, 255))
            });
        }
    }
}

/// Vertical weapon sway in 480-line pixels at game time `time`.
pub fn weapon_bob(time: f32, moving: bool) -> f32 {
    if moving {
        (time * 10.0).cos() * 7.0
    } else {
        (time * 5.0).cos() * 3.0
    }
}

/// Hand and pistol, bottom center over the 3D view. The idle frame rides
/// 36 lines lower (at 480 lines) than the firing one.
pub fn draw_weapon(fb: &mut Framebuffer, texman: &TextureManager, fired: bool, bob: f32) {
    let h = fb.height as f32;
    let k = h / 480.0;
    let size = (h * 0.5).round().max(1.0);
    let drop = if fired { 0.0 } else { 36.0 * k };
    let top = h - size + drop + bob * k;
    let x0 = (fb.width as f32 - size) * 0.5;
    for i in 0..size as u32 {
        let x = x0 + i as f32;
        if x < 0.0 {
            continue;
        }
        let u = (i as f32 + 0.5) / size;
        fb.draw_column_span(x as u32, top, top + size, |v| {
            let c = texman.weapon_color(fired, u, v);
            (c.a >= ALPHA_CUTOFF).then_some(Color::new(c.r, c.g, c.b, 255))
        });
    }
}

/// Full frame in painter's order.
pub fn render_3d(
    fb: &mut Framebuffer,
    texman: &TextureManager,
    hits: &[Option<Intersect>],
    depths: &[f32],
    projection: &Projection,
    proj_dist: f32,
) {
    paint_ceiling_and_floor(fb);
    render_walls(fb, texman, hits, depths, proj_dist);
    render_sprites(fb, texman, projection);
    fb.draw_crosshair(CROSSHAIR);
}
