use raylib::core::texture::RaylibTexture2D;
use raylib::prelude::*;

/// CPU color buffer the renderer writes column by column.
pub struct Framebuffer {
    pub color_buffer: Vec<Color>,
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let bg = Color::BLACK;
        Self {
            color_buffer: vec![bg; (width * height) as usize],
            width,
            height,
            background_color: bg,
        }
    }

    #[inline]
    pub fn set_pixel_color(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.color_buffer[(y * self.width + x) as usize] = color;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        if x < self.width && y < self.height {
            return self.color_buffer[(y * self.width + x) as usize];
        }
        self.background_color
    }

    /// Fills rows `y0..y1` of column `x`, asking `shade` for each row's color.
    /// Rows outside the screen are clipped; `None` leaves the pixel alone.
    pub fn draw_column_span<F>(&mut self, x: u32, y0: f32, y1: f32, mut shade: F)
    where
        F: FnMut(f32) -> Option<Color>,
    {
        if x >= self.width || y1 <= y0 {
            return;
        }
        let top = y0.max(0.0) as u32;
        let bottom = y1.min(self.height as f32).max(0.0) as u32;
        let span = y1 - y0;
        for y in top..bottom {
            let v = ((y as f32 + 0.5) - y0) / span;
            if let Some(c) = shade(v.clamp(0.0, 0.999)) {
                self.color_buffer[(y * self.width + x) as usize] = c;
            }
        }
    }

    /// Small cross over the center column.
    pub fn draw_crosshair(&mut self, color: Color) {
        let cx = self.width / 2;
        let cy = self.height / 2;
        for d in 2..7u32 {
            self.set_pixel_color(cx + d, cy, color);
            self.set_pixel_color(cx.saturating_sub(d), cy, color);
            self.set_pixel_color(cx, cy + d, color);
            self.set_pixel_color(cx, cy.saturating_sub(d), color);
        }
    }

    /// Uploads the pixels into a persistent texture of the same size.
    pub fn upload_to_texture(&self, tex: &mut Texture2D) {
        // Color is #[repr(C)] RGBA8, so the buffer is already in texture layout
        let byte_len = self.color_buffer.len() * std::mem::size_of::<Color>();
        let bytes: &[u8] = unsafe {
            std::slice::from_raw_parts(self.color_buffer.as_ptr() as *const u8, byte_len)
        };
        let _ = tex.update_texture(bytes);
    }
}

/// Darkens a color by distance; `k` = 1.0 keeps it as is.
#[inline]
pub fn scale_color(c: Color, k: f32) -> Color {
    let s = k.clamp(0.0, 1.0);
    let mul = |v: u8| -> u8 { (v as f32 * s) as u8 };
    Color::new(mul(c.r), mul(c.g), mul(c.b), c.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_span_is_clipped_to_the_screen() {
        let mut fb = Framebuffer::new(4, 10);
        let mut calls = 0;
        fb.draw_column_span(1, -5.0, 20.0, |_| {
            calls += 1;
            Some(Color::RED)
        });
        assert_eq!(calls, 10);
        assert_eq!(fb.get_pixel(1, 0), Color::RED);
        assert_eq!(fb.get_pixel(1, 9), Color::RED);
        assert_eq!(fb.get_pixel(0, 5), Color::BLACK);
    }

    #[test]
    fn transparent_rows_are_skipped() {
        let mut fb = Framebuffer::new(2, 8);
        fb.draw_column_span(0, 0.0, 8.0, |v| (v < 0.5).then_some(Color::WHITE));
        assert_eq!(fb.get_pixel(0, 0), Color::WHITE);
        assert_eq!(fb.get_pixel(0, 7), Color::BLACK);
    }

    #[test]
    fn scale_color_darkens() {
        let c = scale_color(Color::new(200, 100, 50, 255), 0.5);
        assert_eq!(c, Color::new(100, 50, 25, 255));
    }
}
