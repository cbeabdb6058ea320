//! Software draw target at game resolution.
//!
//! Every state draws into one `FrameBuffer`; the `Presenter` then uploads it
//! as a texture and scales it to the window.

use psm_core::geom::Rect;
use psm_core::surface::{Region, Surface};

pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Tightly packed RGBA8 rows, ready for a texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

fn blend(dst: &mut [u8; 4], src: [u8; 3], alpha: u32) {
    for c in 0..3 {
        let value = src[c] as u32 * alpha + dst[c] as u32 * (255 - alpha);
        dst[c] = (value / 255) as u8;
    }
    dst[3] = 255;
}

impl Surface for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn blit(&mut self, src: Region<'_>, x: i32, y: i32, opacity: u8) {
        let placed = Rect::new(x, y, src.rect.w, src.rect.h);
        let Some(visible) = self.bounds().intersection(&placed) else {
            return;
        };
        for dy in visible.top()..visible.bottom() {
            let sy = (src.rect.y + dy - y) as u32;
            for dx in visible.left()..visible.right() {
                let sx = (src.rect.x + dx - x) as u32;
                let px = src.image.pixel(sx, sy);
                let alpha = px[3] as u32 * opacity as u32 / 255;
                if alpha == 0 {
                    continue;
                }
                let index = (dy as u32 * self.width + dx as u32) as usize;
                blend(&mut self.pixels[index], [px[0], px[1], px[2]], alpha);
            }
        }
    }

    fn fill(&mut self, color: [u8; 3], opacity: u8) {
        if opacity == 0 {
            return;
        }
        for px in &mut self.pixels {
            blend(px, color, opacity as u32);
        }
    }
}
