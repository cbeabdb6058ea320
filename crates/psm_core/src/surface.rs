//! Rendering boundary.
//!
//! The core never touches pixel formats or scaling. It hands `Region`s of
//! decoded `Image`s to a `Surface` implementation, which owns the actual
//! rasterization.

use std::sync::Arc;

use crate::geom::Rect;

/// Decoded RGBA8 image. Pixels with alpha 0 are transparent when blitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Image {
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self, String> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(format!(
                "Image of {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Make every pixel matching `key` fully transparent.
    pub fn with_color_key(mut self, key: [u8; 3]) -> Self {
        for px in &mut self.pixels {
            if px[0] == key[0] && px[1] == key[1] && px[2] == key[2] {
                px[3] = 0;
            }
        }
        self
    }

    /// Mirror left to right. Used for enemies that travel the other way.
    pub fn flipped_horizontal(&self) -> Self {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for row in self.pixels.chunks(self.width.max(1) as usize) {
            pixels.extend(row.iter().rev());
        }
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    pub fn region(&self) -> Region<'_> {
        Region {
            image: self,
            rect: self.rect(),
        }
    }

    /// Sub-rectangle of this image, clipped to its bounds.
    pub fn subregion(&self, rect: Rect) -> Region<'_> {
        let rect = self.rect().intersection(&rect).unwrap_or_default();
        Region { image: self, rect }
    }
}

/// A borrowed window into an `Image`.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    pub image: &'a Image,
    pub rect: Rect,
}

pub trait Surface {
    fn size(&self) -> (u32, u32);

    /// Copy `src` with its top-left corner at (`x`, `y`). `opacity` scales the
    /// source alpha (255 = as authored).
    fn blit(&mut self, src: Region<'_>, x: i32, y: i32, opacity: u8);

    /// Blend a solid colour over the whole surface.
    fn fill(&mut self, color: [u8; 3], opacity: u8);
}

/// Fixed-cell bitmap font cut from a glyph sheet laid out in ASCII order.
#[derive(Debug, Clone)]
pub struct BitmapFont {
    image: Arc<Image>,
    glyph_w: u32,
    glyph_h: u32,
    columns: u32,
    first: u32,
}

impl BitmapFont {
    pub fn new(image: Arc<Image>, glyph_w: u32, glyph_h: u32, first: char) -> Result<Self, String> {
        if glyph_w == 0 || glyph_h == 0 {
            return Err("Font glyph size must be > 0".to_string());
        }
        let columns = image.width() / glyph_w;
        if columns == 0 || image.height() < glyph_h {
            return Err(format!(
                "Font sheet {}x{} is smaller than one {}x{} glyph",
                image.width(),
                image.height(),
                glyph_w,
                glyph_h
            ));
        }
        Ok(Self {
            image,
            glyph_w,
            glyph_h,
            columns,
            first: first as u32,
        })
    }

    pub fn line_height(&self) -> i32 {
        self.glyph_h as i32
    }

    pub fn text_width(&self, text: &str) -> i32 {
        (text.chars().count() as u32 * self.glyph_w) as i32
    }

    fn glyph_rect(&self, c: char) -> Option<Rect> {
        let code = (c as u32).checked_sub(self.first)?;
        let col = code % self.columns;
        let row = code / self.columns;
        let rect = Rect::new(
            (col * self.glyph_w) as i32,
            (row * self.glyph_h) as i32,
            self.glyph_w as i32,
            self.glyph_h as i32,
        );
        self.image.rect().contains_rect(&rect).then_some(rect)
    }

    pub fn draw(&self, surface: &mut dyn Surface, text: &str, x: i32, y: i32, opacity: u8) {
        let mut pen = x;
        for c in text.chars() {
            if let Some(rect) = self.glyph_rect(c) {
                surface.blit(self.image.subregion(rect), pen, y, opacity);
            }
            pen += self.glyph_w as i32;
        }
    }

    pub fn draw_centered(&self, surface: &mut dyn Surface, text: &str, y: i32, opacity: u8) {
        let (width, _) = surface.size();
        let x = (width as i32 - self.text_width(text)) / 2;
        self.draw(surface, text, x, y, opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BlitLog {
        blits: Vec<(Rect, i32, i32)>,
    }

    impl Surface for BlitLog {
        fn size(&self) -> (u32, u32) {
            (320, 240)
        }

        fn blit(&mut self, src: Region<'_>, x: i32, y: i32, _opacity: u8) {
            self.blits.push((src.rect, x, y));
        }

        fn fill(&mut self, _color: [u8; 3], _opacity: u8) {}
    }

    #[test]
    fn new_rejects_wrong_pixel_count() {
        let err = Image::new(2, 2, vec![[0; 4]; 3]).expect_err("3 != 4 pixels");
        assert!(err.contains("needs 4 pixels"));
    }

    #[test]
    fn color_key_clears_alpha() {
        let image = Image::filled(2, 1, [255, 0, 255, 255]).with_color_key([255, 0, 255]);
        assert_eq!(image.pixel(0, 0)[3], 0);
        assert_eq!(image.pixel(1, 0)[3], 0);
    }

    #[test]
    fn flip_mirrors_rows() {
        let image = Image::new(2, 1, vec![[1, 0, 0, 255], [2, 0, 0, 255]]).expect("valid");
        let flipped = image.flipped_horizontal();
        assert_eq!(flipped.pixel(0, 0)[0], 2);
        assert_eq!(flipped.pixel(1, 0)[0], 1);
    }

    #[test]
    fn subregion_is_clipped_to_image() {
        let image = Image::filled(100, 50, [0, 0, 0, 255]);
        let region = image.subregion(Rect::new(80, 10, 40, 60));
        assert_eq!(region.rect, Rect::new(80, 10, 20, 40));
    }

    #[test]
    fn font_draws_one_blit_per_known_glyph() {
        // 16 columns x 6 rows of 8x8 glyphs starting at ' '.
        let sheet = Arc::new(Image::filled(128, 48, [255, 255, 255, 255]));
        let font = BitmapFont::new(sheet, 8, 8, ' ').expect("valid font");
        let mut surface = BlitLog { blits: Vec::new() };
        font.draw(&mut surface, "AB", 10, 20, 255);
        assert_eq!(surface.blits.len(), 2);
        // 'A' is code 65 -> index 33 -> column 1, row 2.
        assert_eq!(surface.blits[0], (Rect::new(8, 16, 8, 8), 10, 20));
        assert_eq!(surface.blits[1].1, 18);
    }

    #[test]
    fn font_centers_text() {
        let sheet = Arc::new(Image::filled(128, 48, [255, 255, 255, 255]));
        let font = BitmapFont::new(sheet, 8, 8, ' ').expect("valid font");
        let mut surface = BlitLog { blits: Vec::new() };
        font.draw_centered(&mut surface, "ABCD", 100, 255);
        assert_eq!(surface.blits[0].1, (320 - 32) / 2);
    }
}
