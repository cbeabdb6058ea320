//! Image and font loading.
//!
//! `assets.json` lists every sprite sheet, background and the bitmap font by
//! id. Sheets are single rows of equally sized frames. Mirrored sheets are
//! derived from another sheet at load time instead of being stored twice.

use psm_core::surface::{BitmapFont, Image, Surface};
use psm_core::geom::Rect;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Sheets the game code refers to: id, frame width, frame height.
pub const REQUIRED_SHEETS: &[(&str, u32, u32)] = &[
    ("ship", 32, 16),
    ("enemy_01", 16, 16),
    ("enemy_02", 16, 16),
    ("enemy_03", 24, 16),
    ("enemy_04", 16, 16),
    ("enemy_05", 32, 32),
    ("enemy_06", 16, 16),
    ("enemy_07", 24, 16),
    ("enemy_08", 16, 16),
    ("enemy_09", 24, 16),
    ("enemy_10", 16, 16),
    ("boss", 64, 64),
    ("pshot", 8, 3),
    ("spreadshot", 6, 6),
    ("eshot", 4, 4),
    ("beam", 16, 4),
    ("explosion", 16, 16),
    ("shrapnel", 8, 8),
    ("powerups", 16, 16),
    ("cursor", 8, 8),
];

#[derive(Debug, Deserialize)]
struct AssetManifest {
    version: String,
    font: FontEntry,
    sheets: Vec<SheetEntry>,
    #[serde(default)]
    backgrounds: Vec<BackgroundEntry>,
}

#[derive(Debug, Deserialize)]
struct FontEntry {
    file: String,
    glyph_w: u32,
    glyph_h: u32,
    #[serde(default = "default_first_glyph")]
    first: char,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    id: String,
    #[serde(default)]
    file: Option<String>,
    /// Mirror of another sheet instead of a file of its own.
    #[serde(default)]
    flip_of: Option<String>,
    #[serde(default)]
    frame_w: Option<u32>,
    #[serde(default)]
    frame_h: Option<u32>,
    #[serde(default)]
    color_key: Option<[u8; 3]>,
}

#[derive(Debug, Deserialize)]
struct BackgroundEntry {
    id: String,
    file: String,
}

/// A row of equally sized frames cut from one image.
#[derive(Debug, Clone)]
pub struct Sheet {
    image: Arc<Image>,
    frame_w: u32,
    frame_h: u32,
}

impl Sheet {
    pub fn new(image: Arc<Image>, frame_w: u32, frame_h: u32) -> Result<Self, String> {
        if frame_w == 0 || frame_h == 0 || image.width() < frame_w || image.height() < frame_h {
            return Err(format!(
                "Sheet of {}x{} cannot hold {}x{} frames",
                image.width(),
                image.height(),
                frame_w,
                frame_h
            ));
        }
        Ok(Self {
            image,
            frame_w,
            frame_h,
        })
    }

    pub fn frame_count(&self) -> usize {
        (self.image.width() / self.frame_w) as usize
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_w, self.frame_h)
    }

    fn frame_rect(&self, frame: usize) -> Rect {
        let frame = frame.min(self.frame_count().saturating_sub(1)) as i32;
        Rect::new(
            frame * self.frame_w as i32,
            0,
            self.frame_w as i32,
            self.frame_h as i32,
        )
    }

    fn flipped(&self) -> Self {
        // Mirroring the whole row reverses frame order; put it back.
        let mirrored = self.image.flipped_horizontal();
        let count = self.frame_count();
        let mut pixels = Vec::with_capacity(mirrored.pixels().len());
        for y in 0..mirrored.height() {
            for frame in 0..count {
                let src_frame = count - 1 - frame;
                for x in 0..self.frame_w {
                    pixels.push(mirrored.pixel(src_frame as u32 * self.frame_w + x, y));
                }
            }
            // Columns past the last whole frame.
            for x in (count as u32 * self.frame_w)..mirrored.width() {
                pixels.push(mirrored.pixel(x, y));
            }
        }
        let image = Image::new(mirrored.width(), mirrored.height(), pixels)
            .unwrap_or(mirrored);
        Self {
            image: Arc::new(image),
            frame_w: self.frame_w,
            frame_h: self.frame_h,
        }
    }
}

pub struct Assets {
    sheets: HashMap<String, Sheet>,
    backgrounds: HashMap<String, Arc<Image>>,
    font: Arc<BitmapFont>,
}

impl Assets {
    pub fn sheet(&self, id: &str) -> Option<&Sheet> {
        self.sheets.get(id)
    }

    pub fn background(&self, id: &str) -> Option<Arc<Image>> {
        self.backgrounds.get(id).cloned()
    }

    pub fn font(&self) -> Arc<BitmapFont> {
        Arc::clone(&self.font)
    }

    /// Draw one frame of sheet `id` with its top-left at (`x`, `y`).
    pub fn draw(&self, surface: &mut dyn Surface, id: &str, frame: usize, x: i32, y: i32) {
        match self.sheets.get(id) {
            Some(sheet) => {
                let region = sheet.image.subregion(sheet.frame_rect(frame));
                surface.blit(region, x, y, 255);
            }
            None => log::trace!("No sheet '{id}' to draw"),
        }
    }

    /// Draw frame 0 of sheet `id` repeated to cover `width` pixels.
    pub fn draw_tiled(&self, surface: &mut dyn Surface, id: &str, x: i32, y: i32, width: i32) {
        let Some(sheet) = self.sheets.get(id) else {
            return;
        };
        let rect = sheet.frame_rect(0);
        let mut pen = 0;
        while pen < width {
            let w = rect.w.min(width - pen);
            let region = sheet.image.subregion(Rect::new(rect.x, rect.y, w, rect.h));
            surface.blit(region, x + pen, y, 255);
            pen += rect.w;
        }
    }

    /// Stand-in assets of the right sizes, for headless runs.
    #[cfg(test)]
    pub fn placeholder(backgrounds: &[&str]) -> Self {
        let mut sheets = HashMap::new();
        for &(id, w, h) in REQUIRED_SHEETS {
            let image = Arc::new(Image::filled(w * 4, h, [200, 200, 200, 255]));
            sheets.insert(id.to_string(), Sheet { image, frame_w: w, frame_h: h });
        }
        let backgrounds = backgrounds
            .iter()
            .map(|id| (id.to_string(), Arc::new(Image::filled(640, 240, [0, 0, 40, 255]))))
            .collect();
        let glyphs = Arc::new(Image::filled(128, 48, [255, 255, 255, 255]));
        let font = BitmapFont::new(glyphs, 8, 8, ' ').expect("placeholder font");
        Self {
            sheets,
            backgrounds,
            font: Arc::new(font),
        }
    }
}

pub fn load_assets(manifest_path: &Path) -> Result<Assets, String> {
    let raw = fs::read_to_string(manifest_path)
        .map_err(|e| format!("Failed to read asset manifest {}: {e}", manifest_path.display()))?;
    let manifest: AssetManifest = serde_json::from_str(&raw).map_err(|e| {
        format!(
            "Failed to parse asset manifest {}: {e}",
            manifest_path.display()
        )
    })?;
    validate_manifest(&manifest)?;

    let base = manifest_path.parent().unwrap_or(Path::new("."));

    let mut sheets = HashMap::new();
    for entry in manifest.sheets.iter().filter(|e| e.file.is_some()) {
        let file = entry.file.as_deref().unwrap_or_default();
        let image = Arc::new(load_png(&base.join(file), entry.color_key)?);
        let frame_w = entry.frame_w.unwrap_or(image.width());
        let frame_h = entry.frame_h.unwrap_or(image.height());
        let sheet = Sheet::new(image, frame_w, frame_h)
            .map_err(|e| format!("Sheet '{}' ({file}): {e}", entry.id))?;
        sheets.insert(entry.id.clone(), sheet);
    }
    for entry in &manifest.sheets {
        if let Some(source) = &entry.flip_of {
            let flipped = sheets
                .get(source)
                .map(Sheet::flipped)
                .ok_or_else(|| format!("Sheet '{}' mirrors unknown sheet '{source}'", entry.id))?;
            sheets.insert(entry.id.clone(), flipped);
        }
    }
    check_required_sheets(&sheets)?;

    let mut backgrounds = HashMap::new();
    for entry in &manifest.backgrounds {
        let image = load_png(&base.join(&entry.file), None)?;
        backgrounds.insert(entry.id.clone(), Arc::new(image));
    }

    let glyphs = Arc::new(load_png(&base.join(&manifest.font.file), Some([0, 0, 0]))?);
    let font = BitmapFont::new(
        glyphs,
        manifest.font.glyph_w,
        manifest.font.glyph_h,
        manifest.font.first,
    )
    .map_err(|e| format!("Font {}: {e}", manifest.font.file))?;

    log::info!(
        "Loaded {} sheets and {} backgrounds from {}",
        sheets.len(),
        backgrounds.len(),
        manifest_path.display()
    );

    Ok(Assets {
        sheets,
        backgrounds,
        font: Arc::new(font),
    })
}

fn load_png(path: &Path, color_key: Option<[u8; 3]>) -> Result<Image, String> {
    let rgba = image::open(path)
        .map_err(|e| format!("Failed to load image {}: {e}", path.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.pixels().map(|p| p.0).collect();
    let image = Image::new(width, height, pixels)?;
    Ok(match color_key {
        Some(key) => image.with_color_key(key),
        None => image,
    })
}

fn validate_manifest(manifest: &AssetManifest) -> Result<(), String> {
    if manifest.version != "0.1" {
        return Err(format!(
            "Asset manifest validation failed: unsupported version '{}'",
            manifest.version
        ));
    }
    for entry in &manifest.sheets {
        match (&entry.file, &entry.flip_of) {
            (Some(_), None) | (None, Some(_)) => {}
            _ => {
                return Err(format!(
                    "Asset manifest validation failed: sheet '{}' needs exactly one of file or flip_of",
                    entry.id
                ))
            }
        }
    }
    Ok(())
}

fn check_required_sheets(sheets: &HashMap<String, Sheet>) -> Result<(), String> {
    for &(id, w, h) in REQUIRED_SHEETS {
        let sheet = sheets
            .get(id)
            .ok_or_else(|| format!("Asset manifest is missing sheet '{id}'"))?;
        if sheet.frame_size() != (w, h) {
            return Err(format!(
                "Sheet '{id}' has {}x{} frames, expected {w}x{h}",
                sheet.frame_w, sheet.frame_h
            ));
        }
    }
    Ok(())
}

const fn default_first_glyph() -> char {
    ' '
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "psm_assets_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
        image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))
            .save(path)
            .expect("write png");
    }

    /// Manifest covering every required sheet, with enemy_08 mirrored.
    fn write_full_manifest(dir: &Path) -> std::path::PathBuf {
        let mut sheets = Vec::new();
        for &(id, w, h) in REQUIRED_SHEETS {
            if id == "enemy_08" {
                sheets.push(r#"{ "id": "enemy_08", "flip_of": "enemy_01" }"#.to_string());
                continue;
            }
            write_png(&dir.join(format!("{id}.png")), w * 2, h, [255, 0, 255, 255]);
            sheets.push(format!(
                r#"{{ "id": "{id}", "file": "{id}.png", "frame_w": {w}, "frame_h": {h}, "color_key": [255, 0, 255] }}"#
            ));
        }
        write_png(&dir.join("bg.png"), 640, 240, [0, 0, 80, 255]);
        write_png(&dir.join("font.png"), 128, 48, [255, 255, 255, 255]);
        let manifest = format!(
            r#"{{
              "version": "0.1",
              "font": {{ "file": "font.png", "glyph_w": 8, "glyph_h": 8 }},
              "sheets": [{}],
              "backgrounds": [{{ "id": "level1", "file": "bg.png" }}]
            }}"#,
            sheets.join(",")
        );
        let path = dir.join("assets.json");
        fs::write(&path, manifest).expect("write manifest");
        path
    }

    #[test]
    fn full_manifest_loads() {
        let dir = temp_dir("full");
        let path = write_full_manifest(&dir);
        let assets = load_assets(&path).expect("assets should load");

        let ship = assets.sheet("ship").expect("ship sheet");
        assert_eq!(ship.frame_count(), 2);
        // Color key applied.
        assert_eq!(ship.image.pixel(0, 0)[3], 0);
        assert_eq!(assets.sheet("enemy_08").expect("mirrored").frame_size(), (16, 16));
        assert!(assets.background("level1").is_some());
        assert_eq!(assets.font().line_height(), 8);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_image_is_an_error() {
        let dir = temp_dir("missing_png");
        let path = write_full_manifest(&dir);
        fs::remove_file(dir.join("boss.png")).expect("remove png");
        let err = load_assets(&path).err().expect("missing png should fail");
        assert!(err.contains("Failed to load image"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn manifest_without_required_sheet_is_rejected() {
        let dir = temp_dir("incomplete");
        write_png(&dir.join("ship.png"), 64, 16, [0, 0, 0, 255]);
        write_png(&dir.join("font.png"), 128, 48, [255, 255, 255, 255]);
        let path = dir.join("assets.json");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "font": { "file": "font.png", "glyph_w": 8, "glyph_h": 8 },
              "sheets": [{ "id": "ship", "file": "ship.png", "frame_w": 32, "frame_h": 16 }]
            }"#,
        )
        .expect("write manifest");
        let err = load_assets(&path).err().expect("incomplete should fail");
        assert!(err.contains("missing sheet"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn sheet_entry_needs_file_or_flip() {
        let dir = temp_dir("ambiguous");
        let path = dir.join("assets.json");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "font": { "file": "font.png", "glyph_w": 8, "glyph_h": 8 },
              "sheets": [{ "id": "x" }]
            }"#,
        )
        .expect("write manifest");
        let err = load_assets(&path).err().expect("ambiguous should fail");
        assert!(err.contains("exactly one of file or flip_of"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn flipped_sheet_keeps_frame_order() {
        // Two 2x1 frames: [A B] [C D] mirror to [B A] [D C].
        let px = |v: u8| [v, 0, 0, 255];
        let image = Image::new(4, 1, vec![px(1), px(2), px(3), px(4)]).expect("image");
        let sheet = Sheet::new(Arc::new(image), 2, 1).expect("sheet");
        let flipped = sheet.flipped();
        let reds: Vec<u8> = flipped.image.pixels().iter().map(|p| p[0]).collect();
        assert_eq!(reds, vec![2, 1, 4, 3]);
    }
}
