//! Horizontally scrolling window over a level background.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::geom::Rect;
use crate::surface::{Image, Surface};

pub const DEFAULT_SCROLL_VELOCITY: f64 = 100.0;

pub struct Viewport {
    background: Arc<Image>,
    width: i32,
    height: i32,
    coordinate: f64,
    last_coordinate: f64,
    /// Distance scrolled since the level began. Never wraps.
    level_pos: f64,
    min_scroll: f64,
    max_scroll: f64,
    velocity: f64,
}

impl Viewport {
    pub fn new(background: Arc<Image>, config: &EngineConfig, velocity: f64) -> Self {
        let width = config.screen_width as i32;
        let max_scroll = (background.width() as f64 - width as f64).max(0.0);
        Self {
            background,
            width,
            height: config.screen_height as i32,
            coordinate: 0.0,
            last_coordinate: 0.0,
            level_pos: 0.0,
            min_scroll: 0.0,
            max_scroll,
            velocity,
        }
    }

    /// One fixed step of scrolling. Crossing the right edge of the background
    /// loops both coordinates back to the start in the same tick, so the
    /// interpolated draw never sweeps across the whole image.
    pub fn advance(&mut self, dt: f64) {
        self.last_coordinate = self.coordinate;
        self.coordinate += self.velocity * dt;
        self.level_pos += self.velocity * dt;

        if self.coordinate > self.max_scroll {
            self.coordinate = self.min_scroll;
            self.last_coordinate = self.min_scroll;
        }
    }

    /// Scroll offset to render with. `suppress_scroll` pins the view to the
    /// left edge and wins over `paused`, so a boss arena never shows a wrapped
    /// or half-scrolled background even while paused.
    pub fn draw_position(&self, alpha: f64, suppress_scroll: bool, paused: bool) -> f64 {
        if suppress_scroll {
            0.0
        } else if paused {
            self.coordinate
        } else {
            self.coordinate * alpha + self.last_coordinate * (1.0 - alpha)
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, alpha: f64, suppress_scroll: bool, paused: bool) {
        let x = self.draw_position(alpha, suppress_scroll, paused) as i32;
        let window = Rect::new(x, 0, self.width, self.height);
        surface.blit(self.background.subregion(window), 0, 0, 255);
    }

    pub fn coordinate(&self) -> f64 {
        self.coordinate
    }

    pub fn last_coordinate(&self) -> f64 {
        self.last_coordinate
    }

    pub fn level_pos(&self) -> f64 {
        self.level_pos
    }

    pub fn max_scroll(&self) -> f64 {
        self.max_scroll
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}
