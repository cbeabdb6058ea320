//! Screen transitions attached to game states.
//!
//! A transition is driven by the owning state's update (`update(now)` returns
//! whether it is still running) and drawn on top of that state. While it runs,
//! the owning state receives no input.

use std::sync::Arc;

use crate::surface::{BitmapFont, Surface};

pub trait Transition {
    fn update(&mut self, now_ms: u64) -> bool;
    fn draw(&self, surface: &mut dyn Surface);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeKind {
    /// Black screen clearing to the scene.
    In,
    /// Scene darkening to black.
    Out,
}

pub struct FadeTransition {
    kind: FadeKind,
    opacity: f32,
    step: f32,
    started_ms: Option<u64>,
}

impl FadeTransition {
    pub const DELAY_MS: u64 = 450;
    pub const SPEED: f32 = 300.0;

    pub fn new(kind: FadeKind, fixed_dt: f64) -> Self {
        let opacity = match kind {
            FadeKind::In => 255.0,
            FadeKind::Out => 0.0,
        };
        Self {
            kind,
            opacity,
            step: fixed_dt as f32,
            started_ms: None,
        }
    }

    pub fn fade_in(fixed_dt: f64) -> Box<dyn Transition> {
        Box::new(Self::new(FadeKind::In, fixed_dt))
    }

    pub fn fade_out(fixed_dt: f64) -> Box<dyn Transition> {
        Box::new(Self::new(FadeKind::Out, fixed_dt))
    }

    pub fn kind(&self) -> FadeKind {
        self.kind
    }

    pub fn opacity(&self) -> u8 {
        self.opacity.clamp(0.0, 255.0) as u8
    }
}

impl Transition for FadeTransition {
    fn update(&mut self, now_ms: u64) -> bool {
        // The clock starts on the first tick the transition sees.
        let started = *self.started_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(started) > Self::DELAY_MS {
            match self.kind {
                FadeKind::Out => self.opacity += Self::SPEED * self.step,
                FadeKind::In => self.opacity -= Self::SPEED * self.step,
            }
            if self.opacity < -50.0 || self.opacity > 300.0 {
                return false;
            }
        }
        true
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill([0, 0, 0], self.opacity());
    }
}

/// Black card with a line of text fading in, e.g. "STAGE 2".
pub struct TextTransition {
    text: String,
    font: Arc<BitmapFont>,
    opacity: f32,
    step: f32,
    started_ms: Option<u64>,
}

impl TextTransition {
    pub const DURATION_MS: u64 = 4000;
    pub const FADE_RATE: f32 = 200.0;

    pub fn new(text: impl Into<String>, font: Arc<BitmapFont>, fixed_dt: f64) -> Self {
        Self {
            text: text.into(),
            font,
            opacity: 0.0,
            step: fixed_dt as f32,
            started_ms: None,
        }
    }

    pub fn boxed(text: impl Into<String>, font: Arc<BitmapFont>, fixed_dt: f64) -> Box<dyn Transition> {
        Box::new(Self::new(text, font, fixed_dt))
    }

    pub fn text_opacity(&self) -> u8 {
        self.opacity.clamp(0.0, 255.0) as u8
    }
}

impl Transition for TextTransition {
    fn update(&mut self, now_ms: u64) -> bool {
        let started = *self.started_ms.get_or_insert(now_ms);
        if self.opacity < 255.0 {
            self.opacity += Self::FADE_RATE * self.step;
        }
        now_ms.saturating_sub(started) <= Self::DURATION_MS
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.fill([0, 0, 0], 255);
        let (_, height) = surface.size();
        let y = (height as i32 - self.font.line_height()) / 2;
        self.font
            .draw_centered(surface, &self.text, y, self.text_opacity());
    }
}
