//! Shared pieces of every on-screen object.

use glam::Vec2;
use psm_core::geom::Rect;

/// Float position with the previous tick's position kept for interpolated
/// drawing. The integer draw rect is derived, never stored, so rounding never
/// feeds back into movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub w: i32,
    pub h: i32,
}

impl Body {
    pub fn new(x: f32, y: f32, w: i32, h: i32) -> Self {
        let pos = Vec2::new(x, y);
        Self {
            pos,
            prev_pos: pos,
            w,
            h,
        }
    }

    /// Start of a tick: remember where we were.
    pub fn begin_step(&mut self) {
        self.prev_pos = self.pos;
    }

    /// Jump without leaving an interpolation trail.
    pub fn teleport(&mut self, pos: Vec2) {
        self.pos = pos;
        self.prev_pos = pos;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x as i32, self.pos.y as i32, self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.w as f32, self.h as f32) * 0.5
    }

    /// Draw position between the last two ticks. Paused frames show the
    /// latest position as is.
    pub fn draw_pos(&self, alpha: f64, paused: bool) -> (i32, i32) {
        let p = if paused {
            self.pos
        } else {
            self.prev_pos.lerp(self.pos, alpha as f32)
        };
        (p.x.round() as i32, p.y.round() as i32)
    }

    /// True once the body is entirely outside `bounds`.
    pub fn is_outside(&self, bounds: &Rect) -> bool {
        !self.rect().collides(bounds)
    }
}

/// Collision rectangle relative to a body's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitbox {
    pub offset: Rect,
    /// Only this box takes damage during a boss fight.
    pub hurtbox: bool,
}

impl Hitbox {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            offset: Rect::new(x, y, w, h),
            hurtbox: false,
        }
    }

    pub const fn hurtbox(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            offset: Rect::new(x, y, w, h),
            hurtbox: true,
        }
    }

    pub fn world(&self, body: &Body) -> Rect {
        let origin = body.rect();
        self.offset.offset(origin.x, origin.y)
    }
}
