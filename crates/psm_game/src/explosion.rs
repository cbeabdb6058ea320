use glam::Vec2;
use psm_core::animation::{AnimationClip, AnimationState};
use psm_core::geom::Rect;
use psm_core::surface::Surface;

use crate::assets::Assets;
use crate::entity::Body;

const EXPLOSION_FRAMES: usize = 6;
const EXPLOSION_FRAME_MS: u64 = 60;
const SHRAPNEL_FRAMES: usize = 4;
const SHRAPNEL_FRAME_MS: u64 = 80;
const SHRAPNEL_SPEED: f32 = 70.0;

/// A burst of flame, or a piece of boss shrapnel. Shrapnel moves, loops its
/// animation, and hurts the player until it leaves the screen.
pub struct Explosion {
    pub body: Body,
    vel: Vec2,
    clip: AnimationClip,
    anim: AnimationState,
    frame: usize,
    damaging: bool,
    alive: bool,
}

impl Explosion {
    /// Plain explosion centred on `center`.
    pub fn at(center: Vec2) -> Self {
        Self {
            body: Body::new(center.x - 8.0, center.y - 8.0, 16, 16),
            vel: Vec2::ZERO,
            clip: AnimationClip::uniform(EXPLOSION_FRAMES, EXPLOSION_FRAME_MS, false),
            anim: AnimationState::new(),
            frame: 0,
            damaging: false,
            alive: true,
        }
    }

    /// `count` shrapnel pieces flying out evenly from `center`.
    pub fn shrapnel_burst(center: Vec2, count: usize) -> Vec<Self> {
        (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                Self {
                    body: Body::new(center.x - 4.0, center.y - 4.0, 8, 8),
                    vel: Vec2::new(angle.cos(), angle.sin()) * SHRAPNEL_SPEED,
                    clip: AnimationClip::uniform(SHRAPNEL_FRAMES, SHRAPNEL_FRAME_MS, true),
                    anim: AnimationState::new(),
                    frame: 0,
                    damaging: true,
                    alive: true,
                }
            })
            .collect()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Collision box, for shrapnel only.
    pub fn hitbox(&self) -> Option<Rect> {
        self.damaging.then(|| self.body.rect())
    }

    pub fn update(&mut self, dt: f32, dt_us: u64, bounds: &Rect) {
        self.body.begin_step();
        self.frame = self.anim.tick(dt_us, &self.clip);
        if self.damaging {
            self.body.pos += self.vel * dt;
            if self.body.is_outside(bounds) {
                self.kill();
            }
        } else if self.anim.finished {
            self.kill();
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, assets: &Assets, alpha: f64, paused: bool) {
        let (x, y) = self.body.draw_pos(alpha, paused);
        let sheet = if self.damaging { "shrapnel" } else { "explosion" };
        assets.draw(surface, sheet, self.frame, x, y);
    }
}
