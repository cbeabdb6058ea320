use psm_core::geom::Rect;
use psm_core::surface::Surface;

use crate::assets::Assets;
use crate::entity::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    /// Shortens the current weapon's cooldown.
    WeaponBoost,
    ExtraLife,
}

impl PowerupKind {
    fn frame(self) -> usize {
        match self {
            PowerupKind::WeaponBoost => 0,
            PowerupKind::ExtraLife => 1,
        }
    }
}

const DRIFT_SPEED: f32 = 30.0;

pub struct Powerup {
    pub kind: PowerupKind,
    pub body: Body,
    alive: bool,
}

impl Powerup {
    pub fn new(kind: PowerupKind, center_x: f32, center_y: f32) -> Self {
        Self {
            kind,
            body: Body::new(center_x - 8.0, center_y - 8.0, 16, 16),
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn hitbox(&self) -> Rect {
        self.body.rect()
    }

    /// Take the powerup off the field and report what it grants.
    pub fn collect(&mut self) -> PowerupKind {
        self.kill();
        self.kind
    }

    pub fn update(&mut self, dt: f32, bounds: &Rect) {
        self.body.begin_step();
        self.body.pos.x -= DRIFT_SPEED * dt;
        if self.body.is_outside(bounds) {
            self.kill();
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, assets: &Assets, alpha: f64, paused: bool) {
        let (x, y) = self.body.draw_pos(alpha, paused);
        assets.draw(surface, "powerups", self.kind.frame(), x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_kills_and_reports_kind() {
        let mut p = Powerup::new(PowerupKind::ExtraLife, 100.0, 100.0);
        assert_eq!(p.collect(), PowerupKind::ExtraLife);
        assert!(!p.is_alive());
    }

    #[test]
    fn drifts_left_off_screen() {
        let bounds = Rect::new(0, 0, 320, 240);
        let mut p = Powerup::new(PowerupKind::WeaponBoost, 10.0, 100.0);
        for _ in 0..60 {
            p.update(1.0 / 60.0, &bounds);
        }
        assert!(!p.is_alive());
    }
}
