use glam::Vec2;
use psm_core::geom::Rect;
use psm_core::surface::Surface;

use crate::assets::Assets;
use crate::entity::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletKind {
    Straight,
    Spread,
    Reverse,
    /// Persistent beam attached to the ship.
    Beam,
    Enemy,
}

impl BulletKind {
    fn sheet(self) -> &'static str {
        match self {
            BulletKind::Straight | BulletKind::Reverse => "pshot",
            BulletKind::Spread => "spreadshot",
            BulletKind::Beam => "beam",
            BulletKind::Enemy => "eshot",
        }
    }

    fn size(self) -> (i32, i32) {
        match self {
            BulletKind::Straight | BulletKind::Reverse => (8, 3),
            BulletKind::Spread => (6, 6),
            BulletKind::Beam => (BEAM_START_WIDTH, 4),
            BulletKind::Enemy => (4, 4),
        }
    }

    fn speed(self) -> f32 {
        match self {
            BulletKind::Straight | BulletKind::Reverse => 300.0,
            BulletKind::Spread => 250.0,
            BulletKind::Beam => 0.0,
            BulletKind::Enemy => ENEMY_SHOT_SPEED,
        }
    }
}

const ENEMY_SHOT_SPEED: f32 = 110.0;
const BEAM_START_WIDTH: i32 = 8;
const BEAM_GROWTH: f32 = 900.0;
const BEAM_LIFETIME_MS: u64 = 450;

pub struct Bullet {
    pub kind: BulletKind,
    pub body: Body,
    vel: Vec2,
    /// Consumed by the first thing it hits. Beams are not.
    pub destroyable: bool,
    alive: bool,
    spawned_ms: u64,
    width: f32,
    /// Enemies a beam has already damaged.
    struck: Vec<u64>,
}

impl Bullet {
    /// Player shot leaving (`x`, `center_y`) at `angle_deg` (0 is straight
    /// right, counter-clockwise on screen).
    pub fn player_shot(kind: BulletKind, x: f32, center_y: f32, angle_deg: f32, now_ms: u64) -> Self {
        if kind == BulletKind::Beam {
            return Self::beam(x, center_y - 2.0, now_ms);
        }
        let (w, h) = kind.size();
        let angle = angle_deg.to_radians();
        Self {
            kind,
            body: Body::new(x, center_y - h as f32 / 2.0, w, h),
            vel: Vec2::new(angle.cos(), -angle.sin()) * kind.speed(),
            destroyable: true,
            alive: true,
            spawned_ms: now_ms,
            width: w as f32,
            struck: Vec::new(),
        }
    }

    pub fn beam(x: f32, y: f32, now_ms: u64) -> Self {
        let (w, h) = BulletKind::Beam.size();
        Self {
            kind: BulletKind::Beam,
            body: Body::new(x, y, w, h),
            vel: Vec2::ZERO,
            destroyable: false,
            alive: true,
            spawned_ms: now_ms,
            width: w as f32,
            struck: Vec::new(),
        }
    }

    /// Enemy shot from `from` aimed at `target` (both centres).
    pub fn enemy_shot(from: Vec2, target: Vec2, now_ms: u64) -> Self {
        let (w, h) = BulletKind::Enemy.size();
        let dir = (target - from).normalize_or(Vec2::NEG_X);
        Self {
            kind: BulletKind::Enemy,
            body: Body::new(from.x - w as f32 / 2.0, from.y - h as f32 / 2.0, w, h),
            vel: dir * ENEMY_SHOT_SPEED,
            destroyable: true,
            alive: true,
            spawned_ms: now_ms,
            width: w as f32,
            struck: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn velocity(&self) -> Vec2 {
        self.vel
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

    /// Record a hit on enemy `id`. A beam damages each enemy once; ordinary
    /// shots always count.
    pub fn strike(&mut self, id: u64) -> bool {
        if self.destroyable {
            return true;
        }
        if self.struck.contains(&id) {
            return false;
        }
        self.struck.push(id);
        true
    }

    /// `ship` is the player's rect while the player is in control; a beam
    /// without a ship to hold it disappears.
    pub fn update(&mut self, dt: f32, now_ms: u64, ship: Option<Rect>, bounds: &Rect) {
        self.body.begin_step();
        if self.kind == BulletKind::Beam {
            let Some(ship) = ship else {
                self.kill();
                return;
            };
            self.body.pos = Vec2::new((ship.right() - 6) as f32, (ship.center_y() - 2) as f32);
            let reach = (bounds.right() as f32 - self.body.pos.x).max(0.0);
            self.width = (self.width + BEAM_GROWTH * dt).min(reach);
            self.body.w = self.width as i32;
            if now_ms.saturating_sub(self.spawned_ms) > BEAM_LIFETIME_MS {
                self.kill();
            }
            return;
        }
        self.body.pos += self.vel * dt;
        if self.body.is_outside(bounds) {
            self.kill();
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, assets: &Assets, alpha: f64, paused: bool) {
        let (x, y) = self.body.draw_pos(alpha, paused);
        if self.kind == BulletKind::Beam {
            assets.draw_tiled(surface, self.kind.sheet(), x, y, self.body.w);
        } else {
            assets.draw(surface, self.kind.sheet(), 0, x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const SCREEN: Rect = Rect::new(0, 0, 320, 240);

    #[test]
    fn straight_shot_flies_right_and_dies_offscreen() {
        let mut shot = Bullet::player_shot(BulletKind::Straight, 300.0, 100.0, 0.0, 0);
        assert!(shot.velocity().x > 0.0);
        assert!(shot.velocity().y.abs() < 1e-4);
        for _ in 0..10 {
            shot.update(DT, 0, None, &SCREEN);
        }
        assert!(!shot.is_alive());
    }

    #[test]
    fn reverse_angles_fly_backwards() {
        let up = Bullet::player_shot(BulletKind::Reverse, 100.0, 100.0, 140.0, 0);
        let down = Bullet::player_shot(BulletKind::Reverse, 100.0, 100.0, 220.0, 0);
        assert!(up.velocity().x < 0.0 && up.velocity().y < 0.0);
        assert!(down.velocity().x < 0.0 && down.velocity().y > 0.0);
    }

    #[test]
    fn beam_follows_ship_grows_and_expires() {
        let mut beam = Bullet::player_shot(BulletKind::Beam, 40.0, 108.0, 0.0, 0);
        assert!(!beam.destroyable);
        let ship = Rect::new(20, 100, 32, 16);
        beam.update(DT, 17, Some(ship), &SCREEN);
        assert_eq!(beam.body.rect().x, 46);
        assert!(beam.body.w > BEAM_START_WIDTH);
        beam.update(DT, 17 + BEAM_LIFETIME_MS + 1, Some(ship), &SCREEN);
        assert!(!beam.is_alive());
    }

    #[test]
    fn beam_without_ship_vanishes() {
        let mut beam = Bullet::beam(40.0, 100.0, 0);
        beam.update(DT, 10, None, &SCREEN);
        assert!(!beam.is_alive());
    }

    #[test]
    fn beam_strikes_each_enemy_once() {
        let mut beam = Bullet::beam(40.0, 100.0, 0);
        assert!(beam.strike(7));
        assert!(!beam.strike(7));
        assert!(beam.strike(8));
        let mut shot = Bullet::player_shot(BulletKind::Straight, 0.0, 0.0, 0.0, 0);
        assert!(shot.strike(7));
        assert!(shot.strike(7));
    }

    #[test]
    fn enemy_shot_is_aimed() {
        let shot = Bullet::enemy_shot(Vec2::new(200.0, 100.0), Vec2::new(100.0, 100.0), 0);
        assert!((shot.velocity().x + ENEMY_SHOT_SPEED).abs() < 1e-3);
        let stacked = Bullet::enemy_shot(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0), 0);
        assert!(stacked.velocity().x < 0.0);
    }
}
