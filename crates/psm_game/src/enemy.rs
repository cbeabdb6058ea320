//! Enemy kinds and their behaviour.
//!
//! Every kind is a row in a profile table: sheet, size, hitboxes, toughness,
//! score, movement pattern and fire rate. Level files name kinds by tag and
//! `EnemyKind::from_tag` resolves the tag through `TAGS`.

use glam::Vec2;
use psm_core::animation::{AnimationClip, AnimationState};
use psm_core::geom::Rect;
use psm_core::surface::Surface;

use crate::assets::Assets;
use crate::bullet::Bullet;
use crate::entity::{Body, Hitbox};
use crate::explosion::Explosion;
use crate::powerup::{Powerup, PowerupKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Drone,
    Weaver,
    Gunship,
    Seeker,
    Carrier,
    Darter,
    Hunter,
    DroneMirrored,
    GunshipMirrored,
    DarterMirrored,
    SlowWeaver,
    Dasher,
    Drifter,
    Sniper,
    Brute,
    Boss,
}

/// Level-file tags.
const TAGS: &[(&str, EnemyKind)] = &[
    ("enemy_01", EnemyKind::Drone),
    ("enemy_02", EnemyKind::Weaver),
    ("enemy_03", EnemyKind::Gunship),
    ("enemy_04", EnemyKind::Seeker),
    ("enemy_05", EnemyKind::Carrier),
    ("enemy_06", EnemyKind::Darter),
    ("enemy_07", EnemyKind::Hunter),
    ("enemy_08", EnemyKind::DroneMirrored),
    ("enemy_09", EnemyKind::GunshipMirrored),
    ("enemy_10", EnemyKind::DarterMirrored),
    ("enemy_11", EnemyKind::SlowWeaver),
    ("enemy_12", EnemyKind::Dasher),
    ("enemy_13", EnemyKind::Drifter),
    ("enemy_14", EnemyKind::Sniper),
    ("enemy_15", EnemyKind::Brute),
    ("boss", EnemyKind::Boss),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Movement {
    Straight { speed: f32 },
    /// Straight line with a vertical sine wobble around the spawn height.
    Sine { speed: f32, amplitude: f32, period_ms: f32 },
    /// Straight line, steering vertically toward the player.
    Homing { speed: f32, turn: f32 },
    /// Fly in to the right edge, then bob in place.
    Hover,
}

struct EnemyProfile {
    sheet: &'static str,
    w: i32,
    h: i32,
    hitboxes: &'static [Hitbox],
    hits: u32,
    points: u32,
    movement: Movement,
    fire_ms: Option<u64>,
    /// Travels left to right.
    mirrored: bool,
    drop: PowerupKind,
}

const SMALL_BOX: &[Hitbox] = &[Hitbox::new(2, 2, 12, 12)];
const WIDE_BOX: &[Hitbox] = &[Hitbox::new(2, 2, 20, 12)];
const LARGE_BOX: &[Hitbox] = &[Hitbox::new(2, 2, 28, 28)];
/// Only the boss's nose takes damage; the rest of the hull just blocks.
const BOSS_BOXES: &[Hitbox] = &[
    Hitbox::hurtbox(0, 28, 7, 8),
    Hitbox::new(7, 24, 57, 16),
    Hitbox::new(12, 4, 48, 20),
    Hitbox::new(12, 40, 48, 20),
];

const BOSS_HOVER_MARGIN: f32 = 16.0;
const BOSS_ENTRY_SPEED: f32 = 40.0;
const BOSS_BOB_AMPLITUDE: f32 = 40.0;
const BOSS_BOB_PERIOD_MS: f32 = 3000.0;
const BOSS_SHRAPNEL: usize = 8;
const ANIM_FRAMES: usize = 4;
const ANIM_FRAME_MS: u64 = 120;

const DRONE: EnemyProfile = EnemyProfile {
    sheet: "enemy_01",
    w: 16,
    h: 16,
    hitboxes: SMALL_BOX,
    hits: 1,
    points: 100,
    movement: Movement::Straight { speed: 80.0 },
    fire_ms: None,
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const WEAVER: EnemyProfile = EnemyProfile {
    sheet: "enemy_02",
    w: 16,
    h: 16,
    hitboxes: SMALL_BOX,
    hits: 1,
    points: 150,
    movement: Movement::Sine { speed: 70.0, amplitude: 24.0, period_ms: 1600.0 },
    fire_ms: None,
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const GUNSHIP: EnemyProfile = EnemyProfile {
    sheet: "enemy_03",
    w: 24,
    h: 16,
    hitboxes: WIDE_BOX,
    hits: 3,
    points: 300,
    movement: Movement::Straight { speed: 50.0 },
    fire_ms: Some(1800),
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const SEEKER: EnemyProfile = EnemyProfile {
    sheet: "enemy_04",
    w: 16,
    h: 16,
    hitboxes: SMALL_BOX,
    hits: 1,
    points: 200,
    movement: Movement::Homing { speed: 90.0, turn: 40.0 },
    fire_ms: None,
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const CARRIER: EnemyProfile = EnemyProfile {
    sheet: "enemy_05",
    w: 32,
    h: 32,
    hitboxes: LARGE_BOX,
    hits: 6,
    points: 500,
    movement: Movement::Straight { speed: 35.0 },
    fire_ms: Some(1400),
    mirrored: false,
    drop: PowerupKind::ExtraLife,
};

const DARTER: EnemyProfile = EnemyProfile {
    sheet: "enemy_06",
    w: 16,
    h: 16,
    hitboxes: SMALL_BOX,
    hits: 2,
    points: 200,
    movement: Movement::Sine { speed: 110.0, amplitude: 40.0, period_ms: 1200.0 },
    fire_ms: None,
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const HUNTER: EnemyProfile = EnemyProfile {
    sheet: "enemy_07",
    w: 24,
    h: 16,
    hitboxes: WIDE_BOX,
    hits: 2,
    points: 250,
    movement: Movement::Homing { speed: 70.0, turn: 30.0 },
    fire_ms: Some(2000),
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const DRONE_MIRRORED: EnemyProfile = EnemyProfile {
    sheet: "enemy_08",
    mirrored: true,
    ..DRONE
};

const GUNSHIP_MIRRORED: EnemyProfile = EnemyProfile {
    sheet: "enemy_09",
    mirrored: true,
    ..GUNSHIP
};

const DARTER_MIRRORED: EnemyProfile = EnemyProfile {
    sheet: "enemy_10",
    mirrored: true,
    ..DARTER
};

const SLOW_WEAVER: EnemyProfile = EnemyProfile {
    sheet: "enemy_02",
    w: 16,
    h: 16,
    hitboxes: SMALL_BOX,
    hits: 2,
    points: 200,
    movement: Movement::Sine { speed: 45.0, amplitude: 56.0, period_ms: 2400.0 },
    fire_ms: None,
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const DASHER: EnemyProfile = EnemyProfile {
    sheet: "enemy_04",
    w: 16,
    h: 16,
    hitboxes: SMALL_BOX,
    hits: 1,
    points: 250,
    movement: Movement::Straight { speed: 140.0 },
    fire_ms: None,
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const DRIFTER: EnemyProfile = EnemyProfile {
    sheet: "enemy_05",
    w: 32,
    h: 32,
    hitboxes: LARGE_BOX,
    hits: 8,
    points: 800,
    movement: Movement::Sine { speed: 25.0, amplitude: 20.0, period_ms: 4000.0 },
    fire_ms: Some(1600),
    mirrored: false,
    drop: PowerupKind::ExtraLife,
};

const SNIPER: EnemyProfile = EnemyProfile {
    sheet: "enemy_07",
    w: 24,
    h: 16,
    hitboxes: WIDE_BOX,
    hits: 2,
    points: 300,
    movement: Movement::Straight { speed: 40.0 },
    fire_ms: Some(900),
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const BRUTE: EnemyProfile = EnemyProfile {
    sheet: "enemy_03",
    w: 24,
    h: 16,
    hitboxes: WIDE_BOX,
    hits: 4,
    points: 400,
    movement: Movement::Homing { speed: 55.0, turn: 25.0 },
    fire_ms: Some(2200),
    mirrored: false,
    drop: PowerupKind::WeaponBoost,
};

const BOSS: EnemyProfile = EnemyProfile {
    sheet: "boss",
    w: 64,
    h: 64,
    hitboxes: BOSS_BOXES,
    hits: 40,
    points: 10_000,
    movement: Movement::Hover,
    fire_ms: Some(900),
    mirrored: false,
    drop: PowerupKind::ExtraLife,
};

impl EnemyKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        TAGS.iter().find(|(t, _)| *t == tag).map(|&(_, kind)| kind)
    }

    pub fn tag(self) -> &'static str {
        TAGS.iter()
            .find(|(_, k)| *k == self)
            .map_or("?", |&(t, _)| t)
    }

    pub fn is_boss(self) -> bool {
        self == EnemyKind::Boss
    }

    fn profile(self) -> &'static EnemyProfile {
        match self {
            EnemyKind::Drone => &DRONE,
            EnemyKind::Weaver => &WEAVER,
            EnemyKind::Gunship => &GUNSHIP,
            EnemyKind::Seeker => &SEEKER,
            EnemyKind::Carrier => &CARRIER,
            EnemyKind::Darter => &DARTER,
            EnemyKind::Hunter => &HUNTER,
            EnemyKind::DroneMirrored => &DRONE_MIRRORED,
            EnemyKind::GunshipMirrored => &GUNSHIP_MIRRORED,
            EnemyKind::DarterMirrored => &DARTER_MIRRORED,
            EnemyKind::SlowWeaver => &SLOW_WEAVER,
            EnemyKind::Dasher => &DASHER,
            EnemyKind::Drifter => &DRIFTER,
            EnemyKind::Sniper => &SNIPER,
            EnemyKind::Brute => &BRUTE,
            EnemyKind::Boss => &BOSS,
        }
    }

    pub fn max_hits(self) -> u32 {
        self.profile().hits
    }

    pub fn points(self) -> u32 {
        self.profile().points
    }
}

pub struct Enemy {
    pub id: u64,
    pub kind: EnemyKind,
    pub body: Body,
    hits: u32,
    base_y: f32,
    age_ms: f32,
    last_shot_ms: u64,
    drop: Option<PowerupKind>,
    entered: bool,
    clip: AnimationClip,
    anim: AnimationState,
    frame: usize,
    alive: bool,
}

impl Enemy {
    /// New enemy entering from the side it travels away from, at height `y`.
    pub fn spawn(kind: EnemyKind, id: u64, y: f32, has_powerup: bool, bounds: &Rect, now_ms: u64) -> Self {
        let profile = kind.profile();
        let x = if profile.mirrored {
            bounds.left() as f32 - profile.w as f32
        } else {
            bounds.right() as f32
        };
        Self {
            id,
            kind,
            body: Body::new(x, y, profile.w, profile.h),
            hits: kind.max_hits(),
            base_y: y,
            age_ms: 0.0,
            last_shot_ms: now_ms,
            drop: has_powerup.then_some(profile.drop),
            entered: false,
            clip: AnimationClip::uniform(ANIM_FRAMES, ANIM_FRAME_MS, true),
            anim: AnimationState::new(),
            frame: 0,
            alive: true,
        }
    }

    /// Move a right-entering enemy to screen `x`, kept within `bounds`.
    /// Mirrored enemies and the boss keep their entry edge.
    pub fn entering_at(mut self, x: f32, bounds: &Rect) -> Self {
        if self.kind.profile().mirrored || self.kind.is_boss() {
            return self;
        }
        let x = x.clamp(bounds.left() as f32, bounds.right() as f32);
        self.body.teleport(Vec2::new(x, self.body.pos.y));
        self
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Hits still needed to destroy it.
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Apply `damage`; true when this brings the counter to zero.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        self.hits = self.hits.saturating_sub(damage);
        self.hits == 0
    }

    pub fn hitboxes(&self) -> impl Iterator<Item = (Rect, &'static Hitbox)> + '_ {
        self.kind
            .profile()
            .hitboxes
            .iter()
            .map(|hitbox| (hitbox.world(&self.body), hitbox))
    }

    /// Powerup released on death, if the level asked for one.
    pub fn drop_powerup(&self) -> Option<Powerup> {
        let center = self.body.center();
        self.drop.map(|kind| Powerup::new(kind, center.x, center.y))
    }

    /// Death effects. The boss also scatters damaging shrapnel.
    pub fn explode(&self) -> Vec<Explosion> {
        let center = self.body.center();
        if !self.kind.is_boss() {
            return vec![Explosion::at(center)];
        }
        let mut effects = vec![
            Explosion::at(center),
            Explosion::at(center + Vec2::new(-16.0, -16.0)),
            Explosion::at(center + Vec2::new(16.0, 12.0)),
            Explosion::at(center + Vec2::new(-12.0, 18.0)),
        ];
        effects.extend(Explosion::shrapnel_burst(center, BOSS_SHRAPNEL));
        effects
    }

    /// Move one tick. `target` is the player's centre while it can be aimed
    /// at. Returns a shot when the enemy fires.
    pub fn update(
        &mut self,
        dt: f32,
        dt_us: u64,
        now_ms: u64,
        target: Option<Vec2>,
        bounds: &Rect,
    ) -> Option<Bullet> {
        let profile = self.kind.profile();
        self.body.begin_step();
        self.age_ms += dt * 1000.0;
        self.frame = self.anim.tick(dt_us, &self.clip);

        let heading = if profile.mirrored { 1.0 } else { -1.0 };
        match profile.movement {
            Movement::Straight { speed } => {
                self.body.pos.x += heading * speed * dt;
            }
            Movement::Sine { speed, amplitude, period_ms } => {
                self.body.pos.x += heading * speed * dt;
                let phase = self.age_ms / period_ms * std::f32::consts::TAU;
                self.body.pos.y = self.base_y + amplitude * phase.sin();
            }
            Movement::Homing { speed, turn } => {
                self.body.pos.x += heading * speed * dt;
                if let Some(target) = target {
                    let dy = target.y - self.body.center().y;
                    self.body.pos.y += dy.clamp(-turn * dt, turn * dt);
                }
            }
            Movement::Hover => {
                let stop_x = bounds.right() as f32 - profile.w as f32 - BOSS_HOVER_MARGIN;
                if self.body.pos.x > stop_x {
                    self.body.pos.x = (self.body.pos.x - BOSS_ENTRY_SPEED * dt).max(stop_x);
                } else {
                    let phase = self.age_ms / BOSS_BOB_PERIOD_MS * std::f32::consts::TAU;
                    self.body.pos.y = self.base_y + BOSS_BOB_AMPLITUDE * phase.sin();
                }
            }
        }

        let on_screen = !self.body.is_outside(bounds);
        if on_screen {
            self.entered = true;
        } else if self.entered {
            self.kill();
            return None;
        }

        let fire_ms = profile.fire_ms?;
        if !on_screen || now_ms.saturating_sub(self.last_shot_ms) <= fire_ms {
            return None;
        }
        self.last_shot_ms = now_ms;
        let muzzle = if self.kind.is_boss() {
            Vec2::new(self.body.pos.x, self.body.center().y)
        } else {
            self.body.center()
        };
        let aim = target.unwrap_or(muzzle + Vec2::new(-heading, 0.0));
        Some(Bullet::enemy_shot(muzzle, aim, now_ms))
    }

    pub fn draw(&self, surface: &mut dyn Surface, assets: &Assets, alpha: f64, paused: bool) {
        let (x, y) = self.body.draw_pos(alpha, paused);
        assets.draw(surface, self.kind.profile().sheet, self.frame, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const SCREEN: Rect = Rect::new(0, 0, 320, 240);

    fn tick(enemy: &mut Enemy, now: u64, target: Option<Vec2>) -> Option<Bullet> {
        enemy.update(DT, 16_667, now, target, &SCREEN)
    }

    #[test]
    fn every_tag_resolves() {
        for &(tag, kind) in TAGS {
            assert_eq!(EnemyKind::from_tag(tag), Some(kind));
            assert_eq!(kind.tag(), tag);
        }
        assert_eq!(EnemyKind::from_tag("enemy_99"), None);
    }

    #[test]
    fn spawns_at_the_edge_it_enters_from() {
        let left = Enemy::spawn(EnemyKind::Drone, 1, 30.0, false, &SCREEN, 0);
        assert_eq!(left.body.rect().x, 320);
        let right = Enemy::spawn(EnemyKind::DroneMirrored, 2, 30.0, false, &SCREEN, 0);
        assert_eq!(right.body.rect().x, -16);
    }

    #[test]
    fn entry_point_inside_the_window() {
        let drone = Enemy::spawn(EnemyKind::Drone, 1, 30.0, false, &SCREEN, 0).entering_at(50.0, &SCREEN);
        assert_eq!(drone.body.rect().x, 50);
        let late = Enemy::spawn(EnemyKind::Drone, 2, 30.0, false, &SCREEN, 0).entering_at(400.0, &SCREEN);
        assert_eq!(late.body.rect().x, 320);
        let mirrored =
            Enemy::spawn(EnemyKind::DroneMirrored, 3, 30.0, false, &SCREEN, 0).entering_at(50.0, &SCREEN);
        assert_eq!(mirrored.body.rect().x, -16);
        let boss = Enemy::spawn(EnemyKind::Boss, 4, 88.0, false, &SCREEN, 0).entering_at(0.0, &SCREEN);
        assert_eq!(boss.body.rect().x, 320);
    }

    #[test]
    fn crosses_the_screen_then_dies() {
        let mut enemy = Enemy::spawn(EnemyKind::Dasher, 1, 100.0, false, &SCREEN, 0);
        tick(&mut enemy, 16, None);
        assert!(enemy.is_alive());
        for i in 0..300 {
            tick(&mut enemy, 32 + i * 16, None);
        }
        assert!(!enemy.is_alive());
    }

    #[test]
    fn damage_counts_down_to_death() {
        let mut enemy = Enemy::spawn(EnemyKind::Gunship, 1, 100.0, false, &SCREEN, 0);
        assert!(!enemy.take_damage(1));
        assert!(!enemy.take_damage(1));
        assert!(enemy.take_damage(1));
        assert_eq!(enemy.hits(), 0);
        assert!(enemy.take_damage(2));
    }

    #[test]
    fn fires_on_its_cooldown() {
        let mut enemy = Enemy::spawn(EnemyKind::Sniper, 1, 100.0, false, &SCREEN, 0);
        let target = Some(Vec2::new(20.0, 100.0));
        assert!(tick(&mut enemy, 16, target).is_none());
        assert!(tick(&mut enemy, 900, target).is_none());
        let shot = tick(&mut enemy, 901, target).expect("shot");
        assert!(shot.velocity().x < 0.0);
        assert!(tick(&mut enemy, 950, target).is_none());
    }

    #[test]
    fn seeker_steers_toward_player() {
        let mut enemy = Enemy::spawn(EnemyKind::Seeker, 1, 100.0, false, &SCREEN, 0);
        let start = enemy.body.pos.y;
        for i in 0..30 {
            tick(&mut enemy, i * 16, Some(Vec2::new(20.0, 200.0)));
        }
        assert!(enemy.body.pos.y > start);
    }

    #[test]
    fn boss_has_one_narrow_hurtbox() {
        let boss = Enemy::spawn(EnemyKind::Boss, 1, 88.0, false, &SCREEN, 0);
        let hurt: Vec<_> = boss.hitboxes().filter(|(_, h)| h.hurtbox).collect();
        assert_eq!(hurt.len(), 1);
        assert_eq!(hurt[0].0.w, 7);
        assert!(boss.hitboxes().count() > 1);
    }

    #[test]
    fn boss_settles_in_at_the_right_edge() {
        let mut boss = Enemy::spawn(EnemyKind::Boss, 1, 88.0, false, &SCREEN, 0);
        for i in 0..600 {
            tick(&mut boss, i * 16, None);
        }
        assert!(boss.is_alive());
        assert_eq!(boss.body.rect().x, 320 - 64 - 16);
    }

    #[test]
    fn boss_death_scatters_shrapnel() {
        let boss = Enemy::spawn(EnemyKind::Boss, 1, 88.0, false, &SCREEN, 0);
        let effects = boss.explode();
        assert_eq!(effects.iter().filter(|e| e.hitbox().is_some()).count(), BOSS_SHRAPNEL);
    }

    #[test]
    fn powerup_only_when_flagged() {
        let plain = Enemy::spawn(EnemyKind::Carrier, 1, 50.0, false, &SCREEN, 0);
        assert!(plain.drop_powerup().is_none());
        let carrier = Enemy::spawn(EnemyKind::Carrier, 2, 50.0, true, &SCREEN, 0);
        assert_eq!(carrier.drop_powerup().map(|p| p.kind), Some(PowerupKind::ExtraLife));
    }
}
