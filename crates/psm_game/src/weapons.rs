//! Player weapons. Each kind is a row of data; firing is the same rate
//! limiter for all of them.

use psm_core::geom::Rect;

use crate::audio::{AudioSink, Sound};
use crate::bullet::{Bullet, BulletKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    Normal,
    Spread,
    Reverse,
    Beam,
}

struct WeaponProfile {
    cooldown_ms: u64,
    increment_ms: u64,
    floor_ms: u64,
    angles: &'static [f32],
    bullet: BulletKind,
    /// Spawn x measured back from the right edge of the ship.
    muzzle_back: i32,
    sound: Sound,
    name: &'static str,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Normal,
        WeaponKind::Spread,
        WeaponKind::Reverse,
        WeaponKind::Beam,
    ];

    fn profile(self) -> &'static WeaponProfile {
        match self {
            WeaponKind::Normal => &WeaponProfile {
                cooldown_ms: 380,
                increment_ms: 65,
                floor_ms: 185,
                angles: &[0.0],
                bullet: BulletKind::Straight,
                muzzle_back: 6,
                sound: Sound::Laser,
                name: "NORMAL",
            },
            WeaponKind::Spread => &WeaponProfile {
                cooldown_ms: 575,
                increment_ms: 65,
                floor_ms: 380,
                angles: &[0.0, 10.0, 350.0],
                bullet: BulletKind::Spread,
                muzzle_back: 6,
                sound: Sound::Spreader,
                name: "SPREAD",
            },
            WeaponKind::Reverse => &WeaponProfile {
                cooldown_ms: 380,
                increment_ms: 65,
                floor_ms: 185,
                angles: &[0.0, 140.0, 220.0],
                bullet: BulletKind::Reverse,
                muzzle_back: 24,
                sound: Sound::Laser,
                name: "REVERSE",
            },
            WeaponKind::Beam => &WeaponProfile {
                cooldown_ms: 1250,
                increment_ms: 150,
                floor_ms: 800,
                angles: &[0.0],
                bullet: BulletKind::Beam,
                muzzle_back: 6,
                sound: Sound::LaserBeam,
                name: "BEAM",
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    pub fn angles(self) -> &'static [f32] {
        self.profile().angles
    }
}

#[derive(Debug, Clone)]
pub struct Weapon {
    pub kind: WeaponKind,
    cooldown_ms: u64,
    last_shot_ms: Option<u64>,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            cooldown_ms: kind.profile().cooldown_ms,
            last_shot_ms: None,
        }
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    /// One bullet per firing angle once the cooldown has strictly elapsed,
    /// otherwise nothing.
    pub fn fire(&mut self, now_ms: u64, origin: Rect, audio: &mut dyn AudioSink) -> Vec<Bullet> {
        if let Some(last) = self.last_shot_ms {
            if now_ms.saturating_sub(last) <= self.cooldown_ms {
                return Vec::new();
            }
        }
        self.last_shot_ms = Some(now_ms);

        let profile = self.kind.profile();
        let x = (origin.right() - profile.muzzle_back) as f32;
        let center_y = origin.center_y() as f32;
        audio.play(profile.sound);
        profile
            .angles
            .iter()
            .map(|&angle| Bullet::player_shot(profile.bullet, x, center_y, angle, now_ms))
            .collect()
    }

    /// Shorten the cooldown by one step, never below the floor.
    pub fn power_up(&mut self) {
        let profile = self.kind.profile();
        self.cooldown_ms = self
            .cooldown_ms
            .saturating_sub(profile.increment_ms)
            .max(profile.floor_ms);
    }
}

/// The player's four weapons, one of them current.
#[derive(Debug, Clone)]
pub struct Arsenal {
    weapons: Vec<Weapon>,
    current: usize,
}

impl Arsenal {
    pub fn new() -> Self {
        Self {
            weapons: WeaponKind::ALL.iter().map(|&k| Weapon::new(k)).collect(),
            current: 0,
        }
    }

    pub fn current(&self) -> &Weapon {
        &self.weapons[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Weapon {
        &mut self.weapons[self.current]
    }

    pub fn cycle(&mut self) {
        self.current = (self.current + 1) % self.weapons.len();
    }
}

impl Default for Arsenal {
    fn default() -> Self {
        Self::new()
    }
}
