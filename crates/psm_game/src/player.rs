//! The player's ship.

use glam::Vec2;
use psm_core::geom::Rect;
use psm_core::input::{Button, InputState};
use psm_core::surface::Surface;

use crate::assets::Assets;
use crate::audio::{AudioSink, Sound};
use crate::bullet::Bullet;
use crate::config::PlayerConfig;
use crate::entity::{Body, Hitbox};
use crate::explosion::Explosion;
use crate::powerup::PowerupKind;
use crate::weapons::{Arsenal, WeaponKind};

const SHIP_W: i32 = 32;
const SHIP_H: i32 = 16;
const SHIP_HITBOX: Hitbox = Hitbox::new(1, 3, 28, 8);
const FLASH_MS: u64 = 100;
/// Added to the sprite frame on the blink-off half of a flash.
const FLASH_FRAME_OFFSET: usize = 3;

/// What the player asked for this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerControls {
    pub dx: f32,
    pub dy: f32,
    pub fire: bool,
    pub switch_weapon: bool,
}

impl PlayerControls {
    pub fn read(input: &InputState) -> Self {
        let axis = |neg: Button, pos: Button| {
            input.is_held(pos) as i32 as f32 - input.is_held(neg) as i32 as f32
        };
        Self {
            dx: axis(Button::Left, Button::Right),
            dy: axis(Button::Up, Button::Down),
            fire: input.is_held(Button::B),
            switch_weapon: input.is_pressed(Button::Y),
        }
    }
}

pub struct Player {
    pub body: Body,
    pub lives: u32,
    pub score: u64,
    arsenal: Arsenal,
    config: PlayerConfig,
    protected_since: Option<u64>,
    respawning: bool,
    alive: bool,
    frame: usize,
    flash_off: bool,
}

impl Player {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            body: Body::new(config.respawn_stop_x, config.respawn_y, SHIP_W, SHIP_H),
            lives: config.lives,
            score: 0,
            arsenal: Arsenal::new(),
            config: config.clone(),
            protected_since: None,
            respawning: false,
            alive: true,
            frame: 0,
            flash_off: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_protected(&self) -> bool {
        self.protected_since.is_some()
    }

    pub fn is_respawning(&self) -> bool {
        self.respawning
    }

    /// Alive and not flying in after a respawn.
    pub fn in_control(&self) -> bool {
        self.alive && !self.respawning
    }

    pub fn hitbox(&self) -> Rect {
        SHIP_HITBOX.world(&self.body)
    }

    /// Ship rect while it is in control, for things attached to it.
    pub fn ship_rect(&self) -> Option<Rect> {
        self.in_control().then(|| self.body.rect())
    }

    /// Aim point for enemies.
    pub fn target(&self) -> Option<Vec2> {
        self.alive.then(|| self.body.center())
    }

    pub fn weapon(&self) -> WeaponKind {
        self.arsenal.current().kind
    }

    /// Blow up the ship. With a life to spare it comes back protected from
    /// off the left edge; without one it is gone for good.
    pub fn explode(&mut self, now_ms: u64, audio: &mut dyn AudioSink) -> Explosion {
        audio.play(Sound::PlayerExplosion);
        let explosion = Explosion::at(self.body.center());
        if self.lives == 0 {
            log::info!("Player destroyed, no lives left");
            self.alive = false;
            return explosion;
        }
        self.lives -= 1;
        self.respawning = true;
        self.protected_since = Some(now_ms);
        self.body.teleport(Vec2::new(
            self.config.respawn_x - SHIP_W as f32,
            self.config.respawn_y,
        ));
        explosion
    }

    /// Back to the starting line for a new level, keeping lives, score and
    /// weapons.
    pub fn reset_position(&mut self) {
        self.body.teleport(Vec2::new(self.config.respawn_stop_x, self.config.respawn_y));
        self.respawning = false;
        self.protected_since = None;
        self.flash_off = false;
        self.frame = 0;
    }

    pub fn power_up(&mut self, kind: PowerupKind) {
        match kind {
            PowerupKind::WeaponBoost => self.arsenal.current_mut().power_up(),
            PowerupKind::ExtraLife => self.lives += 1,
        }
    }

    /// One tick of movement and shooting. Returns the bullets fired.
    pub fn update(
        &mut self,
        dt: f32,
        now_ms: u64,
        controls: PlayerControls,
        bounds: &Rect,
        audio: &mut dyn AudioSink,
    ) -> Vec<Bullet> {
        self.body.begin_step();
        if !self.alive {
            return Vec::new();
        }

        if let Some(since) = self.protected_since {
            if now_ms.saturating_sub(since) > self.config.protect_ms {
                self.protected_since = None;
            }
        }
        self.flash_off = self
            .protected_since
            .is_some_and(|since| (now_ms.saturating_sub(since) / FLASH_MS) % 2 == 1);

        if self.respawning {
            self.frame = 0;
            self.body.pos.x += self.config.speed * dt;
            if self.body.pos.x >= self.config.respawn_stop_x {
                self.body.pos.x = self.config.respawn_stop_x;
                self.respawning = false;
            }
            return Vec::new();
        }

        let step = Vec2::new(controls.dx, controls.dy) * self.config.speed * dt;
        let max_x = (bounds.right() - SHIP_W) as f32;
        let max_y = (bounds.bottom() - SHIP_H) as f32;
        self.body.pos = (self.body.pos + step).clamp(
            Vec2::new(bounds.left() as f32, bounds.top() as f32),
            Vec2::new(max_x, max_y),
        );
        self.frame = if controls.dy > 0.0 {
            1
        } else if controls.dy < 0.0 {
            2
        } else {
            0
        };

        if controls.switch_weapon {
            self.arsenal.cycle();
            audio.play(Sound::ChangeWeapon);
            log::debug!("Weapon {}", self.weapon().name());
        }
        if controls.fire {
            return self.arsenal.current_mut().fire(now_ms, self.body.rect(), audio);
        }
        Vec::new()
    }

    pub fn draw(&self, surface: &mut dyn Surface, assets: &Assets, alpha: f64, paused: bool) {
        if !self.alive {
            return;
        }
        let (x, y) = self.body.draw_pos(alpha, paused);
        let frame = if self.flash_off {
            self.frame + FLASH_FRAME_OFFSET
        } else {
            self.frame
        };
        assets.draw(surface, "ship", frame, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;

    const DT: f32 = 1.0 / 60.0;
    const SCREEN: Rect = Rect::new(0, 0, 320, 240);

    fn player() -> Player {
        Player::new(&PlayerConfig::default())
    }

    #[test]
    fn explode_costs_a_life_and_respawns_protected() {
        let mut audio = RecordingAudio::default();
        let mut player = player();
        let lives = player.lives;
        player.explode(1000, &mut audio);
        assert_eq!(player.lives, lives - 1);
        assert!(player.is_alive());
        assert!(player.is_protected());
        assert!(player.is_respawning());
        assert_eq!(player.body.rect().x, -52);
        assert_eq!(audio.sounds, vec![Sound::PlayerExplosion]);
    }

    #[test]
    fn last_life_kills() {
        let mut audio = RecordingAudio::default();
        let mut player = player();
        player.lives = 0;
        player.explode(0, &mut audio);
        assert!(!player.is_alive());
        assert!(player.target().is_none());
    }

    #[test]
    fn respawn_flies_in_then_protection_expires() {
        let mut audio = RecordingAudio::default();
        let mut player = player();
        player.explode(0, &mut audio);
        let mut now = 0;
        while player.is_respawning() {
            now += 16;
            player.update(DT, now, PlayerControls::default(), &SCREEN, &mut audio);
            assert!(now < 2000);
        }
        assert_eq!(player.body.rect().x, 16);
        assert!(player.is_protected());
        player.update(DT, 2001, PlayerControls::default(), &SCREEN, &mut audio);
        assert!(!player.is_protected());
    }

    #[test]
    fn movement_stays_on_screen() {
        let mut audio = RecordingAudio::default();
        let mut player = player();
        let controls = PlayerControls {
            dx: -1.0,
            dy: -1.0,
            ..Default::default()
        };
        for i in 0..300 {
            player.update(DT, i * 16, controls, &SCREEN, &mut audio);
        }
        assert_eq!(player.body.rect().x, 0);
        assert_eq!(player.body.rect().y, 0);
    }

    #[test]
    fn fire_and_switch() {
        let mut audio = RecordingAudio::default();
        let mut player = player();
        let fire = PlayerControls {
            fire: true,
            ..Default::default()
        };
        assert_eq!(player.update(DT, 0, fire, &SCREEN, &mut audio).len(), 1);
        let switch = PlayerControls {
            switch_weapon: true,
            ..fire
        };
        assert_eq!(player.update(DT, 16, switch, &SCREEN, &mut audio).len(), 3);
        assert_eq!(player.weapon(), WeaponKind::Spread);
    }

    #[test]
    fn reset_keeps_progress() {
        let mut audio = RecordingAudio::default();
        let mut player = player();
        player.score = 1200;
        player.explode(0, &mut audio);
        player.reset_position();
        assert_eq!(player.body.rect().x, 16);
        assert!(player.in_control());
        assert!(!player.is_protected());
        assert_eq!((player.lives, player.score), (2, 1200));
    }

    #[test]
    fn powerups_apply() {
        let mut player = player();
        player.power_up(PowerupKind::ExtraLife);
        assert_eq!(player.lives, 4);
    }
}
