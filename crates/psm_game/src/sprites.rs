//! Sprite groups: the live entities of a level, by category.
//!
//! Entities are only ever added through `Group::add`, which parks them until
//! the next `flush`, and only ever removed by flagging them dead. `flush`
//! runs once at the end of a tick, so nothing changes membership while a
//! group is being iterated.

use psm_core::geom::Rect;
use psm_core::surface::Surface;

use crate::assets::Assets;
use crate::audio::AudioSink;
use crate::bullet::Bullet;
use crate::enemy::{Enemy, EnemyKind};
use crate::explosion::Explosion;
use crate::level::SpawnRecord;
use crate::player::{Player, PlayerControls};
use crate::powerup::Powerup;

pub trait Sprite {
    fn is_alive(&self) -> bool;
    fn kill(&mut self);
}

macro_rules! impl_sprite {
    ($($ty:ty),*) => {
        $(impl Sprite for $ty {
            fn is_alive(&self) -> bool {
                <$ty>::is_alive(self)
            }

            fn kill(&mut self) {
                <$ty>::kill(self)
            }
        })*
    };
}

impl_sprite!(Enemy, Bullet, Powerup, Explosion);

pub struct Group<T> {
    items: Vec<T>,
    pending: Vec<T>,
}

impl<T: Sprite> Group<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Joins the group at the next flush.
    pub fn add(&mut self, item: T) {
        self.pending.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        self.pending.extend(items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    /// Live members, not counting ones waiting to join.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Nothing live and nothing waiting.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.pending.is_empty()
    }

    /// Merge waiting members and drop dead ones.
    pub fn flush(&mut self) {
        self.items.append(&mut self.pending);
        self.items.retain(|item| item.is_alive());
    }

    /// Kill every live member and discard the waiting ones.
    pub fn kill_all(&mut self) {
        self.items.iter_mut().for_each(T::kill);
        self.pending.clear();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.clear();
    }
}

impl<T: Sprite> Default for Group<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupId {
    Player,
    Enemies,
    PlayerShots,
    EnemyShots,
    Powerups,
    Explosions,
}

impl GroupId {
    pub const UPDATE_ORDER: [GroupId; 6] = [
        GroupId::Player,
        GroupId::Enemies,
        GroupId::PlayerShots,
        GroupId::EnemyShots,
        GroupId::Powerups,
        GroupId::Explosions,
    ];

    pub const DRAW_ORDER: [GroupId; 6] = [
        GroupId::PlayerShots,
        GroupId::Player,
        GroupId::Enemies,
        GroupId::Powerups,
        GroupId::Explosions,
        GroupId::EnemyShots,
    ];
}

/// Timing and surroundings for one update pass.
pub struct Tick<'a> {
    pub dt: f32,
    pub dt_us: u64,
    pub now_ms: u64,
    pub bounds: Rect,
    pub controls: PlayerControls,
    pub audio: &'a mut dyn AudioSink,
}

pub struct SpriteGroups {
    pub player: Player,
    pub enemies: Group<Enemy>,
    pub player_shots: Group<Bullet>,
    pub enemy_shots: Group<Bullet>,
    pub powerups: Group<Powerup>,
    pub explosions: Group<Explosion>,
    next_enemy_id: u64,
}

impl SpriteGroups {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            enemies: Group::new(),
            player_shots: Group::new(),
            enemy_shots: Group::new(),
            powerups: Group::new(),
            explosions: Group::new(),
            next_enemy_id: 0,
        }
    }

    /// Spawn a level record. An enemy whose trigger line is already inside
    /// the window starts at its level position instead of the screen edge.
    pub fn spawn(&mut self, record: &SpawnRecord, level_pos: f64, bounds: &Rect, now_ms: u64) -> u64 {
        let id = self.next_id();
        let screen_x = (record.x as f64 - level_pos) as f32;
        log::debug!("Spawn {} #{id} at ({screen_x}, {})", record.kind.tag(), record.y);
        let enemy = Enemy::spawn(record.kind, id, record.y as f32, record.has_powerup, bounds, now_ms)
            .entering_at(screen_x, bounds);
        self.enemies.add(enemy);
        id
    }

    pub fn spawn_kind(
        &mut self,
        kind: EnemyKind,
        y: f32,
        has_powerup: bool,
        bounds: &Rect,
        now_ms: u64,
    ) -> u64 {
        let id = self.next_id();
        log::debug!("Spawn {} #{id} at y {y}", kind.tag());
        self.enemies.add(Enemy::spawn(kind, id, y, has_powerup, bounds, now_ms));
        id
    }

    fn next_id(&mut self) -> u64 {
        self.next_enemy_id += 1;
        self.next_enemy_id
    }

    pub fn update(&mut self, tick: &mut Tick<'_>) {
        for group in GroupId::UPDATE_ORDER {
            match group {
                GroupId::Player => {
                    let shots = self.player.update(
                        tick.dt,
                        tick.now_ms,
                        tick.controls,
                        &tick.bounds,
                        &mut *tick.audio,
                    );
                    self.player_shots.extend(shots);
                }
                GroupId::Enemies => {
                    let target = self.player.target();
                    for enemy in self.enemies.iter_mut() {
                        if let Some(shot) =
                            enemy.update(tick.dt, tick.dt_us, tick.now_ms, target, &tick.bounds)
                        {
                            self.enemy_shots.add(shot);
                        }
                    }
                }
                GroupId::PlayerShots => {
                    let ship = self.player.ship_rect();
                    for shot in self.player_shots.iter_mut() {
                        shot.update(tick.dt, tick.now_ms, ship, &tick.bounds);
                    }
                }
                GroupId::EnemyShots => {
                    for shot in self.enemy_shots.iter_mut() {
                        shot.update(tick.dt, tick.now_ms, None, &tick.bounds);
                    }
                }
                GroupId::Powerups => {
                    for powerup in self.powerups.iter_mut() {
                        powerup.update(tick.dt, &tick.bounds);
                    }
                }
                GroupId::Explosions => {
                    for explosion in self.explosions.iter_mut() {
                        explosion.update(tick.dt, tick.dt_us, &tick.bounds);
                    }
                }
            }
        }
    }

    pub fn flush(&mut self) {
        self.enemies.flush();
        self.player_shots.flush();
        self.enemy_shots.flush();
        self.powerups.flush();
        self.explosions.flush();
    }

    pub fn draw(&self, surface: &mut dyn Surface, assets: &Assets, alpha: f64, paused: bool) {
        for group in GroupId::DRAW_ORDER {
            match group {
                GroupId::Player => self.player.draw(surface, assets, alpha, paused),
                GroupId::Enemies => {
                    for enemy in self.enemies.iter() {
                        enemy.draw(surface, assets, alpha, paused);
                    }
                }
                GroupId::PlayerShots => {
                    for shot in self.player_shots.iter() {
                        shot.draw(surface, assets, alpha, paused);
                    }
                }
                GroupId::EnemyShots => {
                    for shot in self.enemy_shots.iter() {
                        shot.draw(surface, assets, alpha, paused);
                    }
                }
                GroupId::Powerups => {
                    for powerup in self.powerups.iter() {
                        powerup.draw(surface, assets, alpha, paused);
                    }
                }
                GroupId::Explosions => {
                    for explosion in self.explosions.iter() {
                        explosion.draw(surface, assets, alpha, paused);
                    }
                }
            }
        }
    }
}
