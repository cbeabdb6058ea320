//! One level in play: sprite groups, spawn queue and scrolling background,
//! advanced one fixed tick at a time.

use std::sync::Arc;

use psm_core::geom::Rect;
use psm_core::surface::{Image, Surface};
use psm_core::viewport::Viewport;

use crate::assets::Assets;
use crate::audio::{AudioSink, MusicAction};
use crate::collision::{self, CombatOutcome};
use crate::config::GameConfig;
use crate::level::{SpawnRecord, SpawnScheduler};
use crate::player::{Player, PlayerControls};
use crate::sprites::{SpriteGroups, Tick};

/// Boss levels hold the boss back this long after the level starts.
const BOSS_ENTRY_DELAY_MS: u64 = 1500;
const BOSS_MUSIC_FADE_MS: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Playing,
    Cleared,
    /// Out of ships and the last explosion has burnt out.
    Lost,
}

pub struct World {
    pub groups: SpriteGroups,
    scheduler: SpawnScheduler,
    viewport: Viewport,
    boss_level: bool,
    boss_destroyed: bool,
    bounds: Rect,
    dt: f64,
    dt_us: u64,
    clock_us: u64,
}

impl World {
    pub fn new(
        config: &GameConfig,
        boss_level: bool,
        records: Vec<SpawnRecord>,
        background: Arc<Image>,
        player: Player,
    ) -> Self {
        Self {
            groups: SpriteGroups::new(player),
            scheduler: SpawnScheduler::new(records),
            viewport: Viewport::new(background, &config.engine, config.scroll_velocity),
            boss_level,
            boss_destroyed: false,
            bounds: config.engine.screen_rect(),
            dt: config.engine.fixed_dt,
            dt_us: config.engine.fixed_dt_us(),
            clock_us: 0,
        }
    }

    /// Level time, which stands still while the game is paused.
    pub fn now_ms(&self) -> u64 {
        self.clock_us / 1000
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pending_spawns(&self) -> usize {
        self.scheduler.len()
    }

    pub fn player(&self) -> &Player {
        &self.groups.player
    }

    pub fn into_player(self) -> Player {
        self.groups.player
    }

    /// One fixed tick: entities, combat, scrolling, spawns, then merge
    /// everything added along the way.
    pub fn step(&mut self, controls: PlayerControls, audio: &mut dyn AudioSink) -> CombatOutcome {
        self.clock_us += self.dt_us;
        let now_ms = self.now_ms();

        let mut tick = Tick {
            dt: self.dt as f32,
            dt_us: self.dt_us,
            now_ms,
            bounds: self.bounds,
            controls,
            audio: &mut *audio,
        };
        self.groups.update(&mut tick);

        let outcome = collision::resolve(&mut self.groups, self.boss_level, now_ms, audio);
        if outcome.boss_destroyed {
            self.boss_destroyed = true;
            audio.music(MusicAction::FadeOut {
                ms: BOSS_MUSIC_FADE_MS,
            });
        }

        if !self.boss_level {
            self.viewport.advance(self.dt);
        }
        let boss_signal = if self.boss_level {
            now_ms >= BOSS_ENTRY_DELAY_MS
        } else {
            self.viewport.level_pos() >= self.viewport.max_scroll()
        };
        let level_pos = self.viewport.level_pos();
        let released = self.scheduler.release(level_pos, self.viewport.width(), boss_signal);
        for record in &released {
            self.groups.spawn(record, level_pos, &self.bounds, now_ms);
        }

        self.groups.flush();
        outcome
    }

    pub fn status(&self) -> LevelStatus {
        let groups = &self.groups;
        if !groups.player.is_alive() && groups.explosions.is_empty() {
            return LevelStatus::Lost;
        }
        let cleared = if self.boss_level {
            self.boss_destroyed && groups.explosions.is_empty()
        } else {
            self.scheduler.is_empty() && groups.enemies.is_empty()
        };
        if cleared {
            LevelStatus::Cleared
        } else {
            LevelStatus::Playing
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, assets: &Assets, alpha: f64, paused: bool) {
        self.viewport.draw(surface, alpha, self.boss_level, paused);
        self.groups.draw(surface, assets, alpha, paused);
    }
}
