use std::path::{Path, PathBuf};
use std::sync::Arc;

use psm_core::state::LoopContext;

use crate::assets::Assets;
use crate::audio::AudioSink;
use crate::config::GameConfig;

/// Everything the game states share.
pub struct GameContext {
    pub config: GameConfig,
    pub assets: Arc<Assets>,
    pub audio: Box<dyn AudioSink>,
    res_dir: PathBuf,
    now_ms: u64,
    pub paused: bool,
    pub high_score: u64,
}

impl GameContext {
    pub fn new(config: GameConfig, assets: Arc<Assets>, audio: Box<dyn AudioSink>, res_dir: &Path) -> Self {
        Self {
            config,
            assets,
            audio,
            res_dir: res_dir.to_path_buf(),
            now_ms: 0,
            paused: false,
            high_score: 0,
        }
    }

    /// `relative` resolved against the resource directory.
    pub fn resource(&self, relative: &str) -> PathBuf {
        self.res_dir.join(relative)
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.engine.fixed_dt
    }

    pub fn record_score(&mut self, score: u64) {
        if score > self.high_score {
            log::info!("New high score {score}");
            self.high_score = score;
        }
    }
}

impl LoopContext for GameContext {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn set_now_ms(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
