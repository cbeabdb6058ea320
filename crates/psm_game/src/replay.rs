use crate::player::PlayerControls;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted player input, one entry per run of identical ticks.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub move_y: f32,
    #[serde(default)]
    pub fire: bool,
    #[serde(default)]
    pub switch_weapon: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_controls(&self) -> Vec<PlayerControls> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(PlayerControls {
                    dx: frame.move_x.clamp(-1.0, 1.0),
                    dy: frame.move_y.clamp(-1.0, 1.0),
                    fire: frame.fire,
                    // A switch is a press, so only the first tick of the run.
                    switch_weapon: frame.switch_weapon && i == 0,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f64 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::config::GameConfig;
    use crate::level::parse_level;
    use crate::player::Player;
    use crate::world::{LevelStatus, World};
    use psm_core::surface::Image;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "psm_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_replay(name_hint: &str, json: &str) -> ReplaySequence {
        let path = temp_file_path(name_hint);
        fs::write(&path, json).expect("write replay");
        let replay = load_replay_from_path(&path).expect("load replay");
        let _ = fs::remove_file(path);
        replay
    }

    fn play(level: &str, replay: &ReplaySequence) -> (World, RecordingAudio) {
        let config = GameConfig::default();
        let background = Arc::new(Image::filled(640, 240, [0, 0, 0, 255]));
        let player = Player::new(&config.player);
        let mut world = World::new(&config, false, parse_level(level), background, player);
        let mut audio = RecordingAudio::default();
        for controls in replay.expanded_controls() {
            world.step(controls, &mut audio);
        }
        (world, audio)
    }

    #[test]
    fn repeat_expands_and_switch_fires_once() {
        let replay = write_replay(
            "expand",
            r#"{ "frames": [
                { "move_x": 3.0, "repeat": 2 },
                { "switch_weapon": true, "fire": true, "repeat": 3 }
            ] }"#,
        );
        let controls = replay.expanded_controls();
        assert_eq!(controls.len(), 5);
        assert_eq!(controls[0].dx, 1.0);
        assert_eq!(controls.iter().filter(|c| c.switch_weapon).count(), 1);
        assert!(controls[4].fire);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay");
        let err = load_replay_from_path(&path).expect_err("empty replay");
        assert!(err.contains("frames list is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn holding_fire_clears_a_one_drone_level() {
        let replay = write_replay("shoot", r#"{ "frames": [ { "fire": true, "repeat": 240 } ] }"#);
        let (world, _) = play("type enemy_01 x 340 y 112 has_powerup False end_enemy", &replay);
        assert_eq!(world.player().score, 100);
        assert_eq!(world.player().lives, 3);
        assert_eq!(world.status(), LevelStatus::Cleared);
    }

    #[test]
    fn idling_in_the_path_of_a_drone_costs_one_ship() {
        let replay = write_replay("idle", r#"{ "frames": [ { "repeat": 300 } ] }"#);
        let (world, audio) = play("type enemy_01 x 340 y 112 has_powerup False end_enemy", &replay);
        assert_eq!(world.player().lives, 2);
        assert_eq!(world.player().score, 0);
        assert!(audio.sounds.contains(&crate::audio::Sound::PlayerExplosion));
    }

    #[test]
    fn same_replay_same_outcome() {
        let replay = write_replay(
            "determinism",
            r#"{ "frames": [
                { "move_y": -1.0, "fire": true, "repeat": 40 },
                { "move_x": 1.0, "move_y": 1.0, "fire": true, "repeat": 80 },
                { "switch_weapon": true, "fire": true, "repeat": 120 }
            ] }"#,
        );
        let level = "type enemy_02 x 100 y 60 has_powerup True end_enemy \
                     type enemy_03 x 200 y 120 has_powerup False end_enemy \
                     type enemy_04 x 300 y 180 has_powerup False end_enemy";
        let (a, audio_a) = play(level, &replay);
        let (b, audio_b) = play(level, &replay);
        assert_eq!(a.player().score, b.player().score);
        assert_eq!(a.player().body, b.player().body);
        assert_eq!(audio_a.sounds, audio_b.sounds);
    }
}
