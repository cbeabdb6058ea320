use psm_core::config::EngineConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_window_scale")]
    pub window_scale: u32,
    #[serde(default = "default_scroll_velocity")]
    pub scroll_velocity: f64,
    #[serde(default)]
    pub player: PlayerConfig,
    /// Relative to the resource directory.
    #[serde(default = "default_asset_manifest")]
    pub asset_manifest: String,
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlayerConfig {
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_lives")]
    pub lives: u32,
    #[serde(default = "default_protect_ms")]
    pub protect_ms: u64,
    #[serde(default = "default_respawn_x")]
    pub respawn_x: f32,
    #[serde(default = "default_respawn_y")]
    pub respawn_y: f32,
    /// Automatic fly-in after a respawn ends at this x.
    #[serde(default = "default_respawn_stop_x")]
    pub respawn_stop_x: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LevelConfig {
    /// Level text file, relative to the resource directory.
    pub file: String,
    /// Image id of the scrolling background.
    pub background: String,
    #[serde(default)]
    pub boss: bool,
    pub title: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            title: default_title(),
            window_scale: default_window_scale(),
            scroll_velocity: default_scroll_velocity(),
            player: PlayerConfig::default(),
            asset_manifest: default_asset_manifest(),
            levels: default_levels(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: default_player_speed(),
            lives: default_lives(),
            protect_ms: default_protect_ms(),
            respawn_x: default_respawn_x(),
            respawn_y: default_respawn_y(),
            respawn_stop_x: default_respawn_stop_x(),
        }
    }
}

/// Load `path`, or fall back to defaults when it does not exist. A file that
/// exists but does not parse or validate is an error.
pub fn load_config(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::warn!("Config {} not found, using defaults", path.display());
        return Ok(GameConfig::default());
    }
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    config.engine.validate()?;
    if config.window_scale == 0 {
        return Err("Config validation failed: window_scale must be > 0".to_string());
    }
    if config.player.speed <= 0.0 {
        return Err("Config validation failed: player speed must be > 0".to_string());
    }
    if config.levels.is_empty() {
        return Err("Config validation failed: levels list is empty".to_string());
    }
    for (i, level) in config.levels.iter().enumerate() {
        if level.file.is_empty() || level.background.is_empty() {
            return Err(format!(
                "Config validation failed: level {} needs a file and a background",
                i + 1
            ));
        }
    }
    Ok(())
}

fn default_title() -> String {
    "Protostriker M".to_string()
}

const fn default_window_scale() -> u32 {
    3
}

const fn default_scroll_velocity() -> f64 {
    psm_core::viewport::DEFAULT_SCROLL_VELOCITY
}

fn default_asset_manifest() -> String {
    "assets.json".to_string()
}

fn default_levels() -> Vec<LevelConfig> {
    (1..=4)
        .map(|n| LevelConfig {
            file: format!("levels/level{n}.txt"),
            background: format!("level{n}"),
            boss: n == 4,
            title: format!("STAGE {n}"),
        })
        .collect()
}

const fn default_player_speed() -> f32 {
    90.0
}

const fn default_lives() -> u32 {
    3
}

const fn default_protect_ms() -> u64 {
    2000
}

const fn default_respawn_x() -> f32 {
    -20.0
}

const fn default_respawn_y() -> f32 {
    112.0
}

const fn default_respawn_stop_x() -> f32 {
    16.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "psm_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(&temp_file_path("missing")).expect("defaults");
        assert_eq!(config.levels.len(), 4);
        assert!(config.levels[3].boss);
        assert_eq!(config.player.lives, 3);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = temp_file_path("partial");
        fs::write(
            &path,
            r#"{
              "window_scale": 2,
              "player": { "lives": 5 },
              "levels": [
                { "file": "levels/a.txt", "background": "a", "title": "STAGE A" }
              ]
            }"#,
        )
        .expect("write temp file");

        let config = load_config(&path).expect("should parse");
        assert_eq!(config.window_scale, 2);
        assert_eq!(config.player.lives, 5);
        assert!((config.player.speed - 90.0).abs() < f32::EPSILON);
        assert_eq!(config.engine.screen_width, 320);
        assert!(!config.levels[0].boss);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ not json").expect("write temp file");
        let err = load_config(&path).expect_err("malformed should fail");
        assert!(err.contains("Failed to parse config JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_level_list_is_rejected() {
        let path = temp_file_path("no_levels");
        fs::write(&path, r#"{ "levels": [] }"#).expect("write temp file");
        let err = load_config(&path).expect_err("no levels should fail");
        assert!(err.contains("levels list is empty"));
        let _ = fs::remove_file(path);
    }
}
