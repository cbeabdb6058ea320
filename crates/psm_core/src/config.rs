use serde::Deserialize;

/// Immutable engine parameters handed to the clock, viewport and entity
/// constructors at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f64,
    #[serde(default = "default_max_frame_time")]
    pub max_frame_time: f64,
}

impl EngineConfig {
    pub fn screen_rect(&self) -> crate::geom::Rect {
        crate::geom::Rect::new(0, 0, self.screen_width as i32, self.screen_height as i32)
    }

    /// Length of one simulation tick in whole microseconds.
    pub fn fixed_dt_us(&self) -> u64 {
        (self.fixed_dt * 1_000_000.0).round() as u64
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err("Engine config invalid: screen size must be > 0".to_string());
        }
        if self.fixed_dt <= 0.0 {
            return Err("Engine config invalid: fixed_dt must be > 0".to_string());
        }
        if self.max_frame_time < self.fixed_dt {
            return Err(format!(
                "Engine config invalid: max_frame_time {} is shorter than fixed_dt {}",
                self.max_frame_time, self.fixed_dt
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            fixed_dt: default_fixed_dt(),
            max_frame_time: default_max_frame_time(),
        }
    }
}

const fn default_screen_width() -> u32 {
    320
}

const fn default_screen_height() -> u32 {
    240
}

fn default_fixed_dt() -> f64 {
    1.0 / 60.0
}

const fn default_max_frame_time() -> f64 {
    0.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_arcade_resolution() {
        let config = EngineConfig::default();
        assert_eq!(config.screen_width, 320);
        assert_eq!(config.screen_height, 240);
        assert_eq!(config.fixed_dt_us(), 16_667);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_clamp_below_timestep() {
        let config = EngineConfig {
            max_frame_time: 0.001,
            ..EngineConfig::default()
        };
        let err = config.validate().expect_err("clamp shorter than a tick");
        assert!(err.contains("max_frame_time"));
    }
}
