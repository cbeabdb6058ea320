//! Fixed-timestep clock.
//!
//! Wall-clock time is measured once per rendered frame and fed into an
//! accumulator. The simulation then consumes the accumulator in `fixed_dt`
//! slices (`while should_step()`), and whatever is left over becomes the
//! interpolation fraction used by the render pass. The remainder is carried to
//! the next frame, so no tick is ever lost or duplicated.

use std::time::Instant;

use crate::config::EngineConfig;

const FPS_SAMPLE_COUNT: usize = 60;

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
    pub interpolation_alpha: f64,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            fixed_dt: config.fixed_dt,
            max_accumulator: config.max_frame_time,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            interpolation_alpha: 0.0,
            fps_samples: [config.fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / config.fixed_dt,
            smoothed_frame_time_ms: config.fixed_dt * 1000.0,
        }
    }

    /// Measure the wall-clock time since the previous frame and feed it to
    /// the accumulator.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feed an explicit frame delta. `begin_frame` routes through here; tests
    /// and headless runs call it directly.
    pub fn advance(&mut self, real_dt: f64) {
        self.real_dt = real_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        // FPS smoothing
        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Simulation clock in whole milliseconds. Advances only with fixed steps,
    /// so every timer driven from it is deterministic.
    pub fn sim_time_ms(&self) -> u64 {
        (self.total_time * 1000.0).round() as u64
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
