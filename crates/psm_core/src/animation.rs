//! Frame-based sprite animation with deterministic tick logic.
//!
//! Clips are sequences of sheet frame indices with per-frame durations. All
//! timing uses integer microseconds (`u64`) so advancement under the fixed
//! timestep is exact; there is no floating-point drift between runs.

/// A single frame in an animation clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Index into the owning sprite sheet.
    pub frame: usize,
    pub duration_us: u64,
}

/// A sequence of frames that can loop or play once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
    pub looping: bool,
}

impl AnimationClip {
    /// Every frame of an `count`-frame sheet, in order, `frame_ms` each.
    pub fn uniform(count: usize, frame_ms: u64, looping: bool) -> Self {
        Self {
            frames: (0..count)
                .map(|frame| AnimationFrame {
                    frame,
                    duration_us: frame_ms * 1000,
                })
                .collect(),
            looping,
        }
    }

    /// Total duration of one full cycle in microseconds.
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }
}

/// Runtime state for one playing animation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt_us` microseconds and return the current sheet frame.
    pub fn tick(&mut self, dt_us: u64, clip: &AnimationClip) -> usize {
        if clip.frames.is_empty() {
            return 0;
        }
        if self.finished {
            return self.current(clip);
        }

        self.elapsed_us += dt_us;

        loop {
            let current_frame = &clip.frames[self.frame_index];
            // A zero-length frame would spin forever.
            if current_frame.duration_us == 0 || self.elapsed_us < current_frame.duration_us {
                break;
            }

            self.elapsed_us -= current_frame.duration_us;
            self.frame_index += 1;

            if self.frame_index >= clip.frames.len() {
                if clip.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.frames.len() - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            }
        }

        clip.frames[self.frame_index].frame
    }

    /// Sheet frame currently shown, without advancing.
    pub fn current(&self, clip: &AnimationClip) -> usize {
        clip.frames
            .get(self.frame_index)
            .or_else(|| clip.frames.last())
            .map_or(0, |f| f.frame)
    }
}
