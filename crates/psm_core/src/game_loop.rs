//! Top-level fixed-timestep driver.
//!
//! One call to `run_frame` is one rendered frame:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_step()` -- input to the top state (unless it is
//!      transitioning), then one update, then apply any state command
//!   3. `end_frame()` -- compute the interpolation alpha
//!   4. draw every state bottom to top
//!
//! Rendering never advances the simulation.

use crate::config::EngineConfig;
use crate::input::InputState;
use crate::state::{DrawFrame, GameState, LoopContext, StateStack};
use crate::surface::Surface;
use crate::time::TimeState;
use crate::transition::Transition;

pub struct GameLoop<C> {
    pub time: TimeState,
    pub input: InputState,
    stack: StateStack<C>,
    ctx: C,
}

impl<C: LoopContext> GameLoop<C> {
    pub fn new(config: &EngineConfig, ctx: C) -> Self {
        Self {
            time: TimeState::new(config),
            input: InputState::new(),
            stack: StateStack::new(),
            ctx,
        }
    }

    pub fn start(
        &mut self,
        state: Box<dyn GameState<C>>,
        transition: Option<Box<dyn Transition>>,
    ) -> Result<(), String> {
        self.stack.push(state, transition, &mut self.ctx)
    }

    pub fn is_running(&self) -> bool {
        self.stack.is_running()
    }

    pub fn stack(&self) -> &StateStack<C> {
        &self.stack
    }

    pub fn ctx(&self) -> &C {
        &self.ctx
    }

    /// Run one frame against the wall clock. Returns whether the game is
    /// still running.
    pub fn run_frame(&mut self, surface: &mut dyn Surface) -> Result<bool, String> {
        self.time.begin_frame();
        self.step_and_draw(surface)
    }

    /// Run one frame with an explicit elapsed time, for headless runs.
    pub fn run_frame_with_dt(&mut self, real_dt: f64, surface: &mut dyn Surface) -> Result<bool, String> {
        self.time.advance(real_dt);
        self.step_and_draw(surface)
    }

    fn step_and_draw(&mut self, surface: &mut dyn Surface) -> Result<bool, String> {
        while self.is_running() && self.time.should_step() {
            self.ctx.set_now_ms(self.time.sim_time_ms());
            self.stack.handle_input(&mut self.input, &mut self.ctx)?;
            self.stack.update(&mut self.ctx)?;
            // Edges are consumed by the first tick of the frame only.
            if self.time.steps_this_frame == 1 {
                self.input.end_frame();
            }
        }
        self.time.end_frame();

        if !self.is_running() {
            return Ok(false);
        }

        surface.fill([0, 0, 0], 255);
        let frame = DrawFrame {
            alpha: self.time.interpolation_alpha,
            paused: self.ctx.is_paused(),
        };
        self.stack.draw(surface, &self.ctx, frame);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::state::tests::{NullSurface, Recorder, TestCtx};

    const DT: f64 = 1.0 / 60.0;

    fn game() -> GameLoop<TestCtx> {
        let mut game = GameLoop::new(&EngineConfig::default(), TestCtx::default());
        game.start(Recorder::boxed("root"), None).expect("start");
        game
    }

    fn count(game: &GameLoop<TestCtx>, event: &str) -> usize {
        game.ctx().log.borrow().iter().filter(|e| e.as_str() == event).count()
    }

    #[test]
    fn no_tick_no_update_but_still_draws() {
        let mut game = game();
        assert!(game.run_frame_with_dt(DT * 0.5, &mut NullSurface).expect("frame"));
        assert_eq!(game.time.fixed_step_count, 0);
        assert_eq!(count(&game, "root:draw"), 1);
    }

    #[test]
    fn clock_follows_fixed_steps() {
        let mut game = game();
        game.run_frame_with_dt(DT * 3.0 + 1e-9, &mut NullSurface).expect("frame");
        assert_eq!(game.time.fixed_step_count, 3);
        assert_eq!(game.ctx().now, 50);
    }

    #[test]
    fn press_on_a_zero_step_frame_is_not_lost() {
        let mut game = game();
        game.input.key_down(Key::Return);
        game.run_frame_with_dt(DT * 0.4, &mut NullSurface).expect("frame");
        assert_eq!(game.stack().len(), 1);
        game.run_frame_with_dt(DT * 0.7, &mut NullSurface).expect("frame");
        assert_eq!(game.stack().names(), vec!["root", "child"]);
    }

    #[test]
    fn press_is_consumed_once_per_catch_up_burst() {
        let mut game = game();
        game.input.key_down(Key::Return);
        game.run_frame_with_dt(DT * 4.0 + 1e-9, &mut NullSurface).expect("frame");
        assert_eq!(count(&game, "root:start"), 1);
        assert_eq!(game.stack().len(), 2);
    }

    #[test]
    fn pushed_overlay_freezes_the_state_below() {
        let mut game = game();
        game.run_frame_with_dt(DT + 1e-9, &mut NullSurface).expect("frame");
        let updates_before = count(&game, "root:update");
        assert_eq!(updates_before, 1);

        game.input.key_down(Key::Return);
        game.run_frame_with_dt(DT + 1e-9, &mut NullSurface).expect("frame");
        game.input.key_up(Key::Return);
        assert_eq!(game.stack().names(), vec!["root", "child"]);

        for _ in 0..5 {
            game.run_frame_with_dt(DT + 1e-9, &mut NullSurface).expect("frame");
        }
        assert_eq!(count(&game, "root:update"), updates_before);
        assert_eq!(count(&game, "child:update"), 6);
        assert_eq!(count(&game, "root:draw"), 7);
        assert_eq!(count(&game, "child:draw"), 6);
    }

    #[test]
    fn popping_the_last_state_ends_the_loop() {
        let mut game = game();
        game.input.key_down(Key::Quote);
        let running = game.run_frame_with_dt(DT + 1e-9, &mut NullSurface).expect("frame");
        assert!(!running);
        assert!(game.stack().is_empty());
    }
}
