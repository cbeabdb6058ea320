use psm_core::input::{Button, InputState};
use psm_core::state::{DrawFrame, GameState, StateCommand, StateCore};
use psm_core::surface::Surface;
use psm_core::transition::Transition;

use super::{fade_in, Command, TitleState};
use crate::audio::Sound;
use crate::context::GameContext;

/// Overlay on top of gameplay. While it is on the stack the game is paused:
/// nothing below it updates and entities draw at their latest position.
pub struct PauseState {
    core: StateCore,
}

impl PauseState {
    pub fn boxed() -> Box<dyn GameState<GameContext>> {
        Box::new(Self {
            core: StateCore::new(),
        })
    }
}

impl GameState<GameContext> for PauseState {
    fn name(&self) -> &str {
        "pause"
    }

    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn activate(&mut self, transition: Option<Box<dyn Transition>>, ctx: &mut GameContext) {
        ctx.paused = true;
        self.core.start(transition);
    }

    fn unload_content(&mut self, ctx: &mut GameContext) {
        ctx.paused = false;
    }

    fn handle_input(&mut self, input: &mut InputState, ctx: &mut GameContext) -> Command {
        if input.is_pressed(Button::Start) {
            ctx.audio.play(Sound::Pause);
            return StateCommand::Pop(None);
        }
        if input.is_pressed(Button::Select) {
            ctx.audio.play(Sound::Select);
            return StateCommand::Replace(TitleState::boxed(), fade_in(ctx));
        }
        StateCommand::None
    }

    fn update(&mut self, _ctx: &mut GameContext) -> Command {
        StateCommand::None
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &GameContext, _frame: DrawFrame) {
        surface.fill([0, 0, 0], 128);
        let font = ctx.assets.font();
        font.draw_centered(surface, "PAUSED", 100, 255);
        font.draw_centered(surface, "START RESUME   SELECT QUIT", 124, 255);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context;
    use psm_core::input::Key;

    #[test]
    fn pause_flag_follows_the_overlay() {
        let mut ctx = context();
        let mut pause = PauseState::boxed();
        pause.activate(None, &mut ctx);
        assert!(ctx.paused);
        pause.unload_content(&mut ctx);
        assert!(!ctx.paused);
    }

    #[test]
    fn start_resumes() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut pause = PauseState::boxed();
        input.key_down(Key::Return);
        assert!(matches!(pause.handle_input(&mut input, &mut ctx), StateCommand::Pop(None)));
    }
}
