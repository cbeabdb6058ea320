use psm_core::input::{Button, InputState};
use psm_core::state::{DrawFrame, GameState, StateCommand, StateCore};
use psm_core::surface::Surface;
use psm_core::transition::Transition;

use super::{fade_in, fade_out, Command, TitleState};
use crate::audio::{MusicAction, Sound};
use crate::context::GameContext;

pub struct GameOverState {
    core: StateCore,
    score: u64,
}

impl GameOverState {
    pub fn boxed(score: u64) -> Box<dyn GameState<GameContext>> {
        Box::new(Self {
            core: StateCore::new(),
            score,
        })
    }
}

impl GameState<GameContext> for GameOverState {
    fn name(&self) -> &str {
        "game_over"
    }

    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn activate(&mut self, transition: Option<Box<dyn Transition>>, ctx: &mut GameContext) {
        ctx.audio.music(MusicAction::Stop);
        ctx.record_score(self.score);
        self.core.start(transition);
    }

    fn handle_input(&mut self, input: &mut InputState, ctx: &mut GameContext) -> Command {
        if input.is_pressed(Button::Start) {
            ctx.audio.play(Sound::Select);
            self.core.transition_off(fade_out(ctx));
        }
        StateCommand::None
    }

    fn update(&mut self, ctx: &mut GameContext) -> Command {
        if self.core.done_exiting() {
            return StateCommand::Replace(TitleState::boxed(), fade_in(ctx));
        }
        StateCommand::None
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &GameContext, _frame: DrawFrame) {
        let font = ctx.assets.font();
        font.draw_centered(surface, "GAME OVER", 96, 255);
        font.draw_centered(surface, &format!("SCORE {:07}", self.score), 120, 255);
        font.draw_centered(surface, "PRESS START", 160, 255);
    }
}
