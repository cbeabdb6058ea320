use psm_core::input::{Button, InputState};
use psm_core::state::{DrawFrame, GameState, StateCommand, StateCore};
use psm_core::surface::Surface;
use psm_core::transition::Transition;

use super::{fade_out, start_level, Command, ControlsState};
use crate::audio::{Music, MusicAction, Sound};
use crate::context::GameContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    StartGame,
    Controls,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 3] = [MenuItem::StartGame, MenuItem::Controls, MenuItem::Quit];

    fn label(self) -> &'static str {
        match self {
            MenuItem::StartGame => "START GAME",
            MenuItem::Controls => "CONTROLS",
            MenuItem::Quit => "QUIT",
        }
    }
}

const MENU_TOP: i32 = 140;
const MENU_SPACING: i32 = 16;

pub struct TitleState {
    core: StateCore,
    cursor: usize,
    starting: bool,
}

impl TitleState {
    pub fn new() -> Self {
        Self {
            core: StateCore::new(),
            cursor: 0,
            starting: false,
        }
    }

    pub fn boxed() -> Box<dyn GameState<GameContext>> {
        Box::new(Self::new())
    }

    fn item_y(index: usize) -> i32 {
        MENU_TOP + index as i32 * MENU_SPACING
    }
}

impl Default for TitleState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState<GameContext> for TitleState {
    fn name(&self) -> &str {
        "title"
    }

    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn activate(&mut self, transition: Option<Box<dyn Transition>>, ctx: &mut GameContext) {
        ctx.audio.music(MusicAction::Play(Music::Title));
        self.core.start(transition);
    }

    fn handle_input(&mut self, input: &mut InputState, ctx: &mut GameContext) -> Command {
        let count = MenuItem::ALL.len();
        if input.is_pressed(Button::Up) {
            self.cursor = (self.cursor + count - 1) % count;
            ctx.audio.play(Sound::Cursor);
        }
        if input.is_pressed(Button::Down) {
            self.cursor = (self.cursor + 1) % count;
            ctx.audio.play(Sound::Cursor);
        }
        if !(input.is_pressed(Button::Start) || input.is_pressed(Button::B)) {
            return StateCommand::None;
        }

        ctx.audio.play(Sound::Select);
        match MenuItem::ALL[self.cursor] {
            MenuItem::StartGame => {
                ctx.audio.music(MusicAction::FadeOut { ms: 1000 });
                self.starting = true;
                self.core.transition_off(fade_out(ctx));
                StateCommand::None
            }
            MenuItem::Controls => {
                input.clear();
                StateCommand::Push(ControlsState::boxed(), None)
            }
            MenuItem::Quit => StateCommand::Quit,
        }
    }

    fn update(&mut self, ctx: &mut GameContext) -> Command {
        if self.starting && self.core.done_exiting() {
            self.starting = false;
            return start_level(ctx, 0, None);
        }
        StateCommand::None
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &GameContext, _frame: DrawFrame) {
        let font = ctx.assets.font();
        font.draw_centered(surface, &ctx.config.title.to_uppercase(), 48, 255);
        font.draw_centered(surface, &format!("HI SCORE {:07}", ctx.high_score), 72, 255);

        let text_x = (surface.size().0 as i32 - font.text_width("START GAME")) / 2;
        for (i, item) in MenuItem::ALL.iter().enumerate() {
            font.draw(surface, item.label(), text_x, Self::item_y(i), 255);
        }
        ctx.assets
            .draw(surface, "cursor", 0, text_x - 14, Self::item_y(self.cursor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::context;
    use psm_core::input::Key;

    #[test]
    fn cursor_wraps_around() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut title = TitleState::new();
        input.key_down(Key::Up);
        title.handle_input(&mut input, &mut ctx);
        assert_eq!(title.cursor, MenuItem::ALL.len() - 1);
    }

    #[test]
    fn quit_item_quits() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut title = TitleState::new();
        title.cursor = 2;
        input.key_down(Key::Return);
        assert!(matches!(title.handle_input(&mut input, &mut ctx), StateCommand::Quit));
    }

    #[test]
    fn start_game_fades_out_first() {
        let mut ctx = context();
        let mut input = InputState::new();
        let mut title = TitleState::new();
        input.key_down(Key::Return);
        assert!(matches!(title.handle_input(&mut input, &mut ctx), StateCommand::None));
        assert!(title.core.is_exiting());
        assert!(matches!(title.update(&mut ctx), StateCommand::None));
    }
}
