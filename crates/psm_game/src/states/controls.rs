use psm_core::input::{Button, InputState, Key, PhysicalInput};
use psm_core::state::{DrawFrame, GameState, StateCommand, StateCore};
use psm_core::surface::Surface;

use super::Command;
use crate::audio::Sound;
use crate::context::GameContext;

/// Walks through every logical button asking for a new input. Escape backs
/// out and restores the default table.
pub struct ControlsState {
    core: StateCore,
    started: bool,
    next: usize,
}

impl ControlsState {
    pub fn new() -> Self {
        Self {
            core: StateCore::new(),
            started: false,
            next: 0,
        }
    }

    pub fn boxed() -> Box<dyn GameState<GameContext>> {
        Box::new(Self::new())
    }

    fn current(&self) -> Option<Button> {
        Button::ALL.get(self.next).copied()
    }
}

impl Default for ControlsState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState<GameContext> for ControlsState {
    fn name(&self) -> &str {
        "controls"
    }

    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn handle_input(&mut self, input: &mut InputState, ctx: &mut GameContext) -> Command {
        if !self.started {
            input.begin_rebind();
            match input.gamepad_name() {
                Some(name) => log::info!("Rebinding controls, keyboard or {name}"),
                None => log::info!("Rebinding controls, keyboard only"),
            }
            self.started = true;
            return StateCommand::None;
        }
        let Some(captured) = input.take_captured() else {
            return StateCommand::None;
        };
        if captured == PhysicalInput::Key(Key::Escape) {
            log::info!("Rebinding cancelled, back to default controls");
            input.end_rebind();
            input.use_default_bindings();
            ctx.audio.play(Sound::Blip);
            return StateCommand::Pop(None);
        }
        let Some(button) = self.current() else {
            return StateCommand::None;
        };
        if !input.redefine(button, captured) {
            ctx.audio.play(Sound::Blip);
            return StateCommand::None;
        }
        ctx.audio.play(Sound::Select);
        self.next += 1;
        if self.current().is_some() {
            return StateCommand::None;
        }
        log::info!("All buttons bound, using custom controls");
        input.end_rebind();
        input.use_user_bindings();
        input.clear();
        StateCommand::Pop(None)
    }

    fn update(&mut self, _ctx: &mut GameContext) -> Command {
        StateCommand::None
    }

    fn draw(&self, surface: &mut dyn Surface, ctx: &GameContext, _frame: DrawFrame) {
        surface.fill([0, 0, 0], 255);
        let font = ctx.assets.font();
        font.draw_centered(surface, "CONTROLS", 40, 255);
        if let Some(button) = self.current() {
            font.draw_centered(surface, &format!("PRESS INPUT FOR {}", button.name()), 100, 255);
        }
        font.draw_centered(surface, &format!("{} / {}", self.next, Button::ALL.len()), 120, 255);
        font.draw_centered(surface, "ESC TO CANCEL", 200, 255);
    }
}
