//! The game's screens. Each one is a `GameState<GameContext>` on the
//! state stack.

mod controls;
mod game_over;
mod gameplay;
mod pause;
mod title;

pub use controls::ControlsState;
pub use game_over::GameOverState;
pub use gameplay::GameplayState;
pub use pause::PauseState;
pub use title::TitleState;

use psm_core::state::StateCommand;
use psm_core::transition::{FadeTransition, TextTransition, Transition};

use crate::context::GameContext;

pub type Command = StateCommand<GameContext>;

fn fade_in(ctx: &GameContext) -> Option<Box<dyn Transition>> {
    Some(FadeTransition::fade_in(ctx.fixed_dt()))
}

fn fade_out(ctx: &GameContext) -> Option<Box<dyn Transition>> {
    Some(FadeTransition::fade_out(ctx.fixed_dt()))
}

fn text_card(ctx: &GameContext, text: &str) -> Option<Box<dyn Transition>> {
    Some(TextTransition::boxed(text, ctx.assets.font(), ctx.fixed_dt()))
}

/// Gameplay for `level`, introduced by its title card.
fn start_level(ctx: &GameContext, level: usize, player: Option<crate::player::Player>) -> Command {
    let title = ctx
        .config
        .levels
        .get(level)
        .map_or("", |l| l.title.as_str());
    StateCommand::Replace(GameplayState::boxed(level, player), text_card(ctx, title))
}
